// HTTP request handlers
use crate::application::dashboard_service::{DashboardQuery, DashboardService};
use crate::domain::sensor::Sensor;
use crate::domain::window::DateWindow;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use chrono::NaiveDate;
use futures::Stream;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub resample: Option<bool>,
}

impl DashboardParams {
    pub fn to_query(&self, focus: Option<String>) -> Result<DashboardQuery, ApiError> {
        let start = parse_date("start_date", self.start_date.as_deref())?;
        let end = parse_date("end_date", self.end_date.as_deref())?;
        Ok(DashboardQuery {
            window: DateWindow::from_bounds(start, end),
            resample: self.resample,
            focus,
        })
    }
}

/// Blank values count as absent, so an untouched date input does not fail.
fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::InvalidDate {
                field,
                value: raw.to_string(),
            }),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the sensor catalog
pub async fn list_sensors(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let sensors: Vec<&Sensor> = state.dashboard_service.catalog().iter().collect();
    respond(&sensors, accepts_brotli(&headers)).await
}

/// Full dashboard bundle for every sensor
pub async fn get_dashboard(
    Query(params): Query<DashboardParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let query = params.to_query(None)?;
    let bundle = state.dashboard_service.get_dashboard(&query).await;
    Ok(respond(&bundle, accepts_brotli(&headers)).await)
}

/// Focus view: the bundle restricted to one sensor
pub async fn get_sensor(
    Path(id): Path<String>,
    Query(params): Query<DashboardParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    if !state.dashboard_service.catalog().contains(&id) {
        return Err(ApiError::UnknownSensor(id));
    }
    let query = params.to_query(Some(id))?;
    let bundle = state.dashboard_service.get_dashboard(&query).await;
    Ok(respond(&bundle, accepts_brotli(&headers)).await)
}

/// Push a fresh bundle on every refresh tick (server-sent events)
pub async fn stream_dashboard(
    Query(params): Query<DashboardParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let query = params.to_query(None)?;
    let events = dashboard_events(state.dashboard_service.clone(), query);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()).into_response())
}

fn dashboard_events(
    service: DashboardService,
    query: DashboardQuery,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send + 'static {
    let period = service.processing().refresh_interval();
    async_stream::stream! {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let bundle = service.get_dashboard(&query).await;
            tracing::debug!(data_available = bundle.data_available, "Pushing dashboard event");
            yield Event::default().event("dashboard").json_data(&bundle);
        }
    }
}

async fn respond<T: serde::Serialize>(data: &T, compress: bool) -> Response {
    match json_response(data, StatusCode::OK, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
