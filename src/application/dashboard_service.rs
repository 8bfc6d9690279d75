// Dashboard service - Use case for building dashboards
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::dashboard::{ChartSeries, DashboardBundle, SensorStats};
use crate::domain::error::TelemetryError;
use crate::domain::sensor::{Sensor, SensorCatalog};
use crate::domain::series::{downsample_points, resample_points};
use crate::domain::telemetry::TimeSeriesPoint;
use crate::domain::window::DateWindow;
use crate::infrastructure::config::ProcessingConfig;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub window: Option<DateWindow>,
    /// Falls back to the configured default when unset.
    pub resample: Option<bool>,
    /// Restricts the bundle to a single sensor.
    pub focus: Option<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn TelemetryRepository>,
    catalog: SensorCatalog,
    processing: ProcessingConfig,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        catalog: SensorCatalog,
        processing: ProcessingConfig,
    ) -> Self {
        Self {
            repository,
            catalog,
            processing,
        }
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    pub fn processing(&self) -> &ProcessingConfig {
        &self.processing
    }

    /// Never fails: an unreadable source becomes an unavailable bundle
    /// carrying the reason.
    pub async fn get_dashboard(&self, query: &DashboardQuery) -> DashboardBundle {
        match self.build_dashboard(query).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(
                    source = %self.repository.describe(),
                    error = %e,
                    "Telemetry data unavailable"
                );
                DashboardBundle::unavailable(e.to_string())
            }
        }
    }

    async fn build_dashboard(&self, query: &DashboardQuery) -> Result<DashboardBundle, TelemetryError> {
        let frame = self.repository.load_frame(&self.catalog.ids()).await?;
        let rows_loaded = frame.len();

        let frame = match &query.window {
            Some(window) => frame.within(window),
            None => frame,
        };
        if frame.is_empty() {
            tracing::debug!(rows_loaded, window = ?query.window, "No telemetry rows in window");
        } else {
            tracing::debug!(
                rows_loaded,
                rows_in_window = frame.len(),
                window = ?query.window,
                "Telemetry frame loaded"
            );
        }

        let resample = query.resample.unwrap_or(self.processing.resample_by_default);
        let mut bundle = DashboardBundle::available(frame.last_timestamp());

        for sensor in self.selected_sensors(query.focus.as_deref()) {
            // Sensors without a column in the source are left out entirely.
            let Some(points) = frame.sensor_points(&sensor.id) else {
                continue;
            };
            let points = if resample {
                self.resample(sensor, points)
            } else {
                points
            };

            match SensorStats::from_points(&points) {
                Some(stats) => {
                    let display = downsample_points(points, self.processing.max_display_points);
                    let series = ChartSeries::new(sensor, &display);
                    bundle.insert(sensor, stats, series);
                }
                None => {
                    tracing::debug!(sensor = %sensor.id, "No valid samples in window");
                    bundle.insert_empty(sensor);
                }
            }
        }

        Ok(bundle)
    }

    /// Falls back to the raw samples when the grid would exceed the bucket limit.
    fn resample(&self, sensor: &Sensor, points: Vec<TimeSeriesPoint>) -> Vec<TimeSeriesPoint> {
        match resample_points(
            &points,
            self.processing.resample_interval_secs as i64,
            self.processing.max_resample_buckets,
        ) {
            Ok(resampled) => resampled,
            Err(e) => {
                tracing::warn!(sensor = %sensor.id, error = %e, "Skipping resample");
                points
            }
        }
    }

    fn selected_sensors<'a>(&'a self, focus: Option<&'a str>) -> impl Iterator<Item = &'a Sensor> + 'a {
        self.catalog
            .iter()
            .filter(move |s| focus.is_none_or(|id| s.id == id))
    }
}
