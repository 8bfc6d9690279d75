// Dashboard domain model - The display-ready bundle handed to the front end
use super::sensor::Sensor;
use super::telemetry::{format_timestamp, TimeSeriesPoint};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
}

impl SensorStats {
    /// Stats reported for a sensor without a single valid sample.
    pub fn empty() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            current: None,
        }
    }

    /// Summarizes an ordered series; `None` when it has no samples.
    pub fn from_points(points: &[TimeSeriesPoint]) -> Option<Self> {
        let current = points.last()?.value;
        let (min, max, sum) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), p| (min.min(p.value), max.max(p.value), sum + p.value),
        );
        Some(Self {
            min,
            max,
            mean: sum / points.len() as f64,
            current: Some(current),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub timestamps: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn new(sensor: &Sensor, points: &[TimeSeriesPoint]) -> Self {
        Self {
            name: sensor.name.clone(),
            unit: sensor.unit.clone(),
            timestamps: points.iter().map(|p| format_timestamp(&p.time)).collect(),
            values: points.iter().map(|p| p.value).collect(),
        }
    }
}

/// Everything a chart front end needs for one request. Maps are ordered so
/// identical inputs serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardBundle {
    pub stats: BTreeMap<String, SensorStats>,
    pub chart_data: BTreeMap<String, ChartSeries>,
    pub data_available: bool,
    pub last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardBundle {
    pub fn available(last_update: Option<NaiveDateTime>) -> Self {
        Self {
            stats: BTreeMap::new(),
            chart_data: BTreeMap::new(),
            data_available: true,
            last_update: last_update.as_ref().map(format_timestamp),
            error: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            stats: BTreeMap::new(),
            chart_data: BTreeMap::new(),
            data_available: false,
            last_update: None,
            error: Some(message.into()),
        }
    }

    pub fn insert_empty(&mut self, sensor: &Sensor) {
        self.stats.insert(sensor.id.clone(), SensorStats::empty());
    }

    pub fn insert(&mut self, sensor: &Sensor, stats: SensorStats, series: ChartSeries) {
        self.stats.insert(sensor.id.clone(), stats);
        self.chart_data.insert(sensor.id.clone(), series);
    }
}
