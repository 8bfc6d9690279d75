// Telemetry data domain models
use super::window::DateWindow;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        Self { time, value }
    }
}

/// One CSV row. `readings` is index-aligned with the owning frame's sensor ids.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub timestamp: NaiveDateTime,
    pub readings: Vec<Option<f64>>,
}

impl TelemetryRecord {
    pub fn new(timestamp: NaiveDateTime, readings: Vec<Option<f64>>) -> Self {
        Self {
            timestamp,
            readings,
        }
    }
}

/// Wide-form telemetry: the sensor columns present in the source plus rows
/// sorted by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    sensor_ids: Vec<String>,
    records: Vec<TelemetryRecord>,
}

impl TelemetryFrame {
    /// Rows are sorted by timestamp; rows sharing a timestamp keep their
    /// original relative order.
    pub fn new(sensor_ids: Vec<String>, mut records: Vec<TelemetryRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self {
            sensor_ids,
            records,
        }
    }

    pub fn sensor_ids(&self) -> &[String] {
        &self.sensor_ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn within(self, window: &DateWindow) -> Self {
        let records = self
            .records
            .into_iter()
            .filter(|r| window.contains(&r.timestamp))
            .collect();
        Self {
            sensor_ids: self.sensor_ids,
            records,
        }
    }

    /// Latest timestamp across all rows, regardless of which sensors are set.
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.timestamp)
    }

    /// Valid samples of one sensor in timestamp order, or `None` when the
    /// source has no column for it.
    pub fn sensor_points(&self, sensor_id: &str) -> Option<Vec<TimeSeriesPoint>> {
        let idx = self.column_index(sensor_id)?;
        Some(
            self.records
                .iter()
                .filter_map(|r| {
                    r.readings
                        .get(idx)
                        .copied()
                        .flatten()
                        .map(|value| TimeSeriesPoint::new(r.timestamp, value))
                })
                .collect(),
        )
    }

    fn column_index(&self, sensor_id: &str) -> Option<usize> {
        self.sensor_ids.iter().position(|id| id == sensor_id)
    }
}

/// Parses the timestamp formats found in telemetry exports. Offsets are
/// normalized to UTC and dropped.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerces a cell to a reading. Blank, non-numeric and non-finite cells are
/// missing.
pub fn parse_reading(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(DISPLAY_FORMAT).to_string()
}
