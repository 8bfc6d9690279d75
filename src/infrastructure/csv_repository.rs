// CSV repository implementation - Reads the whole telemetry file per request
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{parse_reading, parse_timestamp, TelemetryFrame, TelemetryRecord};
use async_trait::async_trait;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

const TIMESTAMP_COLUMN: &str = "timestamp";

#[derive(Debug, Clone)]
pub struct CsvRepository {
    path: PathBuf,
}

impl CsvRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_frame(path: PathBuf, sensor_ids: Vec<String>) -> Result<TelemetryFrame, TelemetryError> {
        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => TelemetryError::NotFound(path.clone()),
            _ => TelemetryError::Io {
                path: path.clone(),
                source,
            },
        })?;
        parse_frame(file, &sensor_ids)
    }
}

#[async_trait]
impl TelemetryRepository for CsvRepository {
    async fn load_frame(&self, sensor_ids: &[String]) -> Result<TelemetryFrame, TelemetryError> {
        let path = self.path.clone();
        let sensor_ids = sensor_ids.to_vec();
        tokio::task::spawn_blocking(move || Self::read_frame(path, sensor_ids))
            .await
            .map_err(reader_task_failed)?
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn reader_task_failed(err: tokio::task::JoinError) -> TelemetryError {
    tracing::error!(error = %err, "CSV reader task did not complete");
    TelemetryError::Reader(err.to_string())
}

/// Parse wide-form telemetry CSV.
///
/// The header must contain `timestamp`; of the remaining columns only those
/// named in `sensor_ids` are kept. A cell that is not a finite number is
/// missing for that sensor alone. Rows with a blank timestamp are skipped,
/// while a timestamp that cannot be parsed rejects the whole file.
pub fn parse_frame<R: Read>(reader: R, sensor_ids: &[String]) -> Result<TelemetryFrame, TelemetryError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| TelemetryError::Malformed(format!("failed to read header: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(TelemetryError::Empty);
    }

    let timestamp_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or(TelemetryError::MissingTimestamp)?;

    // Known sensors present in the header, in catalog order.
    let columns: Vec<(String, usize)> = sensor_ids
        .iter()
        .filter_map(|id| {
            headers
                .iter()
                .position(|h| h == id.as_str())
                .map(|idx| (id.clone(), idx))
        })
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based
        let line = idx + 2;
        let record = result.map_err(|e| TelemetryError::Malformed(format!("line {line}: {e}")))?;

        let raw_timestamp = record.get(timestamp_idx).unwrap_or("");
        if raw_timestamp.is_empty() {
            skipped += 1;
            continue;
        }
        let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| TelemetryError::InvalidTimestamp {
            line,
            value: raw_timestamp.to_string(),
        })?;

        let readings = columns
            .iter()
            .map(|(_, col)| record.get(*col).and_then(parse_reading))
            .collect();
        records.push(TelemetryRecord::new(timestamp, readings));
    }

    if records.is_empty() {
        return Err(TelemetryError::Empty);
    }
    if skipped > 0 {
        tracing::debug!(skipped, "Skipped rows without timestamp");
    }

    let sensor_columns = columns.into_iter().map(|(id, _)| id).collect();
    Ok(TelemetryFrame::new(sensor_columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sensors() -> Vec<String> {
        ["pressure", "temperature", "humidity", "env_pressure"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn values(frame: &TelemetryFrame, sensor: &str) -> Vec<f64> {
        frame
            .sensor_points(sensor)
            .unwrap()
            .into_iter()
            .map(|p| p.value)
            .collect()
    }

    #[test]
    fn test_parse_keeps_known_columns_only() {
        let csv = "timestamp,pumpRunning,pressure,outputValveOpen,humidity,extra\n\
                   2024-01-01 00:00:00,True,1.2,False,40,x\n";
        let frame = parse_frame(csv.as_bytes(), &sensors()).unwrap();

        assert_eq!(frame.sensor_ids(), &["pressure".to_string(), "humidity".to_string()]);
        assert_eq!(values(&frame, "pressure"), vec![1.2]);
        assert_eq!(values(&frame, "humidity"), vec![40.0]);
        assert!(frame.sensor_points("temperature").is_none());
    }

    #[test]
    fn test_non_numeric_cell_invalidates_only_that_cell() {
        let csv = "timestamp,pressure,temperature\n\
                   2024-01-01T00:00:00,oops,21.5\n\
                   2024-01-01T00:01:00,1.0,\n";
        let frame = parse_frame(csv.as_bytes(), &sensors()).unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(values(&frame, "pressure"), vec![1.0]);
        assert_eq!(values(&frame, "temperature"), vec![21.5]);
    }

    #[test]
    fn test_rows_are_sorted() {
        let csv = "timestamp,pressure\n\
                   2024-01-01T00:05:00,3\n\
                   2024-01-01T00:00:00,1\n\
                   2024-01-01T00:05:00,4\n";
        let frame = parse_frame(csv.as_bytes(), &sensors()).unwrap();
        assert_eq!(values(&frame, "pressure"), vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_short_rows_are_missing_values() {
        let csv = "timestamp,pressure,humidity\n\
                   2024-01-01T00:00:00,1\n";
        let frame = parse_frame(csv.as_bytes(), &sensors()).unwrap();
        assert_eq!(values(&frame, "pressure"), vec![1.0]);
        assert!(values(&frame, "humidity").is_empty());
    }

    #[test]
    fn test_blank_timestamp_rows_are_skipped() {
        let csv = "timestamp,pressure\n,9\n2024-01-01T00:00:00,1\n";
        let frame = parse_frame(csv.as_bytes(), &sensors()).unwrap();
        assert_eq!(values(&frame, "pressure"), vec![1.0]);
    }

    #[test]
    fn test_schema_errors() {
        let no_timestamp = "time,pressure\n2024-01-01T00:00:00,1\n";
        assert!(matches!(
            parse_frame(no_timestamp.as_bytes(), &sensors()),
            Err(TelemetryError::MissingTimestamp)
        ));

        let bad_timestamp = "timestamp,pressure\n2024-01-01T00:00:00,1\nlater,2\n";
        assert!(matches!(
            parse_frame(bad_timestamp.as_bytes(), &sensors()),
            Err(TelemetryError::InvalidTimestamp { line: 3, .. })
        ));

        assert!(matches!(parse_frame("".as_bytes(), &sensors()), Err(TelemetryError::Empty)));
        assert!(matches!(
            parse_frame("timestamp,pressure\n".as_bytes(), &sensors()),
            Err(TelemetryError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("telemetry-missing-{unique}.csv"));
        let repository = CsvRepository::new(path);

        let result = repository.load_frame(&sensors()).await;
        assert!(matches!(result, Err(TelemetryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_panicked_reader_task_is_not_a_csv_error() {
        let handle: tokio::task::JoinHandle<()> =
            tokio::task::spawn_blocking(|| panic!("reader crashed"));
        let err = handle.await.map_err(reader_task_failed).unwrap_err();

        assert!(matches!(err, TelemetryError::Reader(_)));
        assert!(err.to_string().starts_with("telemetry reader task failed"));
    }

    #[tokio::test]
    async fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("telemetry-{unique}.csv"));
        fs::write(
            &path,
            "timestamp,pressure,env_pressure\n2024-01-01T00:00:00,1.5,1013.2\n",
        )?;

        let repository = CsvRepository::new(path.clone());
        let result = repository.load_frame(&sensors()).await;
        let _ = fs::remove_file(&path);

        let frame = result?;
        assert_eq!(values(&frame, "env_pressure"), vec![1013.2]);
        assert_eq!(repository.describe(), path.display().to_string());
        Ok(())
    }
}
