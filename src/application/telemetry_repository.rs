// Repository trait for telemetry data access
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::TelemetryFrame;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Load the full dataset, keeping only the columns of `sensor_ids` that
    /// exist in the source. Rows come back sorted by timestamp.
    async fn load_frame(&self, sensor_ids: &[String]) -> Result<TelemetryFrame, TelemetryError>;

    /// Human-readable description of where the data comes from, for logs.
    fn describe(&self) -> String;
}
