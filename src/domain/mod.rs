// Domain layer - Telemetry models and the pure processing steps
pub mod dashboard;
pub mod error;
pub mod sensor;
pub mod series;
pub mod telemetry;
pub mod window;
