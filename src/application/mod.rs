// Application layer - Use cases over the telemetry repository
pub mod dashboard_service;
pub mod telemetry_repository;
