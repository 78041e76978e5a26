use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Errors surfaced while setting up the aggregator.
///
/// Collection cycles never fail; per-connection problems are reported as
/// [`ParseError`](crate::stats::ParseError) or
/// [`ProbeError`](crate::stats::ProbeError) and only omit that connection.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

pub type Result<T> = std::result::Result<T, AppError>;
