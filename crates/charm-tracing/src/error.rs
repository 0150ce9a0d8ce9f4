use opentelemetry_sdk::error::OTelSdkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharmTracingError {
    #[error("Invalid tracing endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to build span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("Failed to flush charm traces: {0}")]
    Flush(#[source] OTelSdkError),

    #[error("Failed to shut down charm tracing: {0}")]
    Shutdown(#[source] OTelSdkError),
}
