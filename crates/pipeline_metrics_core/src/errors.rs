//! Error types for the metrics engine.
//!
//! Missing or ambiguous history data is never an error: the deriver omits the
//! affected metrics instead. What remains are collaborator failures, which
//! are passed through without translation, and local serialization and
//! registry failures.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors produced while handling an event or publishing a dashboard.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A call to the orchestration or metrics service failed.
    #[error(transparent)]
    Client(#[from] pipeline_client::Error),

    /// A dashboard document could not be serialized.
    #[error("Failed to serialize dashboard document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Handler self-metrics could not be registered or encoded.
    #[error("Handler metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),
}

/// Result type alias used throughout the metrics engine.
pub type MetricsResult<T> = Result<T, MetricsError>;
