use std::io;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the pipeline metrics CLI.
///
/// Covers configuration problems, unreadable or malformed event input, and
/// failures reported by the metrics engine or its service clients.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading, validating or saving configuration.
    ///
    /// Returned for missing or unparsable configuration files, and for token
    /// environment variables that are named in the configuration but not set.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read an input file or standard input.
    #[error("Failed to load file: {0}")]
    LoadFile(io::Error),

    /// The event document is not valid JSON or lacks required fields.
    #[error("Failed to parse event: {0}")]
    ParseEvent(serde_json::Error),

    /// The metrics engine failed while handling an event or publishing a dashboard.
    #[error(transparent)]
    Core(#[from] pipeline_metrics_core::MetricsError),

    /// A service client could not be constructed.
    #[error(transparent)]
    Client(#[from] pipeline_client::Error),

    /// Handler self-metrics could not be written.
    #[error("Failed to export handler metrics: {0}")]
    MetricsExport(String),
}
