//! Error types for the orchestration and metrics service clients.
//!
//! Every failure a collaborator call can produce is represented here. The
//! metrics engine passes these through untouched, so the variants carry
//! enough context to be useful in the invocation's final error report.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while talking to the orchestration or metrics services.
///
/// ## Examples
///
/// ```rust,ignore
/// use pipeline_client::Error;
///
/// match client.list_pipeline_executions("my-pipeline", None).await {
///     Ok(page) => println!("{} executions", page.pipeline_execution_summaries.len()),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying HTTP transport failed (connection refused, TLS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be used to build endpoint paths.
    ///
    /// This happens for URLs like `mailto:` or `data:` which cannot carry
    /// path segments.
    #[error("Base URL cannot be used for service endpoints: {0}")]
    InvalidBaseUrl(String),

    /// The base URL could not be parsed.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Error deserializing the response from the service.
    #[error("Failed to deserialize service response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The requested resource was not found.
    ///
    /// For execution history this usually means the pipeline does not exist
    /// in the orchestration service.
    #[error("Resource not found")]
    NotFound,

    /// The service throttled the request.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The service answered with a status code the client does not handle.
    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body, as text, for diagnostics
        body: String,
    },
}
