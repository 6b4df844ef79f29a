//! Crate for interacting with the pipeline orchestration and metrics services.
//!
//! Two collaborator seams are defined here:
//!
//! - [`PipelineHistoryClient`] reads paginated execution history for a pipeline.
//! - [`MetricsClient`] writes metric data, lists known metrics and publishes
//!   dashboards.
//!
//! [`ServiceClient`] implements both over HTTP+JSON. Construct one instance per
//! service endpoint.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod models;
use models::{
    ListMetricsResponse, ListPipelineExecutionsResponse, MetricDatum, PutDashboardRequest,
    PutMetricDataRequest,
};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Trait for reading execution history from the orchestration service.
#[async_trait]
pub trait PipelineHistoryClient: Send + Sync {
    /// Lists one page of executions for a pipeline, newest first.
    ///
    /// # Arguments
    ///
    /// * `pipeline_name` - The name of the pipeline.
    /// * `next_token` - Continuation token from the previous page, `None` for the first page.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the pipeline does not exist and any
    /// transport or decoding error otherwise.
    async fn list_pipeline_executions(
        &self,
        pipeline_name: &str,
        next_token: Option<&str>,
    ) -> Result<ListPipelineExecutionsResponse, Error>;
}

/// Trait for the metrics service: metric writes, metric listing and dashboards.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Writes a batch of metric data points to a namespace in a single call.
    async fn put_metric_data(&self, namespace: &str, data: &[MetricDatum]) -> Result<(), Error>;

    /// Lists one page of the metrics recorded in a namespace.
    async fn list_metrics(
        &self,
        namespace: &str,
        next_token: Option<&str>,
    ) -> Result<ListMetricsResponse, Error>;

    /// Creates or replaces a dashboard.
    ///
    /// # Arguments
    ///
    /// * `dashboard_name` - The name of the dashboard.
    /// * `dashboard_body` - The dashboard document, serialized as JSON.
    async fn put_dashboard(&self, dashboard_name: &str, dashboard_body: &str)
        -> Result<(), Error>;
}

/// An HTTP client for one service endpoint.
///
/// Requests are authenticated with a bearer token when one is supplied.
#[derive(Debug)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl ServiceClient {
    /// Creates a new client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the URL cannot be parsed and
    /// `Error::InvalidBaseUrl` if it cannot carry path segments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pipeline_client::ServiceClient;
    ///
    /// let client = ServiceClient::new("https://pipelines.example.com/api/", None).unwrap();
    /// assert_eq!(client.base_url().as_str(), "https://pipelines.example.com/api/");
    /// ```
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<String, Error> {
        let response = self.authorize(request).send().await.map_err(|e| {
            let err = Error::from(e);
            log_request_error(operation, &err);
            err
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let err = Error::from(e);
            log_request_error(operation, &err);
            err
        })?;

        let result = match status {
            s if s.is_success() => return Ok(body),
            StatusCode::NOT_FOUND => Error::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded,
            s => Error::UnexpectedStatus {
                status: s.as_u16(),
                body,
            },
        };

        log_request_error(operation, &result);
        Err(result)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, Error> {
        let body = self.send(request, operation).await?;
        serde_json::from_str(&body).map_err(|e| {
            let err = Error::from(e);
            log_request_error(operation, &err);
            err
        })
    }
}

#[async_trait]
impl PipelineHistoryClient for ServiceClient {
    #[instrument(skip(self), fields(pipeline = %pipeline_name))]
    async fn list_pipeline_executions(
        &self,
        pipeline_name: &str,
        next_token: Option<&str>,
    ) -> Result<ListPipelineExecutionsResponse, Error> {
        let url = self.endpoint(&["pipelines", pipeline_name, "executions"])?;
        debug!(url = %url, has_token = next_token.is_some(), "Listing pipeline executions");

        let mut request = self.http.get(url);
        if let Some(token) = next_token {
            request = request.query(&[("nextToken", token)]);
        }

        let page: ListPipelineExecutionsResponse = self
            .send_json(request, "Failed to list pipeline executions")
            .await?;

        debug!(
            count = page.pipeline_execution_summaries.len(),
            more = page.next_token.is_some(),
            "Received execution history page"
        );
        Ok(page)
    }
}

#[async_trait]
impl MetricsClient for ServiceClient {
    #[instrument(skip(self, data), fields(namespace = %namespace, count = data.len()))]
    async fn put_metric_data(&self, namespace: &str, data: &[MetricDatum]) -> Result<(), Error> {
        let url = self.endpoint(&["namespaces", namespace, "metric-data"])?;
        let payload = PutMetricDataRequest {
            namespace: namespace.to_string(),
            metric_data: data.to_vec(),
        };

        self.send(
            self.http.post(url).json(&payload),
            "Failed to put metric data",
        )
        .await?;

        info!(count = data.len(), "Delivered metric data");
        Ok(())
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    async fn list_metrics(
        &self,
        namespace: &str,
        next_token: Option<&str>,
    ) -> Result<ListMetricsResponse, Error> {
        let url = self.endpoint(&["namespaces", namespace, "metrics"])?;

        let mut request = self.http.get(url);
        if let Some(token) = next_token {
            request = request.query(&[("nextToken", token)]);
        }

        self.send_json(request, "Failed to list metrics").await
    }

    #[instrument(skip(self, dashboard_body), fields(dashboard = %dashboard_name))]
    async fn put_dashboard(
        &self,
        dashboard_name: &str,
        dashboard_body: &str,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["dashboards", dashboard_name])?;
        let payload = PutDashboardRequest {
            dashboard_body: dashboard_body.to_string(),
        };

        self.send(self.http.put(url).json(&payload), "Failed to put dashboard")
            .await?;

        info!(dashboard = dashboard_name, "Published dashboard");
        Ok(())
    }
}

fn log_request_error(message: &str, e: &Error) {
    match e {
        Error::Http(source) => error!(
            error_message = source.to_string(),
            is_timeout = source.is_timeout(),
            is_connect = source.is_connect(),
            "{}. The request could not be completed.",
            message
        ),
        Error::UnexpectedStatus { status, body } => error!(
            status = status,
            error_message = body.as_str(),
            "{}. Received an error from the service",
            message
        ),
        Error::Deserialization(source) => error!(
            error_message = source.to_string(),
            "{}. The response could not be parsed.",
            message
        ),
        _ => error!(error_message = e.to_string(), "{}", message),
    };
}
