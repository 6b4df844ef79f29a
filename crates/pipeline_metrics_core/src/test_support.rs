//! Hand-written collaborator mocks shared by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pipeline_client::models::{
    Dimension, ListMetricsResponse, ListPipelineExecutionsResponse, MetricDatum,
    MetricDescriptor, PipelineExecutionSummary,
};
use pipeline_client::{Error, MetricsClient, PipelineHistoryClient};
use std::sync::Mutex;

pub fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

pub fn summary(
    id: &str,
    status: &str,
    start: Option<i64>,
    end: Option<i64>,
) -> PipelineExecutionSummary {
    PipelineExecutionSummary {
        pipeline_execution_id: id.to_string(),
        status: Some(status.to_string()),
        start_time: start.map(at),
        last_update_time: end.map(at),
    }
}

pub fn page(
    summaries: Vec<PipelineExecutionSummary>,
    next_token: Option<&str>,
) -> ListPipelineExecutionsResponse {
    ListPipelineExecutionsResponse {
        pipeline_execution_summaries: summaries,
        next_token: next_token.map(str::to_string),
    }
}

/// Serves pre-built history pages in order and records every request.
pub struct MockHistoryClient {
    pages: Vec<ListPipelineExecutionsResponse>,
    fail: bool,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl MockHistoryClient {
    pub fn with_pages(pages: Vec<ListPipelineExecutionsResponse>) -> Self {
        Self {
            pages,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            pages: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PipelineHistoryClient for MockHistoryClient {
    async fn list_pipeline_executions(
        &self,
        pipeline_name: &str,
        next_token: Option<&str>,
    ) -> Result<ListPipelineExecutionsResponse, Error> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((pipeline_name.to_string(), next_token.map(str::to_string)));
            calls.len() - 1
        };

        if self.fail {
            return Err(Error::UnexpectedStatus {
                status: 500,
                body: "history unavailable".to_string(),
            });
        }

        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Records metric writes and dashboards, and serves metric listings.
#[derive(Default)]
pub struct MockMetricsClient {
    listing: Vec<ListMetricsResponse>,
    fail_writes: bool,
    pub put_calls: Mutex<Vec<(String, Vec<MetricDatum>)>>,
    pub list_calls: Mutex<Vec<Option<String>>>,
    pub dashboards: Mutex<Vec<(String, String)>>,
}

impl MockMetricsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn with_listing(listing: Vec<ListMetricsResponse>) -> Self {
        Self {
            listing,
            ..Self::default()
        }
    }

    pub fn put_calls(&self) -> Vec<(String, Vec<MetricDatum>)> {
        self.put_calls.lock().unwrap().clone()
    }

    pub fn dashboards(&self) -> Vec<(String, String)> {
        self.dashboards.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsClient for MockMetricsClient {
    async fn put_metric_data(&self, namespace: &str, data: &[MetricDatum]) -> Result<(), Error> {
        self.put_calls
            .lock()
            .unwrap()
            .push((namespace.to_string(), data.to_vec()));
        if self.fail_writes {
            return Err(Error::RateLimitExceeded);
        }
        Ok(())
    }

    async fn list_metrics(
        &self,
        _namespace: &str,
        next_token: Option<&str>,
    ) -> Result<ListMetricsResponse, Error> {
        let index = {
            let mut calls = self.list_calls.lock().unwrap();
            calls.push(next_token.map(str::to_string));
            calls.len() - 1
        };
        Ok(self.listing.get(index).cloned().unwrap_or_default())
    }

    async fn put_dashboard(
        &self,
        dashboard_name: &str,
        dashboard_body: &str,
    ) -> Result<(), Error> {
        self.dashboards
            .lock()
            .unwrap()
            .push((dashboard_name.to_string(), dashboard_body.to_string()));
        if self.fail_writes {
            return Err(Error::RateLimitExceeded);
        }
        Ok(())
    }
}

pub fn pipeline_metric(metric_name: &str, pipeline: &str) -> MetricDescriptor {
    MetricDescriptor {
        namespace: Some("Pipeline".to_string()),
        metric_name: metric_name.to_string(),
        dimensions: vec![Dimension::new("PipelineName", pipeline)],
    }
}
