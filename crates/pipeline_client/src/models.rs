//! # Models
//!
//! Wire models exchanged with the orchestration service (execution history)
//! and the metrics service (metric data, metric listings and dashboards).
//!
//! Field names follow the services' camelCase JSON. Status strings are kept
//! as-is; interpreting them is left to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Summary of one pipeline execution as reported by the orchestration service.
///
/// Degraded history rows may lack any of the optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecutionSummary {
    /// The unique ID of the execution
    pub pipeline_execution_id: String,

    /// Execution status, e.g. `Succeeded`, `Failed`, `InProgress`, `Stopped`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// When the execution started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// When the execution last changed state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,
}

/// One page of execution history, newest execution first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPipelineExecutionsResponse {
    /// Executions on this page
    #[serde(default)]
    pub pipeline_execution_summaries: Vec<PipelineExecutionSummary>,

    /// Token for the next (older) page, absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// A name/value pair qualifying a metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single metric data point sent to the metrics service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDatum {
    pub metric_name: String,
    pub unit: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

/// Request body for a batched metric data write.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutMetricDataRequest {
    pub namespace: String,
    pub metric_data: Vec<MetricDatum>,
}

/// A metric known to the metrics service, identified by name and dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl MetricDescriptor {
    /// Returns the value of the named dimension, if present.
    pub fn dimension_value(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// One page of a metric listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetricsResponse {
    #[serde(default)]
    pub metrics: Vec<MetricDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Request body for creating or replacing a dashboard.
///
/// The dashboard document travels as a serialized JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutDashboardRequest {
    pub dashboard_body: String,
}
