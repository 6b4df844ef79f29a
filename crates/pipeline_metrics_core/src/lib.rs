//! # Pipeline Metrics Core
//!
//! This crate turns pipeline execution state-change events into delivery
//! metrics, and builds dashboards from the metrics already recorded.
//!
//! ## Overview
//!
//! Handling one event works in four steps:
//! 1. Classify the event ([`PipelineEvent::kind`], [`PipelineEvent::state`])
//! 2. For a terminal whole-pipeline event, scan execution history newest
//!    first ([`HistoryScanner`]) until the [`ReferenceFrame`] is final
//! 3. Derive observations from the event and the frame ([`derive_metrics`])
//! 4. Write the observations to the metrics service in one batch
//!    ([`publish_observations`])
//!
//! [`PipelineEventHandler`] wires these steps together.
//!
//! ## Metrics
//!
//! | Metric | Meaning |
//! |---|---|
//! | `SuccessCount` / `FailureCount` | one per terminal event |
//! | `RedTime` | how long the pipeline was failing before this success |
//! | `GreenTime` | how long the pipeline was passing before this failure |
//! | `SuccessCycleTime` | time between two consecutive successes |
//! | `SuccessLeadTime` / `FailureLeadTime` | duration of this execution |
//! | `DeliveryLeadTime` | first execution after the previous success until this success |
//!
//! ## Architecture
//!
//! Collaborators are injected as trait objects from `pipeline_client`:
//! - [`pipeline_client::PipelineHistoryClient`] for execution history
//! - [`pipeline_client::MetricsClient`] for metric writes, metric listing and dashboards
//!
//! The fold and the deriver are synchronous and free of side effects; only
//! the collaborator calls are async.
//!
//! ## Examples
//!
//! ```no_run
//! use pipeline_client::ServiceClient;
//! use pipeline_metrics_core::{PipelineEvent, PipelineEventHandler};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let history = Arc::new(ServiceClient::new("https://pipelines.example.com/", None)?);
//! let metrics = Arc::new(ServiceClient::new("https://metrics.example.com/", None)?);
//! let handler = PipelineEventHandler::new(history, metrics);
//!
//! let event: PipelineEvent = serde_json::from_str(r#"{
//!     "time": "2017-04-22T03:16:47Z",
//!     "detail-type": "CodePipeline Pipeline Execution State Change",
//!     "detail": { "pipeline": "my-pipeline", "execution-id": "xxx", "state": "SUCCEEDED" }
//! }"#)?;
//!
//! let observations = handler.handle(&event).await?;
//! println!("Published {} observations", observations.len());
//! # Ok(())
//! # }
//! ```

mod errors;
pub use errors::{MetricsError, MetricsResult};

/// Inbound execution events
pub mod event;

/// Terminal executions taken from history
pub mod execution;

pub mod reference_frame;

pub mod history_scanner;

pub mod metric_deriver;

pub mod metric_sink;

/// Self-observability of the handler
pub mod handler_metrics;

pub mod event_handler;

/// Summary and trend dashboards
pub mod dashboard;

#[cfg(test)]
mod test_support;

pub use dashboard::{
    collect_pipeline_names, publish_dashboard, render_summary_dashboard, render_trend_dashboard,
    DashboardDocument, DashboardKind, DashboardLimits,
};
pub use event::{EventDetail, EventKind, EventState, PipelineEvent};
pub use event_handler::PipelineEventHandler;
pub use execution::{Execution, ExecutionStatus};
pub use handler_metrics::{HandlerMetrics, NoOpHandlerMetrics, PrometheusHandlerMetrics};
pub use history_scanner::{ExecutionPages, HistoryScanner, ScanOutcome};
pub use metric_deriver::{derive_metrics, MetricName, MetricObservation, MetricUnit};
pub use metric_sink::{publish_observations, DEFAULT_NAMESPACE};
pub use reference_frame::{FoldState, ReferenceFrame};
