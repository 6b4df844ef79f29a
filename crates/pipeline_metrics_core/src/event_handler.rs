//! Orchestration of a single execution event.
//!
//! A whole-pipeline event in a terminal state triggers a history scan to
//! resolve its reference frame. Stage and action events are counted directly.
//! The derived observations are then written to the metrics service in one
//! batch.

use pipeline_client::{MetricsClient, PipelineHistoryClient};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::errors::MetricsResult;
use crate::event::{EventKind, PipelineEvent};
use crate::handler_metrics::{HandlerMetrics, NoOpHandlerMetrics};
use crate::history_scanner::HistoryScanner;
use crate::metric_deriver::{derive_metrics, MetricObservation};
use crate::metric_sink::{publish_observations, DEFAULT_NAMESPACE};
use crate::reference_frame::ReferenceFrame;

#[cfg(test)]
#[path = "event_handler_tests.rs"]
mod tests;

/// Turns execution events into published delivery metrics.
pub struct PipelineEventHandler {
    history: Arc<dyn PipelineHistoryClient>,
    metrics: Arc<dyn MetricsClient>,
    handler_metrics: Arc<dyn HandlerMetrics>,
    namespace: String,
}

impl PipelineEventHandler {
    pub fn new(history: Arc<dyn PipelineHistoryClient>, metrics: Arc<dyn MetricsClient>) -> Self {
        Self {
            history,
            metrics,
            handler_metrics: Arc::new(NoOpHandlerMetrics::new()),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Uses `namespace` for every metric write.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_handler_metrics(mut self, handler_metrics: Arc<dyn HandlerMetrics>) -> Self {
        self.handler_metrics = handler_metrics;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Handles one event and returns the observations that were published.
    ///
    /// Events that produce no observations are not an error; the returned
    /// list is simply empty and the metrics service is not called.
    ///
    /// # Errors
    ///
    /// A failure of either collaborator is returned unchanged. When history
    /// cannot be fetched nothing is published.
    #[instrument(skip(self, event), fields(kind = event.kind().as_str(), state = ?event.detail.state))]
    pub async fn handle(&self, event: &PipelineEvent) -> MetricsResult<Vec<MetricObservation>> {
        let kind = event.kind();
        self.handler_metrics.record_event(kind);

        // Step 1: Resolve the reference frame for terminal whole-pipeline events
        let frame = self.resolve_frame(event).await?;

        // Step 2: Derive observations
        let observations = derive_metrics(event, frame.as_ref());
        if observations.is_empty() {
            debug!("Event produced no observations");
            return Ok(observations);
        }

        // Step 3: Publish as a single batch
        publish_observations(self.metrics.as_ref(), &self.namespace, &observations).await?;
        self.handler_metrics.record_observations(observations.len());

        info!(
            pipeline = ?event.detail.pipeline,
            execution_id = ?event.detail.execution_id,
            count = observations.len(),
            "Handled pipeline event"
        );

        Ok(observations)
    }

    async fn resolve_frame(&self, event: &PipelineEvent) -> MetricsResult<Option<ReferenceFrame>> {
        if event.kind() != EventKind::Pipeline || !event.state().is_terminal() {
            return Ok(None);
        }

        let Some((pipeline_name, execution_id)) = event.execution_target() else {
            debug!("Pipeline event has no pipeline name or execution id, skipping history scan");
            return Ok(None);
        };

        let outcome = HistoryScanner::new(self.history.as_ref())
            .scan(pipeline_name, execution_id)
            .await?;
        self.handler_metrics.record_history_pages(outcome.pages_fetched);

        Ok(Some(outcome.frame))
    }
}
