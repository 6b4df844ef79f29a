//! Delivery of derived observations to the metrics service.

use pipeline_client::models::MetricDatum;
use pipeline_client::MetricsClient;
use tracing::{debug, info, instrument};

use crate::errors::MetricsResult;
use crate::metric_deriver::MetricObservation;

#[cfg(test)]
#[path = "metric_sink_tests.rs"]
mod tests;

/// Namespace observations are written under unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "Pipeline";

/// Writes `observations` to `namespace` as one batch.
///
/// Nothing is sent when the list is empty.
///
/// # Errors
///
/// Returns the metrics client failure unchanged. Nothing is retried.
#[instrument(skip(client, observations), fields(count = observations.len()))]
pub async fn publish_observations(
    client: &dyn MetricsClient,
    namespace: &str,
    observations: &[MetricObservation],
) -> MetricsResult<()> {
    if observations.is_empty() {
        debug!("No observations to publish");
        return Ok(());
    }

    let data: Vec<MetricDatum> = observations.iter().map(MetricObservation::to_datum).collect();
    client.put_metric_data(namespace, &data).await?;

    info!(namespace = namespace, count = data.len(), "Published metric observations");
    Ok(())
}
