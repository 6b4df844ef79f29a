use pipeline_client::MetricsClient;
use pipeline_metrics_core::{publish_dashboard, DashboardDocument, DashboardKind, DashboardLimits};
use tracing::instrument;

use crate::config::AppConfig;
use crate::errors::Error;

#[cfg(test)]
#[path = "dashboard_cmd_tests.rs"]
mod tests;

/// Execute the generate-dashboard and generate-dashboard-trend commands
#[instrument(skip(config))]
pub async fn execute(config: &AppConfig, kind: DashboardKind) -> Result<(), Error> {
    let client = config.metrics.connect()?;

    let document = generate(
        &client,
        kind,
        &config.region,
        &config.namespace,
        &config.dashboard.limits(),
    )
    .await?;

    println!(
        "Dashboard {} published with {} widgets",
        kind.dashboard_name(&config.region),
        document.widgets.len()
    );
    Ok(())
}

pub(crate) async fn generate(
    client: &dyn MetricsClient,
    kind: DashboardKind,
    region: &str,
    namespace: &str,
    limits: &DashboardLimits,
) -> Result<DashboardDocument, Error> {
    Ok(publish_dashboard(client, kind, region, namespace, limits).await?)
}
