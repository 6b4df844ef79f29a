use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use pipeline_client::{MetricsClient, PipelineHistoryClient};
use pipeline_metrics_core::handler_metrics::render_text;
use pipeline_metrics_core::{
    MetricObservation, MetricsError, PipelineEvent, PipelineEventHandler,
    PrometheusHandlerMetrics,
};
use prometheus::Registry;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;
use crate::errors::Error;

#[cfg(test)]
#[path = "handle_event_cmd_tests.rs"]
mod tests;

/// Arguments for the handle-event command
#[derive(Args, Debug)]
pub struct HandleEventArgs {
    /// File holding the event JSON; standard input is read when omitted
    #[arg(short, long)]
    pub event: Option<PathBuf>,

    /// Write handler metrics in Prometheus text format to this file
    #[arg(long)]
    pub metrics_output: Option<PathBuf>,
}

/// Execute the handle-event command
#[instrument(skip(config))]
pub async fn execute(config: &AppConfig, args: &HandleEventArgs) -> Result<(), Error> {
    let raw = read_event_source(args.event.as_deref())?;
    let event = parse_event(&raw)?;

    let history: Arc<dyn PipelineHistoryClient> = Arc::new(config.history.connect()?);
    let metrics: Arc<dyn MetricsClient> = Arc::new(config.metrics.connect()?);

    let observations = handle_event(
        history,
        metrics,
        &config.namespace,
        &event,
        args.metrics_output.as_deref(),
    )
    .await?;

    println!("Published {} metric observations", observations.len());
    Ok(())
}

/// Runs the handler for one event with the given collaborators.
///
/// Handler metrics are written to `metrics_output` whether or not handling
/// succeeded. A handling error takes precedence over a failed metrics write,
/// which is then only logged.
pub(crate) async fn handle_event(
    history: Arc<dyn PipelineHistoryClient>,
    metrics: Arc<dyn MetricsClient>,
    namespace: &str,
    event: &PipelineEvent,
    metrics_output: Option<&Path>,
) -> Result<Vec<MetricObservation>, Error> {
    let registry = Registry::new();
    let handler_metrics =
        Arc::new(PrometheusHandlerMetrics::new(&registry).map_err(MetricsError::from)?);

    let handler = PipelineEventHandler::new(history, metrics)
        .with_namespace(namespace)
        .with_handler_metrics(handler_metrics);

    let result = handler.handle(event).await;

    let export = match metrics_output {
        Some(path) => write_handler_metrics(&registry, path),
        None => Ok(()),
    };

    let observations = match result {
        Ok(observations) => observations,
        Err(e) => {
            if let Err(export_error) = export {
                warn!("Handler metrics not written: {}", export_error);
            }
            return Err(e.into());
        }
    };
    export?;

    info!(count = observations.len(), "Event handled");
    Ok(observations)
}

/// Reads the event document from `path`, or from standard input when `None`.
pub(crate) fn read_event_source(path: Option<&Path>) -> Result<String, Error> {
    match path {
        Some(path) => {
            debug!("Reading event from {:?}", path);
            fs::read_to_string(path).map_err(Error::LoadFile)
        }
        None => {
            debug!("Reading event from standard input");
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .map_err(Error::LoadFile)?;
            Ok(raw)
        }
    }
}

pub(crate) fn parse_event(raw: &str) -> Result<PipelineEvent, Error> {
    serde_json::from_str(raw).map_err(Error::ParseEvent)
}

fn write_handler_metrics(registry: &Registry, path: &Path) -> Result<(), Error> {
    let text = render_text(registry).map_err(|e| Error::MetricsExport(e.to_string()))?;
    fs::write(path, text).map_err(|e| Error::MetricsExport(e.to_string()))?;
    debug!("Handler metrics written to {:?}", path);
    Ok(())
}
