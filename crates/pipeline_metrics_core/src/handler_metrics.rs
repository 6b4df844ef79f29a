// Self-observability for the event handler.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

use crate::event::EventKind;

#[cfg(test)]
#[path = "handler_metrics_tests.rs"]
mod tests;

pub const EVENTS_HANDLED_METRIC: &str = "pipeline_metrics_events_handled_total";
pub const HISTORY_PAGES_METRIC: &str = "pipeline_metrics_history_pages_fetched";
pub const OBSERVATIONS_METRIC: &str = "pipeline_metrics_observations_published_total";

/// Records how the handler itself is behaving.
///
/// Implementations must be thread-safe; one instance is shared by every
/// handler invocation.
pub trait HandlerMetrics: Send + Sync {
    /// Records that an event of the given kind was handled.
    fn record_event(&self, kind: EventKind);

    /// Records how many history pages one scan needed.
    fn record_history_pages(&self, pages: usize);

    /// Records how many observations were handed to the metrics service.
    fn record_observations(&self, count: usize);
}

/// Prometheus collector for handler activity.
///
/// # Metrics
/// - `pipeline_metrics_events_handled_total` (Counter, labelled by `kind`)
/// - `pipeline_metrics_history_pages_fetched` (Histogram)
/// - `pipeline_metrics_observations_published_total` (Counter)
pub struct PrometheusHandlerMetrics {
    events_handled: IntCounterVec,
    history_pages: Histogram,
    observations: IntCounter,
}

impl PrometheusHandlerMetrics {
    /// Creates the collectors and registers them with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a collector with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let events_handled = IntCounterVec::new(
            Opts::new(EVENTS_HANDLED_METRIC, "Execution events handled, by event kind"),
            &["kind"],
        )?;
        let history_pages = Histogram::with_opts(
            HistogramOpts::new(
                HISTORY_PAGES_METRIC,
                "History pages fetched to resolve one reference frame",
            )
            .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
        )?;
        let observations = IntCounter::with_opts(Opts::new(
            OBSERVATIONS_METRIC,
            "Metric observations sent to the metrics service",
        ))?;

        registry.register(Box::new(events_handled.clone()))?;
        registry.register(Box::new(history_pages.clone()))?;
        registry.register(Box::new(observations.clone()))?;

        Ok(Self {
            events_handled,
            history_pages,
            observations,
        })
    }
}

impl HandlerMetrics for PrometheusHandlerMetrics {
    fn record_event(&self, kind: EventKind) {
        self.events_handled.with_label_values(&[kind.as_str()]).inc();
    }

    fn record_history_pages(&self, pages: usize) {
        self.history_pages.observe(pages as f64);
    }

    fn record_observations(&self, count: usize) {
        self.observations.inc_by(count as u64);
    }
}

/// Metrics implementation used when self-observability is disabled.
pub struct NoOpHandlerMetrics;

impl NoOpHandlerMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpHandlerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerMetrics for NoOpHandlerMetrics {
    fn record_event(&self, _kind: EventKind) {}
    fn record_history_pages(&self, _pages: usize) {}
    fn record_observations(&self, _count: usize) {}
}

/// Renders every metric in `registry` in the Prometheus text exposition format.
pub fn render_text(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    prometheus::TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
