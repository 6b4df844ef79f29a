//! Derivation of metric observations from an event and its reference frame.
//!
//! The rules applied by [`derive_metrics`], each independently:
//!
//! | Metric | Emitted when | Value (seconds unless noted) |
//! |---|---|---|
//! | `SuccessCount` | event state is `SUCCEEDED` | 1 (count) |
//! | `FailureCount` | event state is `FAILED` | 1 (count) |
//! | `RedTime` | current succeeded, prior-state known | prior-state start → current start |
//! | `GreenTime` | current failed, prior-state known | prior-state start → current start |
//! | `SuccessCycleTime` | current succeeded, prior success known | prior success end → current end |
//! | `SuccessLeadTime` | current succeeded | current start → current end |
//! | `DeliveryLeadTime` | current succeeded, frame final, window start known | window start → current end |
//! | `FailureLeadTime` | current failed | current start → current end |
//!
//! A metric whose inputs are missing is skipped, and a metric whose value is
//! exactly zero is never emitted.

use chrono::{DateTime, Utc};
use pipeline_client::models::{Dimension, MetricDatum};
use std::fmt;

use crate::event::{EventKind, EventState, PipelineEvent};
use crate::execution::ExecutionStatus;
use crate::reference_frame::{optional_duration_seconds, ReferenceFrame};

#[cfg(test)]
#[path = "metric_deriver_tests.rs"]
mod tests;

/// Names of the metrics the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    SuccessCount,
    FailureCount,
    RedTime,
    GreenTime,
    SuccessCycleTime,
    SuccessLeadTime,
    DeliveryLeadTime,
    FailureLeadTime,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SuccessCount => "SuccessCount",
            MetricName::FailureCount => "FailureCount",
            MetricName::RedTime => "RedTime",
            MetricName::GreenTime => "GreenTime",
            MetricName::SuccessCycleTime => "SuccessCycleTime",
            MetricName::SuccessLeadTime => "SuccessLeadTime",
            MetricName::DeliveryLeadTime => "DeliveryLeadTime",
            MetricName::FailureLeadTime => "FailureLeadTime",
        }
    }

    pub fn unit(&self) -> MetricUnit {
        match self {
            MetricName::SuccessCount | MetricName::FailureCount => MetricUnit::Count,
            _ => MetricUnit::Seconds,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricUnit {
    Count,
    Seconds,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
            MetricUnit::Seconds => "Seconds",
        }
    }
}

/// A single named, timestamped and dimensioned metric value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricObservation {
    pub name: MetricName,
    pub unit: MetricUnit,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub dimensions: Vec<Dimension>,
}

impl MetricObservation {
    /// Converts the observation into the metrics service wire format.
    pub fn to_datum(&self) -> MetricDatum {
        MetricDatum {
            metric_name: self.name.as_str().to_string(),
            unit: self.unit.as_str().to_string(),
            value: self.value,
            timestamp: self.timestamp,
            dimensions: self.dimensions.clone(),
        }
    }
}

struct Observations {
    timestamp: DateTime<Utc>,
    dimensions: Vec<Dimension>,
    emitted: Vec<MetricObservation>,
}

impl Observations {
    fn push(&mut self, name: MetricName, value: i64) {
        if value == 0 {
            return;
        }

        self.emitted.push(MetricObservation {
            name,
            unit: name.unit(),
            value: value as f64,
            timestamp: self.timestamp,
            dimensions: self.dimensions.clone(),
        });
    }

    fn push_duration(&mut self, name: MetricName, seconds: Option<i64>) {
        if let Some(seconds) = seconds {
            self.push(name, seconds);
        }
    }
}

/// Computes the observations for an event.
///
/// `frame` is the resolved history frame for whole-pipeline events, or `None`
/// when no scan was run. Events of an unrecognized kind or with a
/// non-terminal state yield nothing.
pub fn derive_metrics(event: &PipelineEvent, frame: Option<&ReferenceFrame>) -> Vec<MetricObservation> {
    let mut observations = Observations {
        timestamp: event.time,
        dimensions: event.dimensions(),
        emitted: Vec::new(),
    };

    if event.kind() == EventKind::Unrecognized {
        return observations.emitted;
    }

    match event.state() {
        EventState::Succeeded => observations.push(MetricName::SuccessCount, 1),
        EventState::Failed => observations.push(MetricName::FailureCount, 1),
        EventState::Other => return observations.emitted,
    }

    let Some(frame) = frame else {
        return observations.emitted;
    };
    let Some(current) = frame.current_execution() else {
        return observations.emitted;
    };

    if let Some(prior_state) = frame.prior_state_execution() {
        let name = match current.status {
            ExecutionStatus::Succeeded => MetricName::RedTime,
            ExecutionStatus::Failed => MetricName::GreenTime,
        };
        observations.push_duration(
            name,
            optional_duration_seconds(prior_state.start_time, current.start_time),
        );
    }

    match current.status {
        ExecutionStatus::Succeeded => {
            if let Some(prior_success) = frame.prior_success_execution() {
                observations.push_duration(
                    MetricName::SuccessCycleTime,
                    optional_duration_seconds(
                        prior_success.last_update_time,
                        current.last_update_time,
                    ),
                );
            }

            observations.push_duration(
                MetricName::SuccessLeadTime,
                optional_duration_seconds(current.start_time, current.last_update_time),
            );

            if frame.is_final() {
                if let Some(window_start) = frame.prior_success_plus_one_execution() {
                    observations.push_duration(
                        MetricName::DeliveryLeadTime,
                        optional_duration_seconds(
                            window_start.start_time,
                            current.last_update_time,
                        ),
                    );
                }
            }
        }
        ExecutionStatus::Failed => {
            observations.push_duration(
                MetricName::FailureLeadTime,
                optional_duration_seconds(current.start_time, current.last_update_time),
            );
        }
    }

    observations.emitted
}
