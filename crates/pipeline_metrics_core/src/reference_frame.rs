//! The reference frame accumulated while scanning execution history.
//!
//! History is folded newest-to-oldest. The frame first looks for the
//! execution the event refers to, then tracks the run of differently-stated
//! executions behind it until it meets an execution with the same status as
//! the current one. At that point the streak is closed and the frame is final.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::execution::{Execution, ExecutionStatus};

#[cfg(test)]
#[path = "reference_frame_tests.rs"]
mod tests;

/// Where the fold currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldState {
    /// The current execution has not been seen yet.
    Searching,
    /// The current execution was found; older entries are being classified.
    Tracking(ExecutionStatus),
    /// A same-status execution closed the streak. Nothing changes any more.
    Final,
}

/// Reference executions needed to derive duration metrics for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFrame {
    current_execution_id: String,
    current_execution: Option<Execution>,
    prior_state_execution: Option<Execution>,
    prior_success_execution: Option<Execution>,
    prior_success_plus_one_execution: Option<Execution>,
    is_final: bool,
}

impl ReferenceFrame {
    /// Creates an empty frame that searches for `current_execution_id`.
    pub fn new(current_execution_id: impl Into<String>) -> Self {
        Self {
            current_execution_id: current_execution_id.into(),
            current_execution: None,
            prior_state_execution: None,
            prior_success_execution: None,
            prior_success_plus_one_execution: None,
            is_final: false,
        }
    }

    /// Id of the execution the event refers to.
    pub fn current_execution_id(&self) -> &str {
        &self.current_execution_id
    }

    /// The execution the event refers to, if it was found in history.
    pub fn current_execution(&self) -> Option<&Execution> {
        self.current_execution.as_ref()
    }

    /// The oldest differently-stated execution seen before the streak closed.
    pub fn prior_state_execution(&self) -> Option<&Execution> {
        self.prior_state_execution.as_ref()
    }

    /// The previous success, for a succeeded current execution.
    pub fn prior_success_execution(&self) -> Option<&Execution> {
        self.prior_success_execution.as_ref()
    }

    /// Start of the delivery window, for a succeeded current execution.
    ///
    /// Begins as the current execution and moves to each failed execution
    /// found before the previous success, ending on the oldest one.
    pub fn prior_success_plus_one_execution(&self) -> Option<&Execution> {
        self.prior_success_plus_one_execution.as_ref()
    }

    /// Whether a same-status execution has closed the streak.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// The fold state derived from what has been observed so far.
    pub fn state(&self) -> FoldState {
        match (&self.current_execution, self.is_final) {
            (_, true) => FoldState::Final,
            (None, false) => FoldState::Searching,
            (Some(current), false) => FoldState::Tracking(current.status),
        }
    }

    /// Folds one history entry into the frame. Entries must arrive newest first.
    pub fn observe(&mut self, execution: Execution) {
        match self.state() {
            FoldState::Final => {}
            FoldState::Searching => {
                if execution.id == self.current_execution_id {
                    if execution.status == ExecutionStatus::Succeeded {
                        self.prior_success_plus_one_execution = Some(execution.clone());
                    }
                    self.current_execution = Some(execution);
                }
            }
            FoldState::Tracking(current_status) => {
                if execution.id == self.current_execution_id {
                    warn!(
                        execution_id = %execution.id,
                        "Execution appears more than once in history, keeping the first occurrence"
                    );
                    return;
                }

                if current_status == ExecutionStatus::Succeeded {
                    if execution.status == ExecutionStatus::Succeeded {
                        self.prior_success_execution = Some(execution.clone());
                    } else {
                        self.prior_success_plus_one_execution = Some(execution.clone());
                    }
                }

                if execution.status != current_status {
                    self.prior_state_execution = Some(execution);
                } else {
                    self.is_final = true;
                }
            }
        }
    }

    /// Folds a page of entries, stopping as soon as the frame becomes final.
    ///
    /// Returns the number of entries consumed.
    pub fn fold_page<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = Execution>,
    {
        let mut consumed = 0;
        for execution in entries {
            if self.is_final {
                break;
            }
            self.observe(execution);
            consumed += 1;
        }
        consumed
    }
}

/// Whole seconds between two instants, rounding half up.
///
/// Negative spans are returned as-is; they indicate clock skew or
/// out-of-order history upstream.
pub fn duration_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let millis = (to - from).num_milliseconds();
    (millis + 500).div_euclid(1000)
}

/// Seconds between two optional instants; `None` when either is missing.
pub fn optional_duration_seconds(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Option<i64> {
    Some(duration_seconds(from?, to?))
}
