//! Terminal pipeline executions as seen by the history scan.

use chrono::{DateTime, Utc};
use pipeline_client::models::PipelineExecutionSummary;

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;

/// Terminal outcome of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    /// Parses a service status string. Non-terminal statuses yield `None`.
    pub fn from_service_status(status: &str) -> Option<Self> {
        match status {
            "Succeeded" => Some(ExecutionStatus::Succeeded),
            "Failed" => Some(ExecutionStatus::Failed),
            _ => None,
        }
    }
}

/// One historical run of a pipeline that reached a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub id: String,
    pub status: ExecutionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub last_update_time: Option<DateTime<Utc>>,
}

impl Execution {
    /// Creates an execution from already-classified parts.
    pub fn new(
        id: impl Into<String>,
        status: ExecutionStatus,
        start_time: Option<DateTime<Utc>>,
        last_update_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            start_time,
            last_update_time,
        }
    }

    /// Converts a history row, discarding it unless its status is terminal.
    pub fn from_summary(summary: PipelineExecutionSummary) -> Option<Self> {
        let status = ExecutionStatus::from_service_status(summary.status.as_deref()?)?;
        Some(Self {
            id: summary.pipeline_execution_id,
            status,
            start_time: summary.start_time,
            last_update_time: summary.last_update_time,
        })
    }
}
