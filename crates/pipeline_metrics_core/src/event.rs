//! Inbound execution state-change events.
//!
//! Events arrive as JSON documents of the form
//!
//! ```json
//! {
//!   "time": "2017-04-22T03:16:47Z",
//!   "detail-type": "CodePipeline Pipeline Execution State Change",
//!   "detail": { "pipeline": "my-pipeline", "execution-id": "xxx", "state": "SUCCEEDED" }
//! }
//! ```
//!
//! Every field other than `time` is optional on the wire. Unknown detail
//! types and non-terminal states are represented, not rejected.

use chrono::{DateTime, Utc};
use pipeline_client::models::Dimension;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

pub const PIPELINE_NAME_DIMENSION: &str = "PipelineName";
pub const STAGE_NAME_DIMENSION: &str = "StageName";
pub const ACTION_NAME_DIMENSION: &str = "ActionName";

const PIPELINE_EVENT_SUFFIX: &str = "Pipeline Execution State Change";
const STAGE_EVENT_SUFFIX: &str = "Stage Execution State Change";
const ACTION_EVENT_SUFFIX: &str = "Action Execution State Change";

/// An execution state-change event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineEvent {
    /// When the state change happened; used as the timestamp of every observation
    pub time: DateTime<Utc>,

    #[serde(rename = "detail-type", default, skip_serializing_if = "Option::is_none")]
    pub detail_type: Option<String>,

    #[serde(default)]
    pub detail: EventDetail,
}

/// The payload of a [`PipelineEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    #[serde(rename = "execution-id", default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Granularity of an event, derived from its detail type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Pipeline,
    Stage,
    Action,
    Unrecognized,
}

impl EventKind {
    /// Classifies a detail type by its suffix, so any source prefix is accepted.
    pub fn from_detail_type(detail_type: Option<&str>) -> Self {
        match detail_type {
            Some(t) if t.ends_with(PIPELINE_EVENT_SUFFIX) => EventKind::Pipeline,
            Some(t) if t.ends_with(STAGE_EVENT_SUFFIX) => EventKind::Stage,
            Some(t) if t.ends_with(ACTION_EVENT_SUFFIX) => EventKind::Action,
            _ => EventKind::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Pipeline => "pipeline",
            EventKind::Stage => "stage",
            EventKind::Action => "action",
            EventKind::Unrecognized => "unrecognized",
        }
    }
}

/// State reported by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventState {
    Succeeded,
    Failed,
    /// Any other value (`STARTED`, `RESUMED`, `CANCELED`, ...) or no state at all
    Other,
}

impl EventState {
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some("SUCCEEDED") => EventState::Succeeded,
            Some("FAILED") => EventState::Failed,
            _ => EventState::Other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventState::Other)
    }
}

impl PipelineEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from_detail_type(self.detail_type.as_deref())
    }

    pub fn state(&self) -> EventState {
        EventState::from_state(self.detail.state.as_deref())
    }

    /// Pipeline name and execution id, when both are present.
    pub fn execution_target(&self) -> Option<(&str, &str)> {
        match (&self.detail.pipeline, &self.detail.execution_id) {
            (Some(pipeline), Some(execution_id)) => Some((pipeline.as_str(), execution_id.as_str())),
            _ => None,
        }
    }

    /// Builds the ordered dimensions for observations about this event.
    ///
    /// Nesting follows the detail strictly: a stage is only recorded under a
    /// pipeline, and an action only under a stage.
    pub fn dimensions(&self) -> Vec<Dimension> {
        let mut dimensions = Vec::new();

        let Some(pipeline) = &self.detail.pipeline else {
            return dimensions;
        };
        dimensions.push(Dimension::new(PIPELINE_NAME_DIMENSION, pipeline));

        let Some(stage) = &self.detail.stage else {
            return dimensions;
        };
        dimensions.push(Dimension::new(STAGE_NAME_DIMENSION, stage));

        if let Some(action) = &self.detail.action {
            dimensions.push(Dimension::new(ACTION_NAME_DIMENSION, action));
        }

        dimensions
    }
}
