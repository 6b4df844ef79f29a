//! Backward scan over paginated execution history.
//!
//! [`ExecutionPages`] pulls history one page at a time from a
//! [`PipelineHistoryClient`]. [`HistoryScanner`] drives it, folding each page
//! into a [`ReferenceFrame`] and stopping as soon as the frame is final or
//! the history is exhausted. Pages are fetched strictly one after another.

use pipeline_client::PipelineHistoryClient;
use tracing::{debug, info, instrument};

use crate::errors::MetricsResult;
use crate::execution::Execution;
use crate::reference_frame::ReferenceFrame;

#[cfg(test)]
#[path = "history_scanner_tests.rs"]
mod tests;

/// Pull-based pager over a pipeline's execution history.
///
/// Each page holds terminal executions only, newest first.
pub struct ExecutionPages<'a> {
    client: &'a dyn PipelineHistoryClient,
    pipeline_name: &'a str,
    next_token: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> ExecutionPages<'a> {
    pub fn new(client: &'a dyn PipelineHistoryClient, pipeline_name: &'a str) -> Self {
        Self {
            client,
            pipeline_name,
            next_token: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Fetches the next page, or returns `None` once the source has no more pages.
    ///
    /// # Errors
    ///
    /// Any failure of the history client is returned unchanged.
    pub async fn next_page(&mut self) -> MetricsResult<Option<Vec<Execution>>> {
        if self.exhausted {
            return Ok(None);
        }

        let response = self
            .client
            .list_pipeline_executions(self.pipeline_name, self.next_token.as_deref())
            .await?;

        self.pages_fetched += 1;
        // an empty token ends paging
        self.next_token = response.next_token.filter(|token| !token.is_empty());
        self.exhausted = self.next_token.is_none();

        let received = response.pipeline_execution_summaries.len();
        let executions: Vec<Execution> = response
            .pipeline_execution_summaries
            .into_iter()
            .filter_map(Execution::from_summary)
            .collect();

        debug!(
            pipeline = self.pipeline_name,
            page = self.pages_fetched,
            received,
            terminal = executions.len(),
            "Fetched execution history page"
        );

        Ok(Some(executions))
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

/// The result of scanning history for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub frame: ReferenceFrame,
    pub pages_fetched: usize,
}

/// Builds reference frames from a pipeline's execution history.
pub struct HistoryScanner<'a> {
    client: &'a dyn PipelineHistoryClient,
}

impl<'a> HistoryScanner<'a> {
    pub fn new(client: &'a dyn PipelineHistoryClient) -> Self {
        Self { client }
    }

    /// Scans history for `pipeline_name` until the frame for `execution_id` is resolved.
    ///
    /// A frame whose execution never shows up in history is returned as-is;
    /// that is not an error.
    ///
    /// # Errors
    ///
    /// Any failure of the history client is returned unchanged; no partial
    /// frame is produced.
    #[instrument(skip(self))]
    pub async fn scan(&self, pipeline_name: &str, execution_id: &str) -> MetricsResult<ScanOutcome> {
        let mut frame = ReferenceFrame::new(execution_id);
        let mut pages = ExecutionPages::new(self.client, pipeline_name);

        while let Some(page) = pages.next_page().await? {
            frame.fold_page(page);
            if frame.is_final() {
                break;
            }
        }

        info!(
            pipeline = pipeline_name,
            execution_id = execution_id,
            pages = pages.pages_fetched(),
            found = frame.current_execution().is_some(),
            is_final = frame.is_final(),
            "Scanned execution history"
        );

        Ok(ScanOutcome {
            frame,
            pages_fetched: pages.pages_fetched(),
        })
    }
}
