//! Search history recording
//!
//! History is best-effort. The orchestrator fires recordings off without
//! awaiting them; a failed recording is logged and never fails the search.
//! The persistence behind a recorder belongs to the surrounding platform,
//! which injects its own implementation. The default just logs.

use async_trait::async_trait;

use crate::search::SearchParameters;
use crate::Result;

#[async_trait]
pub trait HistoryRecorder: Send + Sync {
    async fn record(
        &self,
        params: &SearchParameters,
        result_count: u64,
        caller: Option<&str>,
    ) -> Result<()>;
}

/// Records searches as structured log lines.
#[derive(Debug, Default)]
pub struct LoggingHistoryRecorder;

#[async_trait]
impl HistoryRecorder for LoggingHistoryRecorder {
    async fn record(
        &self,
        params: &SearchParameters,
        result_count: u64,
        caller: Option<&str>,
    ) -> Result<()> {
        tracing::info!(
            query = params.text.as_deref().unwrap_or(""),
            level = params.level.map(|l| l.as_str()).unwrap_or(""),
            service = params.service.as_deref().unwrap_or(""),
            page = params.page,
            result_count,
            caller = caller.unwrap_or("anonymous"),
            "search executed"
        );
        Ok(())
    }
}
