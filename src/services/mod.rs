//! Service layer: orchestration over the injected collaborators

pub mod history;
pub mod invalidation;
pub mod search;

pub use history::{HistoryRecorder, LoggingHistoryRecorder};
pub use invalidation::CacheInvalidator;
pub use search::SearchService;
