use crate::fetcher::Fetcher;
use crate::types::{FeedRecord, Section};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for collecting one section's records from its upstream sources
/// (RSS/Atom feeds, search APIs, etc.)
#[async_trait]
pub trait SectionSource: Send + Sync {
    /// Section the records belong to
    fn section(&self) -> Section;

    /// Human-readable name for logs
    fn source_name(&self) -> String;

    /// Fetch, normalize and filter every upstream source in turn.
    ///
    /// Never fails: an upstream that errors contributes nothing and the
    /// error is logged.
    async fn collect(&self, fetcher: &Fetcher, now: DateTime<Utc>) -> Vec<FeedRecord>;
}
