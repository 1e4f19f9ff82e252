use crate::config::{FeedSectionConfig, FeedSource};
use crate::fetcher::Fetcher;
use crate::parser::{FeedParser, NormalizeOptions};
use crate::processing;
use crate::rss_utils::url as url_utils;
use crate::traits::SectionSource;
use crate::types::{FeedRecord, Result, Section};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// A section fed by a list of RSS/Atom feeds (news, blogs).
pub struct RssFeedSource {
    config: FeedSectionConfig,
    summary_chars: usize,
}

impl RssFeedSource {
    pub fn new(config: FeedSectionConfig, summary_chars: usize) -> Self {
        Self {
            config,
            summary_chars,
        }
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.config.sources
    }

    fn parser_for(&self, source: &FeedSource, now: DateTime<Utc>) -> FeedParser {
        let options = NormalizeOptions {
            missing_link: self.config.missing_link,
            max_items: self.config.max_items_per_feed,
            summary_chars: self.summary_chars,
            source_url: self
                .config
                .record_source_url
                .then(|| source.homepage.to_string()),
        };
        FeedParser::new(options).with_run_time(now)
    }

    /// Normalize and recency-filter one downloaded feed document.
    pub fn process_document(
        &self,
        source: &FeedSource,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Vec<FeedRecord>> {
        let records = self.parser_for(source, now).parse_feed(body, source.name)?;
        let cutoff = processing::cutoff(now, self.config.days_back);
        Ok(processing::filter_recent(records, cutoff))
    }
}

#[async_trait]
impl SectionSource for RssFeedSource {
    fn section(&self) -> Section {
        self.config.section
    }

    fn source_name(&self) -> String {
        format!("{} feeds", self.config.section.key())
    }

    async fn collect(&self, fetcher: &Fetcher, now: DateTime<Utc>) -> Vec<FeedRecord> {
        let mut all_records = Vec::new();

        for source in &self.config.sources {
            if !url_utils::is_valid_feed_url(source.feed_url) {
                error!("[{}] Skipping non-http(s) feed URL {}", source.name, source.feed_url);
                continue;
            }
            info!("[{}] Fetching {}", source.name, source.feed_url);

            let result = match fetcher.fetch_feed(source.feed_url).await {
                Ok(body) => self.process_document(source, &body, now),
                Err(e) => Err(e),
            };

            match result {
                Ok(records) => {
                    info!("[{}] Found {} recent records", source.name, records.len());
                    all_records.extend(records);
                }
                Err(e) => {
                    error!("[{}] Failed: {}", source.name, e);
                }
            }
        }

        all_records
    }
}
