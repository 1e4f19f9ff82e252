use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rss_utils::time;

/// One category of content within a digest.
///
/// The declaration order is the rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    News,
    Papers,
    Blogs,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::News, Section::Papers, Section::Blogs];

    pub fn key(&self) -> &'static str {
        match self {
            Section::News => "news",
            Section::Papers => "papers",
            Section::Blogs => "blogs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::News => "AI News",
            Section::Papers => "Speech Papers",
            Section::Blogs => "Followed Blogs",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Section::News => "📰",
            Section::Papers => "🎤",
            Section::Blogs => "👥",
        }
    }

    /// Unit word used in counts ("12 items", "3 papers").
    pub fn unit(&self) -> &'static str {
        match self {
            Section::News => "items",
            Section::Papers => "papers",
            Section::Blogs => "posts",
        }
    }

    /// Text shown in place of an empty section.
    pub fn empty_placeholder(&self) -> &'static str {
        match self {
            Section::News => "No updates today",
            Section::Papers => "No new papers today",
            Section::Blogs => "No recent posts",
        }
    }
}

/// A normalized feed item.
///
/// `published` keeps the timestamp as found in the source document so an
/// unparsable value survives into the snapshot; use [`FeedRecord::published_at`]
/// to interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_summary: Option<String>,
}

impl FeedRecord {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published: published.into(),
            summary: summary.into(),
            source: source.into(),
            source_url: None,
            authors: Vec::new(),
            category: None,
            pdf: None,
            translated_title: None,
            translated_summary: None,
        }
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    pub fn with_translation(mut self, title: Option<String>, summary: Option<String>) -> Self {
        self.translated_title = title;
        self.translated_summary = summary;
        self
    }

    /// Parsed publication time, `None` when the stored value is not a
    /// recognizable timestamp.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        time::parse_timestamp(&self.published)
    }

    pub fn display_title(&self) -> &str {
        self.translated_title.as_deref().unwrap_or(&self.title)
    }

    pub fn display_summary(&self) -> &str {
        self.translated_summary.as_deref().unwrap_or(&self.summary)
    }
}

/// Records of one section, deduplicated by link and newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestSection {
    records: Vec<FeedRecord>,
}

impl DigestSection {
    /// Builds a section from records in arrival order.
    pub fn from_records(records: Vec<FeedRecord>) -> Self {
        let mut records = crate::processing::dedup_by_link(records);
        crate::processing::sort_newest_first(&mut records);
        Self { records }
    }

    pub fn records(&self) -> &[FeedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeedRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<FeedRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a DigestSection {
    type Item = &'a FeedRecord;
    type IntoIter = std::slice::Iter<'a, FeedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The dated collection produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub date: NaiveDate,
    #[serde(default)]
    pub sections: BTreeMap<Section, DigestSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl Digest {
    pub fn section(&self, section: Section) -> &[FeedRecord] {
        self.sections
            .get(&section)
            .map(|s| s.records())
            .unwrap_or(&[])
    }

    pub fn count(&self, section: Section) -> usize {
        self.section(section).len()
    }

    pub fn total(&self) -> usize {
        self.sections.values().map(|s| s.len()).sum()
    }
}

/// Per-day entry of the archive index, derived from a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub counts: BTreeMap<Section, usize>,
}

impl HistoryEntry {
    pub fn from_digest(digest: &Digest) -> Self {
        let counts = Section::ALL
            .iter()
            .map(|s| (*s, digest.count(*s)))
            .collect();
        Self {
            date: digest.date,
            counts,
        }
    }

    pub fn count(&self, section: Section) -> usize {
        self.counts.get(&section).copied().unwrap_or(0)
    }

    pub fn page_name(&self) -> String {
        format!("{}.html", self.date.format("%Y-%m-%d"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size} bytes")]
    FeedTooLarge { size: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Relay `{program}` failed (exit code {code:?}): {stderr}")]
    Relay {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;
