use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::Section;

/// What the normalizer does with an item whose link cannot be resolved.
///
/// Chosen per source list: news keeps such items, blogs drop them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLink {
    /// Keep the record with an empty link.
    Empty,
    /// Drop the record.
    Drop,
}

/// A compiled-in feed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: &'static str,
    pub homepage: &'static str,
    pub feed_url: &'static str,
}

pub const NEWS_SOURCES: &[FeedSource] = &[
    FeedSource {
        name: "TechCrunch AI",
        homepage: "https://techcrunch.com/category/artificial-intelligence/",
        feed_url: "https://techcrunch.com/feed/",
    },
    FeedSource {
        name: "MIT Tech Review",
        homepage: "https://www.technologyreview.com/topic/artificial-intelligence/",
        feed_url: "https://www.technologyreview.com/feed/",
    },
    FeedSource {
        name: "AI News",
        homepage: "https://artificialintelligence-news.com",
        feed_url: "https://artificialintelligence-news.com/feed/",
    },
    FeedSource {
        name: "OpenAI Blog",
        homepage: "https://openai.com/blog",
        feed_url: "https://openai.com/blog/rss.xml",
    },
    FeedSource {
        name: "DeepMind Blog",
        homepage: "https://deepmind.google",
        feed_url: "https://deepmind.com/blog/rss.xml",
    },
    FeedSource {
        name: "Anthropic News",
        homepage: "https://www.anthropic.com/news",
        feed_url: "https://www.anthropic.com/news/rss",
    },
];

pub const BLOG_SOURCES: &[FeedSource] = &[
    FeedSource {
        name: "Baoyu's Blog",
        homepage: "https://baoyu.io/blog",
        feed_url: "https://baoyu.io/feed.xml",
    },
    FeedSource {
        name: "Scientific Spaces",
        homepage: "https://kexue.fm/",
        feed_url: "https://kexue.fm/feed",
    },
    FeedSource {
        name: "Ruan Yifeng's Weblog",
        homepage: "http://www.ruanyifeng.com/blog/",
        feed_url: "http://www.ruanyifeng.com/blog/atom.xml",
    },
];

pub const ARXIV_API: &str = "https://export.arxiv.org/api/query";
pub const ARXIV_CATEGORIES: &[&str] = &["eess.AS", "cs.SD"];

pub const TRANSLATE_API: &str = "https://api.mymemory.translated.net/get";

pub const DEFAULT_SITE_URL: &str = "https://nagichan.github.io/ai-daily/";

/// Settings for one RSS/Atom section.
#[derive(Debug, Clone)]
pub struct FeedSectionConfig {
    pub section: Section,
    pub sources: Vec<FeedSource>,
    /// Inclusion window in days, measured back from run time.
    pub days_back: i64,
    /// Maximum items normalized per feed, `None` for all.
    pub max_items_per_feed: Option<usize>,
    pub missing_link: MissingLink,
    /// Attach each source's homepage to its records.
    pub record_source_url: bool,
}

impl FeedSectionConfig {
    pub fn news() -> Self {
        Self {
            section: Section::News,
            sources: NEWS_SOURCES.to_vec(),
            days_back: 1,
            max_items_per_feed: Some(20),
            missing_link: MissingLink::Empty,
            record_source_url: false,
        }
    }

    pub fn blogs() -> Self {
        Self {
            section: Section::Blogs,
            sources: BLOG_SOURCES.to_vec(),
            days_back: 7,
            max_items_per_feed: None,
            missing_link: MissingLink::Drop,
            record_source_url: true,
        }
    }
}

/// Settings for the academic paper section.
#[derive(Debug, Clone)]
pub struct PaperConfig {
    pub api_url: String,
    pub categories: Vec<String>,
    pub max_results: usize,
    /// Calendar days before today that still count; 0 keeps today only.
    pub window_days: i64,
    pub max_authors: usize,
    pub summary_chars: usize,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            api_url: ARXIV_API.to_string(),
            categories: ARXIV_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            max_results: 30,
            window_days: 0,
            max_authors: 3,
            summary_chars: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; AI-Daily-Bot/1.0)".to_string(),
            timeout_seconds: 15,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub api_url: String,
    /// Target language code, `None` disables translation.
    pub target: Option<String>,
    pub timeout_seconds: u64,
    pub max_chars: usize,
    /// How many leading items of a section get translated.
    pub max_items: usize,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            api_url: TRANSLATE_API.to_string(),
            target: Some("zh".to_string()),
            timeout_seconds: 10,
            max_chars: 500,
            max_items: 15,
        }
    }
}

/// External program that relays the chat card.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub program: String,
    /// Arguments placed before the card JSON.
    pub args: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            program: "openclaw".to_string(),
            args: ["message", "send", "--channel", "feishu", "--card"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Everything one run needs. All values are compiled in; a few paths can
/// be overridden from the environment.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub data_dir: PathBuf,
    pub site_dir: PathBuf,
    pub site_url: String,
    pub news: FeedSectionConfig,
    pub blogs: FeedSectionConfig,
    pub papers: PaperConfig,
    pub fetch: FetchConfig,
    pub translate: TranslateConfig,
    pub relay: RelayConfig,
    /// Characters kept from a feed item's summary.
    pub summary_chars: usize,
    /// Budget for the sentence-aware short summary shown on pages.
    pub short_summary_chars: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            site_dir: PathBuf::from("site"),
            site_url: DEFAULT_SITE_URL.to_string(),
            news: FeedSectionConfig::news(),
            blogs: FeedSectionConfig::blogs(),
            papers: PaperConfig::default(),
            fetch: FetchConfig::default(),
            translate: TranslateConfig::default(),
            relay: RelayConfig::default(),
            summary_chars: 200,
            short_summary_chars: 200,
        }
    }
}

impl DigestConfig {
    /// Defaults with `DAILY_DIGEST_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("DAILY_DIGEST_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("DAILY_DIGEST_SITE_DIR") {
            config.site_dir = PathBuf::from(dir);
        }
        config.site_url = env::var("DAILY_DIGEST_SITE_URL").unwrap_or(config.site_url);
        config.relay.program = env::var("DAILY_DIGEST_RELAY").unwrap_or(config.relay.program);

        config
    }
}
