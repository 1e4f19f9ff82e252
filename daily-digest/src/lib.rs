pub mod types;
pub mod config;
pub mod rss_utils;
pub mod fetcher;
pub mod xml;
pub mod parser;
pub mod processing;
pub mod traits;
pub mod sources;
pub mod translate;
pub mod digest;
pub mod render;
pub mod publisher;
pub mod aggregator;

pub use types::*;
pub use config::{DigestConfig, FetchConfig, MissingLink};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use traits::SectionSource;
pub use sources::{ArxivSource, RssFeedSource};
pub use translate::{PassthroughTranslator, Translator};
pub use digest::{DigestAssembler, SnapshotStore};
pub use publisher::Publisher;
pub use aggregator::DailyDigest;
