pub mod arxiv;
pub mod rss_feed;

pub use arxiv::{ArxivSource, Paper};
pub use rss_feed::RssFeedSource;
