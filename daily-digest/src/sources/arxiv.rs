use crate::config::PaperConfig;
use crate::fetcher::Fetcher;
use crate::processing;
use crate::rss_utils::{text, time, url as url_utils};
use crate::traits::SectionSource;
use crate::types::{DigestError, FeedRecord, Result, Section};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::{debug, error, info};
use url::Url;

/// One arXiv search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: String,
    pub category: String,
    pub link: String,
    pub pdf: String,
}

impl From<Paper> for FeedRecord {
    fn from(paper: Paper) -> Self {
        let mut record = FeedRecord::new(
            paper.title,
            paper.link,
            paper.published,
            paper.summary,
            format!("arXiv {}", paper.category),
        );
        record.authors = paper.authors;
        record.category = Some(paper.category);
        record.pdf = Some(paper.pdf);
        record
    }
}

/// The paper section: newest submissions per arXiv category.
pub struct ArxivSource {
    config: PaperConfig,
}

impl ArxivSource {
    pub fn new(config: PaperConfig) -> Self {
        Self { config }
    }

    /// Search URL for one category, newest submissions first.
    pub fn query_url(&self, category: &str) -> Result<Url> {
        let params = [
            ("search_query", format!("cat:{}", category)),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
            ("max_results", self.config.max_results.to_string()),
        ];
        Ok(Url::parse_with_params(&self.config.api_url, &params)?)
    }

    /// Parse an arXiv Atom response.
    pub fn parse_papers(
        &self,
        content: &[u8],
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Paper>> {
        let feed = parser::parse(content)
            .map_err(|e| DigestError::Parse(format!("Failed to parse arXiv response: {}", e)))?;

        let papers = feed
            .entries
            .into_iter()
            .map(|entry| {
                let title = entry
                    .title
                    .map(|t| text::collapse_whitespace(&t.content))
                    .unwrap_or_default();
                let summary = entry
                    .summary
                    .map(|s| text::collapse_whitespace(&s.content))
                    .map(|s| text::truncate_chars(&s, self.config.summary_chars))
                    .unwrap_or_default();
                let authors = entry
                    .authors
                    .into_iter()
                    .take(self.config.max_authors)
                    .map(|a| a.name)
                    .collect();
                let published = entry
                    .published
                    .or(entry.updated)
                    .unwrap_or(now)
                    .to_rfc3339();

                Paper {
                    pdf: url_utils::arxiv_pdf_link(&entry.id),
                    link: entry.id.clone(),
                    id: entry.id,
                    title,
                    authors,
                    summary,
                    published,
                    category: category.to_string(),
                }
            })
            .collect();

        Ok(papers)
    }

    /// Parse one category response and keep papers inside the day window.
    pub fn process_document(
        &self,
        content: &[u8],
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Paper>> {
        let papers = self.parse_papers(content, category, now)?;
        let today = now.date_naive();

        Ok(papers
            .into_iter()
            .filter(|p| {
                processing::in_calendar_window(
                    time::parse_timestamp(&p.published),
                    today,
                    self.config.window_days,
                )
            })
            .collect())
    }

    /// Concatenate per-category results in category order, keeping the
    /// first copy of a paper cross-listed under several categories.
    pub fn merge(per_category: Vec<Vec<Paper>>) -> Vec<FeedRecord> {
        let all_papers: Vec<Paper> = per_category.into_iter().flatten().collect();
        let before = all_papers.len();
        let unique = processing::dedup_by(all_papers, |p| p.id.clone());
        if unique.len() < before {
            debug!("Merged {} cross-listed papers", before - unique.len());
        }
        unique.into_iter().map(FeedRecord::from).collect()
    }

    async fn fetch_category(
        &self,
        fetcher: &Fetcher,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Paper>> {
        let url = self.query_url(category)?;
        let body = fetcher.fetch(url.as_str()).await?;
        self.process_document(&body, category, now)
    }
}

#[async_trait]
impl SectionSource for ArxivSource {
    fn section(&self) -> Section {
        Section::Papers
    }

    fn source_name(&self) -> String {
        format!("arXiv {}", self.config.categories.join(", "))
    }

    async fn collect(&self, fetcher: &Fetcher, now: DateTime<Utc>) -> Vec<FeedRecord> {
        let mut per_category = Vec::with_capacity(self.config.categories.len());

        for category in &self.config.categories {
            match self.fetch_category(fetcher, category, now).await {
                Ok(papers) => {
                    info!("[arXiv {}] Found {} papers in window", category, papers.len());
                    per_category.push(papers);
                }
                Err(e) => {
                    error!("[arXiv {}] Failed: {}", category, e);
                }
            }
        }

        Self::merge(per_category)
    }
}
