use crate::config::DigestConfig;
use crate::digest::{self, DigestAssembler, TranslationPlan};
use crate::fetcher::Fetcher;
use crate::publisher::{PublishedFiles, Publisher};
use crate::sources::{ArxivSource, RssFeedSource};
use crate::traits::SectionSource;
use crate::translate::{self, Translator};
use crate::types::{Digest, DigestError, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
    pub digest: Digest,
    pub files: PublishedFiles,
    pub relayed: bool,
}

/// Runs fetch → normalize → filter → dedup → assemble → render → publish,
/// one source at a time.
pub struct DailyDigest {
    config: DigestConfig,
    fetcher: Fetcher,
    sources: Vec<Box<dyn SectionSource>>,
    translator: Box<dyn Translator>,
    publisher: Publisher,
}

impl DailyDigest {
    pub fn new(config: DigestConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        let translator = translate::from_config(&config.translate)?;
        let publisher = Publisher::from_config(&config);

        let sources: Vec<Box<dyn SectionSource>> = vec![
            Box::new(RssFeedSource::new(config.news.clone(), config.summary_chars)),
            Box::new(ArxivSource::new(config.papers.clone())),
            Box::new(RssFeedSource::new(config.blogs.clone(), config.summary_chars)),
        ];

        Ok(Self {
            config,
            fetcher,
            sources,
            translator,
            publisher,
        })
    }

    pub fn with_sources(mut self, sources: Vec<Box<dyn SectionSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Collect every section and build the (translated) digest.
    pub async fn build_digest(&self, now: DateTime<Utc>) -> Digest {
        let mut assembler = DigestAssembler::new(now.date_naive());

        for (step, source) in self.sources.iter().enumerate() {
            info!(
                "[{}/{}] Collecting {}",
                step + 1,
                self.sources.len(),
                source.source_name()
            );
            let records = source.collect(&self.fetcher, now).await;
            if records.is_empty() {
                warn!("{} contributed no records", source.source_name());
            }
            assembler.add(source.section(), records);
        }

        let digest = assembler.build(now);
        let plan = TranslationPlan {
            max_items: self.config.translate.max_items,
            short_summary_chars: self.config.short_summary_chars,
        };
        digest::localize(digest, &*self.translator, plan).await
    }

    /// Full run. Source failures only shrink the digest; a failed write or
    /// relay fails the run.
    pub async fn run(&self, relay: bool) -> Result<RunReport> {
        let now = Utc::now();
        info!("Building digest for {}", now.date_naive());

        let digest = self.build_digest(now).await;
        info!("Digest has {} records", digest.total());

        let files = self.publisher.publish(&digest)?;

        if relay {
            let card = self.publisher.card_for(&digest);
            self.publisher.relay_card(&card).await?;
            info!("Card relayed");
        }

        Ok(RunReport {
            digest,
            files,
            relayed: relay,
        })
    }

    /// Relay the card of the most recent stored snapshot.
    pub async fn send_latest(&self) -> Result<Digest> {
        let digest = self
            .publisher
            .store()
            .latest()?
            .ok_or_else(|| DigestError::General("no snapshot found".to_string()))?;
        let card = self.publisher.card_for(&digest);
        self.publisher.relay_card(&card).await?;
        Ok(digest)
    }
}
