use crate::rss_utils::{text, time};
use crate::translate::Translator;
use crate::types::{Digest, DigestSection, FeedRecord, HistoryEntry, Result, Section};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Collects records per section and produces the run's [`Digest`].
pub struct DigestAssembler {
    date: NaiveDate,
    pending: BTreeMap<Section, Vec<FeedRecord>>,
}

impl DigestAssembler {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            pending: BTreeMap::new(),
        }
    }

    /// Append records to a section in arrival order.
    pub fn add(&mut self, section: Section, records: Vec<FeedRecord>) {
        self.pending.entry(section).or_default().extend(records);
    }

    /// Deduplicate and order every section. All sections are present in
    /// the result, empty ones included.
    pub fn build(mut self, generated_at: DateTime<Utc>) -> Digest {
        let sections = Section::ALL
            .iter()
            .map(|section| {
                let records = self.pending.remove(section).unwrap_or_default();
                let built = DigestSection::from_records(records);
                info!("Section {}: {} records", section.key(), built.len());
                (*section, built)
            })
            .collect();

        Digest {
            date: self.date,
            sections,
            generated_at: Some(generated_at),
        }
    }
}

/// Which fields of a section's leading records get translated.
#[derive(Debug, Clone, Copy)]
pub struct TranslationPlan {
    pub max_items: usize,
    pub short_summary_chars: usize,
}

impl TranslationPlan {
    fn translates_title(section: Section) -> bool {
        // Paper titles stay in the original English.
        section == Section::News
    }

    fn translates(section: Section) -> bool {
        matches!(section, Section::News | Section::Papers)
    }
}

/// Produce a translated copy of the digest. Originals are kept; the
/// translations go into the `translated_*` fields.
pub async fn localize(digest: Digest, translator: &dyn Translator, plan: TranslationPlan) -> Digest {
    let Digest {
        date,
        sections,
        generated_at,
    } = digest;

    let mut localized = BTreeMap::new();
    for (section, records) in sections {
        if !TranslationPlan::translates(section) {
            localized.insert(section, records);
            continue;
        }

        info!(
            "Translating up to {} {} with {}",
            plan.max_items,
            section.key(),
            translator.translator_name()
        );

        let mut translated = Vec::with_capacity(records.len());
        for (index, record) in records.into_records().into_iter().enumerate() {
            if index >= plan.max_items {
                translated.push(record);
                continue;
            }

            let title = if TranslationPlan::translates_title(section) {
                Some(translator.translate(&record.title).await)
            } else {
                None
            };
            let short = text::smart_truncate(&record.summary, plan.short_summary_chars);
            let summary = if short.is_empty() {
                None
            } else {
                Some(translator.translate(&short).await)
            };

            translated.push(record.with_translation(title, summary));
        }

        // Order and links are untouched, so the section invariants hold.
        let section_records = DigestSection::from_records(translated);
        localized.insert(section, section_records);
    }

    Digest {
        date,
        sections: localized,
        generated_at,
    }
}

/// Dated JSON snapshots, one file per run date.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", time::format_iso_date(date)))
    }

    /// Write the snapshot, replacing any earlier one for the same date.
    pub fn save(&self, digest: &Digest) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(digest.date);
        let json = serde_json::to_string_pretty(digest)?;
        fs::write(&path, json)?;
        info!("Saved snapshot: {}", path.display());
        Ok(path)
    }

    pub fn load(&self, date: NaiveDate) -> Result<Digest> {
        let content = fs::read_to_string(self.path_for(date))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Dates of every snapshot file, newest first.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(time::parse_iso_date)
            {
                Some(date) => dates.push(date),
                None => debug!("Ignoring non-snapshot file {}", path.display()),
            }
        }

        dates.sort_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Result<Option<Digest>> {
        match self.dates()?.first() {
            Some(date) => self.load(*date).map(Some),
            None => Ok(None),
        }
    }

    /// Per-day counts for the archive index, newest first. Unreadable
    /// snapshots are skipped.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for date in self.dates()? {
            match self.load(date) {
                Ok(digest) => {
                    let mut entry = HistoryEntry::from_digest(&digest);
                    entry.date = date;
                    entries.push(entry);
                }
                Err(e) => warn!("Skipping unreadable snapshot for {}: {}", date, e),
            }
        }
        Ok(entries)
    }
}
