use crate::config::{DigestConfig, RelayConfig};
use crate::digest::SnapshotStore;
use crate::render::{self, RenderOptions};
use crate::rss_utils::time;
use crate::types::{Digest, DigestError, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

/// Paths written by one publish.
#[derive(Debug, Clone)]
pub struct PublishedFiles {
    pub snapshot: PathBuf,
    pub html: PathBuf,
    pub markdown: PathBuf,
    pub index: PathBuf,
}

/// Writes snapshots and pages, and hands the chat card to the relay.
pub struct Publisher {
    store: SnapshotStore,
    site_dir: PathBuf,
    render: RenderOptions,
    relay: RelayConfig,
}

impl Publisher {
    pub fn new(
        store: SnapshotStore,
        site_dir: impl Into<PathBuf>,
        render: RenderOptions,
        relay: RelayConfig,
    ) -> Self {
        Self {
            store,
            site_dir: site_dir.into(),
            render,
            relay,
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        let render = RenderOptions {
            site_url: config.site_url.clone(),
            short_summary_chars: config.short_summary_chars,
            ..Default::default()
        };
        Self::new(
            SnapshotStore::new(&config.data_dir),
            &config.site_dir,
            render,
            config.relay.clone(),
        )
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    /// `{site-dir}/{ISO-date}.{ext}`
    pub fn page_path(&self, date: NaiveDate, ext: &str) -> PathBuf {
        self.site_dir
            .join(format!("{}.{}", time::format_iso_date(date), ext))
    }

    pub fn index_path(&self) -> PathBuf {
        self.site_dir.join("index.html")
    }

    /// Persist the snapshot, then render the day's pages and the archive
    /// index from every stored snapshot.
    pub fn publish(&self, digest: &Digest) -> Result<PublishedFiles> {
        let snapshot = self.store.save(digest)?;
        let history = self.store.history()?;

        fs::create_dir_all(&self.site_dir)?;

        let html = self.page_path(digest.date, "html");
        write_file(&html, &render::render_html(digest, &history, &self.render))?;

        let markdown = self.page_path(digest.date, "md");
        write_file(&markdown, &render::render_markdown(digest, &self.render))?;

        let index = self.index_path();
        write_file(&index, &render::render_index(&history))?;

        Ok(PublishedFiles {
            snapshot,
            html,
            markdown,
            index,
        })
    }

    /// Regenerate `index.html` alone.
    pub fn rebuild_index(&self) -> Result<PathBuf> {
        let history = self.store.history()?;
        fs::create_dir_all(&self.site_dir)?;
        let index = self.index_path();
        write_file(&index, &render::render_index(&history))?;
        Ok(index)
    }

    pub fn card_for(&self, digest: &Digest) -> Value {
        render::build_card(digest, &self.render)
    }

    /// Send the card through the external relay program. A spawn failure
    /// or non-zero exit is an error.
    pub async fn relay_card(&self, card: &Value) -> Result<String> {
        let card_json = serde_json::to_string(card)?;
        info!("Relaying card via `{}`", self.relay.program);

        let output = Command::new(&self.relay.program)
            .args(&self.relay.args)
            .arg(&card_json)
            .output()
            .await
            .map_err(|e| DigestError::Relay {
                program: self.relay.program.clone(),
                code: None,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Relay exited with {:?}: {}", output.status.code(), stderr);
            return Err(DigestError::Relay {
                program: self.relay.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    info!("Wrote {}", path.display());
    Ok(())
}
