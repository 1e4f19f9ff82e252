use anyhow::Context;
use clap::{Parser, Subcommand};
use daily_digest::render;
use daily_digest::{DailyDigest, DigestConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daily-digest", about = "Build and publish the AI daily digest")]
struct Cli {
    /// Directory holding dated JSON snapshots
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory receiving the rendered pages
    #[arg(long, global = true)]
    site_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every source, write the day's pages and relay the card (default)
    Run {
        /// Stop after writing files
        #[arg(long)]
        skip_relay: bool,
    },
    /// Print the chat card JSON of the latest snapshot
    Card,
    /// Print the short chat message of the latest snapshot
    Message,
    /// Relay the chat card of the latest snapshot
    Send,
    /// Rebuild the archive index from stored snapshots
    Index,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = DigestConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.site_dir {
        config.site_dir = dir;
    }

    info!(
        "Starting daily digest (data: {}, site: {})",
        config.data_dir.display(),
        config.site_dir.display()
    );

    let app = DailyDigest::new(config).context("failed to initialise")?;

    match cli.command.unwrap_or(Command::Run { skip_relay: false }) {
        Command::Run { skip_relay } => {
            let report = app.run(!skip_relay).await.map_err(|e| {
                error!("Run failed: {}", e);
                e
            })?;
            info!(
                "Done: {} records, page {}, relayed: {}",
                report.digest.total(),
                report.files.html.display(),
                report.relayed
            );
        }
        Command::Card => {
            let digest = app
                .publisher()
                .store()
                .latest()?
                .context("no snapshot found")?;
            let card = app.publisher().card_for(&digest);
            println!("{}", serde_json::to_string(&card)?);
        }
        Command::Message => {
            let digest = app
                .publisher()
                .store()
                .latest()?
                .context("no snapshot found")?;
            let message = render::render_chat_message(&digest, app.publisher().render_options());
            println!("{}", message);
        }
        Command::Send => {
            let digest = app.send_latest().await.context("relay failed")?;
            info!("Relayed card for {}", digest.date);
        }
        Command::Index => {
            let index = app.publisher().rebuild_index()?;
            info!("Archive index written to {}", index.display());
        }
    }

    Ok(())
}
