//! Command definitions and dispatch.

mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use apod_explorer::client::ApodClient;
use apod_explorer::config::{load_settings, Settings};
use apod_explorer::gallery::{ArchiveStore, FetchOutcome, Selection};
use apod_explorer::hero::{HeroDate, HeroLookup};
use apod_explorer::models::parse_date;

#[derive(Parser)]
#[command(name = "apod", version, about = "Browse NASA's Astronomy Picture of the Day")]
pub struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "APOD_BASE_URL")]
    base_url: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the hero entry for a date (default: yesterday)
    Hero {
        /// Date as YYYY-MM-DD, between 1995-06-16 and today
        #[arg(long)]
        date: Option<String>,
    },
    /// Load archive pages and list them
    Archive {
        /// Number of seven-day pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Only list loaded entries whose title contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the detail view of an archive entry
    Show {
        /// Date of the entry as YYYY-MM-DD
        date: String,
        /// Maximum number of pages to load while looking for the entry
        #[arg(long, default_value_t = 4)]
        pages: u32,
    },
    /// Save the hero image to disk
    Download {
        /// Date as YYYY-MM-DD (default: yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output directory (default: configured download_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = load_settings().await;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    let client = ApodClient::from_settings(&settings).context("failed to set up APOD client")?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Hero { date } => cmd_hero(&settings, client, date, today).await,
        Commands::Archive { pages, search } => cmd_archive(client, pages, search, today).await,
        Commands::Show { date, pages } => cmd_show(client, &date, pages, today).await,
        Commands::Download { date, output } => {
            cmd_download(&settings, client, date, output, today).await
        }
    }
}

fn hero_date(date: Option<&str>, today: NaiveDate) -> anyhow::Result<HeroDate> {
    match date {
        Some(raw) => Ok(HeroDate::new(parse_date(raw)?, today)?),
        None => Ok(HeroDate::default_for(today)),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn cmd_hero(
    settings: &Settings,
    client: ApodClient,
    date: Option<String>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let date = hero_date(date.as_deref(), today)?;
    let mut lookup = HeroLookup::with_ttl(client, settings.hero_cache_ttl());

    let pb = spinner("Tuning in...");
    let view = lookup.lookup(Some(date)).await;
    pb.finish_and_clear();

    render::hero(&view);
    Ok(())
}

/// Send `signals` continuation signals, stopping early at the end of the archive.
async fn load_pages(store: &mut ArchiveStore, client: &ApodClient, signals: u32, today: NaiveDate) {
    for _ in 0..signals {
        let pb = spinner("Receiving Data Stream...");
        let outcome = store.try_continue(client, today).await;
        pb.finish_and_clear();

        if matches!(outcome, Some(FetchOutcome::Exhausted) | None) {
            break;
        }
    }
}

async fn cmd_archive(
    client: ApodClient,
    pages: u32,
    search: Option<String>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let mut store = ArchiveStore::new();
    load_pages(&mut store, &client, pages, today).await;

    if let Some(query) = search {
        store.set_query(query);
    }

    render::archive(&store);
    Ok(())
}

async fn cmd_show(client: ApodClient, date: &str, pages: u32, today: NaiveDate) -> anyhow::Result<()> {
    let date = parse_date(date)?;
    let mut store = ArchiveStore::new();

    for _ in 0..pages {
        if store.find(date).is_some() {
            break;
        }
        load_pages(&mut store, &client, 1, today).await;
        if store.is_exhausted() {
            break;
        }
    }

    let mut selection = Selection::new();
    match store.find(date) {
        Some(item) => selection.select(item),
        None => bail!(
            "{} is not among the {} loaded archive entries",
            date,
            store.len()
        ),
    }

    if let Some(detail) = selection.detail() {
        render::detail(&detail);
    }
    Ok(())
}

async fn cmd_download(
    settings: &Settings,
    client: ApodClient,
    date: Option<String>,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let date = hero_date(date.as_deref(), today)?;
    let mut lookup = HeroLookup::with_ttl(client, settings.hero_cache_ttl());
    let view = lookup.lookup(Some(date)).await;

    let Some(action) = view.download() else {
        if view.is_signal_lost() {
            bail!("{}: nothing to download", view.download_label());
        }
        bail!("entry for {} is not an image", date.key());
    };

    let dir = output.unwrap_or_else(|| settings.download_dir.clone());
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let pb = spinner(&format!("Downloading {}", action.filename));
    let bytes = lookup.api().download(&action.url).await;
    pb.finish_and_clear();
    let bytes = bytes.with_context(|| format!("failed to download {}", action.url))?;

    let path = dir.join(&action.filename);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!("Saved {} ({} bytes)", path.display(), bytes.len());
    println!("{}", path.display());
    Ok(())
}
