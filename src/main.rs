use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitewatch::config::{Config, LoggingConfig, StoreHandleMode};

mod commands;

#[derive(Parser)]
#[command(
    name = "sitewatch",
    version,
    about = "Watch a website for new job postings, articles, press releases and media",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); SITEWATCH_* variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the site once, record new pages and publish notifications
    Crawl {
        /// Seed URL (repeatable); replaces the configured seeds
        #[arg(long = "seed")]
        seeds: Vec<String>,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// SQLite database path
        #[arg(long)]
        database: Option<PathBuf>,

        /// Store handle mode (per_worker, shared)
        #[arg(long)]
        store_mode: Option<StoreHandleMode>,

        /// Log notifications instead of sending them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Summary format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show what the link store holds
    Stats {
        /// SQLite database path
        #[arg(long)]
        database: Option<PathBuf>,

        /// Show the record for one URL
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // Initialize tracing/logging
    setup_tracing(&config.logging, cli.verbose)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sitewatch starting");

    match cli.command {
        Commands::Crawl {
            seeds,
            workers,
            database,
            store_mode,
            dry_run,
            format,
        } => {
            if !seeds.is_empty() {
                config.crawler.seeds = seeds;
            }
            if let Some(workers) = workers {
                config.crawler.workers = workers;
            }
            if let Some(database) = database {
                config.database.sqlite_path = database;
            }
            if let Some(mode) = store_mode {
                config.database.handle_mode = mode;
            }
            config.publisher.dry_run |= dry_run;

            commands::crawl(config, &format).await?;
        }
        Commands::Stats { database, url } => {
            if let Some(database) = database {
                config.database.sqlite_path = database;
            }
            commands::stats(&config, url.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config
        .apply_env()
        .context("Invalid SITEWATCH_* environment variable")?;
    Ok(config)
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("sitewatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("sitewatch={},warn", logging.level))
        })
    };

    let (writer, ansi) = match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_ansi(ansi)
                        .with_writer(writer),
                )
                .init();
        }
    }

    Ok(())
}
