//! luscious-dl command line entry point
//!
//! Downloads single albums or works through the pending list, and edits the
//! persisted configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use luscious_dl::{
    AlbumDownloader, AlbumOutcome, AlbumRef, Config, DEFAULT_CONFIG_PATH, cancel_on_signal,
};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for luscious-dl
#[derive(Parser, Debug)]
#[command(name = "luscious-dl")]
#[command(about = "Resumable album downloader")]
#[command(version)]
struct Args {
    /// Configuration file, created with defaults if missing
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH, env = "LUSCIOUS_DL_CONFIG")]
    config: PathBuf,

    /// Print every pipeline event to stdout as a JSON line
    #[arg(long, global = true)]
    events: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download albums by URL or numeric ID
    Album {
        /// Album URLs or IDs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Fail when an album is blocked or has no pictures
        #[arg(long)]
        strict: bool,
    },
    /// Work through the pending list; Ctrl+C stops after the current album
    List,
    /// Show or edit the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the configuration as JSON
    Show,
    /// Set the directory albums are saved into
    SetDir {
        /// Output directory; empty means the working directory
        dir: String,
    },
    /// Switch worker pools on or off
    TogglePooling,
    /// Set the worker pool sizes
    SetPools {
        /// Concurrent image-page fetches
        links: usize,
        /// Concurrent image downloads
        downloads: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut config = Config::load_or_create(&args.config).await?;

    match args.command {
        Command::Config { action } => {
            edit_config(&mut config, action, &args.config).await?;
        }
        Command::Album { inputs, strict } => {
            let downloader = AlbumDownloader::new(config).await?;
            let printer = args.events.then(|| print_events(&downloader));
            let failures = download_albums(&downloader, &inputs, strict).await;
            finish_events(downloader, printer).await;

            let failures = failures?;
            if failures > 0 {
                return Err(format!("{failures} of {} albums failed", inputs.len()).into());
            }
        }
        Command::List => {
            let downloader = AlbumDownloader::new(config).await?;
            let printer = args.events.then(|| print_events(&downloader));
            let result = downloader.process_pending(&cancel_on_signal()).await;
            finish_events(downloader, printer).await;

            let summary = result?;
            println!(
                "completed: {}, blocked: {}, empty: {}, failed: {}, skipped: {}, duplicates: {}",
                summary.completed,
                summary.blocked,
                summary.empty,
                summary.failed,
                summary.skipped,
                summary.duplicates
            );
        }
    }

    Ok(())
}

/// Process each input in turn, returning how many failed
async fn download_albums(
    downloader: &AlbumDownloader,
    inputs: &[String],
    strict: bool,
) -> luscious_dl::Result<usize> {
    let base_url = downloader.config().base_url()?;
    let mut failures = 0usize;
    for input in inputs {
        let result = match AlbumRef::parse(input, &base_url) {
            Ok(album) => downloader.process_album(&album).await.and_then(|outcome| {
                if strict {
                    outcome.ensure_completed(album.id).map(AlbumOutcome::Completed)
                } else {
                    Ok(outcome)
                }
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(AlbumOutcome::Completed(summary)) => tracing::info!(
                input = %input,
                downloaded = summary.downloaded,
                skipped = summary.skipped,
                failed = summary.failed,
                "Done"
            ),
            Ok(outcome) => {
                tracing::info!(input = %input, outcome = ?outcome, "Nothing to download")
            }
            Err(e) => {
                tracing::error!(input = %input, error = %e, "Album failed");
                failures += 1;
            }
        }
    }

    Ok(failures)
}

async fn edit_config(
    config: &mut Config,
    action: ConfigAction,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
            return Ok(());
        }
        ConfigAction::SetDir { dir } => {
            config.set_output_dir(dir);
            println!("Output directory: {}", config.output_dir.display());
        }
        ConfigAction::TogglePooling => {
            let enabled = config.toggle_pooled_execution();
            println!("Pooled execution: {}", if enabled { "on" } else { "off" });
        }
        ConfigAction::SetPools { links, downloads } => {
            config.set_pool_sizes(links, downloads)?;
            println!("Pools: {links} link workers, {downloads} download workers");
        }
    }
    config.save(path).await?;
    Ok(())
}

fn print_events(downloader: &AlbumDownloader) -> JoinHandle<()> {
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event printer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Close the event channel and wait for the printer to flush what is left
async fn finish_events(downloader: AlbumDownloader, printer: Option<JoinHandle<()>>) {
    drop(downloader);
    if let Some(printer) = printer
        && let Err(e) = printer.await
    {
        tracing::warn!(error = %e, "Event printer stopped abnormally");
    }
}
