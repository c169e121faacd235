//! ytcache - watch video channel feeds and download new episodes of tracked series
//!
//! Command line entry point.
//!
//! # Commands
//!
//! - `ytcache check`: fetch every configured channel's feed, download new items that
//!   match a series and record everything seen. Meant to run from a scheduler.
//! - `ytcache add-channel [URL]`: register a channel from its URL (prompted for when omitted).
//! - `ytcache explore`: browse a channel's playlists and videos interactively, download a
//!   video, a range or a whole playlist, and optionally start monitoring the playlist.
//!
//! # Execution Flow
//!
//! 1. Resolve settings (defaults, `YTCACHE_*` variables, `YT_API_KEY`)
//! 2. Initialize logging → `<library_root>/<prefix>.log.<year>-W<week>`
//! 3. Create a current-thread tokio runtime; all work runs sequentially on it
//! 4. Run the command; any error is logged, printed and turned into exit status 1
//!
//! # Configuration Files
//!
//! Expected in the library root (default `/data/share`):
//! - `channels.json`: watched channels, their series and the ids already handled

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use ytcache::explorer::{Explorer, Prompter, TerminalPrompter};
use ytcache::logging::{self, CHANNELS_LOG, CHECK_LOG};
use ytcache::services::{
    Reconciler, YouTubeApi, YouTubeFeed, YoutubeDl, check_new_channel, parse_channel_url,
    register_channel,
};
use ytcache::{APP_NAME, ChannelStore, Settings, VERSION};

#[derive(Debug, Parser)]
#[command(name = "ytcache", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check every channel's feed and download new episodes
    Check,

    /// Register a channel from its URL
    AddChannel {
        /// Channel URL, e.g. https://www.youtube.com/channel/<id>
        url: Option<String>,
    },

    /// Browse a channel's playlists and download videos
    Explore,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_prefix = match cli.command {
        Command::Check => CHECK_LOG,
        Command::AddChannel { .. } | Command::Explore => CHANNELS_LOG,
    };
    let _guard = match logging::setup_logging(
        &settings.library_root,
        log_prefix,
        settings.debug,
        settings.debug,
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")
        .and_then(|runtime| runtime.block_on(run(cli.command, &settings)));

    match result {
        Ok(()) => {
            tracing::info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Check => check(settings).await,
        Command::AddChannel { url } => add_channel(settings, url).await,
        Command::Explore => explore(settings).await,
    }
}

/// Reconcile every channel, then persist the whole store once
async fn check(settings: &Settings) -> Result<()> {
    let store = ChannelStore::new(&settings.library_root);
    let mut channels = store.load()?;

    let feeds = YouTubeFeed::new(&settings.feed_url);
    let downloader = YoutubeDl::new(&settings.downloader, &settings.container_format);
    let reconciler = Reconciler::new(&feeds, &downloader, &settings.library_root);

    let report = reconciler.reconcile_all(&mut channels).await?;
    store.save(&channels)?;

    tracing::info!(
        "Checked {} channels: {} new videos, {} skipped, {} downloaded ({} failed)",
        channels.len(),
        report.checked,
        report.skipped,
        report.downloaded,
        report.failed
    );
    Ok(())
}

async fn add_channel(settings: &Settings, url: Option<String>) -> Result<()> {
    let store = ChannelStore::new(&settings.library_root);

    let url = match url {
        Some(url) => url,
        None => {
            let prompter = TerminalPrompter::new();
            loop {
                let url = prompter.input("Paste the channel URL here", None)?;
                if parse_channel_url(&url).is_some() {
                    break url;
                }
            }
        }
    };

    // URL and duplicate problems are reported even without an API key
    check_new_channel(&store, &url)?;
    let api = YouTubeApi::new(&settings.api_url, settings.require_api_key()?);

    let channel = register_channel(&store, &api, &url).await?;
    println!(
        "Added '{}' ({}) to the '{}' config!",
        channel.name,
        channel.id,
        ytcache::config::CHANNELS_FILE
    );
    println!("Config file located at [{}].", store.path());
    Ok(())
}

async fn explore(settings: &Settings) -> Result<()> {
    let api = YouTubeApi::new(&settings.api_url, settings.require_api_key()?);
    let downloader = YoutubeDl::new(&settings.downloader, &settings.container_format);
    let prompter = TerminalPrompter::new();
    let store = ChannelStore::new(&settings.library_root);

    let explorer = Explorer::new(&api, &downloader, &prompter, &store, &settings.library_root);
    let outcome = explorer.run().await?;

    tracing::info!(
        "Explorer finished: {} into {} ({})",
        outcome.selector,
        outcome.destination,
        if outcome.download.succeeded() {
            "ok"
        } else {
            "failed"
        }
    );
    Ok(())
}
