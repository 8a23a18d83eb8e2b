//! CLI entry point for the luscious downloader.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use luscious_core::transport::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, READ_TIMEOUT_SECS,
};
use luscious_core::{
    AlbumSearch, ClientConfig, Endpoints, Luscious, RetryPolicy, VideoQuality, VideoSearch,
};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod progress;

use app_config::FileConfig;
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let config = client_config(&args, &file_config);

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    let mut session = Luscious::new(config)
        .context("Failed to build HTTP client")?
        .with_cancel_flag(Arc::clone(&interrupted));
    if progress::should_use_bar(
        io::stderr().is_terminal(),
        args.quiet,
        progress::is_dumb_terminal(),
    ) {
        session = session.with_progress(Arc::new(progress::BarReporter::default()));
    }

    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        session
            .login(username, password)
            .await
            .context("Login failed")?;
    }

    let output_root = args
        .output
        .clone()
        .or_else(|| file_config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    match args.command {
        Command::Album { input, info } => {
            let album = session
                .get_album(entity_input(&input))
                .await
                .with_context(|| format!("Could not load album '{input}'"))?;
            if info {
                print_album(&album);
                return Ok(());
            }
            let result = session
                .download_album(&album, &output_root)
                .await
                .with_context(|| format!("Download of '{album}' did not complete"))?;
            info!(
                downloaded = result.downloaded(),
                existing = result.existing(),
                skipped = result.skipped(),
                "Download complete"
            );
            println!(
                "{}: {} downloaded, {} already present, {} skipped -> {}",
                album,
                result.downloaded(),
                result.existing(),
                result.skipped(),
                result.dir.display()
            );
        }
        Command::Video {
            input,
            quality,
            info,
        } => {
            let video = session
                .get_video(entity_input(&input))
                .await
                .with_context(|| format!("Could not load video '{input}'"))?;
            if info {
                print_video(&video);
                return Ok(());
            }
            let quality = quality
                .or(file_config.video_quality)
                .unwrap_or_default();
            let result = session
                .download_video(&video, &output_root, quality)
                .await
                .with_context(|| format!("Download of '{video}' did not complete"))?;
            if result.outcome.is_skipped() {
                warn!(path = %result.outcome.path().display(), "video download failed");
            }
            println!(
                "{}: {} -> {}",
                video,
                outcome_label(&result.outcome),
                result.outcome.path().display()
            );
        }
        Command::Search {
            query,
            page,
            sort,
            album_type,
            content,
            videos,
        } => {
            let listing = if videos {
                let search = VideoSearch::new(query).page(page).display(sort).content(content);
                session.search_video(&search).await?
            } else {
                let search = AlbumSearch::new(query)
                    .page(page)
                    .display(sort)
                    .album_type(album_type)
                    .content(content);
                session.search_album(&search).await?
            };
            println!(
                "page {}/{} ({} results)",
                listing.info.page, listing.info.total_pages, listing.info.total_items
            );
            for id in listing.items {
                println!("{id}");
            }
        }
        Command::Landing { limit } => {
            let landing = session.landing_page(limit).await?;
            for section in &landing.sections {
                let ids: Vec<String> = section.ids.iter().map(u64::to_string).collect();
                println!("{}: {}", section.title, ids.join(" "));
            }
        }
        Command::Random => {
            println!("{}", session.random_album_id().await?);
        }
    }

    if interrupted.load(Ordering::SeqCst) {
        warn!("Interrupted. Run again to resume.");
    }
    Ok(())
}

/// Merges CLI flags over file values over library defaults.
fn client_config(args: &Args, file: &FileConfig) -> ClientConfig {
    let max_retries = args
        .max_retries
        .or(file.max_retries)
        .unwrap_or(DEFAULT_MAX_RETRIES);
    let mut retry = RetryPolicy::with_max_retries(max_retries);
    if let Some(ms) = file.backoff_factor_ms {
        retry = retry.backoff_factor(Duration::from_millis(ms));
    }

    let mut config = ClientConfig::default()
        .timeouts(
            Duration::from_secs(file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS)),
            Duration::from_secs(file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS)),
        )
        .retry_policy(retry);
    if let Some(user_agent) = &file.user_agent {
        config = config.user_agent(user_agent.as_str());
    }
    if let Some(base) = &args.base_url {
        config = config.endpoints(Endpoints::with_base(base));
    }
    config
}

/// All-digit input is an id; anything else is treated as a URL.
fn entity_input(input: &str) -> luscious_core::EntityInput {
    match input.trim().parse::<u64>() {
        Ok(id) => id.into(),
        Err(_) => input.trim().into(),
    }
}

fn outcome_label(outcome: &luscious_core::ItemOutcome) -> &'static str {
    match outcome {
        luscious_core::ItemOutcome::Existing(_) => "already present",
        luscious_core::ItemOutcome::Downloaded(_) => "downloaded",
        luscious_core::ItemOutcome::Skipped(_) => "skipped",
    }
}

fn print_album(album: &luscious_core::Album) {
    println!("{} ({})", album.name(), album.id());
    println!("url: {}", album.url());
    println!(
        "pictures: {} (+{} animated){}",
        album.picture_count(),
        album.animated_count(),
        if album.is_manga() { ", manga" } else { "" }
    );
    if album.ongoing() {
        println!("status: ongoing");
    }
    if let Some(content) = album.content_type() {
        println!("content: {content}");
    }
    let artists = album.artists();
    if !artists.is_empty() {
        println!("artists: {}", artists.join(", "));
    }
    let tags: Vec<String> = album.tags().iter().map(luscious_core::Tag::hashtag).collect();
    if !tags.is_empty() {
        println!("tags: {}", tags.join(" "));
    }
}

fn print_video(video: &luscious_core::Video) {
    println!("{} ({})", video.name(), video.id());
    println!("url: {}", video.url());
    for quality in VideoQuality::ALL {
        if let Some(url) = video.content_url(quality) {
            println!("{quality}: {url}");
        }
    }
}
