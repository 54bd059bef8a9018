//! Entry point for the terminal chapter reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Load the story file and hand it to the runtime.

mod cancellation;
mod piper_device;
mod runtime;
mod shortcuts;
mod story;

use crate::runtime::Runtime;
use crate::story::Story;
use anyhow::{Context, Result, anyhow};
use readaloud_core::{AppConfig, autoplay_requested, load_config, serialize_config};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let (story_path, chapter) = parse_args()?;
    let config_path = Path::new("conf/config.toml");
    seed_config(config_path);
    let config = load_config(config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %story_path.display(),
        level = %config.log_level,
        "Starting chapter reader"
    );
    info!(
        voices_dir = %config.voices_dir,
        espeak = %config.espeak_path,
        language = %config.target_language,
        auto_next = config.auto_next,
        "Active read-aloud configuration"
    );

    let story = Story::load(&story_path)?;
    let (start, autoplay) = match chapter.as_deref() {
        Some(route) => parse_chapter_route(route),
        None => (story.first_chapter_id().to_string(), false),
    };
    let runtime = Runtime::new(config, story).context("Failed to start the speech device")?;
    runtime.run(&start, autoplay)
}

/// `42` or `42?autoplay=true`, the route form navigation requests use.
fn parse_chapter_route(route: &str) -> (String, bool) {
    let route = route.trim().trim_start_matches("chapter/");
    match route.split_once('?') {
        Some((id, query)) => (id.to_string(), autoplay_requested(query)),
        None => (route.to_string(), false),
    }
}

/// Write the default settings on first run so they can be edited.
fn seed_config(path: &Path) {
    if path.exists() {
        return;
    }
    let written = serialize_config(&AppConfig::default()).and_then(|contents| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    });
    match written {
        Ok(()) => info!(path = %path.display(), "Wrote default config"),
        Err(err) => warn!(path = %path.display(), "Failed to write default config: {err:#}"),
    }
}

fn parse_args() -> Result<(PathBuf, Option<String>)> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: chapter-reader <story.json> [chapter-id[?autoplay=true]]"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok((path, args.next()))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!(%level, "RUST_LOG is set; keeping its filter");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
