//! Vibe Coach - terminal front end.
//!
//! ```text
//! main() -> App::run(stdin) -> handle_line() -> vibe_core (Session, Conversation)
//!                                                   |
//!                                                   v
//!                                  ReplyRouter (direct Gemini -> proxy -> degraded)
//! ```
//!
//! Logs go to `~/.vibe/logs/vibe.log`, never to the terminal.

mod app;
mod command;
mod render;

use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vibe_config::{FileTutorialFlag, VibeConfig};
use vibe_core::{ContentStore, TutorialPrompt};
use vibe_providers::{GeminiClient, ProxyClient, ReplyRouter};

use crate::app::App;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than interleave logs with the game.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = vibe_config::vibe_dir() {
        candidates.push(dir.join("logs").join("vibe.log"));
    }
    candidates.push(PathBuf::from(".vibe").join("logs").join("vibe.log"));
    candidates
}

fn reply_router(config: &VibeConfig) -> ReplyRouter {
    let direct = config.client_key().map(|key| {
        GeminiClient::new(key)
            .with_model(&config.gemini.model)
            .with_base_url(&config.gemini.base_url)
            .with_timeout(config.gemini.timeout())
    });
    let proxy = config
        .proxy
        .enabled_url()
        .map(|url| ProxyClient::new(url).with_timeout(config.proxy.timeout()));
    ReplyRouter::new(direct, proxy)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match VibeConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("⚠ {e}; using defaults");
            VibeConfig::default()
        }
    };
    let router = reply_router(&config);
    tracing::info!(
        direct = router.has_direct(),
        proxy = router.has_proxy(),
        model = %config.gemini.model,
        "Reply routes configured"
    );
    if !router.has_direct() && !router.has_proxy() {
        eprintln!("⚠ No reply route configured; every answer will be a fallback line.");
    }

    let content = ContentStore::load_builtin().context("built-in content tables are invalid")?;
    let state_path = vibe_config::state_path()
        .unwrap_or_else(|| PathBuf::from(".vibe").join("state.toml"));
    let tutorial = TutorialPrompt::new(FileTutorialFlag::open(state_path));

    let mut app = App::new(
        content,
        router,
        tutorial,
        StdRng::from_os_rng(),
        io::stdout(),
    );
    app.run(BufReader::new(tokio::io::stdin()))
        .await
        .context("terminal I/O failed")?;

    tracing::info!("Session ended");
    Ok(())
}
