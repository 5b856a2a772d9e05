//! Couples Diary — Entry Point
//!
//! Wiring sequence:
//! 1. Load diary.toml (path from the first argument) + validate
//! 2. Init tracing (compact or JSON, to stderr)
//! 3. Open the local store snapshot (the fallback provider)
//! 4. Open the primary directory provider, if configured
//! 5. Select the storage strategy and build the letter repository
//! 6. Run the terminal session until `quit` or end of input

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use couples_diary::adapters::persistence::KvLetterRepository;
use couples_diary::adapters::storage::{self, DirectoryProvider, FileLocalStore};
use couples_diary::config::{self, AppConfig, LogFormat};
use couples_diary::ports::kv_store::KvProvider;
use couples_diary::usecases::DiarySession;

mod terminal;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "diary.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize logging ───────────────────────────────
    init_tracing(&config);

    info!(
        name = %config.diary.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting diary"
    );

    // ── 3. Local store (always present) ─────────────────────
    let local = Arc::new(
        FileLocalStore::open(
            &config.storage.local_path,
            Some(config.storage.local_quota_bytes),
        )
        .context("Failed to open local storage")?,
    );

    // ── 4. Primary provider (optional) ──────────────────────
    let primary = open_primary(&config).await;

    // ── 5. Storage strategy + repository ────────────────────
    let adapter = storage::select_adapter(primary, local);
    let repository = Arc::new(KvLetterRepository::new(adapter));
    let session = DiarySession::new(repository, &config.unlock);

    // ── 6. Terminal session ─────────────────────────────────
    terminal::run(session, &config)
        .await
        .context("Terminal session failed")?;

    info!("Diary closed");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.diary.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.diary.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().with_target(false).init(),
    }
}

/// Open the configured primary provider. Failure means running without one.
async fn open_primary(config: &AppConfig) -> Option<Arc<dyn KvProvider>> {
    let dir = config.storage.primary_dir.as_deref()?;
    match DirectoryProvider::new(dir).await {
        Ok(provider) => {
            info!(dir, "Primary storage available");
            Some(Arc::new(provider))
        }
        Err(e) => {
            warn!(dir, error = %e, "Primary storage unavailable, using local storage only");
            None
        }
    }
}
