//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `diary.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File exists but can't be read
/// - TOML parsing fails
/// - Validation rules are violated
///
/// A missing file is not an error: defaults are used.
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
      .with_context(|| format!("Invalid config file: {}", path.display()))?
  } else {
    info!(path = %path.display(), "No config file, using defaults");
    AppConfig::default()
  };

  info!(
    primary = config.storage.primary_dir.is_some(),
    local_path = %config.storage.local_path,
    tap_threshold = config.unlock.tap_threshold,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse TOML")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.storage.local_path.trim().is_empty(),
    "storage.local_path must not be empty"
  );
  anyhow::ensure!(
    config.storage.local_quota_bytes > 0,
    "storage.local_quota_bytes must be positive"
  );
  if let Some(dir) = &config.storage.primary_dir {
    anyhow::ensure!(
      !dir.trim().is_empty(),
      "storage.primary_dir must not be empty when set"
    );
  }

  anyhow::ensure!(
    config.unlock.tap_threshold > 0,
    "unlock.tap_threshold must be positive"
  );
  anyhow::ensure!(
    config.unlock.time_limit_ms > 0,
    "unlock.time_limit_ms must be positive"
  );
  anyhow::ensure!(
    config.unlock.tick_ms > 0 && config.unlock.tick_ms <= config.unlock.time_limit_ms,
    "unlock.tick_ms must be in (0, time_limit_ms], got {}",
    config.unlock.tick_ms
  );

  Ok(())
}
