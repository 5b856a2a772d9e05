//! Configuration Module - TOML-based Diary Configuration
//!
//! Loads and validates configuration from `diary.toml`. Every section
//! has defaults, so an absent file or an empty section is valid.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::domain::unlock::UnlockRules;

/// Top-level diary configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Identity and logging.
  pub diary: DiaryConfig,
  /// Key-value providers.
  pub storage: StorageConfig,
  /// Unlock mini-game rules.
  pub unlock: UnlockConfig,
}

/// Diary identity and logging.
#[derive(Debug, Clone, Deserialize)]
pub struct DiaryConfig {
  /// Title shown in the terminal header.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Log line format.
  #[serde(default)]
  pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// Human-readable single line.
  #[default]
  Compact,
  /// Structured JSON lines.
  Json,
}

/// Storage provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
  /// Directory for the primary provider. No primary when unset.
  #[serde(default)]
  pub primary_dir: Option<String>,
  /// Snapshot file of the local (fallback) store.
  #[serde(default = "default_local_path")]
  pub local_path: String,
  /// Byte limit of the local store.
  #[serde(default = "default_local_quota")]
  pub local_quota_bytes: usize,
}

/// Unlock mini-game configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockConfig {
  /// Taps needed within the time limit.
  #[serde(default = "default_tap_threshold")]
  pub tap_threshold: u32,
  /// Tapping time limit (milliseconds).
  #[serde(default = "default_time_limit_ms")]
  pub time_limit_ms: u64,
  /// Countdown granularity (milliseconds).
  #[serde(default = "default_tick_ms")]
  pub tick_ms: u64,
  /// Drag distance that pulls the ribbon.
  #[serde(default = "default_ribbon_pull_distance")]
  pub ribbon_pull_distance: u32,
}

impl UnlockConfig {
  /// Game rules derived from this section.
  pub const fn rules(&self) -> UnlockRules {
    UnlockRules {
      tap_threshold: self.tap_threshold,
      time_limit: Duration::from_millis(self.time_limit_ms),
      ribbon_pull_distance: self.ribbon_pull_distance,
    }
  }

  /// Countdown granularity.
  pub const fn tick(&self) -> Duration {
    Duration::from_millis(self.tick_ms)
  }
}

impl Default for DiaryConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      log_format: LogFormat::default(),
    }
  }
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      primary_dir: None,
      local_path: default_local_path(),
      local_quota_bytes: default_local_quota(),
    }
  }
}

impl Default for UnlockConfig {
  fn default() -> Self {
    Self {
      tap_threshold: default_tap_threshold(),
      time_limit_ms: default_time_limit_ms(),
      tick_ms: default_tick_ms(),
      ribbon_pull_distance: default_ribbon_pull_distance(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "Our Diary".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_local_path() -> String {
  "data/local_storage.json".to_string()
}

const fn default_local_quota() -> usize {
  5 * 1024 * 1024 // 5 MiB, like browser local storage
}

const fn default_tap_threshold() -> u32 {
  30
}

const fn default_time_limit_ms() -> u64 {
  5000
}

const fn default_tick_ms() -> u64 {
  100
}

const fn default_ribbon_pull_distance() -> u32 {
  100
}
