// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::signal::{synth::CHART_STEP, DEFAULT_WINDOW_CAPACITY};
/// Environment variable that overrides `llm.api_key`.
pub const LLM_API_KEY_ENV: &str = "NEUROTWIN_LLM_API_KEY";
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
/// Settings for the whole dashboard. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub window_capacity: usize,
    pub live_period_ms: u64,
    pub chart_period_ms: u64,
    pub chart_step: f64,
    pub fit_latency: FitLatency,
    pub llm: LlmSettings,
    pub refresh_interval_minutes: u32,
    pub retention_days: u32,
    pub auto_sync: bool,
}
impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_owned(),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            live_period_ms: 1_000,
            chart_period_ms: 100,
            chart_step: CHART_STEP,
            fit_latency: FitLatency::default(),
            llm: LlmSettings::default(),
            refresh_interval_minutes: 5,
            retention_days: 7,
            auto_sync: true,
        }
    }
}
impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
    /// Load `path` if given, otherwise defaults; then apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(LLM_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        self
    }
    pub fn live_period(&self) -> Duration {
        Duration::from_millis(self.live_period_ms)
    }
    pub fn chart_period(&self) -> Duration {
        Duration::from_millis(self.chart_period_ms)
    }
}
/// Simulated fitness-tracker round trips, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitLatency {
    pub initialize_ms: u64,
    pub authorize_ms: u64,
    pub revoke_ms: u64,
    pub sync_ms: u64,
    pub fetch_ms: u64,
}
impl Default for FitLatency {
    fn default() -> Self {
        Self {
            initialize_ms: 1_000,
            authorize_ms: 2_000,
            revoke_ms: 1_000,
            sync_ms: 1_500,
            fetch_ms: 1_500,
        }
    }
}
impl FitLatency {
    pub fn none() -> Self {
        Self {
            initialize_ms: 0,
            authorize_ms: 0,
            revoke_ms: 0,
            sync_ms: 0,
            fetch_ms: 0,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: Option<String>,
}
impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_owned(),
            model: "nvidia/llama3-70b-instruct".to_owned(),
            temperature: 0.7,
            max_tokens: 1_000,
            api_key: None,
        }
    }
}
