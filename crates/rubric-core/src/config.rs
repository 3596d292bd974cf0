use crate::engine::EngineOptions;
use crate::errors::ConfigError;
use crate::judge::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "fake"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub version: u32,
    pub judge: JudgeSettings,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    /// JSONL file evaluation results are appended to and analytics reads
    /// from. Absent means results live only for the process lifetime.
    #[serde(default)]
    pub results_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSettings {
    /// "openai" or "fake".
    pub provider: String,
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_seconds")]
    pub base_delay_seconds: u64,
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_seconds: default_base_delay_seconds(),
            jitter: default_jitter(),
        }
    }
}

impl RetrySettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_secs(self.base_delay_seconds),
            jitter: self.jitter,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    #[serde(default = "default_target_score")]
    pub target_score: f64,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            target_score: default_target_score(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_seconds() -> u64 {
    45
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_seconds() -> u64 {
    2
}

fn default_jitter() -> bool {
    true
}

fn default_target_score() -> f64 {
    8.0
}

impl EngineConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            retry: self.judge.retry.to_policy(),
            call_timeout: Duration::from_secs(self.judge.timeout_seconds),
            concurrency: self.batch.concurrency,
            target_score: self.analytics.target_score,
        }
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let cfg: EngineConfig = serde_yaml::from_str(&raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if !KNOWN_PROVIDERS.contains(&cfg.judge.provider.as_str()) {
        return Err(ConfigError(format!(
            "unknown judge provider '{}' (known: {})",
            cfg.judge.provider,
            KNOWN_PROVIDERS.join(", ")
        )));
    }
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, include_str!("../../../rubric.example.yaml"))
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("rubric.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn sample_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rubric.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.version, SUPPORTED_CONFIG_VERSION);
        assert_eq!(cfg.batch.concurrency, Some(4));
        assert_eq!(cfg.judge.retry.max_retries, 3);
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "version: 1\njudge:\n  provider: fake\n  model: fake-model\n",
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.judge.timeout_seconds, 45);
        assert_eq!(cfg.judge.max_tokens, 1024);
        assert_eq!(cfg.batch.concurrency, None);
        assert_eq!(cfg.analytics.target_score, 8.0);
    }

    #[test]
    fn unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "version: 9\njudge:\n  provider: fake\n  model: fake-model\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn unknown_provider_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "version: 1\njudge:\n  provider: crystal-ball\n  model: orb\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unknown judge provider"));
    }
}
