use serde::Deserialize;
use std::path::PathBuf;

use crate::models::SchemaDefaults;
use crate::risk::RiskThresholds;

pub const DEFAULT_MODEL_PATH: &str = "models/credit_model.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    pub model_sha256: Option<String>,
    pub schema_defaults_path: Option<PathBuf>,
    pub risk_medium_threshold: f64,
    pub risk_high_threshold: f64,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_sha256: None,
            schema_defaults_path: None,
            risk_medium_threshold: RiskThresholds::DEFAULT_MEDIUM,
            risk_high_threshold: RiskThresholds::DEFAULT_HIGH,
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

fn optional_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|s| !s.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
    expected: &str,
) -> anyhow::Result<T> {
    match optional_var(lookup, name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be {}, got '{}'", name, expected, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup, e.g. the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            port: parse_var(&lookup, "PORT", defaults.port, "a valid number between 1-65535")?,
            model_path: optional_var(&lookup, "MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            model_sha256: optional_var(&lookup, "MODEL_SHA256")
                .map(|hash| {
                    let hash = hash.trim().to_string();
                    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                        anyhow::bail!("MODEL_SHA256 must be a 64 character hex digest");
                    }
                    Ok(hash)
                })
                .transpose()?,
            schema_defaults_path: optional_var(&lookup, "SCHEMA_DEFAULTS_PATH").map(PathBuf::from),
            risk_medium_threshold: parse_var(
                &lookup,
                "RISK_MEDIUM_THRESHOLD",
                defaults.risk_medium_threshold,
                "a number",
            )?,
            risk_high_threshold: parse_var(
                &lookup,
                "RISK_HIGH_THRESHOLD",
                defaults.risk_high_threshold,
                "a number",
            )?,
            rate_limit_per_second: parse_var(
                &lookup,
                "RATE_LIMIT_PER_SECOND",
                defaults.rate_limit_per_second,
                "a positive integer",
            )?,
            rate_limit_burst: parse_var(
                &lookup,
                "RATE_LIMIT_BURST",
                defaults.rate_limit_burst,
                "a positive integer",
            )?,
        };

        // Fail fast on thresholds that would break bucket ordering
        config.risk_thresholds()?;
        if config.rate_limit_per_second == 0 || config.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be positive");
        }

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model path: {}", config.model_path.display());
        if config.model_sha256.is_some() {
            tracing::info!("Model checksum verification enabled");
        }
        if let Some(ref path) = config.schema_defaults_path {
            tracing::info!("Schema defaults override: {}", path.display());
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Interval after which the limiter replenishes one request, so that
    /// `rate_limit_per_second` requests are allowed each second on average.
    /// Rates above 1000 per second are capped at one request per millisecond.
    pub fn rate_limit_period_ms(&self) -> u64 {
        (1000 / self.rate_limit_per_second.max(1)).max(1)
    }

    pub fn risk_thresholds(&self) -> anyhow::Result<RiskThresholds> {
        RiskThresholds::new(self.risk_medium_threshold, self.risk_high_threshold)
            .map_err(|e| anyhow::anyhow!("RISK_MEDIUM_THRESHOLD/RISK_HIGH_THRESHOLD: {}", e))
    }

    /// Loads the schema defaults, applying the override file when configured.
    pub fn schema_defaults(&self) -> anyhow::Result<SchemaDefaults> {
        let Some(path) = &self.schema_defaults_path else {
            return Ok(SchemaDefaults::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read schema defaults {}: {}", path.display(), e)
        })?;
        let defaults = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("failed to parse schema defaults {}: {}", path.display(), e)
        })?;
        Ok(defaults)
    }
}
