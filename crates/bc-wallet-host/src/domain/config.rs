//! Wallet host configuration with validation.
//!
//! Loaded from TOML with `BCW_*` environment overrides on top. Durations are
//! written as `"300s"`, `"500ms"` or `"5m"`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main wallet host configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Transport identity checks
    pub trust: TrustConfig,
    /// Pending approval lifetime and sweep
    pub approvals: ApprovalConfig,
    /// Approval window geometry
    pub surface: SurfaceConfig,
    /// Collaborator call limits
    pub collaborators: CollaboratorConfig,
    /// Simulated content store
    pub storage: StorageConfig,
    /// Inbound relay
    pub relay: RelayConfig,
}

impl HostConfig {
    /// Parse from TOML text. Missing sections take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `BCW_*` overrides from `vars`.
    ///
    /// Unknown `BCW_*` keys are ignored; malformed values are errors.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "BCW_EXTENSION_ID" => self.trust.extension_id = value,
                "BCW_APPROVAL_TIMEOUT" => self.approvals.timeout = env_duration(&key, &value)?,
                "BCW_SWEEP_INTERVAL" => self.approvals.sweep_interval = env_duration(&key, &value)?,
                "BCW_COLLABORATOR_TIMEOUT" => self.collaborators.timeout = env_duration(&key, &value)?,
                "BCW_SURFACE_WIDTH" => self.surface.width = env_number(&key, &value)?,
                "BCW_SURFACE_HEIGHT" => self.surface.height = env_number(&key, &value)?,
                "BCW_CACHE_CAPACITY" => self.storage.cache_capacity = env_number(&key, &value)?,
                "BCW_REPLAY_WINDOW" => self.relay.replay_window = env_duration(&key, &value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trust.extension_id.trim().is_empty() {
            return Err(ConfigError::Invalid("extension_id cannot be empty".into()));
        }

        if self.approvals.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "approval timeout cannot be 0".into(),
            ));
        }
        if self.approvals.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "sweep interval cannot be 0".into(),
            ));
        }
        if self.collaborators.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "collaborator timeout cannot be 0".into(),
            ));
        }

        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(ConfigError::InvalidLimit(
                "surface dimensions cannot be 0".into(),
            ));
        }
        if self.storage.cache_capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "cache_capacity cannot be 0".into(),
            ));
        }
        if self.relay.runtime_capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "runtime_capacity cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Transport identity configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Only senders stamped with this extension id are served
    pub extension_id: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            extension_id: "bc-wallet".into(),
        }
    }
}

/// Pending approval configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Lifetime of an unanswered approval (default: 5 minutes)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// How often expired approvals are swept
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(10),
        }
    }
}

/// Approval window geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

/// Collaborator call configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Upper bound on one account/storage/signing call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Simulated content store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Entries kept before the oldest is evicted
    pub cache_capacity: usize,
    /// Simulated latency of store/retrieve
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
    /// Node ids whose connection test fails
    pub unreachable_nodes: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            latency: Duration::ZERO,
            unreachable_nodes: Vec::new(),
        }
    }
}

/// Inbound relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// How long a call id is remembered for replay detection
    #[serde(with = "humantime_serde")]
    pub replay_window: Duration,
    /// Runtime channel depth
    pub runtime_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            replay_window: Duration::from_secs(600),
            runtime_capacity: shared_bus::DEFAULT_RUNTIME_CAPACITY,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration text could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn env_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime_serde::parse_duration(value)
        .map_err(|e| ConfigError::Invalid(format!("{key}: {e}")))
}

fn env_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}: expected a number, got {value:?}")))
}

/// Duration serialization as `"300s"` / `"250ms"` / `"5m"`
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            // Plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
