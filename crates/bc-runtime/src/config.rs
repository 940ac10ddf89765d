//! Runtime configuration: the host's settings plus the page provider's.
//!
//! ```toml
//! [host.approvals]
//! timeout = "300s"
//!
//! [provider]
//! call_timeout_ms = 330000
//! ```
//!
//! Values come from the file first, then `BCW_*` environment overrides.

use anyhow::{Context, Result};
use bc_page_provider::ProviderConfig;
use bc_wallet_host::HostConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Everything the `bc-wallet` binary reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub host: HostConfig,
    pub provider: ProviderConfig,
}

impl RuntimeConfig {
    /// Load from `path` (defaults when absent), apply the process
    /// environment and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config")
    }

    /// Apply `BCW_*` overrides. `BCW_CALL_TIMEOUT_MS` is the page-side one.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        for (key, value) in &vars {
            if key == "BCW_CALL_TIMEOUT_MS" {
                self.provider.call_timeout_ms = value
                    .parse()
                    .with_context(|| format!("{key}: expected milliseconds, got {value:?}"))?;
            }
        }
        self.host.apply_env(vars)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.host.validate()?;
        if self.provider.call_timeout_ms == 0 {
            anyhow::bail!("provider.call_timeout_ms must be greater than zero");
        }
        if self.provider.call_timeout() <= self.host.approvals.timeout {
            warn!(
                call_timeout_ms = self.provider.call_timeout_ms,
                approval_timeout_secs = self.host.approvals.timeout.as_secs(),
                "Page calls may time out before their approvals do"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.provider.call_timeout() > config.host.approvals.timeout);
    }

    #[test]
    fn test_nested_tables() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [host.approvals]
            timeout = "90s"

            [host.trust]
            extension_id = "wallet-dev"

            [provider]
            call_timeout_ms = 120000
            "#,
        )
        .unwrap();
        assert_eq!(config.host.approvals.timeout, Duration::from_secs(90));
        assert_eq!(config.host.trust.extension_id, "wallet-dev");
        assert_eq!(config.provider.call_timeout_ms, 120_000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RuntimeConfig::default();
        config
            .apply_env(vec![
                ("BCW_CALL_TIMEOUT_MS".to_string(), "5000".to_string()),
                ("BCW_APPROVAL_TIMEOUT".to_string(), "2s".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
            ])
            .unwrap();
        assert_eq!(config.provider.call_timeout_ms, 5000);
        assert_eq!(config.host.approvals.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = RuntimeConfig::default();
        assert!(config
            .apply_env(vec![("BCW_CALL_TIMEOUT_MS".to_string(), "soon".to_string())])
            .is_err());

        config.provider.call_timeout_ms = 0;
        assert!(config.validate().is_err());
        assert!(RuntimeConfig::from_toml_str("[provider]\ncall_timeout_ms = \"x\"").is_err());
    }
}
