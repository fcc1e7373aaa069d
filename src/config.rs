//! File-based configuration for the binaries.
//!
//! Both sections are optional; omitted values fall back to the defaults the
//! engine ships with.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::engine::ResolverConfig;
use crate::nvdb::NetworkConfig;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub resolver: ResolverConfig,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MatchMode;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [resolver]
            radius_m = 80.0
            mode = "naive"
        "#,
        )
        .unwrap();

        assert_eq!(config.resolver.radius_m, 80.0);
        assert_eq!(config.resolver.mode, MatchMode::Naive);
        assert_eq!(config.resolver.max_candidates, 5);
        assert_eq!(config.network.timeout_secs, 10);
        assert!(config.network.base_url.contains("vegvesen"));
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.resolver.continuity_tolerance_m, 30.0);
        assert_eq!(config.resolver.mode, MatchMode::Sticky);
    }
}
