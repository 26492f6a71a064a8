//! Pass configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file named by
//! `PREPASS_CONFIG_PATH`, then `PREPASS_*` environment variables (a `.env` file in
//! the working directory is loaded first). Builder overrides apply last.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "PREPASS";
const CONFIG_PATH_VAR: &str = "PREPASS_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepassConfig {
    /// Pause the walk when a time slice runs out
    pub cooperative_yield: bool,

    /// Length of one time slice in milliseconds
    pub yield_after_ms: u64,

    /// Render-phase updates allowed per component evaluation
    pub rerender_limit: usize,
}

impl Default for PrepassConfig {
    fn default() -> Self {
        PrepassConfig {
            cooperative_yield: true,
            yield_after_ms: 5,
            rerender_limit: 25,
        }
    }
}

impl PrepassConfig {
    pub fn builder() -> PrepassConfigBuilder {
        PrepassConfigBuilder::default()
    }

    /// Load from the environment and the optional config file
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    pub fn yield_after(&self) -> Duration {
        Duration::from_millis(self.yield_after_ms)
    }

    fn from_sources(config_path: Option<&Path>, with_env: bool) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true),
            );
        }

        let loaded = builder
            .build()
            .context("Failed to read prepass configuration")?;
        loaded
            .try_deserialize()
            .context("Invalid prepass configuration")
    }

    fn validate(&self) -> Result<()> {
        if self.rerender_limit == 0 {
            anyhow::bail!("rerender_limit must be at least 1");
        }
        Ok(())
    }
}

/// Builder for [`PrepassConfig`] with explicit overrides
#[derive(Debug, Default)]
pub struct PrepassConfigBuilder {
    config_path: Option<PathBuf>,
    skip_env: bool,
    cooperative_yield: Option<bool>,
    yield_after_ms: Option<u64>,
    rerender_limit: Option<usize>,
}

impl PrepassConfigBuilder {
    /// Read this TOML file instead of `PREPASS_CONFIG_PATH`
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Ignore `.env` and the environment; only an explicit config path is read
    pub fn defaults_only(mut self) -> Self {
        self.skip_env = true;
        self
    }

    pub fn cooperative_yield(mut self, enabled: bool) -> Self {
        self.cooperative_yield = Some(enabled);
        self
    }

    pub fn yield_after_ms(mut self, ms: u64) -> Self {
        self.yield_after_ms = Some(ms);
        self
    }

    pub fn rerender_limit(mut self, limit: usize) -> Self {
        self.rerender_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<PrepassConfig> {
        let mut config = if self.skip_env {
            match &self.config_path {
                Some(path) => PrepassConfig::from_sources(Some(path.as_path()), false)?,
                None => PrepassConfig::default(),
            }
        } else {
            // missing .env is fine
            let _ = dotenvy::dotenv();
            let path = self
                .config_path
                .clone()
                .or_else(|| std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from));
            PrepassConfig::from_sources(path.as_deref(), true)?
        };

        if let Some(enabled) = self.cooperative_yield {
            config.cooperative_yield = enabled;
        }
        if let Some(ms) = self.yield_after_ms {
            config.yield_after_ms = ms;
        }
        if let Some(limit) = self.rerender_limit {
            config.rerender_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }
}
