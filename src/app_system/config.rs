use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "CATALOG_BASE_URL";

/// What the product/category join does with a product whose category is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Keep the product with no category name.
    #[default]
    TagUnmatched,
    /// End the joined stream with `CatalogError::CategoryNotFound`.
    FailBatch,
}

/// Runtime configuration for a catalog system.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub products_path: String,
    pub categories_path: String,
    pub suppliers_path: String,
    pub request_timeout_ms: u64,
    pub supplier_concurrency: usize,
    pub channel_buffer: usize,
    pub join_policy: JoinPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200/".to_string(),
            products_path: "api/products".to_string(),
            categories_path: "api/categories".to_string(),
            suppliers_path: "api/suppliers".to_string(),
            request_timeout_ms: 10_000,
            supplier_concurrency: 4,
            channel_buffer: 32,
            join_policy: JoinPolicy::TagUnmatched,
        }
    }
}

impl CatalogConfig {
    /// Loads the config from a TOML file, or defaults when no path is given,
    /// then applies the environment override and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Reading config file");
                Self::from_toml(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            info!(%base_url, "Base URL overridden from environment");
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {:?}: {}", self.base_url, e)))?;
        if self.supplier_concurrency == 0 {
            return Err(ConfigError::Invalid("supplier_concurrency must be at least 1".to_string()));
        }
        if self.channel_buffer == 0 {
            return Err(ConfigError::Invalid("channel_buffer must be at least 1".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
