use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use heritage::CommonsConfig;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub data_url: String,
    pub data_query: Option<String>,
    pub commons_api_url: Option<String>,
    pub thumbnail_width: u32,
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            data_url: env::var("HERITAGE_DATA_URL").context("HERITAGE_DATA_URL must be set")?,
            data_query: env::var("HERITAGE_DATA_QUERY")
                .ok()
                .filter(|q| !q.trim().is_empty()),
            commons_api_url: env::var("HERITAGE_COMMONS_API_URL").ok(),
            thumbnail_width: env::var("HERITAGE_THUMBNAIL_WIDTH")
                .unwrap_or_else(|_| "640".to_string())
                .parse()
                .context("HERITAGE_THUMBNAIL_WIDTH must be a valid number")?,
            http_timeout_secs: env::var("HERITAGE_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("HERITAGE_HTTP_TIMEOUT_SECS must be a valid number")?,
        })
    }

    pub fn commons(&self) -> CommonsConfig {
        let config = CommonsConfig::default()
            .with_thumbnail_width(self.thumbnail_width)
            .with_timeout_secs(self.http_timeout_secs);
        match &self.commons_api_url {
            Some(url) => config.with_api_url(url.clone()),
            None => config,
        }
    }
}
