//! Configuration management for the GSC MCP Server
//!
//! Handles paths, environment variables, and configuration loading.

use std::path::PathBuf;

use crate::error::{ConfigError, GscMcpError, Result};

/// Configuration for the GSC MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to OAuth keys file (client credentials)
    pub oauth_path: PathBuf,

    /// Path to stored credentials (access/refresh tokens)
    pub credentials_path: PathBuf,

    /// OAuth callback URL
    pub oauth_callback_url: String,

    /// OAuth callback port
    pub oauth_callback_port: u16,

    /// Search Console API scopes
    pub scopes: Vec<String>,
}

impl Config {
    /// Create a new configuration with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        let oauth_path = std::env::var("GSC_OAUTH_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("gcp-oauth.keys.json"));

        let credentials_path = std::env::var("GSC_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("credentials.json"));

        let oauth_callback_port = std::env::var("GSC_OAUTH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let oauth_callback_url = format!("http://localhost:{}/oauth2callback", oauth_callback_port);

        Ok(Self {
            config_dir,
            oauth_path,
            credentials_path,
            oauth_callback_url,
            oauth_callback_port,
            // Full webmasters scope: the sitemap submit/delete and site
            // add/remove tools need write access.
            scopes: vec!["https://www.googleapis.com/auth/webmasters".to_string()],
        })
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                GscMcpError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".gsc-mcp");

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                GscMcpError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }

    /// Check if OAuth keys file exists
    pub fn oauth_keys_exist(&self) -> bool {
        self.oauth_path.exists()
    }

    /// Check if credentials (tokens) exist
    pub fn credentials_exist(&self) -> bool {
        self.credentials_path.exists()
    }

    /// Try to find OAuth keys in current directory and copy to config dir
    pub fn find_and_copy_oauth_keys(&self) -> Result<bool> {
        let local_oauth = std::env::current_dir()
            .map_err(GscMcpError::Io)?
            .join("gcp-oauth.keys.json");

        if local_oauth.exists() && !self.oauth_keys_exist() {
            std::fs::copy(&local_oauth, &self.oauth_path).map_err(GscMcpError::Io)?;
            return Ok(true);
        }

        Ok(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new().expect("Failed to create default config")
    }
}

/// Search Console API constants
pub mod gsc {
    /// Base URL for the Search Console API
    pub const API_BASE_URL: &str = "https://searchconsole.googleapis.com/webmasters/v3";

    /// Base URL for the URL Inspection API (separate surface, v1)
    pub const INSPECTION_API_URL: &str =
        "https://searchconsole.googleapis.com/v1/urlInspection/index:inspect";

    /// Maximum rows the analytics API returns per request
    pub const ANALYTICS_PAGE_SIZE: u32 = 25_000;

    /// Safety cap on pages fetched for a single analytics query
    pub const MAX_ANALYTICS_PAGES: u32 = 40;

    /// Hard cap on URLs per inspection batch
    pub const MAX_INSPECTION_URLS: usize = 10;

    /// Concurrent inspection requests per batch
    pub const INSPECTION_FANOUT: usize = 3;

    /// Days of reporting lag before analytics data is complete
    pub const REPORTING_LAG_DAYS: i64 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert!(config.is_ok());
    }

    #[test]
    fn test_default_scopes() {
        let config = Config::new().unwrap();
        assert_eq!(config.scopes.len(), 1);
        assert!(config.scopes[0].contains("webmasters"));
    }

    #[test]
    fn test_constants() {
        assert!(gsc::MAX_INSPECTION_URLS <= 10);
        assert!(gsc::INSPECTION_FANOUT <= gsc::MAX_INSPECTION_URLS);
    }
}
