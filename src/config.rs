//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;

// == Fixed Constants ==
/// Substring that routes an intercepted request to stale-while-revalidate
pub const API_PATH_MARKER: &str = "/api/";

/// Age under which a cached API response is served without a network round-trip
pub const API_FRESHNESS_MS: u64 = 5 * 60 * 1000;

/// Number of access timestamps kept per key by the tracker
pub const ACCESS_HISTORY_LIMIT: usize = 10;

/// Default assets populated into the versioned store at install time
pub const DEFAULT_PRECACHE_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/favicon.ico",
    "/logo192.png",
    "/placeholder.svg",
];

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name, first segment of the store name
    pub app_name: String,
    /// Version stamp, last segment of the store name
    pub cache_version: String,
    /// Origin the worker fronts (scheme://host[:port])
    pub upstream_origin: String,
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries the data cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for data cache writes without explicit TTL
    pub default_ttl_ms: u64,
    /// Root-relative paths fetched and stored on install
    pub precache_assets: Vec<String>,
    /// File holding the persisted access-frequency mapping
    pub usage_stats_path: String,
    /// Seconds between install attempts while precaching keeps failing
    pub install_retry_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `APP_NAME` - Store name prefix (default: claims)
    /// - `CACHE_VERSION` - Store version stamp (default: 1.0.0)
    /// - `UPSTREAM_ORIGIN` - Proxied origin (default: http://127.0.0.1:8080)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_ENTRIES` - Maximum data cache entries (default: 100)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `PRECACHE_ASSETS` - Comma-separated asset paths
    /// - `USAGE_STATS_PATH` - Access-frequency file (default: cache-usage.json)
    /// - `INSTALL_RETRY_SECS` - Delay between failed installs (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
            cache_version: env::var("CACHE_VERSION").unwrap_or(defaults.cache_version),
            upstream_origin: env::var("UPSTREAM_ORIGIN")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_origin),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            precache_assets: env::var("PRECACHE_ASSETS")
                .ok()
                .map(|v| parse_asset_list(&v))
                .unwrap_or(defaults.precache_assets),
            usage_stats_path: env::var("USAGE_STATS_PATH").unwrap_or(defaults.usage_stats_path),
            install_retry_secs: env::var("INSTALL_RETRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.install_retry_secs),
        }
    }

    // == Store Prefix ==
    /// Prefix shared by every versioned store of this application.
    pub fn store_prefix(&self) -> String {
        format!("{}-cache-", self.app_name)
    }

    // == Store Name ==
    /// Name of the store owned by the current version: `<app>-cache-<semver>`.
    pub fn store_name(&self) -> String {
        format!("{}{}", self.store_prefix(), self.cache_version)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "claims".to_string(),
            cache_version: "1.0.0".to_string(),
            upstream_origin: "http://127.0.0.1:8080".to_string(),
            server_port: 3000,
            max_entries: 100,
            default_ttl_ms: 300_000,
            precache_assets: DEFAULT_PRECACHE_ASSETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            usage_stats_path: "cache-usage.json".to_string(),
            install_retry_secs: 5,
        }
    }
}

fn parse_asset_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.precache_assets.len(), DEFAULT_PRECACHE_ASSETS.len());
    }

    #[test]
    fn test_store_name_is_versioned() {
        let config = Config {
            app_name: "claims".to_string(),
            cache_version: "2.1.0".to_string(),
            ..Config::default()
        };
        assert_eq!(config.store_prefix(), "claims-cache-");
        assert_eq!(config.store_name(), "claims-cache-2.1.0");
    }

    #[test]
    fn test_parse_asset_list_skips_blanks() {
        let assets = parse_asset_list("/, /index.html,, /logo.png ");
        assert_eq!(assets, vec!["/", "/index.html", "/logo.png"]);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("MAX_ENTRIES");
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("SERVER_PORT");
        env::remove_var("APP_NAME");
        env::remove_var("INSTALL_RETRY_SECS");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.app_name, "claims");
        assert_eq!(config.install_retry_secs, 5);
    }
}
