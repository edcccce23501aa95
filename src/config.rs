use serde::Deserialize;
use std::time::Duration;

use crate::services::recommendations::EngineSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the bincode-encoded catalog blob
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path to the bincode-encoded similarity matrix blob
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Number of ranking slots inspected per request, the query's own slot included
    #[serde(default = "default_scan_window_size")]
    pub scan_window_size: usize,

    /// Per-attempt timeout for a metadata lookup
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    /// Extra attempts for transient metadata failures within one lookup
    #[serde(default = "default_metadata_max_retries")]
    pub metadata_max_retries: u32,

    /// Maximum metadata lookups in flight for a single request
    #[serde(default = "default_metadata_concurrency")]
    pub metadata_concurrency: usize,

    /// Metadata provider API key
    pub api_credential: String,

    /// Metadata provider base URL
    #[serde(default = "default_metadata_api_url")]
    pub metadata_api_url: String,

    #[serde(default = "default_metadata_language")]
    pub metadata_language: String,

    /// Prefix joined with the provider's poster path to build artwork URLs
    #[serde(default = "default_artwork_base_url")]
    pub artwork_base_url: String,

    /// Lifetime of a cached metadata record
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Redis connection URL. The in-process cache is used when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Titles shown before any query has been made (comma separated)
    #[serde(default = "default_popular_titles")]
    pub popular_titles: Vec<String>,

    #[serde(default = "default_min_count")]
    pub min_count: usize,

    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "data/catalog.bin".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.bin".to_string()
}

fn default_scan_window_size() -> usize {
    19
}

fn default_metadata_timeout_ms() -> u64 {
    3000
}

fn default_metadata_max_retries() -> u32 {
    0
}

fn default_metadata_concurrency() -> usize {
    8
}

fn default_metadata_api_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_metadata_language() -> String {
    "en-US".to_string()
}

fn default_artwork_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    86400
}

fn default_popular_titles() -> Vec<String> {
    [
        "Avatar",
        "Inception",
        "The Dark Knight",
        "Pulp Fiction",
        "The Shawshank Redemption",
        "Forrest Gump",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_min_count() -> usize {
    3
}

fn default_max_count() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.api_credential.trim().is_empty() {
            anyhow::bail!("API_CREDENTIAL must not be empty");
        }
        if self.metadata_timeout_ms == 0 {
            anyhow::bail!("METADATA_TIMEOUT_MS must be greater than 0");
        }
        if self.metadata_concurrency == 0 {
            anyhow::bail!("METADATA_CONCURRENCY must be at least 1");
        }
        if self.min_count > self.max_count {
            anyhow::bail!(
                "MIN_COUNT ({}) must not exceed MAX_COUNT ({})",
                self.min_count,
                self.max_count
            );
        }
        Ok(())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Settings consumed by the recommendation engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            scan_window_size: self.scan_window_size,
            metadata_concurrency: self.metadata_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_pairs(&[("API_CREDENTIAL", "secret")]).unwrap();
        assert_eq!(config.scan_window_size, 19);
        assert_eq!(config.metadata_timeout_ms, 3000);
        assert_eq!(config.cache_ttl_seconds, 86400);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.popular_titles.len(), 6);
        assert_eq!(config.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credential_is_an_error() {
        assert!(from_pairs(&[]).is_err());
    }

    #[test]
    fn test_blank_credential_fails_validation() {
        let config = from_pairs(&[("API_CREDENTIAL", "  ")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("API_CREDENTIAL", "secret"),
            ("SCAN_WINDOW_SIZE", "30"),
            ("METADATA_TIMEOUT_MS", "250"),
            ("CACHE_TTL_SECONDS", "60"),
            ("POPULAR_TITLES", "Alien,Heat"),
            ("REDIS_URL", "redis://cache:6379"),
        ])
        .unwrap();

        assert_eq!(config.scan_window_size, 30);
        assert_eq!(config.metadata_timeout(), Duration::from_millis(250));
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.popular_titles, vec!["Alien", "Heat"]);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.engine_settings().scan_window_size, 30);
    }

    #[test]
    fn test_inverted_count_bounds_fail_validation() {
        let config = from_pairs(&[
            ("API_CREDENTIAL", "secret"),
            ("MIN_COUNT", "8"),
            ("MAX_COUNT", "4"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_metadata_timeout_fails_validation() {
        let config = from_pairs(&[("API_CREDENTIAL", "secret"), ("METADATA_TIMEOUT_MS", "0")])
            .unwrap();
        assert!(config.validate().is_err());
    }
}
