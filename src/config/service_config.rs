//! Service configuration
//!
//! Settings live in `settings.json` inside the config directory. Every field
//! has a default, and selected fields can be overridden from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Default number of songs per list page
pub const DEFAULT_LIST_LIMIT: u32 = 3;
/// Default number of verses per lyrics page
pub const DEFAULT_VERSE_LIMIT: u32 = 1;

pub const ENV_EXTERNAL_API_URL: &str = "MUSICLIB_EXTERNAL_API_URL";
pub const ENV_EXTERNAL_API_TIMEOUT: &str = "MUSICLIB_EXTERNAL_API_TIMEOUT";
pub const ENV_LIST_LIMIT: &str = "MUSICLIB_LIST_LIMIT";
pub const ENV_VERSE_LIMIT: &str = "MUSICLIB_VERSE_LIMIT";
pub const ENV_MAX_CONNECTIONS: &str = "MUSICLIB_MAX_CONNECTIONS";

/// Service configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Base URL of the song details API; empty means not configured
    #[serde(default)]
    pub external_api_url: String,

    /// Timeout for song details requests, in seconds
    #[serde(default = "default_timeout_secs")]
    pub external_api_timeout_secs: u64,

    /// Songs per page on the list endpoint when no limit is given
    #[serde(default = "default_list_limit")]
    pub list_default_limit: u32,

    /// Verses per page on the lyrics endpoint when no limit is given
    #[serde(default = "default_verse_limit")]
    pub verse_default_limit: u32,

    /// Database pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            external_api_url: String::new(),
            external_api_timeout_secs: default_timeout_secs(),
            list_default_limit: default_list_limit(),
            verse_default_limit: default_verse_limit(),
            max_connections: default_max_connections(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file, writing defaults if it does not exist
    pub fn load(settings_path: &Path) -> Result<Self> {
        if settings_path.exists() {
            let content =
                std::fs::read_to_string(settings_path).context("Failed to read settings file")?;
            let mut config: ServiceConfig =
                serde_json::from_str(&content).context("Failed to parse settings file")?;
            config.sanitize();
            Ok(config)
        } else {
            let config = Self::default();
            config.save(settings_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, settings_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(settings_path, content).context("Failed to write settings file")?;

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparsable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_EXTERNAL_API_URL) {
            self.external_api_url = url.trim().to_string();
        }

        override_number(&lookup, ENV_EXTERNAL_API_TIMEOUT, &mut self.external_api_timeout_secs);
        override_number(&lookup, ENV_LIST_LIMIT, &mut self.list_default_limit);
        override_number(&lookup, ENV_VERSE_LIMIT, &mut self.verse_default_limit);
        override_number(&lookup, ENV_MAX_CONNECTIONS, &mut self.max_connections);

        self.sanitize();
    }

    /// Whether a song details API is configured
    pub fn has_external_api(&self) -> bool {
        !self.external_api_url.is_empty()
    }

    pub fn external_api_timeout(&self) -> Duration {
        Duration::from_secs(self.external_api_timeout_secs)
    }

    // zero limits would make every page request invalid
    fn sanitize(&mut self) {
        if self.list_default_limit == 0 {
            warn!("listDefaultLimit must be at least 1; using {}", DEFAULT_LIST_LIMIT);
            self.list_default_limit = DEFAULT_LIST_LIMIT;
        }
        if self.verse_default_limit == 0 {
            warn!("verseDefaultLimit must be at least 1; using {}", DEFAULT_VERSE_LIMIT);
            self.verse_default_limit = DEFAULT_VERSE_LIMIT;
        }
        if self.max_connections == 0 {
            self.max_connections = default_max_connections();
        }
    }
}

fn override_number<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!("Ignoring {}: '{}' is not a valid number", key, raw),
        }
    }
}

// Default value functions for serde

fn default_timeout_secs() -> u64 {
    5
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

fn default_verse_limit() -> u32 {
    DEFAULT_VERSE_LIMIT
}

fn default_max_connections() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.list_default_limit, 3);
        assert_eq!(config.verse_default_limit, 1);
        assert!(!config.has_external_api());
    }

    #[test]
    fn test_load_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let config = ServiceConfig::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, ServiceConfig::default());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("listDefaultLimit"));
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"externalApiUrl": "http://localhost:9000/info", "verseDefaultLimit": 0}"#,
        )
        .unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.external_api_url, "http://localhost:9000/info");
        assert_eq!(config.list_default_limit, 3);
        assert_eq!(config.verse_default_limit, 1);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_EXTERNAL_API_URL, " http://api.local/info "),
            (ENV_LIST_LIMIT, "10"),
            (ENV_VERSE_LIMIT, "two"),
            (ENV_EXTERNAL_API_TIMEOUT, "30"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.external_api_url, "http://api.local/info");
        assert_eq!(config.list_default_limit, 10);
        assert_eq!(config.verse_default_limit, 1);
        assert_eq!(config.external_api_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_connections, 5);
    }
}
