//! Path management for the music library
//!
//! Resolves the config directory and the files kept inside it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Filesystem locations used by the service
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
    /// Database file path
    db_path: PathBuf,
}

impl Paths {
    /// Resolve paths from CLI overrides and create the config directory.
    ///
    /// Without an override the platform config directory is used, falling
    /// back to `./musiclib`.
    pub fn new(config_override: Option<PathBuf>, db_override: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "musiclib")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("musiclib")),
        };

        let db_path = db_override.unwrap_or_else(|| config_dir.join("library.db"));

        let paths = Self {
            config_dir,
            db_path,
        };
        paths.create_directories()?;

        Ok(paths)
    }

    fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir).with_context(|| {
            format!(
                "Failed to create config directory {}",
                self.config_dir.display()
            )
        })?;

        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        Ok(())
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the database path
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_creation() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("conf");

        let paths = Paths::new(Some(config_dir.clone()), None).unwrap();

        assert!(paths.config_dir().exists());
        assert_eq!(paths.db_path(), config_dir.join("library.db"));
        assert_eq!(paths.settings_path(), config_dir.join("settings.json"));
    }

    #[test]
    fn test_db_override() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("songs.db");

        let paths = Paths::new(Some(temp_dir.path().join("conf")), Some(db_path.clone())).unwrap();

        assert_eq!(paths.db_path(), db_path);
        assert!(db_path.parent().unwrap().exists());
    }
}
