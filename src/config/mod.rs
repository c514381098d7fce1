use crate::models::RenamerConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for loading and saving the YAML configuration file.
///
/// The file is optional: when it does not exist, built-in defaults are used.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager for the given configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the YAML file (e.g., "audiobook-renamer.yaml")
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load the configuration file.
    ///
    /// # Returns
    /// The loaded RenamerConfig, or defaults if the file doesn't exist
    pub fn load_config(&self) -> Result<RenamerConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
            return Ok(RenamerConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: RenamerConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the configuration file, creating its parent directory if needed.
    ///
    /// # Arguments
    /// * `config` - The RenamerConfig to save
    pub fn save_config(&self, config: &RenamerConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {}", parent))?;
            }
        }

        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MoveStrategy;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path =
            Utf8PathBuf::try_from(temp_dir.path().join("audiobook-renamer.yaml")).unwrap();
        let manager = ConfigManager::new(&config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let config = manager.load_config().unwrap();
        assert_eq!(config, RenamerConfig::default());
    }

    #[test]
    fn test_load_save_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = RenamerConfig {
            max_renames: 25,
            move_strategy: MoveStrategy::Hardlink,
            ..RenamerConfig::default()
        };
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.max_renames, 25);
        assert_eq!(loaded.move_strategy, MoveStrategy::Hardlink);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "max_renames: [not, a, number]").unwrap();

        assert!(manager.load_config().is_err());
    }
}
