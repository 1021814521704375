use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let arbiter_dir = home.join(".call-arbiter");
        let config_path = arbiter_dir.join("config.toml");

        if !arbiter_dir.exists() {
            fs::create_dir_all(&arbiter_dir).context("Failed to create .call-arbiter directory")?;
        }

        if config_path.exists() {
            Ok(Self::load_from(&config_path)?)
        } else {
            let mut config = Self {
                config_path,
                ..Self::default()
            };
            config.apply_env_overrides();
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Load, apply environment overrides and validate. Unlike
    /// [`Config::load_or_init`], never creates the file.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
