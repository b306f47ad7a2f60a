use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_theme_id() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub platform_url: String,
    pub api_token: String,
    /// Which CMS theme record styles this dashboard.
    #[serde(default = "default_theme_id")]
    pub theme_settings_id: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| "Failed to parse config.toml")?;
                return Ok(config);
            }
        }

        let platform_url = std::env::var("REALTY_URL")
            .with_context(|| "REALTY_URL not set. Create a config file or set the env var.")?;
        let api_token = std::env::var("REALTY_API_TOKEN")
            .with_context(|| "REALTY_API_TOKEN not set. Create a config file or set the env var.")?;
        let theme_settings_id = std::env::var("REALTY_THEME_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_theme_id);

        Ok(Self {
            platform_url,
            api_token,
            theme_settings_id,
        })
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default = Config {
            platform_url: "https://app.your-brokerage.example".into(),
            api_token: "your-api-token-here".into(),
            theme_settings_id: default_theme_id(),
        };

        let toml_str = toml::to_string_pretty(&default)?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("realty-tui").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_id_defaults_when_absent_from_toml() {
        let config: Config = toml::from_str(
            "platform_url = \"https://x.example\"\napi_token = \"t\"\n",
        )
        .unwrap();
        assert_eq!(config.theme_settings_id, 1);
    }
}
