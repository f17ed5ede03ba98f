use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::theme::{Theme, ThemeStorage};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
    pub theme: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("could not determine config directory"))?;

        Ok(config_dir.join("parley").join("config.json"))
    }
}

/// The durable `theme` slot, backed by the config file. Reads and writes are
/// lenient: a missing or unreadable file loads as "nothing stored", and write
/// failures are swallowed so theme changes never error out of the UI.
pub struct ThemeSlot {
    path: Option<PathBuf>,
}

impl ThemeSlot {
    pub fn at_default() -> Self {
        Self {
            path: Config::default_path().ok(),
        }
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl ThemeStorage for ThemeSlot {
    fn load(&self) -> Option<Theme> {
        let path = self.path.as_ref()?;
        let config = Config::load_from(path).ok()?;
        config.theme.as_deref().and_then(Theme::parse)
    }

    fn store(&self, theme: Theme) {
        let Some(path) = &self.path else { return };
        let mut config = Config::load_from(path).unwrap_or_default();
        config.theme = Some(theme.as_str().to_string());
        let _ = config.save_to(path);
    }
}

/// Settings sourced from the command line, taking precedence over the
/// environment and the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
}

/// Fully resolved agent connection settings. The identity fields are opaque
/// inputs forwarded verbatim with every message; unconfigured ones stay empty.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub endpoint: String,
    pub api_key: String,
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
}

impl AgentSettings {
    pub fn resolve(config: &Config, overrides: Overrides) -> Result<Self> {
        let endpoint = overrides
            .endpoint
            .or_else(|| std::env::var("PARLEY_ENDPOINT").ok())
            .or_else(|| config.endpoint.clone())
            .ok_or_else(|| {
                anyhow!(
                    "no agent endpoint configured; pass --endpoint, set PARLEY_ENDPOINT, \
                     or add \"endpoint\" to the config file"
                )
            })?;

        let api_key = overrides
            .api_key
            .or_else(|| std::env::var("PARLEY_API_KEY").ok())
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        Ok(Self {
            endpoint,
            api_key,
            user_id: overrides
                .user_id
                .or_else(|| config.user_id.clone())
                .unwrap_or_default(),
            agent_id: overrides
                .agent_id
                .or_else(|| config.agent_id.clone())
                .unwrap_or_default(),
            session_id: overrides
                .session_id
                .or_else(|| config.session_id.clone())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeStore;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_defaults() {
        let dir = TempDir::new().expect("create temp dir");
        let config = Config::load_from(&dir.path().join("config.json")).expect("load");
        assert!(config.endpoint.is_none());
        assert!(config.theme.is_none());
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("parley").join("config.json");

        let config = Config {
            endpoint: Some("https://agent.example/v3/inference".to_string()),
            session_id: Some("abc-123".to_string()),
            ..Default::default()
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.endpoint.as_deref(), Some("https://agent.example/v3/inference"));
        assert_eq!(loaded.session_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn theme_slot_round_trips_and_preserves_other_fields() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.json");

        let config = Config {
            endpoint: Some("https://agent.example".to_string()),
            ..Default::default()
        };
        config.save_to(&path).expect("save");

        let slot = ThemeSlot::at(path.clone());
        assert_eq!(slot.load(), None);

        slot.store(Theme::Dark);
        assert_eq!(slot.load(), Some(Theme::Dark));

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.theme.as_deref(), Some("dark"));
        assert_eq!(loaded.endpoint.as_deref(), Some("https://agent.example"));
    }

    #[test]
    fn store_with_no_prior_persisted_theme_yields_light() {
        let dir = TempDir::new().expect("create temp dir");
        let slot = ThemeSlot::at(dir.path().join("config.json"));

        let store = ThemeStore::new(Box::new(slot));
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn toggled_theme_survives_a_restart() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.json");

        let mut store = ThemeStore::new(Box::new(ThemeSlot::at(path.clone())));
        store.toggle();
        assert_eq!(store.get(), Theme::Dark);

        let reopened = ThemeStore::new(Box::new(ThemeSlot::at(path)));
        assert_eq!(reopened.get(), Theme::Dark);
    }

    #[test]
    fn overrides_win_over_config_values() {
        let config = Config {
            endpoint: Some("https://from-config.example".to_string()),
            user_id: Some("config-user".to_string()),
            ..Default::default()
        };

        let settings = AgentSettings::resolve(
            &config,
            Overrides {
                endpoint: Some("https://from-flag.example".to_string()),
                session_id: Some("flag-session".to_string()),
                ..Default::default()
            },
        )
        .expect("resolve");

        assert_eq!(settings.endpoint, "https://from-flag.example");
        assert_eq!(settings.user_id, "config-user");
        assert_eq!(settings.session_id, "flag-session");
        assert_eq!(settings.agent_id, "");
    }

    #[test]
    fn missing_endpoint_is_a_startup_error() {
        let result = AgentSettings::resolve(&Config::default(), Overrides::default());
        assert!(result.is_err());
    }
}
