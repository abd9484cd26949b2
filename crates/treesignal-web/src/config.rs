//! Startup configuration, loaded from a TOML document.
//!
//! Discovery order: `TREE_SIGNAL_CONFIG` env var, the container mount at
//! `/app/data/config.toml`, `./config.toml`, then the user config
//! directory. Absence is not an error and a bad file never takes the
//! service down; defaults apply either way. Only the `[client.*]` subtree
//! is surfaced to browsers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CONFIG_ENV_VAR: &str = "TREE_SIGNAL_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TreeSignalConfig {
    pub decay: DecaySettings,
    pub history: HistorySettings,
    pub server: ServerSettings,
    pub cleanup: CleanupSettings,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecaySettings {
    pub hold_seconds: f64,
    pub decay_seconds: f64,
}

impl Default for DecaySettings {
    fn default() -> Self {
        Self {
            hold_seconds: 30.0,
            decay_seconds: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_messages: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_messages: 100 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8013,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    pub interval_seconds: f64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 60.0,
        }
    }
}

/// The configuration subtree exposed via `GET /v1/client/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub refresh_interval_ms: u64,
    pub show_debug: bool,
    pub version: String,
    pub colors: ClientColors,
    pub ui: ClientUi,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            refresh_interval_ms: 5000,
            show_debug: false,
            version: "0.2.0".to_string(),
            colors: ClientColors::default(),
            ui: ClientUi::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientColors {
    pub assignment_mode: String,
    pub inheritance_mode: String,
    /// Advisory palette for the client; the server never interprets it.
    pub palette: Option<Vec<String>>,
}

impl Default for ClientColors {
    fn default() -> Self {
        Self {
            assignment_mode: "increment".to_string(),
            inheritance_mode: "unique".to_string(),
            palette: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientUi {
    pub min_panel_size: f64,
    pub panel_gap: f64,
    pub font_family: String,
    pub show_timestamps: bool,
    pub timestamp_format: String,
}

impl Default for ClientUi {
    fn default() -> Self {
        Self {
            min_panel_size: 5.0,
            panel_gap: 0.6,
            font_family: "Fira Code, monospace".to_string(),
            show_timestamps: true,
            timestamp_format: "locale".to_string(),
        }
    }
}

/// First existing config file in precedence order, if any.
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let docker_mount = PathBuf::from("/app/data/config.toml");
    if docker_mount.exists() {
        return Some(docker_mount);
    }

    let local = PathBuf::from("./config.toml");
    if local.exists() {
        return Some(local);
    }

    if let Some(dir) = dirs::config_dir() {
        let user = dir.join("tree-signal").join("config.toml");
        if user.exists() {
            return Some(user);
        }
    }

    None
}

/// Loads configuration, falling back to defaults on any failure so a bad
/// config file does not take the service offline.
pub fn load_config() -> TreeSignalConfig {
    let mut config = match find_config_file() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<TreeSignalConfig>(&contents) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to parse config file, using defaults");
                    TreeSignalConfig::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read config file, using defaults");
                TreeSignalConfig::default()
            }
        },
        None => TreeSignalConfig::default(),
    };

    if let Ok(mode) = std::env::var("COLOR_ASSIGNMENT_MODE")
        && !mode.is_empty()
    {
        config.client.colors.assignment_mode = mode;
    }
    if let Ok(mode) = std::env::var("COLOR_INHERITANCE_MODE")
        && !mode.is_empty()
    {
        config.client.colors.inheritance_mode = mode;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = TreeSignalConfig::default();
        assert_eq!(config.decay.hold_seconds, 30.0);
        assert_eq!(config.decay.decay_seconds, 10.0);
        assert_eq!(config.history.max_messages, 100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8013);
        assert_eq!(config.cleanup.interval_seconds, 60.0);
        assert_eq!(config.client.refresh_interval_ms, 5000);
        assert_eq!(config.client.colors.assignment_mode, "increment");
        assert_eq!(config.client.ui.font_family, "Fira Code, monospace");
    }

    #[test]
    fn partial_documents_keep_defaults_elsewhere() {
        let config: TreeSignalConfig = toml::from_str(
            r#"
            [decay]
            hold_seconds = 5.0

            [client.colors]
            inheritance_mode = "family"
            "#,
        )
        .unwrap();
        assert_eq!(config.decay.hold_seconds, 5.0);
        assert_eq!(config.decay.decay_seconds, 10.0);
        assert_eq!(config.client.colors.inheritance_mode, "family");
        assert_eq!(config.client.colors.assignment_mode, "increment");
        assert_eq!(config.server.port, 8013);
    }

    #[test]
    fn client_palette_round_trips() {
        let config: TreeSignalConfig = toml::from_str(
            r##"
            [client.colors]
            palette = ["#112233", "#445566"]
            "##,
        )
        .unwrap();
        assert_eq!(
            config.client.colors.palette.as_deref(),
            Some(["#112233".to_string(), "#445566".to_string()].as_slice())
        );
    }
}
