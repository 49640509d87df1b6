// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use figment::providers::{Env, Format};
use figment::{providers::Toml, Figment};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the transfer agent's HTTP API.
    pub agent_url: String,

    // Timings
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub notification_ttl_ms: u64,

    // History browsing
    pub history_page_size: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent_url: "http://127.0.0.1:8080".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            notification_ttl_ms: 4000,
            history_page_size: 10,
        }
    }
}

/// This is the single source of truth for app directories.
pub fn get_app_paths() -> Option<(PathBuf, PathBuf)> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "github", "packdeck") {
        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_local_dir().to_path_buf();

        fs::create_dir_all(&config_dir).ok()?;
        fs::create_dir_all(&data_dir).ok()?;

        Some((config_dir, data_dir))
    } else {
        None
    }
}

pub fn load_settings() -> Settings {
    if let Some((config_dir, _)) = get_app_paths() {
        let config_file_path = config_dir.join("settings.toml");

        return Figment::new()
            .merge(Toml::file(config_file_path))
            .merge(Env::prefixed("PACKDECK_"))
            .extract()
            .unwrap_or_default();
    }

    // Fallback if we can't even determine the application paths.
    Settings::default()
}

/// Saves the provided settings to the config file.
pub fn save_settings(settings: &Settings) -> io::Result<()> {
    if let Some((config_dir, _)) = get_app_paths() {
        let config_file_path = config_dir.join("settings.toml");
        let temp_file_path = config_dir.join("settings.toml.tmp");
        let content = toml::to_string_pretty(settings).map_err(io::Error::other)?;
        fs::write(&temp_file_path, content)?;
        fs::rename(&temp_file_path, &config_file_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Toml};
    use figment::Figment;

    #[test]
    fn test_full_settings_parsing() {
        let toml_str = r#"
            agent_url = "http://10.0.0.5:9090"
            poll_interval_ms = 500
            request_timeout_secs = 30
            connect_timeout_secs = 3
            notification_ttl_ms = 2500
            history_page_size = 25
        "#;

        let settings: Settings = Figment::new()
            .merge(Toml::string(toml_str))
            .extract()
            .expect("Failed to parse full TOML string");

        assert_eq!(settings.agent_url, "http://10.0.0.5:9090");
        assert_eq!(settings.poll_interval_ms, 500);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.connect_timeout_secs, 3);
        assert_eq!(settings.notification_ttl_ms, 2500);
        assert_eq!(settings.history_page_size, 25);
    }

    #[test]
    fn test_partial_settings_override() {
        let toml_str = r#"
            agent_url = "http://192.168.1.2:8080"
        "#;

        let settings: Settings = Figment::new()
            .merge(Toml::string(toml_str))
            .extract()
            .expect("Failed to parse partial TOML string");

        let default_settings = Settings::default();

        assert_eq!(settings.agent_url, "http://192.168.1.2:8080");
        assert_eq!(settings.poll_interval_ms, default_settings.poll_interval_ms);
        assert_eq!(
            settings.history_page_size,
            default_settings.history_page_size
        );
    }

    #[test]
    fn test_default_settings() {
        let settings: Settings = Figment::new()
            .merge(Toml::string(""))
            .extract()
            .expect("Failed to parse empty string");

        assert_eq!(settings.agent_url, "http://127.0.0.1:8080");
        assert_eq!(settings.poll_interval_ms, 1000);
        assert_eq!(settings.history_page_size, 10);
    }

    #[test]
    fn test_invalid_type_rejected() {
        let toml_str = r#"
            poll_interval_ms = "fast"
        "#;

        let result: Result<Settings, figment::Error> =
            Figment::new().merge(Toml::string(toml_str)).extract();

        assert!(
            result.is_err(),
            "Parsing should fail with a non-numeric interval"
        );
    }
}
