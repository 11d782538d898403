use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::context::ColorMode;

pub const SETTINGS_FILE: &str = "hrboard.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSettings {
    pub api_url: String,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub color_mode: ColorMode,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".into(),
            debounce_ms: 500,
            request_timeout_secs: 30,
            color_mode: ColorMode::Light,
        }
    }
}

impl ClientSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Defaults, then `hrboard.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = load_settings_from(SETTINGS_FILE);

    if let Ok(v) = std::env::var("API_URL") {
        settings.api_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Ok(v) = std::env::var("APP__DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.debounce_ms = parsed;
        }
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Ok(v) = std::env::var("APP__COLOR_MODE") {
        if let Some(mode) = ColorMode::parse(&v) {
            settings.color_mode = mode;
        }
    }

    settings
}

/// Reads a settings file over the defaults. A missing or malformed file
/// leaves the defaults untouched; unknown keys are ignored.
pub fn load_settings_from(path: impl AsRef<Path>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    let Ok(raw) = fs::read_to_string(path.as_ref()) else {
        return settings;
    };
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) else {
        return settings;
    };

    if let Some(v) = file_cfg.get("api_url").and_then(toml::Value::as_str) {
        settings.api_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("debounce_ms").and_then(as_u64) {
        settings.debounce_ms = v;
    }
    if let Some(v) = file_cfg.get("request_timeout_secs").and_then(as_u64) {
        settings.request_timeout_secs = v;
    }
    if let Some(mode) = file_cfg
        .get("color_mode")
        .and_then(toml::Value::as_str)
        .and_then(ColorMode::parse)
    {
        settings.color_mode = mode;
    }

    settings
}

fn as_u64(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(v) => u64::try_from(*v).ok(),
        toml::Value::String(v) => v.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_settings_file(contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("hrboard_settings_test_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(SETTINGS_FILE);
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings_from("/nonexistent/hrboard.toml");
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_settings_file(
            r#"
api_url = "http://hr.internal:8080"
debounce_ms = 250
request_timeout_secs = "5"
color_mode = "dark"
"#,
        );

        let settings = load_settings_from(&path);
        assert_eq!(settings.api_url, "http://hr.internal:8080");
        assert_eq!(settings.debounce_ms, 250);
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.color_mode, ColorMode::Dark);

        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let path = temp_settings_file("api_url = ");
        assert_eq!(load_settings_from(&path), ClientSettings::default());
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn negative_numbers_keep_defaults() {
        let path = temp_settings_file("debounce_ms = -10\ncolor_mode = \"sepia\"");
        let settings = load_settings_from(&path);
        assert_eq!(settings.debounce_ms, 500);
        assert_eq!(settings.color_mode, ColorMode::Light);
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }
}
