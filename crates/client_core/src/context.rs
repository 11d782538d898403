//! App-wide context handed explicitly to whatever renders the screens.

use serde::Deserialize;

use crate::config::ClientSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Created once at startup. Hosts pass it by reference to every renderer
/// instead of reaching for a global.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppContext {
    pub color_mode: ColorMode,
}

impl AppContext {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            color_mode: settings.color_mode,
        }
    }

    pub fn toggle_color_mode(&mut self) -> ColorMode {
        self.color_mode = self.color_mode.toggled();
        self.color_mode
    }
}
