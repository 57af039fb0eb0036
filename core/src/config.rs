//! Configuration file handling.
//!
//! Settings live in `~/.config/xbattbar-rs/config.ron`. Every field has a
//! default, so an empty file (or no file at all) gives a working bar.
//! Command line flags are applied on top by the binary.

use crate::error::{BarError, Result};
use crate::layout::ScreenEdge;
use crate::render::Palette;
use crate::status::SourceSelector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "xbattbar-rs";
const CONFIG_FILE: &str = "config.ron";

/// Global configuration loaded from ~/.config/xbattbar-rs/config.ron
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Screen edge the bar docks to
    #[serde(default)]
    pub edge: ScreenEdge,
    /// Bar thickness in pixels
    #[serde(default = "default_thickness")]
    pub thickness: u16,
    /// Time between status polls in milliseconds
    #[serde(
        default = "default_update_interval",
        deserialize_with = "validate_update_interval"
    )]
    pub update_interval: u64,
    /// Status backend selector, `name` or `name:args`
    #[serde(default = "default_source")]
    pub source: String,
    /// X core font used for the popup text
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default)]
    pub palette: Palette,
}

fn default_thickness() -> u16 {
    3
}

fn default_update_interval() -> u64 {
    5000
}

fn default_source() -> String {
    "upower".to_owned()
}

fn default_font() -> String {
    "-misc-fixed-medium-r-*-*-20-*-*-*-*-*-iso8859-1".to_owned()
}

/// Validate update interval during deserialization.
fn validate_update_interval<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let interval = u64::deserialize(deserializer)?;
    if interval < GlobalConfig::MIN_UPDATE_INTERVAL {
        return Err(serde::de::Error::custom(format!(
            "Update interval must be at least {}ms, got {}ms",
            GlobalConfig::MIN_UPDATE_INTERVAL,
            interval
        )));
    }
    Ok(interval)
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            edge: ScreenEdge::default(),
            thickness: default_thickness(),
            update_interval: default_update_interval(),
            source: default_source(),
            font: default_font(),
            palette: Palette::default(),
        }
    }
}

impl GlobalConfig {
    /// Minimum allowed update interval in milliseconds.
    pub const MIN_UPDATE_INTERVAL: u64 = 100;

    /// Load configuration from the standard config file location.
    ///
    /// Searches for config in:
    /// 1. ~/.config/xbattbar-rs/config.ron
    /// 2. ~/.xbattbar-rs/config.ron (fallback)
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::find_config_file() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse configuration from RON text.
    pub fn from_ron(content: &str) -> Result<Self> {
        ron::from_str(content)
            .map_err(|e| BarError::parse_with_source("Failed to parse config file", e))
    }

    /// Find the config file in standard locations.
    pub fn find_config_file() -> Option<PathBuf> {
        // Try XDG config directory first
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_path = config_dir.join(APP_DIR).join(CONFIG_FILE);
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(format!(".{APP_DIR}")).join(CONFIG_FILE);
            if home_path.exists() {
                return Some(home_path);
            }
        }

        None
    }

    /// Get the default config file path for writing.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Save the commented example configuration to a file.
    pub fn save_example_config_to_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, EXAMPLE_CONFIG)?;
        Ok(())
    }

    #[must_use]
    pub fn update_interval_duration(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }

    /// Parse the backend selector.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::Config`] for an unknown backend name.
    pub fn selector(&self) -> Result<SourceSelector> {
        self.source.parse()
    }

    /// Check values that cannot be expressed in the serde schema.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.thickness == 0 {
            return Err(BarError::config_with_value(
                "Bar thickness must be at least 1px",
                self.thickness.to_string(),
            ));
        }
        if self.update_interval < Self::MIN_UPDATE_INTERVAL {
            return Err(BarError::config_with_value(
                format!(
                    "Update interval must be at least {}ms",
                    Self::MIN_UPDATE_INTERVAL
                ),
                self.update_interval.to_string(),
            ));
        }
        let lightness = self.palette.background_lightness;
        if !(0.0..=1.0).contains(&lightness) {
            return Err(BarError::config_with_value(
                "palette.background_lightness must be between 0 and 1",
                lightness.to_string(),
            ));
        }
        self.selector()?;
        Ok(())
    }
}

const EXAMPLE_CONFIG: &str = r##"// xbattbar-rs Configuration File
// ================================
// Copy this to ~/.config/xbattbar-rs/config.ron and customize as needed.
//
// Note: Command line arguments override these settings.

(
    // Screen edge to dock the bar to
    // Options: left, top, right, bottom
    edge: bottom,

    // Bar thickness in pixels
    thickness: 3,

    // Time between battery polls in milliseconds (minimum 100ms)
    update_interval: 5000,

    // Status backend, optionally followed by ':' and backend arguments
    // - "upower": system power daemon over D-Bus
    // - "debug:127.0.0.1:7070": HTTP control endpoint for testing,
    //   e.g. curl 'http://127.0.0.1:7070/?plug=1&level=750'
    source: "upower",

    // X core font (XLFD) used for the hover popup
    font: "-misc-fixed-medium-r-*-*-20-*-*-*-*-*-iso8859-1",

    // Colors use "#RRGGBB" or "#AARRGGBB"
    palette: (
        // Bar colors while charging (filled / unfilled part)
        charging_fg: "#0088ff",
        charging_bg: "#004488",

        // Discharging colors are interpolated in Oklab from empty to full.
        // Set mid to Some("#ffff00") for a three-stop ramp.
        empty: "#ff0000",
        mid: None,
        full: "#00ff00",

        // Unfilled part uses the ramp color with its lightness scaled by this
        background_lightness: 0.7,

        // Shown before the first successful poll and while polls fail
        placeholder: "#808080",

        popup_text: "#000000",
        popup_background: "#ffffff",
    ),
)
"##;
