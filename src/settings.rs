use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::inputs::PdfControls;
use crate::pdf::ScreenSize;

pub const CURRENT_VERSION: u32 = 2;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pocketpdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Serve pans from a full-page raster instead of rendering strips
    #[serde(default)]
    pub fast_scroll: bool,

    /// Show page/zoom banners and the loading label
    #[serde(default = "default_true")]
    pub display_labels: bool,

    #[serde(default)]
    pub screen: ScreenSize,

    #[serde(default)]
    pub controls: PdfControls,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            fast_scroll: false,
            display_labels: true,
            screen: ScreenSize::default(),
            controls: PdfControls::default(),
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load the settings file from the config directory, creating it with
/// defaults when missing
pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            if let Err(e) = save_settings_to_file(&settings, &path) {
                error!("{e:#}");
            }
        }
    }
}

/// Replace the global settings with the contents of `path`; on failure
/// the current settings stay in place
pub fn load_settings_from_path(path: &Path) {
    match read_settings_file(path) {
        Ok(mut settings) => {
            debug!("Loaded settings from {path:?}");

            if settings.version < CURRENT_VERSION {
                migrate_settings(&mut settings);
                if let Err(e) = save_settings_to_file(&settings, path) {
                    error!("{e:#}");
                }
            }

            if let Ok(mut global) = SETTINGS.write() {
                *global = settings;
            }
        }
        Err(e) => error!("{e:#}"),
    }
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read settings file {path:?}"))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse settings file {path:?}"))
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // v1 had no per-device screen size and always showed labels
    if settings.version < 2 {
        settings.screen = ScreenSize::default();
        settings.display_labels = true;
    }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {parent:?}"))?;
        }
    }

    let mut content = String::from(SETTINGS_HEADER);
    content.push_str(&serde_yaml::to_string(settings)?);

    fs::write(path, content).with_context(|| format!("Failed to save settings to {path:?}"))?;
    debug!("Saved settings to {path:?}");
    Ok(())
}

const SETTINGS_HEADER: &str = r#"# pocketpdf settings
#
# Buttons: up, down, left, right, triangle, circle, cross, square,
#          l_trigger, r_trigger, start, select
# fast_scroll renders whole pages once; zoom is capped at 2x while it is on.

"#;

// Public API for accessing/modifying settings

/// Copy of the current settings, handed to the session once per frame
pub fn snapshot() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

/// Swap in a whole new settings value, e.g. after command line overrides
pub fn replace(settings: Settings) {
    if let Ok(mut global) = SETTINGS.write() {
        *global = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Button;
    use serial_test::serial;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_yaml::from_str("fast_scroll: true\n").unwrap();
        assert!(settings.fast_scroll);
        assert!(settings.display_labels);
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.screen, ScreenSize::new(480, 272));
    }

    #[test]
    fn saved_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILENAME);
        let mut settings = Settings::default();
        settings.controls.zoom_in = Button::Circle;
        settings.screen = ScreenSize::new(320, 240);

        save_settings_to_file(&settings, &path).unwrap();
        assert_eq!(read_settings_file(&path).unwrap(), settings);
    }

    #[test]
    #[serial]
    fn loading_old_version_migrates_and_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "version: 1\nfast_scroll: true\ndisplay_labels: false\n").unwrap();

        load_settings_from_path(&path);
        let loaded = snapshot();
        assert!(loaded.fast_scroll);
        assert!(loaded.display_labels);
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(read_settings_file(&path).unwrap().version, CURRENT_VERSION);

        replace(Settings::default());
    }

    #[test]
    #[serial]
    fn broken_file_keeps_current_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "fast_scroll: [not, a, bool]\n").unwrap();

        replace(Settings {
            fast_scroll: true,
            ..Settings::default()
        });
        load_settings_from_path(&path);
        assert!(snapshot().fast_scroll);

        replace(Settings::default());
    }
}
