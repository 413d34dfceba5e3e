use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ShellError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub origin: OriginConfig,
    pub window: WindowConfig,
    pub overlay: OverlayConfig,
    pub picker: PickerConfig,
    pub updates: UpdatesConfig,
    pub shortcuts: ShortcutsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginConfig {
    /// The remote app the main window loads. Navigation is confined to it.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Drop native decorations and let the page draw its own title bar.
    pub custom_title_bar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub corner: ScreenCorner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatesConfig {
    /// Check once the main window first shows. Ignored in debug builds.
    pub check_on_startup: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutsConfig {
    pub fullscreen: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            origin: OriginConfig {
                url: "https://aetherium-89dr.onrender.com/".to_string(),
            },
            window: WindowConfig {
                title: "Aetherium".to_string(),
                width: 1200.0,
                height: 800.0,
                min_width: 800.0,
                min_height: 600.0,
                custom_title_bar: true,
            },
            overlay: OverlayConfig {
                width: 360.0,
                height: 120.0,
                margin: 16.0,
                corner: ScreenCorner::BottomRight,
            },
            picker: PickerConfig {
                width: 720.0,
                height: 520.0,
            },
            updates: UpdatesConfig {
                check_on_startup: true,
            },
            shortcuts: ShortcutsConfig {
                fullscreen: Some("F11".to_string()),
            },
        }
    }
}

fn config_path() -> Result<PathBuf, ShellError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ShellError::Config("Cannot find home directory".into()))?;
    Ok(home.join(".aetherium").join("config.yaml"))
}

pub fn load_or_default() -> Result<ShellConfig, ShellError> {
    load_from(&config_path()?)
}

/// Reads the config at `path`, writing the defaults there first if it is missing.
pub fn load_from(path: &Path) -> Result<ShellConfig, ShellError> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: ShellConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    } else {
        let config = ShellConfig::default();
        config.save_to(path)?;
        Ok(config)
    }
}

impl ShellConfig {
    fn save_to(&self, path: &Path) -> Result<(), ShellError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ShellError> {
        let url = url::Url::parse(&self.origin.url)
            .map_err(|e| ShellError::Config(format!("Invalid origin url: {}", e)))?;
        if url.host_str().is_none() {
            return Err(ShellError::Config(format!(
                "Origin url has no host: {}",
                self.origin.url
            )));
        }
        if self.overlay.width <= 0.0 || self.overlay.height <= 0.0 {
            return Err(ShellError::Config("Overlay size must be positive".into()));
        }
        Ok(())
    }
}
