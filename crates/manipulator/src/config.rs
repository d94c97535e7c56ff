//! Manipulator configuration.
//!
//! Settings a host typically persists next to its other editor preferences.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ManipulatorError, Result};
use crate::frame::OrientationMode;
use crate::handle::Mode;
use crate::pivot::PivotMode;

/// Per-channel snap steps. A step of zero disables snapping for that channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Translation step in meters
    pub translate: f64,
    /// Rotation step in degrees
    pub rotate_degrees: f64,
    /// Scale-factor step
    pub scale: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            translate: 0.5,
            rotate_degrees: 15.0,
            scale: 0.1,
        }
    }
}

/// Which manipulation modes the gizmo offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledModes {
    pub translate: bool,
    pub rotate: bool,
    pub scale: bool,
}

impl Default for EnabledModes {
    fn default() -> Self {
        Self {
            translate: true,
            rotate: true,
            scale: true,
        }
    }
}

impl EnabledModes {
    pub fn contains(&self, mode: Mode) -> bool {
        match mode {
            Mode::Translate => self.translate,
            Mode::Rotate => self.rotate,
            Mode::Scale => self.scale,
        }
    }

    pub fn set(&mut self, mode: Mode, enabled: bool) {
        match mode {
            Mode::Translate => self.translate = enabled,
            Mode::Rotate => self.rotate = enabled,
            Mode::Scale => self.scale = enabled,
        }
    }
}

/// On-screen sizing: the gizmo keeps a constant apparent radius in pixels,
/// clamped to a world-size range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOptions {
    pub screen_pixel_radius: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for SizeOptions {
    fn default() -> Self {
        Self {
            screen_pixel_radius: 100.0,
            min_scale: 0.01,
            max_scale: 1.0e6,
        }
    }
}

/// Complete manipulator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulatorConfig {
    pub snap: SnapSettings,
    pub orientation: OrientationMode,
    pub pivot: PivotMode,
    pub enabled: EnabledModes,
    pub size: SizeOptions,
    /// Maximum number of undo entries kept
    pub history_limit: usize,
    /// Largest per-element matrix difference still treated as "unchanged"
    pub change_tolerance: f64,
}

impl Default for ManipulatorConfig {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            orientation: OrientationMode::default(),
            pivot: PivotMode::default(),
            enabled: EnabledModes::default(),
            size: SizeOptions::default(),
            history_limit: 100,
            change_tolerance: 1e-9,
        }
    }
}

impl ManipulatorConfig {
    /// Parse from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ManipulatorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded manipulator config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| ManipulatorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)?;
        log::info!("Saved manipulator config to {:?}", path);
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("manipulator");
            p.push("manipulator.toml");
            p
        })
    }
}
