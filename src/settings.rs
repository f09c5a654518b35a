//! Simulation settings
//!
//! Persisted in LocalStorage on the web; read from an optional JSON file natively.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_KEY_STEP_DEGREES, DEFAULT_MAX_ROTATIONS};
use crate::error::SettingsError;

/// Unit used for angle readouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AngleUnit::Degrees => "Degrees",
            AngleUnit::Radians => "Radians",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "degrees" | "deg" => Some(AngleUnit::Degrees),
            "radians" | "rad" => Some(AngleUnit::Radians),
            _ => None,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Full rotations allowed each way (positive, even)
    pub max_rotations: u32,
    /// Snap input to special angles
    pub special_angles: bool,
    /// Arrow-key step outside special-angle mode (degrees)
    pub key_step_degrees: f64,
    /// Readout unit
    pub angle_unit: AngleUnit,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_rotations: DEFAULT_MAX_ROTATIONS,
            special_angles: false,
            key_step_degrees: DEFAULT_KEY_STEP_DEGREES,
            angle_unit: AngleUnit::Degrees,
        }
    }
}

impl Settings {
    /// Reject values the state machine can't work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_rotations == 0 || self.max_rotations % 2 != 0 {
            return Err(SettingsError::InvalidMaxRotations(self.max_rotations));
        }
        if !self.key_step_degrees.is_finite() || self.key_step_degrees <= 0.0 {
            return Err(SettingsError::InvalidKeyStep(self.key_step_degrees));
        }
        Ok(())
    }

    /// Parse and validate settings JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "unit_circle_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
