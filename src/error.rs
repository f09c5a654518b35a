//! Error types

/// Rejected angle input. The rotation state is never modified when one of
/// these is returned.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AngleError {
    #[error("non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}

impl AngleError {
    /// Pass `value` through if it is finite
    pub fn check(what: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { what, value })
        }
    }
}

/// Invalid or unreadable settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("max rotations must be a positive even integer, got {0}")]
    InvalidMaxRotations(u32),
    #[error("key step must be a positive finite number of degrees, got {0}")]
    InvalidKeyStep(f64),
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
}
