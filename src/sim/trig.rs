//! Trig evaluation and readout snapshots

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::special::SpecialAngle;
use crate::angle::{Degrees, Radians};
use crate::consts::MAX_TAN_DISPLAY;

/// Which trig function a view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrigFunction {
    #[default]
    Cos,
    Sin,
    Tan,
}

impl TrigFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrigFunction::Cos => "cos",
            TrigFunction::Sin => "sin",
            TrigFunction::Tan => "tan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cos" | "cosine" => Some(TrigFunction::Cos),
            "sin" | "sine" => Some(TrigFunction::Sin),
            "tan" | "tangent" => Some(TrigFunction::Tan),
            _ => None,
        }
    }
}

/// Clamp a raw tangent to the display bound
///
/// Returns the displayable value and whether the bound was exceeded.
#[inline]
pub fn classify_tangent(raw: f64) -> (f64, bool) {
    if raw.abs() > MAX_TAN_DISPLAY {
        (MAX_TAN_DISPLAY.copysign(raw), true)
    } else {
        (raw, false)
    }
}

/// Everything a view needs after a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub full_angle: Radians,
    pub small_angle: Radians,
    pub full_angle_degrees: Degrees,
    pub small_angle_degrees: Degrees,
    /// Small angle in [0°, 360°)
    pub small_angle_degrees_positive: Degrees,
    pub rotation_number: i64,
    pub full_turn_count: i64,
    pub half_turn_count: i64,
    pub cos: f64,
    pub sin: f64,
    /// Display-clamped tangent
    pub tan: f64,
    pub singularity: bool,
    pub max_angle_exceeded: bool,
    /// Point on the unit circle
    pub point: DVec2,
    pub special_angle: Option<SpecialAngle>,
}

impl Readout {
    pub fn value_of(&self, function: TrigFunction) -> f64 {
        match function {
            TrigFunction::Cos => self.cos,
            TrigFunction::Sin => self.sin,
            TrigFunction::Tan => self.tan,
        }
    }
}
