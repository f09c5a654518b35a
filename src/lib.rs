//! Unit Circle - angle engine for an interactive trigonometry simulation
//!
//! Core modules:
//! - `sim`: Rotation state machine, special angles, trig readouts, input policy
//! - `angle`: Radian/degree unit types
//! - `settings`: Startup configuration
//! - `error`: Error types
//! - `platform`: Browser bindings (wasm32 only)

pub mod angle;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use angle::{Degrees, Radians};
pub use error::{AngleError, SettingsError};
pub use settings::{AngleUnit, Settings};

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Largest |tan| value handed to the view; beyond it the singularity flag is raised
    pub const MAX_TAN_DISPLAY: f64 = 350.0;

    /// Previous drag sample must be past this angle (degrees) for a seam crossing to count as a wrap
    pub const WRAP_COMPARISON_DEGREES: f64 = 149.0;

    /// Drag targets are quantized to this many degrees
    pub const ANGLE_RESOLUTION_DEGREES: f64 = 0.5;

    /// Small-angle snapping sends |angle| >= this (degrees) to 180°
    pub const SNAP_SEAM_DEGREES: f64 = 165.0;

    /// Quarter turn. Named for the small-angle view; never limits the full angle.
    pub const MAX_SMALL_ANGLE_LIMIT: f64 = std::f64::consts::FRAC_PI_2;

    /// Default full rotations allowed in each direction (must be even)
    pub const DEFAULT_MAX_ROTATIONS: u32 = 50;

    /// Default keyboard step (degrees) outside special-angle mode
    pub const DEFAULT_KEY_STEP_DEGREES: f64 = 5.0;
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle_positive(angle: f64) -> f64 {
    use std::f64::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert_eq!(normalize_angle(PI), PI);
        // -π maps onto the closed end of the range
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(5.0 * PI).abs() - PI).abs() < 1e-9);
        assert!((normalize_angle(2.0 * PI + PI / 4.0) - PI / 4.0).abs() < 1e-12);
        assert!(normalize_angle(-1e-18) <= 0.0);
    }

    #[test]
    fn test_normalize_angle_positive() {
        assert!((normalize_angle_positive(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        assert_eq!(normalize_angle_positive(0.0), 0.0);
        assert!(normalize_angle_positive(-1e-18) < std::f64::consts::TAU);
    }

    #[test]
    fn test_polar_round_trip() {
        let p = polar_to_cartesian(2.0, PI / 3.0);
        let (r, theta) = cartesian_to_polar(p);
        assert!((r - 2.0).abs() < 1e-12);
        assert!((theta - PI / 3.0).abs() < 1e-12);
    }
}
