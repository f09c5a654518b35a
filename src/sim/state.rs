//! Rotation state and the angle state machine
//!
//! The state machine is the single source of truth for how far the user has
//! rotated. It keeps an unbounded "full" angle alongside the wrapped "small"
//! angle a point on the circle shows, and counts the turns between them.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::special::{SpecialAngle, snap_full_degrees, snap_small_degrees};
use super::trig::{Readout, classify_tangent};
use crate::angle::{Degrees, Radians};
use crate::consts::*;
use crate::error::AngleError;
use crate::settings::Settings;
use crate::{normalize_angle, normalize_angle_positive, polar_to_cartesian};

/// Small angles within this many degrees of a special angle report it
const SPECIAL_ANGLE_TOLERANCE: f64 = 1e-6;

/// Change notifications, queued at the end of each mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AngleEvent {
    /// Full or small angle moved
    AngleChanged { full: Radians, small: Radians },
    /// Rotation number changed (seam crossed or absolute jump)
    RotationWrapped { rotation_number: i64 },
    /// `max_angle_exceeded` flipped
    MaxAngleExceeded(bool),
    /// `singularity` flipped during a tan() evaluation
    SingularityChanged(bool),
    /// State returned to zero
    Reset,
}

/// Everything that changes as the user rotates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    /// Unbounded cumulative rotation, clamped to the max angle limit
    pub full_angle: Radians,
    /// Rotation wrapped to (-π, π]
    pub small_angle: Radians,
    /// Small-angle sample from the previous update (for seam detection)
    pub previous_small_angle: Radians,
    /// Whole turns between the full and small angle
    pub rotation_number: i64,
    /// Nearest whole turn
    pub full_turn_count: i64,
    /// Half turns, truncated toward zero
    pub half_turn_count: i64,
    /// |tan| exceeded the display bound at the last evaluation
    pub singularity: bool,
    /// |full angle| had reached the limit at the last check
    pub max_angle_exceeded: bool,
}

/// Largest |full angle| allowed for a given number of rotations
#[inline]
pub fn max_angle_limit(max_rotations: u32) -> Radians {
    Radians(f64::from(max_rotations) * PI + FRAC_PI_2)
}

/// Values compared before/after a mutation to decide which events fire
#[derive(Clone, Copy)]
struct Marker {
    full: Radians,
    small: Radians,
    rotation_number: i64,
}

/// Result of a pointer sample before it is committed
struct SampleTarget {
    rotation_number: i64,
    small: Radians,
    target: f64,
    previous: Radians,
}

/// Owns the rotation state and applies updates to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngleStateMachine {
    state: RotationState,
    max_angle_limit: Radians,
    /// Pending notifications (drained by the host)
    #[serde(skip)]
    events: Vec<AngleEvent>,
}

impl Default for AngleStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROTATIONS)
    }
}

impl AngleStateMachine {
    /// Create a machine at zero, allowing `max_rotations` turns each way
    pub fn new(max_rotations: u32) -> Self {
        Self {
            state: RotationState::default(),
            max_angle_limit: max_angle_limit(max_rotations),
            events: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.max_rotations)
    }

    /// Restore a previously captured state
    pub fn with_state(mut self, state: RotationState) -> Self {
        self.state = state;
        self
    }

    // === Accessors ===

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn full_angle(&self) -> Radians {
        self.state.full_angle
    }

    pub fn small_angle(&self) -> Radians {
        self.state.small_angle
    }

    pub fn full_angle_degrees(&self) -> Degrees {
        self.state.full_angle.to_degrees()
    }

    pub fn small_angle_degrees(&self) -> Degrees {
        self.state.small_angle.to_degrees()
    }

    /// Small angle in [0°, 360°)
    pub fn small_angle_degrees_positive(&self) -> Degrees {
        Radians(normalize_angle_positive(self.state.small_angle.value())).to_degrees()
    }

    pub fn previous_small_angle(&self) -> Radians {
        self.state.previous_small_angle
    }

    pub fn rotation_number(&self) -> i64 {
        self.state.rotation_number
    }

    pub fn full_turn_count(&self) -> i64 {
        self.state.full_turn_count
    }

    pub fn half_turn_count(&self) -> i64 {
        self.state.half_turn_count
    }

    pub fn singularity(&self) -> bool {
        self.state.singularity
    }

    pub fn max_angle_exceeded(&self) -> bool {
        self.state.max_angle_exceeded
    }

    pub fn max_angle_limit(&self) -> Radians {
        self.max_angle_limit
    }

    /// Point on the unit circle at the full angle
    pub fn point(&self) -> DVec2 {
        polar_to_cartesian(1.0, self.state.full_angle.value())
    }

    /// Special angle the small angle currently sits on
    pub fn special_angle(&self) -> Option<SpecialAngle> {
        SpecialAngle::near(self.small_angle_degrees(), SPECIAL_ANGLE_TOLERANCE)
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<AngleEvent> {
        std::mem::take(&mut self.events)
    }

    // === Trig ===

    pub fn cos(&self) -> f64 {
        self.state.full_angle.cos()
    }

    pub fn sin(&self) -> f64 {
        self.state.full_angle.sin()
    }

    /// Tangent of the full angle, clamped to ±`MAX_TAN_DISPLAY`
    ///
    /// Every call updates `singularity`: set when the raw value was beyond the
    /// bound, cleared otherwise. Views read `singularity()` after calling this
    /// to decide between a number and an infinity glyph.
    pub fn tan(&mut self) -> f64 {
        let (value, singular) = classify_tangent(self.state.full_angle.tan());
        if singular != self.state.singularity {
            self.events.push(AngleEvent::SingularityChanged(singular));
        }
        self.state.singularity = singular;
        value
    }

    /// Snapshot of every readout. Evaluates `tan()`, so it refreshes `singularity`.
    pub fn readout(&mut self) -> Readout {
        let tan = self.tan();
        Readout {
            full_angle: self.full_angle(),
            small_angle: self.small_angle(),
            full_angle_degrees: self.full_angle_degrees(),
            small_angle_degrees: self.small_angle_degrees(),
            small_angle_degrees_positive: self.small_angle_degrees_positive(),
            rotation_number: self.rotation_number(),
            full_turn_count: self.full_turn_count(),
            half_turn_count: self.half_turn_count(),
            cos: self.cos(),
            sin: self.sin(),
            tan,
            singularity: self.singularity(),
            max_angle_exceeded: self.max_angle_exceeded(),
            point: self.point(),
            special_angle: self.special_angle(),
        }
    }

    // === Mutators ===

    /// Set the full angle directly and recompute everything derived from it
    ///
    /// Turn counts come from `target` before clamping, so an overshoot still
    /// reports the turn it reached; only the stored full angle is clamped.
    pub fn set_from_absolute_angle(&mut self, target: Radians) -> Result<(), AngleError> {
        AngleError::check("angle", target.value())?;
        let before = self.marker();

        let t = target.value();
        let small = normalize_angle(t);
        self.state.rotation_number = ((t - small) / TAU).round() as i64;
        self.state.small_angle = Radians(small);
        self.state.previous_small_angle = Radians(small);
        self.update_turn_counts(t);
        self.state.full_angle = target.clamp_symmetric(self.max_angle_limit);

        self.emit_changes(before);
        Ok(())
    }

    /// Update from a wrapped pointer sample in (-π, π]
    ///
    /// The rotation number changes only when the sample jumps across the ±π
    /// seam from beyond ±149° on the other side. Sparse samples can therefore
    /// miss a wrap. Samples outside the range are wrapped first. A sample that
    /// rounds onto -180° is stored as π one turn lower, the same point.
    pub fn set_from_small_angle(&mut self, sample: Radians) -> Result<(), AngleError> {
        AngleError::check("small angle", sample.value())?;
        let sample = wrap_sample(sample);
        let before = self.marker();
        self.apply_small_sample(sample, sample.to_degrees());
        self.emit_changes(before);
        Ok(())
    }

    /// Snap a wrapped pointer sample to the nearest special angle
    pub fn snap_to_nearest_special_angle(&mut self, sample: Radians) -> Result<(), AngleError> {
        AngleError::check("small angle", sample.value())?;
        let snapped = snap_small_degrees(wrap_sample(sample).to_degrees());
        let before = self.marker();
        self.apply_small_sample(small_radians(snapped), snapped);
        self.emit_changes(before);
        Ok(())
    }

    /// Apply a pointer sample, honouring the max-angle wall
    ///
    /// Once the limit has been reached, a sample whose target is still at or
    /// past it is ignored: only `previous_small_angle` moves, so the rotation
    /// number never counts laps the full angle did not make. Returns whether
    /// the sample was applied.
    pub fn apply_bounded_small_angle(
        &mut self,
        sample: Radians,
        special_angles_active: bool,
    ) -> Result<bool, AngleError> {
        AngleError::check("small angle", sample.value())?;
        let sample = wrap_sample(sample);
        let (sample, sample_degrees) = if special_angles_active {
            let snapped = snap_small_degrees(sample.to_degrees());
            (small_radians(snapped), snapped)
        } else {
            (sample, sample.to_degrees())
        };

        if self.state.max_angle_exceeded {
            let candidate = self.small_sample_target(sample, sample_degrees);
            if candidate.target.abs() >= self.max_angle_limit.value() {
                log::trace!("Ignoring drag to {:.3} past the max angle", candidate.target);
                self.state.previous_small_angle = candidate.previous;
                return Ok(false);
            }
        }

        let before = self.marker();
        self.apply_small_sample(sample, sample_degrees);
        self.emit_changes(before);
        Ok(true)
    }

    /// Snap an unbounded angle to the nearest special angle of its turn
    pub fn snap_to_nearest_special_angle_from_full_angle(
        &mut self,
        full: Radians,
    ) -> Result<(), AngleError> {
        AngleError::check("angle", full.value())?;
        let snapped = snap_full_degrees(full.to_degrees());
        self.set_from_absolute_angle(snapped.to_radians())
    }

    /// Refresh `max_angle_exceeded` from the current full angle
    ///
    /// Not called by the setters: input handlers branch on the previous
    /// value before applying a new angle.
    pub fn check_max_angle_exceeded(&mut self) {
        let exceeded = self.state.full_angle.abs() >= self.max_angle_limit;
        if exceeded != self.state.max_angle_exceeded {
            if exceeded {
                log::info!(
                    "Max angle reached ({:.1})",
                    self.max_angle_limit.to_degrees()
                );
            }
            self.events.push(AngleEvent::MaxAngleExceeded(exceeded));
        }
        self.state.max_angle_exceeded = exceeded;
    }

    /// Apply a proposed full angle, honouring the max-angle wall
    ///
    /// Once the limit has been reached only proposals strictly inside it are
    /// applied; the rest are ignored. Returns whether the proposal was applied.
    pub fn apply_bounded_update(
        &mut self,
        proposed: Radians,
        special_angles_active: bool,
    ) -> Result<bool, AngleError> {
        AngleError::check("angle", proposed.value())?;
        if self.state.max_angle_exceeded && proposed.abs() >= self.max_angle_limit {
            log::trace!("Ignoring {:.3} past the max angle", proposed);
            return Ok(false);
        }
        if special_angles_active {
            self.snap_to_nearest_special_angle_from_full_angle(proposed)?;
        } else {
            self.set_from_absolute_angle(proposed)?;
        }
        Ok(true)
    }

    /// Back to zero, clearing every flag
    pub fn reset(&mut self) {
        self.state = RotationState::default();
        self.events.push(AngleEvent::Reset);
        log::info!("Angle reset");
    }

    // === Internals ===

    /// Where a pointer sample would land, without touching the state
    fn small_sample_target(&self, sample: Radians, sample_degrees: Degrees) -> SampleTarget {
        let comparison = WRAP_COMPARISON_DEGREES.to_radians();
        let previous = self.state.previous_small_angle.value();
        let mut rotation_number = self.state.rotation_number;

        if sample.value() < 0.0 && previous > comparison {
            rotation_number += 1;
        } else if sample.value() > 0.0 && previous < -comparison {
            rotation_number -= 1;
        }

        // Quantizing the small part is the same as quantizing the target,
        // since whole turns are multiples of the resolution
        let small_degrees = sample_degrees.round_to(ANGLE_RESOLUTION_DEGREES);
        let (rotation_number, small, previous) = if small_degrees.value() <= -180.0 {
            // -180° is π on the turn below; the next seam check starts from π
            (rotation_number - 1, Radians::HALF_TURN, Radians::HALF_TURN)
        } else {
            (rotation_number, small_radians(small_degrees), sample)
        };

        SampleTarget {
            rotation_number,
            small,
            target: rotation_number as f64 * TAU + small.value(),
            previous,
        }
    }

    /// Seam detection, half-degree quantization, counters, clamp
    fn apply_small_sample(&mut self, sample: Radians, sample_degrees: Degrees) {
        let next = self.small_sample_target(sample, sample_degrees);

        self.state.rotation_number = next.rotation_number;
        self.state.small_angle = next.small;
        self.update_turn_counts(next.target);
        self.state.full_angle = Radians(next.target).clamp_symmetric(self.max_angle_limit);
        self.state.previous_small_angle = next.previous;
    }

    fn update_turn_counts(&mut self, target: f64) {
        self.state.half_turn_count = ((target - target % PI) / PI).round() as i64;
        self.state.full_turn_count = (target / TAU).round() as i64;
    }

    fn marker(&self) -> Marker {
        Marker {
            full: self.state.full_angle,
            small: self.state.small_angle,
            rotation_number: self.state.rotation_number,
        }
    }

    fn emit_changes(&mut self, before: Marker) {
        if before.rotation_number != self.state.rotation_number {
            log::debug!(
                "Rotation number {} -> {}",
                before.rotation_number,
                self.state.rotation_number
            );
            self.events.push(AngleEvent::RotationWrapped {
                rotation_number: self.state.rotation_number,
            });
        }
        if before.full != self.state.full_angle || before.small != self.state.small_angle {
            self.events.push(AngleEvent::AngleChanged {
                full: self.state.full_angle,
                small: self.state.small_angle,
            });
        }
    }
}

/// Bring a sample into (-π, π]; in-range samples pass through untouched
fn wrap_sample(sample: Radians) -> Radians {
    if sample.value() > -PI && sample.value() <= PI {
        sample
    } else {
        Radians(normalize_angle(sample.value()))
    }
}

/// Degrees to radians, keeping 180° exactly at π
fn small_radians(degrees: Degrees) -> Radians {
    if degrees.value() == 180.0 {
        Radians::HALF_TURN
    } else {
        degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::trig::TrigFunction;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_4;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn deg(d: f64) -> Radians {
        Degrees(d).to_radians()
    }

    #[test]
    fn test_absolute_angle_scenario() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(TAU + FRAC_PI_4)).unwrap();
        assert_eq!(m.full_turn_count(), 1);
        assert_eq!(m.rotation_number(), 1);
        assert!(approx(m.small_angle().value(), FRAC_PI_4));
        assert_eq!(m.half_turn_count(), 2);
    }

    #[test]
    fn test_absolute_angle_negative() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(-3.0 * PI / 2.0)).unwrap();
        assert_eq!(m.rotation_number(), -1);
        assert!(approx(m.small_angle().value(), FRAC_PI_2));
        assert_eq!(m.half_turn_count(), -1);
        assert_eq!(m.full_turn_count(), -1);
    }

    #[test]
    fn test_absolute_angle_half_turn_stays_positive() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(-PI)).unwrap();
        assert!(approx(m.small_angle().value(), PI));
        assert_eq!(m.rotation_number(), -1);
    }

    #[test]
    fn test_absolute_angle_clamps_but_counts_overshoot() {
        let mut m = AngleStateMachine::new(2);
        let limit = m.max_angle_limit();
        assert!(approx(limit.value(), 2.5 * PI));

        m.set_from_absolute_angle(Radians(2.9 * PI)).unwrap();
        assert_eq!(m.full_angle(), limit);
        assert_eq!(m.half_turn_count(), 2);
        assert_eq!(m.full_turn_count(), 1);

        m.set_from_absolute_angle(Radians(-2.9 * PI)).unwrap();
        assert_eq!(m.full_angle(), -limit);
        assert_eq!(m.half_turn_count(), -2);
        assert_eq!(m.full_turn_count(), -1);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(1.0)).unwrap();
        let before = m.state().clone();

        assert!(m.set_from_absolute_angle(Radians(f64::NAN)).is_err());
        assert!(m.set_from_small_angle(Radians(f64::INFINITY)).is_err());
        assert!(m.snap_to_nearest_special_angle(Radians(f64::NAN)).is_err());
        assert!(m.snap_to_nearest_special_angle_from_full_angle(Radians(f64::NEG_INFINITY)).is_err());
        assert!(m.apply_bounded_update(Radians(f64::NAN), false).is_err());
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn test_small_angle_wrap_forward() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(deg(170.0)).unwrap();
        m.set_from_small_angle(deg(-170.0)).unwrap();
        assert_eq!(m.rotation_number(), 1);
        assert!(approx(m.full_angle_degrees().value(), 190.0));
        assert!(approx(m.small_angle_degrees().value(), -170.0));
    }

    #[test]
    fn test_small_angle_wrap_backward() {
        let mut m = AngleStateMachine::default();
        m.set_from_small_angle(deg(-160.0)).unwrap();
        assert_eq!(m.rotation_number(), 0);
        m.set_from_small_angle(deg(175.0)).unwrap();
        assert_eq!(m.rotation_number(), -1);
        assert!(approx(m.full_angle_degrees().value(), -185.0));
    }

    #[test]
    fn test_small_angle_large_jump_is_not_a_wrap() {
        let mut m = AngleStateMachine::default();
        m.set_from_small_angle(deg(100.0)).unwrap();
        m.set_from_small_angle(deg(-100.0)).unwrap();
        assert_eq!(m.rotation_number(), 0);
        assert!(approx(m.full_angle_degrees().value(), -100.0));
    }

    #[test]
    fn test_small_angle_full_drag_around() {
        let mut m = AngleStateMachine::default();
        // Two counter-clockwise laps in 10° steps
        for step in 1..=72 {
            let d = normalize_angle((f64::from(step) * 10.0).to_radians());
            m.set_from_small_angle(Radians(d)).unwrap();
        }
        assert_eq!(m.rotation_number(), 2);
        assert!(approx(m.full_angle_degrees().value(), 720.0));
        assert_eq!(m.full_turn_count(), 2);
        assert_eq!(m.half_turn_count(), 4);
    }

    #[test]
    fn test_small_angle_quantized_to_half_degree() {
        let mut m = AngleStateMachine::default();
        m.set_from_small_angle(deg(17.2)).unwrap();
        assert!(approx(m.full_angle_degrees().value(), 17.0));
        m.set_from_small_angle(deg(17.3)).unwrap();
        assert!(approx(m.full_angle_degrees().value(), 17.5));
        // Previous sample keeps full precision
        assert!(approx(m.previous_small_angle().to_degrees().value(), 17.3));
    }

    #[test]
    fn test_small_angle_seam_rounding_is_exact() {
        let mut m = AngleStateMachine::default();
        m.set_from_small_angle(deg(-179.9)).unwrap();
        assert_eq!(m.small_angle(), Radians(PI));
        assert_eq!(m.rotation_number(), -1);
        assert!(approx(m.full_angle_degrees().value(), -180.0));
        let rebuilt = m.rotation_number() as f64 * TAU + m.small_angle().value();
        assert!(approx(rebuilt, m.full_angle().value()));

        // Moving on from the seam in either direction counts no extra turn
        m.set_from_small_angle(deg(179.0)).unwrap();
        assert_eq!(m.rotation_number(), -1);
        assert!(approx(m.full_angle_degrees().value(), -181.0));
        m.set_from_small_angle(deg(-179.0)).unwrap();
        assert_eq!(m.rotation_number(), 0);
        assert!(approx(m.full_angle_degrees().value(), -179.0));
    }

    #[test]
    fn test_small_angle_minus_pi_treated_as_pi() {
        let mut m = AngleStateMachine::default();
        m.set_from_small_angle(Radians(-PI)).unwrap();
        assert_eq!(m.small_angle(), Radians(PI));
        assert_eq!(m.rotation_number(), 0);
    }

    #[test]
    fn test_snap_small_angle() {
        let mut m = AngleStateMachine::default();
        m.snap_to_nearest_special_angle(Radians(0.3)).unwrap();
        assert!(approx(m.full_angle_degrees().value(), 30.0));
        assert_eq!(m.special_angle(), SpecialAngle::new(30));
    }

    #[test]
    fn test_snap_small_angle_seam() {
        let mut m = AngleStateMachine::default();
        m.snap_to_nearest_special_angle(deg(-170.0)).unwrap();
        assert_eq!(m.small_angle(), Radians(PI));
        assert_eq!(m.rotation_number(), 0);
        assert!(approx(m.full_angle().value(), PI));
    }

    #[test]
    fn test_snap_small_angle_wraps() {
        let mut m = AngleStateMachine::default();
        m.snap_to_nearest_special_angle(deg(150.0)).unwrap();
        m.snap_to_nearest_special_angle(deg(-150.0)).unwrap();
        assert_eq!(m.rotation_number(), 1);
        assert!(approx(m.full_angle_degrees().value(), 210.0));
    }

    #[test]
    fn test_snap_idempotent() {
        let mut m = AngleStateMachine::default();
        m.snap_to_nearest_special_angle(Radians(FRAC_PI_2)).unwrap();
        assert!(approx(m.full_angle().value(), FRAC_PI_2));
        m.snap_to_nearest_special_angle(m.small_angle()).unwrap();
        assert!(approx(m.full_angle().value(), FRAC_PI_2));

        m.snap_to_nearest_special_angle_from_full_angle(Radians(TAU + FRAC_PI_4)).unwrap();
        let first = m.full_angle();
        m.snap_to_nearest_special_angle_from_full_angle(first).unwrap();
        assert!(approx(m.full_angle().value(), first.value()));
    }

    #[test]
    fn test_snap_from_full_angle() {
        let mut m = AngleStateMachine::default();
        m.snap_to_nearest_special_angle_from_full_angle(deg(720.0 + 350.0)).unwrap();
        assert!(approx(m.full_angle_degrees().value(), 1080.0));
        assert_eq!(m.full_turn_count(), 3);

        m.snap_to_nearest_special_angle_from_full_angle(deg(-400.0)).unwrap();
        assert!(approx(m.full_angle_degrees().value(), -405.0));
        assert_eq!(m.rotation_number(), -1);
    }

    #[test]
    fn test_tan_singularity() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(FRAC_PI_2 - 1e-6)).unwrap();
        let t = m.tan();
        assert!(t.abs() <= MAX_TAN_DISPLAY);
        assert_eq!(t, MAX_TAN_DISPLAY);
        assert!(m.singularity());

        m.set_from_absolute_angle(Radians(0.0)).unwrap();
        // Setting the angle alone does not touch the flag
        assert!(m.singularity());
        assert_eq!(m.tan(), 0.0);
        assert!(!m.singularity());
    }

    #[test]
    fn test_tan_fires_every_call() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(-FRAC_PI_2 - 1e-7)).unwrap();
        assert_eq!(m.tan(), MAX_TAN_DISPLAY);
        assert_eq!(m.tan(), MAX_TAN_DISPLAY);
        assert!(m.singularity());
        let events = m.drain_events();
        let flips = events
            .iter()
            .filter(|e| matches!(e, AngleEvent::SingularityChanged(_)))
            .count();
        assert_eq!(flips, 1);
    }

    #[test]
    fn test_clamp_wall() {
        let mut m = AngleStateMachine::new(2);
        let limit = m.max_angle_limit();
        m.set_from_absolute_angle(limit + Radians(1.0)).unwrap();
        m.check_max_angle_exceeded();
        assert!(m.max_angle_exceeded());
        assert_eq!(m.full_angle(), limit);

        assert!(!m.apply_bounded_update(limit + Radians(0.1), false).unwrap());
        assert_eq!(m.full_angle(), limit);

        assert!(m.apply_bounded_update(limit - Radians(0.1), false).unwrap());
        assert!(approx(m.full_angle().value(), limit.value() - 0.1));
        m.check_max_angle_exceeded();
        assert!(!m.max_angle_exceeded());
    }

    #[test]
    fn test_bounded_update_before_limit() {
        let mut m = AngleStateMachine::new(2);
        let limit = m.max_angle_limit();
        m.check_max_angle_exceeded();
        // Not exceeded yet, so an overshoot is applied and clamped
        assert!(m.apply_bounded_update(limit + Radians(0.5), false).unwrap());
        assert_eq!(m.full_angle(), limit);
        m.check_max_angle_exceeded();
        assert!(m.max_angle_exceeded());
    }

    #[test]
    fn test_bounded_update_special() {
        let mut m = AngleStateMachine::default();
        assert!(m.apply_bounded_update(deg(50.0), true).unwrap());
        assert!(approx(m.full_angle_degrees().value(), 45.0));
    }

    #[test]
    fn test_reset() {
        let mut m = AngleStateMachine::new(2);
        m.set_from_absolute_angle(Radians(100.0)).unwrap();
        m.check_max_angle_exceeded();
        m.set_from_absolute_angle(Radians(FRAC_PI_2)).unwrap();
        m.tan();
        assert!(m.singularity());
        m.reset();
        assert_eq!(m.state(), &RotationState::default());
        assert!(!m.max_angle_exceeded());
        assert!(!m.singularity());
        assert_eq!(m.drain_events().last(), Some(&AngleEvent::Reset));
    }

    #[test]
    fn test_events_order() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(deg(170.0)).unwrap();
        m.drain_events();
        m.set_from_small_angle(deg(-170.0)).unwrap();
        let events = m.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], AngleEvent::RotationWrapped { rotation_number: 1 });
        assert!(matches!(events[1], AngleEvent::AngleChanged { .. }));

        // Same angle again: nothing to report
        m.set_from_small_angle(deg(-170.0)).unwrap();
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_readout() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(deg(-90.0)).unwrap();
        let r = m.readout();
        assert!(approx(r.small_angle_degrees_positive.value(), 270.0));
        assert!(approx(r.sin, -1.0));
        assert!(approx(r.value_of(TrigFunction::Sin), -1.0));
        assert_eq!(r.value_of(TrigFunction::Tan).abs(), MAX_TAN_DISPLAY);
        assert!(r.singularity);
        assert!(approx(r.point.y, -1.0));
        assert_eq!(r.special_angle, SpecialAngle::new(-90));
    }

    #[test]
    fn test_state_serde_round_trip() {
        let mut m = AngleStateMachine::default();
        m.set_from_absolute_angle(Radians(7.0)).unwrap();
        let json = serde_json::to_string(m.state()).unwrap();
        let state: RotationState = serde_json::from_str(&json).unwrap();
        let restored = AngleStateMachine::default().with_state(state);
        assert_eq!(restored.rotation_number(), m.rotation_number());
        assert_eq!(restored.full_turn_count(), m.full_turn_count());
        assert_eq!(restored.half_turn_count(), m.half_turn_count());
        assert!(approx(restored.full_angle().value(), 7.0));
        assert!(approx(restored.small_angle().value(), m.small_angle().value()));
    }

    proptest! {
        #[test]
        fn prop_round_trip(x in -(50.0 * PI + FRAC_PI_2)..(50.0 * PI + FRAC_PI_2)) {
            let mut m = AngleStateMachine::default();
            m.set_from_absolute_angle(Radians(x)).unwrap();
            let rebuilt = m.rotation_number() as f64 * TAU + m.small_angle().value();
            prop_assert!((rebuilt - x).abs() < 1e-9);
            prop_assert!(m.small_angle().value() > -PI);
            prop_assert!(m.small_angle().value() <= PI);
            prop_assert!((m.full_angle().value() - x).abs() < 1e-12);
        }

        #[test]
        fn prop_turn_count_monotonic(a in -300.0..300.0f64, b in -300.0..300.0f64) {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let mut m = AngleStateMachine::default();
            m.set_from_absolute_angle(Radians(lo)).unwrap();
            let lo_turns = m.full_turn_count();
            m.set_from_absolute_angle(Radians(hi)).unwrap();
            prop_assert!(m.full_turn_count() >= lo_turns);
        }

        #[test]
        fn prop_small_samples_stay_in_range(samples in prop::collection::vec(-PI..PI, 1..50)) {
            let mut m = AngleStateMachine::default();
            for s in samples {
                m.set_from_small_angle(Radians(s)).unwrap();
                prop_assert!(m.small_angle().value() > -PI);
                prop_assert!(m.small_angle().value() <= PI);
                prop_assert!(m.full_angle().abs() <= m.max_angle_limit());
            }
        }

        #[test]
        fn prop_bounded_drag_keeps_rotor_in_sync(samples in prop::collection::vec(-PI..PI, 1..200)) {
            let settings = Settings { max_rotations: 2, ..Settings::default() };
            let mut m = AngleStateMachine::from_settings(&settings);
            for s in samples {
                m.check_max_angle_exceeded();
                m.apply_bounded_small_angle(Radians(s), false).unwrap();
                let rebuilt = m.rotation_number() as f64 * TAU + m.small_angle().value();
                if m.full_angle().abs() < m.max_angle_limit() {
                    prop_assert!((rebuilt - m.full_angle().value()).abs() < 1e-9);
                } else {
                    // Pinned: the rotor is at most one sample past the wall
                    prop_assert!(rebuilt.abs() < m.max_angle_limit().value() + TAU);
                }
            }
        }
    }
}
