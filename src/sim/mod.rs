//! Angle simulation module
//!
//! All angle logic lives here. It must stay free of view concerns:
//! - Inputs arrive as angles or deltas, never raw events
//! - Updates are applied in delivery order
//! - Notifications are queued, not pushed

pub mod input;
pub mod special;
pub mod state;
pub mod trig;

pub use input::{AngleInput, apply_input};
pub use special::{
    ExactValue, Magnitude, PiFraction, SpecialAngle, StepDirection, next_special_degrees,
    snap_full_degrees, snap_small_degrees,
};
pub use state::{AngleEvent, AngleStateMachine, RotationState, max_angle_limit};
pub use trig::{Readout, TrigFunction, classify_tangent};
