//! Input handling
//!
//! Turns already-decoded user input into state machine calls. Raw pointer and
//! keyboard events are converted to angles by the view layer before they
//! arrive here.

use serde::{Deserialize, Serialize};

use super::special::{StepDirection, next_special_degrees};
use super::state::AngleStateMachine;
use crate::angle::{Degrees, Radians};
use crate::error::AngleError;
use crate::settings::Settings;

/// One user action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AngleInput {
    /// Pointer sample on the unit circle, wrapped to (-π, π]
    Drag(Radians),
    /// Pointer position on the graph, already an unbounded angle
    GraphDrag(Radians),
    /// Relative rotation
    Rotate(Radians),
    /// Arrow key
    Key(StepDirection),
    Reset,
}

/// Apply one input to the machine
///
/// Returns whether the angle was updated. Inputs pushing past the max angle
/// after it has been reached are ignored and return `Ok(false)`.
pub fn apply_input(
    machine: &mut AngleStateMachine,
    input: AngleInput,
    settings: &Settings,
) -> Result<bool, AngleError> {
    let result = apply_checked(machine, input, settings);
    match &result {
        Ok(applied) => log::debug!("{:?} applied={}", input, applied),
        Err(e) => log::warn!("Rejected {:?}: {}", input, e),
    }
    result
}

fn apply_checked(
    machine: &mut AngleStateMachine,
    input: AngleInput,
    settings: &Settings,
) -> Result<bool, AngleError> {
    if let AngleInput::Reset = input {
        machine.reset();
        return Ok(true);
    }

    // The wall decision uses the state from before this input
    machine.check_max_angle_exceeded();

    let applied = match input {
        AngleInput::Drag(sample) => {
            machine.apply_bounded_small_angle(sample, settings.special_angles)?
        }
        AngleInput::GraphDrag(full) => {
            machine.apply_bounded_update(full, settings.special_angles)?
        }
        AngleInput::Rotate(delta) => {
            AngleError::check("delta", delta.value())?;
            let proposed = machine.full_angle() + delta;
            machine.apply_bounded_update(proposed, settings.special_angles)?
        }
        AngleInput::Key(direction) => {
            let proposed = key_target(machine, direction, settings);
            machine.apply_bounded_update(proposed, settings.special_angles)?
        }
        AngleInput::Reset => unreachable!("handled above"),
    };

    machine.check_max_angle_exceeded();
    Ok(applied)
}

/// Where an arrow key moves the angle
fn key_target(
    machine: &AngleStateMachine,
    direction: StepDirection,
    settings: &Settings,
) -> Radians {
    let current = machine.full_angle_degrees();
    let target = if settings.special_angles {
        next_special_degrees(current, direction)
    } else {
        current + Degrees(direction.signum() * settings.key_step_degrees)
    };
    target.to_radians()
}
