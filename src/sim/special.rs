//! Special angles
//!
//! The "nice" angles the simulation can snap to, and their exact values.
//!
//! Snapping picks the special angle whose interval contains the input, where
//! each border sits halfway between two neighbouring special angles. A value
//! exactly on a border belongs to the interval above it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle::{Degrees, Radians};
use crate::consts::SNAP_SEAM_DEGREES;

/// Special angles inside the small-angle range, ascending, without the ±180° seam
const SMALL_TABLE: [f64; 15] = [
    -150.0, -135.0, -120.0, -90.0, -60.0, -45.0, -30.0, 0.0, 30.0, 45.0, 60.0, 90.0, 120.0,
    135.0, 150.0,
];

/// Special angles of one positive turn, 0° through 360°
const TURN_TABLE: [f64; 17] = [
    0.0, 30.0, 45.0, 60.0, 90.0, 120.0, 135.0, 150.0, 180.0, 210.0, 225.0, 240.0, 270.0, 300.0,
    315.0, 330.0, 360.0,
];

/// Special angles for a signed remainder in (-360°, 360°), ascending
const SIGNED_TURN_TABLE: [f64; 33] = [
    -360.0, -330.0, -315.0, -300.0, -270.0, -240.0, -225.0, -210.0, -180.0, -150.0, -135.0,
    -120.0, -90.0, -60.0, -45.0, -30.0, 0.0, 30.0, 45.0, 60.0, 90.0, 120.0, 135.0, 150.0, 180.0,
    210.0, 225.0, 240.0, 270.0, 300.0, 315.0, 330.0, 360.0,
];

/// Neighbour search ignores special angles closer than this (degrees)
const STEP_EPSILON: f64 = 1e-6;

/// Nearest table entry, borders at midpoints, ties go up
fn snap_in_table(degrees: f64, table: &[f64]) -> f64 {
    for pair in table.windows(2) {
        let border = (pair[0] + pair[1]) / 2.0;
        if degrees < border {
            return pair[0];
        }
    }
    table[table.len() - 1]
}

/// Snap a small angle (degrees, in (-180°, 180°]) to the nearest special angle
pub fn snap_small_degrees(degrees: Degrees) -> Degrees {
    if degrees.value().abs() >= SNAP_SEAM_DEGREES {
        return Degrees(180.0);
    }
    Degrees(snap_in_table(degrees.value(), &SMALL_TABLE))
}

/// Snap an unbounded angle to the nearest special angle of its own turn
///
/// The angle is split into whole turns (truncated toward zero) and a signed
/// remainder in (-360°, 360°); only the remainder is snapped.
pub fn snap_full_degrees(degrees: Degrees) -> Degrees {
    let remainder = degrees.value() % 360.0;
    let turns_part = degrees.value() - remainder;
    Degrees(turns_part + snap_in_table(remainder, &SIGNED_TURN_TABLE))
}

/// Direction of a discrete step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDirection {
    Increase,
    Decrease,
}

impl StepDirection {
    pub fn signum(self) -> f64 {
        match self {
            StepDirection::Increase => 1.0,
            StepDirection::Decrease => -1.0,
        }
    }
}

/// The neighbouring special angle strictly above or below `degrees`
pub fn next_special_degrees(degrees: Degrees, direction: StepDirection) -> Degrees {
    let current = degrees.value();
    let base = (current / 360.0).floor() * 360.0;
    let in_turn = TURN_TABLE.iter().map(|s| base + s);

    let next = match direction {
        StepDirection::Increase => in_turn
            .chain(std::iter::once(base + 360.0 + TURN_TABLE[1]))
            .find(|c| *c > current + STEP_EPSILON),
        StepDirection::Decrease => std::iter::once(base - TURN_TABLE[1])
            .chain(in_turn)
            .rev()
            .find(|c| *c < current - STEP_EPSILON),
    };
    Degrees(next.unwrap_or(current))
}

/// A special angle, stored as whole degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialAngle {
    degrees: i32,
}

impl SpecialAngle {
    /// Build from whole degrees; `None` unless the angle is special modulo 360°
    pub fn new(degrees: i32) -> Option<Self> {
        let in_turn = f64::from(degrees.rem_euclid(360));
        TURN_TABLE
            .contains(&in_turn)
            .then_some(Self { degrees })
    }

    /// Special angle `degrees` sits on, within `tolerance` degrees
    ///
    /// Only small angles are considered; the seam resolves to 180°.
    pub fn near(degrees: Degrees, tolerance: f64) -> Option<Self> {
        let snapped = snap_small_degrees(degrees);
        let distance = if snapped.value() == 180.0 {
            (degrees.value().abs() - 180.0).abs()
        } else {
            (degrees.value() - snapped.value()).abs()
        };
        if distance <= tolerance {
            Self::new(snapped.value() as i32)
        } else {
            None
        }
    }

    pub fn degrees(&self) -> Degrees {
        Degrees(f64::from(self.degrees))
    }

    pub fn radians(&self) -> Radians {
        self.degrees().to_radians()
    }

    /// Angle as a reduced multiple of π
    pub fn pi_fraction(&self) -> PiFraction {
        PiFraction::new(i64::from(self.degrees), 180)
    }

    /// Position within one turn, [0, 360)
    fn in_turn(&self) -> i32 {
        self.degrees.rem_euclid(360)
    }

    /// Reference angle in the first quadrant
    fn reference(&self) -> i32 {
        let half = self.in_turn() % 180;
        if half > 90 { 180 - half } else { half }
    }

    pub fn sin(&self) -> ExactValue {
        let t = self.in_turn();
        ExactValue::finite(t > 180, sine_magnitude(self.reference()))
    }

    pub fn cos(&self) -> ExactValue {
        let t = self.in_turn();
        ExactValue::finite(t > 90 && t < 270, sine_magnitude(90 - self.reference()))
    }

    pub fn tan(&self) -> ExactValue {
        let magnitude = match self.reference() {
            0 => Magnitude::Zero,
            30 => Magnitude::RootThreeOverThree,
            45 => Magnitude::One,
            60 => Magnitude::RootThree,
            _ => return ExactValue::Undefined,
        };
        let t = self.in_turn();
        // Second and fourth quadrants
        let negative = (t > 90 && t < 180) || t > 270;
        ExactValue::finite(negative, magnitude)
    }
}

fn sine_magnitude(reference: i32) -> Magnitude {
    match reference {
        0 => Magnitude::Zero,
        30 => Magnitude::Half,
        45 => Magnitude::RootTwoOverTwo,
        60 => Magnitude::RootThreeOverTwo,
        _ => Magnitude::One,
    }
}

/// Exact magnitude of a trig value at a special angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Magnitude {
    Zero,
    Half,
    RootTwoOverTwo,
    RootThreeOverTwo,
    One,
    RootThreeOverThree,
    RootThree,
}

impl Magnitude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Magnitude::Zero => "0",
            Magnitude::Half => "1/2",
            Magnitude::RootTwoOverTwo => "√2/2",
            Magnitude::RootThreeOverTwo => "√3/2",
            Magnitude::One => "1",
            Magnitude::RootThreeOverThree => "√3/3",
            Magnitude::RootThree => "√3",
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Magnitude::Zero => 0.0,
            Magnitude::Half => 0.5,
            Magnitude::RootTwoOverTwo => std::f64::consts::SQRT_2 / 2.0,
            Magnitude::RootThreeOverTwo => 3f64.sqrt() / 2.0,
            Magnitude::One => 1.0,
            Magnitude::RootThreeOverThree => 3f64.sqrt() / 3.0,
            Magnitude::RootThree => 3f64.sqrt(),
        }
    }
}

/// Exact trig value at a special angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExactValue {
    Finite { negative: bool, magnitude: Magnitude },
    /// tan at odd multiples of 90°
    Undefined,
}

impl ExactValue {
    fn finite(negative: bool, magnitude: Magnitude) -> Self {
        ExactValue::Finite {
            negative: negative && magnitude != Magnitude::Zero,
            magnitude,
        }
    }

    /// Numeric value; `None` when undefined
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            ExactValue::Finite { negative, magnitude } => {
                let v = magnitude.to_f64();
                Some(if *negative { -v } else { v })
            }
            ExactValue::Undefined => None,
        }
    }
}

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactValue::Finite { negative: true, magnitude } => write!(f, "-{}", magnitude.as_str()),
            ExactValue::Finite { magnitude, .. } => f.write_str(magnitude.as_str()),
            ExactValue::Undefined => f.write_str("undefined"),
        }
    }
}

/// A reduced rational multiple of π
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiFraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl PiFraction {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        let g = gcd(numerator.abs(), denominator.abs()).max(1);
        let sign = if denominator < 0 { -1 } else { 1 };
        Self {
            numerator: sign * numerator / g,
            denominator: sign * denominator / g,
        }
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl fmt::Display for PiFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = match self.numerator {
            0 => return f.write_str("0"),
            1 => "π".to_string(),
            -1 => "-π".to_string(),
            n => format!("{n}π"),
        };
        if self.denominator == 1 {
            f.write_str(&head)
        } else {
            write!(f, "{head}/{}", self.denominator)
        }
    }
}
