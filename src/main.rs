//! Unit Circle entry point
//!
//! On the web this only sets up logging; the page drives `UnitCircle`.
//! Natively it replays a scripted session and logs the readouts.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Unit Circle starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Unit Circle (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match unit_circle::Settings::load_from(std::path::Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => unit_circle::Settings::default(),
    };

    if let Err(e) = replay_session(&settings) {
        log::error!("Session aborted: {}", e);
        std::process::exit(1);
    }
}

/// Drag once around the circle, step through special angles, then reset
#[cfg(not(target_arch = "wasm32"))]
fn replay_session(settings: &unit_circle::Settings) -> Result<(), unit_circle::AngleError> {
    use unit_circle::sim::{AngleInput, AngleStateMachine, StepDirection, apply_input};
    use unit_circle::{AngleUnit, Degrees, normalize_angle};

    let mut machine = AngleStateMachine::from_settings(settings);
    let special = unit_circle::Settings {
        special_angles: true,
        ..settings.clone()
    };

    let mut inputs: Vec<(AngleInput, &unit_circle::Settings)> = (1..=40)
        .map(|i| {
            let sample = normalize_angle(Degrees(f64::from(i) * 10.0).to_radians().value());
            (AngleInput::Drag(unit_circle::Radians(sample)), settings)
        })
        .collect();
    inputs.extend((0..4).map(|_| (AngleInput::Key(StepDirection::Increase), &special)));
    inputs.push((AngleInput::Reset, settings));

    for (input, input_settings) in inputs {
        apply_input(&mut machine, input, input_settings)?;
        let readout = machine.readout();
        let angle = match settings.angle_unit {
            AngleUnit::Degrees => format!("{:.1}", readout.full_angle_degrees),
            AngleUnit::Radians => format!("{:.4}", readout.full_angle),
        };
        let tan = if readout.singularity {
            "∞".to_string()
        } else {
            format!("{:.3}", readout.tan)
        };
        let exact = readout
            .special_angle
            .map(|a| format!(" [{}]", a.pi_fraction()))
            .unwrap_or_default();
        println!(
            "{:>10} turns={} cos={:.3} sin={:.3} tan={}{}",
            angle, readout.full_turn_count, readout.cos, readout.sin, tan, exact
        );
        for event in machine.drain_events() {
            log::debug!("{:?}", event);
        }
    }
    Ok(())
}
