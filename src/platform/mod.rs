//! Platform abstraction layer
//!
//! Browser bindings: the JS view layer decodes pointer/keyboard events into
//! angles and calls into `UnitCircle`, then re-reads the readout after each
//! call. Native builds drive `sim` directly.

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;

    use crate::angle::Radians;
    use crate::settings::Settings;
    use crate::sim::{AngleInput, AngleStateMachine, StepDirection, apply_input};

    /// Angle state exposed to JS
    #[wasm_bindgen]
    pub struct UnitCircle {
        machine: AngleStateMachine,
        settings: Settings,
    }

    #[wasm_bindgen]
    impl UnitCircle {
        #[wasm_bindgen(constructor)]
        pub fn new() -> UnitCircle {
            let settings = Settings::load();
            UnitCircle {
                machine: AngleStateMachine::from_settings(&settings),
                settings,
            }
        }

        /// Pointer sample on the circle (radians, (-π, π])
        pub fn drag(&mut self, small_angle: f64) -> Result<bool, JsValue> {
            self.apply(AngleInput::Drag(Radians(small_angle)))
        }

        /// Pointer on the graph (unbounded radians)
        #[wasm_bindgen(js_name = graphDrag)]
        pub fn graph_drag(&mut self, full_angle: f64) -> Result<bool, JsValue> {
            self.apply(AngleInput::GraphDrag(Radians(full_angle)))
        }

        pub fn rotate(&mut self, delta: f64) -> Result<bool, JsValue> {
            self.apply(AngleInput::Rotate(Radians(delta)))
        }

        pub fn step(&mut self, increase: bool) -> Result<bool, JsValue> {
            let direction = if increase {
                StepDirection::Increase
            } else {
                StepDirection::Decrease
            };
            self.apply(AngleInput::Key(direction))
        }

        pub fn reset(&mut self) -> Result<bool, JsValue> {
            self.apply(AngleInput::Reset)
        }

        #[wasm_bindgen(js_name = setSpecialAngles)]
        pub fn set_special_angles(&mut self, enabled: bool) {
            self.settings.special_angles = enabled;
            self.settings.save();
        }

        /// Current readout as a JSON string (also refreshes the singularity flag)
        pub fn readout(&mut self) -> Result<String, JsValue> {
            serde_json::to_string(&self.machine.readout())
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }

        /// Pending change notifications as a JSON array
        #[wasm_bindgen(js_name = drainEvents)]
        pub fn drain_events(&mut self) -> Result<String, JsValue> {
            serde_json::to_string(&self.machine.drain_events())
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }
    }

    impl UnitCircle {
        fn apply(&mut self, input: AngleInput) -> Result<bool, JsValue> {
            apply_input(&mut self.machine, input, &self.settings)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        }
    }

    impl Default for UnitCircle {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::UnitCircle;
