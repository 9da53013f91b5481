//! Browser host
//!
//! JavaScript forwards input events and calls [`WebGame::update`] from
//! `requestAnimationFrame`, then draws from [`WebGame::snapshot_json`].

use wasm_bindgen::prelude::*;

use crate::persistence::LocalStorageStore;
use crate::sim::{Autopilot, Screen, Session, TickInput};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger already set: {e}").into());
    }
    log::info!("Tako Jump starting...");
}

/// A session driven from JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    input: TickInput,
    /// Plays by itself on the title screen when set
    demo: Option<Autopilot>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let session = Session::new(Tuning::default(), Box::new(LocalStorageStore::default()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            session,
            input: TickInput::default(),
            demo: None,
        })
    }

    /// Replace the default stage table with a JSON one
    pub fn with_tuning(json: &str) -> Result<WebGame, JsValue> {
        let tuning = Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let session = Session::new(tuning, Box::new(LocalStorageStore::default()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            session,
            input: TickInput::default(),
            demo: None,
        })
    }

    /// Level-triggered input: jump button and arrow keys
    pub fn set_input(&mut self, charge_held: bool, direction_x: i8, direction_y: i8) {
        self.input.charge_held = charge_held;
        self.input.direction_x = direction_x.signum();
        self.input.direction_y = direction_y.signum();
    }

    pub fn release_charge(&mut self) {
        self.input.charge_held = false;
        self.input.charge_just_released = true;
    }

    pub fn confirm(&mut self) {
        self.demo = None;
        self.input.confirm_just_released = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause_toggle_requested = true;
    }

    pub fn restart(&mut self) {
        self.input.restart_requested = true;
    }

    /// Attract mode: the autopilot plays until the next confirm
    pub fn set_demo(&mut self, on: bool) {
        self.demo = on.then(Autopilot::new);
    }

    /// Advance by a measured frame time in seconds. Returns steps run.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        match self.demo.as_mut() {
            Some(pilot) => {
                let mut input = pilot.next_input(self.session.state());
                self.session.update(&mut input, frame_dt)
            }
            None => self.session.update(&mut self.input, frame_dt),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.state().screen == Screen::Playing
    }

    /// Full session state as JSON for the renderer
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
