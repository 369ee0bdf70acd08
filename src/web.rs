//! Browser surface
//!
//! Exposes the simulation to a JS render host via wasm-bindgen. The host owns
//! the canvas, the sliders and `requestAnimationFrame`; it calls `frame` once
//! per animation frame and reads `snapshot` to draw.

use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::sim::Simulation;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Already installed when the module is re-instantiated
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Gaze Arena module loaded");
}

/// Parse host options, seeding from the clock unless a seed was given
fn parse_config(json: &str) -> Result<SimConfig, JsError> {
    let mut config = SimConfig::from_json(json)?;
    let has_seed = serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| v.get("seed").cloned())
        .is_some();
    if !has_seed {
        config.seed = js_sys::Date::now() as u64;
    }
    Ok(config)
}

/// Handle held by the JS host
#[wasm_bindgen]
pub struct ArenaHandle {
    sim: Simulation,
}

#[wasm_bindgen]
impl ArenaHandle {
    /// Create a simulation from a flat JSON object of options
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ArenaHandle, JsError> {
        let config = parse_config(config_json)?;
        log::info!("Arena created with seed: {}", config.seed);
        Ok(Self {
            sim: Simulation::new(config),
        })
    }

    /// Rebuild the roster from new options
    pub fn initialize(&mut self, config_json: &str) -> Result<(), JsError> {
        let config = parse_config(config_json)?;
        self.sim.initialize(config);
        Ok(())
    }

    /// Stage options for the next restart
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsError> {
        let config = parse_config(config_json)?;
        self.sim.set_config(config);
        Ok(())
    }

    pub fn tick(&mut self, elapsed_seconds: f64) {
        self.sim.tick(elapsed_seconds);
    }

    /// Advance from a `requestAnimationFrame` timestamp (milliseconds)
    pub fn frame(&mut self, timestamp_ms: f64) {
        self.sim.frame(timestamp_ms / 1000.0);
    }

    pub fn start(&mut self) {
        self.sim.start();
    }

    pub fn pause(&mut self) {
        self.sim.pause();
    }

    pub fn resume(&mut self) {
        self.sim.resume();
    }

    pub fn restart(&mut self) {
        self.sim.restart();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.sim.is_running()
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.sim.is_paused()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.sim.is_game_over()
    }

    /// Render state as JSON
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.sim.snapshot())?)
    }

    /// Summary counters as JSON
    pub fn statistics(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.sim.statistics())?)
    }

    /// Events since the last call, as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.sim.drain_events())?)
    }

    #[wasm_bindgen(js_name = totalEyeContacts)]
    pub fn total_eye_contacts(&self) -> f64 {
        self.sim.total_eye_contacts() as f64
    }

    #[wasm_bindgen(js_name = totalExits)]
    pub fn total_exits(&self) -> f64 {
        self.sim.total_exits() as f64
    }

    /// Call `callback` (no arguments) when every agent is excluded
    #[wasm_bindgen(js_name = onGameOver)]
    pub fn on_game_over(&mut self, callback: js_sys::Function) {
        self.sim.on_game_over(move || {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("Game over callback failed: {:?}", e);
            }
        });
    }
}
