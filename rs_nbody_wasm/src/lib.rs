// rs_nbody_wasm/src/lib.rs
// Browser-facing wrapper around a simulation session: the renderer reads positions
// and calls step()/reset() once per frame.

use wasm_bindgen::prelude::*;
use rs_nbody::acceleration::BackendKind;
use rs_nbody::simulation::Simulation;
use rs_nbody::utils::{NBodyError, SimulationConfig};

#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Samples a Plummer cluster. Only the single-threaded naive loop is available in
    /// the browser build.
    #[wasm_bindgen(constructor)]
    pub fn new(particle_count: usize, dt: f64, softening: f64, seed: u64) -> Result<WasmSimulation, JsValue> {
        let config = SimulationConfig::new(
            Some(particle_count),
            Some(dt),
            Some(softening),
            Some(seed),
            Some(BackendKind::NaiveLoop),
            None,
        );
        Simulation::new(config).map(|sim| Self { sim }).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<(), JsValue> {
        self.sim.step().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn simulate(&mut self, steps: usize) -> Result<(), JsValue> {
        self.sim.simulate(steps).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.sim.reset().map_err(to_js)
    }

    /// Row-major `[x0, y0, z0, x1, ...]`, ready for a vertex buffer.
    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f32> {
        self.sim.positions_f32()
    }

    #[wasm_bindgen]
    pub fn velocities(&self) -> Vec<f32> {
        self.sim.velocities().iter().map(|&v| v as f32).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> usize {
        self.sim.system().len()
    }

    #[wasm_bindgen(getter)]
    pub fn time(&self) -> f64 {
        self.sim.time()
    }

    #[wasm_bindgen(getter)]
    pub fn energy(&self) -> f64 {
        self.sim.energy()
    }
}

fn to_js(e: NBodyError) -> JsValue {
    JsValue::from_str(&format!("{}: {}", e.kind(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_reset() {
        let mut sim = WasmSimulation::new(64, 1e-3, 0.05, 3).expect("Failed to create simulation");
        let initial = sim.positions();
        assert_eq!(initial.len(), 64 * 3);
        assert_eq!(sim.particle_count(), 64);

        sim.simulate(5).expect("Simulation failed");
        assert!((sim.time() - 5e-3).abs() < 1e-12);
        assert_ne!(sim.positions(), initial);

        sim.reset().expect("Reset failed");
        assert_eq!(sim.positions(), initial);
        assert_eq!(sim.velocities().len(), 64 * 3);
    }
}
