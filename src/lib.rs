#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use geom::{
    AssembleError, AssembleOptions, PARAMETER_RANGES, ShapeParameters, VaseMesh,
    VaseMeshDiagnostics, assemble_with_options,
};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SliderExport {
    id: &'static str,
    min: f64,
    max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<f64>,
    value: f64,
}

#[derive(Debug, Serialize)]
struct GenerateOutput<'a> {
    positions: &'a [f64],
    normals: &'a [f64],
    indices: &'a [u32],
    diagnostics: &'a VaseMeshDiagnostics,
}

/// Public entry point for the viewer's control panel.
///
/// Holds the current parameter snapshot; every `generate` builds a new mesh
/// from scratch.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    params: ShapeParameters,
    options: AssembleOptions,
    last_diagnostics: Option<VaseMeshDiagnostics>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            params: ShapeParameters::default(),
            options: AssembleOptions::default(),
            last_diagnostics: None,
        }
    }

    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current parameters as a camelCase object.
    #[wasm_bindgen]
    pub fn parameters(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.params).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Replace all parameters; missing keys take their defaults.
    #[wasm_bindgen]
    pub fn load_parameters(&mut self, value: JsValue) -> Result<(), JsValue> {
        let params: ShapeParameters = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        self.replace_parameters(params).map_err(to_js_error)
    }

    /// Set a numeric parameter; returns the clamped and snapped value.
    #[wasm_bindgen]
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<f64, JsValue> {
        self.params.set_number(name, value).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_flag(&mut self, name: &str, enabled: bool) -> Result<(), JsValue> {
        self.params.set_flag(name, enabled).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_connect_terminal_ring(&mut self, enabled: bool) {
        self.options.connect_terminal_ring = enabled;
    }

    /// Slider specifications for UI generation.
    #[wasm_bindgen]
    pub fn get_sliders(&self) -> Result<JsValue, JsValue> {
        let sliders = self.slider_exports().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&sliders).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Build the mesh for the current parameters.
    ///
    /// Returns `{ positions, normals, indices, diagnostics }`.
    #[wasm_bindgen]
    pub fn generate(&mut self) -> Result<JsValue, JsValue> {
        let (mesh, diagnostics) = self.generate_mesh().map_err(to_js_error)?;
        debug_log!("generate: {}", diagnostics.summary());

        let output = GenerateOutput {
            positions: &mesh.positions,
            normals: &mesh.normals,
            indices: &mesh.indices,
            diagnostics: &diagnostics,
        };
        let value = serde_wasm_bindgen::to_value(&output)
            .map_err(|err| JsValue::from(JsError::new(&err.to_string())))?;

        self.last_diagnostics = Some(diagnostics);
        Ok(value)
    }

    /// One-line summary of the last successful `generate`.
    #[wasm_bindgen]
    pub fn last_summary(&self) -> Option<String> {
        self.last_diagnostics.as_ref().map(VaseMeshDiagnostics::summary)
    }
}

impl Engine {
    #[must_use]
    pub fn params(&self) -> &ShapeParameters {
        &self.params
    }

    pub fn replace_parameters(&mut self, mut params: ShapeParameters) -> Result<(), AssembleError> {
        if params.vase_mode {
            params.apply_vase_presets();
        }
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn generate_mesh(&self) -> Result<(VaseMesh, VaseMeshDiagnostics), AssembleError> {
        assemble_with_options(&self.params, self.options)
    }

    fn slider_exports(&self) -> Result<Vec<SliderExport>, geom::ParamError> {
        PARAMETER_RANGES
            .iter()
            .map(|range| {
                Ok(SliderExport {
                    id: range.name,
                    min: range.min,
                    max: range.max,
                    step: range.step,
                    value: self.params.number(range.name)?,
                })
            })
            .collect()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::ParamError;

    #[test]
    fn sliders_cover_every_range_with_current_values() {
        let mut engine = Engine::new();
        engine.params.height = 7.5;

        let sliders = engine.slider_exports().unwrap();
        assert_eq!(sliders.len(), PARAMETER_RANGES.len());

        let height = sliders.iter().find(|s| s.id == "height").unwrap();
        assert_eq!(height.value, 7.5);
        assert_eq!((height.min, height.max, height.step), (1.0, 10.0, Some(0.1)));

        let smoothing = sliders.iter().find(|s| s.id == "xySmoothing").unwrap();
        assert_eq!(smoothing.step, None);
    }

    #[test]
    fn replace_parameters_validates_and_applies_vase_presets() {
        let mut engine = Engine::new();

        let bad = ShapeParameters { height: -1.0, ..Default::default() };
        assert!(matches!(
            engine.replace_parameters(bad),
            Err(AssembleError::InvalidParameters(ParamError::NonPositive { .. }))
        ));
        assert_eq!(engine.params(), &ShapeParameters::default());

        let vase = ShapeParameters { vase_mode: true, num_paths: 30, ..Default::default() };
        engine.replace_parameters(vase).unwrap();
        assert_eq!(engine.params().num_paths, 1);
    }

    #[test]
    fn generate_mesh_uses_current_options() {
        let mut engine = Engine::new();
        engine.params.num_paths = 4;

        let (open, _) = engine.generate_mesh().unwrap();
        engine.set_connect_terminal_ring(true);
        let (closed, _) = engine.generate_mesh().unwrap();

        assert_eq!(open.vertex_count(), closed.vertex_count());
        assert!(closed.indices.len() > open.indices.len());
        assert!(engine.last_summary().is_none());
    }
}
