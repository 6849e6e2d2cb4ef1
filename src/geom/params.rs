//! Shape parameters for vase generation.
//!
//! All linear values are in inches. Wave amplitudes and nozzle-derived sizes
//! are evaluated in millimetres and converted back with the fixed
//! [`INCH_TO_MM`] factor; the factor is not configurable.

use serde::{Deserialize, Serialize};

pub const INCH_TO_MM: f64 = 25.4;
pub const MM_TO_INCH: f64 = 1.0 / INCH_TO_MM;

/// Nozzle diameter of the target printer in millimetres.
pub const NOZZLE_DIAMETER_MM: f64 = 0.4;

pub const DEFAULT_HEIGHT_INCHES: f64 = 5.0;
pub const DEFAULT_RADIUS_INCHES: f64 = 2.5;

/// Path samples per strand (excluding the final `t = 1` sample).
pub const VASE_PATH_STEPS: usize = 200;
pub const ARTISTIC_PATH_STEPS: usize = 50;

/// Segments around one cross-section ring.
pub const VASE_PROFILE_SEGMENTS: usize = 16;
pub const ARTISTIC_PROFILE_SEGMENTS: usize = 8;

/// Upper bound on `num_paths` in artistic mode.
pub const MAX_STRANDS: u32 = 48;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("parameter `{0}` must be finite")]
    NonFinite(&'static str),
    #[error("parameter `{name}` must be > 0 (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("parameter `{name}` must be >= 0 (got {value})")]
    Negative { name: &'static str, value: f64 },
    #[error("artistic mode requires at least one path")]
    NoStrands,
    #[error("artistic mode supports at most {max} paths (got {value})")]
    TooManyStrands { value: u32, max: u32 },
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("parameter `{0}` is not a boolean flag")]
    NotAFlag(String),
    #[error("parameter `{0}` is a boolean flag")]
    NotANumber(String),
}

/// Which path generator drives the loft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathStrategy {
    /// Spiral (vase mode) or multi-strand artistic waves.
    #[default]
    Parametric,
    /// Constant-radius helix with `twist_rate` turns and no waves.
    SimpleHelix,
}

/// Immutable snapshot of everything that shapes one generated mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeParameters {
    pub height: f64,
    pub base_radius: f64,
    pub top_radius: f64,

    /// Turns per unit `t`.
    pub twist_rate: f64,
    pub flow_freq: f64,
    pub flow_amplitude: f64,
    pub height_freq: f64,
    pub num_paths: u32,
    pub profile_width: f64,
    pub profile_height: f64,

    pub vase_mode: bool,
    pub smooth_spiral: bool,
    /// Smoothing radius as a percentage of the nozzle diameter.
    pub xy_smoothing: f64,
    pub bottom_layers: u32,

    pub path_strategy: PathStrategy,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT_INCHES,
            base_radius: DEFAULT_RADIUS_INCHES,
            top_radius: DEFAULT_RADIUS_INCHES,
            twist_rate: 2.5,
            flow_freq: 3.0,
            flow_amplitude: 0.3,
            height_freq: 2.0,
            num_paths: 24,
            profile_width: 0.2,
            profile_height: 0.1,
            vase_mode: false,
            smooth_spiral: false,
            xy_smoothing: 200.0,
            bottom_layers: 3,
            path_strategy: PathStrategy::Parametric,
        }
    }
}

impl ShapeParameters {
    /// Number of independent lofted strands.
    #[must_use]
    pub fn strand_count(&self) -> usize {
        if self.vase_mode { 1 } else { self.num_paths as usize }
    }

    #[must_use]
    pub fn path_steps(&self) -> usize {
        if self.vase_mode { VASE_PATH_STEPS } else { ARTISTIC_PATH_STEPS }
    }

    #[must_use]
    pub fn profile_segments(&self) -> usize {
        if self.vase_mode { VASE_PROFILE_SEGMENTS } else { ARTISTIC_PROFILE_SEGMENTS }
    }

    #[must_use]
    pub fn height_mm(&self) -> f64 {
        self.height * INCH_TO_MM
    }

    /// Whether the base cap extension applies to this snapshot.
    #[must_use]
    pub fn wants_base_cap(&self) -> bool {
        self.vase_mode && self.bottom_layers > 0
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        let finite = [
            ("height", self.height),
            ("baseRadius", self.base_radius),
            ("topRadius", self.top_radius),
            ("twistRate", self.twist_rate),
            ("flowFreq", self.flow_freq),
            ("flowAmplitude", self.flow_amplitude),
            ("heightFreq", self.height_freq),
            ("profileWidth", self.profile_width),
            ("profileHeight", self.profile_height),
            ("xySmoothing", self.xy_smoothing),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ParamError::NonFinite(*name));
        }

        if self.height <= 0.0 {
            return Err(ParamError::NonPositive { name: "height", value: self.height });
        }
        for (name, value) in [("baseRadius", self.base_radius), ("topRadius", self.top_radius)] {
            if value < 0.0 {
                return Err(ParamError::Negative { name, value });
            }
        }
        if self.xy_smoothing < 0.0 {
            return Err(ParamError::Negative { name: "xySmoothing", value: self.xy_smoothing });
        }

        if !self.vase_mode {
            if self.num_paths == 0 {
                return Err(ParamError::NoStrands);
            }
            if self.num_paths > MAX_STRANDS {
                return Err(ParamError::TooManyStrands { value: self.num_paths, max: MAX_STRANDS });
            }
            for (name, value) in [
                ("profileWidth", self.profile_width),
                ("profileHeight", self.profile_height),
            ] {
                if value <= 0.0 {
                    return Err(ParamError::NonPositive { name, value });
                }
            }
        }

        Ok(())
    }

    /// Set a numeric parameter the way a panel slider would: clamp to the
    /// range and snap to its step. Returns the value actually stored.
    pub fn set_number(&mut self, name: &str, value: f64) -> Result<f64, ParamError> {
        let range = find_range(name).ok_or_else(|| unknown_or_flag(name))?;
        if !value.is_finite() {
            return Err(ParamError::NonFinite(range.name));
        }
        let value = range.apply(value);

        match range.name {
            "height" => self.height = value,
            "baseRadius" => self.base_radius = value,
            "topRadius" => self.top_radius = value,
            "twistRate" => self.twist_rate = value,
            "flowFreq" => self.flow_freq = value,
            "flowAmplitude" => self.flow_amplitude = value,
            "heightFreq" => self.height_freq = value,
            "numPaths" => self.num_paths = value.round() as u32,
            "profileWidth" => self.profile_width = value,
            "profileHeight" => self.profile_height = value,
            "xySmoothing" => self.xy_smoothing = value,
            "bottomLayers" => self.bottom_layers = value.round() as u32,
            other => return Err(ParamError::UnknownParameter(other.to_string())),
        }

        Ok(value)
    }

    /// Current value of a numeric parameter, looked up like [`set_number`](Self::set_number).
    pub fn number(&self, name: &str) -> Result<f64, ParamError> {
        let range = find_range(name).ok_or_else(|| unknown_or_flag(name))?;
        let value = match range.name {
            "height" => self.height,
            "baseRadius" => self.base_radius,
            "topRadius" => self.top_radius,
            "twistRate" => self.twist_rate,
            "flowFreq" => self.flow_freq,
            "flowAmplitude" => self.flow_amplitude,
            "heightFreq" => self.height_freq,
            "numPaths" => f64::from(self.num_paths),
            "profileWidth" => self.profile_width,
            "profileHeight" => self.profile_height,
            "xySmoothing" => self.xy_smoothing,
            "bottomLayers" => f64::from(self.bottom_layers),
            other => return Err(ParamError::UnknownParameter(other.to_string())),
        };
        Ok(value)
    }

    pub fn set_flag(&mut self, name: &str, enabled: bool) -> Result<(), ParamError> {
        match normalize_name(name).as_str() {
            "vasemode" => {
                self.vase_mode = enabled;
                if enabled {
                    self.apply_vase_presets();
                }
            }
            "smoothspiral" => self.smooth_spiral = enabled,
            "usesimplegenerator" | "simplehelix" => {
                self.path_strategy = if enabled {
                    PathStrategy::SimpleHelix
                } else {
                    PathStrategy::Parametric
                };
            }
            _ if find_range(name).is_some() => return Err(ParamError::NotAFlag(name.to_string())),
            _ => return Err(ParamError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    /// Vase mode prints a single wall at nozzle width.
    pub fn apply_vase_presets(&mut self) {
        self.num_paths = 1;
        self.profile_width = NOZZLE_DIAMETER_MM * MM_TO_INCH;
        self.profile_height = NOZZLE_DIAMETER_MM * MM_TO_INCH;
    }
}

/// Slider description for one numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ParameterRange {
    const fn new(name: &'static str, min: f64, max: f64, step: Option<f64>) -> Self {
        Self { name, min, max, step }
    }

    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let mut clamped = value.clamp(self.min, self.max);
        if let Some(step) = self.step.filter(|s| *s > 0.0) {
            clamped = self.min + ((clamped - self.min) / step).round() * step;
            clamped = clamped.clamp(self.min, self.max);
        }
        clamped
    }
}

pub const PARAMETER_RANGES: &[ParameterRange] = &[
    ParameterRange::new("height", 1.0, 10.0, Some(0.1)),
    ParameterRange::new("baseRadius", 0.5, 5.0, Some(0.1)),
    ParameterRange::new("topRadius", 0.5, 5.0, Some(0.1)),
    ParameterRange::new("xySmoothing", 100.0, 500.0, None),
    ParameterRange::new("bottomLayers", 0.0, 5.0, Some(1.0)),
    ParameterRange::new("twistRate", 0.0, 5.0, Some(0.1)),
    ParameterRange::new("flowFreq", 0.0, 10.0, Some(0.1)),
    ParameterRange::new("flowAmplitude", 0.0, 1.0, Some(0.01)),
    ParameterRange::new("heightFreq", 0.0, 5.0, Some(0.1)),
    ParameterRange::new("numPaths", 4.0, MAX_STRANDS as f64, Some(1.0)),
    ParameterRange::new("profileWidth", 0.1, 1.0, Some(0.05)),
    ParameterRange::new("profileHeight", 0.1, 1.0, Some(0.05)),
];

/// Accepts `baseRadius`, `base_radius` and `BaseRadius` alike.
#[must_use]
pub fn find_range(name: &str) -> Option<&'static ParameterRange> {
    let wanted = normalize_name(name);
    PARAMETER_RANGES
        .iter()
        .find(|range| normalize_name(range.name) == wanted)
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn unknown_or_flag(name: &str) -> ParamError {
    match normalize_name(name).as_str() {
        "vasemode" | "smoothspiral" | "usesimplegenerator" | "simplehelix" => {
            ParamError::NotANumber(name.to_string())
        }
        _ => ParamError::UnknownParameter(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let params = ShapeParameters::default();
        params.validate().expect("defaults are valid");
        assert_eq!(params.strand_count(), 24);
        assert_eq!(params.path_steps(), 50);
        assert_eq!(params.profile_segments(), 8);
        assert!(!params.wants_base_cap());
    }

    #[test]
    fn vase_mode_uses_single_strand_and_fine_sampling() {
        let params = ShapeParameters { vase_mode: true, ..Default::default() };
        assert_eq!(params.strand_count(), 1);
        assert_eq!(params.path_steps(), 200);
        assert_eq!(params.profile_segments(), 16);
        assert!(params.wants_base_cap());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let params = ShapeParameters { height: 0.0, ..Default::default() };
        assert_eq!(
            params.validate(),
            Err(ParamError::NonPositive { name: "height", value: 0.0 })
        );

        let params = ShapeParameters { top_radius: f64::NAN, ..Default::default() };
        assert_eq!(params.validate(), Err(ParamError::NonFinite("topRadius")));

        let params = ShapeParameters { num_paths: 0, ..Default::default() };
        assert_eq!(params.validate(), Err(ParamError::NoStrands));

        let params: ShapeParameters = serde_json::from_str(r#"{"numPaths": 5000000}"#).unwrap();
        assert_eq!(
            params.validate(),
            Err(ParamError::TooManyStrands { value: 5_000_000, max: MAX_STRANDS })
        );

        let params = ShapeParameters { base_radius: -1.0, ..Default::default() };
        assert!(matches!(params.validate(), Err(ParamError::Negative { name: "baseRadius", .. })));
    }

    #[test]
    fn vase_mode_ignores_artistic_profile_and_strand_count() {
        let params = ShapeParameters {
            vase_mode: true,
            num_paths: 0,
            profile_width: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn set_number_clamps_and_snaps() {
        let mut params = ShapeParameters::default();

        let applied = params.set_number("height", 42.0).unwrap();
        assert_eq!(applied, 10.0);
        assert_eq!(params.height, 10.0);

        let applied = params.set_number("base_radius", 1.234).unwrap();
        assert!((applied - 1.2).abs() < 1e-9);
        assert!((params.base_radius - 1.2).abs() < 1e-9);

        params.set_number("numPaths", 7.4).unwrap();
        assert_eq!(params.num_paths, 7);

        params.set_number("NumPaths", 1.0).unwrap();
        assert_eq!(params.num_paths, 4);
    }

    #[test]
    fn set_number_rejects_unknown_and_flags() {
        let mut params = ShapeParameters::default();
        assert!(matches!(
            params.set_number("wobble", 1.0),
            Err(ParamError::UnknownParameter(_))
        ));
        assert!(matches!(
            params.set_number("vaseMode", 1.0),
            Err(ParamError::NotANumber(_))
        ));
        assert!(matches!(
            params.set_number("height", f64::INFINITY),
            Err(ParamError::NonFinite("height"))
        ));
    }

    #[test]
    fn enabling_vase_mode_forces_nozzle_profile() {
        let mut params = ShapeParameters::default();
        params.set_flag("vaseMode", true).unwrap();
        assert!(params.vase_mode);
        assert_eq!(params.num_paths, 1);
        assert!((params.profile_width - 0.4 / 25.4).abs() < 1e-12);
        assert!((params.profile_height - 0.4 / 25.4).abs() < 1e-12);

        params.set_flag("useSimpleGenerator", true).unwrap();
        assert_eq!(params.path_strategy, PathStrategy::SimpleHelix);

        assert!(matches!(params.set_flag("height", true), Err(ParamError::NotAFlag(_))));
    }

    #[test]
    fn number_reads_back_what_set_number_stored() {
        let mut params = ShapeParameters::default();
        let applied = params.set_number("twist_rate", 3.33).unwrap();
        assert_eq!(params.number("twistRate"), Ok(applied));
        assert_eq!(params.number("bottomLayers"), Ok(3.0));
        assert!(matches!(params.number("smoothSpiral"), Err(ParamError::NotANumber(_))));
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let params: ShapeParameters =
            serde_json::from_str(r#"{"vaseMode": true, "baseRadius": 2.0, "pathStrategy": "simpleHelix"}"#)
                .unwrap();
        assert!(params.vase_mode);
        assert_eq!(params.base_radius, 2.0);
        assert_eq!(params.top_radius, DEFAULT_RADIUS_INCHES);
        assert_eq!(params.path_strategy, PathStrategy::SimpleHelix);
    }
}
