use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ChromeclothError, ChromeclothResult};
use crate::geometry::Point;

/// Whether rings are chained into one spiral or drawn as separate closed polygons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMethod {
    Spiral,
    Polygons,
}

impl PathMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PathMethod::Spiral => "spiral",
            PathMethod::Polygons => "polygons",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingMethod {
    Geometric,
    CatmullRom,
    Asymmetric,
}

/// Where the per-segment tension factor comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingSampling {
    /// One factor per ring, from its normalized radius.
    Radius,
    /// One factor per vertex, from the noise field.
    Noise,
}

/// All tunable parameters. Exposed as sliders and toggles by the control panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Rings
    pub ring_count: usize,
    pub vertices_per_ring: usize,
    pub inner_hole: f64,
    pub radius_scale: f64,

    // Angular
    pub angle_offset: f64,
    pub path_method: PathMethod,

    // Noise
    pub seed: f64,
    pub smoothing_scale: f64,
    pub x_multiplier: f64,
    pub y_multiplier: f64,
    pub polar_sampling: bool,
    pub single_axis_noise: bool,
    pub map_offset_to_unit_range: bool,

    // Smoothing
    pub smooth_enabled: bool,
    pub smoothing_method: SmoothingMethod,
    pub smoothing_sampling: SmoothingSampling,
    pub path_noise_smoothing: f64,
    pub inversed: bool,

    // Moiré
    pub moire_enabled: bool,
    pub moire_offset: Point,
}

impl Default for Params {
    fn default() -> Self {
        Preset::Cloth.params()
    }
}

/// Named starting points for the parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Dense 20-vertex spiral with shared-axis displacement.
    Cloth,
    /// Triangular rings with decorrelated, low-frequency displacement.
    /// This is also the baseline `randomize()` draws around.
    Chromecloth,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Cloth, Preset::Chromecloth];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Cloth => "cloth",
            Preset::Chromecloth => "chromecloth",
        }
    }

    pub fn params(self) -> Params {
        match self {
            Preset::Cloth => Params {
                ring_count: 100,
                vertices_per_ring: 20,
                inner_hole: 0.0,
                radius_scale: 2.5,
                angle_offset: 1.0,
                path_method: PathMethod::Spiral,
                seed: 1000.0,
                smoothing_scale: 42.0,
                x_multiplier: 18.0,
                y_multiplier: 18.0,
                polar_sampling: false,
                single_axis_noise: true,
                map_offset_to_unit_range: true,
                smooth_enabled: true,
                smoothing_method: SmoothingMethod::Geometric,
                smoothing_sampling: SmoothingSampling::Radius,
                path_noise_smoothing: 1.0,
                inversed: false,
                moire_enabled: true,
                moire_offset: Point::new(3.0, 3.0),
            },
            Preset::Chromecloth => Params {
                vertices_per_ring: 3,
                angle_offset: 0.0,
                seed: 500.0,
                smoothing_scale: 160.0,
                x_multiplier: 22.5,
                y_multiplier: 22.5,
                single_axis_noise: false,
                ..Preset::Cloth.params()
            },
        }
    }
}

impl FromStr for Preset {
    type Err = ChromeclothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChromeclothError::UnknownPreset(s.to_string()))
    }
}

/// Slider bounds of one interactive control.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Control {
    pub name: &'static str,
    pub folder: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

impl Control {
    const fn slider(name: &'static str, folder: &'static str, min: f64, max: f64) -> Self {
        Self { name, folder, min, max, step: None }
    }

    const fn stepped(name: &'static str, folder: &'static str, min: f64, max: f64) -> Self {
        Self { name, folder, min, max, step: Some(1.0) }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() { self.min } else { value.clamp(self.min, self.max) }
    }

    pub fn clamp_count(&self, value: usize) -> usize {
        value.clamp(self.min as usize, self.max as usize)
    }
}

const SEED: Control = Control::slider("seed", "noise", 0.0, 2000.0);
const SMOOTHING_SCALE: Control = Control::slider("smoothing_scale", "noise", 0.0, 200.0);
const X_MULTIPLIER: Control = Control::slider("x_multiplier", "noise", 0.0, 100.0);
const Y_MULTIPLIER: Control = Control::slider("y_multiplier", "noise", 0.0, 100.0);
const MOIRE_X: Control = Control::slider("moire_x", "moire", 0.0, 10.0);
const MOIRE_Y: Control = Control::slider("moire_y", "moire", 0.0, 10.0);
const RING_COUNT: Control = Control::stepped("ring_count", "polygons", 50.0, 200.0);
const VERTICES_PER_RING: Control = Control::stepped("vertices_per_ring", "polygons", 3.0, 50.0);
const ANGLE_OFFSET: Control = Control::slider("angle_offset", "polygons", -3.0, 3.0);
const RADIUS_SCALE: Control = Control::slider("radius_scale", "polygons", 2.0, 10.0);
const INNER_HOLE: Control = Control::slider("inner_hole", "polygons", 0.0, 1.0);
const PATH_NOISE_SMOOTHING: Control =
    Control::slider("path_noise_smoothing", "polygons", 0.0, 1.0);

pub const CONTROLS: [Control; 12] = [
    SEED,
    SMOOTHING_SCALE,
    X_MULTIPLIER,
    Y_MULTIPLIER,
    MOIRE_X,
    MOIRE_Y,
    RING_COUNT,
    VERTICES_PER_RING,
    ANGLE_OFFSET,
    RADIUS_SCALE,
    INNER_HOLE,
    PATH_NOISE_SMOOTHING,
];

impl Params {
    pub fn from_json_str(s: &str) -> ChromeclothResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: &Path) -> ChromeclothResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ChromeclothError::ReadParams {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> String {
        // Every field is a plain number, bool or unit enum.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Clamps every slider-backed field into its control range.
    pub fn clamp_to_controls(&mut self) {
        self.seed = SEED.clamp(self.seed);
        self.smoothing_scale = SMOOTHING_SCALE.clamp(self.smoothing_scale);
        self.x_multiplier = X_MULTIPLIER.clamp(self.x_multiplier);
        self.y_multiplier = Y_MULTIPLIER.clamp(self.y_multiplier);
        self.moire_offset.x = MOIRE_X.clamp(self.moire_offset.x);
        self.moire_offset.y = MOIRE_Y.clamp(self.moire_offset.y);
        self.ring_count = RING_COUNT.clamp_count(self.ring_count);
        self.vertices_per_ring = VERTICES_PER_RING.clamp_count(self.vertices_per_ring);
        self.angle_offset = ANGLE_OFFSET.clamp(self.angle_offset);
        self.radius_scale = RADIUS_SCALE.clamp(self.radius_scale);
        self.inner_hole = INNER_HOLE.clamp(self.inner_hole);
        self.path_noise_smoothing = PATH_NOISE_SMOOTHING.clamp(self.path_noise_smoothing);
    }

    /// Overwrites the curated subset of fields with random draws.
    ///
    /// Structural fields are pinned (three vertices per ring, spiral paths,
    /// radius-driven geometric smoothing) so randomized output stays stable.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        *self = Params {
            map_offset_to_unit_range: rng.random_bool(0.5),
            polar_sampling: rng.random_bool(0.5),
            seed: rng.random_range(0.0..1000.0),
            smoothing_scale: rng.random_range(140.0..180.0),
            x_multiplier: rng.random_range(0.0..45.0),
            y_multiplier: rng.random_range(0.0..45.0),
            angle_offset: rng.random_range(-3.0..3.0),
            ..Preset::Chromecloth.params()
        };
    }
}

/// Drawing surface in SVG user units. The pattern is centered in it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}
