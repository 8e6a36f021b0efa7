//! Parameter groups of a scenario configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::{CORE_LIBRARY, FLEX_LIBRARY};
use crate::math::{Rgb, ScaleSpec, ValueRange};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(default)]
pub struct GeneralConfig {
    pub seed: u64,
    /// When set, trials share one unseeded stream and are not reproducible.
    pub randomize: bool,
    #[validate(range(min = 1, max = 1000))]
    pub num_trials: u32,
    pub room: String,
    /// Hard ceiling on simulated frames per trial, whatever the scenario says.
    #[validate(range(min = 1))]
    pub frame_ceiling: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            randomize: false,
            num_trials: 10,
            room: "box".to_string(),
            frame_ceiling: 1000,
        }
    }
}

/// Per-axis rotation ranges in degrees. Absent axes stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RotationRanges {
    pub x: Option<ValueRange>,
    pub y: Option<ValueRange>,
    pub z: Option<ValueRange>,
}

impl RotationRanges {
    pub fn yaw(range: ValueRange) -> Self {
        Self {
            y: Some(range),
            ..Default::default()
        }
    }

    pub fn all(range: ValueRange) -> Self {
        Self {
            x: Some(range),
            y: Some(range),
            z: Some(range),
        }
    }
}

/// Sampling parameters for one functional object role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ObjectConfig {
    pub types: Vec<String>,
    pub categories: Option<Vec<String>>,
    pub libraries: Vec<String>,
    pub scale: ScaleSpec,
    pub color: Option<Rgb>,
    pub material: Option<String>,
    pub mass: ValueRange,
    pub rotation: RotationRanges,
    pub friction: Option<f64>,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            types: names(&["cube"]),
            categories: None,
            libraries: Vec::new(),
            scale: ScaleSpec::xyz(0.1, 0.5, 0.25),
            color: None,
            material: Some("parquet_wood_red_cedar".to_string()),
            mass: ValueRange::fixed(2.0),
            rotation: RotationRanges::yaw(ValueRange::fixed(0.0)),
            friction: None,
        }
    }
}

impl ObjectConfig {
    pub fn typed(types: &[&str], scale: ScaleSpec) -> Self {
        Self {
            types: names(types),
            scale,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ZoneConfig {
    pub types: Vec<String>,
    pub scale: ScaleSpec,
    pub color: Option<Rgb>,
    pub material: Option<String>,
    pub friction: f64,
    /// Fixed location; overrides the scenario's zone rule.
    pub location: Option<[f64; 3]>,
    pub remove: bool,
    /// Half-width of the lateral (z) jitter used by some zone rules.
    pub lateral_jitter: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            types: names(&["cube"]),
            scale: ScaleSpec::xyz(0.5, 0.01, 2.0),
            color: Some(Rgb::YELLOW),
            material: Some("wood_european_ash".to_string()),
            friction: 0.1,
            location: None,
            remove: false,
            lateral_jitter: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(default)]
pub struct AxisConfig {
    /// Distance between probe and target along x.
    #[validate(range(min = 0.0))]
    pub length: f64,
    pub remove_target: bool,
    /// Extra height for the probe above the floor.
    pub probe_lift: f64,
    /// Extra height for the pushed target (rolling scenarios).
    pub target_lift: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            length: 2.0,
            remove_target: false,
            probe_lift: 0.0,
            target_lift: 0.0,
        }
    }
}

/// Intermediate structure parameters (dominoes, blocks, links).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StructureConfig {
    pub count: u32,
    pub spacing_jitter: f64,
    pub lateral_jitter: f64,
    /// Lay middle objects on their side.
    pub horizontal: bool,
    /// Skip one randomly chosen middle object.
    pub remove_middle: bool,
    /// Scale offset between consecutive stacked blocks.
    pub scale_gradient: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            count: 3,
            spacing_jitter: 0.2,
            lateral_jitter: 0.2,
            horizontal: false,
            remove_middle: false,
            scale_gradient: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ForceConfig {
    /// Magnitude range, multiplied by the pushed object's mass.
    pub scale: ValueRange,
    /// Azimuth range in degrees.
    pub angle: ValueRange,
    /// Application offset, in units of the object's rotated extent.
    pub offset: [f64; 3],
    pub offset_jitter: f64,
    /// Frame on which the push is delivered.
    pub wait: ValueRange,
    /// Vertical component range.
    pub up_force: ValueRange,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            scale: ValueRange::fixed(2.0),
            angle: ValueRange::fixed(0.0),
            offset: [0.0, 0.8, 0.0],
            offset_jitter: 0.0,
            wait: ValueRange::fixed(0.0),
            up_force: ValueRange::fixed(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RampConfig {
    pub enabled: bool,
    pub color: Option<Rgb>,
    pub scale: Option<[f64; 3]>,
    pub material: Option<String>,
    pub friction: f64,
    /// Height of the optional support under the ramp.
    pub base_height: ValueRange,
    pub base_color: Option<Rgb>,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Some(Rgb::new(0.75, 0.75, 1.0)),
            scale: None,
            material: None,
            friction: 0.1,
            base_height: ValueRange::fixed(0.0),
            base_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CameraConfig {
    pub radius: ValueRange,
    pub min_angle: f64,
    pub max_angle: f64,
    pub min_height: f64,
    pub max_height: f64,
    /// Allow the mirrored azimuth (angle + 180).
    pub reflections: bool,
    pub aim: [f64; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius: ValueRange::fixed(1.75),
            min_angle: 45.0,
            max_angle: 225.0,
            min_height: 0.75,
            max_height: 2.0,
            reflections: false,
            aim: [0.0, 0.5, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DecorSet {
    pub count: u32,
    /// Explicit model names; empty means every model of `libraries`.
    pub types: Vec<String>,
    pub categories: Option<Vec<String>>,
    pub libraries: Vec<String>,
    pub aspect_ratio: Option<ValueRange>,
}

impl Default for DecorSet {
    fn default() -> Self {
        Self {
            count: 0,
            types: Vec::new(),
            categories: None,
            libraries: names(&[CORE_LIBRARY]),
            aspect_ratio: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(default)]
pub struct DecorativeConfig {
    pub distractors: DecorSet,
    pub occluders: DecorSet,
    /// Fraction of the camera's line of sight an occluder should reach.
    #[validate(range(min = 0.0, max = 2.0))]
    pub occlusion_scale: f64,
    /// Make distractors kinematic.
    pub static_distractors: bool,
}

impl Default for DecorativeConfig {
    fn default() -> Self {
        Self {
            distractors: DecorSet::default(),
            occluders: DecorSet::default(),
            occlusion_scale: 0.75,
            static_distractors: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColorConfig {
    pub monochrome: bool,
    pub match_probe_and_target: bool,
    /// Re-draw the middle color every trial.
    pub randomize_across_trials: bool,
    pub exclude_radius: f64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            monochrome: false,
            match_probe_and_target: false,
            randomize_across_trials: false,
            exclude_radius: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TowerConfig {
    pub num_blocks: u32,
    pub use_cap: bool,
    pub cap_types: Vec<String>,
    /// Frames before `did_fall` may be reported.
    pub fall_warmup_frames: u32,
    /// Frames to keep simulating after a detected fall.
    pub settle_frames: u32,
    pub max_frames: u32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            num_blocks: 3,
            use_cap: true,
            cap_types: names(&["sphere"]),
            fall_warmup_frames: 30,
            settle_frames: 60,
            max_frames: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContainmentConfig {
    pub base: ObjectConfig,
    pub use_base: bool,
    pub attachment: ObjectConfig,
    pub use_attachment: bool,
    pub attachment_fixed: bool,
    pub attachment_capped: bool,
    /// Number of links, upper bound exclusive.
    pub num_links: ValueRange,
    /// Link that becomes the target; `None` picks one, negative means none.
    pub target_link: Option<i64>,
    pub max_frames: u32,
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        let mut base = ObjectConfig::typed(&["bowl"], ScaleSpec::Uniform(ValueRange::new(0.5, 1.0)));
        base.mass = ValueRange::new(2.0, 3.0);
        base.color = Some(Rgb::NEUTRAL);
        base.material = Some("wood_european_ash".to_string());
        let mut attachment = ObjectConfig::typed(&["bowl"], ScaleSpec::xyz(0.6, 0.6, 0.6));
        attachment.mass = ValueRange::fixed(3.0);
        attachment.color = Some(Rgb::NEUTRAL);
        attachment.material = Some("wood_european_ash".to_string());
        Self {
            base,
            use_base: true,
            attachment,
            use_attachment: true,
            attachment_fixed: false,
            attachment_capped: false,
            num_links: ValueRange::new(1.0, 4.0),
            target_link: None,
            max_frames: 450,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RollingConfig {
    pub use_ledge: bool,
    pub ledge_types: Vec<String>,
    pub ledge_scale: ScaleSpec,
    /// Fraction along the axis where the ledge sits.
    pub ledge_position: f64,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            use_ledge: false,
            ledge_types: names(&["cube"]),
            ledge_scale: ScaleSpec::xyz(0.05, 0.05, 100.0),
            ledge_position: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DrapeConfig {
    pub min_distance_ratio: f64,
    pub max_distance_ratio: f64,
    pub min_anchor_location: f64,
    pub max_anchor_location: f64,
    pub anchor_height: f64,
    pub anchor_jitter: f64,
    pub height_jitter: f64,
    /// Particle distance under which target and zone count as touching.
    pub collision_threshold: f64,
    pub use_cloth: bool,
    pub anchor_types: Vec<String>,
    pub drape_types: Vec<String>,
    /// Probability of a third anchor outside the pair.
    pub extra_anchor_probability: f64,
    pub tether_stiffness: ValueRange,
    pub bend_stiffness: ValueRange,
    pub stretch_stiffness: ValueRange,
    pub particle_spacing: f64,
    pub max_frames: u32,
}

impl Default for DrapeConfig {
    fn default() -> Self {
        Self {
            min_distance_ratio: 0.5,
            max_distance_ratio: 0.5,
            min_anchor_location: -0.4,
            max_anchor_location: 0.4,
            anchor_height: 0.5,
            anchor_jitter: 0.0,
            height_jitter: 0.0,
            collision_threshold: 0.1,
            use_cloth: true,
            anchor_types: names(&["cone", "cube", "cylinder", "pyramid", "triangular_prism"]),
            drape_types: names(&["alma_floor_lamp", "buddah", "desk_lamp", "linbrazil_diz_armchair"]),
            extra_anchor_probability: 0.7,
            tether_stiffness: ValueRange::new(0.0, 1.0),
            bend_stiffness: ValueRange::new(0.0, 1.0),
            stretch_stiffness: ValueRange::new(0.0, 1.0),
            particle_spacing: 0.035,
            max_frames: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DropConfig {
    pub object: ObjectConfig,
    pub height: ValueRange,
    pub jitter: f64,
    /// Camera height range as a multiple of the drop height.
    pub camera_height_factor: ValueRange,
}

impl Default for DropConfig {
    fn default() -> Self {
        let mut object = ObjectConfig::typed(
            &["cube", "sphere", "cylinder", "cone", "pyramid", "torus"],
            ScaleSpec::Uniform(ValueRange::new(0.1, 0.4)),
        );
        object.libraries = names(&[FLEX_LIBRARY]);
        object.rotation = RotationRanges::all(ValueRange::new(0.0, 360.0));
        object.mass = ValueRange::fixed(2.0);
        Self {
            object,
            height: ValueRange::new(1.25, 1.5),
            jitter: 0.2,
            camera_height_factor: ValueRange::new(0.0, 2.0),
        }
    }
}
