//! # Scenario configuration
//!
//! Flat, named parameters for every scenario. Files are YAML or JSON; a file
//! names its `scenario` and only overrides the fields it cares about, the rest
//! come from that scenario's preset.
//!
//! ```rust
//! use trial_core::config::{ScenarioConfig, ScenarioKind};
//!
//! let tower = ScenarioConfig::for_kind(ScenarioKind::Tower);
//! assert_eq!(tower.tower.num_blocks, 2);
//! ```

mod presets;
mod sections;

pub use sections::{
    AxisConfig, CameraConfig, ColorConfig, ContainmentConfig, DecorSet, DecorativeConfig,
    DrapeConfig, DropConfig, ForceConfig, GeneralConfig, ObjectConfig, RampConfig,
    RollingConfig, RotationRanges, StructureConfig, TowerConfig, ZoneConfig,
};

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::error::ConfigError;
use crate::math::{Rgb, ValueRange};

pub const VALID_ROOMS: &[&str] = &["box", "tdw", "house"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Dominoes,
    Collision,
    Tower,
    Containment,
    Rolling,
    Drape,
    Drop,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 7] = [
        ScenarioKind::Dominoes,
        ScenarioKind::Collision,
        ScenarioKind::Tower,
        ScenarioKind::Containment,
        ScenarioKind::Rolling,
        ScenarioKind::Drape,
        ScenarioKind::Drop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::Dominoes => "dominoes",
            ScenarioKind::Collision => "collision",
            ScenarioKind::Tower => "tower",
            ScenarioKind::Containment => "containment",
            ScenarioKind::Rolling => "rolling",
            ScenarioKind::Drape => "drape",
            ScenarioKind::Drop => "drop",
        }
    }

    /// Whether the pushed object is the target itself.
    pub fn pushes_target(self) -> bool {
        matches!(self, ScenarioKind::Rolling)
    }
}

/// Fixed palettes and seed remapping for the benchmark's data splits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    #[default]
    Standard,
    /// Seed remapped, colors random.
    Training,
    /// Seed remapped, target red and zone yellow.
    Readout,
    /// Seed kept, canonical target and zone colors.
    Testing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(default)]
pub struct ScenarioConfig {
    pub scenario: ScenarioKind,
    pub mode: DataMode,
    #[validate]
    pub general: GeneralConfig,
    #[validate]
    pub axis: AxisConfig,
    pub zone: ZoneConfig,
    pub target: ObjectConfig,
    pub probe: ObjectConfig,
    pub middle: ObjectConfig,
    pub structure: StructureConfig,
    pub force: ForceConfig,
    pub ramp: RampConfig,
    pub camera: CameraConfig,
    #[validate]
    pub decorative: DecorativeConfig,
    pub colors: ColorConfig,
    pub tower: TowerConfig,
    pub containment: ContainmentConfig,
    pub rolling: RollingConfig,
    pub drape: DrapeConfig,
    pub drop: DropConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::dominoes()
    }
}

impl ScenarioConfig {
    /// Read a config file. `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let overrides: serde_json::Value = if is_json {
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        let config = Self::from_overrides(overrides)?;
        info!(
            scenario = config.scenario.name(),
            path = %path.display(),
            "loaded scenario config"
        );
        Ok(config)
    }

    /// Layer `overrides` on top of the preset named by its `scenario` key.
    pub fn from_overrides(overrides: serde_json::Value) -> Result<Self, ConfigError> {
        let kind = match overrides.get("scenario") {
            Some(v) => serde_json::from_value::<ScenarioKind>(v.clone())
                .map_err(|e| ConfigError::Parse(format!("scenario: {e}")))?,
            None => ScenarioKind::Dominoes,
        };
        let mut base = serde_json::to_value(Self::for_kind(kind))
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        merge_values(&mut base, overrides);
        serde_json::from_value(base).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject malformed configurations before any engine command is issued.
    pub fn validate_scenario(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if !VALID_ROOMS.contains(&self.general.room.as_str()) {
            return Err(ConfigError::InvalidRoom(self.general.room.clone()));
        }

        let ranges: [(&str, &ValueRange); 9] = [
            ("target.mass", &self.target.mass),
            ("probe.mass", &self.probe.mass),
            ("middle.mass", &self.middle.mass),
            ("force.scale", &self.force.scale),
            ("force.angle", &self.force.angle),
            ("force.wait", &self.force.wait),
            ("force.up_force", &self.force.up_force),
            ("camera.radius", &self.camera.radius),
            ("ramp.base_height", &self.ramp.base_height),
        ];
        for (field, range) in ranges {
            if !range.is_ordered() {
                return Err(ConfigError::InvalidRange {
                    field: field.to_string(),
                    min: range.min(),
                    max: range.max(),
                });
            }
        }
        if self.force.wait.min() < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "force.wait".to_string(),
                min: self.force.wait.min(),
                max: self.force.wait.max(),
            });
        }
        if self.camera.min_height > self.camera.max_height {
            return Err(ConfigError::InvalidRange {
                field: "camera.height".to_string(),
                min: self.camera.min_height,
                max: self.camera.max_height,
            });
        }

        if self.axis.remove_target && self.scenario.pushes_target() {
            return Err(ConfigError::InconsistentFlags(format!(
                "remove_target is set but the {} scenario pushes its target",
                self.scenario.name()
            )));
        }
        if self.zone.remove && self.zone.location.is_some() {
            return Err(ConfigError::InconsistentFlags(
                "zone.location is set together with zone.remove".to_string(),
            ));
        }
        if self.mode == DataMode::Testing && self.general.randomize {
            return Err(ConfigError::InconsistentFlags(
                "testing mode cannot regenerate trials with randomize enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Rewrite seed and palette for the configured data mode.
    pub fn apply_mode(mut self) -> Self {
        match self.mode {
            DataMode::Standard | DataMode::Testing => {}
            DataMode::Training => {
                self.general.randomize = false;
                self.general.seed = remap_seed(self.general.seed, 1000, 997);
                self.colors.match_probe_and_target = false;
                self.target.color = None;
                self.zone.color = None;
                self.probe.color = None;
                self.middle.color = None;
                self.ramp.color = None;
                self.decorative.static_distractors = true;
                self.decorative.distractors.count = 0;
                self.decorative.occluders.count = 0;
                self.zone.remove = true;
                if !self.scenario.pushes_target() {
                    self.axis.remove_target = true;
                }
            }
            DataMode::Readout => {
                self.general.randomize = false;
                self.general.seed = remap_seed(self.general.seed, 3000, 1999);
                self.target.color = Some(Rgb::RED);
                self.zone.color = Some(Rgb::YELLOW);
                self.probe.color = None;
                self.middle.color = None;
                self.ramp.color = None;
                self.decorative.static_distractors = true;
            }
        }
        self
    }

    /// Canonical red target and yellow zone.
    pub fn uses_test_mode_colors(&self) -> bool {
        matches!(self.mode, DataMode::Readout | DataMode::Testing)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ScenarioConfig)
    }
}

fn remap_seed(seed: u64, factor: u64, modulus: u64) -> u64 {
    ((seed as u128 * factor as u128) % modulus as u128) as u64
}

/// Recursive object merge; non-object values in `overlay` replace `base`.
fn merge_values(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ========== Tests ==========
