use crate::command::EngineCommand;
use crate::config::ScenarioConfig;
use crate::force::PushForce;
use crate::layout::CameraPose;
use crate::math::{Rgb, Vec3};
use crate::random::TrialRng;
use crate::record::StaticData;
use crate::scenario::ObjectPools;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampInfo {
    pub id: u32,
    pub base_id: Option<u32>,
    pub base_height: f64,
}

/// Everything one trial accumulates while it is being built.
///
/// Owned by the controller for the duration of a single trial and dropped
/// after finalization.
pub struct TrialContext<'a> {
    pub cfg: &'a ScenarioConfig,
    pub pools: &'a ObjectPools,
    pub rng: TrialRng,
    pub scene: Scene,
    pub trial_num: u32,
    pub trial_seed: i64,

    pub zone_id: Option<u32>,
    pub target_id: Option<u32>,
    pub probe_id: Option<u32>,
    pub ramp: Option<RampInfo>,

    pub target_color: Option<Rgb>,
    pub target_scale: Vec3,
    /// Largest middle-object scale seen so far, seeded from the target.
    pub middle_scale: Vec3,
    pub middle_color: Option<Rgb>,
    pub num_middle_objects: usize,
    pub skipped_middle: Option<usize>,

    /// Height of the top surface of a stacked structure.
    pub structure_height: f64,
    /// Object whose height decides whether a structure collapsed.
    pub top_id: Option<u32>,

    pub push: Option<PushForce>,
    pub camera: Option<CameraPose>,
    pub distractors: Vec<String>,
    pub occluders: Vec<String>,

    /// Joints, drag and other commands not tied to object creation.
    pub extra_commands: Vec<EngineCommand>,
    /// Scenario-specific static fields.
    pub variant_static: StaticData,
}

impl<'a> TrialContext<'a> {
    pub fn new(
        cfg: &'a ScenarioConfig,
        pools: &'a ObjectPools,
        rng: TrialRng,
        trial_num: u32,
        trial_seed: i64,
    ) -> Self {
        Self {
            cfg,
            pools,
            rng,
            scene: Scene::new(),
            trial_num,
            trial_seed,
            zone_id: None,
            target_id: None,
            probe_id: None,
            ramp: None,
            target_color: None,
            target_scale: Vec3::zeros(),
            middle_scale: Vec3::zeros(),
            middle_color: None,
            num_middle_objects: 0,
            skipped_middle: None,
            structure_height: 0.0,
            top_id: None,
            push: None,
            camera: None,
            distractors: Vec::new(),
            occluders: Vec::new(),
            extra_commands: Vec::new(),
            variant_static: StaticData::new(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.cfg.colors.exclude_radius
    }

    /// Grow the running middle scale to cover `scale`.
    pub fn widen_middle_scale(&mut self, scale: &Vec3) {
        self.middle_scale = self.middle_scale.sup(scale);
    }

    pub fn has_target(&self) -> bool {
        self.target_id.is_some()
    }

    pub fn has_zone(&self) -> bool {
        self.zone_id.is_some()
    }
}
