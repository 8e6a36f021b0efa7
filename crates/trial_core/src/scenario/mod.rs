//! # Scenario variants
//!
//! One strategy per physical-interaction template. The trial controller owns
//! the lifecycle; a [`ScenarioStrategy`] only supplies the override points:
//! zone rule, placement of the functional objects, intermediate structure,
//! camera framing, decorative parameters, labels and the termination rule.
//!
//! Defaults implement the domino layout; variants override what differs.

pub mod common;
mod collision;
mod containment;
mod dominoes;
mod drape;
mod drop;
mod rolling;
mod tower;

pub use collision::Collision;
pub use containment::Containment;
pub use dominoes::Dominoes;
pub use drape::Drape;
pub use drop::Dropping;
pub use rolling::Rolling;
pub use tower::Tower;

use crate::catalog::{ModelCatalog, ObjectPrototype, Selection, CLOTH_PROTOTYPE, RAMP_PROTOTYPE};
use crate::config::{DecorSet, ObjectConfig, ScenarioConfig, ScenarioKind};
use crate::engine::FrameResponse;
use crate::error::{Result, SamplingError};
use crate::labels::{
    CollapseTracker, FrameLabels, GroundContactTracker, MotionTracker, ParticleProximity,
};
use crate::layout::{CameraPose, DecorKind, DecorParams, ZoneRule};
use crate::math::{ValueRange, Vec3};
use crate::record::StaticData;
use crate::scene::PhysicsMaterial;
use crate::trial::TrialContext;

/// Prototype candidates per role, resolved once per run.
///
/// Roles a scenario never places stay empty.
#[derive(Debug, Clone, Default)]
pub struct ObjectPools {
    pub zone: Vec<ObjectPrototype>,
    pub target: Vec<ObjectPrototype>,
    pub probe: Vec<ObjectPrototype>,
    pub middle: Vec<ObjectPrototype>,
    pub distractors: Vec<ObjectPrototype>,
    pub occluders: Vec<ObjectPrototype>,
    pub ramp: Option<ObjectPrototype>,
    /// Box used for ramp supports.
    pub block: Option<ObjectPrototype>,
    pub cap: Vec<ObjectPrototype>,
    pub base: Vec<ObjectPrototype>,
    pub attachment: Vec<ObjectPrototype>,
    pub ledge: Vec<ObjectPrototype>,
    pub anchors: Vec<ObjectPrototype>,
    pub drape_props: Vec<ObjectPrototype>,
    pub cloth: Option<ObjectPrototype>,
    pub drop: Vec<ObjectPrototype>,
}

fn object_selection(role: &str, obj: &ObjectConfig) -> Selection {
    let mut selection =
        Selection::named(role, &obj.types).with_categories(obj.categories.as_deref());
    selection.libraries = obj.libraries.clone();
    selection
}

/// An empty type list searches the whole library.
fn decor_selection(role: &str, set: &DecorSet) -> Selection {
    let mut selection = if set.types.is_empty() {
        Selection {
            role: role.to_string(),
            ..Default::default()
        }
    } else {
        Selection::named(role, &set.types)
    };
    selection.libraries = set.libraries.clone();
    selection
        .with_categories(set.categories.as_deref())
        .with_aspect_ratio(set.aspect_ratio)
}

impl ObjectPools {
    /// Select candidates for every role `cfg` will place. Any empty set is a
    /// configuration error.
    pub fn resolve(cfg: &ScenarioConfig, catalog: &ModelCatalog) -> std::result::Result<Self, SamplingError> {
        let kind = cfg.scenario;
        let mut pools = ObjectPools::default();

        let zone = Selection::named("zone", &cfg.zone.types).flex_only(kind == ScenarioKind::Drape);
        pools.zone = catalog.select(&zone)?;
        pools.target = catalog.select(&object_selection("target", &cfg.target))?;

        if !matches!(
            kind,
            ScenarioKind::Rolling | ScenarioKind::Drape | ScenarioKind::Drop
        ) {
            pools.probe = catalog.select(&object_selection("probe", &cfg.probe))?;
        }
        if matches!(kind, ScenarioKind::Tower | ScenarioKind::Containment)
            || cfg.structure.count > 0
        {
            pools.middle = catalog.select(&object_selection("middle", &cfg.middle))?;
        }

        let decor = &cfg.decorative;
        if decor.distractors.count > 0 {
            pools.distractors = catalog.select(&decor_selection("distractor", &decor.distractors))?;
        }
        if decor.occluders.count > 0 {
            pools.occluders = catalog.select(&decor_selection("occluder", &decor.occluders))?;
        }

        if cfg.ramp.enabled {
            pools.ramp = Some(catalog.require(RAMP_PROTOTYPE)?);
            pools.block = Some(catalog.require("cube")?);
        }

        match kind {
            ScenarioKind::Tower => {
                pools.cap = catalog.select(&Selection::named("cap", &cfg.tower.cap_types))?;
            }
            ScenarioKind::Containment => {
                let c = &cfg.containment;
                pools.base = catalog.select(&object_selection("base", &c.base))?;
                pools.attachment = catalog.select(&object_selection("attachment", &c.attachment))?;
            }
            ScenarioKind::Rolling if cfg.rolling.use_ledge => {
                pools.ledge = catalog.select(&Selection::named("ledge", &cfg.rolling.ledge_types))?;
            }
            ScenarioKind::Drape => {
                let d = &cfg.drape;
                pools.anchors = catalog.select(&Selection::named("anchor", &d.anchor_types).flex_only(true))?;
                pools.drape_props = catalog.select(&Selection::named("drape", &d.drape_types))?;
                if d.use_cloth {
                    pools.cloth = Some(catalog.require(CLOTH_PROTOTYPE)?);
                }
            }
            ScenarioKind::Drop => {
                pools.drop = catalog.select(&object_selection("drop", &cfg.drop.object))?;
            }
            _ => {}
        }
        Ok(pools)
    }
}

/// Where the camera looks and the avatar height range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub aim: Vec3,
    pub heights: ValueRange,
}

/// Physics of the launched object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeStyle {
    pub physics: PhysicsMaterial,
    /// Turn the push with the probe's yaw.
    pub follow_yaw: bool,
}

impl Default for ProbeStyle {
    fn default() -> Self {
        Self {
            physics: PhysicsMaterial::new(0.01, 0.01, 0.0),
            follow_yaw: true,
        }
    }
}

/// Per-trial label trackers.
#[derive(Debug, Clone, Default)]
pub struct LabelState {
    pub motion: MotionTracker,
    pub ground: GroundContactTracker,
    pub collapse: Option<CollapseTracker>,
    pub proximity: Option<ParticleProximity>,
}

impl LabelState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub trait ScenarioStrategy {
    fn kind(&self) -> ScenarioKind;

    fn zone_rule(&self, _cfg: &ScenarioConfig) -> ZoneRule {
        ZoneRule::BeyondTarget
    }

    fn place_zone(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let rule = self.zone_rule(ctx.cfg);
        common::place_zone(ctx, rule).map(|_| ())
    }

    fn place_target(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        common::place_target(ctx)
    }

    fn probe_style(&self) -> ProbeStyle {
        ProbeStyle::default()
    }

    fn place_probe(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        common::place_probe(ctx, self.probe_style())
    }

    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()>;

    fn camera_view(&self, ctx: &TrialContext<'_>) -> CameraView {
        let c = &ctx.cfg.camera;
        CameraView {
            aim: Vec3::new(c.aim[0], c.aim[1], c.aim[2]),
            heights: ValueRange::new(c.min_height, c.max_height),
        }
    }

    fn decor_params(&self, kind: DecorKind, middle_scale: &Vec3) -> DecorParams {
        match kind {
            DecorKind::Distractor => DecorParams::distractors(middle_scale.z),
            DecorKind::Occluder => DecorParams::occluders(middle_scale.z),
        }
    }

    fn label_state(&self, _ctx: &TrialContext<'_>) -> LabelState {
        LabelState::new()
    }

    fn compute_labels(
        &self,
        ctx: &TrialContext<'_>,
        state: &mut LabelState,
        resp: &FrameResponse,
        labels: &mut FrameLabels,
    ) {
        common::base_labels(ctx, state, resp, labels);
    }

    fn is_done(&self, ctx: &TrialContext<'_>, state: &LabelState, frame: u32) -> bool;

    fn write_static(&self, ctx: &TrialContext<'_>, state: &LabelState, data: &mut StaticData) {
        let _ = state;
        common::write_base_static(ctx, data);
        data.merge(&ctx.variant_static);
    }
}

/// Run every placement step of a trial in order: zone, target, probe,
/// structure, camera, decoratives, then the fixed test palette.
pub fn build_scene(strategy: &dyn ScenarioStrategy, ctx: &mut TrialContext<'_>) -> Result<()> {
    strategy.place_zone(ctx)?;
    strategy.place_target(ctx)?;
    strategy.place_probe(ctx)?;
    strategy.build_structure(ctx)?;

    let view = strategy.camera_view(ctx);
    let camera = CameraPose::sample(&mut ctx.rng, &ctx.cfg.camera, view.aim, view.heights);
    ctx.camera = Some(camera);

    for kind in [DecorKind::Distractor, DecorKind::Occluder] {
        let params = strategy.decor_params(kind, &ctx.middle_scale);
        common::place_decoratives(ctx, kind, params)?;
    }

    if ctx.cfg.uses_test_mode_colors() {
        common::apply_test_mode_colors(ctx);
    }
    Ok(())
}

pub fn strategy_for(kind: ScenarioKind) -> Box<dyn ScenarioStrategy> {
    match kind {
        ScenarioKind::Dominoes => Box::new(Dominoes),
        ScenarioKind::Collision => Box::new(Collision),
        ScenarioKind::Tower => Box::new(Tower),
        ScenarioKind::Containment => Box::new(Containment),
        ScenarioKind::Rolling => Box::new(Rolling),
        ScenarioKind::Drape => Box::new(Drape),
        ScenarioKind::Drop => Box::new(Dropping),
    }
}

// ========== Tests ==========
