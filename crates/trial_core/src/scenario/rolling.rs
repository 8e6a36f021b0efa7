use tracing::debug;

use crate::command::EngineCommand;
use crate::config::{ScenarioConfig, ScenarioKind};
use crate::error::Result;
use crate::force::{schedule_push, PushedObject};
use crate::layout::ZoneRule;
use crate::math::Vec3;
use crate::sampler::{sample_object, ColorRequest, SampleRequest};
use crate::scene::{ObjectRole, PhysicsMaterial, SceneObjectSpec};
use crate::trial::TrialContext;

use super::{common, LabelState, ScenarioStrategy};

const RUN_FRAMES: u32 = 300;
const LEDGE_MASS: f64 = 1000.0;

/// The target itself is pushed, usually down a ramp, towards the zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rolling;

impl ScenarioStrategy for Rolling {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Rolling
    }

    fn zone_rule(&self, cfg: &ScenarioConfig) -> ZoneRule {
        ZoneRule::AxisEnd {
            lateral_jitter: cfg.zone.lateral_jitter,
        }
    }

    /// Draw order after sampling: rotation, mass, ramp, push.
    fn place_target(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let pools = ctx.pools;
        let radius = ctx.radius();

        let request = SampleRequest::new("target", &pools.target, &cfg.target.scale)
            .color(ColorRequest::resolve(cfg.target.color, None, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let rotation = common::draw_rotation(&mut ctx.rng, &cfg.target.rotation);
        let mass = ctx.rng.in_range(&cfg.probe.mass);
        ctx.target_color = Some(sample.color);
        ctx.target_scale = sample.scale;
        ctx.middle_scale = sample.scale;

        let mut position = Vec3::new(-0.5 * cfg.axis.length, cfg.axis.target_lift, 0.0);
        if cfg.ramp.enabled {
            position = common::place_ramp(ctx, position)?;
            position.x += cfg.axis.target_lift;
        }

        let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Target)
            .at(position)
            .rotated(rotation)
            .with_mass(mass)
            .with_physics(PhysicsMaterial::new(0.4, 0.4, 0.0))
            .with_material(cfg.target.material.clone());
        if spec.removed {
            ctx.scene.add(spec)?;
            return Ok(());
        }
        let pushed = PushedObject {
            id: spec.id,
            mass,
            position,
            rotation,
            scale: spec.scale,
        };
        debug!(model = %spec.model, ?position, "placed rolling target");
        let id = ctx.scene.add(spec)?;
        ctx.target_id = Some(id);
        ctx.extra_commands.push(EngineCommand::SetObjectDrag {
            id,
            drag: 0.0,
            angular_drag: 0.0,
        });
        let whole_object = ctx.ramp.is_some();
        ctx.push = Some(schedule_push(&mut ctx.rng, &cfg.force, &pushed, true, whole_object));
        Ok(())
    }

    fn place_probe(&self, _ctx: &mut TrialContext<'_>) -> Result<()> {
        Ok(())
    }

    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let rolling = &cfg.rolling;
        ctx.variant_static.set("use_ledge", rolling.use_ledge);
        if !rolling.use_ledge {
            return Ok(());
        }

        let pools = ctx.pools;
        let radius = ctx.radius();
        let color = ctx.rng.color_excluding(ctx.target_color.as_ref(), radius);
        let request = SampleRequest::new("ledge", &pools.ledge, &rolling.ledge_scale)
            .color(ColorRequest::Fixed(color));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let position = Vec3::new(
            -0.5 * rolling.ledge_position * cfg.axis.length,
            -0.5 * sample.scale.y,
            0.0,
        );
        let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Ledge)
            .at(position)
            .with_mass(LEDGE_MASS)
            .with_physics(common::friction_or(None, 0.5))
            .kinematic();
        ctx.variant_static.set("ledge_type", spec.model.clone());
        ctx.variant_static.set("ledge_position", position);
        ctx.scene.add(spec)?;
        Ok(())
    }

    fn is_done(&self, _ctx: &TrialContext<'_>, _state: &LabelState, frame: u32) -> bool {
        frame > RUN_FRAMES
    }
}

// ========== Tests ==========
