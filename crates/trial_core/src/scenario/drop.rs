use tracing::debug;

use crate::config::{ScenarioConfig, ScenarioKind};
use crate::error::Result;
use crate::layout::ZoneRule;
use crate::math::Vec3;
use crate::sampler::{sample_object, ColorRequest, SampleRequest};
use crate::scene::{ObjectRole, PhysicsMaterial, SceneObjectSpec};
use crate::trial::TrialContext;

use super::{common, CameraView, LabelState, ScenarioStrategy};

const RUN_FRAMES: u32 = 300;
const DROP_PHYSICS: PhysicsMaterial = PhysicsMaterial::new(0.4, 0.4, 0.0);

/// An object falls from a height onto another object resting on the zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dropping;

impl ScenarioStrategy for Dropping {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Drop
    }

    fn zone_rule(&self, _cfg: &ScenarioConfig) -> ZoneRule {
        ZoneRule::Origin
    }

    /// The dropped object is the target.
    ///
    /// Draw order after sampling: height, x and z jitter, rotation, mass.
    fn place_target(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let pools = ctx.pools;
        let radius = ctx.radius();
        let drop = &cfg.drop;

        let request = SampleRequest::new("drop", &pools.drop, &drop.object.scale)
            .color(ColorRequest::resolve(cfg.target.color, None, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let height = ctx.rng.in_range(&drop.height);
        let position = Vec3::new(
            ctx.rng.jitter(drop.jitter),
            height,
            ctx.rng.jitter(drop.jitter),
        );
        let rotation = common::draw_rotation(&mut ctx.rng, &drop.object.rotation);
        let mass = ctx.rng.in_range(&cfg.probe.mass);
        ctx.target_color = Some(sample.color);
        ctx.target_scale = sample.scale;
        ctx.structure_height = height;

        let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Target)
            .at(position)
            .rotated(rotation)
            .with_mass(mass)
            .with_physics(DROP_PHYSICS)
            .with_material(drop.object.material.clone());
        let present = !spec.removed;
        ctx.variant_static.set("drop_type", spec.model.clone());
        ctx.variant_static.set("drop_position", position);
        ctx.variant_static.set("drop_rotation", rotation);
        debug!(model = %spec.model, height, "placed dropped object");
        let id = ctx.scene.add(spec)?;
        if present {
            ctx.target_id = Some(id);
        }
        Ok(())
    }

    fn place_probe(&self, _ctx: &mut TrialContext<'_>) -> Result<()> {
        Ok(())
    }

    /// The object that gets hit, sitting at the origin.
    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let pools = ctx.pools;
        let radius = ctx.radius();

        let request = SampleRequest::new("target", &pools.target, &cfg.target.scale)
            .color(ColorRequest::resolve(cfg.probe.color, ctx.target_color, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let rotation = common::draw_rotation(&mut ctx.rng, &cfg.target.rotation);
        let mass = ctx.rng.in_range(&cfg.middle.mass);
        let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Middle)
            .rotated(rotation)
            .with_mass(mass)
            .with_physics(DROP_PHYSICS)
            .with_material(cfg.target.material.clone());
        ctx.variant_static.set("middle_type", spec.model.clone());
        ctx.scene.add(spec)?;
        ctx.num_middle_objects = 1;

        if let Some(zone) = ctx.zone_id.and_then(|id| ctx.scene.get(id)) {
            ctx.middle_scale = zone.scale;
        }
        Ok(())
    }

    fn camera_view(&self, ctx: &TrialContext<'_>) -> CameraView {
        let h = ctx.structure_height;
        CameraView {
            aim: Vec3::new(0.0, 0.5 * h, 0.0),
            heights: ctx.cfg.drop.camera_height_factor.scaled(h),
        }
    }

    fn is_done(&self, _ctx: &TrialContext<'_>, _state: &LabelState, frame: u32) -> bool {
        frame > RUN_FRAMES
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelCatalog;
    use crate::random::TrialRng;
    use crate::scenario::{build_scene, ObjectPools};

    #[test]
    fn test_drop_object_above_middle() {
        let catalog = ModelCatalog::builtin();
        let cfg = ScenarioConfig::drop();
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(61), 0, 61);
        build_scene(&Dropping, &mut ctx).unwrap();

        let dropped = ctx.scene.get(ctx.target_id.unwrap()).unwrap();
        let middle = ctx.scene.active(ObjectRole::Middle).unwrap();
        assert!(cfg.drop.height.contains(dropped.position.y));
        assert_eq!(middle.position, Vec3::zeros());
        assert!(ctx.push.is_none());

        let camera = ctx.camera.as_ref().unwrap();
        assert!(camera.position.y <= 2.0 * dropped.position.y + 1e-9);
        assert_eq!(ctx.middle_scale, Vec3::new(2.0, 0.01, 2.0));
        assert!(ctx.variant_static.contains("drop_type"));
    }
}
