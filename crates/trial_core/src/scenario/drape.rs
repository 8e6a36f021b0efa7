use tracing::debug;

use crate::catalog::ObjectPrototype;
use crate::config::{ScenarioConfig, ScenarioKind};
use crate::engine::FrameResponse;
use crate::error::{Result, SamplingError};
use crate::labels::{names, FrameLabels, ParticleProximity};
use crate::layout::{DecorKind, DecorParams, ZoneRule};
use crate::math::{Rgb, Vec3};
use crate::random::TrialRng;
use crate::record::StaticData;
use crate::scene::{BodyKind, ObjectRole, PhysicsMaterial, SceneObjectSpec};
use crate::trial::TrialContext;

use super::{common, LabelState, ScenarioStrategy};

/// Soft bodies are dropped from slightly above their resting height.
const FLEX_LIFT: f64 = 0.1;
const ANCHOR_MASS: f64 = 25.0;
const PROP_MASS: f64 = 100.0;
const CLOTH_MASS: f64 = 0.5;

/// A cloth falls over anchors and a prop; labels track how close it comes
/// to the zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Drape;

/// Resting spot and scale of each known prop.
fn prop_layout(name: &str) -> (Vec3, Vec3) {
    match name {
        "alma_floor_lamp" => (Vec3::new(0.0, 0.0, -1.1), Vec3::new(1.0, 0.8, 1.0)),
        "linbrazil_diz_armchair" => (Vec3::new(0.0, 0.0, -1.4), Vec3::new(1.2, 1.2, 1.0)),
        "buddah" => (Vec3::new(0.0, 0.0, -1.3), Vec3::repeat(1.2)),
        "desk_lamp" => (Vec3::new(0.0, 0.0, -1.1), Vec3::repeat(1.2)),
        _ => (Vec3::new(0.0, 0.0, -1.2), Vec3::repeat(1.0)),
    }
}

fn choose(rng: &mut TrialRng, pool: &[ObjectPrototype], role: &str) -> Result<ObjectPrototype> {
    match rng.choose(pool) {
        Some(p) => Ok(p.clone()),
        None => Err(SamplingError::EmptyCandidateSet {
            role: role.to_string(),
            detail: "empty pool".to_string(),
        }
        .into()),
    }
}

struct FlexPlacement {
    role: ObjectRole,
    position: Vec3,
    scale: Vec3,
    color: Rgb,
    mass: f64,
    body: BodyKind,
}

fn flex_object(id: u32, proto: ObjectPrototype, p: FlexPlacement) -> SceneObjectSpec {
    SceneObjectSpec {
        id,
        role: p.role,
        model: proto.name,
        library: proto.library,
        position: p.position + Vec3::new(0.0, FLEX_LIFT, 0.0),
        rotation: Vec3::zeros(),
        scale: p.scale,
        color: p.color,
        mass: p.mass,
        physics: PhysicsMaterial::default(),
        material: None,
        kinematic: false,
        body: p.body,
        bounds: proto.bounds,
        removed: false,
    }
}

impl Drape {
    /// Draw order: prototype, x offset, width, height jitter, depth, color.
    fn place_anchor(
        ctx: &mut TrialContext<'_>,
        x: f64,
        height: f64,
        jitter: f64,
    ) -> Result<String> {
        let cfg = ctx.cfg;
        let d = &cfg.drape;
        let radius = ctx.radius();
        let proto = choose(&mut ctx.rng, &ctx.pools.anchors, "anchor")?;
        let x = x - ctx.rng.uniform(0.0, jitter);
        let scale = Vec3::new(
            ctx.rng.uniform(0.1, 0.3),
            height + ctx.rng.jitter(d.height_jitter),
            ctx.rng.uniform(0.2, 0.5),
        );
        let color = ctx.rng.color_excluding(ctx.target_color.as_ref(), radius);
        let id = ctx.scene.allocate_id();
        let name = proto.name.clone();
        let spec = flex_object(
            id,
            proto,
            FlexPlacement {
                role: ObjectRole::Anchor,
                position: Vec3::new(x, 0.0, 0.0),
                scale,
                color,
                mass: ANCHOR_MASS,
                body: BodyKind::FlexSolid {
                    particle_spacing: d.particle_spacing,
                },
            },
        );
        ctx.scene.add(spec)?;
        Ok(name)
    }
}

impl ScenarioStrategy for Drape {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Drape
    }

    fn zone_rule(&self, cfg: &ScenarioConfig) -> ZoneRule {
        let d = &cfg.drape;
        ZoneRule::BetweenAnchors {
            min_anchor: d.min_anchor_location,
            max_anchor: d.max_anchor_location,
            min_ratio: d.min_distance_ratio,
            max_ratio: d.max_distance_ratio,
        }
    }

    /// The zone is a soft body here.
    fn place_zone(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let rule = self.zone_rule(ctx.cfg);
        let id = common::place_zone(ctx, rule)?;
        let particle_spacing = ctx.cfg.drape.particle_spacing;
        if let Some(zone) = ctx.scene.get_mut(id) {
            zone.body = BodyKind::FlexSolid { particle_spacing };
            zone.kinematic = false;
            zone.position.y += FLEX_LIFT;
        }
        Ok(())
    }

    fn place_probe(&self, _ctx: &mut TrialContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Draw order: two anchors, prop, optional third anchor, cloth.
    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let d = &cfg.drape;
        let radius = ctx.radius();
        let spacing = d.particle_spacing;

        let mut anchors = Vec::new();
        anchors.push(Self::place_anchor(
            ctx,
            d.min_anchor_location,
            d.anchor_height,
            d.anchor_jitter,
        )?);
        // Negative jitter moves the second anchor outwards.
        anchors.push(Self::place_anchor(
            ctx,
            d.max_anchor_location,
            d.anchor_height + 0.1,
            -d.anchor_jitter,
        )?);

        let proto = choose(&mut ctx.rng, &ctx.pools.drape_props, "drape")?;
        let (position, scale) = prop_layout(&proto.name);
        let color = ctx.rng.color_excluding(ctx.target_color.as_ref(), radius);
        let drape_type = proto.name.clone();
        let id = ctx.scene.allocate_id();
        ctx.scene.add(flex_object(
            id,
            proto,
            FlexPlacement {
                role: ObjectRole::Drape,
                position,
                scale,
                color,
                mass: PROP_MASS,
                body: BodyKind::FlexSolid {
                    particle_spacing: spacing,
                },
            },
        ))?;

        let extra_anchor = ctx.rng.chance(d.extra_anchor_probability);
        if extra_anchor {
            let ends = [d.min_anchor_location - 0.5, d.max_anchor_location + 0.5];
            let x = ctx.rng.choose(&ends).copied().unwrap_or(ends[0]);
            anchors.push(Self::place_anchor(ctx, x, 0.5, d.anchor_jitter)?);
        }

        if let Some(proto) = ctx.pools.cloth.clone() {
            let position = Vec3::new(
                ctx.rng.uniform(-0.2, 0.2),
                ctx.rng.uniform(1.3, 1.5),
                ctx.rng.uniform(-0.6, -0.4),
            );
            let color = match ctx.target_color {
                Some(c) => c,
                None => ctx.rng.color(),
            };
            let body = BodyKind::Cloth {
                tether_stiffness: ctx.rng.in_range(&d.tether_stiffness),
                bend_stiffness: ctx.rng.in_range(&d.bend_stiffness),
                stretch_stiffness: ctx.rng.in_range(&d.stretch_stiffness),
            };
            let id = ctx.scene.allocate_id();
            let spec = flex_object(
                id,
                proto,
                FlexPlacement {
                    role: ObjectRole::Target,
                    position,
                    scale: Vec3::repeat(1.0),
                    color,
                    mass: CLOTH_MASS,
                    body,
                },
            );
            ctx.scene.add(spec)?;
            ctx.target_id = Some(id);
            ctx.target_color = Some(color);
            if let BodyKind::Cloth {
                tether_stiffness,
                bend_stiffness,
                stretch_stiffness,
            } = body
            {
                ctx.variant_static.set("tether_stiffness", tether_stiffness);
                ctx.variant_static.set("bend_stiffness", bend_stiffness);
                ctx.variant_static.set("stretch_stiffness", stretch_stiffness);
            }
        }

        debug!(anchors = anchors.len(), drape = %drape_type, extra_anchor, "built drape scene");
        let s = &mut ctx.variant_static;
        s.set("anchor_types", anchors);
        s.set("drape_type", drape_type);
        s.set("extra_anchor", extra_anchor);
        s.set("use_cloth", d.use_cloth);
        Ok(())
    }

    fn decor_params(&self, kind: DecorKind, middle_scale: &Vec3) -> DecorParams {
        let params = match kind {
            DecorKind::Distractor => DecorParams::distractors(middle_scale.z),
            DecorKind::Occluder => DecorParams::occluders(middle_scale.z),
        };
        params.with_sizes(0.8, 1.2)
    }

    fn label_state(&self, ctx: &TrialContext<'_>) -> LabelState {
        LabelState {
            proximity: Some(ParticleProximity::new(ctx.cfg.drape.collision_threshold)),
            ..LabelState::new()
        }
    }

    fn compute_labels(
        &self,
        ctx: &TrialContext<'_>,
        state: &mut LabelState,
        resp: &FrameResponse,
        labels: &mut FrameLabels,
    ) {
        labels.insert(names::HAS_TARGET, ctx.has_target());
        labels.insert(names::HAS_ZONE, ctx.has_zone());
        let (Some(target), Some(zone)) = (ctx.target_id, ctx.zone_id) else {
            return;
        };
        let (Some(a), Some(b)) = (resp.particles_of(target), resp.particles_of(zone)) else {
            return;
        };
        let Some(proximity) = state.proximity.as_mut() else {
            return;
        };
        if let Some((distance, contact)) = proximity.observe(a, b) {
            labels.insert(names::MIN_DISTANCE_TARGET_TO_ZONE, distance);
            labels.insert(names::TARGET_CONTACTING_ZONE, contact);
        }
    }

    fn is_done(&self, ctx: &TrialContext<'_>, _state: &LabelState, frame: u32) -> bool {
        frame >= ctx.cfg.drape.max_frames
    }

    fn write_static(&self, ctx: &TrialContext<'_>, state: &LabelState, data: &mut StaticData) {
        common::write_base_static(ctx, data);
        data.merge(&ctx.variant_static);
        let minimum = state.proximity.as_ref().and_then(|p| p.minimum());
        data.set_opt(names::MIN_DISTANCE_TARGET_TO_ZONE, minimum);
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelCatalog;
    use crate::engine::ParticleCloud;
    use crate::scenario::{build_scene, ObjectPools};

    fn pools(cfg: &ScenarioConfig) -> (ModelCatalog, ObjectPools) {
        let catalog = ModelCatalog::builtin();
        let pools = ObjectPools::resolve(cfg, &catalog).unwrap();
        (catalog, pools)
    }

    #[test]
    fn test_cloth_becomes_target() {
        let cfg = ScenarioConfig::drape();
        let (catalog, pools) = pools(&cfg);
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(51), 0, 51);
        build_scene(&Drape, &mut ctx).unwrap();

        let cloth = ctx.scene.get(ctx.target_id.unwrap()).unwrap();
        assert!(matches!(cloth.body, BodyKind::Cloth { .. }));
        assert!(cloth.position.y > 1.3);
        assert!(ctx.push.is_none());
        assert!(ctx.probe_id.is_none());

        let zone = ctx.scene.get(ctx.zone_id.unwrap()).unwrap();
        assert!(matches!(zone.body, BodyKind::FlexSolid { .. }));
        assert!(!zone.kinematic);
        assert!(ctx.scene.with_role(ObjectRole::Anchor).count() >= 2);
    }

    #[test]
    fn test_without_cloth_there_is_no_target() {
        let mut cfg = ScenarioConfig::drape();
        cfg.drape.use_cloth = false;
        let (catalog, pools) = pools(&cfg);
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(52), 0, 52);
        build_scene(&Drape, &mut ctx).unwrap();
        assert!(!ctx.has_target());
    }

    #[test]
    fn test_proximity_labels_and_minimum() {
        let cfg = ScenarioConfig::drape();
        let (catalog, pools) = pools(&cfg);
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(53), 0, 53);
        build_scene(&Drape, &mut ctx).unwrap();
        let target = ctx.target_id.unwrap();
        let zone = ctx.zone_id.unwrap();
        let mut state = Drape.label_state(&ctx);

        let mut last = FrameLabels::new(0);
        for (frame, gap) in [(0u32, 1.0), (1, 0.05), (2, 0.5)] {
            let resp = FrameResponse {
                frame,
                particles: vec![
                    ParticleCloud {
                        id: target,
                        points: vec![Vec3::new(0.0, gap, 0.0)],
                    },
                    ParticleCloud {
                        id: zone,
                        points: vec![Vec3::zeros()],
                    },
                ],
                ..Default::default()
            };
            last = FrameLabels::new(frame);
            Drape.compute_labels(&ctx, &mut state, &resp, &mut last);
            if frame == 1 {
                assert_eq!(last.flag(names::TARGET_CONTACTING_ZONE), Some(true));
            }
        }
        assert_eq!(last.flag(names::TARGET_CONTACTING_ZONE), Some(false));

        let mut data = StaticData::new();
        Drape.write_static(&ctx, &state, &mut data);
        let minimum = data
            .get(names::MIN_DISTANCE_TARGET_TO_ZONE)
            .and_then(|v| v.as_f64())
            .unwrap();
        assert!((minimum - 0.05).abs() < 1e-12);
    }
}
