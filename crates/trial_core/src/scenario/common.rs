//! Placement and labelling steps shared by several scenarios.

use tracing::debug;

use crate::command::EngineCommand;
use crate::config::RotationRanges;
use crate::error::{Result, SamplingError};
use crate::force::{schedule_push, PushedObject};
use crate::labels::{names, zone_contact, FrameLabels};
use crate::layout::{
    lay_on_side, probe_position, target_position, DecorKind, DecorParams, DecorPlanner, MiddleRow,
    OcclusionLayoutState, RampPlacement, ZoneRule,
};
use crate::math::{Rgb, ScaleSpec, Vec3};
use crate::random::TrialRng;
use crate::record::StaticData;
use crate::sampler::{sample_object, ColorRequest, SampleRequest};
use crate::scene::{ObjectRole, PhysicsMaterial, SceneObjectSpec};
use crate::trial::{RampInfo, TrialContext};
use crate::engine::FrameResponse;

use super::{LabelState, ProbeStyle};

/// Mass of static scenery (zone, ramp, supports).
pub const STATIC_MASS: f64 = 500.0;

const DEFAULT_FRICTION: f64 = 0.5;

/// Decoratives are kept clear of this much red.
const DECOR_EXCLUDE_RADIUS: f64 = 0.5;

pub fn draw_rotation(rng: &mut TrialRng, ranges: &RotationRanges) -> Vec3 {
    rng.rotation(ranges.x.as_ref(), ranges.y.as_ref(), ranges.z.as_ref())
}

pub fn friction_or(friction: Option<f64>, fallback: f64) -> PhysicsMaterial {
    let f = friction.unwrap_or(fallback);
    PhysicsMaterial::new(f, f, 0.0)
}

/// Place the zone and return its id. A removed zone keeps its id but is not
/// reported as present.
pub fn place_zone(ctx: &mut TrialContext<'_>, rule: ZoneRule) -> Result<u32> {
    let cfg = ctx.cfg;
    let pools = ctx.pools;
    let radius = ctx.radius();

    let request = SampleRequest::new("zone", &pools.zone, &cfg.zone.scale)
        .color(ColorRequest::resolve(cfg.zone.color, None, radius));
    let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
    let position = match cfg.zone.location {
        Some([x, y, z]) => Vec3::new(x, y, z),
        None => rule.locate(&mut ctx.rng, &sample.scale, cfg.axis.length),
    };

    let f = cfg.zone.friction;
    let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Zone)
        .at(position)
        .with_mass(STATIC_MASS)
        .with_physics(PhysicsMaterial::new(f, 10.0 * f, 0.0))
        .with_material(cfg.zone.material.clone())
        .kinematic()
        .removed_if(cfg.zone.remove);
    let present = !spec.removed;
    debug!(model = %spec.model, ?position, present, "placed zone");
    let id = ctx.scene.add(spec)?;
    if present {
        ctx.zone_id = Some(id);
    }
    Ok(id)
}

/// Target at the far end of the collision axis.
///
/// Draw order after sampling: rotation, mass.
pub fn place_target(ctx: &mut TrialContext<'_>) -> Result<()> {
    let cfg = ctx.cfg;
    let pools = ctx.pools;
    let radius = ctx.radius();

    let request = SampleRequest::new("target", &pools.target, &cfg.target.scale)
        .color(ColorRequest::resolve(cfg.target.color, None, radius));
    let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
    let rotation = draw_rotation(&mut ctx.rng, &cfg.target.rotation);
    let mass = ctx.rng.in_range(&cfg.target.mass);

    ctx.target_color = Some(sample.color);
    ctx.target_scale = sample.scale;
    ctx.middle_scale = sample.scale;

    let position = target_position(cfg.axis.length) + Vec3::new(0.0, cfg.axis.target_lift, 0.0);
    let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Target)
        .at(position)
        .rotated(rotation)
        .with_mass(mass)
        .with_physics(friction_or(cfg.target.friction, DEFAULT_FRICTION))
        .with_material(cfg.target.material.clone())
        .removed_if(cfg.axis.remove_target);
    let present = !spec.removed;
    debug!(model = %spec.model, mass, present, "placed target");
    let id = ctx.scene.add(spec)?;
    if present {
        ctx.target_id = Some(id);
    }
    Ok(())
}

/// Probe at the near end of the axis, optionally on a ramp, and its push.
///
/// Draw order after sampling: mass, rotation, ramp, push.
pub fn place_probe(ctx: &mut TrialContext<'_>, style: ProbeStyle) -> Result<()> {
    let cfg = ctx.cfg;
    let pools = ctx.pools;
    let radius = ctx.radius();

    let color = match ctx.target_color {
        Some(c) if cfg.colors.monochrome && cfg.colors.match_probe_and_target => {
            ColorRequest::Fixed(c)
        }
        target => ColorRequest::resolve(cfg.probe.color, target, radius),
    };
    let request = SampleRequest::new("probe", &pools.probe, &cfg.probe.scale).color(color);
    let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
    let mass = ctx.rng.in_range(&cfg.probe.mass);
    let rotation = draw_rotation(&mut ctx.rng, &cfg.probe.rotation);

    let mut position = probe_position(cfg.axis.length, cfg.axis.probe_lift);
    if cfg.ramp.enabled {
        position = place_ramp(ctx, position)?;
    }

    let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Probe)
        .at(position)
        .rotated(rotation)
        .with_mass(mass)
        .with_physics(style.physics)
        .with_material(cfg.probe.material.clone());
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
    debug!(model = %spec.model, mass, ?position, "placed probe");
    let id = ctx.scene.add(spec)?;
    ctx.probe_id = Some(id);
    ctx.extra_commands.push(EngineCommand::SetObjectDrag {
        id,
        drag: 0.0,
        angular_drag: 0.0,
    });
    let whole_object = ctx.ramp.is_some();
    ctx.push = Some(schedule_push(
        &mut ctx.rng,
        &cfg.force,
        &pushed,
        style.follow_yaw,
        whole_object,
    ));
    Ok(())
}

/// Put a ramp (and its support, if tall enough) under `start`. Returns the
/// pushed object's position on the ramp's top edge.
pub fn place_ramp(ctx: &mut TrialContext<'_>, start: Vec3) -> Result<Vec3> {
    let cfg = ctx.cfg;
    let pools = ctx.pools;
    let radius = ctx.radius();
    let ramp_cfg = &cfg.ramp;

    let Some(proto) = pools.ramp.as_ref() else {
        return Err(SamplingError::UnknownPrototype(crate::catalog::RAMP_PROTOTYPE.to_string()).into());
    };
    let color = match ramp_cfg.color {
        Some(c) => c,
        None => ctx.rng.color_excluding(ctx.target_color.as_ref(), radius),
    };
    let ramp_id = ctx.scene.allocate_id();
    let placement = RampPlacement::plan(
        &mut ctx.rng,
        proto.bounds,
        start,
        0.0,
        cfg.axis.length,
        ramp_cfg.scale,
        &ramp_cfg.base_height,
    );

    let mut base_id = None;
    if let Some(base) = &placement.base {
        let Some(block) = pools.block.as_ref() else {
            return Err(SamplingError::UnknownPrototype("cube".to_string()).into());
        };
        let id = ctx.scene.allocate_id();
        let spec = SceneObjectSpec {
            id,
            role: ObjectRole::RampBase,
            model: block.name.clone(),
            library: block.library.clone(),
            position: base.position,
            rotation: Vec3::zeros(),
            scale: base.scale,
            color: ramp_cfg.base_color.unwrap_or(color),
            mass: STATIC_MASS,
            physics: PhysicsMaterial::new(0.01, 0.01, 0.0),
            material: ramp_cfg.material.clone(),
            kinematic: true,
            body: crate::scene::BodyKind::Rigid,
            bounds: block.bounds,
            removed: false,
        };
        base_id = Some(ctx.scene.add(spec)?);
    }

    let spec = SceneObjectSpec {
        id: ramp_id,
        role: ObjectRole::Ramp,
        model: proto.name.clone(),
        library: proto.library.clone(),
        position: placement.position,
        rotation: placement.rotation,
        scale: placement.scale,
        color,
        mass: STATIC_MASS,
        physics: PhysicsMaterial::new(ramp_cfg.friction, ramp_cfg.friction, 0.0),
        material: ramp_cfg.material.clone(),
        kinematic: true,
        body: crate::scene::BodyKind::Rigid,
        bounds: proto.bounds,
        removed: false,
    };
    ctx.scene.add(spec)?;
    ctx.ramp = Some(RampInfo {
        id: ramp_id,
        base_id,
        base_height: placement.base_height,
    });
    debug!(base_height = placement.base_height, top = placement.top(), "placed ramp");
    Ok(placement.lift(start))
}

/// Row of middle objects between probe and target, one of them optionally
/// skipped.
pub fn build_middle_row(ctx: &mut TrialContext<'_>) -> Result<()> {
    let cfg = ctx.cfg;
    let pools = ctx.pools;
    let radius = ctx.radius();
    let structure = &cfg.structure;

    let middle_color = if cfg.colors.monochrome {
        Some(ctx.rng.color_excluding(ctx.target_color.as_ref(), radius))
    } else {
        cfg.middle.color
    };
    ctx.middle_color = middle_color;

    let mut row = MiddleRow::new(
        cfg.axis.length,
        ctx.target_scale.x,
        structure.count as usize,
        structure.spacing_jitter,
    )
    .with_random_skip(&mut ctx.rng, structure.remove_middle);
    ctx.skipped_middle = row.skipped_index();

    let mut placed = 0;
    let mut last_type = None;
    while let Some(slot) = row.next_slot(&mut ctx.rng) {
        if slot.skipped {
            continue;
        }
        let request = SampleRequest::new("middle", &pools.middle, &cfg.middle.scale)
            .color(ColorRequest::resolve(middle_color, ctx.target_color, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let z = sample.scale.z * ctx.rng.jitter(structure.lateral_jitter);
        let mut rotation = draw_rotation(&mut ctx.rng, &cfg.middle.rotation);
        let mut position = Vec3::new(slot.offset, 0.0, z);
        if structure.horizontal {
            let height = sample.scaled_dimensions().y;
            (position, rotation) = lay_on_side(position, rotation, height);
        }
        let mass = ctx.rng.in_range(&cfg.middle.mass);
        ctx.widen_middle_scale(&sample.scale);

        let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Middle)
            .at(position)
            .rotated(rotation)
            .with_mass(mass)
            .with_physics(friction_or(cfg.middle.friction, DEFAULT_FRICTION))
            .with_material(cfg.middle.material.clone());
        last_type = Some(spec.model.clone());
        ctx.scene.add(spec)?;
        placed += 1;
    }

    ctx.num_middle_objects = placed;
    ctx.variant_static.set_opt("middle_type", last_type);
    debug!(placed, skipped = ?ctx.skipped_middle, "built middle row");
    Ok(())
}

/// Place one decorative sequence around the current camera.
///
/// All prototypes are chosen before any placement is drawn.
pub fn place_decoratives(ctx: &mut TrialContext<'_>, kind: DecorKind, params: DecorParams) -> Result<()> {
    let cfg = ctx.cfg;
    let pools = ctx.pools;
    let (count, pool) = match kind {
        DecorKind::Distractor => (cfg.decorative.distractors.count, &pools.distractors),
        DecorKind::Occluder => (cfg.decorative.occluders.count, &pools.occluders),
    };
    if count == 0 {
        return Ok(());
    }
    let Some(camera) = ctx.camera.clone() else {
        return Ok(());
    };

    let mut chosen = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let Some(proto) = ctx.rng.choose(pool) else {
            return Err(SamplingError::EmptyCandidateSet {
                role: kind.name().to_string(),
                detail: "no decorative prototypes".to_string(),
            }
            .into());
        };
        let id = ctx.scene.allocate_id();
        chosen.push((proto.clone(), id));
    }

    let planner = DecorPlanner::new(kind, params, &camera)
        .with_occlusion_scale(cfg.decorative.occlusion_scale);
    let mut state = OcclusionLayoutState::new();
    let mut names = Vec::with_capacity(chosen.len());
    for ((proto, id), unit) in chosen.into_iter().zip(planner.directions(count as usize)) {
        let placement = planner.place(&mut ctx.rng, &mut state, proto.dimensions(), unit);
        let color = ctx.rng.color_excluding(cfg.target.color.as_ref(), DECOR_EXCLUDE_RADIUS);
        names.push(proto.name.clone());
        let spec = SceneObjectSpec {
            id,
            role: kind.role(),
            model: proto.name,
            library: proto.library,
            position: placement.position,
            rotation: placement.rotation,
            scale: Vec3::repeat(placement.scale),
            color,
            mass: 1.0,
            physics: PhysicsMaterial::default(),
            material: None,
            kinematic: cfg.decorative.static_distractors,
            body: crate::scene::BodyKind::Rigid,
            bounds: proto.bounds,
            removed: false,
        };
        ctx.scene.add(spec)?;
    }

    debug!(kind = kind.name(), count = names.len(), "placed decoratives");
    match kind {
        DecorKind::Distractor => ctx.distractors = names,
        DecorKind::Occluder => ctx.occluders = names,
    }
    Ok(())
}

/// Fixed test palette: red target, yellow zone, nothing else red.
///
/// Recolors draw from a stream seeded with the trial seed, so the palette is
/// the same whatever the placement stream did.
pub fn apply_test_mode_colors(ctx: &mut TrialContext<'_>) {
    let radius = ctx.radius();
    let mut recolor = TrialRng::seeded(ctx.trial_seed.max(0) as u64);
    let ids: Vec<u32> = ctx.scene.objects().iter().map(|o| o.id).collect();
    for id in ids {
        let is_target = ctx.target_id == Some(id);
        let is_zone = ctx.zone_id == Some(id);
        let Some(obj) = ctx.scene.get_mut(id) else {
            continue;
        };
        if is_target {
            obj.color = Rgb::RED;
        } else if is_zone {
            obj.color = Rgb::YELLOW;
        } else if !obj.removed && obj.color.near(&Rgb::RED, radius) {
            obj.color = recolor.color_excluding(Some(&Rgb::RED), radius);
        }
    }
    if ctx.target_id.is_some() {
        ctx.target_color = Some(Rgb::RED);
    }
}

/// Labels every scenario records: target presence, motion, ground and zone
/// contact.
pub fn base_labels(
    ctx: &TrialContext<'_>,
    state: &mut LabelState,
    resp: &FrameResponse,
    labels: &mut FrameLabels,
) {
    labels.insert(names::HAS_TARGET, ctx.has_target());
    labels.insert(names::HAS_ZONE, ctx.has_zone());
    let Some(target) = ctx.target_id else {
        return;
    };

    state.motion.observe(resp.position_of(target));
    labels.insert(names::TARGET_DELTA_POSITION, state.motion.delta());
    labels.insert(names::TARGET_HAS_MOVED, state.motion.has_moved());
    let on_ground = state.ground.observe(&resp.environment_points(target));
    labels.insert(names::TARGET_ON_GROUND, on_ground);

    if let Some(zone) = ctx.zone_id {
        labels.insert(names::TARGET_CONTACTING_ZONE, zone_contact(resp, target, zone));
    }
}

/// Static fields every scenario records.
pub fn write_base_static(ctx: &TrialContext<'_>, data: &mut StaticData) {
    let cfg = ctx.cfg;
    data.set("scenario", cfg.scenario.name());
    data.set("room", cfg.general.room.as_str());
    data.set("seed", cfg.general.seed);
    data.set("randomize", cfg.general.randomize);
    data.set("trial_seed", ctx.trial_seed);
    data.set("trial_num", ctx.trial_num);

    data.set_opt("zone_id", ctx.zone_id);
    data.set_opt("target_id", ctx.target_id);
    data.set_opt("probe_id", ctx.probe_id);
    if let Some(ramp) = ctx.ramp {
        data.set("ramp_id", ramp.id);
        data.set("ramp_base_height", ramp.base_height);
        data.set_opt("ramp_base_id", ramp.base_id);
    }

    let target = ctx.target_id.and_then(|id| ctx.scene.get(id));
    data.set_opt("target_type", target.map(|t| t.model.clone()));
    data.set_opt("target_rotation", target.map(|t| t.rotation));
    let probe = ctx.probe_id.and_then(|id| ctx.scene.get(id));
    data.set_opt("probe_type", probe.map(|p| p.model.clone()));
    data.set_opt("probe_mass", probe.map(|p| p.mass));

    if let Some(push) = &ctx.push {
        data.set("push_force", push.force);
        data.set_opt("push_position", push.position());
        data.set("push_time", push.frame);
    }
    if let Some(camera) = &ctx.camera {
        data.set("camera_position", camera.position);
        data.set("camera_aim", camera.aim);
        data.set("camera_distance", camera.distance);
    }

    data.set("distractors", ctx.distractors.clone());
    data.set("occluders", ctx.occluders.clone());
    data.set("num_middle_objects", ctx.num_middle_objects);

    let present: Vec<&SceneObjectSpec> = ctx.scene.objects().iter().filter(|o| !o.removed).collect();
    data.set("object_ids", present.iter().map(|o| o.id).collect::<Vec<u32>>());
    data.set(
        "model_names",
        present.iter().map(|o| o.model.clone()).collect::<Vec<String>>(),
    );
    data.set(
        "object_roles",
        present
            .iter()
            .map(|o| role_name(o.role).to_string())
            .collect::<Vec<String>>(),
    );
    data.set(
        "object_positions",
        present.iter().map(|o| o.position).collect::<Vec<Vec3>>(),
    );
    data.set(
        "object_scales",
        present.iter().map(|o| o.scale).collect::<Vec<Vec3>>(),
    );
}

fn role_name(role: ObjectRole) -> &'static str {
    match role {
        ObjectRole::Target => "target",
        ObjectRole::Probe => "probe",
        ObjectRole::Zone => "zone",
        ObjectRole::Middle => "middle",
        ObjectRole::Distractor => "distractor",
        ObjectRole::Occluder => "occluder",
        ObjectRole::Ramp => "ramp",
        ObjectRole::RampBase => "ramp_base",
        ObjectRole::Ledge => "ledge",
        ObjectRole::Base => "base",
        ObjectRole::Attachment => "attachment",
        ObjectRole::Cap => "cap",
        ObjectRole::Anchor => "anchor",
        ObjectRole::Drape => "drape",
    }
}

/// Sample a stacked block with a fixed scale.
pub fn fixed_scale(scale: &Vec3) -> ScaleSpec {
    ScaleSpec::Xyz([scale.x, scale.y, scale.z])
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelCatalog;
    use crate::config::ScenarioConfig;
    use crate::scenario::ObjectPools;

    fn context<'a>(cfg: &'a ScenarioConfig, pools: &'a ObjectPools, seed: u64) -> TrialContext<'a> {
        TrialContext::new(cfg, pools, TrialRng::seeded(seed), 0, seed as i64)
    }

    #[test]
    fn test_zone_beyond_target() {
        let catalog = ModelCatalog::builtin();
        let cfg = ScenarioConfig::dominoes();
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 3);
        let id = place_zone(&mut ctx, ZoneRule::BeyondTarget).unwrap();
        let zone = ctx.scene.get(id).unwrap();
        assert_eq!(ctx.zone_id, Some(id));
        assert!(zone.kinematic);
        assert_eq!(zone.mass, STATIC_MASS);
        assert!(zone.position.x > 0.5 * cfg.axis.length);
        assert_eq!(zone.physics.static_friction, 10.0 * cfg.zone.friction);
    }

    #[test]
    fn test_removed_target_is_not_reported() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::dominoes();
        cfg.axis.remove_target = true;
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 4);
        place_target(&mut ctx).unwrap();
        assert_eq!(ctx.target_id, None);
        assert_eq!(ctx.scene.len(), 1);
        assert!(ctx.scene.objects()[0].removed);
        // Scale and color still drive the rest of the layout.
        assert!(ctx.target_color.is_some());
    }

    #[test]
    fn test_probe_gets_push_and_zero_drag() {
        let catalog = ModelCatalog::builtin();
        let cfg = ScenarioConfig::collision();
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 5);
        place_target(&mut ctx).unwrap();
        place_probe(&mut ctx, ProbeStyle::default()).unwrap();

        let probe = ctx.probe_id.unwrap();
        let push = ctx.push.as_ref().unwrap();
        assert_eq!(push.object_id, probe);
        assert!(matches!(
            ctx.extra_commands[0],
            EngineCommand::SetObjectDrag { id, .. } if id == probe
        ));
        assert!(ctx.scene.get(probe).unwrap().position.x < 0.0);
    }

    #[test]
    fn test_probe_on_ramp_is_lifted() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::collision();
        cfg.ramp.enabled = true;
        cfg.ramp.base_height = crate::math::ValueRange::fixed(0.3);
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 6);
        place_target(&mut ctx).unwrap();
        place_probe(&mut ctx, ProbeStyle::default()).unwrap();

        let ramp = ctx.ramp.unwrap();
        assert!(ramp.base_id.is_some());
        let probe = ctx.scene.get(ctx.probe_id.unwrap()).unwrap();
        assert!(probe.position.y > 0.3);
        // Centre-of-mass push on a ramp.
        assert_eq!(ctx.push.as_ref().unwrap().position(), None);
    }

    #[test]
    fn test_middle_row_skips_one() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::dominoes();
        cfg.structure.remove_middle = true;
        cfg.structure.spacing_jitter = 0.0;
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 7);
        place_target(&mut ctx).unwrap();
        build_middle_row(&mut ctx).unwrap();

        assert!(ctx.skipped_middle.is_some());
        assert_eq!(ctx.num_middle_objects, 2);
        assert_eq!(ctx.scene.with_role(ObjectRole::Middle).count(), 2);
        assert!(ctx.variant_static.contains("middle_type"));
    }

    #[test]
    fn test_test_mode_palette() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::dominoes();
        cfg.middle.color = Some(Rgb::new(0.9, 0.1, 0.1));
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 8);
        place_zone(&mut ctx, ZoneRule::BeyondTarget).unwrap();
        place_target(&mut ctx).unwrap();
        build_middle_row(&mut ctx).unwrap();
        apply_test_mode_colors(&mut ctx);

        let target = ctx.scene.get(ctx.target_id.unwrap()).unwrap();
        let zone = ctx.scene.get(ctx.zone_id.unwrap()).unwrap();
        assert_eq!(target.color, Rgb::RED);
        assert_eq!(zone.color, Rgb::YELLOW);
        for middle in ctx.scene.with_role(ObjectRole::Middle) {
            assert!(!middle.color.near(&Rgb::RED, ctx.radius()));
        }
    }

    #[test]
    fn test_base_static_fields() {
        let catalog = ModelCatalog::builtin();
        let cfg = ScenarioConfig::collision();
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = context(&cfg, &pools, 9);
        place_zone(&mut ctx, ZoneRule::BeyondTarget).unwrap();
        place_target(&mut ctx).unwrap();
        place_probe(&mut ctx, ProbeStyle::default()).unwrap();

        let mut data = StaticData::new();
        write_base_static(&ctx, &mut data);
        for key in ["room", "trial_seed", "zone_id", "target_id", "probe_id", "push_force", "push_time"] {
            assert!(data.contains(key), "missing {key}");
        }
        assert!(!data.contains("ramp_id"));
        let ids = data.get("object_ids").and_then(|v| v.as_ints()).unwrap();
        assert_eq!(ids.len(), 3);
    }
}
