use std::f64::consts::PI;

use tracing::debug;

use crate::command::EngineCommand;
use crate::config::{ScenarioConfig, ScenarioKind};
use crate::error::Result;
use crate::layout::ZoneRule;
use crate::math::{ValueRange, Vec3};
use crate::sampler::{density_mass, sample_object, ColorRequest, SampleRequest};
use crate::scene::{ObjectRole, SceneObjectSpec};
use crate::trial::TrialContext;

use super::{common, CameraView, LabelState, ScenarioStrategy};

/// Open shapes the links fall through; they add no height.
const HOLLOW_BASES: &[&str] = &["pipe", "torus"];

/// Links resting in a container on a base. One link may be the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Containment;

/// Volume of the prototype relative to its bounding box.
fn fill_factor(model: &str) -> f64 {
    match model {
        "cylinder" => PI / 4.0,
        "cone" => PI / 12.0,
        _ => 1.0,
    }
}

/// Index of the target link, counting from the end when negative.
fn target_index(requested: Option<i64>, num_links: usize, random: Option<usize>) -> Option<usize> {
    match requested {
        Some(i) if i < 0 => {
            let from_end = num_links as i64 + i;
            (from_end >= 0).then_some(from_end as usize)
        }
        Some(i) => ((i as usize) < num_links).then_some(i as usize),
        None => random,
    }
}

impl ScenarioStrategy for Containment {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Containment
    }

    fn zone_rule(&self, _cfg: &ScenarioConfig) -> ZoneRule {
        ZoneRule::Origin
    }

    /// Draw order: base, attachment, optional cap, link count, links, target
    /// link index.
    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let pools = ctx.pools;
        let radius = ctx.radius();
        let c = &cfg.containment;
        let jitter = cfg.structure.spacing_jitter;

        let mut height = ctx
            .zone_id
            .and_then(|id| ctx.scene.get(id))
            .map(|z| z.scale.y)
            .unwrap_or(0.0);

        // Base
        let request = SampleRequest::new("base", &pools.base, &c.base.scale)
            .color(ColorRequest::resolve(c.base.color, ctx.target_color, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let rotation = common::draw_rotation(&mut ctx.rng, &c.base.rotation);
        let mass = density_mass(ctx.rng.in_range(&c.base.mass), &sample.scale);
        let base_height = if c.use_base && !HOLLOW_BASES.contains(&sample.prototype.name.as_str()) {
            sample.prototype.bounds.height * sample.scale.y
        } else {
            0.0
        };
        let base = SceneObjectSpec::from_sample(sample, ObjectRole::Base)
            .at(Vec3::new(0.0, height, 0.0))
            .rotated(rotation)
            .with_mass(mass)
            .with_physics(common::friction_or(c.base.friction, 0.5))
            .with_material(c.base.material.clone())
            .removed_if(!c.use_base);
        let base_type = base.model.clone();
        let base_present = !base.removed;
        let base_id = ctx.scene.add(base)?;
        let base_id = base_present.then_some(base_id);
        height += base_height;

        // Attachment
        let request = SampleRequest::new("attachment", &pools.attachment, &c.attachment.scale)
            .color(ColorRequest::resolve(c.attachment.color, ctx.target_color, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let rotation = common::draw_rotation(&mut ctx.rng, &c.attachment.rotation);
        let name = sample.prototype.name.clone();
        let mass = density_mass(ctx.rng.in_range(&c.attachment.mass), &sample.scale) * fill_factor(&name);
        let a_height = sample.prototype.bounds.height;
        let a_scale = sample.scale;
        let mut attachment = SceneObjectSpec::from_sample(sample, ObjectRole::Attachment)
            .at(Vec3::new(0.0, height, 0.0))
            .rotated(rotation)
            .with_mass(mass)
            .with_physics(common::friction_or(c.attachment.friction, 0.5))
            .with_material(c.attachment.material.clone())
            .removed_if(!c.use_attachment);
        let attachment_present = !attachment.removed;
        let attachment_id = attachment.id;
        if attachment_present && c.attachment_fixed {
            match base_id {
                Some(parent_id) => ctx.extra_commands.push(EngineCommand::AddFixedJoint {
                    id: attachment_id,
                    parent_id,
                }),
                None => attachment = attachment.kinematic(),
            }
        }
        ctx.scene.add(attachment)?;

        // Cap on the attachment
        if attachment_present && c.attachment_capped {
            let request = SampleRequest::new("cap", &pools.base, &c.base.scale)
                .color(ColorRequest::resolve(c.base.color, ctx.target_color, radius));
            let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
            let mass = density_mass(ctx.rng.in_range(&c.base.mass), &sample.scale);
            let cap = SceneObjectSpec::from_sample(sample, ObjectRole::Cap)
                .at(Vec3::new(0.0, height + a_height * a_scale.y, 0.0))
                .with_mass(mass)
                .with_physics(common::friction_or(c.base.friction, 0.5))
                .with_material(c.base.material.clone());
            let cap_id = ctx.scene.add(cap)?;
            if c.attachment_fixed {
                ctx.extra_commands.push(EngineCommand::AddFixedJoint {
                    id: cap_id,
                    parent_id: attachment_id,
                });
            }
        }

        if attachment_present && name == "cone" && a_scale.y > 0.0 {
            height += 0.25 * a_height * (a_scale.x.powi(2) + a_scale.z.powi(2)).sqrt() / a_scale.y;
        }

        // Links
        ctx.middle_color = if cfg.colors.monochrome {
            Some(ctx.rng.color_excluding(ctx.target_color.as_ref(), radius))
        } else {
            cfg.middle.color
        };
        let num_links = ctx.rng.truncated(&c.num_links).max(0) as usize;
        let mut link_ids = Vec::with_capacity(num_links);
        let mut link_type = None;
        for _ in 0..num_links {
            let request = SampleRequest::new("middle", &pools.middle, &cfg.middle.scale)
                .color(ColorRequest::resolve(ctx.middle_color, ctx.target_color, radius));
            let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
            let scale = sample.scale;
            let position = Vec3::new(
                scale.x * ctx.rng.jitter(jitter),
                height,
                scale.z * ctx.rng.jitter(jitter),
            );
            let rotation = common::draw_rotation(&mut ctx.rng, &cfg.middle.rotation);
            let mass = density_mass(ctx.rng.in_range(&cfg.middle.mass), &scale);
            height += scale.y * sample.prototype.bounds.top;
            ctx.widen_middle_scale(&scale);

            let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Middle)
                .at(position)
                .rotated(rotation)
                .with_mass(mass)
                .with_physics(common::friction_or(cfg.middle.friction, 0.5))
                .with_material(cfg.middle.material.clone());
            link_type = Some(spec.model.clone());
            link_ids.push(ctx.scene.add(spec)?);
        }
        ctx.num_middle_objects = num_links;

        let random = ctx.rng.index(num_links);
        let target_link = target_index(c.target_link, num_links, random);
        if let Some(idx) = target_link {
            let id = link_ids[idx];
            let color = match ctx.target_color {
                Some(color) => color,
                None => ctx.rng.color(),
            };
            if let Some(link) = ctx.scene.get_mut(id) {
                link.role = ObjectRole::Target;
                link.color = color;
            }
            ctx.target_id = Some(id);
            ctx.target_color = Some(color);
        }

        ctx.structure_height = height;
        ctx.top_id = link_ids.last().copied();

        let s = &mut ctx.variant_static;
        s.set_opt("base_id", base_id);
        s.set("use_base", c.use_base);
        s.set("base_type", base_type);
        s.set_opt("attachment_id", attachment_present.then_some(attachment_id));
        s.set("attachment_type", name);
        s.set("use_attachment", c.use_attachment);
        s.set("attachment_fixed", c.attachment_fixed);
        s.set("use_cap", c.attachment_capped);
        s.set_opt("link_type", link_type);
        s.set("num_links", num_links);
        s.set_opt("target_link_idx", target_link);
        debug!(num_links, ?target_link, height, "built containment structure");
        Ok(())
    }

    fn camera_view(&self, ctx: &TrialContext<'_>) -> CameraView {
        let c = &ctx.cfg.camera;
        CameraView {
            aim: Vec3::new(0.0, 0.5 * ctx.structure_height, 0.0),
            heights: ValueRange::new(c.min_height, c.max_height),
        }
    }

    fn is_done(&self, ctx: &TrialContext<'_>, _state: &LabelState, frame: u32) -> bool {
        frame > ctx.cfg.containment.max_frames
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
    fn test_target_index() {
        assert_eq!(target_index(Some(1), 3, Some(0)), Some(1));
        assert_eq!(target_index(Some(-1), 3, Some(0)), Some(2));
        assert_eq!(target_index(Some(3), 3, Some(0)), None);
        assert_eq!(target_index(Some(-4), 3, Some(0)), None);
        assert_eq!(target_index(None, 3, Some(2)), Some(2));
        assert_eq!(target_index(None, 0, None), None);
    }

    #[test]
    fn test_links_stack_above_base() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::containment();
        cfg.containment.num_links = ValueRange::fixed(3.0);
        cfg.containment.target_link = Some(0);
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(31), 0, 31);
        build_scene(&Containment, &mut ctx).unwrap();

        let base = ctx.scene.active(ObjectRole::Base).unwrap();
        let links: Vec<&SceneObjectSpec> = ctx
            .scene
            .objects()
            .iter()
            .filter(|o| matches!(o.role, ObjectRole::Middle | ObjectRole::Target) && o.position.y > 0.0)
            .collect();
        assert_eq!(ctx.num_middle_objects, 3);
        assert!(links.iter().all(|l| l.position.y > base.position.y));

        let target = ctx.scene.get(ctx.target_id.unwrap()).unwrap();
        assert_eq!(target.role, ObjectRole::Target);
        assert_eq!(Some(target.color), ctx.target_color);
        assert_eq!(ctx.variant_static.get("target_link_idx").and_then(|v| v.as_i64()), Some(0));
    }

    #[test]
    fn test_fixed_attachment_is_jointed_to_base() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::containment();
        cfg.containment.attachment_fixed = true;
        cfg.containment.attachment_capped = true;
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(32), 0, 32);
        build_scene(&Containment, &mut ctx).unwrap();

        let joints = ctx
            .extra_commands
            .iter()
            .filter(|c| matches!(c, EngineCommand::AddFixedJoint { .. }))
            .count();
        assert_eq!(joints, 2);
        assert!(ctx.scene.active(ObjectRole::Cap).is_some());
    }

    #[test]
    fn test_run_length_follows_containment_section() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::containment();
        cfg.containment.max_frames = 40;
        cfg.tower.max_frames = 900;
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(34), 0, 34);
        let state = Containment.label_state(&ctx);
        assert!(!Containment.is_done(&ctx, &state, 40));
        assert!(Containment.is_done(&ctx, &state, 41));
    }

    #[test]
    fn test_without_base_attachment_is_kinematic() {
        let catalog = ModelCatalog::builtin();
        let mut cfg = ScenarioConfig::containment();
        cfg.containment.use_base = false;
        cfg.containment.attachment_fixed = true;
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(33), 0, 33);
        build_scene(&Containment, &mut ctx).unwrap();

        assert!(ctx.scene.active(ObjectRole::Base).is_none());
        assert!(ctx.scene.active(ObjectRole::Attachment).unwrap().kinematic);
        assert!(ctx.extra_commands.iter().all(|c| !matches!(c, EngineCommand::AddFixedJoint { .. })));
    }
}
