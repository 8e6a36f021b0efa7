use tracing::debug;

use crate::config::{ScenarioConfig, ScenarioKind};
use crate::engine::FrameResponse;
use crate::error::Result;
use crate::labels::{names, CollapseTracker, FrameLabels};
use crate::layout::ZoneRule;
use crate::math::{ValueRange, Vec3};
use crate::record::StaticData;
use crate::sampler::{density_mass, sample_object, ColorRequest, SampleRequest};
use crate::scene::{ObjectRole, SceneObjectSpec};
use crate::trial::TrialContext;

use super::{common, CameraView, LabelState, ScenarioStrategy};

/// Probe strikes a stack of blocks; labels record whether it fell.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tower;

/// Height a block adds to the stack.
fn block_height(model: &str, scale: &Vec3, top: f64, bottom: f64) -> f64 {
    if model == "bowl" {
        scale.y * (bottom + 0.1)
    } else {
        scale.y * top
    }
}

impl ScenarioStrategy for Tower {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Tower
    }

    /// The stack stands on the zone.
    fn zone_rule(&self, _cfg: &ScenarioConfig) -> ZoneRule {
        ZoneRule::Origin
    }

    /// Draw order: middle color (monochrome), every block scale, then per
    /// block sample, jitter, rotation, mass; finally the cap.
    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        let pools = ctx.pools;
        let radius = ctx.radius();
        let structure = &cfg.structure;
        let n = cfg.tower.num_blocks as usize;

        let mut height = ctx
            .zone_id
            .and_then(|id| ctx.scene.get(id))
            .map(|z| z.scale.y)
            .unwrap_or(0.0);

        ctx.middle_color = if cfg.colors.monochrome {
            Some(ctx.rng.color_excluding(ctx.target_color.as_ref(), radius))
        } else {
            cfg.middle.color
        };

        let mid = n as f64 / 2.0;
        let scales: Vec<Vec3> = (0..n)
            .map(|i| {
                let taper = structure.scale_gradient * (mid - i as f64);
                ctx.rng.scale(&cfg.middle.scale) + Vec3::repeat(taper)
            })
            .collect();

        let mut top = None;
        let mut last_type = None;
        for scale in &scales {
            let spec = common::fixed_scale(scale);
            let request = SampleRequest::new("middle", &pools.middle, &spec)
                .color(ColorRequest::resolve(ctx.middle_color, ctx.target_color, radius));
            let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
            let position = Vec3::new(
                scale.x * ctx.rng.jitter(structure.spacing_jitter),
                height,
                scale.z * ctx.rng.jitter(structure.spacing_jitter),
            );
            let rotation = common::draw_rotation(&mut ctx.rng, &cfg.middle.rotation);
            let mass = density_mass(ctx.rng.in_range(&cfg.middle.mass), scale);
            height += block_height(
                &sample.prototype.name,
                scale,
                sample.prototype.bounds.top,
                sample.prototype.bounds.bottom,
            );
            ctx.widen_middle_scale(scale);

            let spec = SceneObjectSpec::from_sample(sample, ObjectRole::Middle)
                .at(position)
                .rotated(rotation)
                .with_mass(mass)
                .with_physics(common::friction_or(cfg.middle.friction, 0.5))
                .with_material(cfg.middle.material.clone());
            last_type = Some(spec.model.clone());
            top = Some(ctx.scene.add(spec)?);
        }
        ctx.num_middle_objects = n;

        let request = SampleRequest::new("cap", &pools.cap, &cfg.target.scale)
            .color(ColorRequest::resolve(ctx.target_color, None, radius));
        let sample = sample_object(&mut ctx.rng, &mut ctx.scene, &request)?;
        let mass = density_mass(ctx.rng.in_range(&cfg.target.mass), &sample.scale);
        let cap_top = sample.scale.y * sample.prototype.bounds.top;
        let use_cap = cfg.tower.use_cap;
        let role = if use_cap { ObjectRole::Target } else { ObjectRole::Cap };
        let spec = SceneObjectSpec::from_sample(sample, role)
            .at(Vec3::new(0.0, height, 0.0))
            .with_mass(mass)
            .with_physics(common::friction_or(None, 0.5))
            .with_material(cfg.target.material.clone())
            .removed_if(!use_cap);
        let cap_type = spec.model.clone();
        let cap_present = !spec.removed;
        let cap_id = ctx.scene.add(spec)?;
        if cap_present {
            ctx.target_id = Some(cap_id);
            height += cap_top;
            top = Some(cap_id);
        }

        ctx.top_id = top;
        ctx.structure_height = height;
        ctx.variant_static.set("cap_type", cap_type);
        ctx.variant_static.set("use_cap", use_cap);
        ctx.variant_static.set("num_blocks", n);
        ctx.variant_static.set("tower_height", height);
        ctx.variant_static.set_opt("middle_type", last_type);
        debug!(blocks = n, height, use_cap, "built tower");
        Ok(())
    }

    fn camera_view(&self, ctx: &TrialContext<'_>) -> CameraView {
        let c = &ctx.cfg.camera;
        CameraView {
            aim: Vec3::new(0.0, 0.5 * ctx.structure_height, 0.0),
            heights: ValueRange::new(c.min_height, c.max_height),
        }
    }

    fn label_state(&self, ctx: &TrialContext<'_>) -> LabelState {
        let t = &ctx.cfg.tower;
        let force_frame = ctx.push.as_ref().map(|p| p.frame).unwrap_or(0);
        LabelState {
            collapse: Some(CollapseTracker::new(
                force_frame,
                t.fall_warmup_frames,
                t.settle_frames,
                t.max_frames,
            )),
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
        common::base_labels(ctx, state, resp, labels);
        let Some(collapse) = state.collapse.as_mut() else {
            return;
        };
        let height = ctx
            .top_id
            .and_then(|id| resp.position_of(id))
            .map(|p| p.y);
        let did_fall = collapse.observe(labels.frame, height);
        labels.insert(names::DID_FALL, did_fall);
        if let Some(frame) = collapse.fall_frame() {
            labels.insert(names::FALL_FRAME, frame);
        }
    }

    fn is_done(&self, _ctx: &TrialContext<'_>, state: &LabelState, frame: u32) -> bool {
        state
            .collapse
            .as_ref()
            .map(|c| c.is_finished(frame))
            .unwrap_or(true)
    }

    fn write_static(&self, ctx: &TrialContext<'_>, state: &LabelState, data: &mut StaticData) {
        common::write_base_static(ctx, data);
        data.merge(&ctx.variant_static);
        if let Some(frame) = state.collapse.as_ref().and_then(|c| c.fall_frame()) {
            data.set(names::FALL_FRAME, frame);
        }
    }
}

// ========== Tests ==========
