use crate::config::{ScenarioConfig, ScenarioKind};
use crate::error::Result;
use crate::layout::{DecorKind, DecorParams, ZoneRule};
use crate::math::Vec3;
use crate::scene::PhysicsMaterial;
use crate::trial::TrialContext;

use super::{LabelState, ProbeStyle, ScenarioStrategy};

const RUN_FRAMES: u32 = 150;

/// Probe launched directly at the target; zone at the end of the axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collision;

impl ScenarioStrategy for Collision {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Collision
    }

    fn zone_rule(&self, cfg: &ScenarioConfig) -> ZoneRule {
        ZoneRule::AxisEnd {
            lateral_jitter: cfg.zone.lateral_jitter,
        }
    }

    fn probe_style(&self) -> ProbeStyle {
        ProbeStyle {
            physics: PhysicsMaterial::new(0.4, 0.4, 0.0),
            follow_yaw: false,
        }
    }

    fn build_structure(&self, _ctx: &mut TrialContext<'_>) -> Result<()> {
        Ok(())
    }

    fn decor_params(&self, kind: DecorKind, middle_scale: &Vec3) -> DecorParams {
        let min_z = 2.0 * middle_scale.z;
        match kind {
            DecorKind::Distractor => DecorParams::distractors(middle_scale.z)
                .with_spacing(20.0)
                .with_sizes(0.5, 1.0)
                .with_min_z(min_z),
            DecorKind::Occluder => DecorParams::occluders(middle_scale.z)
                .with_spacing(15.0)
                .with_sizes(0.25, 1.0)
                .with_min_z(min_z),
        }
    }

    fn is_done(&self, _ctx: &TrialContext<'_>, _state: &LabelState, frame: u32) -> bool {
        frame > RUN_FRAMES
    }
}

// ========== Tests ==========
