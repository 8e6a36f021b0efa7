use crate::config::ScenarioKind;
use crate::error::Result;
use crate::trial::TrialContext;

use super::{common, LabelState, ScenarioStrategy};

/// Frames simulated after the push before a domino trial ends.
const RUN_FRAMES: u32 = 300;

/// Probe knocks a row of middle objects into the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dominoes;

impl ScenarioStrategy for Dominoes {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Dominoes
    }

    fn build_structure(&self, ctx: &mut TrialContext<'_>) -> Result<()> {
        common::build_middle_row(ctx)?;
        ctx.variant_static
            .set("remove_middle", ctx.cfg.structure.remove_middle);
        Ok(())
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
    use crate::config::ScenarioConfig;
    use crate::random::TrialRng;
    use crate::scenario::{build_scene, ObjectPools};
    use crate::scene::ObjectRole;

    #[test]
    fn test_scene_has_row_between_probe_and_target() {
        let catalog = ModelCatalog::builtin();
        let cfg = ScenarioConfig::dominoes();
        let pools = ObjectPools::resolve(&cfg, &catalog).unwrap();
        let mut ctx = TrialContext::new(&cfg, &pools, TrialRng::seeded(11), 0, 11);
        build_scene(&Dominoes, &mut ctx).unwrap();

        let probe_x = ctx.scene.get(ctx.probe_id.unwrap()).unwrap().position.x;
        let target_x = ctx.scene.get(ctx.target_id.unwrap()).unwrap().position.x;
        for middle in ctx.scene.with_role(ObjectRole::Middle) {
            assert!(middle.position.x > probe_x && middle.position.x < target_x);
        }
        assert!(ctx.num_middle_objects > 0);
        assert!(ctx.camera.is_some());
        assert!(!Dominoes.is_done(&ctx, &LabelState::new(), RUN_FRAMES));
        assert!(Dominoes.is_done(&ctx, &LabelState::new(), RUN_FRAMES + 1));
    }
}
