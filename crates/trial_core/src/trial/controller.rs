use tracing::{debug, error, info, warn};

use crate::catalog::ModelCatalog;
use crate::command::EngineCommand;
use crate::config::ScenarioConfig;
use crate::engine::PhysicsEngine;
use crate::error::Result;
use crate::labels::FrameLabels;
use crate::random::TrialRng;
use crate::record::{RecordStore, RunMetadata, TrialRecord};
use crate::scenario::{build_scene, strategy_for, ObjectPools, ScenarioStrategy};
use crate::scene::BodyKind;

use super::context::TrialContext;
use super::phase::{PhaseTracker, TrialPhase};
use super::seed::{trial_rng, trial_seed};

/// Outcome of a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub trials_written: u32,
    pub trials_failed: u32,
    pub frames: u64,
}

/// A fully built trial and the batch that creates it in the engine.
pub struct PlannedTrial<'a> {
    pub context: TrialContext<'a>,
    pub commands: Vec<EngineCommand>,
}

/// Initialization batch: objects, joints and drag, camera, an immediate
/// push, then the output requests for the trial.
pub fn init_commands(ctx: &TrialContext<'_>) -> Vec<EngineCommand> {
    let mut cmds: Vec<EngineCommand> = ctx
        .scene
        .objects()
        .iter()
        .flat_map(|o| o.init_commands())
        .collect();
    cmds.extend(ctx.extra_commands.iter().cloned());
    if let Some(camera) = &ctx.camera {
        cmds.extend(camera.commands());
    }
    if let Some(push) = ctx.push.as_ref().filter(|p| p.at_init()) {
        cmds.push(push.command());
    }

    let flex: Vec<u32> = ctx
        .scene
        .objects()
        .iter()
        .filter(|o| !o.removed && o.body != BodyKind::Rigid)
        .map(|o| o.id)
        .collect();
    cmds.push(EngineCommand::SendTransforms {
        ids: ctx.scene.active_ids(),
    });
    cmds.push(EngineCommand::SendCollisions {
        enter: true,
        stay: true,
        exit: false,
        environment: true,
    });
    if !flex.is_empty() {
        cmds.push(EngineCommand::SendFlexParticles { ids: flex });
    }
    cmds
}

fn plan<'a>(
    config: &'a ScenarioConfig,
    pools: &'a ObjectPools,
    strategy: &dyn ScenarioStrategy,
    shared_rng: &mut TrialRng,
    trial_num: u32,
) -> Result<PlannedTrial<'a>> {
    let seed = trial_seed(config.general.seed, trial_num, config.general.randomize);
    let rng = trial_rng(seed, shared_rng);
    let mut context = TrialContext::new(config, pools, rng, trial_num, seed);
    build_scene(strategy, &mut context)?;
    let commands = init_commands(&context);
    Ok(PlannedTrial { context, commands })
}

/// Drives trials against one engine session and writes one record per trial.
pub struct TrialController<E, S> {
    config: ScenarioConfig,
    catalog: ModelCatalog,
    pools: ObjectPools,
    strategy: Box<dyn ScenarioStrategy>,
    engine: E,
    store: S,
    shared_rng: TrialRng,
    phase: PhaseTracker,
    /// Objects the engine may still hold from the current trial.
    live_ids: Vec<u32>,
}

impl<E: PhysicsEngine, S: RecordStore> TrialController<E, S> {
    /// Validate the configuration and resolve every candidate pool. Nothing
    /// is sent to the engine until [`run`](Self::run).
    pub fn new(config: ScenarioConfig, catalog: ModelCatalog, engine: E, store: S) -> Result<Self> {
        config.validate_scenario()?;
        let pools = ObjectPools::resolve(&config, &catalog)?;
        let shared_rng = if config.general.randomize {
            TrialRng::from_entropy()
        } else {
            TrialRng::seeded(config.general.seed)
        };
        let strategy = strategy_for(config.scenario);
        Ok(Self {
            config,
            catalog,
            pools,
            strategy,
            engine,
            store,
            shared_rng,
            phase: PhaseTracker::new(),
            live_ids: Vec::new(),
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase.phase()
    }

    /// Build trial `trial_num` without touching the engine.
    pub fn plan_trial(&mut self, trial_num: u32) -> Result<PlannedTrial<'_>> {
        plan(
            &self.config,
            &self.pools,
            self.strategy.as_ref(),
            &mut self.shared_rng,
            trial_num,
        )
    }

    /// Load the room, run every trial, then close the session.
    ///
    /// Configuration and sampling failures and a broken engine session abort
    /// the run. Any other trial failure is logged, the failed trial's objects
    /// are destroyed and the next trial starts.
    pub fn run(&mut self) -> Result<RunReport> {
        let metadata = RunMetadata::new(&self.config, self.catalog.len());
        self.store.write_metadata(&metadata)?;
        info!(
            run_id = %metadata.run_id,
            scenario = self.config.scenario.name(),
            trials = self.config.general.num_trials,
            "starting run"
        );

        self.engine.communicate(&[EngineCommand::LoadScene {
            name: self.config.general.room.clone(),
        }])?;

        let mut report = RunReport::default();
        for trial_num in 0..self.config.general.num_trials {
            match self.run_trial(trial_num) {
                Ok(record) => {
                    report.trials_written += 1;
                    report.frames += record.frames.len() as u64;
                }
                Err(e) if e.is_fatal() => {
                    self.phase.reset();
                    error!(trial = trial_num, error = %e, "aborting run");
                    return Err(e);
                }
                Err(e) => {
                    self.phase.reset();
                    report.trials_failed += 1;
                    warn!(trial = trial_num, error = %e, "trial failed, continuing");
                    if let Err(e) = self.release_live_objects() {
                        error!(trial = trial_num, error = %e, "cleanup failed, aborting run");
                        return Err(e);
                    }
                }
            }
        }

        self.engine.communicate(&[EngineCommand::Terminate])?;
        info!(
            written = report.trials_written,
            failed = report.trials_failed,
            frames = report.frames,
            "run finished"
        );
        Ok(report)
    }

    /// Destroy whatever the last trial left in the engine.
    fn release_live_objects(&mut self) -> Result<()> {
        if self.live_ids.is_empty() {
            return Ok(());
        }
        let destroy: Vec<EngineCommand> = self
            .live_ids
            .drain(..)
            .map(|id| EngineCommand::DestroyObject { id })
            .collect();
        debug!(objects = destroy.len(), "destroying objects of failed trial");
        self.engine.communicate(&destroy)?;
        Ok(())
    }

    /// Build, simulate, label and store one trial.
    pub fn run_trial(&mut self, trial_num: u32) -> Result<TrialRecord> {
        let Self {
            config,
            pools,
            strategy,
            engine,
            store,
            shared_rng,
            phase,
            live_ids,
            ..
        } = self;
        let strategy: &dyn ScenarioStrategy = &**strategy;

        let PlannedTrial { context: ctx, commands } =
            plan(config, pools, strategy, shared_rng, trial_num)?;
        debug!(trial = trial_num, objects = ctx.scene.len(), "scene built");

        phase.advance_to(TrialPhase::Initializing)?;
        let mut state = strategy.label_state(&ctx);
        let mut record = TrialRecord::new(trial_num);
        *live_ids = ctx.scene.active_ids();
        let resp = engine.communicate(&commands)?;
        let mut labels = FrameLabels::new(0);
        strategy.compute_labels(&ctx, &mut state, &resp, &mut labels);
        record.push_frame(labels);

        phase.advance_to(TrialPhase::Running)?;
        let ceiling = config.general.frame_ceiling;
        let delayed_push = ctx.push.as_ref().filter(|p| !p.at_init());
        let mut frame = 0u32;
        while !strategy.is_done(&ctx, &state, frame) && frame + 1 < ceiling {
            frame += 1;
            let batch: Vec<EngineCommand> = delayed_push
                .filter(|p| p.frame == frame)
                .map(|p| p.command())
                .into_iter()
                .collect();
            let resp = engine.communicate(&batch)?;
            let mut labels = FrameLabels::new(frame);
            strategy.compute_labels(&ctx, &mut state, &resp, &mut labels);
            record.push_frame(labels);
        }

        phase.advance_to(TrialPhase::Finalizing)?;
        strategy.write_static(&ctx, &state, &mut record.static_data);
        record.static_data.set("num_frames", record.frames.len());
        let destroy: Vec<EngineCommand> = ctx
            .scene
            .active_ids()
            .into_iter()
            .map(|id| EngineCommand::DestroyObject { id })
            .collect();
        engine.communicate(&destroy)?;
        live_ids.clear();
        store.write_trial(&record)?;

        phase.advance_to(TrialPhase::Done)?;
        phase.advance_to(TrialPhase::Configuring)?;
        info!(
            trial = trial_num,
            seed = ctx.trial_seed,
            frames = record.frames.len(),
            "trial written"
        );
        Ok(record)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        CollisionState, EnvironmentCollision, FrameHook, FrameResponse, OfflineEngine,
    };
    use crate::error::{EngineError, TrialError};
    use crate::math::Vec3;
    use crate::labels::names;
    use crate::math::ValueRange;
    use crate::record::{MemoryStore, TrialSummary};
    use crate::trial::UNSEEDED;
    use std::result::Result;

    fn controller(cfg: ScenarioConfig, engine: OfflineEngine) -> TrialController<OfflineEngine, MemoryStore> {
        TrialController::new(cfg, ModelCatalog::builtin(), engine, MemoryStore::new()).unwrap()
    }

    fn small(mut cfg: ScenarioConfig, trials: u32) -> ScenarioConfig {
        cfg.general.num_trials = trials;
        cfg
    }

    #[test]
    fn test_same_seed_same_records() {
        let cfg = small(ScenarioConfig::dominoes(), 2);
        let mut a = controller(cfg.clone(), OfflineEngine::new());
        let mut b = controller(cfg, OfflineEngine::new());
        a.run().unwrap();
        b.run().unwrap();
        let ra: Vec<_> = a.store().records().cloned().collect();
        let rb: Vec<_> = b.store().records().cloned().collect();
        assert_eq!(ra.len(), 2);
        assert_eq!(ra, rb);
        assert_ne!(ra[0].static_data, ra[1].static_data);
        assert!(a.engine().is_terminated());
        assert_eq!(a.engine().live_objects(), 0);
    }

    #[test]
    fn test_immediate_push_goes_with_init_batch() {
        let mut cfg = small(ScenarioConfig::collision(), 1);
        cfg.force.wait = ValueRange::fixed(0.0);
        let mut c = controller(cfg, OfflineEngine::new());
        c.run().unwrap();

        // Batch 0 loads the room; batch 1 builds the trial.
        let init = &c.engine().history()[1];
        let pushes: Vec<&EngineCommand> = init.iter().filter(|cmd| cmd.is_push()).collect();
        assert_eq!(pushes.len(), 1);

        let record = c.store().records().next().unwrap();
        let mass = record.static_data.get("probe_mass").and_then(|v| v.as_f64()).unwrap();
        let EngineCommand::ApplyForceAtPosition { force, .. } = pushes[0] else {
            panic!("expected a point push, got {:?}", pushes[0]);
        };
        let magnitude = force.norm();
        assert!(magnitude >= 5.0 * mass - 1e-9 && magnitude <= 10.0 * mass + 1e-9);
        assert!(c
            .engine()
            .history()
            .iter()
            .skip(2)
            .all(|batch| batch.iter().all(|cmd| !cmd.is_push())));
    }

    #[test]
    fn test_delayed_push_sent_on_its_frame() {
        let mut cfg = small(ScenarioConfig::dominoes(), 1);
        cfg.force.wait = ValueRange::fixed(5.0);
        let mut c = controller(cfg, OfflineEngine::new());
        c.run().unwrap();
        let history = c.engine().history();
        // Batch 1 is frame 0, so frame 5 is batch 6.
        assert!(history[1].iter().all(|cmd| !cmd.is_push()));
        assert!(history[6].iter().any(|cmd| cmd.is_push()));
    }

    #[test]
    fn test_tower_fall_is_not_reported_before_push() {
        let mut cfg = small(ScenarioConfig::tower(), 1);
        cfg.tower.num_blocks = 3;
        // Everything collapses onto the floor well after the push. Hook frames
        // count from the room load, so trial frame k is hook frame k + 1 here.
        let hook: FrameHook = Box::new(|frame, _, resp| {
            if frame > 25 {
                for t in resp.transforms.iter_mut() {
                    t.position.y = 0.0;
                }
            }
        });
        let mut c = controller(cfg, OfflineEngine::new().with_hook(hook));
        c.run().unwrap();

        let record = c.store().records().next().unwrap();
        let push_time = record.static_data.get("push_time").and_then(|v| v.as_i64()).unwrap();
        assert_eq!(push_time, 15);
        for labels in &record.frames {
            if labels.frame < 15 {
                assert_eq!(labels.flag(names::DID_FALL), Some(false));
            }
        }
        let summary = TrialSummary::from_record(record);
        assert_eq!(summary.did_fall, Some(true));
        assert!(record.static_data.contains(names::FALL_FRAME));
    }

    #[test]
    fn test_has_moved_never_resets() {
        let cfg = small(ScenarioConfig::collision(), 1);
        let hook: FrameHook = Box::new(|frame, _, resp| {
            if (10..20).contains(&frame) {
                for t in resp.transforms.iter_mut() {
                    t.position.x += 0.5;
                }
            }
        });
        let mut c = controller(cfg, OfflineEngine::new().with_hook(hook));
        c.run().unwrap();

        let record = c.store().records().next().unwrap();
        let flags: Vec<bool> = record
            .frames
            .iter()
            .filter_map(|f| f.flag(names::TARGET_HAS_MOVED))
            .collect();
        assert!(flags.iter().any(|m| *m));
        let first = flags.iter().position(|m| *m).unwrap();
        assert!(flags[first..].iter().all(|m| *m));
    }

    #[test]
    fn test_static_section_is_idempotent() {
        let cfg = ScenarioConfig::containment();
        let strategy = strategy_for(cfg.scenario);
        let mut c = controller(cfg, OfflineEngine::new());
        let planned = c.plan_trial(0).unwrap();
        let state = strategy.label_state(&planned.context);

        let mut once = crate::record::StaticData::new();
        strategy.write_static(&planned.context, &state, &mut once);
        let mut twice = once.clone();
        strategy.write_static(&planned.context, &state, &mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_randomized_trials_record_unseeded() {
        let mut cfg = small(ScenarioConfig::collision(), 2);
        cfg.general.randomize = true;
        let mut c = controller(cfg, OfflineEngine::new());
        c.run().unwrap();
        for record in c.store().records() {
            let seed = record.static_data.get("trial_seed").and_then(|v| v.as_i64());
            assert_eq!(seed, Some(UNSEEDED));
        }
    }

    #[test]
    fn test_frame_ceiling_bounds_trial() {
        let mut cfg = small(ScenarioConfig::dominoes(), 1);
        cfg.general.frame_ceiling = 20;
        let mut c = controller(cfg, OfflineEngine::new());
        let report = c.run().unwrap();
        assert_eq!(report.frames, 20);
    }

    #[test]
    fn test_closed_engine_aborts_run() {
        let mut engine = OfflineEngine::new();
        engine.communicate(&[EngineCommand::Terminate]).unwrap();
        let mut c = controller(small(ScenarioConfig::collision(), 3), engine);
        let err = c.run().unwrap_err();
        assert!(matches!(err, TrialError::Engine(EngineError::Closed)));
        assert_eq!(c.store().len(), 0);
    }

    /// Delegates to the offline engine but fails one call with an I/O error.
    struct FailOnce {
        inner: OfflineEngine,
        calls: u32,
        fail_at: u32,
    }

    impl PhysicsEngine for FailOnce {
        fn communicate(&mut self, commands: &[EngineCommand]) -> Result<FrameResponse, EngineError> {
            self.calls += 1;
            if self.calls == self.fail_at {
                return Err(EngineError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "connection hiccup",
                )));
            }
            self.inner.communicate(commands)
        }
    }

    #[test]
    fn test_failed_trial_is_cleaned_up_and_run_continues() {
        // Call 1 loads the room, call 2 builds trial 0, call 5 is its third frame.
        let engine = FailOnce {
            inner: OfflineEngine::new(),
            calls: 0,
            fail_at: 5,
        };
        let cfg = small(ScenarioConfig::dominoes(), 2);
        let mut c = TrialController::new(cfg, ModelCatalog::builtin(), engine, MemoryStore::new()).unwrap();
        let report = c.run().unwrap();

        assert_eq!(report.trials_failed, 1);
        assert_eq!(report.trials_written, 1);
        let written: Vec<u32> = c.store().records().map(|r| r.trial_num).collect();
        assert_eq!(written, vec![1]);

        let inner = &c.engine().inner;
        assert_eq!(inner.live_objects(), 0);
        assert!(inner.is_terminated());

        // The cleanup batch destroys exactly what trial 0 added.
        let mut added: Vec<u32> = inner.history()[1]
            .iter()
            .filter_map(|cmd| match cmd {
                EngineCommand::AddObject { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        let mut destroyed: Vec<u32> = inner.history()[4]
            .iter()
            .filter_map(|cmd| match cmd {
                EngineCommand::DestroyObject { id } => Some(*id),
                _ => None,
            })
            .collect();
        added.sort_unstable();
        destroyed.sort_unstable();
        assert!(!added.is_empty());
        assert_eq!(added, destroyed);
    }

    #[test]
    fn test_unreadable_reply_aborts_run() {
        struct Garbled;
        impl PhysicsEngine for Garbled {
            fn communicate(&mut self, _: &[EngineCommand]) -> Result<FrameResponse, EngineError> {
                Err(EngineError::Desync {
                    reason: "bad json".to_string(),
                })
            }
        }
        let cfg = small(ScenarioConfig::collision(), 3);
        let mut c = TrialController::new(cfg, ModelCatalog::builtin(), Garbled, MemoryStore::new()).unwrap();
        let err = c.run().unwrap_err();
        assert!(matches!(err, TrialError::Engine(EngineError::Desync { .. })));
        assert_eq!(c.store().len(), 0);
    }

    #[test]
    fn test_slow_contact_drift_is_not_a_ground_change() {
        let cfg = small(ScenarioConfig::collision(), 1);
        // Every object touches the floor at a point creeping 8 mm per frame.
        let hook: FrameHook = Box::new(|frame, _, resp| {
            let x = f64::from(frame) * 0.008;
            resp.environment_collisions = resp
                .transforms
                .iter()
                .map(|t| EnvironmentCollision {
                    id: t.id,
                    state: CollisionState::Stay,
                    points: vec![Vec3::new(x, 0.0, 0.0)],
                })
                .collect();
        });
        let mut c = controller(cfg, OfflineEngine::new().with_hook(hook));
        c.run().unwrap();

        let record = c.store().records().next().unwrap();
        assert!(!record.frames.is_empty());
        assert!(record
            .frames
            .iter()
            .all(|f| f.flag(names::TARGET_ON_GROUND) == Some(false)));
    }

    #[test]
    fn test_lost_ground_contact_is_reported() {
        let cfg = small(ScenarioConfig::collision(), 1);
        // Contact holds still, then disappears from trial frame 10 on.
        let hook: FrameHook = Box::new(|frame, _, resp| {
            if frame <= 10 {
                resp.environment_collisions = resp
                    .transforms
                    .iter()
                    .map(|t| EnvironmentCollision {
                        id: t.id,
                        state: CollisionState::Stay,
                        points: vec![Vec3::new(0.0, 0.0, 0.0)],
                    })
                    .collect();
            }
        });
        let mut c = controller(cfg, OfflineEngine::new().with_hook(hook));
        c.run().unwrap();

        let record = c.store().records().next().unwrap();
        let flags: Vec<bool> = record
            .frames
            .iter()
            .filter_map(|f| f.flag(names::TARGET_ON_GROUND))
            .collect();
        assert!(flags.len() > 10);
        assert!(flags[..10].iter().all(|g| !*g));
        assert!(flags[10..].iter().all(|g| *g));
    }

    #[test]
    fn test_invalid_room_is_rejected_up_front() {
        let mut cfg = ScenarioConfig::collision();
        cfg.general.room = "attic".to_string();
        let result = TrialController::new(cfg, ModelCatalog::builtin(), OfflineEngine::new(), MemoryStore::new());
        assert!(matches!(result, Err(TrialError::Config(_))));
    }
}
