//! In-process stand-in for the engine. It keeps every object where it was
//! added and never reports contacts unless a hook injects them.

use std::collections::BTreeMap;

use super::{FrameResponse, ObjectTransform, ParticleCloud, PhysicsEngine};
use crate::command::EngineCommand;
use crate::error::EngineError;
use crate::math::Vec3;

/// Mutates each response before it is returned: `(frame, batch, response)`.
///
/// `frame` counts every batch since the last `LoadScene`, which is frame 0
/// itself. A run loads the room once, so trial frame `k` of the first trial
/// arrives as hook frame `k + 1` and later trials are offset further.
pub type FrameHook = Box<dyn FnMut(u32, &[EngineCommand], &mut FrameResponse) + Send>;

pub struct OfflineEngine {
    positions: BTreeMap<u32, Vec3>,
    flex_ids: Vec<u32>,
    frame: u32,
    history: Vec<Vec<EngineCommand>>,
    hook: Option<FrameHook>,
    terminated: bool,
}

impl Default for OfflineEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineEngine {
    pub fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
            flex_ids: Vec::new(),
            frame: 0,
            history: Vec::new(),
            hook: None,
            terminated: false,
        }
    }

    pub fn with_hook(mut self, hook: FrameHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Every batch received so far.
    pub fn history(&self) -> &[Vec<EngineCommand>] {
        &self.history
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn live_objects(&self) -> usize {
        self.positions.len()
    }

    fn apply(&mut self, cmd: &EngineCommand) {
        match cmd {
            EngineCommand::AddObject { id, position, .. } => {
                self.positions.insert(*id, *position);
            }
            EngineCommand::AddFlexSolidObject { id, position, .. }
            | EngineCommand::AddClothObject { id, position, .. } => {
                self.positions.insert(*id, *position);
                self.flex_ids.push(*id);
            }
            EngineCommand::DestroyObject { id } => {
                self.positions.remove(id);
                self.flex_ids.retain(|f| f != id);
            }
            EngineCommand::LoadScene { .. } => {
                self.positions.clear();
                self.flex_ids.clear();
                self.frame = 0;
            }
            EngineCommand::Terminate => self.terminated = true,
            _ => {}
        }
    }
}

impl PhysicsEngine for OfflineEngine {
    fn communicate(&mut self, commands: &[EngineCommand]) -> Result<FrameResponse, EngineError> {
        if self.terminated {
            return Err(EngineError::Closed);
        }
        for cmd in commands {
            self.apply(cmd);
        }
        self.history.push(commands.to_vec());

        let mut resp = FrameResponse {
            frame: self.frame,
            transforms: self
                .positions
                .iter()
                .map(|(id, position)| ObjectTransform {
                    id: *id,
                    position: *position,
                    rotation: [0.0, 0.0, 0.0, 1.0],
                })
                .collect(),
            particles: self
                .flex_ids
                .iter()
                .filter_map(|id| {
                    self.positions.get(id).map(|p| ParticleCloud {
                        id: *id,
                        points: vec![*p],
                    })
                })
                .collect(),
            ..Default::default()
        };
        if let Some(hook) = self.hook.as_mut() {
            hook(self.frame, commands, &mut resp);
        }
        self.frame += 1;
        Ok(resp)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    fn add(id: u32, x: f64) -> EngineCommand {
        EngineCommand::AddObject {
            id,
            name: "cube".into(),
            library: "models_flex".into(),
            position: Vec3::new(x, 0.0, 0.0),
            rotation: Vec3::zeros(),
        }
    }

    #[test]
    fn test_tracks_added_and_destroyed_objects() {
        let mut engine = OfflineEngine::new();
        let resp = engine.communicate(&[add(1, 0.5), add(2, -0.5)]).unwrap();
        assert_eq!(resp.frame, 0);
        assert_eq!(resp.position_of(2), Some(Vec3::new(-0.5, 0.0, 0.0)));

        let resp = engine
            .communicate(&[EngineCommand::DestroyObject { id: 1 }])
            .unwrap();
        assert_eq!(resp.frame, 1);
        assert!(resp.position_of(1).is_none());
        assert_eq!(engine.live_objects(), 1);
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_hook_can_move_objects() {
        let mut engine = OfflineEngine::new().with_hook(Box::new(|frame, _, resp| {
            for t in resp.transforms.iter_mut() {
                t.position.x += frame as f64;
            }
        }));
        engine.communicate(&[add(1, 0.0)]).unwrap();
        let resp = engine.communicate(&[]).unwrap();
        assert_eq!(resp.position_of(1), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_closed_after_terminate() {
        let mut engine = OfflineEngine::new();
        engine.communicate(&[EngineCommand::Terminate]).unwrap();
        assert!(engine.is_terminated());
        assert!(matches!(engine.communicate(&[]), Err(EngineError::Closed)));
    }
}
