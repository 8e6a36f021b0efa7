//! Request/response protocol with the external physics engine.
//!
//! The controller sends one command batch per step and blocks until the
//! matching response arrives. There is never more than one batch in flight.

mod offline;
mod transport;

use serde::{Deserialize, Serialize};

use crate::command::EngineCommand;
use crate::error::EngineError;
use crate::math::Vec3;

pub use offline::{FrameHook, OfflineEngine};
pub use transport::{read_frame, write_frame, FramedEngine, MAX_FRAME_BYTES};

pub trait PhysicsEngine {
    /// Send one command batch and wait for the resulting frame.
    fn communicate(&mut self, commands: &[EngineCommand]) -> Result<FrameResponse, EngineError>;
}

impl<E: PhysicsEngine + ?Sized> PhysicsEngine for Box<E> {
    fn communicate(&mut self, commands: &[EngineCommand]) -> Result<FrameResponse, EngineError> {
        (**self).communicate(commands)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionState {
    Enter,
    Stay,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    pub id: u32,
    pub position: Vec3,
    /// Quaternion `[x, y, z, w]`.
    #[serde(default = "identity_quaternion")]
    pub rotation: [f64; 4],
}

fn identity_quaternion() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// Contact between one object and the floor or walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentCollision {
    pub id: u32,
    pub state: CollisionState,
    #[serde(default)]
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectCollision {
    pub primary: u32,
    pub secondary: u32,
    pub state: CollisionState,
    #[serde(default)]
    pub points: Vec<Vec3>,
}

impl ObjectCollision {
    fn involves(&self, a: u32, b: u32) -> bool {
        (self.primary == a && self.secondary == b) || (self.primary == b && self.secondary == a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleCloud {
    pub id: u32,
    pub points: Vec<Vec3>,
}

/// Simulation state returned for one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResponse {
    #[serde(default)]
    pub frame: u32,
    #[serde(default)]
    pub transforms: Vec<ObjectTransform>,
    #[serde(default)]
    pub environment_collisions: Vec<EnvironmentCollision>,
    #[serde(default)]
    pub collisions: Vec<ObjectCollision>,
    #[serde(default)]
    pub particles: Vec<ParticleCloud>,
}

impl FrameResponse {
    pub fn position_of(&self, id: u32) -> Option<Vec3> {
        self.transforms
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.position)
    }

    /// Environment contact points of `id`, in response order.
    pub fn environment_points(&self, id: u32) -> Vec<Vec3> {
        self.environment_collisions
            .iter()
            .filter(|c| c.id == id && c.state != CollisionState::Exit)
            .flat_map(|c| c.points.iter().copied())
            .collect()
    }

    /// Contact points between `a` and `b` in either order.
    pub fn contact_points(&self, a: u32, b: u32) -> Vec<Vec3> {
        self.collisions
            .iter()
            .filter(|c| c.involves(a, b) && c.state != CollisionState::Exit)
            .flat_map(|c| c.points.iter().copied())
            .collect()
    }

    pub fn particles_of(&self, id: u32) -> Option<&[Vec3]> {
        self.particles
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.points.as_slice())
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_queries() {
        let json = r#"{
            "frame": 4,
            "transforms": [{"id": 2, "position": [1.0, 0.5, 0.0]}],
            "environment_collisions": [
                {"id": 2, "state": "stay", "points": [[1.0, 0.0, 0.1], [1.0, 0.0, -0.1]]},
                {"id": 3, "state": "exit", "points": [[0.0, 0.0, 0.0]]}
            ],
            "collisions": [{"primary": 5, "secondary": 2, "state": "enter", "points": [[2.0, 0.0, 0.0]]}]
        }"#;
        let resp: FrameResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.position_of(2), Some(Vec3::new(1.0, 0.5, 0.0)));
        assert_eq!(resp.transforms[0].rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(resp.environment_points(2).len(), 2);
        assert!(resp.environment_points(3).is_empty());
        assert_eq!(resp.contact_points(2, 5).len(), 1);
        assert!(resp.particles_of(2).is_none());
    }
}
