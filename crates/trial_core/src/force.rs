//! Push schedule: one impulse per trial, delivered on a sampled frame.

use serde::{Deserialize, Serialize};

use crate::command::EngineCommand;
use crate::config::ForceConfig;
use crate::math::{rotate_parallel_to_floor, Vec3};
use crate::random::TrialRng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "position", rename_all = "snake_case")]
pub enum PushDelivery {
    /// Impulse through the centre of mass.
    WholeObject,
    /// Impulse at a world-space point on the object.
    AtPosition(Vec3),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushForce {
    pub object_id: u32,
    pub force: Vec3,
    pub delivery: PushDelivery,
    /// Frame on which the command is sent; 0 means with the scene setup.
    pub frame: u32,
}

impl PushForce {
    pub fn command(&self) -> EngineCommand {
        match &self.delivery {
            PushDelivery::WholeObject => EngineCommand::ApplyForceToObject {
                id: self.object_id,
                force: self.force,
            },
            PushDelivery::AtPosition(position) => EngineCommand::ApplyForceAtPosition {
                id: self.object_id,
                force: self.force,
                position: *position,
            },
        }
    }

    /// Sent with the initialization batch instead of on a later frame.
    pub fn at_init(&self) -> bool {
        self.frame == 0
    }

    pub fn magnitude(&self) -> f64 {
        self.force.norm()
    }

    pub fn position(&self) -> Option<Vec3> {
        match self.delivery {
            PushDelivery::WholeObject => None,
            PushDelivery::AtPosition(p) => Some(p),
        }
    }
}

/// The object receiving the push.
#[derive(Debug, Clone, PartialEq)]
pub struct PushedObject {
    pub id: u32,
    pub mass: f64,
    pub position: Vec3,
    /// Euler degrees; only yaw is used.
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// Draw order: vertical component, azimuth, magnitude, offset jitter (x, y, z,
/// point delivery only), wait.
///
/// `follow_yaw` turns the push with the object's yaw; `whole_object` selects
/// centre-of-mass delivery, used when a ramp makes the contact point unclear.
pub fn schedule_push(
    rng: &mut TrialRng,
    cfg: &ForceConfig,
    pushed: &PushedObject,
    follow_yaw: bool,
    whole_object: bool,
) -> PushForce {
    let up = rng.in_range(&cfg.up_force);
    let theta = rng.in_range(&cfg.angle).to_radians();
    let magnitude = rng.in_range(&cfg.scale.scaled(pushed.mass));

    let direction = Vec3::new(theta.cos(), up, theta.sin()).normalize();
    let mut force = direction * magnitude;
    if follow_yaw {
        force = rotate_parallel_to_floor(&force, -pushed.rotation.y);
    }

    let delivery = if whole_object {
        PushDelivery::WholeObject
    } else {
        let extent = rotate_parallel_to_floor(&pushed.scale, pushed.rotation.y);
        let offset = Vec3::new(cfg.offset[0], cfg.offset[1], cfg.offset[2]).component_mul(&extent);
        let jitter = Vec3::new(
            rng.jitter(cfg.offset_jitter),
            rng.jitter(cfg.offset_jitter),
            rng.jitter(cfg.offset_jitter),
        );
        PushDelivery::AtPosition(pushed.position + offset + jitter)
    };

    let frame = rng.truncated(&cfg.wait).max(0) as u32;

    PushForce {
        object_id: pushed.id,
        force,
        delivery,
        frame,
    }
}

// ========== Tests ==========
