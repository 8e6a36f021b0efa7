//! Scene-mutation commands sent to the physics engine.
//!
//! Serialized as JSON objects tagged by `"$type"`; vectors are written as
//! `{"x", "y", "z"}` maps.

use serde::{Deserialize, Serialize};

use crate::math::{xyz, Rgb, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn opaque(c: Rgb) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 1.0,
        }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type", rename_all = "snake_case")]
pub enum EngineCommand {
    LoadScene {
        name: String,
    },
    AddObject {
        id: u32,
        name: String,
        library: String,
        #[serde(with = "xyz")]
        position: Vec3,
        #[serde(with = "xyz")]
        rotation: Vec3,
    },
    AddFlexSolidObject {
        id: u32,
        name: String,
        #[serde(with = "xyz")]
        position: Vec3,
        #[serde(with = "xyz")]
        rotation: Vec3,
        #[serde(with = "xyz")]
        scale: Vec3,
        mass: f64,
        particle_spacing: f64,
    },
    AddClothObject {
        id: u32,
        name: String,
        #[serde(with = "xyz")]
        position: Vec3,
        #[serde(with = "xyz")]
        rotation: Vec3,
        #[serde(with = "xyz")]
        scale: Vec3,
        tether_stiffness: f64,
        bend_stiffness: f64,
        stretch_stiffness: f64,
    },
    SetMass {
        id: u32,
        mass: f64,
    },
    SetFlexObjectMass {
        id: u32,
        mass: f64,
    },
    SetPhysicMaterial {
        id: u32,
        dynamic_friction: f64,
        static_friction: f64,
        bounciness: f64,
    },
    SetVisualMaterial {
        id: u32,
        material: String,
    },
    ScaleObject {
        id: u32,
        #[serde(with = "xyz")]
        scale_factor: Vec3,
    },
    SetColor {
        id: u32,
        color: Rgba,
    },
    SetObjectCollisionDetectionMode {
        id: u32,
        mode: String,
    },
    SetKinematicState {
        id: u32,
        is_kinematic: bool,
        use_gravity: bool,
    },
    SetObjectDrag {
        id: u32,
        drag: f64,
        angular_drag: f64,
    },
    AddFixedJoint {
        id: u32,
        parent_id: u32,
    },
    ApplyForceToObject {
        id: u32,
        #[serde(with = "xyz")]
        force: Vec3,
    },
    ApplyForceAtPosition {
        id: u32,
        #[serde(with = "xyz")]
        force: Vec3,
        #[serde(with = "xyz")]
        position: Vec3,
    },
    ApplyForceToFlexObject {
        id: u32,
        #[serde(with = "xyz")]
        force: Vec3,
        particle: i32,
    },
    DestroyObject {
        id: u32,
    },
    TeleportAvatarTo {
        #[serde(with = "xyz")]
        position: Vec3,
    },
    LookAtPosition {
        #[serde(with = "xyz")]
        position: Vec3,
    },
    SetFocusDistance {
        focus_distance: f64,
    },
    SendTransforms {
        ids: Vec<u32>,
    },
    SendCollisions {
        enter: bool,
        stay: bool,
        exit: bool,
        environment: bool,
    },
    SendFlexParticles {
        ids: Vec<u32>,
    },
    Terminate,
}

impl EngineCommand {
    pub fn is_push(&self) -> bool {
        matches!(
            self,
            EngineCommand::ApplyForceToObject { .. }
                | EngineCommand::ApplyForceAtPosition { .. }
                | EngineCommand::ApplyForceToFlexObject { .. }
        )
    }

    /// Object the command targets, if any.
    pub fn object_id(&self) -> Option<u32> {
        use EngineCommand::*;
        match self {
            AddObject { id, .. }
            | AddFlexSolidObject { id, .. }
            | AddClothObject { id, .. }
            | SetMass { id, .. }
            | SetFlexObjectMass { id, .. }
            | SetPhysicMaterial { id, .. }
            | SetVisualMaterial { id, .. }
            | ScaleObject { id, .. }
            | SetColor { id, .. }
            | SetObjectCollisionDetectionMode { id, .. }
            | SetKinematicState { id, .. }
            | SetObjectDrag { id, .. }
            | AddFixedJoint { id, .. }
            | ApplyForceToObject { id, .. }
            | ApplyForceAtPosition { id, .. }
            | ApplyForceToFlexObject { id, .. }
            | DestroyObject { id } => Some(*id),
            _ => None,
        }
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_wire_shape() {
        let cmd = EngineCommand::ApplyForceAtPosition {
            id: 3,
            force: Vec3::new(1.0, 0.0, -2.0),
            position: Vec3::new(0.0, 0.5, 0.0),
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["$type"], "apply_force_at_position");
        assert_eq!(value["force"]["z"], -2.0);
        assert_eq!(value["position"]["y"], 0.5);
        assert!(cmd.is_push());
        assert_eq!(cmd.object_id(), Some(3));
    }

    #[test]
    fn test_unit_variant_serializes_tag_only() {
        let value = serde_json::to_value(EngineCommand::Terminate).unwrap();
        assert_eq!(value, serde_json::json!({"$type": "terminate"}));
    }
}
