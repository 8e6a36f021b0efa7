//! Scene objects instantiated for a single trial.

use serde::{Deserialize, Serialize};

use crate::catalog::PrototypeBounds;
use crate::command::{EngineCommand, Rgba};
use crate::error::{Result, TrialError};
use crate::math::{Rgb, Vec3};
use crate::sampler::SampledObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectRole {
    Target,
    Probe,
    Zone,
    Middle,
    Distractor,
    Occluder,
    Ramp,
    RampBase,
    Ledge,
    Base,
    Attachment,
    Cap,
    Anchor,
    Drape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub dynamic_friction: f64,
    pub static_friction: f64,
    pub bounciness: f64,
}

impl PhysicsMaterial {
    pub const fn new(dynamic_friction: f64, static_friction: f64, bounciness: f64) -> Self {
        Self {
            dynamic_friction,
            static_friction,
            bounciness,
        }
    }
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.0)
    }
}

/// How the engine should simulate the object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyKind {
    Rigid,
    FlexSolid {
        particle_spacing: f64,
    },
    Cloth {
        tether_stiffness: f64,
        bend_stiffness: f64,
        stretch_stiffness: f64,
    },
}

/// One placed object of a trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectSpec {
    pub id: u32,
    pub role: ObjectRole,
    pub model: String,
    pub library: String,
    pub position: Vec3,
    /// Euler angles, degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Rgb,
    pub mass: f64,
    pub physics: PhysicsMaterial,
    pub material: Option<String>,
    pub kinematic: bool,
    pub body: BodyKind,
    pub bounds: PrototypeBounds,
    /// Recorded but never sent to the engine.
    pub removed: bool,
}

impl SceneObjectSpec {
    pub fn from_sample(sample: SampledObject, role: ObjectRole) -> Self {
        let removed = !sample.has_positive_scale();
        Self {
            id: sample.id,
            role,
            model: sample.prototype.name,
            library: sample.prototype.library,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: sample.scale,
            color: sample.color,
            mass: 1.0,
            physics: PhysicsMaterial::default(),
            material: None,
            kinematic: false,
            body: BodyKind::Rigid,
            bounds: sample.prototype.bounds,
            removed,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsMaterial) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_material(mut self, material: Option<String>) -> Self {
        self.material = material;
        self
    }

    pub fn kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }

    pub fn with_body(mut self, body: BodyKind) -> Self {
        self.body = body;
        self
    }

    pub fn removed_if(mut self, removed: bool) -> Self {
        self.removed |= removed;
        self
    }

    /// Bounding extents after scaling.
    pub fn scaled_dimensions(&self) -> Vec3 {
        self.bounds.dimensions().component_mul(&self.scale)
    }

    /// Commands that create the object in the engine. Removed objects emit nothing.
    pub fn init_commands(&self) -> Vec<EngineCommand> {
        if self.removed {
            return Vec::new();
        }
        let id = self.id;
        let mut cmds = Vec::new();
        match self.body {
            BodyKind::Rigid => {
                cmds.push(EngineCommand::AddObject {
                    id,
                    name: self.model.clone(),
                    library: self.library.clone(),
                    position: self.position,
                    rotation: self.rotation,
                });
                cmds.push(EngineCommand::SetMass { id, mass: self.mass });
                cmds.push(EngineCommand::SetPhysicMaterial {
                    id,
                    dynamic_friction: self.physics.dynamic_friction,
                    static_friction: self.physics.static_friction,
                    bounciness: self.physics.bounciness,
                });
                cmds.push(EngineCommand::ScaleObject {
                    id,
                    scale_factor: self.scale,
                });
            }
            BodyKind::FlexSolid { particle_spacing } => {
                cmds.push(EngineCommand::AddFlexSolidObject {
                    id,
                    name: self.model.clone(),
                    position: self.position,
                    rotation: self.rotation,
                    scale: self.scale,
                    mass: self.mass,
                    particle_spacing,
                });
            }
            BodyKind::Cloth {
                tether_stiffness,
                bend_stiffness,
                stretch_stiffness,
            } => {
                cmds.push(EngineCommand::AddClothObject {
                    id,
                    name: self.model.clone(),
                    position: self.position,
                    rotation: self.rotation,
                    scale: self.scale,
                    tether_stiffness,
                    bend_stiffness,
                    stretch_stiffness,
                });
                cmds.push(EngineCommand::SetFlexObjectMass { id, mass: self.mass });
            }
        }
        if let Some(material) = &self.material {
            cmds.push(EngineCommand::SetVisualMaterial {
                id,
                material: material.clone(),
            });
        }
        cmds.push(EngineCommand::SetColor {
            id,
            color: Rgba::opaque(self.color),
        });
        if self.kinematic {
            cmds.push(EngineCommand::SetObjectCollisionDetectionMode {
                id,
                mode: "continuous_speculative".to_string(),
            });
            cmds.push(EngineCommand::SetKinematicState {
                id,
                is_kinematic: true,
                use_gravity: true,
            });
        }
        cmds
    }
}

/// Every object of the current trial, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    objects: Vec<SceneObjectSpec>,
    next_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, spec: SceneObjectSpec) -> Result<u32> {
        if self.objects.iter().any(|o| o.id == spec.id) {
            return Err(TrialError::DuplicateObjectId(spec.id));
        }
        let id = spec.id;
        self.objects.push(spec);
        Ok(id)
    }

    pub fn objects(&self) -> &[SceneObjectSpec] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&SceneObjectSpec> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut SceneObjectSpec> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn with_role(&self, role: ObjectRole) -> impl Iterator<Item = &SceneObjectSpec> {
        self.objects.iter().filter(move |o| o.role == role)
    }

    /// First object with `role` that is present in the engine.
    pub fn active(&self, role: ObjectRole) -> Option<&SceneObjectSpec> {
        self.with_role(role).find(|o| !o.removed)
    }

    /// Ids of every object that exists in the engine.
    pub fn active_ids(&self) -> Vec<u32> {
        self.objects
            .iter()
            .filter(|o| !o.removed)
            .map(|o| o.id)
            .collect()
    }
}

// ========== Tests ==========
