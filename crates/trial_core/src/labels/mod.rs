//! # Frame labels
//!
//! Per-frame outcome values derived from the engine response. The trackers
//! in this module carry state across the frames of one trial and are rebuilt
//! for every trial.
//!
//! Rules:
//! - `target_has_moved` and `target_on_ground` never go back to `false`
//! - `did_fall` is `false` until the push frame and the warm-up have passed

mod collapse;
mod contact;
mod motion;
mod particles;

pub use collapse::CollapseTracker;
pub use contact::{zone_contact, GroundContactTracker};
pub use motion::MotionTracker;
pub use particles::{min_pairwise_distance, ParticleProximity};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Displacement under which an object counts as still.
pub const MOTION_THRESHOLD: f64 = 0.01;

pub mod names {
    pub const HAS_TARGET: &str = "has_target";
    pub const HAS_ZONE: &str = "has_zone";
    pub const TARGET_DELTA_POSITION: &str = "target_delta_position";
    pub const TARGET_HAS_MOVED: &str = "target_has_moved";
    pub const TARGET_ON_GROUND: &str = "target_on_ground";
    pub const TARGET_CONTACTING_ZONE: &str = "target_contacting_zone";
    pub const DID_FALL: &str = "did_fall";
    pub const FALL_FRAME: &str = "fall_frame";
    pub const MIN_DISTANCE_TARGET_TO_ZONE: &str = "minimum_distance_target_to_zone";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vector([f64; 3]),
}

impl From<bool> for LabelValue {
    fn from(v: bool) -> Self {
        LabelValue::Bool(v)
    }
}

impl From<i64> for LabelValue {
    fn from(v: i64) -> Self {
        LabelValue::Int(v)
    }
}

impl From<u32> for LabelValue {
    fn from(v: u32) -> Self {
        LabelValue::Int(v as i64)
    }
}

impl From<f64> for LabelValue {
    fn from(v: f64) -> Self {
        LabelValue::Float(v)
    }
}

impl From<Vec3> for LabelValue {
    fn from(v: Vec3) -> Self {
        LabelValue::Vector([v.x, v.y, v.z])
    }
}

impl LabelValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LabelValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LabelValue::Float(v) => Some(*v),
            LabelValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// Sparse label map of one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameLabels {
    pub frame: u32,
    pub values: BTreeMap<String, LabelValue>,
}

impl FrameLabels {
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<LabelValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&LabelValue> {
        self.values.get(name)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(LabelValue::as_bool)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(LabelValue::as_f64)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_values_keep_their_type() {
        let mut labels = FrameLabels::new(4);
        labels.insert(names::TARGET_HAS_MOVED, true);
        labels.insert(names::FALL_FRAME, 12u32);
        labels.insert(names::MIN_DISTANCE_TARGET_TO_ZONE, 0.25);
        labels.insert(names::TARGET_DELTA_POSITION, Vec3::new(0.1, 0.0, 0.0));

        let json = serde_json::to_string(&labels).unwrap();
        let back: FrameLabels = serde_json::from_str(&json).unwrap();
        assert_eq!(back, labels);
        assert_eq!(back.flag(names::TARGET_HAS_MOVED), Some(true));
        assert_eq!(back.number(names::FALL_FRAME), Some(12.0));
        assert_eq!(back.flag(names::DID_FALL), None);
    }
}
