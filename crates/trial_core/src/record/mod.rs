//! # Trial records
//!
//! One record per trial: a static section written once when the trial is
//! finalized and one sparse label map per simulated frame. Readers must
//! tolerate absent fields in both sections.

mod format;
mod store;

pub use format::{decode_record, encode_record, RECORD_VERSION};
pub use store::{DirectoryStore, MemoryStore, RecordStore, RunMetadata};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::labels::{names, FrameLabels};
use crate::math::Vec3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Names(Vec<String>),
    Ints(Vec<i64>),
    Vector([f64; 3]),
    Vectors(Vec<[f64; 3]>),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Vec3> for FieldValue {
    fn from(v: Vec3) -> Self {
        FieldValue::Vector([v.x, v.y, v.z])
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::Names(v)
    }
}

impl From<Vec<u32>> for FieldValue {
    fn from(v: Vec<u32>) -> Self {
        FieldValue::Ints(v.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<Vec3>> for FieldValue {
    fn from(v: Vec<Vec3>) -> Self {
        FieldValue::Vectors(v.iter().map(|p| [p.x, p.y, p.z]).collect())
    }
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&[String]> {
        match self {
            FieldValue::Names(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            FieldValue::Ints(v) => Some(v),
            _ => None,
        }
    }
}

/// Per-trial metadata keyed by field name.
///
/// Writing a key again replaces its value, so finalizing twice yields the
/// same field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticData {
    fields: BTreeMap<String, FieldValue>,
}

impl StaticData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Skip the field when the source value is absent.
    pub fn set_opt<T: Into<FieldValue>>(&mut self, name: &str, value: Option<T>) {
        if let Some(v) = value {
            self.set(name, v);
        }
    }

    /// Copy every field of `other`, replacing existing keys.
    pub fn merge(&mut self, other: &StaticData) {
        for (k, v) in &other.fields {
            self.fields.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub version: u32,
    pub trial_num: u32,
    #[serde(default)]
    pub static_data: StaticData,
    #[serde(default)]
    pub frames: Vec<FrameLabels>,
}

impl TrialRecord {
    pub fn new(trial_num: u32) -> Self {
        Self {
            version: RECORD_VERSION,
            trial_num,
            static_data: StaticData::new(),
            frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, labels: FrameLabels) {
        self.frames.push(labels);
    }

    /// True if any frame carries `label = true`.
    pub fn any_frame(&self, label: &str) -> Option<bool> {
        let mut seen = false;
        let mut any = false;
        for frame in &self.frames {
            if let Some(v) = frame.flag(label) {
                seen = true;
                any |= v;
            }
        }
        seen.then_some(any)
    }

    pub fn last_number(&self, label: &str) -> Option<f64> {
        self.frames.iter().rev().find_map(|f| f.number(label))
    }
}

/// Trial-level aggregates for analysis. Absent fields become `None` or 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trial_num: u32,
    pub room: Option<String>,
    pub trial_seed: Option<i64>,
    pub push_time: i64,
    pub num_distractors: usize,
    pub num_occluders: usize,
    pub num_middle_objects: Option<i64>,
    pub remove_middle: Option<bool>,
    pub num_frames: usize,
    pub target_moved: Option<bool>,
    pub target_contacted_zone: Option<bool>,
    pub did_fall: Option<bool>,
    pub min_distance_target_to_zone: Option<f64>,
}

impl TrialSummary {
    pub fn from_record(record: &TrialRecord) -> Self {
        let s = &record.static_data;
        let count = |name: &str| {
            s.get(name)
                .and_then(FieldValue::as_names)
                .map(|n| n.len())
                .unwrap_or(0)
        };
        Self {
            trial_num: record.trial_num,
            room: s.get("room").and_then(FieldValue::as_str).map(str::to_string),
            trial_seed: s.get("trial_seed").and_then(FieldValue::as_i64),
            push_time: s.get("push_time").and_then(FieldValue::as_i64).unwrap_or(0),
            num_distractors: count("distractors"),
            num_occluders: count("occluders"),
            num_middle_objects: s.get("num_middle_objects").and_then(FieldValue::as_i64),
            remove_middle: s.get("remove_middle").and_then(FieldValue::as_bool),
            num_frames: record.frames.len(),
            target_moved: record.any_frame(names::TARGET_HAS_MOVED),
            target_contacted_zone: record.any_frame(names::TARGET_CONTACTING_ZONE),
            did_fall: record.any_frame(names::DID_FALL),
            min_distance_target_to_zone: s
                .get(names::MIN_DISTANCE_TARGET_TO_ZONE)
                .and_then(FieldValue::as_f64),
        }
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_idempotent() {
        let mut a = StaticData::new();
        for _ in 0..2 {
            a.set("room", "box");
            a.set("trial_seed", 1002i64);
            a.set_opt("probe_id", Some(3u32));
            a.set_opt::<u32>("ramp_id", None);
        }
        assert_eq!(a.len(), 3);
        assert!(!a.contains("ramp_id"));
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["probe_id", "room", "trial_seed"]);
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let record = TrialRecord::new(4);
        let summary = TrialSummary::from_record(&record);
        assert_eq!(summary.trial_num, 4);
        assert_eq!(summary.push_time, 0);
        assert_eq!(summary.num_distractors, 0);
        assert_eq!(summary.room, None);
        assert_eq!(summary.target_moved, None);
    }

    #[test]
    fn test_summary_aggregates_frames() {
        let mut record = TrialRecord::new(0);
        record.static_data.set("room", "tdw");
        record.static_data.set("push_time", 15u32);
        record
            .static_data
            .set("distractors", vec!["wood_chair".to_string(), "buddah".to_string()]);
        for (frame, moved) in [(0u32, false), (1, true), (2, true)] {
            let mut labels = FrameLabels::new(frame);
            labels.insert(names::TARGET_HAS_MOVED, moved);
            record.push_frame(labels);
        }
        let summary = TrialSummary::from_record(&record);
        assert_eq!(summary.room.as_deref(), Some("tdw"));
        assert_eq!(summary.push_time, 15);
        assert_eq!(summary.num_distractors, 2);
        assert_eq!(summary.num_frames, 3);
        assert_eq!(summary.target_moved, Some(true));
        assert_eq!(summary.did_fall, None);
    }

    #[test]
    fn test_field_value_json_shapes() {
        let mut data = StaticData::new();
        data.set("push_force", Vec3::new(1.0, 0.0, -2.0));
        data.set("occluders", Vec::<String>::new());
        data.set("probe_mass", 2.5);
        let json = serde_json::to_string(&data).unwrap();
        let back: StaticData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert_eq!(
            back.get("push_force"),
            Some(&FieldValue::Vector([1.0, 0.0, -2.0]))
        );
    }

    #[test]
    fn test_id_lists_stay_integers() {
        let mut data = StaticData::new();
        data.set("object_ids", vec![1u32, 2, 3]);
        data.set(
            "object_positions",
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.5)],
        );
        let json = serde_json::to_string(&data).unwrap();
        let back: StaticData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("object_ids").and_then(FieldValue::as_ints), Some(&[1, 2, 3][..]));
        assert_eq!(back, data);
    }
}
