//! # trial_core - Procedural Physics Trial Generator
//!
//! Builds randomized physical-interaction scenes (dominoes, collision, tower,
//! containment, rolling, drape, drop), drives them through a physics engine
//! frame by frame and records per-frame labels plus a static section for
//! every trial.
//!
//! ## Features
//! - Deterministic trials: the run seed and trial index fix every draw
//! - One strategy per scenario family over a shared placement pipeline
//! - Engine behind a trait: framed socket transport or an offline stand-in
//! - Compressed, checksummed trial records with an optional JSON mirror

// Placement helpers take the full object description
#![allow(clippy::too_many_arguments)]
// Config structs are built from defaults then adjusted per preset
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::doc_lazy_continuation)]
// Engine commands carry very different payloads
#![allow(clippy::large_enum_variant)]

pub mod catalog;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod force;
pub mod labels;
pub mod layout;
pub mod math;
pub mod random;
pub mod record;
pub mod sampler;
pub mod scenario;
pub mod scene;
pub mod trial;

pub use catalog::{ModelCatalog, ObjectPrototype};
pub use command::EngineCommand;
pub use config::{DataMode, ScenarioConfig, ScenarioKind};
pub use engine::{FrameResponse, FramedEngine, OfflineEngine, PhysicsEngine};
pub use error::{ConfigError, EngineError, RecordError, Result, SamplingError, TrialError};
pub use labels::FrameLabels;
pub use record::{
    DirectoryStore, FieldValue, MemoryStore, RecordStore, RunMetadata, StaticData, TrialRecord,
    TrialSummary,
};
pub use scenario::{strategy_for, ScenarioStrategy};
pub use trial::{RunReport, TrialController};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
