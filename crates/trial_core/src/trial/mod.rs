//! # Trial lifecycle
//!
//! A run is a sequence of independent trials sharing one engine session.
//! Each trial walks `Configuring -> Initializing -> Running -> Finalizing ->
//! Done`; its random stream is derived from the run seed and its index so a
//! trial can be regenerated on its own.

mod context;
mod controller;
mod phase;
mod seed;

pub use context::{RampInfo, TrialContext};
pub use controller::{init_commands, PlannedTrial, RunReport, TrialController};
pub use phase::{PhaseTracker, TrialPhase};
pub use seed::{trial_rng, trial_seed, MAX_TRIALS, UNSEEDED};
