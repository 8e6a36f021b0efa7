//! Per-trial lifecycle.
//!
//! `Configuring -> Initializing -> Running -> Finalizing -> Done`, then back
//! to `Configuring` for the next trial.

use crate::error::{Result, TrialError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialPhase {
    #[default]
    Configuring,
    Initializing,
    Running,
    Finalizing,
    Done,
}

impl TrialPhase {
    pub fn name(self) -> &'static str {
        match self {
            TrialPhase::Configuring => "configuring",
            TrialPhase::Initializing => "initializing",
            TrialPhase::Running => "running",
            TrialPhase::Finalizing => "finalizing",
            TrialPhase::Done => "done",
        }
    }

    /// The only legal successor.
    pub fn next(self) -> TrialPhase {
        match self {
            TrialPhase::Configuring => TrialPhase::Initializing,
            TrialPhase::Initializing => TrialPhase::Running,
            TrialPhase::Running => TrialPhase::Finalizing,
            TrialPhase::Finalizing => TrialPhase::Done,
            TrialPhase::Done => TrialPhase::Configuring,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, TrialPhase::Configuring | TrialPhase::Done)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    phase: TrialPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn advance_to(&mut self, to: TrialPhase) -> Result<()> {
        if self.phase.next() != to {
            return Err(TrialError::PhaseTransition {
                from: self.phase.name().to_string(),
                to: to.name().to_string(),
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Back to `Configuring` from any phase, e.g. after a failed trial.
    pub fn reset(&mut self) {
        self.phase = TrialPhase::Configuring;
    }
}

// ========== Tests ==========
