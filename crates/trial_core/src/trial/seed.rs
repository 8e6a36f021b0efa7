//! Trial seed derivation.

use crate::random::TrialRng;

/// Upper bound on trials per run; also the seed stride between runs.
pub const MAX_TRIALS: u32 = 1000;

/// Recorded in place of a seed when trials draw from the run-wide stream.
pub const UNSEEDED: i64 = -1;

/// `MAX_TRIALS * seed + trial_num`, or [`UNSEEDED`] when randomized.
pub fn trial_seed(global_seed: u64, trial_num: u32, randomize: bool) -> i64 {
    if randomize {
        return UNSEEDED;
    }
    (global_seed as i64)
        .wrapping_mul(MAX_TRIALS as i64)
        .wrapping_add(trial_num as i64)
}

/// Random stream for one trial.
///
/// A seeded trial gets its own stream; a randomized one forks the run-wide
/// stream, so trials stay distinct but are not reproducible on their own.
pub fn trial_rng(seed: i64, shared: &mut TrialRng) -> TrialRng {
    if seed == UNSEEDED {
        shared.fork()
    } else {
        TrialRng::seeded(seed as u64)
    }
}

// ========== Tests ==========
