//! # Layout
//!
//! Functional objects sit on a single collision axis along x: the probe at
//! `-length / 2`, the target at `+length / 2`. Each scenario picks a
//! [`ZoneRule`] for the zone. Middle objects advance from the probe side
//! towards the target with multiplicative jitter ([`MiddleRow`]).
//!
//! Decorative placement lives in [`decorative`], the camera in [`camera`]
//! and the optional ramp in [`ramp`].

pub mod camera;
pub mod decorative;
pub mod ramp;

pub use camera::CameraPose;
pub use decorative::{DecorKind, DecorParams, DecorPlacement, DecorPlanner, OcclusionLayoutState};
pub use ramp::{RampBase, RampPlacement};

use tracing::warn;

use crate::math::Vec3;
use crate::random::TrialRng;

/// Gap between the target's far face and the zone's near face.
pub const ZONE_CLEARANCE: f64 = 0.1;

pub fn target_position(axis_length: f64) -> Vec3 {
    Vec3::new(0.5 * axis_length, 0.0, 0.0)
}

pub fn probe_position(axis_length: f64, lift: f64) -> Vec3 {
    Vec3::new(-0.5 * axis_length, lift, 0.0)
}

/// Where a scenario puts its zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneRule {
    /// Just beyond the target, clear of it by [`ZONE_CLEARANCE`].
    BeyondTarget,
    /// At `x = length` with uniform lateral jitter.
    AxisEnd { lateral_jitter: f64 },
    /// Centred under the structure.
    Origin,
    /// Between two anchors, at a random fraction of their distance from the far one.
    BetweenAnchors {
        min_anchor: f64,
        max_anchor: f64,
        min_ratio: f64,
        max_ratio: f64,
    },
}

impl ZoneRule {
    /// Zone centre for a zone of `scale` on an axis of `axis_length`.
    ///
    /// Only the jittered rules draw from `rng`.
    pub fn locate(&self, rng: &mut TrialRng, scale: &Vec3, axis_length: f64) -> Vec3 {
        match *self {
            ZoneRule::BeyondTarget => {
                Vec3::new(0.5 * axis_length + scale.x + ZONE_CLEARANCE, 0.0, 0.0)
            }
            ZoneRule::AxisEnd { lateral_jitter } => {
                Vec3::new(axis_length, 0.0, rng.jitter(lateral_jitter))
            }
            ZoneRule::Origin => Vec3::zeros(),
            ZoneRule::BetweenAnchors {
                min_anchor,
                max_anchor,
                min_ratio,
                max_ratio,
            } => {
                let ratio = rng.uniform(min_ratio, max_ratio);
                let x = max_anchor - ratio * (max_anchor - min_anchor);
                let z = rng.uniform(-0.2, 0.4);
                Vec3::new(x, 0.0, z)
            }
        }
    }
}

/// One slot produced by [`MiddleRow::next_slot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSlot {
    pub index: usize,
    /// Position along x.
    pub offset: f64,
    /// Slot left empty by `remove_middle`.
    pub skipped: bool,
}

/// Evenly spaced, jittered offsets between probe and target.
#[derive(Debug, Clone)]
pub struct MiddleRow {
    offset: f64,
    spacing: f64,
    jitter: f64,
    min_offset: f64,
    max_offset: f64,
    count: usize,
    next: usize,
    skip: Option<usize>,
    exhausted: bool,
}

impl MiddleRow {
    /// `target_length` is the target's scaled extent along x; it keeps the
    /// row clear of both ends.
    pub fn new(axis_length: f64, target_length: f64, count: usize, spacing_jitter: f64) -> Self {
        let start = -0.5 * axis_length;
        Self {
            offset: start,
            spacing: axis_length / (count as f64 + 1.0),
            jitter: spacing_jitter,
            min_offset: start + target_length,
            max_offset: 0.5 * axis_length - target_length,
            count,
            next: 0,
            skip: None,
            exhausted: false,
        }
    }

    /// Pick the slot that stays empty. Draws only when `remove` is set.
    pub fn with_random_skip(mut self, rng: &mut TrialRng, remove: bool) -> Self {
        if remove {
            self.skip = rng.index(self.count);
        }
        self
    }

    pub fn skipped_index(&self) -> Option<usize> {
        self.skip
    }

    /// Advance to the next slot. Returns `None` once every slot is used or the
    /// next offset would leave the valid range; the remaining slots are dropped.
    pub fn next_slot(&mut self, rng: &mut TrialRng) -> Option<RowSlot> {
        if self.exhausted || self.next >= self.count {
            return None;
        }
        let step = self.spacing * rng.uniform(1.0 - self.jitter, 1.0 + self.jitter);
        self.offset = (self.offset + step).max(self.min_offset);
        if self.offset >= self.max_offset {
            warn!(
                placed = self.next,
                requested = self.count,
                offset = self.offset,
                "middle row ran past the target, skipping remaining objects"
            );
            self.exhausted = true;
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(RowSlot {
            index,
            offset: self.offset,
            skipped: self.skip == Some(index),
        })
    }
}

/// Lay an upright middle object on its side around its yaw.
///
/// Returns the shifted position and the rotation with `z = 90`.
pub fn lay_on_side(position: Vec3, rotation: Vec3, height: f64) -> (Vec3, Vec3) {
    let yaw = rotation.y.to_radians();
    let mut pos = position;
    pos.z -= yaw.sin() * height * 0.5;
    pos.x += yaw.cos() * height * 0.5;
    (pos, Vec3::new(rotation.x, rotation.y, 90.0))
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beyond_target_zone_ignores_rng() {
        let scale = Vec3::new(0.5, 0.01, 2.0);
        let a = ZoneRule::BeyondTarget.locate(&mut TrialRng::seeded(1), &scale, 2.0);
        let b = ZoneRule::BeyondTarget.locate(&mut TrialRng::seeded(99), &scale, 2.0);
        assert_eq!(a, b);
        assert!((a.x - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_axis_end_jitter_bounded() {
        let mut rng = TrialRng::seeded(5);
        let rule = ZoneRule::AxisEnd {
            lateral_jitter: 0.35,
        };
        for _ in 0..50 {
            let p = rule.locate(&mut rng, &Vec3::new(1.0, 0.01, 1.0), 2.0);
            assert_eq!(p.x, 2.0);
            assert!(p.z.abs() <= 0.35);
        }
    }

    #[test]
    fn test_between_anchors_stays_between() {
        let rule = ZoneRule::BetweenAnchors {
            min_anchor: -0.4,
            max_anchor: 0.4,
            min_ratio: 0.2,
            max_ratio: 0.8,
        };
        let mut rng = TrialRng::seeded(8);
        for _ in 0..50 {
            let p = rule.locate(&mut rng, &Vec3::repeat(0.5), 1.0);
            assert!(p.x >= -0.4 && p.x <= 0.4);
        }
    }

    #[test]
    fn test_row_offsets_increase_within_range() {
        let mut rng = TrialRng::seeded(3);
        let mut row = MiddleRow::new(2.0, 0.1, 3, 0.2);
        let mut last = f64::NEG_INFINITY;
        let mut n = 0;
        while let Some(slot) = row.next_slot(&mut rng) {
            assert!(slot.offset > last);
            assert!(slot.offset < 0.9);
            last = slot.offset;
            n += 1;
        }
        assert_eq!(n, 3);
    }

    #[test]
    fn test_row_overflow_drops_remaining_slots() {
        let mut rng = TrialRng::seeded(3);
        // Steps of 0.375 from -1: clamped to -0.6, then -0.225, 0.15, 0.525, stop at 0.9.
        let mut row = MiddleRow::new(2.0, 0.4, 7, 0.0);
        row.spacing *= 1.5;
        let placed: Vec<RowSlot> = std::iter::from_fn(|| row.next_slot(&mut rng)).collect();
        assert_eq!(placed.len(), 4);
        assert!((placed[0].offset + 0.6).abs() < 1e-12);
        assert!(row.next_slot(&mut rng).is_none());
    }

    #[test]
    fn test_skip_marks_one_slot() {
        let mut rng = TrialRng::seeded(12);
        let mut row = MiddleRow::new(2.0, 0.1, 3, 0.0).with_random_skip(&mut rng, true);
        let skip = row.skipped_index().unwrap();
        let slots: Vec<RowSlot> = std::iter::from_fn(|| row.next_slot(&mut rng)).collect();
        assert_eq!(slots.iter().filter(|s| s.skipped).count(), 1);
        assert!(slots[skip].skipped);
    }

    #[test]
    fn test_lay_on_side_shifts_along_yaw() {
        let (pos, rot) = lay_on_side(Vec3::zeros(), Vec3::zeros(), 0.5);
        assert!((pos.x - 0.25).abs() < 1e-12);
        assert!(pos.z.abs() < 1e-12);
        assert_eq!(rot.z, 90.0);
    }
}
