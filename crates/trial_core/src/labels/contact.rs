use crate::engine::FrameResponse;
use crate::math::Vec3;

use super::MOTION_THRESHOLD;

/// Sticky ground contact of the target.
///
/// Each frame is compared with the one before it. Contact is asserted once
/// the point count changes or a matched point shifts by more than
/// [`MOTION_THRESHOLD`], and is never cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundContactTracker {
    previous: Option<Vec<Vec3>>,
    on_ground: bool,
}

impl GroundContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, points: &[Vec3]) -> bool {
        if let Some(previous) = &self.previous {
            let changed = points.len() != previous.len()
                || points
                    .iter()
                    .zip(previous.iter())
                    .any(|(p, q)| (p - q).norm() > MOTION_THRESHOLD);
            self.on_ground |= changed;
        }
        self.previous = Some(points.to_vec());
        self.on_ground
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }
}

/// Any contact point between target and zone this frame.
pub fn zone_contact(resp: &FrameResponse, target: u32, zone: u32) -> bool {
    !resp.contact_points(target, zone).is_empty()
}

// ========== Tests ==========
