use crate::math::Vec3;

use super::MOTION_THRESHOLD;

/// Cumulative displacement of one object and the sticky "has moved" flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionTracker {
    last: Option<Vec3>,
    delta: Vec3,
    moved: bool,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the object's position for this frame; `None` if it was not reported.
    pub fn observe(&mut self, position: Option<Vec3>) {
        if let Some(p) = position {
            if let Some(last) = self.last {
                self.delta += p - last;
            }
            self.last = Some(p);
        }
        if self.delta.norm() > MOTION_THRESHOLD {
            self.moved = true;
        }
    }

    /// Displacement since the first observed position.
    pub fn delta(&self) -> Vec3 {
        self.delta
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }
}

// ========== Tests ==========
