//! Ramp under the pushed object, with an optional support block.

use crate::catalog::PrototypeBounds;
use crate::math::{ValueRange, Vec3};
use crate::random::TrialRng;

/// Supports shorter than this are not instantiated.
pub const MIN_BASE_HEIGHT: f64 = 0.01;

/// Gap kept between the pushed object and the ramp's top edge.
pub const TOP_EDGE_INSET: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct RampBase {
    pub position: Vec3,
    pub scale: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RampPlacement {
    pub position: Vec3,
    /// Ramp faces the target.
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Sampled support height, kept even when too small to build.
    pub base_height: f64,
    pub base: Option<RampBase>,
    bounds: PrototypeBounds,
}

impl RampPlacement {
    /// Plan a ramp whose foot sits at `pushed_start`, resting on a surface of
    /// height `floor`. Draws only the support height.
    pub fn plan(
        rng: &mut TrialRng,
        bounds: PrototypeBounds,
        pushed_start: Vec3,
        floor: f64,
        axis_length: f64,
        fixed_scale: Option<[f64; 3]>,
        base_height: &ValueRange,
    ) -> Self {
        let scale = match fixed_scale {
            Some([x, y, z]) => Vec3::new(x, y, z),
            None => {
                let sx = 0.75 * axis_length / bounds.length;
                Vec3::new(sx, 1.5 / bounds.height, 0.75 * sx)
            }
        };
        let mut position = Vec3::new(pushed_start.x, floor, pushed_start.z);

        let base_h = rng.in_range(base_height);
        let base = if base_h >= MIN_BASE_HEIGHT {
            let base = RampBase {
                position,
                scale: Vec3::new(
                    scale.x * bounds.length,
                    base_h,
                    scale.z * bounds.depth,
                ),
            };
            position.y += base_h;
            Some(base)
        } else {
            None
        };

        Self {
            position,
            rotation: Vec3::new(0.0, 180.0, 0.0),
            scale,
            base_height: base_h,
            base,
            bounds,
        }
    }

    /// Start position of the pushed object moved onto the ramp's top edge.
    pub fn lift(&self, pushed_start: Vec3) -> Vec3 {
        Vec3::new(
            pushed_start.x - (0.5 * self.scale.x * self.bounds.length - TOP_EDGE_INSET),
            self.scale.y * self.bounds.height + self.base_height + pushed_start.y,
            pushed_start.z,
        )
    }

    /// Height of the ramp's top surface above the floor.
    pub fn top(&self) -> f64 {
        self.position.y + self.scale.y * self.bounds.top
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_bounds() -> PrototypeBounds {
        PrototypeBounds::boxed(2.0, 0.6, 1.0)
    }

    #[test]
    fn test_derived_scale_and_lift() {
        let mut rng = TrialRng::seeded(1);
        let start = Vec3::new(-1.0, 0.0, 0.0);
        let ramp = RampPlacement::plan(
            &mut rng,
            ramp_bounds(),
            start,
            0.01,
            2.0,
            None,
            &ValueRange::fixed(0.0),
        );
        assert!((ramp.scale.x - 0.75).abs() < 1e-12);
        assert!((ramp.scale.y - 2.5).abs() < 1e-12);
        assert!(ramp.base.is_none());
        assert_eq!(ramp.position.y, 0.01);

        let lifted = ramp.lift(start);
        assert!((lifted.x - (-1.0 - 0.6)).abs() < 1e-12);
        assert!((lifted.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_base_raises_ramp() {
        let mut rng = TrialRng::seeded(1);
        let start = Vec3::new(-0.575, 0.0, 0.0);
        let ramp = RampPlacement::plan(
            &mut rng,
            ramp_bounds(),
            start,
            0.0,
            1.15,
            Some([0.2, 0.25, 0.5]),
            &ValueRange::fixed(0.3),
        );
        let base = ramp.base.as_ref().unwrap();
        assert_eq!(base.position.y, 0.0);
        assert!((base.scale.x - 0.4).abs() < 1e-12);
        assert!((ramp.position.y - 0.3).abs() < 1e-12);
        assert!((ramp.lift(start).y - (0.15 + 0.3)).abs() < 1e-12);
    }
}
