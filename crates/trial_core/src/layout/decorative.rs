//! Greedy placement of distractors (behind the action) and occluders (between
//! the camera and the action).
//!
//! Objects are placed one at a time. Each is clamped into its size range,
//! pushed off the collision axis, then checked against its immediate
//! predecessor only. Occluders are finally stretched towards the camera's
//! line of sight.
//!
//! Rules:
//! - the overall extent stays inside `[min_size, max_size]`; a shrink that
//!   would go below `min_size` stops there and the object is moved instead
//! - an object never reaches past the near x edge of the previous object
//!   of the same sequence

use crate::math::{linspace, rotate_parallel_to_floor, sign, ValueRange, Vec3};
use crate::random::TrialRng;
use crate::scene::ObjectRole;

use super::camera::CameraPose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorKind {
    Distractor,
    Occluder,
}

impl DecorKind {
    pub fn name(self) -> &'static str {
        match self {
            DecorKind::Distractor => "distractor",
            DecorKind::Occluder => "occluder",
        }
    }

    pub fn role(self) -> ObjectRole {
        match self {
            DecorKind::Distractor => ObjectRole::Distractor,
            DecorKind::Occluder => ObjectRole::Occluder,
        }
    }
}

/// Per-scenario placement parameters of one decorative sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorParams {
    /// Degrees between neighbouring directions, halved on each side.
    pub angular_spacing: f64,
    /// Distance from the origin as a fraction of the camera's floor radius.
    pub distance_fraction: ValueRange,
    pub rotation_jitter: f64,
    /// Closest the object may come to the collision axis.
    pub min_z: f64,
    pub min_size: f64,
    pub max_size: f64,
    /// Stretch the height towards the camera's line of sight.
    pub rescale_height: bool,
}

impl DecorParams {
    pub fn distractors(middle_depth: f64) -> Self {
        Self {
            angular_spacing: 15.0,
            distance_fraction: ValueRange::new(0.4, 1.0),
            rotation_jitter: 30.0,
            min_z: middle_depth + 0.25,
            min_size: 0.5,
            max_size: 1.5,
            rescale_height: false,
        }
    }

    pub fn occluders(middle_depth: f64) -> Self {
        Self {
            angular_spacing: 10.0,
            distance_fraction: ValueRange::new(0.6, 0.8),
            rotation_jitter: 30.0,
            min_z: middle_depth + 0.25,
            min_size: 0.25,
            max_size: 1.5,
            rescale_height: true,
        }
    }

    pub fn with_spacing(mut self, degrees: f64) -> Self {
        self.angular_spacing = degrees;
        self
    }

    pub fn with_sizes(mut self, min_size: f64, max_size: f64) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_min_z(mut self, min_z: f64) -> Self {
        self.min_z = min_z;
        self
    }
}

/// Result of placing one decorative object.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorPlacement {
    pub position: Vec3,
    /// Euler degrees; only yaw is set.
    pub rotation: Vec3,
    /// Uniform scale factor applied to the prototype.
    pub scale: f64,
    /// World-aligned extents after scaling.
    pub bounds: Vec3,
}

/// Positions and extents of the objects placed so far in one sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcclusionLayoutState {
    positions: Vec<Vec3>,
    dimensions: Vec<Vec3>,
}

impl OcclusionLayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn dimensions(&self) -> &[Vec3] {
        &self.dimensions
    }

    pub fn last(&self) -> Option<(Vec3, Vec3)> {
        match (self.positions.last(), self.dimensions.last()) {
            (Some(p), Some(d)) => Some((*p, *d)),
            _ => None,
        }
    }

    fn record(&mut self, placement: &DecorPlacement) {
        self.positions.push(placement.position);
        self.dimensions.push(placement.bounds);
    }
}

fn max_extent(v: &Vec3) -> f64 {
    v.x.max(v.y).max(v.z)
}

/// Places one decorative sequence for a fixed camera.
#[derive(Debug, Clone)]
pub struct DecorPlanner<'a> {
    pub kind: DecorKind,
    pub params: DecorParams,
    pub camera: &'a CameraPose,
    /// Fraction of the line of sight an occluder should reach.
    pub occlusion_scale: f64,
}

impl<'a> DecorPlanner<'a> {
    pub fn new(kind: DecorKind, params: DecorParams, camera: &'a CameraPose) -> Self {
        Self {
            kind,
            params,
            camera,
            occlusion_scale: 1.0,
        }
    }

    pub fn with_occlusion_scale(mut self, scale: f64) -> Self {
        self.occlusion_scale = scale;
        self
    }

    /// Floor-plane unit directions, evenly spread around the reference ray.
    pub fn directions(&self, count: usize) -> Vec<Vec3> {
        let spread = self.params.angular_spacing * count.saturating_sub(1) as f64;
        let (reference, max_theta) = match self.kind {
            DecorKind::Distractor => (
                self.camera.opposite,
                spread * sign(self.camera.opposite.z),
            ),
            DecorKind::Occluder => (self.camera.ray, spread),
        };
        linspace(-max_theta, max_theta, count)
            .into_iter()
            .map(|theta| rotate_parallel_to_floor(&reference, theta))
            .collect()
    }

    /// Place one object of raw extents `dims` in direction `unit`.
    ///
    /// Draw order: yaw, distance fraction.
    pub fn place(
        &self,
        rng: &mut TrialRng,
        state: &mut OcclusionLayoutState,
        dims: Vec3,
        unit: Vec3,
    ) -> DecorPlacement {
        let p = &self.params;
        let center = match self.kind {
            DecorKind::Distractor => {
                if self.camera.rotation > 0.0 {
                    0.0
                } else {
                    180.0
                }
            }
            DecorKind::Occluder => self.camera.rotation,
        };
        let yaw = rng.uniform(center - p.rotation_jitter, center + p.rotation_jitter);
        let mut bounds = rotate_parallel_to_floor(&dims, yaw).abs().sup(&dims);

        let mut scale = 1.0;
        let extent = max_extent(&bounds);
        if extent > 0.0 {
            let s = extent.clamp(p.min_size, p.max_size) / extent;
            bounds *= s;
            scale *= s;
        }

        let fraction = rng.in_range(&p.distance_fraction);
        let mut position = unit * (fraction * self.camera.radius);
        let side = if position.z < 0.0 { -1.0 } else { 1.0 };

        // Off the collision axis.
        if position.z.abs() < p.min_z + p.min_size {
            position.z = side * (p.min_z + p.min_size);
        }
        if position.z.abs() - 0.5 * bounds.z < p.min_z {
            let s = self.floored((position.z.abs() - p.min_z) / (0.5 * bounds.z), &bounds);
            bounds *= s;
            scale *= s;
            self.clear_axis(&mut position, &bounds, side);
        }

        // Clear of the previous object.
        let edge = state.last().map(|(pos, dim)| pos.x - 0.5 * dim.x);
        if let Some(edge) = edge {
            if position.x + p.min_size > edge {
                position.x = edge - p.min_size;
            }
            if position.x + 0.5 * bounds.x > edge {
                let s = self.floored((edge - position.x) / (0.5 * bounds.x), &bounds);
                bounds *= s;
                scale *= s;
                if position.x + 0.5 * bounds.x > edge {
                    position.x = edge - 0.5 * bounds.x;
                }
            }
        }

        if p.rescale_height && bounds.y > 0.0 && bounds.z > 0.0 {
            let reach = (position.x * position.x + position.z * position.z).sqrt();
            let sight = self.camera.aim.y + reach * self.camera.altitude.to_radians().tan();
            let height = (sight * self.occlusion_scale).clamp(p.min_size, p.max_size);
            let s = (height / bounds.y).min((position.z.abs() - p.min_z) / (0.5 * bounds.z));
            let s = self.clamped(s, &bounds);
            bounds *= s;
            scale *= s;
            // Height changes may grow the footprint; only move, never rescale again.
            self.clear_axis(&mut position, &bounds, side);
            if let Some(edge) = edge {
                if position.x + 0.5 * bounds.x > edge {
                    position.x = edge - 0.5 * bounds.x;
                }
            }
        }

        let placement = DecorPlacement {
            position,
            rotation: Vec3::new(0.0, yaw, 0.0),
            scale,
            bounds,
        };
        state.record(&placement);
        placement
    }

    /// Shrink factor that stops at `min_size`.
    fn floored(&self, factor: f64, bounds: &Vec3) -> f64 {
        let extent = max_extent(bounds);
        if extent <= 0.0 {
            return factor;
        }
        if extent * factor < self.params.min_size {
            self.params.min_size / extent
        } else {
            factor
        }
    }

    /// Factor that keeps the resulting extent inside the size range.
    fn clamped(&self, factor: f64, bounds: &Vec3) -> f64 {
        let extent = max_extent(bounds);
        if extent <= 0.0 {
            return factor;
        }
        (extent * factor).clamp(self.params.min_size, self.params.max_size) / extent
    }

    fn clear_axis(&self, position: &mut Vec3, bounds: &Vec3, side: f64) {
        if position.z.abs() - 0.5 * bounds.z < self.params.min_z {
            position.z = side * (self.params.min_z + 0.5 * bounds.z);
        }
    }
}

// ========== Tests ==========


#[cfg(all(test, feature = "proptest"))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn placed_sizes_within_bounds(
            seed in any::<u64>(),
            azimuth in 0.0f64..360.0,
            height in 0.75f64..2.0,
            dims in prop::array::uniform3(0.05f64..3.0),
            occluder in any::<bool>(),
        ) {
            let pos = rotate_parallel_to_floor(&Vec3::new(1.75, 0.0, 1.75), azimuth);
            let cam = CameraPose::looking_at(Vec3::new(pos.x, height, pos.z), Vec3::new(0.0, 0.5, 0.0));
            let (kind, params) = if occluder {
                (DecorKind::Occluder, DecorParams::occluders(0.25))
            } else {
                (DecorKind::Distractor, DecorParams::distractors(0.25))
            };
            let planner = DecorPlanner::new(kind, params, &cam).with_occlusion_scale(0.75);
            let mut rng = TrialRng::seeded(seed);
            let mut state = OcclusionLayoutState::new();
            let dims = Vec3::new(dims[0], dims[1], dims[2]);
            let mut previous_edge = f64::INFINITY;
            for unit in planner.directions(3) {
                let placed = planner.place(&mut rng, &mut state, dims, unit);
                let size = max_extent(&placed.bounds);
                prop_assert!(size >= params.min_size - 1e-9);
                prop_assert!(size <= params.max_size + 1e-9);
                prop_assert!(placed.position.x + 0.5 * placed.bounds.x <= previous_edge + 1e-9);
                previous_edge = placed.position.x - 0.5 * placed.bounds.x;
            }
        }
    }
}
