//! Small geometry and value types shared by layout, force and labels.
//!
//! Positions, rotations (Euler degrees) and scales are `Vector3<f64>`.
//! World convention: y is up, the collision axis runs along x.

use nalgebra::Vector3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f64>;

/// Rotate a vector about the vertical axis, leaving y unchanged.
pub fn rotate_parallel_to_floor(v: &Vec3, degrees: f64) -> Vec3 {
    let theta = degrees.to_radians();
    let (s, c) = theta.sin_cos();
    Vec3::new(c * v.x - s * v.z, v.y, s * v.x + c * v.z)
}

/// Unit vector of the floor-plane (xz) component. Zero stays zero.
pub fn floor_unit(v: &Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    let n = flat.norm();
    if n > 0.0 {
        flat / n
    } else {
        Vec3::zeros()
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ============================================================================
// Value ranges
// ============================================================================

/// Closed interval `[min, max]`, written as a two-element list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValueRange(pub f64, pub f64);

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self(min, max)
    }

    pub const fn fixed(v: f64) -> Self {
        Self(v, v)
    }

    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    pub fn is_ordered(&self) -> bool {
        self.0 <= self.1
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.0 && v <= self.1
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0 * factor, self.1 * factor)
    }
}

/// How an object's scale is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ScaleSpec {
    /// Same value on every axis.
    Scalar(f64),
    /// Fixed per-axis vector.
    Xyz([f64; 3]),
    /// One random scalar applied to all axes.
    Uniform(ValueRange),
    /// Independent range per axis.
    PerAxis {
        x: ValueRange,
        y: ValueRange,
        z: ValueRange,
    },
}

impl ScaleSpec {
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        ScaleSpec::Xyz([x, y, z])
    }

    /// Largest value any axis can take.
    pub fn upper_bound(&self) -> Vec3 {
        match self {
            ScaleSpec::Scalar(s) => Vec3::repeat(*s),
            ScaleSpec::Xyz(v) => Vec3::new(v[0], v[1], v[2]),
            ScaleSpec::Uniform(r) => Vec3::repeat(r.max()),
            ScaleSpec::PerAxis { x, y, z } => Vec3::new(x.max(), y.max(), z.max()),
        }
    }

    pub fn ranges(&self) -> [ValueRange; 3] {
        match self {
            ScaleSpec::Scalar(s) => [ValueRange::fixed(*s); 3],
            ScaleSpec::Xyz(v) => [
                ValueRange::fixed(v[0]),
                ValueRange::fixed(v[1]),
                ValueRange::fixed(v[2]),
            ],
            ScaleSpec::Uniform(r) => [*r; 3],
            ScaleSpec::PerAxis { x, y, z } => [*x, *y, *z],
        }
    }
}

// ============================================================================
// Colors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);
    pub const NEUTRAL: Rgb = Rgb::new(0.8, 0.8, 0.8);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// True if any channel lies within `radius` of the other color's channel.
    pub fn near(&self, other: &Rgb, radius: f64) -> bool {
        self.channels()
            .iter()
            .zip(other.channels().iter())
            .any(|(a, b)| (a - b).abs() < radius)
    }
}

/// Serde adapter writing a vector as `{"x": .., "y": .., "z": ..}`.
pub mod xyz {
    use super::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xyz {
        x: f64,
        y: f64,
        z: f64,
    }

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        Xyz {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let v = Xyz::deserialize(d)?;
        Ok(Vec3::new(v.x, v.y, v.z))
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate_parallel_to_floor(&Vec3::new(1.0, 2.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 2.0).abs() < 1e-12);
        assert!((v.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_symmetric() {
        assert_eq!(linspace(-10.0, 10.0, 3), vec![-10.0, 0.0, 10.0]);
        assert_eq!(linspace(5.0, 9.0, 1), vec![5.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_scale_spec_parsing() {
        let s: ScaleSpec = serde_json::from_str("0.3").unwrap();
        assert_eq!(s, ScaleSpec::Scalar(0.3));

        let s: ScaleSpec = serde_json::from_str("[0.25, 0.5, 0.25]").unwrap();
        assert_eq!(s, ScaleSpec::xyz(0.25, 0.5, 0.25));

        let s: ScaleSpec = serde_json::from_str("[0.4, 0.5]").unwrap();
        assert_eq!(s, ScaleSpec::Uniform(ValueRange::new(0.4, 0.5)));

        let s: ScaleSpec =
            serde_json::from_str(r#"{"x": [1, 2], "y": [0.1, 0.1], "z": [3, 4]}"#).unwrap();
        assert_eq!(s.upper_bound(), Vec3::new(2.0, 0.1, 4.0));
    }

    #[test]
    fn test_color_proximity_is_per_channel() {
        let a = Rgb::new(1.0, 0.0, 0.0);
        // Only the blue channel is close, which is enough.
        assert!(a.near(&Rgb::new(0.0, 1.0, 0.1), 0.25));
        assert!(!a.near(&Rgb::new(0.5, 0.5, 0.5), 0.25));
    }

    #[test]
    fn test_xyz_serde_shape() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            #[serde(with = "xyz")]
            p: Vec3,
        }
        let json = serde_json::to_string(&Holder {
            p: Vec3::new(1.0, 2.0, 3.0),
        })
        .unwrap();
        assert_eq!(json, r#"{"p":{"x":1.0,"y":2.0,"z":3.0}}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.p, Vec3::new(1.0, 2.0, 3.0));
    }
}
