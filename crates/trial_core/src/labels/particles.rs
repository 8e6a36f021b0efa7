use crate::math::Vec3;

/// Smallest distance between any point of `a` and any point of `b`.
pub fn min_pairwise_distance(a: &[Vec3], b: &[Vec3]) -> Option<f64> {
    a.iter()
        .flat_map(|p| b.iter().map(move |q| (p - q).norm()))
        .fold(None, |acc: Option<f64>, d| {
            Some(acc.map_or(d, |m| m.min(d)))
        })
}

/// Particle-cloud contact between two soft bodies, plus the trial minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleProximity {
    threshold: f64,
    minimum: Option<f64>,
}

impl ParticleProximity {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            minimum: None,
        }
    }

    /// Distance this frame and whether it counts as contact.
    pub fn observe(&mut self, a: &[Vec3], b: &[Vec3]) -> Option<(f64, bool)> {
        let d = min_pairwise_distance(a, b)?;
        self.minimum = Some(self.minimum.map_or(d, |m| m.min(d)));
        Some((d, d < self.threshold))
    }

    /// Smallest distance over every observed frame.
    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }
}

// ========== Tests ==========
