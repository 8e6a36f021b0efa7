//! Geometric sampler: picks a prototype and instantiates scale, color and id.

use crate::catalog::ObjectPrototype;
use crate::error::SamplingError;
use crate::math::{Rgb, ScaleSpec, Vec3};
use crate::random::TrialRng;
use crate::scene::Scene;

/// Reference block volume used to normalise masses (0.5 m cube).
pub const STANDARD_BLOCK_VOLUME: f64 = 0.125;

/// Default per-channel radius for color exclusion.
pub const DEFAULT_EXCLUDE_RADIUS: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorRequest {
    Fixed(Rgb),
    Random,
    Excluding { color: Rgb, radius: f64 },
}

impl ColorRequest {
    /// A fixed color wins; otherwise exclude `exclude` if given.
    pub fn resolve(fixed: Option<Rgb>, exclude: Option<Rgb>, radius: f64) -> Self {
        match (fixed, exclude) {
            (Some(c), _) => ColorRequest::Fixed(c),
            (None, Some(color)) => ColorRequest::Excluding { color, radius },
            (None, None) => ColorRequest::Random,
        }
    }

    fn draw(&self, rng: &mut TrialRng) -> Rgb {
        match self {
            ColorRequest::Fixed(c) => *c,
            ColorRequest::Random => rng.color(),
            ColorRequest::Excluding { color, radius } => rng.color_excluding(Some(color), *radius),
        }
    }
}

/// Constraints for one draw.
#[derive(Debug, Clone)]
pub struct SampleRequest<'a> {
    pub role: &'a str,
    pub candidates: &'a [ObjectPrototype],
    pub scale: &'a ScaleSpec,
    pub color: ColorRequest,
}

impl<'a> SampleRequest<'a> {
    pub fn new(role: &'a str, candidates: &'a [ObjectPrototype], scale: &'a ScaleSpec) -> Self {
        Self {
            role,
            candidates,
            scale,
            color: ColorRequest::Random,
        }
    }

    pub fn color(mut self, color: ColorRequest) -> Self {
        self.color = color;
        self
    }
}

/// A concrete instantiation of a prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledObject {
    pub prototype: ObjectPrototype,
    pub id: u32,
    pub scale: Vec3,
    pub color: Rgb,
}

impl SampledObject {
    pub fn has_positive_scale(&self) -> bool {
        self.scale.iter().all(|s| *s > 0.0)
    }

    pub fn scaled_dimensions(&self) -> Vec3 {
        self.prototype.dimensions().component_mul(&self.scale)
    }
}

/// Draw order: prototype, scale, color, id.
pub fn sample_object(
    rng: &mut TrialRng,
    scene: &mut Scene,
    request: &SampleRequest<'_>,
) -> Result<SampledObject, SamplingError> {
    let prototype = match rng.choose(request.candidates) {
        Some(p) => p.clone(),
        None => {
            return Err(SamplingError::EmptyCandidateSet {
                role: request.role.to_string(),
                detail: "no candidates to draw from".to_string(),
            })
        }
    };
    let scale = rng.scale(request.scale);
    let color = request.color.draw(rng);
    let id = scene.allocate_id();

    Ok(SampledObject {
        prototype,
        id,
        scale,
        color,
    })
}

/// `base` mass rescaled so every block shares one density.
pub fn density_mass(base: f64, scale: &Vec3) -> f64 {
    base * (scale.x * scale.y * scale.z) / STANDARD_BLOCK_VOLUME
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelCatalog, Selection};
    use crate::math::ValueRange;

    fn primitives() -> Vec<ObjectPrototype> {
        let names: Vec<String> = ["cube", "sphere", "cylinder"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        ModelCatalog::builtin()
            .select(&Selection::named("test", &names))
            .unwrap()
    }

    #[test]
    fn test_sample_is_deterministic() {
        let candidates = primitives();
        let scale = ScaleSpec::Uniform(ValueRange::new(0.2, 0.3));
        let draw = || {
            let mut rng = TrialRng::seeded(4242);
            let mut scene = Scene::new();
            let req = SampleRequest::new("target", &candidates, &scale);
            sample_object(&mut rng, &mut scene, &req).unwrap()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn test_ids_are_sequential() {
        let candidates = primitives();
        let scale = ScaleSpec::Scalar(0.5);
        let mut rng = TrialRng::seeded(1);
        let mut scene = Scene::new();
        let req = SampleRequest::new("middle", &candidates, &scale);
        let a = sample_object(&mut rng, &mut scene, &req).unwrap();
        let b = sample_object(&mut rng, &mut scene, &req).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[test]
    fn test_fixed_color_and_exclusion() {
        let candidates = primitives();
        let scale = ScaleSpec::Scalar(0.5);
        let mut rng = TrialRng::seeded(9);
        let mut scene = Scene::new();

        let req = SampleRequest::new("zone", &candidates, &scale)
            .color(ColorRequest::Fixed(Rgb::YELLOW));
        assert_eq!(sample_object(&mut rng, &mut scene, &req).unwrap().color, Rgb::YELLOW);

        let req = SampleRequest::new("probe", &candidates, &scale).color(ColorRequest::resolve(
            None,
            Some(Rgb::RED),
            DEFAULT_EXCLUDE_RADIUS,
        ));
        for _ in 0..20 {
            let s = sample_object(&mut rng, &mut scene, &req).unwrap();
            assert!(!s.color.near(&Rgb::RED, DEFAULT_EXCLUDE_RADIUS));
        }
    }

    #[test]
    fn test_empty_candidates_fail() {
        let scale = ScaleSpec::Scalar(0.5);
        let mut rng = TrialRng::seeded(1);
        let mut scene = Scene::new();
        let req = SampleRequest::new("target", &[], &scale);
        assert!(matches!(
            sample_object(&mut rng, &mut scene, &req),
            Err(SamplingError::EmptyCandidateSet { .. })
        ));
        assert_eq!(scene.len(), 0);
    }

    #[test]
    fn test_density_mass_reference_block() {
        assert!((density_mass(2.0, &Vec3::repeat(0.5)) - 2.0).abs() < 1e-12);
        assert!((density_mass(2.0, &Vec3::repeat(1.0)) - 16.0).abs() < 1e-12);
    }
}
