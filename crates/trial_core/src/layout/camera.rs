//! Avatar placement and the derived view angles decorative layout needs.

use crate::command::EngineCommand;
use crate::config::CameraConfig;
use crate::math::{floor_unit, rotate_parallel_to_floor, ValueRange, Vec3};
use crate::random::TrialRng;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub aim: Vec3,
    /// Azimuth of the avatar in the floor plane, degrees.
    pub rotation: f64,
    /// Elevation of the avatar above the aim point, degrees.
    pub altitude: f64,
    /// Distance to the aim point.
    pub distance: f64,
    /// Floor-plane distance to the origin.
    pub radius: f64,
    /// Floor-plane unit vector towards the avatar.
    pub ray: Vec3,
    pub opposite: Vec3,
}

impl CameraPose {
    /// Draw order: radius, azimuth, mirrored azimuth and pick (with
    /// reflections), height.
    pub fn sample(rng: &mut TrialRng, cfg: &CameraConfig, aim: Vec3, heights: ValueRange) -> Self {
        let r = rng.in_range(&cfg.radius);
        let mut theta = rng.uniform(cfg.min_angle, cfg.max_angle);
        if cfg.reflections {
            let mirrored = rng.uniform(cfg.min_angle + 180.0, cfg.max_angle + 180.0);
            if rng.index(2) == Some(1) {
                theta = mirrored;
            }
        }
        let mut position = rotate_parallel_to_floor(&Vec3::new(r, 0.0, r), theta);
        position.y = rng.in_range(&heights);
        Self::looking_at(position, aim)
    }

    pub fn looking_at(position: Vec3, aim: Vec3) -> Self {
        let distance = (position - aim).norm();
        let altitude = if distance > 0.0 {
            ((position.y - aim.y) / distance).clamp(-1.0, 1.0).asin().to_degrees()
        } else {
            0.0
        };
        let ray = floor_unit(&position);
        Self {
            position,
            aim,
            rotation: position.z.atan2(position.x).to_degrees(),
            altitude,
            distance,
            radius: Vec3::new(position.x, 0.0, position.z).norm(),
            ray,
            opposite: -ray,
        }
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        vec![
            EngineCommand::TeleportAvatarTo {
                position: self.position,
            },
            EngineCommand::LookAtPosition { position: self.aim },
            EngineCommand::SetFocusDistance {
                focus_distance: self.distance,
            },
        ]
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_angles() {
        let pose = CameraPose::looking_at(Vec3::new(0.0, 1.5, 2.0), Vec3::new(0.0, 0.5, 0.0));
        assert!((pose.rotation - 90.0).abs() < 1e-9);
        assert!((pose.distance - 5f64.sqrt()).abs() < 1e-12);
        assert!((pose.altitude - (1.0 / 5f64.sqrt()).asin().to_degrees()).abs() < 1e-9);
        assert_eq!(pose.ray, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(pose.opposite, Vec3::new(0.0, 0.0, -1.0));
        assert!((pose.radius - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_respects_height_range() {
        let cfg = CameraConfig::default();
        let mut rng = TrialRng::seeded(21);
        let aim = Vec3::new(0.0, 0.5, 0.0);
        for _ in 0..20 {
            let pose = CameraPose::sample(&mut rng, &cfg, aim, ValueRange::new(0.75, 2.0));
            assert!(pose.position.y >= 0.75 && pose.position.y <= 2.0);
            // (r, 0, r) rotated keeps its floor distance.
            assert!((pose.radius - 1.75 * 2f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_commands_aim_at_look_point() {
        let pose = CameraPose::looking_at(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 0.5, 0.0));
        let cmds = pose.commands();
        assert_eq!(cmds.len(), 3);
        assert_eq!(
            cmds[1],
            EngineCommand::LookAtPosition {
                position: Vec3::new(0.0, 0.5, 0.0)
            }
        );
    }
}
