//! Stock parameter sets, one per scenario.

use super::sections::{
    AxisConfig, CameraConfig, ColorConfig, ContainmentConfig, DecorativeConfig, DrapeConfig,
    DropConfig, ForceConfig, GeneralConfig, ObjectConfig, RampConfig, RollingConfig,
    RotationRanges, StructureConfig, TowerConfig, ZoneConfig,
};
use super::{ScenarioConfig, ScenarioKind};
use crate::math::{Rgb, ScaleSpec, ValueRange};

impl ScenarioConfig {
    pub fn for_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Dominoes => Self::dominoes(),
            ScenarioKind::Collision => Self::collision(),
            ScenarioKind::Tower => Self::tower(),
            ScenarioKind::Containment => Self::containment(),
            ScenarioKind::Rolling => Self::rolling(),
            ScenarioKind::Drape => Self::drape(),
            ScenarioKind::Drop => Self::drop(),
        }
    }

    /// Probe knocks a row of dominoes towards the target.
    pub fn dominoes() -> Self {
        let mut target = ObjectConfig::default();
        target.color = Some(Rgb::RED);
        let mut probe = ObjectConfig::default();
        probe.color = Some(Rgb::new(0.0, 1.0, 1.0));
        let mut middle = ObjectConfig::default();
        middle.rotation = RotationRanges::yaw(ValueRange::new(-30.0, 30.0));

        Self {
            scenario: ScenarioKind::Dominoes,
            mode: Default::default(),
            general: GeneralConfig::default(),
            axis: AxisConfig::default(),
            zone: ZoneConfig::default(),
            target,
            probe,
            middle,
            structure: StructureConfig::default(),
            force: ForceConfig::default(),
            ramp: RampConfig::default(),
            camera: CameraConfig::default(),
            decorative: DecorativeConfig::default(),
            colors: ColorConfig::default(),
            tower: TowerConfig::default(),
            containment: ContainmentConfig::default(),
            rolling: RollingConfig::default(),
            drape: DrapeConfig::default(),
            drop: DropConfig::default(),
        }
    }

    /// Probe launched straight at a target, zone behind it.
    pub fn collision() -> Self {
        let mut cfg = Self::dominoes();
        cfg.scenario = ScenarioKind::Collision;
        cfg.zone.scale = ScaleSpec::xyz(1.0, 0.01, 1.0);
        cfg.zone.lateral_jitter = 0.35;
        cfg.target.types = vec!["pipe".into(), "cube".into(), "octahedron".into()];
        cfg.target.scale = ScaleSpec::xyz(0.25, 0.5, 0.25);
        cfg.probe.types = vec!["sphere".into()];
        cfg.probe.scale = ScaleSpec::Scalar(0.35);
        cfg.probe.mass = ValueRange::new(2.0, 7.0);
        cfg.structure.count = 0;
        cfg.force.scale = ValueRange::new(5.0, 10.0);
        cfg.force.angle = ValueRange::new(-20.0, 20.0);
        cfg.force.offset_jitter = 0.5;
        cfg.camera.radius = ValueRange::fixed(2.3);
        cfg.camera.min_angle = 0.0;
        cfg.camera.max_angle = 360.0;
        cfg.decorative.occluders.aspect_ratio = Some(ValueRange::new(0.5, 2.5));
        cfg.decorative.distractors.aspect_ratio = Some(ValueRange::new(0.25, 5.0));
        cfg
    }

    /// Probe strikes a block tower topped by a cap.
    pub fn tower() -> Self {
        let mut cfg = Self::dominoes();
        cfg.scenario = ScenarioKind::Tower;
        cfg.axis.length = 3.0;
        cfg.axis.remove_target = true;
        cfg.zone.scale = ScaleSpec::xyz(3.0, 0.01, 3.0);
        cfg.target.scale = ScaleSpec::Uniform(ValueRange::new(0.4, 0.4));
        cfg.probe.types = vec!["sphere".into()];
        cfg.probe.scale = ScaleSpec::Scalar(0.3);
        cfg.probe.mass = ValueRange::fixed(3.0);
        cfg.middle.scale = ScaleSpec::Uniform(ValueRange::new(0.4, 0.5));
        cfg.middle.rotation = RotationRanges::yaw(ValueRange::new(-45.0, 45.0));
        cfg.structure.count = 2;
        cfg.structure.spacing_jitter = 0.3;
        cfg.force.scale = ValueRange::fixed(4.0);
        cfg.force.offset = [0.0, 0.5, 0.0];
        cfg.force.wait = ValueRange::fixed(15.0);
        cfg.camera.radius = ValueRange::fixed(3.0);
        cfg.camera.min_angle = 0.0;
        cfg.camera.max_angle = 90.0;
        cfg.tower.num_blocks = 2;
        cfg
    }

    /// Links resting in a container on a base; one link is the target.
    pub fn containment() -> Self {
        let mut cfg = Self::tower();
        cfg.scenario = ScenarioKind::Containment;
        cfg.axis.length = 2.0;
        cfg.middle = ObjectConfig::typed(&["sphere"], ScaleSpec::xyz(0.4, 0.4, 0.4));
        cfg.structure.spacing_jitter = 0.0;
        cfg.force.scale = ValueRange::new(5.0, 10.0);
        cfg.camera.min_height = 1.5;
        cfg.camera.max_height = 2.5;
        cfg.tower.use_cap = false;
        cfg
    }

    /// Target itself is pushed, usually down a ramp, towards the zone.
    pub fn rolling() -> Self {
        let mut cfg = Self::dominoes();
        cfg.scenario = ScenarioKind::Rolling;
        cfg.axis.length = 1.15;
        cfg.zone.scale = ScaleSpec::xyz(2.0, 0.01, 2.0);
        cfg.target.types = vec![
            "pipe".into(),
            "cube".into(),
            "octahedron".into(),
            "sphere".into(),
        ];
        cfg.target.scale = ScaleSpec::xyz(0.25, 0.25, 0.25);
        cfg.structure.count = 0;
        cfg.force.scale = ValueRange::new(1.0, 2.0);
        cfg.force.angle = ValueRange::new(-20.0, 20.0);
        cfg.ramp.enabled = true;
        cfg.ramp.scale = Some([0.2, 0.25, 0.5]);
        cfg
    }

    /// Cloth dropped over anchors and a prop.
    pub fn drape() -> Self {
        let mut cfg = Self::dominoes();
        cfg.scenario = ScenarioKind::Drape;
        cfg.axis.remove_target = true;
        cfg.structure.count = 0;
        cfg.force.wait = ValueRange::fixed(30.0);
        cfg.zone.scale = ScaleSpec::xyz(0.5, 0.01, 0.5);
        cfg.camera.min_angle = 0.0;
        cfg.camera.max_angle = 360.0;
        cfg
    }

    /// Object dropped from a height onto another object.
    pub fn drop() -> Self {
        let mut cfg = Self::dominoes();
        cfg.scenario = ScenarioKind::Drop;
        cfg.zone.scale = ScaleSpec::xyz(2.0, 0.01, 2.0);
        cfg.target.types = vec![
            "cube".into(),
            "sphere".into(),
            "cylinder".into(),
            "bowl".into(),
        ];
        cfg.target.scale = ScaleSpec::Uniform(ValueRange::new(0.3, 0.7));
        cfg.middle.mass = ValueRange::fixed(10.0);
        cfg.structure.count = 0;
        cfg.camera.min_angle = 0.0;
        cfg.camera.max_angle = 360.0;
        cfg
    }
}
