use super::{ObjectPrototype, PrototypeBounds};

pub const FLEX_LIBRARY: &str = "models_flex";
pub const CORE_LIBRARY: &str = "models_core";
pub const SPECIAL_LIBRARY: &str = "models_special";

pub const RAMP_PROTOTYPE: &str = "ramp_with_platform_30";
pub const CLOTH_PROTOTYPE: &str = "cloth_square";

// (name, library, category, length, height, depth, top, bottom, flex)
type Row = (&'static str, &'static str, &'static str, f64, f64, f64, f64, f64, bool);

const ROWS: &[Row] = &[
    // unit primitives
    ("cube", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("sphere", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("cylinder", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("cone", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("pyramid", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("triangular_prism", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("bowl", FLEX_LIBRARY, "primitive", 1.0, 0.5, 1.0, 0.5, 0.0, true),
    ("torus", FLEX_LIBRARY, "primitive", 1.0, 0.25, 1.0, 0.25, 0.0, true),
    ("pipe", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("octahedron", FLEX_LIBRARY, "primitive", 1.0, 1.0, 1.0, 1.0, 0.0, true),
    ("dumbbell", FLEX_LIBRARY, "primitive", 1.0, 0.5, 0.5, 0.5, 0.0, true),
    // decorative furniture and props
    ("wood_chair", CORE_LIBRARY, "chair", 0.55, 0.9, 0.6, 0.9, 0.0, false),
    ("linbrazil_diz_armchair", CORE_LIBRARY, "armchair", 0.8, 0.85, 0.85, 0.85, 0.0, false),
    ("dining_table", CORE_LIBRARY, "table", 1.6, 0.75, 0.9, 0.75, 0.0, false),
    ("coffee_table", CORE_LIBRARY, "table", 1.1, 0.45, 0.6, 0.45, 0.0, false),
    ("sofa_3_seat", CORE_LIBRARY, "sofa", 2.1, 0.85, 0.95, 0.85, 0.0, false),
    ("bookshelf_tall", CORE_LIBRARY, "bookshelf", 0.9, 1.9, 0.35, 1.9, 0.0, false),
    ("ceramic_vase", CORE_LIBRARY, "vase", 0.3, 0.5, 0.3, 0.5, 0.0, false),
    ("fern_houseplant", CORE_LIBRARY, "houseplant", 0.55, 1.1, 0.55, 1.1, 0.0, false),
    ("alma_floor_lamp", CORE_LIBRARY, "lamp", 0.45, 1.7, 0.45, 1.7, 0.0, false),
    ("desk_lamp", CORE_LIBRARY, "lamp", 0.35, 0.55, 0.25, 0.55, 0.0, false),
    ("buddah", CORE_LIBRARY, "statue", 0.45, 0.7, 0.4, 0.7, 0.0, false),
    ("writing_desk", CORE_LIBRARY, "desk", 1.2, 0.76, 0.6, 0.76, 0.0, false),
    ("storage_cabinet", CORE_LIBRARY, "cabinet", 0.8, 1.2, 0.45, 1.2, 0.0, false),
    // fixed-geometry helpers
    (RAMP_PROTOTYPE, SPECIAL_LIBRARY, "ramp", 2.0, 0.6, 1.0, 0.6, 0.0, false),
    (CLOTH_PROTOTYPE, SPECIAL_LIBRARY, "cloth", 1.0, 0.01, 1.0, 0.01, 0.0, true),
];

pub(super) fn prototypes() -> Vec<ObjectPrototype> {
    ROWS.iter()
        .map(
            |&(name, library, category, length, height, depth, top, bottom, flex)| ObjectPrototype {
                name: name.to_string(),
                library: library.to_string(),
                category: category.to_string(),
                bounds: PrototypeBounds {
                    length,
                    height,
                    depth,
                    top,
                    bottom,
                },
                flex,
            },
        )
        .collect()
}
