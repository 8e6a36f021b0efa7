//! Model catalog: read-only collection of placeable prototypes.
//!
//! The catalog is constructed explicitly and passed to whoever needs it.
//! Queries return candidates in catalog order, so identical queries on the
//! same catalog always yield identical candidate lists.

mod builtin;

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SamplingError};
use crate::math::{ValueRange, Vec3};

pub use builtin::{
    CLOTH_PROTOTYPE, FLEX_LIBRARY, CORE_LIBRARY, RAMP_PROTOTYPE, SPECIAL_LIBRARY,
};

/// Axis-aligned extents of a prototype at unit scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PrototypeBounds {
    /// Extent along x.
    pub length: f64,
    /// Extent along y.
    pub height: f64,
    /// Extent along z.
    pub depth: f64,
    /// Height of the top face above the pivot.
    pub top: f64,
    /// Height of the bottom face above the pivot.
    #[serde(default)]
    pub bottom: f64,
}

impl PrototypeBounds {
    pub const fn boxed(length: f64, height: f64, depth: f64) -> Self {
        Self {
            length,
            height,
            depth,
            top: height,
            bottom: 0.0,
        }
    }

    pub fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.height, self.depth)
    }

    pub fn max_extent(&self) -> f64 {
        self.length.max(self.height).max(self.depth)
    }

    pub fn min_extent(&self) -> f64 {
        self.length.min(self.height).min(self.depth)
    }

    /// Largest over smallest extent.
    pub fn aspect_ratio(&self) -> f64 {
        let min = self.min_extent();
        if min > 0.0 {
            self.max_extent() / min
        } else {
            f64::INFINITY
        }
    }
}

/// One catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectPrototype {
    pub name: String,
    pub library: String,
    #[serde(default)]
    pub category: String,
    pub bounds: PrototypeBounds,
    /// Usable as a soft-body (flex) object.
    #[serde(default)]
    pub flex: bool,
}

impl ObjectPrototype {
    pub fn dimensions(&self) -> Vec3 {
        self.bounds.dimensions()
    }
}

/// Filter applied by [`ModelCatalog::select`]. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Role the candidates are for; only used in error messages.
    pub role: String,
    pub names: Option<Vec<String>>,
    pub libraries: Vec<String>,
    pub categories: Option<Vec<String>>,
    pub flex_only: bool,
    /// Bounds on the largest extent.
    pub size: Option<ValueRange>,
    pub aspect_ratio: Option<ValueRange>,
}

impl Selection {
    pub fn named(role: &str, names: &[String]) -> Self {
        Self {
            role: role.to_string(),
            names: Some(names.to_vec()),
            ..Default::default()
        }
    }

    pub fn in_library(mut self, library: &str) -> Self {
        self.libraries.push(library.to_string());
        self
    }

    pub fn with_categories(mut self, categories: Option<&[String]>) -> Self {
        self.categories = categories.map(|c| c.to_vec());
        self
    }

    pub fn flex_only(mut self, flex_only: bool) -> Self {
        self.flex_only = flex_only;
        self
    }

    pub fn with_size(mut self, size: Option<ValueRange>) -> Self {
        self.size = size;
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: Option<ValueRange>) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    fn accepts(&self, p: &ObjectPrototype) -> bool {
        if let Some(names) = &self.names {
            if !names.iter().any(|n| n == &p.name) {
                return false;
            }
        }
        if !self.libraries.is_empty() && !self.libraries.iter().any(|l| l == &p.library) {
            return false;
        }
        if let Some(categories) = &self.categories {
            if !categories.iter().any(|c| c == &p.category) {
                return false;
            }
        }
        if self.flex_only && !p.flex {
            return false;
        }
        if let Some(size) = &self.size {
            if !size.contains(p.bounds.max_extent()) {
                return false;
            }
        }
        if let Some(ratio) = &self.aspect_ratio {
            if !ratio.contains(p.bounds.aspect_ratio()) {
                return false;
            }
        }
        true
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(names) = &self.names {
            parts.push(format!("names={:?}", names));
        }
        if !self.libraries.is_empty() {
            parts.push(format!("libraries={:?}", self.libraries));
        }
        if let Some(categories) = &self.categories {
            parts.push(format!("categories={:?}", categories));
        }
        if self.flex_only {
            parts.push("flex_only".to_string());
        }
        if let Some(size) = &self.size {
            parts.push(format!("size=[{}, {}]", size.min(), size.max()));
        }
        if let Some(ratio) = &self.aspect_ratio {
            parts.push(format!("aspect_ratio=[{}, {}]", ratio.min(), ratio.max()));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCatalog {
    prototypes: Vec<ObjectPrototype>,
}

impl ModelCatalog {
    pub fn new(prototypes: Vec<ObjectPrototype>) -> Self {
        Self { prototypes }
    }

    /// Primitive, decorative and special prototypes shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(builtin::prototypes())
    }

    /// Load a catalog from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Append entries from `other`; a later entry with an existing name replaces it.
    pub fn merge(&mut self, other: ModelCatalog) {
        for proto in other.prototypes {
            match self.prototypes.iter_mut().find(|p| p.name == proto.name) {
                Some(existing) => *existing = proto,
                None => self.prototypes.push(proto),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectPrototype> {
        self.prototypes.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ObjectPrototype> {
        self.prototypes.iter().find(|p| p.name == name)
    }

    pub fn require(&self, name: &str) -> Result<ObjectPrototype, SamplingError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| SamplingError::UnknownPrototype(name.to_string()))
    }

    /// Candidates accepted by `selection`, in catalog order. Empty is an error.
    pub fn select(&self, selection: &Selection) -> Result<Vec<ObjectPrototype>, SamplingError> {
        let found: Vec<ObjectPrototype> = self
            .prototypes
            .iter()
            .filter(|p| selection.accepts(p))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(SamplingError::EmptyCandidateSet {
                role: selection.role.clone(),
                detail: selection.describe(),
            });
        }
        Ok(found)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[ObjectPrototype]) -> Vec<&str> {
        list.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_select_by_name_keeps_catalog_order() {
        let catalog = ModelCatalog::builtin();
        let wanted = vec!["sphere".to_string(), "cube".to_string()];
        let found = catalog.select(&Selection::named("target", &wanted)).unwrap();
        assert_eq!(names(&found), vec!["cube", "sphere"]);
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let catalog = ModelCatalog::builtin();
        let wanted = vec!["anvil".to_string()];
        let err = catalog
            .select(&Selection::named("probe", &wanted))
            .unwrap_err();
        match err {
            SamplingError::EmptyCandidateSet { role, detail } => {
                assert_eq!(role, "probe");
                assert!(detail.contains("anvil"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_flex_and_size_filters() {
        let catalog = ModelCatalog::builtin();
        let flex = catalog
            .select(&Selection::default().in_library(FLEX_LIBRARY).flex_only(true))
            .unwrap();
        assert!(flex.iter().all(|p| p.flex));

        let small = catalog
            .select(
                &Selection::default()
                    .in_library(CORE_LIBRARY)
                    .with_size(Some(ValueRange::new(0.0, 0.7))),
            )
            .unwrap();
        assert!(small.iter().all(|p| p.bounds.max_extent() <= 0.7));
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let mut catalog = ModelCatalog::builtin();
        let before = catalog.len();
        let mut cube = catalog.require("cube").unwrap();
        cube.bounds = PrototypeBounds::boxed(2.0, 2.0, 2.0);
        catalog.merge(ModelCatalog::new(vec![cube]));
        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.get("cube").unwrap().bounds.length, 2.0);
    }

    #[test]
    fn test_load_yaml_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(
            &path,
            "prototypes:\n  - name: crate_box\n    library: models_core\n    category: box\n    bounds: {length: 0.5, height: 0.4, depth: 0.5, top: 0.4}\n",
        )
        .unwrap();
        let catalog = ModelCatalog::from_path(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        let proto = catalog.get("crate_box").unwrap();
        assert!(!proto.flex);
        assert_eq!(proto.bounds.bottom, 0.0);
    }
}
