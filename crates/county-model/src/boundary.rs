//! Geographic boundary lookup.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::county::canonicalize;

/// One region of the boundary dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryShape {
    /// Region name exactly as stored in the feature's name property. This is
    /// the identifier a renderer matches features on.
    pub id: String,
    /// Position of the feature within the source collection.
    pub feature_index: usize,
}

/// Immutable canonical-name → shape lookup.
///
/// Built once per invocation from the boundary dataset; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoBoundaryIndex {
    name_property: String,
    shapes: BTreeMap<String, BoundaryShape>,
    duplicate_names: Vec<String>,
}

impl GeoBoundaryIndex {
    /// Build from `(region name, feature index)` pairs.
    ///
    /// Names are keyed by their canonical form. When two features share a
    /// canonical name the first one wins and the later name is recorded in
    /// [`duplicate_names`](Self::duplicate_names).
    pub fn new<I, S>(name_property: impl Into<String>, regions: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut shapes = BTreeMap::new();
        let mut duplicate_names = Vec::new();
        for (name, feature_index) in regions {
            let id: String = name.into();
            let canonical = canonicalize(&id);
            if canonical.is_empty() {
                continue;
            }
            if shapes.contains_key(&canonical) {
                duplicate_names.push(id);
                continue;
            }
            shapes.insert(canonical, BoundaryShape { id, feature_index });
        }
        Self {
            name_property: name_property.into(),
            shapes,
            duplicate_names,
        }
    }

    /// Property the region names were read from (e.g. `name`).
    pub fn name_property(&self) -> &str {
        &self.name_property
    }

    /// Exact lookup by canonical name.
    pub fn get(&self, canonical_name: &str) -> Option<&BoundaryShape> {
        self.shapes.get(canonical_name)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Canonical region names in ascending order.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    pub fn duplicate_names(&self) -> &[String] {
        &self.duplicate_names
    }
}

/// Outcome of resolving one county key against the boundary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved { shape_id: String, feature_index: usize },
    Unresolvable,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn shape_id(&self) -> Option<&str> {
        match self {
            Self::Resolved { shape_id, .. } => Some(shape_id),
            Self::Unresolvable => None,
        }
    }
}
