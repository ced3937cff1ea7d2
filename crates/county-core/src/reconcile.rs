//! Matching county keys to boundary regions.

use std::collections::BTreeMap;

use county_model::{CountyKey, GeoBoundaryIndex, Resolution, canonicalize};

/// Resolves county keys against a boundary index.
///
/// Lookup is exact on canonical names. Aliases cover regions the boundary
/// dataset spells differently from the statistics tables; a key with an
/// alias is looked up under the alias only. Nothing here mutates the index.
#[derive(Debug, Clone)]
pub struct NameReconciler<'a> {
    index: &'a GeoBoundaryIndex,
    aliases: BTreeMap<CountyKey, String>,
}

impl<'a> NameReconciler<'a> {
    pub fn new(index: &'a GeoBoundaryIndex) -> Self {
        Self {
            index,
            aliases: BTreeMap::new(),
        }
    }

    /// Add aliases from `county key → boundary region name` pairs. Blank keys
    /// are ignored.
    #[must_use]
    pub fn with_aliases(mut self, aliases: &BTreeMap<String, String>) -> Self {
        for (from, to) in aliases {
            if let Some(key) = CountyKey::new(from) {
                self.aliases.insert(key, canonicalize(to));
            }
        }
        self
    }

    pub fn index(&self) -> &GeoBoundaryIndex {
        self.index
    }

    pub fn resolve(&self, key: &CountyKey) -> Resolution {
        let lookup = self
            .aliases
            .get(key)
            .map_or(key.as_str(), String::as_str);
        match self.index.get(lookup) {
            Some(shape) => Resolution::Resolved {
                shape_id: shape.id.clone(),
                feature_index: shape.feature_index,
            },
            None => Resolution::Unresolvable,
        }
    }

    /// Resolve every key, logging the ones with no boundary region.
    pub fn reconcile_all<'k, I>(&self, keys: I) -> Reconciliation
    where
        I: IntoIterator<Item = &'k CountyKey>,
    {
        let entries: Vec<ReconciledKey> = keys
            .into_iter()
            .map(|key| ReconciledKey {
                county: key.clone(),
                resolution: self.resolve(key),
            })
            .collect();
        let reconciliation = Reconciliation { entries };
        for county in reconciliation.unresolved() {
            tracing::warn!(county = %county, "no boundary region for county");
        }
        tracing::info!(
            keys = reconciliation.len(),
            resolved = reconciliation.resolved_count(),
            "reconciled county keys"
        );
        reconciliation
    }
}

/// One county key and where it landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledKey {
    pub county: CountyKey,
    pub resolution: Resolution,
}

/// Resolution of a set of keys, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    entries: Vec<ReconciledKey>,
}

impl Reconciliation {
    pub fn entries(&self) -> &[ReconciledKey] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, county: &CountyKey) -> Option<&Resolution> {
        self.entries
            .iter()
            .find(|entry| &entry.county == county)
            .map(|entry| &entry.resolution)
    }

    pub fn resolved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.resolution.is_resolved())
            .count()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &CountyKey> {
        self.entries
            .iter()
            .filter(|entry| !entry.resolution.is_resolved())
            .map(|entry| &entry.county)
    }
}
