//! Population lookup used by the merge engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::county::CountyKey;

/// Population per county, in persons.
///
/// Only strictly positive, finite values are kept: a county whose population
/// is zero, negative or unknown is treated as having no population value and
/// is excluded from any per-capita join.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationLookup {
    by_county: BTreeMap<CountyKey, f64>,
    rejected: Vec<CountyKey>,
}

impl PopulationLookup {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CountyKey, f64)>,
    {
        let mut by_county = BTreeMap::new();
        let mut rejected = Vec::new();
        for (county, persons) in entries {
            if persons.is_finite() && persons > 0.0 {
                by_county.insert(county, persons);
            } else {
                rejected.push(county);
            }
        }
        Self {
            by_county,
            rejected,
        }
    }

    pub fn get(&self, county: &CountyKey) -> Option<f64> {
        self.by_county.get(county).copied()
    }

    pub fn len(&self) -> usize {
        self.by_county.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_county.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CountyKey, f64)> {
        self.by_county.iter().map(|(k, v)| (k, *v))
    }

    /// Counties dropped for a non-positive or non-finite population.
    pub fn rejected(&self) -> &[CountyKey] {
        &self.rejected
    }
}
