//! Aggregated one-row-per-key tables.
//!
//! An [`Aggregate`] is the typed result of grouping raw rows by a key and
//! combining one or more measure columns. Values are plain `f64`, never
//! `Option`, so a missing combined value cannot be represented at all.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::county::CountyKey;
use crate::error::ModelError;

/// How a measure column is combined within one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineFn {
    Mean,
    Sum,
}

impl CombineFn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }
}

/// One measure column to aggregate and the output name it is stored under.
///
/// The output name defaults to the source column; give it a distinct name
/// when the same column is combined twice (mean and sum).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub column: String,
    pub combine: CombineFn,
    pub name: String,
}

impl MeasureSpec {
    pub fn new(column: impl Into<String>, combine: CombineFn) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            column,
            combine,
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(column, CombineFn::Mean)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(column, CombineFn::Sum)
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Where every input row of an aggregation ended up.
///
/// `supported_rows + dropped_missing + dropped_insufficient_support` always
/// equals `input_rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    pub input_rows: usize,
    /// Rows without a key or without a value for some aggregated measure.
    pub dropped_missing: usize,
    /// Rows belonging to groups removed by the minimum-support filter.
    pub dropped_insufficient_support: usize,
    /// Number of groups removed by the minimum-support filter.
    pub groups_below_support: usize,
    /// Rows contributing to an output group.
    pub supported_rows: usize,
}

impl AggregationReport {
    pub fn is_balanced(&self) -> bool {
        self.supported_rows + self.dropped_missing + self.dropped_insufficient_support
            == self.input_rows
    }
}

/// One output group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    key: K,
    support: usize,
    values: Vec<f64>,
}

impl<K> AggregateRow<K> {
    pub fn new(key: K, support: usize, values: Vec<f64>) -> Self {
        Self {
            key,
            support,
            values,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Number of raw rows combined into this row.
    pub fn support(&self) -> usize {
        self.support
    }

    /// Combined values, parallel to [`Aggregate::measures`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AggregateShapeError {
    #[error("row {row} has {actual} values but {expected} measures are declared")]
    ValueCount {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("row {row} has zero support")]
    ZeroSupport { row: usize },
    #[error("row {row} has a non-finite value for '{measure}'")]
    NonFinite { row: usize, measure: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One row per key, each with a value for every declared measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate<K> {
    measures: Vec<MeasureSpec>,
    rows: Vec<AggregateRow<K>>,
    report: AggregationReport,
}

/// Per-county aggregate.
pub type CountyAggregate = Aggregate<CountyKey>;

/// Aggregate keyed by a raw entity label (e.g. a driving-test centre).
pub type EntityAggregate = Aggregate<String>;

impl<K> Aggregate<K> {
    pub fn new(
        measures: Vec<MeasureSpec>,
        rows: Vec<AggregateRow<K>>,
        report: AggregationReport,
    ) -> Result<Self, AggregateShapeError> {
        let mut names = BTreeSet::new();
        for measure in &measures {
            if !names.insert(measure.name.as_str()) {
                return Err(ModelError::DuplicateMeasure {
                    column: measure.name.clone(),
                }
                .into());
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.values.len() != measures.len() {
                return Err(AggregateShapeError::ValueCount {
                    row: idx,
                    expected: measures.len(),
                    actual: row.values.len(),
                });
            }
            if row.support == 0 {
                return Err(AggregateShapeError::ZeroSupport { row: idx });
            }
            if let Some(pos) = row.values.iter().position(|v| !v.is_finite()) {
                return Err(AggregateShapeError::NonFinite {
                    row: idx,
                    measure: measures[pos].name.clone(),
                });
            }
        }
        Ok(Self {
            measures,
            rows,
            report,
        })
    }

    pub fn measures(&self) -> &[MeasureSpec] {
        &self.measures
    }

    pub fn rows(&self) -> &[AggregateRow<K>] {
        &self.rows
    }

    pub fn report(&self) -> &AggregationReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a measure by output name.
    pub fn measure_index(&self, name: &str) -> Option<usize> {
        self.measures.iter().position(|m| m.name == name)
    }

    /// Sum of support counts over all output rows.
    pub fn total_support(&self) -> usize {
        self.rows.iter().map(AggregateRow::support).sum()
    }

    /// All `(key, value)` pairs for one measure, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<(&K, f64)>> {
        let idx = self.measure_index(name)?;
        Some(self.rows.iter().map(|row| (&row.key, row.values[idx])).collect())
    }

    /// Reorder rows by one measure. Ties keep their previous relative order.
    #[must_use]
    pub fn sorted_by_measure(mut self, name: &str, descending: bool) -> Self {
        if let Some(idx) = self.measure_index(name) {
            self.rows.sort_by(|a, b| {
                let ord = a.values[idx].total_cmp(&b.values[idx]);
                if descending { ord.reverse() } else { ord }
            });
        }
        self
    }
}

impl<K: PartialEq> Aggregate<K> {
    pub fn get(&self, key: &K) -> Option<&AggregateRow<K>> {
        self.rows.iter().find(|row| &row.key == key)
    }

    pub fn value(&self, key: &K, measure: &str) -> Option<f64> {
        let idx = self.measure_index(measure)?;
        self.get(key).map(|row| row.values[idx])
    }
}

impl<K: Ord> Aggregate<K> {
    /// Restore ascending key order.
    #[must_use]
    pub fn sorted_by_key(mut self) -> Self {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CountyKey {
        CountyKey::new(name).unwrap()
    }

    #[test]
    fn rejects_rows_with_wrong_value_count() {
        let err = CountyAggregate::new(
            vec![MeasureSpec::mean("Pass Rate")],
            vec![AggregateRow::new(key("Cork"), 1, vec![])],
            AggregationReport::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AggregateShapeError::ValueCount { .. }));
    }

    #[test]
    fn rejects_duplicate_measure_names() {
        let err = CountyAggregate::new(
            vec![MeasureSpec::mean("Pass Rate"), MeasureSpec::sum("Pass Rate")],
            vec![],
            AggregationReport::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AggregateShapeError::Model(_)));
    }

    #[test]
    fn rejects_nan_values() {
        let err = CountyAggregate::new(
            vec![MeasureSpec::mean("Pass Rate")],
            vec![AggregateRow::new(key("Cork"), 2, vec![f64::NAN])],
            AggregationReport::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AggregateShapeError::NonFinite { .. }));
    }

    #[test]
    fn sorts_by_measure_and_back() {
        let agg = CountyAggregate::new(
            vec![MeasureSpec::sum("Number of Tests")],
            vec![
                AggregateRow::new(key("Cork"), 3, vec![120.0]),
                AggregateRow::new(key("Kerry"), 2, vec![300.0]),
            ],
            AggregationReport::default(),
        )
        .unwrap();
        let by_tests = agg.sorted_by_measure("Number of Tests", true);
        assert_eq!(by_tests.rows()[0].key().as_str(), "Kerry");
        let by_key = by_tests.sorted_by_key();
        assert_eq!(by_key.rows()[0].key().as_str(), "Cork");
        assert_eq!(by_key.value(&key("Kerry"), "Number of Tests"), Some(300.0));
        assert_eq!(by_key.total_support(), 5);
    }
}
