//! Joined per-county feature tables.
//!
//! A [`CountyFeatureTable`] is produced by the merge engine from two or more
//! aggregates. Base columns hold the joined measures; derived columns
//! (per-1000 rates, display scales) are computed from the base columns of
//! exactly the rows present in the table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::county::CountyKey;
use crate::error::ModelError;

/// Column name used for the joined population value.
pub const POPULATION_COLUMN: &str = "Population";

/// Target interval for min–max rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            floor: 0.3,
            ceiling: 1.0,
        }
    }
}

impl ScaleRange {
    pub fn new(floor: f64, ceiling: f64) -> Result<Self, ModelError> {
        let range = Self { floor, ceiling };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.floor.is_finite() && self.ceiling.is_finite() && self.floor < self.ceiling {
            Ok(())
        } else {
            Err(ModelError::InvalidScaleRange {
                floor: self.floor,
                ceiling: self.ceiling,
            })
        }
    }

    /// Map `value` from `[min, max]` onto `[floor, ceiling]`.
    ///
    /// When every observed value is the same (`min == max`) the whole column
    /// maps to the ceiling.
    pub fn rescale(&self, value: f64, min: f64, max: f64) -> f64 {
        let span = max - min;
        if span <= 0.0 {
            return self.ceiling;
        }
        self.floor + (value - min) / span * (self.ceiling - self.floor)
    }
}

/// A column computed after the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedColumn {
    /// `numerator / denominator * 1000`.
    RatePerThousand {
        name: String,
        numerator: String,
        denominator: String,
    },
    /// Min–max rescaling of `source` into `range`.
    Scaled {
        name: String,
        source: String,
        range: ScaleRange,
    },
}

impl DerivedColumn {
    pub fn rate_per_thousand(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self::RatePerThousand {
            name: name.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    pub fn scaled(name: impl Into<String>, source: impl Into<String>, range: ScaleRange) -> Self {
        Self::Scaled {
            name: name.into(),
            source: source.into(),
            range,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::RatePerThousand { name, .. } | Self::Scaled { name, .. } => name,
        }
    }

    /// Base columns this derivation reads.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::RatePerThousand {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_str(), denominator.as_str()],
            Self::Scaled { source, .. } => vec![source.as_str()],
        }
    }
}

/// One joined county.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    county: CountyKey,
    values: Vec<f64>,
    derived: Vec<f64>,
}

impl FeatureRow {
    pub fn new(county: CountyKey, values: Vec<f64>, derived: Vec<f64>) -> Self {
        Self {
            county,
            values,
            derived,
        }
    }

    pub fn county(&self) -> &CountyKey {
        &self.county
    }

    /// Base values, parallel to [`CountyFeatureTable::base_columns`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Derived values, parallel to [`CountyFeatureTable::derived_columns`].
    pub fn derived(&self) -> &[f64] {
        &self.derived
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FeatureShapeError {
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("derived column '{derived}' reads unknown base column '{input}'")]
    UnknownInput { derived: String, input: String },
    #[error("row for '{county}' has {actual} {kind} values, expected {expected}")]
    RowWidth {
        county: String,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("row for '{county}' has a non-finite value")]
    NonFinite { county: String },
    #[error("county '{0}' appears twice")]
    DuplicateCounty(String),
}

/// Inner-joined per-county table.
///
/// Every row carries a finite value for every base and derived column; the
/// constructor rejects anything else, so a row with a missing joined field
/// cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyFeatureTable {
    base_columns: Vec<String>,
    derived_columns: Vec<DerivedColumn>,
    rows: Vec<FeatureRow>,
}

impl CountyFeatureTable {
    pub fn new(
        base_columns: Vec<String>,
        derived_columns: Vec<DerivedColumn>,
        rows: Vec<FeatureRow>,
    ) -> Result<Self, FeatureShapeError> {
        let mut seen = std::collections::BTreeSet::new();
        for name in base_columns
            .iter()
            .map(String::as_str)
            .chain(derived_columns.iter().map(DerivedColumn::name))
        {
            if !seen.insert(name) {
                return Err(FeatureShapeError::DuplicateColumn(name.to_string()));
            }
        }
        for derived in &derived_columns {
            for input in derived.inputs() {
                if !base_columns.iter().any(|c| c == input) {
                    return Err(FeatureShapeError::UnknownInput {
                        derived: derived.name().to_string(),
                        input: input.to_string(),
                    });
                }
            }
        }
        let mut counties = std::collections::BTreeSet::new();
        for row in &rows {
            let county = row.county.to_string();
            if row.values.len() != base_columns.len() {
                return Err(FeatureShapeError::RowWidth {
                    county,
                    kind: "base",
                    expected: base_columns.len(),
                    actual: row.values.len(),
                });
            }
            if row.derived.len() != derived_columns.len() {
                return Err(FeatureShapeError::RowWidth {
                    county,
                    kind: "derived",
                    expected: derived_columns.len(),
                    actual: row.derived.len(),
                });
            }
            if row.values.iter().chain(&row.derived).any(|v| !v.is_finite()) {
                return Err(FeatureShapeError::NonFinite { county });
            }
            if !counties.insert(row.county.clone()) {
                return Err(FeatureShapeError::DuplicateCounty(county));
            }
        }
        Ok(Self {
            base_columns,
            derived_columns,
            rows,
        })
    }

    pub fn base_columns(&self) -> &[String] {
        &self.base_columns
    }

    pub fn derived_columns(&self) -> &[DerivedColumn] {
        &self.derived_columns
    }

    /// Base column names followed by derived column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.base_columns
            .iter()
            .map(String::as_str)
            .chain(self.derived_columns.iter().map(DerivedColumn::name))
            .collect()
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn counties(&self) -> Vec<&CountyKey> {
        self.rows.iter().map(FeatureRow::county).collect()
    }

    pub fn get(&self, county: &CountyKey) -> Option<&FeatureRow> {
        self.rows.iter().find(|row| &row.county == county)
    }

    /// Value of a base or derived column for one row.
    pub fn value(&self, row: &FeatureRow, column: &str) -> Option<f64> {
        if let Some(idx) = self.base_columns.iter().position(|c| c == column) {
            return row.values.get(idx).copied();
        }
        let idx = self
            .derived_columns
            .iter()
            .position(|d| d.name() == column)?;
        row.derived.get(idx).copied()
    }

    /// Every value of one column, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<f64>> {
        if !self.column_names().contains(&column) {
            return None;
        }
        self.rows
            .iter()
            .map(|row| self.value(row, column))
            .collect()
    }

    /// Observed `(min, max)` of a column, `None` for an empty table or an
    /// unknown column.
    pub fn min_max(&self, column: &str) -> Option<(f64, f64)> {
        let values = self.column(column)?;
        let mut iter = values.into_iter();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CountyKey {
        CountyKey::new(name).unwrap()
    }

    #[test]
    fn rescale_maps_extremes_to_bounds() {
        let range = ScaleRange::default();
        assert!((range.rescale(10.0, 10.0, 20.0) - 0.3).abs() < 1e-12);
        assert!((range.rescale(20.0, 10.0, 20.0) - 1.0).abs() < 1e-12);
        assert!((range.rescale(15.0, 10.0, 20.0) - 0.65).abs() < 1e-12);
        assert_eq!(range.rescale(5.0, 5.0, 5.0), 1.0);
    }

    #[test]
    fn scale_range_rejects_inverted_bounds() {
        assert!(ScaleRange::new(1.0, 0.3).is_err());
        assert!(ScaleRange::new(0.3, 0.3).is_err());
        assert!(ScaleRange::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn table_rejects_short_rows() {
        let err = CountyFeatureTable::new(
            vec!["Pass Rate".into(), "Average Age".into()],
            vec![],
            vec![FeatureRow::new(key("Cork"), vec![55.0], vec![])],
        )
        .unwrap_err();
        assert!(matches!(err, FeatureShapeError::RowWidth { .. }));
    }

    #[test]
    fn table_rejects_derived_column_on_unknown_input() {
        let err = CountyFeatureTable::new(
            vec!["Number of Tests".into()],
            vec![DerivedColumn::rate_per_thousand(
                "Tests per 1000",
                "Number of Tests",
                POPULATION_COLUMN,
            )],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, FeatureShapeError::UnknownInput { .. }));
    }

    #[test]
    fn column_lookup_covers_base_and_derived() {
        let table = CountyFeatureTable::new(
            vec!["Number of Tests".into(), POPULATION_COLUMN.into()],
            vec![DerivedColumn::rate_per_thousand(
                "Tests per 1000",
                "Number of Tests",
                POPULATION_COLUMN,
            )],
            vec![
                FeatureRow::new(key("Cork"), vec![500.0, 250_000.0], vec![2.0]),
                FeatureRow::new(key("Kerry"), vec![300.0, 150_000.0], vec![2.0]),
            ],
        )
        .unwrap();
        assert_eq!(table.column("Tests per 1000"), Some(vec![2.0, 2.0]));
        assert_eq!(table.min_max(POPULATION_COLUMN), Some((150_000.0, 250_000.0)));
        assert_eq!(table.column("Missing"), None);
        assert_eq!(
            table.column_names(),
            vec!["Number of Tests", POPULATION_COLUMN, "Tests per 1000"]
        );
    }
}
