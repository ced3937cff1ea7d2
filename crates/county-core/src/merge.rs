//! Cross-table merge of county aggregates.
//!
//! The merge engine inner-joins measures from one or more aggregates (and,
//! optionally, the population lookup) on the county key. Derived columns are
//! computed strictly after the join, from the rows that survived it, so a
//! rescaled column always spans exactly `[floor, ceiling]` over the final
//! table.

use std::collections::BTreeMap;

use county_model::{
    CountyAggregate, CountyFeatureTable, CountyKey, DerivedColumn, FeatureRow, POPULATION_COLUMN,
    PopulationLookup, Weighting,
};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
struct ColumnPick<'a> {
    aggregate: &'a CountyAggregate,
    measure: String,
    output: String,
}

/// Builder for one inner join.
///
/// ```
/// # use county_core::{AggregationPolicy, MergeEngine, aggregate_records};
/// # use county_model::CountyKey;
/// let pass = aggregate_records(
///     [(CountyKey::new("Cork"), vec![Some(55.0)])],
///     &AggregationPolicy::mean("Pass Rate"),
/// ).unwrap();
/// let age = aggregate_records(
///     [(CountyKey::new("Cork"), vec![Some(38.0)]), (CountyKey::new("Kerry"), vec![Some(40.0)])],
///     &AggregationPolicy::mean("VALUE"),
/// ).unwrap();
/// let table = MergeEngine::new()
///     .column(&pass, "Pass Rate", "Pass Rate")
///     .column(&age, "VALUE", "Average Age")
///     .merge()
///     .unwrap();
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MergeEngine<'a> {
    picks: Vec<ColumnPick<'a>>,
    population: Option<&'a PopulationLookup>,
    derived: Vec<DerivedColumn>,
}

impl<'a> MergeEngine<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join `measure` of `aggregate` as base column `output`.
    #[must_use]
    pub fn column(mut self, aggregate: &'a CountyAggregate, measure: &str, output: &str) -> Self {
        self.picks.push(ColumnPick {
            aggregate,
            measure: measure.to_string(),
            output: output.to_string(),
        });
        self
    }

    /// Require a population for every joined county; the value is stored in
    /// [`POPULATION_COLUMN`].
    #[must_use]
    pub fn with_population(mut self, lookup: &'a PopulationLookup) -> Self {
        self.population = Some(lookup);
        self
    }

    #[must_use]
    pub fn derive(mut self, column: DerivedColumn) -> Self {
        self.derived.push(column);
        self
    }

    pub fn merge(&self) -> Result<CountyFeatureTable> {
        let first = self.picks.first().ok_or(CoreError::NoMergeSources)?;

        let mut lookups: Vec<BTreeMap<&CountyKey, f64>> = Vec::with_capacity(self.picks.len());
        for pick in &self.picks {
            let column = pick
                .aggregate
                .column(&pick.measure)
                .ok_or_else(|| CoreError::UnknownColumn {
                    column: pick.measure.clone(),
                })?;
            lookups.push(column.into_iter().collect());
        }

        let mut base_columns: Vec<String> = self.picks.iter().map(|p| p.output.clone()).collect();
        if self.population.is_some() {
            base_columns.push(POPULATION_COLUMN.to_string());
        }

        let mut candidates: Vec<&CountyKey> = first.aggregate.rows().iter().map(|r| r.key()).collect();
        candidates.sort();

        let mut rows = Vec::with_capacity(candidates.len());
        let mut missing_population = 0usize;
        for key in candidates {
            let Some(mut values) = lookups
                .iter()
                .map(|lookup| lookup.get(key).copied())
                .collect::<Option<Vec<f64>>>()
            else {
                continue;
            };
            if let Some(population) = self.population {
                match population.get(key) {
                    Some(persons) => values.push(persons),
                    None => {
                        missing_population += 1;
                        continue;
                    }
                }
            }
            rows.push((key.clone(), values));
        }

        let table = build_feature_table(base_columns, self.derived.clone(), rows)?;
        if table.is_empty() {
            tracing::warn!(sources = self.picks.len(), "merge produced no counties");
        }
        tracing::info!(
            counties = table.len(),
            candidates = first.aggregate.len(),
            missing_population,
            "merged county tables"
        );
        Ok(table)
    }
}

/// Build a feature table from base values, computing every derived column
/// over exactly these rows.
///
/// Rows whose per-1000 denominator is not positive are dropped before
/// anything is rescaled.
pub fn build_feature_table(
    base_columns: Vec<String>,
    derived: Vec<DerivedColumn>,
    rows: Vec<(CountyKey, Vec<f64>)>,
) -> Result<CountyFeatureTable> {
    // Validates column names and derived inputs before any index lookup.
    CountyFeatureTable::new(base_columns.clone(), derived.clone(), Vec::new())?;
    let position = |name: &str| base_columns.iter().position(|c| c == name);

    let denominators: Vec<usize> = derived
        .iter()
        .filter_map(|column| match column {
            DerivedColumn::RatePerThousand { denominator, .. } => position(denominator),
            DerivedColumn::Scaled { .. } => None,
        })
        .collect();
    let rows: Vec<(CountyKey, Vec<f64>)> = rows
        .into_iter()
        .filter(|(county, values)| {
            let usable = denominators.iter().all(|&idx| values[idx] > 0.0);
            if !usable {
                tracing::debug!(county = %county, "dropped county with non-positive denominator");
            }
            usable
        })
        .collect();

    let mut derived_values: Vec<Vec<f64>> = vec![Vec::with_capacity(derived.len()); rows.len()];
    for column in &derived {
        match column {
            DerivedColumn::RatePerThousand {
                numerator,
                denominator,
                ..
            } => {
                let (num, den) = (input(&position, numerator)?, input(&position, denominator)?);
                for (out, (_, values)) in derived_values.iter_mut().zip(&rows) {
                    out.push(values[num] / values[den] * 1000.0);
                }
            }
            DerivedColumn::Scaled { source, range, .. } => {
                let idx = input(&position, source)?;
                let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, (_, v)| {
                    (acc.0.min(v[idx]), acc.1.max(v[idx]))
                });
                for (out, (_, values)) in derived_values.iter_mut().zip(&rows) {
                    out.push(range.rescale(values[idx], min, max));
                }
            }
        }
    }

    let rows = rows
        .into_iter()
        .zip(derived_values)
        .map(|((county, values), derived)| FeatureRow::new(county, values, derived))
        .collect();
    Ok(CountyFeatureTable::new(base_columns, derived, rows)?)
}

fn input(position: &impl Fn(&str) -> Option<usize>, name: &str) -> Result<usize> {
    position(name).ok_or_else(|| CoreError::UnknownColumn {
        column: name.to_string(),
    })
}

/// Keep the rows matching `keep`, recomputing derived columns over them.
pub fn filter_rows<F>(table: &CountyFeatureTable, mut keep: F) -> Result<CountyFeatureTable>
where
    F: FnMut(&FeatureRow) -> bool,
{
    let rows = table
        .rows()
        .iter()
        .filter(|row| keep(row))
        .map(|row| (row.county().clone(), row.values().to_vec()))
        .collect();
    build_feature_table(
        table.base_columns().to_vec(),
        table.derived_columns().to_vec(),
        rows,
    )
}

/// Result of a range filter.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub table: CountyFeatureTable,
    /// The range matched no county and the full table was returned instead.
    pub fell_back: bool,
}

/// Keep counties whose `column` lies in `[low, high]`.
///
/// An empty selection falls back to the unfiltered table.
pub fn filter_range(
    table: &CountyFeatureTable,
    column: &str,
    low: f64,
    high: f64,
) -> Result<RangeFilter> {
    if !table.column_names().contains(&column) {
        return Err(CoreError::UnknownColumn {
            column: column.to_string(),
        });
    }
    let filtered = filter_rows(table, |row| {
        table
            .value(row, column)
            .is_some_and(|v| v >= low && v <= high)
    })?;
    if filtered.is_empty() {
        tracing::debug!(column, low, high, "range filter matched nothing, using all counties");
        return Ok(RangeFilter {
            table: table.clone(),
            fell_back: true,
        });
    }
    Ok(RangeFilter {
        table: filtered,
        fell_back: false,
    })
}

/// Mean of `column` across counties.
///
/// With [`Weighting::Population`] each county is weighted by its
/// [`POPULATION_COLUMN`] value, which the table must carry. `None` for an
/// empty table.
pub fn summary_mean(
    table: &CountyFeatureTable,
    column: &str,
    weighting: Weighting,
) -> Result<Option<f64>> {
    let values = table.column(column).ok_or_else(|| CoreError::UnknownColumn {
        column: column.to_string(),
    })?;
    if values.is_empty() {
        return Ok(None);
    }
    match weighting {
        Weighting::Unweighted => Ok(crate::stats::mean(&values)),
        Weighting::Population => {
            let weights = table
                .column(POPULATION_COLUMN)
                .ok_or_else(|| CoreError::UnknownColumn {
                    column: POPULATION_COLUMN.to_string(),
                })?;
            let total: f64 = weights.iter().sum();
            let weighted: f64 = values.iter().zip(&weights).map(|(v, w)| v * w).sum();
            Ok(Some(weighted / total))
        }
    }
}
