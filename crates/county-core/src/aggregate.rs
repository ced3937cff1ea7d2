//! One-row-per-key aggregation.
//!
//! The aggregator groups rows by a key column and combines measure columns
//! under an explicit [`AggregationPolicy`]:
//!
//! 1. rows without a key, or without a value for any aggregated measure, are
//!    excluded (never imputed);
//! 2. remaining rows are grouped by key and each measure is combined
//!    (mean or sum); the row count is the group's support;
//! 3. groups whose support is below the policy's minimum are removed;
//! 4. output is ascending by key.
//!
//! Every input row is accounted for in the [`AggregationReport`].

use std::collections::BTreeMap;

use county_ingest::{column_f64, column_strings};
use county_model::{
    Aggregate, AggregateRow, AggregationReport, CombineFn, CountyAggregate, CountyKey,
    EntityAggregate, MeasureSpec,
};
use polars::prelude::DataFrame;

use crate::error::{Result, ensure_column};

/// Measures to combine and the minimum support a group needs to be kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPolicy {
    pub measures: Vec<MeasureSpec>,
    /// `None` (or `Some(0)`) keeps every non-empty group.
    pub min_support: Option<usize>,
}

impl AggregationPolicy {
    pub fn new(measures: Vec<MeasureSpec>) -> Self {
        Self {
            measures,
            min_support: None,
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(vec![MeasureSpec::mean(column)])
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(vec![MeasureSpec::sum(column)])
    }

    #[must_use]
    pub fn with_min_support(mut self, min_support: Option<usize>) -> Self {
        self.min_support = min_support;
        self
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    support: usize,
    sums: Vec<f64>,
}

/// Aggregate in-memory records of `(key, measure values)`.
///
/// Each record's values are parallel to `policy.measures`.
pub fn aggregate_records<K, I>(records: I, policy: &AggregationPolicy) -> Result<Aggregate<K>>
where
    K: Ord,
    I: IntoIterator<Item = (Option<K>, Vec<Option<f64>>)>,
{
    let width = policy.measures.len();
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    let mut report = AggregationReport::default();

    for (key, values) in records {
        report.input_rows += 1;
        let Some(key) = key else {
            report.dropped_missing += 1;
            continue;
        };
        if values.len() != width || values.iter().any(Option::is_none) {
            report.dropped_missing += 1;
            continue;
        }
        let acc = groups.entry(key).or_insert_with(|| Accumulator {
            support: 0,
            sums: vec![0.0; width],
        });
        acc.support += 1;
        for (sum, value) in acc.sums.iter_mut().zip(values.into_iter().flatten()) {
            *sum += value;
        }
    }

    let min_support = policy.min_support.unwrap_or(0);
    let mut rows = Vec::with_capacity(groups.len());
    for (key, acc) in groups {
        if acc.support < min_support {
            report.dropped_insufficient_support += acc.support;
            report.groups_below_support += 1;
            continue;
        }
        report.supported_rows += acc.support;
        let values = acc
            .sums
            .iter()
            .zip(&policy.measures)
            .map(|(sum, measure)| match measure.combine {
                CombineFn::Sum => *sum,
                CombineFn::Mean => *sum / acc.support as f64,
            })
            .collect();
        rows.push(AggregateRow::new(key, acc.support, values));
    }

    debug_assert!(report.is_balanced());
    tracing::debug!(
        input_rows = report.input_rows,
        groups = rows.len(),
        dropped_missing = report.dropped_missing,
        dropped_insufficient_support = report.dropped_insufficient_support,
        "aggregated records"
    );
    Ok(Aggregate::new(policy.measures.clone(), rows, report)?)
}

/// Aggregate a frame by a county column (as produced by the extractor).
pub fn aggregate_by_county(
    df: &DataFrame,
    county_column: &str,
    policy: &AggregationPolicy,
) -> Result<CountyAggregate> {
    let keys = column_strings(df, checked_column(df, county_column)?)?
        .into_iter()
        .map(|label| label.and_then(|l| CountyKey::new(&l)));
    let measures = measure_columns(df, policy)?;
    let aggregate = aggregate_records(keys.zip(transpose(measures, df.height())), policy)?;
    log_report("county", county_column, aggregate.len(), aggregate.report());
    Ok(aggregate)
}

/// Aggregate a frame by a raw label column, e.g. the test centre.
pub fn aggregate_by_entity(
    df: &DataFrame,
    entity_column: &str,
    policy: &AggregationPolicy,
) -> Result<EntityAggregate> {
    let keys = column_strings(df, checked_column(df, entity_column)?)?;
    let measures = measure_columns(df, policy)?;
    let aggregate = aggregate_records(keys.into_iter().zip(transpose(measures, df.height())), policy)?;
    log_report("entity", entity_column, aggregate.len(), aggregate.report());
    Ok(aggregate)
}

fn checked_column<'a>(df: &DataFrame, column: &'a str) -> Result<&'a str> {
    ensure_column(df, column)?;
    Ok(column)
}

fn measure_columns(df: &DataFrame, policy: &AggregationPolicy) -> Result<Vec<Vec<Option<f64>>>> {
    policy
        .measures
        .iter()
        .map(|measure| {
            ensure_column(df, &measure.column)?;
            Ok(column_f64(df, &measure.column)?)
        })
        .collect()
}

/// Column-major measure values to one `Vec` per row.
fn transpose(columns: Vec<Vec<Option<f64>>>, height: usize) -> Vec<Vec<Option<f64>>> {
    (0..height)
        .map(|row| columns.iter().map(|column| column[row]).collect())
        .collect()
}

fn log_report(kind: &str, key_column: &str, groups: usize, report: &AggregationReport) {
    tracing::info!(
        kind,
        key_column,
        groups,
        input_rows = report.input_rows,
        dropped_missing = report.dropped_missing,
        groups_below_support = report.groups_below_support,
        "aggregation complete"
    );
}
