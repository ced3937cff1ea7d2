//! Synonym-group cleaning of the age table.
//!
//! The age table reports some counties split into administrative areas
//! (`Cork City` and `Cork County`, the four Dublin local authorities, ...).
//! For every [`SynonymGroup`] the member rows are replaced by one row per
//! combination of the key dimensions, carrying the group name and the mean of
//! the members' values. Rows of labels in no group pass through unchanged.

use std::collections::BTreeMap;

use county_ingest::{column_f64, column_strings};
use county_model::{AgeColumns, SynonymMap};
use polars::prelude::{
    BooleanChunked, Column, DataFrame, DataType, NamedFrom, NewChunkedArray, Series,
    SortMultipleOptions,
};

use crate::error::{Result, ensure_column};

/// Where the rows of one cleaning pass went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub passthrough_rows: usize,
    /// Rows whose label belongs to a synonym group.
    pub member_rows: usize,
    /// Member rows with a missing key dimension; they belong to no combination.
    pub member_rows_without_key: usize,
    /// Rows emitted for synonym groups.
    pub synthesized_rows: usize,
    /// Groups with no matching row in the input.
    pub groups_without_rows: Vec<String>,
}

#[derive(Debug)]
struct Combination {
    first_row: usize,
    sum: f64,
    count: usize,
}

/// Collapse synonym groups in `df`.
///
/// The value column is read as numbers (missing and `NaN` cells become null)
/// and the entity column as text. Combinations whose member values are all
/// missing emit nothing, so no synthesized row has a missing value. Columns
/// other than the entity, value and key dimensions are null on synthesized
/// rows. The output is sorted by the key dimensions and then the entity.
pub fn clean_synonyms(
    df: &DataFrame,
    columns: &AgeColumns,
    synonyms: &SynonymMap,
) -> Result<(DataFrame, CleanReport)> {
    ensure_column(df, &columns.entity)?;
    ensure_column(df, &columns.value)?;
    for dimension in &columns.key_dimensions {
        ensure_column(df, dimension)?;
    }

    let entities = column_strings(df, &columns.entity)?;
    let values = column_f64(df, &columns.value)?;
    let dimensions = columns
        .key_dimensions
        .iter()
        .map(|name| column_strings(df, name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut base = df.clone();
    base.with_column(Series::new(columns.value.as_str().into(), values.clone()))?;
    base.with_column(df.column(&columns.entity)?.cast(&DataType::String)?)?;

    let mut report = CleanReport {
        input_rows: df.height(),
        ..CleanReport::default()
    };
    let mut keep = vec![true; df.height()];
    let mut combinations: BTreeMap<String, BTreeMap<Vec<String>, Combination>> = BTreeMap::new();
    let mut groups_seen = std::collections::BTreeSet::new();

    for row in 0..df.height() {
        let Some(group) = entities[row]
            .as_deref()
            .and_then(|label| synonyms.group_for(label))
        else {
            continue;
        };
        keep[row] = false;
        report.member_rows += 1;
        groups_seen.insert(group.name.clone());

        let key: Option<Vec<String>> = dimensions.iter().map(|dim| dim[row].clone()).collect();
        let Some(key) = key else {
            report.member_rows_without_key += 1;
            continue;
        };
        let combination = combinations
            .entry(group.name.clone())
            .or_default()
            .entry(key)
            .or_insert(Combination {
                first_row: row,
                sum: 0.0,
                count: 0,
            });
        if let Some(value) = values[row] {
            combination.sum += value;
            combination.count += 1;
        }
    }

    report.groups_without_rows = synonyms
        .groups()
        .iter()
        .filter(|group| !groups_seen.contains(&group.name))
        .map(|group| group.name.clone())
        .collect();

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let mut out = base.filter(&mask)?;
    report.passthrough_rows = out.height();

    for (group, by_key) in &combinations {
        for combination in by_key.values() {
            if combination.count == 0 {
                continue;
            }
            let mean = combination.sum / combination.count as f64;
            let row = synthesized_row(&base, columns, combination.first_row, group, mean)?;
            out.vstack_mut(&row)?;
            report.synthesized_rows += 1;
        }
    }

    let mut sort_by: Vec<String> = columns.key_dimensions.clone();
    sort_by.push(columns.entity.clone());
    let out = out.sort(sort_by, SortMultipleOptions::default().with_maintain_order(true))?;

    tracing::info!(
        input_rows = report.input_rows,
        member_rows = report.member_rows,
        synthesized_rows = report.synthesized_rows,
        output_rows = out.height(),
        "cleaned synonym groups"
    );
    for group in &report.groups_without_rows {
        tracing::debug!(group = %group, "synonym group matched no rows");
    }
    Ok((out, report))
}

/// One output row for a group combination, shaped like `base`.
fn synthesized_row(
    base: &DataFrame,
    columns: &AgeColumns,
    template_row: usize,
    group: &str,
    mean: f64,
) -> Result<DataFrame> {
    let template = base.slice(template_row as i64, 1);
    let row_columns: Vec<Column> = template
        .get_columns()
        .iter()
        .map(|column| {
            let name = column.name().as_str();
            if name == columns.entity {
                Column::new(column.name().clone(), [group])
            } else if name == columns.value {
                Column::new(column.name().clone(), [mean])
            } else if columns.key_dimensions.iter().any(|d| d == name) {
                column.clone()
            } else {
                Column::full_null(column.name().clone(), 1, column.dtype())
            }
        })
        .collect();
    Ok(DataFrame::new(row_columns)?)
}
