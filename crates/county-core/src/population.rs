//! Population lookup from the population table.

use county_ingest::{column_f64, column_strings};
use county_model::{CountyKey, PopulationColumns, PopulationLookup};
use polars::prelude::DataFrame;

use crate::aggregate::{AggregationPolicy, aggregate_records};
use crate::error::{CoreError, Result, ensure_column};
use crate::normalize::{NormalizeMode, Normalizer};

/// Build the per-county population in persons.
///
/// Rows not matching every configured filter are ignored. Labels are read
/// with the `Co.` prefix pattern, falling back to suffix stripping. Values are
/// multiplied by the unit multiplier (the published table is in thousands).
///
/// Each county must be left with a single row: a table holding several
/// census years or sexes needs `filters` to pick one, and is rejected with
/// [`CoreError::DuplicatePopulation`] otherwise.
pub fn build_population_lookup(
    df: &DataFrame,
    columns: &PopulationColumns,
    normalizer: &Normalizer,
) -> Result<PopulationLookup> {
    ensure_column(df, &columns.county)?;
    ensure_column(df, &columns.value)?;

    let mut selected = vec![true; df.height()];
    for (column, wanted) in &columns.filters {
        ensure_column(df, column)?;
        for (keep, cell) in selected.iter_mut().zip(column_strings(df, column)?) {
            *keep &= cell.as_deref() == Some(wanted.trim());
        }
    }

    let labels = column_strings(df, &columns.county)?;
    let values = column_f64(df, &columns.value)?;
    let records = labels
        .into_iter()
        .zip(values)
        .zip(selected)
        .filter(|(_, keep)| *keep)
        .map(|((label, value), _)| {
            let key: Option<CountyKey> = label
                .as_deref()
                .and_then(|text| normalizer.normalize(text, NormalizeMode::PrefixOrSuffix));
            (key, vec![value.map(|v| v * columns.unit_multiplier)])
        });

    let aggregate = aggregate_records(records, &AggregationPolicy::sum(columns.value.as_str()))?;
    if let Some(row) = aggregate.rows().iter().find(|row| row.support() > 1) {
        return Err(CoreError::DuplicatePopulation {
            county: row.key().to_string(),
            rows: row.support(),
        });
    }
    let lookup = PopulationLookup::new(
        aggregate
            .rows()
            .iter()
            .map(|row| (row.key().clone(), row.values()[0])),
    );
    tracing::info!(
        counties = lookup.len(),
        rejected = lookup.rejected().len(),
        dropped_rows = aggregate.report().dropped_missing,
        "built population lookup"
    );
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use county_model::PrefixPattern;
    use polars::prelude::Column;
    use std::collections::BTreeMap;

    #[test]
    fn converts_thousands_and_applies_filters() {
        let df = DataFrame::new(vec![
            Column::new("Sex".into(), ["Both sexes", "Male", "Both sexes", "Both sexes"]),
            Column::new("County".into(), ["Co. Cork", "Co. Cork", "Dublin", "Co. Leitrim"]),
            Column::new("VALUE".into(), [584.2, 290.0, 1458.2, 0.0]),
        ])
        .unwrap();
        let columns = PopulationColumns {
            filters: BTreeMap::from([("Sex".to_string(), "Both sexes".to_string())]),
            ..PopulationColumns::default()
        };
        let normalizer = Normalizer::new(PrefixPattern::Ascii).unwrap();
        let lookup = build_population_lookup(&df, &columns, &normalizer).unwrap();
        assert_eq!(lookup.len(), 2);
        let cork = lookup.get(&CountyKey::new("Cork").unwrap()).unwrap();
        assert!((cork - 584_200.0).abs() < 1e-6);
        assert!(lookup.get(&CountyKey::new("Dublin").unwrap()).is_some());
        assert_eq!(lookup.rejected(), &[CountyKey::new("Leitrim").unwrap()]);
    }

    fn census_years() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Year".into(), ["2016", "2022", "2016", "2022"]),
            Column::new("County".into(), ["Co. Cork", "Co. Cork", "Kerry", "Kerry"]),
            Column::new("VALUE".into(), [542.9, 584.2, 147.7, 156.5]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_several_rows_per_county() {
        let normalizer = Normalizer::new(PrefixPattern::Ascii).unwrap();
        let columns = PopulationColumns::default();
        let err = build_population_lookup(&census_years(), &columns, &normalizer).unwrap_err();
        match err {
            CoreError::DuplicatePopulation { county, rows } => {
                assert_eq!(county, "Cork");
                assert_eq!(rows, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn year_filter_selects_one_census() {
        let columns = PopulationColumns {
            filters: BTreeMap::from([("Year".to_string(), "2022".to_string())]),
            ..PopulationColumns::default()
        };
        let normalizer = Normalizer::new(PrefixPattern::Ascii).unwrap();
        let lookup = build_population_lookup(&census_years(), &columns, &normalizer).unwrap();
        let cork = lookup.get(&CountyKey::new("Cork").unwrap()).unwrap();
        assert!((cork - 584_200.0).abs() < 1e-6);
        let kerry = lookup.get(&CountyKey::new("Kerry").unwrap()).unwrap();
        assert!((kerry - 156_500.0).abs() < 1e-6);
    }
}
