//! Loading of the three statistics tables with schema checks.
//!
//! Each loader reads the CSV and verifies that every column the pipeline
//! depends on is present. A missing column is fatal: nothing downstream can
//! produce meaningful counties without it.

use std::path::Path;

use county_model::{AgeColumns, DrivingColumns, PopulationColumns};
use polars::prelude::DataFrame;

use crate::csv::read_csv_table;
use crate::error::{IngestError, Result};

pub const DRIVING_TABLE: &str = "driving test";
pub const AGE_TABLE: &str = "average age";
pub const POPULATION_TABLE: &str = "population";

/// Fail with [`IngestError::MissingColumn`] for the first absent column.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, table: &str, columns: &[S]) -> Result<()> {
    let present = df.get_column_names();
    for column in columns {
        let column = column.as_ref();
        if !present.iter().any(|name| name.as_str() == column) {
            return Err(IngestError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

pub fn driving_required_columns(columns: &DrivingColumns) -> Vec<&str> {
    vec![
        columns.centre.as_str(),
        columns.month.as_str(),
        columns.pass_rate.as_str(),
        columns.tests.as_str(),
    ]
}

pub fn age_required_columns(columns: &AgeColumns) -> Vec<&str> {
    let mut required = vec![columns.entity.as_str(), columns.value.as_str()];
    required.extend(columns.key_dimensions.iter().map(String::as_str));
    required
}

pub fn population_required_columns(columns: &PopulationColumns) -> Vec<&str> {
    let mut required = vec![columns.county.as_str(), columns.value.as_str()];
    required.extend(columns.filters.keys().map(String::as_str));
    required
}

/// Driving-test pass rates by centre and month.
pub fn load_driving_table(path: &Path, columns: &DrivingColumns) -> Result<DataFrame> {
    let df = read_csv_table(path)?;
    require_columns(&df, DRIVING_TABLE, &driving_required_columns(columns))?;
    tracing::info!(path = %path.display(), rows = df.height(), "loaded driving test table");
    Ok(df)
}

/// Average age by county and state.
pub fn load_age_table(path: &Path, columns: &AgeColumns) -> Result<DataFrame> {
    let df = read_csv_table(path)?;
    require_columns(&df, AGE_TABLE, &age_required_columns(columns))?;
    tracing::info!(path = %path.display(), rows = df.height(), "loaded average age table");
    Ok(df)
}

/// Population by county (values in the configured unit).
pub fn load_population_table(path: &Path, columns: &PopulationColumns) -> Result<DataFrame> {
    let df = read_csv_table(path)?;
    require_columns(&df, POPULATION_TABLE, &population_required_columns(columns))?;
    tracing::info!(path = %path.display(), rows = df.height(), "loaded population table");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn require_columns_names_the_missing_column() {
        let df = DataFrame::new(vec![Column::new("Driving Test Centre".into(), ["Athlone"])])
            .unwrap();
        let err = require_columns(&df, DRIVING_TABLE, &["Driving Test Centre", "Pass Rate"])
            .unwrap_err();
        match err {
            IngestError::MissingColumn { table, column } => {
                assert_eq!(table, "driving test");
                assert_eq!(column, "Pass Rate");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn age_required_columns_include_key_dimensions() {
        let columns = AgeColumns::default();
        let required = age_required_columns(&columns);
        assert!(required.contains(&"County and State"));
        assert!(required.contains(&"UNIT"));
        assert_eq!(required.len(), 6);
    }
}
