//! CSV file reading into Polars DataFrames.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

/// Rows sampled for schema inference. The statistics tables mix numeric
/// cells with `NaN` placeholders, so sample generously.
pub const INFER_SCHEMA_ROWS: usize = 1000;

/// Check that the file exists and is readable before handing it to Polars,
/// so a missing input surfaces as [`IngestError::FileNotFound`].
pub fn check_readable(path: &Path) -> Result<()> {
    std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;
    Ok(())
}

/// Reads a CSV file with a single header row into a DataFrame.
///
/// A leading UTF-8 byte order mark is tolerated; header names are trimmed.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    check_readable(path)?;

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.width() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    normalize_headers(&mut df)?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded CSV table"
    );
    Ok(df)
}

/// Trim header whitespace and any BOM left on the first header.
fn normalize_headers(df: &mut DataFrame) -> Result<()> {
    let renames: Vec<(String, String)> = df
        .get_column_names()
        .into_iter()
        .filter_map(|name| {
            let raw = name.as_str();
            let cleaned = raw.trim_start_matches('\u{feff}').trim();
            (cleaned != raw).then(|| (raw.to_string(), cleaned.to_string()))
        })
        .collect();
    for (from, to) in renames {
        df.rename(&from, to.into())?;
    }
    Ok(())
}
