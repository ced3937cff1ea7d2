//! Adds a county column to a raw table.

use county_ingest::column_strings;
use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::error::{Result, ensure_column};
use crate::normalize::{NormalizeMode, Normalizer};

/// Counts from one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub rows: usize,
    pub matched: usize,
    /// Rows whose label yielded no county (left missing).
    pub unmatched: usize,
}

/// Return a copy of `df` with `target` holding the county read from
/// `source`.
///
/// Rows whose label does not match get a missing value; no row is removed
/// and the source column is kept as is.
pub fn extract_county_column(
    df: &DataFrame,
    source: &str,
    target: &str,
    normalizer: &Normalizer,
    mode: NormalizeMode,
) -> Result<(DataFrame, ExtractReport)> {
    ensure_column(df, source)?;
    let labels = column_strings(df, source)?;

    let counties: Vec<Option<String>> = labels
        .iter()
        .map(|label| {
            label
                .as_deref()
                .and_then(|text| normalizer.normalize(text, mode))
                .map(|key| key.into_inner())
        })
        .collect();

    let matched = counties.iter().filter(|c| c.is_some()).count();
    let report = ExtractReport {
        rows: counties.len(),
        matched,
        unmatched: counties.len() - matched,
    };

    let mut out = df.clone();
    out.with_column(Series::new(target.into(), counties))?;
    tracing::debug!(
        source,
        target,
        matched = report.matched,
        unmatched = report.unmatched,
        "extracted county column"
    );
    Ok((out, report))
}
