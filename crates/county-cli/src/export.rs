//! CSV export of aggregates and feature tables.
//!
//! Numbers are written at full precision through `format_numeric`, so a
//! re-read of the file yields the same values.

use std::fmt::Display;
use std::path::Path;

use anyhow::{Context, Result};
use county_core::Reconciliation;
use county_ingest::format_numeric;
use county_model::{Aggregate, CountyFeatureTable};

/// Header of the contributing-row count column.
pub const SUPPORT_HEADER: &str = "Rows";
/// Header of the boundary region id column.
pub const BOUNDARY_HEADER: &str = "Boundary";

fn create_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))
}

/// Write one row per key: the key, each measure, then the support.
pub fn write_aggregate<K: Display>(
    aggregate: &Aggregate<K>,
    key_header: &str,
    path: &Path,
) -> Result<()> {
    let mut writer = create_writer(path)?;
    let mut header = vec![key_header.to_string()];
    header.extend(aggregate.measures().iter().map(|measure| measure.name.clone()));
    header.push(SUPPORT_HEADER.to_string());
    writer.write_record(&header)?;

    for row in aggregate.rows() {
        let mut record = vec![row.key().to_string()];
        record.extend(row.values().iter().map(|value| format_numeric(*value)));
        record.push(row.support().to_string());
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = aggregate.len(), "wrote aggregate");
    Ok(())
}

/// Write one row per county with every base and derived column.
///
/// With a reconciliation, a trailing [`BOUNDARY_HEADER`] column carries the
/// matched region id, empty for unresolved counties.
pub fn write_feature_table(
    table: &CountyFeatureTable,
    key_header: &str,
    boundaries: Option<&Reconciliation>,
    path: &Path,
) -> Result<()> {
    let mut writer = create_writer(path)?;
    let mut header = vec![key_header.to_string()];
    header.extend(table.column_names().into_iter().map(str::to_string));
    if boundaries.is_some() {
        header.push(BOUNDARY_HEADER.to_string());
    }
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = vec![row.county().to_string()];
        record.extend(
            row.values()
                .iter()
                .chain(row.derived())
                .map(|value| format_numeric(*value)),
        );
        if let Some(reconciliation) = boundaries {
            let shape = reconciliation
                .get(row.county())
                .and_then(|resolution| resolution.shape_id())
                .unwrap_or_default();
            record.push(shape.to_string());
        }
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = table.len(), "wrote feature table");
    Ok(())
}
