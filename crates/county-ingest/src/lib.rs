//! Source table ingestion for the county pipeline.
//!
//! Reads the statistics CSVs into Polars DataFrames (checking required
//! columns), the boundary GeoJSON into a [`county_model::GeoBoundaryIndex`],
//! and the optional TOML pipeline configuration.

pub mod config;
pub mod csv;
pub mod error;
pub mod geo;
pub mod polars_utils;
pub mod sources;

pub use config::load_pipeline_config;
pub use csv::{INFER_SCHEMA_ROWS, check_readable, read_csv_table, write_csv_table};
pub use error::{IngestError, Result};
pub use geo::{boundary_index_from_value, load_boundary_index};
pub use polars_utils::{
    any_to_f64, any_to_string, any_to_string_non_empty, column_f64, column_strings,
    format_numeric, parse_f64,
};
pub use sources::{
    AGE_TABLE, DRIVING_TABLE, POPULATION_TABLE, load_age_table, load_driving_table,
    load_population_table, require_columns,
};
