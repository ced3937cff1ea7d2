//! County-key normalization, aggregation and merge pipeline.
//!
//! Raw statistics tables flow through the stages in this order:
//!
//! 1. [`normalize`] / [`extract`]: read a canonical county from free text;
//! 2. [`clean`]: collapse city/county splits of the age table;
//! 3. [`aggregate`]: one row per county under an explicit policy;
//! 4. [`reconcile`]: match county keys to boundary regions;
//! 5. [`merge`]: inner-join aggregates and derive per-capita columns.
//!
//! [`CountyPipeline`] wires the stages together from a
//! [`county_model::PipelineConfig`].

pub mod aggregate;
pub mod clean;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod population;
pub mod reconcile;
pub mod stats;
pub mod timeseries;
pub mod volume;

pub use aggregate::{AggregationPolicy, aggregate_by_county, aggregate_by_entity, aggregate_records};
pub use clean::{CleanReport, clean_synonyms};
pub use dashboard::{DashboardStats, dashboard_stats, trendline};
pub use error::{CoreError, Result};
pub use extract::{ExtractReport, extract_county_column};
pub use merge::{MergeEngine, RangeFilter, build_feature_table, filter_range, filter_rows, summary_mean};
pub use normalize::{COUNTY_QUALIFIERS, NormalizeMode, Normalizer, strip_suffix, suffix_key};
pub use pipeline::{
    AVERAGE_AGE_COLUMN, COUNTY_COLUMN, CountyPipeline, OPACITY_COLUMN, TESTS_PER_THOUSAND_COLUMN,
};
pub use population::build_population_lookup;
pub use reconcile::{NameReconciler, ReconciledKey, Reconciliation};
pub use stats::{
    CorrelationStrength, LinearFit, correlation_direction, linear_fit, mean, pearson, sample_std,
};
pub use timeseries::{MonthlyPoint, MonthlySeries, national_monthly_series, parse_month_label};
pub use volume::{
    BinSummary, VOLUME_BINS, VolumeAnalysis, VolumeBin, analyze_volume, volume_analysis, volume_bin,
};
