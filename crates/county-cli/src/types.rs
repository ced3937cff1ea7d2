use std::path::PathBuf;

use county_core::{CleanReport, DashboardStats, MonthlySeries, Reconciliation, VolumeAnalysis};
use county_model::{CountyAggregate, CountyFeatureTable, EntityAggregate, Weighting};

#[derive(Debug)]
pub struct CountiesResult {
    pub aggregate: CountyAggregate,
    pub boundaries: Option<Reconciliation>,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct CleanAgeResult {
    pub report: CleanReport,
    /// Rows in the cleaned table.
    pub rows: usize,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct MergeResult {
    /// Merged table after the optional age range filter.
    pub table: CountyFeatureTable,
    /// Counties before filtering.
    pub merged_counties: usize,
    pub x: String,
    pub y: String,
    pub stats: DashboardStats,
    pub age_range: Option<(f64, f64)>,
    /// The age range matched nothing and every county is shown.
    pub fell_back: bool,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct PerCapitaResult {
    pub table: CountyFeatureTable,
    pub boundaries: Option<Reconciliation>,
    pub summary_mean: Option<f64>,
    pub weighting: Weighting,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct CentresResult {
    /// Centres ordered by descending pass rate.
    pub aggregate: EntityAggregate,
    pub centre_header: String,
    pub top: Option<usize>,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct TrendResult {
    pub series: MonthlySeries,
    pub year: Option<i32>,
}

#[derive(Debug)]
pub struct VolumeResult {
    pub analysis: VolumeAnalysis,
    pub min_tests: f64,
    /// Per-county pass rate and total tests.
    pub counties: CountyFeatureTable,
    /// Pass rate against total tests across counties.
    pub county_stats: DashboardStats,
    pub county_min_total_tests: f64,
}
