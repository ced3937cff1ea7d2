//! CLI argument definitions for county-stats.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "county-stats",
    version,
    about = "County-level driving test, age and population statistics",
    long_about = "Normalize county names across Irish statistics tables, aggregate \
                  them per county and merge them into per-county feature tables.\n\n\
                  Inputs are the driving test pass-rate CSV, the average-age CSV, the \
                  population CSV and a county boundary GeoJSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline configuration file (TOML). Defaults apply when omitted.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Aggregate one measure per county (pass rate, tests or average age).
    Counties(CountiesArgs),

    /// Collapse city/county splits in the average-age table.
    CleanAge(CleanAgeArgs),

    /// Pass rate against average age, one row per county.
    Merge(MergeArgs),

    /// Tests per 1000 population with a population-scaled opacity.
    PerCapita(PerCapitaArgs),

    /// Pass rate and test totals per test centre.
    Centres(CentresArgs),

    /// National monthly pass rate.
    Trend(TrendArgs),

    /// Pass rate against test volume.
    Volume(VolumeArgs),
}

#[derive(Args)]
pub struct DrivingInput {
    /// Driving test pass-rate CSV.
    #[arg(long = "driving", value_name = "CSV")]
    pub driving: PathBuf,
}

#[derive(Args)]
pub struct CountiesArgs {
    /// Driving test pass-rate CSV, read by the pass-rate and tests measures.
    #[arg(long = "driving", value_name = "CSV")]
    pub driving: Option<PathBuf>,

    /// Average-age CSV, cleaned or raw, read by the age measure.
    #[arg(long = "age", value_name = "CSV")]
    pub age: Option<PathBuf>,

    /// Measure to aggregate.
    #[arg(long = "measure", value_enum, default_value = "pass-rate")]
    pub measure: MeasureArg,

    /// Minimum contributing rows per county (overrides the configuration).
    #[arg(long = "min-support", value_name = "N")]
    pub min_support: Option<usize>,

    /// County boundary GeoJSON to check every county against.
    #[arg(long = "geojson", value_name = "PATH")]
    pub geojson: Option<PathBuf>,

    /// Write the aggregate to a CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanAgeArgs {
    /// Average-age CSV to clean.
    #[arg(value_name = "AGE_CSV")]
    pub input: PathBuf,

    /// Cleaned CSV to write.
    #[arg(long = "output", value_name = "CSV")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: DrivingInput,

    /// Average-age CSV, cleaned or raw.
    #[arg(long = "age", value_name = "CSV")]
    pub age: PathBuf,

    /// Minimum pass-rate rows per county (overrides the configuration).
    #[arg(long = "min-support", value_name = "N")]
    pub min_support: Option<usize>,

    /// Keep counties whose average age lies in [LOW, HIGH].
    #[arg(long = "age-range", num_args = 2, value_names = ["LOW", "HIGH"])]
    pub age_range: Option<Vec<f64>>,

    /// Write the merged table to a CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PerCapitaArgs {
    #[command(flatten)]
    pub input: DrivingInput,

    /// Population CSV.
    #[arg(long = "population", value_name = "CSV")]
    pub population: PathBuf,

    /// County boundary GeoJSON to attach region ids from.
    #[arg(long = "geojson", value_name = "PATH")]
    pub geojson: Option<PathBuf>,

    /// Write the per-capita table to a CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CentresArgs {
    #[command(flatten)]
    pub input: DrivingInput,

    /// Minimum rows per centre (overrides the configuration).
    #[arg(long = "min-support", value_name = "N")]
    pub min_support: Option<usize>,

    /// Show only the N centres with the highest pass rate.
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Write the centre summary to a CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub input: DrivingInput,

    /// Only show this year.
    #[arg(long = "year", value_name = "YEAR")]
    pub year: Option<i32>,
}

#[derive(Args)]
pub struct VolumeArgs {
    #[command(flatten)]
    pub input: DrivingInput,

    /// Skip rows with fewer tests (overrides the configuration).
    #[arg(long = "min-tests", value_name = "N")]
    pub min_tests: Option<f64>,
}

/// Driving-table measures that can be aggregated per county.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MeasureArg {
    /// Mean pass rate.
    PassRate,
    /// Total number of tests.
    Tests,
    /// Mean of the average-age table.
    Age,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
