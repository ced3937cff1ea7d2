use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use county_core::{
    AVERAGE_AGE_COLUMN, COUNTY_COLUMN, CountyPipeline, RangeFilter, Reconciliation,
    TESTS_PER_THOUSAND_COLUMN, dashboard_stats, filter_range,
};
use county_ingest::{
    load_age_table, load_boundary_index, load_driving_table, load_pipeline_config,
    load_population_table, write_csv_table,
};
use county_model::{AggregateRow, CountyKey, PipelineConfig};

use county_cli::export::{write_aggregate, write_feature_table};

use crate::cli::{
    CentresArgs, CleanAgeArgs, CountiesArgs, MeasureArg, MergeArgs, PerCapitaArgs, TrendArgs,
    VolumeArgs,
};
use crate::types::{
    CentresResult, CleanAgeResult, CountiesResult, MergeResult, PerCapitaResult, TrendResult,
    VolumeResult,
};

/// Configuration from `path`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => load_pipeline_config(path)
            .with_context(|| format!("load configuration {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn build_pipeline(config: PipelineConfig) -> Result<CountyPipeline> {
    CountyPipeline::new(config).context("invalid pipeline configuration")
}

fn load_driving(pipeline: &CountyPipeline, path: &Path) -> Result<DataFrame> {
    load_driving_table(path, &pipeline.config().driving)
        .with_context(|| format!("load driving test table {}", path.display()))
}

fn reconcile<'k, I>(pipeline: &CountyPipeline, geojson: &Path, keys: I) -> Result<Reconciliation>
where
    I: IntoIterator<Item = &'k CountyKey>,
{
    let index = load_boundary_index(geojson, &pipeline.config().boundaries.name_property)
        .with_context(|| format!("load boundaries {}", geojson.display()))?;
    Ok(pipeline.reconciler(&index).reconcile_all(keys))
}

pub fn run_counties(mut config: PipelineConfig, args: &CountiesArgs) -> Result<CountiesResult> {
    let _span = info_span!("counties").entered();
    if let Some(min_support) = args.min_support {
        match args.measure {
            MeasureArg::PassRate => config.min_support.pass_rate = Some(min_support),
            MeasureArg::Tests => config.min_support.test_count = Some(min_support),
            MeasureArg::Age => config.min_support.age = Some(min_support),
        }
    }
    let pipeline = build_pipeline(config)?;
    let aggregate = match args.measure {
        MeasureArg::PassRate | MeasureArg::Tests => {
            let Some(path) = &args.driving else {
                bail!("the pass-rate and tests measures need a driving test table (--driving)");
            };
            let driving = load_driving(&pipeline, path)?;
            let aggregate = match args.measure {
                MeasureArg::Tests => pipeline.tests_by_county(&driving),
                _ => pipeline.pass_rate_by_county(&driving),
            };
            aggregate.context("aggregate driving tests by county")?
        }
        MeasureArg::Age => {
            let Some(path) = &args.age else {
                bail!("the age measure needs an average-age table (--age)");
            };
            let age = load_age_table(path, &pipeline.config().age)
                .with_context(|| format!("load age table {}", path.display()))?;
            pipeline
                .age_by_county(&age)
                .context("aggregate average age by county")?
        }
    };

    let boundaries = match &args.geojson {
        Some(path) => Some(reconcile(
            &pipeline,
            path,
            aggregate.rows().iter().map(AggregateRow::key),
        )?),
        None => None,
    };
    if let Some(output) = &args.output {
        write_aggregate(&aggregate, COUNTY_COLUMN, output)?;
    }
    Ok(CountiesResult {
        aggregate,
        boundaries,
        output: args.output.clone(),
    })
}

pub fn run_clean_age(config: PipelineConfig, args: &CleanAgeArgs) -> Result<CleanAgeResult> {
    let _span = info_span!("clean_age").entered();
    let pipeline = build_pipeline(config)?;
    let age = load_age_table(&args.input, &pipeline.config().age)
        .with_context(|| format!("load age table {}", args.input.display()))?;
    let (mut cleaned, report) = pipeline.clean_age(&age).context("clean age table")?;
    write_csv_table(&mut cleaned, &args.output)
        .with_context(|| format!("write cleaned age table {}", args.output.display()))?;
    info!(
        output = %args.output.display(),
        rows = cleaned.height(),
        "wrote cleaned age table"
    );
    Ok(CleanAgeResult {
        report,
        rows: cleaned.height(),
        output: args.output.clone(),
    })
}

pub fn run_merge(mut config: PipelineConfig, args: &MergeArgs) -> Result<MergeResult> {
    let _span = info_span!("merge").entered();
    let age_range = match args.age_range.as_deref() {
        None => None,
        Some(&[low, high]) if low <= high => Some((low, high)),
        Some(&[low, high]) => bail!("age range is inverted: {low} > {high}"),
        Some(_) => bail!("age range takes exactly two values"),
    };
    if let Some(min_support) = args.min_support {
        config.min_support.pass_rate = Some(min_support);
    }
    let pipeline = build_pipeline(config)?;
    let driving = load_driving(&pipeline, &args.input.driving)?;
    let age = load_age_table(&args.age, &pipeline.config().age)
        .with_context(|| format!("load age table {}", args.age.display()))?;
    let merged = pipeline
        .pass_rate_vs_age(&driving, &age)
        .context("merge pass rate with average age")?;
    let merged_counties = merged.len();

    let RangeFilter { table, fell_back } = match age_range {
        Some((low, high)) => filter_range(&merged, AVERAGE_AGE_COLUMN, low, high)?,
        None => RangeFilter {
            table: merged,
            fell_back: false,
        },
    };
    let x = AVERAGE_AGE_COLUMN.to_string();
    let y = pipeline.config().driving.pass_rate.clone();
    let stats = dashboard_stats(&table, &x, &y)?;
    if let Some(output) = &args.output {
        write_feature_table(&table, COUNTY_COLUMN, None, output)?;
    }
    Ok(MergeResult {
        table,
        merged_counties,
        x,
        y,
        stats,
        age_range,
        fell_back,
        output: args.output.clone(),
    })
}

pub fn run_per_capita(config: PipelineConfig, args: &PerCapitaArgs) -> Result<PerCapitaResult> {
    let _span = info_span!("per_capita").entered();
    let pipeline = build_pipeline(config)?;
    let driving = load_driving(&pipeline, &args.input.driving)?;
    let population = load_population_table(&args.population, &pipeline.config().population)
        .with_context(|| format!("load population table {}", args.population.display()))?;
    let table = pipeline
        .tests_per_capita(&driving, &population)
        .context("compute tests per capita")?;

    let boundaries = match &args.geojson {
        Some(path) => Some(reconcile(&pipeline, path, table.counties())?),
        None => None,
    };
    let summary_mean = pipeline.summary_mean(&table, TESTS_PER_THOUSAND_COLUMN)?;
    if let Some(output) = &args.output {
        write_feature_table(&table, COUNTY_COLUMN, boundaries.as_ref(), output)?;
    }
    Ok(PerCapitaResult {
        table,
        boundaries,
        summary_mean,
        weighting: pipeline.config().summary_weighting,
        output: args.output.clone(),
    })
}

pub fn run_centres(mut config: PipelineConfig, args: &CentresArgs) -> Result<CentresResult> {
    let _span = info_span!("centres").entered();
    if let Some(min_support) = args.min_support {
        config.min_support.centre = Some(min_support);
    }
    let pipeline = build_pipeline(config)?;
    let driving = load_driving(&pipeline, &args.input.driving)?;
    let columns = &pipeline.config().driving;
    let aggregate = pipeline
        .centre_summary(&driving)
        .context("summarise test centres")?
        .sorted_by_measure(&columns.pass_rate, true);
    if let Some(output) = &args.output {
        write_aggregate(&aggregate, &columns.centre, output)?;
    }
    Ok(CentresResult {
        aggregate,
        centre_header: columns.centre.clone(),
        top: args.top,
        output: args.output.clone(),
    })
}

pub fn run_trend(config: PipelineConfig, args: &TrendArgs) -> Result<TrendResult> {
    let _span = info_span!("trend").entered();
    let pipeline = build_pipeline(config)?;
    let driving = load_driving(&pipeline, &args.input.driving)?;
    let series = pipeline
        .national_trend(&driving)
        .context("build national monthly series")?;
    Ok(TrendResult {
        series,
        year: args.year,
    })
}

pub fn run_volume(mut config: PipelineConfig, args: &VolumeArgs) -> Result<VolumeResult> {
    let _span = info_span!("volume").entered();
    if let Some(min_tests) = args.min_tests {
        if !min_tests.is_finite() {
            bail!("minimum tests must be a finite number");
        }
        config.volume_min_tests = min_tests;
    }
    let pipeline = build_pipeline(config)?;
    let driving = load_driving(&pipeline, &args.input.driving)?;
    let analysis = pipeline
        .volume_analysis(&driving)
        .context("analyse pass rate against test volume")?;
    let counties = pipeline
        .county_volume(&driving)
        .context("aggregate test volume by county")?;
    let columns = &pipeline.config().driving;
    let county_stats = dashboard_stats(&counties, &columns.tests, &columns.pass_rate)?;
    Ok(VolumeResult {
        analysis,
        min_tests: pipeline.config().volume_min_tests,
        counties,
        county_stats,
        county_min_total_tests: pipeline.config().county_min_total_tests,
    })
}
