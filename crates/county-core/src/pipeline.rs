//! The county pipeline object.
//!
//! [`CountyPipeline`] holds the configuration and the pieces compiled from
//! it (prefix pattern, synonym map). Every operation takes its input tables
//! as arguments and returns a fresh result; nothing is cached between calls,
//! so a filter change simply re-runs the relevant operation.

use county_model::{
    Aggregate, AggregateRow, CountyAggregate, CountyFeatureTable, DerivedColumn, EntityAggregate,
    GeoBoundaryIndex, MeasureSpec, POPULATION_COLUMN, PipelineConfig, PopulationLookup, SynonymMap,
};
use county_ingest::{column_f64, column_strings};
use polars::prelude::DataFrame;

use crate::aggregate::{AggregationPolicy, aggregate_by_county, aggregate_records};
use crate::clean::{CleanReport, clean_synonyms};
use crate::error::{Result, ensure_column};
use crate::extract::extract_county_column;
use crate::merge::{MergeEngine, filter_rows, summary_mean};
use crate::normalize::{NormalizeMode, Normalizer};
use crate::population::build_population_lookup;
use crate::reconcile::NameReconciler;
use crate::timeseries::{MonthlySeries, national_monthly_series};
use crate::volume::{VolumeAnalysis, volume_analysis};

/// County column added to the source tables.
pub const COUNTY_COLUMN: &str = "County";
pub const AVERAGE_AGE_COLUMN: &str = "Average Age";
pub const TESTS_PER_THOUSAND_COLUMN: &str = "Tests per 1000";
/// Population rescaled into the configured display range.
pub const OPACITY_COLUMN: &str = "Opacity";

#[derive(Debug, Clone)]
pub struct CountyPipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
    synonyms: SynonymMap,
}

impl CountyPipeline {
    /// Validate `config` and compile its patterns.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.scale.validate()?;
        let synonyms = SynonymMap::from_mapping(&config.age.synonym_groups)?;
        let normalizer = Normalizer::new(config.prefix_pattern)?;
        Ok(Self {
            config,
            normalizer,
            synonyms,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn synonyms(&self) -> &SynonymMap {
        &self.synonyms
    }

    /// Driving-test table with the county read from the centre descriptor.
    pub fn driving_with_county(&self, driving: &DataFrame) -> Result<DataFrame> {
        let (df, _) = extract_county_column(
            driving,
            &self.config.driving.centre,
            COUNTY_COLUMN,
            &self.normalizer,
            NormalizeMode::Prefix,
        )?;
        Ok(df)
    }

    /// Mean pass rate per county.
    pub fn pass_rate_by_county(&self, driving: &DataFrame) -> Result<CountyAggregate> {
        let df = self.driving_with_county(driving)?;
        let policy = AggregationPolicy::mean(self.config.driving.pass_rate.as_str())
            .with_min_support(self.config.min_support.pass_rate);
        aggregate_by_county(&df, COUNTY_COLUMN, &policy)
    }

    /// Total number of tests per county.
    pub fn tests_by_county(&self, driving: &DataFrame) -> Result<CountyAggregate> {
        let df = self.driving_with_county(driving)?;
        let policy = AggregationPolicy::sum(self.config.driving.tests.as_str())
            .with_min_support(self.config.min_support.test_count);
        aggregate_by_county(&df, COUNTY_COLUMN, &policy)
    }

    /// Mean pass rate and total tests per county, keeping counties with at
    /// least `county_min_total_tests` tests.
    pub fn county_volume(&self, driving: &DataFrame) -> Result<CountyFeatureTable> {
        let driving_columns = &self.config.driving;
        let df = self.driving_with_county(driving)?;
        let policy = AggregationPolicy::new(vec![
            MeasureSpec::mean(driving_columns.pass_rate.as_str()),
            MeasureSpec::sum(driving_columns.tests.as_str()),
        ])
        .with_min_support(self.config.min_support.test_count);
        let aggregate = aggregate_by_county(&df, COUNTY_COLUMN, &policy)?;
        let table = MergeEngine::new()
            .column(&aggregate, &driving_columns.tests, &driving_columns.tests)
            .column(&aggregate, &driving_columns.pass_rate, &driving_columns.pass_rate)
            .merge()?;
        let min_total = self.config.county_min_total_tests;
        filter_rows(&table, |row| {
            table
                .value(row, &driving_columns.tests)
                .is_some_and(|total| total >= min_total)
        })
    }

    /// Collapse synonym groups in the age table.
    pub fn clean_age(&self, age: &DataFrame) -> Result<(DataFrame, CleanReport)> {
        clean_synonyms(age, &self.config.age, &self.synonyms)
    }

    /// Mean age per county from an age table, cleaned or not.
    pub fn age_by_county(&self, age: &DataFrame) -> Result<CountyAggregate> {
        let (cleaned, _) = self.clean_age(age)?;
        let (df, _) = extract_county_column(
            &cleaned,
            &self.config.age.entity,
            COUNTY_COLUMN,
            &self.normalizer,
            NormalizeMode::SuffixStrip,
        )?;
        let policy = AggregationPolicy::mean(self.config.age.value.as_str())
            .with_min_support(self.config.min_support.age);
        aggregate_by_county(&df, COUNTY_COLUMN, &policy)
    }

    pub fn population_lookup(&self, population: &DataFrame) -> Result<PopulationLookup> {
        build_population_lookup(population, &self.config.population, &self.normalizer)
    }

    /// Pass rate against average age, one row per county present in both.
    pub fn pass_rate_vs_age(&self, driving: &DataFrame, age: &DataFrame) -> Result<CountyFeatureTable> {
        let pass_rate = self.pass_rate_by_county(driving)?;
        let average_age = self.age_by_county(age)?;
        MergeEngine::new()
            .column(&pass_rate, &self.config.driving.pass_rate, &self.config.driving.pass_rate)
            .column(&average_age, &self.config.age.value, AVERAGE_AGE_COLUMN)
            .merge()
    }

    /// Tests per 1000 population with a display opacity scaled from
    /// population.
    pub fn tests_per_capita(
        &self,
        driving: &DataFrame,
        population: &DataFrame,
    ) -> Result<CountyFeatureTable> {
        let tests = self.tests_by_county(driving)?;
        let lookup = self.population_lookup(population)?;
        let tests_column = &self.config.driving.tests;
        MergeEngine::new()
            .column(&tests, tests_column, tests_column)
            .with_population(&lookup)
            .derive(DerivedColumn::rate_per_thousand(
                TESTS_PER_THOUSAND_COLUMN,
                tests_column.as_str(),
                POPULATION_COLUMN,
            ))
            .derive(DerivedColumn::scaled(
                OPACITY_COLUMN,
                POPULATION_COLUMN,
                self.config.scale,
            ))
            .merge()
    }

    /// Mean pass rate and total tests per test centre, national rows excluded.
    ///
    /// Each measure skips only its own missing cells: a month with a test
    /// count but no pass rate still adds to the centre's total. Centres
    /// without any pass rate are omitted, and a centre without any test count
    /// totals zero. Support counts the rows that carry a pass rate.
    pub fn centre_summary(&self, driving: &DataFrame) -> Result<EntityAggregate> {
        let columns = &self.config.driving;
        ensure_column(driving, &columns.centre)?;
        ensure_column(driving, &columns.pass_rate)?;
        ensure_column(driving, &columns.tests)?;
        let centres = column_strings(driving, &columns.centre)?;
        let rates = column_f64(driving, &columns.pass_rate)?;
        let tests = column_f64(driving, &columns.tests)?;

        let rows: Vec<_> = centres
            .into_iter()
            .zip(rates.into_iter().zip(tests))
            .filter(|(centre, _)| centre.as_deref() != Some(columns.national_label.as_str()))
            .collect();
        let rate_policy = AggregationPolicy::mean(columns.pass_rate.as_str())
            .with_min_support(self.config.min_support.centre);
        let by_rate: EntityAggregate = aggregate_records(
            rows.iter().map(|(centre, (rate, _))| (centre.clone(), vec![*rate])),
            &rate_policy,
        )?;
        let by_tests: EntityAggregate = aggregate_records(
            rows.into_iter().map(|(centre, (_, tests))| (centre, vec![tests])),
            &AggregationPolicy::sum(columns.tests.as_str()),
        )?;

        let combined = by_rate
            .rows()
            .iter()
            .map(|row| {
                let total = by_tests.value(row.key(), &columns.tests).unwrap_or(0.0);
                let values = vec![row.values()[0], total];
                AggregateRow::new(row.key().clone(), row.support(), values)
            })
            .collect();
        let measures = vec![
            MeasureSpec::mean(columns.pass_rate.as_str()),
            MeasureSpec::sum(columns.tests.as_str()),
        ];
        Ok(Aggregate::new(measures, combined, *by_rate.report())?)
    }

    pub fn national_trend(&self, driving: &DataFrame) -> Result<MonthlySeries> {
        national_monthly_series(driving, &self.config.driving)
    }

    pub fn volume_analysis(&self, driving: &DataFrame) -> Result<VolumeAnalysis> {
        volume_analysis(driving, &self.config.driving, self.config.volume_min_tests)
    }

    /// Reconciler over `index` using the configured aliases.
    pub fn reconciler<'a>(&self, index: &'a GeoBoundaryIndex) -> NameReconciler<'a> {
        NameReconciler::new(index).with_aliases(&self.config.boundaries.aliases)
    }

    /// Cross-county mean of `column` under the configured weighting.
    pub fn summary_mean(&self, table: &CountyFeatureTable, column: &str) -> Result<Option<f64>> {
        summary_mean(table, column, self.config.summary_weighting)
    }
}
