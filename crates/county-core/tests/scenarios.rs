//! End-to-end behaviour of the county stages on small fixture tables.

use county_core::{
    AggregationPolicy, CountyPipeline, MergeEngine, Normalizer, aggregate_by_entity,
    aggregate_records, clean_synonyms, filter_range,
};
use county_ingest::{column_f64, column_strings};
use county_model::{
    AgeColumns, CountyKey, DerivedColumn, GeoBoundaryIndex, POPULATION_COLUMN, PipelineConfig,
    PopulationLookup, PrefixPattern, ScaleRange, SynonymMap, default_synonym_mapping,
};
use polars::prelude::{Column, DataFrame};

fn key(name: &str) -> CountyKey {
    CountyKey::new(name).expect("non-empty key")
}

fn age_table(rows: &[(&str, i64, Option<f64>)]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("Statistic Label".into(), vec!["Average Age"; rows.len()]),
        Column::new("Year".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Column::new("Sex".into(), vec!["Both sexes"; rows.len()]),
        Column::new("UNIT".into(), vec!["Number"; rows.len()]),
        Column::new(
            "County and State".into(),
            rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        ),
        Column::new("VALUE".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        Column::new("Note".into(), vec!["census"; rows.len()]),
    ])
    .expect("age table")
}

fn default_synonyms() -> SynonymMap {
    SynonymMap::from_mapping(&default_synonym_mapping()).expect("default synonyms")
}

#[test]
fn dublin_local_authorities_collapse_to_one_row() {
    let df = age_table(&[
        ("Dublin City", 2021, Some(38.2)),
        ("Fingal", 2021, Some(35.1)),
        ("South Dublin", 2021, Some(36.0)),
        ("Dún Laoghaire-Rathdown", 2021, Some(41.0)),
        ("Kerry", 2021, Some(40.1)),
    ]);
    let (cleaned, report) =
        clean_synonyms(&df, &AgeColumns::default(), &default_synonyms()).expect("clean");

    assert_eq!(cleaned.height(), 2);
    assert_eq!(report.member_rows, 4);
    assert_eq!(report.synthesized_rows, 1);

    let entities = column_strings(&cleaned, "County and State").expect("entities");
    let values = column_f64(&cleaned, "VALUE").expect("values");
    let notes = column_strings(&cleaned, "Note").expect("notes");
    let dublin = entities
        .iter()
        .position(|e| e.as_deref() == Some("Dublin"))
        .expect("dublin row");
    assert!((values[dublin].expect("dublin value") - 37.575).abs() < 1e-9);
    assert_eq!(notes[dublin], None);
    assert!(!entities.iter().any(|e| e.as_deref() == Some("Fingal")));

    let kerry = entities
        .iter()
        .position(|e| e.as_deref() == Some("Kerry"))
        .expect("kerry row");
    assert_eq!(notes[kerry].as_deref(), Some("census"));
}

#[test]
fn cleaning_cleaned_output_changes_nothing() {
    let df = age_table(&[
        ("Cork City", 2016, Some(36.0)),
        ("Cork County", 2016, Some(38.0)),
        ("Cork City", 2022, Some(37.0)),
        ("Galway City", 2022, None),
        ("Galway County", 2022, Some(39.0)),
        ("Leitrim", 2016, Some(41.0)),
    ]);
    let synonyms = default_synonyms();
    let (once, _) = clean_synonyms(&df, &AgeColumns::default(), &synonyms).expect("first");
    let (twice, report) = clean_synonyms(&once, &AgeColumns::default(), &synonyms).expect("second");
    assert!(once.equals_missing(&twice));
    assert_eq!(report.member_rows, 0);

    let entities = column_strings(&once, "County and State").expect("entities");
    let values = column_f64(&once, "VALUE").expect("values");
    let galway = entities
        .iter()
        .position(|e| e.as_deref() == Some("Galway"))
        .expect("galway row");
    assert_eq!(values[galway], Some(39.0));
    assert!(values.iter().all(Option::is_some));
}

#[test]
fn min_support_keeps_only_well_supported_counties() {
    let records = vec![
        (CountyKey::new("A"), vec![Some(80.0)]),
        (CountyKey::new("A"), vec![Some(90.0)]),
        (CountyKey::new("B"), vec![Some(70.0)]),
    ];
    let policy = AggregationPolicy::mean("Pass Rate").with_min_support(Some(2));
    let aggregate = aggregate_records(records, &policy).expect("aggregate");
    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate.value(&key("A"), "Pass Rate"), Some(85.0));
    assert_eq!(aggregate.get(&key("A")).map(|r| r.support()), Some(2));
    assert!(aggregate.get(&key("B")).is_none());
}

#[test]
fn inner_join_keeps_only_counties_in_every_source() {
    let pass = aggregate_records(
        vec![
            (CountyKey::new("Cork"), vec![Some(55.0)]),
            (CountyKey::new("Kerry"), vec![Some(60.0)]),
            (CountyKey::new("Mayo"), vec![Some(52.0)]),
        ],
        &AggregationPolicy::mean("Pass Rate"),
    )
    .expect("pass rate");
    let age = aggregate_records(
        vec![
            (CountyKey::new("Kerry"), vec![Some(40.0)]),
            (CountyKey::new("Cork"), vec![Some(38.0)]),
            (CountyKey::new("Sligo"), vec![Some(39.0)]),
        ],
        &AggregationPolicy::mean("VALUE"),
    )
    .expect("age");

    let table = MergeEngine::new()
        .column(&pass, "Pass Rate", "Pass Rate")
        .column(&age, "VALUE", "Average Age")
        .merge()
        .expect("merge");
    let counties: Vec<&str> = table.counties().iter().map(|c| c.as_str()).collect();
    assert_eq!(counties, vec!["Cork", "Kerry"]);
    for row in table.rows() {
        assert!(pass.get(row.county()).is_some());
        assert!(age.get(row.county()).is_some());
    }
}

#[test]
fn disjoint_sources_join_to_an_empty_table() {
    let a = aggregate_records(
        vec![(CountyKey::new("Cork"), vec![Some(1.0)])],
        &AggregationPolicy::sum("n"),
    )
    .expect("a");
    let b = aggregate_records(
        vec![(CountyKey::new("Kerry"), vec![Some(1.0)])],
        &AggregationPolicy::sum("n"),
    )
    .expect("b");
    let table = MergeEngine::new()
        .column(&a, "n", "a")
        .column(&b, "n", "b")
        .merge()
        .expect("empty join is not an error");
    assert!(table.is_empty());
}

#[test]
fn opacity_spans_range_on_filtered_rows() {
    let tests = aggregate_records(
        vec![
            (CountyKey::new("Cork"), vec![Some(5000.0)]),
            (CountyKey::new("Kerry"), vec![Some(1500.0)]),
            (CountyKey::new("Leitrim"), vec![Some(300.0)]),
            (CountyKey::new("Mayo"), vec![Some(1300.0)]),
        ],
        &AggregationPolicy::sum("Number of Tests"),
    )
    .expect("tests");
    let population = PopulationLookup::new([
        (key("Cork"), 584_000.0),
        (key("Kerry"), 156_000.0),
        (key("Leitrim"), 35_000.0),
        (key("Mayo"), 137_000.0),
    ]);
    let range = ScaleRange::default();
    let table = MergeEngine::new()
        .column(&tests, "Number of Tests", "Number of Tests")
        .with_population(&population)
        .derive(DerivedColumn::scaled("Opacity", POPULATION_COLUMN, range))
        .merge()
        .expect("merge");

    let filtered = filter_range(&table, POPULATION_COLUMN, 100_000.0, 200_000.0).expect("filter");
    assert!(!filtered.fell_back);
    assert_eq!(filtered.table.len(), 2);
    let opacity = filtered.table.column("Opacity").expect("opacity");
    let (lo, hi) = opacity
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    assert!((lo - range.floor).abs() < 1e-12);
    assert!((hi - range.ceiling).abs() < 1e-12);

    let nothing = filter_range(&table, POPULATION_COLUMN, 1.0, 2.0).expect("filter");
    assert!(nothing.fell_back);
    assert_eq!(nothing.table, table);
}

#[test]
fn centres_are_aggregated_by_raw_label() {
    let df = DataFrame::new(vec![
        Column::new(
            "Driving Test Centre".into(),
            ["Tralee, Co. Kerry", "Tralee, Co. Kerry", "Killarney, Co. Kerry"],
        ),
        Column::new("Pass Rate".into(), [60.0, 70.0, 50.0]),
    ])
    .expect("driving");
    let aggregate = aggregate_by_entity(&df, "Driving Test Centre", &AggregationPolicy::mean("Pass Rate"))
        .expect("aggregate");
    assert_eq!(aggregate.len(), 2);
    assert_eq!(
        aggregate.value(&"Tralee, Co. Kerry".to_string(), "Pass Rate"),
        Some(65.0)
    );
}

#[test]
fn pipeline_joins_pass_rate_and_age() {
    let driving = DataFrame::new(vec![
        Column::new(
            "Driving Test Centre".into(),
            [
                "Tralee, Co. Kerry",
                "Killarney, Co. Kerry",
                "Cork, Co. Cork",
                "All driving test centres",
                "Finglas, Co. Dublin",
            ],
        ),
        Column::new(
            "Month".into(),
            ["2023 May", "2023 May", "2023 May", "2023 May", "2023 May"],
        ),
        Column::new(
            "Pass Rate".into(),
            [Some(60.0), Some(50.0), Some(40.0), Some(51.0), None],
        ),
        Column::new(
            "Number of Tests".into(),
            [Some(100.0), Some(80.0), Some(300.0), Some(4000.0), Some(90.0)],
        ),
    ])
    .expect("driving");
    let age = age_table(&[
        ("Cork City", 2022, Some(37.0)),
        ("Cork County", 2022, Some(39.0)),
        ("Kerry", 2022, Some(41.0)),
        ("Dublin City", 2022, Some(38.0)),
    ]);

    let pipeline = CountyPipeline::new(PipelineConfig::default()).expect("pipeline");
    let table = pipeline.pass_rate_vs_age(&driving, &age).expect("merge");
    let counties: Vec<&str> = table.counties().iter().map(|c| c.as_str()).collect();
    assert_eq!(counties, vec!["Cork", "Kerry"]);
    let kerry = table.get(&key("Kerry")).expect("kerry");
    assert_eq!(table.value(kerry, "Pass Rate"), Some(55.0));
    assert_eq!(table.value(kerry, "Average Age"), Some(41.0));
    let cork = table.get(&key("Cork")).expect("cork");
    assert_eq!(table.value(cork, "Average Age"), Some(38.0));

    let centres = pipeline.centre_summary(&driving).expect("centres");
    assert_eq!(centres.len(), 3);
    assert!(centres.get(&"All driving test centres".to_string()).is_none());
}

#[test]
fn unicode_prefix_mode_is_opt_in() {
    let ascii = Normalizer::new(PrefixPattern::Ascii).expect("ascii");
    let unicode = Normalizer::new(PrefixPattern::Unicode).expect("unicode");
    let label = "Clonmel, Co. Tiobraid-Árann";
    assert_eq!(ascii.extract_prefix(label).map(|k| k.into_inner()), Some("Tiobraid".to_string()));
    assert_eq!(
        unicode.extract_prefix(label).map(|k| k.into_inner()),
        Some("Tiobraid-Árann".to_string())
    );
}

fn driving_table() -> DataFrame {
    DataFrame::new(vec![
        Column::new(
            "Driving Test Centre".into(),
            [
                "Tralee, Co. Kerry",
                "Tralee, Co. Kerry",
                "Killarney, Co. Kerry",
                "Cork, Co. Cork",
                "Mallow, Co. Cork",
                "Carrick-on-Shannon, Co. Leitrim",
                "All driving test centres",
            ],
        ),
        Column::new("Month".into(), vec!["2023 May"; 7]),
        Column::new(
            "Pass Rate".into(),
            [
                Some(60.0),
                None,
                Some(50.0),
                Some(40.0),
                Some(50.0),
                Some(70.0),
                Some(51.0),
            ],
        ),
        Column::new(
            "Number of Tests".into(),
            [
                Some(100.0),
                Some(20.0),
                Some(60.0),
                Some(200.0),
                Some(100.0),
                Some(30.0),
                Some(4000.0),
            ],
        ),
    ])
    .expect("driving")
}

#[test]
fn tests_per_capita_from_driving_and_population_tables() {
    let population = DataFrame::new(vec![
        Column::new("County".into(), ["Co. Cork", "Kerry", "Leitrim County", "Co. Mayo"]),
        Column::new("VALUE".into(), [584.0, 156.0, 35.0, 137.0]),
    ])
    .expect("population");
    let pipeline = CountyPipeline::new(PipelineConfig::default()).expect("pipeline");
    let table = pipeline
        .tests_per_capita(&driving_table(), &population)
        .expect("per capita");

    let counties: Vec<&str> = table.counties().iter().map(|c| c.as_str()).collect();
    assert_eq!(counties, vec!["Cork", "Kerry", "Leitrim"]);
    for (name, tests, persons) in [
        ("Cork", 300.0, 584_000.0),
        ("Kerry", 180.0, 156_000.0),
        ("Leitrim", 30.0, 35_000.0),
    ] {
        let row = table.get(&key(name)).expect("county row");
        assert_eq!(table.value(row, "Number of Tests"), Some(tests));
        let rate = table.value(row, "Tests per 1000").expect("rate");
        assert!((rate - tests / persons * 1000.0).abs() < 1e-9, "{name}: {rate}");
    }

    let range = pipeline.config().scale;
    let opacity = |name: &str| {
        let row = table.get(&key(name)).expect("county row");
        table.value(row, "Opacity").expect("opacity")
    };
    assert!((opacity("Leitrim") - range.floor).abs() < 1e-12);
    assert!((opacity("Cork") - range.ceiling).abs() < 1e-12);
    let kerry = range.floor + (range.ceiling - range.floor) * (156.0 - 35.0) / (584.0 - 35.0);
    assert!((opacity("Kerry") - kerry).abs() < 1e-9);
}

#[test]
fn age_by_county_resolves_against_boundaries() {
    let age = age_table(&[
        ("Cork City", 2022, Some(37.0)),
        ("Cork County", 2022, Some(39.0)),
        ("Kerry", 2022, Some(41.0)),
        ("Laois", 2022, Some(40.0)),
    ]);
    let pipeline = CountyPipeline::new(PipelineConfig::default()).expect("pipeline");
    let aggregate = pipeline.age_by_county(&age).expect("age");
    assert_eq!(aggregate.value(&key("Cork"), "VALUE"), Some(38.0));
    assert_eq!(aggregate.value(&key("Kerry"), "VALUE"), Some(41.0));

    let index = GeoBoundaryIndex::new("name", [("Cork", 0), ("Kerry", 1), ("Laoighis", 2)]);
    let boundaries = pipeline
        .reconciler(&index)
        .reconcile_all(aggregate.rows().iter().map(|row| row.key()));
    assert_eq!(boundaries.len(), 3);
    assert_eq!(boundaries.get(&key("Cork")).and_then(|r| r.shape_id()), Some("Cork"));
    assert_eq!(boundaries.unresolved().collect::<Vec<_>>(), vec![&key("Laois")]);
}

#[test]
fn centre_totals_keep_months_without_a_pass_rate() {
    let pipeline = CountyPipeline::new(PipelineConfig::default()).expect("pipeline");
    let centres = pipeline.centre_summary(&driving_table()).expect("centres");
    let tralee = "Tralee, Co. Kerry".to_string();
    assert_eq!(centres.value(&tralee, "Pass Rate"), Some(60.0));
    assert_eq!(centres.value(&tralee, "Number of Tests"), Some(120.0));
    assert_eq!(centres.get(&tralee).map(|row| row.support()), Some(1));
    assert_eq!(centres.len(), 5);
    assert!(centres.report().is_balanced());
}

#[test]
fn county_volume_applies_total_tests_threshold() {
    let config = PipelineConfig {
        county_min_total_tests: 100.0,
        ..PipelineConfig::default()
    };
    let pipeline = CountyPipeline::new(config).expect("pipeline");
    let table = pipeline.county_volume(&driving_table()).expect("volume");
    let counties: Vec<&str> = table.counties().iter().map(|c| c.as_str()).collect();
    assert_eq!(counties, vec!["Cork", "Kerry"]);
    let cork = table.get(&key("Cork")).expect("cork");
    assert_eq!(table.value(cork, "Number of Tests"), Some(300.0));
    assert_eq!(table.value(cork, "Pass Rate"), Some(45.0));
}
