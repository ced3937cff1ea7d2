use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use county_core::{CorrelationStrength, DashboardStats, Reconciliation, correlation_direction};
use county_model::{AggregationReport, CountyFeatureTable, CountyKey, Weighting};

use crate::types::{
    CentresResult, CleanAgeResult, CountiesResult, MergeResult, PerCapitaResult, TrendResult,
    VolumeResult,
};

pub fn print_counties(result: &CountiesResult) {
    let aggregate = &result.aggregate;
    let mut header = vec![header_cell("County")];
    header.extend(aggregate.measures().iter().map(|m| header_cell(&m.name)));
    header.push(header_cell("Rows"));
    if result.boundaries.is_some() {
        header.push(header_cell("Boundary"));
    }
    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    for idx in 1..=aggregate.measures().len() + 1 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for row in aggregate.rows() {
        let mut cells = vec![county_cell(row.key())];
        cells.extend(row.values().iter().map(|v| number_cell(*v)));
        cells.push(Cell::new(row.support()));
        if let Some(boundaries) = &result.boundaries {
            cells.push(boundary_cell(boundaries, row.key()));
        }
        table.add_row(cells);
    }
    println!("{table}");
    print_report(aggregate.report());
    if let Some(boundaries) = &result.boundaries {
        print_unresolved(boundaries);
    }
    print_output(result.output.as_deref());
}

pub fn print_clean_age(result: &CleanAgeResult) {
    let report = &result.report;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rows"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Input"), Cell::new(report.input_rows)]);
    table.add_row(vec![Cell::new("Passed through"), Cell::new(report.passthrough_rows)]);
    table.add_row(vec![Cell::new("Group members"), Cell::new(report.member_rows)]);
    table.add_row(vec![
        Cell::new("Members without value"),
        count_cell(report.member_rows_without_key, Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Synthesized"), Cell::new(report.synthesized_rows)]);
    table.add_row(vec![
        header_cell("Output"),
        Cell::new(result.rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    for group in &report.groups_without_rows {
        eprintln!("warning: no rows for synonym group {group}");
    }
    print_output(Some(&result.output));
}

pub fn print_merge(result: &MergeResult) {
    print_feature_table(&result.table, None);
    if let Some((low, high)) = result.age_range {
        if result.fell_back {
            eprintln!("warning: no county has {} in [{low}, {high}]; showing all", result.x);
        } else {
            println!(
                "{} in [{low}, {high}]: {} of {} counties",
                result.x,
                result.table.len(),
                result.merged_counties
            );
        }
    }
    print_stats(&result.stats, &result.x, &result.y);
    print_output(result.output.as_deref());
}

pub fn print_per_capita(result: &PerCapitaResult) {
    print_feature_table(&result.table, result.boundaries.as_ref());
    if let Some(mean) = result.summary_mean {
        let weighting = match result.weighting {
            Weighting::Unweighted => "unweighted",
            Weighting::Population => "population-weighted",
        };
        println!("Mean tests per 1000 ({weighting}): {mean:.2}");
    }
    if let Some(boundaries) = &result.boundaries {
        print_unresolved(boundaries);
    }
    print_output(result.output.as_deref());
}

pub fn print_centres(result: &CentresResult) {
    let aggregate = &result.aggregate;
    let mut header = vec![header_cell(&result.centre_header)];
    header.extend(aggregate.measures().iter().map(|m| header_cell(&m.name)));
    header.push(header_cell("Rows"));
    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    for idx in 1..=aggregate.measures().len() + 1 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    let shown = result.top.unwrap_or(aggregate.len());
    for row in aggregate.rows().iter().take(shown) {
        let mut cells = vec![Cell::new(row.key())];
        cells.extend(row.values().iter().map(|v| number_cell(*v)));
        cells.push(Cell::new(row.support()));
        table.add_row(cells);
    }
    println!("{table}");
    if shown < aggregate.len() {
        println!("Showing {shown} of {} centres", aggregate.len());
    }
    print_report(aggregate.report());
    print_output(result.output.as_deref());
}

pub fn print_trend(result: &TrendResult) {
    let series = &result.series;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Year"),
        header_cell("Month"),
        header_cell("Pass Rate"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let points = series
        .points()
        .iter()
        .filter(|point| result.year.is_none_or(|year| point.year == year));
    for point in points {
        table.add_row(vec![
            Cell::new(point.year),
            Cell::new(point.month.name()),
            number_cell(point.pass_rate),
            Cell::new(point.support),
        ]);
    }
    println!("{table}");
    if series.unparseable_labels > 0 || series.missing_pass_rate > 0 {
        eprintln!(
            "warning: skipped {} national rows with unreadable months and {} without a pass rate",
            series.unparseable_labels, series.missing_pass_rate
        );
    }
}

pub fn print_volume(result: &VolumeResult) {
    let analysis = &result.analysis;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tests"),
        header_cell("Mean Pass Rate"),
        header_cell("Std Dev"),
        header_cell("Centre-months"),
    ]);
    apply_table_style(&mut table);
    for idx in 1..=3 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for bin in &analysis.bins {
        table.add_row(vec![
            Cell::new(bin.label),
            number_cell(bin.mean_pass_rate),
            bin.std_dev.map_or_else(|| dim_cell("-"), number_cell),
            Cell::new(bin.count),
        ]);
    }
    println!("{table}");
    println!(
        "{} centre-months with at least {} tests ({} below, {} incomplete, {} above the last band)",
        analysis.observations,
        result.min_tests,
        analysis.below_minimum,
        analysis.dropped_missing,
        analysis.outside_bins
    );
    if let (Some(r), Some(r_squared)) = (analysis.correlation, analysis.r_squared()) {
        let strength = analysis.strength().map_or("", CorrelationStrength::as_str);
        println!(
            "Correlation: {r:.3} ({strength} {}), R² = {r_squared:.3}",
            correlation_direction(r)
        );
    }
    if let Some(fit) = &analysis.fit {
        println!("Trendline: {fit}");
    }

    println!();
    println!(
        "Counties with at least {} tests in total:",
        result.county_min_total_tests
    );
    print_feature_table(&result.counties, None);
    if let (Some(x), Some(y)) = (
        result.counties.base_columns().first(),
        result.counties.base_columns().get(1),
    ) {
        print_stats(&result.county_stats, x, y);
    }
}

fn print_feature_table(table: &CountyFeatureTable, boundaries: Option<&Reconciliation>) {
    let columns = table.column_names();
    let mut header = vec![header_cell("County")];
    header.extend(columns.iter().map(|name| header_cell(name)));
    if boundaries.is_some() {
        header.push(header_cell("Boundary"));
    }
    let mut out = Table::new();
    out.set_header(header);
    apply_table_style(&mut out);
    for idx in 1..=columns.len() {
        align_column(&mut out, idx, CellAlignment::Right);
    }
    for row in table.rows() {
        let mut cells = vec![county_cell(row.county())];
        cells.extend(row.values().iter().chain(row.derived()).map(|v| number_cell(*v)));
        if let Some(boundaries) = boundaries {
            cells.push(boundary_cell(boundaries, row.county()));
        }
        out.add_row(cells);
    }
    if table.is_empty() {
        eprintln!("warning: no county is present in every input");
    }
    println!("{out}");
}

fn print_stats(stats: &DashboardStats, x: &str, y: &str) {
    match stats.correlation {
        Some(r) => println!(
            "{y} vs {x} across {} counties: r = {r:.3} ({})",
            stats.counties,
            correlation_direction(r)
        ),
        None => println!("{y} vs {x}: not enough variation for a correlation"),
    }
    if let Some(fit) = &stats.trendline {
        println!("Trendline: {fit}");
    }
    if let Some((low, high)) = stats.x_range {
        println!("{x} range: {low:.2} to {high:.2}");
    }
}

fn print_report(report: &AggregationReport) {
    if report.dropped_missing > 0 || report.groups_below_support > 0 {
        println!(
            "{} of {} rows used; {} without a key or value, {} in {} groups below the support threshold",
            report.supported_rows,
            report.input_rows,
            report.dropped_missing,
            report.dropped_insufficient_support,
            report.groups_below_support
        );
    }
}

fn print_unresolved(boundaries: &Reconciliation) {
    let unresolved: Vec<String> = boundaries.unresolved().map(ToString::to_string).collect();
    if !unresolved.is_empty() {
        eprintln!("warning: no boundary region for {}", unresolved.join(", "));
    }
}

fn print_output(path: Option<&std::path::Path>) {
    if let Some(path) = path {
        println!("Output: {}", path.display());
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn county_cell(county: &CountyKey) -> Cell {
    Cell::new(county)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn number_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}"))
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn boundary_cell(boundaries: &Reconciliation, county: &CountyKey) -> Cell {
    match boundaries.get(county).and_then(|r| r.shape_id()) {
        Some(id) => Cell::new(id).fg(Color::Green),
        None => Cell::new("unresolved")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
