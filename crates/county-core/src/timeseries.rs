//! National monthly pass-rate series.
//!
//! The driving-test table carries a national total row per month under the
//! centre label `All driving test centres`. Month labels read
//! `"<Year> <MonthName>"`.

use std::collections::BTreeMap;

use chrono::Month;
use county_ingest::{column_f64, column_strings};
use county_model::DrivingColumns;
use polars::prelude::DataFrame;

use crate::error::{Result, ensure_column};

/// Split a `"2023 January"` label into year and month.
pub fn parse_month_label(label: &str) -> Option<(i32, Month)> {
    let mut parts = label.split_whitespace();
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<Month>().ok()?;
    Some((year, month))
}

/// Mean national pass rate for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: Month,
    pub pass_rate: f64,
    /// National rows averaged into this point.
    pub support: usize,
}

/// Points ordered by year, then calendar month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    points: Vec<MonthlyPoint>,
    /// National rows whose month label could not be read.
    pub unparseable_labels: usize,
    /// National rows without a pass rate.
    pub missing_pass_rate: usize,
}

impl MonthlySeries {
    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.points.iter().map(|p| p.year).collect();
        years.dedup();
        years
    }

    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &MonthlyPoint> {
        self.points.iter().filter(move |p| p.year == year)
    }
}

/// Build the national series from the driving-test table.
pub fn national_monthly_series(df: &DataFrame, columns: &DrivingColumns) -> Result<MonthlySeries> {
    ensure_column(df, &columns.centre)?;
    ensure_column(df, &columns.month)?;
    ensure_column(df, &columns.pass_rate)?;

    let centres = column_strings(df, &columns.centre)?;
    let months = column_strings(df, &columns.month)?;
    let rates = column_f64(df, &columns.pass_rate)?;

    let mut series = MonthlySeries::default();
    let mut groups: BTreeMap<(i32, u32), (Month, f64, usize)> = BTreeMap::new();
    for row in 0..df.height() {
        if centres[row].as_deref() != Some(columns.national_label.as_str()) {
            continue;
        }
        let Some((year, month)) = months[row].as_deref().and_then(parse_month_label) else {
            series.unparseable_labels += 1;
            continue;
        };
        let Some(rate) = rates[row] else {
            series.missing_pass_rate += 1;
            continue;
        };
        let entry = groups
            .entry((year, month.number_from_month()))
            .or_insert((month, 0.0, 0));
        entry.1 += rate;
        entry.2 += 1;
    }

    series.points = groups
        .into_iter()
        .map(|((year, _), (month, sum, support))| MonthlyPoint {
            year,
            month,
            pass_rate: sum / support as f64,
            support,
        })
        .collect();
    tracing::info!(
        points = series.points.len(),
        unparseable_labels = series.unparseable_labels,
        missing_pass_rate = series.missing_pass_rate,
        "built national monthly series"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn parses_month_labels() {
        assert_eq!(parse_month_label("2023 January"), Some((2023, Month::January)));
        assert_eq!(parse_month_label(" 2019  december "), Some((2019, Month::December)));
        assert_eq!(parse_month_label("January 2023"), None);
        assert_eq!(parse_month_label("2023"), None);
    }

    #[test]
    fn orders_months_by_calendar_not_name() {
        let df = DataFrame::new(vec![
            Column::new(
                "Driving Test Centre".into(),
                [
                    "All driving test centres",
                    "All driving test centres",
                    "Tralee, Co. Kerry",
                    "All driving test centres",
                    "All driving test centres",
                ],
            ),
            Column::new(
                "Month".into(),
                ["2023 March", "2023 February", "2023 January", "2022 December", "bad"],
            ),
            Column::new("Pass Rate".into(), [52.0, 50.0, 99.0, 48.0, 10.0]),
        ])
        .unwrap();
        let series = national_monthly_series(&df, &DrivingColumns::default()).unwrap();
        let order: Vec<(i32, Month)> = series.points().iter().map(|p| (p.year, p.month)).collect();
        assert_eq!(
            order,
            vec![
                (2022, Month::December),
                (2023, Month::February),
                (2023, Month::March)
            ]
        );
        assert_eq!(series.unparseable_labels, 1);
        assert_eq!(series.years(), vec![2022, 2023]);
        assert_eq!(series.for_year(2023).count(), 2);
    }
}
