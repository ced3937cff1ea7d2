//! Summary figures for an interactive view of a feature table.

use county_model::CountyFeatureTable;

use crate::error::{CoreError, Result};
use crate::stats::{LinearFit, linear_fit, pearson};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub counties: usize,
    /// Pearson correlation of `x` and `y`.
    pub correlation: Option<f64>,
    pub trendline: Option<LinearFit>,
    /// Observed `(min, max)` of `x`, the bounds a range control starts at.
    pub x_range: Option<(f64, f64)>,
}

fn paired(table: &CountyFeatureTable, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let column = |name: &str| {
        table.column(name).ok_or_else(|| CoreError::UnknownColumn {
            column: name.to_string(),
        })
    };
    Ok((column(x)?, column(y)?))
}

/// OLS trendline of `y` on `x`.
pub fn trendline(table: &CountyFeatureTable, x: &str, y: &str) -> Result<Option<LinearFit>> {
    let (xs, ys) = paired(table, x, y)?;
    Ok(linear_fit(&xs, &ys))
}

pub fn dashboard_stats(table: &CountyFeatureTable, x: &str, y: &str) -> Result<DashboardStats> {
    let (xs, ys) = paired(table, x, y)?;
    Ok(DashboardStats {
        counties: table.len(),
        correlation: pearson(&xs, &ys),
        trendline: linear_fit(&xs, &ys),
        x_range: table.min_max(x),
    })
}
