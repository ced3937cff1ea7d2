//! Pass rate against test volume, row by row.

use county_ingest::column_f64;
use county_model::DrivingColumns;
use polars::prelude::DataFrame;

use crate::error::{Result, ensure_column};
use crate::stats::{CorrelationStrength, LinearFit, linear_fit, mean, pearson, sample_std};

/// A test-volume band. The first band is closed on both ends, the others
/// are open below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeBin {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
}

impl VolumeBin {
    fn contains(&self, tests: f64, first: bool) -> bool {
        let above = if first { tests >= self.lower } else { tests > self.lower };
        above && tests <= self.upper
    }
}

pub const VOLUME_BINS: [VolumeBin; 6] = [
    VolumeBin { label: "10-50", lower: 0.0, upper: 50.0 },
    VolumeBin { label: "51-100", lower: 50.0, upper: 100.0 },
    VolumeBin { label: "101-200", lower: 100.0, upper: 200.0 },
    VolumeBin { label: "201-500", lower: 200.0, upper: 500.0 },
    VolumeBin { label: "501-1000", lower: 500.0, upper: 1000.0 },
    VolumeBin { label: "1000+", lower: 1000.0, upper: 5000.0 },
];

/// Bin index for a number of tests, `None` outside every band.
pub fn volume_bin(tests: f64) -> Option<usize> {
    (0..VOLUME_BINS.len()).find(|&idx| VOLUME_BINS[idx].contains(tests, idx == 0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinSummary {
    pub label: &'static str,
    pub mean_pass_rate: f64,
    /// Sample standard deviation; `None` for a single observation.
    pub std_dev: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeAnalysis {
    /// Rows used in the analysis.
    pub observations: usize,
    pub dropped_missing: usize,
    /// Rows with fewer tests than the minimum.
    pub below_minimum: usize,
    pub correlation: Option<f64>,
    pub fit: Option<LinearFit>,
    /// Non-empty bins in band order.
    pub bins: Vec<BinSummary>,
    /// Observations above the last band.
    pub outside_bins: usize,
}

impl VolumeAnalysis {
    pub fn r_squared(&self) -> Option<f64> {
        self.correlation.map(|r| r * r)
    }

    pub fn strength(&self) -> Option<CorrelationStrength> {
        self.correlation.map(CorrelationStrength::from_coefficient)
    }
}

/// Analyse `(tests, pass rate)` pairs; pairs with a missing side are counted
/// and skipped, as are pairs below `min_tests`.
pub fn analyze_volume<I>(pairs: I, min_tests: f64) -> VolumeAnalysis
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let mut dropped_missing = 0;
    let mut below_minimum = 0;
    let mut tests = Vec::new();
    let mut rates = Vec::new();
    for pair in pairs {
        let (Some(t), Some(r)) = pair else {
            dropped_missing += 1;
            continue;
        };
        if t < min_tests {
            below_minimum += 1;
            continue;
        }
        tests.push(t);
        rates.push(r);
    }

    let mut binned: Vec<Vec<f64>> = vec![Vec::new(); VOLUME_BINS.len()];
    let mut outside_bins = 0;
    for (t, r) in tests.iter().zip(&rates) {
        match volume_bin(*t) {
            Some(idx) => binned[idx].push(*r),
            None => outside_bins += 1,
        }
    }
    let bins = VOLUME_BINS
        .iter()
        .zip(&binned)
        .filter_map(|(bin, values)| {
            Some(BinSummary {
                label: bin.label,
                mean_pass_rate: mean(values)?,
                std_dev: sample_std(values),
                count: values.len(),
            })
        })
        .collect();

    VolumeAnalysis {
        observations: tests.len(),
        dropped_missing,
        below_minimum,
        correlation: pearson(&tests, &rates),
        fit: linear_fit(&tests, &rates),
        bins,
        outside_bins,
    }
}

/// Run [`analyze_volume`] over every row of the driving-test table.
pub fn volume_analysis(
    df: &DataFrame,
    columns: &DrivingColumns,
    min_tests: f64,
) -> Result<VolumeAnalysis> {
    ensure_column(df, &columns.tests)?;
    ensure_column(df, &columns.pass_rate)?;
    let tests = column_f64(df, &columns.tests)?;
    let rates = column_f64(df, &columns.pass_rate)?;
    let analysis = analyze_volume(tests.into_iter().zip(rates), min_tests);
    tracing::info!(
        observations = analysis.observations,
        dropped_missing = analysis.dropped_missing,
        below_minimum = analysis.below_minimum,
        correlation = analysis.correlation,
        "analysed pass rate against test volume"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_edges_follow_closed_upper_bounds() {
        assert_eq!(volume_bin(0.0), Some(0));
        assert_eq!(volume_bin(50.0), Some(0));
        assert_eq!(volume_bin(50.5), Some(1));
        assert_eq!(volume_bin(1000.0), Some(4));
        assert_eq!(volume_bin(5000.0), Some(5));
        assert_eq!(volume_bin(5000.1), None);
    }

    #[test]
    fn filters_and_bins_observations() {
        let pairs = vec![
            (Some(5.0), Some(90.0)),
            (None, Some(50.0)),
            (Some(40.0), None),
            (Some(20.0), Some(60.0)),
            (Some(40.0), Some(64.0)),
            (Some(150.0), Some(55.0)),
            (Some(9000.0), Some(40.0)),
        ];
        let analysis = analyze_volume(pairs, 10.0);
        assert_eq!(analysis.observations, 4);
        assert_eq!(analysis.dropped_missing, 2);
        assert_eq!(analysis.below_minimum, 1);
        assert_eq!(analysis.outside_bins, 1);
        let labels: Vec<&str> = analysis.bins.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["10-50", "101-200"]);
        assert_eq!(analysis.bins[0].count, 2);
        assert!((analysis.bins[0].mean_pass_rate - 62.0).abs() < 1e-12);
        assert_eq!(analysis.bins[1].std_dev, None);
        assert!(analysis.correlation.unwrap() < 0.0);
        let r = analysis.correlation.unwrap();
        assert!((analysis.r_squared().unwrap() - r * r).abs() < 1e-12);
    }
}
