//! Descriptive statistics over paired observations.

use std::fmt;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation of `xs` and `ys`.
///
/// `None` when the slices differ in length, hold fewer than two pairs, or
/// either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let (sxx, syy, sxy) = moments(xs, ys)?;
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl fmt::Display for LinearFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y={:.4}x+{:.2}", self.slope, self.intercept)
    }
}

/// Ordinary least squares fit. `None` with fewer than two pairs or when every
/// `x` is the same.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let (sxx, _, sxy) = moments(xs, ys)?;
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean(ys)? - slope * mean(xs)?;
    Some(LinearFit { slope, intercept })
}

/// Centered sums of squares and cross products.
fn moments(xs: &[f64], ys: &[f64]) -> Option<(f64, f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    Some((sxx, syy, sxy))
}

/// Verbal strength of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CorrelationStrength {
    VeryWeakOrNone,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Classify `|r|` with cut points 0.1, 0.3, 0.5 and 0.7.
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r < 0.1 {
            Self::VeryWeakOrNone
        } else if r < 0.3 {
            Self::Weak
        } else if r < 0.5 {
            Self::Moderate
        } else if r < 0.7 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryWeakOrNone => "very weak or no",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"positive"` for r > 0, otherwise `"negative"`.
pub fn correlation_direction(r: f64) -> &'static str {
    if r > 0.0 { "positive" } else { "negative" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_line() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [3.0, 5.0, 7.0, 9.0];
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        let fit = linear_fit(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_have_no_statistic() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 1.0], &[2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[2.0]), None);
        assert_eq!(linear_fit(&[4.0, 4.0, 4.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(sample_std(&[5.0]), None);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138_089_935_299_395).abs() < 1e-12);
    }

    #[test]
    fn strength_cut_points() {
        assert_eq!(
            CorrelationStrength::from_coefficient(0.05),
            CorrelationStrength::VeryWeakOrNone
        );
        assert_eq!(CorrelationStrength::from_coefficient(-0.1), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.45), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(-0.69), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(0.7), CorrelationStrength::VeryStrong);
        assert_eq!(correlation_direction(-0.2), "negative");
    }
}
