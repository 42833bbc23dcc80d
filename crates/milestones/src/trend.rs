//! Least-squares trend lines for KPI chart series.

use serde::Serialize;

/// `y = slope * x + intercept`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Points on the trend line for every `x`, ready to be drawn next to the
    /// series it was fitted on.
    pub fn project(&self, xs: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
        xs.into_iter().map(|x| (x, self.value_at(x))).collect()
    }
}

/// Fits an ordinary least-squares line through `points`.
///
/// Returns `None` for fewer than two points, non-finite coordinates, or when
/// all points share the same `x`.
pub fn fit(points: &[(f64, f64)]) -> Option<Trend> {
    if points.len() < 2 || points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        let dx = x - mean_x;
        (cov + dx * (y - mean_y), var + dx * dx)
    });
    if variance == 0.0 {
        return None;
    }

    let slope = covariance / variance;
    Some(Trend {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
