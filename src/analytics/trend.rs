use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    core::store::StoreSnapshot,
    model::{Event, Swimmer},
    types::{DayOffset, MIN_TREND_POINTS, Seconds},
};

use super::AnalysisError;

/// Straight line `y = slope * x + intercept` fitted by ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    /// Change in `y` per unit of `x`.
    pub slope: f64,
    /// `y` at `x = 0`.
    pub intercept: f64,
    /// `1 - SSres / SStot`; `None` when every `y` is identical.
    pub r_squared: Option<f64>,
}

impl LinearFit {
    /// `y` on the line at `x`.
    pub fn project(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Why [`fit_points`] produced no line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// Fewer than two points.
    #[error("need at least two points, got {found}")]
    TooFewPoints {
        /// Points supplied.
        found: usize,
    },
    /// Every `x` is the same.
    #[error("regression denominator is zero")]
    Degenerate,
}

/// Fits `points` (x, y).
pub fn fit_points(points: &[(f64, f64)]) -> Result<LinearFit, FitError> {
    if points.len() < MIN_TREND_POINTS {
        return Err(FitError::TooFewPoints { found: points.len() });
    }

    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return Err(FitError::Degenerate);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Ok(LinearFit {
        slope,
        intercept,
        r_squared: r_squared(points, slope, intercept),
    })
}

/// Coefficient of determination, or `None` when SStot is zero.
pub fn r_squared(points: &[(f64, f64)], slope: f64, intercept: f64) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / points.len() as f64;

    let (mut ss_tot, mut ss_res) = (0.0, 0.0);
    for &(x, y) in points {
        ss_tot += (y - mean_y).powi(2);
        ss_res += (y - (slope * x + intercept)).powi(2);
    }

    (ss_tot != 0.0).then(|| 1.0 - ss_res / ss_tot)
}

/// A fitted trend for one swimmer in one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    /// Line through `points`.
    pub fit: LinearFit,
    /// (days since first sample, seconds), oldest first.
    pub points: Vec<(DayOffset, Seconds)>,
    /// Date of the oldest sample (day zero).
    pub first_date: NaiveDate,
    /// Date of the newest sample.
    pub last_date: NaiveDate,
    /// Fastest sample.
    pub min_time: Seconds,
    /// Slowest sample.
    pub max_time: Seconds,
}

impl Trend {
    /// Expected time `horizon_days` after the first sample. Not clamped.
    pub fn project(&self, horizon_days: f64) -> Seconds {
        self.fit.project(horizon_days)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fits the date-ordered series of `swimmer` in `event`.
pub fn fit_trend(
    snapshot: &StoreSnapshot,
    swimmer: &Swimmer,
    event: &Event,
) -> Result<Trend, AnalysisError> {
    let series = snapshot.series(swimmer, event);
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(insufficient(swimmer, event, 0));
    };
    if series.len() < MIN_TREND_POINTS {
        return Err(insufficient(swimmer, event, series.len()));
    }

    let first_date = first.date();
    let points: Vec<(DayOffset, Seconds)> = series
        .iter()
        .map(|r| ((r.date() - first_date).num_days(), r.time()))
        .collect();
    let xy: Vec<(f64, f64)> = points.iter().map(|&(d, t)| (d as f64, t)).collect();

    let fit = fit_points(&xy).map_err(|err| match err {
        FitError::TooFewPoints { found } => insufficient(swimmer, event, found),
        FitError::Degenerate => AnalysisError::DegenerateFit {
            swimmer: swimmer.to_string(),
            event: event.to_string(),
        },
    })?;

    let times = || points.iter().map(|&(_, t)| t);
    Ok(Trend {
        fit,
        first_date,
        last_date: last.date(),
        min_time: times().fold(f64::INFINITY, f64::min),
        max_time: times().fold(f64::NEG_INFINITY, f64::max),
        points,
    })
}

fn insufficient(swimmer: &Swimmer, event: &Event, found: usize) -> AnalysisError {
    AnalysisError::InsufficientData {
        swimmer: swimmer.to_string(),
        event: event.to_string(),
        found,
    }
}
