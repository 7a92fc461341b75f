use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    config::PredictorConfig,
    core::store::StoreSnapshot,
    model::{Event, Swimmer},
    types::{MAX_RATING, MIN_RATING, Seconds},
};

use super::{AnalysisError, cohort::cohort_ratio, trend::fit_trend};

/// Training score at which no adjustment is applied.
pub const NEUTRAL_TRAINING_SCORE: f64 = 3.0;
/// Fractional time change per training-score point away from neutral.
pub const TRAINING_STEP: f64 = 0.025;

/// Average of an effort and a consistency rating, in `[1, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct TrainingScore(f64);

impl TrainingScore {
    /// Accepts a score in `[1, 5]`.
    pub fn new(score: f64) -> Result<Self, AnalysisError> {
        let (lo, hi) = (f64::from(MIN_RATING), f64::from(MAX_RATING));
        if !(lo..=hi).contains(&score) {
            return Err(AnalysisError::InvalidTrainingScore(score));
        }
        Ok(Self(score))
    }

    /// Averages two ratings, each in `1..=5`.
    pub fn from_ratings(effort: u8, consistency: u8) -> Result<Self, AnalysisError> {
        for rating in [effort, consistency] {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(AnalysisError::InvalidRating(rating));
            }
        }
        Self::new((f64::from(effort) + f64::from(consistency)) / 2.0)
    }

    /// The score itself.
    pub fn value(self) -> f64 {
        self.0
    }

    /// See [`training_factor`].
    pub fn factor(self) -> f64 {
        training_factor(self.0)
    }
}

impl Default for TrainingScore {
    fn default() -> Self {
        Self(NEUTRAL_TRAINING_SCORE)
    }
}

/// Multiplier on the base estimate: faster above neutral, slower below,
/// linear at [`TRAINING_STEP`] per point.
pub fn training_factor(score: f64) -> f64 {
    if score > NEUTRAL_TRAINING_SCORE {
        1.0 - TRAINING_STEP * (score - NEUTRAL_TRAINING_SCORE)
    } else if score < NEUTRAL_TRAINING_SCORE {
        1.0 + TRAINING_STEP * (NEUTRAL_TRAINING_SCORE - score)
    } else {
        1.0
    }
}

/// Heuristic confidence in `[0, 1]` blending data volume, training score,
/// trend magnitude and fit quality. A missing R² counts as zero.
pub fn confidence(data_points: usize, training_score: f64, slope: f64, r_squared: Option<f64>) -> f64 {
    let volume = (data_points as f64 / 10.0).min(1.0);
    let training = training_score / 5.0;
    let trend = (slope.abs() * 100.0).min(1.0);
    let fit = r_squared.unwrap_or(0.0);

    (0.3 * volume + 0.3 * training + 0.2 * trend + 0.2 * fit).clamp(0.0, 1.0)
}

/// Label for how many anchor samples back a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataQuality {
    /// Two samples.
    Limited,
    /// Three or four samples.
    Good,
    /// Five or more samples.
    Excellent,
}

impl DataQuality {
    /// Label for `points` samples.
    pub fn from_points(points: usize) -> Self {
        if points >= 5 {
            Self::Excellent
        } else if points >= 3 {
            Self::Good
        } else {
            Self::Limited
        }
    }
}

/// Whether the anchor trend moves noticeably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendStrength {
    /// `|slope| <= 0.01` seconds per day.
    Stable,
    /// `|slope| > 0.01` seconds per day.
    Strong,
}

impl TrendStrength {
    /// Label for a slope in seconds per day.
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() > 0.01 { Self::Strong } else { Self::Stable }
    }
}

/// What to predict, for whom, from which history.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    /// Swimmer to predict for.
    pub swimmer: Swimmer,
    /// Event whose history is fitted.
    pub anchor: Event,
    /// Event the prediction is for.
    pub target: Event,
    /// Training adjustment input.
    pub training: TrainingScore,
    /// Overrides the configured horizon for this request.
    pub horizon_days: Option<f64>,
}

impl PredictionRequest {
    /// Request using the configured horizon.
    pub fn new(swimmer: Swimmer, anchor: Event, target: Event, training: TrainingScore) -> Self {
        Self {
            swimmer,
            anchor,
            target,
            training,
            horizon_days: None,
        }
    }
}

/// Every figure behind one prediction. Carries no display formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionBundle {
    /// Swimmer predicted for.
    pub swimmer: Swimmer,
    /// Fitted event.
    pub anchor: Event,
    /// Predicted event.
    pub target: Event,
    /// Days past the first anchor sample that were projected.
    pub horizon_days: f64,
    /// Trend value at the horizon, in the anchor event.
    pub predicted_anchor: Seconds,
    /// Cohort mean-time ratio, target over anchor.
    pub ratio: f64,
    /// Training score used.
    pub training_score: f64,
    /// Training multiplier.
    pub factor: f64,
    /// `predicted_anchor * ratio`.
    pub base_estimate: Seconds,
    /// `base_estimate * factor`.
    pub final_estimate: Seconds,
    /// Trend slope, seconds per day.
    pub slope: f64,
    /// Trend value on the first sample day.
    pub intercept: f64,
    /// Fit quality; `None` when every anchor time is identical.
    pub r_squared: Option<f64>,
    /// Anchor samples fitted.
    pub data_points: usize,
    /// Heuristic in `[0, 1]`; see [`confidence`].
    pub confidence: f64,
    /// Oldest anchor sample.
    pub first_date: NaiveDate,
    /// Newest anchor sample.
    pub last_date: NaiveDate,
    /// Fastest anchor time.
    pub min_time: Seconds,
    /// Slowest anchor time.
    pub max_time: Seconds,
    /// Sample-count label.
    pub data_quality: DataQuality,
    /// Slope label.
    pub trend_strength: TrendStrength,
    /// Set when the projection or the final estimate is zero or negative.
    pub non_physical_projection: bool,
}

impl PredictionBundle {
    /// Compact JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Runs predictions against a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: PredictorConfig,
}

impl Predictor {
    /// Predictor with explicit settings.
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Active settings.
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Fits the anchor trend, scales it by the cohort ratio and applies the
    /// training factor. Trend failures are returned as-is.
    pub fn predict(
        &self,
        snapshot: &StoreSnapshot,
        request: &PredictionRequest,
    ) -> Result<PredictionBundle, AnalysisError> {
        let horizon_days = request.horizon_days.unwrap_or(self.config.horizon_days);

        let trend = fit_trend(snapshot, &request.swimmer, &request.anchor)?;
        let predicted_anchor = trend.project(horizon_days);
        let ratio = cohort_ratio(snapshot, &request.anchor, &request.target);
        let base_estimate = predicted_anchor * ratio;

        let training_score = request.training.value();
        let factor = request.training.factor();
        let final_estimate = base_estimate * factor;

        let non_physical_projection = predicted_anchor <= 0.0 || final_estimate <= 0.0;
        if non_physical_projection {
            tracing::warn!(
                swimmer = %request.swimmer,
                anchor = %request.anchor,
                horizon_days,
                predicted_anchor,
                final_estimate,
                "trend projection is not a physical time"
            );
        }

        let fit = trend.fit;
        Ok(PredictionBundle {
            swimmer: request.swimmer.clone(),
            anchor: request.anchor.clone(),
            target: request.target.clone(),
            horizon_days,
            predicted_anchor,
            ratio,
            training_score,
            factor,
            base_estimate,
            final_estimate,
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            data_points: trend.len(),
            confidence: confidence(trend.len(), training_score, fit.slope, fit.r_squared),
            first_date: trend.first_date,
            last_date: trend.last_date,
            min_time: trend.min_time,
            max_time: trend.max_time,
            data_quality: DataQuality::from_points(trend.len()),
            trend_strength: TrendStrength::from_slope(fit.slope),
            non_physical_projection,
        })
    }
}
