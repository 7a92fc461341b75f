//! Trend fitting, cohort scaling and time prediction over a store snapshot.

/// Head-to-head comparison of two swimmers.
pub mod compare;
/// Population mean-time ratios between events.
pub mod cohort;
/// Anchor trend, cohort scaling and training adjustment combined.
pub mod predictor;
/// Least-squares trend over one swimmer's series in one event.
pub mod trend;

/// Why an analysis could not produce a result.
///
/// Swimmer and event are carried in display form so callers can report the
/// failure without holding the snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Fewer than two results in the anchor series.
    #[error("{swimmer} has {found} result(s) in {event}; a trend needs at least two")]
    InsufficientData {
        /// Swimmer, display form.
        swimmer: String,
        /// Event, display form.
        event: String,
        /// Results found.
        found: usize,
    },
    /// The regression denominator is zero.
    #[error("cannot fit a trend for {swimmer} in {event}: every result falls on the same day")]
    DegenerateFit {
        /// Swimmer, display form.
        swimmer: String,
        /// Event, display form.
        event: String,
    },
    /// A comparison side has nothing to summarize.
    #[error("{swimmer} has no results in {event}")]
    NoResults {
        /// Swimmer, display form.
        swimmer: String,
        /// Event, display form.
        event: String,
    },
    /// An effort or consistency rating outside `1..=5`.
    #[error("training rating {0} is outside 1..=5")]
    InvalidRating(u8),
    /// A training score outside `[1, 5]`, or NaN.
    #[error("training score {0} is outside 1..=5")]
    InvalidTrainingScore(f64),
}
