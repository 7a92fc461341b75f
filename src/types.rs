//! Shared primitive aliases and constants.

/// Race distance in the pool's native unit (yards or meters).
pub type Distance = u32;
/// Swimmer birth year.
pub type BirthYear = i32;
/// Race time in seconds.
pub type Seconds = f64;
/// Whole days since the first sample of a series.
pub type DayOffset = i64;
/// Position of a result in the store's flat list.
pub type RowIdx = usize;

/// Days ahead of the first anchor sample at which a trend is projected.
pub const DEFAULT_HORIZON_DAYS: f64 = 60.0;

/// Fewest anchor samples a trend fit accepts.
pub const MIN_TREND_POINTS: usize = 2;

/// Lowest accepted training rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted training rating.
pub const MAX_RATING: u8 = 5;
