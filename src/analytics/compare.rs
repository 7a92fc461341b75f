use std::sync::Arc;

use serde::Serialize;

use crate::{
    core::store::StoreSnapshot,
    model::{Event, Swimmer},
    types::Seconds,
};

use super::AnalysisError;

/// One side of a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwimmerSummary {
    /// Swimmer summarized.
    pub swimmer: Swimmer,
    /// Results in the event.
    pub races: usize,
    /// Mean time.
    pub average_time: Seconds,
    /// Fastest time.
    pub best_time: Seconds,
}

/// Which swimmer has the lower average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Faster {
    /// The first swimmer.
    First,
    /// The second swimmer.
    Second,
    /// Identical averages.
    Tied,
}

/// Two swimmers side by side in one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Event compared.
    pub event: Event,
    /// First swimmer's figures.
    pub first: SwimmerSummary,
    /// Second swimmer's figures.
    pub second: SwimmerSummary,
    /// Who has the lower average time.
    pub faster: Faster,
    /// Absolute gap between the two averages, in seconds.
    pub margin: Seconds,
}

/// Events both swimmers have results in, in (distance, stroke, course) order.
pub fn common_events(snapshot: &StoreSnapshot, a: &Swimmer, b: &Swimmer) -> Vec<Arc<Event>> {
    let theirs = snapshot.events_for(b);
    snapshot
        .events_for(a)
        .into_iter()
        .filter(|e| theirs.binary_search(e).is_ok())
        .collect()
}

/// Summarizes both swimmers in `event`.
///
/// Fails with [`AnalysisError::NoResults`] naming the first swimmer without
/// results.
pub fn compare_swimmers(
    snapshot: &StoreSnapshot,
    a: &Swimmer,
    b: &Swimmer,
    event: &Event,
) -> Result<Comparison, AnalysisError> {
    let first = summarize(snapshot, a, event)?;
    let second = summarize(snapshot, b, event)?;

    let faster = match first.average_time.total_cmp(&second.average_time) {
        std::cmp::Ordering::Less => Faster::First,
        std::cmp::Ordering::Greater => Faster::Second,
        std::cmp::Ordering::Equal => Faster::Tied,
    };
    let margin = (first.average_time - second.average_time).abs();

    Ok(Comparison {
        event: event.clone(),
        first,
        second,
        faster,
        margin,
    })
}

fn summarize(snapshot: &StoreSnapshot, swimmer: &Swimmer, event: &Event) -> Result<SwimmerSummary, AnalysisError> {
    let series = snapshot.series(swimmer, event);
    if series.is_empty() {
        return Err(AnalysisError::NoResults {
            swimmer: swimmer.to_string(),
            event: event.to_string(),
        });
    }

    let races = series.len();
    Ok(SwimmerSummary {
        swimmer: swimmer.clone(),
        races,
        average_time: series.iter().map(|r| r.time()).sum::<f64>() / races as f64,
        best_time: series.iter().map(|r| r.time()).fold(f64::INFINITY, f64::min),
    })
}
