use crate::{core::store::StoreSnapshot, model::Event, types::Seconds};

/// Ratio used when cohort data cannot support a real one.
pub const NEUTRAL_RATIO: f64 = 1.0;

/// Mean time over every result in `event`, across all swimmers.
pub fn mean_time(snapshot: &StoreSnapshot, event: &Event) -> Option<Seconds> {
    let rows = snapshot.by_event(event);
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().map(|r| r.time()).sum::<f64>() / rows.len() as f64)
}

/// `mean(target) / mean(anchor)` over the whole dataset.
///
/// Falls back to [`NEUTRAL_RATIO`] when either event has no results or the
/// anchor mean is not positive.
pub fn cohort_ratio(snapshot: &StoreSnapshot, anchor: &Event, target: &Event) -> f64 {
    match (mean_time(snapshot, anchor), mean_time(snapshot, target)) {
        (Some(anchor_mean), Some(target_mean)) if anchor_mean > 0.0 => target_mean / anchor_mean,
        (anchor_mean, target_mean) => {
            tracing::debug!(
                anchor = %anchor,
                target = %target,
                ?anchor_mean,
                ?target_mean,
                "cohort data missing, using neutral ratio"
            );
            NEUTRAL_RATIO
        }
    }
}
