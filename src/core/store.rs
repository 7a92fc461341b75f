use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    model::{Event, RaceResult, Swimmer},
    types::{RowIdx, Seconds},
};

use super::indices::{group_rows, VecIndex};

/// Whole-dataset summary figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    /// Distinct swimmers.
    pub swimmer_count: usize,
    /// Distinct events.
    pub event_count: usize,
    /// Results stored.
    pub result_count: usize,
    /// Distinct swimmers with sex "M".
    pub male_swimmers: usize,
    /// Distinct swimmers with sex "F".
    pub female_swimmers: usize,
    /// Oldest race date.
    pub earliest: Option<NaiveDate>,
    /// Newest race date.
    pub latest: Option<NaiveDate>,
    /// Fastest time in any event.
    pub fastest_time: Option<Seconds>,
    /// Mean over every result.
    pub average_time: Option<Seconds>,
    /// Zero for an empty store.
    pub results_per_swimmer: f64,
}

/// Immutable flat list of results plus the groupings derived from it.
///
/// The indices are built once, from the list, when the snapshot is created.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    results: Vec<RaceResult>,
    by_swimmer: VecIndex<Swimmer>,
    by_event: VecIndex<Event>,
    swimmer_order: Vec<Arc<Swimmer>>,
    event_order: Vec<Arc<Event>>,
}

impl StoreSnapshot {
    /// Derives both groupings from `results`.
    pub fn build(results: Vec<RaceResult>) -> Self {
        let (by_swimmer, swimmer_order) = group_rows(&results, RaceResult::swimmer);
        let (by_event, event_order) = group_rows(&results, RaceResult::event);

        tracing::debug!(
            results = results.len(),
            swimmers = swimmer_order.len(),
            events = event_order.len(),
            "rebuilt result indices"
        );

        Self {
            results,
            by_swimmer,
            by_event,
            swimmer_order,
            event_order,
        }
    }

    /// The flat list, in insertion order.
    pub fn results(&self) -> &[RaceResult] {
        &self.results
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when no results are stored.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results for a swimmer, in list order; empty when unknown.
    pub fn by_swimmer(&self, swimmer: &Swimmer) -> Vec<&RaceResult> {
        self.rows(self.by_swimmer.get(swimmer))
    }

    /// Results in an event, in list order; empty when unknown.
    pub fn by_event(&self, event: &Event) -> Vec<&RaceResult> {
        self.rows(self.by_event.get(event))
    }

    /// One swimmer's results in one event, oldest first.
    pub fn series(&self, swimmer: &Swimmer, event: &Event) -> Vec<&RaceResult> {
        let mut out: Vec<&RaceResult> = self
            .by_swimmer(swimmer)
            .into_iter()
            .filter(|r| r.event().as_ref() == event)
            .collect();
        out.sort_by_key(|r| r.date());
        out
    }

    /// Every distinct swimmer, sorted by name; ties keep first-seen order.
    pub fn swimmers(&self) -> Vec<Arc<Swimmer>> {
        let mut out = self.swimmer_order.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Swimmers whose name contains `query`, ignoring case.
    pub fn search_swimmers(&self, query: &str) -> Vec<Arc<Swimmer>> {
        let needle = query.trim().to_lowercase();
        self.swimmers()
            .into_iter()
            .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Every distinct event in (distance, stroke, course) order.
    pub fn events(&self) -> Vec<Arc<Event>> {
        let mut out = self.event_order.clone();
        out.sort();
        out
    }

    /// Distinct events a swimmer has results in, in (distance, stroke, course) order.
    pub fn events_for(&self, swimmer: &Swimmer) -> Vec<Arc<Event>> {
        let mut out: Vec<Arc<Event>> = self
            .by_swimmer(swimmer)
            .into_iter()
            .map(|r| Arc::clone(r.event()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Whole-dataset summary.
    pub fn stats(&self) -> DatasetStats {
        let times = || self.results.iter().map(RaceResult::time);
        let count_sex = |code: &str| self.swimmer_order.iter().filter(|s| s.sex == code).count();

        let result_count = self.results.len();
        let swimmer_count = self.swimmer_order.len();

        DatasetStats {
            swimmer_count,
            event_count: self.event_order.len(),
            result_count,
            male_swimmers: count_sex("M"),
            female_swimmers: count_sex("F"),
            earliest: self.results.iter().map(RaceResult::date).min(),
            latest: self.results.iter().map(RaceResult::date).max(),
            fastest_time: times().min_by(f64::total_cmp),
            average_time: (result_count > 0).then(|| times().sum::<f64>() / result_count as f64),
            results_per_swimmer: if swimmer_count > 0 {
                result_count as f64 / swimmer_count as f64
            } else {
                0.0
            },
        }
    }

    pub(crate) fn shared_swimmer(&self, swimmer: &Swimmer) -> Option<Arc<Swimmer>> {
        self.by_swimmer.get_key_value(swimmer).map(|(k, _)| Arc::clone(k))
    }

    pub(crate) fn shared_event(&self, event: &Event) -> Option<Arc<Event>> {
        self.by_event.get_key_value(event).map(|(k, _)| Arc::clone(k))
    }

    fn rows(&self, ids: Option<&Vec<RowIdx>>) -> Vec<&RaceResult> {
        ids.into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|idx| self.results.get(*idx))
            .collect()
    }
}

/// Authoritative result store.
///
/// Every mutation builds a complete new [`StoreSnapshot`] and swaps it in, so a
/// reader holding a snapshot never sees a list whose indices lag behind it.
#[derive(Debug, Default)]
pub struct ResultStore {
    current: Arc<StoreSnapshot>,
}

impl ResultStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `results`.
    pub fn from_results(results: Vec<RaceResult>) -> Self {
        Self {
            current: Arc::new(StoreSnapshot::build(results)),
        }
    }

    /// Current snapshot; stays valid and unchanged across later mutations.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&self.current)
    }

    /// Discards prior content and installs `results`.
    pub fn replace_all(&mut self, results: Vec<RaceResult>) {
        self.current = Arc::new(StoreSnapshot::build(results));
    }

    /// Adds one result, reusing the store's shared swimmer and event values.
    pub fn append(&mut self, result: RaceResult) {
        let swimmer = self
            .current
            .shared_swimmer(result.swimmer())
            .unwrap_or_else(|| Arc::clone(result.swimmer()));
        let event = self
            .current
            .shared_event(result.event())
            .unwrap_or_else(|| Arc::clone(result.event()));

        let mut results = Vec::with_capacity(self.current.len() + 1);
        results.extend_from_slice(self.current.results());
        results.push(result.with_shared(swimmer, event));
        self.current = Arc::new(StoreSnapshot::build(results));
    }

    /// See [`StoreSnapshot::results`].
    pub fn results(&self) -> &[RaceResult] {
        self.current.results()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// True when no results are stored.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// See [`StoreSnapshot::by_swimmer`].
    pub fn by_swimmer(&self, swimmer: &Swimmer) -> Vec<&RaceResult> {
        self.current.by_swimmer(swimmer)
    }

    /// See [`StoreSnapshot::by_event`].
    pub fn by_event(&self, event: &Event) -> Vec<&RaceResult> {
        self.current.by_event(event)
    }
}
