//! Swimmer, event and race-result records, plus manual-entry drafts.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::types::{BirthYear, Distance, Seconds};

/// Columns every record line must carry, in order.
pub const RECORD_FIELDS: [&str; 9] = [
    "swimmer id",
    "name",
    "birth year",
    "sex",
    "distance",
    "stroke",
    "course",
    "date",
    "time",
];

/// Date layout accepted for result dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A swimmer. Equality and hashing cover every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swimmer {
    /// Club or federation identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Birth year.
    pub birth_year: BirthYear,
    /// Sex code, stored verbatim (usually "M" or "F").
    pub sex: String,
}

impl Swimmer {
    /// Builds a swimmer from its four identifying fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        birth_year: BirthYear,
        sex: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birth_year,
            sex: sex.into(),
        }
    }
}

impl fmt::Display for Swimmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.sex, self.birth_year)
    }
}

/// A race event such as "100 Free SCY".
///
/// Ordering is by distance, then stroke, then course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    /// Race distance.
    pub distance: Distance,
    /// Stroke name, case-sensitive as entered.
    pub stroke: String,
    /// Course code (e.g. SCY, SCM, LCM).
    pub course: String,
}

impl Event {
    /// Builds an event.
    pub fn new(distance: Distance, stroke: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            distance,
            stroke: stroke.into(),
            course: course.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.distance, self.stroke, self.course)
    }
}

/// One race outcome. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    swimmer: Arc<Swimmer>,
    event: Arc<Event>,
    date: NaiveDate,
    time: Seconds,
}

impl RaceResult {
    /// Builds a result referencing shared swimmer and event values.
    ///
    /// `time` is taken as given; use [`RaceResult::try_new`] for unvetted
    /// input.
    pub fn new(swimmer: Arc<Swimmer>, event: Arc<Event>, date: NaiveDate, time: Seconds) -> Self {
        Self {
            swimmer,
            event,
            date,
            time,
        }
    }

    /// Like [`RaceResult::new`], but rejects a time that is not a finite
    /// positive number of seconds.
    pub fn try_new(
        swimmer: Arc<Swimmer>,
        event: Arc<Event>,
        date: NaiveDate,
        time: Seconds,
    ) -> Result<Self, FieldError> {
        check_time(time, || time.to_string())?;
        Ok(Self::new(swimmer, event, date, time))
    }

    /// Swimmer who swam the race.
    pub fn swimmer(&self) -> &Arc<Swimmer> {
        &self.swimmer
    }

    /// Event swum.
    pub fn event(&self) -> &Arc<Event> {
        &self.event
    }

    /// Race date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Final time in seconds.
    pub fn time(&self) -> Seconds {
        self.time
    }

    pub(crate) fn with_shared(&self, swimmer: Arc<Swimmer>, event: Arc<Event>) -> Self {
        Self {
            swimmer,
            event,
            date: self.date,
            time: self.time,
        }
    }
}

/// Reason a single field (or a whole record's shape) was rejected.
///
/// `field` names come from [`RECORD_FIELDS`]; `value` is the offending text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The record has fewer columns than [`RECORD_FIELDS`].
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields {
        /// Columns required.
        expected: usize,
        /// Columns present.
        found: usize,
    },
    /// An integer column did not parse.
    #[error("{field} is not an integer: {value:?}")]
    BadInteger {
        /// Column name.
        field: &'static str,
        /// Text as entered.
        value: String,
    },
    /// A decimal column did not parse.
    #[error("{field} is not a number: {value:?}")]
    BadNumber {
        /// Column name.
        field: &'static str,
        /// Text as entered.
        value: String,
    },
    /// The date is not a real `YYYY-MM-DD` date.
    #[error("date is not YYYY-MM-DD: {value:?}")]
    BadDate {
        /// Text as entered.
        value: String,
    },
    /// A distance of zero, or a time that is zero, negative or not finite.
    #[error("{field} must be positive: {value:?}")]
    NotPositive {
        /// Column name.
        field: &'static str,
        /// Text as entered.
        value: String,
    },
}

/// Reason a manual entry could not become a result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    /// A field was blank after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A field was present but malformed.
    #[error(transparent)]
    Invalid(#[from] FieldError),
}

/// Fully parsed record fields, not yet bound to shared values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedRecord {
    pub swimmer: Swimmer,
    pub event: Event,
    pub date: NaiveDate,
    pub time: Seconds,
}

impl ParsedRecord {
    /// Parses the nine record columns; extra trailing columns are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, FieldError> {
        if fields.len() < RECORD_FIELDS.len() {
            return Err(FieldError::TooFewFields {
                expected: RECORD_FIELDS.len(),
                found: fields.len(),
            });
        }
        let f = |i: usize| field(fields, i);

        let birth_year = f(2)
            .parse::<BirthYear>()
            .map_err(|_| FieldError::BadInteger {
                field: RECORD_FIELDS[2],
                value: f(2).to_string(),
            })?;
        let distance = parse_distance(f(4))?;
        let date = parse_date(f(7))?;
        let time = parse_time(f(8))?;

        Ok(Self {
            swimmer: Swimmer::new(f(0), f(1), birth_year, f(3)),
            event: Event::new(distance, f(5), f(6)),
            date,
            time,
        })
    }
}

fn field<S: AsRef<str>>(fields: &[S], idx: usize) -> &str {
    fields[idx].as_ref().trim()
}

fn parse_distance(raw: &str) -> Result<Distance, FieldError> {
    let distance = raw.parse::<Distance>().map_err(|_| FieldError::BadInteger {
        field: RECORD_FIELDS[4],
        value: raw.to_string(),
    })?;
    if distance == 0 {
        return Err(FieldError::NotPositive {
            field: RECORD_FIELDS[4],
            value: raw.to_string(),
        });
    }
    Ok(distance)
}

fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| FieldError::BadDate {
        value: raw.to_string(),
    })
}

fn parse_time(raw: &str) -> Result<Seconds, FieldError> {
    let time = raw.parse::<Seconds>().map_err(|_| FieldError::BadNumber {
        field: RECORD_FIELDS[8],
        value: raw.to_string(),
    })?;
    check_time(time, || raw.to_string())?;
    Ok(time)
}

fn check_time(time: Seconds, raw: impl FnOnce() -> String) -> Result<(), FieldError> {
    if !time.is_finite() || time <= 0.0 {
        return Err(FieldError::NotPositive {
            field: RECORD_FIELDS[8],
            value: raw(),
        });
    }
    Ok(())
}

/// Hands out one shared allocation per distinct swimmer and event value.
#[derive(Debug, Default)]
pub(crate) struct Interner {
    swimmers: HashSet<Arc<Swimmer>>,
    events: HashSet<Arc<Event>>,
}

impl Interner {
    pub fn swimmer(&mut self, swimmer: Swimmer) -> Arc<Swimmer> {
        if let Some(shared) = self.swimmers.get(&swimmer) {
            return Arc::clone(shared);
        }
        let shared = Arc::new(swimmer);
        self.swimmers.insert(Arc::clone(&shared));
        shared
    }

    pub fn event(&mut self, event: Event) -> Arc<Event> {
        if let Some(shared) = self.events.get(&event) {
            return Arc::clone(shared);
        }
        let shared = Arc::new(event);
        self.events.insert(Arc::clone(&shared));
        shared
    }

    pub fn result(&mut self, record: ParsedRecord) -> RaceResult {
        RaceResult::new(
            self.swimmer(record.swimmer),
            self.event(record.event),
            record.date,
            record.time,
        )
    }
}

/// Raw text of a hand-typed result, validated into a [`RaceResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    /// Swimmer identifier.
    pub swimmer_id: String,
    /// Swimmer name.
    pub name: String,
    /// Birth year text.
    pub birth_year: String,
    /// Sex code.
    pub sex: String,
    /// Distance text.
    pub distance: String,
    /// Stroke name.
    pub stroke: String,
    /// Course code.
    pub course: String,
    /// Date text, `YYYY-MM-DD`.
    pub date: String,
    /// Time text in seconds.
    pub time: String,
}

impl ManualEntry {
    fn fields(&self) -> [&str; 9] {
        [
            &self.swimmer_id,
            &self.name,
            &self.birth_year,
            &self.sex,
            &self.distance,
            &self.stroke,
            &self.course,
            &self.date,
            &self.time,
        ]
    }

    /// Checks every field is present and well-formed, then builds the result.
    pub fn validate(&self) -> Result<RaceResult, EntryError> {
        let fields = self.fields();
        if let Some(idx) = fields.iter().position(|f| f.trim().is_empty()) {
            return Err(EntryError::MissingField(RECORD_FIELDS[idx]));
        }
        let record = ParsedRecord::from_fields(&fields[..])?;
        Ok(RaceResult::new(
            Arc::new(record.swimmer),
            Arc::new(record.event),
            record.date,
            record.time,
        ))
    }
}
