use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use derive_more::{Display, Into};

use crate::{DeleteError, ExerciseID, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_title(&self, date: WorkoutDate) -> Result<String, ReadError>;
    async fn set_title(&self, date: WorkoutDate, title: String) -> Result<DailyLog, UpdateError>;
    async fn get_logged_exercises(&self, date: WorkoutDate)
    -> Result<Vec<LoggedExercise>, ReadError>;
    async fn add_exercise_to_log(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
        exercise_name: &str,
    ) -> Result<LoggedExercise, UpdateError>;
    async fn remove_exercise_from_log(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
    ) -> Result<ExerciseID, DeleteError>;
    async fn get_sets(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
    ) -> Result<Vec<SetEntry>, ReadError>;
    async fn save_sets(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
        sets: Vec<SetEntry>,
    ) -> Result<Vec<SetEntry>, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_daily_log(&self, date: WorkoutDate) -> Result<Option<DailyLog>, ReadError>;
    /// Merges the title into the date's metadata without touching other fields.
    async fn write_title(&self, date: WorkoutDate, title: String) -> Result<DailyLog, UpdateError>;
    /// Returns the entries of a date in the order the store delivers them.
    async fn read_logged_exercises(
        &self,
        date: WorkoutDate,
    ) -> Result<Vec<LoggedExercise>, ReadError>;
    async fn write_logged_exercise(
        &self,
        date: WorkoutDate,
        logged_exercise: LoggedExercise,
    ) -> Result<LoggedExercise, UpdateError>;
    /// Deletes the entry together with all of its sets.
    async fn delete_logged_exercise(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
    ) -> Result<ExerciseID, DeleteError>;
    async fn read_sets(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
    ) -> Result<Vec<SetEntry>, ReadError>;
    /// Writes date metadata, entry metadata and the full set sequence as one batch and removes
    /// positions beyond the new sequence.
    async fn replace_sets(
        &self,
        date: WorkoutDate,
        logged_exercise: LoggedExercise,
        sets: Vec<SetEntry>,
    ) -> Result<Vec<SetEntry>, UpdateError>;
    /// Returns dates strictly before `date`, newest first, at most `limit` of them.
    async fn read_dates_before(
        &self,
        date: WorkoutDate,
        limit: Option<usize>,
    ) -> Result<Vec<WorkoutDate>, ReadError>;
    async fn read_dates_referencing(
        &self,
        exercise_id: &ExerciseID,
    ) -> Result<Vec<WorkoutDate>, ReadError>;
}

/// Calendar day in `YYYY-MM-DD` form.
///
/// Stores compare dates as strings, so the zero-padded four-digit year format must hold for
/// every value. Years outside 1 to 9999 are rejected.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutDate(NaiveDate);

impl WorkoutDate {
    pub fn new(date: NaiveDate) -> Result<Self, WorkoutDateError> {
        if !(1..=9999).contains(&date.year()) {
            return Err(WorkoutDateError::OutOfRange(date.year()));
        }
        Ok(Self(date))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, WorkoutDateError> {
        Self::new(NaiveDate::from_ymd_opt(year, month, day).ok_or(WorkoutDateError::Invalid)?)
    }

    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WorkoutDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl TryFrom<&str> for WorkoutDate {
    type Error = WorkoutDateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(WorkoutDateError::Format(value.to_string()));
        }
        let year = value[0..4].parse::<i32>().map_err(|_| WorkoutDateError::Invalid)?;
        let month = value[5..7].parse::<u32>().map_err(|_| WorkoutDateError::Invalid)?;
        let day = value[8..10].parse::<u32>().map_err(|_| WorkoutDateError::Invalid)?;
        Self::from_ymd(year, month, day)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkoutDateError {
    #[error("Date must have the form YYYY-MM-DD ({0})")]
    Format(String),
    #[error("Date does not exist")]
    Invalid,
    #[error("Year must be in the range 1 to 9999 ({0})")]
    OutOfRange(i32),
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !value.is_finite() || !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// Accepts any finite non-negative weight. The upper bound only applies to new input.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_stored(value: f64) -> Result<Self, WeightError> {
        let value = value as f32;
        if !value.is_finite() || value < 0.0 {
            return Err(WeightError::Invalid);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Weight::default());
        }
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WeightError {
    #[error("Weight must be in the range 0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
    #[error("Weight must be a non-negative number")]
    Invalid,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// The upper bound only applies to new input.
    #[must_use]
    pub fn from_stored(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Reps::default());
        }
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetEntry {
    pub weight: Weight,
    pub reps: Reps,
    pub timestamp: DateTime<Utc>,
}

impl SetEntry {
    #[must_use]
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            weight: Weight::default(),
            reps: Reps::default(),
            timestamp,
        }
    }

    /// Compares weight and reps only.
    #[must_use]
    pub fn same_performance(&self, other: &SetEntry) -> bool {
        self.weight == other.weight && self.reps == other.reps
    }
}

impl fmt::Display for SetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg × {} reps", self.weight, self.reps)
    }
}

/// Position of an exercise within a day.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderIndex(u32);

impl OrderIndex {
    /// Assigned to entries stored without an index, so that they sort after all others.
    pub const UNSET: OrderIndex = OrderIndex(u32::MAX);

    /// Values colliding with [`OrderIndex::UNSET`] are clamped below it.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value.min(u32::MAX - 1))
    }

    #[must_use]
    pub fn from_stored(value: Option<i64>) -> Self {
        value
            .and_then(|v| u32::try_from(v).ok())
            .map_or(Self::UNSET, Self::new)
    }

    #[must_use]
    pub fn is_set(self) -> bool {
        self != Self::UNSET
    }

    #[must_use]
    pub fn value(self) -> Option<u32> {
        self.is_set().then_some(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLog {
    pub date: WorkoutDate,
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedExercise {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub order_index: OrderIndex,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sorts by order index. The sort is stable, so colliding indices keep arrival order.
pub fn sort_logged_exercises(logged_exercises: &mut [LoggedExercise]) {
    logged_exercises.sort_by_key(|e| e.order_index);
}

/// Index for appending a new entry to a day with `count` entries.
#[must_use]
pub fn next_order_index(count: usize) -> OrderIndex {
    OrderIndex::new(u32::try_from(count).map_or(u32::MAX, |c| c.saturating_add(1)))
}
