//! Persisted layout
//!
//! ```text
//! exercises/{exerciseId}                                  name, createdAt
//! workouts/{date}                                         date, title, updatedAt
//! workouts/{date}/exercises/{exerciseId}                  exerciseName, orderIndex, updatedAt
//! workouts/{date}/exercises/{exerciseId}/sets/set-{n}     weight, reps, timestamp
//! ```

use chrono::{DateTime, Utc};
use fittrack_domain as domain;

use crate::document::{Document, Fields, StoreError, Value};

pub const EXERCISES: &str = "exercises";
pub const WORKOUTS: &str = "workouts";

const SET_PREFIX: &str = "set-";

#[must_use]
pub fn exercise_path(id: &domain::ExerciseID) -> String {
    format!("{EXERCISES}/{id}")
}

#[must_use]
pub fn workout_path(date: domain::WorkoutDate) -> String {
    format!("{WORKOUTS}/{date}")
}

#[must_use]
pub fn logged_exercises_collection(date: domain::WorkoutDate) -> String {
    format!("{}/exercises", workout_path(date))
}

#[must_use]
pub fn logged_exercise_path(date: domain::WorkoutDate, id: &domain::ExerciseID) -> String {
    format!("{}/{id}", logged_exercises_collection(date))
}

#[must_use]
pub fn sets_collection(date: domain::WorkoutDate, id: &domain::ExerciseID) -> String {
    format!("{}/sets", logged_exercise_path(date, id))
}

#[must_use]
pub fn set_path(date: domain::WorkoutDate, id: &domain::ExerciseID, index: usize) -> String {
    format!("{}/{SET_PREFIX}{index}", sets_collection(date, id))
}

/// Position encoded in a set document id.
#[must_use]
pub fn set_index(document_id: &str) -> Option<usize> {
    let digits = document_id.strip_prefix(SET_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn exercise_fields(name: &domain::Name, created_at: DateTime<Utc>) -> Fields {
    Fields::from([
        ("name".to_string(), Value::from(name.to_string())),
        ("createdAt".to_string(), Value::from(created_at)),
    ])
}

pub fn exercise_from_document(document: &Document) -> Result<domain::Exercise, StoreError> {
    Ok(domain::Exercise {
        id: document.id.as_str().into(),
        name: domain::Name::from_stored(document.string("name")?)
            .map_err(|err| StoreError::InvalidDocument(format!("{}: {err}", document.id)))?,
        created_at: document.timestamp("createdAt")?,
    })
}

pub fn workout_fields(date: domain::WorkoutDate, updated_at: DateTime<Utc>) -> Fields {
    Fields::from([
        ("date".to_string(), Value::from(date.key())),
        ("updatedAt".to_string(), Value::from(updated_at)),
    ])
}

pub fn daily_log_from_document(
    date: domain::WorkoutDate,
    document: &Document,
) -> domain::DailyLog {
    domain::DailyLog {
        date,
        title: document.optional_string("title").unwrap_or_default().to_string(),
        updated_at: document.optional_timestamp("updatedAt"),
    }
}

pub fn logged_exercise_fields(
    logged_exercise: &domain::LoggedExercise,
    updated_at: DateTime<Utc>,
) -> Fields {
    let mut fields = Fields::from([
        (
            "exerciseName".to_string(),
            Value::from(logged_exercise.exercise_name.clone()),
        ),
        ("updatedAt".to_string(), Value::from(updated_at)),
    ]);
    if let Some(order_index) = logged_exercise.order_index.value() {
        fields.insert(
            "orderIndex".to_string(),
            Value::from(i64::from(order_index)),
        );
    }
    fields
}

pub fn logged_exercise_from_document(
    document: &Document,
) -> Result<domain::LoggedExercise, StoreError> {
    Ok(domain::LoggedExercise {
        exercise_id: document.id.as_str().into(),
        exercise_name: document.string("exerciseName")?.to_string(),
        order_index: domain::OrderIndex::from_stored(document.optional_integer("orderIndex")),
        updated_at: document.optional_timestamp("updatedAt"),
    })
}

pub fn set_fields(set: &domain::SetEntry) -> Fields {
    Fields::from([
        (
            "weight".to_string(),
            Value::from(decimal(set.weight)),
        ),
        (
            "reps".to_string(),
            Value::from(i64::from(u32::from(set.reps))),
        ),
        ("timestamp".to_string(), Value::from(set.timestamp)),
    ])
}

/// Weight as written by a person, so that 60.1 is stored as 60.1 and not as its `f32` expansion.
fn decimal(weight: domain::Weight) -> f64 {
    let weight = f32::from(weight);
    weight.to_string().parse().unwrap_or(f64::from(weight))
}

pub fn set_from_document(document: &Document) -> Result<domain::SetEntry, StoreError> {
    let invalid = |err: &dyn std::fmt::Display| {
        StoreError::InvalidDocument(format!("{}: {err}", document.id))
    };
    let reps = u32::try_from(document.integer("reps")?).map_err(|err| invalid(&err))?;
    Ok(domain::SetEntry {
        weight: domain::Weight::from_stored(document.number("weight")?)
            .map_err(|err| invalid(&err))?,
        reps: domain::Reps::from_stored(reps),
        timestamp: document.timestamp("timestamp")?,
    })
}

/// Decodes set documents in positional order, ignoring documents without a position.
pub fn sets_from_documents(documents: &[Document]) -> Result<Vec<domain::SetEntry>, StoreError> {
    let mut indexed = documents
        .iter()
        .filter_map(|d| set_index(&d.id).map(|index| (index, d)))
        .collect::<Vec<_>>();
    indexed.sort_by_key(|(index, _)| *index);
    indexed
        .into_iter()
        .map(|(_, d)| set_from_document(d))
        .collect()
}
