use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display};

use crate::{CreateError, DeleteError, Name, ReadError, WorkoutDate};

/// Name written into logged exercises whose catalog entry was deleted with cascading.
pub const TOMBSTONE_NAME: &str = "Deleted exercise";

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, name: &str) -> Result<Exercise, CreateError>;
    async fn delete_exercise(
        &self,
        id: &ExerciseID,
        cascade: bool,
    ) -> Result<ExerciseID, DeleteError>;
    async fn check_exercise_dependencies(&self, id: &ExerciseID) -> Result<usize, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, name: Name) -> Result<Exercise, CreateError>;
    /// Deletes the exercise and tombstones its entries on the given dates in one write.
    async fn delete_exercise(
        &self,
        id: &ExerciseID,
        tombstone_dates: &[WorkoutDate],
    ) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub created_at: DateTime<Utc>,
}

/// Server-assigned document identifier.
#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl ExerciseID {
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Orders exercises newest-created first.
pub fn sort_newest_first(exercises: &mut [Exercise]) {
    exercises.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Returns the first exercise whose name collides with `name` case-insensitively.
#[must_use]
pub fn find_duplicate<'a>(exercises: &'a [Exercise], name: &Name) -> Option<&'a Exercise> {
    exercises.iter().find(|e| e.name.matches(name))
}
