use fittrack_domain::{DeleteError, Exercise, ExerciseID, ExerciseService};

use crate::{Notification, Notifications, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The exercise is logged on the given number of dates and was kept.
    Conflict(usize),
    Failed,
}

/// Client-side view of the exercise catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    exercises: Resource<Vec<Exercise>>,
}

impl Catalog {
    #[must_use]
    pub fn exercises(&self) -> &Resource<Vec<Exercise>> {
        &self.exercises
    }

    #[must_use]
    pub fn find(&self, id: &ExerciseID) -> Option<&Exercise> {
        self.exercises.ready()?.iter().find(|e| e.id == *id)
    }

    pub async fn refresh<S: ExerciseService>(
        &mut self,
        service: &S,
        notifications: &mut Notifications,
    ) {
        self.exercises = Resource::Loading;
        self.exercises = match service.get_exercises().await {
            Ok(exercises) => Resource::Ready(exercises),
            Err(err) => {
                notifications.push(Notification::failure("load exercises", &err));
                Resource::Unavailable
            }
        };
    }

    pub async fn add<S: ExerciseService>(
        &mut self,
        service: &S,
        name: &str,
        notifications: &mut Notifications,
    ) -> Option<Exercise> {
        match service.create_exercise(name).await {
            Ok(exercise) => {
                notifications.push(Notification::success(format!(
                    "Exercise \"{}\" added!",
                    exercise.name
                )));
                if let Resource::Ready(exercises) = &mut self.exercises {
                    exercises.insert(0, exercise.clone());
                }
                Some(exercise)
            }
            Err(err) => {
                notifications.push(Notification::failure("add exercise", &err));
                None
            }
        }
    }

    /// Deletes an exercise. Unless `cascade` is set, an exercise that is still logged is kept and
    /// the number of dependent dates is returned instead.
    pub async fn delete<S: ExerciseService>(
        &mut self,
        service: &S,
        id: &ExerciseID,
        cascade: bool,
        notifications: &mut Notifications,
    ) -> DeleteOutcome {
        match service.delete_exercise(id, cascade).await {
            Ok(deleted_id) => {
                if let Resource::Ready(exercises) = &mut self.exercises {
                    exercises.retain(|e| e.id != deleted_id);
                }
                DeleteOutcome::Deleted
            }
            Err(DeleteError::Dependencies(dates)) => DeleteOutcome::Conflict(dates),
            Err(err) => {
                notifications.push(Notification::failure("delete exercise", &err));
                DeleteOutcome::Failed
            }
        }
    }
}
