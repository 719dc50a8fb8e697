//! Domain repositories on top of a [`DocumentStore`].
//!
//! Multi-document writes are committed as one batch. Batches exceeding the store's commit limit
//! are split into chunks, and a failure after the first committed chunk is reported as a partial
//! write.

use chrono::Utc;
use fittrack_domain as domain;
use log::{error, warn};

use crate::{
    document::{Document, DocumentStore, Fields, Query, StoreError, Value, Write},
    layout::{
        self, EXERCISES, WORKOUTS, exercise_path, logged_exercise_path, logged_exercises_collection,
        set_index, set_path, sets_collection, workout_path,
    },
};

#[derive(Clone)]
pub struct DocumentRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DocumentRepository<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        let size = self.store.max_batch_size().max(1);
        let total = writes.len().div_ceil(size);
        for (completed, chunk) in writes.chunks(size).enumerate() {
            if let Err(err) = self.store.commit(chunk.to_vec()).await {
                if completed == 0 {
                    return Err(err);
                }
                error!("failed to commit batch {} of {total}: {err}", completed + 1);
                return Err(StoreError::PartialWrite { completed, total });
            }
        }
        Ok(())
    }

    async fn read_dates(&self, query: &Query) -> Result<Vec<domain::WorkoutDate>, StoreError> {
        Ok(self
            .store
            .list(WORKOUTS, query)
            .await?
            .into_iter()
            .filter_map(|document| match domain::WorkoutDate::try_from(document.id.as_str()) {
                Ok(date) => Some(date),
                Err(err) => {
                    warn!("ignoring workout {}: {err}", document.id);
                    None
                }
            })
            .collect())
    }

    async fn read_set_documents(
        &self,
        date: domain::WorkoutDate,
        exercise_id: &domain::ExerciseID,
    ) -> Result<Vec<Document>, StoreError> {
        self.store
            .list(&sets_collection(date, exercise_id), &Query::default())
            .await
    }
}

impl<S: DocumentStore + domain::SessionRepository> domain::SessionRepository
    for DocumentRepository<S>
{
    async fn request_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<domain::User, domain::ReadError> {
        self.store.request_session(email, password).await
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        self.store.initialize_session().await
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        self.store.delete_session().await
    }
}

impl<S: DocumentStore> domain::ExerciseRepository for DocumentRepository<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self
            .store
            .list(EXERCISES, &Query::default())
            .await?
            .iter()
            .filter_map(|document| match layout::exercise_from_document(document) {
                Ok(exercise) => Some(exercise),
                Err(err) => {
                    warn!("ignoring exercise: {err}");
                    None
                }
            })
            .collect())
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let created_at = Utc::now();
        let id = self
            .store
            .add(EXERCISES, layout::exercise_fields(&name, created_at))
            .await?;
        Ok(domain::Exercise {
            id: id.into(),
            name,
            created_at,
        })
    }

    async fn delete_exercise(
        &self,
        id: &domain::ExerciseID,
        tombstone_dates: &[domain::WorkoutDate],
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        let mut writes = tombstone_dates
            .iter()
            .map(|date| Write::Set {
                path: logged_exercise_path(*date, id),
                fields: Fields::from([(
                    "exerciseName".to_string(),
                    Value::from(domain::TOMBSTONE_NAME),
                )]),
                merge: true,
            })
            .collect::<Vec<_>>();
        writes.push(Write::Delete {
            path: exercise_path(id),
        });
        self.commit(writes).await?;
        Ok(id.clone())
    }
}

impl<S: DocumentStore> domain::WorkoutRepository for DocumentRepository<S> {
    async fn read_daily_log(
        &self,
        date: domain::WorkoutDate,
    ) -> Result<Option<domain::DailyLog>, domain::ReadError> {
        Ok(self
            .store
            .get(&workout_path(date))
            .await?
            .map(|document| layout::daily_log_from_document(date, &document)))
    }

    async fn write_title(
        &self,
        date: domain::WorkoutDate,
        title: String,
    ) -> Result<domain::DailyLog, domain::UpdateError> {
        let updated_at = Utc::now();
        let mut fields = layout::workout_fields(date, updated_at);
        fields.insert("title".to_string(), Value::from(title.clone()));
        self.commit(vec![Write::Set {
            path: workout_path(date),
            fields,
            merge: true,
        }])
        .await?;
        Ok(domain::DailyLog {
            date,
            title,
            updated_at: Some(updated_at),
        })
    }

    async fn read_logged_exercises(
        &self,
        date: domain::WorkoutDate,
    ) -> Result<Vec<domain::LoggedExercise>, domain::ReadError> {
        Ok(self
            .store
            .list(&logged_exercises_collection(date), &Query::default())
            .await?
            .iter()
            .map(layout::logged_exercise_from_document)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn write_logged_exercise(
        &self,
        date: domain::WorkoutDate,
        logged_exercise: domain::LoggedExercise,
    ) -> Result<domain::LoggedExercise, domain::UpdateError> {
        let updated_at = Utc::now();
        self.commit(vec![
            Write::Set {
                path: workout_path(date),
                fields: layout::workout_fields(date, updated_at),
                merge: true,
            },
            Write::Set {
                path: logged_exercise_path(date, &logged_exercise.exercise_id),
                fields: layout::logged_exercise_fields(&logged_exercise, updated_at),
                merge: true,
            },
        ])
        .await?;
        Ok(domain::LoggedExercise {
            updated_at: Some(updated_at),
            ..logged_exercise
        })
    }

    async fn delete_logged_exercise(
        &self,
        date: domain::WorkoutDate,
        exercise_id: &domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        let sets = self.read_set_documents(date, exercise_id).await?;
        let mut writes = sets
            .iter()
            .map(|document| Write::Delete {
                path: format!("{}/{}", sets_collection(date, exercise_id), document.id),
            })
            .collect::<Vec<_>>();
        writes.push(Write::Delete {
            path: logged_exercise_path(date, exercise_id),
        });
        self.commit(writes).await?;
        Ok(exercise_id.clone())
    }

    async fn read_sets(
        &self,
        date: domain::WorkoutDate,
        exercise_id: &domain::ExerciseID,
    ) -> Result<Vec<domain::SetEntry>, domain::ReadError> {
        let documents = self.read_set_documents(date, exercise_id).await?;
        Ok(layout::sets_from_documents(&documents)?)
    }

    async fn replace_sets(
        &self,
        date: domain::WorkoutDate,
        logged_exercise: domain::LoggedExercise,
        sets: Vec<domain::SetEntry>,
    ) -> Result<Vec<domain::SetEntry>, domain::UpdateError> {
        let exercise_id = &logged_exercise.exercise_id;
        let stale = self
            .read_set_documents(date, exercise_id)
            .await?
            .iter()
            .filter_map(|document| set_index(&document.id))
            .filter(|index| *index >= sets.len())
            .collect::<Vec<_>>();
        let updated_at = Utc::now();
        let mut writes = vec![
            Write::Set {
                path: workout_path(date),
                fields: layout::workout_fields(date, updated_at),
                merge: true,
            },
            Write::Set {
                path: logged_exercise_path(date, exercise_id),
                fields: layout::logged_exercise_fields(&logged_exercise, updated_at),
                merge: true,
            },
        ];
        writes.extend(sets.iter().enumerate().map(|(index, set)| Write::Set {
            path: set_path(date, exercise_id, index),
            fields: layout::set_fields(set),
            merge: false,
        }));
        writes.extend(stale.into_iter().map(|index| Write::Delete {
            path: set_path(date, exercise_id, index),
        }));
        self.commit(writes).await?;
        Ok(sets)
    }

    async fn read_dates_before(
        &self,
        date: domain::WorkoutDate,
        limit: Option<usize>,
    ) -> Result<Vec<domain::WorkoutDate>, domain::ReadError> {
        Ok(self
            .read_dates(&Query {
                before: Some(date.key()),
                descending: true,
                limit,
            })
            .await?)
    }

    async fn read_dates_referencing(
        &self,
        exercise_id: &domain::ExerciseID,
    ) -> Result<Vec<domain::WorkoutDate>, domain::ReadError> {
        let mut dates = vec![];
        for date in self.read_dates(&Query::default()).await? {
            if self
                .store
                .get(&logged_exercise_path(date, exercise_id))
                .await?
                .is_some()
            {
                dates.push(date);
            }
        }
        Ok(dates)
    }
}
