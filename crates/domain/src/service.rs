use log::{debug, error};

use crate::{
    CreateError, DailyLog, DeleteError, Exercise, ExerciseID, ExerciseRepository, ExerciseService,
    HistoryService, LastRecord, LoggedExercise, Lookback, Name, ReadError, SessionRepository,
    SessionService, SetEntry, UpdateError, User, ValidationError, WorkoutDate, WorkoutRepository,
    WorkoutService, find_duplicate, next_order_index, sort_logged_exercises, sort_newest_first,
};

pub struct Service<R> {
    repository: R,
    lookback: Lookback,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            lookback: Lookback::default(),
        }
    }

    #[must_use]
    pub fn with_lookback(mut self, lookback: Lookback) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn request_session(&self, email: &str, password: &str) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.request_session(email, password),
            ReadError,
            "request",
            "session"
        )
    }

    async fn get_session(&self) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.initialize_session(),
            ReadError,
            "get",
            "session"
        )
    }

    async fn delete_session(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_session(),
            DeleteError,
            "delete",
            "session"
        )
    }
}

impl<R: ExerciseRepository + WorkoutRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            async {
                let mut exercises = self.repository.read_exercises().await?;
                sort_newest_first(&mut exercises);
                Ok::<_, ReadError>(exercises)
            },
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn create_exercise(&self, name: &str) -> Result<Exercise, CreateError> {
        log_on_error!(
            async {
                let name = Name::new(name)?;
                let exercises = self.repository.read_exercises().await?;
                if let Some(existing) = find_duplicate(&exercises, &name) {
                    return Err(CreateError::DuplicateName(existing.name.clone()));
                }
                self.repository.create_exercise(name).await
            },
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn delete_exercise(
        &self,
        id: &ExerciseID,
        cascade: bool,
    ) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            async {
                let dates = self.repository.read_dates_referencing(id).await?;
                if !dates.is_empty() && !cascade {
                    return Err(DeleteError::Dependencies(dates.len()));
                }
                self.repository.delete_exercise(id, &dates).await
            },
            DeleteError,
            "delete",
            "exercise"
        )
    }

    async fn check_exercise_dependencies(&self, id: &ExerciseID) -> Result<usize, ReadError> {
        log_on_error!(
            async { Ok::<_, ReadError>(self.repository.read_dates_referencing(id).await?.len()) },
            ReadError,
            "check",
            "exercise dependencies"
        )
    }
}

impl<R: ExerciseRepository + WorkoutRepository> WorkoutService for Service<R> {
    async fn get_title(&self, date: WorkoutDate) -> Result<String, ReadError> {
        log_on_error!(
            async {
                Ok::<_, ReadError>(
                    self.repository
                        .read_daily_log(date)
                        .await?
                        .map(|daily_log| daily_log.title)
                        .unwrap_or_default(),
                )
            },
            ReadError,
            "get",
            "workout title"
        )
    }

    async fn set_title(&self, date: WorkoutDate, title: String) -> Result<DailyLog, UpdateError> {
        log_on_error!(
            self.repository.write_title(date, title),
            UpdateError,
            "set",
            "workout title"
        )
    }

    async fn get_logged_exercises(
        &self,
        date: WorkoutDate,
    ) -> Result<Vec<LoggedExercise>, ReadError> {
        log_on_error!(
            async {
                let mut logged_exercises = self.repository.read_logged_exercises(date).await?;
                sort_logged_exercises(&mut logged_exercises);
                Ok::<_, ReadError>(logged_exercises)
            },
            ReadError,
            "get",
            "logged exercises"
        )
    }

    async fn add_exercise_to_log(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
        exercise_name: &str,
    ) -> Result<LoggedExercise, UpdateError> {
        log_on_error!(
            async {
                let logged_exercises = self.repository.read_logged_exercises(date).await?;
                let order_index = logged_exercises
                    .iter()
                    .find(|e| e.exercise_id == *exercise_id)
                    .map_or_else(|| next_order_index(logged_exercises.len()), |e| e.order_index);
                self.repository
                    .write_logged_exercise(
                        date,
                        LoggedExercise {
                            exercise_id: exercise_id.clone(),
                            exercise_name: exercise_name.to_string(),
                            order_index,
                            updated_at: None,
                        },
                    )
                    .await
            },
            UpdateError,
            "add",
            "exercise to log"
        )
    }

    async fn remove_exercise_from_log(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
    ) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_logged_exercise(date, exercise_id),
            DeleteError,
            "remove",
            "exercise from log"
        )
    }

    async fn get_sets(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
    ) -> Result<Vec<SetEntry>, ReadError> {
        log_on_error!(
            self.repository.read_sets(date, exercise_id),
            ReadError,
            "get",
            "sets"
        )
    }

    async fn save_sets(
        &self,
        date: WorkoutDate,
        exercise_id: &ExerciseID,
        sets: Vec<SetEntry>,
    ) -> Result<Vec<SetEntry>, UpdateError> {
        log_on_error!(
            async {
                if sets.is_empty() {
                    return Err(UpdateError::Validation(ValidationError::NoSets));
                }
                let logged_exercises = self.repository.read_logged_exercises(date).await?;
                let logged_exercise = match logged_exercises
                    .iter()
                    .find(|e| e.exercise_id == *exercise_id)
                {
                    Some(logged_exercise) => logged_exercise.clone(),
                    None => {
                        let exercises = self.repository.read_exercises().await?;
                        let exercise = exercises
                            .into_iter()
                            .find(|e| e.id == *exercise_id)
                            .ok_or(UpdateError::NotFound)?;
                        LoggedExercise {
                            exercise_id: exercise.id,
                            exercise_name: exercise.name.to_string(),
                            order_index: next_order_index(logged_exercises.len()),
                            updated_at: None,
                        }
                    }
                };
                self.repository
                    .replace_sets(date, logged_exercise, sets)
                    .await
            },
            UpdateError,
            "save",
            "sets"
        )
    }
}

impl<R: WorkoutRepository> HistoryService for Service<R> {
    async fn get_last_record(
        &self,
        exercise_id: &ExerciseID,
        before: WorkoutDate,
    ) -> Result<Option<LastRecord>, ReadError> {
        log_on_error!(
            async {
                let dates = self
                    .repository
                    .read_dates_before(before, self.lookback.limit())
                    .await?;
                for date in dates {
                    let sets = self.repository.read_sets(date, exercise_id).await?;
                    if !sets.is_empty() {
                        return Ok(Some(LastRecord { date, sets }));
                    }
                }
                Ok::<_, ReadError>(None)
            },
            ReadError,
            "get",
            "last record"
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap};

    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{NameError, OrderIndex, Reps, StorageError, TOMBSTONE_NAME, Weight};

    #[derive(Default)]
    struct Day {
        title: String,
        entries: Vec<(LoggedExercise, Vec<SetEntry>)>,
    }

    #[derive(Default)]
    struct MockRepository {
        exercises: RefCell<Vec<Exercise>>,
        days: RefCell<BTreeMap<WorkoutDate, Day>>,
        writes: RefCell<usize>,
        offline: bool,
    }

    impl MockRepository {
        fn check_connection(&self) -> Result<(), StorageError> {
            if self.offline {
                Err(StorageError::NoConnection)
            } else {
                Ok(())
            }
        }

        fn with_exercise(self, id: &str, name: &str) -> Self {
            let created_at = timestamp(u32::try_from(self.exercises.borrow().len()).unwrap());
            self.exercises.borrow_mut().push(Exercise {
                id: id.into(),
                name: Name::new(name).unwrap(),
                created_at,
            });
            self
        }

        fn with_entry(self, date: WorkoutDate, id: &str, order_index: OrderIndex) -> Self {
            self.days.borrow_mut().entry(date).or_default().entries.push((
                LoggedExercise {
                    exercise_id: id.into(),
                    exercise_name: id.to_string(),
                    order_index,
                    updated_at: None,
                },
                vec![],
            ));
            self
        }

        fn with_sets(self, date: WorkoutDate, id: &str, sets: Vec<SetEntry>) -> Self {
            let logged = self.with_entry(date, id, OrderIndex::new(1));
            if let Some(day) = logged.days.borrow_mut().get_mut(&date) {
                if let Some(entry) = day.entries.last_mut() {
                    entry.1 = sets;
                }
            }
            logged
        }
    }

    impl ExerciseRepository for MockRepository {
        async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
            self.check_connection()?;
            Ok(self.exercises.borrow().clone())
        }

        async fn create_exercise(&self, name: Name) -> Result<Exercise, CreateError> {
            self.check_connection()?;
            *self.writes.borrow_mut() += 1;
            let exercise = Exercise {
                id: format!("id-{}", self.exercises.borrow().len()).into(),
                name,
                created_at: timestamp(30),
            };
            self.exercises.borrow_mut().push(exercise.clone());
            Ok(exercise)
        }

        async fn delete_exercise(
            &self,
            id: &ExerciseID,
            tombstone_dates: &[WorkoutDate],
        ) -> Result<ExerciseID, DeleteError> {
            self.check_connection()?;
            *self.writes.borrow_mut() += 1;
            self.exercises.borrow_mut().retain(|e| e.id != *id);
            for date in tombstone_dates {
                if let Some(day) = self.days.borrow_mut().get_mut(date) {
                    for (entry, _) in &mut day.entries {
                        if entry.exercise_id == *id {
                            entry.exercise_name = TOMBSTONE_NAME.to_string();
                        }
                    }
                }
            }
            Ok(id.clone())
        }
    }

    impl WorkoutRepository for MockRepository {
        async fn read_daily_log(&self, date: WorkoutDate) -> Result<Option<DailyLog>, ReadError> {
            self.check_connection()?;
            Ok(self.days.borrow().get(&date).map(|day| DailyLog {
                date,
                title: day.title.clone(),
                updated_at: None,
            }))
        }

        async fn write_title(
            &self,
            date: WorkoutDate,
            title: String,
        ) -> Result<DailyLog, UpdateError> {
            self.check_connection()?;
            *self.writes.borrow_mut() += 1;
            self.days.borrow_mut().entry(date).or_default().title = title.clone();
            Ok(DailyLog {
                date,
                title,
                updated_at: None,
            })
        }

        async fn read_logged_exercises(
            &self,
            date: WorkoutDate,
        ) -> Result<Vec<LoggedExercise>, ReadError> {
            self.check_connection()?;
            Ok(self
                .days
                .borrow()
                .get(&date)
                .map(|day| day.entries.iter().map(|(e, _)| e.clone()).collect())
                .unwrap_or_default())
        }

        async fn write_logged_exercise(
            &self,
            date: WorkoutDate,
            logged_exercise: LoggedExercise,
        ) -> Result<LoggedExercise, UpdateError> {
            self.check_connection()?;
            *self.writes.borrow_mut() += 1;
            let mut days = self.days.borrow_mut();
            let day = days.entry(date).or_default();
            match day
                .entries
                .iter_mut()
                .find(|(e, _)| e.exercise_id == logged_exercise.exercise_id)
            {
                Some((entry, _)) => *entry = logged_exercise.clone(),
                None => day.entries.push((logged_exercise.clone(), vec![])),
            }
            Ok(logged_exercise)
        }

        async fn delete_logged_exercise(
            &self,
            date: WorkoutDate,
            exercise_id: &ExerciseID,
        ) -> Result<ExerciseID, DeleteError> {
            self.check_connection()?;
            *self.writes.borrow_mut() += 1;
            if let Some(day) = self.days.borrow_mut().get_mut(&date) {
                day.entries.retain(|(e, _)| e.exercise_id != *exercise_id);
            }
            Ok(exercise_id.clone())
        }

        async fn read_sets(
            &self,
            date: WorkoutDate,
            exercise_id: &ExerciseID,
        ) -> Result<Vec<SetEntry>, ReadError> {
            self.check_connection()?;
            Ok(self
                .days
                .borrow()
                .get(&date)
                .and_then(|day| {
                    day.entries
                        .iter()
                        .find(|(e, _)| e.exercise_id == *exercise_id)
                        .map(|(_, sets)| sets.clone())
                })
                .unwrap_or_default())
        }

        async fn replace_sets(
            &self,
            date: WorkoutDate,
            logged_exercise: LoggedExercise,
            sets: Vec<SetEntry>,
        ) -> Result<Vec<SetEntry>, UpdateError> {
            self.check_connection()?;
            *self.writes.borrow_mut() += 1;
            let mut days = self.days.borrow_mut();
            let day = days.entry(date).or_default();
            match day
                .entries
                .iter_mut()
                .find(|(e, _)| e.exercise_id == logged_exercise.exercise_id)
            {
                Some(entry) => *entry = (logged_exercise, sets.clone()),
                None => day.entries.push((logged_exercise, sets.clone())),
            }
            Ok(sets)
        }

        async fn read_dates_before(
            &self,
            date: WorkoutDate,
            limit: Option<usize>,
        ) -> Result<Vec<WorkoutDate>, ReadError> {
            self.check_connection()?;
            Ok(self
                .days
                .borrow()
                .keys()
                .rev()
                .filter(|d| **d < date)
                .take(limit.unwrap_or(usize::MAX))
                .copied()
                .collect())
        }

        async fn read_dates_referencing(
            &self,
            exercise_id: &ExerciseID,
        ) -> Result<Vec<WorkoutDate>, ReadError> {
            self.check_connection()?;
            Ok(self
                .days
                .borrow()
                .iter()
                .filter(|(_, day)| day.entries.iter().any(|(e, _)| e.exercise_id == *exercise_id))
                .map(|(date, _)| *date)
                .collect())
        }
    }

    fn timestamp(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap()
    }

    fn date(day: u32) -> WorkoutDate {
        WorkoutDate::from_ymd(2024, 1, day).unwrap()
    }

    fn set(weight: f32, reps: u32) -> SetEntry {
        SetEntry {
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps).unwrap(),
            timestamp: timestamp(0),
        }
    }

    #[tokio::test]
    async fn test_get_exercises_newest_first() {
        let service = Service::new(
            MockRepository::default()
                .with_exercise("a", "Squat")
                .with_exercise("b", "Bench Press"),
        );

        let exercises = service.get_exercises().await.unwrap();

        assert_eq!(
            exercises.iter().map(|e| e.id.to_string()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
    }

    #[tokio::test]
    async fn test_get_exercises_no_connection() {
        let service = Service::new(MockRepository {
            offline: true,
            ..MockRepository::default()
        });

        assert!(matches!(
            service.get_exercises().await,
            Err(ReadError::Storage(StorageError::NoConnection))
        ));
    }

    #[tokio::test]
    async fn test_create_exercise() {
        let service = Service::new(MockRepository::default().with_exercise("a", "Squat"));

        let exercise = service.create_exercise("  Bench Press ").await.unwrap();

        assert_eq!(exercise.name, Name::new("Bench Press").unwrap());
        assert_eq!(service.get_exercises().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_exercise_duplicate_name() {
        let service = Service::new(MockRepository::default().with_exercise("a", "Bench Press"));

        for name in ["bench press", "  BENCH PRESS", "Bench Press "] {
            assert!(matches!(
                service.create_exercise(name).await,
                Err(CreateError::DuplicateName(existing)) if existing.to_string() == "Bench Press"
            ));
        }
        assert_eq!(*service.repository().writes.borrow(), 0);
        assert_eq!(service.get_exercises().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_exercise_empty_name() {
        let service = Service::new(MockRepository::default());

        assert!(matches!(
            service.create_exercise("   ").await,
            Err(CreateError::Validation(ValidationError::Name(NameError::Empty)))
        ));
        assert_eq!(*service.repository().writes.borrow(), 0);
    }

    #[tokio::test]
    async fn test_delete_exercise_without_dependencies() {
        let service = Service::new(MockRepository::default().with_exercise("a", "Squat"));

        assert_eq!(
            service.delete_exercise(&"a".into(), false).await.unwrap(),
            ExerciseID::from("a")
        );
        assert!(service.get_exercises().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_exercise_with_dependencies() {
        let service = Service::new(
            MockRepository::default()
                .with_exercise("a", "Squat")
                .with_entry(date(1), "a", OrderIndex::new(1))
                .with_entry(date(3), "a", OrderIndex::new(1)),
        );

        assert_eq!(
            service.check_exercise_dependencies(&"a".into()).await.unwrap(),
            2
        );
        assert!(matches!(
            service.delete_exercise(&"a".into(), false).await,
            Err(DeleteError::Dependencies(2))
        ));
        assert_eq!(service.get_exercises().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_exercise_cascade() {
        let service = Service::new(
            MockRepository::default()
                .with_exercise("a", "Squat")
                .with_entry(date(1), "a", OrderIndex::new(1))
                .with_entry(date(1), "b", OrderIndex::new(2)),
        );

        service.delete_exercise(&"a".into(), true).await.unwrap();

        assert!(service.get_exercises().await.unwrap().is_empty());
        assert_eq!(
            service
                .get_logged_exercises(date(1))
                .await
                .unwrap()
                .iter()
                .map(|e| e.exercise_name.as_str())
                .collect::<Vec<_>>(),
            vec![TOMBSTONE_NAME, "b"]
        );
    }

    #[tokio::test]
    async fn test_get_title() {
        let service = Service::new(MockRepository::default());

        assert_eq!(service.get_title(date(1)).await.unwrap(), "");
        service
            .set_title(date(1), "Push Day".to_string())
            .await
            .unwrap();
        assert_eq!(service.get_title(date(1)).await.unwrap(), "Push Day");
    }

    #[tokio::test]
    async fn test_get_logged_exercises_sorted() {
        let service = Service::new(
            MockRepository::default()
                .with_entry(date(1), "legacy", OrderIndex::UNSET)
                .with_entry(date(1), "second", OrderIndex::new(2))
                .with_entry(date(1), "first", OrderIndex::new(1)),
        );

        assert_eq!(
            service
                .get_logged_exercises(date(1))
                .await
                .unwrap()
                .iter()
                .map(|e| e.exercise_id.to_string())
                .collect::<Vec<_>>(),
            vec!["first", "second", "legacy"]
        );
    }

    #[tokio::test]
    async fn test_add_exercise_to_log() {
        let service = Service::new(MockRepository::default());

        let squat = service
            .add_exercise_to_log(date(1), &"a".into(), "Squat")
            .await
            .unwrap();
        let bench = service
            .add_exercise_to_log(date(1), &"b".into(), "Bench Press")
            .await
            .unwrap();
        let squat_again = service
            .add_exercise_to_log(date(1), &"a".into(), "Back Squat")
            .await
            .unwrap();

        assert_eq!(squat.order_index, OrderIndex::new(1));
        assert_eq!(bench.order_index, OrderIndex::new(2));
        assert_eq!(squat_again.order_index, OrderIndex::new(1));
        assert_eq!(service.get_logged_exercises(date(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_exercise_from_log_only_affects_date() {
        let service = Service::new(
            MockRepository::default()
                .with_exercise("a", "Squat")
                .with_sets(date(1), "a", vec![set(60.0, 5)])
                .with_sets(date(2), "a", vec![set(62.5, 5)]),
        );

        service
            .remove_exercise_from_log(date(1), &"a".into())
            .await
            .unwrap();

        assert!(service.get_logged_exercises(date(1)).await.unwrap().is_empty());
        assert!(service.get_sets(date(1), &"a".into()).await.unwrap().is_empty());
        assert_eq!(
            service.get_sets(date(2), &"a".into()).await.unwrap(),
            vec![set(62.5, 5)]
        );
        assert!(
            service
                .get_exercises()
                .await
                .unwrap()
                .iter()
                .any(|e| e.id == ExerciseID::from("a"))
        );
    }

    #[tokio::test]
    async fn test_save_sets() {
        let service = Service::new(MockRepository::default().with_exercise("a", "Squat"));

        let sets = vec![set(60.0, 5), set(62.5, 5)];
        assert_eq!(
            service
                .save_sets(date(1), &"a".into(), sets.clone())
                .await
                .unwrap(),
            sets
        );
        assert_eq!(service.get_sets(date(1), &"a".into()).await.unwrap(), sets);

        let logged_exercises = service.get_logged_exercises(date(1)).await.unwrap();
        assert_eq!(logged_exercises.len(), 1);
        assert_eq!(logged_exercises[0].exercise_name, "Squat");
        assert_eq!(logged_exercises[0].order_index, OrderIndex::new(1));
    }

    #[tokio::test]
    async fn test_save_sets_keeps_logged_exercise() {
        let service = Service::new(
            MockRepository::default().with_entry(date(1), "a", OrderIndex::new(4)),
        );

        service
            .save_sets(date(1), &"a".into(), vec![set(20.0, 10)])
            .await
            .unwrap();

        assert_eq!(
            service.get_logged_exercises(date(1)).await.unwrap()[0].order_index,
            OrderIndex::new(4)
        );
    }

    #[tokio::test]
    async fn test_save_sets_empty() {
        let service = Service::new(MockRepository::default().with_exercise("a", "Squat"));

        assert!(matches!(
            service.save_sets(date(1), &"a".into(), vec![]).await,
            Err(UpdateError::Validation(ValidationError::NoSets))
        ));
        assert_eq!(*service.repository().writes.borrow(), 0);
    }

    #[tokio::test]
    async fn test_save_sets_unknown_exercise() {
        let service = Service::new(MockRepository::default());

        assert!(matches!(
            service
                .save_sets(date(1), &"unknown".into(), vec![set(20.0, 10)])
                .await,
            Err(UpdateError::NotFound)
        ));
        assert_eq!(*service.repository().writes.borrow(), 0);
    }

    #[tokio::test]
    async fn test_get_last_record() {
        let service = Service::new(
            MockRepository::default()
                .with_sets(date(1), "bench", vec![set(60.0, 5), set(60.0, 5)])
                .with_sets(date(3), "bench", vec![set(62.5, 5)])
                .with_sets(date(5), "squat", vec![set(100.0, 3)])
                .with_entry(date(7), "bench", OrderIndex::new(1)),
        );

        assert_eq!(
            service
                .get_last_record(&"bench".into(), date(10))
                .await
                .unwrap(),
            Some(LastRecord {
                date: date(3),
                sets: vec![set(62.5, 5)]
            })
        );
        assert_eq!(
            service
                .get_last_record(&"bench".into(), date(3))
                .await
                .unwrap(),
            Some(LastRecord {
                date: date(1),
                sets: vec![set(60.0, 5), set(60.0, 5)]
            })
        );
        assert_eq!(
            service
                .get_last_record(&"bench".into(), date(1))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            service
                .get_last_record(&"deadlift".into(), date(10))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_get_last_record_lookback() {
        let mut repository =
            MockRepository::default().with_sets(date(1), "bench", vec![set(60.0, 5)]);
        for day in 2..=4 {
            repository = repository.with_sets(date(day), "squat", vec![set(100.0, 5)]);
        }
        let bounded = Service::new(repository).with_lookback(Lookback::from_dates(3));

        assert_eq!(
            bounded
                .get_last_record(&"bench".into(), date(5))
                .await
                .unwrap(),
            None
        );

        let exhaustive = bounded.with_lookback(Lookback::Exhaustive);

        assert_eq!(
            exhaustive
                .get_last_record(&"bench".into(), date(5))
                .await
                .unwrap()
                .map(|record| record.date),
            Some(date(1))
        );
    }
}
