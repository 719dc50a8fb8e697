//! Per-date workout logger
//!
//! The logger is either showing the summary of a date or editing the sets of one exercise. Each
//! selection gets a new generation, and responses are applied only if they carry the generation of
//! the current selection. A slow response for a date or exercise the user has already left is
//! dropped instead of overwriting newer state.

use chrono::{DateTime, Utc};
use fittrack_domain::{
    Exercise, ExerciseID, HistoryService, LastRecord, LoggedExercise, ReadError, Reps, SetEntry,
    UpdateError, ValidationError, Weight, WorkoutDate, WorkoutService,
};
use log::debug;

use crate::{Notification, Notifications, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Weight,
    Reps,
}

/// Selection a request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub date: WorkoutDate,
    pub exercise_id: Option<ExerciseID>,
    date_generation: u64,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub draft: Resource<Vec<SetEntry>>,
    pub last_record: Resource<Option<LastRecord>>,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Summary,
    EditingExercise(Editor),
}

#[derive(Debug)]
pub struct WorkoutLogger {
    date: WorkoutDate,
    title: Resource<String>,
    logged_exercises: Resource<Vec<LoggedExercise>>,
    view: View,
    date_generation: u64,
    generation: u64,
}

impl WorkoutLogger {
    #[must_use]
    pub fn new(date: WorkoutDate) -> Self {
        Self {
            date,
            title: Resource::Loading,
            logged_exercises: Resource::Loading,
            view: View::Summary,
            date_generation: 0,
            generation: 0,
        }
    }

    #[must_use]
    pub fn date(&self) -> WorkoutDate {
        self.date
    }

    #[must_use]
    pub fn title(&self) -> &Resource<String> {
        &self.title
    }

    #[must_use]
    pub fn logged_exercises(&self) -> &Resource<Vec<LoggedExercise>> {
        &self.logged_exercises
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub fn editor(&self) -> Option<&Editor> {
        match &self.view {
            View::EditingExercise(editor) => Some(editor),
            View::Summary => None,
        }
    }

    fn editor_mut(&mut self) -> Option<&mut Editor> {
        match &mut self.view {
            View::EditingExercise(editor) => Some(editor),
            View::Summary => None,
        }
    }

    #[must_use]
    pub fn ticket(&self) -> Ticket {
        Ticket {
            date: self.date,
            exercise_id: self.editor().map(|e| e.exercise_id.clone()),
            date_generation: self.date_generation,
            generation: self.generation,
        }
    }

    fn accepts(&self, ticket: &Ticket, response: &str) -> bool {
        accept(*ticket == self.ticket(), ticket, response)
    }

    /// Summaries only depend on the selected date.
    fn accepts_summary(&self, ticket: &Ticket) -> bool {
        accept(ticket.date_generation == self.date_generation, ticket, "summary")
    }

    /// Switches to the summary of `date`, discarding any draft.
    pub fn select_date(&mut self, date: WorkoutDate) -> Ticket {
        self.date = date;
        self.title = Resource::Loading;
        self.logged_exercises = Resource::Loading;
        self.view = View::Summary;
        self.date_generation += 1;
        self.generation += 1;
        self.ticket()
    }

    pub fn apply_summary(
        &mut self,
        ticket: &Ticket,
        title: Result<String, ReadError>,
        logged_exercises: Result<Vec<LoggedExercise>, ReadError>,
        notifications: &mut Notifications,
    ) -> bool {
        if !self.accepts_summary(ticket) {
            return false;
        }
        self.title = match title {
            Ok(title) => Resource::Ready(title),
            Err(err) => {
                notifications.push(Notification::failure("load workout", &err));
                Resource::Unavailable
            }
        };
        self.logged_exercises = match logged_exercises {
            Ok(logged_exercises) => Resource::Ready(logged_exercises),
            Err(err) => {
                notifications.push(Notification::failure("load workout", &err));
                Resource::Unavailable
            }
        };
        true
    }

    /// Starts editing an exercise of the current date with a draft that is still to be loaded.
    pub fn select_exercise(&mut self, exercise_id: ExerciseID, exercise_name: String) -> Ticket {
        self.view = View::EditingExercise(Editor {
            exercise_id,
            exercise_name,
            draft: Resource::Loading,
            last_record: Resource::Loading,
            saving: false,
        });
        self.generation += 1;
        self.ticket()
    }

    /// Returns to the summary, discarding unsaved edits.
    pub fn cancel(&mut self) {
        self.view = View::Summary;
        self.generation += 1;
    }

    /// Fills the draft with the stored sets, or with a single empty set if there are none.
    pub fn apply_sets(
        &mut self,
        ticket: &Ticket,
        sets: Result<Vec<SetEntry>, ReadError>,
        now: DateTime<Utc>,
        notifications: &mut Notifications,
    ) -> bool {
        if !self.accepts(ticket, "sets") {
            return false;
        }
        let sets = match sets {
            Ok(sets) if !sets.is_empty() => sets,
            Ok(_) => vec![SetEntry::empty(now)],
            Err(err) => {
                notifications.push(Notification::failure("load sets", &err));
                vec![SetEntry::empty(now)]
            }
        };
        if let Some(editor) = self.editor_mut() {
            editor.draft = Resource::Ready(sets);
        }
        true
    }

    pub fn apply_last_record(
        &mut self,
        ticket: &Ticket,
        last_record: Result<Option<LastRecord>, ReadError>,
        notifications: &mut Notifications,
    ) -> bool {
        if !self.accepts(ticket, "last record") {
            return false;
        }
        let last_record = match last_record {
            Ok(last_record) => Resource::Ready(last_record),
            Err(err) => {
                notifications.push(Notification::failure("load last record", &err));
                Resource::Unavailable
            }
        };
        if let Some(editor) = self.editor_mut() {
            editor.last_record = last_record;
        }
        true
    }

    fn draft_mut(&mut self) -> Option<&mut Vec<SetEntry>> {
        self.editor_mut()?.draft.ready_mut()
    }

    pub fn add_set(&mut self, now: DateTime<Utc>) {
        if let Some(draft) = self.draft_mut() {
            draft.push(SetEntry::empty(now));
        }
    }

    pub fn remove_set(&mut self, index: usize) -> Result<(), ValidationError> {
        match self.draft_mut() {
            Some(draft) if index < draft.len() => {
                draft.remove(index);
                Ok(())
            }
            _ => Err(ValidationError::NoSuchSet(index)),
        }
    }

    /// Updates a set from user input. Empty input counts as zero.
    pub fn update_set_field(
        &mut self,
        index: usize,
        field: SetField,
        value: &str,
    ) -> Result<(), ValidationError> {
        let set = self
            .draft_mut()
            .and_then(|draft| draft.get_mut(index))
            .ok_or(ValidationError::NoSuchSet(index))?;
        match field {
            SetField::Weight => set.weight = Weight::try_from(value)?,
            SetField::Reps => set.reps = Reps::try_from(value)?,
        }
        Ok(())
    }

    /// Marks the editor as saving and returns the sets to be written, all stamped with `now`.
    pub fn begin_save(
        &mut self,
        now: DateTime<Utc>,
    ) -> Option<(Ticket, ExerciseID, Vec<SetEntry>)> {
        let ticket = self.ticket();
        let editor = self.editor_mut()?;
        if editor.saving {
            return None;
        }
        let sets = editor
            .draft
            .ready()?
            .iter()
            .map(|set| SetEntry {
                timestamp: now,
                ..*set
            })
            .collect();
        editor.saving = true;
        Some((ticket, editor.exercise_id.clone(), sets))
    }

    /// Returns to the summary on success. On failure the draft is kept for another attempt.
    pub fn apply_save(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<SetEntry>, UpdateError>,
        notifications: &mut Notifications,
    ) -> bool {
        let saved = match result {
            Ok(_) => {
                notifications.push(Notification::success("Workout saved!"));
                true
            }
            Err(err) => {
                notifications.push(Notification::failure("save workout", &err));
                false
            }
        };
        if !self.accepts(ticket, "save result") {
            return false;
        }
        if saved {
            self.cancel();
        } else if let Some(editor) = self.editor_mut() {
            editor.saving = false;
        }
        saved
    }

    pub async fn open_date<S: WorkoutService>(
        &mut self,
        service: &S,
        date: WorkoutDate,
        notifications: &mut Notifications,
    ) {
        self.select_date(date);
        self.refresh_summary(service, notifications).await;
    }

    pub async fn refresh_summary<S: WorkoutService>(
        &mut self,
        service: &S,
        notifications: &mut Notifications,
    ) {
        let ticket = self.ticket();
        let title = service.get_title(ticket.date).await;
        let logged_exercises = service.get_logged_exercises(ticket.date).await;
        self.apply_summary(&ticket, title, logged_exercises, notifications);
    }

    pub async fn open_exercise<S: WorkoutService + HistoryService>(
        &mut self,
        service: &S,
        exercise_id: &ExerciseID,
        exercise_name: &str,
        now: DateTime<Utc>,
        notifications: &mut Notifications,
    ) {
        let ticket = self.select_exercise(exercise_id.clone(), exercise_name.to_string());
        let sets = service.get_sets(ticket.date, exercise_id).await;
        self.apply_sets(&ticket, sets, now, notifications);
        let last_record = service.get_last_record(exercise_id, ticket.date).await;
        self.apply_last_record(&ticket, last_record, notifications);
    }

    pub async fn save<S: WorkoutService>(
        &mut self,
        service: &S,
        now: DateTime<Utc>,
        notifications: &mut Notifications,
    ) -> bool {
        let Some((ticket, exercise_id, sets)) = self.begin_save(now) else {
            return false;
        };
        let result = service.save_sets(ticket.date, &exercise_id, sets).await;
        let saved = self.apply_save(&ticket, result, notifications);
        if saved {
            self.refresh_summary(service, notifications).await;
        }
        saved
    }

    pub async fn set_title<S: WorkoutService>(
        &mut self,
        service: &S,
        title: String,
        notifications: &mut Notifications,
    ) {
        let ticket = self.ticket();
        match service.set_title(ticket.date, title).await {
            Ok(daily_log) if ticket.date_generation == self.date_generation => {
                self.title = Resource::Ready(daily_log.title);
            }
            Ok(_) => {}
            Err(err) => notifications.push(Notification::failure("save title", &err)),
        }
    }

    pub async fn add_exercise<S: WorkoutService>(
        &mut self,
        service: &S,
        exercise: &Exercise,
        notifications: &mut Notifications,
    ) {
        let date = self.date;
        match service
            .add_exercise_to_log(date, &exercise.id, &exercise.name.to_string())
            .await
        {
            Ok(_) if date == self.date && self.editor().is_none() => {
                self.refresh_summary(service, notifications).await;
            }
            Ok(_) => {}
            Err(err) => notifications.push(Notification::failure("add exercise to workout", &err)),
        }
    }

    pub async fn remove_exercise<S: WorkoutService>(
        &mut self,
        service: &S,
        exercise_id: &ExerciseID,
        notifications: &mut Notifications,
    ) {
        let date = self.date;
        match service.remove_exercise_from_log(date, exercise_id).await {
            Ok(removed_id) => {
                if date == self.date {
                    if let Resource::Ready(logged_exercises) = &mut self.logged_exercises {
                        logged_exercises.retain(|e| e.exercise_id != removed_id);
                    }
                }
            }
            Err(err) => notifications.push(Notification::failure("remove exercise", &err)),
        }
    }
}

fn accept(current: bool, ticket: &Ticket, response: &str) -> bool {
    if !current {
        debug!(
            "dropping stale {response} for {} ({:?})",
            ticket.date, ticket.exercise_id
        );
    }
    current
}
