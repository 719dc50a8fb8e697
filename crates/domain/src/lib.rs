#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod history;
mod name;
mod service;
mod session;
mod workout;

pub use error::{CreateError, DeleteError, ReadError, StorageError, UpdateError, ValidationError};
pub use exercise::{
    Exercise, ExerciseID, ExerciseRepository, ExerciseService, TOMBSTONE_NAME, find_duplicate,
    sort_newest_first,
};
pub use history::{HistoryService, LastRecord, Lookback};
pub use name::{Name, NameError};
pub use service::Service;
pub use session::{SessionRepository, SessionService, User, UserID};
pub use workout::{
    DailyLog, LoggedExercise, OrderIndex, Reps, RepsError, SetEntry, Weight, WeightError,
    WorkoutDate, WorkoutDateError, WorkoutRepository, WorkoutService, next_order_index,
    sort_logged_exercises,
};
