use crate::{Name, NameError, RepsError, WeightError, WorkoutDateError};

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("exercise \"{0}\" already exists")]
    DuplicateName(Name),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for CreateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::Storage(storage) => CreateError::Storage(storage),
            ReadError::Other(other) => CreateError::Other(other),
        }
    }
}

impl From<NameError> for CreateError {
    fn from(value: NameError) -> Self {
        CreateError::Validation(ValidationError::Name(value))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for UpdateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::Storage(storage) => UpdateError::Storage(storage),
            ReadError::Other(other) => UpdateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("exercise is still logged on {0} date(s)")]
    Dependencies(usize),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for DeleteError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::Storage(storage) => DeleteError::Storage(storage),
            ReadError::Other(other) => DeleteError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error("write interrupted after {completed} of {total} batches")]
    PartialWrite { completed: usize, total: usize },
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Weight(#[from] WeightError),
    #[error(transparent)]
    Reps(#[from] RepsError),
    #[error(transparent)]
    Date(#[from] WorkoutDateError),
    #[error("At least one set is required")]
    NoSets,
    #[error("Set {0} does not exist")]
    NoSuchSet(usize),
}
