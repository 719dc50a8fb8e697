use std::num::NonZeroUsize;

use crate::{ExerciseID, ReadError, SetEntry, WorkoutDate};

#[allow(async_fn_in_trait)]
pub trait HistoryService {
    /// Finds the most recent date before `before` on which the exercise has sets.
    async fn get_last_record(
        &self,
        exercise_id: &ExerciseID,
        before: WorkoutDate,
    ) -> Result<Option<LastRecord>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastRecord {
    pub date: WorkoutDate,
    pub sets: Vec<SetEntry>,
}

/// Number of candidate dates inspected by a last record query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Bounded(NonZeroUsize),
    Exhaustive,
}

impl Lookback {
    pub const DEFAULT_DATES: usize = 50;

    /// Zero means no bound.
    #[must_use]
    pub fn from_dates(dates: usize) -> Self {
        NonZeroUsize::new(dates).map_or(Lookback::Exhaustive, Lookback::Bounded)
    }

    #[must_use]
    pub fn limit(self) -> Option<usize> {
        match self {
            Lookback::Bounded(n) => Some(n.get()),
            Lookback::Exhaustive => None,
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::from_dates(Self::DEFAULT_DATES)
    }
}
