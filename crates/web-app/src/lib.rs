#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog;
pub mod log;
pub mod notification;
pub mod service;
pub mod session;
pub mod settings;
pub mod workout_logger;

pub use catalog::{Catalog, DeleteOutcome};
pub use notification::{Notification, Notifications};
pub use service::Service;
pub use session::SessionState;
pub use settings::{Settings, SettingsRepository, SettingsService};
pub use workout_logger::{Editor, SetField, Ticket, View, WorkoutLogger};

/// Data that is fetched from the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Resource<T> {
    #[default]
    Loading,
    Ready(T),
    /// The store could not be reached.
    Unavailable,
}

impl<T> Resource<T> {
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Resource::Ready(value) => Some(value),
            Resource::Loading | Resource::Unavailable => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Resource::Ready(value) => Some(value),
            Resource::Loading | Resource::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }
}
