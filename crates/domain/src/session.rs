use derive_more::{AsRef, Display};

use crate::{DeleteError, ReadError};

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn request_session(&self, email: &str, password: &str) -> Result<User, ReadError>;
    async fn get_session(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    /// Signs in with the given credentials and persists the session.
    ///
    /// Rejected credentials are reported as [`crate::StorageError::NoSession`].
    async fn request_session(&self, email: &str, password: &str) -> Result<User, ReadError>;
    /// Restores a previously persisted session.
    async fn initialize_session(&self) -> Result<User, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub email: String,
}

#[derive(AsRef, Debug, Display, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(String);

impl UserID {
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}
