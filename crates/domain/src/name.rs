use derive_more::{AsRef, Display};

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let name = Self::from_stored(name)?;
        let len = name.0.chars().count();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(name)
    }

    /// Accepts any non-empty name. The length limit only applies to new input.
    pub fn from_stored(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        Ok(Name(trimmed_name.to_string()))
    }

    /// Compares names the way the exercise catalog detects duplicates.
    #[must_use]
    pub fn matches(&self, other: &Name) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}
