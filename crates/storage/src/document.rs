//! Document model
//!
//! Data is organized as documents addressed by slash-separated paths, alternating collection
//! and document identifiers (`workouts/2024-01-05/exercises/abc`). Field values use the JSON
//! encoding of the Firestore REST API, which the local backends reuse unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Fields = BTreeMap<String, Value>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null,
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "integerValue", with = "integer")]
    Integer(i64),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "timestampValue")]
    Timestamp(DateTime<Utc>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

/// Integers are transported as decimal strings.
mod integer {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        String(String),
        Number(i64),
    }

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::String(s) => s.parse().map_err(D::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn string(&self, key: &str) -> Result<&str, StoreError> {
        match self.fields.get(key) {
            Some(Value::String(s)) => Ok(s),
            _ => Err(self.invalid(key)),
        }
    }

    #[must_use]
    pub fn optional_string(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Result<i64, StoreError> {
        self.optional_integer(key).ok_or_else(|| self.invalid(key))
    }

    #[must_use]
    pub fn optional_integer(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Accepts both integer and double values.
    #[allow(clippy::cast_precision_loss)]
    pub fn number(&self, key: &str) -> Result<f64, StoreError> {
        match self.fields.get(key) {
            Some(Value::Double(d)) => Ok(*d),
            Some(Value::Integer(i)) => Ok(*i as f64),
            _ => Err(self.invalid(key)),
        }
    }

    pub fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        self.optional_timestamp(key).ok_or_else(|| self.invalid(key))
    }

    #[must_use]
    pub fn optional_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(key) {
            Some(Value::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }

    fn invalid(&self, key: &str) -> StoreError {
        StoreError::InvalidDocument(format!("{}: missing or mistyped field {key}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Replaces the document, or with `merge` only the given fields.
    Set {
        path: String,
        fields: Fields,
        merge: bool,
    },
    Delete {
        path: String,
    },
}

impl Write {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Write::Set { path, .. } | Write::Delete { path } => path,
        }
    }
}

/// Selection of documents within a collection, ordered by document id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    /// Only documents whose id is strictly less than this.
    pub before: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Query {
    /// Applies the query to documents already sorted by ascending id.
    #[must_use]
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut documents = documents
            .into_iter()
            .filter(|d| self.before.as_ref().is_none_or(|before| d.id < *before))
            .collect::<Vec<_>>();
        if self.descending {
            documents.reverse();
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;
    /// Lists the documents directly contained in a collection.
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;
    /// Applies all writes atomically.
    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError>;
    /// Creates a document with a store-assigned id and returns the id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;
    /// Maximum number of writes accepted by a single commit.
    fn max_batch_size(&self) -> usize;
}

#[must_use]
pub fn document_id(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Splits a collection path into its parent document path and the collection id.
#[must_use]
pub fn split_collection(collection: &str) -> (&str, &str) {
    match collection.rsplit_once('/') {
        Some((parent, id)) => (parent, id),
        None => ("", collection),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error("write interrupted after {completed} of {total} batches")]
    PartialWrite { completed: usize, total: usize },
    #[error("invalid document {0}")]
    InvalidDocument(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<StoreError> for fittrack_domain::StorageError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NoConnection => Self::NoConnection,
            StoreError::NoSession => Self::NoSession,
            StoreError::PartialWrite { completed, total } => {
                Self::PartialWrite { completed, total }
            }
            StoreError::InvalidDocument(_) => Self::Other(Box::new(value)),
            StoreError::Other(err) => Self::Other(err),
        }
    }
}

macro_rules! impl_from_store_error {
    ($($error: ident),*) => {
        $(
            impl From<StoreError> for fittrack_domain::$error {
                fn from(value: StoreError) -> Self {
                    Self::Storage(value.into())
                }
            }
        )*
    };
}

impl_from_store_error!(ReadError, CreateError, UpdateError, DeleteError);
