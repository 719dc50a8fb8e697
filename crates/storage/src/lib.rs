#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod document;
pub mod firestore;
pub mod indexed_db;
mod layout;
pub mod local_storage;
pub mod memory;
pub mod repository;

pub use document::{Document, DocumentStore, Fields, Query, StoreError, Value, Write};
pub use repository::DocumentRepository;
