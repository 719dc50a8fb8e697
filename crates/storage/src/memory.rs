//! In-memory document store
//!
//! Keeps all documents in a single map keyed by path. Useful for tests and as a scratch backend
//! without persistence. Connection loss and failing commits can be simulated.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

use fittrack_domain as domain;
use uuid::Uuid;

use crate::document::{Document, DocumentStore, Fields, Query, StoreError, Write, document_id};

pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

pub struct MemoryStore {
    documents: RefCell<BTreeMap<String, Fields>>,
    max_batch_size: usize,
    offline: Cell<bool>,
    remaining_commits: Cell<Option<usize>>,
    accounts: BTreeMap<String, (String, domain::User)>,
    session: RefCell<Option<domain::User>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: RefCell::new(BTreeMap::new()),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            offline: Cell::new(false),
            remaining_commits: Cell::new(None),
            accounts: BTreeMap::new(),
            session: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        let user = domain::User {
            id: Uuid::new_v4().simple().to_string().into(),
            email: email.to_string(),
        };
        self.accounts
            .insert(email.to_lowercase(), (password.to_string(), user));
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Lets the given number of commits succeed and fails all later ones.
    pub fn fail_commits_after(&self, commits: usize) {
        self.remaining_commits.set(Some(commits));
    }

    pub fn insert(&self, path: &str, fields: Fields) {
        self.documents.borrow_mut().insert(path.to_string(), fields);
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.documents.borrow().keys().cloned().collect()
    }

    fn check_connection(&self) -> Result<(), StoreError> {
        if self.offline.get() {
            Err(StoreError::NoConnection)
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        self.check_connection()?;
        Ok(self.documents.borrow().get(path).map(|fields| Document {
            id: document_id(path).to_string(),
            fields: fields.clone(),
        }))
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.check_connection()?;
        let prefix = format!("{collection}/");
        let documents = self
            .documents
            .borrow()
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .map(|(path, fields)| Document {
                id: path[prefix.len()..].to_string(),
                fields: fields.clone(),
            })
            .collect();
        Ok(query.apply(documents))
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        self.check_connection()?;
        if writes.len() > self.max_batch_size {
            return Err(StoreError::Other(
                format!("too many writes ({} > {})", writes.len(), self.max_batch_size).into(),
            ));
        }
        if let Some(remaining) = self.remaining_commits.get() {
            if remaining == 0 {
                return Err(StoreError::NoConnection);
            }
            self.remaining_commits.set(Some(remaining - 1));
        }
        let mut documents = self.documents.borrow_mut();
        for write in writes {
            match write {
                Write::Set {
                    path,
                    fields,
                    merge: true,
                } => documents.entry(path).or_default().extend(fields),
                Write::Set {
                    path,
                    fields,
                    merge: false,
                } => {
                    documents.insert(path, fields);
                }
                Write::Delete { path } => {
                    documents.remove(&path);
                }
            }
        }
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.check_connection()?;
        let id = Uuid::new_v4().simple().to_string();
        self.documents
            .borrow_mut()
            .insert(format!("{collection}/{id}"), fields);
        Ok(id)
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

impl domain::SessionRepository for MemoryStore {
    async fn request_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<domain::User, domain::ReadError> {
        self.check_connection()?;
        match self.accounts.get(&email.trim().to_lowercase()) {
            Some((expected, user)) if expected == password => {
                *self.session.borrow_mut() = Some(user.clone());
                Ok(user.clone())
            }
            _ => Err(StoreError::NoSession.into()),
        }
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        self.session
            .borrow()
            .clone()
            .ok_or(domain::ReadError::Storage(domain::StorageError::NoSession))
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        *self.session.borrow_mut() = None;
        Ok(())
    }
}
