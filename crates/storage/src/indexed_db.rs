#![allow(clippy::missing_errors_doc)]

use fittrack_domain as domain;
use indexed_db_futures::{
    KeyPath, database::Database, error::OpenDbError, prelude::*, transaction::TransactionMode,
};
use log::debug;
use strum::AsRefStr;
use uuid::Uuid;

use crate::document::{Document, DocumentStore, Fields, Query, StoreError, Write, document_id};

const SESSION_KEY: &str = "session";

/// Browser-local document store.
///
/// Also keeps the authentication session of the remote backend. Without a remote backend, the
/// session is a local profile and credentials are not verified.
#[derive(Clone)]
pub struct IndexedDB;

impl IndexedDB {
    async fn open(&self) -> Result<Database, OpenDbError> {
        Database::open("fittrack")
            .with_version(1u8)
            .with_on_blocked(|event| {
                debug!("upgrade of database blocked: {event:?}");
                Ok(())
            })
            .with_on_upgrade_needed(|event, db| {
                #[allow(clippy::single_match)]
                match (event.old_version(), event.new_version()) {
                    (0.0, Some(1.0)) => {
                        db.create_object_store(Store::App).build()?;
                        db.create_object_store(Store::Documents)
                            .with_key_path(KeyPath::One("path"))
                            .build()?;
                    }
                    _ => {}
                }
                Ok(())
            })
            .await
    }

    pub async fn read_session(&self) -> Result<Option<Session>, Box<dyn std::error::Error>> {
        let db = self.open().await?;
        let transaction = db
            .transaction(Store::App.as_ref())
            .with_mode(TransactionMode::Readonly)
            .build()?;
        let store = transaction.object_store(Store::App.as_ref())?;
        Ok(store.get(SESSION_KEY).serde()?.await?)
    }

    pub async fn write_session(
        &self,
        session: &Session,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let db = self.open().await?;
        let transaction = db
            .transaction(Store::App.as_ref())
            .with_mode(TransactionMode::Readwrite)
            .build()?;
        let store = transaction.object_store(Store::App.as_ref())?;
        store
            .put(session.clone())
            .with_key(SESSION_KEY.to_string())
            .serde()?
            .await?;
        transaction.commit().await?;
        Ok(())
    }

    pub async fn clear_app_data(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.clear(Store::App).await
    }

    pub async fn clear_documents(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.clear(Store::Documents).await
    }

    async fn clear(&self, object_store: Store) -> Result<(), Box<dyn std::error::Error>> {
        let db = self.open().await?;
        let transaction = db
            .transaction(object_store.as_ref())
            .with_mode(TransactionMode::Readwrite)
            .build()?;
        let store = transaction.object_store(object_store.as_ref())?;
        store.clear()?.await?;
        transaction.commit().await?;
        Ok(())
    }

    async fn read_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<Document>, Box<dyn std::error::Error>> {
        let db = self.open().await?;
        let transaction = db
            .transaction(Store::Documents.as_ref())
            .with_mode(TransactionMode::Readonly)
            .build()?;
        let store = transaction.object_store(Store::Documents.as_ref())?;
        let prefix = format!("{collection}/");
        let mut documents = vec![];
        for record in store.get_all().serde()?.await? {
            let record: DocumentRecord = record?;
            if let Some(id) = record.path.strip_prefix(&prefix) {
                if !id.contains('/') {
                    documents.push(Document {
                        id: id.to_string(),
                        fields: record.fields,
                    });
                }
            }
        }
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    async fn apply(&self, writes: Vec<Write>) -> Result<(), Box<dyn std::error::Error>> {
        let db = self.open().await?;
        let transaction = db
            .transaction(Store::Documents.as_ref())
            .with_mode(TransactionMode::Readwrite)
            .build()?;
        let store = transaction.object_store(Store::Documents.as_ref())?;
        for write in writes {
            match write {
                Write::Set {
                    path,
                    mut fields,
                    merge,
                } => {
                    if merge {
                        let existing: Option<DocumentRecord> =
                            store.get(path.as_str()).serde()?.await?;
                        if let Some(existing) = existing {
                            let mut merged = existing.fields;
                            merged.append(&mut fields);
                            fields = merged;
                        }
                    }
                    store.put(DocumentRecord { path, fields }).serde()?.await?;
                }
                Write::Delete { path } => {
                    store.delete(path.as_str()).serde()?.await?;
                }
            }
        }
        transaction.commit().await?;
        Ok(())
    }
}

impl DocumentStore for IndexedDB {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let record = async {
            let db = self.open().await?;
            let transaction = db
                .transaction(Store::Documents.as_ref())
                .with_mode(TransactionMode::Readonly)
                .build()?;
            let store = transaction.object_store(Store::Documents.as_ref())?;
            let record: Option<DocumentRecord> = store.get(path).serde()?.await?;
            Ok::<_, Box<dyn std::error::Error>>(record)
        }
        .await?;
        Ok(record.map(|record| Document {
            id: document_id(&record.path).to_string(),
            fields: record.fields,
        }))
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(query.apply(self.read_documents(collection).await?))
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        Ok(self.apply(writes).await?)
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.apply(vec![Write::Set {
            path: format!("{collection}/{id}"),
            fields,
            merge: false,
        }])
        .await?;
        Ok(id)
    }

    fn max_batch_size(&self) -> usize {
        usize::MAX
    }
}

impl domain::SessionRepository for IndexedDB {
    async fn request_session(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<domain::User, domain::ReadError> {
        let session = Session::local(email);
        self.write_session(&session)
            .await
            .map_err(StoreError::from)?;
        Ok(session.user())
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        Ok(self
            .read_session()
            .await
            .map_err(StoreError::from)?
            .ok_or(StoreError::NoSession)?
            .user())
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        Ok(self
            .clear_app_data()
            .await
            .map_err(StoreError::from)?)
    }
}

#[derive(AsRefStr)]
pub enum Store {
    #[strum(serialize = "app")]
    App,
    #[strum(serialize = "documents")]
    Documents,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
struct DocumentRecord {
    path: String,
    fields: Fields,
}

/// Authenticated user together with the tokens of the remote backend.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

impl Session {
    const LOCAL_USER_ID: &str = "local";

    #[must_use]
    pub fn local(email: &str) -> Self {
        Self {
            user_id: Self::LOCAL_USER_ID.to_string(),
            email: email.trim().to_string(),
            id_token: String::new(),
            refresh_token: String::new(),
        }
    }

    #[must_use]
    pub fn user(&self) -> domain::User {
        domain::User {
            id: self.user_id.clone().into(),
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::{
        document::Value,
        tests::data::{SESSION, TIMESTAMP},
    };

    use super::*;

    #[test]
    fn test_session_user() {
        assert_eq!(
            SESSION.user(),
            domain::User {
                id: "uid-1".into(),
                email: "alice@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_session_local() {
        let session = Session::local(" bob@example.com ");

        assert_eq!(session.user().id, domain::UserID::from("local"));
        assert_eq!(session.email, "bob@example.com");
        assert!(session.id_token.is_empty());
    }

    #[test]
    fn test_session_serde() {
        let serialized = json!(SESSION.clone());
        let deserialized: Session = serde_json::from_value(serialized).unwrap();
        assert_eq!(deserialized, SESSION.clone());
    }

    #[test]
    fn test_document_record_serde() {
        let record = DocumentRecord {
            path: "workouts/2024-01-05/exercises/abc/sets/set-0".to_string(),
            fields: Fields::from([
                ("weight".to_string(), Value::Double(62.5)),
                ("reps".to_string(), Value::Integer(5)),
                ("timestamp".to_string(), Value::from(*TIMESTAMP)),
            ]),
        };
        let serialized = json!(record);
        assert_eq!(serialized["fields"]["reps"], json!({"integerValue": "5"}));
        let deserialized: DocumentRecord = serde_json::from_value(serialized).unwrap();
        assert_eq!(deserialized, record);
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use fittrack_domain::SessionRepository;
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::*;

        #[wasm_bindgen_test]
        async fn test_initialize_session() {
            reset().await;

            assert!(matches!(
                IndexedDB.initialize_session().await,
                Err(domain::ReadError::Storage(domain::StorageError::NoSession))
            ));

            IndexedDB.write_session(&SESSION).await.unwrap();

            assert_eq!(IndexedDB.initialize_session().await.unwrap(), SESSION.user());
        }

        #[wasm_bindgen_test]
        async fn test_request_session_local() {
            reset().await;

            let user = IndexedDB
                .request_session("bob@example.com", "")
                .await
                .unwrap();

            assert_eq!(IndexedDB.initialize_session().await.unwrap(), user);
        }

        #[wasm_bindgen_test]
        async fn test_delete_session() {
            reset().await;

            IndexedDB.write_session(&SESSION).await.unwrap();

            assert_eq!(IndexedDB.delete_session().await.unwrap(), ());

            assert!(matches!(
                IndexedDB.initialize_session().await,
                Err(domain::ReadError::Storage(domain::StorageError::NoSession))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_commit_and_list() {
            reset().await;

            IndexedDB
                .commit(vec![
                    Write::Set {
                        path: "workouts/2024-01-02".to_string(),
                        fields: Fields::from([("title".to_string(), Value::from("Pull"))]),
                        merge: false,
                    },
                    Write::Set {
                        path: "workouts/2024-01-01".to_string(),
                        fields: Fields::new(),
                        merge: false,
                    },
                    Write::Set {
                        path: "workouts/2024-01-01/exercises/abc".to_string(),
                        fields: Fields::new(),
                        merge: false,
                    },
                ])
                .await
                .unwrap();

            assert_eq!(
                IndexedDB
                    .list("workouts", &Query::default())
                    .await
                    .unwrap()
                    .iter()
                    .map(|d| d.id.as_str())
                    .collect::<Vec<_>>(),
                vec!["2024-01-01", "2024-01-02"]
            );

            IndexedDB
                .commit(vec![
                    Write::Set {
                        path: "workouts/2024-01-02".to_string(),
                        fields: Fields::from([("date".to_string(), Value::from("2024-01-02"))]),
                        merge: true,
                    },
                    Write::Delete {
                        path: "workouts/2024-01-01".to_string(),
                    },
                ])
                .await
                .unwrap();

            let document = IndexedDB.get("workouts/2024-01-02").await.unwrap().unwrap();
            assert_eq!(document.string("title").unwrap(), "Pull");
            assert_eq!(document.string("date").unwrap(), "2024-01-02");
            assert!(IndexedDB.get("workouts/2024-01-01").await.unwrap().is_none());
        }

        #[wasm_bindgen_test]
        async fn test_add() {
            reset().await;

            let id = IndexedDB.add("exercises", Fields::new()).await.unwrap();

            assert!(
                IndexedDB
                    .get(&format!("exercises/{id}"))
                    .await
                    .unwrap()
                    .is_some()
            );
        }

        async fn reset() {
            IndexedDB.clear_app_data().await.unwrap();
            IndexedDB.clear_documents().await.unwrap();
        }
    }
}
