//! Firestore REST backend
//!
//! Documents are accessed through the Firestore REST API, authenticated with an ID token obtained
//! by email/password sign-in through the Identity Toolkit API. The session is kept in `IndexedDB`
//! so that it survives reloads. Expired ID tokens are renewed once per request using the refresh
//! token.

use std::{cell::RefCell, pin::pin};

use anyhow::anyhow;
use fittrack_domain as domain;
use futures_util::future::{Either, select};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::json;
use web_sys::AbortController;

use crate::{
    document::{
        Document, DocumentStore, Fields, Query, StoreError, Write, document_id, split_collection,
    },
    indexed_db::{IndexedDB, Session},
};

/// Maximum number of writes in a single commit.
pub const MAX_BATCH_SIZE: usize = 500;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const SIGN_IN_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";
const REFRESH_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Subset of the Firebase web app configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default = "default_database_id")]
    pub database_id: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
}

fn default_database_id() -> String {
    "(default)".to_string()
}

const fn default_timeout_ms() -> u32 {
    10_000
}

impl FirebaseConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn database(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.project_id, self.database_id
        )
    }

    fn document_name(&self, path: &str) -> String {
        format!("{}/documents/{path}", self.database())
    }

    fn documents_url(&self) -> String {
        format!("{FIRESTORE_URL}/{}/documents", self.database())
    }

    fn document_url(&self, path: &str) -> String {
        format!("{}/{path}", self.documents_url())
    }

    fn run_query_url(&self, collection: &str) -> String {
        match split_collection(collection) {
            ("", _) => format!("{}:runQuery", self.documents_url()),
            (parent, _) => format!("{}:runQuery", self.document_url(parent)),
        }
    }

    fn commit_url(&self) -> String {
        format!("{}:commit", self.documents_url())
    }

    fn sign_in_url(&self) -> String {
        format!("{SIGN_IN_URL}?key={}", self.api_key)
    }

    fn refresh_url(&self) -> String {
        format!("{REFRESH_URL}?key={}", self.api_key)
    }

    fn run_query_body(&self, collection: &str, query: &Query) -> serde_json::Value {
        let (_, collection_id) = split_collection(collection);
        let direction = if query.descending {
            "DESCENDING"
        } else {
            "ASCENDING"
        };
        let mut structured_query = json!({
            "from": [{ "collectionId": collection_id }],
            "orderBy": [{ "field": { "fieldPath": "__name__" }, "direction": direction }],
        });
        if let Some(before) = &query.before {
            structured_query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": "__name__" },
                    "op": "LESS_THAN",
                    "value": {
                        "referenceValue": self.document_name(&format!("{collection}/{before}"))
                    },
                }
            });
        }
        if let Some(limit) = query.limit {
            structured_query["limit"] = json!(limit);
        }
        json!({ "structuredQuery": structured_query })
    }

    fn commit_body(&self, writes: &[Write]) -> serde_json::Value {
        let writes = writes
            .iter()
            .map(|write| match write {
                Write::Set {
                    path,
                    fields,
                    merge,
                } => {
                    let mut value = json!({
                        "update": { "name": self.document_name(path), "fields": fields }
                    });
                    if *merge {
                        let field_paths = fields.keys().collect::<Vec<_>>();
                        value["updateMask"] = json!({ "fieldPaths": field_paths });
                    }
                    value
                }
                Write::Delete { path } => json!({ "delete": self.document_name(path) }),
            })
            .collect::<Vec<_>>();
        json!({ "writes": writes })
    }
}

#[derive(Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Fields,
}

impl From<FirestoreDocument> for Document {
    fn from(value: FirestoreDocument) -> Self {
        Document {
            id: document_id(&value.name).to_string(),
            fields: value.fields,
        }
    }
}

#[derive(Deserialize)]
struct RunQueryResult {
    document: Option<FirestoreDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

pub struct Firestore<S: SendRequest = GlooNetSendRequest> {
    config: FirebaseConfig,
    sender: S,
    session: RefCell<Option<Session>>,
}

impl Firestore<GlooNetSendRequest> {
    #[must_use]
    pub fn new(config: FirebaseConfig) -> Self {
        Self::with_sender(config, GlooNetSendRequest)
    }
}

impl<S: SendRequest> Firestore<S> {
    pub fn with_sender(config: FirebaseConfig, sender: S) -> Self {
        Self {
            config,
            sender,
            session: RefCell::new(None),
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<Response, StoreError> {
        let controller = AbortController::new()
            .map_err(|err| StoreError::Other(anyhow!("{err:?}").into()))?;
        let signal = controller.signal();
        let mut builder = match method {
            Method::Get => Request::get(url),
            Method::Post => Request::post(url),
        }
        .abort_signal(Some(&signal));
        if let Some(token) = token {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|err| StoreError::Other(Box::new(err)))?;

        let response = pin!(self.sender.send_request(request));
        let timeout = pin!(TimeoutFuture::new(self.config.timeout_ms));
        match select(response, timeout).await {
            Either::Left((Ok(response), _)) => Ok(response),
            Either::Left((Err(err), _)) => {
                debug!("request to {url} failed: {err}");
                Err(StoreError::NoConnection)
            }
            Either::Right(((), _)) => {
                controller.abort();
                debug!("request to {url} timed out");
                Err(StoreError::NoConnection)
            }
        }
    }

    /// Sends an authenticated request, renewing the ID token once if it was rejected.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, StoreError> {
        let token = self.id_token()?;
        let mut response = self.send_once(method, url, body, Some(&token)).await?;
        if response.status() == 401 {
            let token = self.refresh_session().await?;
            response = self.send_once(method, url, body, Some(&token)).await?;
        }
        match response.status() {
            401 | 403 => Err(StoreError::NoSession),
            _ => Ok(response),
        }
    }

    fn id_token(&self) -> Result<String, StoreError> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.id_token.clone())
            .ok_or(StoreError::NoSession)
    }

    async fn refresh_session(&self) -> Result<String, StoreError> {
        let Some(mut session) = self.session.borrow().clone() else {
            return Err(StoreError::NoSession);
        };
        let response = self
            .send_once(
                Method::Post,
                &self.config.refresh_url(),
                Some(&json!({
                    "grant_type": "refresh_token",
                    "refresh_token": session.refresh_token,
                })),
                None,
            )
            .await?;
        if !response.ok() {
            return Err(StoreError::NoSession);
        }
        let refreshed: RefreshResponse = decode(response).await?;
        session.id_token = refreshed.id_token;
        session.refresh_token = refreshed.refresh_token;
        self.store_session(session.clone()).await;
        Ok(session.id_token)
    }

    async fn store_session(&self, session: Session) {
        if let Err(err) = IndexedDB.write_session(&session).await {
            error!("failed to write session into IDB: {err}");
        }
        *self.session.borrow_mut() = Some(session);
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, StoreError> {
    response
        .json::<T>()
        .await
        .map_err(|err| StoreError::Other(anyhow!("deserialization failed: {err}").into()))
}

fn unexpected(response: &Response) -> StoreError {
    StoreError::Other(anyhow!("{} {}", response.status(), response.status_text()).into())
}

impl<S: SendRequest> DocumentStore for Firestore<S> {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .send(Method::Get, &self.config.document_url(path), None)
            .await?;
        match response.status() {
            404 => Ok(None),
            _ if response.ok() => Ok(Some(decode::<FirestoreDocument>(response).await?.into())),
            _ => Err(unexpected(&response)),
        }
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let response = self
            .send(
                Method::Post,
                &self.config.run_query_url(collection),
                Some(&self.config.run_query_body(collection, query)),
            )
            .await?;
        if !response.ok() {
            return Err(unexpected(&response));
        }
        Ok(decode::<Vec<RunQueryResult>>(response)
            .await?
            .into_iter()
            .filter_map(|result| result.document.map(Document::from))
            .collect())
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        let response = self
            .send(
                Method::Post,
                &self.config.commit_url(),
                Some(&self.config.commit_body(&writes)),
            )
            .await?;
        if !response.ok() {
            return Err(unexpected(&response));
        }
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let response = self
            .send(
                Method::Post,
                &self.config.document_url(collection),
                Some(&json!({ "fields": fields })),
            )
            .await?;
        if !response.ok() {
            return Err(unexpected(&response));
        }
        Ok(Document::from(decode::<FirestoreDocument>(response).await?).id)
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }
}

impl<S: SendRequest> domain::SessionRepository for Firestore<S> {
    async fn request_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<domain::User, domain::ReadError> {
        let response = self
            .send_once(
                Method::Post,
                &self.config.sign_in_url(),
                Some(&json!({
                    "email": email.trim(),
                    "password": password,
                    "returnSecureToken": true,
                })),
                None,
            )
            .await?;
        match response.status() {
            400 | 401 | 403 => return Err(StoreError::NoSession.into()),
            _ if !response.ok() => return Err(unexpected(&response).into()),
            _ => {}
        }
        let signed_in: SignInResponse = decode(response).await?;
        let session = Session {
            user_id: signed_in.local_id,
            email: signed_in.email,
            id_token: signed_in.id_token,
            refresh_token: signed_in.refresh_token,
        };
        let user = session.user();
        self.store_session(session).await;
        Ok(user)
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        if let Some(session) = self.session.borrow().as_ref() {
            return Ok(session.user());
        }
        let session = IndexedDB
            .read_session()
            .await
            .map_err(StoreError::from)?
            .ok_or(StoreError::NoSession)?;
        let user = session.user();
        *self.session.borrow_mut() = Some(session);
        Ok(user)
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        *self.session.borrow_mut() = None;
        Ok(IndexedDB
            .clear_app_data()
            .await
            .map_err(StoreError::from)?)
    }
}
