use async_trait::async_trait;
use catalog_models::AuthUser;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::BackendError;

/// A signed-in identity plus the tokens that prove it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// One document out of a remote collection: its id plus the free-form
/// key/value record. Shape validation happens in `catalog-models`.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// The remote identity service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, BackendError>;

    async fn sign_in_anonymously(&self) -> Result<Session, BackendError>;

    /// Server-side part of sign-out. Discarding the local session is the
    /// caller's job.
    async fn sign_out(&self, id_token: &str) -> Result<(), BackendError>;

    /// Resolve the identity a token belongs to.
    async fn current_user(&self, id_token: &str) -> Result<AuthUser, BackendError>;
}

/// The remote collection-of-documents database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError>;

    /// Documents whose array field `field` contains at least one of `values`.
    async fn query_contains_any(
        &self,
        collection: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Document>, BackendError>;

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), BackendError>;
}
