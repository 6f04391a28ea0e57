//! Backend seams

use crate::error::{GymTrackResult, ProviderError};
use crate::types::*;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

/// Stream of session-change notifications
pub type AuthStateStream = BoxStream<'static, AuthStateEvent>;

/// Remote authentication provider
///
/// Register and login sign the user in on success; the resulting identity is
/// delivered through [`AuthProvider::subscribe`], not through the return value's
/// consumers.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in
    async fn register_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError>;

    /// Sign an existing account in
    async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError>;

    /// Sign the current user out
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Subscribe to session changes. The first event carries the current state.
    fn subscribe(&self) -> AuthStateStream;
}

/// Remote key-indexed document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its generated id
    async fn insert(&self, collection: &str, fields: Fields) -> GymTrackResult<String>;

    /// All documents whose `field` equals `value`, in store order
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> GymTrackResult<Vec<Document>>;

    /// Merge `fields` into an existing document
    async fn update_by_id(&self, collection: &str, id: &str, fields: Fields)
        -> GymTrackResult<()>;

    /// Remove a document
    async fn delete_by_id(&self, collection: &str, id: &str) -> GymTrackResult<()>;
}
