//! In-process document store
//!
//! Mirrors the remote store's observable contract: generated ids, server
//! timestamps resolved at write time, no-op deletes of missing documents and
//! failing updates of missing documents.

use async_trait::async_trait;
use chrono::Utc;
use gymtrack_core::{
    store_error, Document, DocumentStore, FieldValue, Fields, GymTrackResult,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory document store (default backend for local runs and tests)
pub struct MemoryDocumentStore {
    /// collection -> documents in insertion order
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
    calls: AtomicUsize,
    latency_ms: AtomicU64,
    fail_next: Mutex<Option<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            calls: AtomicUsize::new(0),
            latency_ms: AtomicU64::new(0),
            fail_next: Mutex::new(None),
        }
    }

    /// Number of operations received so far, failed ones included
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next operation fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(message.into());
        }
    }

    /// Delay every operation, simulating a slow network
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Snapshot of a collection in insertion order
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        let collections = self.collections.read().await;
        collections.get(collection).cloned().unwrap_or_default()
    }

    async fn begin(&self, operation: &str) -> GymTrackResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let injected = self.fail_next.lock().ok().and_then(|mut slot| slot.take());
        match injected {
            Some(message) => Err(store_error!(message, "memory_store")),
            None => {
                debug!(operation = operation, "Memory store operation");
                Ok(())
            }
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(fields: Fields) -> Map<String, Value> {
    let now = Utc::now().to_rfc3339();
    fields
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                FieldValue::Value(value) => value,
                FieldValue::ServerTimestamp => Value::String(now.clone()),
            };
            (key, value)
        })
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, fields: Fields) -> GymTrackResult<String> {
        self.begin("insert").await?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let document = Document {
            id: id.clone(),
            fields: resolve(fields),
        };

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> GymTrackResult<Vec<Document>> {
        self.begin("query_by_field").await?;

        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.fields.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> GymTrackResult<()> {
        self.begin("update_by_id").await?;

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id));

        match document {
            Some(document) => {
                document.fields.extend(resolve(fields));
                Ok(())
            }
            None => Err(store_error!(
                format!("No document to update: {}/{}", collection, id),
                "memory_store"
            )),
        }
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> GymTrackResult<()> {
        self.begin("delete_by_id").await?;

        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::Value(v.clone())))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let store = MemoryDocumentStore::new();
        let mut data = fields(&[("userId", json!("u1")), ("exerciseName", json!("Squat"))]);
        data.insert("createdAt".to_string(), FieldValue::ServerTimestamp);

        let id = store.insert("workouts", data).await.unwrap();
        store
            .insert("workouts", fields(&[("userId", json!("u2"))]))
            .await
            .unwrap();

        let docs = store
            .query_by_field("workouts", "userId", &json!("u1"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert!(docs[0].fields["createdAt"].is_string());
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryDocumentStore::new();
        assert!(store.delete_by_id("workouts", "nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update_by_id("workouts", "nope", fields(&[("sets", json!(3))]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No document to update: workouts/nope");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert("workouts", fields(&[("userId", json!("u1")), ("sets", json!(3))]))
            .await
            .unwrap();

        store
            .update_by_id("workouts", &id, fields(&[("sets", json!(5))]))
            .await
            .unwrap();

        let docs = store.documents("workouts").await;
        assert_eq!(docs[0].fields["sets"], json!(5));
        assert_eq!(docs[0].fields["userId"], json!("u1"));
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = MemoryDocumentStore::new();
        store.fail_next("backend unavailable");

        let err = store
            .query_by_field("workouts", "userId", &json!("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend unavailable");

        assert!(store
            .query_by_field("workouts", "userId", &json!("u1"))
            .await
            .is_ok());
    }
}
