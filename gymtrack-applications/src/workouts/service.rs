//! Workout record service
//!
//! Stateless create/list/update/delete against one document collection. Every
//! call reports through [`ServiceResult`]; store and timeout errors are caught
//! here and never reach the caller as `Err`.

use gymtrack_core::{
    log_operation_error, log_operation_start, log_operation_success, with_timeout_flatten,
    DocumentStore, ErrorContext, FieldValue, Fields, GymTrackConfig, GymTrackError,
    GymTrackResult, Workout, WorkoutData,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Uniform outcome of a record operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workouts: Option<Vec<Workout>>,
}

impl ServiceResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn created(id: String) -> Self {
        Self {
            success: true,
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn listed(workouts: Vec<Workout>) -> Self {
        Self {
            success: true,
            workouts: Some(workouts),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A failed listing still carries an empty record list
    pub fn failed_listing(error: impl Into<String>) -> Self {
        Self {
            workouts: Some(Vec::new()),
            ..Self::failed(error)
        }
    }
}

/// Sort newest first by creation time, falling back to the workout date.
///
/// The sort is stable, so ties keep the store's order. Records without any
/// parseable timestamp go last.
pub fn sort_workouts(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

/// Record service for workout documents
#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn DocumentStore>,
    collection: String,
    timeout_ms: u64,
}

impl WorkoutService {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            store,
            collection: collection.into(),
            timeout_ms,
        }
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &GymTrackConfig) -> Self {
        Self::new(
            store,
            config.backend.workouts_collection.clone(),
            config.client.request_timeout_ms,
        )
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Store a new record owned by `user_id`; the result carries its id
    pub async fn create(&self, user_id: &str, data: &WorkoutData) -> ServiceResult {
        log_operation_start!("workouts.create", user_id = user_id);
        match self.try_create(user_id, data).await {
            Ok(id) => {
                log_operation_success!("workouts.create", workout_id = %id);
                ServiceResult::created(id)
            }
            Err(e) => {
                log_operation_error!("workouts.create", e, user_id = user_id);
                ServiceResult::failed(e.to_string())
            }
        }
    }

    /// All records owned by `user_id`, newest first
    pub async fn list(&self, user_id: &str) -> ServiceResult {
        log_operation_start!("workouts.list", user_id = user_id);
        match self.try_list(user_id).await {
            Ok(workouts) => {
                log_operation_success!("workouts.list", count = workouts.len());
                ServiceResult::listed(workouts)
            }
            Err(e) => {
                log_operation_error!("workouts.list", e, user_id = user_id);
                ServiceResult::failed_listing(e.to_string())
            }
        }
    }

    /// Overwrite the mutable fields of a record. Ownership is enforced by the store.
    pub async fn update(&self, workout_id: &str, data: &WorkoutData) -> ServiceResult {
        log_operation_start!("workouts.update", workout_id = workout_id);
        match self.try_update(workout_id, data).await {
            Ok(()) => {
                log_operation_success!("workouts.update", workout_id = workout_id);
                ServiceResult::ok()
            }
            Err(e) => {
                log_operation_error!("workouts.update", e, workout_id = workout_id);
                ServiceResult::failed(e.to_string())
            }
        }
    }

    pub async fn delete(&self, workout_id: &str) -> ServiceResult {
        log_operation_start!("workouts.delete", workout_id = workout_id);
        match self.try_delete(workout_id).await {
            Ok(()) => {
                log_operation_success!("workouts.delete", workout_id = workout_id);
                ServiceResult::ok()
            }
            Err(e) => {
                log_operation_error!("workouts.delete", e, workout_id = workout_id);
                ServiceResult::failed(e.to_string())
            }
        }
    }

    async fn try_create(&self, user_id: &str, data: &WorkoutData) -> GymTrackResult<String> {
        let mut data = data.clone();
        if data.date.trim().is_empty() {
            data.date = chrono::Utc::now().to_rfc3339();
        }

        let mut fields = workout_fields(&data)?;
        fields.insert(
            "userId".to_string(),
            FieldValue::Value(Value::String(user_id.to_string())),
        );
        fields.insert("createdAt".to_string(), FieldValue::ServerTimestamp);

        with_timeout_flatten(
            self.store.insert(&self.collection, fields),
            self.timeout_ms,
            "workouts.create",
        )
        .await
    }

    async fn try_list(&self, user_id: &str) -> GymTrackResult<Vec<Workout>> {
        let owner = Value::String(user_id.to_string());
        let documents = with_timeout_flatten(
            self.store.query_by_field(&self.collection, "userId", &owner),
            self.timeout_ms,
            "workouts.list",
        )
        .await?;

        let mut workouts = Vec::with_capacity(documents.len());
        for document in documents {
            let mut fields = document.fields;
            fields.insert("workoutId".to_string(), Value::String(document.id.clone()));
            match serde_json::from_value::<Workout>(Value::Object(fields)) {
                Ok(workout) => workouts.push(workout),
                Err(e) => warn!(
                    workout_id = %document.id,
                    error = %e,
                    "Skipping malformed workout record"
                ),
            }
        }

        sort_workouts(&mut workouts);
        Ok(workouts)
    }

    async fn try_update(&self, workout_id: &str, data: &WorkoutData) -> GymTrackResult<()> {
        let mut fields = workout_fields(data)?;
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);

        with_timeout_flatten(
            self.store.update_by_id(&self.collection, workout_id, fields),
            self.timeout_ms,
            "workouts.update",
        )
        .await
    }

    async fn try_delete(&self, workout_id: &str) -> GymTrackResult<()> {
        with_timeout_flatten(
            self.store.delete_by_id(&self.collection, workout_id),
            self.timeout_ms,
            "workouts.delete",
        )
        .await
    }
}

fn workout_fields(data: &WorkoutData) -> GymTrackResult<Fields> {
    match serde_json::to_value(data.normalized())? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, FieldValue::Value(value)))
            .collect()),
        other => Err(GymTrackError::Internal {
            message: format!("Workout serialized to a non-object value: {}", other),
            source: None,
            context: ErrorContext::new("workout_service").with_operation("workout_fields"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use gymtrack_core::WorkoutType;

    fn workout(id: &str, created: Option<i64>, date: &str) -> Workout {
        Workout {
            workout_id: id.to_string(),
            user_id: "u1".to_string(),
            data: WorkoutData {
                exercise_name: "Bench".to_string(),
                workout_type: WorkoutType::Strength,
                sets: 3,
                reps: 8,
                weight: 60.0,
                duration: 0,
                date: date.to_string(),
            },
            created_at: created.map(|secs| Utc.timestamp_opt(secs, 0).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn test_sort_prefers_created_at_then_date() {
        let mut workouts = vec![
            workout("old-created", Some(1_000), "2030-01-01"),
            workout("no-created", None, "2001-09-09T01:46:50Z"),
            workout("new-created", Some(2_000_000_000), "1990-01-01"),
            workout("garbage", None, "whenever"),
        ];

        sort_workouts(&mut workouts);
        let ids: Vec<&str> = workouts.iter().map(|w| w.workout_id.as_str()).collect();
        // 2001-09-09T01:46:50Z is 1_000_000_010 seconds
        assert_eq!(ids, vec!["new-created", "no-created", "old-created", "garbage"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut workouts = vec![
            workout("first", Some(500), ""),
            workout("second", Some(500), ""),
        ];
        sort_workouts(&mut workouts);
        assert_eq!(workouts[0].workout_id, "first");
        assert_eq!(workouts[1].workout_id, "second");
    }

    #[test]
    fn test_workout_fields_shape() {
        let data = WorkoutData::strength("Deadlift", 5, 3, -1.0).on(Utc::now() - Duration::days(1));
        let fields = workout_fields(&data).unwrap();

        assert_eq!(fields.len(), 7);
        assert_eq!(
            fields.get("weight"),
            Some(&FieldValue::Value(serde_json::json!(0.0)))
        );
        assert!(fields.contains_key("exerciseName"));
        assert!(!fields.contains_key("userId"));
    }

    #[test]
    fn test_result_shapes() {
        let failed = ServiceResult::failed_listing("boom");
        assert!(!failed.success);
        assert_eq!(failed.workouts, Some(Vec::new()));

        let json = serde_json::to_value(ServiceResult::created("abc".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "id": "abc"}));
    }
}
