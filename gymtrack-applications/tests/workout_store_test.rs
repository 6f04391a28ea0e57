//! Workout store and record service against the in-process backend

use chrono::{Duration as ChronoDuration, Utc};
use gymtrack_applications::{
    AppContext, Backend, MemoryAuthProvider, MemoryDocumentStore, ServiceResult, WorkoutService,
    WorkoutStats, WorkoutStore,
};
use gymtrack_core::{AuthUser, GymTrackConfig, WorkoutData, WorkoutType};
use std::sync::Arc;
use std::time::Duration;

macro_rules! wait_until {
    ($cond:expr) => {{
        let mut reached = false;
        for _ in 0..200 {
            if $cond {
                reached = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(reached, "condition not reached: {}", stringify!($cond));
    }};
}

struct Harness {
    documents: Arc<MemoryDocumentStore>,
    context: AppContext,
}

async fn signed_in() -> Harness {
    let auth = Arc::new(MemoryAuthProvider::new());
    let documents = Arc::new(MemoryDocumentStore::new());
    let backend = Backend::new(auth, documents.clone());
    let context = AppContext::new(GymTrackConfig::default(), backend).await;

    let result = context
        .session()
        .register("lifter@example.com", "secret1")
        .await;
    assert!(result.success);
    wait_until!(context.workouts().current_user().await.is_some());
    wait_until!(!context.workouts().is_loading());

    Harness { documents, context }
}

#[tokio::test]
async fn test_add_then_fetch_contains_record() {
    let h = signed_in().await;
    let store = h.context.workouts();
    let data = WorkoutData::strength("Bench Press", 3, 8, 62.5);

    let result = store.add(data.clone()).await;
    assert!(result.success);
    let id = result.id.expect("created id");

    store.fetch().await;
    let workouts = store.workouts().await;
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].workout_id, id);
    assert_eq!(workouts[0].data, data);
    assert!(workouts[0].created_at.is_some());

    let stats = store.stats().await;
    assert_eq!(stats.total_workouts, 1);
    assert_eq!(stats.weekly_count, 1);
    assert_eq!(stats.last_workout_date, Some(data.date));
}

#[tokio::test]
async fn test_remove_then_fetch_drops_record() {
    let h = signed_in().await;
    let store = h.context.workouts();
    let keep = store.add(WorkoutData::cardio("Run", 30)).await.id.unwrap();
    let gone = store.add(WorkoutData::cardio("Swim", 45)).await.id.unwrap();

    assert_eq!(store.remove(&gone).await, ServiceResult::ok());
    store.fetch().await;

    let ids: Vec<String> = store.workouts().await.into_iter().map(|w| w.workout_id).collect();
    assert_eq!(ids, vec![keep]);
}

#[tokio::test]
async fn test_removing_missing_id_is_a_successful_noop() {
    let h = signed_in().await;
    let store = h.context.workouts();
    store.add(WorkoutData::cardio("Run", 30)).await;

    let result = store.remove("does-not-exist").await;
    assert_eq!(result, ServiceResult::ok());
    assert_eq!(store.workouts().await.len(), 1);
}

#[tokio::test]
async fn test_editing_missing_id_fails() {
    let h = signed_in().await;
    let result = h
        .context
        .workouts()
        .edit("does-not-exist", WorkoutData::cardio("Run", 30))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("No document to update: workouts/does-not-exist")
    );
}

#[tokio::test]
async fn test_edit_round_trip() {
    let h = signed_in().await;
    let store = h.context.workouts();
    let id = store
        .add(WorkoutData::strength("Squat", 5, 5, 100.0))
        .await
        .id
        .unwrap();

    let edited = WorkoutData::cardio("Bike", 40).on(Utc::now() - ChronoDuration::days(3));
    assert!(store.edit(&id, edited.clone()).await.success);
    store.fetch().await;

    let workout = store.get(&id).await.expect("edited record");
    assert_eq!(workout.data, edited);
    assert_eq!(workout.data.workout_type, WorkoutType::Cardio);
    assert!(workout.updated_at.is_some());
}

#[tokio::test]
async fn test_logout_clears_without_network_calls() {
    let h = signed_in().await;
    let store = h.context.workouts();
    store.add(WorkoutData::cardio("Run", 30)).await;
    assert_eq!(store.stats().await.total_workouts, 1);

    let calls = h.documents.call_count();
    assert!(h.context.session().logout().await.success);
    wait_until!(store.current_user().await.is_none());

    assert!(store.workouts().await.is_empty());
    assert_eq!(store.stats().await, WorkoutStats::default());
    assert_eq!(h.documents.call_count(), calls);
}

#[tokio::test]
async fn test_records_are_scoped_to_owner() {
    let h = signed_in().await;
    let store = h.context.workouts();
    store.add(WorkoutData::cardio("Run", 30)).await;

    h.context.session().logout().await;
    wait_until!(store.current_user().await.is_none());
    h.context
        .session()
        .register("other@example.com", "secret2")
        .await;
    wait_until!(store.current_user().await.is_some());
    wait_until!(!store.is_loading());

    assert!(store.workouts().await.is_empty());
    assert_eq!(h.documents.documents("workouts").await.len(), 1);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let h = signed_in().await;
    let store = h.context.workouts();
    let first = store.add(WorkoutData::cardio("Run", 30)).await.id.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = store.add(WorkoutData::cardio("Row", 20)).await.id.unwrap();

    let ids: Vec<String> = store.workouts().await.into_iter().map(|w| w.workout_id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn test_store_failure_surfaces_raw_message() {
    let h = signed_in().await;
    let store = h.context.workouts();

    h.documents.fail_next("Missing or insufficient permissions.");
    let result = store.add(WorkoutData::cardio("Run", 30)).await;
    assert_eq!(
        result,
        ServiceResult::failed("Missing or insufficient permissions.")
    );
    assert_eq!(store.error().await, None);
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let documents = Arc::new(MemoryDocumentStore::new());
    documents.set_latency(Duration::from_millis(200));
    let service = WorkoutService::new(documents, "workouts", 50);

    let result = service.list("u1").await;
    assert!(!result.success);
    assert_eq!(result.workouts, Some(Vec::new()));
    assert_eq!(
        result.error.as_deref(),
        Some("Operation timeout: workouts.list")
    );
}

#[tokio::test]
async fn test_stale_fetch_is_dropped_after_logout() {
    let documents = Arc::new(MemoryDocumentStore::new());
    let service = WorkoutService::new(documents.clone(), "workouts", 5_000);
    assert!(service.create("u1", &WorkoutData::cardio("Run", 30)).await.success);

    let store = Arc::new(WorkoutStore::new(service));
    documents.set_latency(Duration::from_millis(100));

    let pending = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .handle_session_change(Some(AuthUser::new("u1", "u1@example.com")))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.is_loading());

    store.handle_session_change(None).await;
    pending.await.unwrap();

    assert!(store.workouts().await.is_empty());
    assert_eq!(store.stats().await, WorkoutStats::default());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_concurrent_adds_are_all_recorded() {
    let h = signed_in().await;
    let store = h.context.workouts().clone();

    let tasks: Vec<_> = (0..5)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.add(WorkoutData::cardio(format!("Run {}", i), 10)).await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().success);
    }

    assert_eq!(store.workouts().await.len(), 5);
    assert_eq!(store.stats().await.total_workouts, 5);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_shutdown_stops_following_session() {
    let h = signed_in().await;
    h.context.shutdown();

    h.context.session().logout().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.context.workouts().current_user().await.is_some());
}
