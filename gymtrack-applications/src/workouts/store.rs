//! Workout Store - user-scoped cache of workout records
//!
//! Follows the session: a signed-in user triggers a full fetch, signing out
//! clears the cache without touching the network. Every successful mutation is
//! followed by a refetch, so statistics are always recomputed from the full set.

use super::{ServiceResult, WorkoutService, WorkoutStats};
use crate::session::{SessionEvent, SessionManager};
use chrono::Utc;
use gymtrack_core::{performance, AuthUser, Workout, WorkoutData};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const FETCH_FAILED: &str = "Failed to fetch workouts";
const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Debug, Default)]
struct StoreState {
    user: Option<AuthUser>,
    workouts: Vec<Workout>,
    stats: WorkoutStats,
    error: Option<String>,
}

/// Point-in-time copy of the store for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutSnapshot {
    pub user: Option<AuthUser>,
    pub workouts: Vec<Workout>,
    pub stats: WorkoutStats,
    pub loading: bool,
    pub error: Option<String>,
}

/// Keeps `loading` raised while at least one operation is running
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct WorkoutStore {
    service: WorkoutService,
    state: RwLock<StoreState>,
    in_flight: AtomicUsize,
    /// Bumped by every fetch and every sign-out; older fetch results are dropped
    generation: AtomicU64,
    mutations: Mutex<()>,
    reactor: StdMutex<Option<JoinHandle<()>>>,
}

impl WorkoutStore {
    pub fn new(service: WorkoutService) -> Self {
        Self {
            service,
            state: RwLock::new(StoreState::default()),
            in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            mutations: Mutex::new(()),
            reactor: StdMutex::new(None),
        }
    }

    pub fn service(&self) -> &WorkoutService {
        &self.service
    }

    /// Follow `session` until [`WorkoutStore::detach`] is called.
    ///
    /// The current session user is applied before this returns.
    pub async fn attach(self: &Arc<Self>, session: &Arc<SessionManager>) {
        self.detach();

        let mut events = session.subscribe();
        self.handle_session_change(session.current_user().await)
            .await;

        let store = Arc::downgrade(self);
        let session = Arc::downgrade(session);
        let handle = tokio::spawn(async move {
            loop {
                let user = match events.recv().await {
                    Ok(SessionEvent::SignedIn(user)) => Some(user),
                    Ok(SessionEvent::SignedOut) => None,
                    Ok(SessionEvent::ListenerError(_)) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Workout store missed session events, resyncing");
                        match session.upgrade() {
                            Some(session) => session.current_user().await,
                            None => break,
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                let Some(store) = store.upgrade() else {
                    break;
                };
                store.handle_session_change(user).await;
            }
            debug!("Workout store reactor finished");
        });

        *self.reactor.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stop following the session
    pub fn detach(&self) {
        let handle = self
            .reactor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("Workout store detached from session");
        }
    }

    /// React to the session user changing
    pub async fn handle_session_change(&self, user: Option<AuthUser>) {
        match user {
            Some(user) => {
                let _loading = InFlight::enter(&self.in_flight);
                {
                    let mut state = self.state.write().await;
                    if state.user.as_ref().map(|u| &u.uid) == Some(&user.uid) {
                        debug!(uid = %user.uid, "Session user unchanged, keeping cache");
                        state.user = Some(user);
                        return;
                    }
                    info!(uid = %user.uid, "Loading workouts for signed-in user");
                    state.user = Some(user);
                    state.workouts.clear();
                    state.stats = WorkoutStats::default();
                }
                self.fetch().await;
            }
            None => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                let mut state = self.state.write().await;
                if state.user.is_some() {
                    info!("Signed out, clearing workout cache");
                }
                *state = StoreState::default();
            }
        }
    }

    /// Reload every record of the current user. Does nothing while signed out.
    pub async fn fetch(&self) {
        let Some(user) = self.current_user().await else {
            debug!("No signed-in user, skipping workout fetch");
            return;
        };

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = InFlight::enter(&self.in_flight);
        self.state.write().await.error = None;

        let result = performance::measure_async("workouts.fetch", self.service.list(&user.uid)).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket = ticket, "Dropping stale workout fetch");
            return;
        }

        match result {
            ServiceResult {
                success: true,
                workouts: Some(workouts),
                ..
            } => {
                state.stats = WorkoutStats::compute(&workouts, Utc::now());
                state.workouts = workouts;
                debug!(count = state.workouts.len(), "Workout cache replaced");
            }
            ServiceResult { error, .. } => {
                state.error = Some(error.unwrap_or_else(|| FETCH_FAILED.to_string()));
            }
        }
    }

    /// Create a record for the signed-in user
    pub async fn add(&self, data: WorkoutData) -> ServiceResult {
        let _guard = self.mutations.lock().await;
        let _loading = InFlight::enter(&self.in_flight);
        self.state.write().await.error = None;

        let Some(user) = self.current_user().await else {
            return ServiceResult::failed(NOT_AUTHENTICATED);
        };

        let result = self.service.create(&user.uid, &data).await;
        if result.success {
            self.fetch().await;
        }
        result
    }

    pub async fn edit(&self, workout_id: &str, data: WorkoutData) -> ServiceResult {
        let _guard = self.mutations.lock().await;
        let _loading = InFlight::enter(&self.in_flight);
        self.state.write().await.error = None;

        let result = self.service.update(workout_id, &data).await;
        if result.success {
            self.fetch().await;
        }
        result
    }

    pub async fn remove(&self, workout_id: &str) -> ServiceResult {
        let _guard = self.mutations.lock().await;
        let _loading = InFlight::enter(&self.in_flight);
        self.state.write().await.error = None;

        let result = self.service.delete(workout_id).await;
        if result.success {
            self.fetch().await;
        }
        result
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.user.clone()
    }

    pub async fn workouts(&self) -> Vec<Workout> {
        self.state.read().await.workouts.clone()
    }

    /// Cached record by id
    pub async fn get(&self, workout_id: &str) -> Option<Workout> {
        self.state
            .read()
            .await
            .workouts
            .iter()
            .find(|w| w.workout_id == workout_id)
            .cloned()
    }

    pub async fn stats(&self) -> WorkoutStats {
        self.state.read().await.stats.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.state.write().await.error = error;
    }

    pub async fn snapshot(&self) -> WorkoutSnapshot {
        let state = self.state.read().await;
        WorkoutSnapshot {
            user: state.user.clone(),
            workouts: state.workouts.clone(),
            stats: state.stats.clone(),
            loading: self.is_loading(),
            error: state.error.clone(),
        }
    }
}

impl Drop for WorkoutStore {
    fn drop(&mut self) {
        if let Some(handle) = self
            .reactor
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
