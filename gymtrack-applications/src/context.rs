//! Application context
//!
//! Owns the session manager and the workout store and wires one to the other.
//! Presentation code receives this explicitly instead of reaching for globals.

use crate::backend::Backend;
use crate::session::SessionManager;
use crate::workouts::{WorkoutService, WorkoutStore};
use gymtrack_core::GymTrackConfig;
use std::sync::Arc;
use tracing::info;

pub struct AppContext {
    config: GymTrackConfig,
    session: Arc<SessionManager>,
    workouts: Arc<WorkoutStore>,
}

impl AppContext {
    /// Start the session listener and attach the workout store to it.
    /// Must be called inside a tokio runtime.
    pub async fn new(config: GymTrackConfig, backend: Backend) -> Self {
        let session = SessionManager::start(backend.auth.clone(), config.client.event_buffer);
        let workouts = Arc::new(WorkoutStore::new(WorkoutService::from_config(
            backend.store.clone(),
            &config,
        )));
        workouts.attach(&session).await;

        info!(
            project_id = %config.backend.project_id,
            collection = workouts.service().collection(),
            "Application context ready"
        );

        Self {
            config,
            session,
            workouts,
        }
    }

    pub fn config(&self) -> &GymTrackConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn workouts(&self) -> &Arc<WorkoutStore> {
        &self.workouts
    }

    /// Stop the background tasks. Cached state stays readable.
    pub fn shutdown(&self) {
        self.workouts.detach();
        self.session.shutdown();
        info!("Application context shut down");
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.workouts.detach();
        self.session.shutdown();
    }
}
