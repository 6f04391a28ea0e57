//! GymTrack Applications - session and workout state built on gymtrack-core
//!
//! - **Session** ([`session`]): mirrors the auth provider's signed-in user and
//!   publishes changes as [`SessionEvent`]s
//! - **Workouts** ([`workouts`]): record service, statistics and the
//!   user-scoped [`WorkoutStore`] that follows the session
//! - **Backend** ([`backend`]): in-process auth provider and document store
//!
//! [`AppContext`] wires the pieces together for a presentation layer.

pub mod backend;
pub mod context;
pub mod session;
pub mod workouts;

pub use backend::{Backend, MemoryAuthProvider, MemoryDocumentStore};
pub use context::AppContext;
pub use session::{
    message_for_code, AuthErrorKind, AuthResult, SessionEvent, SessionManager, SessionSnapshot,
};
pub use workouts::{
    sort_workouts, ServiceResult, WorkoutService, WorkoutSnapshot, WorkoutStats, WorkoutStore,
};

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Core error: {0}")]
    Core(#[from] gymtrack_core::GymTrackError),

    #[error("{message}")]
    Operation { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create an operation error carrying a user-facing message
    pub fn operation<S: Into<String>>(message: S) -> Self {
        Self::Operation {
            message: message.into(),
        }
    }

    /// Turn a failed [`ServiceResult`] into an error, passing successes through
    pub fn check(result: ServiceResult) -> ApplicationResult<ServiceResult> {
        if result.success {
            Ok(result)
        } else {
            Err(Self::operation(
                result.error.unwrap_or_else(|| "An error occurred".to_string()),
            ))
        }
    }

    /// Same as [`ApplicationError::check`] for session calls
    pub fn check_auth(result: AuthResult) -> ApplicationResult<()> {
        match result.error {
            Some(message) if !result.success => Err(Self::operation(message)),
            _ if !result.success => Err(Self::operation("An error occurred")),
            _ => Ok(()),
        }
    }
}
