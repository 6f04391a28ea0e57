//! Session Types

use gymtrack_core::{AuthUser, SessionStatus};
use serde::{Deserialize, Serialize};

/// Outcome of register/login/logout.
///
/// Describes only whether the provider call succeeded; the signed-in user
/// arrives separately as a [`SessionEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Notification published to session subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(AuthUser),
    SignedOut,
    /// The provider subscription reported an error; the session is unchanged
    ListenerError(String),
}

impl SessionEvent {
    pub fn from_user(user: Option<AuthUser>) -> Self {
        match user {
            Some(user) => SessionEvent::SignedIn(user),
            None => SessionEvent::SignedOut,
        }
    }
}

/// Current session state as read by presentation components
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    /// True until the provider's first callback arrives
    pub loading: bool,
    /// A register or login call is in flight
    pub authenticating: bool,
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            authenticating: false,
            error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        if self.user.is_some() {
            SessionStatus::Authenticated
        } else if self.loading || self.authenticating {
            SessionStatus::Authenticating
        } else {
            SessionStatus::Unauthenticated
        }
    }
}
