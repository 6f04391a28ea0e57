//! Unified error handling system
//!
//! Provides structured error types with context and recovery suggestions. Boundary
//! services flatten these into user-facing result messages; nothing here is shown
//! to the user verbatim except the store and timeout messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type GymTrackResult<T> = Result<T, GymTrackError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Failure reported by an authentication provider.
///
/// `code` follows the provider's `auth/<reason>` convention and is what the
/// session layer maps to user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} ({code})")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Main error type for the GymTrack system
#[derive(Error, Debug)]
pub enum GymTrackError {
    /// Document store or transport failure; the message is surfaced raw
    #[error("{message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Auth {
        code: String,
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ProviderError> for GymTrackError {
    fn from(err: ProviderError) -> Self {
        GymTrackError::Auth {
            context: ErrorContext::new("auth_provider").with_metadata("code", &err.code),
            code: err.code,
            message: err.message,
        }
    }
}

impl GymTrackError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            GymTrackError::Store { context, .. } => Some(context),
            GymTrackError::Auth { context, .. } => Some(context),
            GymTrackError::Config { context, .. } => Some(context),
            GymTrackError::Timeout { context, .. } => Some(context),
            GymTrackError::Validation { context, .. } => Some(context),
            GymTrackError::NotFound { context, .. } => Some(context),
            GymTrackError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Provider code for authentication failures
    pub fn auth_code(&self) -> Option<&str> {
        match self {
            GymTrackError::Auth { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            GymTrackError::Store { .. } => true,
            GymTrackError::Timeout { .. } => true,
            GymTrackError::Auth { code, .. } => {
                code == "auth/network-request-failed" || code == "auth/too-many-requests"
            }
            _ => false,
        }
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            GymTrackError::Store { .. } => Some(1000),
            GymTrackError::Timeout { .. } => Some(2000),
            GymTrackError::Auth { .. } if self.is_recoverable() => Some(5000),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| &c.error_id);
        match self {
            GymTrackError::Internal { .. } => {
                error!(error_id = ?error_id, error = %self, "Internal error occurred");
            }
            GymTrackError::Config { .. } | GymTrackError::Validation { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration or validation error");
            }
            GymTrackError::Auth { code, .. } => {
                warn!(error_id = ?error_id, code = %code, error = %self, "Auth provider rejected request");
            }
            GymTrackError::Store { .. } | GymTrackError::Timeout { .. } => {
                warn!(
                    error_id = ?error_id,
                    error = %self,
                    "Store or timeout error (may be recoverable)"
                );
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! store_error {
    ($msg:expr, $component:expr) => {
        $crate::GymTrackError::Store {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::GymTrackError::Store {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::GymTrackError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'gymtrack config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::GymTrackError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::GymTrackError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Refresh the workout list and try again"),
        }
    };
}
