//! Provider error codes and the messages shown for them

use serde::{Deserialize, Serialize};

/// Known provider failure reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthErrorKind {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    TooManyRequests,
    NetworkRequestFailed,
    /// Anything the table does not know
    Other,
}

impl AuthErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthErrorKind::EmailAlreadyInUse,
            "auth/invalid-email" => AuthErrorKind::InvalidEmail,
            "auth/weak-password" => AuthErrorKind::WeakPassword,
            "auth/user-not-found" => AuthErrorKind::UserNotFound,
            "auth/wrong-password" => AuthErrorKind::WrongPassword,
            "auth/invalid-credential" => AuthErrorKind::InvalidCredential,
            "auth/too-many-requests" => AuthErrorKind::TooManyRequests,
            "auth/network-request-failed" => AuthErrorKind::NetworkRequestFailed,
            _ => AuthErrorKind::Other,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorKind::EmailAlreadyInUse => "This email is already registered",
            AuthErrorKind::InvalidEmail => "Invalid email address",
            AuthErrorKind::WeakPassword => "Password should be at least 6 characters",
            AuthErrorKind::UserNotFound => "No account found with this email",
            AuthErrorKind::WrongPassword => "Incorrect password",
            AuthErrorKind::InvalidCredential => "Invalid email or password",
            AuthErrorKind::TooManyRequests => "Too many attempts. Please try again later",
            AuthErrorKind::NetworkRequestFailed => "Network error. Please check your connection",
            AuthErrorKind::Other => "An error occurred. Please try again",
        }
    }
}

/// User-facing text for a provider error code
pub fn message_for_code(code: &str) -> &'static str {
    AuthErrorKind::from_code(code).user_message()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(message_for_code("auth/wrong-password"), "Incorrect password");
        assert_eq!(
            message_for_code("auth/email-already-in-use"),
            "This email is already registered"
        );
        assert_eq!(
            message_for_code("auth/network-request-failed"),
            "Network error. Please check your connection"
        );
        assert_eq!(
            message_for_code("auth/invalid-credential"),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        assert_eq!(AuthErrorKind::from_code("auth/quota-exceeded"), AuthErrorKind::Other);
        assert_eq!(message_for_code(""), "An error occurred. Please try again");
    }
}
