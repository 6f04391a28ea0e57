//! Session Management Module
//!
//! Mirrors the auth provider's signed-in user and publishes every change to
//! interested components.

pub mod manager;
pub mod messages;
pub mod types;

pub use manager::SessionManager;
pub use messages::{message_for_code, AuthErrorKind};
pub use types::*;
