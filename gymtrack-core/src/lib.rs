//! GymTrack Core - Shared data model and backend seams
//!
//! Defines the workout record model, the error taxonomy, logging and
//! configuration, and the traits every auth provider and document store
//! backend implements.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
