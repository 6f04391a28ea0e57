//! Workout records: remote service, derived statistics and the user-scoped store

pub mod service;
pub mod stats;
pub mod store;

pub use service::{sort_workouts, ServiceResult, WorkoutService};
pub use stats::WorkoutStats;
pub use store::{WorkoutSnapshot, WorkoutStore};
