//! Core data type definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ProviderError;

/// Collection holding workout records unless configured otherwise
pub const DEFAULT_WORKOUTS_COLLECTION: &str = "workouts";

/// Accepted email shape: `local@host.tld` with no whitespace
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Identity pushed by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
        }
    }
}

/// Authentication status as seen by presentation components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No user is signed in
    Unauthenticated,
    /// Waiting for the provider's first session callback
    Authenticating,
    /// A user is signed in
    Authenticated,
}

/// One notification from the provider's session-change stream
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStateEvent {
    /// Current user, or `None` once signed out
    Changed(Option<AuthUser>),
    /// The subscription itself failed
    Error(ProviderError),
}

/// Workout category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutType {
    #[default]
    Strength,
    Cardio,
}

impl std::fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutType::Strength => write!(f, "Strength"),
            WorkoutType::Cardio => write!(f, "Cardio"),
        }
    }
}

impl std::str::FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(WorkoutType::Strength),
            "cardio" => Ok(WorkoutType::Cardio),
            _ => Err(format!("Unknown workout type: {}", s)),
        }
    }
}

/// User-editable workout fields
///
/// Strength records are described by sets and reps, cardio records by
/// duration; the fields of the other type are usually zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutData {
    pub exercise_name: String,
    #[serde(default)]
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    /// Kilograms
    #[serde(default)]
    pub weight: f64,
    /// Minutes
    #[serde(default)]
    pub duration: u32,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub date: String,
}

impl WorkoutData {
    pub fn strength(exercise_name: impl Into<String>, sets: u32, reps: u32, weight: f64) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            workout_type: WorkoutType::Strength,
            sets,
            reps,
            weight,
            duration: 0,
            date: Utc::now().to_rfc3339(),
        }
    }

    pub fn cardio(exercise_name: impl Into<String>, duration: u32) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            workout_type: WorkoutType::Cardio,
            sets: 0,
            reps: 0,
            weight: 0.0,
            duration,
            date: Utc::now().to_rfc3339(),
        }
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = date.to_rfc3339();
        self
    }

    /// Copy with weight forced into a finite, non-negative value
    pub fn normalized(&self) -> Self {
        let mut data = self.clone();
        if !data.weight.is_finite() || data.weight < 0.0 {
            data.weight = 0.0;
        }
        data
    }

    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

/// Stored workout record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub workout_id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub data: WorkoutData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Workout {
    /// Ordering key: creation time when the store assigned one, else the workout date
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        self.created_at.or_else(|| self.data.parsed_date())
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (taken as UTC midnight)
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Value written to a document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    /// Resolved to the store's clock when the write is applied
    ServerTimestamp,
}

/// Fields of a document write
pub type Fields = BTreeMap<String, FieldValue>;

/// A stored document: its id plus the stored field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}
