//! Form validation for the shell prompts
//!
//! Input is checked here before anything reaches the session manager or the
//! workout store.

use chrono::{Local, NaiveDate, TimeZone};
use gymtrack_core::{
    validation_error, GymTrackError, GymTrackResult, WorkoutData, WorkoutType, EMAIL_PATTERN,
};
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

pub fn is_valid_email(email: &str) -> bool {
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));
    regex.is_match(email)
}

/// Message to show for a form error
pub fn form_message(error: &GymTrackError) -> String {
    match error {
        GymTrackError::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

pub fn validate_login(email: &str, password: &str) -> GymTrackResult<()> {
    if email.trim().is_empty() {
        return Err(validation_error!("Please enter your email", "email", "login_form"));
    }
    if password.is_empty() {
        return Err(validation_error!("Please enter your password", "password", "login_form"));
    }
    if !is_valid_email(email) {
        return Err(validation_error!(
            "Please enter a valid email address",
            "email",
            "login_form"
        ));
    }
    Ok(())
}

pub fn validate_registration(email: &str, password: &str, confirm: &str) -> GymTrackResult<()> {
    if email.trim().is_empty() {
        return Err(validation_error!("Please enter your email", "email", "register_form"));
    }
    if password.is_empty() {
        return Err(validation_error!("Please enter a password", "password", "register_form"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(validation_error!(
            "Password must be at least 6 characters",
            "password",
            "register_form"
        ));
    }
    if password != confirm {
        return Err(validation_error!(
            "Passwords do not match",
            "confirm_password",
            "register_form"
        ));
    }
    if !is_valid_email(email) {
        return Err(validation_error!(
            "Please enter a valid email address",
            "email",
            "register_form"
        ));
    }
    Ok(())
}

/// Raw text collected by the add/edit prompts
#[derive(Debug, Clone, Default)]
pub struct WorkoutForm {
    pub exercise_name: String,
    pub workout_type: WorkoutType,
    pub sets: String,
    pub reps: String,
    pub weight: String,
    pub duration: String,
    /// `YYYY-MM-DD`; empty means today
    pub date: String,
}

impl WorkoutForm {
    /// Prefill from an existing record
    pub fn from_data(data: &WorkoutData) -> Self {
        let number = |value: u32| if value == 0 { String::new() } else { value.to_string() };
        Self {
            exercise_name: data.exercise_name.clone(),
            workout_type: data.workout_type,
            sets: number(data.sets),
            reps: number(data.reps),
            weight: if data.weight > 0.0 {
                data.weight.to_string()
            } else {
                String::new()
            },
            duration: number(data.duration),
            date: data
                .parsed_date()
                .map(|date| date.with_timezone(&Local).format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and convert into a record. Unparseable numbers count as zero.
    pub fn into_workout(self) -> GymTrackResult<WorkoutData> {
        let exercise_name = self.exercise_name.trim().to_string();
        if exercise_name.is_empty() {
            return Err(validation_error!(
                "Please enter an exercise name",
                "exercise_name",
                "workout_form"
            ));
        }

        match self.workout_type {
            WorkoutType::Strength if self.sets.trim().is_empty() || self.reps.trim().is_empty() => {
                return Err(validation_error!(
                    "Please enter sets and reps for strength training",
                    "sets",
                    "workout_form"
                ));
            }
            WorkoutType::Cardio if self.duration.trim().is_empty() => {
                return Err(validation_error!(
                    "Please enter duration for cardio",
                    "duration",
                    "workout_form"
                ));
            }
            _ => {}
        }

        let date = parse_form_date(&self.date)?;

        Ok(WorkoutData {
            exercise_name,
            workout_type: self.workout_type,
            sets: parse_count(&self.sets),
            reps: parse_count(&self.reps),
            weight: self.weight.trim().parse::<f64>().unwrap_or(0.0),
            duration: parse_count(&self.duration),
            date,
        })
    }
}

fn parse_count(input: &str) -> u32 {
    input.trim().parse().unwrap_or(0)
}

/// `YYYY-MM-DD` at local midnight as RFC 3339, or now when empty
fn parse_form_date(input: &str) -> GymTrackResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Local::now().to_rfc3339());
    }

    let invalid = || validation_error!("Please enter the date as YYYY-MM-DD", "date", "workout_form");
    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight = day.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(invalid)?;
    Ok(local.to_rfc3339())
}
