//! Text rendering for the dashboard, workout list and profile

use chrono::{DateTime, Local, Timelike};
use gymtrack_applications::WorkoutStats;
use gymtrack_core::{parse_timestamp, AuthUser, Workout, WorkoutType};
use std::fmt::Write;

const RECENT_LIMIT: usize = 3;
const UID_PREVIEW: usize = 20;

pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 18 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

/// `Tue, Mar 5` in local time; unparseable input is shown as stored
pub fn format_day(date: &str) -> String {
    match parse_timestamp(date) {
        Some(parsed) => parsed.with_timezone(&Local).format("%a, %b %-d").to_string(),
        None => date.to_string(),
    }
}

pub fn format_last_workout(date: Option<&str>) -> String {
    match date {
        Some(date) if !date.is_empty() => format_day(date),
        _ => "No workouts yet".to_string(),
    }
}

/// Local part of the email, or "Athlete"
pub fn display_name(user: Option<&AuthUser>) -> String {
    user.and_then(|u| u.email.as_deref())
        .and_then(|email| email.split('@').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("Athlete")
        .to_string()
}

pub fn uid_preview(uid: &str) -> String {
    format!("{}...", uid.chars().take(UID_PREVIEW).collect::<String>())
}

fn type_icon(workout_type: WorkoutType) -> &'static str {
    match workout_type {
        WorkoutType::Strength => "💪",
        WorkoutType::Cardio => "🏃",
    }
}

/// One-line detail: sets/reps/weight for strength, minutes for cardio
pub fn workout_details(workout: &Workout) -> String {
    let data = &workout.data;
    match data.workout_type {
        WorkoutType::Strength => {
            let mut details = format!("{} sets • {} reps", data.sets, data.reps);
            if data.weight > 0.0 {
                let _ = write!(details, " • {} kg", data.weight);
            }
            details
        }
        WorkoutType::Cardio => format!("{} min", data.duration),
    }
}

pub fn render_dashboard(
    user: Option<&AuthUser>,
    stats: &WorkoutStats,
    workouts: &[Workout],
    now: DateTime<Local>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}! 👋", greeting(now.hour()));
    let _ = writeln!(out, "{}", display_name(user));
    let _ = writeln!(out);
    let _ = writeln!(out, "🎯 Total Workouts: {}", stats.total_workouts);
    let _ = writeln!(out, "📅 This Week:      {}", stats.weekly_count);
    let _ = writeln!(
        out,
        "⏱️  Last Workout:   {}",
        format_last_workout(stats.last_workout_date.as_deref())
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Recent Workouts");

    if workouts.is_empty() {
        let _ = writeln!(out, "  🏋️ No workouts yet");
        let _ = writeln!(out, "  Start by adding your first workout!");
    } else {
        for workout in workouts.iter().take(RECENT_LIMIT) {
            let _ = writeln!(
                out,
                "  {} {} ({} • {})",
                type_icon(workout.data.workout_type),
                workout.data.exercise_name,
                workout.data.workout_type,
                format_day(&workout.data.date)
            );
        }
    }
    out
}

pub fn render_list(workouts: &[Workout]) -> String {
    if workouts.is_empty() {
        return "🏋️ No Workouts Yet\nStart logging your exercises to track your progress\n"
            .to_string();
    }

    let mut out = String::from("My Workouts\n");
    for (index, workout) in workouts.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {} - {} - {}  [{}]",
            index + 1,
            type_icon(workout.data.workout_type),
            workout.data.exercise_name,
            workout_details(workout),
            format_day(&workout.data.date),
            workout.workout_id
        );
    }
    out
}

pub fn render_profile(user: Option<&AuthUser>, stats: &WorkoutStats) -> String {
    let email = user.and_then(|u| u.email.as_deref()).unwrap_or("N/A");
    let uid = user
        .map(|u| uid_preview(&u.uid))
        .unwrap_or_else(|| "N/A".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "Hello, Athlete!");
    let _ = writeln!(out);
    let _ = writeln!(out, "📊 Your Stats");
    let _ = writeln!(out, "  Total Workouts: {}", stats.total_workouts);
    let _ = writeln!(out, "  This Week:      {}", stats.weekly_count);
    let _ = writeln!(out);
    let _ = writeln!(out, "👤 Account");
    let _ = writeln!(out, "  Email:   {}", email);
    let _ = writeln!(out, "  User ID: {}", uid);
    let _ = writeln!(out);
    let _ = writeln!(out, "ℹ️  App Info");
    let _ = writeln!(out, "  Version: {}", env!("CARGO_PKG_VERSION"));
    out
}
