//! Derived workout statistics

use chrono::{DateTime, Duration, Utc};
use gymtrack_core::Workout;
use serde::{Deserialize, Serialize};

/// Aggregates shown on the dashboard and profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_workouts: usize,
    /// `date` of the most recently dated record, as stored
    pub last_workout_date: Option<String>,
    /// Records dated within the trailing seven days
    pub weekly_count: usize,
}

impl WorkoutStats {
    /// Recompute every aggregate from scratch
    pub fn compute(workouts: &[Workout], now: DateTime<Utc>) -> Self {
        let one_week_ago = now - Duration::days(7);

        let weekly_count = workouts
            .iter()
            .filter_map(|w| w.data.parsed_date())
            .filter(|date| *date >= one_week_ago)
            .count();

        // First record wins on equal dates
        let last_workout_date = workouts
            .iter()
            .filter_map(|w| w.data.parsed_date().map(|date| (date, &w.data.date)))
            .fold(None::<(DateTime<Utc>, &String)>, |latest, candidate| match latest {
                Some(current) if current.0 >= candidate.0 => Some(current),
                _ => Some(candidate),
            })
            .map(|(_, raw)| raw.clone());

        Self {
            total_workouts: workouts.len(),
            last_workout_date,
            weekly_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymtrack_core::WorkoutData;

    fn dated(id: &str, date: String) -> Workout {
        Workout {
            workout_id: id.to_string(),
            user_id: "u1".to_string(),
            data: WorkoutData {
                date,
                ..WorkoutData::cardio("Run", 30)
            },
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_two_and_ten_days_ago() {
        let now = Utc::now();
        let recent = (now - Duration::days(2)).to_rfc3339();
        let workouts = vec![
            dated("a", (now - Duration::days(10)).to_rfc3339()),
            dated("b", recent.clone()),
        ];

        let stats = WorkoutStats::compute(&workouts, now);
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.weekly_count, 1);
        assert_eq!(stats.last_workout_date, Some(recent));
    }

    #[test]
    fn test_empty() {
        assert_eq!(WorkoutStats::compute(&[], Utc::now()), WorkoutStats::default());
    }

    #[test]
    fn test_week_boundary_is_inclusive() {
        let now = Utc::now();
        let workouts = vec![
            dated("edge", (now - Duration::days(7)).to_rfc3339()),
            dated("outside", (now - Duration::days(7) - Duration::seconds(1)).to_rfc3339()),
        ];
        assert_eq!(WorkoutStats::compute(&workouts, now).weekly_count, 1);
    }

    #[test]
    fn test_unparseable_dates_are_counted_but_not_dated() {
        let now = Utc::now();
        let workouts = vec![dated("x", "someday".to_string())];

        let stats = WorkoutStats::compute(&workouts, now);
        assert_eq!(stats.total_workouts, 1);
        assert_eq!(stats.weekly_count, 0);
        assert_eq!(stats.last_workout_date, None);
    }

    #[test]
    fn test_bare_dates() {
        let now = Utc::now();
        let today = now.format("%Y-%m-%d").to_string();
        let workouts = vec![
            dated("old", "2001-01-01".to_string()),
            dated("today", today.clone()),
        ];

        let stats = WorkoutStats::compute(&workouts, now);
        assert_eq!(stats.last_workout_date, Some(today));
        assert_eq!(stats.weekly_count, 1);
    }
}
