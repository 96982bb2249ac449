//! Aggregated workout statistics and personal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workout::Workout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    LongestDuration,
    FurthestDistance,
    HeaviestWeight,
    MostReps,
}

impl RecordType {
    pub fn display_name(&self) -> &'static str {
        match self {
            RecordType::LongestDuration => "Longest Duration",
            RecordType::FurthestDistance => "Furthest Distance",
            RecordType::HeaviestWeight => "Heaviest Weight",
            RecordType::MostReps => "Most Reps",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            RecordType::LongestDuration => "seconds",
            RecordType::FurthestDistance => "meters",
            RecordType::HeaviestWeight => "kg",
            RecordType::MostReps => "reps",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: Uuid,
    pub record_type: RecordType,
    #[serde(default)]
    pub exercise: Option<String>,
    pub value: f64,
    pub unit: String,
    pub date: DateTime<Utc>,
}

impl PersonalRecord {
    fn new(record_type: RecordType, value: f64, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            record_type,
            exercise: None,
            value,
            unit: record_type.unit().to_string(),
            date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_duration: f64,
    pub total_distance: f64,
    pub total_calories: u32,
    pub average_workout_duration: f64,
    pub personal_records: Vec<PersonalRecord>,
}

impl WorkoutStats {
    /// Aggregate a set of workouts.
    ///
    /// Records are emitted in a fixed order (heaviest weight, longest
    /// duration, furthest distance, most reps). Each is dated with the start
    /// time of the first workout, in iteration order, that holds the record.
    pub fn from_workouts(workouts: &[Workout]) -> Self {
        if workouts.is_empty() {
            return Self::default();
        }

        let total_workouts = workouts.len();
        let total_duration: f64 = workouts.iter().map(Workout::total_duration).sum();
        let total_distance: f64 = workouts.iter().map(Workout::total_distance).sum();
        let total_calories: u32 = workouts.iter().map(Workout::estimated_calories).sum();

        let mut personal_records = Vec::new();

        if let Some(record) = best(workouts, Workout::max_set_weight, RecordType::HeaviestWeight) {
            personal_records.push(record);
        }
        if let Some(record) = best(workouts, Workout::max_set_duration, RecordType::LongestDuration) {
            personal_records.push(record);
        }
        if let Some(record) = best(
            workouts,
            |w| Some(w.total_distance()).filter(|d| *d > 0.0),
            RecordType::FurthestDistance,
        ) {
            personal_records.push(record);
        }
        if let Some(record) = best(
            workouts,
            |w| w.max_set_reps().map(f64::from),
            RecordType::MostReps,
        ) {
            personal_records.push(record);
        }

        Self {
            total_workouts,
            total_duration,
            total_distance,
            total_calories,
            average_workout_duration: total_duration / total_workouts as f64,
            personal_records,
        }
    }
}

/// First workout holding the maximum of `metric`, as a record.
///
/// A strict `>` keeps the earliest workout on ties.
fn best<F>(workouts: &[Workout], metric: F, record_type: RecordType) -> Option<PersonalRecord>
where
    F: Fn(&Workout) -> Option<f64>,
{
    let mut best: Option<(f64, DateTime<Utc>)> = None;
    for workout in workouts {
        let Some(value) = metric(workout) else {
            continue;
        };
        match best {
            Some((current, _)) if value <= current => {}
            _ => best = Some((value, workout.start_time)),
        }
    }
    best.map(|(value, date)| PersonalRecord::new(record_type, value, date))
}
