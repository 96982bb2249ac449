//! Workout aggregates and their copy-and-replace mutations
//!
//! A [`Workout`] owns its exercises, and each [`Exercise`] owns its sets. Both
//! collections keep insertion order. The mutation helpers at the bottom of
//! this module never touch their input: they return an updated copy or a
//! [`WorkoutError`], so a failed mutation leaves nothing half-applied.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ── Workout types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Running,
    Cycling,
    Weightlifting,
    Bodyweight,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 4] = [
        WorkoutType::Running,
        WorkoutType::Cycling,
        WorkoutType::Weightlifting,
        WorkoutType::Bodyweight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
            WorkoutType::Weightlifting => "weightlifting",
            WorkoutType::Bodyweight => "bodyweight",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
            WorkoutType::Weightlifting => "Weightlifting",
            WorkoutType::Bodyweight => "Bodyweight",
        }
    }

    /// Estimated energy expenditure in kcal per minute
    pub fn calories_per_minute(&self) -> f64 {
        match self {
            WorkoutType::Running => 10.0,
            WorkoutType::Cycling => 8.0,
            WorkoutType::Weightlifting => 5.0,
            WorkoutType::Bodyweight => 7.0,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkoutType {
    type Err = WorkoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkoutType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or(WorkoutError::InvalidWorkout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Cardio,
    Strength,
    Flexibility,
}

impl ExerciseCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseCategory::Cardio => "Cardio",
            ExerciseCategory::Strength => "Strength",
            ExerciseCategory::Flexibility => "Flexibility",
        }
    }
}

// ── Sets, exercises, workouts ───────────────────────────────────────────────

/// One performed set. Strength sets carry reps/weight, cardio sets carry
/// duration/distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub reps: Option<u32>,
    pub weight_kg: Option<f64>,
    pub duration_secs: Option<f64>,
    pub distance_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl ExerciseSet {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reps: None,
            weight_kg: None,
            duration_secs: None,
            distance_m: None,
            timestamp,
        }
    }

    /// A strength set with reps and an optional load
    pub fn strength(reps: u32, weight_kg: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            reps: Some(reps),
            weight_kg,
            ..Self::new(timestamp)
        }
    }

    /// A cardio set with a duration and an optional distance
    pub fn cardio(duration_secs: f64, distance_m: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            duration_secs: Some(duration_secs),
            distance_m,
            ..Self::new(timestamp)
        }
    }

    pub fn is_strength_set(&self) -> bool {
        self.reps.is_some() || self.weight_kg.is_some()
    }

    pub fn is_cardio_set(&self) -> bool {
        self.duration_secs.is_some() || self.distance_m.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub category: ExerciseCategory,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, category: ExerciseCategory, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            sets: Vec::new(),
            notes: None,
            created_at,
        }
    }

    pub fn with_set(mut self, set: ExerciseSet) -> Self {
        self.sets.push(set);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn total_reps(&self) -> u32 {
        self.sets.iter().filter_map(|s| s.reps).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.sets.iter().filter_map(|s| s.weight_kg).sum()
    }

    pub fn total_duration(&self) -> f64 {
        self.sets.iter().filter_map(|s| s.duration_secs).sum()
    }

    pub fn total_distance(&self) -> f64 {
        self.sets.iter().filter_map(|s| s.distance_m).sum()
    }

    fn set_index(&self, set_id: Uuid) -> Option<usize> {
        self.sets.iter().position(|s| s.id == set_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub workout_type: WorkoutType,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Workout {
    /// Start a new, active workout
    pub fn start(workout_type: WorkoutType, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workout_type,
            start_time,
            end_time: None,
            exercises: Vec::new(),
            notes: None,
            created_at: start_time,
        }
    }

    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    /// Elapsed seconds between start and end, once finished
    pub fn duration(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 1000.0)
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Wall-clock duration when finished, otherwise the summed set durations
    pub fn total_duration(&self) -> f64 {
        self.duration()
            .unwrap_or_else(|| self.exercises.iter().map(Exercise::total_duration).sum())
    }

    pub fn total_distance(&self) -> f64 {
        self.exercises.iter().map(Exercise::total_distance).sum()
    }

    pub fn estimated_calories(&self) -> u32 {
        let minutes = self.total_duration() / 60.0;
        (minutes * self.workout_type.calories_per_minute()) as u32
    }

    fn exercise_index(&self, exercise_id: Uuid) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == exercise_id)
    }

    fn sets(&self) -> impl Iterator<Item = &ExerciseSet> {
        self.exercises.iter().flat_map(|e| e.sets.iter())
    }

    /// Largest set weight in this workout
    pub fn max_set_weight(&self) -> Option<f64> {
        self.sets().filter_map(|s| s.weight_kg).reduce(f64::max)
    }

    /// Longest single set in this workout
    pub fn max_set_duration(&self) -> Option<f64> {
        self.sets().filter_map(|s| s.duration_secs).reduce(f64::max)
    }

    /// Most reps in a single set of this workout
    pub fn max_set_reps(&self) -> Option<u32> {
        self.sets().filter_map(|s| s.reps).max()
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkoutError {
    #[error("Workout not found")]
    WorkoutNotFound,

    #[error("Exercise not found")]
    ExerciseNotFound,

    #[error("Exercise set not found")]
    SetNotFound,

    #[error("Invalid workout data")]
    InvalidWorkout,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl From<crate::storage::PersistenceError> for WorkoutError {
    fn from(err: crate::storage::PersistenceError) -> Self {
        WorkoutError::NetworkError(err.to_string())
    }
}

// ── Copy-and-replace mutations ──────────────────────────────────────────────

/// Append `exercise` to the end of the workout
pub fn add_exercise(workout: &Workout, exercise: Exercise) -> Workout {
    let mut updated = workout.clone();
    updated.exercises.push(exercise);
    updated
}

/// Replace the exercise with the same id, keeping its position
pub fn replace_exercise(workout: &Workout, exercise: Exercise) -> Result<Workout, WorkoutError> {
    let index = workout
        .exercise_index(exercise.id)
        .ok_or(WorkoutError::ExerciseNotFound)?;
    let mut updated = workout.clone();
    updated.exercises[index] = exercise;
    Ok(updated)
}

pub fn remove_exercise(workout: &Workout, exercise_id: Uuid) -> Result<Workout, WorkoutError> {
    let index = workout
        .exercise_index(exercise_id)
        .ok_or(WorkoutError::ExerciseNotFound)?;
    let mut updated = workout.clone();
    updated.exercises.remove(index);
    Ok(updated)
}

/// Append `set` to the exercise identified by `exercise_id`
pub fn add_set(
    workout: &Workout,
    exercise_id: Uuid,
    set: ExerciseSet,
) -> Result<Workout, WorkoutError> {
    let index = workout
        .exercise_index(exercise_id)
        .ok_or(WorkoutError::ExerciseNotFound)?;
    let mut updated = workout.clone();
    updated.exercises[index].sets.push(set);
    Ok(updated)
}

pub fn replace_set(
    workout: &Workout,
    exercise_id: Uuid,
    set: ExerciseSet,
) -> Result<Workout, WorkoutError> {
    let ex = workout
        .exercise_index(exercise_id)
        .ok_or(WorkoutError::ExerciseNotFound)?;
    let idx = workout.exercises[ex]
        .set_index(set.id)
        .ok_or(WorkoutError::SetNotFound)?;
    let mut updated = workout.clone();
    updated.exercises[ex].sets[idx] = set;
    Ok(updated)
}

pub fn remove_set(
    workout: &Workout,
    exercise_id: Uuid,
    set_id: Uuid,
) -> Result<Workout, WorkoutError> {
    let ex = workout
        .exercise_index(exercise_id)
        .ok_or(WorkoutError::ExerciseNotFound)?;
    let idx = workout.exercises[ex]
        .set_index(set_id)
        .ok_or(WorkoutError::SetNotFound)?;
    let mut updated = workout.clone();
    updated.exercises[ex].sets.remove(idx);
    Ok(updated)
}

/// Mark the workout finished at `end_time`
pub fn finish(workout: &Workout, end_time: DateTime<Utc>) -> Result<Workout, WorkoutError> {
    if end_time < workout.start_time {
        return Err(WorkoutError::InvalidWorkout);
    }
    let mut updated = workout.clone();
    updated.end_time = Some(end_time);
    Ok(updated)
}
