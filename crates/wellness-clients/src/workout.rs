//! Workout client: CRUD over workout aggregates
//!
//! Every mutation loads the owning workout, applies a copy-and-replace
//! change from [`wellness_core::workout`] and writes the whole collection
//! back. A failed mutation writes nothing. Both implementations share this
//! logic through [`WorkoutStore`]; they differ only in where the collection
//! lives.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;
use wellness_core::workout::{self as ops};
use wellness_core::{
    catalog, Exercise, ExerciseCategory, ExerciseSet, StorageType, Workout, WorkoutError,
    WorkoutStats, WorkoutType,
};

use crate::date::DateClient;
use crate::persistence::{get_json, set_json, PersistenceClient};
use crate::sync::Locked;

/// Persistence key of the live workout collection
pub const WORKOUTS_KEY: &str = "workouts";

#[async_trait]
pub trait WorkoutClient: Send + Sync {
    async fn create_workout(&self, workout_type: WorkoutType) -> Result<Workout, WorkoutError>;

    /// Replace a stored workout with the same id
    async fn update_workout(&self, workout: Workout) -> Result<Workout, WorkoutError>;

    async fn finish_workout(
        &self,
        workout_id: Uuid,
        end_time: DateTime<Utc>,
    ) -> Result<Workout, WorkoutError>;

    async fn delete_workout(&self, workout_id: Uuid) -> Result<(), WorkoutError>;

    async fn workout(&self, workout_id: Uuid) -> Option<Workout>;

    async fn all_workouts(&self) -> Vec<Workout>;

    /// Workouts whose start time lies in `[start, end]`
    async fn workouts_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Workout>;

    /// The most recently started unfinished workout
    async fn active_workout(&self) -> Option<Workout>;

    async fn add_exercise(
        &self,
        workout_id: Uuid,
        exercise: Exercise,
    ) -> Result<Exercise, WorkoutError>;

    async fn update_exercise(
        &self,
        workout_id: Uuid,
        exercise: Exercise,
    ) -> Result<Exercise, WorkoutError>;

    async fn delete_exercise(&self, workout_id: Uuid, exercise_id: Uuid)
        -> Result<(), WorkoutError>;

    async fn add_set(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        set: ExerciseSet,
    ) -> Result<ExerciseSet, WorkoutError>;

    async fn update_set(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        set: ExerciseSet,
    ) -> Result<ExerciseSet, WorkoutError>;

    async fn delete_set(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        set_id: Uuid,
    ) -> Result<(), WorkoutError>;

    async fn workout_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> WorkoutStats;

    async fn search_exercises(&self, query: &str) -> Vec<Exercise>;
}

/// Where a workout collection is kept
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Workout>, WorkoutError>;

    async fn save(&self, workouts: Vec<Workout>) -> Result<(), WorkoutError>;

    fn clock(&self) -> &dyn DateClient;

    /// Serializes load-modify-save cycles
    fn write_lock(&self) -> &Mutex<()>;

    /// Load for a read-only query; failures read as an empty collection
    async fn load_or_empty(&self) -> Vec<Workout> {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load workouts: {}", e);
            Vec::new()
        })
    }

    /// Apply `change` to the workout `workout_id` and save on success
    async fn modify<F>(&self, workout_id: Uuid, change: F) -> Result<Workout, WorkoutError>
    where
        F: FnOnce(&Workout) -> Result<Workout, WorkoutError> + Send,
    {
        let _guard = self.write_lock().lock().await;
        let mut workouts = self.load().await?;
        let index = workouts
            .iter()
            .position(|w| w.id == workout_id)
            .ok_or(WorkoutError::WorkoutNotFound)?;
        let updated = change(&workouts[index])?;
        workouts[index] = updated.clone();
        self.save(workouts).await?;
        Ok(updated)
    }
}

#[async_trait]
impl<S: WorkoutStore> WorkoutClient for S {
    async fn create_workout(&self, workout_type: WorkoutType) -> Result<Workout, WorkoutError> {
        let workout = Workout::start(workout_type, self.clock().now());
        let _guard = self.write_lock().lock().await;
        let mut workouts = self.load().await?;
        workouts.push(workout.clone());
        self.save(workouts).await?;
        tracing::debug!("Created {} workout {}", workout_type, workout.id);
        Ok(workout)
    }

    async fn update_workout(&self, workout: Workout) -> Result<Workout, WorkoutError> {
        let replacement = workout.clone();
        self.modify(workout.id, move |_| Ok(replacement)).await?;
        Ok(workout)
    }

    async fn finish_workout(
        &self,
        workout_id: Uuid,
        end_time: DateTime<Utc>,
    ) -> Result<Workout, WorkoutError> {
        self.modify(workout_id, |w| ops::finish(w, end_time)).await
    }

    async fn delete_workout(&self, workout_id: Uuid) -> Result<(), WorkoutError> {
        let _guard = self.write_lock().lock().await;
        let mut workouts = self.load().await?;
        let before = workouts.len();
        workouts.retain(|w| w.id != workout_id);
        if workouts.len() == before {
            return Err(WorkoutError::WorkoutNotFound);
        }
        self.save(workouts).await
    }

    async fn workout(&self, workout_id: Uuid) -> Option<Workout> {
        self.load_or_empty()
            .await
            .into_iter()
            .find(|w| w.id == workout_id)
    }

    async fn all_workouts(&self) -> Vec<Workout> {
        self.load_or_empty().await
    }

    async fn workouts_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Workout> {
        self.load_or_empty()
            .await
            .into_iter()
            .filter(|w| w.start_time >= start && w.start_time <= end)
            .collect()
    }

    async fn active_workout(&self) -> Option<Workout> {
        self.load_or_empty()
            .await
            .into_iter()
            .filter(Workout::is_active)
            .max_by_key(|w| w.start_time)
    }

    async fn add_exercise(
        &self,
        workout_id: Uuid,
        exercise: Exercise,
    ) -> Result<Exercise, WorkoutError> {
        let added = exercise.clone();
        self.modify(workout_id, move |w| Ok(ops::add_exercise(w, added)))
            .await?;
        Ok(exercise)
    }

    async fn update_exercise(
        &self,
        workout_id: Uuid,
        exercise: Exercise,
    ) -> Result<Exercise, WorkoutError> {
        let replacement = exercise.clone();
        self.modify(workout_id, move |w| ops::replace_exercise(w, replacement))
            .await?;
        Ok(exercise)
    }

    async fn delete_exercise(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<(), WorkoutError> {
        self.modify(workout_id, |w| ops::remove_exercise(w, exercise_id))
            .await
            .map(drop)
    }

    async fn add_set(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        set: ExerciseSet,
    ) -> Result<ExerciseSet, WorkoutError> {
        let added = set.clone();
        self.modify(workout_id, move |w| ops::add_set(w, exercise_id, added))
            .await?;
        Ok(set)
    }

    async fn update_set(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        set: ExerciseSet,
    ) -> Result<ExerciseSet, WorkoutError> {
        let replacement = set.clone();
        self.modify(workout_id, move |w| ops::replace_set(w, exercise_id, replacement))
            .await?;
        Ok(set)
    }

    async fn delete_set(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        set_id: Uuid,
    ) -> Result<(), WorkoutError> {
        self.modify(workout_id, |w| ops::remove_set(w, exercise_id, set_id))
            .await
            .map(drop)
    }

    async fn workout_stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> WorkoutStats {
        WorkoutStats::from_workouts(&self.workouts_in_range(start, end).await)
    }

    async fn search_exercises(&self, query: &str) -> Vec<Exercise> {
        catalog::search(query, self.clock().now())
    }
}

// ── Live ────────────────────────────────────────────────────────────────────

/// Keeps the collection as JSON in `Database` persistence
pub struct LiveWorkoutClient {
    persistence: Arc<dyn PersistenceClient>,
    date: Arc<dyn DateClient>,
    lock: Mutex<()>,
}

impl LiveWorkoutClient {
    pub fn new(persistence: Arc<dyn PersistenceClient>, date: Arc<dyn DateClient>) -> Self {
        Self {
            persistence,
            date,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl WorkoutStore for LiveWorkoutClient {
    async fn load(&self) -> Result<Vec<Workout>, WorkoutError> {
        let stored: Option<Vec<Workout>> =
            get_json(self.persistence.as_ref(), WORKOUTS_KEY, StorageType::Database).await?;
        Ok(stored.unwrap_or_default())
    }

    async fn save(&self, workouts: Vec<Workout>) -> Result<(), WorkoutError> {
        set_json(
            self.persistence.as_ref(),
            WORKOUTS_KEY,
            Some(&workouts),
            StorageType::Database,
        )
        .await?;
        Ok(())
    }

    fn clock(&self) -> &dyn DateClient {
        self.date.as_ref()
    }

    fn write_lock(&self) -> &Mutex<()> {
        &self.lock
    }
}

// ── Mock ────────────────────────────────────────────────────────────────────

/// Keeps the collection in memory
pub struct MockWorkoutClient {
    workouts: Locked<Vec<Workout>>,
    saves: Locked<usize>,
    date: Arc<dyn DateClient>,
    lock: Mutex<()>,
}

impl MockWorkoutClient {
    pub fn new(date: Arc<dyn DateClient>) -> Self {
        Self {
            workouts: Locked::default(),
            saves: Locked::default(),
            date,
            lock: Mutex::new(()),
        }
    }

    /// Seed with a few finished workouts from the previous three days
    pub fn with_sample_data(self) -> Self {
        let now = self.date.now();
        self.workouts.set(sample_workouts(now));
        self
    }

    /// Number of times the collection was written back
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

#[async_trait]
impl WorkoutStore for MockWorkoutClient {
    async fn load(&self) -> Result<Vec<Workout>, WorkoutError> {
        Ok(self.workouts.get())
    }

    async fn save(&self, workouts: Vec<Workout>) -> Result<(), WorkoutError> {
        self.workouts.set(workouts);
        self.saves.with(|n| *n += 1);
        Ok(())
    }

    fn clock(&self) -> &dyn DateClient {
        self.date.as_ref()
    }

    fn write_lock(&self) -> &Mutex<()> {
        &self.lock
    }
}

fn finished(
    workout_type: WorkoutType,
    start: DateTime<Utc>,
    minutes: i64,
    exercises: Vec<Exercise>,
) -> Workout {
    Workout {
        end_time: Some(start + TimeDelta::minutes(minutes)),
        exercises,
        ..Workout::start(workout_type, start)
    }
}

fn strength(name: &str, sets: &[(u32, Option<f64>)], at: DateTime<Utc>) -> Exercise {
    sets.iter().fold(
        Exercise::new(name, ExerciseCategory::Strength, at),
        |exercise, (reps, weight)| exercise.with_set(ExerciseSet::strength(*reps, *weight, at)),
    )
}

fn sample_workouts(now: DateTime<Utc>) -> Vec<Workout> {
    let day = TimeDelta::days(1);
    let run_start = now - day;
    let lift_start = now - day * 2;
    let body_start = now - day * 3;

    let plank = [60.0, 45.0, 30.0].into_iter().fold(
        Exercise::new("Plank", ExerciseCategory::Flexibility, body_start),
        |exercise, secs| exercise.with_set(ExerciseSet::cardio(secs, None, body_start)),
    );

    vec![
        finished(
            WorkoutType::Running,
            run_start,
            30,
            vec![Exercise::new("Morning Run", ExerciseCategory::Cardio, run_start)
                .with_set(ExerciseSet::cardio(1800.0, Some(5000.0), run_start))],
        ),
        finished(
            WorkoutType::Weightlifting,
            lift_start,
            60,
            vec![
                strength(
                    "Deadlift",
                    &[(5, Some(100.0)), (5, Some(100.0)), (5, Some(100.0))],
                    lift_start,
                ),
                strength("Pull-ups", &[(10, None), (8, None), (6, None)], lift_start),
            ],
        ),
        finished(
            WorkoutType::Bodyweight,
            body_start,
            60,
            vec![
                strength("Push-ups", &[(20, None), (15, None), (12, None)], body_start),
                plank,
            ],
        ),
    ]
}
