//! Curated exercise catalog used by exercise search

use chrono::{DateTime, Utc};

use crate::workout::{Exercise, ExerciseCategory};

/// Number of entries returned for an empty query
pub const DEFAULT_RESULT_COUNT: usize = 10;

const CATALOG: &[(&str, ExerciseCategory)] = &[
    ("Running", ExerciseCategory::Cardio),
    ("Cycling", ExerciseCategory::Cardio),
    ("Swimming", ExerciseCategory::Cardio),
    ("Rowing", ExerciseCategory::Cardio),
    ("Jumping Jacks", ExerciseCategory::Cardio),
    ("Squat", ExerciseCategory::Strength),
    ("Deadlift", ExerciseCategory::Strength),
    ("Bench Press", ExerciseCategory::Strength),
    ("Overhead Press", ExerciseCategory::Strength),
    ("Barbell Row", ExerciseCategory::Strength),
    ("Pull-ups", ExerciseCategory::Strength),
    ("Dips", ExerciseCategory::Strength),
    ("Push-ups", ExerciseCategory::Strength),
    ("Lunges", ExerciseCategory::Strength),
    ("Bicep Curls", ExerciseCategory::Strength),
    ("Tricep Extensions", ExerciseCategory::Strength),
    ("Plank", ExerciseCategory::Flexibility),
    ("Yoga", ExerciseCategory::Flexibility),
    ("Stretching", ExerciseCategory::Flexibility),
    ("Pilates", ExerciseCategory::Flexibility),
];

/// Number of exercises in the catalog
pub fn len() -> usize {
    CATALOG.len()
}

/// Search the catalog by exercise name or category name (case-insensitive).
///
/// An empty query returns the first [`DEFAULT_RESULT_COUNT`] entries. Each
/// result is a fresh [`Exercise`] with no sets, stamped `created_at`.
pub fn search(query: &str, created_at: DateTime<Utc>) -> Vec<Exercise> {
    let query = query.trim().to_lowercase();
    let matches = |(name, category): &&(&str, ExerciseCategory)| {
        name.to_lowercase().contains(&query)
            || category.display_name().to_lowercase().contains(&query)
    };

    let entries: Vec<_> = if query.is_empty() {
        CATALOG.iter().take(DEFAULT_RESULT_COUNT).collect()
    } else {
        CATALOG.iter().filter(matches).collect()
    };

    entries
        .into_iter()
        .map(|(name, category)| Exercise::new(*name, *category, created_at))
        .collect()
}
