use serde::{Deserialize, Serialize};

/// A logged workout as returned by `/api/workouts`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: i64,
    pub exercise_type: String,
    #[serde(default)]
    pub workout_time: Option<String>,
    pub duration_minutes: i64,
    pub intensity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Raw form input for a new workout.
#[derive(Debug, Clone, Default)]
pub struct WorkoutDraft {
    pub exercise_type: String,
    pub duration_minutes: String,
    /// 1 to 10
    pub intensity: String,
    pub notes: String,
}

/// Body of `POST /api/workouts`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub exercise_type: String,
    pub duration_minutes: i64,
    pub intensity: i64,
    pub notes: String,
}

impl WorkoutDraft {
    pub fn validate(&self) -> Result<NewWorkout, String> {
        let duration_minutes = match self.duration_minutes.trim().parse::<i64>() {
            Ok(v) if v > 0 => v,
            _ => return Err("Duration must be a positive number.".to_string()),
        };
        let intensity = match self.intensity.trim().parse::<i64>() {
            Ok(v) if (1..=10).contains(&v) => v,
            _ => return Err("Intensity must be between 1 and 10.".to_string()),
        };
        if self.exercise_type.trim().is_empty() {
            return Err("Exercise type cannot be blank.".to_string());
        }

        Ok(NewWorkout {
            exercise_type: self.exercise_type.clone(),
            duration_minutes,
            intensity,
            notes: self.notes.clone(),
        })
    }
}
