use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Work duration used when neither the exercise nor the workout sets one.
pub const FALLBACK_WORK_SECONDS: u64 = 30;

fn default_work_seconds() -> u64 {
    FALLBACK_WORK_SECONDS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_tips: Option<String>,
    /// Illustration asset name (`svgFile` in the descriptor).
    #[serde(
        default,
        rename = "svgFile",
        alias = "illustrationRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub illustration_ref: Option<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration_seconds: None,
            form_tips: None,
            illustration_ref: None,
        }
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}

/// A workout descriptor as shipped in `data/workouts/*.json`.
///
/// Immutable for the duration of a timer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default = "default_work_seconds")]
    pub default_work_seconds: u64,
}

/// One card of the preview carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PreviewCard {
    Exercise {
        /// 1-based position in the workout.
        number: usize,
        name: String,
        seconds: u64,
        form_tips: Option<String>,
        illustration: Option<String>,
    },
    Rest {
        seconds: u64,
    },
}

impl WorkoutDefinition {
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            exercises,
            default_work_seconds: FALLBACK_WORK_SECONDS,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fails with `NoWorkoutLoaded` unless there is at least one exercise.
    pub fn validate(&self) -> Result<()> {
        if self.exercises.is_empty() {
            return Err(CoreError::NoWorkoutLoaded);
        }
        Ok(())
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Workout"
        } else {
            &self.name
        }
    }

    /// Work seconds for exercise `index`: its own duration, else the workout
    /// default, else [`FALLBACK_WORK_SECONDS`]. Zero counts as unset.
    pub fn work_seconds(&self, index: usize) -> u64 {
        self.exercises
            .get(index)
            .and_then(|ex| ex.duration_seconds)
            .filter(|&secs| secs > 0)
            .or_else(|| Some(self.default_work_seconds).filter(|&secs| secs > 0))
            .unwrap_or(FALLBACK_WORK_SECONDS)
    }

    /// Exercise name with an `Exercise N` fallback for blank entries.
    pub fn exercise_name(&self, index: usize) -> String {
        match self.exercises.get(index) {
            Some(ex) if !ex.name.trim().is_empty() => ex.name.clone(),
            _ => format!("Exercise {}", index + 1),
        }
    }

    pub fn total_work_seconds(&self) -> u64 {
        (0..self.exercises.len())
            .map(|i| self.work_seconds(i))
            .fold(0, u64::saturating_add)
    }

    /// `prepare + sum(work) + rest * max(0, n - 1)`.
    pub fn estimated_total_seconds(&self, rest_seconds: u64, pre_workout_seconds: u64) -> u64 {
        let rests = self.exercises.len().saturating_sub(1) as u64;
        pre_workout_seconds
            .saturating_add(self.total_work_seconds())
            .saturating_add(rest_seconds.saturating_mul(rests))
    }

    /// Cards in carousel order: each exercise, with a rest card between
    /// consecutive exercises when rest is enabled.
    pub fn preview(&self, rest_seconds: u64) -> Vec<PreviewCard> {
        let mut cards = Vec::with_capacity(self.exercises.len() * 2);
        for (index, ex) in self.exercises.iter().enumerate() {
            cards.push(PreviewCard::Exercise {
                number: index + 1,
                name: self.exercise_name(index),
                seconds: self.work_seconds(index),
                form_tips: ex.form_tips.clone(),
                illustration: ex.illustration_ref.clone(),
            });
            if index + 1 < self.exercises.len() && rest_seconds > 0 {
                cards.push(PreviewCard::Rest {
                    seconds: rest_seconds,
                });
            }
        }
        cards
    }
}
