use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::celebration::CelebrationKind;
use crate::timer::Phase;

/// Every lifecycle step of a run produces an Event.
/// The presenter drains them from the controller; the CLI prints them as
/// JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkoutStarted {
        workout: String,
        exercise_count: usize,
        estimated_total_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase began. `exercise_index` is the upcoming exercise during Rest.
    PhaseEntered {
        phase: Phase,
        exercise_index: usize,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// One of the last three whole seconds of a phase was reached.
    CountdownTick {
        phase: Phase,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        paused_ms: u64,
        at: DateTime<Utc>,
    },
    WorkoutCompleted {
        workout: String,
        exercise_count: usize,
        at: DateTime<Utc>,
    },
    /// The run was abandoned before completion.
    TimerStopped {
        at: DateTime<Utc>,
    },
    CelebrationStarted {
        kind: CelebrationKind,
        at: DateTime<Utc>,
    },
    CelebrationStopped {
        kind: CelebrationKind,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::WorkoutStarted { at, .. }
            | Event::PhaseEntered { at, .. }
            | Event::CountdownTick { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::WorkoutCompleted { at, .. }
            | Event::TimerStopped { at }
            | Event::CelebrationStarted { at, .. }
            | Event::CelebrationStopped { at, .. } => *at,
        }
    }
}
