//! Workout timer state machine.
//!
//! The timer is deadline-based. It does not use internal threads or sleep;
//! the caller passes the current monotonic time into every command and
//! calls `tick()` on a fixed cadence (200 ms in the driver).
//!
//! ## Phase transitions
//!
//! ```text
//! Prepare -> Work(0) -> [Rest(1)] -> Work(1) -> ... -> Work(n-1) -> Completed
//! ```
//!
//! Rest phases carry the index of the *upcoming* exercise and are skipped
//! entirely when the rest duration is zero.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = WorkoutTimer::start(workout, settings, clock.now_ms())?;
//! // In a loop:
//! for event in timer.tick(clock.now_ms()) { /* dispatch cues */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::clock::Millis;
use crate::error::Result;
use crate::events::Event;
use crate::settings::TimerSettings;
use crate::workout::WorkoutDefinition;

/// Countdown cues fire for these whole seconds remaining.
pub const COUNTDOWN_SECONDS: std::ops::RangeInclusive<u64> = 1..=3;

/// Mutable run state. Owned by exactly one [`WorkoutTimer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    /// Current exercise in Work, upcoming exercise in Rest, 0 in Prepare.
    pub exercise_index: usize,
    pub phase_duration_secs: u64,
    /// Monotonic ms at which the phase ends.
    pub phase_deadline_ms: Millis,
    pub paused: bool,
    pub paused_at_ms: Option<Millis>,
    /// Last countdown second a cue was emitted for, within this phase.
    pub last_announced_second: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct WorkoutTimer {
    workout: WorkoutDefinition,
    settings: TimerSettings,
    state: TimerState,
}

impl WorkoutTimer {
    /// Validate the workout and enter `Prepare`.
    ///
    /// # Errors
    /// Returns [`CoreError::NoWorkoutLoaded`](crate::CoreError::NoWorkoutLoaded)
    /// if the workout has no exercises. Nothing is created in that case.
    pub fn start(workout: WorkoutDefinition, settings: TimerSettings, now: Millis) -> Result<Self> {
        workout.validate()?;
        let duration = settings.pre_workout_seconds;
        Ok(Self {
            workout,
            settings,
            state: TimerState {
                phase: Phase::Prepare,
                exercise_index: 0,
                phase_duration_secs: duration,
                phase_deadline_ms: deadline(now, duration),
                paused: false,
                paused_at_ms: None,
                last_announced_second: None,
            },
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn workout(&self) -> &WorkoutDefinition {
        &self.workout
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn exercise_index(&self) -> usize {
        self.state.exercise_index
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_completed(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// Milliseconds left in the current phase. Frozen while paused.
    pub fn remaining_ms(&self, now: Millis) -> Millis {
        if self.is_completed() {
            return 0;
        }
        let reference = match self.state.paused_at_ms {
            Some(paused_at) if self.state.paused => paused_at,
            _ => now,
        };
        self.state.phase_deadline_ms.saturating_sub(reference)
    }

    /// Whole seconds left, rounded up. This is what the clock shows.
    pub fn remaining_secs(&self, now: Millis) -> u64 {
        self.remaining_ms(now).div_ceil(1000)
    }

    /// `prepare + sum(work) + rest * (n - 1)`, fixed for the run.
    pub fn estimated_total_secs(&self) -> u64 {
        self.workout
            .estimated_total_seconds(self.settings.rest_seconds, self.settings.pre_workout_seconds)
    }

    /// Overall progress in [0, 1].
    ///
    /// Counts finished exercises plus the elapsed fraction of the current
    /// Work phase only; Prepare and Rest time does not move the bar.
    pub fn progress(&self, now: Millis) -> f64 {
        let total = self.workout.exercise_count();
        if total == 0 {
            return 0.0;
        }
        let (completed, in_phase) = match self.state.phase {
            Phase::Prepare => (0, 0.0),
            Phase::Work => {
                let duration_ms = self.state.phase_duration_secs.saturating_mul(1000);
                let fraction = if duration_ms == 0 {
                    0.0
                } else {
                    let elapsed = duration_ms.saturating_sub(self.remaining_ms(now));
                    elapsed as f64 / duration_ms as f64
                };
                (self.state.exercise_index, fraction)
            }
            Phase::Rest => (self.state.exercise_index, 0.0),
            Phase::Completed => (total, 0.0),
        };
        ((completed as f64 + in_phase) / total as f64).clamp(0.0, 1.0)
    }

    /// The `PhaseEntered` event for the phase the timer is in right now.
    pub fn phase_event(&self) -> Event {
        Event::PhaseEntered {
            phase: self.state.phase,
            exercise_index: self.state.exercise_index,
            duration_secs: self.state.phase_duration_secs,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the machine to `now`.
    ///
    /// Returns at most one countdown event and at most one transition per
    /// call. No-op while paused or completed.
    pub fn tick(&mut self, now: Millis) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state.paused || self.is_completed() {
            return events;
        }

        let remaining_secs = self.remaining_secs(now);
        if COUNTDOWN_SECONDS.contains(&remaining_secs)
            && self.state.last_announced_second != Some(remaining_secs)
        {
            self.state.last_announced_second = Some(remaining_secs);
            events.push(Event::CountdownTick {
                phase: self.state.phase,
                seconds_left: remaining_secs,
                at: Utc::now(),
            });
        }

        if self.remaining_ms(now) == 0 {
            self.advance(now, &mut events);
        }
        events
    }

    /// Freeze the deadline. Returns `None` if there is nothing to pause.
    pub fn pause(&mut self, now: Millis) -> Option<Event> {
        if self.state.paused || self.is_completed() {
            return None;
        }
        let remaining_ms = self.remaining_ms(now);
        self.state.paused = true;
        self.state.paused_at_ms = Some(now);
        Some(Event::TimerPaused {
            remaining_ms,
            at: Utc::now(),
        })
    }

    /// Shift the deadline forward by exactly the paused duration.
    pub fn resume(&mut self, now: Millis) -> Option<Event> {
        if !self.state.paused {
            return None;
        }
        let paused_at = self.state.paused_at_ms.take().unwrap_or(now);
        let paused_ms = now.saturating_sub(paused_at);
        self.state.phase_deadline_ms = self.state.phase_deadline_ms.saturating_add(paused_ms);
        self.state.paused = false;
        Some(Event::TimerResumed {
            remaining_ms: self.remaining_ms(now),
            paused_ms,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self, now: Millis, events: &mut Vec<Event>) {
        let last = self.workout.exercise_count().saturating_sub(1);
        let index = self.state.exercise_index;
        let next = match self.state.phase {
            Phase::Prepare => Some((Phase::Work, 0)),
            Phase::Work if index >= last => None,
            Phase::Work if self.settings.rest_seconds > 0 => Some((Phase::Rest, index + 1)),
            Phase::Work => Some((Phase::Work, index + 1)),
            Phase::Rest => Some((Phase::Work, index)),
            Phase::Completed => return,
        };

        match next {
            Some((phase, exercise_index)) => {
                let duration = match phase {
                    Phase::Work => self.workout.work_seconds(exercise_index),
                    Phase::Rest => self.settings.rest_seconds,
                    Phase::Prepare | Phase::Completed => 0,
                };
                self.enter(phase, exercise_index, duration, now);
                events.push(self.phase_event());
            }
            None => {
                self.enter(Phase::Completed, index, 0, now);
                events.push(Event::WorkoutCompleted {
                    workout: self.workout.display_name().to_string(),
                    exercise_count: self.workout.exercise_count(),
                    at: Utc::now(),
                });
            }
        }
    }

    fn enter(&mut self, phase: Phase, exercise_index: usize, duration_secs: u64, now: Millis) {
        self.state.phase = phase;
        self.state.exercise_index = exercise_index;
        self.state.phase_duration_secs = duration_secs;
        self.state.phase_deadline_ms = deadline(now, duration_secs);
        self.state.last_announced_second = None;
    }
}

/// `now + secs`, saturating. Descriptor durations are not bounded.
fn deadline(now: Millis, secs: u64) -> Millis {
    now.saturating_add(secs.saturating_mul(1000))
}
