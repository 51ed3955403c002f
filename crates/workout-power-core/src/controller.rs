//! Single-instance workout controller.
//!
//! The presentation layer owns exactly one [`WorkoutController`] and calls
//! into it from one task. "At most one run" and "at most one celebration"
//! are enforced here rather than through globals.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::celebration::{Canvas, CelebrationEngine, CelebrationHandle, CelebrationKind, Point, Viewport};
use crate::clock::{Clock, Millis};
use crate::cues::CueDispatcher;
use crate::error::Result;
use crate::events::Event;
use crate::ports::Capabilities;
use crate::settings::TimerSettings;
use crate::timer::{Phase, TimerView, WorkoutTimer};
use crate::wake_lock::{WakeLock, WakeLockStatus};
use crate::workout::WorkoutDefinition;

/// Shown on the completion screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionReport {
    pub workout: String,
    pub exercise_count: usize,
    pub estimated_total_secs: u64,
    /// `None` when celebrations are off or reduced motion is requested.
    pub celebration: Option<CelebrationKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No run in progress.
    Idle,
    Running(TimerView),
    /// The last work phase finished on this tick.
    Completed(CompletionReport),
}

type CompletionListener = Box<dyn FnMut(&CompletionReport) + Send>;

pub struct WorkoutController {
    clock: Arc<dyn Clock>,
    cues: CueDispatcher,
    wake_lock: WakeLock,
    celebrations: CelebrationEngine,
    timer: Option<WorkoutTimer>,
    celebration: Option<CelebrationHandle>,
    completion_anchor: Option<Point>,
    listeners: Vec<CompletionListener>,
    events: Vec<Event>,
}

impl WorkoutController {
    pub fn new(clock: Arc<dyn Clock>, capabilities: Capabilities) -> Self {
        let Capabilities {
            tone,
            speech,
            vibration,
            wake_lock,
            motion,
        } = capabilities;
        Self {
            clock,
            cues: CueDispatcher::new(tone, speech, vibration),
            wake_lock: WakeLock::new(wake_lock),
            celebrations: CelebrationEngine::new(motion),
            timer: None,
            celebration: None,
            completion_anchor: None,
            listeners: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replace the celebration engine, e.g. with a seeded one.
    pub fn with_celebrations(mut self, engine: CelebrationEngine) -> Self {
        self.celebrations = engine;
        self
    }

    /// Where confetti bursts from. Defaults to the viewport center.
    pub fn set_completion_anchor(&mut self, anchor: Point) {
        self.completion_anchor = Some(anchor);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.celebrations.set_viewport(viewport);
    }

    /// Called once per completed run, right after the last work phase.
    pub fn on_completed(&mut self, listener: impl FnMut(&CompletionReport) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.timer.as_ref().is_some_and(WorkoutTimer::is_paused)
    }

    pub fn timer(&self) -> Option<&WorkoutTimer> {
        self.timer.as_ref()
    }

    pub fn view(&self) -> Option<TimerView> {
        let now = self.clock.now_ms();
        self.timer
            .as_ref()
            .map(|timer| TimerView::new(timer, now, self.wake_lock.status()))
    }

    pub fn wake_lock_status(&self) -> WakeLockStatus {
        self.wake_lock.status()
    }

    pub fn celebrations(&self) -> &CelebrationEngine {
        &self.celebrations
    }

    pub fn has_celebration_surface(&self) -> bool {
        self.celebrations.has_surface()
    }

    /// Lifecycle events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.extend(self.celebrations.drain_events());
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a run, replacing any run in progress.
    ///
    /// # Errors
    /// Returns `NoWorkoutLoaded` for a workout without exercises. The
    /// previous run, if any, is left untouched in that case.
    pub fn start(&mut self, workout: WorkoutDefinition, settings: TimerSettings) -> Result<TimerView> {
        workout.validate()?;
        self.stop();
        self.stop_celebration();

        let now = self.clock.now_ms();
        let timer = WorkoutTimer::start(workout, settings, now)?;
        tracing::info!(
            workout = timer.workout().display_name(),
            exercises = timer.workout().exercise_count(),
            "workout started"
        );
        self.events.push(Event::WorkoutStarted {
            workout: timer.workout().display_name().to_string(),
            exercise_count: timer.workout().exercise_count(),
            estimated_total_secs: timer.estimated_total_secs(),
            at: Utc::now(),
        });
        self.events.push(timer.phase_event());

        self.wake_lock.set_enabled(settings.wake_lock_enabled);
        self.wake_lock.set_wanted(true);

        let view = TimerView::new(&timer, now, self.wake_lock.status());
        self.timer = Some(timer);
        Ok(view)
    }

    /// Advance the run. Cues for this tick fire before the view is built.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();
        let Some(timer) = self.timer.as_mut() else {
            return TickOutcome::Idle;
        };

        let events = timer.tick(now);
        let settings = *timer.settings();
        let mut completed = false;
        for event in &events {
            match event {
                Event::PhaseEntered {
                    phase: Phase::Work,
                    exercise_index,
                    ..
                } => {
                    let name = timer.workout().exercise_name(*exercise_index);
                    self.cues.work_started(&settings, &name);
                }
                Event::PhaseEntered {
                    phase: Phase::Rest,
                    ..
                } => self.cues.rest_started(&settings),
                Event::CountdownTick { .. } => self.cues.countdown(&settings),
                Event::WorkoutCompleted { .. } => completed = true,
                _ => {}
            }
        }
        self.events.extend(events);

        if completed {
            return TickOutcome::Completed(self.complete(now));
        }
        TickOutcome::Running(TimerView::new(timer, now, self.wake_lock.status()))
    }

    /// Returns `false` if there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        let now = self.clock.now_ms();
        let Some(event) = self.timer.as_mut().and_then(|t| t.pause(now)) else {
            return false;
        };
        self.cues.cancel_speech();
        self.events.push(event);
        true
    }

    /// Returns `false` if there was nothing to resume.
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now_ms();
        let Some(event) = self.timer.as_mut().and_then(|t| t.resume(now)) else {
            return false;
        };
        self.events.push(event);
        true
    }

    /// Tap-to-pause.
    pub fn toggle_pause(&mut self) -> bool {
        if self.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Abandon the run in progress. Safe to call when idle.
    pub fn stop(&mut self) {
        if self.timer.take().is_none() {
            return;
        }
        self.cues.cancel_speech();
        self.wake_lock.set_wanted(false);
        tracing::info!("workout stopped");
        self.events.push(Event::TimerStopped { at: Utc::now() });
    }

    /// Stop the celebration, letting its surface fade out.
    pub fn stop_celebration(&mut self) {
        if let Some(handle) = self.celebration.take() {
            handle.stop();
        }
        let now = self.clock.now_ms();
        self.celebrations.stop(now);
    }

    /// One rendering frame for the celebration surface.
    pub fn frame(&mut self, canvas: &mut dyn Canvas) {
        let now = self.clock.now_ms();
        self.celebrations.frame(now, canvas);
    }

    /// The host became visible or hidden.
    pub fn on_visibility_change(&mut self, visible: bool) {
        self.wake_lock.on_visibility_change(visible);
    }

    fn complete(&mut self, now: Millis) -> CompletionReport {
        let timer = self.timer.take();
        self.wake_lock.set_wanted(false);

        let (workout, exercise_count, estimated_total_secs, celebrate) = match &timer {
            Some(t) => (
                t.workout().display_name().to_string(),
                t.workout().exercise_count(),
                t.estimated_total_secs(),
                t.settings().celebrations_enabled,
            ),
            None => (String::new(), 0, 0, false),
        };

        let celebration = if celebrate {
            let anchor = self
                .completion_anchor
                .unwrap_or_else(|| self.celebrations.viewport().center());
            let handle = self.celebrations.start_next(anchor, now);
            let kind = handle.kind();
            self.celebration = Some(handle);
            kind
        } else {
            None
        };

        let report = CompletionReport {
            workout,
            exercise_count,
            estimated_total_secs,
            celebration,
        };
        tracing::info!(workout = %report.workout, ?celebration, "workout completed");
        for listener in &mut self.listeners {
            listener(&report);
        }
        report
    }
}
