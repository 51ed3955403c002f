//! Async driver: one task multiplexing the tick source, the frame source
//! and user input.
//!
//! All controller state is touched from the task that awaits
//! [`run_workout`]; inputs arrive over an `mpsc` channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::celebration::{Canvas, CelebrationEngine, CelebrationKind, Point, Viewport};
use crate::clock::Clock;
use crate::controller::{CompletionReport, TickOutcome, WorkoutController};
use crate::error::Result;
use crate::events::Event;
use crate::settings::TimerSettings;
use crate::timer::TimerView;
use crate::workout::WorkoutDefinition;

pub const TICK_INTERVAL: Duration = Duration::from_millis(200);
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub tick_interval: Duration,
    pub frame_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            frame_interval: FRAME_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    TogglePause,
    Pause,
    Resume,
    /// Leave the screen.
    Back,
    Visibility(bool),
    Resize(Viewport),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(CompletionReport),
    Cancelled,
}

/// The screen a run is shown on.
pub trait Presenter {
    fn render_timer(&mut self, view: &TimerView);

    fn render_completion(&mut self, report: &CompletionReport);

    /// Surface for celebration particles.
    fn canvas(&mut self) -> &mut dyn Canvas;

    /// Lifecycle events, delivered after each driver step that produced any.
    fn on_events(&mut self, _events: &[Event]) {}
}

/// Run one workout to completion or cancellation.
///
/// After the last work phase the driver keeps rendering frames until the
/// celebration surface is gone, then returns the completion report.
///
/// # Errors
/// Fails before anything is rendered if the workout cannot start.
pub async fn run_workout<P: Presenter + ?Sized>(
    controller: &mut WorkoutController,
    workout: WorkoutDefinition,
    settings: TimerSettings,
    inputs: &mut mpsc::Receiver<Input>,
    presenter: &mut P,
    config: DriverConfig,
) -> Result<RunOutcome> {
    let view = controller.start(workout, settings)?;
    presenter.render_timer(&view);
    flush_events(controller, presenter);

    let mut ticks = time::interval(config.tick_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames = time::interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut report: Option<CompletionReport> = None;
    let mut inputs_open = true;

    loop {
        let animating = report.is_some() || controller.has_celebration_surface();
        tokio::select! {
            _ = ticks.tick(), if report.is_none() => {
                match controller.tick() {
                    TickOutcome::Running(view) => presenter.render_timer(&view),
                    TickOutcome::Completed(done) => {
                        presenter.render_completion(&done);
                        report = Some(done);
                    }
                    TickOutcome::Idle => return Ok(RunOutcome::Cancelled),
                }
            }
            _ = frames.tick(), if animating => {
                controller.frame(presenter.canvas());
                if let Some(done) = &report {
                    if !controller.has_celebration_surface() {
                        flush_events(controller, presenter);
                        return Ok(RunOutcome::Completed(done.clone()));
                    }
                }
            }
            input = inputs.recv(), if inputs_open => match input {
                Some(Input::Back) => {
                    controller.stop();
                    controller.stop_celebration();
                    flush_events(controller, presenter);
                    return Ok(RunOutcome::Cancelled);
                }
                Some(input) => {
                    if apply_input(controller, input) {
                        if let Some(view) = controller.view() {
                            presenter.render_timer(&view);
                        }
                    }
                }
                // Nobody can send input any more; keep running.
                None => inputs_open = false,
            },
        }
        flush_events(controller, presenter);
    }
}

/// Returns `true` if the timer view changed.
fn apply_input(controller: &mut WorkoutController, input: Input) -> bool {
    match input {
        Input::TogglePause => controller.toggle_pause(),
        Input::Pause => controller.pause(),
        Input::Resume => controller.resume(),
        Input::Visibility(visible) => {
            controller.on_visibility_change(visible);
            true
        }
        Input::Resize(viewport) => {
            controller.set_viewport(viewport);
            false
        }
        Input::Back => false,
    }
}

fn flush_events<P: Presenter + ?Sized>(controller: &mut WorkoutController, presenter: &mut P) {
    let events = controller.drain_events();
    if !events.is_empty() {
        presenter.on_events(&events);
    }
}

/// Play one celebration on its own, as the options screen's test button
/// does. Returns the kind that ran, or `None` under reduced motion.
pub async fn run_celebration<P: Presenter + ?Sized>(
    engine: &mut CelebrationEngine,
    anchor: Point,
    clock: &dyn Clock,
    presenter: &mut P,
    inputs: &mut mpsc::Receiver<Input>,
    config: DriverConfig,
) -> Option<CelebrationKind> {
    let handle = engine.start_next(anchor, clock.now_ms());
    let kind = handle.kind();

    let mut frames = time::interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut inputs_open = true;

    while engine.has_surface() {
        tokio::select! {
            _ = frames.tick() => engine.frame(clock.now_ms(), presenter.canvas()),
            input = inputs.recv(), if inputs_open => match input {
                Some(Input::Back) => {
                    handle.stop();
                    engine.stop(clock.now_ms());
                    break;
                }
                Some(Input::Resize(viewport)) => engine.set_viewport(viewport),
                Some(_) => {}
                None => inputs_open = false,
            },
        }
    }
    let events = engine.drain_events();
    if !events.is_empty() {
        presenter.on_events(&events);
    }
    kind
}
