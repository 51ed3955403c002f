use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use workout_power_core::driver::run_workout;
use workout_power_core::{
    DirWorkoutSource, DriverConfig, MonotonicClock, RunOutcome, TimerSettings, WorkoutController,
    WorkoutDefinition, WorkoutSource,
};

use super::settings;
use crate::device;
use crate::terminal::{self, InputReader, PlainPresenter, Screen};

pub fn run(file: &str, events: bool, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = DirWorkoutSource::new(data_dir);
    let workout = source.load(file)?;
    // Fail before the terminal is touched.
    workout.validate()?;

    let stored = settings::load_for_run();
    let accent = stored.light_rgb();
    let timer = TimerSettings::resolve(&stored);

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(drive(workout, timer, accent, events))?;

    if !events && outcome == RunOutcome::Cancelled {
        println!("Workout stopped.");
    }
    Ok(())
}

async fn drive(
    workout: WorkoutDefinition,
    settings: TimerSettings,
    accent: (u8, u8, u8),
    events: bool,
) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let clock = Arc::new(MonotonicClock::new());
    let mut controller = WorkoutController::new(clock, device::capabilities());
    let (tx, mut rx) = mpsc::channel(32);
    let config = DriverConfig::default();

    if !terminal::is_interactive() {
        drop(tx);
        let mut presenter = PlainPresenter::new(events);
        let outcome =
            run_workout(&mut controller, workout, settings, &mut rx, &mut presenter, config)
                .await?;
        return Ok(outcome);
    }

    let mut screen = Screen::enter(accent, events)?;
    controller.set_viewport(screen.viewport());
    controller.set_completion_anchor(terminal::completion_anchor(screen.viewport()));
    let reader = InputReader::spawn(tx);
    let result =
        run_workout(&mut controller, workout, settings, &mut rx, &mut screen, config).await;
    reader.shutdown().await;
    let recorded = screen.take_events();
    drop(screen);

    terminal::print_events(&recorded);
    let outcome = result?;
    if let RunOutcome::Completed(report) = &outcome {
        if !events {
            println!("{}", terminal::summary(report));
        }
    }
    Ok(outcome)
}
