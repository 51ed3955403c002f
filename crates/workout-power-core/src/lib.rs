//! # Workout Power Core Library
//!
//! This library provides the core logic for Workout Power, an interval
//! workout timer. All behavior lives here; the `workout-power` CLI is a
//! thin presentation layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer**: a deadline-based state machine (`Prepare -> Work -> Rest ->
//!   ... -> Completed`) that requires the caller to periodically invoke
//!   `tick()` with the current monotonic time
//! - **Cues**: tone, speech and vibration behind capability ports, all
//!   best-effort
//! - **Celebrations**: a round-robin confetti/fireworks particle engine
//!   driven once per rendering frame
//! - **Settings**: TOML-backed preferences, clamped once per run
//! - **Driver**: a `tokio` task multiplexing the tick source, the frame
//!   source and user input
//!
//! ## Key Components
//!
//! - [`WorkoutController`]: the single owned instance a presenter talks to
//! - [`WorkoutTimer`]: core timer state machine
//! - [`CelebrationEngine`]: particle runs with at most one active at a time
//! - [`SettingsStore`]: preference persistence

pub mod celebration;
pub mod clock;
pub mod controller;
pub mod cues;
pub mod driver;
pub mod error;
pub mod events;
pub mod ports;
pub mod settings;
pub mod timer;
pub mod wake_lock;
pub mod workout;

pub use celebration::{CelebrationEngine, CelebrationHandle, CelebrationKind, Point, Viewport};
pub use clock::{Clock, ManualClock, Millis, MonotonicClock};
pub use controller::{CompletionReport, TickOutcome, WorkoutController};
pub use driver::{DriverConfig, Input, Presenter, RunOutcome};
pub use error::{Capability, CapabilityError, CoreError, DataLoadError, Result, SettingsError};
pub use events::Event;
pub use ports::Capabilities;
pub use settings::{FileSettingsStore, Settings, SettingsStore, Theme, TimerSettings};
pub use timer::{format_clock, Phase, TimerView, WorkoutTimer};
pub use wake_lock::WakeLockStatus;
pub use workout::{DirWorkoutSource, Exercise, WorkoutDefinition, WorkoutListing, WorkoutSource};
