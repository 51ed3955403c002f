mod engine;
mod phase;
mod view;

pub use engine::{TimerState, WorkoutTimer, COUNTDOWN_SECONDS};
pub use phase::Phase;
pub use view::{format_clock, TimerView};
