//! Confetti and fireworks shown when a workout completes.

mod canvas;
mod color;
mod confetti;
mod engine;
mod fireworks;
mod geometry;
mod particle;
mod run;

pub use canvas::{Canvas, NullCanvas, Shape, Sprite};
pub use color::{Color, ColorMode, BRIGHT_PALETTE};
pub use confetti::ConfettiPiece;
pub use engine::{CelebrationEngine, CelebrationHandle};
pub use fireworks::{Flash, Rocket, Spark, SparkKind};
pub use geometry::{Point, Viewport};
pub use particle::Particle;
pub use run::{CelebrationKind, CelebrationRun, CELEBRATION_WINDOW_MS};
