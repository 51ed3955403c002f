use super::canvas::Sprite;
use super::confetti::ConfettiPiece;
use super::fireworks::{Flash, Rocket, Spark};
use super::geometry::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    Confetti(ConfettiPiece),
    Rocket(Rocket),
    Spark(Spark),
    Flash(Flash),
}

impl Particle {
    pub fn sprite(&self) -> Sprite {
        match self {
            Particle::Confetti(p) => p.sprite(),
            Particle::Rocket(p) => p.sprite(),
            Particle::Spark(p) => p.sprite(),
            Particle::Flash(p) => p.sprite(),
        }
    }

    /// Step everything except rockets, which the run steps itself because
    /// they spawn new particles. Returns `false` once expired.
    pub(crate) fn step_passive(&mut self, dt_ms: f32, viewport: Viewport) -> bool {
        match self {
            Particle::Confetti(p) => p.step(dt_ms, viewport),
            Particle::Spark(p) => p.step(dt_ms),
            Particle::Flash(p) => p.step(dt_ms),
            Particle::Rocket(_) => true,
        }
    }
}
