use std::f32::consts::TAU;

use rand::Rng;

use super::canvas::{Shape, Sprite};
use super::color::{Color, ColorMode};
use super::geometry::{Point, Viewport};

pub const BURST_INTERVAL_MS: u64 = 900;
pub const TEARDOWN_GRACE_MS: u64 = 1200;

const GRAVITY: f32 = 420.0;
/// Paper flutters; it never falls faster than this.
const TERMINAL_VELOCITY: f32 = 260.0;
/// Fraction of life after which a piece starts fading out.
const FADE_FROM: f32 = 0.64;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiPiece {
    pub position: Point,
    vx: f32,
    vy: f32,
    /// Constant horizontal drift, px/s.
    wind: f32,
    sway_amplitude: f32,
    sway_hz: f32,
    spin_deg_per_s: f32,
    rotation_deg: f32,
    width: f32,
    height: f32,
    color: Color,
    age_ms: f32,
    life_ms: f32,
    fallen: f32,
}

impl ConfettiPiece {
    pub fn launch(origin: Point, color: Color, rng: &mut impl Rng) -> Self {
        let size = rng.gen_range(6.0..16.0);
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(140.0..360.0);
        let jitter_x = rng.gen_range(-1.0f32..1.0) * rng.gen_range(28.0..82.0);
        let kick_up = rng.gen_range(130.0..330.0);
        let life_ms = rng.gen_range(3600.0..6000.0);
        let drift = rng.gen_range(-1.0f32..1.0) * rng.gen_range(260.0..680.0);

        Self {
            position: origin,
            vx: angle.cos() * speed + jitter_x,
            vy: angle.sin() * speed - kick_up,
            wind: drift / (life_ms / 1000.0),
            sway_amplitude: rng.gen_range(48.0..112.0),
            sway_hz: rng.gen_range(0.4..1.1),
            spin_deg_per_s: rng.gen_range(-270.0..270.0),
            rotation_deg: 0.0,
            width: size,
            height: (size * 0.55).max(4.0),
            color,
            age_ms: 0.0,
            life_ms,
            fallen: 0.0,
        }
    }

    /// Advance by `dt_ms`. Returns `false` once the piece should be dropped.
    pub fn step(&mut self, dt_ms: f32, viewport: Viewport) -> bool {
        let dt = dt_ms / 1000.0;
        self.age_ms += dt_ms;

        self.vy = (self.vy + GRAVITY * dt).min(TERMINAL_VELOCITY);
        // Air slows the initial pop.
        self.vx *= (-1.2 * dt).exp();

        let t = self.age_ms / 1000.0;
        let sway = (TAU * self.sway_hz * t).cos() * self.sway_amplitude * TAU * self.sway_hz;
        let dx = (self.vx + self.wind + sway) * dt;
        let dy = self.vy * dt;
        self.position = self.position.offset(dx, dy);
        if dy > 0.0 {
            self.fallen += dy;
        }
        self.rotation_deg += self.spin_deg_per_s * dt;

        self.age_ms < self.life_ms && self.fallen <= viewport.height
    }

    pub fn opacity(&self) -> f32 {
        let t = self.age_ms / self.life_ms;
        if t <= FADE_FROM {
            1.0
        } else {
            (1.0 - (t - FADE_FROM) / (1.0 - FADE_FROM)).clamp(0.0, 1.0)
        }
    }

    pub fn sprite(&self) -> Sprite {
        Sprite {
            shape: Shape::Rect,
            center: self.position,
            width: self.width,
            height: self.height,
            rotation_deg: self.rotation_deg,
            color: self.color,
            opacity: self.opacity(),
        }
    }
}

/// 50..=79 pieces from `origin`.
pub fn burst(origin: Point, colors: &ColorMode, rng: &mut impl Rng) -> Vec<ConfettiPiece> {
    let count = rng.gen_range(50..80);
    (0..count)
        .map(|_| {
            let color = colors.pick(rng);
            ConfettiPiece::launch(origin, color, rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn burst_size_in_range() {
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..20 {
            let pieces = burst(Point::new(100.0, 100.0), &ColorMode::RandomHue, &mut rng);
            assert!((50..80).contains(&pieces.len()));
        }
    }

    #[test]
    fn pieces_rise_then_fall_and_expire() {
        let mut rng = Pcg64::seed_from_u64(2);
        let viewport = Viewport::new(800.0, 100_000.0);
        let origin = Point::new(400.0, 300.0);
        let mut piece = ConfettiPiece::launch(origin, Color::rgb(1, 2, 3), &mut rng);
        assert!(piece.height >= 4.0);

        let mut frames = 0;
        while piece.step(16.0, viewport) {
            frames += 1;
            assert!(frames < 10_000);
        }
        // Life is at most 6 s.
        assert!(frames as f32 * 16.0 <= 6_016.0);
        assert!(piece.position.y > origin.y);
        assert_eq!(piece.opacity(), 0.0);
    }

    #[test]
    fn falling_off_screen_removes_piece_early() {
        let mut rng = Pcg64::seed_from_u64(3);
        let viewport = Viewport::new(800.0, 40.0);
        let mut piece = ConfettiPiece::launch(Point::new(400.0, 20.0), WHITE_ISH, &mut rng);
        let mut elapsed = 0.0;
        while piece.step(16.0, viewport) {
            elapsed += 16.0;
        }
        assert!(elapsed < 3600.0);
    }

    const WHITE_ISH: Color = Color::rgb(250, 250, 250);
}
