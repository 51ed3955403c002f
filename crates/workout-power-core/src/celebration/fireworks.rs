use std::f32::consts::TAU;

use rand::Rng;

use super::canvas::{Shape, Sprite};
use super::color::{random_hue, Color, EMBER_ORANGE, ROCKET_GOLD, WHITE};
use super::geometry::{Point, Viewport};

pub const LAUNCH_INTERVAL_MS: u64 = 1600;
/// The second launch of a run comes this soon after the first.
pub const SECOND_LAUNCH_MS: u64 = 180;
pub const DOUBLE_SHOT_CHANCE: f64 = 0.45;
pub const DOUBLE_SHOT_GAP_MS: std::ops::Range<u64> = 140..320;
pub const TEARDOWN_GRACE_MS: u64 = 2200;

const DROP_CHANCE: f64 = 0.22;
const HIGHLIGHT_CHANCE: f64 = 0.11;
/// Embers stop this long before detonation.
const TRAIL_CUTOFF_MS: f32 = 250.0;
/// Share of the flight spent on the bezier; the rest is the drop.
const ARC_SHARE: f32 = 0.85;
const FLASH_LIFE_MS: f32 = 180.0;
const FLASH_SIZE: f32 = 10.0;
const FLASH_GROWTH: f32 = 6.0;
const SPARK_DRAG: f32 = 1.4;

#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    start: Point,
    control: Point,
    apex: Point,
    target: Point,
    flight_ms: f32,
    age_ms: f32,
    ember_interval_ms: f32,
    next_ember_ms: f32,
}

/// What a rocket did during one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RocketStep {
    /// Embers due this step, shed at the rocket's current position.
    pub embers: u32,
    pub detonated_at: Option<Point>,
}

impl Rocket {
    pub fn launch(viewport: Viewport, rng: &mut impl Rng) -> Self {
        let start = Point::new(
            viewport.width * rng.gen_range(0.12..0.88),
            viewport.height + 24.0,
        );
        let apex = Point::new(
            start.x + rng.gen_range(-110.0..110.0),
            viewport.height * rng.gen_range(0.08..0.34),
        );
        let control = Point::new(
            start.x + (apex.x - start.x) * rng.gen_range(0.35..0.70) + rng.gen_range(-80.0..80.0),
            start.y + (apex.y - start.y) * rng.gen_range(0.5..0.7),
        );
        let drop = if rng.gen_bool(DROP_CHANCE) {
            rng.gen_range(20.0..110.0)
        } else {
            0.0
        };
        let ember_interval_ms = rng.gen_range(28.0..46.0);

        Self {
            start,
            control,
            apex,
            target: apex.offset(0.0, drop),
            flight_ms: rng.gen_range(700.0..1220.0),
            age_ms: 0.0,
            ember_interval_ms,
            next_ember_ms: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        let t = (self.age_ms / self.flight_ms).clamp(0.0, 1.0);
        if t < ARC_SHARE {
            // Fast out of the tube, slowing towards the top.
            let u = t / ARC_SHARE;
            let eased = 1.0 - (1.0 - u) * (1.0 - u);
            self.start.quadratic(self.control, self.apex, eased)
        } else {
            let u = (t - ARC_SHARE) / (1.0 - ARC_SHARE);
            self.apex.lerp(self.target, u)
        }
    }

    pub fn has_drop(&self) -> bool {
        self.target != self.apex
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn step(&mut self, dt_ms: f32) -> RocketStep {
        let mut out = RocketStep::default();
        let cutoff = (self.flight_ms - TRAIL_CUTOFF_MS).max(0.0);
        while self.next_ember_ms <= self.age_ms && self.next_ember_ms < cutoff {
            out.embers += 1;
            self.next_ember_ms += self.ember_interval_ms;
        }
        self.age_ms += dt_ms;
        if self.age_ms >= self.flight_ms {
            out.detonated_at = Some(self.target);
        }
        out
    }

    pub fn sprite(&self) -> Sprite {
        Sprite {
            shape: Shape::Dot,
            center: self.position(),
            width: 4.0,
            height: 14.0,
            rotation_deg: 0.0,
            color: ROCKET_GOLD,
            opacity: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparkKind {
    Burst,
    Ember,
    Highlight,
}

/// Short-lived point particle pulled by gravity.
#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub kind: SparkKind,
    pub position: Point,
    vx: f32,
    vy: f32,
    gravity: f32,
    size: f32,
    growth: f32,
    color: Color,
    age_ms: f32,
    life_ms: f32,
}

impl Spark {
    pub fn ember(at: Point, rng: &mut impl Rng) -> Self {
        let life_ms = rng.gen_range(520.0..720.0);
        let secs = life_ms / 1000.0;
        Self {
            kind: SparkKind::Ember,
            position: at,
            vx: rng.gen_range(-5.0..5.0) / secs,
            vy: rng.gen_range(26.0..60.0) / secs,
            gravity: 0.0,
            size: rng.gen_range(6.0..12.0),
            growth: 1.25,
            color: EMBER_ORANGE,
            age_ms: 0.0,
            life_ms,
        }
    }

    fn radial(kind: SparkKind, at: Point, angle: f32, speed: f32, rng: &mut impl Rng) -> Self {
        let (color, gravity, life_ms, size) = match kind {
            SparkKind::Highlight => (
                WHITE,
                rng.gen_range(260.0..420.0),
                rng.gen_range(600.0..1000.0),
                rng.gen_range(1.5..3.0),
            ),
            _ => (
                random_hue(rng),
                rng.gen_range(520.0..840.0),
                rng.gen_range(1700.0..2600.0),
                rng.gen_range(2.0..5.5),
            ),
        };
        Self {
            kind,
            position: at,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            gravity,
            size,
            growth: 1.0,
            color,
            age_ms: 0.0,
            life_ms,
        }
    }

    pub fn step(&mut self, dt_ms: f32) -> bool {
        let dt = dt_ms / 1000.0;
        self.age_ms += dt_ms;
        if self.kind != SparkKind::Ember {
            let drag = (-SPARK_DRAG * dt).exp();
            self.vx *= drag;
            self.vy = self.vy * drag + self.gravity * dt;
        }
        self.position = self.position.offset(self.vx * dt, self.vy * dt);
        self.age_ms < self.life_ms
    }

    pub fn sprite(&self) -> Sprite {
        let t = (self.age_ms / self.life_ms).clamp(0.0, 1.0);
        let scale = 1.0 + (self.growth - 1.0) * t;
        let (shape, height) = match self.kind {
            SparkKind::Ember => (Shape::Glow, self.size * 2.0),
            _ => (Shape::Dot, self.size),
        };
        Sprite {
            shape,
            center: self.position,
            width: self.size * scale,
            height: height * scale,
            rotation_deg: 0.0,
            color: self.color,
            opacity: 1.0 - t,
        }
    }
}

/// White bloom at the detonation point.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub position: Point,
    age_ms: f32,
}

impl Flash {
    pub fn new(at: Point) -> Self {
        Self {
            position: at,
            age_ms: 0.0,
        }
    }

    pub fn step(&mut self, dt_ms: f32) -> bool {
        self.age_ms += dt_ms;
        self.age_ms < FLASH_LIFE_MS
    }

    pub fn sprite(&self) -> Sprite {
        let t = (self.age_ms / FLASH_LIFE_MS).clamp(0.0, 1.0);
        let size = FLASH_SIZE * (1.0 + (FLASH_GROWTH - 1.0) * t);
        Sprite {
            shape: Shape::Glow,
            center: self.position,
            width: size,
            height: size,
            rotation_deg: 0.0,
            color: WHITE,
            opacity: 0.95 * (1.0 - t),
        }
    }
}

/// One flash, 46..=67 burst sparks, and sometimes a handful of white
/// highlights.
pub fn detonate(at: Point, rng: &mut impl Rng) -> (Flash, Vec<Spark>) {
    let count = rng.gen_range(46..68);
    let mut sparks: Vec<Spark> = (0..count)
        .map(|i| {
            let angle = TAU * (i as f32 / count as f32) + rng.gen_range(0.0..0.22);
            let speed = rng.gen_range(160.0..520.0);
            Spark::radial(SparkKind::Burst, at, angle, speed, rng)
        })
        .collect();

    if rng.gen_bool(HIGHLIGHT_CHANCE) {
        let extra = rng.gen_range(6..=12);
        for _ in 0..extra {
            let angle = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(80.0..260.0);
            sparks.push(Spark::radial(SparkKind::Highlight, at, angle, speed, rng));
        }
    }
    (Flash::new(at), sparks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn rockets_start_below_and_end_in_upper_band() {
        let mut rng = Pcg64::seed_from_u64(11);
        let vp = Viewport::new(1000.0, 800.0);
        let mut drops = 0;
        for _ in 0..100 {
            let rocket = Rocket::launch(vp, &mut rng);
            if rocket.has_drop() {
                drops += 1;
                let fall = rocket.target().y - rocket.apex.y;
                assert!((19.9..=110.1).contains(&fall));
            } else {
                assert_eq!(rocket.target(), rocket.apex);
            }
            let start = rocket.position();
            assert_eq!(start.y, 824.0);
            assert!(start.x >= 120.0 && start.x <= 880.0);
            let target = rocket.target();
            assert!(target.y >= 64.0 && target.y <= 272.0 + 110.0);
            assert!((target.x - start.x).abs() <= 110.0);
        }
        assert!(drops > 0 && drops < 100);
    }

    #[test]
    fn rocket_sheds_embers_then_detonates() {
        let mut rng = Pcg64::seed_from_u64(5);
        let mut rocket = Rocket::launch(Viewport::default(), &mut rng);
        let flight = rocket.flight_ms;
        let mut embers = 0;
        let mut elapsed = 0.0;
        let detonated = loop {
            let step = rocket.step(16.0);
            embers += step.embers;
            elapsed += 16.0;
            if let Some(at) = step.detonated_at {
                break at;
            }
            assert!(elapsed < 2_000.0);
        };
        assert_eq!(detonated, rocket.target());
        // One ember every 28..46 ms for the flight minus the cutoff.
        let trail = flight - TRAIL_CUTOFF_MS;
        assert!(embers as f32 >= trail / 46.0 - 1.0);
        assert!(embers as f32 <= trail / 28.0 + 1.0);
    }

    #[test]
    fn detonation_counts() {
        let mut rng = Pcg64::seed_from_u64(9);
        let mut saw_highlight = false;
        for _ in 0..200 {
            let (_flash, sparks) = detonate(Point::new(10.0, 10.0), &mut rng);
            let burst = sparks.iter().filter(|s| s.kind == SparkKind::Burst).count();
            let highlights = sparks.len() - burst;
            assert!((46..68).contains(&burst));
            assert!(highlights == 0 || (6..=12).contains(&highlights));
            saw_highlight |= highlights > 0;
        }
        assert!(saw_highlight);
    }

    #[test]
    fn flash_grows_sixfold_and_fades_fast() {
        let mut flash = Flash::new(Point::default());
        assert_eq!(flash.sprite().width, FLASH_SIZE);
        assert!(flash.step(100.0));
        assert!(!flash.step(80.0));
        let sprite = flash.sprite();
        assert_eq!(sprite.width, FLASH_SIZE * FLASH_GROWTH);
        assert_eq!(sprite.opacity, 0.0);
    }

    #[test]
    fn sparks_fall_under_gravity() {
        let mut rng = Pcg64::seed_from_u64(4);
        let at = Point::new(500.0, 300.0);
        let mut spark = Spark::radial(SparkKind::Burst, at, -TAU / 4.0, 300.0, &mut rng);
        let mut min_y = at.y;
        while spark.step(16.0) {
            min_y = min_y.min(spark.position.y);
        }
        assert!(min_y < at.y);
        assert!(spark.position.y > min_y);
    }
}
