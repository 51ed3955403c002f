use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::canvas::Canvas;
use super::color::ColorMode;
use super::confetti;
use super::fireworks::{self, Rocket, Spark};
use super::geometry::{Point, Viewport};
use super::particle::Particle;
use crate::clock::Millis;

/// Emission stops this long after a run starts.
pub const CELEBRATION_WINDOW_MS: u64 = 10_000;

/// Longer gaps between frames (a hidden window, a stalled terminal) are
/// simulated as this much time.
const MAX_FRAME_STEP_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationKind {
    Confetti,
    Fireworks,
}

impl CelebrationKind {
    /// Round-robin order.
    pub const ROTATION: [CelebrationKind; 2] = [CelebrationKind::Confetti, CelebrationKind::Fireworks];

    /// How long the surface outlives a stop.
    pub fn teardown_grace_ms(self) -> u64 {
        match self {
            CelebrationKind::Confetti => confetti::TEARDOWN_GRACE_MS,
            CelebrationKind::Fireworks => fireworks::TEARDOWN_GRACE_MS,
        }
    }

    fn emission_interval_ms(self) -> u64 {
        match self {
            CelebrationKind::Confetti => confetti::BURST_INTERVAL_MS,
            CelebrationKind::Fireworks => fireworks::LAUNCH_INTERVAL_MS,
        }
    }
}

impl fmt::Display for CelebrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CelebrationKind::Confetti => "confetti",
            CelebrationKind::Fireworks => "fireworks",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingLaunch {
    at: Millis,
    /// Follow-up shots never roll for a double themselves.
    may_double: bool,
}

/// One bounded celebration: an emission schedule plus the particles it
/// has produced so far.
#[derive(Debug, Clone)]
pub struct CelebrationRun {
    kind: CelebrationKind,
    anchor: Point,
    viewport: Viewport,
    colors: ColorMode,
    started_at: Millis,
    stopped_at: Option<Millis>,
    last_frame_at: Millis,
    next_emission_at: Millis,
    pending: Vec<PendingLaunch>,
    particles: Vec<Particle>,
    emissions: u32,
}

impl CelebrationRun {
    pub fn new(
        kind: CelebrationKind,
        anchor: Point,
        viewport: Viewport,
        now: Millis,
        rng: &mut impl Rng,
    ) -> Self {
        let mut pending = Vec::new();
        if kind == CelebrationKind::Fireworks {
            pending.push(PendingLaunch {
                at: now + fireworks::SECOND_LAUNCH_MS,
                may_double: true,
            });
        }
        Self {
            kind,
            anchor,
            viewport,
            colors: ColorMode::random(rng),
            started_at: now,
            stopped_at: None,
            last_frame_at: now,
            next_emission_at: now,
            pending,
            particles: Vec::new(),
            emissions: 0,
        }
    }

    pub fn kind(&self) -> CelebrationKind {
        self.kind
    }

    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    pub fn is_emitting(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Bursts or rocket launches so far.
    pub fn emissions(&self) -> u32 {
        self.emissions
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Halt emission. Particles already in flight keep animating until the
    /// grace period ends. Returns `false` if the run was already stopped.
    pub fn stop(&mut self, now: Millis) -> bool {
        if self.stopped_at.is_some() {
            return false;
        }
        self.stopped_at = Some(now);
        self.pending.clear();
        true
    }

    /// Stopped, and the grace period has passed.
    pub fn is_finished(&self, now: Millis) -> bool {
        self.stopped_at
            .is_some_and(|at| now >= at + self.kind.teardown_grace_ms())
    }

    /// Emit whatever is due, then step and reap particles.
    ///
    /// Returns `true` if the run stopped itself during this call because
    /// its window elapsed.
    pub fn advance(&mut self, now: Millis, rng: &mut impl Rng) -> bool {
        let mut stopped_now = false;
        if self.is_emitting() {
            self.emit_due(now, rng);
            if now.saturating_sub(self.started_at) > CELEBRATION_WINDOW_MS {
                stopped_now = self.stop(now);
            }
        }
        self.simulate(now, rng);
        stopped_now
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for particle in &self.particles {
            canvas.draw(&particle.sprite());
        }
    }

    fn emit_due(&mut self, now: Millis, rng: &mut impl Rng) {
        let window_end = self.started_at + CELEBRATION_WINDOW_MS;
        while self.next_emission_at <= now && self.next_emission_at <= window_end {
            let at = self.next_emission_at;
            self.emit(at, true, rng);
            self.next_emission_at += self.kind.emission_interval_ms();
        }

        let mut due = Vec::new();
        self.pending.retain(|launch| {
            if launch.at <= now {
                due.push(*launch);
                false
            } else {
                true
            }
        });
        for launch in due {
            self.emit(launch.at, launch.may_double, rng);
        }
    }

    fn emit(&mut self, at: Millis, may_double: bool, rng: &mut impl Rng) {
        self.emissions += 1;
        match self.kind {
            CelebrationKind::Confetti => {
                let pieces = confetti::burst(self.anchor, &self.colors, rng);
                self.particles
                    .extend(pieces.into_iter().map(Particle::Confetti));
            }
            CelebrationKind::Fireworks => {
                self.particles
                    .push(Particle::Rocket(Rocket::launch(self.viewport, rng)));
                if may_double && rng.gen_bool(fireworks::DOUBLE_SHOT_CHANCE) {
                    self.pending.push(PendingLaunch {
                        at: at + rng.gen_range(fireworks::DOUBLE_SHOT_GAP_MS),
                        may_double: false,
                    });
                }
            }
        }
    }

    fn simulate(&mut self, now: Millis, rng: &mut impl Rng) {
        let dt = now.saturating_sub(self.last_frame_at).min(MAX_FRAME_STEP_MS) as f32;
        self.last_frame_at = now;
        if dt == 0.0 {
            return;
        }

        let viewport = self.viewport;
        let mut spawned = Vec::new();
        self.particles.retain_mut(|particle| match particle {
            Particle::Rocket(rocket) => {
                let step = rocket.step(dt);
                let at = rocket.position();
                for _ in 0..step.embers {
                    spawned.push(Particle::Spark(Spark::ember(at, rng)));
                }
                match step.detonated_at {
                    Some(target) => {
                        let (flash, sparks) = fireworks::detonate(target, rng);
                        spawned.push(Particle::Flash(flash));
                        spawned.extend(sparks.into_iter().map(Particle::Spark));
                        false
                    }
                    None => true,
                }
            }
            other => other.step_passive(dt, viewport),
        });
        self.particles.append(&mut spawned);
    }
}
