//! Celebration engine.
//!
//! Owns at most one active [`CelebrationRun`] plus any stopped runs still
//! inside their teardown grace. The host calls [`CelebrationEngine::frame`]
//! once per rendering frame; nothing here spawns tasks or sleeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::canvas::Canvas;
use super::geometry::{Point, Viewport};
use super::run::{CelebrationKind, CelebrationRun};
use crate::clock::Millis;
use crate::events::Event;
use crate::ports::MotionPreference;

/// Returned by [`CelebrationEngine::start_next`].
///
/// `stop()` may be called from anywhere, any number of times. The engine
/// applies it on its next frame.
#[derive(Debug, Clone)]
pub struct CelebrationHandle {
    kind: Option<CelebrationKind>,
    cancel: Arc<AtomicBool>,
}

impl CelebrationHandle {
    /// A handle for a run that never started.
    fn inert() -> Self {
        Self {
            kind: None,
            cancel: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// `None` when the start was suppressed by reduced motion.
    pub fn kind(&self) -> Option<CelebrationKind> {
        self.kind
    }
}

struct ActiveRun {
    run: CelebrationRun,
    cancel: Arc<AtomicBool>,
}

pub struct CelebrationEngine {
    /// Advances on every real start. Never reset.
    cursor: usize,
    active: Option<ActiveRun>,
    retiring: Vec<CelebrationRun>,
    rng: Pcg64,
    motion: Arc<dyn MotionPreference>,
    viewport: Viewport,
    events: Vec<Event>,
}

impl CelebrationEngine {
    pub fn new(motion: Arc<dyn MotionPreference>) -> Self {
        Self::with_rng(motion, Pcg64::from_entropy())
    }

    /// Deterministic particles, for tests and `celebrate --seed`.
    pub fn with_seed(motion: Arc<dyn MotionPreference>, seed: u64) -> Self {
        Self::with_rng(motion, Pcg64::seed_from_u64(seed))
    }

    fn with_rng(motion: Arc<dyn MotionPreference>, rng: Pcg64) -> Self {
        Self {
            cursor: 0,
            active: None,
            retiring: Vec::new(),
            rng,
            motion,
            viewport: Viewport::default(),
            events: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(active) = self.active.as_mut() {
            active.run.set_viewport(viewport);
        }
        for run in &mut self.retiring {
            run.set_viewport(viewport);
        }
    }

    /// The kind the next successful `start_next` will run.
    pub fn next_kind(&self) -> CelebrationKind {
        let rotation = CelebrationKind::ROTATION;
        rotation[self.cursor % rotation.len()]
    }

    pub fn active_kind(&self) -> Option<CelebrationKind> {
        self.active.as_ref().map(|a| a.run.kind())
    }

    /// Stop the current run, then start the next kind in rotation at
    /// `anchor`.
    ///
    /// With reduced motion requested the previous run is still stopped,
    /// nothing starts, the cursor stays put, and the returned handle is
    /// already stopped.
    pub fn start_next(&mut self, anchor: Point, now: Millis) -> CelebrationHandle {
        self.stop(now);
        if self.motion.prefers_reduced_motion() {
            tracing::debug!("reduced motion requested, celebration skipped");
            return CelebrationHandle::inert();
        }

        let kind = self.next_kind();
        self.cursor = (self.cursor + 1) % CelebrationKind::ROTATION.len();

        let run = CelebrationRun::new(kind, anchor, self.viewport, now, &mut self.rng);
        let cancel = Arc::new(AtomicBool::new(false));
        self.active = Some(ActiveRun {
            run,
            cancel: Arc::clone(&cancel),
        });
        tracing::info!(%kind, "celebration started");
        self.events.push(Event::CelebrationStarted {
            kind,
            at: Utc::now(),
        });
        CelebrationHandle {
            kind: Some(kind),
            cancel,
        }
    }

    /// Stop the active run, if any. Its surface lingers for the grace
    /// period. Safe to call repeatedly.
    pub fn stop(&mut self, now: Millis) {
        if let Some(active) = self.active.take() {
            active.cancel.store(true, Ordering::SeqCst);
            self.retire(active.run, now);
        }
    }

    /// One rendering frame: apply handle stops, emit, simulate, reap,
    /// then draw every surviving particle.
    pub fn frame(&mut self, now: Millis, canvas: &mut dyn Canvas) {
        let cancelled = self
            .active
            .as_ref()
            .is_some_and(|a| a.cancel.load(Ordering::SeqCst));
        if cancelled {
            self.stop(now);
        }

        let window_elapsed = match self.active.as_mut() {
            Some(active) => active.run.advance(now, &mut self.rng),
            None => false,
        };
        if window_elapsed {
            self.stop(now);
        }

        for run in &mut self.retiring {
            run.advance(now, &mut self.rng);
        }
        self.retiring.retain(|run| {
            let finished = run.is_finished(now);
            if finished {
                tracing::debug!(kind = %run.kind(), "celebration surface removed");
            }
            !finished
        });

        canvas.begin_frame(self.viewport);
        for run in &self.retiring {
            run.draw(canvas);
        }
        if let Some(active) = &self.active {
            active.run.draw(canvas);
        }
        canvas.end_frame();
    }

    /// A run is emitting.
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Something is still on screen, emitting or in grace.
    pub fn has_surface(&self) -> bool {
        self.active.is_some() || !self.retiring.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        let retiring: usize = self.retiring.iter().map(|r| r.particles().len()).sum();
        retiring
            + self
                .active
                .as_ref()
                .map_or(0, |a| a.run.particles().len())
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn retire(&mut self, mut run: CelebrationRun, now: Millis) {
        run.stop(now);
        let kind = run.kind();
        tracing::info!(%kind, "celebration stopped");
        self.events.push(Event::CelebrationStopped {
            kind,
            at: Utc::now(),
        });
        self.retiring.push(run);
    }
}
