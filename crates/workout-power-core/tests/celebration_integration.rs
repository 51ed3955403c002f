//! Integration tests for the celebration engine: rotation, teardown and
//! the frame loop as seen through a canvas.

use std::sync::Arc;

use workout_power_core::celebration::{Canvas, Shape, Sprite};
use workout_power_core::ports::StaticMotion;
use workout_power_core::{CelebrationEngine, CelebrationKind, Event, Point, Viewport};

#[derive(Default)]
struct CountingCanvas {
    frames: usize,
    last_frame: Vec<Sprite>,
    current: Vec<Sprite>,
}

impl Canvas for CountingCanvas {
    fn begin_frame(&mut self, _viewport: Viewport) {
        self.current.clear();
    }

    fn draw(&mut self, sprite: &Sprite) {
        self.current.push(*sprite);
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        self.last_frame = std::mem::take(&mut self.current);
    }
}

fn engine(seed: u64) -> CelebrationEngine {
    CelebrationEngine::with_seed(Arc::new(StaticMotion(false)), seed)
}

fn run_frames(engine: &mut CelebrationEngine, canvas: &mut CountingCanvas, from: u64, to: u64) {
    let mut now = from;
    while now <= to {
        engine.frame(now, canvas);
        now += 16;
    }
}

#[test]
fn test_confetti_run_lifecycle() {
    let mut e = engine(7);
    let mut canvas = CountingCanvas::default();
    let anchor = Point::new(640.0, 360.0);
    let handle = e.start_next(anchor, 0);
    assert_eq!(handle.kind(), Some(CelebrationKind::Confetti));

    run_frames(&mut e, &mut canvas, 0, 500);
    assert!(!canvas.last_frame.is_empty());
    assert!(canvas.last_frame.iter().all(|s| s.shape == Shape::Rect));

    // The window closes on its own after 10 s, then the grace runs out.
    run_frames(&mut e, &mut canvas, 516, 10_016);
    assert!(!e.is_animating());
    assert!(e.has_surface());
    run_frames(&mut e, &mut canvas, 10_032, 11_300);
    assert!(!e.has_surface());
    assert!(canvas.last_frame.is_empty());
    assert!(handle.is_stopped());
    assert_eq!(canvas.frames, 32 + 594 + 80);
}

#[test]
fn test_fireworks_draw_rockets_then_sparks() {
    let mut e = engine(8);
    e.set_viewport(Viewport::new(800.0, 600.0));
    e.start_next(Point::default(), 0);
    let handle = e.start_next(Point::default(), 0);
    assert_eq!(handle.kind(), Some(CelebrationKind::Fireworks));

    let mut canvas = CountingCanvas::default();
    run_frames(&mut e, &mut canvas, 0, 300);
    assert!(canvas
        .last_frame
        .iter()
        .any(|s| s.shape == Shape::Dot && s.center.y > 300.0));

    run_frames(&mut e, &mut canvas, 316, 1_600);
    let dots = canvas
        .last_frame
        .iter()
        .filter(|s| s.shape == Shape::Dot)
        .count();
    assert!(dots >= 46, "only {dots} sparks");
}

#[test]
fn test_at_most_one_active_run() {
    let mut e = engine(9);
    let mut canvas = CountingCanvas::default();
    let first = e.start_next(Point::new(100.0, 100.0), 0);
    run_frames(&mut e, &mut canvas, 0, 200);
    let second = e.start_next(Point::new(100.0, 100.0), 200);

    assert!(first.is_stopped());
    assert!(!second.is_stopped());
    assert_eq!(e.active_kind(), Some(CelebrationKind::Fireworks));

    // Past the first run's 1200 ms grace only the second one is left.
    run_frames(&mut e, &mut canvas, 216, 1_400);
    assert!(e.is_animating());
    assert!(canvas.last_frame.iter().all(|s| s.shape != Shape::Rect));
    let events = e.drain_events();
    let stopped: Vec<_> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::CelebrationStopped { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(stopped, vec![CelebrationKind::Confetti]);
}

#[test]
fn test_reduced_motion_disables_celebrations() {
    let mut e = CelebrationEngine::with_seed(Arc::new(StaticMotion(true)), 1);
    let handle = e.start_next(Point::default(), 0);
    assert!(handle.is_stopped());
    assert_eq!(handle.kind(), None);
    assert!(!e.has_surface());
    assert!(e.drain_events().is_empty());
}

#[test]
fn test_new_engine_starts_with_confetti() {
    let mut e = CelebrationEngine::new(Arc::new(StaticMotion(false)));
    assert_eq!(e.next_kind(), CelebrationKind::Confetti);
    e.start_next(Point::default(), 0);
    e.stop(10);
    e.stop(20);
    assert_eq!(e.next_kind(), CelebrationKind::Fireworks);
}
