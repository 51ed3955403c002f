use super::color::Color;
use super::geometry::{Point, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Rotated rectangle (confetti).
    Rect,
    /// Round dot (sparks, rockets).
    Dot,
    /// Soft growing glow (flash, embers).
    Glow,
}

/// One particle, ready to paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub shape: Shape,
    pub center: Point,
    pub width: f32,
    pub height: f32,
    pub rotation_deg: f32,
    pub color: Color,
    /// 0 (invisible) to 1.
    pub opacity: f32,
}

/// The celebration's rendering surface.
///
/// Called once per frame: `begin_frame`, one `draw` per live particle,
/// then `end_frame`. An empty frame clears the surface.
pub trait Canvas {
    fn begin_frame(&mut self, viewport: Viewport);

    fn draw(&mut self, sprite: &Sprite);

    fn end_frame(&mut self);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn begin_frame(&mut self, _viewport: Viewport) {}

    fn draw(&mut self, _sprite: &Sprite) {}

    fn end_frame(&mut self) {}
}
