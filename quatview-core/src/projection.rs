/// Screen-space types shared by the camera and the renderer
use nalgebra::Point2;

/// Size of the drawing surface in pixels. Hosts pass a fresh one every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A world-space point mapped into the viewport.
///
/// `position` is the exact projected pixel location (no marker offset applied)
/// and `depth` is the camera-space z of the point, always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub position: Point2<f64>,
    pub depth: f64,
}

/// Anything at or behind the camera plane is culled.
pub fn is_visible_depth(depth: f64) -> bool {
    depth > 0.0
}
