/// Fixed-period frame loop: one `tick` per clock period until `stop`
use std::f64::consts::PI;
use std::time::Duration;

use log::{info, trace};

use crate::canvas::Canvas;
use crate::error::Result;
use crate::input::{KeyBindings, KeyState, MotionMapper};
use crate::projection::Viewport;
use crate::scene::{RenderStyle, Scene};

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// World units moved per tick while a movement key is held.
    pub movement_speed: f64,
    /// Radians turned per tick while a rotation key is held.
    pub rotation_speed: f64,
    /// Period the host should call [`Viewer::tick`] at.
    pub tick_interval: Duration,
    pub bindings: KeyBindings,
    pub style: RenderStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            movement_speed: 0.15,
            rotation_speed: PI / 100.0,
            tick_interval: Duration::from_millis(50),
            bindings: KeyBindings::default(),
            style: RenderStyle::default(),
        }
    }
}

/// Owns the scene and advances it one frame per tick.
///
/// Ticks are not re-entrant: the host calls [`Viewer::tick`] from a single
/// thread, and anything that changes the scene (such as a finished mesh load)
/// is applied between ticks.
pub struct Viewer {
    scene: Scene,
    mapper: MotionMapper,
    style: RenderStyle,
    tick_interval: Duration,
    running: bool,
    frames: u64,
}

impl Viewer {
    pub fn new(scene: Scene, config: ViewerConfig) -> Self {
        Self {
            scene,
            mapper: MotionMapper::new(
                config.bindings,
                config.movement_speed,
                config.rotation_speed,
            ),
            style: config.style,
            tick_interval: config.tick_interval,
            running: true,
            frames: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one frame: move the camera from the held keys, re-sort by
    /// distance and redraw. Returns `false` (and does nothing) once stopped.
    pub fn tick<C: Canvas>(
        &mut self,
        keys: &KeyState,
        canvas: &mut C,
        viewport: Viewport,
    ) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }

        let motion = self.mapper.motion(keys);
        motion.apply(&mut self.scene.camera)?;
        self.scene.sort_by_distance();
        self.scene.render(canvas, viewport, &self.style);
        self.frames += 1;

        trace!(
            "frame {}: camera at {:?}, {} points, {} polygons",
            self.frames,
            self.scene.camera.position(),
            self.scene.points().len(),
            self.scene.polygons().len()
        );
        Ok(true)
    }

    /// Cancel all future ticks.
    pub fn stop(&mut self) {
        if self.running {
            info!("viewer stopped after {} frames", self.frames);
        }
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::canvas::recording::{DrawCommand, RecordingCanvas};
    use crate::canvas::Color;
    use crate::geometry::Point;
    use crate::quaternion::Quaternion;
    use crate::vector::Vector3;
    use approx::assert_abs_diff_eq;

    fn viewer() -> Viewer {
        let camera = Camera::with_pose(Vector3::ZERO, Quaternion::IDENTITY).unwrap();
        Viewer::new(Scene::new(camera), ViewerConfig::default())
    }

    #[test]
    fn test_config_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.movement_speed, 0.15);
        assert_eq!(config.rotation_speed, PI / 100.0);
    }

    #[test]
    fn test_tick_moves_camera_and_draws() {
        let mut viewer = viewer();
        let mut keys = KeyState::new();
        keys.press("w");
        let mut canvas = RecordingCanvas::default();
        assert!(viewer.tick(&keys, &mut canvas, Viewport::new(100.0, 100.0)).unwrap());
        assert_abs_diff_eq!(
            viewer.scene().camera.position(),
            Vector3::new(0.0, 0.0, 0.15),
            epsilon = 1e-12
        );
        assert_eq!(viewer.frames(), 1);
        assert_eq!(canvas.commands[0], DrawCommand::Clear(100.0, 100.0));
    }

    #[test]
    fn test_tick_sorts_before_drawing() {
        let mut viewer = viewer();
        for (d, color) in [(1.0, Color::RED), (8.0, Color::GREEN), (2.0, Color::BLUE)] {
            viewer
                .scene_mut()
                .add_point(Point::from_components(0.0, 0.0, d, color));
        }
        let mut canvas = RecordingCanvas::default();
        viewer
            .tick(&KeyState::new(), &mut canvas, Viewport::new(50.0, 50.0))
            .unwrap();
        let colors: Vec<Color> = canvas
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![Color::GREEN, Color::BLUE, Color::RED, Color::BLACK]);
    }

    #[test]
    fn test_fifty_yaw_ticks_make_a_quarter_turn() {
        let mut viewer = viewer();
        let right = viewer.scene().camera.right();
        let mut keys = KeyState::new();
        keys.press("ArrowRight");
        let mut canvas = RecordingCanvas::default();
        for _ in 0..50 {
            viewer
                .tick(&keys, &mut canvas, Viewport::new(10.0, 10.0))
                .unwrap();
        }
        assert_abs_diff_eq!(viewer.scene().camera.forward(), right, epsilon = 1e-9);
    }

    #[test]
    fn test_stop_cancels_future_ticks() {
        let mut viewer = viewer();
        viewer.stop();
        assert!(!viewer.is_running());
        let mut keys = KeyState::new();
        keys.press("w");
        let mut canvas = RecordingCanvas::default();
        assert!(!viewer.tick(&keys, &mut canvas, Viewport::new(10.0, 10.0)).unwrap());
        assert!(canvas.commands.is_empty());
        assert_eq!(viewer.scene().camera.position(), Vector3::ZERO);
    }
}
