/// Quatview Core Library - orientation algebra, camera and scene projection
///
/// This library holds everything the viewer computes: vector and quaternion
/// math, the quaternion camera, point/polygon projection, painter's-order
/// sorting, keyboard-to-motion mapping, STL decoding and the per-tick frame
/// loop. Drawing surfaces, key sources and clocks are supplied by a host.

pub mod camera;
pub mod canvas;
pub mod error;
pub mod geometry;
pub mod input;
pub mod projection;
pub mod quaternion;
pub mod scene;
pub mod stl;
pub mod vector;
pub mod viewer;

// Re-export commonly used types
pub use camera::Camera;
pub use canvas::{Canvas, Color};
pub use error::{Error, Result};
pub use geometry::{Point, Polygon};
pub use input::{Command, KeyBindings, KeyState, Motion, MotionMapper};
pub use projection::{Projection, Viewport};
pub use quaternion::Quaternion;
pub use scene::{RenderStyle, Scene};
pub use vector::Vector3;
pub use viewer::{Viewer, ViewerConfig};
