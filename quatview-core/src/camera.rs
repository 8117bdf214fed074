/// Quaternion camera: pose, intrinsics and the point projection
use log::debug;
use nalgebra::{Matrix3, Point2};

use crate::error::{Error, Result};
use crate::projection::{is_visible_depth, Projection, Viewport};
use crate::quaternion::Quaternion;
use crate::vector::Vector3;

/// Camera with a full 3-axis orientation.
///
/// Camera-local axes: +x is right, +y is up, +z is forward. The rotation
/// matrix is cached and refreshed whenever the orientation changes, so every
/// projection in a frame reuses it.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3,
    orientation: Quaternion,
    fov_angle: f64,
    fov: f64,
    aspect_ratio: f64,
    /// Columns are the camera's right, up and forward axes in world space.
    rotation: Matrix3<f64>,
    /// Transpose of `rotation`; maps world offsets into camera space.
    view: Matrix3<f64>,
}

impl Camera {
    pub const DEFAULT_FOV_ANGLE: f64 = 80.0;

    pub fn new() -> Self {
        let mut camera = Self {
            position: Vector3::new(0.0, 2.0, -5.0),
            orientation: Quaternion::IDENTITY,
            fov_angle: Self::DEFAULT_FOV_ANGLE,
            fov: fov_scale(Self::DEFAULT_FOV_ANGLE),
            aspect_ratio: 1.0,
            rotation: Matrix3::identity(),
            view: Matrix3::identity(),
        };
        camera.refresh_rotation();
        camera
    }

    /// Camera at `position` with the given orientation (normalized here).
    pub fn with_pose(position: Vector3, orientation: Quaternion) -> Result<Self> {
        let mut camera = Self::new();
        camera.position = position;
        camera.set_orientation(orientation)?;
        Ok(camera)
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quaternion) -> Result<()> {
        self.orientation = orientation.normalize()?;
        self.refresh_rotation();
        Ok(())
    }

    pub fn fov_angle(&self) -> f64 {
        self.fov_angle
    }

    /// `2 * tan(fov_angle / 2)`, the factor mapping normalized coordinates to pixels.
    pub fn fov_scale(&self) -> f64 {
        self.fov
    }

    pub fn set_fov(&mut self, angle_degrees: f64) -> Result<()> {
        if !(angle_degrees > 0.0 && angle_degrees < 180.0) {
            return Err(Error::InvalidFov(angle_degrees));
        }
        self.fov_angle = angle_degrees;
        self.fov = fov_scale(angle_degrees);
        debug!("fov set to {angle_degrees} degrees (scale {:.4})", self.fov);
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) -> Result<()> {
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(Error::InvalidAspectRatio(aspect_ratio));
        }
        self.aspect_ratio = aspect_ratio;
        Ok(())
    }

    pub fn rotation_matrix(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn right(&self) -> Vector3 {
        self.rotation.column(0).into_owned().into()
    }

    pub fn up(&self) -> Vector3 {
        self.rotation.column(1).into_owned().into()
    }

    pub fn forward(&self) -> Vector3 {
        self.rotation.column(2).into_owned().into()
    }

    /// Rotate by `delta` radians about the camera's own x, y and z axes.
    ///
    /// The three single-axis rotations are composed in x, y, z order onto the
    /// right of the current orientation (`q * qx * qy * qz`), which makes each
    /// one act about the current local axis rather than the world axis.
    /// Returns `false` without touching anything when `delta` is zero.
    pub fn rotate_local(&mut self, delta: Vector3) -> Result<bool> {
        if delta.is_zero() {
            return Ok(false);
        }
        let qx = Quaternion::from_unit_axis_angle(Vector3::X, delta.x);
        let qy = Quaternion::from_unit_axis_angle(Vector3::Y, delta.y);
        let qz = Quaternion::from_unit_axis_angle(Vector3::Z, delta.z);
        self.orientation = (self.orientation * qx * qy * qz).normalize()?;
        self.refresh_rotation();
        Ok(true)
    }

    /// Map a camera-local offset into world space.
    pub fn world_delta(&self, local: Vector3) -> Vector3 {
        (self.rotation * nalgebra::Vector3::from(local)).into()
    }

    /// Move by a camera-local offset. Returns `false` when `local` is zero.
    pub fn translate_local(&mut self, local: Vector3) -> bool {
        if local.is_zero() {
            return false;
        }
        self.position = self.position + self.world_delta(local);
        true
    }

    pub fn to_camera_space(&self, world: Vector3) -> Vector3 {
        (self.view * nalgebra::Vector3::from(world - self.position)).into()
    }

    pub fn distance_to(&self, world: Vector3) -> f64 {
        self.position.distance(world)
    }

    /// Project a world-space point onto the viewport.
    ///
    /// Returns `None` when the point is at or behind the camera plane, or when
    /// the result would not be finite.
    pub fn project(&self, world: Vector3, viewport: Viewport) -> Option<Projection> {
        let local = self.to_camera_space(world);
        if !is_visible_depth(local.z) {
            return None;
        }
        let ndc_x = local.x / local.z;
        let ndc_y = local.y / local.z;
        let center = viewport.center();
        let x = ndc_x * viewport.width / self.fov + center.x;
        let y = -ndc_y * viewport.width / (self.fov / self.aspect_ratio) + center.y;
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        Some(Projection {
            position: Point2::new(x, y),
            depth: local.z,
        })
    }

    /// Inverse of [`Camera::project`] for a known depth: the camera-space point
    /// that lands on `screen`.
    pub fn unproject(&self, screen: Point2<f64>, depth: f64, viewport: Viewport) -> Vector3 {
        let center = viewport.center();
        let ndc_x = (screen.x - center.x) * self.fov / viewport.width;
        let ndc_y = -(screen.y - center.y) * (self.fov / self.aspect_ratio) / viewport.width;
        Vector3::new(ndc_x * depth, ndc_y * depth, depth)
    }

    fn refresh_rotation(&mut self) {
        self.rotation = self.orientation.rotation_matrix();
        self.view = self.rotation.transpose();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

fn fov_scale(angle_degrees: f64) -> f64 {
    2.0 * (angle_degrees / 2.0).to_radians().tan()
}
