/// Scene primitives: colored points and flat polygons
use nalgebra::Point2;

use crate::camera::Camera;
use crate::canvas::Color;
use crate::error::{Error, Result};
use crate::projection::{Projection, Viewport};
use crate::vector::Vector3;

/// A colored world-space point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Vector3,
    pub color: Color,
}

impl Point {
    pub fn new(position: Vector3, color: Color) -> Self {
        Self { position, color }
    }

    pub fn from_components(x: f64, y: f64, z: f64, color: Color) -> Self {
        Self::new(Vector3::new(x, y, z), color)
    }

    pub fn distance(&self, camera: &Camera) -> f64 {
        camera.distance_to(self.position)
    }

    pub fn project(&self, camera: &Camera, viewport: Viewport) -> Option<Projection> {
        camera.project(self.position, viewport)
    }
}

/// A closed, filled polygon.
///
/// The outline stores the first vertex again at the end; it is appended once
/// here and never on access.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    outline: Vec<Vector3>,
    pub color: Color,
}

impl Polygon {
    /// Build from an open vertex list (a trailing copy of the first vertex is tolerated).
    pub fn new(mut vertices: Vec<Vector3>, color: Color) -> Result<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let distinct = count_distinct(&vertices);
        if distinct < 3 {
            return Err(Error::DegeneratePolygon(distinct));
        }
        let first = vertices[0];
        vertices.push(first);
        Ok(Self {
            outline: vertices,
            color,
        })
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Vector3] {
        &self.outline[..self.outline.len() - 1]
    }

    /// The closed loop, first vertex repeated at the end.
    pub fn outline(&self) -> &[Vector3] {
        &self.outline
    }

    /// Mean Euclidean distance from the camera position to the vertices.
    ///
    /// This is what the painter's sort orders by. It is not camera-space depth,
    /// so large or oblique polygons can be misordered.
    pub fn distance(&self, camera: &Camera) -> f64 {
        let vertices = self.vertices();
        let total: f64 = vertices.iter().map(|v| camera.distance_to(*v)).sum();
        total / vertices.len() as f64
    }

    /// Screen-space outline, or `None` if any vertex is culled.
    ///
    /// There is no near-plane clipping: one vertex behind the camera drops the
    /// whole polygon.
    pub fn project(&self, camera: &Camera, viewport: Viewport) -> Option<Vec<Point2<f64>>> {
        self.outline
            .iter()
            .map(|v| camera.project(*v, viewport).map(|p| p.position))
            .collect()
    }
}

fn count_distinct(vertices: &[Vector3]) -> usize {
    vertices
        .iter()
        .enumerate()
        .filter(|&(i, v)| !vertices[..i].contains(v))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quaternion::Quaternion;
    use approx::assert_abs_diff_eq;

    fn camera_at_origin() -> Camera {
        Camera::with_pose(Vector3::ZERO, Quaternion::IDENTITY).unwrap()
    }

    fn triangle(z: f64) -> Polygon {
        Polygon::new(
            vec![
                Vector3::new(0.0, 0.0, z),
                Vector3::new(1.0, 0.0, z),
                Vector3::new(0.0, 1.0, z),
            ],
            Color::RED,
        )
        .unwrap()
    }

    #[test]
    fn test_polygon_closes_loop_once() {
        let polygon = triangle(2.0);
        assert_eq!(polygon.vertices().len(), 3);
        assert_eq!(polygon.outline().len(), 4);
        assert_eq!(polygon.outline()[0], polygon.outline()[3]);
        // Reading twice does not grow it.
        assert_eq!(polygon.outline().len(), 4);
    }

    #[test]
    fn test_polygon_accepts_already_closed_input() {
        let a = Vector3::new(0.0, 0.0, 1.0);
        let polygon = Polygon::new(
            vec![a, Vector3::new(1.0, 0.0, 1.0), Vector3::new(1.0, 1.0, 1.0), a],
            Color::BLUE,
        )
        .unwrap();
        assert_eq!(polygon.outline().len(), 4);
    }

    #[test]
    fn test_polygon_rejects_too_few_distinct_points() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(
            Polygon::new(vec![a, b, b], Color::BLACK),
            Err(Error::DegeneratePolygon(2))
        );
        assert_eq!(
            Polygon::new(vec![a, a, a, a], Color::BLACK),
            Err(Error::DegeneratePolygon(1))
        );
        assert_eq!(Polygon::new(vec![], Color::BLACK), Err(Error::DegeneratePolygon(0)));
    }

    #[test]
    fn test_polygon_distance_is_mean_of_vertices() {
        let camera = camera_at_origin();
        let polygon = Polygon::new(
            vec![
                Vector3::new(3.0, 0.0, 0.0),
                Vector3::new(0.0, 5.0, 0.0),
                Vector3::new(0.0, 0.0, 7.0),
            ],
            Color::GREEN,
        )
        .unwrap();
        assert_abs_diff_eq!(polygon.distance(&camera), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_culled_if_any_vertex_behind() {
        let camera = camera_at_origin();
        let viewport = Viewport::new(100.0, 100.0);
        assert_eq!(triangle(2.0).project(&camera, viewport).map(|o| o.len()), Some(4));

        let straddling = Polygon::new(
            vec![
                Vector3::new(0.0, 0.0, 5.0),
                Vector3::new(1.0, 0.0, 5.0),
                Vector3::new(0.0, 1.0, -0.5),
            ],
            Color::RED,
        )
        .unwrap();
        assert!(straddling.project(&camera, viewport).is_none());
    }

    #[test]
    fn test_point_distance_and_projection() {
        let camera = camera_at_origin();
        let point = Point::from_components(0.0, 3.0, 4.0, Color::WHITE);
        assert_eq!(point.distance(&camera), 5.0);
        assert!(point.project(&camera, Viewport::new(10.0, 10.0)).is_some());
        let behind = Point::from_components(0.0, 0.0, -1.0, Color::WHITE);
        assert!(behind.project(&camera, Viewport::new(10.0, 10.0)).is_none());
    }
}
