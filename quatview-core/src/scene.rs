/// Scene contents, painter's-order sorting and drawing
use log::{debug, warn};

use crate::camera::Camera;
use crate::canvas::{Canvas, Color};
use crate::error::{Error, Result};
use crate::geometry::{Point, Polygon};
use crate::projection::Viewport;
use crate::vector::Vector3;

/// Number of floats per triangle in an ingested coordinate sequence.
pub const FLOATS_PER_TRIANGLE: usize = 9;

/// Sizes and colors used when drawing a frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    /// Edge length of the square marker drawn for each point.
    pub point_size: f64,
    /// Edge length of the square drawn at the viewport center.
    pub crosshair_size: f64,
    pub crosshair_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            point_size: 10.0,
            crosshair_size: 4.0,
            crosshair_color: Color::BLACK,
        }
    }
}

/// The camera plus every point and polygon currently loaded.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub camera: Camera,
    points: Vec<Point>,
    polygons: Vec<Polygon>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            points: Vec::new(),
            polygons: Vec::new(),
        }
    }

    /// Six colored faces of a 4x4x4 box at the origin, with colored points
    /// marking the positive x, y and z axes.
    pub fn demo() -> Self {
        let mut scene = Self::new(Camera::new());
        for (axis, color) in [
            (Vector3::X, Color::RED),
            (Vector3::Y, Color::GREEN),
            (Vector3::Z, Color::BLUE),
        ] {
            for step in 1..=40 {
                scene.add_point(Point::new(axis * (step as f64 * 0.1), color));
            }
        }

        let v = |x: f64, y: f64, z: f64| Vector3::new(x, y, z);
        let faces = [
            ([v(0., 0., 0.), v(0., 4., 0.), v(0., 4., 4.), v(0., 0., 4.)], Color::GREEN),
            ([v(0., 0., 0.), v(4., 0., 0.), v(4., 4., 0.), v(0., 4., 0.)], Color::RED),
            ([v(0., 0., 0.), v(0., 0., 4.), v(4., 0., 4.), v(4., 0., 0.)], Color::BLUE),
            ([v(4., 0., 0.), v(4., 4., 0.), v(4., 4., 4.), v(4., 0., 4.)], Color::GREEN),
            ([v(0., 0., 4.), v(4., 0., 4.), v(4., 4., 4.), v(0., 4., 4.)], Color::RED),
            ([v(0., 4., 0.), v(0., 4., 4.), v(4., 4., 4.), v(4., 4., 0.)], Color::BLUE),
        ];
        scene.polygons = faces
            .into_iter()
            .filter_map(|(corners, color)| Polygon::new(corners.to_vec(), color).ok())
            .collect();
        scene
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Swap in a new polygon list wholesale, returning the old one.
    pub fn replace_polygons(&mut self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        std::mem::replace(&mut self.polygons, polygons)
    }

    /// Drop all points and polygons. The camera is kept.
    pub fn reset(&mut self) {
        self.points.clear();
        self.polygons.clear();
    }

    /// Replace the polygon list with one triangle per 9 coordinates.
    ///
    /// `color` is called once per triangle. The whole list is built before the
    /// swap, so on error the current polygons are left exactly as they were.
    /// Triangles with fewer than 3 distinct corners are skipped. Returns the
    /// number of polygons loaded.
    pub fn ingest_mesh<F>(&mut self, coordinates: &[f64], mut color: F) -> Result<usize>
    where
        F: FnMut() -> Color,
    {
        if coordinates.len() % FLOATS_PER_TRIANGLE != 0 {
            return Err(Error::MalformedMesh(format!(
                "{} coordinates is not a multiple of {}",
                coordinates.len(),
                FLOATS_PER_TRIANGLE
            )));
        }
        if let Some(index) = coordinates.iter().position(|c| !c.is_finite()) {
            return Err(Error::MalformedMesh(format!(
                "coordinate {index} is not finite"
            )));
        }

        let mut polygons = Vec::with_capacity(coordinates.len() / FLOATS_PER_TRIANGLE);
        let mut skipped = 0;
        for (index, triangle) in coordinates.chunks_exact(FLOATS_PER_TRIANGLE).enumerate() {
            let corners = triangle
                .chunks_exact(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect();
            match Polygon::new(corners, color()) {
                Ok(polygon) => polygons.push(polygon),
                Err(err) => {
                    warn!("skipping triangle {index}: {err}");
                    skipped += 1;
                }
            }
        }

        let loaded = polygons.len();
        self.polygons = polygons;
        debug!("ingested mesh: {loaded} polygons, {skipped} degenerate triangles skipped");
        Ok(loaded)
    }

    /// [`Scene::ingest_mesh`] with a random color per triangle.
    pub fn ingest_mesh_random(&mut self, coordinates: &[f64]) -> Result<usize> {
        let mut rng = rand::thread_rng();
        self.ingest_mesh(coordinates, || Color::random(&mut rng))
    }

    /// Stable-sort points and polygons independently, farthest from the camera first.
    pub fn sort_by_distance(&mut self) {
        let camera = &self.camera;
        sort_far_to_near(&mut self.points, |p| p.distance(camera));
        sort_far_to_near(&mut self.polygons, |p| p.distance(camera));
    }

    /// Clear the canvas, draw points then polygons in their current order,
    /// then the crosshair. Call [`Scene::sort_by_distance`] first for
    /// painter's order.
    pub fn render<C: Canvas>(&self, canvas: &mut C, viewport: Viewport, style: &RenderStyle) {
        canvas.clear(viewport.width, viewport.height);

        let half = style.point_size / 2.0;
        for point in &self.points {
            if let Some(projected) = point.project(&self.camera, viewport) {
                canvas.fill_rect(
                    projected.position.x - half,
                    projected.position.y - half,
                    style.point_size,
                    style.point_size,
                    point.color,
                );
            }
        }

        for polygon in &self.polygons {
            if let Some(outline) = polygon.project(&self.camera, viewport) {
                canvas.fill_path(&outline, polygon.color);
            }
        }

        let center = viewport.center();
        let half = style.crosshair_size / 2.0;
        canvas.fill_rect(
            center.x - half,
            center.y - half,
            style.crosshair_size,
            style.crosshair_size,
            style.crosshair_color,
        );
    }
}

/// Each key is computed once per item, then a stable descending sort.
fn sort_far_to_near<T, F>(items: &mut Vec<T>, distance: F)
where
    F: Fn(&T) -> f64,
{
    let mut keyed: Vec<(f64, T)> = items.drain(..).map(|item| (distance(&item), item)).collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}
