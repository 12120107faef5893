/// Camera and the world-to-screen projection pipeline
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{require_positive, RenderError};
use crate::geometry::{deg_to_rad, distance, is_codirectional, rad_to_deg, rotate_pair_with};
use crate::markers::Instrumentation;
use crate::mesh::{Mesh, MeshOptions};
use crate::polygon::Normals;
use crate::transform::{Rotation, Transformable};
use crate::world::{ObjectId, World};

const MARKER: &str = "camera";

/// Pixel size of the draw surface and the world-to-pixel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenGeometry {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl ScreenGeometry {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self { width, height, scale }
    }

    /// Map centred camera-scale coordinates to pixels, origin top-left.
    pub fn to_pixels(&self, x: f64, y: f64) -> Point2<f64> {
        Point2::new(
            x * self.scale + self.width / 2.0,
            self.height - (y * self.scale + self.height / 2.0),
        )
    }
}

/// Per-pass constants derived from the camera and the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub half_width: f64,
    pub half_height: f64,
    /// Sine and cosine of the negated camera angles; `None` when the camera
    /// angle on that axis is zero.
    pub rotate_x: Option<(f64, f64)>,
    pub rotate_y: Option<(f64, f64)>,
    pub rotate_z: Option<(f64, f64)>,
    pub h_ratio: f64,
    pub v_ratio: f64,
}

impl Projection {
    /// Rotate camera-relative coordinates by the inverse x and y angles.
    fn rotate_xy(&self, v: &mut Vector3<f64>) {
        if let Some((sin, cos)) = self.rotate_x {
            let (x, z) = rotate_pair_with(v.x, v.z, sin, cos);
            v.x = x;
            v.z = z;
        }
        if let Some((sin, cos)) = self.rotate_y {
            let (y, z) = rotate_pair_with(v.y, v.z, sin, cos);
            v.y = y;
            v.z = z;
        }
    }

    fn rotate_z(&self, v: &mut Vector3<f64>) {
        if let Some((sin, cos)) = self.rotate_z {
            let (x, y) = rotate_pair_with(v.x, v.y, sin, cos);
            v.x = x;
            v.y = y;
        }
    }

    /// Perspective divide by depth.
    fn perspective(&self, v: &Vector3<f64>) -> (f64, f64) {
        (v.x * self.h_ratio / v.z, v.y * self.v_ratio / v.z)
    }
}

/// A polygon that survived clipping and culling, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPolygon {
    pub object: ObjectId,
    /// Index into the owning mesh's polygon list.
    pub polygon: usize,
    /// Distance from the camera to the polygon centroid.
    pub distance: f64,
    pub normals: Normals,
    pub points: [Point2<f64>; 3],
    /// Filled in by the viewport's lighting pass.
    pub color: Color,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub position: Point3<f64>,
    pub rotation: Rotation,
    /// Horizontal field of view in degrees.
    pub h_fov: f64,
    /// Vertical field of view in degrees.
    pub v_fov: f64,
    /// Far clipping radius.
    pub distance: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Rotation::zero(),
            h_fov: 65.0,
            v_fov: 65.0,
            distance: 100.0,
        }
    }
}

/// The eye. With a zero orientation it looks along +z with +y up.
#[derive(Debug, Clone)]
pub struct Camera {
    body: Mesh,
    h_fov: f64,
    v_fov: f64,
    distance: f64,
}

impl Camera {
    pub fn new(options: CameraOptions) -> Result<Self, RenderError> {
        Ok(Self {
            body: Mesh::new(MeshOptions {
                position: options.position,
                rotation: options.rotation,
                ..MeshOptions::default()
            }),
            h_fov: require_positive("camera.h_fov", options.h_fov)?,
            v_fov: require_positive("camera.v_fov", options.v_fov)?,
            distance: require_positive("camera.distance", options.distance)?,
        })
    }

    pub fn position(&self) -> Point3<f64> {
        self.body.position()
    }

    pub fn orientation(&self) -> Rotation {
        self.body.orientation()
    }

    /// Far clipping radius.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn set_distance(&mut self, distance: f64) -> Result<(), RenderError> {
        self.distance = require_positive("camera.distance", distance)?;
        Ok(())
    }

    pub fn fov(&self) -> (f64, f64) {
        (self.h_fov, self.v_fov)
    }

    pub fn set_fov(&mut self, h_fov: f64, v_fov: f64) -> Result<(), RenderError> {
        self.h_fov = require_positive("camera.h_fov", h_fov)?;
        self.v_fov = require_positive("camera.v_fov", v_fov)?;
        Ok(())
    }

    pub fn move_to(&mut self, target: Point3<f64>) {
        self.body.move_to(target);
    }

    pub fn rotate_to(&mut self, target: Rotation) {
        self.body.rotate_to(target);
    }

    /// Orbit the eye around `pivot` while keeping its orientation.
    pub fn rotate_focused(&mut self, pivot: &Point3<f64>, angles: Rotation) {
        if angles.is_zero() {
            return;
        }
        self.body.rotate(pivot, angles);
        self.body.unwind_orientation(angles);
    }

    /// Constants for one projection pass.
    ///
    /// The FOV ratio is `diagonal / (degrees(atan(radians(fov))) * 10)`, a
    /// tuned approximation kept as-is for visual parity.
    pub fn prepare(&self, screen: &ScreenGeometry) -> Projection {
        let orientation = self.orientation();
        let axis = |deg: f64| (deg != 0.0).then(|| deg_to_rad(-deg).sin_cos());
        let diag = (screen.width.powi(2) + screen.height.powi(2)).sqrt();
        let ratio = |fov: f64| diag / (rad_to_deg(deg_to_rad(fov).atan()) * 10.0);

        Projection {
            half_width: screen.width / screen.scale / 2.0,
            half_height: screen.height / screen.scale / 2.0,
            rotate_x: axis(orientation.x),
            rotate_y: axis(orientation.y),
            rotate_z: axis(orientation.z),
            h_ratio: ratio(self.h_fov),
            v_ratio: ratio(self.v_fov),
        }
    }

    /// Project a single world point to pixels. `None` when the point is
    /// beyond the far radius or behind the camera.
    pub fn normalize_coords(&self, screen: &ScreenGeometry, point: &Point3<f64>) -> Option<Point2<f64>> {
        let projection = self.prepare(screen);
        let eye = self.position();

        if distance(point, &eye) > self.distance {
            return None;
        }

        let mut v = point - eye;
        projection.rotate_xy(&mut v);
        if v.z <= 0.0 {
            return None;
        }
        projection.rotate_z(&mut v);

        let (x, y) = projection.perspective(&v);
        Some(screen.to_pixels(x, y))
    }

    /// Project every renderable polygon of `world` to screen space.
    ///
    /// Polygons are dropped when their centroid is beyond the far radius,
    /// when they face away from the eye, when any vertex is at or behind the
    /// eye plane, or when their projected bounds miss the screen entirely.
    /// The result is sorted farthest first, ready for painting.
    pub fn normalize_polygons(
        &self,
        world: &mut World,
        screen: &ScreenGeometry,
        markers: &mut dyn Instrumentation,
    ) -> Vec<NormalizedPolygon> {
        markers.start(MARKER);

        let projection = self.prepare(screen);
        let eye = self.position();
        markers.log(MARKER, "prepare");

        let mut normalized = Vec::new();
        for (object, scene_object) in world.renderables_mut() {
            for (index, polygon) in scene_object.mesh_mut().polygons_mut().iter_mut().enumerate() {
                let normals = polygon.update_normals();
                let ds = distance(&normals.a, &eye);

                if ds > self.distance {
                    continue;
                }
                markers.log(MARKER, "far clipping");

                if !is_codirectional(&normals.a, &normals.b, &normals.a, &eye) {
                    continue;
                }
                markers.log(MARKER, "backface culling");

                let mut vs = (*polygon.vertices()).map(|pt| pt - eye);
                markers.log(MARKER, "move");

                for v in &mut vs {
                    projection.rotate_xy(v);
                }
                markers.log(MARKER, "rotate ax ay");

                if vs.iter().any(|v| v.z <= 0.0) {
                    continue;
                }
                markers.log(MARKER, "near clipping");

                for v in &mut vs {
                    projection.rotate_z(v);
                }
                markers.log(MARKER, "rotate az");

                let projected = vs.map(|v| projection.perspective(&v));
                markers.log(MARKER, "fov");

                let xs = projected.map(|(x, _)| x);
                let ys = projected.map(|(_, y)| y);
                let (min_x, max_x) = (min3(xs), max3(xs));
                let (min_y, max_y) = (min3(ys), max3(ys));
                if min_y > projection.half_height
                    || min_x > projection.half_width
                    || max_y < -projection.half_height
                    || max_x < -projection.half_width
                {
                    continue;
                }
                markers.log(MARKER, "frustum culling");

                let points = projected.map(|(x, y)| screen.to_pixels(x, y));
                markers.log(MARKER, "scale");

                normalized.push(NormalizedPolygon {
                    object,
                    polygon: index,
                    distance: ds,
                    normals,
                    points,
                    color: Color::BLACK,
                    alpha: 0.0,
                });
            }
        }
        markers.log(MARKER, "normalize");

        normalized.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        markers.log(MARKER, "sort");
        markers.stop(MARKER);

        tracing::trace!(polygons = normalized.len(), "normalized");
        normalized
    }
}

impl Transformable for Camera {
    fn move_by(&mut self, delta: Vector3<f64>) {
        self.body.move_by(delta);
    }

    fn rotate(&mut self, pivot: &Point3<f64>, angles: Rotation) {
        self.body.rotate(pivot, angles);
    }
}

fn min3(v: [f64; 3]) -> f64 {
    v[0].min(v[1]).min(v[2])
}

fn max3(v: [f64; 3]) -> f64 {
    v[0].max(v[1]).max(v[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{Markers, NoopInstrumentation};
    use crate::polygon::Polygon;

    const EPS: f64 = 1e-9;

    fn screen() -> ScreenGeometry {
        ScreenGeometry::new(800.0, 600.0, 200.0)
    }

    fn camera_at(x: f64, y: f64, z: f64) -> Camera {
        Camera::new(CameraOptions {
            position: Point3::new(x, y, z),
            ..CameraOptions::default()
        })
        .unwrap()
    }

    /// Triangle in the plane z = `z` whose front faces -z (towards an eye at
    /// the origin looking along +z).
    fn facing_triangle(z: f64) -> Polygon {
        Polygon::new(
            Point3::new(-1.0, -1.0, z),
            Point3::new(1.0, -1.0, z),
            Point3::new(-1.0, 1.0, z),
        )
    }

    fn world_with(polygon: Polygon) -> World {
        let mut world = World::new();
        world.add(Mesh::from_polygons(MeshOptions::default(), vec![polygon]));
        world
    }

    fn normalize(camera: &Camera, world: &mut World) -> Vec<NormalizedPolygon> {
        camera.normalize_polygons(world, &screen(), &mut NoopInstrumentation)
    }

    #[test]
    fn test_camera_defaults_and_validation() {
        let camera = Camera::new(CameraOptions::default()).unwrap();
        assert_eq!(camera.fov(), (65.0, 65.0));
        assert_eq!(camera.distance(), 100.0);

        let bad = Camera::new(CameraOptions {
            v_fov: 0.0,
            ..CameraOptions::default()
        });
        assert!(matches!(bad, Err(RenderError::InvalidOption { name: "camera.v_fov", .. })));
    }

    #[test]
    fn test_prepare_ratio_formula() {
        let camera = Camera::new(CameraOptions {
            rotation: Rotation::new(0.0, 30.0, 0.0),
            ..CameraOptions::default()
        })
        .unwrap();
        let p = camera.prepare(&screen());

        let expected = 1000.0 / (65f64.to_radians().atan().to_degrees() * 10.0);
        assert!((p.h_ratio - expected).abs() < 1e-9);
        assert!((p.v_ratio - expected).abs() < 1e-9);
        assert_eq!(p.half_width, 2.0);
        assert_eq!(p.half_height, 1.5);
        assert!(p.rotate_x.is_none());
        assert!(p.rotate_z.is_none());

        let (sin, cos) = p.rotate_y.unwrap();
        assert!((sin + 0.5).abs() < EPS);
        assert!((cos - 3f64.sqrt() / 2.0).abs() < EPS);
    }

    #[test]
    fn test_backface_culling() {
        let camera = camera_at(0.0, 0.0, 0.0);

        let mut world = world_with(facing_triangle(5.0));
        assert_eq!(normalize(&camera, &mut world).len(), 1);

        // same triangle with reversed winding faces away
        let away = Polygon::new(
            Point3::new(-1.0, -1.0, 5.0),
            Point3::new(-1.0, 1.0, 5.0),
            Point3::new(1.0, -1.0, 5.0),
        );
        let mut world = world_with(away);
        assert!(normalize(&camera, &mut world).is_empty());
    }

    #[test]
    fn test_far_clipping_boundary() {
        let mut camera = camera_at(0.0, 0.0, 0.0);
        // centroid of facing_triangle(z) is (-1/3, -1/3, z)
        let centroid_distance = (2.0 / 9.0 + 25.0f64).sqrt();

        let mut world = world_with(facing_triangle(5.0));
        camera.set_distance(centroid_distance + 1e-6).unwrap();
        assert_eq!(normalize(&camera, &mut world).len(), 1);

        camera.set_distance(centroid_distance - 1e-6).unwrap();
        assert!(normalize(&camera, &mut world).is_empty());
    }

    #[test]
    fn test_near_clipping() {
        let camera = camera_at(0.0, 0.0, 0.0);

        // one vertex behind the eye plane drops the whole triangle, even
        // though the centroid is in front and faces the camera
        let straddling = Polygon::new(
            Point3::new(-1.0, -1.0, 3.0),
            Point3::new(1.0, -1.0, 3.0),
            Point3::new(-1.0, 1.0, -0.5),
        );
        let mut world = world_with(straddling);
        assert!(normalize(&camera, &mut world).is_empty());

        // a vertex exactly on the eye plane is dropped too
        let touching = Polygon::new(
            Point3::new(-1.0, -1.0, 3.0),
            Point3::new(1.0, -1.0, 3.0),
            Point3::new(-1.0, 1.0, 0.0),
        );
        let mut world = world_with(touching);
        assert!(normalize(&camera, &mut world).is_empty());
    }

    #[test]
    fn test_frustum_culling() {
        let camera = camera_at(0.0, 0.0, 0.0);
        let mut off_screen = facing_triangle(5.0);
        off_screen.move_by(Vector3::new(20.0, 0.0, 0.0));
        let mut world = world_with(off_screen);
        assert!(normalize(&camera, &mut world).is_empty());
    }

    #[test]
    fn test_projects_to_screen_centre() {
        let camera = camera_at(0.0, 0.0, 0.0);
        let mut world = world_with(facing_triangle(5.0));
        let out = normalize(&camera, &mut world);
        let p = camera.prepare(&screen());

        // vertex (-1, -1, 5): x = -ratio/5 world units left of centre
        let expected_x = -p.h_ratio / 5.0 * 200.0 + 400.0;
        let expected_y = 600.0 - (-p.v_ratio / 5.0 * 200.0 + 300.0);
        assert!((out[0].points[0].x - expected_x).abs() < EPS);
        assert!((out[0].points[0].y - expected_y).abs() < EPS);
        assert!(out[0].points[0].y > 300.0, "screen y grows downwards");
    }

    #[test]
    fn test_sorted_farthest_first() {
        let camera = camera_at(0.0, 0.0, 0.0);
        let mut world = World::new();
        for z in [4.0, 9.0, 2.0, 7.0] {
            world.add(Mesh::from_polygons(MeshOptions::default(), vec![facing_triangle(z)]));
        }
        let out = normalize(&camera, &mut world);
        assert_eq!(out.len(), 4);
        assert!(out.windows(2).all(|w| w[0].distance >= w[1].distance));
    }

    #[test]
    fn test_normalize_updates_cached_normals() {
        let camera = camera_at(0.0, 0.0, 0.0);
        let mut world = world_with(facing_triangle(5.0));
        let out = normalize(&camera, &mut world);
        let mesh = world.mesh(out[0].object).unwrap();
        assert_eq!(mesh.polygons()[0].normals(), Some(out[0].normals));
    }

    #[test]
    fn test_normalize_coords() {
        let camera = camera_at(0.0, 0.0, 0.0);
        let s = screen();

        let centre = camera.normalize_coords(&s, &Point3::new(0.0, 0.0, 10.0)).unwrap();
        assert!((centre.x - 400.0).abs() < EPS);
        assert!((centre.y - 300.0).abs() < EPS);

        assert!(camera.normalize_coords(&s, &Point3::new(0.0, 0.0, -1.0)).is_none());
        assert!(camera.normalize_coords(&s, &Point3::new(0.0, 0.0, 0.0)).is_none());
        assert!(camera.normalize_coords(&s, &Point3::new(0.0, 0.0, 150.0)).is_none());
    }

    #[test]
    fn test_camera_rotation_turns_view() {
        // turned 90 degrees in (x, z), the eye looks along -x
        let camera = Camera::new(CameraOptions {
            rotation: Rotation::new(90.0, 0.0, 0.0),
            ..CameraOptions::default()
        })
        .unwrap();
        let s = screen();
        assert!(camera.normalize_coords(&s, &Point3::new(-10.0, 0.0, 0.0)).is_some());
        assert!(camera.normalize_coords(&s, &Point3::new(10.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_rotate_focused_orbits() {
        let mut camera = camera_at(0.0, 0.0, -10.0);
        camera.rotate_focused(&Point3::origin(), Rotation::new(90.0, 0.0, 0.0));
        assert_eq!(camera.orientation(), Rotation::zero());
        assert!((camera.position() - Point3::new(10.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_markers_see_every_stage() {
        let camera = camera_at(0.0, 0.0, 0.0);
        let mut world = world_with(facing_triangle(5.0));
        let mut markers = Markers::new();
        camera.normalize_polygons(&mut world, &screen(), &mut markers);

        assert_eq!(markers.count("camera", None), 1);
        for stage in ["prepare", "far clipping", "backface culling", "near clipping", "scale", "sort"] {
            assert_eq!(markers.count("camera", Some(stage)), 1, "{stage}");
        }
    }
}
