/// Positioned, rotated triangle collection with shared visual attributes
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::polygon::Polygon;
use crate::shapes;
use crate::transform::{Rotation, Transformable};

/// Construction options for a [`Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    pub position: Point3<f64>,
    /// Initial orientation in degrees.
    pub rotation: Rotation,
    pub color: Color,
    pub alpha: f64,
    /// How much lights affect the colour: 0 = unlit, 1 = fully lit.
    pub mix: f64,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Rotation::zero(),
            color: Color::new(80.0, 80.0, 80.0),
            alpha: 1.0,
            mix: 1.0,
        }
    }
}

impl MeshOptions {
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn rotated(mut self, x: f64, y: f64, z: f64) -> Self {
        self.rotation = Rotation::new(x, y, z);
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_mix(mut self, mix: f64) -> Self {
        self.mix = mix;
        self
    }
}

/// A rigid body of triangles.
///
/// Polygons live in world coordinates; `move_by` and `rotate` keep them in
/// step with the mesh position so the shape never deforms.
#[derive(Debug, Clone)]
pub struct Mesh {
    position: Point3<f64>,
    orientation: Rotation,
    pub color: Color,
    pub alpha: f64,
    pub mix: f64,
    polygons: Vec<Polygon>,
}

impl Mesh {
    /// Empty mesh. The orientation is recorded as given since there is no
    /// geometry to turn yet.
    pub fn new(options: MeshOptions) -> Self {
        Self {
            position: options.position,
            orientation: options.rotation,
            color: options.color,
            alpha: options.alpha,
            mix: options.mix,
            polygons: Vec::new(),
        }
    }

    /// Mesh from polygons built around `options.position`, turned once by
    /// `options.rotation` about that position.
    pub fn from_polygons(options: MeshOptions, polygons: Vec<Polygon>) -> Self {
        let mut mesh = Self::new(MeshOptions {
            rotation: Rotation::zero(),
            ..options
        });
        mesh.polygons = polygons;
        mesh.rotate_to(options.rotation);
        mesh
    }

    pub fn cube(options: MeshOptions, size: f64) -> Self {
        Self::from_polygons(options, shapes::cube(options.position, size))
    }

    pub fn sphere(options: MeshOptions, size: f64, quality: u32) -> Self {
        Self::from_polygons(options, shapes::sphere(options.position, size, quality))
    }

    pub fn glider(options: MeshOptions, width: f64, height: f64) -> Self {
        Self::from_polygons(options, shapes::glider(options.position, width, height))
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Cumulative rotation applied so far, in degrees.
    pub fn orientation(&self) -> Rotation {
        self.orientation
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Per-polygon access for normal updates. Vertex edits through this would
    /// break the rigid-body relation with `position`, so it stays in-crate.
    pub(crate) fn polygons_mut(&mut self) -> &mut [Polygon] {
        &mut self.polygons
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn move_to(&mut self, target: Point3<f64>) {
        self.move_by(target - self.position);
    }

    /// Rotate about the mesh's own position to an absolute orientation.
    pub fn rotate_to(&mut self, target: Rotation) {
        let pivot = self.position;
        let delta = self.orientation.delta_to(target);
        self.rotate(&pivot, delta);
    }

    /// Subtract `angles` from the stored orientation without turning any
    /// geometry. Used by camera orbits, where the eye counter-rotates.
    pub(crate) fn unwind_orientation(&mut self, angles: Rotation) {
        self.orientation.rotate(angles.negated());
    }
}

impl Transformable for Mesh {
    fn move_by(&mut self, delta: Vector3<f64>) {
        if delta == Vector3::zeros() {
            return;
        }
        for polygon in &mut self.polygons {
            polygon.move_by(delta);
        }
        self.position.move_by(delta);
    }

    fn rotate(&mut self, pivot: &Point3<f64>, angles: Rotation) {
        if angles.is_zero() {
            return;
        }
        for polygon in &mut self.polygons {
            polygon.rotate(pivot, angles);
        }
        self.orientation.rotate(angles);
        self.position.rotate(pivot, angles);
    }
}
