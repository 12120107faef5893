/// Oriented triangle with cached lighting/culling normals
use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::transform::{Rotation, Transformable};

/// Centroid and a second point offset from it along the raw face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normals {
    /// Triangle centroid.
    pub a: Point3<f64>,
    /// Centroid plus the non-normalized face normal.
    pub b: Point3<f64>,
}

impl Normals {
    pub fn direction(&self) -> Vector3<f64> {
        self.b - self.a
    }
}

/// A triangle owned by a mesh.
///
/// The front side is the one `(pt3 - c) × (pt2 - c)` points to, where `c` is
/// the centroid. Colour, alpha and mix default to the owning mesh's values.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: [Point3<f64>; 3],
    normals: Option<Normals>,
    pub color: Option<Color>,
    pub alpha: Option<f64>,
    pub mix: Option<f64>,
}

impl Polygon {
    pub fn new(pt1: Point3<f64>, pt2: Point3<f64>, pt3: Point3<f64>) -> Self {
        Self {
            vertices: [pt1, pt2, pt3],
            normals: None,
            color: None,
            alpha: None,
            mix: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_mix(mut self, mix: f64) -> Self {
        self.mix = Some(mix);
        self
    }

    pub fn vertices(&self) -> &[Point3<f64>; 3] {
        &self.vertices
    }

    /// Normals for the current vertex positions, if computed since the last
    /// vertex mutation.
    pub fn normals(&self) -> Option<Normals> {
        self.normals
    }

    /// Recompute centroid and face-normal point from the vertices.
    pub fn update_normals(&mut self) -> Normals {
        let [pt1, pt2, pt3] = self.vertices;
        let a = Point3::from((pt1.coords + pt2.coords + pt3.coords) / 3.0);
        let b = a + (pt3 - a).cross(&(pt2 - a));
        let normals = Normals { a, b };
        self.normals = Some(normals);
        normals
    }
}

impl Transformable for Polygon {
    fn move_by(&mut self, delta: Vector3<f64>) {
        if delta == Vector3::zeros() {
            return;
        }
        for vertex in &mut self.vertices {
            vertex.move_by(delta);
        }
        self.normals = None;
    }

    fn rotate(&mut self, pivot: &Point3<f64>, angles: Rotation) {
        if angles.is_zero() {
            return;
        }
        for vertex in &mut self.vertices {
            vertex.rotate(pivot, angles);
        }
        self.normals = None;
    }
}
