/// Point light source
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{require_positive, RenderError};
use crate::mesh::{Mesh, MeshOptions};
use crate::transform::{Rotation, Transformable};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightOptions {
    pub position: Point3<f64>,
    pub color: Color,
    /// Light strength; zero or below switches the light off.
    pub intensity: f64,
    /// Maximum illumination distance.
    pub distance: f64,
    /// Diameter of the visible sphere drawn for the light.
    pub size: f64,
    /// Sphere segment count; zero keeps the light invisible.
    pub quality: u32,
}

impl Default for LightOptions {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            color: Color::WHITE,
            intensity: 0.5,
            distance: 100.0,
            size: 0.0,
            quality: 0,
        }
    }
}

/// A light is a mesh whose alpha channel is replaced by an intensity and
/// which illuminates polygons within `distance`.
#[derive(Debug, Clone)]
pub struct Light {
    pub mesh: Mesh,
    pub intensity: f64,
    pub distance: f64,
}

impl Light {
    pub fn new(options: LightOptions) -> Result<Self, RenderError> {
        let distance = require_positive("light.distance", options.distance)?;
        let mesh_options = MeshOptions {
            position: options.position,
            color: options.color,
            ..MeshOptions::default()
        };
        let mesh = if options.size > 0.0 {
            Mesh::sphere(mesh_options, options.size, options.quality)
        } else {
            Mesh::new(mesh_options)
        };

        Ok(Self {
            mesh,
            intensity: options.intensity,
            distance,
        })
    }

    pub fn position(&self) -> Point3<f64> {
        self.mesh.position()
    }

    pub fn color(&self) -> Color {
        self.mesh.color
    }

    pub fn is_enabled(&self) -> bool {
        self.intensity > 0.0
    }

    /// Whether the light has geometry to draw.
    pub fn is_visible(&self) -> bool {
        !self.mesh.polygons().is_empty()
    }

    pub fn move_to(&mut self, target: Point3<f64>) {
        self.mesh.move_to(target);
    }
}

impl Transformable for Light {
    fn move_by(&mut self, delta: Vector3<f64>) {
        self.mesh.move_by(delta);
    }

    fn rotate(&mut self, pivot: &Point3<f64>, angles: Rotation) {
        self.mesh.rotate(pivot, angles);
    }
}
