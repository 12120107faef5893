/// Turntable camera control around a fixed point
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::projection::Camera;
use crate::transform::{Rotation, Transformable};

/// Pitch limit in degrees, short of looking straight down.
const MAX_PITCH: f64 = 85.0;
const MIN_RADIUS: f64 = 1.0;

/// Keeps a camera on a sphere around `pivot`, always looking at it.
///
/// `yaw` turns in the (x, z) plane and `pitch` in the (y, z) plane, the same
/// pairs the camera uses for its orientation. The eye position is derived
/// from the angles instead of accumulated, so any sequence of steps leaves
/// the pivot in the middle of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitRig {
    pub pivot: Point3<f64>,
    pub radius: f64,
    pub yaw: f64,
    pub pitch: f64,
}

impl OrbitRig {
    pub fn new(pivot: Point3<f64>, radius: f64) -> Self {
        Self {
            pivot,
            radius: radius.max(MIN_RADIUS),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn eye(&self) -> Point3<f64> {
        let mut offset = Point3::new(0.0, 0.0, -self.radius);
        let origin = Point3::origin();
        offset.rotate(&origin, Rotation::new(0.0, self.pitch, 0.0));
        offset.rotate(&origin, Rotation::new(self.yaw, 0.0, 0.0));
        self.pivot + offset.coords
    }

    pub fn orientation(&self) -> Rotation {
        Rotation::new(self.yaw, self.pitch, 0.0)
    }

    /// Turn by `angles.x` of yaw and `angles.y` of pitch; `z` is ignored.
    pub fn orbit(&mut self, angles: Rotation) {
        self.yaw = (self.yaw + angles.x) % 360.0;
        self.pitch = (self.pitch + angles.y).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move towards the pivot by `step` (negative backs away).
    pub fn zoom(&mut self, step: f64) {
        self.radius = (self.radius - step).max(MIN_RADIUS);
    }

    /// Put `camera` where the rig says.
    pub fn place(&self, camera: &mut Camera) {
        camera.move_to(self.eye());
        camera.rotate_to(self.orientation());
    }
}
