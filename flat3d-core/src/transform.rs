/// Rigid transforms: per-axis rotation state and the move/rotate trait
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::rotate_pair;

/// Rotation around three axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotation {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Accumulate delta amounts (in degrees)
    pub fn rotate(&mut self, delta: Rotation) {
        self.x += delta.x;
        self.y += delta.y;
        self.z += delta.z;
    }

    /// Delta that takes `self` to `target`
    pub fn delta_to(&self, target: Rotation) -> Rotation {
        Rotation::new(target.x - self.x, target.y - self.y, target.z - self.z)
    }

    pub fn negated(&self) -> Rotation {
        Rotation::new(-self.x, -self.y, -self.z)
    }
}

/// Anything that can be translated and rotated about a pivot.
///
/// Rotations apply `x` in the (x, z) pair, then `y` in the (y, z) pair, then
/// `z` in the (x, y) pair. Zero angles are skipped.
pub trait Transformable {
    fn move_by(&mut self, delta: Vector3<f64>);

    fn rotate(&mut self, pivot: &Point3<f64>, angles: Rotation);
}

impl Transformable for Point3<f64> {
    fn move_by(&mut self, delta: Vector3<f64>) {
        *self += delta;
    }

    fn rotate(&mut self, pivot: &Point3<f64>, angles: Rotation) {
        if angles.x != 0.0 {
            let (x, z) = rotate_pair(self.x, self.z, pivot.x, pivot.z, angles.x);
            self.x = x;
            self.z = z;
        }
        if angles.y != 0.0 {
            let (y, z) = rotate_pair(self.y, self.z, pivot.y, pivot.z, angles.y);
            self.y = y;
            self.z = z;
        }
        if angles.z != 0.0 {
            let (x, y) = rotate_pair(self.x, self.y, pivot.x, pivot.y, angles.z);
            self.x = x;
            self.y = y;
        }
    }
}

/// Move a point to an absolute position through `move_by`.
pub fn move_point_to(point: &mut Point3<f64>, target: Point3<f64>) {
    let delta = target - *point;
    point.move_by(delta);
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: &Point3<f64>, b: &Point3<f64>) {
        assert!((a - b).norm() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut state = Rotation::zero();
        assert!(state.is_zero());

        state.rotate(Rotation::new(10.0, 20.0, 30.0));
        state.rotate(Rotation::new(5.0, 0.0, -30.0));
        assert_eq!(state, Rotation::new(15.0, 20.0, 0.0));
        assert_eq!(state.delta_to(Rotation::new(15.0, 0.0, 90.0)), Rotation::new(0.0, -20.0, 90.0));
    }

    #[test]
    fn test_point_move() {
        let mut p = Point3::new(1.0, 2.0, 3.0);
        p.move_by(Vector3::new(1.0, -2.0, 0.5));
        assert_close(&p, &Point3::new(2.0, 0.0, 3.5));

        move_point_to(&mut p, Point3::new(-1.0, 0.0, 0.0));
        assert_close(&p, &Point3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_point_rotate_axis_pairs() {
        let pivot = Point3::origin();

        // x angle turns within (x, z)
        let mut p = Point3::new(1.0, 0.0, 0.0);
        p.rotate(&pivot, Rotation::new(90.0, 0.0, 0.0));
        assert_close(&p, &Point3::new(0.0, 0.0, 1.0));

        // y angle turns within (y, z)
        let mut p = Point3::new(0.0, 1.0, 0.0);
        p.rotate(&pivot, Rotation::new(0.0, 90.0, 0.0));
        assert_close(&p, &Point3::new(0.0, 0.0, 1.0));

        // z angle turns within (x, y)
        let mut p = Point3::new(1.0, 0.0, 0.0);
        p.rotate(&pivot, Rotation::new(0.0, 0.0, 90.0));
        assert_close(&p, &Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_zero_rotation_is_exact_noop() {
        let original = Point3::new(0.1, 0.2, 0.3);
        let mut p = original;
        p.rotate(&Point3::new(5.0, 5.0, 5.0), Rotation::zero());
        assert_eq!(p, original);
    }

    #[test]
    fn test_rotate_round_trip() {
        let pivot = Point3::new(1.0, -2.0, 0.5);
        let original = Point3::new(3.0, 4.0, -7.0);

        for angle in [13.0, 90.0, 181.5, -45.0] {
            for forward in [
                Rotation::new(angle, 0.0, 0.0),
                Rotation::new(0.0, angle, 0.0),
                Rotation::new(0.0, 0.0, angle),
            ] {
                let mut p = original;
                p.rotate(&pivot, forward);
                p.rotate(&pivot, forward.negated());
                assert_close(&p, &original);
            }
        }
    }
}
