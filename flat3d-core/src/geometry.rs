/// Scalar geometry helpers shared by the transform, camera and shading code
use nalgebra::Point3;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (std::f64::consts::PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    (rad * 180.0) / std::f64::consts::PI
}

/// Rotate `(u, v)` around `(pu, pv)` by `deg` degrees.
pub fn rotate_pair(u: f64, v: f64, pu: f64, pv: f64, deg: f64) -> (f64, f64) {
    let (sin, cos) = deg_to_rad(deg).sin_cos();
    (
        (u - pu) * cos - (v - pv) * sin + pu,
        (u - pu) * sin + (v - pv) * cos + pv,
    )
}

/// Rotate `(u, v)` around the origin with a precomputed sine and cosine.
#[inline]
pub fn rotate_pair_with(u: f64, v: f64, sin: f64, cos: f64) -> (f64, f64) {
    (u * cos - v * sin, u * sin + v * cos)
}

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

/// True when `a1 -> a2` and `b1 -> b2` point into the same half-space.
pub fn is_codirectional(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> bool {
    (a2 - a1).dot(&(b2 - b1)) > 0.0
}

/// Angle in degrees between `origin -> a` and `origin -> b`.
///
/// Zero-length vectors yield NaN.
pub fn angle(origin: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let va = a - origin;
    let vb = b - origin;
    rad_to_deg((va.dot(&vb) / (va.norm() * vb.norm())).acos())
}
