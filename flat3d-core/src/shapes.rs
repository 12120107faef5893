/// Polygon-list builders for common shapes
///
/// Every builder emits triangles in world coordinates around `center`, with
/// the front side of each triangle facing outwards.
use nalgebra::Point3;

use crate::polygon::Polygon;
use crate::transform::{Rotation, Transformable};

/// Axis-aligned cube with edge length `size` (12 triangles).
pub fn cube(center: Point3<f64>, size: f64) -> Vec<Polygon> {
    let hs = size / 2.0;
    let p = |dx: f64, dy: f64, dz: f64| {
        Point3::new(center.x + dx * hs, center.y + dy * hs, center.z + dz * hs)
    };

    vec![
        // -z
        Polygon::new(p(-1.0, -1.0, -1.0), p(1.0, -1.0, -1.0), p(-1.0, 1.0, -1.0)),
        Polygon::new(p(1.0, 1.0, -1.0), p(-1.0, 1.0, -1.0), p(1.0, -1.0, -1.0)),
        // +z
        Polygon::new(p(-1.0, -1.0, 1.0), p(-1.0, 1.0, 1.0), p(1.0, -1.0, 1.0)),
        Polygon::new(p(1.0, 1.0, 1.0), p(1.0, -1.0, 1.0), p(-1.0, 1.0, 1.0)),
        // -y
        Polygon::new(p(-1.0, -1.0, 1.0), p(1.0, -1.0, -1.0), p(-1.0, -1.0, -1.0)),
        Polygon::new(p(1.0, -1.0, 1.0), p(1.0, -1.0, -1.0), p(-1.0, -1.0, 1.0)),
        // +y
        Polygon::new(p(-1.0, 1.0, 1.0), p(-1.0, 1.0, -1.0), p(1.0, 1.0, -1.0)),
        Polygon::new(p(1.0, 1.0, 1.0), p(-1.0, 1.0, 1.0), p(1.0, 1.0, -1.0)),
        // -x
        Polygon::new(p(-1.0, 1.0, 1.0), p(-1.0, -1.0, -1.0), p(-1.0, 1.0, -1.0)),
        Polygon::new(p(-1.0, 1.0, 1.0), p(-1.0, -1.0, 1.0), p(-1.0, -1.0, -1.0)),
        // +x
        Polygon::new(p(1.0, 1.0, 1.0), p(1.0, 1.0, -1.0), p(1.0, -1.0, -1.0)),
        Polygon::new(p(1.0, 1.0, 1.0), p(1.0, -1.0, -1.0), p(1.0, -1.0, 1.0)),
    ]
}

/// UV sphere of diameter `size`; `quality` is the number of segments per
/// meridian and per parallel. A quality of zero yields no triangles.
pub fn sphere(center: Point3<f64>, size: f64, quality: u32) -> Vec<Polygon> {
    let mut polygons = Vec::new();
    if quality == 0 {
        return polygons;
    }

    let q = quality as f64;
    let h_step = 360.0 / q;
    let v_step = 180.0 / q;
    let bottom = Point3::new(center.x, center.y - size / 2.0, center.z);

    // Tilt `start` by `tilt` about the centre, then spin it around the
    // vertical axis by `spin`.
    let ring_point = |start: Point3<f64>, tilt: f64, spin: f64| {
        let mut pt = start;
        pt.rotate(&center, Rotation::new(0.0, tilt, 0.0));
        let axis = Point3::new(center.x, pt.y, center.z);
        pt.rotate(&axis, Rotation::new(spin, 0.0, 0.0));
        pt
    };

    for vi in (1..=quality).rev() {
        for hi in (1..=quality).rev() {
            let h = hi as f64;
            if vi < quality {
                let i = (quality - vi - 1) as f64;

                let pt1 = ring_point(bottom, v_step * i, h_step * (h + 1.0));
                let pt2 = ring_point(bottom, v_step * (i + 1.0), h_step * (h + 1.0));
                let pt3 = ring_point(bottom, v_step * (i + 1.0), h_step * (h + 2.0));
                polygons.push(Polygon::new(pt1, pt3, pt2));

                let pt1 = ring_point(bottom, v_step * i, h_step * (h + 1.0));
                let pt2 = ring_point(bottom, v_step * (i + 1.0), h_step * (h + 2.0));
                let pt3 = ring_point(bottom, v_step * i, h_step * (h + 2.0));
                polygons.push(Polygon::new(pt1, pt3, pt2));
            }
            if vi == 1 {
                let top = Point3::new(center.x, center.y + size / 2.0, center.z);
                let pt2 = ring_point(top, v_step, h_step * (h + 1.0));
                let pt3 = ring_point(top, v_step, h_step * (h + 2.0));
                polygons.push(Polygon::new(top, pt2, pt3));
            }
        }
    }

    polygons
}

/// Paper-plane glider: two wings and a keel, nose pointing +y.
pub fn glider(center: Point3<f64>, width: f64, height: f64) -> Vec<Polygon> {
    const INNER: f64 = 0.15;
    const DEPTH: f64 = 0.44;

    let (x, z) = (center.x, center.z);
    let nose = Point3::new(x, center.y + height / 2.0, z);
    let tail_y = nose.y - height;
    let half = width / 2.0;

    let right_tip = Point3::new(x + half, tail_y, z);
    let right_inner = Point3::new(x + half * INNER, tail_y, z);
    let left_tip = Point3::new(x - half, tail_y, z);
    let left_inner = Point3::new(x - half * INNER, tail_y, z);
    let keel = Point3::new(x, tail_y, z + half * DEPTH);

    vec![
        Polygon::new(nose, right_inner, right_tip),
        Polygon::new(nose, keel, right_inner),
        Polygon::new(nose, right_inner, keel),
        Polygon::new(nose, left_tip, left_inner),
        Polygon::new(nose, left_inner, keel),
        Polygon::new(nose, keel, left_inner),
    ]
}
