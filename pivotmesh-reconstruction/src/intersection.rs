//! Numerical predicates on points and segments
//!
//! Small geometric tests used to keep a growing triangulation from
//! folding onto itself.

use pivotmesh_core::Point3d;

/// Whether four points lie (numerically) in a common plane.
///
/// Tests the scalar triple product of the three spanning vectors against
/// a tolerance scaled by their magnitudes, so the answer does not depend
/// on the overall scale of the input. Duplicated points count as
/// coplanar.
pub fn points_coplanar(p0: &Point3d, p1: &Point3d, p2: &Point3d, p3: &Point3d) -> bool {
    let u = p1 - p0;
    let v = p2 - p0;
    let w = p3 - p0;
    let volume = u.dot(&v.cross(&w));
    volume.abs() <= 1e-12 * u.norm() * v.norm() * w.norm()
}

/// Minimum Euclidean distance between segments `p0p1` and `q0q1`.
///
/// Clamped closest-point computation; handles segments degenerated to a
/// point on either side.
pub fn segments_minimum_distance(p0: &Point3d, p1: &Point3d, q0: &Point3d, q1: &Point3d) -> f64 {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t);
    if a <= f64::EPSILON && e <= f64::EPSILON {
        // both segments are points
        return r.norm();
    }
    if a <= f64::EPSILON {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= f64::EPSILON {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            let s0 = if denom != 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                // parallel segments, pick any point on the first
                0.0
            };
            let t0 = (b * s0 + f) / e;

            if t0 < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t0 > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                s = s0;
                t = t0;
            }
        }
    }

    let closest1 = p0 + d1 * s;
    let closest2 = q0 + d2 * t;
    (closest1 - closest2).norm()
}
