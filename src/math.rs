//! Vector/matrix primitives, plane equations, and the tolerance-aware
//! intersection routines the primitive editors build on.
//!
//! Built on `glam` (the same vector/matrix library the teacher crate's
//! engine uses under the hood). This module stays free of logging and
//! error types on purpose: it is pure math, called from editors that
//! already know what a failure means in their own context.

use glam::{DMat3, DVec3};

use crate::config::Tol;

/// A plane in Hessian normal form: `dot(normal, p) == w` for every
/// point `p` on the plane. `normal` is expected (but not required) to
/// be unit length; callers that build a plane from three points should
/// call [`Plane::from_three_points`], which normalizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub w: f64,
}

impl Plane {
    pub fn new(normal: DVec3, w: f64) -> Self {
        Plane { normal, w }
    }

    /// Build the plane through three points, with the normal given by
    /// `(b - a) x (c - a)`, normalized. Returns `None` if the points
    /// are collinear (degenerate cross product).
    pub fn from_three_points(a: DVec3, b: DVec3, c: DVec3, tol: &Tol) -> Option<Self> {
        let n = (b - a).cross(c - a);
        let len = n.length();
        if len < tol.dist * tol.dist {
            return None;
        }
        let normal = n / len;
        Some(Plane {
            normal,
            w: normal.dot(a),
        })
    }

    /// Signed distance from `p` to the plane along the normal.
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.w
    }

    pub fn contains(&self, p: DVec3, tol: &Tol) -> bool {
        self.signed_distance(p).abs() <= tol.dist
    }

    /// Translate the plane along its own normal so that it passes
    /// through `target`: `w' = normal . target` (spec §4.2 face move).
    pub fn translate_to(&self, target: DVec3) -> Self {
        Plane {
            normal: self.normal,
            w: self.normal.dot(target),
        }
    }
}

/// Intersect three planes at a point. Returns `None` if the planes'
/// normals are (near-)linearly dependent, i.e. no unique intersection
/// point exists (parallel or coincident planes).
pub fn intersect_three_planes(p1: &Plane, p2: &Plane, p3: &Plane, tol: &Tol) -> Option<DVec3> {
    let m = DMat3::from_cols(p1.normal, p2.normal, p3.normal).transpose();
    let det = m.determinant();
    if det.abs() < tol.perp {
        return None;
    }
    let rhs = DVec3::new(p1.w, p2.w, p3.w);
    Some(m.inverse() * rhs)
}

/// Intersect a line (point `p0`, direction `dir`) with a plane.
/// Returns `None` if the line is parallel to the plane.
pub fn intersect_line_plane(p0: DVec3, dir: DVec3, plane: &Plane, tol: &Tol) -> Option<DVec3> {
    let denom = plane.normal.dot(dir);
    if denom.abs() < tol.perp {
        return None;
    }
    let t = (plane.w - plane.normal.dot(p0)) / denom;
    Some(p0 + dir * t)
}

/// Intersect the line through `edge_dir` (direction only, anchored at
/// a point later supplied via the two planes) with two planes at
/// once — the algorithm `mv_edge` uses: a moved edge's new position is
/// the intersection of its direction line, already anchored at the
/// drag target, with each of its two bounding faces in turn.
pub fn intersect_line_two_planes(
    anchor: DVec3,
    dir: DVec3,
    a: &Plane,
    b: &Plane,
    tol: &Tol,
) -> Option<(DVec3, DVec3)> {
    let pa = intersect_line_plane(anchor, dir, a, tol)?;
    let pb = intersect_line_plane(anchor, dir, b, tol)?;
    Some((pa, pb))
}

/// True if `a` and `b` are within `tol.dist` of each other.
pub fn points_coincident(a: DVec3, b: DVec3, tol: &Tol) -> bool {
    (a - b).length_squared() <= tol.dist_sq()
}

/// True if `dir` has non-negligible length (used to reject
/// zero-length edge/height/axis vectors across every editor).
pub fn is_nonzero(dir: DVec3, tol: &Tol) -> bool {
    dir.length_squared() > tol.dist_sq()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_from_three_points_unit_square() {
        let tol = Tol::default();
        let plane = Plane::from_three_points(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            &tol,
        )
        .unwrap();
        assert_relative_eq!(plane.normal.z.abs(), 1.0, epsilon = 1e-9);
        assert!(plane.contains(DVec3::new(0.5, 0.5, 0.0), &tol));
    }

    #[test]
    fn collinear_points_reject() {
        let tol = Tol::default();
        assert!(Plane::from_three_points(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            &tol,
        )
        .is_none());
    }

    #[test]
    fn three_plane_intersection_recovers_corner() {
        let tol = Tol::default();
        let px = Plane::new(DVec3::X, 1.0);
        let py = Plane::new(DVec3::Y, 2.0);
        let pz = Plane::new(DVec3::Z, 3.0);
        let p = intersect_three_planes(&px, &py, &pz, &tol).unwrap();
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn parallel_planes_have_no_unique_intersection() {
        let tol = Tol::default();
        let p1 = Plane::new(DVec3::Z, 0.0);
        let p2 = Plane::new(DVec3::Z, 1.0);
        let p3 = Plane::new(DVec3::Z, 2.0);
        assert!(intersect_three_planes(&p1, &p2, &p3, &tol).is_none());
    }
}
