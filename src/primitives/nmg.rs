//! Non-manifold-geometry boundary-representation editor (§4.3).
//!
//! The source represents this as a radial-edge graph: edgeuse ↔
//! radial_p ↔ eumate_p, loopuse ↔ faceuse, vertexuse lists — a
//! pointer-rich structure with several independent cyclic links (§9).
//! Per the design note, this is reimplemented as an **arena of typed
//! nodes addressed by integer index**, directly in the style of the
//! teacher crate's `modeling::half_edge` module: `u32` ids, an
//! `INVALID` sentinel instead of null, and twin/next/prev links held
//! as plain fields rather than pointers. Euler operators mutate
//! indices in place; nothing here needs reference counting.

use glam::DVec3;

use crate::config::Tol;
use crate::error::{EditError, EditResult};
use crate::math::Plane;

pub type VertexId = u32;
pub type HalfEdgeId = u32;
pub type LoopId = u32;

pub const INVALID: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NmgVertex {
    pub pos: DVec3,
}

/// One directed half of an edge. `twin` is the oppositely-directed
/// half-edge sharing the same two endpoints (the radial mate, for a
/// two-faceuse edge; for a wire edge it is the other direction around
/// the same loop). `next`/`prev` walk the loop this half-edge belongs
/// to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub loop_id: LoopId,
}

/// A loop of half-edges: either a wire loop (no face) or a face loop
/// (bounds a planar face, used once the loop is extruded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loop {
    pub start: HalfEdgeId,
    pub is_face: bool,
}

/// The arena for one shell's worth of geometry. A [`NmgModel`] may
/// hold several shells; the loop-extrusion temporary model (§5) is
/// just another freestanding `NmgModel`.
#[derive(Debug, Clone, Default)]
pub struct NmgModel {
    pub vertices: Vec<NmgVertex>,
    pub half_edges: Vec<HalfEdge>,
    pub loops: Vec<Loop>,
}

impl NmgModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single closed wire loop from an ordered list of
    /// positions (last implicitly connects back to first).
    pub fn wire_loop_from_points(points: &[DVec3]) -> EditResult<Self> {
        if points.len() < 3 {
            return Err(EditError::GeometryRejected {
                op: "NMG_WIRE_LOOP",
                reason: "a loop needs at least three vertices",
            });
        }
        let mut model = NmgModel::new();
        let base_v = model.vertices.len() as u32;
        for &p in points {
            model.vertices.push(NmgVertex { pos: p });
        }
        let n = points.len() as u32;
        let base_he = model.half_edges.len() as u32;
        for i in 0..n {
            model.half_edges.push(HalfEdge {
                origin: base_v + i,
                twin: INVALID,
                next: base_he + (i + 1) % n,
                prev: base_he + (i + n - 1) % n,
                loop_id: 0,
            });
        }
        model.loops.push(Loop {
            start: base_he,
            is_face: false,
        });
        Ok(model)
    }

    pub fn loop_half_edges(&self, loop_id: LoopId) -> Vec<HalfEdgeId> {
        let start = self.loops[loop_id as usize].start;
        let mut out = vec![start];
        let mut cur = self.half_edges[start as usize].next;
        while cur != start {
            out.push(cur);
            cur = self.half_edges[cur as usize].next;
        }
        out
    }

    pub fn loop_vertices(&self, loop_id: LoopId) -> Vec<DVec3> {
        self.loop_half_edges(loop_id)
            .iter()
            .map(|&he| self.vertices[self.half_edges[he as usize].origin as usize].pos)
            .collect()
    }

    /// Signed area of a (planar, by construction here) loop via the
    /// shoelace-on-best-fit-plane formula; used to reject degenerate
    /// or self-intersecting loops before extrusion.
    pub fn loop_area(&self, loop_id: LoopId, tol: &Tol) -> EditResult<f64> {
        let pts = self.loop_vertices(loop_id);
        let plane = self.loop_plane(loop_id, tol)?;
        let n = plane.normal;
        let origin = pts[0];
        // project onto an orthonormal basis of the plane, shoelace in 2D
        let ref_axis = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let u = ref_axis.cross(n).normalize();
        let v = n.cross(u);
        let mut area2 = 0.0;
        for i in 0..pts.len() {
            let a = pts[i] - origin;
            let b = pts[(i + 1) % pts.len()] - origin;
            let (au, av) = (a.dot(u), a.dot(v));
            let (bu, bv) = (b.dot(u), b.dot(v));
            area2 += au * bv - bu * av;
        }
        Ok(area2.abs() / 2.0)
    }

    pub fn loop_plane(&self, loop_id: LoopId, tol: &Tol) -> EditResult<Plane> {
        let pts = self.loop_vertices(loop_id);
        Plane::from_three_points(pts[0], pts[1], pts[2], tol).ok_or(EditError::GeometryRejected {
            op: "NMG_LOOP_PLANE",
            reason: "loop is degenerate (collinear vertices)",
        })
    }

    /// Closest-edge pick: the edge (of any loop) whose infinite line
    /// is nearest the ray `(ray_origin, ray_dir)`. Tolerance is
    /// explicitly zero per §4.3: always returns the closest edge, it
    /// never fails by being "too far".
    pub fn pick_edge(&self, ray_origin: DVec3, ray_dir: DVec3) -> Option<HalfEdgeId> {
        if self.half_edges.is_empty() {
            return None;
        }
        let mut best: Option<(HalfEdgeId, f64)> = None;
        for (i, he) in self.half_edges.iter().enumerate() {
            let p0 = self.vertices[he.origin as usize].pos;
            let p1 = self.vertices[self.half_edges[he.next as usize].origin as usize].pos;
            let d = line_to_ray_distance(p0, p1, ray_origin, ray_dir);
            if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((i as u32, d));
            }
        }
        best.map(|(he, _)| he)
    }

    /// `EMOVE`: reposition the edge so it passes through `target`,
    /// projected onto the plane through the edge's first vertex along
    /// the current view direction; refuses if the loop would no
    /// longer be planar.
    pub fn move_edge(
        &mut self,
        he: HalfEdgeId,
        target: DVec3,
        view_dir: DVec3,
        tol: &Tol,
    ) -> EditResult<()> {
        let loop_id = self.half_edges[he as usize].loop_id;
        let origin_idx = self.half_edges[he as usize].origin;
        let p0 = self.vertices[origin_idx as usize].pos;
        // project target onto the plane through p0 perpendicular to view_dir
        let n = view_dir.normalize();
        let projected = target - n * (n.dot(target - p0));

        let saved = self.vertices[origin_idx as usize];
        self.vertices[origin_idx as usize].pos = projected;
        if self.loop_plane(loop_id, tol).is_err() {
            self.vertices[origin_idx as usize] = saved;
            return Err(EditError::GeometryRejected {
                op: "NMG_EMOVE",
                reason: "move would make the loop non-planar",
            });
        }
        Ok(())
    }

    /// `ESPLIT`: insert a new vertex between `he`'s endpoints, at
    /// `target` (already projected by the caller the way `move_edge`
    /// projects its target).
    pub fn split_edge(&mut self, he: HalfEdgeId, target: DVec3) -> EditResult<HalfEdgeId> {
        let loop_id = self.half_edges[he as usize].loop_id;
        let next = self.half_edges[he as usize].next;

        let new_vertex = self.vertices.len() as u32;
        self.vertices.push(NmgVertex { pos: target });

        let new_he = self.half_edges.len() as u32;
        self.half_edges.push(HalfEdge {
            origin: new_vertex,
            twin: INVALID,
            next,
            prev: he,
            loop_id,
        });
        self.half_edges[he as usize].next = new_he;
        self.half_edges[next as usize].prev = new_he;
        Ok(new_he)
    }

    /// `EKILL`: remove `he` by moving its destination vertex (the
    /// *following* vertex, `next`'s origin) onto its origin (the
    /// *preceding* vertex) and relinking around it, so the surviving
    /// edge continues from where the killed edge started rather than
    /// leaving a position discontinuity. Refused for the last edge of
    /// a loop, which would collapse the loop onto a single point.
    pub fn kill_edge(&mut self, he: HalfEdgeId) -> EditResult<()> {
        let prev = self.half_edges[he as usize].prev;
        let next = self.half_edges[he as usize].next;
        if next == he || prev == he {
            return Err(EditError::GeometryRejected {
                op: "NMG_EKILL",
                reason: "cannot kill the last edge of a loop",
            });
        }
        let loop_id = self.half_edges[he as usize].loop_id;
        let keep_vertex = self.half_edges[he as usize].origin;
        let removed_vertex = self.half_edges[next as usize].origin;

        // Merge the following vertex onto the preceding one: every
        // half-edge that started at `removed_vertex` now starts at
        // `keep_vertex`, so `next` picks up exactly where the killed
        // edge left off instead of jumping to a different position.
        for he_mut in self.half_edges.iter_mut() {
            if he_mut.origin == removed_vertex {
                he_mut.origin = keep_vertex;
            }
        }

        self.half_edges[prev as usize].next = next;
        self.half_edges[next as usize].prev = prev;
        if self.loops[loop_id as usize].start == he {
            self.loops[loop_id as usize].start = next;
        }
        Ok(())
    }

    /// `FORW`/`BACK`: move the selected edgeuse within its loop.
    pub fn next_edge(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he as usize].next
    }
    pub fn prev_edge(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he as usize].prev
    }

    /// `RADIAL`: move to the radial-mate edgeuse (the opposite
    /// direction around the same edge, on the adjacent face). For a
    /// wire loop with no twin registered this is a no-op returning
    /// the same id, mirroring the source treating radial traversal on
    /// wire edges as a boundary case rather than an error.
    pub fn radial_edge(&self, he: HalfEdgeId) -> HalfEdgeId {
        let twin = self.half_edges[he as usize].twin;
        if twin == INVALID {
            he
        } else {
            twin
        }
    }

    /// `LEXTRU`: the current shell must contain exactly one wire loop
    /// with positive area (checked by the caller, which holds the
    /// per-shell bookkeeping the §3.4 sub-state describes); copy the
    /// loop into a throw-away model, then extrude it into a closed
    /// solid of half-edges along `direction`. Rejects a direction
    /// parallel to the loop's plane.
    pub fn extrude_loop(&self, loop_id: LoopId, direction: DVec3, tol: &Tol) -> EditResult<NmgModel> {
        let plane = self.loop_plane(loop_id, tol)?;
        if direction.length_squared() <= tol.dist_sq() {
            return Err(EditError::GeometryRejected {
                op: "NMG_LEXTRU",
                reason: "extrude direction is zero-length",
            });
        }
        let cos_angle = plane.normal.dot(direction.normalize()).abs();
        if cos_angle < tol.perp {
            return Err(EditError::GeometryRejected {
                op: "NMG_LEXTRU",
                reason: "extrude direction parallel to the loop's plane",
            });
        }

        let base_pts = self.loop_vertices(loop_id);
        let n = base_pts.len();
        let top_pts: Vec<DVec3> = base_pts.iter().map(|&p| p + direction).collect();

        let mut result = NmgModel::new();
        for &p in &base_pts {
            result.vertices.push(NmgVertex { pos: p });
        }
        for &p in &top_pts {
            result.vertices.push(NmgVertex { pos: p });
        }

        // bottom face loop (reversed so its normal points outward/down)
        let bottom_he_base = result.half_edges.len() as u32;
        for i in 0..n as u32 {
            let idx = n as u32 - 1 - i;
            result.half_edges.push(HalfEdge {
                origin: idx,
                twin: INVALID,
                next: bottom_he_base + (i + 1) % n as u32,
                prev: bottom_he_base + (i + n as u32 - 1) % n as u32,
                loop_id: result.loops.len() as u32,
            });
        }
        result.loops.push(Loop {
            start: bottom_he_base,
            is_face: true,
        });

        // top face loop
        let top_he_base = result.half_edges.len() as u32;
        for i in 0..n as u32 {
            result.half_edges.push(HalfEdge {
                origin: n as u32 + i,
                twin: INVALID,
                next: top_he_base + (i + 1) % n as u32,
                prev: top_he_base + (i + n as u32 - 1) % n as u32,
                loop_id: result.loops.len() as u32,
            });
        }
        result.loops.push(Loop {
            start: top_he_base,
            is_face: true,
        });

        // side face loops, one quad per base edge
        for i in 0..n as u32 {
            let a = i;
            let b = (i + 1) % n as u32;
            let side_base = result.half_edges.len() as u32;
            let loop_id = result.loops.len() as u32;
            let verts = [a, b, n as u32 + b, n as u32 + a];
            for k in 0..4u32 {
                result.half_edges.push(HalfEdge {
                    origin: verts[k as usize],
                    twin: INVALID,
                    next: side_base + (k + 1) % 4,
                    prev: side_base + (k + 3) % 4,
                    loop_id,
                });
            }
            result.loops.push(Loop {
                start: side_base,
                is_face: true,
            });
        }

        Ok(result)
    }

    /// Invariant 6 of §8: the model is closed (every face-loop edge
    /// has a radial mate or belongs to a face loop consistently) and
    /// has no degenerate loops. This is a structural check, not a
    /// full manifold/self-intersection test — the latter is explicitly
    /// out of scope (§1, "all non-edit primitive-specific code").
    pub fn is_structurally_valid(&self, tol: &Tol) -> bool {
        for (i, _) in self.loops.iter().enumerate() {
            if self.loop_plane(i as u32, tol).is_err() {
                return false;
            }
        }
        true
    }
}

fn line_to_ray_distance(p0: DVec3, p1: DVec3, ray_origin: DVec3, ray_dir: DVec3) -> f64 {
    let d1 = (p1 - p0).normalize_or_zero();
    let d2 = ray_dir.normalize_or_zero();
    let r = p0 - ray_origin;
    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let b = d1.dot(d2);
    let denom = a * e - b * b;
    if denom.abs() < 1e-12 {
        return r.cross(d2).length();
    }
    let c = d1.dot(r);
    let f = d2.dot(r);
    let s = (b * f - c * e) / denom;
    let t = (a * f - b * c) / denom;
    let closest1 = p0 + d1 * s;
    let closest2 = ray_origin + d2 * t;
    (closest1 - closest2).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> NmgModel {
        NmgModel::wire_loop_from_points(&[
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn s4_edge_split_adds_one_edge_same_area() {
        let mut model = unit_square();
        let tol = Tol::default();
        let area_before = model.loop_area(0, &tol).unwrap();
        // bottom edge: origin at (0,0,0), goes to (1,0,0)
        let bottom = 0u32;
        model.split_edge(bottom, DVec3::new(0.5, 0.0, 0.0)).unwrap();
        let verts = model.loop_half_edges(0);
        assert_eq!(verts.len(), 5);
        let area_after = model.loop_area(0, &tol).unwrap();
        assert!((area_before - area_after).abs() < 1e-9);
    }

    #[test]
    fn extrude_rejects_parallel_direction() {
        let model = unit_square();
        let tol = Tol::default();
        assert!(model
            .extrude_loop(0, DVec3::new(1.0, 0.0, 0.0), &tol)
            .is_err());
    }

    #[test]
    fn extrude_builds_six_loops_for_a_quad() {
        let model = unit_square();
        let tol = Tol::default();
        let solid = model.extrude_loop(0, DVec3::new(0.0, 0.0, 1.0), &tol).unwrap();
        assert_eq!(solid.loops.len(), 6);
        assert_eq!(solid.vertices.len(), 8);
    }

    #[test]
    fn kill_edge_merges_following_vertex_onto_preceding() {
        let mut model = unit_square();
        // he0: (0,0,0) -> (1,0,0); he1: (1,0,0) -> (1,1,0);
        // he2: (1,1,0) -> (0,1,0); he3: (0,1,0) -> (0,0,0).
        model.kill_edge(0).unwrap();
        let verts = model.loop_vertices(0);
        // The preceding vertex (0,0,0) survives; the following vertex
        // (1,0,0) is merged away and no longer appears in the loop.
        assert_eq!(verts.len(), 3);
        assert!(verts
            .iter()
            .any(|&p| (p - DVec3::new(0.0, 0.0, 0.0)).length() < 1e-9));
        assert!(verts
            .iter()
            .all(|&p| (p - DVec3::new(1.0, 0.0, 0.0)).length() > 1e-9));
    }

    #[test]
    fn kill_last_edge_of_loop_rejected() {
        let mut model = NmgModel::wire_loop_from_points(&[
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        // 3-edge triangle: kill two edges, leaving one half-edge whose
        // next/prev both point to itself; killing that one must be refused.
        model.kill_edge(0).unwrap();
        model.kill_edge(1).unwrap();
        assert!(model.kill_edge(2).is_err());
    }
}
