//! ARS (rectilinear point grid) editor (§4.4): a `ncurves x
//! pts_per_curve` grid of points, edited by picking, translating a
//! point/row/column, and growing or shrinking the grid subject to a
//! 2x2 minimum size.

use glam::DVec3;

use crate::error::{EditError, EditResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Ars {
    /// `curves[crv][col]`.
    pub curves: Vec<Vec<DVec3>>,
}

impl Ars {
    pub fn new(curves: Vec<Vec<DVec3>>) -> EditResult<Self> {
        let ars = Ars { curves };
        ars.check_rectangular()?;
        Ok(ars)
    }

    pub fn ncurves(&self) -> usize {
        self.curves.len()
    }

    pub fn pts_per_curve(&self) -> usize {
        self.curves.first().map(|c| c.len()).unwrap_or(0)
    }

    fn check_rectangular(&self) -> EditResult<()> {
        if let Some(first) = self.curves.first() {
            let n = first.len();
            if self.curves.iter().any(|c| c.len() != n) {
                return Err(EditError::InternalInvariant {
                    op: "ARS_SHAPE",
                    reason: "curves are not all the same length".into(),
                });
            }
        }
        Ok(())
    }

    /// Closest-point pick along a view ray; returns `(curve, column)`.
    pub fn pick(&self, ray_origin: DVec3, ray_dir: DVec3) -> Option<(usize, usize)> {
        let d = ray_dir.normalize_or_zero();
        let mut best: Option<((usize, usize), f64)> = None;
        for (ci, curve) in self.curves.iter().enumerate() {
            for (pi, &p) in curve.iter().enumerate() {
                let to_p = p - ray_origin;
                let along = to_p.dot(d);
                let closest = ray_origin + d * along;
                let dist = (p - closest).length();
                if best.map(|(_, bd)| dist < bd).unwrap_or(true) {
                    best = Some(((ci, pi), dist));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn next_point(&self, crv: usize, col: usize) -> (usize, usize) {
        let cols = self.pts_per_curve();
        if col + 1 < cols {
            (crv, col + 1)
        } else {
            ((crv + 1) % self.ncurves(), 0)
        }
    }

    pub fn prev_point(&self, crv: usize, col: usize) -> (usize, usize) {
        if col > 0 {
            (crv, col - 1)
        } else {
            let prev_crv = (crv + self.ncurves() - 1) % self.ncurves();
            (prev_crv, self.pts_per_curve() - 1)
        }
    }

    pub fn move_point(&mut self, crv: usize, col: usize, delta: DVec3) -> EditResult<()> {
        let p = self
            .curves
            .get_mut(crv)
            .and_then(|c| c.get_mut(col))
            .ok_or(EditError::MissingSelection {
                op: "ARS_MOVE_PT",
                selection: "point",
            })?;
        *p += delta;
        Ok(())
    }

    pub fn move_curve(&mut self, crv: usize, delta: DVec3) -> EditResult<()> {
        let curve = self.curves.get_mut(crv).ok_or(EditError::MissingSelection {
            op: "ARS_MOVE_CRV",
            selection: "curve",
        })?;
        for p in curve.iter_mut() {
            *p += delta;
        }
        Ok(())
    }

    pub fn move_column(&mut self, col: usize, delta: DVec3) -> EditResult<()> {
        if col >= self.pts_per_curve() {
            return Err(EditError::MissingSelection {
                op: "ARS_MOVE_COL",
                selection: "column",
            });
        }
        for curve in self.curves.iter_mut() {
            curve[col] += delta;
        }
        Ok(())
    }

    pub fn dup_curve(&mut self, crv: usize) -> EditResult<()> {
        let curve = self
            .curves
            .get(crv)
            .ok_or(EditError::MissingSelection {
                op: "ARS_DUP_CRV",
                selection: "curve",
            })?
            .clone();
        self.curves.insert(crv + 1, curve);
        Ok(())
    }

    /// First and last curve cannot be deleted (§4.4); minimum grid
    /// size 2x2 is enforced.
    pub fn del_curve(&mut self, crv: usize) -> EditResult<()> {
        if self.ncurves() <= 2 {
            return Err(EditError::GeometryRejected {
                op: "ARS_DEL_CRV",
                reason: "grid would drop below the minimum 2x2 size",
            });
        }
        if crv == 0 || crv == self.ncurves() - 1 {
            return Err(EditError::GeometryRejected {
                op: "ARS_DEL_CRV",
                reason: "cannot delete first or last curve",
            });
        }
        self.curves.remove(crv);
        Ok(())
    }

    pub fn dup_column(&mut self, col: usize) -> EditResult<()> {
        if col >= self.pts_per_curve() {
            return Err(EditError::MissingSelection {
                op: "ARS_DUP_COL",
                selection: "column",
            });
        }
        for curve in self.curves.iter_mut() {
            let p = curve[col];
            curve.insert(col + 1, p);
        }
        Ok(())
    }

    /// S5: deleting column 0 (or the last column) is rejected with
    /// "Cannot delete first or last column" and the grid is left
    /// unchanged.
    pub fn del_column(&mut self, col: usize) -> EditResult<()> {
        if self.pts_per_curve() <= 2 {
            return Err(EditError::GeometryRejected {
                op: "ARS_DEL_COL",
                reason: "grid would drop below the minimum 2x2 size",
            });
        }
        if col == 0 || col == self.pts_per_curve() - 1 {
            return Err(EditError::GeometryRejected {
                op: "ARS_DEL_COL",
                reason: "Cannot delete first or last column",
            });
        }
        for curve in self.curves.iter_mut() {
            curve.remove(col);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x3() -> Ars {
        let mut curves = Vec::new();
        for ci in 0..3 {
            let mut row = Vec::new();
            for pi in 0..3 {
                row.push(DVec3::new(ci as f64, pi as f64, 0.0));
            }
            curves.push(row);
        }
        Ars::new(curves).unwrap()
    }

    #[test]
    fn s5_delete_first_column_rejected() {
        let mut ars = grid_3x3();
        let before = ars.clone();
        let err = ars.del_column(0).unwrap_err();
        assert!(matches!(err, EditError::GeometryRejected { .. }));
        assert_eq!(ars, before);
    }

    #[test]
    fn invariant7_del_col_shrinks_by_one_and_stays_at_least_2() {
        let mut ars = grid_3x3();
        ars.del_column(1).unwrap();
        assert_eq!(ars.pts_per_curve(), 2);
        assert!(ars.del_column(0).is_err());
    }

    #[test]
    fn dup_curve_is_vertex_identical() {
        let mut ars = grid_3x3();
        ars.dup_curve(0).unwrap();
        assert_eq!(ars.curves[0], ars.curves[1]);
    }
}
