//! Extrusion primitive editor (§4.6): a sketch pushed along `H` from
//! vertex `V`. Three sub-operations plus rebinding the sketch
//! reference itself.

use glam::DVec3;

use crate::config::Tol;
use crate::error::{EditError, EditResult};
use crate::math::is_nonzero;

#[derive(Debug, Clone, PartialEq)]
pub struct Extrude {
    pub v: DVec3,
    pub h: DVec3,
    /// Name of the referenced sketch object (opaque to this crate —
    /// the database layer owns sketch contents, §1 Out of scope).
    pub sketch_name: String,
}

impl Extrude {
    /// Move the extrusion's tip (`V + H`) to `target`, holding `V`
    /// fixed and recomputing `H`.
    pub fn move_tip(&mut self, target: DVec3, tol: &Tol) -> EditResult<()> {
        let new_h = target - self.v;
        if !is_nonzero(new_h, tol) {
            return Err(EditError::GeometryRejected {
                op: "EXTR_MV_H",
                reason: "H would become zero-length",
            });
        }
        self.h = new_h;
        Ok(())
    }

    pub fn scale_h(&mut self, factor: f64) -> EditResult<()> {
        if factor <= 0.0 {
            return Err(EditError::OutOfRange {
                op: "EXTR_SCALE_H",
                value: factor,
                reason: "scale factor must be positive",
            });
        }
        self.h *= factor;
        Ok(())
    }

    pub fn rotate_h(&mut self, euler_deg: DVec3, original_h: DVec3) -> EditResult<()> {
        let rot = glam::DQuat::from_euler(
            glam::EulerRot::XYZ,
            euler_deg.x.to_radians(),
            euler_deg.y.to_radians(),
            euler_deg.z.to_radians(),
        );
        self.h = rot * original_h;
        Ok(())
    }

    /// S6: setting `H` to a near-zero vector is rejected and `H` is
    /// reset to `+Z` rather than left at whatever tiny value was
    /// supplied.
    pub fn set_h(&mut self, h: DVec3, tol: &Tol) -> EditResult<()> {
        if !is_nonzero(h, tol) {
            self.h = DVec3::Z;
            return Err(EditError::GeometryRejected {
                op: "EXTR_SET_H",
                reason: "Zero H vector not allowed",
            });
        }
        self.h = h;
        Ok(())
    }

    pub fn set_sketch_name(&mut self, name: impl Into<String>) {
        self.sketch_name = name.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_zero_h_resets_to_plus_z() {
        let mut extr = Extrude {
            v: DVec3::ZERO,
            h: DVec3::Z * 5.0,
            sketch_name: "sk1".into(),
        };
        let tol = Tol::default();
        let err = extr.set_h(DVec3::new(0.0, 0.0, 1e-10), &tol).unwrap_err();
        assert!(matches!(err, EditError::GeometryRejected { .. }));
        assert_eq!(extr.h, DVec3::Z);
    }
}
