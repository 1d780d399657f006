//! The generic edit engine (§4.1): uniform scale/translate/rotate
//! shared by every primitive, plus the mouse-to-parameter mapping
//! every primitive backend falls through to for its generic
//! sub-operations. Grounded directly on the source's
//! `edit_sscale`/`edit_stra`/`edit_srot` family and on the teacher
//! crate's screen-space mouse-drag math in `gizmos::transform`
//! (`calculate_axis_movement`, the Y-delta scale mapping).

use glam::{DMat4, DQuat, DVec3};

use crate::error::{EditError, EditResult};

/// Where rotation and scale pivot, selected by the session's
/// `gv_rotate_about`-equivalent flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pivot {
    ViewCenter,
    Eye,
    ModelOrigin,
    Keypoint,
}

/// The primitive-agnostic sub-operation family (§4.1, §4.10). Paired
/// with [`crate::primitives::PrimitiveKind`] this realizes the tagged
/// sum the design note in §9 asks for in place of a flat `edit_flag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericOp {
    Scale,
    Translate,
    Rotate,
    MatrixScaleUniform,
    MatrixScalePerAxis(u8),
}

/// A single logical edit transaction's outcome: either every vertex
/// update and accumulator change commits together, or none of it
/// does (§5 — "single logical transaction").
pub struct ScaleResult {
    pub matrix: DMat4,
    pub new_acc_sc_sol: f64,
}

/// **Uniform scale** (`SSCALE`, §4.1). `factor` must be a single
/// positive scalar (drag ratios and keyboard entries are both
/// resolved to this before calling in). Returns the conjugated
/// `e_invmat . scale . e_mat` matrix the caller applies to the
/// primitive, and the new accumulated scale.
pub fn sscale(
    factor: f64,
    keypoint: DVec3,
    acc_sc_sol: f64,
    e_mat: DMat4,
    e_invmat: DMat4,
) -> EditResult<ScaleResult> {
    if factor <= 0.0 {
        return Err(EditError::OutOfRange {
            op: "SSCALE",
            value: factor,
            reason: "scale factor must be positive",
        });
    }
    let scale = scale_about_point(keypoint, DVec3::splat(factor));
    let matrix = e_invmat * scale * e_mat;
    Ok(ScaleResult {
        matrix,
        new_acc_sc_sol: acc_sc_sol * factor,
    })
}

/// **Uniform translate** (`STRA`, §4.1). `target` is in model units
/// unless `matrix_context` is set, in which case it is in world
/// coordinates and gets mapped back through `e_invmat` first.
pub fn stra(
    target: DVec3,
    keypoint: DVec3,
    local2base: f64,
    matrix_context: bool,
    e_invmat: DMat4,
) -> DMat4 {
    let target_model = if matrix_context {
        e_invmat.transform_point3(target)
    } else {
        target * local2base
    };
    let delta = target_model - keypoint;
    DMat4::from_translation(delta)
}

/// **Uniform rotate** (`SROT`, §4.1). `euler_deg` is an *absolute*
/// Euler rotation: the engine cancels whatever `acc_rot_sol`
/// currently represents before installing the new one, so repeated
/// calls compose to "most recent wins" rather than accumulating
/// deltas (invariant 3 of §8).
pub fn srot(
    euler_deg: DVec3,
    pivot: DVec3,
    acc_rot_sol: DQuat,
) -> (DMat4, DQuat) {
    let new_rot = DQuat::from_euler(
        glam::EulerRot::XYZ,
        euler_deg.x.to_radians(),
        euler_deg.y.to_radians(),
        euler_deg.z.to_radians(),
    );
    // cancel the prior accumulator, then install the new rotation —
    // net per-event matrix is `new_rot * acc_rot_sol^-1` about pivot.
    let delta = new_rot * acc_rot_sol.inverse();
    let matrix = rotate_about_point(pivot, delta);
    (matrix, new_rot)
}

fn scale_about_point(p: DVec3, factors: DVec3) -> DMat4 {
    DMat4::from_translation(p)
        * DMat4::from_scale(factors)
        * DMat4::from_translation(-p)
}

fn rotate_about_point(p: DVec3, rot: DQuat) -> DMat4 {
    DMat4::from_translation(p) * DMat4::from_quat(rot) * DMat4::from_translation(-p)
}

/// **Matrix-mode scaling** (`MATRIX_EDIT_SCALE_*`, §4.1). Applied to
/// `model_changes` rather than the primitive's vertices directly;
/// `axis` is `None` for the uniform variant, `Some(0..=2)` for a
/// per-axis variant.
pub fn matrix_mode_scale(
    factor: f64,
    axis: Option<u8>,
    keypoint: DVec3,
    acc_sc: &mut [f64; 3],
) -> EditResult<DMat4> {
    if factor <= 0.0 {
        return Err(EditError::OutOfRange {
            op: "MATRIX_EDIT_SCALE",
            value: factor,
            reason: "scale factor must be positive",
        });
    }
    let factors = match axis {
        None => {
            for a in acc_sc.iter_mut() {
                *a *= factor;
            }
            DVec3::splat(factor)
        }
        Some(a) => {
            acc_sc[a as usize] *= factor;
            let mut v = DVec3::ONE;
            v[a as usize] = factor;
            v
        }
    };
    Ok(scale_about_point(keypoint, factors))
}

/// Mouse → parameter mapping for scale drags (§4.1): the Y component
/// of the normalised mouse vector produces `1 + |dy|`, or its
/// reciprocal when the drag is in the negative direction — the same
/// shape as the teacher crate's Y-delta-to-scale-ratio handling in
/// its scale-gizmo drag handler.
pub fn mouse_scale_ratio(dy: f64) -> f64 {
    let magnitude = 1.0 + dy.abs();
    if dy >= 0.0 {
        magnitude
    } else {
        1.0 / magnitude
    }
}

/// Mouse → parameter mapping for translate drags (§4.1): substitute
/// the mouse's (x, y) for the keypoint's projected (x, y), keep its
/// projected z, then un-project and map through `e_invmat`. Axis
/// constraints zero out the components the constraint excludes
/// before un-projecting, the same "project to view, substitute,
/// un-project" shape the teacher's `calculate_axis_movement` and
/// `handle_transform_manipulation` use for constrained dragging.
pub fn mouse_translate_target(
    keypoint_view: DVec3,
    mouse_xy: (f64, f64),
    axis_constraint: Option<u8>,
    view_to_model: DMat4,
) -> DVec3 {
    let mut view_pos = DVec3::new(mouse_xy.0, mouse_xy.1, keypoint_view.z);
    if let Some(axis) = axis_constraint {
        for a in 0..3u8 {
            if a != axis {
                view_pos[a as usize] = keypoint_view[a as usize];
            }
        }
    }
    view_to_model.transform_point3(view_pos)
}

/// Reject an XY-mapped event for a sub-operation that doesn't support
/// it (§4.1 failure modes).
pub fn reject_xy_unsupported(op: &'static str) -> EditError {
    EditError::GeometryRejected {
        op,
        reason: "this sub-operation does not accept XY mouse input",
    }
}

pub fn check_arity(op: &'static str, expected: &'static str, got: usize, want: usize) -> EditResult<()> {
    if got != want {
        return Err(EditError::BadArity { op, expected, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sscale_rejects_nonpositive() {
        let e = DMat4::IDENTITY;
        assert!(sscale(0.0, DVec3::ZERO, 1.0, e, e).is_err());
        assert!(sscale(-2.0, DVec3::ZERO, 1.0, e, e).is_err());
    }

    #[test]
    fn invariant5_scale_reciprocity() {
        let e = DMat4::IDENTITY;
        let p = DVec3::new(1.0, 2.0, 3.0);
        let r1 = sscale(2.0, DVec3::ZERO, 1.0, e, e).unwrap();
        let p1 = r1.matrix.transform_point3(p);
        let r2 = sscale(0.5, DVec3::ZERO, r1.new_acc_sc_sol, e, e).unwrap();
        let p2 = r2.matrix.transform_point3(p1);
        assert_relative_eq!(p2.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(p2.y, p.y, epsilon = 1e-9);
        assert_relative_eq!(p2.z, p.z, epsilon = 1e-9);
        assert_relative_eq!(r2.new_acc_sc_sol, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn invariant4_identity_translate_is_noop() {
        let keypoint = DVec3::new(1.0, 2.0, 3.0);
        let matrix = stra(keypoint, keypoint, 1.0, false, DMat4::IDENTITY);
        let p = DVec3::new(5.0, -1.0, 7.0);
        let moved = matrix.transform_point3(p);
        assert_relative_eq!(moved.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(moved.y, p.y, epsilon = 1e-9);
        assert_relative_eq!(moved.z, p.z, epsilon = 1e-9);
    }

    #[test]
    fn invariant3_rotation_accumulator_is_absolute_not_composed() {
        let pivot = DVec3::ZERO;
        let mut acc = DQuat::IDENTITY;
        let (_, acc1) = srot(DVec3::new(30.0, 0.0, 0.0), pivot, acc);
        acc = acc1;
        let (_, acc2) = srot(DVec3::new(90.0, 0.0, 0.0), pivot, acc);
        let expected = DQuat::from_euler(glam::EulerRot::XYZ, 90f64.to_radians(), 0.0, 0.0);
        assert_relative_eq!(acc2.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(acc2.w, expected.w, epsilon = 1e-9);
    }

    #[test]
    fn mouse_scale_ratio_reciprocal_for_negative_drag() {
        assert_relative_eq!(mouse_scale_ratio(0.5), 1.5);
        assert_relative_eq!(mouse_scale_ratio(-0.5), 1.0 / 1.5);
    }
}
