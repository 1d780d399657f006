//! Dispatch layer (§4.10): a tagged sum `(PrimitiveKind, SubOp)`
//! replacing the source's flat `edit_flag` integer (§9). Each
//! primitive backend owns its own sub-operation enum; the generic
//! engine's ops apply uniformly across every backend via
//! [`Primitive::apply_generic_matrix`].

use glam::DMat4;

use crate::engine::GenericOp;
use crate::error::{EditError, EditResult};
use crate::primitives::{arb, ars, extrude, metaball, nmg, sampled_grid, scalar, tgc, Primitive};

/// ARB-specific sub-operations (§4.2).
#[derive(Debug, Clone)]
pub enum ArbOp {
    MoveEdge {
        edge: usize,
        anchor: glam::DVec3,
        dir: glam::DVec3,
    },
    MovePoint {
        vertex: usize,
        target: glam::DVec3,
    },
    MoveFace {
        face: usize,
        target: glam::DVec3,
    },
    RotateFace {
        face: usize,
        fixed_vertex: usize,
        euler_deg: glam::DVec3,
        original_normal: glam::DVec3,
    },
    Extrude {
        face: usize,
        dist: f64,
    },
    Permute {
        order: [usize; 8],
    },
    MirrorFaceAxis {
        face: usize,
        axis: usize,
    },
}

/// NMG-specific sub-operations (§4.3). Picking is handled directly by
/// the caller (it only reads `NmgModel`, it never mutates), so it has
/// no `SubOp` variant here.
#[derive(Debug, Clone)]
pub enum NmgOp {
    MoveEdge {
        he: nmg::HalfEdgeId,
        target: glam::DVec3,
        view_dir: glam::DVec3,
    },
    SplitEdge {
        he: nmg::HalfEdgeId,
        target: glam::DVec3,
    },
    KillEdge {
        he: nmg::HalfEdgeId,
    },
}

/// ARS-specific sub-operations (§4.4).
#[derive(Debug, Clone)]
pub enum ArsOp {
    MovePoint { crv: usize, col: usize, delta: glam::DVec3 },
    MoveCurve { crv: usize, delta: glam::DVec3 },
    MoveColumn { col: usize, delta: glam::DVec3 },
    DupCurve { crv: usize },
    DelCurve { crv: usize },
    DupColumn { col: usize },
    DelColumn { col: usize },
}

/// TGC-specific sub-operations (§4.5).
#[derive(Debug, Clone)]
pub enum TgcOp {
    ScaleH(f64),
    ScaleHAboutTop(f64),
    ScaleHProportionalCd(f64),
    ScaleA(f64),
    ScaleB(f64),
    ScaleC(f64),
    ScaleD(f64),
    ScaleAb(f64),
    ScaleCd(f64),
    ScaleAbcd(f64),
    MoveHEndPreserveShape(glam::DVec3),
    MoveHEndFree(glam::DVec3),
    RotateH {
        euler_deg: glam::DVec3,
        original_h: glam::DVec3,
    },
    RotateAbcd {
        euler_deg: glam::DVec3,
        original: (glam::DVec3, glam::DVec3, glam::DVec3, glam::DVec3),
    },
}

/// Extrusion-specific sub-operations (§4.6).
#[derive(Debug, Clone)]
pub enum ExtrudeOp {
    MoveTip(glam::DVec3),
    ScaleH(f64),
    RotateH {
        euler_deg: glam::DVec3,
        original_h: glam::DVec3,
    },
    SetSketchName(String),
}

/// Metaball-specific sub-operations (§4.7).
#[derive(Debug, Clone)]
pub enum MetaballOp {
    SetThreshold(f64),
    Pick { ray_origin: glam::DVec3, ray_dir: glam::DVec3 },
    Next,
    Prev,
    Move(glam::DVec3),
    ScaleFieldStrength(f64),
    ScaleGoo(f64),
    Delete,
    Add(metaball::MetaballPoint),
}

/// Sampled-grid sub-operations (§4.8).
#[derive(Debug, Clone)]
pub enum GridOp {
    SetFilename(String),
    SetDims([u32; 3]),
    SetCellSize(glam::DVec3),
    SetExtrudeScale(f64),
}

/// Simple-scalar-editor sub-operations (§4.9) — one variant per
/// primitive family since each has different named fields, all
/// taking the single positive scalar the template specifies.
#[derive(Debug, Clone)]
pub enum ScalarOp {
    EllA(f64),
    EllB(f64),
    EllC(f64),
    EllUniform(f64),
    TorR1(f64),
    TorR2(f64),
    PartV(f64),
    PartH(f64),
    EtoR(f64),
    EtoC(f64),
    EtoRd(f64),
    HypA(f64),
    HypB(f64),
    HypH(f64),
    SuperellUniform(f64),
}

/// The full tagged sum dispatched on: a generic op (handled
/// uniformly by [`Primitive::apply_generic_matrix`]) or a
/// primitive-specific op (handled by that primitive's own module).
#[derive(Debug, Clone)]
pub enum SubOp {
    Generic(GenericOp),
    Arb(ArbOp),
    Nmg(NmgOp),
    Ars(ArsOp),
    Tgc(TgcOp),
    Extrude(ExtrudeOp),
    Metaball(MetaballOp),
    Grid(GridOp),
    Scalar(ScalarOp),
}

/// Dispatch `op` against `primitive`. Per §4.10: look up the
/// primitive's type, call the primitive-specific handler if the op
/// targets that type, otherwise (for [`SubOp::Generic`]) delegate to
/// the matrix the caller already built via [`crate::engine`].
pub fn dispatch(
    primitive: &mut Primitive,
    op: &SubOp,
    generic_matrix: Option<DMat4>,
    leaf_scale: f64,
    tol: &crate::config::Tol,
) -> EditResult<()> {
    match op {
        SubOp::Generic(_) => {
            let m = generic_matrix.ok_or(EditError::InternalInvariant {
                op: "DISPATCH_GENERIC",
                reason: "generic op dispatched without a matrix".into(),
            })?;
            primitive.apply_generic_matrix(m)
        }
        SubOp::Arb(arb_op) => {
            let Primitive::Arb(solid) = primitive else {
                return Err(wrong_kind("ARB"));
            };
            match arb_op {
                ArbOp::MoveEdge { edge, anchor, dir } => solid.move_edge(*edge, *anchor, *dir, tol),
                ArbOp::MovePoint { vertex, target } => solid.move_point(*vertex, *target, tol),
                ArbOp::MoveFace { face, target } => solid.move_face(*face, *target, tol),
                ArbOp::RotateFace {
                    face,
                    fixed_vertex,
                    euler_deg,
                    original_normal,
                } => solid.rotate_face(*face, *fixed_vertex, *euler_deg, *original_normal, tol),
                ArbOp::Extrude { face, dist } => solid.extrude(*face, *dist, tol),
                ArbOp::Permute { order } => solid.permute(*order),
                ArbOp::MirrorFaceAxis { face, axis } => solid.mirror_face_axis(*face, *axis),
            }
        }
        SubOp::Nmg(nmg_op) => {
            let Primitive::Nmg(model) = primitive else {
                return Err(wrong_kind("NMG"));
            };
            match nmg_op {
                NmgOp::MoveEdge { he, target, view_dir } => model.move_edge(*he, *target, *view_dir, tol),
                NmgOp::SplitEdge { he, target } => model.split_edge(*he, *target).map(|_| ()),
                NmgOp::KillEdge { he } => model.kill_edge(*he),
            }
        }
        SubOp::Ars(ars_op) => {
            let Primitive::Ars(grid) = primitive else {
                return Err(wrong_kind("ARS"));
            };
            match ars_op {
                ArsOp::MovePoint { crv, col, delta } => grid.move_point(*crv, *col, *delta),
                ArsOp::MoveCurve { crv, delta } => grid.move_curve(*crv, *delta),
                ArsOp::MoveColumn { col, delta } => grid.move_column(*col, *delta),
                ArsOp::DupCurve { crv } => grid.dup_curve(*crv),
                ArsOp::DelCurve { crv } => grid.del_curve(*crv),
                ArsOp::DupColumn { col } => grid.dup_column(*col),
                ArsOp::DelColumn { col } => grid.del_column(*col),
            }
        }
        SubOp::Tgc(tgc_op) => {
            let Primitive::Tgc(t) = primitive else {
                return Err(wrong_kind("TGC"));
            };
            match tgc_op {
                TgcOp::ScaleH(f) => t.scale_h(*f),
                TgcOp::ScaleHAboutTop(f) => t.scale_h_about_top(*f),
                TgcOp::ScaleHProportionalCd(f) => t.scale_h_proportional_cd(*f),
                TgcOp::ScaleA(f) => t.scale_a(*f),
                TgcOp::ScaleB(f) => t.scale_b(*f),
                TgcOp::ScaleC(f) => t.scale_c(*f),
                TgcOp::ScaleD(f) => t.scale_d(*f),
                TgcOp::ScaleAb(f) => t.scale_ab(*f),
                TgcOp::ScaleCd(f) => t.scale_cd(*f),
                TgcOp::ScaleAbcd(f) => t.scale_abcd(*f),
                TgcOp::MoveHEndPreserveShape(p) => t.move_h_end_preserve_shape(*p),
                TgcOp::MoveHEndFree(p) => t.move_h_end_free(*p),
                TgcOp::RotateH { euler_deg, original_h } => t.rotate_h(*euler_deg, *original_h),
                TgcOp::RotateAbcd { euler_deg, original } => t.rotate_abcd(*euler_deg, *original),
            }
        }
        SubOp::Extrude(extr_op) => {
            let Primitive::Extrude(e) = primitive else {
                return Err(wrong_kind("EXTRUDE"));
            };
            match extr_op {
                ExtrudeOp::MoveTip(p) => e.move_tip(*p, tol),
                ExtrudeOp::ScaleH(f) => e.scale_h(*f),
                ExtrudeOp::RotateH { euler_deg, original_h } => e.rotate_h(*euler_deg, *original_h),
                ExtrudeOp::SetSketchName(name) => {
                    e.set_sketch_name(name.clone());
                    Ok(())
                }
            }
        }
        SubOp::Metaball(mb_op) => {
            let Primitive::Metaball(mb) = primitive else {
                return Err(wrong_kind("METABALL"));
            };
            match mb_op {
                MetaballOp::SetThreshold(t) => mb.set_threshold(*t),
                MetaballOp::Pick { ray_origin, ray_dir } => {
                    mb.pick(*ray_origin, *ray_dir);
                    Ok(())
                }
                MetaballOp::Next => {
                    mb.next();
                    Ok(())
                }
                MetaballOp::Prev => {
                    mb.prev();
                    Ok(())
                }
                MetaballOp::Move(p) => mb.move_selected(*p),
                MetaballOp::ScaleFieldStrength(f) => mb.scale_field_strength(*f),
                MetaballOp::ScaleGoo(f) => mb.scale_goo(*f),
                MetaballOp::Delete => mb.delete_selected(),
                MetaballOp::Add(p) => {
                    mb.add(p.clone());
                    Ok(())
                }
            }
        }
        SubOp::Grid(grid_op) => {
            let Primitive::SampledGrid(g) = primitive else {
                return Err(wrong_kind("SAMPLED_GRID"));
            };
            match grid_op {
                GridOp::SetFilename(path) => g.set_filename(path),
                GridOp::SetDims(dims) => g.set_dims(*dims),
                GridOp::SetCellSize(size) => g.set_cell_size(*size),
                GridOp::SetExtrudeScale(scale) => g.set_extrude_scale(*scale),
            }
        }
        SubOp::Scalar(scalar_op) => dispatch_scalar(primitive, scalar_op, leaf_scale, tol),
    }
}

fn dispatch_scalar(
    primitive: &mut Primitive,
    op: &ScalarOp,
    leaf_scale: f64,
    tol: &crate::config::Tol,
) -> EditResult<()> {
    match (primitive, op) {
        (Primitive::Ell(e), ScalarOp::EllA(f)) => e.scale_a(*f, leaf_scale),
        (Primitive::Ell(e), ScalarOp::EllB(f)) => e.scale_b(*f, leaf_scale),
        (Primitive::Ell(e), ScalarOp::EllC(f)) => e.scale_c(*f, leaf_scale),
        (Primitive::Ell(e), ScalarOp::EllUniform(f)) => e.scale_uniform(*f, leaf_scale),
        (Primitive::Tor(t), ScalarOp::TorR1(f)) => t.scale_r1(*f, leaf_scale),
        (Primitive::Tor(t), ScalarOp::TorR2(f)) => t.scale_r2(*f, leaf_scale),
        (Primitive::Part(p), ScalarOp::PartV(f)) => p.scale_rv(*f, leaf_scale),
        (Primitive::Part(p), ScalarOp::PartH(f)) => p.scale_rh(*f, leaf_scale),
        (Primitive::Eto(e), ScalarOp::EtoR(f)) => e.scale_r(*f, leaf_scale),
        (Primitive::Eto(e), ScalarOp::EtoC(f)) => e.scale_c(*f, leaf_scale),
        (Primitive::Eto(e), ScalarOp::EtoRd(f)) => e.scale_rd(*f, leaf_scale, tol),
        (Primitive::Hyp(h), ScalarOp::HypA(f)) => h.scale_a(*f, leaf_scale),
        (Primitive::Hyp(h), ScalarOp::HypB(f)) => h.scale_b(*f, leaf_scale),
        (Primitive::Hyp(h), ScalarOp::HypH(f)) => h.scale_h(*f, leaf_scale),
        (Primitive::Superell(s), ScalarOp::SuperellUniform(f)) => s.scale_uniform(*f, leaf_scale),
        _ => Err(wrong_kind("SCALAR")),
    }
}

fn wrong_kind(expected: &'static str) -> EditError {
    EditError::InternalInvariant {
        op: "DISPATCH",
        reason: format!("op targets {expected} but the session's primitive is a different kind"),
    }
}

impl Primitive {
    /// Apply a generic engine matrix (scale/translate/rotate) to this
    /// primitive's geometric fields. Point-like fields (vertices,
    /// centers) transform with the full affine matrix; direction-like
    /// fields (axes, normals) transform with its linear part only.
    pub fn apply_generic_matrix(&mut self, m: DMat4) -> EditResult<()> {
        match self {
            Primitive::Arb(solid) => {
                for p in solid.pt.iter_mut() {
                    *p = m.transform_point3(*p);
                }
                Ok(())
            }
            Primitive::Nmg(model) => {
                for v in model.vertices.iter_mut() {
                    v.pos = m.transform_point3(v.pos);
                }
                Ok(())
            }
            Primitive::Ars(grid) => {
                for curve in grid.curves.iter_mut() {
                    for p in curve.iter_mut() {
                        *p = m.transform_point3(*p);
                    }
                }
                Ok(())
            }
            Primitive::Tgc(t) => {
                t.v = m.transform_point3(t.v);
                t.h = m.transform_vector3(t.h);
                t.a = m.transform_vector3(t.a);
                t.b = m.transform_vector3(t.b);
                t.c = m.transform_vector3(t.c);
                t.d = m.transform_vector3(t.d);
                Ok(())
            }
            Primitive::Extrude(e) => {
                e.v = m.transform_point3(e.v);
                e.h = m.transform_vector3(e.h);
                Ok(())
            }
            Primitive::Metaball(mb) => {
                for p in mb.points.iter_mut() {
                    p.pos = m.transform_point3(p.pos);
                }
                Ok(())
            }
            Primitive::SampledGrid(_) => Err(EditError::GeometryRejected {
                op: "DISPATCH_GENERIC",
                reason: "sampled-grid primitives are edited via file/dimension ops, not generic transforms",
            }),
            Primitive::Ell(e) => {
                e.v = m.transform_point3(e.v);
                e.a = m.transform_vector3(e.a);
                e.b = m.transform_vector3(e.b);
                e.c = m.transform_vector3(e.c);
                Ok(())
            }
            Primitive::Tor(t) => {
                t.v = m.transform_point3(t.v);
                t.h = m.transform_vector3(t.h);
                Ok(())
            }
            Primitive::Part(p) => {
                p.v = m.transform_point3(p.v);
                p.h = m.transform_vector3(p.h);
                Ok(())
            }
            Primitive::Eto(e) => {
                e.v = m.transform_point3(e.v);
                e.norm = m.transform_vector3(e.norm);
                e.c = m.transform_vector3(e.c);
                Ok(())
            }
            Primitive::Hyp(h) => {
                h.v = m.transform_point3(h.v);
                h.h = m.transform_vector3(h.h);
                h.a = m.transform_vector3(h.a);
                Ok(())
            }
            Primitive::Superell(s) => {
                s.v = m.transform_point3(s.v);
                s.a = m.transform_vector3(s.a);
                s.b = m.transform_vector3(s.b);
                s.c = m.transform_vector3(s.c);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn dispatch_rejects_mismatched_primitive_kind() {
        let mut tor = Primitive::Tor(scalar::Tor {
            v: DVec3::ZERO,
            h: DVec3::Z,
            r_a: 10.0,
            r_h: 3.0,
        });
        let op = SubOp::Arb(ArbOp::MoveFace {
            face: 0,
            target: DVec3::ZERO,
        });
        let tol = crate::config::Tol::default();
        let err = dispatch(&mut tor, &op, None, 1.0, &tol).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn dispatch_generic_translate_moves_arb() {
        let mut solid = Primitive::Arb(arb::ArbSolid::unit_cube());
        let m = DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0));
        let op = SubOp::Generic(GenericOp::Translate);
        let tol = crate::config::Tol::default();
        dispatch(&mut solid, &op, Some(m), 1.0, &tol).unwrap();
        if let Primitive::Arb(s) = solid {
            assert!((s.pt[0].x - 0.5).abs() < 1e-9);
        } else {
            panic!("wrong variant");
        }
    }
}
