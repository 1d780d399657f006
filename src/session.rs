//! The edit session (§3.1): the top-level object the host creates
//! for one imported primitive and drives with menu clicks, textual
//! parameter entry, and mouse events. Ties together the generic
//! engine (§4.1), the dispatch layer (§4.10), the callback registry
//! (§6.1) and the per-primitive sub-state (§3.3, §3.4) that doesn't
//! belong on the primitive's own persisted geometry.

use glam::{DMat4, DQuat, DVec3};

use crate::callbacks::{CallbackArg, CallbackRegistry, CallbackReply, EditEvent, Phase};
use crate::config::Config;
use crate::dispatch::{self, ArbOp, SubOp};
use crate::engine::{self, GenericOp, Pivot};
use crate::error::{EditError, EditResult};
use crate::menu::{self, MenuEntry, MenuItem};
use crate::primitives::arb::ArbType;
use crate::primitives::nmg::{HalfEdgeId, NmgModel};
use crate::primitives::Primitive;

/// Per-primitive selection state that the source keeps on the edit
/// session rather than on the primitive's own persisted form (§3.3,
/// §3.4): which face/edge/point is selected, and — for NMG loop
/// extrusion — the throw-away model the operation stages its result
/// in before the host commits it.
#[derive(Debug, Clone, Default)]
pub enum SubState {
    #[default]
    None,
    Arb {
        selected_edge: Option<usize>,
        selected_face: Option<usize>,
        /// Fixed vertex for the current face rotation, supplied by
        /// the host via `ECMD_ARB_SETUP_ROTFACE` (§6.1).
        fixv: Option<usize>,
        /// The face's normal as of rotation setup, so repeated
        /// absolute rotations compose correctly (invariant 3, §8).
        rotate_original_normal: Option<DVec3>,
        /// Distinguishes "drag an edge endpoint" from "change its
        /// direction via the `edgedir` command" (§3.3).
        new_edge: bool,
    },
    Nmg {
        selected_he: Option<HalfEdgeId>,
        /// Staged result of the last `LEXTRU`, held until the host
        /// commits it into the shell (§5, "allocated on menu entry,
        /// freed on menu exit").
        extrude_staging: Option<NmgModel>,
    },
    Ars {
        selected: Option<(usize, usize)>,
    },
    Tgc {
        /// `H`, and the `(A,B,C,D)` set, as of rotate sub-menu entry —
        /// absolute rotation is always applied to these, never to the
        /// solid's current values, for the same reason as ARB's
        /// `rotate_original_normal` (invariant 3, §8).
        original_h: Option<DVec3>,
        original_abcd: Option<(DVec3, DVec3, DVec3, DVec3)>,
    },
    Extrude {
        original_h: Option<DVec3>,
    },
}

/// The full edit session (§3.1).
pub struct EditSession {
    pub primitive: Primitive,

    pub keypoint: DVec3,
    pub keypoint_name: &'static str,
    pub curr_e_axes_pos: DVec3,

    /// Leaf-path transform and its inverse (§3.1). `mv_context`
    /// toggles whether translate/rotate parameters are read in model
    /// space or mapped back through `e_invmat` from world space.
    pub e_mat: DMat4,
    pub e_invmat: DMat4,
    pub mv_context: bool,

    pub acc_rot_sol: DQuat,
    pub acc_sc_sol: f64,
    pub acc_sc: [f64; 3],
    pub model_changes: DMat4,
    pub incr_change: DMat4,

    pub pivot: Pivot,

    /// Up to three scalar input parameters, how many of them are
    /// valid, and whether a mouse-derived value is currently staged
    /// (§3.1).
    pub e_para: [f64; 3],
    pub e_inpara: usize,
    pub e_mvalid: bool,
    pub e_mparam: DVec3,

    pub edit_menu: Vec<MenuItem>,
    pub sub_state: SubState,

    pub config: Config,
    log: Vec<String>,
    callbacks: CallbackRegistry,
}

impl EditSession {
    pub fn new(primitive: Primitive, config: Config) -> Self {
        let sub_state = match &primitive {
            Primitive::Arb(_) => SubState::Arb {
                selected_edge: None,
                selected_face: None,
                fixv: None,
                rotate_original_normal: None,
                new_edge: false,
            },
            Primitive::Nmg(_) => SubState::Nmg {
                selected_he: None,
                extrude_staging: None,
            },
            Primitive::Ars(_) => SubState::Ars { selected: None },
            Primitive::Tgc(_) => SubState::Tgc {
                original_h: None,
                original_abcd: None,
            },
            Primitive::Extrude(_) => SubState::Extrude { original_h: None },
            _ => SubState::None,
        };
        EditSession {
            primitive,
            keypoint: DVec3::ZERO,
            keypoint_name: "V",
            curr_e_axes_pos: DVec3::ZERO,
            e_mat: DMat4::IDENTITY,
            e_invmat: DMat4::IDENTITY,
            mv_context: false,
            acc_rot_sol: DQuat::IDENTITY,
            acc_sc_sol: 1.0,
            acc_sc: [1.0; 3],
            model_changes: DMat4::IDENTITY,
            incr_change: DMat4::IDENTITY,
            pivot: Pivot::Keypoint,
            e_para: [0.0; 3],
            e_inpara: 0,
            e_mvalid: false,
            e_mparam: DVec3::ZERO,
            edit_menu: menu::generic_menu(),
            sub_state,
            config,
            log: Vec::new(),
            callbacks: CallbackRegistry::new(),
        }
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    /// Invariant check: `e_invmat . e_mat == I` within tolerance
    /// (§3.5).
    pub fn matrix_context_consistent(&self) -> bool {
        let product = self.e_invmat * self.e_mat;
        let id = DMat4::IDENTITY;
        for col in 0..4 {
            for row in 0..4 {
                if (product.col(col)[row] - id.col(col)[row]).abs() > 1e-6 {
                    return false;
                }
            }
        }
        true
    }

    fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// `ECMD_PRINT_RESULTS`: flush the log buffer to the host and
    /// clear it.
    pub fn flush_log(&mut self) {
        if self.log.is_empty() {
            return;
        }
        let joined = self.log.join("\n");
        self.callbacks
            .invoke(EditEvent::PrintResults, Phase::After, CallbackArg::Log(joined));
        self.log.clear();
    }

    /// Report a rejected operation (§7): logged via `tracing::warn!`
    /// and the session's own log buffer, flushed to the host, session
    /// left open and the primitive untouched. The single exception is
    /// [`EditError::InternalInvariant`], which this crate still
    /// returns rather than panics on — terminating the session is the
    /// host's call, not this function's.
    fn report_error(&mut self, err: &EditError) {
        tracing::warn!(error = %err, "edit sub-operation rejected");
        self.push_log(err.to_string());
        self.flush_log();
    }

    fn notify_changed(&mut self) {
        self.callbacks
            .invoke(EditEvent::ReplotEditingSolid, Phase::After, CallbackArg::None);
        self.callbacks
            .invoke(EditEvent::ViewSetFlag, Phase::After, CallbackArg::None);
    }

    /// Recompute and publish `curr_e_axes_pos` (`ECMD_EAXES_POS`),
    /// keeping invariant "axes position lies on the object being
    /// edited" (§3.5).
    fn set_axes_pos(&mut self, pos: DVec3) {
        self.curr_e_axes_pos = pos;
        self.callbacks
            .invoke(EditEvent::EaxesPos, Phase::After, CallbackArg::Point(pos));
    }

    /// Install a new menu table and notify the host
    /// (`ECMD_MENU_SET`).
    fn install_menu(&mut self, menu: Vec<MenuItem>) {
        self.edit_menu = menu;
        self.callbacks
            .invoke(EditEvent::MenuSet, Phase::After, CallbackArg::None);
    }

    // ---- generic engine entry points (§4.1) --------------------------

    /// `SSCALE`: uniform scale from a single positive scalar (§4.1).
    pub fn sscale(&mut self, factor: f64) -> EditResult<()> {
        if self.e_inpara > 1 {
            let err = EditError::BadArity {
                op: "SSCALE",
                expected: "one parameter",
                got: self.e_inpara,
            };
            self.report_error(&err);
            return Err(err);
        }
        let result = match engine::sscale(
            factor,
            self.keypoint,
            self.acc_sc_sol,
            self.e_mat,
            self.e_invmat,
        ) {
            Ok(r) => r,
            Err(e) => {
                self.report_error(&e);
                return Err(e);
            }
        };
        self.primitive.apply_generic_matrix(result.matrix)?;
        self.acc_sc_sol = result.new_acc_sc_sol;
        self.notify_changed();
        Ok(())
    }

    /// `STRA`: uniform translate to `target` (model units unless
    /// `mv_context` is set, §4.1).
    pub fn stra(&mut self, target: DVec3) -> EditResult<()> {
        let matrix = engine::stra(
            target,
            self.keypoint,
            self.config.units.local2base,
            self.mv_context,
            self.e_invmat,
        );
        self.primitive.apply_generic_matrix(matrix)?;
        self.notify_changed();
        Ok(())
    }

    /// `SROT`: absolute Euler rotation about the session's current
    /// [`Pivot`] (§4.1).
    pub fn srot(&mut self, euler_deg: DVec3) -> EditResult<()> {
        let pivot = match self.pivot {
            Pivot::Keypoint => self.keypoint,
            // View-centre, eye and model-origin pivots are resolved by
            // the host's camera/view state, which this headless core
            // does not own (§1 Out of scope); callers operating those
            // pivots supply the resolved world point via `e_mparam`.
            _ => self.e_mparam,
        };
        let (matrix, new_acc) = engine::srot(euler_deg, pivot, self.acc_rot_sol);
        self.primitive.apply_generic_matrix(matrix)?;
        self.acc_rot_sol = new_acc;
        self.notify_changed();
        Ok(())
    }

    /// Resets the accumulated rotation/scale once the host has baked
    /// pending motion into the primitive's permanent form (§3.5: "only
    /// when a sub-operation explicitly completes").
    pub fn bake_accumulators(&mut self) {
        self.acc_rot_sol = DQuat::IDENTITY;
        self.acc_sc_sol = 1.0;
        self.acc_sc = [1.0; 3];
        self.model_changes = DMat4::IDENTITY;
    }

    /// Dispatch a fully-formed sub-operation (any primitive) through
    /// [`dispatch::dispatch`], reporting and leaving the primitive
    /// untouched on error (§5 "single logical transaction").
    pub fn apply(&mut self, op: SubOp, generic_matrix: Option<DMat4>) -> EditResult<()> {
        // `e_mat[15]`: the leaf-path's scale factor, applied by the
        // simple-scalar editors (§4.9) before mutating the primitive.
        let leaf_scale = self.e_mat.col(3).w;
        match dispatch::dispatch(
            &mut self.primitive,
            &op,
            generic_matrix,
            leaf_scale,
            &self.config.tol,
        ) {
            Ok(()) => {
                self.notify_changed();
                Ok(())
            }
            Err(e) => {
                if e.is_fatal() {
                    tracing::error!(error = %e, "internal invariant violated, aborting edit session");
                }
                self.report_error(&e);
                Err(e)
            }
        }
    }

    // ---- menu selection (§3.2, §4.2, §4.3) ---------------------------

    /// Handle a menu click at the ARB top level: pick the move-edge,
    /// move-face or rotate-face sub-menu sized for the solid's current
    /// [`ArbType`], and install it.
    pub fn arb_open_submenu(&mut self, which: ArbSubmenu) -> EditResult<()> {
        let Primitive::Arb(solid) = &self.primitive else {
            return Err(self.wrong_primitive("ARB_SUBMENU"));
        };
        let arb_type = solid.arb_type;
        let built = match which {
            ArbSubmenu::MoveEdge => menu::arb_move_edge_menu(arb_type),
            ArbSubmenu::MoveFace => menu::arb_move_face_menu(arb_type),
            ArbSubmenu::RotateFace => menu::arb_rotate_face_menu(arb_type),
        };
        self.install_menu(built);
        Ok(())
    }

    /// A row of the currently-installed ARB sub-menu was clicked:
    /// record the selection and move the edit axes to the relevant
    /// feature (edge midpoint, face centroid).
    pub fn arb_select(&mut self, entry: MenuEntry) -> EditResult<()> {
        let Primitive::Arb(solid) = &self.primitive else {
            return Err(self.wrong_primitive("ARB_SELECT"));
        };
        let axes_pos = match entry {
            MenuEntry::ArbMoveEdge(e) => {
                let (v1, v2) = crate::primitives::arb::ARB8_EDGES[e];
                (solid.pt[v1] + solid.pt[v2]) / 2.0
            }
            MenuEntry::ArbMovePoint(v) => solid.pt[v],
            MenuEntry::ArbMoveFace(f) | MenuEntry::ArbRotateFace(f) => {
                let face = crate::primitives::arb::ARB8_FACES[f];
                face.iter().map(|&v| solid.pt[v]).sum::<DVec3>() / face.len() as f64
            }
            _ => return Err(self.wrong_primitive("ARB_SELECT")),
        };
        if let SubState::Arb {
            selected_edge,
            selected_face,
            fixv,
            rotate_original_normal,
            ..
        } = &mut self.sub_state
        {
            *selected_edge = None;
            *selected_face = None;
            *fixv = None;
            *rotate_original_normal = None;
            match entry {
                MenuEntry::ArbMoveEdge(e) => *selected_edge = Some(e),
                MenuEntry::ArbMovePoint(v) => *selected_edge = Some(v),
                MenuEntry::ArbMoveFace(f) => *selected_face = Some(f),
                MenuEntry::ArbRotateFace(f) => {
                    *selected_face = Some(f);
                    let Primitive::Arb(solid) = &self.primitive else {
                        unreachable!()
                    };
                    let planes = solid.calc_planes(&self.config.tol)?;
                    *rotate_original_normal = planes[f].map(|p| p.normal);
                }
                _ => {}
            }
        }
        self.set_axes_pos(axes_pos);
        Ok(())
    }

    /// Ask the host which vertex of the rotating face is fixed
    /// (`ECMD_ARB_SETUP_ROTFACE`, §6.1), and record the answer.
    pub fn arb_setup_rotface(&mut self) -> EditResult<()> {
        let reply = self
            .callbacks
            .invoke(EditEvent::ArbSetupRotface, Phase::During, CallbackArg::None);
        let fixed = match reply {
            CallbackReply::Index(i) => i,
            _ => {
                return Err(EditError::MissingSelection {
                    op: "ARB_SETUP_ROTFACE",
                    selection: "fixed vertex",
                })
            }
        };
        if let SubState::Arb { fixv, .. } = &mut self.sub_state {
            *fixv = Some(fixed);
        }
        Ok(())
    }

    /// Apply the selected ARB edge move using the edge's own current
    /// direction (endpoint drag) to `target`.
    pub fn arb_move_edge_to(&mut self, target: DVec3) -> EditResult<()> {
        let (edge, dir) = self.arb_selected_edge_and_dir()?;
        let anchor = target;
        self.apply(
            SubOp::Arb(ArbOp::MoveEdge { edge, anchor, dir }),
            None,
        )
    }

    /// Apply the selected ARB edge move along an explicit direction
    /// (the `edgedir` command, §6.3).
    pub fn arb_move_edge_dir(&mut self, anchor: DVec3, dir: DVec3) -> EditResult<()> {
        let (edge, _) = self.arb_selected_edge_and_dir()?;
        self.apply(SubOp::Arb(ArbOp::MoveEdge { edge, anchor, dir }), None)
    }

    fn arb_selected_edge_and_dir(&self) -> EditResult<(usize, DVec3)> {
        let Primitive::Arb(solid) = &self.primitive else {
            return Err(self.wrong_primitive("ARB_MOVE_EDGE"));
        };
        let SubState::Arb {
            selected_edge: Some(e),
            ..
        } = &self.sub_state
        else {
            return Err(EditError::MissingSelection {
                op: "ARB_MOVE_EDGE",
                selection: "edge",
            });
        };
        let (v1, v2) = crate::primitives::arb::ARB8_EDGES[*e];
        Ok((*e, solid.pt[v2] - solid.pt[v1]))
    }

    pub fn arb_move_face_to(&mut self, target: DVec3) -> EditResult<()> {
        let SubState::Arb {
            selected_face: Some(f),
            ..
        } = &self.sub_state
        else {
            return Err(EditError::MissingSelection {
                op: "ARB_MOVE_FACE",
                selection: "face",
            });
        };
        let face = *f;
        self.apply(SubOp::Arb(ArbOp::MoveFace { face, target }), None)
    }

    pub fn arb_rotate_face(&mut self, euler_deg: DVec3) -> EditResult<()> {
        let SubState::Arb {
            selected_face: Some(face),
            fixv: Some(fixed_vertex),
            rotate_original_normal: Some(original_normal),
            ..
        } = &self.sub_state
        else {
            return Err(EditError::MissingSelection {
                op: "ARB_ROTATE_FACE",
                selection: "face and fixed vertex",
            });
        };
        let (face, fixed_vertex, original_normal) = (*face, *fixed_vertex, *original_normal);
        self.apply(
            SubOp::Arb(ArbOp::RotateFace {
                face,
                fixed_vertex,
                euler_deg,
                original_normal,
            }),
            None,
        )
    }

    // ---- NMG selection (§4.3) ----------------------------------------

    /// `EPICK`: find and store the nearest edge to the mouse ray.
    ///
    /// Known inconsistency, kept rather than fixed: this stores the
    /// pick directly into `sub_state` instead of staging it in
    /// `e_mparam` the way every other pivot-resolving op does, so a
    /// picked-but-not-yet-applied edge is already mutated into the
    /// session before `apply` ever runs. Retained as-is (see §9).
    pub fn nmg_pick(&mut self, ray_origin: DVec3, ray_dir: DVec3) -> EditResult<()> {
        let Primitive::Nmg(model) = &self.primitive else {
            return Err(self.wrong_primitive("NMG_PICK"));
        };
        let picked = model.pick_edge(ray_origin, ray_dir);
        if let SubState::Nmg { selected_he, .. } = &mut self.sub_state {
            *selected_he = picked;
        }
        match picked {
            Some(he) => {
                self.push_log(format!("selected edgeuse {he}"));
                self.flush_log();
                Ok(())
            }
            None => Err(EditError::MissingSelection {
                op: "NMG_PICK",
                selection: "edge",
            }),
        }
    }

    fn nmg_selected(&self) -> EditResult<HalfEdgeId> {
        match &self.sub_state {
            SubState::Nmg {
                selected_he: Some(he),
                ..
            } => Ok(*he),
            _ => Err(EditError::MissingSelection {
                op: "NMG_EDIT",
                selection: "edgeuse",
            }),
        }
    }

    pub fn nmg_move(&mut self, target: DVec3, view_dir: DVec3) -> EditResult<()> {
        let he = self.nmg_selected()?;
        self.apply(
            SubOp::Nmg(dispatch::NmgOp::MoveEdge { he, target, view_dir }),
            None,
        )
    }

    pub fn nmg_split(&mut self, target: DVec3) -> EditResult<()> {
        let he = self.nmg_selected()?;
        self.apply(SubOp::Nmg(dispatch::NmgOp::SplitEdge { he, target }), None)
    }

    pub fn nmg_kill(&mut self) -> EditResult<()> {
        let he = self.nmg_selected()?;
        self.apply(SubOp::Nmg(dispatch::NmgOp::KillEdge { he }), None)?;
        if let SubState::Nmg { selected_he, .. } = &mut self.sub_state {
            *selected_he = None;
        }
        Ok(())
    }

    pub fn nmg_forward(&mut self) -> EditResult<()> {
        let he = self.nmg_selected()?;
        let Primitive::Nmg(model) = &self.primitive else {
            return Err(self.wrong_primitive("NMG_FORWARD"));
        };
        let next = model.next_edge(he);
        if let SubState::Nmg { selected_he, .. } = &mut self.sub_state {
            *selected_he = Some(next);
        }
        Ok(())
    }

    pub fn nmg_back(&mut self) -> EditResult<()> {
        let he = self.nmg_selected()?;
        let Primitive::Nmg(model) = &self.primitive else {
            return Err(self.wrong_primitive("NMG_BACK"));
        };
        let prev = model.prev_edge(he);
        if let SubState::Nmg { selected_he, .. } = &mut self.sub_state {
            *selected_he = Some(prev);
        }
        Ok(())
    }

    pub fn nmg_radial(&mut self) -> EditResult<()> {
        let he = self.nmg_selected()?;
        let Primitive::Nmg(model) = &self.primitive else {
            return Err(self.wrong_primitive("NMG_RADIAL"));
        };
        let mate = model.radial_edge(he);
        if let SubState::Nmg { selected_he, .. } = &mut self.sub_state {
            *selected_he = Some(mate);
        }
        Ok(())
    }

    /// `LEXTRU`: extrude the shell's single wire loop, staging the
    /// result rather than committing it directly (§5).
    pub fn nmg_extrude_loop(&mut self, loop_id: u32, direction: DVec3) -> EditResult<()> {
        let Primitive::Nmg(model) = &self.primitive else {
            return Err(self.wrong_primitive("NMG_LEXTRU"));
        };
        match model.extrude_loop(loop_id, direction, &self.config.tol) {
            Ok(staged) => {
                if let SubState::Nmg {
                    extrude_staging, ..
                } = &mut self.sub_state
                {
                    *extrude_staging = Some(staged);
                }
                self.notify_changed();
                Ok(())
            }
            Err(e) => {
                self.report_error(&e);
                Err(e)
            }
        }
    }

    /// Commit the staged extrusion result as the session's new NMG
    /// model, discarding the throw-away copy (§5, "freed on menu
    /// exit").
    pub fn nmg_commit_extrude(&mut self) -> EditResult<()> {
        let staged = match &mut self.sub_state {
            SubState::Nmg {
                extrude_staging, ..
            } => extrude_staging.take(),
            _ => None,
        };
        match staged {
            Some(model) => {
                self.primitive = Primitive::Nmg(model);
                self.notify_changed();
                Ok(())
            }
            None => Err(EditError::InternalInvariant {
                op: "NMG_LEXTRU_COMMIT",
                reason: "no staged extrusion result to commit".into(),
            }),
        }
    }

    // ---- ARS selection (§4.4) -----------------------------------------

    /// `EPICK` analogue for ARS: nearest grid point to the mouse ray.
    pub fn ars_pick(&mut self, ray_origin: DVec3, ray_dir: DVec3) -> EditResult<()> {
        let Primitive::Ars(grid) = &self.primitive else {
            return Err(self.wrong_primitive("ARS_PICK"));
        };
        let picked = grid.pick(ray_origin, ray_dir);
        if let SubState::Ars { selected } = &mut self.sub_state {
            *selected = picked;
        }
        picked.ok_or(EditError::MissingSelection {
            op: "ARS_PICK",
            selection: "point",
        })
    }

    fn ars_selected(&self) -> EditResult<(usize, usize)> {
        match &self.sub_state {
            SubState::Ars {
                selected: Some(p), ..
            } => Ok(*p),
            _ => Err(EditError::MissingSelection {
                op: "ARS_EDIT",
                selection: "point",
            }),
        }
    }

    pub fn ars_next_point(&mut self) -> EditResult<()> {
        let (crv, col) = self.ars_selected()?;
        let Primitive::Ars(grid) = &self.primitive else {
            return Err(self.wrong_primitive("ARS_NEXT"));
        };
        let next = grid.next_point(crv, col);
        if let SubState::Ars { selected } = &mut self.sub_state {
            *selected = Some(next);
        }
        Ok(())
    }

    pub fn ars_prev_point(&mut self) -> EditResult<()> {
        let (crv, col) = self.ars_selected()?;
        let Primitive::Ars(grid) = &self.primitive else {
            return Err(self.wrong_primitive("ARS_PREV"));
        };
        let prev = grid.prev_point(crv, col);
        if let SubState::Ars { selected } = &mut self.sub_state {
            *selected = Some(prev);
        }
        Ok(())
    }

    pub fn ars_move_point(&mut self, delta: DVec3) -> EditResult<()> {
        let (crv, col) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::MovePoint { crv, col, delta }), None)
    }

    pub fn ars_move_curve(&mut self, delta: DVec3) -> EditResult<()> {
        let (crv, _) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::MoveCurve { crv, delta }), None)
    }

    pub fn ars_move_column(&mut self, delta: DVec3) -> EditResult<()> {
        let (_, col) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::MoveColumn { col, delta }), None)
    }

    pub fn ars_dup_curve(&mut self) -> EditResult<()> {
        let (crv, _) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::DupCurve { crv }), None)
    }

    pub fn ars_del_curve(&mut self) -> EditResult<()> {
        let (crv, _) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::DelCurve { crv }), None)
    }

    pub fn ars_dup_column(&mut self) -> EditResult<()> {
        let (_, col) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::DupColumn { col }), None)
    }

    pub fn ars_del_column(&mut self) -> EditResult<()> {
        let (_, col) = self.ars_selected()?;
        self.apply(SubOp::Ars(dispatch::ArsOp::DelColumn { col }), None)
    }

    // ---- TGC rotate (§4.5) ---------------------------------------------

    /// Enter the "rotate H" sub-menu: cache `H`'s current direction as
    /// the value absolute rotation is applied to.
    pub fn tgc_begin_rotate_h(&mut self) -> EditResult<()> {
        let Primitive::Tgc(t) = &self.primitive else {
            return Err(self.wrong_primitive("TGC_ROTATE_H"));
        };
        let h = t.h;
        if let SubState::Tgc { original_h, .. } = &mut self.sub_state {
            *original_h = Some(h);
        }
        Ok(())
    }

    pub fn tgc_rotate_h(&mut self, euler_deg: DVec3) -> EditResult<()> {
        let SubState::Tgc {
            original_h: Some(original_h),
            ..
        } = &self.sub_state
        else {
            return Err(EditError::MissingSelection {
                op: "TGC_ROTATE_H",
                selection: "original H (call tgc_begin_rotate_h first)",
            });
        };
        let original_h = *original_h;
        self.apply(SubOp::Tgc(dispatch::TgcOp::RotateH { euler_deg, original_h }), None)
    }

    /// Enter the "rotate A,B,C,D" sub-menu: cache the current plane set.
    pub fn tgc_begin_rotate_abcd(&mut self) -> EditResult<()> {
        let Primitive::Tgc(t) = &self.primitive else {
            return Err(self.wrong_primitive("TGC_ROTATE_ABCD"));
        };
        let original = (t.a, t.b, t.c, t.d);
        if let SubState::Tgc { original_abcd, .. } = &mut self.sub_state {
            *original_abcd = Some(original);
        }
        Ok(())
    }

    pub fn tgc_rotate_abcd(&mut self, euler_deg: DVec3) -> EditResult<()> {
        let SubState::Tgc {
            original_abcd: Some(original),
            ..
        } = &self.sub_state
        else {
            return Err(EditError::MissingSelection {
                op: "TGC_ROTATE_ABCD",
                selection: "original A,B,C,D (call tgc_begin_rotate_abcd first)",
            });
        };
        let original = *original;
        self.apply(
            SubOp::Tgc(dispatch::TgcOp::RotateAbcd { euler_deg, original }),
            None,
        )
    }

    // ---- Extrude (§4.6) -------------------------------------------------

    pub fn extrude_move_tip(&mut self, target: DVec3) -> EditResult<()> {
        self.apply(SubOp::Extrude(dispatch::ExtrudeOp::MoveTip(target)), None)
    }

    pub fn extrude_scale_h(&mut self, factor: f64) -> EditResult<()> {
        self.apply(SubOp::Extrude(dispatch::ExtrudeOp::ScaleH(factor)), None)
    }

    /// Enter the "rotate H" sub-menu: cache `H`'s current direction.
    pub fn extrude_begin_rotate_h(&mut self) -> EditResult<()> {
        let Primitive::Extrude(e) = &self.primitive else {
            return Err(self.wrong_primitive("EXTR_ROTATE_H"));
        };
        let h = e.h;
        if let SubState::Extrude { original_h } = &mut self.sub_state {
            *original_h = Some(h);
        }
        Ok(())
    }

    pub fn extrude_rotate_h(&mut self, euler_deg: DVec3) -> EditResult<()> {
        let SubState::Extrude {
            original_h: Some(original_h),
        } = &self.sub_state
        else {
            return Err(EditError::MissingSelection {
                op: "EXTR_ROTATE_H",
                selection: "original H (call extrude_begin_rotate_h first)",
            });
        };
        let original_h = *original_h;
        self.apply(
            SubOp::Extrude(dispatch::ExtrudeOp::RotateH { euler_deg, original_h }),
            None,
        )
    }

    /// `ECMD_EXTR_SKT_NAME`: ask the host for a replacement sketch
    /// reference and rebind to it.
    pub fn extrude_set_sketch_name(&mut self) -> EditResult<()> {
        let reply = self
            .callbacks
            .invoke(EditEvent::ExtrSktName, Phase::During, CallbackArg::None);
        let name = match reply {
            CallbackReply::Path(p) => p,
            _ => {
                return Err(EditError::MissingResource {
                    op: "EXTR_SKT_NAME",
                    reason: "host did not supply a sketch reference".into(),
                })
            }
        };
        self.apply(SubOp::Extrude(dispatch::ExtrudeOp::SetSketchName(name)), None)
    }

    // ---- Metaball (§4.7) -------------------------------------------------

    pub fn mball_set_threshold(&mut self, threshold: f64) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::SetThreshold(threshold)), None)
    }

    pub fn mball_pick(&mut self, ray_origin: DVec3, ray_dir: DVec3) -> EditResult<()> {
        self.apply(
            SubOp::Metaball(dispatch::MetaballOp::Pick { ray_origin, ray_dir }),
            None,
        )
    }

    pub fn mball_next(&mut self) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::Next), None)
    }

    pub fn mball_prev(&mut self) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::Prev), None)
    }

    pub fn mball_move(&mut self, target: DVec3) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::Move(target)), None)
    }

    pub fn mball_scale_field_strength(&mut self, factor: f64) -> EditResult<()> {
        self.apply(
            SubOp::Metaball(dispatch::MetaballOp::ScaleFieldStrength(factor)),
            None,
        )
    }

    pub fn mball_scale_goo(&mut self, factor: f64) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::ScaleGoo(factor)), None)
    }

    pub fn mball_delete(&mut self) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::Delete), None)
    }

    pub fn mball_add(&mut self, point: crate::primitives::metaball::MetaballPoint) -> EditResult<()> {
        self.apply(SubOp::Metaball(dispatch::MetaballOp::Add(point)), None)
    }

    // ---- Sampled grid (§4.8) ---------------------------------------------

    /// `ECMD_GET_FILENAME`: ask the host for a replacement data file
    /// and bind to it.
    pub fn grid_set_filename(&mut self) -> EditResult<()> {
        let reply = self
            .callbacks
            .invoke(EditEvent::GetFilename, Phase::During, CallbackArg::None);
        let path = match reply {
            CallbackReply::Path(p) => p,
            _ => {
                return Err(EditError::MissingResource {
                    op: "GRID_SET_FILENAME",
                    reason: "host did not supply a data file path".into(),
                })
            }
        };
        self.apply(SubOp::Grid(dispatch::GridOp::SetFilename(path)), None)
    }

    pub fn grid_set_dims(&mut self, dims: [u32; 3]) -> EditResult<()> {
        self.apply(SubOp::Grid(dispatch::GridOp::SetDims(dims)), None)
    }

    pub fn grid_set_cell_size(&mut self, size: DVec3) -> EditResult<()> {
        self.apply(SubOp::Grid(dispatch::GridOp::SetCellSize(size)), None)
    }

    pub fn grid_set_extrude_scale(&mut self, scale: f64) -> EditResult<()> {
        self.apply(SubOp::Grid(dispatch::GridOp::SetExtrudeScale(scale)), None)
    }

    // ---- Simple scalar editors (§4.9) ------------------------------------

    /// Apply one named scalar scale for whichever simple-scalar
    /// primitive is currently bound; `dispatch_scalar` rejects a
    /// mismatched `(primitive, op)` pairing.
    pub fn scalar_scale(&mut self, op: dispatch::ScalarOp) -> EditResult<()> {
        self.apply(SubOp::Scalar(op), None)
    }

    fn wrong_primitive(&self, op: &'static str) -> EditError {
        EditError::InternalInvariant {
            op,
            reason: "operation does not match the session's current primitive kind".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbSubmenu {
    MoveEdge,
    MoveFace,
    RotateFace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::arb::ArbSolid;
    use approx::assert_relative_eq;

    /// Installs a `tracing` subscriber so the `tracing::debug!`/`warn!`
    /// spans this module's sub-operations emit (engine.rs, session.rs)
    /// are visible under `cargo test -- --nocapture`, the same
    /// `try_init`-in-test-setup idiom the pack's own integration tests
    /// use. Idempotent: later calls in the same process are no-ops.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn arb_session() -> EditSession {
        init_tracing();
        EditSession::new(Primitive::Arb(ArbSolid::unit_cube()), Config::default())
    }

    #[test]
    fn new_session_matrix_invariant_holds() {
        let s = arb_session();
        assert!(s.matrix_context_consistent());
    }

    #[test]
    fn s1_arb8_face_move_via_session() {
        let mut s = arb_session();
        s.arb_open_submenu(ArbSubmenu::MoveFace).unwrap();
        s.arb_select(MenuEntry::ArbMoveFace(0)).unwrap();
        s.arb_move_face_to(DVec3::new(0.0, 0.0, -0.25)).unwrap();
        let Primitive::Arb(solid) = &s.primitive else {
            unreachable!()
        };
        for &v in &crate::primitives::arb::ARB8_FACES[0] {
            assert_relative_eq!(solid.pt[v].z, -0.75, epsilon = 1e-9);
        }
    }

    #[test]
    fn move_face_without_selection_rejected() {
        let mut s = arb_session();
        assert!(s.arb_move_face_to(DVec3::ZERO).is_err());
    }

    #[test]
    fn invariant5_scale_reciprocity_through_session() {
        let mut s = arb_session();
        s.e_inpara = 1;
        s.sscale(2.0).unwrap();
        s.sscale(0.5).unwrap();
        let Primitive::Arb(solid) = &s.primitive else {
            unreachable!()
        };
        let cube = ArbSolid::unit_cube();
        for i in 0..8 {
            assert_relative_eq!(solid.pt[i].x, cube.pt[i].x, epsilon = 1e-9);
        }
        assert_relative_eq!(s.acc_sc_sol, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn invariant4_identity_translate_via_session() {
        let mut s = arb_session();
        let kp = s.keypoint;
        s.stra(kp).unwrap();
        let Primitive::Arb(solid) = &s.primitive else {
            unreachable!()
        };
        let cube = ArbSolid::unit_cube();
        for i in 0..8 {
            assert_relative_eq!(solid.pt[i].x, cube.pt[i].x, epsilon = 1e-9);
            assert_relative_eq!(solid.pt[i].y, cube.pt[i].y, epsilon = 1e-9);
            assert_relative_eq!(solid.pt[i].z, cube.pt[i].z, epsilon = 1e-9);
        }
    }

    #[test]
    fn sscale_with_too_many_params_rejected() {
        let mut s = arb_session();
        s.e_inpara = 2;
        assert!(s.sscale(2.0).is_err());
    }

    #[test]
    fn nmg_pick_then_move_then_split() {
        let model = NmgModel::wire_loop_from_points(&[
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let mut s = EditSession::new(Primitive::Nmg(model), Config::default());
        s.nmg_pick(DVec3::new(0.5, -1.0, 0.0), DVec3::new(0.0, 1.0, 0.0))
            .unwrap();
        s.nmg_split(DVec3::new(0.5, 0.0, 0.0)).unwrap();
        let Primitive::Nmg(model) = &s.primitive else {
            unreachable!()
        };
        assert_eq!(model.loop_half_edges(0).len(), 5);
    }

    #[test]
    fn nmg_operation_without_pick_rejected() {
        let model = NmgModel::wire_loop_from_points(&[
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
        ])
        .unwrap();
        let mut s = EditSession::new(Primitive::Nmg(model), Config::default());
        assert!(s.nmg_kill().is_err());
    }

    #[test]
    fn tgc_rotate_h_requires_begin_first() {
        use crate::primitives::tgc::Tgc;
        let tgc = Tgc {
            v: DVec3::ZERO,
            h: DVec3::new(0.0, 0.0, 10.0),
            a: DVec3::new(2.0, 0.0, 0.0),
            b: DVec3::new(0.0, 2.0, 0.0),
            c: DVec3::new(1.0, 0.0, 0.0),
            d: DVec3::new(0.0, 1.0, 0.0),
        };
        let mut s = EditSession::new(Primitive::Tgc(tgc), Config::default());
        assert!(s.tgc_rotate_h(DVec3::new(90.0, 0.0, 0.0)).is_err());
        s.tgc_begin_rotate_h().unwrap();
        s.tgc_rotate_h(DVec3::new(90.0, 0.0, 0.0)).unwrap();
        s.tgc_rotate_h(DVec3::ZERO).unwrap();
        let Primitive::Tgc(tgc) = &s.primitive else {
            unreachable!()
        };
        assert_relative_eq!(tgc.h.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(tgc.h.z, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn ars_pick_then_move_point() {
        use crate::primitives::ars::Ars;
        let grid = Ars::new(vec![
            vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 1.0)],
            vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 1.0)],
        ])
        .unwrap();
        let mut s = EditSession::new(Primitive::Ars(grid), Config::default());
        s.ars_pick(DVec3::new(0.0, -1.0, 0.0), DVec3::new(0.0, 1.0, 0.0))
            .unwrap();
        s.ars_move_point(DVec3::new(0.0, 0.0, 5.0)).unwrap();
        let Primitive::Ars(grid) = &s.primitive else {
            unreachable!()
        };
        assert_relative_eq!(grid.curves[0][0].z, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn mball_pick_move_and_delete() {
        use crate::primitives::metaball::{Metaball, MetaballPoint, RenderMethod};
        let mb = Metaball {
            threshold: 0.5,
            method: RenderMethod::Metaball,
            points: vec![
                MetaballPoint { pos: DVec3::ZERO, field_strength: 1.0, goo: 1.0 },
                MetaballPoint { pos: DVec3::new(2.0, 0.0, 0.0), field_strength: 1.0, goo: 1.0 },
            ],
            selected: None,
        };
        let mut s = EditSession::new(Primitive::Metaball(mb), Config::default());
        s.mball_pick(DVec3::new(0.0, -1.0, 0.0), DVec3::new(0.0, 1.0, 0.0))
            .unwrap();
        s.mball_move(DVec3::new(0.0, 0.0, 3.0)).unwrap();
        s.mball_delete().unwrap();
        let Primitive::Metaball(mb) = &s.primitive else {
            unreachable!()
        };
        assert_eq!(mb.points.len(), 1);
    }
}
