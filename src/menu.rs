//! Per-primitive edit menus (§3.2, §4.2-§4.9): an ordered sequence of
//! `{string, handler, arg}`, the first element carrying the menu
//! title with no handler. Tables here carry an [`MenuEntry`] tag
//! rather than a function pointer: the host reports which row was
//! clicked, [`crate::dispatch`] resolves the tag (plus whatever
//! scalar/mouse input follows) into the concrete [`crate::dispatch::SubOp`].
//!
//! ARB's menus vary in row count with the solid's vertex count (§4.2),
//! so those builders return an owned `Vec` rather than a `&'static`
//! slice; every other primitive's menu is small and fixed, built the
//! same way for consistency.

use crate::engine::GenericOp;
use crate::primitives::arb::ArbType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    /// The title row: no handler, selecting it is a no-op.
    Title,
    Generic(GenericOp),
    ArbMoveEdge(usize),
    ArbMovePoint(usize),
    ArbMoveFace(usize),
    ArbRotateFace(usize),
    NmgPick,
    NmgMove,
    NmgSplit,
    NmgKill,
    NmgForward,
    NmgBack,
    NmgRadial,
    NmgLoopExtrude,
    NmgEdebug,
    ArsPick,
    ArsNextPoint,
    ArsPrevPoint,
    ArsMovePoint,
    ArsMoveCurve,
    ArsMoveColumn,
    ArsDupCurve,
    ArsDelCurve,
    ArsDupColumn,
    ArsDelColumn,
    TgcScaleH,
    TgcScaleHAboutTop,
    TgcScaleHProportionalCd,
    TgcScaleA,
    TgcScaleB,
    TgcScaleC,
    TgcScaleD,
    TgcScaleAb,
    TgcScaleCd,
    TgcScaleAbcd,
    TgcRotateH,
    TgcRotateAbcd,
    TgcMoveHEndPreserveShape,
    TgcMoveHEndFree,
    ExtrSetSketch,
    ExtrMoveTip,
    ExtrScaleH,
    ExtrRotateH,
    MballSetThreshold,
    MballSetMethod,
    MballPick,
    MballNext,
    MballPrev,
    MballMove,
    MballScaleFieldStrength,
    MballScaleGoo,
    MballDelete,
    MballAdd,
    GridSetFilename,
    GridSetDims,
    GridSetCellSize,
    GridSetExtrudeScale,
    ScalarOp(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: String,
    pub entry: MenuEntry,
}

fn title(label: &str) -> MenuItem {
    MenuItem {
        label: label.to_string(),
        entry: MenuEntry::Title,
    }
}

fn item(label: impl Into<String>, entry: MenuEntry) -> MenuItem {
    MenuItem {
        label: label.into(),
        entry,
    }
}

/// Menu shared by every primitive's top level (§4.1): uniform scale,
/// translate, rotate.
pub fn generic_menu() -> Vec<MenuItem> {
    vec![
        title("Edit menu"),
        item("scale", MenuEntry::Generic(GenericOp::Scale)),
        item("translate", MenuEntry::Generic(GenericOp::Translate)),
        item("rotate", MenuEntry::Generic(GenericOp::Rotate)),
    ]
}

/// ARB "move edge" sub-menu (§4.2): row count and labels depend on
/// the solid's vertex count. ARB5 lists eight edges plus a "move
/// point 5" row; ARB4 lists four vertex moves instead of edges;
/// ARB6-ARB8 list their edges directly.
pub fn arb_move_edge_menu(arb_type: ArbType) -> Vec<MenuItem> {
    let mut menu = vec![title("move edge")];
    match arb_type {
        ArbType::Arb4 => {
            for v in 0..4 {
                menu.push(item(format!("move point {}", v + 1), MenuEntry::ArbMovePoint(v)));
            }
        }
        ArbType::Arb5 => {
            for e in 0..8 {
                menu.push(item(format!("move edge {}", e + 1), MenuEntry::ArbMoveEdge(e)));
            }
            menu.push(item("move point 5", MenuEntry::ArbMovePoint(4)));
        }
        ArbType::Arb6 | ArbType::Arb7 | ArbType::Arb8 => {
            for e in 0..12 {
                menu.push(item(format!("move edge {}", e + 1), MenuEntry::ArbMoveEdge(e)));
            }
        }
    }
    menu
}

/// ARB "move face" sub-menu: 4-6 rows depending on type.
pub fn arb_move_face_menu(arb_type: ArbType) -> Vec<MenuItem> {
    let mut menu = vec![title("move face")];
    for f in 0..arb_type.face_count() {
        menu.push(item(format!("move face {}", f + 1), MenuEntry::ArbMoveFace(f)));
    }
    menu
}

/// ARB "rotate face" sub-menu: same face set as move-face, each row
/// triggering the rotation setup (fixed-vertex pick) instead.
pub fn arb_rotate_face_menu(arb_type: ArbType) -> Vec<MenuItem> {
    let mut menu = vec![title("rotate face")];
    for f in 0..arb_type.face_count() {
        menu.push(item(format!("rotate face {}", f + 1), MenuEntry::ArbRotateFace(f)));
    }
    menu
}

pub fn nmg_menu() -> Vec<MenuItem> {
    vec![
        title("NMG edit"),
        item("pick edge", MenuEntry::NmgPick),
        item("move edge", MenuEntry::NmgMove),
        item("split edge", MenuEntry::NmgSplit),
        item("kill edge", MenuEntry::NmgKill),
        item("next edgeuse", MenuEntry::NmgForward),
        item("prev edgeuse", MenuEntry::NmgBack),
        item("radial edgeuse", MenuEntry::NmgRadial),
        item("extrude loop", MenuEntry::NmgLoopExtrude),
        item("debug overlay", MenuEntry::NmgEdebug),
    ]
}

pub fn ars_menu() -> Vec<MenuItem> {
    vec![
        title("ARS edit"),
        item("pick point", MenuEntry::ArsPick),
        item("next point", MenuEntry::ArsNextPoint),
        item("prev point", MenuEntry::ArsPrevPoint),
        item("move point", MenuEntry::ArsMovePoint),
        item("move curve", MenuEntry::ArsMoveCurve),
        item("move column", MenuEntry::ArsMoveColumn),
        item("duplicate curve", MenuEntry::ArsDupCurve),
        item("delete curve", MenuEntry::ArsDelCurve),
        item("duplicate column", MenuEntry::ArsDupColumn),
        item("delete column", MenuEntry::ArsDelColumn),
    ]
}

pub fn tgc_menu() -> Vec<MenuItem> {
    vec![
        title("TGC edit"),
        item("scale H", MenuEntry::TgcScaleH),
        item("scale H, move V", MenuEntry::TgcScaleHAboutTop),
        item("scale H, adjust C/D", MenuEntry::TgcScaleHProportionalCd),
        item("scale A", MenuEntry::TgcScaleA),
        item("scale B", MenuEntry::TgcScaleB),
        item("scale C", MenuEntry::TgcScaleC),
        item("scale D", MenuEntry::TgcScaleD),
        item("scale A,B", MenuEntry::TgcScaleAb),
        item("scale C,D", MenuEntry::TgcScaleCd),
        item("scale A,B,C,D", MenuEntry::TgcScaleAbcd),
        item("rotate H", MenuEntry::TgcRotateH),
        item("rotate A,B,C,D", MenuEntry::TgcRotateAbcd),
        item("move end of H (hold shape)", MenuEntry::TgcMoveHEndPreserveShape),
        item("move end of H (free)", MenuEntry::TgcMoveHEndFree),
    ]
}

pub fn extrude_menu() -> Vec<MenuItem> {
    vec![
        title("extrude edit"),
        item("set sketch reference", MenuEntry::ExtrSetSketch),
        item("move end of H", MenuEntry::ExtrMoveTip),
        item("scale H", MenuEntry::ExtrScaleH),
        item("rotate H", MenuEntry::ExtrRotateH),
    ]
}

pub fn metaball_menu() -> Vec<MenuItem> {
    vec![
        title("metaball edit"),
        item("set threshold", MenuEntry::MballSetThreshold),
        item("set render method", MenuEntry::MballSetMethod),
        item("pick point", MenuEntry::MballPick),
        item("next point", MenuEntry::MballNext),
        item("prev point", MenuEntry::MballPrev),
        item("move point", MenuEntry::MballMove),
        item("scale field strength", MenuEntry::MballScaleFieldStrength),
        item("scale goo", MenuEntry::MballScaleGoo),
        item("delete point", MenuEntry::MballDelete),
        item("add point", MenuEntry::MballAdd),
    ]
}

pub fn sampled_grid_menu() -> Vec<MenuItem> {
    vec![
        title("sampled grid edit"),
        item("set data file", MenuEntry::GridSetFilename),
        item("set dimensions", MenuEntry::GridSetDims),
        item("set cell size", MenuEntry::GridSetCellSize),
        item("set extrude scale", MenuEntry::GridSetExtrudeScale),
    ]
}

/// Simple-scalar editors (§4.9) all share this shape: one row per
/// named scalar plus a trailing uniform-scale row; `names` gives the
/// per-primitive labels in menu order (e.g. `["A", "B", "C"]` for
/// ELL).
pub fn scalar_menu(title_text: &str, names: &'static [&'static str]) -> Vec<MenuItem> {
    let mut menu = vec![title(title_text)];
    for &n in names {
        menu.push(item(format!("scale {n}"), MenuEntry::ScalarOp(n)));
    }
    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arb8_move_edge_menu_has_twelve_edges_plus_title() {
        let menu = arb_move_edge_menu(ArbType::Arb8);
        assert_eq!(menu.len(), 13);
        assert_eq!(menu[0].entry, MenuEntry::Title);
    }

    #[test]
    fn arb4_move_edge_menu_lists_vertex_moves() {
        let menu = arb_move_edge_menu(ArbType::Arb4);
        assert_eq!(menu.len(), 5);
        assert_eq!(menu[1].entry, MenuEntry::ArbMovePoint(0));
    }

    #[test]
    fn arb5_move_edge_menu_has_eight_edges_and_move_point_five() {
        let menu = arb_move_edge_menu(ArbType::Arb5);
        assert_eq!(menu.len(), 10);
        assert_eq!(menu.last().unwrap().entry, MenuEntry::ArbMovePoint(4));
    }

    #[test]
    fn move_face_menu_row_count_matches_face_count() {
        assert_eq!(arb_move_face_menu(ArbType::Arb8).len(), 7);
        assert_eq!(arb_move_face_menu(ArbType::Arb4).len(), 5);
    }
}
