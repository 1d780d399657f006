//! A headless solid-editing core: the interactive primitive- and
//! boundary-representation-editing engine of a CSG modelling system,
//! stripped of its database, ray-tracing, tessellation and display
//! layers (all reached, in the full system, through the callback
//! registry and opaque handles this crate never defines — see
//! [`callbacks`]).
//!
//! ## Layout
//!
//! - [`math`] — tolerance-aware vector/plane kernel every editor sits
//!   on.
//! - [`config`] — session tolerances and unit conversion.
//! - [`error`] — the crate-wide `EditError` taxonomy.
//! - [`engine`] — the generic scale/translate/rotate engine shared by
//!   every primitive.
//! - [`primitives`] — one module per primitive family (ARB, NMG, ARS,
//!   TGC, extrude, metaball, sampled grids, and the simple scalar
//!   editors).
//! - [`dispatch`] — the `(PrimitiveKind, SubOp)` tagged dispatch that
//!   replaces the source's flat `edit_flag` integer.
//! - [`menu`] — per-primitive edit menus.
//! - [`command`] — the scripting-level text command surface.
//! - [`callbacks`] — the host callback registry.
//! - [`session`] — [`session::EditSession`], the object that ties all
//!   of the above into one running edit.
//!
//! ## Example
//!
//! ```
//! use solid_edit::config::Config;
//! use solid_edit::menu::MenuEntry;
//! use solid_edit::primitives::arb::ArbSolid;
//! use solid_edit::primitives::Primitive;
//! use solid_edit::session::{ArbSubmenu, EditSession};
//! use glam::DVec3;
//!
//! let mut session = EditSession::new(Primitive::Arb(ArbSolid::unit_cube()), Config::default());
//! session.arb_open_submenu(ArbSubmenu::MoveFace).unwrap();
//! session.arb_select(MenuEntry::ArbMoveFace(0)).unwrap();
//! session.arb_move_face_to(DVec3::new(0.0, 0.0, -0.25)).unwrap();
//! ```

pub mod callbacks;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod math;
pub mod menu;
pub mod primitives;
pub mod session;

pub use config::Config;
pub use error::{EditError, EditResult};
pub use primitives::{Primitive, PrimitiveKind};
pub use session::EditSession;
