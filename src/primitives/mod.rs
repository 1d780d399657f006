//! Primitive edit backends (§4.2-§4.9): one module per primitive
//! family, aggregated here into a single tagged union that an
//! [`crate::session::EditSession`] holds.

pub mod arb;
pub mod ars;
pub mod extrude;
pub mod metaball;
pub mod nmg;
pub mod sampled_grid;
pub mod scalar;
pub mod tgc;

/// Discriminant for the primitive currently bound to a session.
/// Paired with [`crate::engine::SubOp`] to form the `(PrimitiveKind,
/// SubOp)` tagged sum the design note in §9 calls for, in place of a
/// flat `edit_flag` integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Arb,
    Nmg,
    Ars,
    Tgc,
    Extrude,
    Metaball,
    SampledGrid,
    Ell,
    Tor,
    Part,
    Eto,
    Hyp,
    Superell,
}

/// The primitive's current internal form (§3.1). Each variant owns
/// its own geometric fields; there is no shared base representation,
/// matching the source's per-primitive internal structs.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Arb(arb::ArbSolid),
    Nmg(nmg::NmgModel),
    Ars(ars::Ars),
    Tgc(tgc::Tgc),
    Extrude(extrude::Extrude),
    Metaball(metaball::Metaball),
    SampledGrid(sampled_grid::SampledGrid),
    Ell(scalar::Ell),
    Tor(scalar::Tor),
    Part(scalar::Part),
    Eto(scalar::Eto),
    Hyp(scalar::Hyp),
    Superell(scalar::Superell),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Arb(_) => PrimitiveKind::Arb,
            Primitive::Nmg(_) => PrimitiveKind::Nmg,
            Primitive::Ars(_) => PrimitiveKind::Ars,
            Primitive::Tgc(_) => PrimitiveKind::Tgc,
            Primitive::Extrude(_) => PrimitiveKind::Extrude,
            Primitive::Metaball(_) => PrimitiveKind::Metaball,
            Primitive::SampledGrid(_) => PrimitiveKind::SampledGrid,
            Primitive::Ell(_) => PrimitiveKind::Ell,
            Primitive::Tor(_) => PrimitiveKind::Tor,
            Primitive::Part(_) => PrimitiveKind::Part,
            Primitive::Eto(_) => PrimitiveKind::Eto,
            Primitive::Hyp(_) => PrimitiveKind::Hyp,
            Primitive::Superell(_) => PrimitiveKind::Superell,
        }
    }
}
