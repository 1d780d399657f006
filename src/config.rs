//! Session-wide tolerances and unit conversion, grouped the way
//! [`crate::constants`] groups related constants: a small set of named
//! structs rather than magic numbers inlined at each call site.

/// Tolerance values used by every planarity/degeneracy predicate in the
/// geometry editors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tol {
    /// Maximum distance for two points to be considered coincident, or
    /// a point to be considered "on" a plane.
    pub dist: f64,
    /// Maximum deviation from perpendicular/parallel (as `sin(angle)`)
    /// for two directions to be considered perpendicular or parallel.
    pub perp: f64,
    /// Relative tolerance used when `dist` would be meaningless at the
    /// model's scale (distances scaled by the larger operand).
    pub rel: f64,
}

impl Default for Tol {
    fn default() -> Self {
        Tol {
            dist: 0.0005,
            perp: 1.0e-6,
            rel: 1.0e-6,
        }
    }
}

impl Tol {
    pub fn dist_sq(&self) -> f64 {
        self.dist * self.dist
    }
}

/// Unit conversion between the session's local display units and the
/// base unit (millimeters) the internal geometry is stored in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    /// Multiply a value in local units by this to get base units.
    pub local2base: f64,
}

impl Default for Units {
    fn default() -> Self {
        Units { local2base: 1.0 }
    }
}

impl Units {
    pub fn new(local2base: f64) -> Self {
        Units { local2base }
    }

    pub fn to_base(&self, v: f64) -> f64 {
        v * self.local2base
    }

    pub fn to_local(&self, v: f64) -> f64 {
        v / self.local2base
    }
}

/// Bundled configuration threaded through every sub-operation that
/// needs a tolerance check or a unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub tol: Tol,
    pub units: Units,
}
