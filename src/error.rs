//! The crate-wide error taxonomy for edit sub-operations.
//!
//! Every public entry point in this crate returns `Result<T, EditError>`.
//! A non-[`EditError::InternalInvariant`] error means the session stayed
//! open and the primitive was left exactly as it was before the call.

use thiserror::Error;

/// Failure reported by an edit sub-operation.
///
/// Variants map directly onto the error taxonomy: wrong input shape
/// (`BadArity`), input shape is fine but the value is out of bounds
/// (`OutOfRange`), the operation would violate a primitive's type
/// invariant (`GeometryRejected`), a selection-dependent operation ran
/// with nothing selected (`MissingSelection`), an external resource
/// (file) didn't check out (`MissingResource`), or something that
/// should never happen did (`InternalInvariant`, the only variant that
/// ends the session rather than just rejecting the operation).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    #[error("{op}: expected {expected} parameter(s), got {got}")]
    BadArity {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("{op}: value {value} out of range ({reason})")]
    OutOfRange {
        op: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{op}: rejected, {reason}")]
    GeometryRejected { op: &'static str, reason: &'static str },

    #[error("{op}: no {selection} selected")]
    MissingSelection {
        op: &'static str,
        selection: &'static str,
    },

    #[error("{op}: resource unavailable, {reason}")]
    MissingResource { op: &'static str, reason: String },

    #[error("internal invariant violated in {op}: {reason}")]
    InternalInvariant { op: &'static str, reason: String },
}

impl EditError {
    /// True for the single variant that terminates editing rather than
    /// just rejecting the current sub-operation (§7).
    pub fn is_fatal(&self) -> bool {
        matches!(self, EditError::InternalInvariant { .. })
    }
}

pub type EditResult<T> = Result<T, EditError>;
