//! Error types shared by the Banker engine, resource primitive, and wait-for detector.
//!
//! These are the *programming error* category of the error design: conditions that
//! indicate a caller violated a precondition, not conditions a worker can recover from
//! with a retry or backoff. They are surfaced immediately rather than swallowed.

use thiserror::Error;

/// Convenience alias for results using [`DlabError`].
pub type DlabResult<T> = std::result::Result<T, DlabError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DlabError {
    /// `ResourceCell::release` was called by a party that did not hold the cell.
    #[error("release() called on a resource cell that is not held")]
    ReleaseNotHeld,

    /// A process or resource index passed to the Banker engine was out of range.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A request vector's length did not match the number of resource classes.
    #[error("request length {actual} does not match resource class count {expected}")]
    RequestShapeMismatch { expected: usize, actual: usize },

    /// A declared max-claim asked for more units of some resource class than the
    /// engine's total capacity could ever grant — e.g. a zero-capacity class with a
    /// nonzero claim against it.
    #[error("process {pid}'s claim of {claimed} unit(s) of resource {resource} exceeds total capacity {capacity}")]
    ClaimExceedsCapacity { pid: usize, resource: usize, claimed: u32, capacity: u32 },
}
