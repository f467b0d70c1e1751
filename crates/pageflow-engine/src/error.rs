use thiserror::Error;

/// Errors raised by derivation, coordinate mapping, and transformation
/// application.
///
/// All three kinds are fatal to the operation that raised them and propagate
/// to the public API caller; the engine has no internal recovery path. A
/// failed transformation leaves the trees in their last-known-good state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An offset fell outside the valid span of a tree or subtree.
    ///
    /// Never silently clamped inside the mapping layer: a clamped mapping
    /// would corrupt cursor state. Navigation commands clamp their targets
    /// *before* mapping, which is why an edge-of-document key press is a
    /// no-op rather than this error.
    #[error("offset {offset} is out of range for {context} of size {size}")]
    OutOfRange {
        offset: usize,
        size: usize,
        context: &'static str,
    },

    /// A type tag had no entry in the element registry.
    ///
    /// Raised at derivation time; indicates a configuration bug, not a
    /// runtime data issue.
    #[error("no element definition registered for type tag `{tag}`")]
    UnregisteredType { tag: String },

    /// A structural edit contradicted a tree invariant, e.g. removing a
    /// child not present in its parent.
    #[error("structural violation: {detail}")]
    StructuralViolation { detail: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
