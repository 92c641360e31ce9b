//! Error types for the merge crate.

use tern_types::TypeError;
use thiserror::Error;

/// An internal failure raised while a merge is in progress.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeFault {
    /// An operand container could not be read because the caller holds it
    /// mutably borrowed.
    #[error("cannot read {kind} operand: it is mutably borrowed elsewhere")]
    Unreadable { kind: &'static str },

    /// Any other value-model failure.
    #[error(transparent)]
    Value(TypeError),
}

impl From<TypeError> for MergeFault {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::Unreadable(kind) => MergeFault::Unreadable { kind },
            other => MergeFault::Value(other),
        }
    }
}

/// Errors surfaced by the merge entry points.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The single merge failure. `defaults` and `value` are cycle-safe
    /// renderings of the top-level operands.
    #[error("merge failed (defaults: {defaults}, value: {value})")]
    Failed {
        defaults: String,
        value: String,
        #[source]
        source: MergeFault,
    },

    /// Merge options could not be parsed.
    #[error("invalid merge options: {0}")]
    Config(String),
}

impl MergeError {
    /// The fault that aborted the merge, if any.
    pub fn cause(&self) -> Option<&MergeFault> {
        match self {
            MergeError::Failed { source, .. } => Some(source),
            MergeError::Config(_) => None,
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
