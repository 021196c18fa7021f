//! Errors returned by metric passes.

use crate::access::{AttributeId, AttributeKind, ElementType};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host cancelled the pass. Nothing further has been written.
    #[error("metric computation was cancelled")]
    Cancelled,

    #[error("attribute `{name}` on {element} elements holds {found} values, expected {expected}")]
    AttributeKindMismatch {
        element: ElementType,
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },

    #[error("unknown attribute id {0}")]
    UnknownAttribute(AttributeId),
}

pub type Result<T> = std::result::Result<T, Error>;
