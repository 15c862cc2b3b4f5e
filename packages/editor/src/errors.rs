//! Error types for the editor

use thiserror::Error;

use mailblocks_document::DocumentError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Nested column layouts are not allowed")]
    NestedColumnsRejected,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Validation failed: {0}")]
    ExternalValidationFailed(String),
}
