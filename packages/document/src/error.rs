//! Error types for document operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Unknown container: {0}")]
    UnknownContainer(String),

    #[error("Invalid column count: {0}")]
    InvalidColumnCount(usize),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}
