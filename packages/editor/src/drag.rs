//! # Drag Session
//!
//! Ephemeral state for one pointer drag gesture. The underlying event
//! model only reliably identifies the dragged block at drag-start and at
//! drop, so the session carries that identity across pointer-move events.
//! It is owned by the [`EditorSession`](crate::EditorSession) and passed
//! explicitly into the drop path — never ambient global state. Cancelling
//! a drag discards the session without touching the document.

use serde::{Deserialize, Serialize};

use mailblocks_document::Block;

/// Pointer-relative sub-region of a drop target, disambiguating intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropZone {
    /// Insert before the target position.
    Before,
    /// Insert after the target position.
    After,
    /// Substitute into an empty column slot (or swap sibling columns).
    Replace,
    /// Pair with the target block as the left column of a split.
    Left,
    /// Pair with the target block as the right column of a split.
    Right,
}

/// Position a drop resolves against: a container's ordered view, a column
/// within it when the container is a `ColumnsContainer`, and an index into
/// that list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTarget {
    #[serde(rename = "containerId")]
    pub container_id: String,

    #[serde(rename = "columnIndex", default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,

    pub index: usize,
}

impl DropTarget {
    pub fn linear(container_id: impl Into<String>, index: usize) -> Self {
        Self {
            container_id: container_id.into(),
            column_index: None,
            index,
        }
    }

    pub fn column(container_id: impl Into<String>, column_index: usize, index: usize) -> Self {
        Self {
            container_id: container_id.into(),
            column_index: Some(column_index),
            index,
        }
    }
}

/// What is being dragged.
///
/// An existing block keeps its id across the drop (a move); a
/// palette-originated block receives a fresh id at insertion time (a
/// copy). This distinction is the whole move-vs-copy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragSource {
    /// A block already in the document.
    Existing { block_id: String },
    /// A prototype block dragged in from the palette.
    Palette { block: Block },
}

/// Live drag gesture: what is dragged plus a snapshot taken at drag-start.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub source: DragSource,
    /// Snapshot of the dragged block at drag-start, used for guards that
    /// must not re-resolve the id mid-gesture.
    pub snapshot: Block,
}

impl DragSession {
    pub fn new(source: DragSource, snapshot: Block) -> Self {
        Self { source, snapshot }
    }

    /// Id of the dragged block, if it already lives in the document.
    pub fn existing_id(&self) -> Option<&str> {
        match &self.source {
            DragSource::Existing { block_id } => Some(block_id),
            DragSource::Palette { .. } => None,
        }
    }
}
