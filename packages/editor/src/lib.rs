//! # Mailblocks Editor
//!
//! Document editing engine for the email-template builder: drag/drop
//! reconciliation, bounded undo/redo, and the selection/mutation API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: id→block mapping + adapters       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session + reconciliation + history  │
//! │  - Resolve drop intents into next documents │
//! │  - Record snapshots, undo/redo (bounded)    │
//! │  - Selection, data patches, sibling moves   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ collaborators: renderers, styling panels,   │
//! │ exporters (consume documents, never edited  │
//! │ here)                                       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The document mapping is the source of truth**: rendered markup
//!    and exports are derived views
//! 2. **Copy-on-write mutations**: every edit builds the complete next
//!    document and swaps it in atomically; no caller ever sees a
//!    half-applied reconciliation
//! 3. **One drop, one branch**: the reconciliation decision table is
//!    evaluated in priority order and exactly one case fires
//! 4. **Scoped drag state**: the drag gesture lives in an explicit
//!    session value, not in ambient globals
//!
//! ## Usage
//!
//! ```rust
//! use mailblocks_document::{Block, BlockKind, Document};
//! use mailblocks_editor::{DragSource, DropTarget, DropZone, EditorSession};
//!
//! let mut session = EditorSession::new(Document::new());
//!
//! // Drag a heading in from the palette and drop it on the canvas.
//! session.begin_drag(DragSource::Palette {
//!     block: Block::new(BlockKind::Heading),
//! })?;
//! session.drop_on_canvas()?;
//!
//! // Change of heart.
//! session.undo()?;
//! # Ok::<(), mailblocks_editor::EditorError>(())
//! ```

mod drag;
mod errors;
mod history;
mod reconciler;
mod session;

pub use drag::{DragSession, DragSource, DropTarget, DropZone};
pub use errors::EditorError;
pub use history::{HistoryManager, DEFAULT_HISTORY_DEPTH};
pub use reconciler::reconcile;
pub use session::{AcceptAll, DataPatch, EditorSession, MoveDirection, SchemaValidator};

// Re-export the document model for convenience
pub use mailblocks_document::{
    Block, BlockData, BlockKind, BlockProps, ChildView, Column, Document, DocumentError,
    IdGenerator, ParentRef, ROOT_ID,
};
