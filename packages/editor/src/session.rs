//! # Editing Session
//!
//! One user's editing state over a document: current selection, the live
//! drag gesture (if any), undo/redo history, and the public mutation API.
//! Every committed mutation reads the latest recorded document and swaps
//! in a fully built replacement, so two sequential mutations can never
//! observe each other half-applied.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use mailblocks_document::{
    BlockData, BlockKind, ChildView, Document, DocumentError, IdGenerator, ROOT_ID,
};

use crate::drag::{DragSession, DragSource, DropTarget, DropZone};
use crate::errors::EditorError;
use crate::history::HistoryManager;
use crate::reconciler::reconcile;

/// Direction for sibling reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// External schema validation hook for block data.
///
/// The core validates only structural child linkage itself; everything
/// else in `style`/`props` is the collaborator's business. A rejection
/// keeps the block's last known good data.
pub trait SchemaValidator {
    fn validate(&self, kind: BlockKind, data: &BlockData) -> Result<(), String>;
}

/// Validator that accepts everything (the default).
pub struct AcceptAll;

impl SchemaValidator for AcceptAll {
    fn validate(&self, _kind: BlockKind, _data: &BlockData) -> Result<(), String> {
        Ok(())
    }
}

/// Partial update for a block's data.
///
/// Content props merge key-by-key, but `style` deliberately replaces the
/// whole value: styling panels emit a complete validated style object per
/// edit, and `style` is opaque here (it need not even be an object), so a
/// key-wise merge has nothing sound to merge into. Leave `style` as
/// `None` to keep the current value. Structural linkage keys are stripped
/// from `props` before the merge; child lists are only ever edited
/// through the document operations.
#[derive(Debug, Clone, Default)]
pub struct DataPatch {
    pub style: Option<Value>,
    pub props: Map<String, Value>,
}

const LINKAGE_KEYS: [&str; 4] = ["childrenIds", "columns", "columnsCount", "fixedWidths"];

/// Editing session: document + history + selection + drag state.
pub struct EditorSession {
    history: HistoryManager,
    selection: Option<String>,
    drag: Option<DragSession>,
    ids: IdGenerator,
    validator: Box<dyn SchemaValidator>,
    /// Increments on every committed mutation, including undo/redo.
    version: u64,
}

impl EditorSession {
    pub fn new(document: Document) -> Self {
        Self::with_validator(document, Box::new(AcceptAll))
    }

    pub fn with_validator(document: Document, validator: Box<dyn SchemaValidator>) -> Self {
        Self {
            history: HistoryManager::new(document),
            selection: None,
            drag: None,
            ids: IdGenerator::new(),
            validator,
            version: 0,
        }
    }

    /// The current committed document.
    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Select a block, or clear the selection with `None`.
    pub fn select(&mut self, block_id: Option<String>) -> Result<(), EditorError> {
        if let Some(id) = &block_id {
            if !self.document().contains(id) {
                return Err(DocumentError::UnknownBlock(id.clone()).into());
            }
        }
        self.selection = block_id;
        Ok(())
    }

    /// Merge a data patch into a block, gated by the schema validator.
    pub fn update_block_data(&mut self, block_id: &str, patch: DataPatch) -> Result<(), EditorError> {
        let mut next = self.document().clone();
        let block = next
            .get_mut(block_id)
            .ok_or_else(|| DocumentError::UnknownBlock(block_id.to_string()))?;

        if let Some(style) = patch.style {
            block.data.style = style;
        }
        for (key, value) in patch.props {
            if LINKAGE_KEYS.contains(&key.as_str()) {
                warn!("update_block_data: structural key {key} stripped from patch");
                continue;
            }
            block.data.props.extra.insert(key, value);
        }

        self.validator
            .validate(block.kind, &block.data)
            .map_err(EditorError::ExternalValidationFailed)?;

        self.commit(next);
        Ok(())
    }

    /// Delete a block and its whole subtree.
    pub fn delete_block(&mut self, block_id: &str) -> Result<(), EditorError> {
        let mut next = self.document().clone();
        next.delete_block(block_id)?;
        if self
            .selection
            .as_deref()
            .is_some_and(|selected| !next.contains(selected))
        {
            self.selection = None;
        }
        self.commit(next);
        Ok(())
    }

    /// Swap a block with its adjacent sibling in the owning ordered list.
    /// Returns `false` (and changes nothing) at either end of the list.
    pub fn move_sibling(&mut self, block_id: &str, direction: MoveDirection) -> Result<bool, EditorError> {
        if !self.document().contains(block_id) {
            return Err(DocumentError::UnknownBlock(block_id.to_string()).into());
        }
        let Some(parent) = self.document().find_parent(block_id) else {
            return Ok(false);
        };

        let mut next = self.document().clone();
        let mut view = next.get_children(&parent.container_id)?;
        let list = match (&mut view, parent.column_index) {
            (ChildView::Linear(ids), None) => ids,
            (ChildView::Columns(columns), Some(ci)) => &mut columns[ci],
            _ => return Ok(false),
        };

        let swapped = match direction {
            MoveDirection::Up if parent.index > 0 => {
                list.swap(parent.index - 1, parent.index);
                true
            }
            MoveDirection::Down if parent.index + 1 < list.len() => {
                list.swap(parent.index, parent.index + 1);
                true
            }
            _ => false,
        };
        if !swapped {
            return Ok(false);
        }

        next.set_children(&parent.container_id, view)?;
        Ok(self.commit(next))
    }

    /// Begin dragging an existing block or a palette prototype.
    pub fn begin_drag(&mut self, source: DragSource) -> Result<(), EditorError> {
        let snapshot = match &source {
            DragSource::Existing { block_id } => self
                .document()
                .get(block_id)
                .cloned()
                .ok_or_else(|| DocumentError::UnknownBlock(block_id.clone()))?,
            DragSource::Palette { block } => block.clone(),
        };
        debug!("drag started");
        self.drag = Some(DragSession::new(source, snapshot));
        Ok(())
    }

    /// Abort the drag gesture. Nothing was committed, so there is nothing
    /// to compensate for.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    pub fn dragging(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Drop the dragged block at a target position. Ends the gesture in
    /// every case; returns whether the document changed.
    pub fn drop_at(&mut self, target: &DropTarget, zone: DropZone) -> Result<bool, EditorError> {
        let Some(drag) = self.drag.take() else {
            // Drop with no recorded gesture: nothing to do.
            return Ok(false);
        };
        let next = reconcile(self.history.present(), &drag, target, zone, &mut self.ids)?;
        match next {
            Some(next) => Ok(self.commit(next)),
            None => Ok(false),
        }
    }

    /// Drop outside any recognized target: append to the end of the root
    /// container's children (or become the sole child of an empty root).
    pub fn drop_on_canvas(&mut self) -> Result<bool, EditorError> {
        let end = match self.document().get_children(ROOT_ID)? {
            ChildView::Linear(ids) => ids.len(),
            ChildView::Columns(_) => 0,
        };
        self.drop_at(&DropTarget::linear(ROOT_ID, end), DropZone::Before)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.history.undo()?;
        self.version += 1;
        self.drop_dead_selection();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.history.redo()?;
        self.version += 1;
        self.drop_dead_selection();
        Ok(())
    }

    /// Load a new template: replaces the document and clears history,
    /// selection and any drag in progress. Not an undoable step.
    pub fn load_template(&mut self, document: Document) {
        self.history.reset(document);
        self.selection = None;
        self.drag = None;
        self.version += 1;
    }

    /// Allocate a fresh block id (time-seeded, session-unique).
    pub fn next_block_id(&mut self) -> String {
        self.ids.next_id()
    }

    fn commit(&mut self, next: Document) -> bool {
        debug_assert!(next.validate().is_ok(), "mutation broke a document invariant");
        if self.history.record(next) {
            self.version += 1;
            debug!(version = self.version, "document committed");
            true
        } else {
            false
        }
    }

    fn drop_dead_selection(&mut self) {
        if self
            .selection
            .as_deref()
            .is_some_and(|selected| !self.history.present().contains(selected))
        {
            self.selection = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailblocks_document::Block;

    fn session_with_children(children: &[&str]) -> EditorSession {
        let mut doc = Document::new();
        for id in children {
            doc.insert_block(*id, Block::new(BlockKind::Text));
        }
        doc.set_children(
            ROOT_ID,
            ChildView::Linear(children.iter().map(|s| s.to_string()).collect()),
        )
        .unwrap();
        EditorSession::new(doc)
    }

    fn root_children(session: &EditorSession) -> Vec<String> {
        match session.document().get_children(ROOT_ID).unwrap() {
            ChildView::Linear(ids) => ids,
            ChildView::Columns(_) => panic!("root is linear"),
        }
    }

    #[test]
    fn test_select_unknown_block_fails() {
        let mut session = session_with_children(&["a"]);
        assert!(session.select(Some("a".to_string())).is_ok());
        assert_eq!(session.selected(), Some("a"));

        let err = session.select(Some("ghost".to_string())).unwrap_err();
        assert!(matches!(err, EditorError::Document(DocumentError::UnknownBlock(_))));
        assert_eq!(session.selected(), Some("a"));

        session.select(None).unwrap();
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_update_block_data_merges_and_bumps_version() {
        let mut session = session_with_children(&["a"]);
        let before = session.version();

        let mut patch = DataPatch::default();
        patch.style = Some(serde_json::json!({ "color": "#333" }));
        patch.props.insert("text".to_string(), Value::String("Hi".to_string()));
        session.update_block_data("a", patch).unwrap();

        let block = session.document().get("a").unwrap();
        assert_eq!(block.data.style, serde_json::json!({ "color": "#333" }));
        assert_eq!(block.data.props.extra["text"], Value::String("Hi".to_string()));
        assert_eq!(session.version(), before + 1);
    }

    #[test]
    fn test_update_block_data_replaces_style_wholesale() {
        let mut session = session_with_children(&["a"]);

        let mut patch = DataPatch::default();
        patch.style = Some(serde_json::json!({ "color": "#111", "padding": 8 }));
        session.update_block_data("a", patch).unwrap();

        // A later style write is a full replacement, not a key merge;
        // props merged earlier are untouched.
        let mut patch = DataPatch::default();
        patch.style = Some(serde_json::json!({ "color": "#222" }));
        patch.props.insert("text".to_string(), Value::String("hi".to_string()));
        session.update_block_data("a", patch).unwrap();

        let block = session.document().get("a").unwrap();
        assert_eq!(block.data.style, serde_json::json!({ "color": "#222" }));
        assert_eq!(block.data.props.extra["text"], Value::String("hi".to_string()));

        // No style in the patch keeps the current value.
        let mut patch = DataPatch::default();
        patch.props.insert("level".to_string(), Value::String("h2".to_string()));
        session.update_block_data("a", patch).unwrap();
        assert_eq!(
            session.document().get("a").unwrap().data.style,
            serde_json::json!({ "color": "#222" })
        );
    }

    #[test]
    fn test_update_block_data_strips_linkage_keys() {
        let mut session = session_with_children(&["a"]);

        let mut patch = DataPatch::default();
        patch
            .props
            .insert("childrenIds".to_string(), serde_json::json!(["root"]));
        patch.props.insert("text".to_string(), Value::String("ok".to_string()));
        session.update_block_data("a", patch).unwrap();

        let block = session.document().get("a").unwrap();
        assert!(block.data.props.children_ids.is_none());
        assert!(!block.data.props.extra.contains_key("childrenIds"));
        assert_eq!(block.data.props.extra["text"], Value::String("ok".to_string()));
    }

    struct RejectEverything;

    impl SchemaValidator for RejectEverything {
        fn validate(&self, _kind: BlockKind, _data: &BlockData) -> Result<(), String> {
            Err("computer says no".to_string())
        }
    }

    #[test]
    fn test_validator_rejection_keeps_last_good_data() {
        let mut doc = Document::new();
        doc.insert_block("a", Block::new(BlockKind::Text));
        doc.set_children(ROOT_ID, ChildView::Linear(vec!["a".to_string()]))
            .unwrap();
        let mut session = EditorSession::with_validator(doc, Box::new(RejectEverything));
        let before = session.document().clone();

        let mut patch = DataPatch::default();
        patch.props.insert("text".to_string(), Value::String("nope".to_string()));
        let err = session.update_block_data("a", patch).unwrap_err();

        assert_eq!(
            err,
            EditorError::ExternalValidationFailed("computer says no".to_string())
        );
        assert_eq!(session.document(), &before);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_delete_clears_dangling_selection() {
        let mut session = session_with_children(&["a", "b"]);
        session.select(Some("a".to_string())).unwrap();

        session.delete_block("a").unwrap();
        assert_eq!(session.selected(), None);
        assert_eq!(root_children(&session), vec!["b"]);

        // Undo restores the block; selection stays cleared.
        session.undo().unwrap();
        assert_eq!(root_children(&session), vec!["a", "b"]);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_delete_root_fails_closed() {
        let mut session = session_with_children(&["a"]);
        session.select(Some("a".to_string())).unwrap();
        let before = session.document().clone();

        let err = session.delete_block(ROOT_ID).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Document(DocumentError::InvalidStructure(_))
        ));
        assert_eq!(session.document(), &before);
        assert_eq!(session.selected(), Some("a"));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_move_sibling() {
        let mut session = session_with_children(&["a", "b", "c"]);

        assert!(session.move_sibling("b", MoveDirection::Up).unwrap());
        assert_eq!(root_children(&session), vec!["b", "a", "c"]);

        // Already at the top: no-op, no history entry.
        let levels = session.version();
        assert!(!session.move_sibling("b", MoveDirection::Up).unwrap());
        assert_eq!(session.version(), levels);

        assert!(session.move_sibling("b", MoveDirection::Down).unwrap());
        assert!(!session.move_sibling("c", MoveDirection::Down).unwrap());
    }

    #[test]
    fn test_drop_without_drag_is_noop() {
        let mut session = session_with_children(&["a"]);
        let changed = session
            .drop_at(&DropTarget::linear(ROOT_ID, 0), DropZone::Before)
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_cancel_drag_leaves_document_untouched() {
        let mut session = session_with_children(&["a", "b"]);
        let before = session.document().clone();

        session
            .begin_drag(DragSource::Existing {
                block_id: "a".to_string(),
            })
            .unwrap();
        assert!(session.dragging().is_some());

        session.cancel_drag();
        assert!(session.dragging().is_none());
        assert_eq!(session.document(), &before);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_drop_on_canvas_appends_to_root() {
        let mut session = session_with_children(&["a"]);
        session
            .begin_drag(DragSource::Palette {
                block: Block::new(BlockKind::Divider),
            })
            .unwrap();
        assert!(session.drop_on_canvas().unwrap());

        let children = root_children(&session);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], "a");
        assert_eq!(
            session.document().get(&children[1]).unwrap().kind,
            BlockKind::Divider
        );
    }

    #[test]
    fn test_drop_on_empty_canvas_becomes_sole_child() {
        let mut session = EditorSession::new(Document::new());
        session
            .begin_drag(DragSource::Palette {
                block: Block::new(BlockKind::Text),
            })
            .unwrap();
        assert!(session.drop_on_canvas().unwrap());
        assert_eq!(root_children(&session).len(), 1);
    }

    #[test]
    fn test_load_template_resets_history() {
        let mut session = session_with_children(&["a"]);
        session.delete_block("a").unwrap();
        assert!(session.can_undo());

        let mut template = Document::new();
        template.insert_block("t", Block::new(BlockKind::Heading));
        template
            .set_children(ROOT_ID, ChildView::Linear(vec!["t".to_string()]))
            .unwrap();
        session.load_template(template.clone());

        assert_eq!(session.document(), &template);
        assert!(!session.can_undo());
        assert!(!session.can_redo());
    }

    #[test]
    fn test_undo_redo_errors_when_empty() {
        let mut session = session_with_children(&[]);
        assert_eq!(session.undo().unwrap_err(), EditorError::NothingToUndo);
        assert_eq!(session.redo().unwrap_err(), EditorError::NothingToRedo);
    }
}
