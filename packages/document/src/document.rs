//! # Document
//!
//! The flat id→block mapping plus the structural operations every editing
//! feature is built from. All child-list access goes through the container
//! adapters, so each operation is written once for all three container
//! shapes.
//!
//! Operations that mutate take `&mut self`; callers needing atomicity
//! clone the document, mutate the clone, and swap it in whole (the editor
//! crate's reconciler does exactly this).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::adapters::adapter_for;
use crate::block::{Block, BlockKind};
use crate::error::DocumentError;

/// Reserved id of the single `EmailLayout` root.
pub const ROOT_ID: &str = "root";

/// Uniform read/write view of a container's children.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildView {
    /// `EmailLayout` / `Container`: one ordered list.
    Linear(Vec<String>),
    /// `ColumnsContainer`: one ordered list per column, 1..=4 columns.
    Columns(Vec<Vec<String>>),
}

/// Location of a block within its parent's ordered view.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRef {
    pub container_id: String,
    /// `Some` when the owning list is a column of a `ColumnsContainer`.
    pub column_index: Option<usize>,
    pub index: usize,
}

/// Mapping from block id to block; the canonical document form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    blocks: HashMap<String, Block>,
}

impl Document {
    /// Empty document: a root layout with no children.
    pub fn new() -> Self {
        let mut blocks = HashMap::new();
        blocks.insert(ROOT_ID.to_string(), Block::layout());
        Self { blocks }
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Add (or overwrite) a block in the mapping. The block is not linked
    /// into any parent; use [`Document::insert_into`] for that.
    pub fn insert_block(&mut self, id: impl Into<String>, block: Block) {
        self.blocks.insert(id.into(), block);
    }

    /// Mutable access for data edits that do not touch child linkage.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    /// Uniform view of a container's children.
    pub fn get_children(&self, container_id: &str) -> Result<ChildView, DocumentError> {
        let block = self
            .blocks
            .get(container_id)
            .ok_or_else(|| DocumentError::UnknownContainer(container_id.to_string()))?;
        let adapter = adapter_for(block.kind)
            .ok_or_else(|| DocumentError::UnknownContainer(container_id.to_string()))?;
        Ok(adapter.read(block))
    }

    /// Write a same-shape view back into a container.
    pub fn set_children(&mut self, container_id: &str, view: ChildView) -> Result<(), DocumentError> {
        let block = self
            .blocks
            .get_mut(container_id)
            .ok_or_else(|| DocumentError::UnknownContainer(container_id.to_string()))?;
        let adapter = adapter_for(block.kind)
            .ok_or_else(|| DocumentError::UnknownContainer(container_id.to_string()))?;
        adapter.write(block, view)
    }

    /// Find which container (and column, if any) owns `block_id`.
    ///
    /// Linear scan over the mapping; documents are small.
    pub fn find_parent(&self, block_id: &str) -> Option<ParentRef> {
        for (container_id, block) in &self.blocks {
            let Some(adapter) = adapter_for(block.kind) else {
                continue;
            };
            match adapter.read(block) {
                ChildView::Linear(ids) => {
                    if let Some(index) = ids.iter().position(|id| id == block_id) {
                        return Some(ParentRef {
                            container_id: container_id.clone(),
                            column_index: None,
                            index,
                        });
                    }
                }
                ChildView::Columns(columns) => {
                    for (column_index, ids) in columns.iter().enumerate() {
                        if let Some(index) = ids.iter().position(|id| id == block_id) {
                            return Some(ParentRef {
                                container_id: container_id.clone(),
                                column_index: Some(column_index),
                                index,
                            });
                        }
                    }
                }
            }
        }
        None
    }

    /// Unlink a block from its parent's child list. Idempotent: a block
    /// with no parent leaves the document unchanged.
    pub fn remove_from_parent(&mut self, block_id: &str) {
        let Some(parent) = self.find_parent(block_id) else {
            return;
        };
        // The parent was just found, so the view operations cannot fail.
        if let Ok(mut view) = self.get_children(&parent.container_id) {
            match &mut view {
                ChildView::Linear(ids) => {
                    ids.retain(|id| id != block_id);
                }
                ChildView::Columns(columns) => {
                    if let Some(column_index) = parent.column_index {
                        columns[column_index].retain(|id| id != block_id);
                    }
                }
            }
            let _ = self.set_children(&parent.container_id, view);
        }
    }

    /// Link `block_id` into a container's ordered list at `index`,
    /// clamping `index` into `[0, len]`. For a `ColumnsContainer` the
    /// column must be addressed with `column_index`.
    pub fn insert_into(
        &mut self,
        container_id: &str,
        column_index: Option<usize>,
        index: usize,
        block_id: &str,
    ) -> Result<(), DocumentError> {
        let mut view = self.get_children(container_id)?;
        match (&mut view, column_index) {
            (ChildView::Linear(ids), None) => {
                let at = index.min(ids.len());
                ids.insert(at, block_id.to_string());
            }
            (ChildView::Columns(columns), Some(ci)) => {
                let ids = columns.get_mut(ci).ok_or_else(|| {
                    DocumentError::InvalidStructure(format!(
                        "column {ci} out of range for container {container_id}"
                    ))
                })?;
                let at = index.min(ids.len());
                ids.insert(at, block_id.to_string());
            }
            (ChildView::Linear(_), Some(_)) => {
                return Err(DocumentError::InvalidStructure(format!(
                    "container {container_id} has no columns"
                )))
            }
            (ChildView::Columns(_), None) => {
                return Err(DocumentError::InvalidStructure(format!(
                    "container {container_id} requires a column index"
                )))
            }
        }
        self.set_children(container_id, view)
    }

    /// Delete a block and every block transitively owned through it, and
    /// unlink it from its parent. Orphans are collected eagerly: nothing
    /// unreachable is left behind in the mapping. The root layout itself
    /// cannot be deleted; a document always keeps its single root.
    pub fn delete_block(&mut self, block_id: &str) -> Result<(), DocumentError> {
        if block_id == ROOT_ID {
            return Err(DocumentError::InvalidStructure(
                "the root layout cannot be deleted".to_string(),
            ));
        }
        if !self.blocks.contains_key(block_id) {
            return Err(DocumentError::UnknownBlock(block_id.to_string()));
        }

        self.remove_from_parent(block_id);

        let mut doomed = Vec::new();
        let mut queue = vec![block_id.to_string()];
        while let Some(id) = queue.pop() {
            if let Some(block) = self.blocks.get(&id) {
                if let Some(adapter) = adapter_for(block.kind) {
                    match adapter.read(block) {
                        ChildView::Linear(ids) => queue.extend(ids),
                        ChildView::Columns(columns) => {
                            queue.extend(columns.into_iter().flatten())
                        }
                    }
                }
            }
            doomed.push(id);
        }
        for id in doomed {
            self.blocks.remove(&id);
        }
        Ok(())
    }

    /// True if `ancestor_id` is `block_id` itself or appears on the parent
    /// chain above it.
    pub fn is_ancestor(&self, ancestor_id: &str, block_id: &str) -> bool {
        if ancestor_id == block_id {
            return true;
        }
        let mut current = block_id.to_string();
        // Bounded walk: a well-formed document has no cycles, but a
        // corrupted one must not hang us.
        for _ in 0..=self.blocks.len() {
            match self.find_parent(&current) {
                Some(parent) if parent.container_id == ancestor_id => return true,
                Some(parent) => current = parent.container_id,
                None => return false,
            }
        }
        false
    }

    /// Check every structural invariant; returns the first violation.
    ///
    /// Checked: single `EmailLayout` root at [`ROOT_ID`]; no dangling
    /// child references; each block referenced by at most one parent slot;
    /// column count in `[1, 4]` matching `columnsCount`; no
    /// `ColumnsContainer` directly inside a column; every non-root block
    /// reachable from the root (which also rules out cycles).
    pub fn validate(&self) -> Result<(), DocumentError> {
        let root = self
            .blocks
            .get(ROOT_ID)
            .ok_or_else(|| DocumentError::UnknownBlock(ROOT_ID.to_string()))?;
        if root.kind != BlockKind::EmailLayout {
            return Err(DocumentError::InvalidStructure(
                "root block is not an EmailLayout".to_string(),
            ));
        }

        let mut referenced: HashSet<String> = HashSet::new();
        for (id, block) in &self.blocks {
            if block.kind == BlockKind::EmailLayout && id != ROOT_ID {
                return Err(DocumentError::InvalidStructure(format!(
                    "extra EmailLayout block: {id}"
                )));
            }

            let Some(adapter) = adapter_for(block.kind) else {
                continue;
            };
            let lists = match adapter.read(block) {
                ChildView::Linear(ids) => vec![ids],
                ChildView::Columns(columns) => {
                    let count = columns.len();
                    if count == 0 || count > 4 {
                        return Err(DocumentError::InvalidColumnCount(count));
                    }
                    if block.data.props.columns_count != Some(count) {
                        return Err(DocumentError::InvalidStructure(format!(
                            "columnsCount out of sync on {id}"
                        )));
                    }
                    columns
                }
            };

            for child_id in lists.iter().flatten() {
                let child = self.blocks.get(child_id).ok_or_else(|| {
                    DocumentError::InvalidStructure(format!(
                        "dangling child reference {child_id} in {id}"
                    ))
                })?;
                if child_id == id {
                    return Err(DocumentError::InvalidStructure(format!(
                        "block {id} lists itself as a child"
                    )));
                }
                if block.kind == BlockKind::ColumnsContainer
                    && child.kind == BlockKind::ColumnsContainer
                {
                    return Err(DocumentError::InvalidStructure(format!(
                        "nested ColumnsContainer {child_id} inside {id}"
                    )));
                }
                if !referenced.insert(child_id.clone()) {
                    return Err(DocumentError::InvalidStructure(format!(
                        "block {child_id} has more than one parent"
                    )));
                }
            }
        }

        // Reachability sweep from the root; a block with a parent chain
        // that never reaches the root is either orphaned or cyclic.
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut queue = vec![ROOT_ID];
        while let Some(id) = queue.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(block) = self.blocks.get(id) {
                if let Some(adapter) = adapter_for(block.kind) {
                    let lists = match adapter.read(block) {
                        ChildView::Linear(ids) => vec![ids],
                        ChildView::Columns(columns) => columns,
                    };
                    for child_id in lists.iter().flatten() {
                        if let Some((key, _)) = self.blocks.get_key_value(child_id.as_str()) {
                            queue.push(key.as_str());
                        }
                    }
                }
            }
        }
        for id in self.blocks.keys() {
            if !reachable.contains(id.as_str()) {
                return Err(DocumentError::InvalidStructure(format!(
                    "unreachable block: {id}"
                )));
            }
        }

        Ok(())
    }
}
