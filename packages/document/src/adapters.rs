//! # Container Adapters
//!
//! One uniform ordered-children view over the three physical container
//! shapes. Editing code reads and writes [`ChildView`]s and never touches
//! the per-kind linkage fields directly, so remove/insert logic exists
//! exactly once instead of once per container type.

use crate::block::{Block, BlockKind};
use crate::document::ChildView;
use crate::error::DocumentError;

/// Uniform accessor for a container block's ordered children.
pub trait ContainerAdapter: Sync {
    /// Snapshot of the block's children as a uniform view.
    fn read(&self, block: &Block) -> ChildView;

    /// Write a same-shape view back into the block.
    fn write(&self, block: &mut Block, view: ChildView) -> Result<(), DocumentError>;
}

/// `EmailLayout`: children at `data.childrenIds`.
pub struct LayoutAdapter;

impl ContainerAdapter for LayoutAdapter {
    fn read(&self, block: &Block) -> ChildView {
        ChildView::Linear(block.data.children_ids.clone().unwrap_or_default())
    }

    fn write(&self, block: &mut Block, view: ChildView) -> Result<(), DocumentError> {
        match view {
            ChildView::Linear(ids) => {
                block.data.children_ids = Some(ids);
                Ok(())
            }
            ChildView::Columns(_) => Err(DocumentError::InvalidStructure(
                "EmailLayout holds a linear child list, not columns".to_string(),
            )),
        }
    }
}

/// `Container`: children at `data.props.childrenIds`.
pub struct StackAdapter;

impl ContainerAdapter for StackAdapter {
    fn read(&self, block: &Block) -> ChildView {
        ChildView::Linear(block.data.props.children_ids.clone().unwrap_or_default())
    }

    fn write(&self, block: &mut Block, view: ChildView) -> Result<(), DocumentError> {
        match view {
            ChildView::Linear(ids) => {
                block.data.props.children_ids = Some(ids);
                Ok(())
            }
            ChildView::Columns(_) => Err(DocumentError::InvalidStructure(
                "Container holds a linear child list, not columns".to_string(),
            )),
        }
    }
}

/// `ColumnsContainer`: children at `data.props.columns[i].childrenIds`.
///
/// Writes re-derive `columnsCount` and reject lengths outside `1..=4`.
/// A write that changes the column count resets `fixedWidths` to
/// equal-share, since stale ratios no longer sum sensibly.
pub struct ColumnsAdapter;

impl ContainerAdapter for ColumnsAdapter {
    fn read(&self, block: &Block) -> ChildView {
        let columns = block
            .data
            .props
            .columns
            .as_ref()
            .map(|cols| cols.iter().map(|c| c.children_ids.clone()).collect())
            .unwrap_or_default();
        ChildView::Columns(columns)
    }

    fn write(&self, block: &mut Block, view: ChildView) -> Result<(), DocumentError> {
        let lists = match view {
            ChildView::Columns(lists) => lists,
            ChildView::Linear(_) => {
                return Err(DocumentError::InvalidStructure(
                    "ColumnsContainer holds columns, not a linear child list".to_string(),
                ))
            }
        };

        if lists.is_empty() || lists.len() > 4 {
            return Err(DocumentError::InvalidColumnCount(lists.len()));
        }

        let old = block.data.props.columns.take().unwrap_or_default();
        let count_changed = old.len() != lists.len();

        // Preserve opaque per-column fields positionally.
        let mut columns = Vec::with_capacity(lists.len());
        for (i, children_ids) in lists.into_iter().enumerate() {
            let mut column = old.get(i).cloned().unwrap_or_default();
            column.children_ids = children_ids;
            columns.push(column);
        }

        block.data.props.columns_count = Some(columns.len());
        block.data.props.columns = Some(columns);
        if count_changed {
            block.data.props.fixed_widths = None;
        }
        Ok(())
    }
}

static LAYOUT: LayoutAdapter = LayoutAdapter;
static STACK: StackAdapter = StackAdapter;
static COLUMNS: ColumnsAdapter = ColumnsAdapter;

/// Adapter for a block kind, or `None` for leaf kinds.
pub fn adapter_for(kind: BlockKind) -> Option<&'static dyn ContainerAdapter> {
    match kind {
        BlockKind::EmailLayout => Some(&LAYOUT),
        BlockKind::Container => Some(&STACK),
        BlockKind::ColumnsContainer => Some(&COLUMNS),
        _ => None,
    }
}
