//! # Drop Reconciliation
//!
//! Computes the next document tree from the current document plus one drop
//! intent. The engine keeps no state between drops: every call reads the
//! committed document, builds the full next document on a working clone,
//! and returns it for a single atomic swap. Errors and no-ops leave the
//! caller's document untouched.
//!
//! The decision table is evaluated in priority order; exactly one branch
//! fires per drop:
//!
//! 1. No-op guards (self-drop, drop into own subtree, stale session)
//! 2. Containment guard (no column layout inside a column layout)
//! 3. Same-list reorder with removal-shift index adjustment
//! 4. Cross-container / cross-column move (palette drops allocate the id
//!    here, which is what makes them copies rather than moves)
//! 5. Replace into an empty column slot
//! 6. Column-to-column transfer: wholesale exchange or expand-splice
//! 7. Horizontal split of two leaf siblings into a fresh 2-column layout
//! 8. Column expand, growing the column count by one
//! 9. Over-capacity guard (never more than 4 columns)

use tracing::debug;

use mailblocks_document::{
    Block, BlockKind, ChildView, Column, Document, DocumentError, IdGenerator,
};

use crate::drag::{DragSession, DragSource, DropTarget, DropZone};
use crate::errors::EditorError;

/// Resolve one drop intent against `doc`.
///
/// Returns `Ok(Some(next))` with the complete next document, `Ok(None)`
/// when the drop nets to no change, or an error when the drop is rejected
/// outright. The input document is never modified.
pub fn reconcile(
    doc: &Document,
    drag: &DragSession,
    target: &DropTarget,
    zone: DropZone,
    ids: &mut IdGenerator,
) -> Result<Option<Document>, EditorError> {
    let target_block = doc
        .get(&target.container_id)
        .ok_or_else(|| DocumentError::UnknownContainer(target.container_id.clone()))?;
    if !target_block.kind.is_container() {
        return Err(DocumentError::UnknownContainer(target.container_id.clone()).into());
    }

    let dragged_kind = drag.snapshot.kind;

    if let Some(dragged_id) = drag.existing_id() {
        if !doc.contains(dragged_id) {
            return Err(DocumentError::UnknownBlock(dragged_id.to_string()).into());
        }
        // Dropping a container anywhere inside its own subtree would make
        // it its own ancestor; dropping onto its own container entry is
        // the degenerate case of the same thing.
        if doc.is_ancestor(dragged_id, &target.container_id) {
            debug!("reconcile: drop of {dragged_id} into own subtree, ignored");
            return Ok(None);
        }
        // Zones that pair with the occupant are meaningless against the
        // dragged block itself.
        if matches!(zone, DropZone::Replace | DropZone::Left | DropZone::Right)
            && occupant_at(doc, target).as_deref() == Some(dragged_id)
        {
            return Ok(None);
        }
    }

    if dragged_kind == BlockKind::ColumnsContainer
        && target_block.kind == BlockKind::ColumnsContainer
    {
        debug!("reconcile: nested column layout rejected");
        return Err(EditorError::NestedColumnsRejected);
    }

    // From here on we work on a clone; nothing below mutates `doc`.
    let mut next = doc.clone();
    let dragged_id = match &drag.source {
        DragSource::Existing { block_id } => block_id.clone(),
        DragSource::Palette { block } => {
            let id = ids.next_id();
            next.insert_block(id.clone(), block.clone());
            id
        }
    };

    match zone {
        DropZone::Before | DropZone::After => {
            apply_adjacent_insert(next, &dragged_id, target, zone)
        }
        DropZone::Replace => apply_replace(next, &dragged_id, target),
        DropZone::Left | DropZone::Right => {
            apply_split(next, &dragged_id, dragged_kind, target, zone, ids)
        }
    }
}

/// Block currently occupying the targeted slot, if any.
fn occupant_at(doc: &Document, target: &DropTarget) -> Option<String> {
    match doc.get_children(&target.container_id).ok()? {
        ChildView::Linear(ids) => ids.get(target.index).cloned(),
        ChildView::Columns(columns) => columns
            .get(target.column_index?)?
            .get(target.index)
            .cloned(),
    }
}

fn linear_view(doc: &Document, container_id: &str) -> Result<Vec<String>, EditorError> {
    match doc.get_children(container_id)? {
        ChildView::Linear(ids) => Ok(ids),
        ChildView::Columns(_) => Err(DocumentError::InvalidStructure(format!(
            "{container_id} holds columns, expected a linear list"
        ))
        .into()),
    }
}

fn columns_view(doc: &Document, container_id: &str) -> Result<Vec<Vec<String>>, EditorError> {
    match doc.get_children(container_id)? {
        ChildView::Columns(columns) => Ok(columns),
        ChildView::Linear(_) => Err(DocumentError::InvalidStructure(format!(
            "{container_id} is not a column layout"
        ))
        .into()),
    }
}

/// Cases 3 and 4: ordered insertion before/after the target position,
/// covering same-list reorder, cross-container moves and cross-column
/// expand-splices.
fn apply_adjacent_insert(
    mut next: Document,
    dragged_id: &str,
    target: &DropTarget,
    zone: DropZone,
) -> Result<Option<Document>, EditorError> {
    let insert_at = match zone {
        DropZone::Before | DropZone::Left => target.index,
        _ => target.index + 1,
    };

    match next.find_parent(dragged_id) {
        Some(parent)
            if parent.container_id == target.container_id
                && parent.column_index == target.column_index =>
        {
            // Same ordered list: removal shifts everything behind the
            // source position one slot down.
            let mut at = insert_at;
            if parent.index < at {
                at -= 1;
            }
            if at == parent.index {
                return Ok(None);
            }
            debug!(
                "reconcile: reorder {dragged_id} {} -> {at} in {}",
                parent.index, target.container_id
            );
            next.remove_from_parent(dragged_id);
            next.insert_into(&target.container_id, target.column_index, at, dragged_id)?;
        }
        _ => {
            debug!(
                "reconcile: move {dragged_id} into {} at {insert_at}",
                target.container_id
            );
            next.remove_from_parent(dragged_id);
            next.insert_into(&target.container_id, target.column_index, insert_at, dragged_id)?;
        }
    }
    Ok(Some(next))
}

/// Cases 5 and 6 (exchange half): drop into a column slot.
///
/// An empty slot takes the dragged block as its sole occupant. A
/// non-empty slot triggers a wholesale exchange when the dragged block
/// already sits in a sibling column of the same layout; any other drop on
/// a filled slot is a no-op (the UI shows a not-allowed affordance).
fn apply_replace(
    mut next: Document,
    dragged_id: &str,
    target: &DropTarget,
) -> Result<Option<Document>, EditorError> {
    let ChildView::Columns(columns) = next.get_children(&target.container_id)? else {
        return Ok(None);
    };
    let Some(column_index) = target.column_index else {
        return Ok(None);
    };
    let Some(slot) = columns.get(column_index) else {
        return Ok(None);
    };

    if slot.is_empty() {
        debug!(
            "reconcile: replace {dragged_id} into empty column {column_index} of {}",
            target.container_id
        );
        next.remove_from_parent(dragged_id);
        let mut columns = columns_view(&next, &target.container_id)?;
        columns[column_index] = vec![dragged_id.to_string()];
        next.set_children(&target.container_id, ChildView::Columns(columns))?;
        return Ok(Some(next));
    }

    if let Some(parent) = next.find_parent(dragged_id) {
        if parent.container_id == target.container_id {
            if let Some(source_column) = parent.column_index {
                if source_column != column_index {
                    debug!(
                        "reconcile: exchange columns {source_column} and {column_index} of {}",
                        target.container_id
                    );
                    let mut columns = columns_view(&next, &target.container_id)?;
                    columns.swap(source_column, column_index);
                    next.set_children(&target.container_id, ChildView::Columns(columns))?;
                    return Ok(Some(next));
                }
            }
        }
    }

    Ok(None)
}

/// Cases 7, 8 and 9: the left/right zones.
///
/// Targeting a column of an existing layout grows the column count by one
/// (capped at 4). Targeting a block in a linear parent pairs the two
/// blocks into a fresh 2-column layout that takes over the target's slot.
/// Participants that are not leaf blocks degrade to a plain adjacent
/// insert.
fn apply_split(
    mut next: Document,
    dragged_id: &str,
    dragged_kind: BlockKind,
    target: &DropTarget,
    zone: DropZone,
    ids: &mut IdGenerator,
) -> Result<Option<Document>, EditorError> {
    let target_kind = next
        .get(&target.container_id)
        .map(|b| b.kind)
        .ok_or_else(|| DocumentError::UnknownContainer(target.container_id.clone()))?;

    if target_kind == BlockKind::ColumnsContainer {
        let columns = columns_view(&next, &target.container_id)?;
        let column_index = target.column_index.ok_or_else(|| {
            DocumentError::InvalidStructure(format!(
                "left/right drop on {} requires a column index",
                target.container_id
            ))
        })?;
        if columns.len() >= 4 {
            debug!("reconcile: column expand past 4 rejected");
            return Err(DocumentError::InvalidColumnCount(columns.len() + 1).into());
        }

        next.remove_from_parent(dragged_id);
        let mut columns = columns_view(&next, &target.container_id)?;
        let at = match zone {
            DropZone::Left => column_index,
            _ => column_index + 1,
        }
        .min(columns.len());
        debug!(
            "reconcile: expand {} with new column at {at} for {dragged_id}",
            target.container_id
        );
        columns.insert(at, vec![dragged_id.to_string()]);
        next.set_children(&target.container_id, ChildView::Columns(columns))?;
        return Ok(Some(next));
    }

    let list = linear_view(&next, &target.container_id)?;
    let Some(partner_id) = list.get(target.index).cloned() else {
        // Pointer past the end of the list: append semantics.
        return apply_adjacent_insert(next, dragged_id, target, zone);
    };
    if partner_id == dragged_id {
        return Ok(None);
    }
    let partner_kind = next
        .get(&partner_id)
        .map(|b| b.kind)
        .ok_or_else(|| DocumentError::UnknownBlock(partner_id.clone()))?;
    if !dragged_kind.is_leaf() || !partner_kind.is_leaf() {
        return apply_adjacent_insert(next, dragged_id, target, zone);
    }

    next.remove_from_parent(dragged_id);
    let mut list = linear_view(&next, &target.container_id)?;
    let Some(slot) = list.iter().position(|id| *id == partner_id) else {
        return Err(DocumentError::UnknownBlock(partner_id).into());
    };

    let (left, right) = match zone {
        DropZone::Left => (dragged_id.to_string(), partner_id.clone()),
        _ => (partner_id.clone(), dragged_id.to_string()),
    };
    let columns_id = ids.next_id();
    debug!(
        "reconcile: split {partner_id} and {dragged_id} into new column layout {columns_id}"
    );
    let mut columns_block = Block::columns(2);
    columns_block.data.props.columns = Some(vec![
        Column::with_children(vec![left]),
        Column::with_children(vec![right]),
    ]);
    next.insert_block(columns_id.clone(), columns_block);
    list[slot] = columns_id;
    next.set_children(&target.container_id, ChildView::Linear(list))?;
    Ok(Some(next))
}
