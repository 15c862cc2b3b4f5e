//! End-to-end drop scenarios against the editing session.

use mailblocks_editor::{
    Block, BlockKind, ChildView, Document, DragSource, DropTarget, DropZone, EditorSession,
    ROOT_ID,
};

fn document_with_root_children(children: &[&str]) -> Document {
    let mut doc = Document::new();
    for id in children {
        doc.insert_block(*id, Block::new(BlockKind::Text));
    }
    doc.set_children(
        ROOT_ID,
        ChildView::Linear(children.iter().map(|s| s.to_string()).collect()),
    )
    .unwrap();
    doc
}

fn root_children(session: &EditorSession) -> Vec<String> {
    match session.document().get_children(ROOT_ID).unwrap() {
        ChildView::Linear(ids) => ids,
        ChildView::Columns(_) => panic!("root is linear"),
    }
}

fn drag(session: &mut EditorSession, id: &str) {
    session
        .begin_drag(DragSource::Existing {
            block_id: id.to_string(),
        })
        .unwrap();
}

#[test]
fn same_container_reorder() {
    // Root [A, B, C]; dragging A after C yields [B, C, A].
    let mut session = EditorSession::new(document_with_root_children(&["a", "b", "c"]));

    drag(&mut session, "a");
    let changed = session
        .drop_at(&DropTarget::linear(ROOT_ID, 2), DropZone::After)
        .unwrap();

    assert!(changed);
    assert_eq!(root_children(&session), vec!["b", "c", "a"]);
    assert!(session.document().validate().is_ok());
}

#[test]
fn cross_container_move() {
    // Container X holds [A], container Y holds [B]; dragging A into Y at
    // index 0 yields X=[], Y=[A, B].
    let mut doc = Document::new();
    doc.insert_block("x", Block::container());
    doc.insert_block("y", Block::container());
    doc.insert_block("a", Block::new(BlockKind::Text));
    doc.insert_block("b", Block::new(BlockKind::Text));
    doc.set_children(
        ROOT_ID,
        ChildView::Linear(vec!["x".to_string(), "y".to_string()]),
    )
    .unwrap();
    doc.insert_into("x", None, 0, "a").unwrap();
    doc.insert_into("y", None, 0, "b").unwrap();

    let mut session = EditorSession::new(doc);
    drag(&mut session, "a");
    session
        .drop_at(&DropTarget::linear("y", 0), DropZone::Before)
        .unwrap();

    assert_eq!(
        session.document().get_children("x").unwrap(),
        ChildView::Linear(vec![])
    );
    assert_eq!(
        session.document().get_children("y").unwrap(),
        ChildView::Linear(vec!["a".to_string(), "b".to_string()])
    );
    assert!(session.document().validate().is_ok());
}

#[test]
fn horizontal_split_creates_columns() {
    // Root [A, B]; dragging A onto the right zone of B replaces B's slot
    // with a fresh 2-column layout holding [B | A].
    let mut session = EditorSession::new(document_with_root_children(&["a", "b"]));

    drag(&mut session, "a");
    session
        .drop_at(&DropTarget::linear(ROOT_ID, 1), DropZone::Right)
        .unwrap();

    let children = root_children(&session);
    assert_eq!(children.len(), 1);
    let columns_id = &children[0];
    let columns_block = session.document().get(columns_id).unwrap();
    assert_eq!(columns_block.kind, BlockKind::ColumnsContainer);
    assert_eq!(columns_block.data.props.columns_count, Some(2));
    assert_eq!(
        session.document().get_children(columns_id).unwrap(),
        ChildView::Columns(vec![vec!["b".to_string()], vec!["a".to_string()]])
    );
    assert!(session.document().validate().is_ok());
}

#[test]
fn nested_columns_rejected() {
    // A ColumnsContainer dropped into another one's empty column leaves
    // the document unchanged and surfaces the rejection.
    let mut doc = Document::new();
    doc.insert_block("outer", Block::columns(2));
    doc.insert_block("floating", Block::columns(2));
    doc.set_children(
        ROOT_ID,
        ChildView::Linear(vec!["outer".to_string(), "floating".to_string()]),
    )
    .unwrap();
    let before = doc.clone();

    let mut session = EditorSession::new(doc);
    drag(&mut session, "floating");
    let err = session
        .drop_at(&DropTarget::column("outer", 0, 0), DropZone::Replace)
        .unwrap_err();

    assert_eq!(err, mailblocks_editor::EditorError::NestedColumnsRejected);
    assert_eq!(session.document(), &before);
}

#[test]
fn move_preserves_id_and_data() {
    let mut doc = document_with_root_children(&["a", "b"]);
    let block = doc.get_mut("a").unwrap();
    block.data.props.extra.insert(
        "text".to_string(),
        serde_json::Value::String("keep me".to_string()),
    );
    let original = doc.get("a").unwrap().clone();

    let mut session = EditorSession::new(doc);
    drag(&mut session, "a");
    session
        .drop_at(&DropTarget::linear(ROOT_ID, 1), DropZone::After)
        .unwrap();

    assert_eq!(session.document().get("a").unwrap(), &original);
    assert_eq!(root_children(&session), vec!["b", "a"]);
}

#[test]
fn four_column_expansion_rejected_without_mutation() {
    let mut doc = document_with_root_children(&["a"]);
    doc.insert_block("cols", Block::columns(4));
    doc.insert_into(ROOT_ID, None, 1, "cols").unwrap();
    let before = doc.clone();

    let mut session = EditorSession::new(doc);
    drag(&mut session, "a");
    let err = session
        .drop_at(&DropTarget::column("cols", 3, 0), DropZone::Right)
        .unwrap_err();

    assert!(matches!(
        err,
        mailblocks_editor::EditorError::Document(
            mailblocks_editor::DocumentError::InvalidColumnCount(5)
        )
    ));
    assert_eq!(session.document(), &before);
    assert!(!session.can_undo());
}

#[test]
fn drop_sequence_preserves_invariants() {
    // A long mixed sequence of drops; after every committed step the
    // document still satisfies every structural invariant.
    let mut session = EditorSession::new(document_with_root_children(&["a", "b", "c", "d"]));

    let steps: Vec<(DragSource, DropTarget, DropZone)> = vec![
        (
            DragSource::Existing {
                block_id: "a".to_string(),
            },
            DropTarget::linear(ROOT_ID, 3),
            DropZone::After,
        ),
        (
            DragSource::Existing {
                block_id: "b".to_string(),
            },
            DropTarget::linear(ROOT_ID, 0),
            DropZone::Left,
        ),
        (
            DragSource::Palette {
                block: Block::new(BlockKind::Image),
            },
            DropTarget::linear(ROOT_ID, 0),
            DropZone::Before,
        ),
        (
            DragSource::Existing {
                block_id: "d".to_string(),
            },
            DropTarget::linear(ROOT_ID, 1),
            DropZone::Before,
        ),
    ];

    for (source, target, zone) in steps {
        session.begin_drag(source).unwrap();
        let result = session.drop_at(&target, zone);
        assert!(result.is_ok(), "unexpected rejection: {result:?}");
        session.document().validate().unwrap();
    }

    // Undo everything that was recorded; every restored snapshot is
    // valid too.
    while session.can_undo() {
        session.undo().unwrap();
        session.document().validate().unwrap();
    }
}

#[test]
fn undo_depth_is_bounded_at_five() {
    let mut session = EditorSession::new(document_with_root_children(&[]));

    // Six distinct committed mutations.
    for _ in 0..6 {
        session
            .begin_drag(DragSource::Palette {
                block: Block::new(BlockKind::Spacer),
            })
            .unwrap();
        session.drop_on_canvas().unwrap();
    }
    assert_eq!(root_children(&session).len(), 6);

    let mut undos = 0;
    while session.can_undo() {
        session.undo().unwrap();
        undos += 1;
    }
    assert_eq!(undos, 5);
    // The initial empty state is out of reach.
    assert_eq!(root_children(&session).len(), 1);
}
