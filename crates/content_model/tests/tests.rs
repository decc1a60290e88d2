// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use content_model::api::{
    edit_table, get_format_state, insert_entity, insert_table,
    is_model_empty_fast, set_image_alt_text, toggle_bold,
    InsertEntityPosition, TableOperation,
};
use content_model::dom::{DomPosition, DomRange, DomSelection, NodeId};
use content_model::editor::{EditorCore, EditorOptions};
use content_model::model::{
    find_marker, get_model_selection, Block, ContentModelDocument,
    ModelSelection, Table,
};

fn editor(html: &str) -> EditorCore {
    EditorCore::new(EditorOptions::new().with_initial_html(html))
}

fn nodes(editor: &EditorCore, predicate: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
    let root = editor.root();
    editor
        .get_document()
        .descendants(root)
        .into_iter()
        .filter(|&n| predicate(n))
        .collect()
}

fn texts(editor: &EditorCore) -> Vec<NodeId> {
    nodes(editor, |n| editor.get_document().is_text(n))
}

fn tags(editor: &EditorCore, tag: &str) -> Vec<NodeId> {
    nodes(editor, |n| editor.get_document().is_tag(n, tag))
}

fn tables(model: &ContentModelDocument) -> Vec<&Table> {
    model
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
        .collect()
}

fn place_caret(editor: &mut EditorCore, node: NodeId, offset: usize) {
    editor.set_dom_selection(Some(DomSelection::caret(DomPosition::new(node, offset))));
}

#[test]
fn table_inserted_into_an_empty_editor() {
    let mut editor = editor("<div><br></div>");
    let div = tags(&editor, "div")[0];
    place_caret(&mut editor, div, 0);
    assert!(is_model_empty_fast(&editor.create_content_model()));

    assert!(insert_table(&mut editor, 2, 2, None, None));

    let model = editor.create_content_model();
    let tables = tables(&model);
    assert_eq!(tables.len(), 1);
    let table = tables[0];
    assert_eq!(table.rows.len(), 2);
    for row in &table.rows {
        assert_eq!(row.cells.len(), 2);
        for cell in &row.cells {
            assert_eq!(cell.format.vertical_align.as_deref(), Some("top"));
        }
    }
    let first_cell = &table.rows[0].cells[0];
    assert!(first_cell.blocks[0]
        .as_paragraph()
        .is_some_and(|p| p.segments.iter().any(|s| s.is_marker())));

    let html = editor.get_content();
    assert!(html.contains("<tbody>"));
    assert_eq!(html.matches("<td").count(), 4);
}

#[test]
fn zero_margin_line_is_still_empty() {
    let mut flush = editor(r#"<div style="margin-left: 0px;"><br></div>"#);
    assert!(is_model_empty_fast(&flush.create_content_model()));

    let mut indented = editor(r#"<div style="margin-left: 40px;"><br></div>"#);
    assert!(!is_model_empty_fast(&indented.create_content_model()));
}

const TABLE: &str = "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>";

fn row_count(editor: &mut EditorCore) -> usize {
    tables(&editor.create_content_model())[0].rows.len()
}

#[test]
fn table_edits_can_be_undone_and_redone() {
    let mut editor = editor(TABLE);
    let a = texts(&editor)[0];
    place_caret(&mut editor, a, 0);

    assert!(edit_table(&mut editor, TableOperation::InsertBelow));
    assert_eq!(row_count(&mut editor), 3);
    assert_eq!(tags(&editor, "tr").len(), 3);

    assert!(editor.undo());
    assert_eq!(row_count(&mut editor), 2);
    assert_eq!(tags(&editor, "tr").len(), 2);

    assert!(editor.redo());
    assert_eq!(row_count(&mut editor), 3);
}

#[test]
fn deleting_the_last_column_keeps_the_rest() {
    let mut editor = editor(TABLE);
    let b = texts(&editor)[1];
    place_caret(&mut editor, b, 0);

    assert!(edit_table(&mut editor, TableOperation::DeleteColumn));
    let html = editor.get_content();
    assert!(html.contains(">a<"));
    assert!(html.contains(">c<"));
    assert!(!html.contains(">b<"));
    assert!(!html.contains(">d<"));
}

#[test]
fn typed_list_indentation_becomes_level_margin() {
    let mut editor = editor("<ul><li>\u{a0}\u{a0}\u{a0}\u{a0}Hello World</li></ul>");
    let model = editor.create_content_model();
    let Block::ListItem(item) = &model.blocks[0] else {
        panic!("expected a list item, got {:?}", model.blocks[0]);
    };
    assert_eq!(item.levels[0].format.margin.left.as_deref(), Some("40px"));
    assert_eq!(
        item.blocks[0].as_paragraph().map(|p| p.text()),
        Some("Hello World".to_owned())
    );
}

#[test]
fn untouched_blocks_keep_their_elements() {
    let mut editor = editor("<div>first</div><div>second</div>");
    let divs = tags(&editor, "div");
    let first = texts(&editor)[0];
    editor.set_dom_selection(Some(DomSelection::Range {
        range: DomRange::new(DomPosition::new(first, 0), DomPosition::new(first, 5)),
        is_reverted: false,
    }));

    assert!(toggle_bold(&mut editor));
    assert!(get_format_state(&mut editor).is_bold);

    let root = editor.root();
    assert_eq!(editor.get_document().children(root)[1], divs[1]);
    assert!(editor.get_content().ends_with("<div>second</div>"));
}

#[test]
fn entity_content_survives_later_edits() {
    let mut editor = editor("<div>ab</div>");
    let text = texts(&editor)[0];
    place_caret(&mut editor, text, 1);

    let wrapper = insert_entity(&mut editor, "Mention", false, InsertEntityPosition::Focus)
        .expect("entity inserted");
    let dom = editor.get_document_mut();
    let name = dom.create_text("@alice");
    dom.append_child(wrapper, name);

    let b = texts(&editor)
        .into_iter()
        .find(|&n| editor.get_document().text(n) == Some("b"))
        .expect("text after the entity");
    editor.set_dom_selection(Some(DomSelection::Range {
        range: DomRange::new(DomPosition::new(b, 0), DomPosition::new(b, 1)),
        is_reverted: false,
    }));
    assert!(toggle_bold(&mut editor));

    assert!(editor.get_document().is_connected(wrapper));
    assert_eq!(editor.get_document().text_content(wrapper), "@alice");
}

#[test]
fn selected_image_gets_alt_text() {
    let mut editor = editor(r#"<div>a<img src="cat.png">b</div>"#);
    let image = tags(&editor, "img")[0];
    editor.set_dom_selection(Some(DomSelection::Image { image }));

    let model = editor.create_content_model();
    assert!(matches!(get_model_selection(&model.blocks), ModelSelection::Image(_)));
    assert!(find_marker(&model.blocks).is_none());

    assert!(set_image_alt_text(&mut editor, "A cat"));
    assert!(editor.get_content().contains(r#"alt="A cat""#));
}
