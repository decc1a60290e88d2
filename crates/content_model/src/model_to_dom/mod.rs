// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Model to DOM rendering. Each block group is reconciled with the
//! children already in its element: blocks that still carry a cached
//! element reuse it in place, everything else is created fresh, and nodes
//! the model no longer mentions are removed.

mod block_group;
mod context;
mod entity;
mod list;
mod paragraph;
mod table;

pub use context::{ModelNodeRef, ModelToDomContext, ModelToDomOptions, OnNodeCreated};
pub use entity::merge_fragment_with_entity;
pub use table::adaptive_text_color;

use log::debug;

use crate::dom::{Dom, DomRange, DomSelection, NodeId};
use crate::model::ContentModelDocument;
use block_group::render_block_group_children;
use context::TableSelectionInfo;

/// Render `model` into `root` and return the selection the model carries,
/// as positions in the rendered DOM.
pub fn content_model_to_dom(
    dom: &mut Dom,
    root: NodeId,
    model: &mut ContentModelDocument,
    context: &mut ModelToDomContext,
) -> Option<DomSelection> {
    context.implicit_segment_format = model.format.clone();
    context.anchor = None;
    context.selection_start = None;
    context.selection_end = None;
    context.image_selection = None;
    context.table_selection = None;
    context.entity_pairs.clear();

    if context.options.entity_placeholders {
        let fragment = dom.create_fragment();
        render_block_group_children(dom, fragment, &mut model.blocks, context);
        let pairs = std::mem::take(&mut context.entity_pairs);
        let moved = merge_fragment_with_entity(dom, fragment, root, &pairs);
        if !moved.is_empty() {
            debug!("Moved {} entity wrappers to their placeholders", moved.len());
        }
    } else {
        render_block_group_children(dom, root, &mut model.blocks, context);
    }

    resolve_selection(dom, context)
}

fn resolve_selection(dom: &Dom, context: &ModelToDomContext) -> Option<DomSelection> {
    if let Some(TableSelectionInfo {
        table,
        first_row,
        first_column,
        last_row,
        last_column,
    }) = context.table_selection
    {
        return Some(DomSelection::Table {
            table,
            first_column,
            first_row,
            last_column,
            last_row,
        });
    }
    if let Some(image) = context.image_selection {
        return Some(DomSelection::Image { image });
    }
    let start = context.selection_start?.resolve(dom)?;
    let end = context
        .selection_end
        .and_then(|anchor| anchor.resolve(dom))
        .unwrap_or(start);
    Some(DomSelection::Range {
        range: DomRange::new(start, end),
        is_reverted: false,
    })
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use indoc::indoc;
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::DomPosition;
    use crate::dom_to_model::{dom_to_content_model, DomToModelContext, DomToModelOptions};
    use crate::format_handlers::FormatContext;
    use crate::model::{Block, Entity, EntityInfo, Paragraph, Segment, SegmentFormat};

    fn parse(dom: &Dom, root: NodeId, allow_cache_element: bool) -> ContentModelDocument {
        let options = DomToModelOptions {
            allow_cache_element,
            ..Default::default()
        };
        let mut context = DomToModelContext::new(options, FormatContext::default());
        dom_to_content_model(dom, root, &mut context)
    }

    fn render_into(dom: &mut Dom, root: NodeId, model: &mut ContentModelDocument) -> Option<DomSelection> {
        let options = ModelToDomOptions {
            allow_cache_element: true,
            ..Default::default()
        };
        let mut context = ModelToDomContext::new(options, FormatContext::default());
        content_model_to_dom(dom, root, model, &mut context)
    }

    fn html_round_trip(html: &str) -> String {
        let (source, source_root) = Dom::with_root_html(html);
        let mut model = parse(&source, source_root, false);
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        render_into(&mut dom, root, &mut model);
        dom.inner_html(root)
    }

    #[test]
    fn supported_markup_renders_back_as_it_was() {
        for html in [
            "<div>hello</div>",
            "plain <b>bold</b> <i>italic</i>",
            r#"<div style="text-align: center;">a</div>"#,
            r#"<span style="color: red;">red</span>"#,
            "<h2>Heading</h2><p>Paragraph</p>",
            r#"<div><a href="https://matrix.org">link</a></div>"#,
            "<ul><li>a</li><li>b</li></ul>",
            "<blockquote><div>quote</div></blockquote>",
            "<div>a<br>b</div>",
        ] {
            assert_that!(html_round_trip(html)).is_equal_to(html.to_owned());
        }
    }

    #[test]
    fn tables_always_get_a_tbody() {
        let html = html_round_trip(
            r#"<table><tr><td style="width: 50px;">a</td><td style="width: 50px;">b</td></tr></table>"#,
        );
        assert_that!(html).starts_with(r#"<table style="border-collapse: collapse;"><tbody><tr>"#);
        assert_that!(html).contains(r#"<td style="box-sizing: border-box; width: 50px;">a</td>"#);
    }

    #[test]
    fn model_survives_a_round_trip_through_the_dom() {
        let html = indoc! {r#"
            <div style="color: blue;">a <b>b</b></div>
            <table>
              <tr><td colspan="2">x</td><td rowspan="2">y</td></tr>
              <tr><td>z</td><td>w</td></tr>
            </table>
            <ol start="3"><li>one<ul><li>two</li></ul></li></ol>
            <pre>a  b</pre>
        "#};
        let (source, source_root) = Dom::with_root_html(html);
        let mut model = parse(&source, source_root, false);
        let expected = model.clone();

        let (mut dom, root) = Dom::with_root_html("");
        render_into(&mut dom, root, &mut model);
        let reparsed = parse(&dom, root, false);

        assert_that!(reparsed).is_equal_to(expected);
    }

    #[test]
    fn span_grid_dimensions_survive_rendering() {
        let html = indoc! {r#"
            <table>
              <tr><td rowspan="2">a</td><td colspan="2">b</td><td>c</td></tr>
              <tr><td>d</td><td colspan="2" rowspan="2">e</td></tr>
              <tr><td>f</td><td>g</td></tr>
            </table>
        "#};
        let (source, source_root) = Dom::with_root_html(html);
        let mut model = parse(&source, source_root, false);
        let Some(Block::Table(table)) = model.blocks.first() else {
            panic!("expected a table")
        };
        let dimensions = (table.row_count(), table.column_count());

        let (mut dom, root) = Dom::with_root_html("");
        render_into(&mut dom, root, &mut model);
        let reparsed = parse(&dom, root, false);
        let Some(Block::Table(table)) = reparsed.blocks.first() else {
            panic!("expected a table")
        };
        assert_that!((table.row_count(), table.column_count())).is_equal_to(dimensions);
        assert_that!(dimensions).is_equal_to((3, 4));
    }

    #[test]
    fn cached_elements_are_reused_by_identity() {
        let (mut dom, root) = Dom::with_root_html("<div>a</div><div>b</div>");
        let first = dom.children(root)[0];
        let second = dom.children(root)[1];
        let mut model = parse(&dom, root, true);
        model.blocks.swap(0, 1);

        render_into(&mut dom, root, &mut model);

        assert_that!(dom.children(root).to_vec()).is_equal_to(vec![second, first]);
    }

    #[test]
    fn fresh_nodes_are_reported() {
        let created = Rc::new(RefCell::new(0));
        let counter = created.clone();
        let options = ModelToDomOptions {
            on_node_created: Some(Rc::new(move |_: ModelNodeRef<'_>, _: NodeId| {
                *counter.borrow_mut() += 1
            })),
            ..Default::default()
        };
        let (source, source_root) = Dom::with_root_html("<div>a</div>");
        let mut model = parse(&source, source_root, false);
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let mut context = ModelToDomContext::new(options, FormatContext::default());
        content_model_to_dom(&mut dom, root, &mut model, &mut context);

        // The paragraph and its text segment.
        assert_that!(*created.borrow()).is_equal_to(2);
    }

    #[test]
    fn caret_is_resolved_to_a_dom_position() {
        let mut model = ContentModelDocument::new();
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::text("ab", SegmentFormat::default()));
        paragraph.segments.push(Segment::marker(SegmentFormat::default()));
        model.blocks.push(Block::Paragraph(paragraph));

        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let selection = render_into(&mut dom, root, &mut model);

        let div = dom.first_child(root).unwrap();
        let text = dom.first_child(div).unwrap();
        assert_that!(selection).is_equal_to(Some(DomSelection::caret(DomPosition::new(text, 2))));
    }

    #[test]
    fn entities_keep_their_wrapper_and_get_delimiters() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let wrapper = dom.create_element("span");
        let info = EntityInfo {
            entity_type: Some("Mention".into()),
            ..Default::default()
        };
        let mut paragraph = Paragraph::new(true);
        paragraph.segments.push(Segment::Entity(Entity::new(wrapper, info)));
        let mut model = ContentModelDocument::new();
        model.blocks.push(Block::Paragraph(paragraph));

        let options = ModelToDomOptions {
            add_delimiter_for_entity: true,
            ..Default::default()
        };
        let mut context = ModelToDomContext::new(options, FormatContext::default());
        content_model_to_dom(&mut dom, root, &mut model, &mut context);

        assert_that!(dom.children(root)[1]).is_equal_to(wrapper);
        assert_that!(dom.inner_html(root)).is_equal_to(
            "<span class=\"entityDelimiterBefore\">\u{200B}</span>\
             <span class=\"_Entity _EType_Mention\"></span>\
             <span class=\"entityDelimiterAfter\">\u{200B}</span>"
                .to_owned(),
        );
    }

    #[test]
    fn selected_cells_become_a_table_selection() {
        let (source, source_root) = Dom::with_root_html("<table><tr><td>a</td><td>b</td></tr></table>");
        let mut model = parse(&source, source_root, false);
        if let Some(Block::Table(table)) = model.blocks.first_mut() {
            table.rows[0].cells[1].is_selected = true;
        }
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let selection = render_into(&mut dom, root, &mut model);

        let table = dom.first_child(root).unwrap();
        assert_that!(selection).is_equal_to(Some(DomSelection::Table {
            table,
            first_column: 1,
            first_row: 0,
            last_column: 1,
            last_row: 0,
        }));
    }

    fn cached_two_cell_table() -> (Dom, NodeId, ContentModelDocument) {
        let (mut dom, root) = Dom::with_root_html(
            r#"<table><tr><td style="width: 50px;">a</td><td style="width: 50px;">b</td></tr></table>"#,
        );
        let mut model = parse(&dom, root, true);
        render_into(&mut dom, root, &mut model);
        (dom, root, model)
    }

    fn cell_widths(dom: &Dom, root: NodeId) -> Vec<Option<String>> {
        dom.descendants(root)
            .into_iter()
            .filter(|&n| dom.is_tag(n, "td"))
            .map(|td| dom.style(td, "width"))
            .collect()
    }

    fn first_table(model: &mut ContentModelDocument) -> &mut crate::model::Table {
        match model.blocks.first_mut() {
            Some(Block::Table(table)) => table,
            other => panic!("expected a table, got {other:?}"),
        }
    }

    #[test]
    fn refreshed_table_resizes_its_cached_cells() {
        let (mut dom, root, mut model) = cached_two_cell_table();
        let table = first_table(&mut model);
        let cells: Vec<_> = table.rows[0].cells.iter().map(|c| c.cached_element).collect();
        assert_that!(cells.iter().all(Option::is_some)).is_true();
        table.widths = vec![200.0, 200.0];
        table.cached_element = None;

        render_into(&mut dom, root, &mut model);

        assert_that!(cell_widths(&dom, root))
            .is_equal_to(vec![Some("200px".to_owned()), Some("200px".to_owned())]);
        let tds: Vec<_> = dom
            .descendants(root)
            .into_iter()
            .filter(|&n| dom.is_tag(n, "td"))
            .map(Some)
            .collect();
        assert_that!(tds).is_equal_to(cells);
    }

    #[test]
    fn cached_cells_keep_their_size_unless_overridden() {
        let (mut dom, root, mut model) = cached_two_cell_table();
        let table = first_table(&mut model);
        table.widths = vec![200.0, 200.0];
        crate::model::metadata::update_metadata(&mut table.rows[0].cells[1].dataset, |_| {
            Some(crate::model::metadata::CellMetadata {
                bg_color_override: Some(true),
                ..Default::default()
            })
        })
        .unwrap();

        render_into(&mut dom, root, &mut model);

        assert_that!(cell_widths(&dom, root))
            .is_equal_to(vec![Some("50px".to_owned()), Some("200px".to_owned())]);
    }
}
