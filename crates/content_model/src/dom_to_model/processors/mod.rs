// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

mod block;
mod entity;
mod inline;
mod list;
mod table;
mod text;

pub use block::{
    divider_processor, format_container_processor, general_processor,
    known_block_processor,
};
pub use entity::{entity_processor, is_delimiter, DELIMITER_AFTER, DELIMITER_BEFORE};
pub use inline::{br_processor, image_processor, known_inline_processor};
pub use list::{list_item_processor, list_processor};
pub use table::table_processor;
pub(crate) use table::{cell_spans, table_rows};
pub use text::text_processor;

use log::trace;

use super::context::{category_of_tag, DomToModelContext, ProcessorCategory};
use crate::dom::{Dom, DomSelection, NodeData, NodeId};
use crate::format_handlers::EntityHandler;
use crate::model::{Block, Paragraph, Segment};

pub fn skip_processor(
    _group: &mut Vec<Block>,
    _dom: &Dom,
    _node: NodeId,
    _context: &mut DomToModelContext,
) {
}

/// Visit every child of `parent`, adding selection markers at the child
/// boundaries the selection points to.
pub fn child_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    parent: NodeId,
    context: &mut DomToModelContext,
) {
    let children = dom.children(parent);
    for (index, child) in children.iter().enumerate() {
        handle_regular_selection(group, parent, index, context);
        process_child_node(group, dom, *child, context);
    }
    handle_regular_selection(group, parent, children.len(), context);
}

fn process_child_node(
    group: &mut Vec<Block>,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext,
) {
    let category = match dom.data(node) {
        NodeData::Element(_) => ProcessorCategory::Element,
        NodeData::Text(_) => ProcessorCategory::Text,
        _ => return,
    };
    let processor = context.processor(category);
    processor(group, dom, node, context);
}

/// Pick the processor for `element` and run it.
pub fn element_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let Some(tag) = dom.tag(element) else {
        return;
    };

    let category = if dom.hidden_properties(element).is_some_and(|p| p.hint_text) {
        ProcessorCategory::HintText
    } else if is_delimiter(dom, element) {
        ProcessorCategory::Delimiter
    } else if dom.display(element) == "none" {
        trace!("Skipping hidden <{tag}>");
        return;
    } else if EntityHandler::is_entity_wrapper(dom, element) {
        ProcessorCategory::Entity
    } else {
        if context.options.editable_only && !dom.is_content_editable(element) {
            trace!("Skipping non editable <{tag}>");
            return;
        }
        if let Some(processor) = context.options.processors.tag_override(tag) {
            processor(group, dom, element, context);
            return;
        }
        match category_of_tag(tag) {
            ProcessorCategory::KnownInline if dom.is_block_element(element) => {
                ProcessorCategory::KnownBlock
            }
            ProcessorCategory::KnownBlock if !dom.is_block_element(element) => {
                ProcessorCategory::KnownInline
            }
            category => category,
        }
    };

    let processor = context.processor(category);
    processor(group, dom, element, context);
}

pub(crate) fn handle_regular_selection(
    group: &mut Vec<Block>,
    container: NodeId,
    offset: usize,
    context: &mut DomToModelContext,
) {
    let Some(DomSelection::Range { range, .. }) = &context.selection else {
        return;
    };
    let range = *range;
    if range.start.node == container && range.start.offset == offset {
        context.is_in_selection = true;
        add_selection_marker(group, context);
    }
    if range.end.node == container && range.end.offset == offset {
        if !range.is_collapsed() {
            add_selection_marker(group, context);
        }
        context.is_in_selection = false;
    }
}

/// The paragraph loose inline content goes to: the last block of the group
/// if it is a paragraph, otherwise a new implicit one.
pub(crate) fn ensure_paragraph<'a>(
    group: &'a mut Vec<Block>,
    context: &DomToModelContext,
) -> &'a mut Paragraph {
    if !matches!(group.last(), Some(Block::Paragraph(_))) {
        group.push(Block::Paragraph(Paragraph::with_format(
            true,
            context.inherited_block_format(),
        )));
    }
    match group.last_mut() {
        Some(Block::Paragraph(paragraph)) => paragraph,
        _ => unreachable!("the last block was just made a paragraph"),
    }
}

pub(crate) fn add_segment(
    group: &mut Vec<Block>,
    segment: Segment,
    context: &DomToModelContext,
) {
    let paragraph = ensure_paragraph(group, context);
    if segment.is_selected() {
        paragraph.invalidate();
    }
    paragraph.segments.push(segment);
}

pub(crate) fn add_selection_marker(group: &mut Vec<Block>, context: &DomToModelContext) {
    add_segment(group, Segment::marker(context.segment_format.clone()), context);
}

/// Whether any child of `element` is laid out as a block.
pub(crate) fn has_block_child(dom: &Dom, element: NodeId) -> bool {
    dom.children(element)
        .iter()
        .any(|child| dom.is_element(*child) && dom.is_block_element(*child))
}
