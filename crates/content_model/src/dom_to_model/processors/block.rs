// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{add_segment, has_block_child};
use crate::dom::{Dom, NodeId};
use crate::dom_to_model::{DomToModelContext, ProcessorCategory};
use crate::format_handlers::{parse_format, FormatHandler, ParagraphMarkerHandler};
use crate::model::{
    Block, BlockFormat, Divider, FormatContainer, GeneralBlock, GeneralSegment,
    MergeFormat, Paragraph, ParagraphDecorator, Segment, SegmentFormat,
};

/// Segment styles a block element passes down to its content. Background
/// and line height stay with the block.
fn block_segment_format(dom: &Dom, element: NodeId, context: &DomToModelContext) -> SegmentFormat {
    let mut format: SegmentFormat = parse_format(dom, element, &context.format);
    format.background_color = None;
    format.line_height = None;
    format
}

/// A block element wrapping other blocks needs its own container when it
/// carries format that paragraphs cannot hold for it.
fn should_use_format_container(dom: &Dom, element: NodeId, format: &BlockFormat) -> bool {
    if ParagraphDecorator::for_tag(dom.tag(element).unwrap_or_default()).is_some() {
        return false;
    }
    let has_container_format = format.background_color.is_some()
        || !format.margin.is_empty()
        || !format.padding.is_empty()
        || !format.borders.is_empty()
        || format.size.width.is_some()
        || format.size.height.is_some();
    has_container_format && has_block_child(dom, element)
}

/// `p`, `div`, headings and friends. The element becomes a paragraph for
/// the inline content it starts with. Nested blocks follow it as siblings.
pub fn known_block_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let tag = dom.tag(element).unwrap_or("div");
    let block_format: BlockFormat = parse_format(dom, element, &context.format);
    if should_use_format_container(dom, element, &block_format) {
        let container = context.processor(ProcessorCategory::FormatContainer);
        container(group, dom, element, context);
        return;
    }

    let scope = context.save_format();
    let segment_format = block_segment_format(dom, element, context);
    let decorator = ParagraphDecorator::for_tag(tag);

    let mut format = context.inherited_block_format();
    format.merge_from(&block_format);
    context.inherit_block_format(&block_format);
    if let Some(decorator) = &decorator {
        context.segment_format.merge_from(&decorator.format);
    }
    context.segment_format.merge_from(&segment_format);

    let mut paragraph = Paragraph::with_format(false, format);
    paragraph.segment_format = segment_format;
    paragraph.decorator = decorator;
    ParagraphMarkerHandler::parse(&mut paragraph.marker, dom, element, &context.format);
    if context.options.allow_cache_element && !has_block_child(dom, element) {
        paragraph.cached_element = Some(element);
    }
    group.push(Block::Paragraph(paragraph));

    let child = context.processor(ProcessorCategory::Child);
    child(group, dom, element, context);

    context.restore_format(scope);

    // Closes the paragraph: inline content after the element starts anew.
    group.push(Block::Paragraph(Paragraph::with_format(
        true,
        context.inherited_block_format(),
    )));
}

/// `blockquote`, `pre`, and block elements that wrap blocks with their own
/// margin, border or background.
pub fn format_container_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let tag = dom.tag(element).unwrap_or("div");
    let format: BlockFormat = parse_format(dom, element, &context.format);
    let mut container = FormatContainer::new(tag, format);
    if context.options.allow_cache_element {
        container.cached_element = Some(element);
    }

    let scope = context.save_format();
    context.inherit_block_format(&container.format);
    if tag == "pre" && context.block_format.white_space.is_none() {
        context.block_format.white_space = Some("pre".to_owned());
    }
    let segment_format = block_segment_format(dom, element, context);
    context.segment_format.merge_from(&segment_format);

    let child = context.processor(ProcessorCategory::Child);
    child(&mut container.blocks, dom, element, context);

    context.restore_format(scope);
    group.push(Block::FormatContainer(container));
}

pub fn divider_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let tag = dom.tag(element).unwrap_or("hr");
    let mut divider = Divider::new(tag, parse_format(dom, element, &context.format));
    divider.is_selected = context.is_in_selection;
    if context.options.allow_cache_element {
        divider.cached_element = Some(element);
    }
    group.push(Block::Divider(divider));
}

/// Elements the model has no type for. The element itself is kept by
/// reference and its content is converted as a nested block group.
pub fn general_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let child = context.processor(ProcessorCategory::Child);
    if dom.is_block_element(element) {
        let mut block = GeneralBlock {
            element,
            blocks: Vec::new(),
            format: parse_format(dom, element, &context.format),
            is_selected: context.is_in_selection,
        };
        let list_scope = context.enter_isolated_group();
        child(&mut block.blocks, dom, element, context);
        context.leave_isolated_group(list_scope);
        group.push(Block::General(block));
    } else {
        let mut segment = GeneralSegment {
            element,
            blocks: Vec::new(),
            format: context.segment_format.clone(),
            is_selected: context.is_in_selection,
            link: context.link.clone(),
        };
        let list_scope = context.enter_isolated_group();
        child(&mut segment.blocks, dom, element, context);
        context.leave_isolated_group(list_scope);
        segment.is_selected |= context.is_in_selection;
        add_segment(group, Segment::General(segment), context);
    }
}
