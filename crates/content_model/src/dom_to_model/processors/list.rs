// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::api::adjust_list_indentation;
use crate::dom::{Dom, NodeId};
use crate::dom_to_model::{DomToModelContext, ProcessorCategory};
use crate::format_handlers::parse_format;
use crate::model::{
    Block, BlockFormat, ListItem, ListLevel, ListType, MergeFormat,
    SegmentFormat,
};

fn list_segment_format(dom: &Dom, element: NodeId, context: &DomToModelContext) -> SegmentFormat {
    let mut format: SegmentFormat = parse_format(dom, element, &context.format);
    format.background_color = None;
    format.line_height = None;
    format
}

/// `ol` and `ul`. Lists are flattened: items of a nested list are not kept
/// inside the item they appear in but follow it in the same group, one
/// level deeper.
pub fn list_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let list_type = if dom.is_tag(element, "ol") {
        ListType::Ol
    } else {
        ListType::Ul
    };
    let mut level = ListLevel::new(list_type);
    level.format = parse_format(dom, element, &context.format);
    level.dataset = dom.dataset(element);

    let scope = context.save_format();
    let segment_format = list_segment_format(dom, element, context);
    context.segment_format.merge_from(&segment_format);
    context.inherit_block_format(&BlockFormat {
        direction: level.format.direction,
        ..Default::default()
    });
    context.list_levels.push(level);

    let child = context.processor(ProcessorCategory::Child);
    if context.list_item_depth > 0 {
        let mut items = Vec::new();
        child(&mut items, dom, element, context);
        context.nested_list_items.extend(items);
    } else {
        child(group, dom, element, context);
    }

    context.list_levels.pop();
    context.restore_format(scope);
}

pub fn list_item_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    if context.list_levels.is_empty() {
        let block = context.processor(ProcessorCategory::KnownBlock);
        block(group, dom, element, context);
        return;
    }

    let mut item = ListItem::new(context.list_levels.clone());
    item.format = parse_format(dom, element, &context.format);
    if context.options.allow_cache_element {
        item.cached_element = Some(element);
    }

    let scope = context.save_format();
    let segment_format = list_segment_format(dom, element, context);
    context.segment_format.merge_from(&segment_format);
    item.format_holder.format = context.segment_format.clone();

    let outer_nested_items = std::mem::take(&mut context.nested_list_items);
    context.list_item_depth += 1;
    let child = context.processor(ProcessorCategory::Child);
    child(&mut item.blocks, dom, element, context);
    context.list_item_depth -= 1;
    let nested_items = std::mem::replace(&mut context.nested_list_items, outer_nested_items);

    context.restore_format(scope);
    if context.options.process_virtual_indentation {
        adjust_list_indentation(&mut item);
    }
    group.push(Block::ListItem(item));
    group.extend(nested_items);
}
