// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::block_group::{render_block, render_block_group_children};
use super::context::{segment_format_diff, ModelNodeRef, ModelToDomContext, OpenList};
use crate::dom::{Dom, NodeId};
use crate::format_handlers::{
    apply_block_segment_format, ContentFormat, DatasetHandler, FormatHandler,
};
use crate::model::{BlockFormat, ListItem, MergeFormat};

/// Make the open list elements match the levels of `item`: levels equal to
/// the ones already open are shared, the rest get new `ol`/`ul` elements,
/// each appended into the list one level up.
fn open_lists_for(
    dom: &mut Dom,
    parent: NodeId,
    item: &ListItem,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) {
    let shared = item
        .levels
        .iter()
        .zip(context.open_lists.iter())
        .take_while(|(level, open)| **level == open.level)
        .count();
    context.open_lists.truncate(shared);

    for level in &item.levels[shared..] {
        let element = dom.create_element(level.list_type.as_ref());
        match context.open_lists.last() {
            Some(open) => dom.append_child(open.node, element),
            None => dom.insert_before(parent, element, ref_node),
        }
        level.format.apply_to(dom, element, &mut context.format);
        DatasetHandler::apply(&level.dataset, dom, element, &mut context.format);
        context.node_created(ModelNodeRef::ListLevel(level), element);
        context.open_lists.push(OpenList {
            node: element,
            level: level.clone(),
        });
    }
}

pub(crate) fn render_list_item(
    dom: &mut Dom,
    parent: NodeId,
    item: &mut ListItem,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    if item.levels.is_empty() {
        // An item outdented past the first level keeps its content only.
        context.open_lists.clear();
        let mut ref_node = ref_node;
        for block in item.blocks.iter_mut() {
            ref_node = render_block(dom, parent, block, context, ref_node);
        }
        return ref_node;
    }

    open_lists_for(dom, parent, item, context, ref_node);
    let Some(list) = context.open_lists.last().map(|open| open.node) else {
        return ref_node;
    };

    let li = match item.cached_element {
        Some(li) => {
            dom.append_child(list, li);
            li
        }
        None => {
            let li = dom.create_element("li");
            dom.append_child(list, li);
            item.format.apply_to(dom, li, &mut context.format);
            let marker_format = segment_format_diff(
                &item.format_holder.format,
                &context.implicit_segment_format,
            );
            apply_block_segment_format(&marker_format, dom, li, &mut context.format);
            context.node_created(ModelNodeRef::ListItem(item), li);
            if context.options.allow_cache_element {
                item.cached_element = Some(li);
            }
            li
        }
    };

    let scope = context.save_scope();
    for level in &item.levels {
        context.inherit_block_format(&BlockFormat {
            direction: level.format.direction,
            ..Default::default()
        });
    }
    context.implicit_segment_format.merge_from(&item.format_holder.format);
    render_block_group_children(dom, li, &mut item.blocks, context);
    context.restore_scope(scope);

    ref_node
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use crate::dom::Dom;
    use crate::format_handlers::FormatContext;
    use crate::model::{
        Block, ContentModelDocument, ListItem, ListLevel, ListType, Paragraph,
        Segment, SegmentFormat,
    };
    use crate::model_to_dom::{content_model_to_dom, ModelToDomContext, ModelToDomOptions};

    fn item(levels: &[ListType], text: &str) -> Block {
        let mut item = ListItem::new(levels.iter().map(|t| ListLevel::new(*t)).collect());
        let mut paragraph = Paragraph::new(true);
        paragraph.segments.push(Segment::text(text, SegmentFormat::default()));
        item.blocks.push(Block::Paragraph(paragraph));
        Block::ListItem(item)
    }

    fn render(blocks: Vec<Block>) -> String {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let mut model = ContentModelDocument::new();
        model.blocks = blocks;
        let mut context =
            ModelToDomContext::new(ModelToDomOptions::default(), FormatContext::default());
        content_model_to_dom(&mut dom, root, &mut model, &mut context);
        dom.inner_html(root)
    }

    #[test]
    fn items_with_the_same_levels_share_a_list() {
        let html = render(vec![item(&[ListType::Ol], "a"), item(&[ListType::Ol], "b")]);
        assert_that!(html).is_equal_to("<ol><li>a</li><li>b</li></ol>".to_owned());
    }

    #[test]
    fn deeper_levels_nest_into_the_parent_list() {
        let html = render(vec![
            item(&[ListType::Ol], "a"),
            item(&[ListType::Ol, ListType::Ul], "b"),
            item(&[ListType::Ol], "c"),
        ]);
        assert_that!(html)
            .is_equal_to("<ol><li>a</li><ul><li>b</li></ul><li>c</li></ol>".to_owned());
    }

    #[test]
    fn another_block_ends_the_list() {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::text("x", SegmentFormat::default()));
        let html = render(vec![
            item(&[ListType::Ul], "a"),
            Block::Paragraph(paragraph),
            item(&[ListType::Ul], "b"),
        ]);
        assert_that!(html)
            .is_equal_to("<ul><li>a</li></ul><div>x</div><ul><li>b</li></ul>".to_owned());
    }
}
