// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use log::debug;

use super::block_group::reuse_cached_element;
use super::context::{Anchor, ModelToDomContext};
use crate::dom::{Dom, NodeId};
use crate::dom_to_model::processors::{DELIMITER_AFTER, DELIMITER_BEFORE};
use crate::format_handlers::{EntityHandler, FormatHandler};
use crate::model::Entity;

const PLACEHOLDER_TEXT: &str = "entity";
const ZERO_WIDTH_SPACE: &str = "\u{200B}";

fn create_delimiter(dom: &mut Dom, class: &str) -> NodeId {
    let span = dom.create_element("span");
    dom.add_class(span, class);
    let text = dom.create_text(ZERO_WIDTH_SPACE);
    dom.append_child(span, text);
    span
}

/// The node standing for the entity in the output: a placeholder comment
/// to be merged later, or the wrapper itself.
fn entity_node(dom: &mut Dom, entity: &Entity, context: &mut ModelToDomContext) -> NodeId {
    EntityHandler::apply(&entity.info, dom, entity.wrapper, &mut context.format);
    if context.options.entity_placeholders {
        let placeholder = dom.create_comment(PLACEHOLDER_TEXT);
        context.entity_pairs.push((entity.wrapper, placeholder));
        placeholder
    } else {
        entity.wrapper
    }
}

pub(crate) fn render_block_entity(
    dom: &mut Dom,
    parent: NodeId,
    entity: &mut Entity,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    let node = entity_node(dom, entity, context);
    let ref_node = if node == entity.wrapper {
        reuse_cached_element(dom, parent, node, ref_node)
    } else {
        dom.insert_before(parent, node, ref_node);
        ref_node
    };
    if entity.is_selected {
        context.anchor = Some(Anchor::before(dom, parent, Some(node)));
        context.mark_selection_start();
        context.anchor = Some(Anchor::After(node));
        context.mark_selection_end();
    }
    ref_node
}

/// Put an inline entity into `container`, with caret delimiters around it
/// when asked for. Returns the last node inserted.
pub(crate) fn render_segment_entity(
    dom: &mut Dom,
    container: NodeId,
    before: Option<NodeId>,
    entity: &Entity,
    context: &mut ModelToDomContext,
) -> NodeId {
    let node = entity_node(dom, entity, context);
    dom.insert_before(container, node, before);
    if !context.options.add_delimiter_for_entity {
        return node;
    }
    let delimiter_before = create_delimiter(dom, DELIMITER_BEFORE);
    dom.insert_before(container, delimiter_before, Some(node));
    let delimiter_after = create_delimiter(dom, DELIMITER_AFTER);
    let next = dom.next_sibling(node);
    dom.insert_before(container, delimiter_after, next);
    delimiter_after
}

/// Move the rendered content of `fragment` into `target`, keeping entity
/// wrappers that are already in `target` where they are.
///
/// `pairs` holds `(wrapper, placeholder)` in the order placeholders appear
/// in `fragment`. A wrapper is kept in place only when both it and its
/// placeholder come after the previously kept pair. Any other wrapper is
/// moved to where its placeholder is. Everything in `target` that is not a
/// kept wrapper is removed, then the fragment content is spliced in
/// between the kept wrappers. Returns the wrappers that were moved.
pub fn merge_fragment_with_entity(
    dom: &mut Dom,
    fragment: NodeId,
    target: NodeId,
    pairs: &[(NodeId, NodeId)],
) -> Vec<NodeId> {
    let mut kept: Vec<(NodeId, NodeId)> = Vec::new();
    let mut moved = Vec::new();
    for &(wrapper, placeholder) in pairs {
        let in_order = kept.last().map_or(true, |&(last_wrapper, last_placeholder)| {
            dom.is_before(last_wrapper, wrapper) && dom.is_before(last_placeholder, placeholder)
        });
        if in_order
            && dom.parent(wrapper) == Some(target)
            && dom.parent(placeholder) == Some(fragment)
        {
            kept.push((wrapper, placeholder));
        } else if let Some(parent) = dom.parent(placeholder) {
            debug!("Moving entity wrapper {wrapper:?} to its placeholder");
            dom.replace_child(parent, wrapper, placeholder);
            moved.push(wrapper);
        }
    }

    let mut node = dom.first_child(target);
    for &(wrapper, _) in &kept {
        while let Some(current) = node {
            if current == wrapper {
                break;
            }
            node = dom.next_sibling(current);
            dom.detach(current);
        }
        node = dom.next_sibling(wrapper);
    }
    while let Some(current) = node {
        node = dom.next_sibling(current);
        dom.detach(current);
    }

    for &(wrapper, placeholder) in &kept {
        while let Some(first) = dom.first_child(fragment) {
            if first == placeholder {
                break;
            }
            dom.insert_before(target, first, Some(wrapper));
        }
        dom.detach(placeholder);
    }
    dom.move_children(fragment, target);
    moved
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    /// A target holding `wrappers` in the given order and a fragment with
    /// `before <placeholder> middle <placeholder> after`.
    fn setup(dom: &mut Dom, wrappers: &[NodeId]) -> (NodeId, NodeId, Vec<NodeId>) {
        let target = dom.create_element("div");
        for wrapper in wrappers {
            dom.append_child(target, *wrapper);
        }
        let stale = dom.create_text("stale");
        dom.append_child(target, stale);

        let fragment = dom.create_fragment();
        let mut placeholders = Vec::new();
        for text in ["before", "middle"] {
            let node = dom.create_text(text);
            dom.append_child(fragment, node);
            let placeholder = dom.create_comment(PLACEHOLDER_TEXT);
            dom.append_child(fragment, placeholder);
            placeholders.push(placeholder);
        }
        let after = dom.create_text("after");
        dom.append_child(fragment, after);
        (target, fragment, placeholders)
    }

    fn entity(dom: &mut Dom, name: &str) -> NodeId {
        let wrapper = dom.create_element("span");
        dom.set_attribute(wrapper, "id", name);
        wrapper
    }

    #[test]
    fn wrappers_in_order_are_kept_in_place() {
        let mut dom = Dom::new();
        let first = entity(&mut dom, "one");
        let second = entity(&mut dom, "two");
        let (target, fragment, placeholders) = setup(&mut dom, &[first, second]);

        let moved = merge_fragment_with_entity(
            &mut dom,
            fragment,
            target,
            &[(first, placeholders[0]), (second, placeholders[1])],
        );

        assert_that!(dom.inner_html(target)).is_equal_to(
            r#"before<span id="one"></span>middle<span id="two"></span>after"#.to_owned(),
        );
        assert_that!(moved).is_empty();
        assert_that!(dom.parent(first)).is_equal_to(Some(target));
        assert_that!(dom.child_count(fragment)).is_equal_to(0);
    }

    #[test]
    fn out_of_order_wrapper_is_moved_to_its_placeholder() {
        let mut dom = Dom::new();
        let first = entity(&mut dom, "one");
        let second = entity(&mut dom, "two");
        let (target, fragment, placeholders) = setup(&mut dom, &[second, first]);

        let moved = merge_fragment_with_entity(
            &mut dom,
            fragment,
            target,
            &[(first, placeholders[0]), (second, placeholders[1])],
        );

        // Only the second wrapper went through its placeholder; the first
        // one never left the target.
        assert_that!(moved).is_equal_to(vec![second]);
        assert_that!(dom.parent(first)).is_equal_to(Some(target));
        assert_that!(dom.parent(second)).is_equal_to(Some(target));
        assert_that!(dom.inner_html(target)).is_equal_to(
            r#"before<span id="one"></span>middle<span id="two"></span>after"#.to_owned(),
        );
        assert_that!(dom.child_count(fragment)).is_equal_to(0);
    }
}
