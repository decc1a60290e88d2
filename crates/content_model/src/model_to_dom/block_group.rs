// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use log::trace;

use super::context::{ModelNodeRef, ModelToDomContext};
use super::entity::render_block_entity;
use super::list::render_list_item;
use super::paragraph::render_paragraph;
use super::table::render_table;
use crate::dom::{Dom, NodeId};
use crate::format_handlers::ContentFormat;
use crate::model::{Block, BlockFormat, Divider, FormatContainer, GeneralBlock};

/// Put `element` at the position of `ref_node` in `parent` and return the
/// node the next block should be placed at.
///
/// Nodes between `ref_node` and an element already in `parent` do not
/// appear in the model at this position and are removed. Anything later
/// in the model that owns one of them puts it back.
pub(crate) fn reuse_cached_element(
    dom: &mut Dom,
    parent: NodeId,
    element: NodeId,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    let mut ref_node = ref_node;
    if dom.parent(element) == Some(parent) {
        while let Some(node) = ref_node {
            if node == element {
                break;
            }
            ref_node = dom.next_sibling(node);
            dom.detach(node);
        }
        if ref_node == Some(element) {
            return dom.next_sibling(element);
        }
    }
    dom.insert_before(parent, element, ref_node);
    ref_node
}

/// Render `blocks` as the children of `parent`, reusing the nodes already
/// there where the model still points at them and removing the rest.
pub(crate) fn render_block_group_children(
    dom: &mut Dom,
    parent: NodeId,
    blocks: &mut [Block],
    context: &mut ModelToDomContext,
) {
    let scope = context.save_scope();
    context.open_lists.clear();

    let mut ref_node = dom.first_child(parent);
    for block in blocks.iter_mut() {
        if !matches!(block, Block::ListItem(_)) {
            context.open_lists.clear();
        }
        ref_node = render_block(dom, parent, block, context, ref_node);
    }
    while let Some(node) = ref_node {
        ref_node = dom.next_sibling(node);
        trace!("Removing stale node {node:?}");
        dom.detach(node);
    }

    context.restore_scope(scope);
}

pub(crate) fn render_block(
    dom: &mut Dom,
    parent: NodeId,
    block: &mut Block,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    match block {
        Block::Paragraph(paragraph) => render_paragraph(dom, parent, paragraph, context, ref_node),
        Block::Table(table) => render_table(dom, parent, table, context, ref_node),
        Block::Divider(divider) => render_divider(dom, parent, divider, context, ref_node),
        Block::Entity(entity) => render_block_entity(dom, parent, entity, context, ref_node),
        Block::FormatContainer(container) => {
            render_format_container(dom, parent, container, context, ref_node)
        }
        Block::ListItem(item) => render_list_item(dom, parent, item, context, ref_node),
        Block::General(general) => render_general_block(dom, parent, general, context, ref_node),
    }
}

/// Apply `format` to a fresh element, leaving out what the enclosing
/// elements already give.
pub(crate) fn apply_own_block_format(
    dom: &mut Dom,
    element: NodeId,
    format: &BlockFormat,
    context: &mut ModelToDomContext,
) {
    let own = context.own_block_format(format);
    own.apply_to(dom, element, &mut context.format);
}

fn render_divider(
    dom: &mut Dom,
    parent: NodeId,
    divider: &mut Divider,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    if let Some(element) = divider.cached_element {
        return reuse_cached_element(dom, parent, element, ref_node);
    }
    let element = dom.create_element(&divider.tag_name);
    dom.insert_before(parent, element, ref_node);
    apply_own_block_format(dom, element, &divider.format, context);
    if context.options.allow_cache_element {
        divider.cached_element = Some(element);
    }
    context.node_created(ModelNodeRef::Divider(divider), element);
    ref_node
}

fn render_format_container(
    dom: &mut Dom,
    parent: NodeId,
    container: &mut FormatContainer,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    let (element, ref_node) = match container.cached_element {
        Some(element) => (element, reuse_cached_element(dom, parent, element, ref_node)),
        None => {
            let element = dom.create_element(&container.tag_name);
            dom.insert_before(parent, element, ref_node);
            apply_own_block_format(dom, element, &container.format, context);
            if context.options.allow_cache_element {
                container.cached_element = Some(element);
            }
            context.node_created(ModelNodeRef::FormatContainer(container), element);
            (element, ref_node)
        }
    };

    let scope = context.save_scope();
    context.inherit_block_format(&container.format);
    if container.tag_name == "pre" && container.format.white_space.is_none() {
        context.inherited_block_format.white_space = Some("pre".to_owned());
    }
    render_block_group_children(dom, element, &mut container.blocks, context);
    context.restore_scope(scope);
    ref_node
}

/// Unknown elements come back as a shallow copy of the original with
/// their content rendered from the model.
fn render_general_block(
    dom: &mut Dom,
    parent: NodeId,
    general: &mut GeneralBlock,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    let element = dom.clone_node(general.element, false);
    dom.insert_before(parent, element, ref_node);
    context.node_created(ModelNodeRef::General(general), element);
    render_block_group_children(dom, element, &mut general.blocks, context);
    ref_node
}
