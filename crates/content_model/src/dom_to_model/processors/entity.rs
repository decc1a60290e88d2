// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::add_segment;
use crate::dom::{Dom, NodeId};
use crate::dom_to_model::DomToModelContext;
use crate::format_handlers::{EntityHandler, FormatHandler};
use crate::model::{Block, Entity, EntityInfo, Segment};

/// Class of the caret helper span rendered before an inline entity.
pub const DELIMITER_BEFORE: &str = "entityDelimiterBefore";
/// Class of the caret helper span rendered after an inline entity.
pub const DELIMITER_AFTER: &str = "entityDelimiterAfter";

pub fn is_delimiter(dom: &Dom, element: NodeId) -> bool {
    dom.is_tag(element, "span")
        && (dom.has_class(element, DELIMITER_BEFORE) || dom.has_class(element, DELIMITER_AFTER))
}

/// Entities are opaque: the wrapper is kept as is and never descended into.
pub fn entity_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let mut info = EntityInfo::default();
    EntityHandler::parse(&mut info, dom, element, &context.format);
    let mut entity = Entity::new(element, info);
    entity.format = context.segment_format.clone();
    entity.is_selected = context.is_in_selection;

    if dom.is_block_element(element) {
        group.push(Block::Entity(entity));
    } else {
        add_segment(group, Segment::Entity(entity), context);
    }
}
