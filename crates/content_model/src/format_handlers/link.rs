// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{FormatContext, FormatHandler};
use crate::dom::{Dom, NodeId};
use crate::model::{EntityInfo, LinkFormat};

pub struct LinkHandler;

impl FormatHandler for LinkHandler {
    type Format = LinkFormat;

    fn parse(format: &mut LinkFormat, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if !dom.is_tag(element, "a") {
            return;
        }
        let targets = [
            (&mut format.href, "href"),
            (&mut format.target, "target"),
            (&mut format.title, "title"),
            (&mut format.rel, "rel"),
            (&mut format.class, "class"),
            (&mut format.anchor_id, "name"),
        ];
        for (target, attribute) in targets {
            if let Some(value) = dom.get_attribute(element, attribute) {
                *target = Some(value.to_owned());
            }
        }
    }

    fn apply(format: &LinkFormat, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        let values = [
            (&format.href, "href"),
            (&format.target, "target"),
            (&format.title, "title"),
            (&format.rel, "rel"),
            (&format.class, "class"),
            (&format.anchor_id, "name"),
        ];
        for (value, attribute) in values {
            if let Some(value) = value {
                dom.set_attribute(element, attribute, value);
            }
        }
    }
}

const ENTITY_CLASS: &str = "_Entity";
const ENTITY_TYPE_PREFIX: &str = "_EType_";
const ENTITY_ID_PREFIX: &str = "_EId_";
const ENTITY_READONLY: &str = "_EReadonly_1";

/// Entity identity encoded in the wrapper's class list:
/// `_Entity _EType_<type> _EId_<id> _EReadonly_1`.
pub struct EntityHandler;

impl EntityHandler {
    /// Whether an element looks like an entity wrapper at all.
    pub fn is_entity_wrapper(dom: &Dom, element: NodeId) -> bool {
        dom.classes(element)
            .iter()
            .any(|c| *c == ENTITY_CLASS || c.starts_with(ENTITY_TYPE_PREFIX))
    }
}

impl FormatHandler for EntityHandler {
    type Format = EntityInfo;

    fn parse(format: &mut EntityInfo, dom: &Dom, element: NodeId, _context: &FormatContext) {
        let classes = dom.classes(element);
        let mut is_entity = false;
        for class in &classes {
            if *class == ENTITY_CLASS {
                is_entity = true;
            } else if let Some(entity_type) = class.strip_prefix(ENTITY_TYPE_PREFIX) {
                format.entity_type = Some(entity_type.to_owned());
            } else if let Some(id) = class.strip_prefix(ENTITY_ID_PREFIX) {
                format.id = Some(id.to_owned());
            } else if *class == ENTITY_READONLY {
                format.is_readonly = true;
            }
        }
        if !is_entity {
            format.is_fake_entity = true;
            format.is_readonly = dom.get_attribute(element, "contenteditable") == Some("false");
        }
    }

    fn apply(format: &EntityInfo, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if format.is_fake_entity {
            return;
        }
        dom.add_class(element, ENTITY_CLASS);
        if let Some(entity_type) = &format.entity_type {
            dom.add_class(element, &format!("{ENTITY_TYPE_PREFIX}{entity_type}"));
        }
        if let Some(id) = &format.id {
            dom.add_class(element, &format!("{ENTITY_ID_PREFIX}{id}"));
        }
        if format.is_readonly {
            dom.add_class(element, ENTITY_READONLY);
            dom.set_attribute(element, "contenteditable", "false");
        }
    }
}
