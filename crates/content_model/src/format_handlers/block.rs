// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::common::style_handler;
use super::{FormatContext, FormatHandler};
use crate::dom::{Dom, NodeId};
use crate::model::Direction;

style_handler!(LineHeightHandler, "line-height");
style_handler!(WhiteSpaceHandler, "white-space");
style_handler!(TextIndentHandler, "text-indent");
style_handler!(WordBreakHandler, "word-break");

fn own_direction(dom: &Dom, element: NodeId) -> Option<Direction> {
    dom.style(element, "direction")
        .or_else(|| dom.get_attribute(element, "dir").map(String::from))
        .and_then(|d| d.trim().to_ascii_lowercase().parse().ok())
}

pub struct DirectionHandler;

impl FormatHandler for DirectionHandler {
    type Format = Option<Direction>;

    fn parse(format: &mut Option<Direction>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(direction) = own_direction(dom, element) {
            *format = Some(direction);
        }
    }

    fn apply(format: &Option<Direction>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if let Some(direction) = format {
            dom.set_style(element, "direction", direction.as_ref());
        }
    }
}

/// Alignment is stored relative to the text direction: `start`, `end`,
/// `center` or `justify`.
pub struct TextAlignHandler;

impl FormatHandler for TextAlignHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, context: &FormatContext) {
        let legacy = || {
            (!dom.is_tag(element, "table"))
                .then(|| dom.get_attribute(element, "align").map(String::from))
                .flatten()
        };
        let Some(value) = dom.style(element, "text-align").or_else(legacy) else {
            return;
        };
        let direction = own_direction(dom, element).unwrap_or(context.direction);
        let value = value.trim().to_ascii_lowercase();
        *format = Some(match (value.as_str(), direction) {
            ("left", Direction::Ltr) | ("right", Direction::Rtl) => "start".to_owned(),
            ("left", Direction::Rtl) | ("right", Direction::Ltr) => "end".to_owned(),
            _ => value,
        });
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, context: &mut FormatContext) {
        let Some(value) = format else {
            return;
        };
        let direction = own_direction(dom, element).unwrap_or(context.direction);
        let resolved = match (value.as_str(), direction) {
            ("start", Direction::Ltr) | ("end", Direction::Rtl) => "left",
            ("start", Direction::Rtl) | ("end", Direction::Ltr) => "right",
            (other, _) => other,
        };
        dom.set_style(element, "text-align", resolved);
    }
}

pub struct VerticalAlignHandler;

impl FormatHandler for VerticalAlignHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        let value = dom
            .style(element, "vertical-align")
            .or_else(|| dom.get_attribute(element, "valign").map(String::from));
        if let Some(value) = value {
            *format = Some(value);
        }
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if let Some(value) = format {
            dom.set_style(element, "vertical-align", value);
        }
    }
}
