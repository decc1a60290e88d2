// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::common::{parse_style_into, style_handler};
use super::{FormatContext, FormatHandler};
use crate::dom::{Dom, NodeId};

style_handler!(ListStylePositionHandler, "list-style-position");

pub struct ListStyleTypeHandler;

impl FormatHandler for ListStyleTypeHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_style_into(format, dom, element, "list-style-type");
        if format.is_some() {
            return;
        }
        let legacy = match dom.get_attribute(element, "type") {
            Some("1") => "decimal",
            Some("a") => "lower-alpha",
            Some("A") => "upper-alpha",
            Some("i") => "lower-roman",
            Some("I") => "upper-roman",
            Some(t @ ("disc" | "circle" | "square")) => t,
            _ => return,
        };
        *format = Some(legacy.to_owned());
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if let Some(style) = format {
            dom.set_style(element, "list-style-type", style);
        }
    }
}

pub struct ListStartNumberHandler;

impl FormatHandler for ListStartNumberHandler {
    type Format = Option<u32>;

    fn parse(format: &mut Option<u32>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(start) = dom.get_attribute(element, "start").and_then(|s| s.trim().parse().ok()) {
            *format = Some(start);
        }
    }

    fn apply(format: &Option<u32>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if let Some(start) = format {
            dom.set_attribute(element, "start", &start.to_string());
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn legacy_type_attribute_maps_to_a_style() {
        let (dom, root) = Dom::with_root_html(r#"<ol type="i" start="3"><li>a</li></ol>"#);
        let ol = dom.first_child(root).unwrap();
        let context = FormatContext::default();
        let mut style = None;
        let mut start = None;
        ListStyleTypeHandler::parse(&mut style, &dom, ol, &context);
        ListStartNumberHandler::parse(&mut start, &dom, ol, &context);

        assert_that!(style.as_deref()).is_equal_to(Some("lower-roman"));
        assert_that!(start).is_equal_to(Some(3));
    }
}
