// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::common::style_handler;
use super::{FormatContext, FormatHandler};
use crate::dom::{Dom, NodeId};

style_handler!(TableLayoutHandler, "table-layout");

/// `border-collapse`: `Some(true)` for collapse, `Some(false)` for
/// separate.
pub struct TableSpacingHandler;

impl FormatHandler for TableSpacingHandler {
    type Format = Option<bool>;

    fn parse(format: &mut Option<bool>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        match dom.style(element, "border-collapse").as_deref() {
            Some("collapse") => *format = Some(true),
            Some("separate") => *format = Some(false),
            _ => {}
        }
    }

    fn apply(format: &Option<bool>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        match format {
            Some(true) => dom.set_style(element, "border-collapse", "collapse"),
            Some(false) => dom.set_style(element, "border-collapse", "separate"),
            None => {}
        }
    }
}
