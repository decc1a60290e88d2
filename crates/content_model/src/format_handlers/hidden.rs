// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Handlers backed by the hidden properties side table. They never touch
//! attributes, so none of this ends up in exported HTML.

use super::{FormatContext, FormatHandler};
use crate::dom::{Dom, NodeId};

macro_rules! hidden_string_handler {
    ($name:ident, $field:ident) => {
        pub struct $name;

        impl FormatHandler for $name {
            type Format = Option<String>;

            fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
                if let Some(value) = dom.hidden_properties(element).and_then(|p| p.$field.clone()) {
                    *format = Some(value);
                }
            }

            fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
                if let Some(value) = format {
                    dom.hidden_properties_mut(element).$field = Some(value.clone());
                }
            }
        }
    };
}

macro_rules! hidden_flag_handler {
    ($name:ident, $field:ident) => {
        pub struct $name;

        impl FormatHandler for $name {
            type Format = Option<bool>;

            fn parse(format: &mut Option<bool>, dom: &Dom, element: NodeId, _context: &FormatContext) {
                if dom.hidden_properties(element).is_some_and(|p| p.$field) {
                    *format = Some(true);
                }
            }

            fn apply(format: &Option<bool>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
                if *format == Some(true) {
                    dom.hidden_properties_mut(element).$field = true;
                }
            }
        }
    };
}

hidden_string_handler!(ImageStateHandler, image_state);
hidden_string_handler!(ImageMarkerHandler, image_marker);
hidden_string_handler!(ParagraphMarkerHandler, paragraph_marker);
hidden_flag_handler!(LinkUndeletableHandler, undeletable);
hidden_flag_handler!(AdaptiveTextColorHandler, adaptive_text_color);
