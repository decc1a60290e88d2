// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! DOM to model conversion. A depth first walk where each element is
//! handed to the processor registered for its category; processors either
//! open a block (or block group) and recurse, or append segments to the
//! paragraph that is open in the current group.

mod context;
pub mod processors;

pub use context::{
    category_of_tag, DomToModelContext, DomToModelOptions, ElementProcessor,
    FormatScope, ProcessorCategory, ProcessorMap,
};

use crate::dom::{Dom, NodeId};
use crate::format_handlers::{DirectionHandler, FormatHandler};
use crate::model::{normalize_content_model, ContentModelDocument};

/// Convert the children of `root` into a normalized model. Selection in
/// `context` is projected onto markers and `is_selected` flags.
pub fn dom_to_content_model(
    dom: &Dom,
    root: NodeId,
    context: &mut DomToModelContext,
) -> ContentModelDocument {
    let mut model = ContentModelDocument::with_format(context.segment_format.clone());

    let mut direction = None;
    DirectionHandler::parse(&mut direction, dom, root, &context.format);
    if let Some(direction) = direction {
        context.format.direction = direction;
    }
    context.is_in_selection = false;

    let child = context.processor(ProcessorCategory::Child);
    child(&mut model.blocks, dom, root, context);
    normalize_content_model(&mut model.blocks, &model.format);
    model
}
