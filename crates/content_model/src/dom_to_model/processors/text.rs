// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{add_segment, add_selection_marker};
use crate::dom::{Dom, DomSelection, NodeId};
use crate::dom_to_model::DomToModelContext;
use crate::model::{Block, Segment, Text};
use crate::utils::whitespace::{collapse_whitespace, is_collapsible_space_only};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Start,
    End,
}

/// Turn a text node into text segments. A selection boundary inside the
/// node splits the text there and puts a marker in between.
pub fn text_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext,
) {
    let Some(text) = dom.text(node) else {
        return;
    };
    let length = text.chars().count();

    let mut boundaries: Vec<(usize, Boundary)> = Vec::new();
    let mut is_collapsed = false;
    if let Some(DomSelection::Range { range, .. }) = &context.selection {
        is_collapsed = range.is_collapsed();
        if range.start.node == node {
            boundaries.push((range.start.offset.min(length), Boundary::Start));
        }
        if range.end.node == node {
            boundaries.push((range.end.offset.min(length), Boundary::End));
        }
    }
    boundaries.sort();

    let mut consumed = 0;
    for (offset, boundary) in boundaries {
        add_text_segment(group, &char_slice(text, consumed, offset), context);
        consumed = offset;
        match boundary {
            Boundary::Start => {
                context.is_in_selection = true;
                add_selection_marker(group, context);
            }
            Boundary::End => {
                if !is_collapsed {
                    add_selection_marker(group, context);
                }
                context.is_in_selection = false;
            }
        }
    }
    add_text_segment(group, &char_slice(text, consumed, length), context);
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

fn add_text_segment(group: &mut Vec<Block>, text: &str, context: &DomToModelContext) {
    if text.is_empty() {
        return;
    }

    let mut text = text.to_owned();
    if !context.block_format.is_pre() {
        let open_paragraph = match group.last() {
            Some(Block::Paragraph(p)) => Some(p),
            _ => None,
        };
        let opens_paragraph = open_paragraph.map_or(true, |p| p.is_implicit && p.segments.is_empty());
        if opens_paragraph && is_collapsible_space_only(&text) {
            return;
        }

        text = collapse_whitespace(&text);
        let follows_space = open_paragraph
            .and_then(|p| p.segments.iter().rev().find(|s| !s.is_marker()))
            .map_or(true, |last| match last {
                Segment::Text(t) => t.text.ends_with(' '),
                Segment::Br(_) => true,
                _ => false,
            });
        if follows_space && text.starts_with(' ') {
            text.remove(0);
        }
        if text.is_empty() {
            return;
        }
    }

    let segment = Text {
        text,
        format: context.segment_format.clone(),
        is_selected: context.is_in_selection,
        link: context.link.clone(),
        code: context.code.clone(),
    };
    add_segment(group, Segment::Text(segment), context);
}
