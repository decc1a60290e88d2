// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::add_segment;
use crate::dom::{Dom, DomSelection, NodeId};
use crate::dom_to_model::{DomToModelContext, ProcessorCategory};
use crate::format_handlers::{parse_format, ContentFormat};
use crate::model::{
    Block, Br, Code, Image, Link, LinkFormat, MergeFormat, ScriptPosition,
    Segment, SegmentFormat,
};

/// The segment format a formatting tag implies on its own.
pub(crate) fn tag_segment_format(tag: &str) -> SegmentFormat {
    let mut format = SegmentFormat::default();
    match tag {
        "b" | "strong" => format.font_weight = Some("bold".to_owned()),
        "i" | "em" => format.italic = Some(true),
        "u" => format.underline = Some(true),
        "s" | "strike" | "del" => format.strikethrough = Some(true),
        "sub" => format.script = Some(ScriptPosition::Sub),
        "sup" => format.script = Some(ScriptPosition::Super),
        _ => {}
    }
    format
}

/// Inline formatting elements: their format (and link or code decoration)
/// applies to every segment inside them.
pub fn known_inline_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let Some(tag) = dom.tag(element) else {
        return;
    };
    let scope = context.save_format();

    let mut format: SegmentFormat = parse_format(dom, element, &context.format);
    match tag {
        "a" => {
            let mut link = LinkFormat::default();
            link.parse_from(dom, element, &context.format);
            if link.href.is_some() || link.anchor_id.is_some() {
                context.link = Some(Link {
                    format: link,
                    dataset: dom.dataset(element),
                });
            }
        }
        "code" => {
            context.code = Some(Code {
                format: parse_format(dom, element, &context.format),
            });
            format.font_family = None;
        }
        _ => {}
    }
    context.segment_format.merge_from(&tag_segment_format(tag));
    context.segment_format.merge_from(&format);

    let child = context.processor(ProcessorCategory::Child);
    child(group, dom, element, context);

    context.restore_format(scope);
}

pub fn br_processor(
    group: &mut Vec<Block>,
    _dom: &Dom,
    _element: NodeId,
    context: &mut DomToModelContext,
) {
    let br = Br {
        format: context.segment_format.clone(),
        is_selected: context.is_in_selection,
    };
    add_segment(group, Segment::Br(br), context);
}

pub fn image_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let src = dom.get_attribute(element, "src").unwrap_or_default();
    let mut image = Image::new(src, context.segment_format.clone());
    image.alt = dom.get_attribute(element, "alt").map(String::from);
    image.title = dom.get_attribute(element, "title").map(String::from);
    image.image_format = parse_format(dom, element, &context.format);
    image.dataset = dom.dataset(element);
    image.link = context.link.clone();
    image.is_selected = context.is_in_selection;
    if matches!(context.selection, Some(DomSelection::Image { image: selected }) if selected == element)
    {
        image.is_selected = true;
        image.is_selected_as_image_selection = true;
    }
    add_segment(group, Segment::Image(image), context);
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn tags_imply_their_format() {
        assert_that!(tag_segment_format("strong").is_bold()).is_true();
        assert_that!(tag_segment_format("del").strikethrough).is_equal_to(Some(true));
        assert_that!(tag_segment_format("sup").script).is_equal_to(Some(ScriptPosition::Super));
        assert_that!(tag_segment_format("span")).is_equal_to(SegmentFormat::default());
    }
}
