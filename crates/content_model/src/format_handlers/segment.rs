// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::common::{apply_style_from, parse_style_into, style_handler};
use super::{FormatContext, FormatHandler, TextColorHandler};
use crate::dom::{Dom, NodeId};
use crate::model::{ScriptPosition, SegmentFormat};

style_handler!(LetterSpacingHandler, "letter-spacing");

const FONT_TAG_SIZES: [&str; 7] = ["10px", "13px", "16px", "18px", "24px", "32px", "48px"];

fn legacy_font_attr<'a>(dom: &'a Dom, element: NodeId, name: &str) -> Option<&'a str> {
    if dom.is_tag(element, "font") {
        dom.get_attribute(element, name)
    } else {
        None
    }
}

pub struct FontFamilyHandler;

impl FormatHandler for FontFamilyHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_style_into(format, dom, element, "font-family");
        if format.is_none() {
            if let Some(face) = legacy_font_attr(dom, element, "face") {
                *format = Some(face.to_owned());
            }
        }
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        apply_style_from(format, dom, element, "font-family");
    }
}

pub struct FontSizeHandler;

impl FormatHandler for FontSizeHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(size) = dom.style(element, "font-size") {
            *format = Some(size);
        } else if let Some(size) = legacy_font_attr(dom, element, "size") {
            let index = size.trim().parse::<usize>().ok().map(|s| s.clamp(1, 7) - 1);
            if let Some(index) = index {
                *format = Some(FONT_TAG_SIZES[index].to_owned());
            }
        }
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        apply_style_from(format, dom, element, "font-size");
    }
}

/// `font-weight`. Plain `bold` renders as a `<b>` inside the element,
/// anything else as a style.
pub struct BoldHandler;

impl FormatHandler for BoldHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_style_into(format, dom, element, "font-weight");
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        match format.as_deref() {
            Some("bold") => {
                dom.wrap_all_children(element, "b");
            }
            Some(weight) => dom.set_style(element, "font-weight", weight),
            None => {}
        }
    }
}

pub struct ItalicHandler;

impl FormatHandler for ItalicHandler {
    type Format = Option<bool>;

    fn parse(format: &mut Option<bool>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(style) = dom.style(element, "font-style") {
            *format = Some(style == "italic" || style == "oblique");
        }
    }

    fn apply(format: &Option<bool>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        match format {
            Some(true) => {
                dom.wrap_all_children(element, "i");
            }
            Some(false) => dom.set_style(element, "font-style", "normal"),
            None => {}
        }
    }
}

fn text_decoration(dom: &Dom, element: NodeId) -> Option<String> {
    dom.style(element, "text-decoration")
        .or_else(|| dom.style(element, "text-decoration-line"))
}

fn parse_decoration(format: &mut Option<bool>, dom: &Dom, element: NodeId, line: &str) {
    if let Some(decoration) = text_decoration(dom, element) {
        if decoration.contains(line) {
            *format = Some(true);
        } else if decoration == "none" {
            *format = Some(false);
        }
    }
}

pub struct UnderlineHandler;

impl FormatHandler for UnderlineHandler {
    type Format = Option<bool>;

    fn parse(format: &mut Option<bool>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_decoration(format, dom, element, "underline");
    }

    fn apply(format: &Option<bool>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        match format {
            Some(true) => {
                dom.wrap_all_children(element, "u");
            }
            Some(false) => dom.set_style(element, "text-decoration", "none"),
            None => {}
        }
    }
}

pub struct StrikethroughHandler;

impl FormatHandler for StrikethroughHandler {
    type Format = Option<bool>;

    fn parse(format: &mut Option<bool>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_decoration(format, dom, element, "line-through");
    }

    fn apply(format: &Option<bool>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        match format {
            Some(true) => {
                dom.wrap_all_children(element, "s");
            }
            Some(false) => dom.set_style(element, "text-decoration", "none"),
            None => {}
        }
    }
}

pub struct ScriptHandler;

impl FormatHandler for ScriptHandler {
    type Format = Option<ScriptPosition>;

    fn parse(format: &mut Option<ScriptPosition>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(position) = dom.style(element, "vertical-align").and_then(|v| v.parse().ok()) {
            *format = Some(position);
        }
    }

    fn apply(format: &Option<ScriptPosition>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        match format {
            Some(ScriptPosition::Super) => {
                dom.wrap_all_children(element, "sup");
            }
            Some(ScriptPosition::Sub) => {
                dom.wrap_all_children(element, "sub");
            }
            None => {}
        }
    }
}

/// Write the segment format a block shares with all its segments onto the
/// block element. Block elements take styles only, never wrapper tags.
pub fn apply_block_segment_format(
    format: &SegmentFormat,
    dom: &mut Dom,
    element: NodeId,
    context: &mut FormatContext,
) {
    FontFamilyHandler::apply(&format.font_family, dom, element, context);
    FontSizeHandler::apply(&format.font_size, dom, element, context);
    TextColorHandler::apply(&format.text_color, dom, element, context);
    LetterSpacingHandler::apply(&format.letter_spacing, dom, element, context);
    if let Some(weight) = &format.font_weight {
        dom.set_style(element, "font-weight", weight);
    }
    if let Some(italic) = format.italic {
        dom.set_style(element, "font-style", if italic { "italic" } else { "normal" });
    }
    let lines: Vec<&str> = [
        (format.underline == Some(true)).then_some("underline"),
        (format.strikethrough == Some(true)).then_some("line-through"),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !lines.is_empty() {
        dom.set_style(element, "text-decoration", &lines.join(" "));
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::format_handlers::{parse_format, ContentFormat};

    #[test]
    fn font_tag_attributes_are_understood() {
        let (dom, root) = Dom::with_root_html(r#"<font face="Arial" size="5" color="red">a</font>"#);
        let font = dom.first_child(root).unwrap();
        let format: SegmentFormat = parse_format(&dom, font, &FormatContext::default());

        assert_that!(format.font_family.as_deref()).is_equal_to(Some("Arial"));
        assert_that!(format.font_size.as_deref()).is_equal_to(Some("24px"));
        assert_that!(format.text_color.as_deref()).is_equal_to(Some("red"));
    }

    #[test]
    fn decorations_parse_from_one_style() {
        let (dom, root) =
            Dom::with_root_html(r#"<span style="text-decoration: underline line-through">a</span>"#);
        let span = dom.first_child(root).unwrap();
        let format: SegmentFormat = parse_format(&dom, span, &FormatContext::default());

        assert_that!(format.underline).is_equal_to(Some(true));
        assert_that!(format.strikethrough).is_equal_to(Some(true));
    }

    #[test]
    fn non_bold_weight_is_a_style() {
        let mut dom = Dom::new();
        let span = dom.create_element("span");
        let format = SegmentFormat {
            font_weight: Some("normal".into()),
            ..Default::default()
        };
        format.apply_to(&mut dom, span, &mut FormatContext::default());
        assert_that!(dom.style(span, "font-weight")).is_equal_to(Some("normal".to_owned()));
    }

    #[test]
    fn block_segment_format_uses_styles_only() {
        let mut dom = Dom::new();
        let div = dom.create_element("div");
        let format = SegmentFormat {
            font_weight: Some("bold".into()),
            underline: Some(true),
            ..Default::default()
        };
        apply_block_segment_format(&format, &mut dom, div, &mut FormatContext::default());

        assert_that!(dom.outer_html(div)).is_equal_to(
            r#"<div style="font-weight: bold; text-decoration: underline;"></div>"#.to_owned(),
        );
        let reparsed: SegmentFormat = parse_format(&dom, div, &FormatContext::default());
        assert_that!(reparsed).is_equal_to(format);
    }
}
