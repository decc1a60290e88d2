// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{retrieve_light_color, FormatContext, FormatHandler};
use crate::dom::style::expand_box_shorthand;
use crate::dom::{Dom, NodeId};
use crate::model::{Borders, Dataset, Size, Spacing};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Read an inline style into `format` if it is set.
pub(super) fn parse_style_into(format: &mut Option<String>, dom: &Dom, element: NodeId, property: &str) {
    if let Some(value) = dom.style(element, property) {
        *format = Some(value);
    }
}

pub(super) fn apply_style_from(format: &Option<String>, dom: &mut Dom, element: NodeId, property: &str) {
    if let Some(value) = format {
        dom.set_style(element, property, value);
    }
}

/// Handlers that map one field straight to one inline style property.
macro_rules! style_handler {
    ($name:ident, $property:literal) => {
        pub struct $name;

        impl FormatHandler for $name {
            type Format = Option<String>;

            fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
                $crate::format_handlers::common::parse_style_into(format, dom, element, $property);
            }

            fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
                $crate::format_handlers::common::apply_style_from(format, dom, element, $property);
            }
        }
    };
}
pub(super) use style_handler;

style_handler!(DisplayHandler, "display");
style_handler!(FloatHandler, "float");
style_handler!(BoxShadowHandler, "box-shadow");

pub struct BackgroundColorHandler;

impl FormatHandler for BackgroundColorHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        let value = dom
            .style(element, "background-color")
            .or_else(|| dom.get_attribute(element, "bgcolor").map(String::from));
        if let Some(value) = value {
            *format = Some(retrieve_light_color(&value));
        }
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, context: &mut FormatContext) {
        if let Some(color) = format {
            let rendered = context.render_color(color);
            dom.set_style(element, "background-color", &rendered);
        }
    }
}

pub struct TextColorHandler;

impl FormatHandler for TextColorHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        let legacy = || {
            dom.is_tag(element, "font")
                .then(|| dom.get_attribute(element, "color").map(String::from))
                .flatten()
        };
        if let Some(value) = dom.style(element, "color").or_else(legacy) {
            *format = Some(retrieve_light_color(&value));
        }
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, context: &mut FormatContext) {
        if let Some(color) = format {
            let rendered = context.render_color(color);
            dom.set_style(element, "color", &rendered);
        }
    }
}

pub struct BorderHandler;

impl FormatHandler for BorderHandler {
    type Format = Borders;

    fn parse(format: &mut Borders, dom: &Dom, element: NodeId, _context: &FormatContext) {
        let all = dom.style(element, "border");
        let targets = [&mut format.top, &mut format.right, &mut format.bottom, &mut format.left];
        for (side, target) in SIDES.iter().zip(targets) {
            if let Some(value) = dom.style(element, &format!("border-{side}")).or_else(|| all.clone()) {
                *target = Some(value);
            }
        }
        parse_style_into(&mut format.radius, dom, element, "border-radius");
    }

    fn apply(format: &Borders, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        let values = [&format.top, &format.right, &format.bottom, &format.left];
        for (side, value) in SIDES.iter().zip(values) {
            apply_style_from(value, dom, element, &format!("border-{side}"));
        }
        apply_style_from(&format.radius, dom, element, "border-radius");
    }
}

pub struct BorderBoxHandler;

impl FormatHandler for BorderBoxHandler {
    type Format = Option<bool>;

    fn parse(format: &mut Option<bool>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(value) = dom.style(element, "box-sizing") {
            *format = Some(value == "border-box");
        }
    }

    fn apply(format: &Option<bool>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if *format == Some(true) {
            dom.set_style(element, "box-sizing", "border-box");
        }
    }
}

fn parse_spacing(format: &mut Spacing, dom: &Dom, element: NodeId, property: &str) {
    if let Some(expanded) = dom.style(element, property).as_deref().and_then(expand_box_shorthand) {
        let [top, right, bottom, left] = expanded;
        format.top = Some(top);
        format.right = Some(right);
        format.bottom = Some(bottom);
        format.left = Some(left);
    }
    let targets = [&mut format.top, &mut format.right, &mut format.bottom, &mut format.left];
    for (side, target) in SIDES.iter().zip(targets) {
        parse_style_into(target, dom, element, &format!("{property}-{side}"));
    }
}

fn apply_spacing(format: &Spacing, dom: &mut Dom, element: NodeId, property: &str) {
    let values = [&format.top, &format.right, &format.bottom, &format.left];
    for (side, value) in SIDES.iter().zip(values) {
        apply_style_from(value, dom, element, &format!("{property}-{side}"));
    }
}

pub struct MarginHandler;

impl FormatHandler for MarginHandler {
    type Format = Spacing;

    fn parse(format: &mut Spacing, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_spacing(format, dom, element, "margin");
    }

    fn apply(format: &Spacing, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        apply_spacing(format, dom, element, "margin");
    }
}

pub struct PaddingHandler;

impl FormatHandler for PaddingHandler {
    type Format = Spacing;

    fn parse(format: &mut Spacing, dom: &Dom, element: NodeId, _context: &FormatContext) {
        parse_spacing(format, dom, element, "padding");
    }

    fn apply(format: &Spacing, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        apply_spacing(format, dom, element, "padding");
    }
}

/// Width and height from styles, falling back to the legacy `width` and
/// `height` attributes.
pub struct SizeHandler;

impl SizeHandler {
    fn parse_dimension(target: &mut Option<String>, dom: &Dom, element: NodeId, name: &str) {
        if let Some(value) = dom.style(element, name) {
            *target = Some(value);
        } else if let Some(attr) = dom.get_attribute(element, name) {
            let attr = attr.trim();
            if !attr.is_empty() && attr.chars().all(|c| c.is_ascii_digit() || c == '.') {
                *target = Some(format!("{attr}px"));
            } else if attr.ends_with('%') || attr.ends_with("px") {
                *target = Some(attr.to_owned());
            }
        }
    }
}

impl FormatHandler for SizeHandler {
    type Format = Size;

    fn parse(format: &mut Size, dom: &Dom, element: NodeId, _context: &FormatContext) {
        Self::parse_dimension(&mut format.width, dom, element, "width");
        Self::parse_dimension(&mut format.height, dom, element, "height");
        parse_style_into(&mut format.min_width, dom, element, "min-width");
        parse_style_into(&mut format.max_width, dom, element, "max-width");
        parse_style_into(&mut format.min_height, dom, element, "min-height");
        parse_style_into(&mut format.max_height, dom, element, "max-height");
    }

    fn apply(format: &Size, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        apply_style_from(&format.width, dom, element, "width");
        apply_style_from(&format.height, dom, element, "height");
        apply_style_from(&format.min_width, dom, element, "min-width");
        apply_style_from(&format.max_width, dom, element, "max-width");
        apply_style_from(&format.min_height, dom, element, "min-height");
        apply_style_from(&format.max_height, dom, element, "max-height");
    }
}

pub struct IdHandler;

impl FormatHandler for IdHandler {
    type Format = Option<String>;

    fn parse(format: &mut Option<String>, dom: &Dom, element: NodeId, _context: &FormatContext) {
        if let Some(id) = dom.get_attribute(element, "id").filter(|id| !id.is_empty()) {
            *format = Some(id.to_owned());
        }
    }

    fn apply(format: &Option<String>, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        if let Some(id) = format {
            dom.set_attribute(element, "id", id);
        }
    }
}

pub struct DatasetHandler;

impl FormatHandler for DatasetHandler {
    type Format = Dataset;

    fn parse(format: &mut Dataset, dom: &Dom, element: NodeId, _context: &FormatContext) {
        format.extend(dom.dataset(element));
    }

    fn apply(format: &Dataset, dom: &mut Dom, element: NodeId, _context: &mut FormatContext) {
        for (key, value) in format {
            dom.set_dataset_value(element, key, value);
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    fn element(html: &str) -> (Dom, NodeId) {
        let (dom, root) = Dom::with_root_html(html);
        let first = dom.first_child(root).unwrap();
        (dom, first)
    }

    #[test]
    fn margin_shorthand_is_overridden_by_longhands() {
        let (dom, div) = element(r#"<div style="margin: 1px 2px; margin-left: 40px">a</div>"#);
        let mut spacing = Spacing::default();
        MarginHandler::parse(&mut spacing, &dom, div, &FormatContext::default());

        assert_that!(spacing).is_equal_to(Spacing {
            top: Some("1px".into()),
            right: Some("2px".into()),
            bottom: Some("1px".into()),
            left: Some("40px".into()),
        });
    }

    #[test]
    fn border_shorthand_applies_to_every_side() {
        let (dom, td) = element(r#"<span style="border: 1px solid red; border-left: none">a</span>"#);
        let mut borders = Borders::default();
        BorderHandler::parse(&mut borders, &dom, td, &FormatContext::default());

        assert_that!(borders.top.as_deref()).is_equal_to(Some("1px solid red"));
        assert_that!(borders.left.as_deref()).is_equal_to(Some("none"));
    }

    #[test]
    fn size_reads_legacy_attributes() {
        let (dom, img) = element(r#"<img width="100" style="height: 20px">"#);
        let mut size = Size::default();
        SizeHandler::parse(&mut size, &dom, img, &FormatContext::default());

        assert_that!(size.width.as_deref()).is_equal_to(Some("100px"));
        assert_that!(size.height.as_deref()).is_equal_to(Some("20px"));
    }

    #[test]
    fn background_color_in_dark_mode_registers_the_color() {
        let mut dom = Dom::new();
        let div = dom.create_element("div");
        let mut context = FormatContext {
            is_dark_mode: true,
            ..Default::default()
        };
        BackgroundColorHandler::apply(&Some("#000000".into()), &mut dom, div, &mut context);

        assert_that!(context.dark_colors.known_colors().len()).is_equal_to(1);
        let mut parsed = None;
        BackgroundColorHandler::parse(&mut parsed, &dom, div, &context);
        assert_that!(parsed.as_deref()).is_equal_to(Some("#000000"));
    }

    #[test]
    fn dataset_round_trips() {
        let (dom, div) = element(r#"<div data-editing-info="{}" data-x="1">a</div>"#);
        let mut dataset = Dataset::new();
        DatasetHandler::parse(&mut dataset, &dom, div, &FormatContext::default());
        assert_that!(dataset.get("editingInfo").map(String::as_str)).is_equal_to(Some("{}"));

        let mut out = Dom::new();
        let target = out.create_element("div");
        DatasetHandler::apply(&dataset, &mut out, target, &mut FormatContext::default());
        assert_that!(out.get_attribute(target, "data-editing-info")).is_equal_to(Some("{}"));
    }
}
