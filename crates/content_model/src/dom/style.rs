// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Inline style parsing helpers and default display rules.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Dom, NodeId};

/// Parse a `style` attribute into ordered `(property, value)` pairs.
/// Property names are lower cased; semicolons inside parentheses (for
/// example in `url(...)`) do not end a declaration.
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut declarations = Vec::new();
    for (i, c) in style.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                declarations.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    declarations.push(&style[start..]);

    for declaration in declarations {
        if let Some((name, value)) = declaration.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            match result.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value.to_owned(),
                None => result.push((name, value.to_owned())),
            }
        }
    }
    result
}

pub fn serialize_style(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand a one to four value box shorthand (`margin`, `padding`, ...)
/// into `[top, right, bottom, left]`.
pub fn expand_box_shorthand(value: &str) -> Option<[String; 4]> {
    let parts = split_css_values(value);
    let [top, right, bottom, left] = match parts.as_slice() {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return None,
    };
    Some([
        top.to_string(),
        right.to_string(),
        bottom.to_string(),
        left.to_string(),
    ])
}

/// Split a CSS value on whitespace, keeping function calls such as
/// `rgb(1, 2, 3)` in one piece.
pub fn split_css_values(value: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in value.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    result.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

static PIXEL_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)(px|pt|em|rem|%)?\s*$")
        .expect("pixel regex is valid")
});

/// Convert a CSS length into pixels. Unknown units give `None`.
pub fn parse_value_with_unit(value: &str, font_size_px: f64) -> Option<f64> {
    let captures = PIXEL_VALUE.captures(value)?;
    let number: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(match captures.get(2).map(|m| m.as_str()) {
        None | Some("px") => number,
        Some("pt") => number * 4.0 / 3.0,
        Some("em") | Some("rem") => number * font_size_px,
        Some("%") => return None,
        Some(_) => return None,
    })
}

/// Format a pixel count the way the editor writes lengths: no fraction
/// when the value is whole.
pub fn px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

const BLOCK_TAGS: [&str; 33] = [
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "dd",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
];

/// The display value an element gets without any stylesheet.
pub fn default_display(tag: &str) -> &'static str {
    match tag {
        "li" => "list-item",
        "table" => "table",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "tbody" | "thead" | "tfoot" => "table-row-group",
        "ul" => "block",
        "head" | "script" | "style" | "template" | "title" | "meta" => "none",
        t if BLOCK_TAGS.contains(&t) => "block",
        _ => "inline",
    }
}

impl Dom {
    /// Inline `display` if set, otherwise the default display of the tag.
    /// There is no cascade, so this is all a "computed" display can be.
    pub fn display(&self, id: NodeId) -> String {
        self.style(id, "display").unwrap_or_else(|| {
            self.tag(id)
                .map(default_display)
                .unwrap_or("inline")
                .to_owned()
        })
    }

    pub fn is_block_element(&self, id: NodeId) -> bool {
        let display = self.display(id);
        matches!(display.as_str(), "block" | "flex" | "list-item" | "table")
    }

    /// Whether an element is editable, following the `contenteditable`
    /// attribute up to the nearest ancestor that sets it.
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let decided = self.closest(id, None, |dom, n| {
            dom.get_attribute(n, "contenteditable").is_some()
        });
        match decided.and_then(|n| self.get_attribute(n, "contenteditable")) {
            Some(value) => value != "false",
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn parse_style_keeps_url_semicolons() {
        let styles = parse_style(
            "Color: red;background: url(data:image/png;base64,AAA) ; ;x:",
        );
        assert_that!(styles).is_equal_to(vec![
            ("color".to_owned(), "red".to_owned()),
            (
                "background".to_owned(),
                "url(data:image/png;base64,AAA)".to_owned(),
            ),
        ]);
    }

    #[test]
    fn box_shorthand_expands_like_css() {
        assert_that!(expand_box_shorthand("1px 2px 3px")).is_equal_to(Some([
            "1px".to_owned(),
            "2px".to_owned(),
            "3px".to_owned(),
            "2px".to_owned(),
        ]));
        assert_that!(expand_box_shorthand("")).is_none();
    }

    #[test]
    fn split_keeps_functions_together() {
        assert_that!(split_css_values("1px solid rgb(1, 2, 3)")).is_equal_to(
            vec![
                "1px".to_owned(),
                "solid".to_owned(),
                "rgb(1, 2, 3)".to_owned(),
            ],
        );
    }

    #[test]
    fn lengths_convert_to_pixels() {
        assert_that!(parse_value_with_unit("12pt", 16.0)).is_equal_to(Some(16.0));
        assert_that!(parse_value_with_unit("2em", 10.0)).is_equal_to(Some(20.0));
        assert_that!(parse_value_with_unit("auto", 10.0)).is_none();
        assert_that!(px(40.0)).is_equal_to("40px".to_owned());
    }

    #[test]
    fn content_editable_is_inherited() {
        let (mut dom, root) = Dom::with_root_html("<div><span>a</span></div>");
        let div = dom.first_child(root).unwrap();
        let span = dom.first_child(div).unwrap();
        assert_that!(dom.is_content_editable(span)).is_true();

        dom.set_attribute(div, "contenteditable", "false");
        assert_that!(dom.is_content_editable(span)).is_false();
    }
}
