// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Format fragments: records of optional CSS-like values.
//!
//! A `None` field means "not specified", which is different from any
//! default value. Formats merge shallowly through [MergeFormat] and two
//! formats are "the same" when every field compares equal.

use std::collections::BTreeMap;

use strum_macros::{AsRefStr, Display, EnumString};

/// Opaque `data-*` values of an element, keyed in camelCase.
pub type Dataset = BTreeMap<String, String>;

pub trait MergeFormat {
    /// Copy every field that is set in `other` into `self`.
    fn merge_from(&mut self, other: &Self);
}

macro_rules! merge_fields {
    ($target:ident, $source:ident; $($field:ident),* ; $($nested:ident),*) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field.clone();
            }
        )*
        $(
            $target.$nested.merge_from(&$source.$nested);
        )*
    };
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Four optional side values, as used by margin and padding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    pub top: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
}

impl Spacing {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The start side for the given direction: left in LTR, right in RTL.
    pub fn start_mut(&mut self, direction: Direction) -> &mut Option<String> {
        match direction {
            Direction::Ltr => &mut self.left,
            Direction::Rtl => &mut self.right,
        }
    }

    pub fn start(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Ltr => self.left.as_deref(),
            Direction::Rtl => self.right.as_deref(),
        }
    }
}

impl MergeFormat for Spacing {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(self, other; top, right, bottom, left;);
    }
}

/// Border shorthands (`1px solid red`) per side, plus the radius.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Borders {
    pub top: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
    pub radius: Option<String>,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl MergeFormat for Borders {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(self, other; top, right, bottom, left, radius;);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: Option<String>,
    pub height: Option<String>,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
    pub min_height: Option<String>,
    pub max_height: Option<String>,
}

impl MergeFormat for Size {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            width, height, min_width, max_width, min_height, max_height;
        );
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ScriptPosition {
    Super,
    Sub,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentFormat {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub script: Option<ScriptPosition>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub letter_spacing: Option<String>,
    pub line_height: Option<String>,
    /// `text_color` was set automatically against a table header
    /// background and may be removed again.
    pub adaptive_text_color: Option<bool>,
}

impl SegmentFormat {
    pub fn is_bold(&self) -> bool {
        match self.font_weight.as_deref() {
            Some("bold") | Some("bolder") => true,
            Some(weight) => weight.parse::<u32>().is_ok_and(|w| w >= 600),
            None => false,
        }
    }
}

impl MergeFormat for SegmentFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            font_family, font_size, font_weight, italic, underline,
            strikethrough, script, text_color, background_color,
            letter_spacing, line_height, adaptive_text_color;
        );
    }
}

/// Format of paragraphs, format containers, dividers and general blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockFormat {
    pub background_color: Option<String>,
    pub direction: Option<Direction>,
    pub text_align: Option<String>,
    pub margin: Spacing,
    pub padding: Spacing,
    pub borders: Borders,
    pub line_height: Option<String>,
    pub white_space: Option<String>,
    pub text_indent: Option<String>,
    pub size: Size,
}

impl BlockFormat {
    pub fn is_pre(&self) -> bool {
        matches!(
            self.white_space.as_deref(),
            Some("pre") | Some("pre-wrap") | Some("break-spaces")
        )
    }
}

impl MergeFormat for BlockFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            background_color, direction, text_align, line_height,
            white_space, text_indent;
            margin, padding, borders, size
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableFormat {
    pub id: Option<String>,
    pub background_color: Option<String>,
    pub direction: Option<Direction>,
    pub text_align: Option<String>,
    pub margin: Spacing,
    pub borders: Borders,
    pub size: Size,
    pub border_collapse: Option<bool>,
    pub table_layout: Option<String>,
    pub box_shadow: Option<String>,
}

impl MergeFormat for TableFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            id, background_color, direction, text_align, border_collapse,
            table_layout, box_shadow;
            margin, borders, size
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCellFormat {
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub direction: Option<Direction>,
    pub text_align: Option<String>,
    pub vertical_align: Option<String>,
    pub white_space: Option<String>,
    pub word_break: Option<String>,
    pub padding: Spacing,
    pub borders: Borders,
    pub size: Size,
    pub use_border_box: Option<bool>,
}

impl MergeFormat for TableCellFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            background_color, text_color, direction, text_align,
            vertical_align, white_space, word_break, use_border_box;
            padding, borders, size
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListLevelFormat {
    pub list_style_type: Option<String>,
    pub start_number: Option<u32>,
    pub direction: Option<Direction>,
    pub text_align: Option<String>,
    pub margin: Spacing,
    pub padding: Spacing,
}

impl MergeFormat for ListLevelFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            list_style_type, start_number, direction, text_align;
            margin, padding
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListItemFormat {
    pub direction: Option<Direction>,
    pub text_align: Option<String>,
    pub line_height: Option<String>,
    pub margin: Spacing,
    pub list_style_position: Option<String>,
}

impl MergeFormat for ListItemFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            direction, text_align, line_height, list_style_position;
            margin
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageFormat {
    pub id: Option<String>,
    pub size: Size,
    pub margin: Spacing,
    pub padding: Spacing,
    pub borders: Borders,
    pub box_shadow: Option<String>,
    pub display: Option<String>,
    pub float: Option<String>,
    pub vertical_align: Option<String>,
    pub image_state: Option<String>,
    pub image_marker: Option<String>,
}

impl MergeFormat for ImageFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            id, box_shadow, display, float, vertical_align, image_state,
            image_marker;
            size, margin, padding, borders
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkFormat {
    pub href: Option<String>,
    pub target: Option<String>,
    pub title: Option<String>,
    pub rel: Option<String>,
    pub class: Option<String>,
    pub anchor_id: Option<String>,
    pub undeletable: Option<bool>,
}

impl MergeFormat for LinkFormat {
    fn merge_from(&mut self, other: &Self) {
        merge_fields!(
            self, other;
            href, target, title, rel, class, anchor_id, undeletable;
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodeFormat {
    pub font_family: Option<String>,
}

/// Identity of an entity as carried by its wrapper's classes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityInfo {
    pub entity_type: Option<String>,
    pub id: Option<String>,
    pub is_readonly: bool,
    /// Wrappers recognised by the editor but not created through it.
    pub is_fake_entity: bool,
}
