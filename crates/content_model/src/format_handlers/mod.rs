// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Converters between one DOM concern (a style, an attribute or a hidden
//! property) and one field of a format record.
//!
//! Every handler obeys two rules: `parse` writes nothing when the DOM
//! does not carry the concern, and `apply` writes nothing when the field
//! is unset. Applying a parsed format reproduces the DOM-visible state.

mod block;
mod common;
mod dark_color;
mod hidden;
mod link;
mod list;
mod segment;
mod table;

pub use block::{
    DirectionHandler, LineHeightHandler, TextAlignHandler, TextIndentHandler,
    VerticalAlignHandler, WhiteSpaceHandler, WordBreakHandler,
};
pub use common::{
    BackgroundColorHandler, BorderBoxHandler, BorderHandler, BoxShadowHandler,
    DatasetHandler, DisplayHandler, FloatHandler, IdHandler, MarginHandler,
    PaddingHandler, SizeHandler, TextColorHandler,
};
pub use dark_color::{retrieve_light_color, ColorPair, DarkColorFn, DarkColorHandler};
pub use hidden::{
    AdaptiveTextColorHandler, ImageMarkerHandler, ImageStateHandler,
    LinkUndeletableHandler, ParagraphMarkerHandler,
};
pub use link::{EntityHandler, LinkHandler};
pub use list::{ListStartNumberHandler, ListStylePositionHandler, ListStyleTypeHandler};
pub use segment::{
    apply_block_segment_format, BoldHandler, FontFamilyHandler, FontSizeHandler,
    ItalicHandler, LetterSpacingHandler, ScriptHandler, StrikethroughHandler,
    UnderlineHandler,
};
pub use table::{TableLayoutHandler, TableSpacingHandler};

use crate::dom::{Dom, NodeId};
use crate::model::{
    BlockFormat, CodeFormat, Direction, ImageFormat, LinkFormat, ListItemFormat,
    ListLevelFormat, SegmentFormat, TableCellFormat, TableFormat,
};

/// Environment both conversion directions share with format handlers.
#[derive(Clone, Debug)]
pub struct FormatContext {
    pub is_dark_mode: bool,
    pub dark_colors: DarkColorHandler,
    /// Direction of the enclosing block, used to resolve `left`/`right`.
    pub direction: Direction,
    pub zoom_scale: f64,
}

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            is_dark_mode: false,
            dark_colors: DarkColorHandler::default(),
            direction: Direction::Ltr,
            zoom_scale: 1.0,
        }
    }
}

impl FormatContext {
    pub(crate) fn render_color(&mut self, light: &str) -> String {
        self.dark_colors.render_color(light, self.is_dark_mode)
    }
}

pub trait FormatHandler {
    /// The part of a format record this handler owns.
    type Format: ?Sized;

    fn parse(format: &mut Self::Format, dom: &Dom, element: NodeId, context: &FormatContext);

    fn apply(format: &Self::Format, dom: &mut Dom, element: NodeId, context: &mut FormatContext);
}

/// A format record that knows which handlers make it up.
pub trait ContentFormat {
    fn parse_from(&mut self, dom: &Dom, element: NodeId, context: &FormatContext);

    fn apply_to(&self, dom: &mut Dom, element: NodeId, context: &mut FormatContext);
}

macro_rules! content_format {
    ($format:ty { $($handler:ty => $field:ident),* $(,)? }) => {
        impl ContentFormat for $format {
            fn parse_from(&mut self, dom: &Dom, element: NodeId, context: &FormatContext) {
                $(<$handler as FormatHandler>::parse(&mut self.$field, dom, element, context);)*
            }

            fn apply_to(&self, dom: &mut Dom, element: NodeId, context: &mut FormatContext) {
                $(<$handler as FormatHandler>::apply(&self.$field, dom, element, context);)*
            }
        }
    };
}

// Wrapping handlers (script to bold) go last and innermost first, so the
// element ends up as span > b > i > u > s > sub/sup > text.
content_format!(SegmentFormat {
    FontFamilyHandler => font_family,
    FontSizeHandler => font_size,
    TextColorHandler => text_color,
    BackgroundColorHandler => background_color,
    LetterSpacingHandler => letter_spacing,
    LineHeightHandler => line_height,
    AdaptiveTextColorHandler => adaptive_text_color,
    ScriptHandler => script,
    StrikethroughHandler => strikethrough,
    UnderlineHandler => underline,
    ItalicHandler => italic,
    BoldHandler => font_weight,
});

content_format!(BlockFormat {
    BackgroundColorHandler => background_color,
    DirectionHandler => direction,
    TextAlignHandler => text_align,
    MarginHandler => margin,
    PaddingHandler => padding,
    BorderHandler => borders,
    LineHeightHandler => line_height,
    WhiteSpaceHandler => white_space,
    TextIndentHandler => text_indent,
    SizeHandler => size,
});

content_format!(TableFormat {
    IdHandler => id,
    BackgroundColorHandler => background_color,
    DirectionHandler => direction,
    TextAlignHandler => text_align,
    MarginHandler => margin,
    BorderHandler => borders,
    SizeHandler => size,
    TableSpacingHandler => border_collapse,
    TableLayoutHandler => table_layout,
    BoxShadowHandler => box_shadow,
});

content_format!(TableCellFormat {
    BackgroundColorHandler => background_color,
    TextColorHandler => text_color,
    DirectionHandler => direction,
    TextAlignHandler => text_align,
    VerticalAlignHandler => vertical_align,
    WhiteSpaceHandler => white_space,
    WordBreakHandler => word_break,
    PaddingHandler => padding,
    BorderHandler => borders,
    SizeHandler => size,
    BorderBoxHandler => use_border_box,
});

content_format!(ListLevelFormat {
    ListStyleTypeHandler => list_style_type,
    ListStartNumberHandler => start_number,
    DirectionHandler => direction,
    TextAlignHandler => text_align,
    MarginHandler => margin,
    PaddingHandler => padding,
});

content_format!(ListItemFormat {
    DirectionHandler => direction,
    TextAlignHandler => text_align,
    LineHeightHandler => line_height,
    MarginHandler => margin,
    ListStylePositionHandler => list_style_position,
});

content_format!(ImageFormat {
    IdHandler => id,
    SizeHandler => size,
    MarginHandler => margin,
    PaddingHandler => padding,
    BorderHandler => borders,
    BoxShadowHandler => box_shadow,
    DisplayHandler => display,
    FloatHandler => float,
    VerticalAlignHandler => vertical_align,
    ImageStateHandler => image_state,
    ImageMarkerHandler => image_marker,
});

content_format!(CodeFormat {
    FontFamilyHandler => font_family,
});

impl ContentFormat for LinkFormat {
    fn parse_from(&mut self, dom: &Dom, element: NodeId, context: &FormatContext) {
        LinkHandler::parse(self, dom, element, context);
        LinkUndeletableHandler::parse(&mut self.undeletable, dom, element, context);
    }

    fn apply_to(&self, dom: &mut Dom, element: NodeId, context: &mut FormatContext) {
        LinkHandler::apply(self, dom, element, context);
        LinkUndeletableHandler::apply(&self.undeletable, dom, element, context);
    }
}

/// Parse a fresh format record of type `F` from `element`.
pub fn parse_format<F: ContentFormat + Default>(
    dom: &Dom,
    element: NodeId,
    context: &FormatContext,
) -> F {
    let mut format = F::default();
    format.parse_from(dom, element, context);
    format
}
