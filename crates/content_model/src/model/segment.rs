// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::NodeId;

use super::format::{
    CodeFormat, Dataset, ImageFormat, LinkFormat, SegmentFormat,
};
use super::{Block, Entity};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Link {
    pub format: LinkFormat,
    pub dataset: Dataset,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Code {
    pub format: CodeFormat,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Text {
    pub text: String,
    pub format: SegmentFormat,
    pub is_selected: bool,
    pub link: Option<Link>,
    pub code: Option<Code>,
}

impl Text {
    pub fn new(text: &str, format: SegmentFormat) -> Self {
        Self {
            text: text.to_owned(),
            format,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Br {
    pub format: SegmentFormat,
    pub is_selected: bool,
}

/// Zero width stand-in for the caret, or for one end of a selection.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionMarker {
    pub format: SegmentFormat,
    pub is_selected: bool,
}

impl SelectionMarker {
    pub fn new(format: SegmentFormat) -> Self {
        Self {
            format,
            is_selected: true,
        }
    }
}

impl Default for SelectionMarker {
    fn default() -> Self {
        Self::new(SegmentFormat::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub src: String,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub format: SegmentFormat,
    pub image_format: ImageFormat,
    pub dataset: Dataset,
    pub is_selected: bool,
    /// Selected as a whole image rather than as part of a text range.
    pub is_selected_as_image_selection: bool,
    pub link: Option<Link>,
}

impl Image {
    pub fn new(src: &str, format: SegmentFormat) -> Self {
        Self {
            src: src.to_owned(),
            format,
            ..Default::default()
        }
    }
}

/// Inline element the editor does not understand. It is kept by
/// reference (its shallow clone is re-rendered) together with its content.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneralSegment {
    pub element: NodeId,
    pub blocks: Vec<Block>,
    pub format: SegmentFormat,
    pub is_selected: bool,
    pub link: Option<Link>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Text(Text),
    Br(Br),
    SelectionMarker(SelectionMarker),
    Image(Image),
    General(GeneralSegment),
    Entity(Entity),
}

impl Segment {
    pub fn text(text: &str, format: SegmentFormat) -> Self {
        Self::Text(Text::new(text, format))
    }

    pub fn br(format: SegmentFormat) -> Self {
        Self::Br(Br {
            format,
            is_selected: false,
        })
    }

    pub fn marker(format: SegmentFormat) -> Self {
        Self::SelectionMarker(SelectionMarker::new(format))
    }

    pub fn format(&self) -> &SegmentFormat {
        match self {
            Self::Text(s) => &s.format,
            Self::Br(s) => &s.format,
            Self::SelectionMarker(s) => &s.format,
            Self::Image(s) => &s.format,
            Self::General(s) => &s.format,
            Self::Entity(s) => &s.format,
        }
    }

    pub fn format_mut(&mut self) -> &mut SegmentFormat {
        match self {
            Self::Text(s) => &mut s.format,
            Self::Br(s) => &mut s.format,
            Self::SelectionMarker(s) => &mut s.format,
            Self::Image(s) => &mut s.format,
            Self::General(s) => &mut s.format,
            Self::Entity(s) => &mut s.format,
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            Self::Text(s) => s.is_selected,
            Self::Br(s) => s.is_selected,
            Self::SelectionMarker(s) => s.is_selected,
            Self::Image(s) => s.is_selected,
            Self::General(s) => s.is_selected,
            Self::Entity(s) => s.is_selected,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Self::Text(s) => s.is_selected = selected,
            Self::Br(s) => s.is_selected = selected,
            Self::SelectionMarker(s) => s.is_selected = selected,
            Self::Image(s) => {
                s.is_selected = selected;
                if !selected {
                    s.is_selected_as_image_selection = false;
                }
            }
            Self::General(s) => s.is_selected = selected,
            Self::Entity(s) => s.is_selected = selected,
        }
    }

    pub fn link(&self) -> Option<&Link> {
        match self {
            Self::Text(s) => s.link.as_ref(),
            Self::Image(s) => s.link.as_ref(),
            Self::General(s) => s.link.as_ref(),
            _ => None,
        }
    }

    pub fn link_mut(&mut self) -> Option<&mut Option<Link>> {
        match self {
            Self::Text(s) => Some(&mut s.link),
            Self::Image(s) => Some(&mut s.link),
            Self::General(s) => Some(&mut s.link),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&Code> {
        match self {
            Self::Text(s) => s.code.as_ref(),
            _ => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Self::SelectionMarker(_))
    }
}
