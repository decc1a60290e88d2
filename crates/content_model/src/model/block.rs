// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::NodeId;

use super::format::{BlockFormat, EntityInfo, SegmentFormat};
use super::{ListItem, Segment, Table};

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Divider(Divider),
    Entity(Entity),
    FormatContainer(FormatContainer),
    ListItem(ListItem),
    General(GeneralBlock),
}

impl Block {
    pub fn cached_element(&self) -> Option<NodeId> {
        match self {
            Block::Paragraph(b) => b.cached_element,
            Block::Table(b) => b.cached_element,
            Block::Divider(b) => b.cached_element,
            Block::Entity(b) => Some(b.wrapper),
            Block::FormatContainer(b) => b.cached_element,
            Block::ListItem(b) => b.cached_element,
            Block::General(b) => Some(b.element),
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Child blocks for the variants that are block groups.
    pub fn child_blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::FormatContainer(b) => Some(&mut b.blocks),
            Block::ListItem(b) => Some(&mut b.blocks),
            Block::General(b) => Some(&mut b.blocks),
            _ => None,
        }
    }

    pub fn child_blocks(&self) -> Option<&[Block]> {
        match self {
            Block::FormatContainer(b) => Some(&b.blocks),
            Block::ListItem(b) => Some(&b.blocks),
            Block::General(b) => Some(&b.blocks),
            _ => None,
        }
    }
}

/// The `p`/`h1`-`h6` tag a paragraph is wrapped in, with the segment
/// format that tag implies.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphDecorator {
    pub tag_name: String,
    pub format: SegmentFormat,
}

impl ParagraphDecorator {
    /// The decorator for a `p` or heading tag, carrying the font the tag
    /// gives its content by default.
    pub fn for_tag(tag: &str) -> Option<Self> {
        let (font_size, bold) = match tag {
            "p" => (None, false),
            "h1" => (Some("2em"), true),
            "h2" => (Some("1.5em"), true),
            "h3" => (Some("1.17em"), true),
            "h4" => (None, true),
            "h5" => (Some("0.83em"), true),
            "h6" => (Some("0.67em"), true),
            _ => return None,
        };
        Some(Self {
            tag_name: tag.to_owned(),
            format: SegmentFormat {
                font_size: font_size.map(String::from),
                font_weight: bold.then(|| "bold".to_owned()),
                ..Default::default()
            },
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub segments: Vec<Segment>,
    pub format: BlockFormat,
    /// Format shared by all segments, rendered on the block element.
    pub segment_format: SegmentFormat,
    pub decorator: Option<ParagraphDecorator>,
    /// Created for loose inline content. Rendered without a wrapper.
    pub is_implicit: bool,
    /// Paragraph marker kept in the hidden properties side table.
    pub marker: Option<String>,
    pub cached_element: Option<NodeId>,
}

impl Paragraph {
    pub fn new(is_implicit: bool) -> Self {
        Self {
            is_implicit,
            ..Default::default()
        }
    }

    pub fn with_format(is_implicit: bool, format: BlockFormat) -> Self {
        Self {
            is_implicit,
            format,
            ..Default::default()
        }
    }

    pub fn with_br() -> Self {
        let mut paragraph = Self::new(false);
        paragraph.segments.push(Segment::br(SegmentFormat::default()));
        paragraph
    }

    pub fn invalidate(&mut self) {
        self.cached_element = None;
    }

    pub fn has_selection(&self) -> bool {
        self.segments.iter().any(Segment::is_selected)
    }

    pub fn marker_index(&self) -> Option<usize> {
        self.segments.iter().position(Segment::is_marker)
    }

    /// Plain text of the paragraph, other segments ignored.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Divider {
    pub tag_name: String,
    pub format: BlockFormat,
    pub is_selected: bool,
    pub cached_element: Option<NodeId>,
}

impl Divider {
    pub fn new(tag_name: &str, format: BlockFormat) -> Self {
        Self {
            tag_name: tag_name.to_owned(),
            format,
            is_selected: false,
            cached_element: None,
        }
    }
}

/// A region of DOM owned by someone else. The model keeps the wrapper
/// element and never looks inside.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub wrapper: NodeId,
    pub info: EntityInfo,
    pub format: SegmentFormat,
    pub is_selected: bool,
}

impl Entity {
    pub fn new(wrapper: NodeId, info: EntityInfo) -> Self {
        Self {
            wrapper,
            info,
            format: SegmentFormat::default(),
            is_selected: false,
        }
    }
}

/// `blockquote`, `pre` and other containers that carry block format for
/// a run of blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatContainer {
    pub tag_name: String,
    pub blocks: Vec<Block>,
    pub format: BlockFormat,
    pub cached_element: Option<NodeId>,
}

impl FormatContainer {
    pub fn new(tag_name: &str, format: BlockFormat) -> Self {
        Self {
            tag_name: tag_name.to_owned(),
            blocks: Vec::new(),
            format,
            cached_element: None,
        }
    }
}

/// Block element the editor does not understand, re-rendered as a
/// shallow clone of `element`.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneralBlock {
    pub element: NodeId,
    pub blocks: Vec<Block>,
    pub format: BlockFormat,
    pub is_selected: bool,
}
