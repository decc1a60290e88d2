// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::processors;
use crate::dom::{Dom, DomSelection, NodeId};
use crate::format_handlers::FormatContext;
use crate::model::{Block, BlockFormat, Code, Link, ListLevel, SegmentFormat};

/// Builds model content for one DOM node into the given block group.
pub type ElementProcessor = fn(&mut Vec<Block>, &Dom, NodeId, &mut DomToModelContext);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum ProcessorCategory {
    /// Picks the processor for an element.
    Element,
    /// Walks the children of a node, tracking the selection.
    Child,
    Text,
    Entity,
    Delimiter,
    /// Placeholder text shown by plugins, never part of the content.
    HintText,
    General,
    KnownInline,
    KnownBlock,
    FormatContainer,
    Br,
    Image,
    Divider,
    List,
    ListItem,
    Table,
}

/// Processor lookup: one processor per category, plus per-tag overrides
/// that take precedence over the category a tag would normally map to.
#[derive(Clone)]
pub struct ProcessorMap {
    categories: HashMap<ProcessorCategory, ElementProcessor>,
    tags: HashMap<String, ElementProcessor>,
}

impl std::fmt::Debug for ProcessorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorMap")
            .field("overridden_tags", &self.tags.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ProcessorMap {
    fn default() -> Self {
        use ProcessorCategory::*;
        let categories: [(ProcessorCategory, ElementProcessor); 16] = [
            (Element, processors::element_processor),
            (Child, processors::child_processor),
            (Text, processors::text_processor),
            (Entity, processors::entity_processor),
            (Delimiter, processors::skip_processor),
            (HintText, processors::skip_processor),
            (General, processors::general_processor),
            (KnownInline, processors::known_inline_processor),
            (KnownBlock, processors::known_block_processor),
            (FormatContainer, processors::format_container_processor),
            (Br, processors::br_processor),
            (Image, processors::image_processor),
            (Divider, processors::divider_processor),
            (List, processors::list_processor),
            (ListItem, processors::list_item_processor),
            (Table, processors::table_processor),
        ];
        Self {
            categories: categories.into_iter().collect(),
            tags: HashMap::new(),
        }
    }
}

impl ProcessorMap {
    pub fn get(&self, category: ProcessorCategory) -> ElementProcessor {
        self.categories
            .get(&category)
            .copied()
            .unwrap_or(processors::skip_processor)
    }

    pub fn set(&mut self, category: ProcessorCategory, processor: ElementProcessor) {
        self.categories.insert(category, processor);
    }

    pub fn set_for_tag(&mut self, tag: &str, processor: ElementProcessor) {
        self.tags.insert(tag.to_ascii_lowercase(), processor);
    }

    pub fn tag_override(&self, tag: &str) -> Option<ElementProcessor> {
        self.tags.get(tag).copied()
    }

    /// The processor for an element with tag `tag`.
    pub fn for_tag(&self, tag: &str) -> ElementProcessor {
        self.tag_override(tag)
            .unwrap_or_else(|| self.get(category_of_tag(tag)))
    }
}

pub fn category_of_tag(tag: &str) -> ProcessorCategory {
    use ProcessorCategory::*;
    match tag {
        "a" | "b" | "strong" | "i" | "em" | "u" | "s" | "strike" | "del" | "ins"
        | "sub" | "sup" | "code" | "span" | "font" | "small" | "label" => KnownInline,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "section"
        | "article" | "header" | "footer" | "main" | "center" | "address"
        | "aside" | "nav" => KnownBlock,
        "blockquote" | "pre" => FormatContainer,
        "br" => Br,
        "img" => Image,
        "hr" => Divider,
        "ol" | "ul" => List,
        "li" => ListItem,
        "table" => Table,
        _ => General,
    }
}

#[derive(Clone, Debug, Default)]
pub struct DomToModelOptions {
    /// Remember the source element of blocks so rendering can reuse it.
    pub allow_cache_element: bool,
    /// Turn leading whitespace of list items into indentation.
    pub process_virtual_indentation: bool,
    /// Skip elements that are not content editable (entities excepted).
    pub editable_only: bool,
    pub processors: ProcessorMap,
}

/// The part of the context that is scoped to an element and restored
/// when leaving it.
#[derive(Clone, Debug)]
pub struct FormatScope {
    segment_format: SegmentFormat,
    block_format: BlockFormat,
    link: Option<Link>,
    code: Option<Code>,
    direction: crate::model::Direction,
}

#[derive(Clone, Debug)]
pub struct DomToModelContext {
    pub format: FormatContext,
    pub options: DomToModelOptions,
    /// Segment format inherited by content at the current position.
    pub segment_format: SegmentFormat,
    /// Inheritable block format (direction, alignment, line height,
    /// white space) at the current position.
    pub block_format: BlockFormat,
    pub link: Option<Link>,
    pub code: Option<Code>,
    pub list_levels: Vec<ListLevel>,
    pub(crate) nested_list_items: Vec<Block>,
    pub(crate) list_item_depth: usize,
    pub is_in_selection: bool,
    pub selection: Option<DomSelection>,
}

impl DomToModelContext {
    pub fn new(options: DomToModelOptions, format: FormatContext) -> Self {
        Self {
            format,
            options,
            segment_format: SegmentFormat::default(),
            block_format: BlockFormat::default(),
            link: None,
            code: None,
            list_levels: Vec::new(),
            nested_list_items: Vec::new(),
            list_item_depth: 0,
            is_in_selection: false,
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: Option<DomSelection>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_default_format(mut self, format: SegmentFormat) -> Self {
        self.segment_format = format;
        self
    }

    pub fn processor(&self, category: ProcessorCategory) -> ElementProcessor {
        self.options.processors.get(category)
    }

    pub fn save_format(&self) -> FormatScope {
        FormatScope {
            segment_format: self.segment_format.clone(),
            block_format: self.block_format.clone(),
            link: self.link.clone(),
            code: self.code.clone(),
            direction: self.format.direction,
        }
    }

    pub fn restore_format(&mut self, scope: FormatScope) {
        self.segment_format = scope.segment_format;
        self.block_format = scope.block_format;
        self.link = scope.link;
        self.code = scope.code;
        self.format.direction = scope.direction;
    }

    /// Carry the inheritable part of `format` down to descendants.
    pub fn inherit_block_format(&mut self, format: &BlockFormat) {
        if let Some(direction) = format.direction {
            self.block_format.direction = Some(direction);
            self.format.direction = direction;
        }
        for (target, source) in [
            (&mut self.block_format.text_align, &format.text_align),
            (&mut self.block_format.line_height, &format.line_height),
            (&mut self.block_format.white_space, &format.white_space),
        ] {
            if source.is_some() {
                *target = source.clone();
            }
        }
    }

    /// A fresh block format holding only what is inherited.
    pub fn inherited_block_format(&self) -> BlockFormat {
        self.block_format.clone()
    }

    /// Start a block group that lists do not escape from, such as a table
    /// cell. Lists inside it start again at the first level.
    pub(crate) fn enter_isolated_group(&mut self) -> ListScope {
        ListScope {
            levels: std::mem::take(&mut self.list_levels),
            item_depth: std::mem::replace(&mut self.list_item_depth, 0),
            nested_items: std::mem::take(&mut self.nested_list_items),
        }
    }

    pub(crate) fn leave_isolated_group(&mut self, scope: ListScope) {
        self.list_levels = scope.levels;
        self.list_item_depth = scope.item_depth;
        self.nested_list_items = scope.nested_items;
    }
}

pub(crate) struct ListScope {
    levels: Vec<ListLevel>,
    item_depth: usize,
    nested_items: Vec<Block>,
}
