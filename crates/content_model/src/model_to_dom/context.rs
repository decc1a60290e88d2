// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::fmt;
use std::rc::Rc;

use crate::dom::{Dom, DomPosition, NodeId};
use crate::format_handlers::FormatContext;
use crate::model::{
    BlockFormat, Divider, Entity, FormatContainer, GeneralBlock, ListItem,
    ListLevel, Paragraph, Segment, SegmentFormat, Table, TableCell, TableRow,
};

/// The model node a DOM node was freshly created for.
#[derive(Clone, Copy, Debug)]
pub enum ModelNodeRef<'a> {
    Paragraph(&'a Paragraph),
    Table(&'a Table),
    Divider(&'a Divider),
    Entity(&'a Entity),
    FormatContainer(&'a FormatContainer),
    ListItem(&'a ListItem),
    General(&'a GeneralBlock),
    Segment(&'a Segment),
    TableRow(&'a TableRow),
    TableCell(&'a TableCell),
    ListLevel(&'a ListLevel),
}

pub type OnNodeCreated = Rc<dyn Fn(ModelNodeRef<'_>, NodeId)>;

#[derive(Clone, Default)]
pub struct ModelToDomOptions {
    /// Record created elements on the model so the next render can reuse
    /// them.
    pub allow_cache_element: bool,
    /// Surround inline entities with caret helper spans.
    pub add_delimiter_for_entity: bool,
    /// Render entities as placeholders and merge them back into the target
    /// afterwards, reusing wrappers that are still in order.
    pub entity_placeholders: bool,
    pub on_node_created: Option<OnNodeCreated>,
}

impl fmt::Debug for ModelToDomOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelToDomOptions")
            .field("allow_cache_element", &self.allow_cache_element)
            .field("add_delimiter_for_entity", &self.add_delimiter_for_entity)
            .field("entity_placeholders", &self.entity_placeholders)
            .field("on_node_created", &self.on_node_created.is_some())
            .finish()
    }
}

/// A point in the output, recorded while rendering and resolved into a DOM
/// position once rendering is done and nodes no longer move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Before the first child of a container.
    Start(NodeId),
    /// Right after a node.
    After(NodeId),
    /// At the end of a text node.
    TextEnd(NodeId),
}

impl Anchor {
    /// The anchor for the position right before `before` in `parent`.
    pub(crate) fn before(dom: &Dom, parent: NodeId, before: Option<NodeId>) -> Self {
        let previous = match before {
            Some(node) => dom.previous_sibling(node),
            None => dom.last_child(parent),
        };
        previous.map_or(Anchor::Start(parent), Anchor::After)
    }

    pub(crate) fn resolve(self, dom: &Dom) -> Option<DomPosition> {
        match self {
            Anchor::Start(container) => Some(DomPosition::new(container, 0)),
            Anchor::After(node) if dom.is_text(node) => Some(DomPosition::end_of(dom, node)),
            Anchor::After(node) => DomPosition::after(dom, node),
            Anchor::TextEnd(node) => Some(DomPosition::end_of(dom, node)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TableSelectionInfo {
    pub table: NodeId,
    pub first_row: usize,
    pub first_column: usize,
    pub last_row: usize,
    pub last_column: usize,
}

/// A list element currently open while rendering consecutive list items.
#[derive(Clone, Debug)]
pub(crate) struct OpenList {
    pub node: NodeId,
    pub level: ListLevel,
}

/// Format in force at the current position, saved and restored around
/// containers.
#[derive(Clone, Debug)]
pub(crate) struct RenderScope {
    implicit_segment_format: SegmentFormat,
    inherited_block_format: BlockFormat,
    open_lists: Vec<OpenList>,
}

#[derive(Clone, Debug)]
pub struct ModelToDomContext {
    pub format: FormatContext,
    pub options: ModelToDomOptions,
    /// Segment format content at this position has without any markup:
    /// document default, then paragraph and decorator format.
    pub(crate) implicit_segment_format: SegmentFormat,
    /// Inheritable block format (direction, alignment, line height, white
    /// space) the enclosing elements already give.
    pub(crate) inherited_block_format: BlockFormat,
    pub(crate) open_lists: Vec<OpenList>,
    pub(crate) anchor: Option<Anchor>,
    pub(crate) selection_start: Option<Anchor>,
    pub(crate) selection_end: Option<Anchor>,
    pub(crate) image_selection: Option<NodeId>,
    pub(crate) table_selection: Option<TableSelectionInfo>,
    pub(crate) entity_pairs: Vec<(NodeId, NodeId)>,
}

impl ModelToDomContext {
    pub fn new(options: ModelToDomOptions, format: FormatContext) -> Self {
        Self {
            format,
            options,
            implicit_segment_format: SegmentFormat::default(),
            inherited_block_format: BlockFormat::default(),
            open_lists: Vec::new(),
            anchor: None,
            selection_start: None,
            selection_end: None,
            image_selection: None,
            table_selection: None,
            entity_pairs: Vec::new(),
        }
    }

    pub(crate) fn save_scope(&self) -> RenderScope {
        RenderScope {
            implicit_segment_format: self.implicit_segment_format.clone(),
            inherited_block_format: self.inherited_block_format.clone(),
            open_lists: self.open_lists.clone(),
        }
    }

    pub(crate) fn restore_scope(&mut self, scope: RenderScope) {
        self.implicit_segment_format = scope.implicit_segment_format;
        self.inherited_block_format = scope.inherited_block_format;
        self.open_lists = scope.open_lists;
    }

    pub(crate) fn inherit_block_format(&mut self, format: &BlockFormat) {
        let inherited = &mut self.inherited_block_format;
        if format.direction.is_some() {
            inherited.direction = format.direction;
        }
        for (target, source) in [
            (&mut inherited.text_align, &format.text_align),
            (&mut inherited.line_height, &format.line_height),
            (&mut inherited.white_space, &format.white_space),
        ] {
            if source.is_some() {
                *target = source.clone();
            }
        }
    }

    /// `format` without the inheritable fields the enclosing elements
    /// already provide.
    pub(crate) fn own_block_format(&self, format: &BlockFormat) -> BlockFormat {
        let inherited = &self.inherited_block_format;
        let mut own = format.clone();
        if own.direction == inherited.direction {
            own.direction = None;
        }
        for (target, source) in [
            (&mut own.text_align, &inherited.text_align),
            (&mut own.line_height, &inherited.line_height),
            (&mut own.white_space, &inherited.white_space),
        ] {
            if target == source {
                *target = None;
            }
        }
        own
    }

    pub(crate) fn node_created(&self, model: ModelNodeRef<'_>, node: NodeId) {
        if let Some(callback) = &self.options.on_node_created {
            callback(model, node);
        }
    }

    /// Record that a selected piece of content starts at the current
    /// anchor.
    pub(crate) fn mark_selection_start(&mut self) {
        if self.selection_start.is_none() {
            self.selection_start = self.anchor;
        }
    }

    pub(crate) fn mark_selection_end(&mut self) {
        self.selection_end = self.anchor;
    }
}

/// The fields of `format` that differ from `implicit`.
pub(crate) fn segment_format_diff(format: &SegmentFormat, implicit: &SegmentFormat) -> SegmentFormat {
    macro_rules! diff {
        ($($field:ident),*) => {
            SegmentFormat {
                $($field: if format.$field != implicit.$field { format.$field.clone() } else { None },)*
            }
        };
    }
    diff!(
        font_family, font_size, font_weight, italic, underline, strikethrough,
        script, text_color, background_color, letter_spacing, line_height,
        adaptive_text_color
    )
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn diff_keeps_only_changed_fields() {
        let implicit = SegmentFormat {
            font_size: Some("10pt".into()),
            font_weight: Some("bold".into()),
            ..Default::default()
        };
        let format = SegmentFormat {
            font_size: Some("10pt".into()),
            font_weight: Some("bold".into()),
            italic: Some(true),
            ..Default::default()
        };
        assert_that!(segment_format_diff(&format, &implicit)).is_equal_to(SegmentFormat {
            italic: Some(true),
            ..Default::default()
        });
    }

    #[test]
    fn anchors_resolve_after_rendering() {
        let (dom, root) = Dom::with_root_html("<b>ab</b>c");
        let b = dom.first_child(root).unwrap();
        let c = dom.last_child(root).unwrap();

        assert_that!(Anchor::After(b).resolve(&dom)).is_equal_to(Some(DomPosition::new(root, 1)));
        assert_that!(Anchor::After(c).resolve(&dom)).is_equal_to(Some(DomPosition::new(c, 1)));
        assert_that!(Anchor::before(&dom, root, Some(b))).is_equal_to(Anchor::Start(root));
    }
}
