// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{Dom, NodeId};

/// A boundary point. For text nodes `offset` counts chars, for any other
/// node it counts children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl DomPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    pub fn before(dom: &Dom, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        Some(Self::new(parent, dom.index_in_parent(node)?))
    }

    pub fn after(dom: &Dom, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        Some(Self::new(parent, dom.index_in_parent(node)? + 1))
    }

    /// The last position inside `node`.
    pub fn end_of(dom: &Dom, node: NodeId) -> Self {
        let offset = match dom.text(node) {
            Some(text) => text.chars().count(),
            None => dom.child_count(node),
        };
        Self::new(node, offset)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomRange {
    pub start: DomPosition,
    pub end: DomPosition,
}

impl DomRange {
    pub fn new(start: DomPosition, end: DomPosition) -> Self {
        Self { start, end }
    }

    pub fn collapsed(position: DomPosition) -> Self {
        Self::new(position, position)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// The single node this range wraps, if it starts right before a node
    /// and ends right after it.
    pub fn selected_node(&self, dom: &Dom) -> Option<NodeId> {
        if self.start.node != self.end.node
            || dom.is_text(self.start.node)
            || self.end.offset != self.start.offset + 1
        {
            return None;
        }
        dom.children(self.start.node).get(self.start.offset).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomSelection {
    Range {
        range: DomRange,
        is_reverted: bool,
    },
    Image {
        image: NodeId,
    },
    Table {
        table: NodeId,
        first_column: usize,
        first_row: usize,
        last_column: usize,
        last_row: usize,
    },
}

impl DomSelection {
    pub fn caret(position: DomPosition) -> Self {
        Self::Range {
            range: DomRange::collapsed(position),
            is_reverted: false,
        }
    }

    /// Whether every node the selection references is still in the
    /// document.
    pub fn is_connected(&self, dom: &Dom) -> bool {
        match self {
            Self::Range { range, .. } => {
                dom.is_connected(range.start.node)
                    && dom.is_connected(range.end.node)
            }
            Self::Image { image } => dom.is_connected(*image),
            Self::Table { table, .. } => dom.is_connected(*table),
        }
    }
}
