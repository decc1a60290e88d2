// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The content model: a typed tree of blocks and segments built from the
//! DOM, edited, then rendered back.

mod block;
pub mod format;
mod list;
pub mod metadata;
mod normalize;
mod segment;
pub mod selection;
mod table;

pub use block::{
    Block, Divider, Entity, FormatContainer, GeneralBlock, Paragraph,
    ParagraphDecorator,
};
pub use format::{
    BlockFormat, Borders, CodeFormat, Dataset, Direction, EntityInfo,
    ImageFormat, LinkFormat, ListItemFormat, ListLevelFormat, MergeFormat,
    ScriptPosition, SegmentFormat, Size, Spacing, TableCellFormat,
    TableFormat,
};
pub use list::{ListItem, ListLevel, ListType};
pub use normalize::{
    is_cell_empty, merge_text_segments, normalize_content_model, normalize_paragraph,
    normalize_table,
};
pub use segment::{
    Br, Code, GeneralSegment, Image, Link, Segment, SelectionMarker, Text,
};
pub use selection::{
    clear_selection, find_marker, for_each_paragraph, for_each_paragraph_mut,
    get_model_selection, paragraph_at, segment_at, selected_paragraphs,
    selected_segments, set_caret_at_paragraph_start, ModelSelection,
    SegmentPosition,
};
pub use table::{Table, TableCell, TableRow};

use strum_macros::Display;

/// Root of a content model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentModelDocument {
    pub blocks: Vec<Block>,
    /// Default segment format of the editor.
    pub format: SegmentFormat,
}

impl ContentModelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: SegmentFormat) -> Self {
        Self {
            blocks: Vec::new(),
            format,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum BlockGroupType {
    Document,
    FormatContainer,
    ListItem,
    TableCell,
    General,
}

/// Anything that owns an ordered list of blocks.
pub trait BlockGroup {
    fn blocks(&self) -> &[Block];
    fn blocks_mut(&mut self) -> &mut Vec<Block>;
    fn group_type(&self) -> BlockGroupType;
}

macro_rules! impl_block_group {
    ($ty:ty, $group:ident) => {
        impl BlockGroup for $ty {
            fn blocks(&self) -> &[Block] {
                &self.blocks
            }

            fn blocks_mut(&mut self) -> &mut Vec<Block> {
                &mut self.blocks
            }

            fn group_type(&self) -> BlockGroupType {
                BlockGroupType::$group
            }
        }
    };
}

impl_block_group!(ContentModelDocument, Document);
impl_block_group!(FormatContainer, FormatContainer);
impl_block_group!(ListItem, ListItem);
impl_block_group!(TableCell, TableCell);
impl_block_group!(GeneralBlock, General);
impl_block_group!(GeneralSegment, General);

/// One step down the block tree: the block at `block_index`, and for a
/// table the cell at `(row, column)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupStep {
    pub block_index: usize,
    pub cell: Option<(usize, usize)>,
}

impl GroupStep {
    pub fn block(block_index: usize) -> Self {
        Self {
            block_index,
            cell: None,
        }
    }

    pub fn cell(block_index: usize, row: usize, col: usize) -> Self {
        Self {
            block_index,
            cell: Some((row, col)),
        }
    }
}

/// Resolve a path of [GroupStep]s to the blocks of the group it ends at.
pub fn blocks_at_path<'a>(
    blocks: &'a [Block],
    path: &[GroupStep],
) -> Option<&'a [Block]> {
    let Some((step, rest)) = path.split_first() else {
        return Some(blocks);
    };
    let child: &[Block] = match (blocks.get(step.block_index)?, step.cell) {
        (Block::Table(table), Some((row, col))) => &table.cell(row, col)?.blocks,
        (block, None) => block.child_blocks()?,
        _ => return None,
    };
    blocks_at_path(child, rest)
}

pub fn blocks_at_path_mut<'a>(
    blocks: &'a mut Vec<Block>,
    path: &[GroupStep],
) -> Option<&'a mut Vec<Block>> {
    let Some((step, rest)) = path.split_first() else {
        return Some(blocks);
    };
    let child = match (blocks.get_mut(step.block_index)?, step.cell) {
        (Block::Table(table), Some((row, col))) => {
            &mut table.cell_mut(row, col)?.blocks
        }
        (block, None) => block.child_blocks_mut()?,
        _ => return None,
    };
    blocks_at_path_mut(child, rest)
}

/// Clear the cached element of every block and cell along `path`, so that
/// everything enclosing a changed node is reconciled on the next render.
pub fn invalidate_path(blocks: &mut [Block], path: &[GroupStep]) {
    let Some((step, rest)) = path.split_first() else {
        return;
    };
    let Some(block) = blocks.get_mut(step.block_index) else {
        return;
    };
    match (block, step.cell) {
        (Block::Table(table), Some((row, col))) => {
            table.cached_element = None;
            if let Some(r) = table.rows.get_mut(row) {
                r.cached_element = None;
            }
            if let Some(cell) = table.cell_mut(row, col) {
                cell.cached_element = None;
                invalidate_path(&mut cell.blocks, rest);
            }
        }
        (Block::FormatContainer(c), None) => {
            c.cached_element = None;
            invalidate_path(&mut c.blocks, rest);
        }
        (Block::ListItem(l), None) => {
            l.cached_element = None;
            invalidate_path(&mut l.blocks, rest);
        }
        (Block::General(g), None) => invalidate_path(&mut g.blocks, rest),
        _ => {}
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    fn table_with_paragraph() -> Vec<Block> {
        let mut table = Table::default();
        table.rows.push(TableRow::default());
        table.rows[0]
            .cells
            .push(TableCell::with_empty_paragraph(Default::default()));
        vec![Block::Paragraph(Paragraph::new(true)), Block::Table(table)]
    }

    #[test]
    fn paths_reach_into_table_cells() {
        let mut blocks = table_with_paragraph();
        let path = [GroupStep::cell(1, 0, 0)];

        let cell_blocks = blocks_at_path_mut(&mut blocks, &path).unwrap();
        assert_that!(cell_blocks.len()).is_equal_to(1);
        assert_that!(blocks_at_path(&blocks, &[GroupStep::block(1)])).is_none();
    }

    #[test]
    fn invalidating_a_path_clears_enclosing_caches() {
        let mut blocks = table_with_paragraph();
        let node = crate::dom::Dom::new().document();
        if let Block::Table(t) = &mut blocks[1] {
            t.cached_element = Some(node);
            t.rows[0].cells[0].cached_element = Some(node);
        }
        invalidate_path(&mut blocks, &[GroupStep::cell(1, 0, 0)]);

        let Block::Table(t) = &blocks[1] else {
            panic!("expected a table")
        };
        assert_that!(t.cached_element).is_none();
        assert_that!(t.rows[0].cells[0].cached_element).is_none();
    }
}
