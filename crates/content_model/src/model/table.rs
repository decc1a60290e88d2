// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::NodeId;

use super::format::{BlockFormat, Dataset, TableCellFormat, TableFormat};
use super::{Block, Paragraph};

/// A table as a dense grid. Positions covered by a merged cell hold a
/// placeholder cell with `span_left` and/or `span_above` set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
    pub format: TableFormat,
    /// Column widths in pixels, one per column.
    pub widths: Vec<f64>,
    pub dataset: Dataset,
    pub cached_element: Option<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Row height in pixels, zero when unknown.
    pub height: f64,
    pub format: BlockFormat,
    pub cached_element: Option<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub blocks: Vec<Block>,
    pub format: TableCellFormat,
    pub span_left: bool,
    pub span_above: bool,
    pub is_header: bool,
    pub is_selected: bool,
    pub dataset: Dataset,
    pub cached_element: Option<NodeId>,
}

impl TableCell {
    pub fn new(span_left: bool, span_above: bool, is_header: bool) -> Self {
        Self {
            span_left,
            span_above,
            is_header,
            ..Default::default()
        }
    }

    /// A cell holding one paragraph with a line break, the way an empty
    /// cell is kept editable.
    pub fn with_empty_paragraph(format: TableCellFormat) -> Self {
        let mut cell = Self {
            format,
            ..Default::default()
        };
        cell.blocks.push(Block::Paragraph(Paragraph::with_br()));
        cell
    }

    pub fn is_span(&self) -> bool {
        self.span_left || self.span_above
    }

    pub fn invalidate(&mut self) {
        self.cached_element = None;
    }
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Coordinates of the real cell covering `(row, col)`, found by walking
    /// left and up through span placeholders.
    pub fn head_cell_of(&self, row: usize, col: usize) -> (usize, usize) {
        let (mut row, mut col) = (row, col);
        while let Some(cell) = self.cell(row, col) {
            if cell.span_left && col > 0 {
                col -= 1;
            } else if cell.span_above && row > 0 {
                row -= 1;
            } else {
                break;
            }
        }
        (row, col)
    }

    /// The selected rectangle as `(first_row, first_col, last_row,
    /// last_col)`, if any cell is selected.
    pub fn selected_rect(&self) -> Option<(usize, usize, usize, usize)> {
        let mut rect: Option<(usize, usize, usize, usize)> = None;
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                if cell.is_selected {
                    rect = Some(match rect {
                        None => (r, c, r, c),
                        Some((r1, c1, r2, c2)) => {
                            (r1.min(r), c1.min(c), r2.max(r), c2.max(c))
                        }
                    });
                }
            }
        }
        rect
    }

    /// Clear cached elements of the table and of every row and cell.
    pub fn invalidate_all(&mut self) {
        self.cached_element = None;
        for row in &mut self.rows {
            row.cached_element = None;
            for cell in &mut row.cells {
                cell.cached_element = None;
            }
        }
    }
}
