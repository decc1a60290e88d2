// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Geometry of table selections over the DOM table grid.

use strum_macros::{AsRefStr, Display};

use crate::dom::{Dom, DomSelection, NodeId};
use crate::dom_to_model::processors::{cell_spans, table_rows};

/// One position of a table grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedTableCell {
    /// Where a `td` or `th` starts.
    Cell(NodeId),
    /// Covered by a cell to the left.
    SpanLeft,
    /// Covered by a cell above.
    SpanAbove,
    /// Covered by a cell above and to the left.
    SpanBoth,
}

pub type ParsedTable = Vec<Vec<ParsedTableCell>>;

/// Lay the cells of a DOM table out on a grid, following `colspan` and
/// `rowspan`. Rows may come out shorter than others when the table is
/// ragged.
pub fn parse_table_cells(dom: &Dom, table: NodeId) -> ParsedTable {
    let mut grid: Vec<Vec<Option<ParsedTableCell>>> = Vec::new();
    let rows = table_rows(dom, table);
    let row_count = rows.len();
    for (r, tr) in rows.into_iter().enumerate() {
        if grid.len() <= r {
            grid.resize_with(r + 1, Vec::new);
        }
        let mut col = 0;
        for &td in dom.children(tr) {
            if !dom.is_tag(td, "td") && !dom.is_tag(td, "th") {
                continue;
            }
            while grid[r].get(col).is_some_and(Option::is_some) {
                col += 1;
            }
            let (colspan, rowspan) = cell_spans(dom, td, row_count - r);
            for dr in 0..rowspan {
                if grid.len() <= r + dr {
                    grid.resize_with(r + dr + 1, Vec::new);
                }
                let row = &mut grid[r + dr];
                for dc in 0..colspan {
                    if row.len() <= col + dc {
                        row.resize(col + dc + 1, None);
                    }
                    let slot = &mut row[col + dc];
                    if slot.is_some() {
                        continue;
                    }
                    *slot = Some(match (dr > 0, dc > 0) {
                        (false, false) => ParsedTableCell::Cell(td),
                        (false, true) => ParsedTableCell::SpanLeft,
                        (true, false) => ParsedTableCell::SpanAbove,
                        (true, true) => ParsedTableCell::SpanBoth,
                    });
                }
            }
            col += colspan;
        }
    }
    grid.into_iter()
        .map(|row| row.into_iter().map(|c| c.unwrap_or(ParsedTableCell::SpanBoth)).collect())
        .collect()
}

/// A rectangle of table cells by its two corners. The corners are kept as
/// given, so `first` may be below or right of `last`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableSelectionCoordinates {
    pub first_row: usize,
    pub first_column: usize,
    pub last_row: usize,
    pub last_column: usize,
}

impl TableSelectionCoordinates {
    /// The table and coordinates of a table selection.
    pub fn from_selection(selection: &DomSelection) -> Option<(NodeId, Self)> {
        match selection {
            DomSelection::Table {
                table,
                first_column,
                first_row,
                last_column,
                last_row,
            } => Some((
                *table,
                Self {
                    first_row: *first_row,
                    first_column: *first_column,
                    last_row: *last_row,
                    last_column: *last_column,
                },
            )),
            _ => None,
        }
    }

    pub fn area(&self) -> usize {
        (self.first_row.abs_diff(self.last_row) + 1)
            * (self.first_column.abs_diff(self.last_column) + 1)
    }
}

/// Text of the real cells inside the rectangle, row by row, joined with
/// `", "`.
pub fn retrieve_string_from_parsed_table(
    dom: &Dom,
    parsed_table: &ParsedTable,
    coordinates: &TableSelectionCoordinates,
) -> String {
    let rows = coordinates.first_row.min(coordinates.last_row)
        ..=coordinates.first_row.max(coordinates.last_row);
    let columns = coordinates.first_column.min(coordinates.last_column)
        ..=coordinates.first_column.max(coordinates.last_column);
    let mut texts = Vec::new();
    for r in rows {
        let Some(row) = parsed_table.get(r) else {
            break;
        };
        for c in columns.clone() {
            if let Some(ParsedTableCell::Cell(cell)) = row.get(c) {
                texts.push(dom.text_content(*cell));
            }
        }
    }
    texts.join(", ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum SelectionDirection {
    Selecting,
    Unselecting,
}

/// Whether moving from `previous` to `current` grows or shrinks the
/// selection. Only a strictly smaller area is unselecting; any other
/// change, even at equal area, is selecting.
pub fn get_is_selecting_or_unselecting(
    previous: &TableSelectionCoordinates,
    current: &TableSelectionCoordinates,
) -> Option<SelectionDirection> {
    if previous == current {
        return None;
    }
    if current.area() < previous.area() {
        Some(SelectionDirection::Unselecting)
    } else {
        Some(SelectionDirection::Selecting)
    }
}
