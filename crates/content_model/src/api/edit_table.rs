// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Structural and alignment edits of the table holding the selection.
//! Edits apply to the selected cell rectangle, or to the cell holding the
//! caret.

use log::{debug, warn};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::table_format::apply_table_format;
use crate::editor::{EditorCore, FormatContentModelOptions};
use crate::model::metadata::{
    get_metadata_lenient, update_metadata, CellMetadata, TableMetadata,
};
use crate::model::{
    blocks_at_path_mut, get_model_selection, is_cell_empty, normalize_table,
    set_caret_at_paragraph_start, Block, ContentModelDocument, GroupStep,
    ModelSelection, Paragraph, Table, TableCell, TableRow,
};

const DEFAULT_COLUMN_WIDTH: f64 = 120.0;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum TableOperation {
    InsertAbove,
    InsertBelow,
    InsertLeft,
    InsertRight,
    DeleteTable,
    DeleteRow,
    DeleteColumn,
    MergeAbove,
    MergeBelow,
    MergeLeft,
    MergeRight,
    MergeCells,
    SplitHorizontally,
    SplitVertically,
    AlignCellLeft,
    AlignCellCenter,
    AlignCellRight,
    AlignCellTop,
    AlignCellMiddle,
    AlignCellBottom,
    AlignLeft,
    AlignCenter,
    AlignRight,
}

/// Selected cells as `(first_row, first_column, last_row, last_column)`.
type Rect = (usize, usize, usize, usize);

struct TableTarget {
    path: Vec<GroupStep>,
    block_index: usize,
    rect: Rect,
}

fn find_target_table(blocks: &[Block]) -> Option<TableTarget> {
    let position = match get_model_selection(blocks) {
        ModelSelection::Table {
            path,
            block_index,
            first_row,
            first_column,
            last_row,
            last_column,
        } => {
            return Some(TableTarget {
                path,
                block_index,
                rect: (first_row, first_column, last_row, last_column),
            })
        }
        ModelSelection::Collapsed(position)
        | ModelSelection::Image(position)
        | ModelSelection::Range {
            start: position, ..
        } => position,
        ModelSelection::None => return None,
    };
    let index = position.path.iter().rposition(|step| step.cell.is_some())?;
    let step = position.path[index];
    let (row, column) = step.cell?;
    Some(TableTarget {
        path: position.path[..index].to_vec(),
        block_index: step.block_index,
        rect: (row, column, row, column),
    })
}

/// Run `operation` on the table holding the selection.
pub fn edit_table(editor: &mut EditorCore, operation: TableOperation) -> bool {
    editor.format_content_model(
        |model, _| edit_table_model(model, operation),
        FormatContentModelOptions::new(operation.as_ref()),
    )
}

/// [edit_table] on a bare model.
pub fn edit_table_model(model: &mut ContentModelDocument, operation: TableOperation) -> bool {
    let Some(TableTarget {
        path,
        block_index,
        rect,
    }) = find_target_table(&model.blocks)
    else {
        debug!("{operation}: no table selected");
        return false;
    };
    let default_format = model.format.clone();
    let Some(group) = blocks_at_path_mut(&mut model.blocks, &path) else {
        return false;
    };
    let Some(Block::Table(table)) = group.get_mut(block_index) else {
        return false;
    };

    if !apply_operation(table, operation, rect) {
        return false;
    }

    if table.rows.is_empty() || table.column_count() == 0 {
        group[block_index] = Block::Paragraph(Paragraph::with_br());
        set_caret_at_paragraph_start(&mut model.blocks, &path, block_index);
        return true;
    }

    normalize_table(table, &default_format);
    if get_metadata_lenient::<TableMetadata>(&table.dataset).is_some() {
        apply_table_format(table, None, true);
    }
    table.invalidate_all();
    let row = rect.0.min(table.row_count() - 1);
    let column = rect.1.min(table.column_count() - 1);
    let (row, column) = table.head_cell_of(row, column);

    if get_model_selection(&model.blocks) == ModelSelection::None {
        let mut cell_path = path;
        cell_path.push(GroupStep::cell(block_index, row, column));
        set_caret_at_paragraph_start(&mut model.blocks, &cell_path, 0);
    }
    true
}

fn apply_operation(table: &mut Table, operation: TableOperation, rect: Rect) -> bool {
    use TableOperation::*;
    let (r1, c1, r2, c2) = rect;
    if table.cell(r2, c2).is_none() {
        warn!("{operation}: selection is outside of the table");
        return false;
    }
    match operation {
        InsertAbove => insert_rows(table, rect, true),
        InsertBelow => insert_rows(table, rect, false),
        InsertLeft => insert_columns(table, rect, true),
        InsertRight => insert_columns(table, rect, false),
        DeleteTable => {
            table.rows.clear();
            true
        }
        DeleteRow => delete_rows(table, r1, r2),
        DeleteColumn => delete_columns(table, c1, c2),
        MergeAbove => merge_rows(table, rect, r1),
        MergeBelow => merge_rows(table, rect, r2 + 1),
        MergeLeft => merge_columns(table, rect, c1),
        MergeRight => merge_columns(table, rect, c2 + 1),
        MergeCells => merge_cells(table, rect),
        SplitHorizontally => split_horizontally(table, rect),
        SplitVertically => split_vertically(table, rect),
        AlignCellLeft => align_cells(table, rect, CellAlign::Horizontal("left")),
        AlignCellCenter => align_cells(table, rect, CellAlign::Horizontal("center")),
        AlignCellRight => align_cells(table, rect, CellAlign::Horizontal("right")),
        AlignCellTop => align_cells(table, rect, CellAlign::Vertical("top")),
        AlignCellMiddle => align_cells(table, rect, CellAlign::Vertical("middle")),
        AlignCellBottom => align_cells(table, rect, CellAlign::Vertical("bottom")),
        AlignLeft => align_table(table, None, None),
        AlignCenter => align_table(table, Some("auto"), Some("auto")),
        AlignRight => align_table(table, Some("auto"), None),
    }
}

fn new_cell_like(cell: &TableCell, span_left: bool, span_above: bool) -> TableCell {
    let mut new_cell = TableCell::with_empty_paragraph(cell.format.clone());
    new_cell.span_left = span_left;
    new_cell.span_above = span_above;
    new_cell.is_header = cell.is_header;
    new_cell
}

fn insert_rows(table: &mut Table, (r1, _, r2, _): Rect, above: bool) -> bool {
    let (template, at) = if above { (r1, r1) } else { (r2, r2 + 1) };
    let template = table.rows[template].clone();
    let below = table.rows.get(r2 + 1);
    let cells: Vec<TableCell> = template
        .cells
        .iter()
        .enumerate()
        .map(|(c, cell)| {
            // New rows inside a vertical merge stay part of it.
            let span_above = if above {
                cell.span_above
            } else {
                below.and_then(|row| row.cells.get(c)).is_some_and(|next| next.span_above)
            };
            new_cell_like(cell, cell.span_left, span_above)
        })
        .collect();

    for i in 0..=(r2 - r1) {
        table.rows.insert(
            at + i,
            TableRow {
                cells: cells.clone(),
                height: template.height,
                format: template.format.clone(),
                cached_element: None,
            },
        );
    }
    true
}

fn insert_columns(table: &mut Table, (_, c1, _, c2): Rect, left: bool) -> bool {
    let (template, at) = if left { (c1, c1) } else { (c2, c2 + 1) };
    let count = c2 - c1 + 1;
    for row in &mut table.rows {
        let Some(cell) = row.cells.get(template) else {
            continue;
        };
        let span_left = if left {
            cell.span_left
        } else {
            row.cells.get(c2 + 1).is_some_and(|next| next.span_left)
        };
        let new_cell = new_cell_like(cell, span_left, cell.span_above);
        for i in 0..count {
            row.cells.insert(at + i, new_cell.clone());
        }
    }
    let width = table.widths.get(template).copied().unwrap_or(DEFAULT_COLUMN_WIDTH);
    for i in 0..count {
        let index = (at + i).min(table.widths.len());
        table.widths.insert(index, width);
    }
    true
}

fn delete_rows(table: &mut Table, r1: usize, r2: usize) -> bool {
    let first_spans: Vec<bool> = table.rows[r1].cells.iter().map(|c| c.span_above).collect();
    // A merge that started in a deleted row now starts in the next one.
    if let Some(next) = table.rows.get_mut(r2 + 1) {
        for (c, cell) in next.cells.iter_mut().enumerate() {
            cell.span_above = cell.span_above && first_spans.get(c).copied().unwrap_or(false);
        }
    }
    table.rows.drain(r1..=r2);
    true
}

fn delete_columns(table: &mut Table, c1: usize, c2: usize) -> bool {
    for row in &mut table.rows {
        let first_span = row.cells.get(c1).is_some_and(|c| c.span_left);
        if let Some(next) = row.cells.get_mut(c2 + 1) {
            next.span_left = next.span_left && first_span;
        }
        let end = (c2 + 1).min(row.cells.len());
        if c1 < end {
            row.cells.drain(c1..end);
        }
    }
    let end = (c2 + 1).min(table.widths.len());
    if c1 < end {
        table.widths.drain(c1..end);
    }
    true
}

/// Number of span placeholders continuing a cell downwards (`down`) or to
/// the right.
fn span_count(table: &Table, row: usize, column: usize, down: bool) -> usize {
    let mut count = 0;
    loop {
        let (r, c) = if down {
            (row + count + 1, column)
        } else {
            (row, column + count + 1)
        };
        match table.cell(r, c) {
            Some(cell) if (down && cell.span_above) || (!down && cell.span_left) => count += 1,
            _ => return count,
        }
    }
}

/// Whether the rectangle can become one cell without cutting through a
/// merge that reaches outside of it.
fn can_merge_cells(table: &Table, (r1, c1, r2, c2): Rect) -> bool {
    let no_span_above = (c1..=c2).all(|c| table.cell(r1, c).is_some_and(|cell| !cell.span_above));
    let no_span_left = (r1..=r2).all(|r| table.cell(r, c1).is_some_and(|cell| !cell.span_left));
    let below: Vec<usize> = (c1..=c2).map(|c| span_count(table, r2, c, true)).collect();
    let right: Vec<usize> = (r1..=r2).map(|r| span_count(table, r, c2, false)).collect();
    no_span_above
        && no_span_left
        && below.windows(2).all(|w| w[0] == w[1])
        && right.windows(2).all(|w| w[0] == w[1])
}

/// Move the content of a cell into another one, leaving an empty cell.
fn move_cell_content(table: &mut Table, from: (usize, usize), to: (usize, usize)) {
    let Some(source) = table.cell_mut(from.0, from.1) else {
        return;
    };
    if is_cell_empty(source) {
        return;
    }
    let blocks = std::mem::replace(
        &mut source.blocks,
        vec![Block::Paragraph(Paragraph::with_br())],
    );
    source.invalidate();
    let Some(target) = table.cell_mut(to.0, to.1) else {
        return;
    };
    if is_cell_empty(target) {
        target.blocks = blocks;
    } else {
        target.blocks.extend(blocks);
    }
    target.invalidate();
}

/// Merge row `merging` of the selected columns into the row above it.
fn merge_rows(table: &mut Table, (_, c1, _, c2): Rect, merging: usize) -> bool {
    if merging == 0 || merging >= table.row_count() {
        return false;
    }
    let mut changed = false;
    for c in c1..=c2 {
        if table.cell(merging, c).map_or(true, TableCell::is_span) {
            continue;
        }
        let head = table.head_cell_of(merging - 1, c);
        if head.1 != c || !can_merge_cells(table, (head.0, c, merging, c)) {
            continue;
        }
        move_cell_content(table, (merging, c), head);
        if let Some(cell) = table.cell_mut(merging, c) {
            cell.span_above = true;
            cell.is_selected = false;
        }
        changed = true;
    }
    changed
}

/// Merge column `merging` of the selected rows into the column on its
/// left.
fn merge_columns(table: &mut Table, (r1, _, r2, _): Rect, merging: usize) -> bool {
    if merging == 0 || merging >= table.column_count() {
        return false;
    }
    let mut changed = false;
    for r in r1..=r2 {
        if table.cell(r, merging).map_or(true, TableCell::is_span) {
            continue;
        }
        let head = table.head_cell_of(r, merging - 1);
        if head.0 != r || !can_merge_cells(table, (r, head.1, r, merging)) {
            continue;
        }
        move_cell_content(table, (r, merging), head);
        if let Some(cell) = table.cell_mut(r, merging) {
            cell.span_left = true;
            cell.is_selected = false;
        }
        changed = true;
    }
    changed
}

fn merge_cells(table: &mut Table, rect: Rect) -> bool {
    let (r1, c1, r2, c2) = rect;
    if (r1, c1) == (r2, c2) || !can_merge_cells(table, rect) {
        return false;
    }
    for r in r1..=r2 {
        for c in c1..=c2 {
            if (r, c) == (r1, c1) {
                continue;
            }
            move_cell_content(table, (r, c), (r1, c1));
            if let Some(cell) = table.cell_mut(r, c) {
                cell.span_left = c > c1;
                cell.span_above = r > r1;
            }
        }
    }
    true
}

/// Split each selected column in two. A cell already merged to the right
/// gives up that merge instead.
fn split_horizontally(table: &mut Table, (r1, c1, r2, c2): Rect) -> bool {
    for c in (c1..=c2).rev() {
        let merged_right = (r1..=r2).all(|r| table.cell(r, c + 1).is_some_and(|n| n.span_left));
        if merged_right {
            for r in r1..=r2 {
                if let Some(next) = table.cell_mut(r, c + 1) {
                    next.span_left = false;
                    next.invalidate();
                }
            }
            continue;
        }
        for (r, row) in table.rows.iter_mut().enumerate() {
            let Some(cell) = row.cells.get(c) else {
                continue;
            };
            let selected = (r1..=r2).contains(&r);
            let new_cell = if selected {
                new_cell_like(cell, false, cell.span_above && r > r1)
            } else {
                new_cell_like(cell, true, cell.span_above)
            };
            row.cells.insert(c + 1, new_cell);
        }
        if let Some(width) = table.widths.get_mut(c) {
            *width /= 2.0;
            let half = *width;
            table.widths.insert(c + 1, half);
        }
    }
    true
}

/// Split each selected row in two. A cell already merged downwards gives
/// up that merge instead.
fn split_vertically(table: &mut Table, (r1, c1, r2, c2): Rect) -> bool {
    for r in (r1..=r2).rev() {
        let merged_below = (c1..=c2).all(|c| table.cell(r + 1, c).is_some_and(|n| n.span_above));
        if merged_below {
            for c in c1..=c2 {
                if let Some(next) = table.cell_mut(r + 1, c) {
                    next.span_above = false;
                    next.invalidate();
                }
            }
            continue;
        }
        let row = &mut table.rows[r];
        let cells = row
            .cells
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                if (c1..=c2).contains(&c) {
                    new_cell_like(cell, cell.span_left && c > c1, false)
                } else {
                    new_cell_like(cell, cell.span_left, true)
                }
            })
            .collect();
        row.height /= 2.0;
        let new_row = TableRow {
            cells,
            height: row.height,
            format: row.format.clone(),
            cached_element: None,
        };
        table.rows.insert(r + 1, new_row);
    }
    true
}

enum CellAlign {
    Horizontal(&'static str),
    Vertical(&'static str),
}

fn align_cells(table: &mut Table, (r1, c1, r2, c2): Rect, align: CellAlign) -> bool {
    for r in r1..=r2 {
        for c in c1..=c2 {
            let Some(cell) = table.cell_mut(r, c) else {
                continue;
            };
            if cell.is_span() {
                continue;
            }
            match align {
                CellAlign::Horizontal(value) => {
                    cell.format.text_align = Some(value.to_owned());
                    for block in &mut cell.blocks {
                        if let Block::Paragraph(p) = block {
                            if p.format.text_align.take().is_some() {
                                p.invalidate();
                            }
                        }
                    }
                }
                CellAlign::Vertical(value) => {
                    cell.format.vertical_align = Some(value.to_owned());
                    let result = update_metadata(&mut cell.dataset, |m: Option<CellMetadata>| {
                        Some(CellMetadata {
                            v_align_override: Some(true),
                            ..m.unwrap_or_default()
                        })
                    });
                    if let Err(e) = result {
                        warn!("Failed to store cell editing info: {e}");
                    }
                }
            }
            cell.invalidate();
        }
    }
    true
}

fn align_table(table: &mut Table, left: Option<&str>, right: Option<&str>) -> bool {
    table.format.margin.left = left.map(str::to_owned);
    table.format.margin.right = right.map(str::to_owned);
    table.cached_element = None;
    true
}
