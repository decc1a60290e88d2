// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::style::parse_value_with_unit;
use crate::dom::{Dom, DomSelection, NodeId};
use crate::dom_to_model::{DomToModelContext, ProcessorCategory};
use crate::format_handlers::parse_format;
use crate::model::{Block, BlockFormat, Table, TableCell, TableRow};

const BASE_FONT_SIZE_PX: f64 = 16.0;

/// Browsers cap `colspan` and `rowspan` at these values.
pub(crate) const MAX_COLSPAN: usize = 1000;
pub(crate) const MAX_ROWSPAN: usize = 65534;

/// `tr` elements of a table in document order, looking through `thead`,
/// `tbody` and `tfoot`.
pub(crate) fn table_rows(dom: &Dom, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in dom.children(table) {
        match dom.tag(*child) {
            Some("tr") => rows.push(*child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                dom.children(*child)
                    .iter()
                    .filter(|n| dom.is_tag(**n, "tr")),
            ),
            _ => {}
        }
    }
    rows
}

/// `colspan`/`rowspan` of a cell, clamped to what browsers accept. A
/// rowspan never reaches past the last of `rows_left` rows.
pub(crate) fn cell_spans(dom: &Dom, cell: NodeId, rows_left: usize) -> (usize, usize) {
    let colspan = span_attribute(dom, cell, "colspan").min(MAX_COLSPAN);
    let rowspan = span_attribute(dom, cell, "rowspan")
        .min(MAX_ROWSPAN)
        .min(rows_left.max(1));
    (colspan, rowspan)
}

fn span_attribute(dom: &Dom, cell: NodeId, name: &str) -> usize {
    dom.get_attribute(cell, name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

fn pixels(value: Option<String>) -> Option<f64> {
    value.and_then(|v| parse_value_with_unit(&v, BASE_FONT_SIZE_PX))
}

/// Build the dense grid of a table: a real cell where a `td`/`th` starts
/// and span placeholders for every position its `colspan`/`rowspan`
/// covers. Column widths and row heights move from cell styles to the
/// table and its rows.
pub fn table_processor(
    group: &mut Vec<Block>,
    dom: &Dom,
    element: NodeId,
    context: &mut DomToModelContext,
) {
    let mut table = Table {
        format: parse_format(dom, element, &context.format),
        dataset: dom.dataset(element),
        ..Default::default()
    };
    if context.options.allow_cache_element {
        table.cached_element = Some(element);
    }
    let selected = match context.selection {
        Some(DomSelection::Table {
            table: selected_table,
            first_column,
            first_row,
            last_column,
            last_row,
        }) if selected_table == element => Some((
            first_row.min(last_row),
            first_column.min(last_column),
            first_row.max(last_row),
            first_column.max(last_column),
        )),
        _ => None,
    };
    let is_selected = |r: usize, c: usize| {
        selected.is_some_and(|(r1, c1, r2, c2)| (r1..=r2).contains(&r) && (c1..=c2).contains(&c))
    };

    let scope = context.save_format();
    let list_scope = context.enter_isolated_group();
    context.inherit_block_format(&BlockFormat {
        direction: table.format.direction,
        ..Default::default()
    });
    let child = context.processor(ProcessorCategory::Child);

    let mut grid: Vec<Vec<Option<TableCell>>> = Vec::new();
    let mut rows: Vec<TableRow> = Vec::new();
    let mut widths: Vec<Option<f64>> = Vec::new();

    let trs = table_rows(dom, element);
    let row_count = trs.len();
    for (r, tr) in trs.into_iter().enumerate() {
        if grid.len() <= r {
            grid.resize_with(r + 1, Vec::new);
        }
        let mut row = TableRow {
            format: parse_format(dom, tr, &context.format),
            ..Default::default()
        };
        row.height = pixels(row.format.size.height.take()).unwrap_or(0.0);
        if context.options.allow_cache_element {
            row.cached_element = Some(tr);
        }

        let mut col = 0;
        for td in dom.children(tr) {
            let td = *td;
            let is_header = dom.is_tag(td, "th");
            if !is_header && !dom.is_tag(td, "td") {
                continue;
            }
            while grid[r].get(col).is_some_and(Option::is_some) {
                col += 1;
            }
            let (colspan, rowspan) = cell_spans(dom, td, row_count - r);

            let mut cell = TableCell::new(false, false, is_header);
            cell.format = parse_format(dom, td, &context.format);
            cell.dataset = dom.dataset(td);
            if context.options.allow_cache_element {
                cell.cached_element = Some(td);
            }
            let width = pixels(cell.format.size.width.take());
            if colspan == 1 {
                if let Some(width) = width {
                    if widths.len() <= col {
                        widths.resize(col + 1, None);
                    }
                    widths[col] = Some(width);
                }
            }
            let height = pixels(cell.format.size.height.take());
            if rowspan == 1 {
                if let Some(height) = height {
                    row.height = row.height.max(height);
                }
            }

            let cell_scope = context.save_format();
            context.inherit_block_format(&BlockFormat {
                direction: cell.format.direction,
                ..Default::default()
            });
            child(&mut cell.blocks, dom, td, context);
            context.restore_format(cell_scope);

            for dr in 0..rowspan {
                if grid.len() <= r + dr {
                    grid.resize_with(r + dr + 1, Vec::new);
                }
                for dc in 0..colspan {
                    let target = &mut grid[r + dr];
                    if target.len() <= col + dc {
                        target.resize_with(col + dc + 1, || None);
                    }
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    if target[col + dc].is_none() {
                        let mut placeholder = TableCell::new(dc > 0, dr > 0, is_header);
                        placeholder.format = cell.format.clone();
                        placeholder.dataset = cell.dataset.clone();
                        placeholder.is_selected = is_selected(r + dr, col + dc);
                        target[col + dc] = Some(placeholder);
                    }
                }
            }
            if is_selected(r, col) {
                cell.is_selected = true;
                cell.cached_element = None;
            }
            grid[r][col] = Some(cell);
            col += colspan;
        }
        rows.push(row);
    }

    context.leave_isolated_group(list_scope);
    context.restore_format(scope);

    rows.resize_with(grid.len(), TableRow::default);
    for (mut row, cells) in rows.into_iter().zip(grid) {
        row.cells = cells
            .into_iter()
            .map(|cell| cell.unwrap_or_default())
            .collect();
        table.rows.push(row);
    }
    if widths.iter().any(Option::is_some) {
        let columns = table.column_count().max(widths.len());
        widths.resize(columns, None);
        let known: Vec<f64> = widths.iter().flatten().copied().collect();
        let fallback = known.iter().sum::<f64>() / known.len() as f64;
        table.widths = widths.into_iter().map(|w| w.unwrap_or(fallback)).collect();
    }

    group.push(Block::Table(table));
}
