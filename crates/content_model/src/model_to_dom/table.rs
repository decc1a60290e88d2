// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::block_group::{render_block_group_children, reuse_cached_element};
use super::context::{ModelNodeRef, ModelToDomContext, TableSelectionInfo};
use crate::dom::style::px;
use crate::dom::{Dom, NodeId};
use crate::format_handlers::{ContentFormat, DatasetHandler, FormatHandler};
use crate::model::metadata::{get_metadata_lenient, CellMetadata};
use crate::model::{for_each_paragraph_mut, BlockFormat, Table, TableCell};
use crate::utils::color::lightness;

const DARK_BACKGROUND_LIGHTNESS: f64 = 20.0;
const LIGHT_BACKGROUND_LIGHTNESS: f64 = 80.0;

/// Text color that stays readable on `background`, when the background is
/// dark or light enough to need one.
pub fn adaptive_text_color(background: &str) -> Option<&'static str> {
    let lightness = lightness(background)?;
    if lightness < DARK_BACKGROUND_LIGHTNESS {
        Some("#ffffff")
    } else if lightness > LIGHT_BACKGROUND_LIGHTNESS {
        Some("#000000")
    } else {
        None
    }
}

/// Force a readable text color onto segments of a header cell with a
/// background, or take a color set this way off again once the cell is no
/// longer a header. Colors chosen by the user are never touched.
pub(crate) fn update_adaptive_text_color(cell: &mut TableCell) {
    let color = if cell.is_header {
        cell.format
            .background_color
            .as_deref()
            .and_then(adaptive_text_color)
    } else {
        None
    };

    for_each_paragraph_mut(&mut cell.blocks, &mut |_, _, paragraph, _| {
        let mut changed = false;
        for segment in paragraph.segments.iter_mut() {
            let format = segment.format_mut();
            let is_adaptive = format.adaptive_text_color == Some(true);
            match color {
                Some(color) if is_adaptive || format.text_color.is_none() => {
                    if format.text_color.as_deref() != Some(color) || !is_adaptive {
                        format.text_color = Some(color.to_owned());
                        format.adaptive_text_color = Some(true);
                        changed = true;
                    }
                }
                None if is_adaptive => {
                    format.text_color = None;
                    format.adaptive_text_color = None;
                    changed = true;
                }
                _ => {}
            }
        }
        if changed {
            paragraph.invalidate();
        }
    });
}

/// `(colspan, rowspan)` of the real cell at `(row, col)`, read from the
/// span flags of the cells it covers.
pub(crate) fn cell_spans(table: &Table, row: usize, col: usize) -> (usize, usize) {
    let colspan = 1 + (col + 1..)
        .take_while(|c| table.cell(row, *c).is_some_and(|cell| cell.span_left))
        .count();
    let rowspan = 1 + (row + 1..)
        .take_while(|r| table.cell(*r, col).is_some_and(|cell| cell.span_above))
        .count();
    (colspan, rowspan)
}

pub(crate) fn render_table(
    dom: &mut Dom,
    parent: NodeId,
    table: &mut Table,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    if table.rows.is_empty() {
        return ref_node;
    }

    // A table rendered afresh may have new widths or heights for cells it
    // still reuses.
    let refresh_dimensions = table.cached_element.is_none();
    let (element, ref_node) = match table.cached_element {
        Some(element) => {
            let ref_node = reuse_cached_element(dom, parent, element, ref_node);
            dom.remove_all_children(element);
            (element, ref_node)
        }
        None => {
            let element = dom.create_element("table");
            dom.insert_before(parent, element, ref_node);
            table.format.apply_to(dom, element, &mut context.format);
            DatasetHandler::apply(&table.dataset, dom, element, &mut context.format);
            context.node_created(ModelNodeRef::Table(table), element);
            if context.options.allow_cache_element {
                table.cached_element = Some(element);
            }
            (element, ref_node)
        }
    };

    if context.table_selection.is_none() {
        if let Some((first_row, first_column, last_row, last_column)) = table.selected_rect() {
            context.table_selection = Some(TableSelectionInfo {
                table: element,
                first_row,
                first_column,
                last_row,
                last_column,
            });
        }
    }

    let tbody = dom.create_element("tbody");
    dom.append_child(element, tbody);

    let spans: Vec<Vec<(usize, usize)>> = (0..table.rows.len())
        .map(|r| {
            (0..table.rows[r].cells.len())
                .map(|c| cell_spans(table, r, c))
                .collect()
        })
        .collect();
    let heights: Vec<f64> = table.rows.iter().map(|r| r.height).collect();
    let widths = table.widths.clone();

    let scope = context.save_scope();
    context.inherit_block_format(&BlockFormat {
        direction: table.format.direction,
        ..Default::default()
    });

    for (r, row) in table.rows.iter_mut().enumerate() {
        let tr = match row.cached_element {
            Some(tr) => tr,
            None => {
                let tr = dom.create_element("tr");
                row.format.apply_to(dom, tr, &mut context.format);
                context.node_created(ModelNodeRef::TableRow(row), tr);
                if context.options.allow_cache_element {
                    row.cached_element = Some(tr);
                }
                tr
            }
        };
        dom.append_child(tbody, tr);
        dom.remove_all_children(tr);

        for (c, cell) in row.cells.iter_mut().enumerate() {
            if cell.is_span() {
                continue;
            }
            update_adaptive_text_color(cell);
            let (colspan, rowspan) = spans[r][c];
            let width: f64 = widths.iter().skip(c).take(colspan).sum();
            let height: f64 = heights.iter().skip(r).take(rowspan).sum();
            let td = match cell.cached_element {
                Some(td) => {
                    if refresh_dimensions || has_override(cell) {
                        apply_dimensions(dom, td, width, height);
                    }
                    td
                }
                None => {
                    let td = create_cell(dom, cell, context);
                    if colspan > 1 {
                        dom.set_attribute(td, "colspan", &colspan.to_string());
                    }
                    if rowspan > 1 {
                        dom.set_attribute(td, "rowspan", &rowspan.to_string());
                    }
                    apply_dimensions(dom, td, width, height);
                    DatasetHandler::apply(&cell.dataset, dom, td, &mut context.format);
                    context.node_created(ModelNodeRef::TableCell(cell), td);
                    if context.options.allow_cache_element {
                        cell.cached_element = Some(td);
                    }
                    td
                }
            };
            dom.append_child(tr, td);

            let cell_scope = context.save_scope();
            context.inherit_block_format(&BlockFormat {
                direction: cell.format.direction,
                ..Default::default()
            });
            render_block_group_children(dom, td, &mut cell.blocks, context);
            context.restore_scope(cell_scope);
        }
    }

    context.restore_scope(scope);
    ref_node
}

fn has_override(cell: &TableCell) -> bool {
    get_metadata_lenient::<CellMetadata>(&cell.dataset).is_some_and(|m| m.has_override())
}

fn apply_dimensions(dom: &mut Dom, td: NodeId, width: f64, height: f64) {
    if width > 0.0 {
        dom.set_style(td, "width", &px(width));
    }
    if height > 0.0 {
        dom.set_style(td, "height", &px(height));
    }
}

fn create_cell(dom: &mut Dom, cell: &TableCell, context: &mut ModelToDomContext) -> NodeId {
    let td = dom.create_element(if cell.is_header { "th" } else { "td" });
    cell.format.apply_to(dom, td, &mut context.format);
    td
}
