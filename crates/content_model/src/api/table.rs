// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::delete::{delete_selection, InsertPoint};
use super::indentation::adjust_table_indentation;
use super::merge::{merge_model, MergeModelOptions};
use super::table_format::{apply_table_format, default_table_metadata};
use crate::editor::{
    AnnounceData, ChangeSource, EditorCore, FormatContentModelOptions,
    KnownAnnounceString,
};
use crate::model::metadata::TableMetadata;
use crate::model::{
    blocks_at_path_mut, find_marker, normalize_table,
    set_caret_at_paragraph_start, Block, ContentModelDocument, GroupStep, Table,
    TableCell, TableCellFormat, TableRow,
};

const DEFAULT_CELL_VERTICAL_ALIGN: &str = "top";
const DEFAULT_CELL_WIDTH: f64 = 120.0;

/// A plain `rows` x `columns` grid of empty cells, without spans.
pub fn create_table_structure(columns: usize, rows: usize, cell_format: &TableCellFormat) -> Table {
    let mut table = Table::default();
    for _ in 0..rows {
        let mut row = TableRow::default();
        for _ in 0..columns {
            row.cells.push(TableCell::with_empty_paragraph(cell_format.clone()));
        }
        table.rows.push(row);
    }
    table.widths = vec![DEFAULT_CELL_WIDTH; columns];
    table
}

/// Replace the selection with a new table and put the caret in its first
/// cell. Whitespace typed before the caret becomes the table's start
/// margin. Cells are aligned to the top unless `cell_format` says
/// otherwise.
pub fn insert_table(
    editor: &mut EditorCore,
    columns: usize,
    rows: usize,
    format: Option<TableMetadata>,
    cell_format: Option<TableCellFormat>,
) -> bool {
    if columns == 0 || rows == 0 {
        return false;
    }
    let direction = editor.format_context().direction;
    editor.format_content_model(
        |model, context| {
            let Some(InsertPoint { position, format: caret_format }) =
                delete_selection(model, context).insert_point
            else {
                return false;
            };

            let mut cell_format = cell_format.unwrap_or_default();
            cell_format
                .vertical_align
                .get_or_insert_with(|| DEFAULT_CELL_VERTICAL_ALIGN.to_owned());
            let mut table = create_table_structure(columns, rows, &cell_format);

            if let Some(Block::Paragraph(paragraph)) = blocks_at_path_mut(&mut model.blocks, &position.path)
                .and_then(|group| group.get_mut(position.block_index))
            {
                let direction = paragraph.format.direction.unwrap_or(direction);
                adjust_table_indentation(paragraph, &mut table, direction);
            }
            // Taking the indentation out may have moved the caret.
            let Some(position) = find_marker(&model.blocks) else {
                return false;
            };
            normalize_table(&mut table, &model.format);
            apply_table_format(
                &mut table,
                Some(&format.clone().unwrap_or_else(default_table_metadata)),
                false,
            );

            let mut source = ContentModelDocument::with_format(model.format.clone());
            source.blocks.push(Block::Table(table));
            let path = position.path.clone();
            let table_index = position.block_index + 1;
            merge_model(
                model,
                source,
                context,
                MergeModelOptions {
                    insert_position: Some(InsertPoint {
                        position,
                        format: caret_format,
                    }),
                    inherit_caret_format: false,
                },
            );

            let mut cell_path = path;
            cell_path.push(GroupStep::cell(table_index, 0, 0));
            set_caret_at_paragraph_start(&mut model.blocks, &cell_path, 0);
            context.announce_data = Some(AnnounceData::known(
                KnownAnnounceString::TableInserted,
                vec![rows.to_string(), columns.to_string()],
            ));
            true
        },
        FormatContentModelOptions::new("insertTable").with_source(ChangeSource::InsertTable),
    )
}
