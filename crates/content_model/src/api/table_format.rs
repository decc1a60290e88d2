// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Table styling from a [TableMetadata] record: borders from a named
//! preset, banded backgrounds, a header row and a header column.

use log::warn;

use crate::model::metadata::{
    get_metadata_lenient, update_metadata, CellMetadata, TableBorderFormat,
    TableMetadata,
};
use crate::model::{Borders, Dataset, Table, TableCellFormat};

const DEFAULT_BORDER_COLOR: &str = "#ABABAB";
const DEFAULT_BORDER_STYLE: &str = "1px solid";
const BANDED_ODD_COLOR: &str = "#ABABAB20";
const NO_BORDER: &str = "none";

/// The format a table gets when neither the caller nor the table itself
/// says otherwise.
pub fn default_table_metadata() -> TableMetadata {
    TableMetadata {
        top_border_color: Some(DEFAULT_BORDER_COLOR.to_owned()),
        bottom_border_color: Some(DEFAULT_BORDER_COLOR.to_owned()),
        vertical_border_color: Some(DEFAULT_BORDER_COLOR.to_owned()),
        has_header_row: false,
        header_row_color: Some(DEFAULT_BORDER_COLOR.to_owned()),
        has_first_column: false,
        has_banded_columns: false,
        has_banded_rows: false,
        bg_color_even: None,
        bg_color_odd: Some(BANDED_ODD_COLOR.to_owned()),
        table_border_format: Some(TableBorderFormat::Default),
        vertical_align: None,
    }
}

#[derive(Clone, Copy, Debug)]
struct CellPosition {
    first_row: bool,
    last_row: bool,
    first_column: bool,
    last_column: bool,
}

/// Sides of a cell, in `[top, right, bottom, left]` order, that a preset
/// leaves without a border.
fn hidden_sides(format: TableBorderFormat, p: CellPosition) -> [bool; 4] {
    use TableBorderFormat::*;
    match format {
        Default => [false; 4],
        ListWithSideBorders => [false, !p.last_column, false, !p.first_column],
        NoHeaderBorders => [
            p.first_row,
            p.first_row || p.last_column,
            false,
            p.first_row || p.first_column,
        ],
        NoSideBorders => [false, p.last_column, false, p.first_column],
        FirstColumnHeaderExternal => [
            !p.first_row && !p.first_column,
            !p.first_column && !p.last_column,
            !p.last_row && !p.first_column,
            !p.first_column,
        ],
        EspecialType1 => [
            p.first_column && !p.first_row,
            p.first_row,
            p.first_column && !p.first_row,
            p.first_row && !p.first_column,
        ],
        EspecialType2 => [
            !p.first_row,
            p.first_row || !p.first_column,
            !p.first_row,
            !p.first_column,
        ],
        EspecialType3 => [true, p.first_row || !p.first_column, !p.first_row, true],
        Clear => [true; 4],
    }
}

fn border(color: Option<&str>) -> Option<String> {
    Some(match color {
        Some(color) => format!("{DEFAULT_BORDER_STYLE} {color}"),
        None => NO_BORDER.to_owned(),
    })
}

fn side_mut(borders: &mut Borders, side: usize) -> &mut Option<String> {
    match side {
        0 => &mut borders.top,
        1 => &mut borders.right,
        2 => &mut borders.bottom,
        _ => &mut borders.left,
    }
}

/// Restyle every cell of `table` from `format`, or from the format stored
/// on the table when `format` is `None`. Cells whose border or background
/// was set by hand keep it; with `keep_cell_shade` off, hand-set
/// backgrounds are reset as well. Only cells that actually change lose
/// their cached element. Returns whether anything changed.
pub fn apply_table_format(
    table: &mut Table,
    format: Option<&TableMetadata>,
    keep_cell_shade: bool,
) -> bool {
    let metadata = match format {
        Some(format) => format.clone(),
        None => get_metadata_lenient(&table.dataset).unwrap_or_else(default_table_metadata),
    };
    let border_format = metadata.table_border_format.unwrap_or_default();
    let row_count = table.rows.len();
    let mut changed = false;

    for (r, row) in table.rows.iter_mut().enumerate() {
        let column_count = row.cells.len();
        for (c, cell) in row.cells.iter_mut().enumerate() {
            let mut dataset = cell.dataset.clone();
            let cell_metadata: CellMetadata = get_metadata_lenient(&dataset).unwrap_or_default();
            if !keep_cell_shade && cell_metadata.bg_color_override() {
                set_metadata(&mut dataset, |m: Option<CellMetadata>| {
                    m.map(|m| CellMetadata {
                        bg_color_override: None,
                        ..m
                    })
                });
            }
            let keep_background = keep_cell_shade && cell_metadata.bg_color_override();

            let position = CellPosition {
                first_row: r == 0,
                last_row: r + 1 == row_count,
                first_column: c == 0,
                last_column: c + 1 == column_count,
            };
            let mut new_format = cell.format.clone();
            let mut is_header = false;

            if !cell_metadata.border_override() {
                let colors = [
                    metadata.top_border_color.as_deref(),
                    metadata.vertical_border_color.as_deref(),
                    metadata.bottom_border_color.as_deref(),
                    metadata.vertical_border_color.as_deref(),
                ];
                for (side, hidden) in hidden_sides(border_format, position).into_iter().enumerate() {
                    *side_mut(&mut new_format.borders, side) =
                        border(if hidden { None } else { colors[side] });
                }
            }

            if !keep_background {
                let banded = (metadata.has_banded_columns && c % 2 != 0)
                    || (metadata.has_banded_rows && r % 2 != 0);
                new_format.background_color = if banded {
                    metadata.bg_color_odd.clone()
                } else {
                    metadata.bg_color_even.clone()
                };
            }

            if let Some(align) = &metadata.vertical_align {
                if !cell_metadata.v_align_override() {
                    new_format.vertical_align = Some(align.clone());
                }
            }

            if metadata.has_first_column && c == 0 {
                is_header = true;
                if !cell_metadata.border_override() && r > 0 {
                    new_format.borders.top = border(None);
                    if !position.last_row {
                        new_format.borders.bottom = border(None);
                    }
                }
            }

            if r == 0 {
                is_header = metadata.has_header_row;
                if let (true, Some(color)) = (metadata.has_header_row, &metadata.header_row_color) {
                    if !keep_background {
                        new_format.background_color = Some(color.clone());
                    }
                    if !cell_metadata.border_override() {
                        for side in [0, 1, 3] {
                            *side_mut(&mut new_format.borders, side) = border(Some(color));
                        }
                    }
                }
            }

            changed |= update_cell(cell, new_format, is_header, dataset);
        }
    }

    let mut dataset = table.dataset.clone();
    set_metadata(&mut dataset, |_: Option<TableMetadata>| Some(metadata));
    if dataset != table.dataset {
        table.dataset = dataset;
        table.cached_element = None;
        changed = true;
    }
    changed
}

fn update_cell(
    cell: &mut crate::model::TableCell,
    format: TableCellFormat,
    is_header: bool,
    dataset: Dataset,
) -> bool {
    if cell.format == format && cell.is_header == is_header && cell.dataset == dataset {
        return false;
    }
    cell.format = format;
    cell.is_header = is_header;
    cell.dataset = dataset;
    cell.invalidate();
    true
}

fn set_metadata<T, F>(dataset: &mut Dataset, callback: F)
where
    T: serde::de::DeserializeOwned + serde::Serialize,
    F: FnOnce(Option<T>) -> Option<T>,
{
    if let Err(e) = update_metadata(dataset, callback) {
        warn!("Failed to store table editing info: {e}");
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::Dom;
    use crate::model::metadata::EDITING_INFO_KEY;
    use crate::model::{TableCell, TableRow};

    fn grid(rows: usize, columns: usize) -> Table {
        let mut table = Table::default();
        for _ in 0..rows {
            let mut row = TableRow::default();
            for _ in 0..columns {
                row.cells.push(TableCell::with_empty_paragraph(Default::default()));
            }
            table.rows.push(row);
        }
        table
    }

    fn borders(table: &Table, r: usize, c: usize) -> [Option<String>; 4] {
        let b = &table.rows[r].cells[c].format.borders;
        [b.top.clone(), b.right.clone(), b.bottom.clone(), b.left.clone()]
    }

    #[test]
    fn no_side_borders_with_banded_rows() {
        let mut table = grid(3, 4);
        let format = TableMetadata {
            table_border_format: Some(TableBorderFormat::NoSideBorders),
            has_banded_rows: true,
            ..default_table_metadata()
        };
        apply_table_format(&mut table, Some(&format), false);

        let solid = Some("1px solid #ABABAB".to_owned());
        let none = Some("none".to_owned());
        for r in 0..3 {
            let expected = (r % 2 == 1).then(|| "#ABABAB20".to_owned());
            for c in 0..4 {
                assert_that!(table.rows[r].cells[c].format.background_color.clone())
                    .is_equal_to(expected.clone());
            }
            assert_that!(borders(&table, r, 0)).is_equal_to([
                solid.clone(),
                solid.clone(),
                solid.clone(),
                none.clone(),
            ]);
            assert_that!(borders(&table, r, 3)).is_equal_to([
                solid.clone(),
                none.clone(),
                solid.clone(),
                solid.clone(),
            ]);
            assert_that!(borders(&table, r, 1)).is_equal_to([
                solid.clone(),
                solid.clone(),
                solid.clone(),
                solid.clone(),
            ]);
        }
    }

    #[test]
    fn second_pass_keeps_cached_elements() {
        let mut dom = Dom::new();
        let mut table = grid(2, 2);
        apply_table_format(&mut table, None, false);
        let element = dom.create_element("td");
        for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
            cell.cached_element = Some(element);
        }
        table.cached_element = Some(element);
        let styles: Vec<TableCellFormat> = table
            .rows
            .iter()
            .flat_map(|r| r.cells.iter().map(|c| c.format.clone()))
            .collect();

        let changed = apply_table_format(&mut table, None, false);

        assert_that!(changed).is_false();
        assert_that!(table.cached_element).is_equal_to(Some(element));
        for (cell, style) in table.rows.iter().flat_map(|r| r.cells.iter()).zip(styles) {
            assert_that!(cell.cached_element).is_equal_to(Some(element));
            assert_that!(cell.format).is_equal_to(style);
        }
    }

    #[test]
    fn shaded_cells_keep_their_background_when_asked() {
        let mut table = grid(2, 2);
        table.rows[1].cells[1].format.background_color = Some("red".into());
        table.rows[1].cells[1].dataset.insert(
            EDITING_INFO_KEY.to_owned(),
            r#"{"bgColorOverride":true}"#.to_owned(),
        );
        let format = TableMetadata {
            has_banded_rows: true,
            ..default_table_metadata()
        };

        apply_table_format(&mut table, Some(&format), true);
        assert_that!(table.rows[1].cells[1].format.background_color.as_deref())
            .is_equal_to(Some("red"));

        apply_table_format(&mut table, Some(&format), false);
        assert_that!(table.rows[1].cells[1].format.background_color.as_deref())
            .is_equal_to(Some("#ABABAB20"));
    }

    #[test]
    fn header_row_gets_header_color() {
        let mut table = grid(2, 2);
        let format = TableMetadata {
            has_header_row: true,
            header_row_color: Some("#000000".into()),
            ..default_table_metadata()
        };
        apply_table_format(&mut table, Some(&format), false);

        let header = &table.rows[0].cells[0];
        assert_that!(header.is_header).is_true();
        assert_that!(header.format.background_color.as_deref()).is_equal_to(Some("#000000"));
        assert_that!(header.format.borders.top.as_deref()).is_equal_to(Some("1px solid #000000"));
        assert_that!(table.rows[1].cells[0].is_header).is_false();
    }

    #[test]
    fn format_is_stored_on_the_table() {
        let mut table = grid(1, 1);
        apply_table_format(&mut table, None, false);
        let stored: Option<TableMetadata> = get_metadata_lenient(&table.dataset);
        assert_that!(stored).is_equal_to(Some(default_table_metadata()));
    }
}
