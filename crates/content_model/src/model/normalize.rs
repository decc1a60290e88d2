// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::format::SegmentFormat;
use super::{Block, Paragraph, Segment, Table, TableCell};

const DEFAULT_COLUMN_WIDTH: f64 = 120.0;

/// Bring a model into canonical shape. Runs after every conversion and
/// every mutation, and is idempotent.
pub fn normalize_content_model(blocks: &mut Vec<Block>, default_format: &SegmentFormat) {
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(paragraph) => normalize_paragraph(paragraph),
            Block::Table(table) => {
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        normalize_content_model(&mut cell.blocks, default_format);
                    }
                }
                normalize_table(table, default_format);
            }
            Block::FormatContainer(container) => {
                normalize_content_model(&mut container.blocks, default_format)
            }
            Block::ListItem(item) => {
                normalize_content_model(&mut item.blocks, default_format);
                if item.blocks.is_empty() {
                    item.blocks.push(Block::Paragraph(Paragraph::with_br()));
                    item.invalidate();
                }
            }
            Block::General(general) => {
                normalize_content_model(&mut general.blocks, default_format)
            }
            Block::Divider(_) | Block::Entity(_) => {}
        }
    }

    // A paragraph without segments has no height and no caret position,
    // whatever element it came from.
    blocks.retain(|block| match block {
        Block::Paragraph(p) => !p.segments.is_empty(),
        Block::Table(t) => !t.rows.is_empty(),
        _ => true,
    });
}

/// Canonical segments of one paragraph: line breaks for paragraphs that
/// would otherwise collapse, no redundant trailing break, no trailing
/// collapsible space, merged text runs.
pub fn normalize_paragraph(paragraph: &mut Paragraph) {
    let is_pre = paragraph.format.is_pre();
    if !is_pre {
        normalize_trailing_spaces(paragraph);
    }

    paragraph
        .segments
        .retain(|s| !matches!(s, Segment::Text(t) if t.text.is_empty()));

    if !paragraph.is_implicit {
        let segments = &mut paragraph.segments;
        if !segments.is_empty() && segments.iter().all(Segment::is_marker) {
            let format = segments[0].format().clone();
            segments.push(Segment::br(format));
        } else if segments.len() > 1 && matches!(segments.last(), Some(Segment::Br(_))) {
            let content: Vec<&Segment> = segments.iter().filter(|s| !s.is_marker()).collect();
            // A trailing <br> after content only makes the block taller
            // when the content itself ends with a <br>.
            if content.len() > 1 && !matches!(content[content.len() - 2], Segment::Br(_)) {
                segments.pop();
            }
        }
    }

    merge_text_segments(&mut paragraph.segments);
}

/// Collapsible spaces at the end of a paragraph are invisible. Drop them,
/// except right before the caret, where one is kept as a non-breaking
/// space so the caret does not jump back.
fn normalize_trailing_spaces(paragraph: &mut Paragraph) {
    let Some(last_text) = paragraph
        .segments
        .iter()
        .rposition(|s| !matches!(s, Segment::SelectionMarker(_) | Segment::Br(_)))
    else {
        return;
    };
    let caret_follows = paragraph.segments[last_text + 1..]
        .iter()
        .take_while(|s| s.is_marker())
        .count()
        > 0;
    if let Segment::Text(text) = &mut paragraph.segments[last_text] {
        let trimmed = text.text.trim_end_matches(' ');
        if trimmed.len() != text.text.len() {
            let mut new_text = trimmed.to_owned();
            if caret_follows {
                new_text.push('\u{a0}');
            }
            text.text = new_text;
        }
    }
}

/// Join adjacent text segments that render identically: same format, same
/// selection state, and no link or code decoration on either side.
pub fn merge_text_segments(segments: &mut Vec<Segment>) {
    let mut result: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments.drain(..) {
        if let (Some(Segment::Text(previous)), Segment::Text(current)) =
            (result.last_mut(), &segment)
        {
            if previous.format == current.format
                && previous.is_selected == current.is_selected
                && previous.link.is_none()
                && current.link.is_none()
                && previous.code.is_none()
                && current.code.is_none()
            {
                previous.text.push_str(&current.text);
                continue;
            }
        }
        result.push(segment);
    }
    *segments = result;
}

/// Fix up a table grid after conversion or editing: every cell holds a
/// block, the first row and column hold no span placeholders, rows or
/// columns made only of placeholders are folded into their neighbour, and
/// there is one width per column.
pub fn normalize_table(table: &mut Table, default_format: &SegmentFormat) {
    let mut changed = false;

    if table.format.border_collapse.is_none() {
        table.format.border_collapse = Some(true);
        changed = true;
    }

    for (r, row) in table.rows.iter_mut().enumerate() {
        for (c, cell) in row.cells.iter_mut().enumerate() {
            if cell.blocks.is_empty() {
                let mut paragraph = Paragraph::new(false);
                paragraph.segments.push(Segment::br(default_format.clone()));
                cell.blocks.push(Block::Paragraph(paragraph));
                cell.invalidate();
            }
            if cell.format.use_border_box.is_none() {
                cell.format.use_border_box = Some(true);
                cell.invalidate();
            }
            if r == 0 && cell.span_above {
                cell.span_above = false;
                cell.invalidate();
                changed = true;
            }
            if c == 0 && cell.span_left {
                cell.span_left = false;
                cell.invalidate();
                changed = true;
            }
        }
    }

    // Rows where every cell is covered from above collapse into the row
    // above them.
    let mut r = 1;
    while r < table.rows.len() {
        let row = &table.rows[r];
        if !row.cells.is_empty() && row.cells.iter().all(|c| c.span_above) {
            let height = row.height;
            table.rows.remove(r);
            table.rows[r - 1].height += height;
            changed = true;
        } else {
            r += 1;
        }
    }

    let columns = table.column_count();
    let mut c = columns;
    while c > 1 {
        c -= 1;
        let all_span_left = table
            .rows
            .iter()
            .all(|row| row.cells.get(c).map_or(true, |cell| cell.span_left));
        if all_span_left && table.rows.iter().any(|row| row.cells.len() > c) {
            for row in &mut table.rows {
                if c < row.cells.len() {
                    row.cells.remove(c);
                }
            }
            if c < table.widths.len() {
                let width = table.widths.remove(c);
                table.widths[c - 1] += width;
            }
            changed = true;
        }
    }

    let columns = table.column_count();
    for row in &mut table.rows {
        while row.cells.len() < columns {
            let mut paragraph = Paragraph::new(false);
            paragraph.segments.push(Segment::br(default_format.clone()));
            let mut cell = TableCell::default();
            cell.blocks.push(Block::Paragraph(paragraph));
            cell.format.use_border_box = Some(true);
            row.cells.push(cell);
            row.cached_element = None;
            changed = true;
        }
    }
    if table.widths.len() != columns {
        table.widths.resize(columns, DEFAULT_COLUMN_WIDTH);
        changed = true;
    }

    if changed {
        table.cached_element = None;
    }
}

/// Whether a cell is an empty editable cell: one paragraph holding at
/// most markers and a line break.
pub fn is_cell_empty(cell: &TableCell) -> bool {
    match cell.blocks.as_slice() {
        [] => true,
        [Block::Paragraph(p)] => p
            .segments
            .iter()
            .all(|s| matches!(s, Segment::Br(_) | Segment::SelectionMarker(_))),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::model::{Link, TableRow, Text};

    fn text(t: &str, font_size: Option<&str>) -> Segment {
        Segment::Text(Text::new(
            t,
            SegmentFormat {
                font_size: font_size.map(String::from),
                ..Default::default()
            },
        ))
    }

    fn texts(segments: &[Segment]) -> Vec<String> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn same_format_text_segments_merge() {
        let mut segments = vec![text("Hello ", Some("10pt")), text("World", Some("10pt"))];
        merge_text_segments(&mut segments);
        assert_that!(texts(&segments)).is_equal_to(vec!["Hello World".to_owned()]);
    }

    #[test]
    fn differing_font_size_never_merges() {
        let mut segments = vec![text("a", Some("10pt")), text("b", Some("12pt"))];
        merge_text_segments(&mut segments);
        assert_that!(segments).has_length(2);
    }

    #[test]
    fn linked_text_never_merges() {
        let mut linked = Text::new("b", SegmentFormat::default());
        linked.link = Some(Link::default());
        let mut segments = vec![text("a", None), Segment::Text(linked)];
        merge_text_segments(&mut segments);
        assert_that!(segments).has_length(2);
    }

    #[test]
    fn selected_and_unselected_text_stay_apart() {
        let mut selected = Text::new("b", SegmentFormat::default());
        selected.is_selected = true;
        let mut segments = vec![text("a", None), Segment::Text(selected)];
        merge_text_segments(&mut segments);
        assert_that!(segments).has_length(2);
    }

    #[test]
    fn marker_only_paragraph_gets_a_br() {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::marker(SegmentFormat::default()));
        normalize_paragraph(&mut paragraph);

        assert_that!(paragraph.segments).has_length(2);
        assert_that!(matches!(paragraph.segments[1], Segment::Br(_))).is_true();
    }

    #[test]
    fn trailing_br_after_text_is_removed() {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(text("a", None));
        paragraph.segments.push(Segment::br(SegmentFormat::default()));
        normalize_paragraph(&mut paragraph);
        assert_that!(paragraph.segments).has_length(1);
    }

    #[test]
    fn trailing_space_before_caret_becomes_nbsp() {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(text("a  ", None));
        paragraph.segments.push(Segment::marker(SegmentFormat::default()));
        normalize_paragraph(&mut paragraph);
        assert_that!(paragraph.text()).is_equal_to("a\u{a0}".to_owned());

        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(text("a  ", None));
        normalize_paragraph(&mut paragraph);
        assert_that!(paragraph.text()).is_equal_to("a".to_owned());
    }

    #[test]
    fn paragraphs_without_segments_are_removed() {
        let mut blocks = vec![
            Block::Paragraph(Paragraph::new(true)),
            Block::Paragraph(Paragraph::new(false)),
            Block::Paragraph(Paragraph::with_br()),
        ];
        normalize_content_model(&mut blocks, &SegmentFormat::default());
        assert_that!(blocks).has_length(1);
    }

    fn grid(rows: usize, cols: usize) -> Table {
        let mut table = Table::default();
        for _ in 0..rows {
            let mut row = TableRow::default();
            for _ in 0..cols {
                row.cells.push(TableCell::default());
            }
            table.rows.push(row);
        }
        table
    }

    #[test]
    fn normalize_table_fills_cells_and_widths() {
        let mut table = grid(2, 3);
        normalize_table(&mut table, &SegmentFormat::default());

        assert_that!(table.widths).is_equal_to(vec![120.0, 120.0, 120.0]);
        assert_that!(table.rows[1].cells[2].blocks).has_length(1);
    }

    #[test]
    fn normalize_table_removes_invalid_spans() {
        let mut table = grid(2, 2);
        table.rows[0].cells[1].span_above = true;
        table.rows[1].cells[0].span_left = true;
        normalize_table(&mut table, &SegmentFormat::default());

        assert_that!(table.rows[0].cells[1].span_above).is_false();
        assert_that!(table.rows[1].cells[0].span_left).is_false();
    }

    #[test]
    fn normalize_table_folds_placeholder_columns() {
        let mut table = grid(2, 3);
        table.widths = vec![10.0, 20.0, 30.0];
        table.rows[0].cells[2].span_left = true;
        table.rows[1].cells[2].span_left = true;
        normalize_table(&mut table, &SegmentFormat::default());

        assert_that!(table.column_count()).is_equal_to(2);
        assert_that!(table.widths).is_equal_to(vec![10.0, 50.0]);
    }

    #[test]
    fn normalize_table_is_idempotent_on_caches() {
        let mut table = grid(1, 1);
        normalize_table(&mut table, &SegmentFormat::default());
        let node = crate::dom::Dom::new().document();
        table.cached_element = Some(node);
        table.rows[0].cells[0].cached_element = Some(node);
        normalize_table(&mut table, &SegmentFormat::default());

        assert_that!(table.cached_element).is_equal_to(Some(node));
        assert_that!(table.rows[0].cells[0].cached_element).is_equal_to(Some(node));
    }
}
