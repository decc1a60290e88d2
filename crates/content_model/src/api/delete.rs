// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::Display;

use crate::editor::{ChangedEntity, EntityOperation, FormatContentModelContext};
use crate::model::{
    blocks_at_path_mut, find_marker, get_model_selection, segment_at,
    selected_paragraphs, set_caret_at_paragraph_start, Block,
    ContentModelDocument, GroupStep, ModelSelection, Paragraph, Segment,
    SegmentFormat, SegmentPosition, Table,
};

/// Where new content goes: the selection marker left after deleting the
/// selection, and the format typing there would get.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertPoint {
    pub position: SegmentPosition,
    pub format: SegmentFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum DeleteResult {
    /// There is no selection in the model.
    NothingToDelete,
    /// The selection was already collapsed.
    NotDeleted,
    Range,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteSelectionResult {
    pub result: DeleteResult,
    pub insert_point: Option<InsertPoint>,
}

impl DeleteSelectionResult {
    fn new(result: DeleteResult, model: &ContentModelDocument, format: SegmentFormat) -> Self {
        Self {
            result,
            insert_point: find_marker(&model.blocks).map(|position| InsertPoint { position, format }),
        }
    }
}

/// Remove whatever is selected and leave a selection marker in its place.
/// Entities removed on the way are recorded in `context`.
pub fn delete_selection(
    model: &mut ContentModelDocument,
    context: &mut FormatContentModelContext,
) -> DeleteSelectionResult {
    match get_model_selection(&model.blocks) {
        ModelSelection::None => DeleteSelectionResult {
            result: DeleteResult::NothingToDelete,
            insert_point: None,
        },
        ModelSelection::Collapsed(position) => {
            let format = segment_at(&model.blocks, &position)
                .map(|s| s.format().clone())
                .unwrap_or_default();
            DeleteSelectionResult {
                result: DeleteResult::NotDeleted,
                insert_point: Some(InsertPoint { position, format }),
            }
        }
        ModelSelection::Image(start) | ModelSelection::Range { start, .. } => {
            delete_range(model, start, context)
        }
        ModelSelection::Table {
            path,
            block_index,
            first_row,
            first_column,
            last_row,
            last_column,
        } => delete_table_cells(
            model,
            &path,
            block_index,
            (first_row, first_column, last_row, last_column),
            context,
        ),
    }
}

fn delete_range(
    model: &mut ContentModelDocument,
    start: SegmentPosition,
    context: &mut FormatContentModelContext,
) -> DeleteSelectionResult {
    let format = segment_at(&model.blocks, &start)
        .map(|s| s.format().clone())
        .unwrap_or_default();
    let paragraphs = selected_paragraphs(&model.blocks);

    for (path, index) in &paragraphs {
        let Some(Block::Paragraph(paragraph)) =
            blocks_at_path_mut(&mut model.blocks, path).and_then(|g| g.get_mut(*index))
        else {
            continue;
        };
        remove_selected_segments(paragraph, context);
        if *path == start.path && *index == start.block_index {
            let at = start.segment_index.min(paragraph.segments.len());
            paragraph.segments.insert(at, Segment::marker(format.clone()));
        }
    }

    // The rest of the last paragraph joins the first one when both live in
    // the same block group.
    if let Some((end_path, end_index)) = paragraphs.last() {
        if *end_path == start.path && *end_index > start.block_index {
            if let Some(group) = blocks_at_path_mut(&mut model.blocks, &start.path) {
                merge_paragraph_into(group, start.block_index, *end_index);
            }
        }
    }

    remove_selected_blocks(&mut model.blocks, context);
    DeleteSelectionResult::new(DeleteResult::Range, model, format)
}

fn remove_selected_segments(paragraph: &mut Paragraph, context: &mut FormatContentModelContext) {
    for segment in paragraph.segments.iter().filter(|s| s.is_selected()) {
        if let Segment::Entity(entity) = segment {
            context.deleted_entities.push(ChangedEntity {
                wrapper: entity.wrapper,
                entity_type: entity.info.entity_type.clone(),
                operation: EntityOperation::Overwrite,
            });
        }
    }
    paragraph.segments.retain(|s| !s.is_selected());
    paragraph.invalidate();
}

/// Move the segments of the paragraph at `end` to the paragraph at
/// `start`, dropping the blocks in between that were emptied.
fn merge_paragraph_into(group: &mut Vec<Block>, start: usize, end: usize) {
    let Some(Block::Paragraph(end_paragraph)) = group.get_mut(end) else {
        return;
    };
    let tail = std::mem::take(&mut end_paragraph.segments);
    group.remove(end);
    for index in (start + 1..end).rev() {
        if is_emptied(&group[index]) {
            group.remove(index);
        }
    }
    if let Some(Block::Paragraph(start_paragraph)) = group.get_mut(start) {
        start_paragraph.segments.extend(tail);
        start_paragraph.invalidate();
    }
}

/// A block left with nothing to show once its selected content is gone.
fn is_emptied(block: &Block) -> bool {
    match block {
        Block::Paragraph(p) => p.segments.is_empty(),
        Block::Table(t) => t
            .rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .all(|c| c.blocks.iter().all(is_emptied)),
        other => other
            .child_blocks()
            .is_some_and(|blocks| blocks.iter().all(is_emptied)),
    }
}

/// Drop selected entities, dividers and unknown blocks anywhere in
/// `blocks`.
fn remove_selected_blocks(blocks: &mut Vec<Block>, context: &mut FormatContentModelContext) {
    blocks.retain(|block| match block {
        Block::Entity(entity) if entity.is_selected => {
            context.deleted_entities.push(ChangedEntity {
                wrapper: entity.wrapper,
                entity_type: entity.info.entity_type.clone(),
                operation: EntityOperation::Overwrite,
            });
            false
        }
        Block::Divider(divider) => !divider.is_selected,
        Block::General(general) => !general.is_selected,
        _ => true,
    });
    for block in blocks.iter_mut() {
        match block {
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
                    remove_selected_blocks(&mut cell.blocks, context);
                }
            }
            other => {
                if let Some(children) = other.child_blocks_mut() {
                    remove_selected_blocks(children, context);
                }
            }
        }
    }
}

fn delete_table_cells(
    model: &mut ContentModelDocument,
    path: &[GroupStep],
    block_index: usize,
    (first_row, first_column, last_row, last_column): (usize, usize, usize, usize),
    context: &mut FormatContentModelContext,
) -> DeleteSelectionResult {
    let format = model.format.clone();
    let Some(group) = blocks_at_path_mut(&mut model.blocks, path) else {
        return DeleteSelectionResult::new(DeleteResult::NothingToDelete, model, format);
    };
    let Some(Block::Table(table)) = group.get_mut(block_index) else {
        return DeleteSelectionResult::new(DeleteResult::NothingToDelete, model, format);
    };

    let whole_table = first_row == 0
        && first_column == 0
        && last_row + 1 >= table.row_count()
        && last_column + 1 >= table.column_count();

    if whole_table {
        let mut entities = Vec::new();
        collect_table_entities(table, &mut entities);
        context.deleted_entities.extend(entities);
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::br(format.clone()));
        group[block_index] = Block::Paragraph(paragraph);
        set_caret_at_paragraph_start(&mut model.blocks, path, block_index);
        return DeleteSelectionResult::new(DeleteResult::Range, model, format);
    }

    for r in first_row..=last_row {
        for c in first_column..=last_column {
            let Some(cell) = table.cell_mut(r, c) else {
                continue;
            };
            if cell.is_span() {
                continue;
            }
            let mut entities = Vec::new();
            collect_entities(&cell.blocks, &mut entities);
            context.deleted_entities.extend(entities);
            cell.blocks = vec![Block::Paragraph(Paragraph::with_br())];
            cell.invalidate();
        }
    }
    table.cached_element = None;

    let (row, col) = table.head_cell_of(first_row, first_column);
    let mut cell_path = path.to_vec();
    cell_path.push(GroupStep::cell(block_index, row, col));
    set_caret_at_paragraph_start(&mut model.blocks, &cell_path, 0);
    DeleteSelectionResult::new(DeleteResult::Range, model, format)
}

fn collect_table_entities(table: &Table, out: &mut Vec<ChangedEntity>) {
    for cell in table.rows.iter().flat_map(|r| r.cells.iter()) {
        collect_entities(&cell.blocks, out);
    }
}

fn collect_entities(blocks: &[Block], out: &mut Vec<ChangedEntity>) {
    for block in blocks {
        match block {
            Block::Entity(entity) => out.push(ChangedEntity {
                wrapper: entity.wrapper,
                entity_type: entity.info.entity_type.clone(),
                operation: EntityOperation::Overwrite,
            }),
            Block::Paragraph(paragraph) => {
                for segment in &paragraph.segments {
                    if let Segment::Entity(entity) = segment {
                        out.push(ChangedEntity {
                            wrapper: entity.wrapper,
                            entity_type: entity.info.entity_type.clone(),
                            operation: EntityOperation::Overwrite,
                        });
                    }
                }
            }
            Block::Table(table) => collect_table_entities(table, out),
            other => {
                if let Some(children) = other.child_blocks() {
                    collect_entities(children, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::model::{Table, TableCell, TableRow, Text};

    fn text(t: &str, selected: bool) -> Segment {
        let mut text = Text::new(t, SegmentFormat::default());
        text.is_selected = selected;
        Segment::Text(text)
    }

    fn paragraph(segments: Vec<Segment>) -> Block {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments = segments;
        Block::Paragraph(paragraph)
    }

    fn texts(model: &ContentModelDocument) -> Vec<String> {
        model
            .blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .map(Paragraph::text)
            .collect()
    }

    #[test]
    fn no_selection_means_nothing_to_delete() {
        let mut model = ContentModelDocument::new();
        model.blocks.push(paragraph(vec![text("a", false)]));
        let result = delete_selection(&mut model, &mut FormatContentModelContext::default());
        assert_that!(result.result).is_equal_to(DeleteResult::NothingToDelete);
        assert_that!(result.insert_point).is_none();
    }

    #[test]
    fn caret_is_the_insert_point() {
        let mut model = ContentModelDocument::new();
        model.blocks.push(paragraph(vec![
            text("a", false),
            Segment::marker(SegmentFormat::default()),
        ]));
        let result = delete_selection(&mut model, &mut FormatContentModelContext::default());
        assert_that!(result.result).is_equal_to(DeleteResult::NotDeleted);
        assert_that!(result.insert_point.map(|p| p.position.segment_index)).is_equal_to(Some(1));
    }

    #[test]
    fn range_across_paragraphs_joins_them() {
        let mut model = ContentModelDocument::new();
        model.blocks.push(paragraph(vec![text("ab", false), text("cd", true)]));
        model.blocks.push(paragraph(vec![text("ef", true)]));
        model.blocks.push(paragraph(vec![text("gh", true), text("ij", false)]));

        let result = delete_selection(&mut model, &mut FormatContentModelContext::default());

        assert_that!(result.result).is_equal_to(DeleteResult::Range);
        assert_that!(texts(&model)).is_equal_to(vec!["abij".to_owned()]);
        let position = result.insert_point.unwrap().position;
        assert_that!(position.block_index).is_equal_to(0);
        assert_that!(position.segment_index).is_equal_to(1);
    }

    #[test]
    fn deleted_entities_are_reported() {
        let mut dom = crate::dom::Dom::new();
        let wrapper = dom.create_element("span");
        let mut entity = crate::model::Entity::new(wrapper, Default::default());
        entity.is_selected = true;
        let mut model = ContentModelDocument::new();
        model.blocks.push(paragraph(vec![text("a", true), Segment::Entity(entity)]));
        let mut context = FormatContentModelContext::default();

        delete_selection(&mut model, &mut context);

        assert_that!(context.deleted_entities.iter().map(|e| e.wrapper).collect::<Vec<_>>())
            .is_equal_to(vec![wrapper]);
    }

    #[test]
    fn selected_cells_are_emptied() {
        let mut table = Table::default();
        let mut row = TableRow::default();
        for (t, selected) in [("a", true), ("b", false)] {
            let mut cell = TableCell::default();
            cell.blocks.push(paragraph(vec![text(t, false)]));
            cell.is_selected = selected;
            row.cells.push(cell);
        }
        table.rows.push(row);
        let mut model = ContentModelDocument::new();
        model.blocks.push(Block::Table(table));

        let result = delete_selection(&mut model, &mut FormatContentModelContext::default());

        let Block::Table(table) = &model.blocks[0] else {
            panic!("expected a table")
        };
        assert_that!(table.rows[0].cells[0].blocks[0].as_paragraph().unwrap().text())
            .is_equal_to(String::new());
        assert_that!(table.rows[0].cells[1].blocks[0].as_paragraph().unwrap().text())
            .is_equal_to("b".to_owned());
        assert_that!(result.insert_point.map(|p| p.position.path))
            .is_equal_to(Some(vec![GroupStep::cell(0, 0, 0)]));
    }

    #[test]
    fn deleting_a_whole_table_reports_its_entities() {
        let mut dom = crate::dom::Dom::new();
        let wrapper = dom.create_element("span");
        let entity = crate::model::Entity::new(wrapper, Default::default());

        let mut inner = Table::default();
        let mut inner_row = TableRow::default();
        let mut inner_cell = TableCell::default();
        inner_cell.blocks.push(paragraph(vec![Segment::Entity(entity)]));
        inner_row.cells.push(inner_cell);
        inner.rows.push(inner_row);

        let mut table = Table::default();
        let mut row = TableRow::default();
        let mut cell = TableCell::default();
        cell.blocks.push(Block::Table(inner));
        cell.is_selected = true;
        row.cells.push(cell);
        table.rows.push(row);
        let mut model = ContentModelDocument::new();
        model.blocks.push(Block::Table(table));
        let mut context = FormatContentModelContext::default();

        let result = delete_selection(&mut model, &mut context);

        assert_that!(result.result).is_equal_to(DeleteResult::Range);
        assert_that!(context.deleted_entities.iter().map(|e| e.wrapper).collect::<Vec<_>>())
            .is_equal_to(vec![wrapper]);
        assert_that!(matches!(model.blocks[0], Block::Paragraph(_))).is_true();
    }
}
