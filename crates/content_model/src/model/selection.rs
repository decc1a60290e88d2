// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Queries and updates of the selection as it is projected onto the
//! model: selection markers, `is_selected` segment flags and selected
//! table cells.

use super::{blocks_at_path, Block, GroupStep, Paragraph, Segment, Table};

/// Where a segment lives: the path to its block group, the paragraph
/// index in that group and the segment index in the paragraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentPosition {
    pub path: Vec<GroupStep>,
    pub block_index: usize,
    pub segment_index: usize,
}

/// Shape of the selection found in a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelSelection {
    None,
    /// A caret: one marker and nothing else selected.
    Collapsed(SegmentPosition),
    /// Selected segments from `start` to `end`, both inclusive.
    Range {
        start: SegmentPosition,
        end: SegmentPosition,
    },
    Image(SegmentPosition),
    /// Selected cells of the table at `path` + `block_index`.
    Table {
        path: Vec<GroupStep>,
        block_index: usize,
        first_row: usize,
        first_column: usize,
        last_row: usize,
        last_column: usize,
    },
}

/// Call `f` for every paragraph in document order with its group path,
/// its index, and whether it sits in a selected table cell.
pub fn for_each_paragraph<'a>(
    blocks: &'a [Block],
    f: &mut dyn FnMut(&[GroupStep], usize, &'a Paragraph, bool),
) {
    visit(blocks, &mut Vec::new(), false, f);
}

fn visit<'a>(
    blocks: &'a [Block],
    path: &mut Vec<GroupStep>,
    in_selected_cell: bool,
    f: &mut dyn FnMut(&[GroupStep], usize, &'a Paragraph, bool),
) {
    for (index, block) in blocks.iter().enumerate() {
        match block {
            Block::Paragraph(p) => f(path, index, p, in_selected_cell),
            Block::Table(table) => {
                for (r, row) in table.rows.iter().enumerate() {
                    for (c, cell) in row.cells.iter().enumerate() {
                        path.push(GroupStep::cell(index, r, c));
                        visit(&cell.blocks, path, in_selected_cell || cell.is_selected, f);
                        path.pop();
                    }
                }
            }
            other => {
                if let Some(children) = other.child_blocks() {
                    path.push(GroupStep::block(index));
                    visit(children, path, in_selected_cell, f);
                    path.pop();
                }
            }
        }
    }
}

/// Mutable twin of [for_each_paragraph].
pub fn for_each_paragraph_mut(
    blocks: &mut [Block],
    f: &mut dyn FnMut(&[GroupStep], usize, &mut Paragraph, bool),
) {
    visit_mut(blocks, &mut Vec::new(), false, f);
}

fn visit_mut(
    blocks: &mut [Block],
    path: &mut Vec<GroupStep>,
    in_selected_cell: bool,
    f: &mut dyn FnMut(&[GroupStep], usize, &mut Paragraph, bool),
) {
    for (index, block) in blocks.iter_mut().enumerate() {
        match block {
            Block::Paragraph(p) => f(path, index, p, in_selected_cell),
            Block::Table(table) => {
                for (r, row) in table.rows.iter_mut().enumerate() {
                    for (c, cell) in row.cells.iter_mut().enumerate() {
                        path.push(GroupStep::cell(index, r, c));
                        let selected = in_selected_cell || cell.is_selected;
                        visit_mut(&mut cell.blocks, path, selected, f);
                        path.pop();
                    }
                }
            }
            other => {
                if let Some(children) = other.child_blocks_mut() {
                    path.push(GroupStep::block(index));
                    visit_mut(children, path, in_selected_cell, f);
                    path.pop();
                }
            }
        }
    }
}

/// Positions of every selected segment, in document order.
pub fn selected_segments(blocks: &[Block]) -> Vec<SegmentPosition> {
    let mut result = Vec::new();
    for_each_paragraph(blocks, &mut |path, block_index, paragraph, _| {
        for (segment_index, segment) in paragraph.segments.iter().enumerate() {
            if segment.is_selected() {
                result.push(SegmentPosition {
                    path: path.to_vec(),
                    block_index,
                    segment_index,
                });
            }
        }
    });
    result
}

/// Paragraphs holding part of the selection, including every paragraph of
/// a selected table cell. Returned as `(path, block_index)`.
pub fn selected_paragraphs(blocks: &[Block]) -> Vec<(Vec<GroupStep>, usize)> {
    let mut result = Vec::new();
    for_each_paragraph(blocks, &mut |path, block_index, paragraph, in_cell| {
        if in_cell || paragraph.has_selection() {
            result.push((path.to_vec(), block_index));
        }
    });
    result
}

/// The first selection marker, which is the active one when merges leave
/// more than one behind.
pub fn find_marker(blocks: &[Block]) -> Option<SegmentPosition> {
    let mut result = None;
    for_each_paragraph(blocks, &mut |path, block_index, paragraph, _| {
        if result.is_none() {
            if let Some(segment_index) = paragraph.marker_index() {
                result = Some(SegmentPosition {
                    path: path.to_vec(),
                    block_index,
                    segment_index,
                });
            }
        }
    });
    result
}

pub fn paragraph_at<'a>(blocks: &'a [Block], path: &[GroupStep], index: usize) -> Option<&'a Paragraph> {
    blocks_at_path(blocks, path)?.get(index)?.as_paragraph()
}

pub fn segment_at<'a>(blocks: &'a [Block], position: &SegmentPosition) -> Option<&'a Segment> {
    paragraph_at(blocks, &position.path, position.block_index)?
        .segments
        .get(position.segment_index)
}

/// Find the first table with selected cells, depth first.
fn find_selected_table(
    blocks: &[Block],
    path: &mut Vec<GroupStep>,
) -> Option<(Vec<GroupStep>, usize, (usize, usize, usize, usize))> {
    for (index, block) in blocks.iter().enumerate() {
        match block {
            Block::Table(table) => {
                if let Some(rect) = table.selected_rect() {
                    return Some((path.clone(), index, rect));
                }
                for (r, row) in table.rows.iter().enumerate() {
                    for (c, cell) in row.cells.iter().enumerate() {
                        path.push(GroupStep::cell(index, r, c));
                        let found = find_selected_table(&cell.blocks, path);
                        path.pop();
                        if found.is_some() {
                            return found;
                        }
                    }
                }
            }
            other => {
                if let Some(children) = other.child_blocks() {
                    path.push(GroupStep::block(index));
                    let found = find_selected_table(children, path);
                    path.pop();
                    if found.is_some() {
                        return found;
                    }
                }
            }
        }
    }
    None
}

pub fn get_model_selection(blocks: &[Block]) -> ModelSelection {
    if let Some((path, block_index, (r1, c1, r2, c2))) = find_selected_table(blocks, &mut Vec::new()) {
        return ModelSelection::Table {
            path,
            block_index,
            first_row: r1,
            first_column: c1,
            last_row: r2,
            last_column: c2,
        };
    }

    let selected = selected_segments(blocks);
    let Some(first) = selected.first() else {
        return ModelSelection::None;
    };
    if let Some(Segment::Image(image)) = segment_at(blocks, first) {
        if image.is_selected_as_image_selection && selected.len() == 1 {
            return ModelSelection::Image(first.clone());
        }
    }
    let content_selected = selected
        .iter()
        .any(|p| !matches!(segment_at(blocks, p), Some(Segment::SelectionMarker(_))));
    if !content_selected {
        return ModelSelection::Collapsed(first.clone());
    }
    let last = selected.last().cloned().unwrap_or_else(|| first.clone());
    ModelSelection::Range {
        start: first.clone(),
        end: last,
    }
}

/// Remove every selection marker and clear all selection flags. Paragraphs
/// and cells whose selection changed lose their cached element.
pub fn clear_selection(blocks: &mut [Block]) {
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(p) => {
                if p.has_selection() {
                    p.segments.retain(|s| !s.is_marker());
                    for segment in &mut p.segments {
                        segment.set_selected(false);
                        if let Segment::General(general) = segment {
                            clear_selection(&mut general.blocks);
                        }
                    }
                    p.invalidate();
                }
            }
            Block::Table(table) => clear_table_selection(table),
            Block::Divider(d) => d.is_selected = false,
            Block::Entity(e) => e.is_selected = false,
            Block::General(g) => {
                g.is_selected = false;
                clear_selection(&mut g.blocks);
            }
            other => {
                if let Some(children) = other.child_blocks_mut() {
                    clear_selection(children);
                }
            }
        }
    }
}

fn clear_table_selection(table: &mut Table) {
    for row in &mut table.rows {
        for cell in &mut row.cells {
            if cell.is_selected {
                cell.is_selected = false;
                cell.invalidate();
            }
            clear_selection(&mut cell.blocks);
        }
    }
}

/// Put a collapsed selection at the start of the paragraph at `path` +
/// `block_index`. Existing selection is cleared first.
pub fn set_caret_at_paragraph_start(
    blocks: &mut Vec<Block>,
    path: &[GroupStep],
    block_index: usize,
) -> bool {
    clear_selection(blocks);
    let Some(group) = super::blocks_at_path_mut(blocks, path) else {
        return false;
    };
    let Some(Block::Paragraph(paragraph)) = group.get_mut(block_index) else {
        return false;
    };
    let format = paragraph
        .segments
        .first()
        .map(|s| s.format().clone())
        .unwrap_or_default();
    paragraph.segments.insert(0, Segment::marker(format));
    paragraph.invalidate();
    true
}
