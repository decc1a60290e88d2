// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::delete::{delete_selection, InsertPoint};
use crate::editor::{ChangedEntity, FormatContentModelContext};
use crate::model::{
    blocks_at_path_mut, clear_selection, find_marker, Block,
    ContentModelDocument, MergeFormat, Paragraph, Segment, SegmentFormat,
};

#[derive(Clone, Debug, Default)]
pub struct MergeModelOptions {
    /// Insert here instead of at the current selection, which is then
    /// left alone.
    pub insert_position: Option<InsertPoint>,
    /// Give merged segments the format of the caret they replace, under
    /// their own format.
    pub inherit_caret_format: bool,
}

/// Insert the blocks of `source` into `target` at the selection (deleted
/// first) or at the given position. The paragraph holding the caret is
/// split around blocks that cannot join it. Returns where the caret is
/// afterwards, at the end of the merged content.
pub fn merge_model(
    target: &mut ContentModelDocument,
    mut source: ContentModelDocument,
    context: &mut FormatContentModelContext,
    options: MergeModelOptions,
) -> Option<InsertPoint> {
    let insert_point = match options.insert_position {
        Some(point) => point,
        None => delete_selection(target, context).insert_point?,
    };
    let caret_format = insert_point.format.clone();
    let position = &insert_point.position;

    clear_selection(&mut source.blocks);
    collect_new_entities(&source.blocks, context);

    let group = blocks_at_path_mut(&mut target.blocks, &position.path)?;
    let Some(Block::Paragraph(paragraph)) = group.get_mut(position.block_index) else {
        return None;
    };

    let split_at = position.segment_index.min(paragraph.segments.len());
    let mut tail = paragraph.segments.split_off(split_at);
    if tail.first().is_some_and(Segment::is_marker) {
        tail.remove(0);
    }
    let shell = Paragraph {
        segments: Vec::new(),
        cached_element: None,
        marker: None,
        ..paragraph.clone()
    };
    paragraph.invalidate();

    let adapt = |segments: Vec<Segment>| -> Vec<Segment> {
        segments
            .into_iter()
            .map(|mut segment| {
                if options.inherit_caret_format {
                    let mut format = caret_format.clone();
                    format.merge_from(segment.format());
                    *segment.format_mut() = format;
                }
                segment
            })
            .collect()
    };

    let mut blocks = source.blocks.into_iter().peekable();
    if let Some(Block::Paragraph(_)) = blocks.peek() {
        if let Some(Block::Paragraph(first)) = blocks.next() {
            paragraph.segments.extend(adapt(first.segments));
        }
    }
    let mut rest: Vec<Block> = blocks.collect();

    if rest.is_empty() {
        paragraph.segments.push(Segment::marker(caret_format.clone()));
        paragraph.segments.extend(tail);
    } else {
        let mut last = shell;
        if let Some(Block::Paragraph(_)) = rest.last() {
            if let Some(Block::Paragraph(source_last)) = rest.pop() {
                last.segments = adapt(source_last.segments);
            }
        }
        last.segments.push(Segment::marker(caret_format.clone()));
        last.segments.extend(tail);
        rest.push(Block::Paragraph(last));

        let at = position.block_index + 1;
        group.splice(at..at, rest);
    }

    find_marker(&target.blocks).map(|position| InsertPoint {
        position,
        format: caret_format,
    })
}

fn collect_new_entities(blocks: &[Block], context: &mut FormatContentModelContext) {
    for block in blocks {
        match block {
            Block::Entity(entity) => context.new_entities.push(ChangedEntity::new_entity(entity)),
            Block::Paragraph(paragraph) => {
                for segment in &paragraph.segments {
                    match segment {
                        Segment::Entity(entity) => context.new_entities.push(ChangedEntity::new_entity(entity)),
                        Segment::Image(image) => context.new_images.push(image.src.clone()),
                        _ => {}
                    }
                }
            }
            Block::Table(table) => {
                for cell in table.rows.iter().flat_map(|r| r.cells.iter()) {
                    collect_new_entities(&cell.blocks, context);
                }
            }
            other => {
                if let Some(children) = other.child_blocks() {
                    collect_new_entities(children, context);
                }
            }
        }
    }
}

/// A single implicit paragraph holding `segments`, ready to be merged.
pub fn segments_document(segments: Vec<Segment>) -> ContentModelDocument {
    let mut paragraph = Paragraph::new(true);
    paragraph.segments = segments;
    let mut document = ContentModelDocument::with_format(SegmentFormat::default());
    document.blocks.push(Block::Paragraph(paragraph));
    document
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::model::{Table, TableRow};

    fn target(text_before: &str, text_after: &str) -> ContentModelDocument {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::text(text_before, SegmentFormat::default()));
        paragraph.segments.push(Segment::marker(SegmentFormat {
            font_size: Some("20px".into()),
            ..Default::default()
        }));
        paragraph.segments.push(Segment::text(text_after, SegmentFormat::default()));
        let mut model = ContentModelDocument::new();
        model.blocks.push(Block::Paragraph(paragraph));
        model
    }

    #[test]
    fn segments_join_the_caret_paragraph() {
        let mut model = target("a", "c");
        let source = segments_document(vec![Segment::text("b", SegmentFormat::default())]);

        let point = merge_model(
            &mut model,
            source,
            &mut FormatContentModelContext::default(),
            MergeModelOptions {
                inherit_caret_format: true,
                ..Default::default()
            },
        );

        let paragraph = model.blocks[0].as_paragraph().unwrap();
        assert_that!(paragraph.text()).is_equal_to("abc".to_owned());
        assert_that!(paragraph.segments[1].format().font_size.as_deref()).is_equal_to(Some("20px"));
        assert_that!(point.map(|p| p.position.segment_index)).is_equal_to(Some(2));
    }

    #[test]
    fn blocks_split_the_caret_paragraph() {
        let mut model = target("a", "c");
        let mut table = Table::default();
        table.rows.push(TableRow::default());
        let mut source = ContentModelDocument::new();
        source.blocks.push(Block::Table(table));

        merge_model(
            &mut model,
            source,
            &mut FormatContentModelContext::default(),
            MergeModelOptions::default(),
        );

        assert_that!(model.blocks).has_length(3);
        assert_that!(model.blocks[0].as_paragraph().unwrap().text()).is_equal_to("a".to_owned());
        assert_that!(matches!(model.blocks[1], Block::Table(_))).is_true();
        let tail = model.blocks[2].as_paragraph().unwrap();
        assert_that!(tail.text()).is_equal_to("c".to_owned());
        assert_that!(tail.segments[0].is_marker()).is_true();
    }

    #[test]
    fn without_a_caret_nothing_is_merged() {
        let mut model = ContentModelDocument::new();
        let source = segments_document(vec![Segment::text("b", SegmentFormat::default())]);
        let point = merge_model(
            &mut model,
            source,
            &mut FormatContentModelContext::default(),
            MergeModelOptions::default(),
        );
        assert_that!(point).is_none();
        assert_that!(model.blocks).is_empty();
    }
}
