// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::style::parse_value_with_unit;
use crate::model::{Block, ContentModelDocument, Segment, Spacing};

const BASE_FONT_SIZE_PX: f64 = 16.0;

/// Whether the start or end margin is a positive length. Top and bottom
/// margins don't indent anything.
fn has_side_margin(margin: &Spacing) -> bool {
    [&margin.left, &margin.right].into_iter().flatten().any(|value| {
        parse_value_with_unit(value, BASE_FONT_SIZE_PX).is_some_and(|px| px > 0.0)
    })
}

/// A quick structural check for an empty document: at most one block,
/// and that a paragraph without side margins holding nothing but a caret, one
/// line break and empty text. Looks no deeper than the first block.
pub fn is_model_empty_fast(model: &ContentModelDocument) -> bool {
    match model.blocks.as_slice() {
        [] => true,
        [Block::Paragraph(paragraph)] => {
            if has_side_margin(&paragraph.format.margin) {
                return false;
            }
            let mut brs = 0;
            for segment in &paragraph.segments {
                match segment {
                    Segment::SelectionMarker(_) => {}
                    Segment::Text(text) if text.text.is_empty() => {}
                    Segment::Br(_) => {
                        brs += 1;
                        if brs > 1 {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::model::{Image, Paragraph, SegmentFormat};

    fn with_segments(segments: Vec<Segment>) -> ContentModelDocument {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments = segments;
        let mut model = ContentModelDocument::new();
        model.blocks.push(Block::Paragraph(paragraph));
        model
    }

    #[test]
    fn caret_and_one_br_is_empty() {
        let f = SegmentFormat::default;
        assert_that!(is_model_empty_fast(&ContentModelDocument::new())).is_true();
        assert_that!(is_model_empty_fast(&with_segments(vec![
            Segment::marker(f()),
            Segment::text("", f()),
            Segment::br(f()),
        ])))
        .is_true();
    }

    #[test]
    fn content_or_a_second_br_is_not_empty() {
        let f = SegmentFormat::default;
        assert_that!(is_model_empty_fast(&with_segments(vec![Segment::br(f()), Segment::br(f())])))
            .is_false();
        assert_that!(is_model_empty_fast(&with_segments(vec![Segment::text("a", f())]))).is_false();
        assert_that!(is_model_empty_fast(&with_segments(vec![Segment::Image(Image::new(
            "a.png",
            f()
        ))])))
        .is_false();
    }

    #[test]
    fn margins_and_extra_blocks_are_not_empty() {
        let mut model = with_segments(Vec::new());
        if let Some(p) = model.blocks[0].as_paragraph_mut() {
            p.format.margin.left = Some("40px".into());
        }
        assert_that!(is_model_empty_fast(&model)).is_false();

        let mut model = with_segments(Vec::new());
        if let Some(p) = model.blocks[0].as_paragraph_mut() {
            p.format.margin.right = Some("1em".into());
        }
        assert_that!(is_model_empty_fast(&model)).is_false();

        let mut model = with_segments(Vec::new());
        model.blocks.push(Block::Paragraph(Paragraph::new(false)));
        assert_that!(is_model_empty_fast(&model)).is_false();
    }

    #[test]
    fn zero_or_vertical_margins_stay_empty() {
        let mut model = with_segments(vec![Segment::br(SegmentFormat::default())]);
        if let Some(p) = model.blocks[0].as_paragraph_mut() {
            p.format.margin.left = Some("0px".into());
            p.format.margin.top = Some("12px".into());
            p.format.margin.bottom = Some("1em".into());
        }
        assert_that!(is_model_empty_fast(&model)).is_true();
    }
}
