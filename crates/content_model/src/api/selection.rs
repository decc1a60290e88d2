// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::model::{
    clear_selection, for_each_paragraph_mut, Block, Segment, SegmentPosition,
};

/// Select the segments from `start` to `end`, both included, and nothing
/// else. Without `end` only `start` is selected; without either the
/// selection is just cleared. Returns whether `start` was found.
///
/// Selecting exactly one image selects it as an image.
pub fn set_selection(
    blocks: &mut [Block],
    start: Option<&SegmentPosition>,
    end: Option<&SegmentPosition>,
) -> bool {
    clear_selection(blocks);
    let Some(start) = start else {
        return false;
    };
    let end = end.unwrap_or(start);
    let single = start == end;

    let mut inside = false;
    let mut found = false;
    for_each_paragraph_mut(blocks, &mut |path, block_index, paragraph, _| {
        let is_here = |position: &SegmentPosition| -> bool {
            position.path.as_slice() == path && position.block_index == block_index
        };
        if !inside && !found && !is_here(start) && !is_here(end) {
            return;
        }
        let mut changed = false;
        for (index, segment) in paragraph.segments.iter_mut().enumerate() {
            let at_start = is_here(start) && start.segment_index == index;
            let at_end = is_here(end) && end.segment_index == index;
            if at_start {
                inside = true;
                found = true;
            }
            if inside {
                segment.set_selected(true);
                if single {
                    if let Segment::Image(image) = segment {
                        image.is_selected_as_image_selection = true;
                    }
                }
                changed = true;
            }
            if at_end && found {
                inside = false;
            }
        }
        if changed {
            paragraph.invalidate();
        }
    });
    found
}
