// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::model::{Block, ContentModelDocument, Segment, Table};

/// Check model invariants, only when the `assert-invariants` feature is on.
pub(crate) fn assert_invariants(model: &ContentModelDocument) {
    cfg_if::cfg_if! {
        if #[cfg(feature = "assert-invariants")] {
            explicitly_assert_invariants(model);
        } else {
            let _ = model;
        }
    }
}

/// Panic if `model` is not in normalized shape: tables are rectangular,
/// span placeholders have a real cell to their left or above, and no
/// paragraph is left without segments.
pub fn explicitly_assert_invariants(model: &ContentModelDocument) {
    assert_blocks(&model.blocks);
}

fn assert_blocks(blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                assert!(!p.segments.is_empty(), "Paragraph without segments");
                for segment in &p.segments {
                    if let Segment::General(general) = segment {
                        assert_blocks(&general.blocks);
                    }
                }
            }
            Block::Table(table) => assert_table(table),
            other => {
                if let Some(children) = other.child_blocks() {
                    assert_blocks(children);
                }
            }
        }
    }
}

fn assert_table(table: &Table) {
    let columns = table.column_count();
    assert_eq!(table.widths.len(), columns, "Column widths do not match columns");
    for (r, row) in table.rows.iter().enumerate() {
        assert_eq!(row.cells.len(), columns, "Row {r} is not full width");
        for (c, cell) in row.cells.iter().enumerate() {
            assert!(!(cell.span_left && c == 0), "Cell ({r}, {c}) spans out of the table");
            assert!(!(cell.span_above && r == 0), "Cell ({r}, {c}) spans out of the table");
            assert_blocks(&cell.blocks);
        }
    }
}
