// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Undo and redo with model snapshots.
//!
//! Before each transaction the model it started from is pushed onto the
//! undo stack, selection markers included. Undoing renders that model back
//! and keeps the current one for redo. Snapshots drop their cached
//! elements: the DOM they pointed at has moved on since.

use log::debug;

use super::plugin::{ChangeSource, PluginEvent};
use super::EditorCore;
use crate::model::{Block, ContentModelDocument, Segment};

const MAX_UNDO_SNAPSHOTS: usize = 100;

fn forget_cached_elements(blocks: &mut [Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                p.cached_element = None;
                for segment in &mut p.segments {
                    if let Segment::General(general) = segment {
                        forget_cached_elements(&mut general.blocks);
                    }
                }
            }
            Block::Table(table) => {
                table.invalidate_all();
                for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
                    forget_cached_elements(&mut cell.blocks);
                }
            }
            Block::Divider(d) => d.cached_element = None,
            Block::FormatContainer(c) => {
                c.cached_element = None;
                forget_cached_elements(&mut c.blocks);
            }
            Block::ListItem(item) => {
                item.cached_element = None;
                forget_cached_elements(&mut item.blocks);
            }
            Block::General(g) => forget_cached_elements(&mut g.blocks),
            Block::Entity(_) => {}
        }
    }
}

impl EditorCore {
    pub(super) fn push_undo_snapshot(&mut self, mut model: ContentModelDocument) {
        forget_cached_elements(&mut model.blocks);
        self.undo_stack.push(model);
        if self.undo_stack.len() > MAX_UNDO_SNAPSHOTS {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Go back to the content before the last transaction.
    pub fn undo(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(previous) = self.undo_stack.pop() else {
            debug!("Nothing to undo");
            return false;
        };
        let mut current = self.create_content_model();
        forget_cached_elements(&mut current.blocks);
        self.redo_stack.push(current);
        self.restore(previous, ChangeSource::Undo);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(next) = self.redo_stack.pop() else {
            debug!("Nothing to redo");
            return false;
        };
        let mut current = self.create_content_model();
        forget_cached_elements(&mut current.blocks);
        self.undo_stack.push(current);
        self.restore(next, ChangeSource::Redo);
        true
    }

    fn restore(&mut self, model: ContentModelDocument, source: ChangeSource) {
        self.render_model(model);
        self.queue_event(PluginEvent::ContentChanged {
            source,
            api_name: Some(source.to_string()),
        });
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::editor::{EditorOptions, FormatContentModelOptions};
    use crate::model::SegmentFormat;

    fn append(editor: &mut EditorCore, text: &str) {
        let text = text.to_owned();
        editor.format_content_model(
            move |model, _| {
                let Some(Block::Paragraph(p)) = model.blocks.first_mut() else {
                    return false;
                };
                p.segments.push(Segment::text(&text, SegmentFormat::default()));
                p.invalidate();
                true
            },
            FormatContentModelOptions::new("append"),
        );
    }

    #[test]
    fn undo_and_redo_walk_through_snapshots() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>a</div>"));
        append(&mut editor, "b");
        append(&mut editor, "c");
        assert_that!(editor.get_content()).is_equal_to("<div>abc</div>".to_owned());

        assert_that!(editor.undo()).is_true();
        assert_that!(editor.get_content()).is_equal_to("<div>ab</div>".to_owned());
        assert_that!(editor.undo()).is_true();
        assert_that!(editor.get_content()).is_equal_to("<div>a</div>".to_owned());
        assert_that!(editor.undo()).is_false();

        assert_that!(editor.redo()).is_true();
        assert_that!(editor.get_content()).is_equal_to("<div>ab</div>".to_owned());
    }

    #[test]
    fn a_new_change_drops_the_redo_history() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>a</div>"));
        append(&mut editor, "b");
        editor.undo();
        append(&mut editor, "c");
        assert_that!(editor.can_redo()).is_false();
        assert_that!(editor.get_content()).is_equal_to("<div>ac</div>".to_owned());
    }
}
