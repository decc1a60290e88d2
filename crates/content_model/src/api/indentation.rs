// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Virtual indentation: leading runs of spaces, non-breaking spaces and en
//! spaces where every four characters stand for one 40px indentation step.
//! The helpers here turn such runs into margins.

use crate::dom::style::{parse_value_with_unit, px};
use crate::editor::{EditorCore, FormatContentModelOptions};
use crate::model::{
    selected_paragraphs, Block, Direction, GroupStep, ListItem, Paragraph,
    Segment, Spacing, Table,
};
use crate::utils::whitespace::is_indent_space;

pub const INDENT_CHARS_PER_STEP: usize = 4;
pub const INDENT_STEP_PX: f64 = 40.0;

/// Number of leading indentation characters of `paragraph`. Counting stops
/// at the first other character or at any segment that is not text. With
/// `stop_at_caret` it also stops at a selection marker, otherwise markers
/// are stepped over.
pub fn count_virtual_indentation(paragraph: &Paragraph, stop_at_caret: bool) -> usize {
    let mut count = 0;
    for segment in &paragraph.segments {
        match segment {
            Segment::SelectionMarker(_) if !stop_at_caret => continue,
            Segment::Text(text) => {
                let leading = text.text.chars().take_while(|c| is_indent_space(*c)).count();
                count += leading;
                if leading < text.text.chars().count() {
                    break;
                }
            }
            _ => break,
        }
    }
    count
}

/// Remove the first `count` characters of the leading text of `paragraph`,
/// across segment boundaries.
fn strip_leading_chars(paragraph: &mut Paragraph, mut count: usize) {
    for segment in paragraph.segments.iter_mut() {
        if count == 0 {
            break;
        }
        match segment {
            Segment::SelectionMarker(_) => continue,
            Segment::Text(text) => {
                let length = text.text.chars().count();
                let removed = length.min(count);
                text.text = text.text.chars().skip(removed).collect();
                count -= removed;
            }
            _ => break,
        }
    }
    paragraph
        .segments
        .retain(|s| !matches!(s, Segment::Text(t) if t.text.is_empty()));
    paragraph.invalidate();
}

/// Strip every whole step of virtual indentation from the start of
/// `paragraph` and return the number of steps. A partial step stays in
/// the text.
pub fn take_virtual_indentation(paragraph: &mut Paragraph, stop_at_caret: bool) -> usize {
    let steps = count_virtual_indentation(paragraph, stop_at_caret) / INDENT_CHARS_PER_STEP;
    if steps > 0 {
        strip_leading_chars(paragraph, steps * INDENT_CHARS_PER_STEP);
    }
    steps
}

/// Add `delta` pixels to a margin value, dropping it when it reaches zero.
pub(crate) fn add_to_margin(margin: &mut Option<String>, delta: f64) {
    let current = margin
        .as_deref()
        .and_then(|m| parse_value_with_unit(m, 16.0))
        .unwrap_or(0.0);
    let value = (current + delta).max(0.0);
    *margin = (value > 0.0).then(|| px(value));
}

fn indent_start(margin: &mut Spacing, direction: Direction, steps: usize) {
    add_to_margin(margin.start_mut(direction), steps as f64 * INDENT_STEP_PX);
}

/// Move virtual indentation at the start of a list item into the margin of
/// its innermost list level.
pub fn adjust_list_indentation(item: &mut ListItem) -> bool {
    let Some(Block::Paragraph(paragraph)) = item.blocks.first_mut() else {
        return false;
    };
    let steps = take_virtual_indentation(paragraph, false);
    if steps == 0 {
        return false;
    }
    let direction = item
        .levels
        .last()
        .and_then(|l| l.format.direction)
        .or(item.format.direction)
        .unwrap_or_default();
    if let Some(level) = item.levels.last_mut() {
        indent_start(&mut level.format.margin, direction, steps);
    }
    item.invalidate();
    true
}

/// Move virtual indentation typed before the caret in `paragraph` into the
/// start margin of `table`, which is about to be inserted there.
pub fn adjust_table_indentation(
    paragraph: &mut Paragraph,
    table: &mut Table,
    direction: Direction,
) -> bool {
    let steps = take_virtual_indentation(paragraph, true);
    if steps == 0 {
        return false;
    }
    indent_start(&mut table.format.margin, direction, steps);
    table.cached_element = None;
    true
}

/// Move virtual indentation at the start of `paragraph` into its own start
/// margin.
pub fn tab_spaces_to_margin(paragraph: &mut Paragraph) -> bool {
    let steps = take_virtual_indentation(paragraph, false);
    if steps == 0 {
        return false;
    }
    let direction = paragraph.format.direction.unwrap_or_default();
    indent_start(&mut paragraph.format.margin, direction, steps);
    true
}

/// Indent or outdent the selected blocks. List items gain or lose a list
/// level; other paragraphs move by one step of start margin.
pub fn set_model_indentation(blocks: &mut Vec<Block>, indent: bool) -> bool {
    let mut changed = false;
    let paragraphs = selected_paragraphs(blocks);
    let mut done_items: Vec<(Vec<GroupStep>, usize)> = Vec::new();

    for (path, index) in paragraphs {
        // A selected paragraph inside a list item indents the whole item.
        if let Some((item_step, parent)) = path.split_last() {
            if item_step.cell.is_none() {
                let key = (parent.to_vec(), item_step.block_index);
                if let Some(Block::ListItem(item)) = crate::model::blocks_at_path_mut(blocks, parent)
                    .and_then(|g| g.get_mut(item_step.block_index))
                {
                    if !done_items.contains(&key) {
                        changed |= indent_list_item(item, indent);
                        done_items.push(key);
                    }
                    continue;
                }
            }
        }
        let Some(Block::Paragraph(paragraph)) = crate::model::blocks_at_path_mut(blocks, &path)
            .and_then(|g| g.get_mut(index))
        else {
            continue;
        };
        let direction = paragraph.format.direction.unwrap_or_default();
        let before = paragraph.format.margin.clone();
        let delta = if indent { INDENT_STEP_PX } else { -INDENT_STEP_PX };
        add_to_margin(paragraph.format.margin.start_mut(direction), delta);
        if paragraph.format.margin != before {
            paragraph.invalidate();
            changed = true;
        }
    }
    changed
}

/// Indent (or outdent) the selected paragraphs and list items of the
/// editor by one step.
pub fn set_indentation(editor: &mut EditorCore, indent: bool) -> bool {
    let api_name = if indent { "indent" } else { "outdent" };
    editor.format_content_model(
        |model, _| set_model_indentation(&mut model.blocks, indent),
        FormatContentModelOptions::new(api_name),
    )
}

fn indent_list_item(item: &mut ListItem, indent: bool) -> bool {
    if indent {
        let Some(last) = item.levels.last().cloned() else {
            return false;
        };
        let mut level = last;
        level.format.start_number = None;
        level.dataset.clear();
        item.levels.push(level);
    } else {
        if item.levels.is_empty() {
            return false;
        }
        item.levels.pop();
    }
    item.invalidate();
    true
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::model::{ListLevel, ListType, SegmentFormat};

    fn paragraph_with(text: &str) -> Paragraph {
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::text(text, SegmentFormat::default()));
        paragraph
    }

    #[test]
    fn indentation_law_holds_for_mixed_spaces() {
        let spaces = [' ', '\u{a0}', '\u{2002}'];
        for n in 0..11 {
            let prefix: String = (0..n).map(|i| spaces[i % 3]).collect();
            let mut paragraph = paragraph_with(&format!("{prefix}x"));
            let mut table = Table::default();
            let indented = adjust_table_indentation(&mut paragraph, &mut table, Direction::Ltr);

            let steps = n / 4;
            assert_that!(indented).is_equal_to(steps > 0);
            let expected_margin = (steps > 0).then(|| format!("{}px", steps * 40));
            assert_that!(table.format.margin.left).is_equal_to(expected_margin);
            let remaining = paragraph.text().chars().take_while(|c| *c != 'x').count();
            assert_that!(remaining).is_equal_to(n - steps * 4);
        }
    }

    #[test]
    fn list_item_spaces_become_level_margin() {
        let mut item = ListItem::new(vec![ListLevel::new(ListType::Ul)]);
        item.blocks.push(Block::Paragraph(paragraph_with("    Hello World")));

        assert_that!(adjust_list_indentation(&mut item)).is_true();
        assert_that!(item.blocks[0].as_paragraph().unwrap().text())
            .is_equal_to("Hello World".to_owned());
        assert_that!(item.levels[0].format.margin.left.as_deref()).is_equal_to(Some("40px"));
    }

    #[test]
    fn rtl_indentation_goes_to_the_right() {
        let mut paragraph = paragraph_with("        x");
        let mut table = Table::default();
        adjust_table_indentation(&mut paragraph, &mut table, Direction::Rtl);
        assert_that!(table.format.margin.right.as_deref()).is_equal_to(Some("80px"));
        assert_that!(table.format.margin.left).is_none();
    }

    #[test]
    fn counting_stops_at_other_segments() {
        let mut paragraph = paragraph_with("  ");
        paragraph.segments.push(Segment::br(SegmentFormat::default()));
        paragraph.segments.push(Segment::text("  x", SegmentFormat::default()));
        assert_that!(count_virtual_indentation(&paragraph, false)).is_equal_to(2);
    }

    #[test]
    fn caret_can_end_the_run() {
        let mut paragraph = paragraph_with("    ");
        paragraph.segments.push(Segment::marker(SegmentFormat::default()));
        paragraph.segments.push(Segment::text("    x", SegmentFormat::default()));
        assert_that!(count_virtual_indentation(&paragraph, true)).is_equal_to(4);
        assert_that!(count_virtual_indentation(&paragraph, false)).is_equal_to(8);
    }

    #[test]
    fn tab_spaces_indent_the_paragraph() {
        let mut paragraph = paragraph_with("     x");
        assert_that!(tab_spaces_to_margin(&mut paragraph)).is_true();
        assert_that!(paragraph.format.margin.left.as_deref()).is_equal_to(Some("40px"));
        assert_that!(paragraph.text()).is_equal_to(" x".to_owned());
    }

    #[test]
    fn editor_indents_and_outdents_the_caret_paragraph() {
        use crate::dom::{DomPosition, DomSelection};
        use crate::editor::EditorOptions;

        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>a</div>"));
        let root = editor.root();
        let text = editor.get_document().descendants(root)[1];
        editor.set_dom_selection(Some(DomSelection::caret(DomPosition::new(text, 0))));

        assert_that!(set_indentation(&mut editor, true)).is_true();
        let model = editor.create_content_model();
        let margin = model.blocks[0].as_paragraph().unwrap().format.margin.left.clone();
        assert_that!(margin.as_deref()).is_equal_to(Some("40px"));

        set_indentation(&mut editor, false);
        assert_that!(set_indentation(&mut editor, false)).is_false();
    }
}
