// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Segment formatting of the selection, and the format state toolbars
//! show for it.

use crate::editor::{EditorCore, FormatContentModelOptions};
use crate::model::{
    blocks_at_path, blocks_at_path_mut, get_model_selection, invalidate_path,
    paragraph_at, segment_at, selected_segments, Block, ContentModelDocument,
    Direction, GroupStep, MergeFormat, ModelSelection, ScriptPosition,
    Segment, SegmentFormat, SegmentPosition,
};

/// What the selection looks like, as seen from its start.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormatState {
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub is_strikethrough: bool,
    pub is_superscript: bool,
    pub is_subscript: bool,
    pub font_name: Option<String>,
    pub font_size: Option<String>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub text_align: Option<String>,
    pub direction: Option<Direction>,
    pub is_in_list: bool,
    pub is_in_table: bool,
    pub is_image_selected: bool,
    /// More than one table cell is selected.
    pub is_multiple_cells_selected: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Block containers the blocks at `path` live in.
fn containers(blocks: &[Block], path: &[GroupStep]) -> (bool, bool) {
    let (mut in_list, mut in_table) = (false, false);
    for depth in 0..path.len() {
        let Some(group) = blocks_at_path(blocks, &path[..depth]) else {
            break;
        };
        match group.get(path[depth].block_index) {
            Some(Block::ListItem(_)) => in_list = true,
            Some(Block::Table(_)) => in_table = true,
            _ => {}
        }
    }
    (in_list, in_table)
}

pub fn get_format_state(editor: &mut EditorCore) -> FormatState {
    let model = editor.create_content_model();
    let mut state = FormatState {
        can_undo: editor.can_undo(),
        can_redo: editor.can_redo(),
        ..Default::default()
    };

    let position = match get_model_selection(&model.blocks) {
        ModelSelection::None => return state,
        ModelSelection::Collapsed(position) | ModelSelection::Range { start: position, .. } => position,
        ModelSelection::Image(position) => {
            state.is_image_selected = true;
            position
        }
        ModelSelection::Table {
            path,
            block_index,
            first_row,
            first_column,
            last_row,
            last_column,
        } => {
            state.is_in_table = true;
            state.is_multiple_cells_selected = (first_row, first_column) != (last_row, last_column);
            let mut cell_path = path;
            cell_path.push(GroupStep::cell(block_index, first_row, first_column));
            SegmentPosition {
                path: cell_path,
                block_index: 0,
                segment_index: 0,
            }
        }
    };

    let (in_list, in_table) = containers(&model.blocks, &position.path);
    state.is_in_list = in_list;
    state.is_in_table |= in_table;

    let Some(paragraph) = paragraph_at(&model.blocks, &position.path, position.block_index) else {
        return state;
    };
    state.text_align = paragraph.format.text_align.clone();
    state.direction = paragraph.format.direction;

    let mut format = model.format.clone();
    format.merge_from(&paragraph.segment_format);
    if let Some(segment) = segment_at(&model.blocks, &position) {
        format.merge_from(segment.format());
    }
    state.is_bold = format.is_bold();
    state.is_italic = format.italic.unwrap_or(false);
    state.is_underline = format.underline.unwrap_or(false);
    state.is_strikethrough = format.strikethrough.unwrap_or(false);
    state.is_superscript = format.script == Some(ScriptPosition::Super);
    state.is_subscript = format.script == Some(ScriptPosition::Sub);
    state.font_name = format.font_family;
    state.font_size = format.font_size;
    state.text_color = format.text_color;
    state.background_color = format.background_color;
    state
}

/// Apply `f` to the format of every selected segment. Returns whether
/// anything was selected.
fn update_selected_formats(
    model: &mut ContentModelDocument,
    mut f: impl FnMut(&mut SegmentFormat),
) -> bool {
    let positions = selected_segments(&model.blocks);
    for position in &positions {
        let Some(Block::Paragraph(paragraph)) = blocks_at_path_mut(&mut model.blocks, &position.path)
            .and_then(|group| group.get_mut(position.block_index))
        else {
            continue;
        };
        if let Some(segment) = paragraph.segments.get_mut(position.segment_index) {
            f(segment.format_mut());
            paragraph.invalidate();
        }
        invalidate_path(&mut model.blocks, &position.path);
    }
    !positions.is_empty()
}

/// Whether every selected segment that shows something passes `is_on`.
/// A lone caret decides by its own format.
fn all_selected(model: &ContentModelDocument, is_on: impl Fn(&SegmentFormat) -> bool) -> bool {
    let segments: Vec<&Segment> = selected_segments(&model.blocks)
        .iter()
        .filter_map(|p| segment_at(&model.blocks, p))
        .collect();
    let content: Vec<&&Segment> = segments.iter().filter(|s| !s.is_marker()).collect();
    if content.is_empty() {
        segments.iter().all(|s| is_on(s.format()))
    } else {
        content.iter().all(|s| is_on(s.format()))
    }
}

fn toggle(
    editor: &mut EditorCore,
    api_name: &str,
    is_on: fn(&SegmentFormat) -> bool,
    set: fn(&mut SegmentFormat, bool),
) -> bool {
    editor.format_content_model(
        |model, _| {
            let turn_on = !all_selected(model, is_on);
            update_selected_formats(model, |format| set(format, turn_on))
        },
        FormatContentModelOptions::new(api_name),
    )
}

/// Make the selection bold, or plain again when it all is bold already.
pub fn toggle_bold(editor: &mut EditorCore) -> bool {
    toggle(editor, "toggleBold", SegmentFormat::is_bold, |format, on| {
        format.font_weight = on.then(|| "bold".to_owned());
    })
}

pub fn toggle_italic(editor: &mut EditorCore) -> bool {
    toggle(
        editor,
        "toggleItalic",
        |format| format.italic == Some(true),
        |format, on| format.italic = on.then_some(true),
    )
}

pub fn toggle_underline(editor: &mut EditorCore) -> bool {
    toggle(
        editor,
        "toggleUnderline",
        |format| format.underline == Some(true),
        |format, on| format.underline = on.then_some(true),
    )
}

/// Set the text color of the selection, or remove it with `None`.
pub fn set_text_color(editor: &mut EditorCore, color: Option<&str>) -> bool {
    editor.format_content_model(
        |model, _| {
            update_selected_formats(model, |format| {
                format.text_color = color.map(str::to_owned);
                format.adaptive_text_color = None;
            })
        },
        FormatContentModelOptions::new("setTextColor"),
    )
}

pub fn set_background_color(editor: &mut EditorCore, color: Option<&str>) -> bool {
    editor.format_content_model(
        |model, _| {
            update_selected_formats(model, |format| {
                format.background_color = color.map(str::to_owned);
            })
        },
        FormatContentModelOptions::new("setBackgroundColor"),
    )
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::{DomPosition, DomRange, DomSelection, NodeId};
    use crate::editor::EditorOptions;

    fn new_editor(html: &str) -> EditorCore {
        EditorCore::new(EditorOptions::new().with_initial_html(html))
    }

    fn first_text(editor: &EditorCore) -> NodeId {
        let dom = editor.get_document();
        dom.descendants(editor.root())
            .into_iter()
            .find(|&n| dom.is_text(n))
            .unwrap()
    }

    fn select(editor: &mut EditorCore, start: usize, end: usize) {
        let text = first_text(editor);
        editor.set_dom_selection(Some(DomSelection::Range {
            range: DomRange::new(DomPosition::new(text, start), DomPosition::new(text, end)),
            is_reverted: false,
        }));
    }

    #[test]
    fn bold_toggles_on_then_off() {
        let mut editor = new_editor("<div>abc</div>");
        select(&mut editor, 0, 3);

        assert_that!(toggle_bold(&mut editor)).is_true();
        assert_that!(editor.get_content()).is_equal_to("<div><b>abc</b></div>".to_owned());
        assert_that!(get_format_state(&mut editor).is_bold).is_true();

        toggle_bold(&mut editor);
        assert_that!(editor.get_content()).is_equal_to("<div>abc</div>".to_owned());
    }

    #[test]
    fn partly_italic_selection_becomes_all_italic() {
        let mut editor = new_editor("<div><i>a</i>b</div>");
        let root = editor.root();
        let dom = editor.get_document();
        let texts: Vec<NodeId> = dom
            .descendants(root)
            .into_iter()
            .filter(|&n| dom.is_text(n))
            .collect();
        editor.set_dom_selection(Some(DomSelection::Range {
            range: DomRange::new(DomPosition::new(texts[0], 0), DomPosition::new(texts[1], 1)),
            is_reverted: false,
        }));

        toggle_italic(&mut editor);
        assert_that!(editor.get_content()).is_equal_to("<div><i>ab</i></div>".to_owned());
    }

    #[test]
    fn colors_apply_to_the_selection_only() {
        let mut editor = new_editor("<div>abc</div>");
        select(&mut editor, 1, 2);
        set_text_color(&mut editor, Some("red"));

        let state = get_format_state(&mut editor);
        assert_that!(state.text_color.as_deref()).is_equal_to(Some("red"));
        assert_that!(editor.get_content())
            .is_equal_to(r#"<div>a<span style="color: red;">b</span>c</div>"#.to_owned());
    }

    #[test]
    fn caret_format_is_what_typing_would_get() {
        let mut editor = new_editor("<div><u>ab</u></div>");
        select(&mut editor, 1, 1);
        let state = get_format_state(&mut editor);

        assert_that!(state.is_underline).is_true();
        assert_that!(state.is_bold).is_false();
        assert_that!(state.can_undo).is_false();
    }

    #[test]
    fn state_knows_about_lists_and_tables() {
        let mut editor = new_editor("<ul><li>a</li></ul>");
        select(&mut editor, 0, 0);
        assert_that!(get_format_state(&mut editor).is_in_list).is_true();

        let mut editor = new_editor("<table><tbody><tr><td>a</td></tr></tbody></table>");
        select(&mut editor, 0, 0);
        let state = get_format_state(&mut editor);
        assert_that!(state.is_in_table).is_true();
        assert_that!(state.is_in_list).is_false();
    }

    #[test]
    fn without_selection_there_is_nothing_to_format() {
        let mut editor = new_editor("<div>abc</div>");
        assert_that!(toggle_underline(&mut editor)).is_false();
        assert_that!(set_background_color(&mut editor, Some("yellow"))).is_false();
    }
}
