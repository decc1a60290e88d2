// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Operations over the content model. Those taking an [EditorCore] run as
//! one `format_content_model` transaction; the rest work on bare model
//! nodes and are shared with the conversion code.
//!
//! [EditorCore]: crate::editor::EditorCore

mod delete;
mod edit_table;
mod empty;
mod entity;
mod format;
mod image;
mod indentation;
mod merge;
mod selection;
mod table;
mod table_format;

pub use delete::{
    delete_selection, DeleteResult, DeleteSelectionResult, InsertPoint,
};
pub use edit_table::{edit_table, edit_table_model, TableOperation};
pub use empty::is_model_empty_fast;
pub use entity::{insert_entity, InsertEntityPosition};
pub use format::{
    get_format_state, set_background_color, set_text_color, toggle_bold,
    toggle_italic, toggle_underline, FormatState,
};
pub use image::{
    insert_image, insert_image_file, set_image_alt_text, set_image_border,
    set_image_box_shadow, Border, DataUrlReader, FileReader, ImageFile,
};
pub use indentation::{
    adjust_list_indentation, adjust_table_indentation,
    count_virtual_indentation, set_indentation, set_model_indentation,
    tab_spaces_to_margin, take_virtual_indentation, INDENT_CHARS_PER_STEP,
    INDENT_STEP_PX,
};
pub use merge::{merge_model, segments_document, MergeModelOptions};
pub use selection::set_selection;
pub use table::{create_table_structure, insert_table};
pub use table_format::{apply_table_format, default_table_metadata};
