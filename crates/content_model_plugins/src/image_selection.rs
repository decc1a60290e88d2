// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use content_model::dom::{DomPosition, DomRange, DomSelection, NodeId};
use content_model::editor::{
    EditorCore, EditorPlugin, KeyboardEventInfo, MouseButton, MouseEventInfo,
    PluginEvent,
};
use log::trace;

/// Selects images as a whole when they are clicked, and turns that
/// selection back into a normal one when the user moves on.
#[derive(Debug, Default)]
pub struct ImageSelectionPlugin;

impl ImageSelectionPlugin {
    pub fn new() -> Self {
        Self
    }

    fn image_at(editor: &EditorCore, target: NodeId) -> Option<NodeId> {
        (editor.get_document().is_tag(target, "img")
            && editor.get_dom_helper().is_node_in_editor(target))
        .then_some(target)
    }

    fn selected_image(editor: &EditorCore) -> Option<NodeId> {
        match editor.get_dom_selection()? {
            DomSelection::Image { image } => Some(image),
            _ => None,
        }
    }

    fn select_image(editor: &mut EditorCore, image: NodeId) {
        trace!("Selecting image");
        editor.set_dom_selection(Some(DomSelection::Image { image }));
    }

    fn caret_before(editor: &mut EditorCore, image: NodeId) {
        if let Some(position) = DomPosition::before(editor.get_document(), image) {
            editor.set_dom_selection(Some(DomSelection::caret(position)));
        }
    }

    fn on_mouse_down(editor: &mut EditorCore, event: &MouseEventInfo) {
        if event.button != MouseButton::Left {
            return;
        }
        match (Self::image_at(editor, event.target), Self::selected_image(editor)) {
            (Some(image), _) => Self::select_image(editor, image),
            (None, Some(selected)) => Self::caret_before(editor, selected),
            (None, None) => {}
        }
    }

    fn on_mouse_up(editor: &mut EditorCore, event: &MouseEventInfo) {
        if event.button != MouseButton::Right {
            return;
        }
        if let Some(image) = Self::image_at(editor, event.target) {
            Self::select_image(editor, image);
        }
    }

    fn on_key_down(editor: &mut EditorCore, key: &KeyboardEventInfo) {
        let Some(image) = Self::selected_image(editor) else {
            return;
        };
        match key.key.as_str() {
            "Escape" => Self::caret_before(editor, image),
            "Delete" | "Backspace" => {}
            _ => {
                let dom = editor.get_document();
                if let (Some(start), Some(end)) =
                    (DomPosition::before(dom, image), DomPosition::after(dom, image))
                {
                    editor.set_dom_selection(Some(DomSelection::Range {
                        range: DomRange::new(start, end),
                        is_reverted: false,
                    }));
                }
            }
        }
    }
}

impl EditorPlugin for ImageSelectionPlugin {
    fn name(&self) -> &str {
        "ImageSelection"
    }

    fn initialize(&mut self, _editor: &mut EditorCore) {}

    fn on_plugin_event(&mut self, event: &PluginEvent, editor: &mut EditorCore) {
        match event {
            PluginEvent::MouseDown(mouse) => Self::on_mouse_down(editor, mouse),
            PluginEvent::MouseUp(mouse) => Self::on_mouse_up(editor, mouse),
            PluginEvent::KeyDown(key) => Self::on_key_down(editor, key),
            _ => {}
        }
    }
}
