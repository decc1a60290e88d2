// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumDiscriminants, EnumString};

use super::EditorCore;
use crate::dom::NodeId;

/// What happened to an entity during a transaction.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum EntityOperation {
    NewEntity,
    /// Removed because the content around it was overwritten.
    Overwrite,
    RemoveFromStart,
    RemoveFromEnd,
    /// Removed by the editor itself, e.g. a decoration being hidden.
    Remove,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum ChangeSource {
    #[default]
    Format,
    InsertEntity,
    InsertImage,
    InsertTable,
    Keyboard,
    Paste,
    SetContent,
    Undo,
    Redo,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardEventInfo {
    /// Key name as reported by the host, e.g. `a`, `Enter`, `Escape`.
    pub key: String,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
}

impl KeyboardEventInfo {
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            ..Default::default()
        }
    }

    /// A key that produces a character rather than moving or editing.
    pub fn is_character(&self) -> bool {
        !self.ctrl_key && !self.meta_key && self.key.chars().count() == 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MouseEventInfo {
    pub target: NodeId,
    pub button: MouseButton,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
}

impl MouseEventInfo {
    pub fn new(target: NodeId, button: MouseButton) -> Self {
        Self {
            target,
            button,
            ctrl_key: false,
            meta_key: false,
            shift_key: false,
            alt_key: false,
        }
    }
}

/// Everything plugins get told about, in the order it happens.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(PluginEventType))]
#[strum_discriminants(derive(Display, AsRefStr, EnumString, Hash))]
#[strum_discriminants(strum(serialize_all = "camelCase"))]
pub enum PluginEvent {
    EditorReady,
    BeforeDispose,
    ContentChanged {
        source: ChangeSource,
        api_name: Option<String>,
    },
    Input {
        data: Option<String>,
    },
    KeyDown(KeyboardEventInfo),
    KeyUp(KeyboardEventInfo),
    MouseDown(MouseEventInfo),
    MouseUp(MouseEventInfo),
    SelectionChanged,
    EntityOperation {
        operation: EntityOperation,
        wrapper: NodeId,
        entity_type: Option<String>,
    },
    BeforePaste {
        html: String,
    },
    /// A DOM event registered with [EditorCore::attach_dom_event].
    DomEvent {
        name: String,
        target: Option<NodeId>,
    },
}

impl PluginEvent {
    pub fn event_type(&self) -> PluginEventType {
        self.into()
    }
}

/// A session-scoped extension of the editor. Plugins see every event in
/// registration order, unless one of them claims an event for itself.
pub trait EditorPlugin {
    fn name(&self) -> &str;

    fn initialize(&mut self, editor: &mut EditorCore);

    fn dispose(&mut self) {}

    /// Return `true` to be the only plugin that sees `event`.
    fn will_handle_event_exclusively(
        &self,
        _event: &PluginEvent,
        _editor: &EditorCore,
    ) -> bool {
        false
    }

    fn on_plugin_event(&mut self, event: &PluginEvent, editor: &mut EditorCore);
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn event_types_use_camel_case_names() {
        let event = PluginEvent::ContentChanged {
            source: ChangeSource::InsertTable,
            api_name: None,
        };
        assert_that!(event.event_type().to_string()).is_equal_to("contentChanged".to_owned());
        assert_that!(PluginEventType::from_str("keyDown").ok())
            .is_equal_to(Some(PluginEventType::KeyDown));
        assert_that!(ChangeSource::InsertTable.as_ref()).is_equal_to("insertTable");
    }

    #[test]
    fn only_plain_keys_are_characters() {
        assert_that!(KeyboardEventInfo::key("a").is_character()).is_true();
        assert_that!(KeyboardEventInfo::key("Enter").is_character()).is_false();
        let shortcut = KeyboardEventInfo {
            ctrl_key: true,
            ..KeyboardEventInfo::key("b")
        };
        assert_that!(shortcut.is_character()).is_false();
    }
}
