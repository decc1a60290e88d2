// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use content_model::dom::NodeId;
use content_model::editor::{
    AnnounceData, EditorCore, EditorPlugin, KnownAnnounceString, PluginEvent,
};
use content_model::table_selection::{
    get_is_selecting_or_unselecting, parse_table_cells,
    retrieve_string_from_parsed_table, SelectionDirection,
    TableSelectionCoordinates,
};
use log::trace;

/// Reads out the cells that join or leave a table selection as it is
/// extended or shrunk.
#[derive(Debug, Default)]
pub struct TableSelectionAnnouncePlugin {
    previous: Option<(NodeId, TableSelectionCoordinates)>,
}

impl TableSelectionAnnouncePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn on_selection_changed(&mut self, editor: &mut EditorCore) {
        let current = editor
            .get_dom_selection()
            .and_then(|selection| TableSelectionCoordinates::from_selection(&selection));
        let Some((table, coordinates)) = current else {
            self.previous = None;
            return;
        };

        let direction = match &self.previous {
            Some((previous_table, previous)) if *previous_table == table => {
                get_is_selecting_or_unselecting(previous, &coordinates)
            }
            _ => Some(SelectionDirection::Selecting),
        };
        let Some(direction) = direction else {
            return;
        };

        let parsed = parse_table_cells(editor.get_document(), table);
        let (kind, rect) = match direction {
            SelectionDirection::Selecting => (KnownAnnounceString::SelectingTableCells, coordinates),
            SelectionDirection::Unselecting => match &self.previous {
                Some((_, previous)) => (KnownAnnounceString::UnselectingTableCells, *previous),
                None => (KnownAnnounceString::UnselectingTableCells, coordinates),
            },
        };
        let cells = retrieve_string_from_parsed_table(editor.get_document(), &parsed, &rect);
        trace!("Table selection is {direction}");
        self.previous = Some((table, coordinates));
        if !cells.is_empty() {
            editor.announce(AnnounceData::known(kind, vec![cells]));
        }
    }
}

impl EditorPlugin for TableSelectionAnnouncePlugin {
    fn name(&self) -> &str {
        "TableSelectionAnnounce"
    }

    fn initialize(&mut self, _editor: &mut EditorCore) {}

    fn dispose(&mut self) {
        self.previous = None;
    }

    fn on_plugin_event(&mut self, event: &PluginEvent, editor: &mut EditorCore) {
        if let PluginEvent::SelectionChanged = event {
            self.on_selection_changed(editor);
        }
    }
}
