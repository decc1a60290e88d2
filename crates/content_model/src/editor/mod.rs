// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The editor: a document with an editable root, transactions over its
//! content model, undo history and a plugin event bus.

mod announce;
mod dom_helper;
mod editor_core;
mod format_content_model;
mod invariants;
mod options;
mod plugin;
mod plugin_host;
mod undo;

pub use announce::{AnnounceData, KnownAnnounceString};
pub use dom_helper::DomHelper;
pub use editor_core::EditorCore;
pub use format_content_model::{
    ChangedEntity, FormatContentModelContext, FormatContentModelOptions,
};
pub use invariants::explicitly_assert_invariants;
pub use options::{EditorOptions, Environment};
pub use plugin::{
    ChangeSource, EditorPlugin, EntityOperation, KeyboardEventInfo,
    MouseButton, MouseEventInfo, PluginEvent, PluginEventType,
};
pub use plugin_host::{DeferredTask, DeferredTasks, Editor};
