// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// Per-node flags that must never show up as attributes in exported HTML.
/// Stored in a side table on the [super::Dom], keyed by node identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HiddenProperties {
    /// Opaque state of the image editing plugin for an `img`.
    pub image_state: Option<String>,
    /// Marks an image that is currently being edited.
    pub image_marker: Option<String>,
    /// Link that must survive deletion of its text.
    pub undeletable: bool,
    /// Marker the host uses to identify a specific paragraph.
    pub paragraph_marker: Option<String>,
    /// A placeholder span showing hint text. Never part of the content.
    pub hint_text: bool,
    /// The text color on this node was set automatically for contrast
    /// against a table header background.
    pub adaptive_text_color: bool,
}

impl HiddenProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
