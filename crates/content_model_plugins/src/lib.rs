// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Plugins for a [content_model::editor::Editor].

mod hyperlink;
mod image_selection;
mod link_match;
mod table_selection_announce;
mod watermark;

pub use crate::hyperlink::{
    HyperlinkPlugin, HyperlinkTooltip, LinkClickFn, OpenWindowFn, TooltipFn,
};
pub use crate::image_selection::ImageSelectionPlugin;
pub use crate::link_match::{match_link, LinkMatch, LinkScheme};
pub use crate::table_selection_announce::TableSelectionAnnouncePlugin;
pub use crate::watermark::{WatermarkPlugin, WATERMARK_ENTITY_TYPE};
