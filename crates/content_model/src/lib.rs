// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The content model layer of a rich text editor.
//!
//! The live document ([dom::Dom]) is converted into a typed model
//! ([model::ContentModelDocument]) by [dom_to_model], edited through the
//! operations in [api], and written back by [model_to_dom], which reuses
//! the elements of every node that did not change. [editor] ties this
//! together with selection, undo and a plugin event bus.

pub mod api;
pub mod dom;
pub mod dom_to_model;
pub mod editor;
mod error;
pub mod format_handlers;
pub mod model;
pub mod model_to_dom;
pub mod table_selection;
pub mod utils;

pub use crate::error::{Error, Result};
