// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumString};

use crate::dom::NodeId;

use super::format::{Dataset, ListItemFormat, ListLevelFormat};
use super::{Block, SelectionMarker};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ListType {
    Ol,
    Ul,
}

/// One level of list nesting: the `ol`/`ul` an item lives in.
#[derive(Clone, Debug, PartialEq)]
pub struct ListLevel {
    pub list_type: ListType,
    pub format: ListLevelFormat,
    pub dataset: Dataset,
}

impl ListLevel {
    pub fn new(list_type: ListType) -> Self {
        Self {
            list_type,
            format: ListLevelFormat::default(),
            dataset: Dataset::new(),
        }
    }
}

/// A list item. Lists are flattened: every item records the full stack of
/// list levels above it, outermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub levels: Vec<ListLevel>,
    pub blocks: Vec<Block>,
    pub format: ListItemFormat,
    /// Carries the segment format of the bullet or number.
    pub format_holder: SelectionMarker,
    pub cached_element: Option<NodeId>,
}

impl ListItem {
    pub fn new(levels: Vec<ListLevel>) -> Self {
        let mut format_holder = SelectionMarker::default();
        format_holder.is_selected = false;
        Self {
            levels,
            blocks: Vec::new(),
            format: ListItemFormat::default(),
            format_holder,
            cached_element: None,
        }
    }

    pub fn invalidate(&mut self) {
        self.cached_element = None;
    }
}
