// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::{Dom, NodeId};

/// Read-only queries over the editable part of the document.
#[derive(Clone, Copy, Debug)]
pub struct DomHelper<'a> {
    dom: &'a Dom,
    root: NodeId,
    zoom_scale: f64,
}

impl<'a> DomHelper<'a> {
    pub(crate) fn new(dom: &'a Dom, root: NodeId, zoom_scale: f64) -> Self {
        Self {
            dom,
            root,
            zoom_scale,
        }
    }

    pub fn dom(&self) -> &'a Dom {
        self.dom
    }

    /// Elements under the editor root with tag `tag`, in document order.
    pub fn query_elements(&self, tag: &str) -> Vec<NodeId> {
        self.dom
            .descendants(self.root)
            .into_iter()
            .filter(|&node| self.dom.is_tag(node, tag))
            .collect()
    }

    /// Whether `node` is inside the editor, the root itself excluded.
    pub fn is_node_in_editor(&self, node: NodeId) -> bool {
        node != self.root && self.dom.contains(self.root, node)
    }

    /// Closest ancestor of `node` (itself included) with tag `tag`, not
    /// looking past the editor root.
    pub fn find_closest_element_ancestor(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.dom
            .closest_tag(node, &[tag], Some(self.root))
            .filter(|&found| self.is_node_in_editor(found))
    }

    pub fn get_text_content(&self) -> String {
        self.dom.text_content(self.root)
    }

    pub fn calculate_zoom_scale(&self) -> f64 {
        self.zoom_scale
    }

    /// Whether the editor shows anything besides text, like tables,
    /// images or lists.
    pub fn has_non_text_content(&self) -> bool {
        ["table", "img", "ol", "ul"]
            .iter()
            .any(|tag| !self.query_elements(tag).is_empty())
    }
}
