// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! A small arena DOM standing in for the host document.
//!
//! All nodes are owned by a [Dom] and addressed through copyable [NodeId]
//! handles, the same way the html5ever sink used to keep its nodes in one
//! big list. Detached nodes stay in the arena, so a stale [NodeId] never
//! dangles: callers check [Dom::is_connected] or the parent chain instead.

mod hidden_properties;
mod parser;
mod selection;
mod serialize;
pub mod style;

use std::collections::{BTreeMap, HashMap};

use html5ever::{LocalName, Namespace, QualName};

pub use hidden_properties::HiddenProperties;
pub use selection::{DomPosition, DomRange, DomSelection};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub(crate) fn html_qual_name(tag: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(tag.to_ascii_lowercase()),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Document,
    Fragment,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementData {
    pub(crate) name: QualName,
    pub(crate) attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            name: html_qual_name(tag),
            attrs: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.name.local
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _v)| n == name)
            .map(|(_n, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => self.attrs.push((name.to_owned(), value.to_owned())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }
}

#[derive(Clone, Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
    hidden: HashMap<NodeId, HiddenProperties>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            document: NodeId(0),
            hidden: HashMap::new(),
        }
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn add_node(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    // ─── Creation ────────────────────────────────────────────────────────

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.add_node(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.add_node(NodeData::Text(text.to_owned()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.add_node(NodeData::Comment(text.to_owned()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.add_node(NodeData::Fragment)
    }

    /// Clone a node. Hidden properties are never copied: they belong to
    /// the identity of the original node.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let data = self.node(id).data.clone();
        let new_id = self.add_node(data);
        if deep {
            let children = self.node(id).children.clone();
            for child in children {
                let new_child = self.clone_node(child, true);
                self.append_child(new_id, new_child);
            }
        }
        new_id
    }

    // ─── Node inspection ─────────────────────────────────────────────────

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Comment(_))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let NodeData::Text(t) = &mut self.node_mut(id).data {
            *t = text.to_owned();
        }
    }

    pub fn comment_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Concatenated text of a node and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.node(id).data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Comment(_) => {}
            _ => {
                for child in &self.node(id).children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.node(parent).children.iter().position(|c| *c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.node(parent).children.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.node(parent).children.get(i).copied())
    }

    /// Ancestors of `id`, nearest first, not including `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Whether `node` is `ancestor` or lives somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    /// Whether the node is reachable from the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.document, id)
    }

    /// Find the closest inclusive ancestor matching `predicate`, never
    /// walking above `stop` (which is not tested itself).
    pub fn closest(
        &self,
        id: NodeId,
        stop: Option<NodeId>,
        predicate: impl Fn(&Dom, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if Some(node) == stop {
                return None;
            }
            if predicate(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn closest_tag(
        &self,
        id: NodeId,
        tags: &[&str],
        stop: Option<NodeId>,
    ) -> Option<NodeId> {
        self.closest(id, stop, |dom, n| {
            dom.tag(n).is_some_and(|t| tags.contains(&t))
        })
    }

    /// All descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.node(id).children {
            out.push(*child);
            self.collect_descendants(*child, out);
        }
    }

    fn path_from_root(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            current = self.parent(current).unwrap_or(current);
        }
        path.reverse();
        path
    }

    /// Whether `a` comes strictly before `b` in document order. An
    /// ancestor is considered to come before its descendants. Nodes in
    /// different trees compare by arena order.
    pub fn is_before(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let root_of = |n: NodeId| self.ancestors(n).last().copied().unwrap_or(n);
        if root_of(a) != root_of(b) {
            return a < b;
        }
        self.path_from_root(a) < self.path_from_root(b)
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Remove a node from its parent. The node and its subtree stay valid.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.node_mut(id).parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) {
        if parent == child || self.contains(child, parent) {
            log::warn!("Refusing to insert a node into its own subtree");
            return;
        }
        self.detach(child);
        let index = reference
            .and_then(|r| self.node(parent).children.iter().position(|c| *c == r))
            .unwrap_or(self.node(parent).children.len());
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let reference = self.children(parent).get(index).copied();
        self.insert_before(parent, child, reference);
    }

    /// Put `new_child` where `old_child` is. Returns false when `old_child`
    /// is not a child of `parent`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> bool {
        if self.parent(old_child) != Some(parent) {
            return false;
        }
        if new_child == old_child {
            return true;
        }
        self.insert_before(parent, new_child, Some(old_child));
        self.detach(old_child);
        true
    }

    pub fn remove_all_children(&mut self, id: NodeId) {
        for child in self.node(id).children.clone() {
            self.detach(child);
        }
    }

    /// Move all children of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.node(from).children.clone() {
            self.append_child(to, child);
        }
    }

    /// Wrap all children of `parent` into a new element with `tag`, which
    /// becomes the only child of `parent`.
    pub fn wrap_all_children(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let wrapper = self.create_element(tag);
        self.move_children(parent, wrapper);
        self.append_child(parent, wrapper);
        wrapper
    }

    /// Split a text node at a char offset. The original node keeps the
    /// text before the offset; the returned new node holds the rest and is
    /// inserted right after it.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?.to_owned();
        let split_at = text
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (before, after) = text.split_at(split_at);
        let after_node = self.create_text(after);
        self.set_text(id, before);
        if let Some(parent) = self.parent(id) {
            let next = self.next_sibling(id);
            self.insert_before(parent, after_node, next);
        }
        Some(after_node)
    }

    // ─── Attributes ──────────────────────────────────────────────────────

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element_mut(id) {
            e.set_attr(name, value);
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(e) = self.element_mut(id) {
            e.remove_attr(name);
        }
    }

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.get_attribute(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let mut classes: Vec<String> =
            self.classes(id).into_iter().map(String::from).collect();
        classes.push(class.to_owned());
        self.set_attribute(id, "class", &classes.join(" "));
    }

    /// `data-*` attributes keyed the way `HTMLElement.dataset` keys them:
    /// without the prefix and in camelCase.
    pub fn dataset(&self, id: NodeId) -> BTreeMap<String, String> {
        self.element(id)
            .map(|e| {
                e.attrs
                    .iter()
                    .filter_map(|(name, value)| {
                        name.strip_prefix("data-")
                            .map(|key| (kebab_to_camel(key), value.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_dataset_value(&mut self, id: NodeId, key: &str, value: &str) {
        let name = format!("data-{}", camel_to_kebab(key));
        self.set_attribute(id, &name, value);
    }

    // ─── Inline style ────────────────────────────────────────────────────

    pub fn styles(&self, id: NodeId) -> Vec<(String, String)> {
        self.get_attribute(id, "style")
            .map(style::parse_style)
            .unwrap_or_default()
    }

    /// Value of one inline style property, if set and non-empty.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.styles(id)
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }

    /// Set one inline style property. An empty value removes it, and the
    /// `style` attribute disappears when no property is left.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let mut styles = self.styles(id);
        let value = value.trim();
        match styles.iter_mut().find(|(name, _)| name == property) {
            Some(entry) if !value.is_empty() => entry.1 = value.to_owned(),
            Some(_) => styles.retain(|(name, _)| name != property),
            None if !value.is_empty() => {
                styles.push((property.to_owned(), value.to_owned()))
            }
            None => {}
        }
        if styles.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            self.set_attribute(id, "style", &style::serialize_style(&styles));
        }
    }

    // ─── Hidden properties ───────────────────────────────────────────────

    pub fn hidden_properties(&self, id: NodeId) -> Option<&HiddenProperties> {
        self.hidden.get(&id)
    }

    pub fn hidden_properties_mut(&mut self, id: NodeId) -> &mut HiddenProperties {
        self.hidden.entry(id).or_default()
    }

    /// Drop side-table entries of nodes that are no longer attached to any
    /// live tree.
    pub fn purge_hidden_properties(&mut self) {
        let live: Vec<NodeId> = self
            .hidden
            .keys()
            .copied()
            .filter(|id| self.is_connected(*id))
            .collect();
        self.hidden.retain(|id, _| live.contains(id));
    }
}

fn kebab_to_camel(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }
    result
}

fn camel_to_kebab(key: &str) -> String {
    let mut result = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    fn div_with_text(dom: &mut Dom, text: &str) -> (NodeId, NodeId) {
        let div = dom.create_element("div");
        let txt = dom.create_text(text);
        dom.append_child(dom.document(), div);
        dom.append_child(div, txt);
        (div, txt)
    }

    #[test]
    fn inserting_moves_the_node_out_of_its_old_parent() {
        let mut dom = Dom::new();
        let (div, txt) = div_with_text(&mut dom, "a");
        let span = dom.create_element("span");
        dom.append_child(dom.document(), span);
        dom.append_child(span, txt);

        assert_that!(dom.children(div).to_vec()).is_empty();
        assert_that!(dom.parent(txt)).is_equal_to(Some(span));
    }

    #[test]
    fn split_text_uses_char_offsets() {
        let mut dom = Dom::new();
        let (div, txt) = div_with_text(&mut dom, "héllo");
        let after = dom.split_text(txt, 2).unwrap();

        assert_that!(dom.text(txt)).is_equal_to(Some("hé"));
        assert_that!(dom.text(after)).is_equal_to(Some("llo"));
        assert_that!(dom.children(div).to_vec()).is_equal_to(vec![txt, after]);
    }

    #[test]
    fn setting_an_empty_style_removes_the_property() {
        let mut dom = Dom::new();
        let (div, _) = div_with_text(&mut dom, "a");
        dom.set_style(div, "color", "red");
        dom.set_style(div, "margin-left", "40px");
        dom.set_style(div, "color", "");

        assert_that!(dom.get_attribute(div, "style"))
            .is_equal_to(Some("margin-left: 40px;"));
        dom.set_style(div, "margin-left", "");
        assert_that!(dom.has_attribute(div, "style")).is_false();
    }

    #[test]
    fn dataset_uses_camel_case_keys() {
        let mut dom = Dom::new();
        let (div, _) = div_with_text(&mut dom, "a");
        dom.set_dataset_value(div, "editingInfo", "{}");

        assert_that!(dom.get_attribute(div, "data-editing-info"))
            .is_equal_to(Some("{}"));
        assert_that!(dom.dataset(div).get("editingInfo").cloned())
            .is_equal_to(Some("{}".to_owned()));
    }

    #[test]
    fn document_order_follows_tree_paths() {
        let mut dom = Dom::new();
        let (div1, txt1) = div_with_text(&mut dom, "a");
        let (div2, _) = div_with_text(&mut dom, "b");

        assert_that!(dom.is_before(div1, div2)).is_true();
        assert_that!(dom.is_before(txt1, div2)).is_true();
        assert_that!(dom.is_before(div2, txt1)).is_false();
        assert_that!(dom.is_before(div1, txt1)).is_true();
    }

    #[test]
    fn detached_nodes_are_not_connected() {
        let mut dom = Dom::new();
        let (div, txt) = div_with_text(&mut dom, "a");
        assert_that!(dom.is_connected(txt)).is_true();
        dom.detach(div);
        assert_that!(dom.is_connected(txt)).is_false();
    }

    #[test]
    fn hidden_properties_are_not_cloned() {
        let mut dom = Dom::new();
        let (div, _) = div_with_text(&mut dom, "a");
        dom.hidden_properties_mut(div).undeletable = true;
        let copy = dom.clone_node(div, true);

        assert_that!(dom.hidden_properties(copy)).is_none();
        assert_that!(dom.text_content(copy)).is_equal_to("a".to_owned());
    }
}
