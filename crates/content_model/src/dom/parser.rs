// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{parse_fragment, Attribute, QualName};

use super::{html_qual_name, Dom, ElementData, NodeData, NodeId};

/// Parses HTML straight into a [Dom] arena. The sink borrows the whole
/// arena for the duration of the parse and gives it back in
/// [CreatorOutput].
struct DomCreator {
    state: RefCell<CreatorState>,
}

struct CreatorState {
    dom: Dom,
    root: NodeId,
    parse_errors: Vec<String>,
    unnamed: QualName,
}

struct CreatorOutput {
    dom: Dom,
    root: NodeId,
    parse_errors: Vec<String>,
}

impl DomCreator {
    fn new(mut dom: Dom) -> Self {
        let root = dom.create_fragment();
        Self {
            state: RefCell::new(CreatorState {
                dom,
                root,
                parse_errors: Vec::new(),
                unnamed: html_qual_name(""),
            }),
        }
    }

    fn parse(dom: Dom, html: &str) -> CreatorOutput {
        parse_fragment(
            DomCreator::new(dom),
            Default::default(),
            html_qual_name("body"),
            vec![],
        )
        .from_utf8()
        .one(html.as_bytes())
    }
}

impl CreatorState {
    /// Append text to `parent`, joining it to a trailing text node if there
    /// is one, as the browser parser does.
    fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.dom.last_child(parent) {
            if let NodeData::Text(existing) = &mut self.dom.nodes[last.0].data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.dom.create_text(text);
        self.dom.append_child(parent, node);
    }

    fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        if let Some(previous) = self.dom.previous_sibling(sibling) {
            if let NodeData::Text(existing) =
                &mut self.dom.nodes[previous.0].data
            {
                existing.push_str(text);
                return;
            }
        }
        if let Some(parent) = self.dom.parent(sibling) {
            let node = self.dom.create_text(text);
            self.dom.insert_before(parent, node, Some(sibling));
        }
    }
}

impl TreeSink for DomCreator {
    type Handle = NodeId;
    type Output = CreatorOutput;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        let state = self.state.into_inner();
        CreatorOutput {
            dom: state.dom,
            root: state.root,
            parse_errors: state.parse_errors,
        }
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.state.borrow_mut().parse_errors.push(String::from(msg));
    }

    fn get_document(&self) -> Self::Handle {
        self.state.borrow().root
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.state.borrow(), |state| {
            state
                .dom
                .element(*target)
                .map(|e| &e.name)
                .unwrap_or(&state.unnamed)
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|attr| {
                (attr.name.local.as_ref().to_owned(), attr.value.as_ref().to_owned())
            })
            .collect();
        self.state
            .borrow_mut()
            .dom
            .add_node(NodeData::Element(ElementData { name, attrs }))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.state.borrow_mut().dom.create_comment(text.as_ref())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        // Processing instructions only show up in broken HTML; keep them
        // as inert comments.
        self.state.borrow_mut().dom.create_comment(data.as_ref())
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let state = &mut self.state.borrow_mut();
        match child {
            NodeOrText::AppendNode(child) => {
                state.dom.append_child(*parent, child)
            }
            NodeOrText::AppendText(tendril) => {
                state.append_text(*parent, tendril.as_ref())
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.state.borrow().dom.parent(*element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Fragments have no doctype
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        sibling: &Self::Handle,
        new_node: NodeOrText<Self::Handle>,
    ) {
        let state = &mut self.state.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => {
                if let Some(parent) = state.dom.parent(*sibling) {
                    state.dom.insert_before(parent, node, Some(*sibling));
                }
            }
            NodeOrText::AppendText(tendril) => {
                state.insert_text_before(*sibling, tendril.as_ref())
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let dom = &mut self.state.borrow_mut().dom;
        if let Some(element) = dom.element_mut(*target) {
            for attr in attrs {
                let name = attr.name.local.as_ref();
                if element.get_attr(name).is_none() {
                    element.set_attr(name, attr.value.as_ref());
                }
            }
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.state.borrow_mut().dom.detach(*target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        self.state.borrow_mut().dom.move_children(*node, *new_parent);
    }

    fn is_mathml_annotation_xml_integration_point(
        &self,
        _handle: &Self::Handle,
    ) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(
        &self,
        _intended_parent: &Self::Handle,
    ) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        Err(String::from("Shadow roots are not supported"))
    }
}

impl Dom {
    /// Parse an HTML fragment and append the resulting nodes to `parent`.
    /// Parsing is best effort: parse errors are logged and the recovered
    /// tree is used. Returns the newly appended top level nodes.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Vec<NodeId> {
        let output = DomCreator::parse(std::mem::take(self), html);
        *self = output.dom;
        for error in output.parse_errors {
            log::debug!("HTML parse error: {error}");
        }

        // Fragment parsing always wraps its result in a synthetic <html>
        let container = self
            .children(output.root)
            .iter()
            .copied()
            .find(|c| self.is_tag(*c, "html"))
            .unwrap_or(output.root);
        let nodes = self.children(container).to_vec();
        for node in &nodes {
            self.append_child(parent, *node);
        }
        nodes
    }

    /// Replace the children of `parent` with the parsed `html`.
    pub fn set_inner_html(&mut self, parent: NodeId, html: &str) {
        self.remove_all_children(parent);
        self.append_html(parent, html);
    }

    /// Create a document holding a single editable `div` whose content is
    /// `html`. Returns the dom and the `div`.
    pub fn with_root_html(html: &str) -> (Self, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true");
        dom.append_child(dom.document(), root);
        dom.append_html(root, html);
        (dom, root)
    }
}
