// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::{BTreeSet, VecDeque};

use log::{debug, trace};

use super::announce::AnnounceData;
use super::dom_helper::DomHelper;
use super::options::{EditorOptions, Environment};
use super::plugin::{ChangeSource, PluginEvent};
use crate::dom::{Dom, DomSelection, NodeId};
use crate::dom_to_model::{dom_to_content_model, DomToModelContext, DomToModelOptions};
use crate::format_handlers::{DarkColorHandler, FormatContext};
use crate::model::{ContentModelDocument, SegmentFormat};
use crate::model_to_dom::ModelToDomOptions;

/// Everything an editor is apart from its plugins: the document, the
/// editable root, the current selection and model, and undo history.
/// Plugins get this to work with; events they cause are queued and
/// delivered once the current event is done.
#[derive(Debug)]
pub struct EditorCore {
    pub(super) dom: Dom,
    root: NodeId,
    pub(super) format_context: FormatContext,
    dom_to_model_options: DomToModelOptions,
    pub(super) model_to_dom_options: ModelToDomOptions,
    default_format: SegmentFormat,
    pub(super) selection: Option<DomSelection>,
    /// The model as last rendered or parsed, valid until the DOM is
    /// touched outside a transaction.
    pub(super) cached_model: Option<ContentModelDocument>,
    pub(super) undo_stack: Vec<ContentModelDocument>,
    pub(super) redo_stack: Vec<ContentModelDocument>,
    is_disposed: bool,
    has_focus: bool,
    dom_events: BTreeSet<String>,
    environment: Environment,
    announce_container: Option<NodeId>,
    announcements: Vec<String>,
    pending_events: VecDeque<PluginEvent>,
}

impl EditorCore {
    pub fn new(options: EditorOptions) -> Self {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true");
        let document = dom.document();
        dom.append_child(document, root);
        dom.set_inner_html(root, &options.initial_html);

        let dark_colors = match options.get_dark_color {
            Some(get_dark_color) => DarkColorHandler::new(get_dark_color),
            None => DarkColorHandler::default(),
        };
        let format_context = FormatContext {
            is_dark_mode: options.in_dark_mode,
            dark_colors,
            direction: options.direction,
            zoom_scale: options.zoom_scale,
        };

        Self {
            dom,
            root,
            format_context,
            dom_to_model_options: DomToModelOptions {
                allow_cache_element: options.allow_cache_element,
                process_virtual_indentation: options.process_virtual_indentation,
                editable_only: false,
                processors: options.processors,
            },
            model_to_dom_options: ModelToDomOptions {
                allow_cache_element: options.allow_cache_element,
                add_delimiter_for_entity: options.add_delimiter_for_entity,
                entity_placeholders: options.entity_placeholders,
                on_node_created: None,
            },
            default_format: options.default_format,
            selection: None,
            cached_model: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            is_disposed: false,
            has_focus: false,
            dom_events: BTreeSet::new(),
            environment: options.environment,
            announce_container: None,
            announcements: Vec::new(),
            pending_events: VecDeque::new(),
        }
    }

    /// The editable root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get_document(&self) -> &Dom {
        &self.dom
    }

    /// Direct access to the document. The current model is dropped, so
    /// the next transaction reads the DOM again.
    pub fn get_document_mut(&mut self) -> &mut Dom {
        self.cached_model = None;
        &mut self.dom
    }

    pub fn get_dom_helper(&self) -> DomHelper<'_> {
        DomHelper::new(&self.dom, self.root, self.format_context.zoom_scale)
    }

    pub fn get_environment(&self) -> &Environment {
        &self.environment
    }

    pub fn format_context(&self) -> &FormatContext {
        &self.format_context
    }

    pub fn default_format(&self) -> &SegmentFormat {
        &self.default_format
    }

    /// Current content as HTML.
    pub fn get_content(&self) -> String {
        self.dom.inner_html(self.root)
    }

    /// Replace all content. This can be undone.
    pub fn set_content(&mut self, html: &str) {
        if self.is_disposed {
            return;
        }
        let before = self.create_content_model();
        self.push_undo_snapshot(before);
        self.dom.set_inner_html(self.root, html);
        self.cached_model = None;
        self.selection = None;
        self.queue_event(PluginEvent::ContentChanged {
            source: ChangeSource::SetContent,
            api_name: None,
        });
    }

    /// The model of the current content with the current selection.
    pub fn create_content_model(&mut self) -> ContentModelDocument {
        if let Some(model) = &self.cached_model {
            return model.clone();
        }
        let mut context = DomToModelContext::new(
            self.dom_to_model_options.clone(),
            self.format_context.clone(),
        )
        .with_selection(self.get_dom_selection())
        .with_default_format(self.default_format.clone());
        let model = dom_to_content_model(&self.dom, self.root, &mut context);
        trace!("Created content model with {} blocks", model.blocks.len());
        if self.dom_to_model_options.allow_cache_element {
            self.cached_model = Some(model.clone());
        }
        model
    }

    /// The selection, if it still points into the document.
    pub fn get_dom_selection(&self) -> Option<DomSelection> {
        self.selection
            .clone()
            .filter(|selection| selection.is_connected(&self.dom))
    }

    pub fn set_dom_selection(&mut self, selection: Option<DomSelection>) {
        if self.selection == selection {
            return;
        }
        self.selection = selection;
        self.cached_model = None;
        self.queue_event(PluginEvent::SelectionChanged);
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn focus(&mut self) {
        if !self.has_focus {
            self.has_focus = true;
            self.trigger_dom_event("focus", Some(self.root));
        }
    }

    pub fn blur(&mut self) {
        if self.has_focus {
            self.has_focus = false;
            self.trigger_dom_event("blur", Some(self.root));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.is_disposed
    }

    pub(crate) fn dispose(&mut self) {
        self.is_disposed = true;
        self.cached_model = None;
        self.pending_events.clear();
        self.dom_events.clear();
    }

    /// Start delivering DOM events called `name` to plugins.
    pub fn attach_dom_event(&mut self, name: &str) {
        self.dom_events.insert(name.to_owned());
    }

    pub fn detach_dom_event(&mut self, name: &str) {
        self.dom_events.remove(name);
    }

    /// A DOM event happened in the editor. It reaches plugins only when
    /// someone attached to it.
    pub fn trigger_dom_event(&mut self, name: &str, target: Option<NodeId>) {
        if self.dom_events.contains(name) {
            self.queue_event(PluginEvent::DomEvent {
                name: name.to_owned(),
                target,
            });
        } else {
            trace!("Ignoring unattached DOM event {name}");
        }
    }

    /// Read out a message through the editor's live region.
    pub fn announce(&mut self, data: AnnounceData) {
        let message = data.message();
        if message.is_empty() {
            return;
        }
        let container = match self.announce_container {
            Some(container) if self.dom.is_connected(container) => container,
            _ => {
                let container = self.dom.create_element("div");
                self.dom.set_attribute(container, "aria-live", "assertive");
                self.dom.set_style(container, "position", "fixed");
                self.dom.set_style(container, "clip", "rect(0px, 0px, 0px, 0px)");
                let document = self.dom.document();
                self.dom.append_child(document, container);
                self.announce_container = Some(container);
                container
            }
        };
        self.dom.remove_all_children(container);
        let text = self.dom.create_text(&message);
        self.dom.append_child(container, text);
        debug!("Announcing: {message}");
        self.announcements.push(message);
    }

    /// Messages announced so far, oldest first.
    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub(crate) fn queue_event(&mut self, event: PluginEvent) {
        if !self.is_disposed {
            self.pending_events.push_back(event);
        }
    }

    pub(crate) fn take_pending_events(&mut self) -> Vec<PluginEvent> {
        self.pending_events.drain(..).collect()
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::DomPosition;
    use crate::editor::KnownAnnounceString;
    use crate::model::{get_model_selection, ModelSelection};

    #[test]
    fn initial_html_becomes_the_content() {
        let editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>hello</div>"));
        assert_that!(editor.get_content()).is_equal_to("<div>hello</div>".to_owned());
        let root = editor.root();
        assert_that!(editor.get_document().get_attribute(root, "contenteditable"))
            .is_equal_to(Some("true"));
    }

    #[test]
    fn model_carries_the_dom_selection() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>hello</div>"));
        let root = editor.root();
        let div = editor.get_document().first_child(root).unwrap();
        let text = editor.get_document().first_child(div).unwrap();
        editor.set_dom_selection(Some(DomSelection::caret(DomPosition::new(text, 2))));

        let model = editor.create_content_model();

        assert_that!(matches!(get_model_selection(&model.blocks), ModelSelection::Collapsed(_)))
            .is_true();
    }

    #[test]
    fn selection_of_detached_nodes_is_dropped() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>hello</div>"));
        let root = editor.root();
        let div = editor.get_document().first_child(root).unwrap();
        editor.set_dom_selection(Some(DomSelection::caret(DomPosition::new(div, 0))));
        editor.get_document_mut().detach(div);
        assert_that!(editor.get_dom_selection()).is_none();
    }

    #[test]
    fn only_attached_dom_events_are_delivered() {
        let mut editor = EditorCore::new(EditorOptions::new());
        editor.focus();
        assert_that!(editor.take_pending_events()).is_empty();

        editor.attach_dom_event("blur");
        editor.blur();
        assert_that!(editor.take_pending_events()).has_length(1);
        assert_that!(editor.has_focus()).is_false();
    }

    #[test]
    fn announcements_go_to_a_live_region() {
        let mut editor = EditorCore::new(EditorOptions::new());
        editor.announce(AnnounceData::known(KnownAnnounceString::ImageInserted, vec![]));
        editor.announce(AnnounceData::known(
            KnownAnnounceString::SelectingTableCells,
            vec!["a, b".into()],
        ));

        assert_that!(editor.announcements().to_vec()).is_equal_to(vec![
            "Image inserted".to_owned(),
            "a, b, selected".to_owned(),
        ]);
        let document = editor.get_document().document();
        let region = editor.get_document().children(document)[1];
        assert_that!(editor.get_document().text_content(region))
            .is_equal_to("a, b, selected".to_owned());
    }
}
