// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use log::debug;

use super::announce::AnnounceData;
use super::invariants::assert_invariants;
use super::plugin::{ChangeSource, EntityOperation, PluginEvent};
use super::EditorCore;
use crate::dom::NodeId;
use crate::model::{normalize_content_model, ContentModelDocument, Entity};
use crate::model_to_dom::{content_model_to_dom, ModelToDomContext};

/// An entity that appeared in or vanished from the model during a
/// transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangedEntity {
    pub wrapper: NodeId,
    pub entity_type: Option<String>,
    pub operation: EntityOperation,
}

impl ChangedEntity {
    pub fn new_entity(entity: &Entity) -> Self {
        Self {
            wrapper: entity.wrapper,
            entity_type: entity.info.entity_type.clone(),
            operation: EntityOperation::NewEntity,
        }
    }
}

/// What a mutator reports back besides "changed or not".
#[derive(Clone, Debug, Default)]
pub struct FormatContentModelContext {
    pub new_entities: Vec<ChangedEntity>,
    pub deleted_entities: Vec<ChangedEntity>,
    /// Sources of images added by the mutator.
    pub new_images: Vec<String>,
    pub skip_undo_snapshot: bool,
    pub announce_data: Option<AnnounceData>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatContentModelOptions {
    /// Name of the API doing the change, passed on to plugins.
    pub api_name: Option<String>,
    pub change_source: ChangeSource,
}

impl FormatContentModelOptions {
    pub fn new(api_name: &str) -> Self {
        Self {
            api_name: Some(api_name.to_owned()),
            change_source: ChangeSource::Format,
        }
    }

    pub fn with_source(mut self, change_source: ChangeSource) -> Self {
        self.change_source = change_source;
        self
    }
}

impl EditorCore {
    /// Run `mutator` over the current model as one transaction. When it
    /// returns `true` the change is recorded for undo, the model is
    /// normalized and rendered, the selection it carries is restored, and
    /// plugins are told about entities and the content change. When it
    /// returns `false` nothing else happens.
    ///
    /// The mutator only gets the model, so it cannot start another
    /// transaction while this one runs.
    pub fn format_content_model<F>(
        &mut self,
        mutator: F,
        options: FormatContentModelOptions,
    ) -> bool
    where
        F: FnOnce(&mut ContentModelDocument, &mut FormatContentModelContext) -> bool,
    {
        let api_name = options.api_name.as_deref().unwrap_or("formatContentModel");
        if self.is_disposed() {
            debug!("{api_name}: editor is disposed");
            return false;
        }

        let mut model = self.create_content_model();
        let before = model.clone();
        let mut context = FormatContentModelContext::default();

        if !mutator(&mut model, &mut context) {
            debug!("{api_name}: nothing changed");
            return false;
        }

        if !context.skip_undo_snapshot {
            self.push_undo_snapshot(before);
        }
        self.render_model(model);

        for entity in context.deleted_entities.into_iter().chain(context.new_entities) {
            self.queue_event(PluginEvent::EntityOperation {
                operation: entity.operation,
                wrapper: entity.wrapper,
                entity_type: entity.entity_type,
            });
        }
        if let Some(announce) = context.announce_data {
            self.announce(announce);
        }
        self.queue_event(PluginEvent::ContentChanged {
            source: options.change_source,
            api_name: options.api_name,
        });
        true
    }

    /// Normalize `model`, write it into the editor and keep it as the
    /// current model.
    pub(super) fn render_model(&mut self, mut model: ContentModelDocument) {
        normalize_content_model(&mut model.blocks, &model.format);
        assert_invariants(&model);

        let mut context = ModelToDomContext::new(
            self.model_to_dom_options.clone(),
            self.format_context.clone(),
        );
        let root = self.root();
        let selection = content_model_to_dom(&mut self.dom, root, &mut model, &mut context);
        self.format_context = context.format;
        self.selection = selection;
        self.cached_model = self.model_to_dom_options.allow_cache_element.then_some(model);
        self.queue_event(PluginEvent::SelectionChanged);
    }
}
