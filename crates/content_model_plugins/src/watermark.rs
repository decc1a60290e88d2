// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use content_model::api::is_model_empty_fast;
use content_model::dom::NodeId;
use content_model::editor::{
    ChangedEntity, EditorCore, EditorPlugin, EntityOperation,
    FormatContentModelOptions, PluginEvent,
};
use content_model::model::{Block, Entity, EntityInfo, Paragraph, Segment};
use log::debug;

pub const WATERMARK_ENTITY_TYPE: &str = "Watermark";

const DEFAULT_COLOR: &str = "#AAAAAA";

/// Shows placeholder text while the editor is empty and not focused.
///
/// The text lives in a read-only entity at the top of the document, so
/// it is rendered with the content but never becomes part of it.
pub struct WatermarkPlugin {
    text: String,
    color: String,
}

impl WatermarkPlugin {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            color: DEFAULT_COLOR.to_owned(),
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_owned();
        self
    }

    fn update(&self, editor: &mut EditorCore) {
        let mut model = editor.create_content_model();
        let is_shown = remove_watermark(&mut model.blocks).is_some();
        let should_show = !editor.has_focus()
            && is_model_empty_fast(&model)
            && !editor.get_dom_helper().has_non_text_content();

        match (is_shown, should_show) {
            (false, true) => self.show(editor),
            (true, false) => self.hide(editor),
            _ => {}
        }
    }

    fn show(&self, editor: &mut EditorCore) {
        debug!("Showing watermark");
        let dom = editor.get_document_mut();
        let wrapper = dom.create_element("span");
        let text = dom.create_text(&self.text);
        dom.append_child(wrapper, text);
        dom.set_style(wrapper, "color", &self.color);
        dom.set_style(wrapper, "pointer-events", "none");

        let entity = Entity::new(
            wrapper,
            EntityInfo {
                entity_type: Some(WATERMARK_ENTITY_TYPE.to_owned()),
                id: None,
                is_readonly: true,
                is_fake_entity: false,
            },
        );
        editor.format_content_model(
            |model, context| {
                context.skip_undo_snapshot = true;
                context.new_entities.push(ChangedEntity::new_entity(&entity));
                let mut paragraph = Paragraph::new(false);
                paragraph.segments.push(Segment::Entity(entity));
                model.blocks.insert(0, Block::Paragraph(paragraph));
                true
            },
            FormatContentModelOptions::new("showWatermark"),
        );
    }

    fn hide(&self, editor: &mut EditorCore) {
        debug!("Hiding watermark");
        editor.format_content_model(
            |model, context| {
                let Some(wrapper) = remove_watermark(&mut model.blocks) else {
                    return false;
                };
                context.skip_undo_snapshot = true;
                context.deleted_entities.push(ChangedEntity {
                    wrapper,
                    entity_type: Some(WATERMARK_ENTITY_TYPE.to_owned()),
                    operation: EntityOperation::Remove,
                });
                true
            },
            FormatContentModelOptions::new("hideWatermark"),
        );
    }
}

fn is_watermark(block: &Block) -> Option<&Entity> {
    block.as_paragraph()?.segments.iter().find_map(|segment| match segment {
        Segment::Entity(entity)
            if entity.info.entity_type.as_deref() == Some(WATERMARK_ENTITY_TYPE) =>
        {
            Some(entity)
        }
        _ => None,
    })
}

/// Drop the watermark paragraph, returning its wrapper.
fn remove_watermark(blocks: &mut Vec<Block>) -> Option<NodeId> {
    let index = blocks.iter().position(|block| is_watermark(block).is_some())?;
    let wrapper = is_watermark(&blocks[index]).map(|entity| entity.wrapper);
    blocks.remove(index);
    wrapper
}

impl EditorPlugin for WatermarkPlugin {
    fn name(&self) -> &str {
        "Watermark"
    }

    fn initialize(&mut self, editor: &mut EditorCore) {
        editor.attach_dom_event("focus");
        editor.attach_dom_event("blur");
    }

    fn on_plugin_event(&mut self, event: &PluginEvent, editor: &mut EditorCore) {
        let relevant = match event {
            PluginEvent::EditorReady | PluginEvent::ContentChanged { .. } => true,
            PluginEvent::DomEvent { name, .. } => name == "focus" || name == "blur",
            _ => false,
        };
        if relevant {
            self.update(editor);
        }
    }
}

#[cfg(test)]
mod test {
    use content_model::dom::Dom;
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn watermark_paragraph_is_found_and_removed() {
        let mut dom = Dom::new();
        let wrapper = dom.create_element("span");
        let entity = Entity::new(
            wrapper,
            EntityInfo {
                entity_type: Some(WATERMARK_ENTITY_TYPE.to_owned()),
                id: None,
                is_readonly: true,
                is_fake_entity: false,
            },
        );
        let mut paragraph = Paragraph::new(false);
        paragraph.segments.push(Segment::Entity(entity));
        let mut blocks = vec![Block::Paragraph(Paragraph::new(false)), Block::Paragraph(paragraph)];

        assert_that!(remove_watermark(&mut blocks)).is_equal_to(Some(wrapper));
        assert_that!(blocks).has_length(1);
        assert_that!(remove_watermark(&mut blocks)).is_none();
    }
}
