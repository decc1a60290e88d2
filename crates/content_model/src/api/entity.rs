// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumString};

use super::merge::{merge_model, segments_document, MergeModelOptions};
use crate::dom::NodeId;
use crate::editor::{
    ChangeSource, ChangedEntity, EditorCore, FormatContentModelOptions,
};
use crate::model::{
    Block, ContentModelDocument, Entity, EntityInfo, Paragraph, Segment,
};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum InsertEntityPosition {
    /// At the selection, replacing it.
    #[default]
    Focus,
    Begin,
    End,
}

/// Insert a new read-only entity of `entity_type` and return its wrapper
/// for the caller to fill. Block entities get a `div` wrapper, inline ones
/// a `span`.
pub fn insert_entity(
    editor: &mut EditorCore,
    entity_type: &str,
    is_block: bool,
    position: InsertEntityPosition,
) -> Option<NodeId> {
    let wrapper = editor
        .get_document_mut()
        .create_element(if is_block { "div" } else { "span" });
    let entity = Entity::new(
        wrapper,
        EntityInfo {
            entity_type: Some(entity_type.to_owned()),
            id: None,
            is_readonly: true,
            is_fake_entity: false,
        },
    );

    let inserted = editor.format_content_model(
        |model, context| match position {
            InsertEntityPosition::Focus => {
                let source = if is_block {
                    let mut document = ContentModelDocument::new();
                    document.blocks.push(Block::Entity(entity));
                    document
                } else {
                    segments_document(vec![Segment::Entity(entity)])
                };
                merge_model(model, source, context, MergeModelOptions::default()).is_some()
            }
            InsertEntityPosition::Begin | InsertEntityPosition::End => {
                context.new_entities.push(ChangedEntity::new_entity(&entity));
                let block = if is_block {
                    Block::Entity(entity)
                } else {
                    let mut paragraph = Paragraph::new(false);
                    paragraph.segments.push(Segment::Entity(entity));
                    Block::Paragraph(paragraph)
                };
                let at = match position {
                    InsertEntityPosition::Begin => 0,
                    _ => model.blocks.len(),
                };
                model.blocks.insert(at, block);
                true
            }
        },
        FormatContentModelOptions::new("insertEntity").with_source(ChangeSource::InsertEntity),
    );
    inserted.then_some(wrapper)
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::{DomPosition, DomSelection};
    use crate::editor::{EditorOptions, EntityOperation, PluginEvent};

    fn editor_with_caret(html: &str, offset: usize) -> EditorCore {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html(html));
        let root = editor.root();
        let dom = editor.get_document();
        let text = dom
            .descendants(root)
            .into_iter()
            .find(|&n| dom.is_text(n))
            .unwrap();
        editor.set_dom_selection(Some(DomSelection::caret(DomPosition::new(text, offset))));
        editor
    }

    #[test]
    fn inline_entity_goes_to_the_caret() {
        let mut editor = editor_with_caret("<div>ab</div>", 1);
        let wrapper = insert_entity(&mut editor, "Mention", false, InsertEntityPosition::Focus);

        assert_that!(wrapper).is_some();
        assert_that!(editor.get_content()).is_equal_to(
            r#"<div>a<span class="_Entity _EType_Mention _EReadonly_1" contenteditable="false"></span>b</div>"#
                .to_owned(),
        );
    }

    #[test]
    fn block_entity_at_the_end_raises_an_entity_event() {
        let mut editor = editor_with_caret("<div>ab</div>", 1);
        editor.take_pending_events();
        let wrapper = insert_entity(&mut editor, "Card", true, InsertEntityPosition::End).unwrap();

        let model = editor.create_content_model();
        assert_that!(model.blocks.last().map(Block::cached_element)).is_equal_to(Some(Some(wrapper)));
        let events = editor.take_pending_events();
        assert_that!(events.iter().any(|e| matches!(
            e,
            PluginEvent::EntityOperation {
                operation: EntityOperation::NewEntity,
                wrapper: w,
                ..
            } if *w == wrapper
        )))
        .is_true();
    }

    #[test]
    fn nothing_happens_at_focus_without_a_selection() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>ab</div>"));
        assert_that!(insert_entity(&mut editor, "Mention", false, InsertEntityPosition::Focus))
            .is_none();
    }
}
