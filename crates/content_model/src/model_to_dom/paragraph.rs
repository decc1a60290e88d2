// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::block_group::{render_block_group_children, reuse_cached_element};
use super::context::{segment_format_diff, Anchor, ModelNodeRef, ModelToDomContext};
use super::entity::render_segment_entity;
use crate::dom::{Dom, NodeId};
use crate::format_handlers::{
    apply_block_segment_format, ContentFormat, DatasetHandler, FormatHandler,
    ParagraphMarkerHandler,
};
use crate::model::{
    BlockFormat, Code, Image, Link, MergeFormat, Paragraph, Segment,
    SegmentFormat,
};

pub(crate) fn render_paragraph(
    dom: &mut Dom,
    parent: NodeId,
    paragraph: &mut Paragraph,
    context: &mut ModelToDomContext,
    ref_node: Option<NodeId>,
) -> Option<NodeId> {
    if let Some(element) = paragraph.cached_element {
        // Selected paragraphs are rendered again so their nodes can carry
        // the selection.
        if !paragraph.has_selection() {
            return reuse_cached_element(dom, parent, element, ref_node);
        }
    }

    let own_format = context.own_block_format(&paragraph.format);
    let has_content = paragraph.segments.iter().any(|s| !s.is_marker());
    let needs_wrapper = !paragraph.is_implicit
        || paragraph.decorator.is_some()
        || paragraph.marker.is_some()
        || (has_content && own_format != BlockFormat::default());

    let scope = context.save_scope();
    let (container, before) = if needs_wrapper {
        let tag = paragraph
            .decorator
            .as_ref()
            .map_or("div", |d| d.tag_name.as_str());
        let element = dom.create_element(tag);
        dom.insert_before(parent, element, ref_node);
        own_format.apply_to(dom, element, &mut context.format);
        let block_segment_format =
            segment_format_diff(&paragraph.segment_format, &context.implicit_segment_format);
        apply_block_segment_format(&block_segment_format, dom, element, &mut context.format);
        ParagraphMarkerHandler::apply(&paragraph.marker, dom, element, &mut context.format);
        context.node_created(ModelNodeRef::Paragraph(paragraph), element);
        if context.options.allow_cache_element {
            paragraph.cached_element = Some(element);
        }
        context.anchor = Some(Anchor::Start(element));
        (element, None)
    } else {
        context.anchor = Some(Anchor::before(dom, parent, ref_node));
        (parent, ref_node)
    };

    context.inherit_block_format(&paragraph.format);
    if let Some(decorator) = &paragraph.decorator {
        context.implicit_segment_format.merge_from(&decorator.format);
    }
    context.implicit_segment_format.merge_from(&paragraph.segment_format);

    for segment in paragraph.segments.iter_mut() {
        render_segment(dom, container, before, segment, context);
    }

    context.restore_scope(scope);
    ref_node
}

/// Render one segment into `container` before `before`, tracking where
/// the selection starts and ends.
pub(crate) fn render_segment(
    dom: &mut Dom,
    container: NodeId,
    before: Option<NodeId>,
    segment: &mut Segment,
    context: &mut ModelToDomContext,
) {
    let selected = segment.is_selected();
    if selected {
        context.mark_selection_start();
    }

    let created = match segment {
        Segment::SelectionMarker(_) => None,
        Segment::Text(text) => {
            let node = dom.create_text(&text.text);
            let outer = wrap_segment(
                dom,
                container,
                before,
                node,
                &text.format,
                text.link.as_ref(),
                text.code.as_ref(),
                context,
            );
            context.anchor = Some(Anchor::TextEnd(node));
            Some(outer)
        }
        Segment::Br(br) => {
            let node = dom.create_element("br");
            let outer = wrap_segment(dom, container, before, node, &br.format, None, None, context);
            context.anchor = Some(Anchor::After(outer));
            Some(outer)
        }
        Segment::Image(image) => {
            let node = create_image(dom, image, context);
            let outer = wrap_segment(
                dom,
                container,
                before,
                node,
                &image.format,
                image.link.as_ref(),
                None,
                context,
            );
            if image.is_selected_as_image_selection {
                context.image_selection = Some(node);
            }
            context.anchor = Some(Anchor::After(outer));
            Some(outer)
        }
        Segment::General(general) => {
            let element = dom.clone_node(general.element, false);
            dom.insert_before(container, element, before);
            render_block_group_children(dom, element, &mut general.blocks, context);
            context.anchor = Some(Anchor::After(element));
            Some(element)
        }
        Segment::Entity(entity) => {
            let last = render_segment_entity(dom, container, before, entity, context);
            context.anchor = Some(Anchor::After(last));
            Some(entity.wrapper)
        }
    };

    if let Some(node) = created {
        context.node_created(ModelNodeRef::Segment(&*segment), node);
    }
    if selected {
        context.mark_selection_end();
    }
}

fn create_image(dom: &mut Dom, image: &Image, context: &mut ModelToDomContext) -> NodeId {
    let img = dom.create_element("img");
    dom.set_attribute(img, "src", &image.src);
    if let Some(alt) = &image.alt {
        dom.set_attribute(img, "alt", alt);
    }
    if let Some(title) = &image.title {
        dom.set_attribute(img, "title", title);
    }
    image.image_format.apply_to(dom, img, &mut context.format);
    DatasetHandler::apply(&image.dataset, dom, img, &mut context.format);
    img
}

/// Put `content` into a `span` carrying the segment format, then code
/// and link wrappers, giving `span > a > code > b > i > u > s > sub/sup`.
/// A span left without attributes is dropped. Returns the last top level
/// node inserted into `container`.
#[allow(clippy::too_many_arguments)]
fn wrap_segment(
    dom: &mut Dom,
    container: NodeId,
    before: Option<NodeId>,
    content: NodeId,
    format: &SegmentFormat,
    link: Option<&Link>,
    code: Option<&Code>,
    context: &mut ModelToDomContext,
) -> NodeId {
    let span = dom.create_element("span");
    dom.insert_before(container, span, before);
    dom.append_child(span, content);

    let format = segment_format_diff(format, &context.implicit_segment_format);
    format.apply_to(dom, span, &mut context.format);
    if let Some(code) = code {
        let element = dom.wrap_all_children(span, "code");
        code.format.apply_to(dom, element, &mut context.format);
    }
    if let Some(link) = link {
        let element = dom.wrap_all_children(span, "a");
        link.format.apply_to(dom, element, &mut context.format);
        DatasetHandler::apply(&link.dataset, dom, element, &mut context.format);
    }

    let is_bare = dom.element(span).is_some_and(|e| e.attrs().is_empty())
        && dom.hidden_properties(span).map_or(true, |p| p.is_empty());
    if !is_bare {
        return span;
    }
    let children = dom.children(span).to_vec();
    for child in &children {
        dom.insert_before(container, *child, Some(span));
    }
    dom.detach(span);
    children.last().copied().unwrap_or(content)
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::format_handlers::FormatContext;
    use crate::model::{LinkFormat, Text};
    use crate::model_to_dom::ModelToDomOptions;

    fn render(paragraph: &mut Paragraph) -> String {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let mut context =
            ModelToDomContext::new(ModelToDomOptions::default(), FormatContext::default());
        render_paragraph(&mut dom, root, paragraph, &mut context, None);
        dom.inner_html(root)
    }

    #[test]
    fn implicit_paragraphs_have_no_wrapper() {
        let mut paragraph = Paragraph::new(true);
        paragraph.segments.push(Segment::text("a", SegmentFormat::default()));
        assert_that!(render(&mut paragraph)).is_equal_to("a".to_owned());
    }

    #[test]
    fn segment_wrappers_nest_in_order() {
        let mut paragraph = Paragraph::new(false);
        let mut text = Text::new(
            "x",
            SegmentFormat {
                font_weight: Some("bold".into()),
                italic: Some(true),
                text_color: Some("red".into()),
                ..Default::default()
            },
        );
        text.link = Some(Link {
            format: LinkFormat {
                href: Some("https://matrix.org".into()),
                ..Default::default()
            },
            ..Default::default()
        });
        paragraph.segments.push(Segment::Text(text));

        assert_that!(render(&mut paragraph)).is_equal_to(
            r#"<div><span style="color: red;"><a href="https://matrix.org"><b><i>x</i></b></a></span></div>"#
                .to_owned(),
        );
    }

    #[test]
    fn format_given_by_the_heading_is_not_repeated() {
        let mut paragraph = Paragraph::new(false);
        paragraph.decorator = crate::model::ParagraphDecorator::for_tag("h1");
        paragraph.segments.push(Segment::text(
            "Title",
            SegmentFormat {
                font_size: Some("2em".into()),
                font_weight: Some("bold".into()),
                ..Default::default()
            },
        ));
        assert_that!(render(&mut paragraph)).is_equal_to("<h1>Title</h1>".to_owned());
    }

    #[test]
    fn implicit_paragraph_with_own_format_gets_a_div() {
        let mut paragraph = Paragraph::with_format(
            true,
            BlockFormat {
                text_align: Some("center".into()),
                ..Default::default()
            },
        );
        paragraph.segments.push(Segment::text("a", SegmentFormat::default()));
        assert_that!(render(&mut paragraph))
            .is_equal_to(r#"<div style="text-align: center;">a</div>"#.to_owned());
    }
}
