// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use content_model::dom::{DomSelection, NodeId};
use content_model::editor::{
    EditorCore, EditorPlugin, MouseButton, MouseEventInfo, PluginEvent,
};
use log::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

use crate::link_match::match_link;

/// Longer tooltips are cut down to this many characters.
const MAX_TOOLTIP_GRAPHEMES: usize = 256;

pub type TooltipFn = Box<dyn Fn(&str, NodeId) -> Option<String>>;
/// Called with the anchor for every click on a link. Returning `true`
/// means the click was handled and the link is not opened.
pub type LinkClickFn = Box<dyn Fn(NodeId, &MouseEventInfo) -> bool>;
/// Opens `url` in the window called `target`.
pub type OpenWindowFn = Box<dyn Fn(&str, &str)>;

/// What to show when hovering a link.
#[derive(Default)]
pub enum HyperlinkTooltip {
    /// The link's own URL.
    #[default]
    Url,
    Text(String),
    /// Computed from the href and the anchor.
    Custom(TooltipFn),
    None,
}

impl HyperlinkTooltip {
    fn text_for(&self, href: &str, anchor: NodeId) -> Option<String> {
        let text = match self {
            Self::Url => Some(href.to_owned()),
            Self::Text(text) => Some(text.clone()),
            Self::Custom(tooltip) => tooltip(href, anchor),
            Self::None => None,
        }?;
        if text.graphemes(true).count() <= MAX_TOOLTIP_GRAPHEMES {
            return Some(text);
        }
        let mut cut: String = text.graphemes(true).take(MAX_TOOLTIP_GRAPHEMES).collect();
        cut.push('…');
        Some(cut)
    }
}

/// The node the caret was in when typing started, and the href of the
/// link around it if that href was derived from the link's text.
struct TrackedNode {
    node: NodeId,
    auto_href: Option<String>,
}

/// Makes links behave like links inside the editor: hovering shows a
/// tooltip, ctrl+click (cmd+click on mac) opens them, and editing the
/// text of a link that shows its own URL keeps the href in step.
pub struct HyperlinkPlugin {
    tooltip: HyperlinkTooltip,
    target: Option<String>,
    on_link_click: Option<LinkClickFn>,
    open_window: Option<OpenWindowFn>,
    /// The anchor with a tooltip, and the title it had before.
    hovered: Option<(NodeId, Option<String>)>,
    tracked: Option<TrackedNode>,
}

impl HyperlinkPlugin {
    pub fn new(tooltip: HyperlinkTooltip) -> Self {
        Self {
            tooltip,
            target: None,
            on_link_click: None,
            open_window: None,
            hovered: None,
            tracked: None,
        }
    }

    /// Window to open links in. Defaults to `_blank`.
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    pub fn with_link_click(mut self, on_link_click: LinkClickFn) -> Self {
        self.on_link_click = Some(on_link_click);
        self
    }

    pub fn with_window_opener(mut self, open_window: OpenWindowFn) -> Self {
        self.open_window = Some(open_window);
        self
    }

    fn link_at(editor: &EditorCore, node: NodeId) -> Option<(NodeId, String)> {
        let anchor = editor.get_dom_helper().find_closest_element_ancestor(node, "a")?;
        let href = editor.get_document().get_attribute(anchor, "href")?;
        Some((anchor, href.to_owned()))
    }

    fn show_tooltip(&mut self, editor: &mut EditorCore, target: NodeId) {
        let Some((anchor, href)) = Self::link_at(editor, target) else {
            return;
        };
        if self.hovered.as_ref().is_some_and(|(hovered, _)| *hovered == anchor) {
            return;
        }
        self.hide_tooltip(editor);
        if let Some(text) = self.tooltip.text_for(&href, anchor) {
            let dom = editor.get_document_mut();
            let original = dom.get_attribute(anchor, "title").map(str::to_owned);
            dom.set_attribute(anchor, "title", &text);
            self.hovered = Some((anchor, original));
        }
    }

    fn hide_tooltip(&mut self, editor: &mut EditorCore) {
        let Some((anchor, original)) = self.hovered.take() else {
            return;
        };
        if !editor.get_document().is_connected(anchor) {
            return;
        }
        let dom = editor.get_document_mut();
        match original {
            Some(title) => dom.set_attribute(anchor, "title", &title),
            None => dom.remove_attribute(anchor, "title"),
        }
    }

    fn on_mouse_up(&self, editor: &EditorCore, event: &MouseEventInfo) {
        if event.button != MouseButton::Left {
            return;
        }
        let Some((anchor, href)) = Self::link_at(editor, event.target) else {
            return;
        };
        if self.on_link_click.as_ref().is_some_and(|on_click| on_click(anchor, event)) {
            trace!("Link click handled by the host");
            return;
        }
        let modifier = if editor.get_environment().is_mac {
            event.meta_key
        } else {
            event.ctrl_key
        };
        if !modifier {
            return;
        }
        let target = self.target.as_deref().unwrap_or("_blank");
        match &self.open_window {
            Some(open_window) => open_window(&href, target),
            None => debug!("No window opener to open {href}"),
        }
    }

    fn caret_node(editor: &EditorCore) -> Option<NodeId> {
        match editor.get_dom_selection()? {
            DomSelection::Range { range, .. } => Some(range.start.node),
            _ => None,
        }
    }

    fn on_key_down(&mut self, editor: &EditorCore) {
        let Some(node) = Self::caret_node(editor) else {
            self.tracked = None;
            return;
        };
        if self.tracked.as_ref().is_some_and(|tracked| tracked.node == node) {
            return;
        }
        let auto_href = Self::link_at(editor, node).and_then(|(anchor, href)| {
            let text = editor.get_document().text_content(anchor);
            let matched = match_link(&text)?;
            (matched.normalized_url == href).then_some(href)
        });
        self.tracked = Some(TrackedNode { node, auto_href });
    }

    fn on_key_up(&mut self, editor: &mut EditorCore) {
        let Some(tracked) = &mut self.tracked else {
            return;
        };
        let Some(old_href) = &tracked.auto_href else {
            return;
        };
        if !editor.get_document().is_connected(tracked.node) {
            self.tracked = None;
            return;
        }
        let Some((anchor, href)) = Self::link_at(editor, tracked.node) else {
            return;
        };
        if href != *old_href {
            return;
        }
        let text = editor.get_document().text_content(anchor);
        let Some(matched) = match_link(&text) else {
            return;
        };
        if matched.normalized_url != href {
            debug!("Updating link to follow its text");
            editor
                .get_document_mut()
                .set_attribute(anchor, "href", &matched.normalized_url);
            tracked.auto_href = Some(matched.normalized_url);
        }
    }
}

impl Default for HyperlinkPlugin {
    fn default() -> Self {
        Self::new(HyperlinkTooltip::default())
    }
}

impl EditorPlugin for HyperlinkPlugin {
    fn name(&self) -> &str {
        "Hyperlink"
    }

    fn initialize(&mut self, editor: &mut EditorCore) {
        editor.attach_dom_event("mouseover");
        editor.attach_dom_event("mouseout");
    }

    fn dispose(&mut self) {
        self.hovered = None;
        self.tracked = None;
    }

    fn on_plugin_event(&mut self, event: &PluginEvent, editor: &mut EditorCore) {
        match event {
            PluginEvent::DomEvent { name, target } => match (name.as_str(), target) {
                ("mouseover", Some(target)) => self.show_tooltip(editor, *target),
                ("mouseout", _) => self.hide_tooltip(editor),
                _ => {}
            },
            PluginEvent::MouseUp(mouse) => self.on_mouse_up(editor, mouse),
            PluginEvent::KeyDown(_) => self.on_key_down(editor),
            PluginEvent::KeyUp(_) => self.on_key_up(editor),
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use content_model::dom::Dom;

    use super::*;

    fn anchor() -> NodeId {
        Dom::new().create_element("a")
    }

    #[test]
    fn long_tooltips_are_cut() {
        let tooltip = HyperlinkTooltip::Url;
        let href = format!("https://example.com/{}", "é".repeat(400));
        let text = tooltip.text_for(&href, anchor()).unwrap();

        assert_that!(text.graphemes(true).count()).is_equal_to(MAX_TOOLTIP_GRAPHEMES + 1);
        assert_that!(text.ends_with('…')).is_true();
    }

    #[test]
    fn no_tooltip_means_no_text() {
        assert_that!(HyperlinkTooltip::None.text_for("https://a.b", anchor())).is_none();
        let custom = HyperlinkTooltip::Custom(Box::new(|href, _| Some(format!("Go to {href}"))));
        assert_that!(custom.text_for("https://a.b", anchor()))
            .is_equal_to(Some("Go to https://a.b".to_owned()));
    }
}
