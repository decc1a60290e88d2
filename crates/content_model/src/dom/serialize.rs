// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{Dom, NodeData, NodeId};

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

impl Dom {
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut buf = String::new();
        for child in self.children(id) {
            self.fmt_html(*child, &mut buf);
        }
        buf
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut buf = String::new();
        self.fmt_html(id, &mut buf);
        buf
    }

    fn fmt_html(&self, id: NodeId, buf: &mut String) {
        match self.data(id) {
            NodeData::Text(text) => buf.push_str(&encode_text(text)),
            NodeData::Comment(text) => {
                buf.push_str("<!--");
                buf.push_str(text);
                buf.push_str("-->");
            }
            NodeData::Document | NodeData::Fragment => {
                buf.push_str(&self.inner_html(id))
            }
            NodeData::Element(element) => {
                let tag = element.tag();
                buf.push('<');
                buf.push_str(tag);
                for (name, value) in element.attrs() {
                    buf.push(' ');
                    buf.push_str(name);
                    buf.push_str("=\"");
                    buf.push_str(&encode_double_quoted_attribute(value));
                    buf.push('"');
                }
                buf.push('>');
                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }
                for child in self.children(id) {
                    self.fmt_html(*child, buf);
                }
                buf.push_str("</");
                buf.push_str(tag);
                buf.push('>');
            }
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use crate::dom::Dom;

    #[test]
    fn void_elements_have_no_closing_tag() {
        let mut dom = Dom::new();
        let div = dom.create_element("div");
        let br = dom.create_element("br");
        dom.append_child(div, br);

        assert_that!(dom.outer_html(div)).is_equal_to("<div><br></div>".to_owned());
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let mut dom = Dom::new();
        let a = dom.create_element("a");
        dom.set_attribute(a, "title", "say \"hi\"");
        let text = dom.create_text("1 < 2 & 3");
        dom.append_child(a, text);

        assert_that!(dom.outer_html(a)).is_equal_to(
            "<a title=\"say &quot;hi&quot;\">1 &lt; 2 &amp; 3</a>".to_owned(),
        );
    }
}
