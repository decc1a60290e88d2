// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use once_cell::sync::Lazy;
use regex::Regex;

static COLLAPSIBLE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("space regex is valid"));

/// Collapse runs of ASCII whitespace to a single space, the way HTML
/// renders text outside `pre`. Non-breaking and other Unicode spaces are
/// significant and kept.
pub fn collapse_whitespace(text: &str) -> String {
    COLLAPSIBLE_SPACE.replace_all(text, " ").into_owned()
}

/// Whether `text` is made only of collapsible ASCII whitespace.
pub fn is_collapsible_space_only(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C'))
}

/// Characters that count towards virtual indentation: regular space,
/// non-breaking space and en space.
pub fn is_indent_space(c: char) -> bool {
    matches!(c, '\u{20}' | '\u{a0}' | '\u{2002}')
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn collapsing_keeps_nbsp() {
        assert_that!(collapse_whitespace("a \n\t b\u{a0}\u{a0}c"))
            .is_equal_to("a b\u{a0}\u{a0}c".to_owned());
    }

    #[test]
    fn space_only_detection() {
        assert_that!(is_collapsible_space_only(" \n ")).is_true();
        assert_that!(is_collapsible_space_only("\u{a0}")).is_false();
    }
}
