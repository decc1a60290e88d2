// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display};

/// Messages the editor knows how to phrase. `{0}`, `{1}`... are replaced
/// by the format strings of the [AnnounceData].
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum KnownAnnounceString {
    SelectingTableCells,
    UnselectingTableCells,
    TableInserted,
    ImageInserted,
}

impl KnownAnnounceString {
    fn template(self) -> &'static str {
        match self {
            Self::SelectingTableCells => "{0}, selected",
            Self::UnselectingTableCells => "{0}, unselected",
            Self::TableInserted => "Table with {0} rows and {1} columns inserted",
            Self::ImageInserted => "Image inserted",
        }
    }
}

/// Something to be read out by assistive technology.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnounceData {
    pub default_string: Option<KnownAnnounceString>,
    /// Used as is when there is no default string.
    pub text: Option<String>,
    pub format_strings: Vec<String>,
}

impl AnnounceData {
    pub fn known(default_string: KnownAnnounceString, format_strings: Vec<String>) -> Self {
        Self {
            default_string: Some(default_string),
            text: None,
            format_strings,
        }
    }

    pub fn message(&self) -> String {
        let template = match (self.default_string, &self.text) {
            (Some(known), _) => known.template().to_owned(),
            (None, Some(text)) => text.clone(),
            (None, None) => String::new(),
        };
        self.format_strings
            .iter()
            .enumerate()
            .fold(template, |message, (i, value)| {
                message.replace(&format!("{{{i}}}"), value)
            })
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn format_strings_fill_the_template() {
        let data = AnnounceData::known(
            KnownAnnounceString::TableInserted,
            vec!["2".into(), "3".into()],
        );
        assert_that!(data.message())
            .is_equal_to("Table with 2 rows and 3 columns inserted".to_owned());
    }

    #[test]
    fn plain_text_is_used_without_a_known_string() {
        let data = AnnounceData {
            text: Some("Hello {0}".into()),
            format_strings: vec!["world".into()],
            ..Default::default()
        };
        assert_that!(data.message()).is_equal_to("Hello world".to_owned());
    }
}
