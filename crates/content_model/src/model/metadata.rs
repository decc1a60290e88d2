// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Editing metadata persisted as JSON in the `data-editing-info`
//! attribute of tables and cells.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::format::Dataset;
use crate::error::{Error, Result};

pub const EDITING_INFO_KEY: &str = "editingInfo";

/// Named border presets for tables. Persisted by number.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum TableBorderFormat {
    #[default]
    Default,
    ListWithSideBorders,
    NoHeaderBorders,
    NoSideBorders,
    FirstColumnHeaderExternal,
    EspecialType1,
    EspecialType2,
    EspecialType3,
    Clear,
}

impl From<TableBorderFormat> for u8 {
    fn from(format: TableBorderFormat) -> u8 {
        format as u8
    }
}

impl TryFrom<u8> for TableBorderFormat {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        use TableBorderFormat::*;
        Ok(match value {
            0 => Default,
            1 => ListWithSideBorders,
            2 => NoHeaderBorders,
            3 => NoSideBorders,
            4 => FirstColumnHeaderExternal,
            5 => EspecialType1,
            6 => EspecialType2,
            7 => EspecialType3,
            8 => Clear,
            other => return Err(format!("Unknown table border format {other}")),
        })
    }
}

/// How a table was last formatted. `None` colors mean "transparent".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_border_color: Option<String>,
    #[serde(default)]
    pub has_header_row: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row_color: Option<String>,
    #[serde(default)]
    pub has_first_column: bool,
    #[serde(default)]
    pub has_banded_columns: bool,
    #[serde(default)]
    pub has_banded_rows: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color_even: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color_odd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_border_format: Option<TableBorderFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
}

/// Per-cell flags recording what the user changed by hand, so that table
/// formatting does not undo it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color_override: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_align_override: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_override: Option<bool>,
}

impl CellMetadata {
    pub fn bg_color_override(&self) -> bool {
        self.bg_color_override.unwrap_or(false)
    }

    pub fn v_align_override(&self) -> bool {
        self.v_align_override.unwrap_or(false)
    }

    pub fn border_override(&self) -> bool {
        self.border_override.unwrap_or(false)
    }

    pub fn has_override(&self) -> bool {
        self.bg_color_override() || self.v_align_override() || self.border_override()
    }
}

/// Read the metadata stored in `dataset`. Missing metadata is `Ok(None)`.
pub fn get_metadata<T: DeserializeOwned>(dataset: &Dataset) -> Result<Option<T>> {
    dataset
        .get(EDITING_INFO_KEY)
        .map(|json| serde_json::from_str(json).map_err(Error::from))
        .transpose()
}

/// Like [get_metadata] but treating malformed JSON as absent. Used where
/// a broken attribute must not stop the operation.
pub fn get_metadata_lenient<T: DeserializeOwned>(dataset: &Dataset) -> Option<T> {
    get_metadata(dataset).unwrap_or_else(|e| {
        log::debug!("Ignoring malformed editing info: {e}");
        None
    })
}

/// Replace the metadata in `dataset` with what `callback` returns for the
/// current value. Returning `None` removes the metadata.
pub fn update_metadata<T, F>(dataset: &mut Dataset, callback: F) -> Result<Option<T>>
where
    T: DeserializeOwned + Serialize,
    F: FnOnce(Option<T>) -> Option<T>,
{
    let current = get_metadata_lenient(dataset);
    let updated = callback(current);
    match &updated {
        Some(metadata) => {
            dataset.insert(
                EDITING_INFO_KEY.to_owned(),
                serde_json::to_string(metadata)?,
            );
        }
        None => {
            dataset.remove(EDITING_INFO_KEY);
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn cell_metadata_serializes_only_set_flags() {
        let mut dataset = Dataset::new();
        update_metadata(&mut dataset, |_: Option<CellMetadata>| {
            Some(CellMetadata {
                bg_color_override: Some(true),
                ..Default::default()
            })
        })
        .unwrap();

        assert_that!(dataset.get(EDITING_INFO_KEY).cloned())
            .is_equal_to(Some(r#"{"bgColorOverride":true}"#.to_owned()));
    }

    #[test]
    fn border_format_is_stored_as_a_number() {
        let metadata = TableMetadata {
            table_border_format: Some(TableBorderFormat::NoSideBorders),
            ..Default::default()
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert_that!(json.contains(r#""tableBorderFormat":3"#)).is_true();

        let parsed: TableMetadata = serde_json::from_str(&json).unwrap();
        assert_that!(parsed).is_equal_to(metadata);
    }

    #[test]
    fn malformed_metadata_is_an_error_but_can_be_ignored() {
        let mut dataset = Dataset::new();
        dataset.insert(EDITING_INFO_KEY.to_owned(), "{not json".to_owned());

        assert_that!(get_metadata::<CellMetadata>(&dataset)).is_err();
        assert_that!(get_metadata_lenient::<CellMetadata>(&dataset)).is_none();
    }

    #[test]
    fn returning_none_removes_metadata() {
        let mut dataset = Dataset::new();
        dataset.insert(EDITING_INFO_KEY.to_owned(), "{}".to_owned());
        update_metadata(&mut dataset, |_: Option<CellMetadata>| None).unwrap();
        assert_that!(dataset.contains_key(EDITING_INFO_KEY)).is_false();
    }
}
