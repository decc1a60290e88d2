// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

/// Errors of the few operations that can fail. Model mutations never
/// return them: those report "nothing changed" instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("The editor has been disposed")]
    Disposed,
    #[error("The editor is in use")]
    Busy,
    #[error("Invalid editing metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("Failed to read file: {0}")]
    FileRead(String),
}

pub type Result<T> = std::result::Result<T, Error>;
