// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::color::invert_lightness;

static VAR_WITH_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*var\(\s*(--[\w-]+)\s*,\s*(.+?)\s*\)\s*$")
        .expect("var regex is valid")
});

/// Derives the dark mode version of a light color.
pub type DarkColorFn = fn(&str) -> String;

fn default_dark_color(light: &str) -> String {
    invert_lightness(light).unwrap_or_else(|| light.to_owned())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorPair {
    pub light: String,
    pub dark: String,
}

/// Remembers every color rendered in dark mode. Each one is written as
/// `var(--darkColor_<key>, <light>)`, and the editor defines the variables
/// on its root.
#[derive(Clone, Debug)]
pub struct DarkColorHandler {
    known_colors: BTreeMap<String, ColorPair>,
    get_dark_color: DarkColorFn,
}

impl Default for DarkColorHandler {
    fn default() -> Self {
        Self::new(default_dark_color)
    }
}

impl DarkColorHandler {
    pub fn new(get_dark_color: DarkColorFn) -> Self {
        Self {
            known_colors: BTreeMap::new(),
            get_dark_color,
        }
    }

    /// Format `light` for output, registering a variable in dark mode.
    pub fn render_color(&mut self, light: &str, is_dark_mode: bool) -> String {
        if !is_dark_mode || light == "transparent" || light == "inherit" {
            return light.to_owned();
        }
        let key = color_key(light);
        let dark = (self.get_dark_color)(light);
        self.known_colors.insert(
            key.clone(),
            ColorPair {
                light: light.to_owned(),
                dark,
            },
        );
        format!("var({key}, {light})")
    }

    pub fn known_colors(&self) -> &BTreeMap<String, ColorPair> {
        &self.known_colors
    }

    pub fn reset(&mut self) {
        self.known_colors.clear();
    }
}

/// The light mode color of a value written by [DarkColorHandler], or the
/// value itself.
pub fn retrieve_light_color(value: &str) -> String {
    VAR_WITH_FALLBACK
        .captures(value)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| value.trim().to_owned())
}

fn color_key(light: &str) -> String {
    let sanitized: String = light
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("--darkColor_{sanitized}")
}
