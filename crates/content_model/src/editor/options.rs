// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom_to_model::{ElementProcessor, ProcessorCategory, ProcessorMap};
use crate::format_handlers::DarkColorFn;
use crate::model::{Direction, SegmentFormat};

/// Platform facts the host knows and plugins may ask about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    pub is_mac: bool,
    pub is_android: bool,
    pub is_safari: bool,
    pub is_mobile_or_tablet: bool,
}

#[derive(Clone, Debug)]
pub struct EditorOptions {
    pub initial_html: String,
    pub default_format: SegmentFormat,
    pub in_dark_mode: bool,
    pub get_dark_color: Option<DarkColorFn>,
    pub zoom_scale: f64,
    pub direction: Direction,
    pub environment: Environment,
    pub allow_cache_element: bool,
    pub process_virtual_indentation: bool,
    pub add_delimiter_for_entity: bool,
    pub entity_placeholders: bool,
    pub processors: ProcessorMap,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            initial_html: String::new(),
            default_format: SegmentFormat::default(),
            in_dark_mode: false,
            get_dark_color: None,
            zoom_scale: 1.0,
            direction: Direction::Ltr,
            environment: Environment::default(),
            allow_cache_element: true,
            process_virtual_indentation: true,
            add_delimiter_for_entity: false,
            entity_placeholders: false,
            processors: ProcessorMap::default(),
        }
    }
}

impl EditorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_html(mut self, html: &str) -> Self {
        self.initial_html = html.to_owned();
        self
    }

    pub fn with_default_format(mut self, format: SegmentFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn with_dark_mode(mut self, get_dark_color: DarkColorFn) -> Self {
        self.in_dark_mode = true;
        self.get_dark_color = Some(get_dark_color);
        self
    }

    pub fn with_zoom_scale(mut self, zoom_scale: f64) -> Self {
        self.zoom_scale = zoom_scale;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_cache_element(mut self, allow: bool) -> Self {
        self.allow_cache_element = allow;
        self
    }

    pub fn with_virtual_indentation(mut self, process: bool) -> Self {
        self.process_virtual_indentation = process;
        self
    }

    pub fn with_entity_delimiters(mut self, add: bool) -> Self {
        self.add_delimiter_for_entity = add;
        self
    }

    pub fn with_entity_placeholders(mut self, use_placeholders: bool) -> Self {
        self.entity_placeholders = use_placeholders;
        self
    }

    pub fn with_processor(
        mut self,
        category: ProcessorCategory,
        processor: ElementProcessor,
    ) -> Self {
        self.processors.set(category, processor);
        self
    }

    pub fn with_tag_processor(
        mut self,
        tag: &str,
        processor: ElementProcessor,
    ) -> Self {
        self.processors.set_for_tag(tag, processor);
        self
    }
}
