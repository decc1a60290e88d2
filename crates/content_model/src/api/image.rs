// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::cell::RefCell;
use std::rc::Rc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};

use super::merge::{merge_model, segments_document, MergeModelOptions};
use crate::editor::{
    AnnounceData, ChangeSource, Editor, EditorCore, FormatContentModelOptions,
    KnownAnnounceString,
};
use crate::model::{
    blocks_at_path_mut, invalidate_path, selected_segments, Block,
    ContentModelDocument, Image, Segment, SegmentFormat,
};
use crate::{Error, Result};

/// Insert an image with the given source at the selection, replacing
/// what is selected. The image takes the format of the caret.
pub fn insert_image(editor: &mut EditorCore, source: &str) -> bool {
    let source = source.to_owned();
    editor.format_content_model(
        move |model, context| {
            let image = Image::new(&source, SegmentFormat::default());
            let document = segments_document(vec![Segment::Image(image)]);
            let inserted = merge_model(
                model,
                document,
                context,
                MergeModelOptions {
                    insert_position: None,
                    inherit_caret_format: true,
                },
            );
            if inserted.is_none() {
                return false;
            }
            context.announce_data = Some(AnnounceData::known(
                KnownAnnounceString::ImageInserted,
                Vec::new(),
            ));
            true
        },
        FormatContentModelOptions::new("insertImage")
            .with_source(ChangeSource::InsertImage),
    )
}

/// A picked image file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Reads files into data URLs. Readers may call `done` later; the editor
/// may be gone by then.
pub trait FileReader {
    fn read_as_data_url(&self, file: &ImageFile, done: Box<dyn FnOnce(Result<String>)>);
}

/// Encodes the file in place and answers straight away.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataUrlReader;

impl FileReader for DataUrlReader {
    fn read_as_data_url(&self, file: &ImageFile, done: Box<dyn FnOnce(Result<String>)>) {
        if !file.mime_type.starts_with("image/") {
            done(Err(Error::FileRead(format!(
                "{} is not an image ({})",
                file.name, file.mime_type
            ))));
            return;
        }
        done(Ok(format!(
            "data:{};base64,{}",
            file.mime_type,
            STANDARD.encode(&file.bytes)
        )));
    }
}

/// Read `file` with `reader` and insert it as an image once read. The
/// read holds only a weak handle: if the editor is dropped or disposed by
/// the time the data arrives, the image is dropped. Data arriving while
/// the editor is borrowed is inserted once that borrow's call returns.
pub fn insert_image_file(
    editor: &Rc<RefCell<Editor>>,
    file: &ImageFile,
    reader: &dyn FileReader,
) -> Result<()> {
    let tasks = editor.try_borrow().map_err(|_| Error::Busy)?.deferred_tasks();
    let weak = Rc::downgrade(editor);
    let name = file.name.clone();
    reader.read_as_data_url(
        file,
        Box::new(move |result| {
            let Some(editor) = weak.upgrade() else {
                warn!("Dropping image {name}: editor is gone");
                return;
            };
            let url = match result {
                Ok(url) => url,
                Err(e) => {
                    warn!("Dropping image {name}: {e}");
                    return;
                }
            };
            let insert = move |core: &mut EditorCore| {
                insert_image(core, &url);
            };
            match editor.try_borrow_mut() {
                Ok(editor) if editor.is_disposed() => {
                    warn!("Dropping image {name}: {}", Error::Disposed);
                }
                Ok(mut editor) => editor.with_core(insert),
                Err(_) => {
                    debug!("Editor is busy, deferring image {name}");
                    tasks.push(Box::new(insert));
                }
            };
        }),
    );
    Ok(())
}

/// Call `f` for each selected image, invalidating the paragraphs of those
/// it changed.
fn update_selected_images(
    model: &mut ContentModelDocument,
    mut f: impl FnMut(&mut Image) -> bool,
) -> bool {
    let mut changed = false;
    for position in selected_segments(&model.blocks) {
        let Some(Block::Paragraph(paragraph)) = blocks_at_path_mut(&mut model.blocks, &position.path)
            .and_then(|group| group.get_mut(position.block_index))
        else {
            continue;
        };
        let Some(Segment::Image(image)) = paragraph.segments.get_mut(position.segment_index)
        else {
            continue;
        };
        if f(image) {
            paragraph.invalidate();
            invalidate_path(&mut model.blocks, &position.path);
            changed = true;
        }
    }
    changed
}

/// Parts of a border shorthand. Missing parts keep the current value, or
/// fall back to `1px solid black`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Border {
    pub width: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
}

impl Border {
    fn parse(shorthand: &str) -> Self {
        let mut parts = shorthand.split_whitespace().map(str::to_owned);
        Self {
            width: parts.next(),
            style: parts.next(),
            color: parts.next(),
        }
    }

    fn merged_into(&self, current: Option<&str>) -> String {
        let current = current.map(Self::parse).unwrap_or_default();
        let width = self.width.clone().or(current.width).unwrap_or_else(|| "1px".to_owned());
        let style = self.style.clone().or(current.style).unwrap_or_else(|| "solid".to_owned());
        let color = self.color.clone().or(current.color).unwrap_or_else(|| "black".to_owned());
        format!("{width} {style} {color}")
    }
}

/// Set the border of the selected images on all sides, or remove it with
/// `None`. A radius of `None` leaves the current one.
pub fn set_image_border(editor: &mut EditorCore, border: Option<Border>, radius: Option<&str>) -> bool {
    editor.format_content_model(
        |model, _| {
            update_selected_images(model, |image| {
                let before = image.image_format.borders.clone();
                let borders = &mut image.image_format.borders;
                match &border {
                    Some(border) => {
                        let value = border.merged_into(borders.top.as_deref());
                        borders.top = Some(value.clone());
                        borders.right = Some(value.clone());
                        borders.bottom = Some(value.clone());
                        borders.left = Some(value);
                    }
                    None => {
                        borders.top = None;
                        borders.right = None;
                        borders.bottom = None;
                        borders.left = None;
                    }
                }
                if let Some(radius) = radius {
                    borders.radius = Some(radius.to_owned()).filter(|r| !r.is_empty());
                }
                image.image_format.borders != before
            })
        },
        FormatContentModelOptions::new("setImageBorder"),
    )
}

/// Set or remove the shadow of the selected images. A shadow needs room
/// around the image, given by `margin`.
pub fn set_image_box_shadow(editor: &mut EditorCore, shadow: Option<&str>, margin: Option<&str>) -> bool {
    editor.format_content_model(
        |model, _| {
            update_selected_images(model, |image| {
                let before = image.image_format.clone();
                let format = &mut image.image_format;
                format.box_shadow = shadow.filter(|s| !s.is_empty()).map(str::to_owned);
                if let Some(margin) = margin {
                    let value = Some(margin.to_owned()).filter(|m| !m.is_empty());
                    format.margin.top = value.clone();
                    format.margin.right = value.clone();
                    format.margin.bottom = value.clone();
                    format.margin.left = value;
                }
                image.image_format != before
            })
        },
        FormatContentModelOptions::new("setImageBoxShadow"),
    )
}

/// Set the alternative text of the selected images. An empty text removes
/// it.
pub fn set_image_alt_text(editor: &mut EditorCore, alt_text: &str) -> bool {
    editor.format_content_model(
        |model, _| {
            update_selected_images(model, |image| {
                let alt = Some(alt_text.to_owned()).filter(|a| !a.is_empty());
                if image.alt == alt {
                    return false;
                }
                image.alt = alt;
                true
            })
        },
        FormatContentModelOptions::new("setImageAltText"),
    )
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use speculoos::prelude::*;

    use super::*;
    use crate::dom::{DomPosition, DomSelection};
    use crate::editor::EditorOptions;

    fn editor_with_image() -> EditorCore {
        let mut editor = EditorCore::new(
            EditorOptions::new().with_initial_html("<div>a<img src=\"cat.png\">b</div>"),
        );
        let image = editor.get_dom_helper().query_elements("img")[0];
        editor.set_dom_selection(Some(DomSelection::Image { image }));
        editor
    }

    fn first_image(editor: &mut EditorCore) -> Image {
        let model = editor.create_content_model();
        model.blocks[0]
            .as_paragraph()
            .and_then(|p| {
                p.segments.iter().find_map(|s| match s {
                    Segment::Image(image) => Some(image.clone()),
                    _ => None,
                })
            })
            .unwrap()
    }

    #[test]
    fn image_is_inserted_at_the_caret() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>ab</div>"));
        let root = editor.root();
        let text = editor
            .get_document()
            .descendants(root)
            .into_iter()
            .find(|&n| editor.get_document().is_text(n))
            .unwrap();
        editor.set_dom_selection(Some(DomSelection::caret(DomPosition::new(text, 1))));

        assert_that!(insert_image(&mut editor, "dog.png")).is_true();
        assert_that!(editor.get_content()).is_equal_to("<div>a<img src=\"dog.png\">b</div>".to_owned());
        assert_that!(editor.announcements().to_vec()).is_equal_to(vec!["Image inserted".to_owned()]);
    }

    #[test]
    fn nothing_is_inserted_without_a_selection() {
        let mut editor = EditorCore::new(EditorOptions::new().with_initial_html("<div>ab</div>"));
        assert_that!(insert_image(&mut editor, "dog.png")).is_false();
    }

    #[test]
    fn border_parts_complete_each_other() {
        let mut editor = editor_with_image();
        let red = Border {
            color: Some("red".into()),
            ..Default::default()
        };
        assert_that!(set_image_border(&mut editor, Some(red), Some("5px"))).is_true();
        let wide = Border {
            width: Some("3px".into()),
            ..Default::default()
        };
        set_image_border(&mut editor, Some(wide), None);

        let borders = first_image(&mut editor).image_format.borders;
        assert_that!(borders.left.as_deref()).is_equal_to(Some("3px solid red"));
        assert_that!(borders.radius.as_deref()).is_equal_to(Some("5px"));

        set_image_border(&mut editor, None, None);
        assert_that!(first_image(&mut editor).image_format.borders.top).is_none();
    }

    #[test]
    fn shadow_comes_with_a_margin() {
        let mut editor = editor_with_image();
        set_image_box_shadow(&mut editor, Some("0px 0px 3px 3px #aaa"), Some("4px"));

        let format = first_image(&mut editor).image_format;
        assert_that!(format.box_shadow.as_deref()).is_equal_to(Some("0px 0px 3px 3px #aaa"));
        assert_that!(format.margin.bottom.as_deref()).is_equal_to(Some("4px"));
    }

    #[test]
    fn setting_the_same_alt_text_twice_changes_nothing() {
        let mut editor = editor_with_image();
        assert_that!(set_image_alt_text(&mut editor, "a cat")).is_true();
        assert_that!(set_image_alt_text(&mut editor, "a cat")).is_false();
        assert_that!(first_image(&mut editor).alt.as_deref()).is_equal_to(Some("a cat"));
    }

    #[test]
    fn data_url_reader_encodes_images_only() {
        let file = ImageFile {
            name: "dot.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        DataUrlReader.read_as_data_url(&file, Box::new(move |r| *sink.borrow_mut() = r.ok()));
        assert_that!(seen.borrow().clone()).is_equal_to(Some("data:image/png;base64,AQID".to_owned()));

        let text = ImageFile {
            mime_type: "text/plain".into(),
            ..file
        };
        let failed = Rc::new(Cell::new(false));
        let flag = failed.clone();
        DataUrlReader.read_as_data_url(&text, Box::new(move |r| flag.set(r.is_err())));
        assert_that!(failed.get()).is_true();
    }

    /// Holds on to the callback until the test lets it run.
    #[derive(Default)]
    struct DeferredReader {
        pending: RefCell<Option<Box<dyn FnOnce(Result<String>)>>>,
    }

    impl FileReader for DeferredReader {
        fn read_as_data_url(&self, _: &ImageFile, done: Box<dyn FnOnce(Result<String>)>) {
            *self.pending.borrow_mut() = Some(done);
        }
    }

    #[test]
    fn late_reads_are_dropped_after_dispose() {
        let editor = Editor::shared(EditorOptions::new().with_initial_html("<div>a</div>"), Vec::new());
        let reader = DeferredReader::default();
        let file = ImageFile {
            name: "late.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![0],
        };
        insert_image_file(&editor, &file, &reader).unwrap();
        editor.borrow_mut().dispose();

        let done = reader.pending.borrow_mut().take().unwrap();
        done(Ok("data:image/png;base64,AA==".into()));
        assert_that!(editor.borrow().core().get_content()).is_equal_to("<div>a</div>".to_owned());
    }

    #[test]
    fn reads_finishing_while_the_editor_is_busy_are_inserted_afterwards() {
        let editor = Editor::shared(EditorOptions::new().with_initial_html("<div>a</div>"), Vec::new());
        let reader = DeferredReader::default();
        let file = ImageFile {
            name: "busy.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![0],
        };
        insert_image_file(&editor, &file, &reader).unwrap();
        let done = reader.pending.borrow_mut().take().unwrap();

        let mut borrowed = editor.borrow_mut();
        borrowed.with_core(|core| {
            let text = core
                .get_document()
                .descendants(core.root())
                .into_iter()
                .find(|&n| core.get_document().is_text(n))
                .unwrap();
            core.set_dom_selection(Some(DomSelection::caret(DomPosition::new(text, 1))));
            done(Ok("data:image/png;base64,AA==".into()));
        });
        assert_that!(borrowed.core().get_content())
            .is_equal_to(r#"<div>a<img src="data:image/png;base64,AA=="></div>"#.to_owned());
    }

    #[test]
    fn busy_editor_refuses_new_reads() {
        let editor = Editor::shared(EditorOptions::new(), Vec::new());
        let _borrowed = editor.borrow_mut();
        let file = ImageFile {
            name: "busy.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![0],
        };
        assert_that!(matches!(
            insert_image_file(&editor, &file, &DataUrlReader),
            Err(Error::Busy)
        ))
        .is_true();
    }

    #[test]
    fn late_reads_are_dropped_after_the_editor_is_gone() {
        let editor = Editor::shared(EditorOptions::new(), Vec::new());
        let reader = DeferredReader::default();
        let file = ImageFile {
            name: "late.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![0],
        };
        insert_image_file(&editor, &file, &reader).unwrap();
        drop(editor);

        let done = reader.pending.borrow_mut().take().unwrap();
        done(Ok("data:image/png;base64,AA==".into()));
    }
}
