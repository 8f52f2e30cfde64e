//! Multipart body for the conversion webhook.
//!
//! This is a wire contract with an external receiver; keep it stable.
//!
//! | field            | encoding                                                   |
//! |------------------|------------------------------------------------------------|
//! | `audioFiles`     | one file part per file, upload order, filename + media type |
//! | `email`          | text                                                       |
//! | `mix_wideness`   | decimal integer `0`..`100`                                 |
//! | `output_formats` | labels joined with `,` in catalog order, `""` when none    |
//! | `content_types`  | same as `output_formats`                                   |
//!
//! Catalog labels never contain `,`. Receivers split on `,` and drop empty
//! segments, see [`decode_selection`].

use reqwest::multipart::{Form, Part};
use std::collections::BTreeSet;
use std::path::Path;

use crate::models::{AudioFile, CatalogOption, SubmissionRequest};
use crate::validation::guess_media_type;

/// Field name shared by every file part.
pub const FILES_FIELD: &str = "audioFiles";
pub const EMAIL_FIELD: &str = "email";
pub const MIX_WIDENESS_FIELD: &str = "mix_wideness";
pub const OUTPUT_FORMATS_FIELD: &str = "output_formats";
pub const CONTENT_TYPES_FIELD: &str = "content_types";

/// Separator for multi-valued fields.
pub const SELECTION_DELIMITER: char = ',';

/// Encode a selection set as a single delimited string.
pub fn encode_selection<T: CatalogOption>(selection: &BTreeSet<T>) -> String {
    selection
        .iter()
        .map(|o| o.label())
        .collect::<Vec<_>>()
        .join(&SELECTION_DELIMITER.to_string())
}

/// Split a delimited selection back into labels, the way a receiver would.
pub fn decode_selection(encoded: &str) -> Vec<String> {
    encoded
        .split(SELECTION_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scalar fields of the body, in the order they are written.
pub fn text_fields(request: &SubmissionRequest) -> Vec<(&'static str, String)> {
    vec![
        (EMAIL_FIELD, request.email.clone()),
        (MIX_WIDENESS_FIELD, request.mix_wideness.to_string()),
        (OUTPUT_FORMATS_FIELD, encode_selection(&request.output_formats)),
        (CONTENT_TYPES_FIELD, encode_selection(&request.content_types)),
    ]
}

/// Build the multipart body.
///
/// File content is shared, not copied. Only fails on a media type reqwest
/// cannot parse, which validation already rules out.
pub fn build_form(request: &SubmissionRequest) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();

    for (name, value) in text_fields(request) {
        form = form.text(name, value);
    }

    for file in &request.files {
        let part = Part::stream_with_length(file.content.clone(), file.content.len() as u64)
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)?;
        form = form.part(FILES_FIELD, part);
    }

    Ok(form)
}

/// Read an audio file from disk, guessing its media type from the extension.
pub async fn load_audio_file(path: &Path) -> std::io::Result<AudioFile> {
    let content = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();

    Ok(AudioFile {
        media_type: guess_media_type(&file_name).to_string(),
        file_name,
        content: content.into(),
    })
}
