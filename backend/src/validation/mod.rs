//! Form input validation.
//!
//! Turns a raw [`FormInput`] into a [`SubmissionRequest`] or a
//! [`ValidationError`]. Only presence and the bounds of the form controls are
//! checked:
//!
//! - at least one audio file and a non-blank email are required
//! - mix wideness is an integer in `0..=100` (defaults to 50 when absent)
//! - selections must come from the fixed catalogs
//!
//! Email format and file content are not checked. File media types are
//! normalized so the outbound multipart body can always be built.
//!
//! # Example
//!
//! ```rust,ignore
//! use atmos::{validate_input, FormInput};
//!
//! let input = FormInput { email: "me@example.com".into(), ..Default::default() };
//! assert!(validate_input(input).is_err()); // no files
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{ValidationError, ValidationResult};
use crate::models::{
    AudioFile, CatalogOption, ContentType, FormInput, OutputFormat, SubmissionRequest,
    DEFAULT_MIX_WIDENESS, MAX_MIX_WIDENESS,
};

/// Media type used when nothing better is known.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Validate raw form input.
pub fn validate_input(input: FormInput) -> ValidationResult<SubmissionRequest> {
    let files: Vec<AudioFile> = input
        .files
        .into_iter()
        .filter(|f| !is_empty_placeholder(f))
        .map(normalize_media_type)
        .collect();
    let email = input.email.trim().to_string();

    let mut missing = Vec::new();
    if files.is_empty() {
        missing.push("audio files");
    }
    if email.is_empty() {
        missing.push("email");
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mix_wideness = parse_mix_wideness(input.mix_wideness.as_deref())?;
    let output_formats = parse_selection::<OutputFormat>(&input.output_formats)?;
    let content_types = parse_selection::<ContentType>(&input.content_types)?;

    Ok(SubmissionRequest {
        files,
        email,
        mix_wideness,
        output_formats,
        content_types,
    })
}

/// Parse the mix wideness control. Absent or blank means the default.
pub fn parse_mix_wideness(raw: Option<&str>) -> ValidationResult<u8> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_MIX_WIDENESS),
        Some(v) => v,
    };

    raw.parse::<u8>()
        .ok()
        .filter(|v| *v <= MAX_MIX_WIDENESS)
        .ok_or_else(|| ValidationError::InvalidMixWideness(raw.to_string()))
}

/// Parse selected labels into a set ordered by catalog position.
///
/// Blank values are ignored, duplicates collapse.
pub fn parse_selection<T: CatalogOption>(labels: &[String]) -> ValidationResult<BTreeSet<T>> {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| {
            T::from_label(l).ok_or_else(|| ValidationError::UnknownOption {
                field: T::FIELD,
                value: l.to_string(),
            })
        })
        .collect()
}

/// Guess a media type from the file extension.
pub fn guess_media_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        _ => FALLBACK_MEDIA_TYPE,
    }
}

/// Browsers send a nameless, empty part when the file picker is left empty.
fn is_empty_placeholder(file: &AudioFile) -> bool {
    file.file_name.trim().is_empty() && file.content.is_empty()
}

fn normalize_media_type(mut file: AudioFile) -> AudioFile {
    let declared = file.media_type.trim();
    if declared.is_empty() || !is_parsable_media_type(declared) {
        file.media_type = guess_media_type(&file.file_name).to_string();
    } else if declared.len() != file.media_type.len() {
        file.media_type = declared.to_string();
    }
    file
}

// Same parser reqwest applies when the part is attached.
fn is_parsable_media_type(media_type: &str) -> bool {
    reqwest::multipart::Part::text("")
        .mime_str(media_type)
        .is_ok()
}
