//! Reading the intake form from a multipart request.

use axum::extract::multipart::{Multipart, MultipartError};

use crate::models::{AudioFile, FormInput};
use crate::submission::{
    CONTENT_TYPES_FIELD, EMAIL_FIELD, FILES_FIELD, MIX_WIDENESS_FIELD, OUTPUT_FORMATS_FIELD,
};

/// Collect every known field. Unknown fields are drained and ignored.
///
/// The browser form uses the same field names as the webhook body, with the
/// multi-selects sent as repeated keys.
pub async fn read_form(mut multipart: Multipart) -> Result<FormInput, MultipartError> {
    let mut input = FormInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            FILES_FIELD => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let media_type = field.content_type().unwrap_or("").to_string();
                let content = field.bytes().await?;
                input.files.push(AudioFile {
                    file_name,
                    content,
                    media_type,
                });
            }
            EMAIL_FIELD => input.email = field.text().await?,
            MIX_WIDENESS_FIELD => input.mix_wideness = Some(field.text().await?),
            OUTPUT_FORMATS_FIELD => input.output_formats.push(field.text().await?),
            CONTENT_TYPES_FIELD => input.content_types.push(field.text().await?),
            _ => {
                field.bytes().await?;
            }
        }
    }

    Ok(input)
}
