/// Form validation for post and comment submissions
///
/// Validation is synchronous and local: callers run it before touching the
/// database, so a rejected submission never leaves a partial write behind.
/// The error messages are the localized field messages the form layer shows
/// verbatim.
use validator::Validate;

use crate::error::{AppError, Result};

/// Shown when a post or comment is submitted with no text
pub const EMPTY_TEXT_MESSAGE: &str = "Вы что-то хотели сказать?";

/// Shown when an uploaded image payload cannot be decoded as a raster image
pub const BROKEN_IMAGE_MESSAGE: &str =
    "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";

#[derive(Debug, Validate)]
struct TextSubmission {
    #[validate(length(min = 1, message = "Вы что-то хотели сказать?"))]
    text: String,
}

/// Validate submitted text for a post or comment.
///
/// Absent and whitespace-only submissions are both rejected.
pub fn validate_text(text: Option<&str>) -> Result<String> {
    let submission = TextSubmission {
        text: text.unwrap_or_default().trim().to_string(),
    };

    submission.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| EMPTY_TEXT_MESSAGE.to_string());
        AppError::ValidationError(message)
    })?;

    Ok(submission.text)
}

/// Validate an uploaded image payload.
///
/// The whole payload must decode as a supported raster format (GIF, JPEG,
/// PNG, ...); a truncated or non-image file is rejected.
pub fn validate_image(data: &[u8]) -> Result<()> {
    image::load_from_memory(data)
        .map(|_| ())
        .map_err(|err| {
            tracing::debug!("image upload rejected: {}", err);
            AppError::ValidationError(BROKEN_IMAGE_MESSAGE.to_string())
        })
}
