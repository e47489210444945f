use common::storage::image_extension;

use crate::error::AppError;

/// Result of validating an uploaded file's name.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename contains null bytes.
    NullByte,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    Ok(trimmed)
}

/// Work out the stored extension of an uploaded image.
///
/// The part must declare an `image/*` content type. The extension comes from
/// the filename when it has one, otherwise from the content type.
pub fn upload_extension(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, AppError> {
    let content_type = content_type.unwrap_or_default().trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation("Only image files are allowed".into()));
    }

    let from_name = match file_name {
        Some(name) => {
            let name = validate_flat_filename(name)
                .map_err(|e| AppError::Validation(e.message().into()))?;
            name.rsplit_once('.').map(|(_, ext)| ext.to_string())
        }
        None => None,
    };

    let ext = match from_name {
        Some(ext) => ext,
        None => mime_guess::get_mime_extensions_str(&content_type)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .ok_or_else(|| AppError::Validation("Only image files are allowed".into()))?,
    };

    image_extension(&ext).map_err(AppError::from)
}
