//! Observation image upload validation and storage.
//!
//! Uploaded images arrive as a base64 payload plus the original
//! filename. The extension is checked against a small allowed set, the
//! name is sanitized down to a safe character set with path components
//! stripped, and the decoded bytes land under
//! `<out_dir>/images/observations/`.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose;

use crate::ValidationError;

/// Image extensions accepted for observation uploads.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Whether a filename carries an allowed image extension.
#[must_use]
pub fn allowed_file(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && ALLOWED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    })
}

/// Sanitizes an uploaded filename for filesystem use.
///
/// Strips any path components, replaces spaces with underscores, and
/// drops every character outside `[A-Za-z0-9._-]`. Returns `None` when
/// nothing usable remains.
#[must_use]
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .replace(' ', "_");

    let safe: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let safe = safe.trim_matches('.').to_string();
    if safe.is_empty() { None } else { Some(safe) }
}

/// Validates, decodes, and writes one uploaded image.
///
/// Returns the public URL of the stored file.
///
/// # Errors
///
/// Returns [`ValidationError`] if the filename has a disallowed
/// extension, sanitizes to nothing or to a name without its extension,
/// the base64 payload is invalid, or the file cannot be written.
pub fn save_observation_image(
    out_dir: &Path,
    filename: &str,
    image_base64: &str,
) -> Result<String, ValidationError> {
    if !allowed_file(filename) {
        return Err(ValidationError::new(format!(
            "image extension not allowed (expected one of {ALLOWED_IMAGE_EXTENSIONS:?})"
        )));
    }

    let safe_name = sanitize_filename(filename)
        .ok_or_else(|| ValidationError::new("image filename is empty after sanitization"))?;
    // A fully non-ASCII stem sanitizes down to the bare extension,
    // which no longer parses as `<stem>.<ext>`.
    if !allowed_file(&safe_name) {
        return Err(ValidationError::new(
            "image filename lost its extension during sanitization",
        ));
    }

    let bytes = general_purpose::STANDARD
        .decode(image_base64.trim())
        .map_err(|e| ValidationError::new(format!("invalid base64 image payload: {e}")))?;

    let dir = out_dir.join("images").join("observations");
    std::fs::create_dir_all(&dir)
        .map_err(|e| ValidationError::new(format!("could not create image directory: {e}")))?;

    let path = dir.join(&safe_name);
    std::fs::write(&path, bytes)
        .map_err(|e| ValidationError::new(format!("could not write image: {e}")))?;

    log::info!("Saved observation image: {}", path.display());

    Ok(format!("/static/images/observations/{safe_name}"))
}
