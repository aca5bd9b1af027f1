//! Client-side upload validation
//!
//! Pure inspection of file metadata; never touches the network or reads
//! file contents.

use super::file_source::FileSource;
use crate::error::ValidationError;

/// MIME types accepted for upload
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Upload size limit: 10 MiB
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Check a file against the upload rules
///
/// Type is checked before size, so an oversized GIF reports the type error.
pub fn validate<F: FileSource + ?Sized>(file: &F) -> Result<(), ValidationError> {
    let mime = file.mime_type().trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        tracing::debug!(file = %file.name(), mime = %mime, "Rejected upload: unsupported type");
        return Err(ValidationError::UnsupportedType(mime));
    }

    let size = file.size();
    if size > MAX_UPLOAD_BYTES {
        tracing::debug!(file = %file.name(), size, "Rejected upload: too large");
        return Err(ValidationError::TooLarge(size));
    }

    Ok(())
}
