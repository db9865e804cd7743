//! Limits on images accepted for upload.

use std::path::Path;

use mime_guess::{Mime, mime};

use super::error::DomainError;

/// Largest image the client will send, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Check size and type of a local image; returns its MIME type.
///
/// The type is guessed from the file extension.
pub fn validate_image(path: &Path, size: u64) -> Result<Mime, DomainError> {
    if size > MAX_IMAGE_BYTES {
        return Err(DomainError::validation("Image size should be less than 5MB"));
    }

    mime_guess::from_path(path)
        .first()
        .filter(|guessed| guessed.type_() == mime::IMAGE)
        .ok_or_else(|| DomainError::validation("Please upload an image file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_small_png() {
        let mime = validate_image(Path::new("cover.png"), 1024).expect("png accepted");
        assert_eq!(mime.essence_str(), "image/png");
    }

    #[test]
    fn accepts_exactly_the_limit() {
        assert!(validate_image(Path::new("a.jpg"), MAX_IMAGE_BYTES).is_ok());
    }

    #[test]
    fn rejects_oversized_image() {
        let err = validate_image(Path::new("a.jpg"), MAX_IMAGE_BYTES + 1).unwrap_err();
        assert_eq!(err.to_string(), "Image size should be less than 5MB");
    }

    #[test]
    fn rejects_non_images() {
        for name in ["notes.txt", "archive", "clip.mp4"] {
            let err = validate_image(Path::new(name), 10).unwrap_err();
            assert_eq!(err.to_string(), "Please upload an image file");
        }
    }
}
