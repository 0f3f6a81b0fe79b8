//! Upload acceptance rules for incoming headshots.
//!
//! The checks here run before any upstream transfer is initiated, so a
//! rejected file never costs an API call. The same rules are mirrored by the
//! frontend before the upload leaves the browser; the gateway enforces them
//! regardless.

use bytes::Bytes;

use crate::config::UploadConfig;
use crate::errors::{Error, Result};

/// MIME types accepted for upload. Browsers disagree on the JPEG subtype
/// spelling, so both are allowed. Matching is ASCII-case-insensitive.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/jpg"];

/// A single uploaded headshot.
///
/// Owned exclusively by the request that received it and dropped once the
/// response is sent. There is no identity beyond that lifetime.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl UploadedImage {
    pub fn new(bytes: Bytes, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Accept only JPEG uploads under the configured size ceiling.
    pub fn validate(&self, limits: &UploadConfig) -> Result<()> {
        if !ACCEPTED_MIME_TYPES.iter().any(|accepted| accepted.eq_ignore_ascii_case(&self.mime_type)) {
            return Err(Error::InvalidFileType {
                mime_type: self.mime_type.clone(),
            });
        }

        if self.size() > limits.max_file_size {
            return Err(Error::FileTooLarge {
                size: self.size(),
                limit: limits.max_file_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> UploadConfig {
        UploadConfig::default()
    }

    #[test]
    fn accepts_both_jpeg_subtypes() {
        for mime in ["image/jpeg", "image/jpg", "image/JPEG", "IMAGE/Jpg"] {
            let image = UploadedImage::new(Bytes::from_static(b"\xff\xd8\xff"), mime);
            assert!(image.validate(&limits()).is_ok(), "rejected {mime}");
        }
    }

    #[test]
    fn rejects_non_jpeg_mime_types() {
        for mime in ["image/png", "image/gif", "image/webp", "application/pdf", "text/plain", ""] {
            let image = UploadedImage::new(Bytes::from_static(b"not a jpeg"), mime);
            let err = image.validate(&limits()).unwrap_err();
            assert!(
                matches!(err, Error::InvalidFileType { .. }),
                "expected InvalidFileType for {mime}, got {err:?}"
            );
        }
    }

    #[test]
    fn accepts_a_file_exactly_at_the_ceiling() {
        let limits = UploadConfig { max_file_size: 16 };
        let image = UploadedImage::new(Bytes::from(vec![0u8; 16]), "image/jpeg");
        assert!(image.validate(&limits).is_ok());
    }

    #[test]
    fn rejects_a_file_one_byte_over_the_ceiling() {
        let limits = UploadConfig { max_file_size: 16 };
        let image = UploadedImage::new(Bytes::from(vec![0u8; 17]), "image/jpeg");
        let err = image.validate(&limits).unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { size: 17, limit: 16 }));
    }

    #[test]
    fn type_check_runs_before_size_check() {
        // An oversized non-JPEG reports the type problem, matching the
        // frontend's own ordering.
        let limits = UploadConfig { max_file_size: 4 };
        let image = UploadedImage::new(Bytes::from(vec![0u8; 32]), "image/png");
        let err = image.validate(&limits).unwrap_err();
        assert!(matches!(err, Error::InvalidFileType { .. }));
    }
}
