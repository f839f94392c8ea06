//! Validation of uploaded recipe image bytes.

use std::io::Cursor;

use image::ImageReader;
use serde_json::json;

use super::{Error, ImageFormat};

/// Upload size limit used when none is configured.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Reasons an upload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUploadError {
    #[error("image must not be empty")]
    Empty,
    #[error("image must be at most {max} bytes")]
    TooLarge { max: usize },
    #[error("upload is not a supported image (png, jpeg, gif, webp)")]
    UnsupportedFormat,
    #[error("image could not be decoded")]
    Undecodable,
}

impl ImageUploadError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty_image",
            Self::TooLarge { .. } => "image_too_large",
            Self::UnsupportedFormat => "unsupported_image",
            Self::Undecodable => "invalid_image",
        }
    }
}

impl From<ImageUploadError> for Error {
    fn from(err: ImageUploadError) -> Self {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "image",
            "code": err.code(),
        }))
    }
}

/// Bytes that fully decode as one of the accepted formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ValidatedImage {
    /// Sniff the format from the content and decode it completely.
    ///
    /// The declared file name and content type are never trusted.
    pub fn decode(bytes: Vec<u8>, max_bytes: usize) -> Result<Self, ImageUploadError> {
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(ImageUploadError::TooLarge { max: max_bytes });
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|_| ImageUploadError::Undecodable)?;
        let format = match reader.format() {
            Some(image::ImageFormat::Png) => ImageFormat::Png,
            Some(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
            Some(image::ImageFormat::Gif) => ImageFormat::Gif,
            Some(image::ImageFormat::WebP) => ImageFormat::Webp,
            _ => return Err(ImageUploadError::UnsupportedFormat),
        };
        reader.decode().map_err(|_| ImageUploadError::Undecodable)?;

        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
