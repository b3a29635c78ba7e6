//! Custom error types for pixmarshal.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the pixmarshal library.
#[derive(Error, Debug)]
pub enum Error {
    /// Pixel array rank is neither 2 nor 3.
    #[error("image array must have 2 or 3 dimensions, got {ndim}")]
    Shape { ndim: usize },

    /// Trailing dimension of a 3-D pixel array is not a valid channel count.
    #[error("channel can only be 1, 3, or 4, got {channels}; shape is {shape}")]
    Channel { channels: usize, shape: String },

    /// Caption list and image list disagree in length.
    #[error("caption count mismatch: {images} image(s) but {captions} caption(s)")]
    CaptionCountMismatch { images: usize, captions: usize },

    /// Image dimensions are not supported.
    #[error("unsupported image dimensions {width}x{height}: {reason}")]
    UnsupportedDimensions {
        width: usize,
        height: usize,
        reason: String,
    },

    /// A pixel value lies outside the display range and clamping is off.
    #[error("pixel value {value} is outside [{min}, {max}]; enable clamping to clip it")]
    OutOfRange {
        value: String,
        min: String,
        max: String,
    },

    /// Buffer length disagrees with the image geometry.
    #[error("pixel buffer mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to decode an in-memory image.
    #[error("failed to decode image: {source}")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode an image into its container format.
    #[error("failed to encode image: {source}")]
    ImageEncode {
        #[source]
        source: image::ImageError,
    },

    /// Invalid base64 payload.
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid JSON in a chart spec or data payload.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A data frame lacks columns the element requires.
    #[error("missing columns: expected {expected}, found [{found}]")]
    MissingColumns { expected: String, found: String },

    /// A data frame column has a different length than the others.
    #[error("column {column} has {actual} value(s), expected {expected}")]
    RaggedFrame {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pixmarshal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Render an array shape the way users write it, e.g. `(1, 2, 2)` or `(5,)`.
#[must_use]
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({single},)"),
        dims => {
            let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[1, 2, 2]), "(1, 2, 2)");
        assert_eq!(format_shape(&[5]), "(5,)");
        assert_eq!(format_shape(&[]), "()");
    }

    #[test]
    fn test_channel_message_cites_count_and_shape() {
        let err = Error::Channel {
            channels: 2,
            shape: format_shape(&[1, 2, 2]),
        };
        assert_eq!(
            err.to_string(),
            "channel can only be 1, 3, or 4, got 2; shape is (1, 2, 2)"
        );
    }
}
