//! Pixel array shape validation.

use ndarray::{ArrayD, Axis};

use crate::error::{format_shape, Error, Result};

use super::PixelFormat;

/// Geometry of a validated pixel array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImageShape {
    /// Canonical pixel format for this channel count.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        match self.channels {
            1 => PixelFormat::Gray,
            3 => PixelFormat::Rgb,
            _ => PixelFormat::Rgba,
        }
    }
}

/// Check that `shape` describes a displayable image.
///
/// Accepts `(height, width)` and `(height, width, channels)` with 1, 3 or 4
/// channels. A `(height, width, 1)` array reports one channel, the same as its
/// 2-D counterpart.
///
/// # Errors
///
/// * [`Error::Shape`] when the rank is not 2 or 3.
/// * [`Error::Channel`] when the trailing dimension is not 1, 3 or 4.
/// * [`Error::UnsupportedDimensions`] when height or width is zero.
pub fn verify_shape(shape: &[usize]) -> Result<ImageShape> {
    let image_shape = match *shape {
        [height, width] => ImageShape {
            height,
            width,
            channels: 1,
        },
        [height, width, channels] => {
            if !matches!(channels, 1 | 3 | 4) {
                return Err(Error::Channel {
                    channels,
                    shape: format_shape(shape),
                });
            }
            ImageShape {
                height,
                width,
                channels,
            }
        }
        _ => return Err(Error::Shape { ndim: shape.len() }),
    };

    if image_shape.height == 0 || image_shape.width == 0 {
        return Err(Error::UnsupportedDimensions {
            width: image_shape.width,
            height: image_shape.height,
            reason: "image must contain at least one pixel".to_string(),
        });
    }

    Ok(image_shape)
}

/// Drop a trailing single-channel axis, turning `(h, w, 1)` into `(h, w)`.
#[must_use]
pub fn squeeze_channels<T>(array: ArrayD<T>) -> ArrayD<T> {
    if array.ndim() == 3 && array.shape()[2] == 1 {
        array.index_axis_move(Axis(2), 0)
    } else {
        array
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_rank_one_is_shape_error() {
        let err = verify_shape(&[1]).unwrap_err();
        assert!(matches!(err, Error::Shape { ndim: 1 }));
        assert!(err.to_string().contains('1'));
    }

    #[test]
    fn test_rank_four_is_shape_error() {
        assert!(matches!(
            verify_shape(&[1, 2, 3, 4]),
            Err(Error::Shape { ndim: 4 })
        ));
    }

    #[test]
    fn test_two_channels_is_channel_error() {
        let err = verify_shape(&[1, 2, 2]).unwrap_err();
        match &err {
            Error::Channel { channels, shape } => {
                assert_eq!(*channels, 2);
                assert_eq!(shape, "(1, 2, 2)");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_valid_shapes() {
        assert_eq!(verify_shape(&[4, 5]).unwrap().format(), PixelFormat::Gray);
        assert_eq!(verify_shape(&[4, 5, 1]).unwrap().format(), PixelFormat::Gray);
        assert_eq!(verify_shape(&[4, 5, 3]).unwrap().format(), PixelFormat::Rgb);
        assert_eq!(verify_shape(&[4, 5, 4]).unwrap().format(), PixelFormat::Rgba);
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            verify_shape(&[0, 5, 3]),
            Err(Error::UnsupportedDimensions { .. })
        ));
    }

    #[test]
    fn test_squeeze_single_channel() {
        let array = ArrayD::<u8>::zeros(IxDyn(&[3, 2, 1]));
        assert_eq!(squeeze_channels(array).shape(), &[3, 2]);

        let array = ArrayD::<u8>::zeros(IxDyn(&[3, 2, 3]));
        assert_eq!(squeeze_channels(array).shape(), &[3, 2, 3]);
    }
}
