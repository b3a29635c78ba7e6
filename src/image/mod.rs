//! Image normalization, encoding, and decoding utilities.

mod clip;
mod encode;
mod load;
mod shape;

pub use clip::{clip_array, ClipToU8};
pub use encode::{encode_base64, encode_image, shrink_to_width};
pub use load::{decode_base64, from_dynamic, load_bytes, load_image, normalize_array};
pub use shape::{squeeze_channels, verify_shape, ImageShape};

use image::{DynamicImage, ImageBuffer};
use ndarray::{Array, ArrayD, Dimension, IxDyn};
use serde_json::Value;

use crate::error::{format_shape, Error, Result};

/// Canonical pixel layouts an image is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One 8-bit luminance channel.
    Gray,
    /// Three 8-bit channels in red, green, blue order.
    Rgb,
    /// Four 8-bit channels in red, green, blue, alpha order.
    Rgba,
}

impl PixelFormat {
    /// Number of channels per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Channel ordering of numeric array input.
///
/// Arrays coming out of OpenCV-style libraries store blue first. The tag is
/// always explicit; it is never guessed from pixel data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Red, green, blue (and alpha).
    #[default]
    Rgb,
    /// Blue, green, red (and alpha).
    Bgr,
}

/// Container format of the encoded payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossy JPEG with the given quality (1-100). Alpha is dropped.
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// MIME type announced to the front end.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// A validated 8-bit pixel grid in canonical channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl NormalizedImage {
    /// Wrap a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match
    /// `width * height * channels`.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected} bytes for {width}x{height} {format:?}"),
                actual: format!("{} bytes", data.len()),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw row-major pixel bytes.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Swap the first and third channel of every pixel (BGR(A) to RGB(A)).
    /// Grayscale images are left untouched.
    pub fn swap_red_blue(&mut self) {
        if self.format == PixelFormat::Gray {
            return;
        }

        for pixel in self.data.chunks_exact_mut(self.format.channels()) {
            pixel.swap(0, 2);
        }
    }

    /// Convert to a `DynamicImage` for resizing and encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot back an image of this size.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let mismatch = || Error::ShapeMismatch {
            expected: format!("{}x{} {:?} image", self.width, self.height, self.format),
            actual: format!("{} bytes", self.data.len()),
        };
        let data = self.data.clone();

        let img = match self.format {
            PixelFormat::Gray => DynamicImage::ImageLuma8(
                ImageBuffer::from_raw(self.width, self.height, data).ok_or_else(mismatch)?,
            ),
            PixelFormat::Rgb => DynamicImage::ImageRgb8(
                ImageBuffer::from_raw(self.width, self.height, data).ok_or_else(mismatch)?,
            ),
            PixelFormat::Rgba => DynamicImage::ImageRgba8(
                ImageBuffer::from_raw(self.width, self.height, data).ok_or_else(mismatch)?,
            ),
        };

        Ok(img)
    }
}

/// A numeric pixel array of any supported element type.
///
/// Shapes follow the `(height, width)` or `(height, width, channels)`
/// convention.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelArray {
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    U16(ArrayD<u16>),
    I32(ArrayD<i32>),
    U32(ArrayD<u32>),
    I64(ArrayD<i64>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl PixelArray {
    /// Build an array from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not hold exactly as many elements as
    /// `shape` describes.
    pub fn from_shape_vec<T>(shape: &[usize], data: Vec<T>) -> Result<Self>
    where
        ArrayD<T>: Into<Self>,
    {
        let len = data.len();
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Into::into)
            .map_err(|_| Error::ShapeMismatch {
                expected: format!("{} elements", shape.iter().product::<usize>()),
                actual: format!("{len} elements"),
            })
    }

    /// Build an array from nested JSON lists such as `[[0, 128], [255, 64]]`.
    ///
    /// All-integer input becomes `I64`, anything with a fractional number
    /// becomes `F64`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lists are ragged or hold non-numbers.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut shape = Vec::new();
        let mut cursor = value;
        while let Value::Array(items) = cursor {
            shape.push(items.len());
            match items.first() {
                Some(first) => cursor = first,
                None => break,
            }
        }

        let mut numbers = Vec::with_capacity(shape.iter().product());
        collect_numbers(value, &shape, &mut numbers)?;

        if numbers.iter().all(serde_json::Number::is_i64) {
            let data = numbers.iter().filter_map(serde_json::Number::as_i64).collect();
            Self::from_shape_vec::<i64>(&shape, data)
        } else {
            let data = numbers.iter().filter_map(serde_json::Number::as_f64).collect();
            Self::from_shape_vec::<f64>(&shape, data)
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::U8(a) => a.shape(),
            Self::I8(a) => a.shape(),
            Self::I16(a) => a.shape(),
            Self::U16(a) => a.shape(),
            Self::I32(a) => a.shape(),
            Self::U32(a) => a.shape(),
            Self::I64(a) => a.shape(),
            Self::U64(a) => a.shape(),
            Self::F32(a) => a.shape(),
            Self::F64(a) => a.shape(),
        }
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }
}

fn collect_numbers(
    value: &Value,
    shape: &[usize],
    out: &mut Vec<serde_json::Number>,
) -> Result<()> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) if items.len() == len => {
            for item in items {
                collect_numbers(item, rest, out)?;
            }
            Ok(())
        }
        (Value::Number(number), None) if number.as_f64().is_some() => {
            out.push(number.clone());
            Ok(())
        }
        (other, _) => Err(Error::ShapeMismatch {
            expected: format!("rectangular numeric lists with shape {}", format_shape(shape)),
            actual: format!("{other}"),
        }),
    }
}

macro_rules! pixel_array_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<D: Dimension> From<Array<$ty, D>> for PixelArray {
                fn from(array: Array<$ty, D>) -> Self {
                    Self::$variant(array.into_dyn())
                }
            }
        )*
    };
}

pixel_array_from! {
    u8 => U8,
    i8 => I8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_new_rejects_short_buffer() {
        let err = NormalizedImage::new(2, 2, PixelFormat::Rgb, vec![0; 11]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_swap_red_blue() {
        let mut img =
            NormalizedImage::new(2, 1, PixelFormat::Rgba, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        img.swap_red_blue();
        assert_eq!(img.as_raw(), &[3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn test_swap_red_blue_ignores_gray() {
        let mut img = NormalizedImage::new(3, 1, PixelFormat::Gray, vec![1, 2, 3]).unwrap();
        img.swap_red_blue();
        assert_eq!(img.as_raw(), &[1, 2, 3]);
    }

    #[test]
    fn test_to_dynamic_preserves_layout() {
        let img = NormalizedImage::new(2, 3, PixelFormat::Rgb, vec![9; 18]).unwrap();
        let dynamic = img.to_dynamic().unwrap();
        assert_eq!((dynamic.width(), dynamic.height()), (2, 3));
        assert!(matches!(dynamic, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_pixel_array_from_typed_arrays() {
        let gray = PixelArray::from(Array2::<f32>::zeros((4, 5)));
        assert!(matches!(gray, PixelArray::F32(_)));
        assert_eq!(gray.shape(), &[4, 5]);

        let rgb = PixelArray::from(Array3::<i64>::zeros((4, 5, 3)));
        assert!(matches!(rgb, PixelArray::I64(_)));
        assert_eq!(rgb.ndim(), 3);
    }

    #[test]
    fn test_from_shape_vec_checks_length() {
        let ok = PixelArray::from_shape_vec(&[2, 2], vec![0u16; 4]).unwrap();
        assert_eq!(ok.shape(), &[2, 2]);

        let err = PixelArray::from_shape_vec(&[2, 2], vec![0u8; 3]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_pixel_array_narrow_and_wide_ints() {
        assert!(matches!(PixelArray::from(Array2::<i8>::zeros((1, 1))), PixelArray::I8(_)));
        assert!(matches!(PixelArray::from(Array2::<i16>::zeros((1, 1))), PixelArray::I16(_)));
        assert!(matches!(PixelArray::from(Array2::<u32>::zeros((1, 1))), PixelArray::U32(_)));
        assert!(matches!(PixelArray::from(Array2::<u64>::zeros((1, 1))), PixelArray::U64(_)));
    }

    #[test]
    fn test_from_json_integers() {
        let value = serde_json::json!([[[0, 1, 2], [3, 4, 5]]]);
        let array = PixelArray::from_json(&value).unwrap();
        assert_eq!(array.shape(), &[1, 2, 3]);
        assert!(matches!(array, PixelArray::I64(_)));
    }

    #[test]
    fn test_from_json_floats() {
        let value = serde_json::json!([[0, 0.5], [1.0, 0.25]]);
        let array = PixelArray::from_json(&value).unwrap();
        assert_eq!(array.shape(), &[2, 2]);
        assert!(matches!(array, PixelArray::F64(_)));
    }

    #[test]
    fn test_from_json_rejects_ragged() {
        let value = serde_json::json!([[1, 2], [3]]);
        assert!(matches!(
            PixelArray::from_json(&value),
            Err(Error::ShapeMismatch { .. })
        ));

        let value = serde_json::json!([[1, "a"]]);
        assert!(PixelArray::from_json(&value).is_err());
    }
}
