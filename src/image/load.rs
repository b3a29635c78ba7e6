//! Resolving image inputs into normalized pixel grids.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ColorType, DynamicImage};

use crate::error::{Error, Result};

use super::{
    clip_array, squeeze_channels, verify_shape, ChannelOrder, NormalizedImage, PixelArray,
    PixelFormat,
};

/// Normalize a numeric pixel array.
///
/// The array is:
/// 1. Checked for a `(h, w)` or `(h, w, 1|3|4)` shape
/// 2. Clipped into `[0, 255]`, or rejected if out of range and `clamp` is off
/// 3. Squeezed to 2-D if it has a single channel
/// 4. Reordered to RGB(A) if tagged [`ChannelOrder::Bgr`]
///
/// # Errors
///
/// Returns an error if the shape or channel count is invalid, or if a value
/// is out of range while `clamp` is off.
pub fn normalize_array(
    array: &PixelArray,
    order: ChannelOrder,
    clamp: bool,
) -> Result<NormalizedImage> {
    let shape = verify_shape(array.shape())?;
    let pixels = squeeze_channels(clip_array(array, clamp)?);

    let (width, height) = dimensions_to_u32(shape.width, shape.height)?;
    let data: Vec<u8> = pixels.iter().copied().collect();

    let mut image = NormalizedImage::new(width, height, shape.format(), data)?;
    if order == ChannelOrder::Bgr {
        image.swap_red_blue();
    }

    Ok(image)
}

/// Normalize a decoded bitmap.
///
/// 8-bit gray, RGB and RGBA buffers are kept as they are. 16-bit gray becomes
/// 8-bit gray; anything else becomes RGBA when it carries alpha, RGB otherwise.
#[must_use]
pub fn from_dynamic(img: &DynamicImage) -> NormalizedImage {
    let (format, data) = match img.color() {
        ColorType::L8 | ColorType::L16 => (PixelFormat::Gray, img.to_luma8().into_raw()),
        ColorType::Rgb8 => (PixelFormat::Rgb, img.to_rgb8().into_raw()),
        color if color.has_alpha() => (PixelFormat::Rgba, img.to_rgba8().into_raw()),
        _ => (PixelFormat::Rgb, img.to_rgb8().into_raw()),
    };

    NormalizedImage {
        width: img.width(),
        height: img.height(),
        format,
        data,
    }
}

/// Decode an encoded image file held in memory.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image format.
pub fn load_bytes(bytes: &[u8]) -> Result<NormalizedImage> {
    let img = image::load_from_memory(bytes).map_err(|source| Error::ImageDecode { source })?;
    tracing::debug!(
        "Decoded {}x{} {:?} image from {} bytes",
        img.width(),
        img.height(),
        img.color(),
        bytes.len()
    );
    Ok(from_dynamic(&img))
}

/// Decode a base64 image payload, with or without a `data:` URL prefix.
///
/// # Errors
///
/// Returns an error if the text is not valid base64 or does not hold a
/// supported image format.
pub fn decode_base64(text: &str) -> Result<NormalizedImage> {
    let payload = match text.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => text,
    };
    let bytes = STANDARD.decode(payload.trim())?;
    load_bytes(&bytes)
}

/// Load an image from disk.
///
/// # Errors
///
/// Returns an error if the image cannot be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<NormalizedImage> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());

    Ok(from_dynamic(&img))
}

fn dimensions_to_u32(width: usize, height: usize) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(Error::UnsupportedDimensions {
            width,
            height,
            reason: "dimensions exceed u32".to_string(),
        }),
    }
}
