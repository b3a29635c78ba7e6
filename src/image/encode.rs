//! Resizing and encoding normalized images.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::{Error, Result};

use super::{from_dynamic, NormalizedImage, OutputFormat};

/// Shrink `image` so that it is at most `max_width` pixels wide.
///
/// The aspect ratio is preserved and the height never drops below one
/// pixel. Images already narrow enough are returned unchanged; nothing is
/// ever upscaled.
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match the image geometry.
pub fn shrink_to_width(image: NormalizedImage, max_width: u32) -> Result<NormalizedImage> {
    if max_width == 0 || image.width() <= max_width {
        return Ok(image);
    }

    let height = scaled_height(image.width(), image.height(), max_width);
    tracing::debug!(
        "Resizing {}x{} to {max_width}x{height}",
        image.width(),
        image.height()
    );

    let resized = image
        .to_dynamic()?
        .resize_exact(max_width, height, FilterType::Lanczos3);

    Ok(from_dynamic(&resized))
}

/// Encode `image` into its container format.
///
/// The output depends only on the pixel grid and the format, so encoding the
/// same image twice yields identical bytes.
///
/// # Errors
///
/// Returns an error if the encoder rejects the image.
pub fn encode_image(image: &NormalizedImage, format: OutputFormat) -> Result<Vec<u8>> {
    let img = image.to_dynamic()?;
    let mut bytes = Vec::new();

    match format {
        OutputFormat::Png => {
            img.write_with_encoder(PngEncoder::new(&mut bytes))
                .map_err(|source| Error::ImageEncode { source })?;
        }
        OutputFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgb8(img.to_rgb8())
            } else {
                img
            };
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))
                .map_err(|source| Error::ImageEncode { source })?;
        }
    }

    Ok(bytes)
}

/// Encode `image` and return the payload as standard padded base64.
///
/// # Errors
///
/// Returns an error if the image cannot be encoded.
pub fn encode_base64(image: &NormalizedImage, format: OutputFormat) -> Result<String> {
    let bytes = encode_image(image, format)?;
    Ok(STANDARD.encode(bytes))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_height(width: u32, height: u32, max_width: u32) -> u32 {
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    // Safe: scaled <= height because max_width < width
    (scaled as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{decode_base64, normalize_array, ChannelOrder, PixelArray, PixelFormat};
    use ndarray::Array3;
    use proptest::prelude::*;

    fn gradient(height: usize, width: usize, channels: usize) -> NormalizedImage {
        #[allow(clippy::cast_possible_truncation)]
        let array = Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
            ((y * 31 + x * 7 + c * 59) % 256) as u8
        });
        normalize_array(&PixelArray::from(array), ChannelOrder::Rgb, false).unwrap()
    }

    #[test]
    fn test_round_trip_all_formats() {
        for channels in [1, 3, 4] {
            let img = gradient(9, 13, channels);
            let encoded = encode_base64(&img, OutputFormat::Png).unwrap();
            assert_eq!(decode_base64(&encoded).unwrap(), img);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let img = gradient(16, 16, 3);
        let first = encode_base64(&img, OutputFormat::Png).unwrap();
        let second = encode_base64(&img.clone(), OutputFormat::Png).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("iVBORw0KGgo"));
    }

    #[test]
    fn test_shrink_preserves_aspect_ratio() {
        let img = gradient(50, 100, 3);
        let shrunk = shrink_to_width(img, 40).unwrap();
        assert_eq!((shrunk.width(), shrunk.height()), (40, 20));
        assert_eq!(shrunk.format(), PixelFormat::Rgb);
    }

    #[test]
    fn test_shrink_rounds_height() {
        let shrunk = shrink_to_width(gradient(33, 100, 1), 10).unwrap();
        assert_eq!((shrunk.width(), shrunk.height()), (10, 3));
        assert_eq!(shrunk.format(), PixelFormat::Gray);

        let thin = shrink_to_width(gradient(1, 100, 4), 10).unwrap();
        assert_eq!(thin.height(), 1);
    }

    #[test]
    fn test_never_upscales() {
        let img = gradient(10, 20, 3);
        let same = shrink_to_width(img.clone(), 64).unwrap();
        assert_eq!(same, img);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let img = gradient(8, 8, 4);
        let bytes = encode_image(&img, OutputFormat::Jpeg { quality: 90 }).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = crate::image::load_bytes(&bytes).unwrap();
        assert_eq!(decoded.format(), PixelFormat::Rgb);
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_scaled_height() {
        assert_eq!(scaled_height(100, 50, 40), 20);
        assert_eq!(scaled_height(3, 2, 2), 1);
        assert_eq!(scaled_height(1000, 1, 10), 1);
    }

    fn pixel_grid() -> impl Strategy<Value = NormalizedImage> {
        (1usize..12, 1usize..12, prop::sample::select(vec![1usize, 3, 4])).prop_flat_map(
            |(height, width, channels)| {
                proptest::collection::vec(any::<u8>(), height * width * channels).prop_map(
                    move |data| {
                        let array = Array3::from_shape_vec((height, width, channels), data)
                            .unwrap();
                        normalize_array(&PixelArray::from(array), ChannelOrder::Rgb, false)
                            .unwrap()
                    },
                )
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_png_round_trip_is_lossless(img in pixel_grid()) {
            let encoded = encode_base64(&img, OutputFormat::Png).unwrap();
            prop_assert_eq!(decode_base64(&encoded).unwrap(), img);
        }

        #[test]
        fn prop_shrink_keeps_aspect_ratio(
            (width, height, max_width) in (2u32..120)
                .prop_flat_map(|w| (Just(w), 1u32..120, 1..w))
        ) {
            let img = NormalizedImage::new(
                width,
                height,
                PixelFormat::Gray,
                vec![128; (width * height) as usize],
            )
            .unwrap();
            let shrunk = shrink_to_width(img, max_width).unwrap();

            prop_assert_eq!(shrunk.width(), max_width);
            let exact = f64::from(height) * f64::from(max_width) / f64::from(width);
            let actual = f64::from(shrunk.height());
            prop_assert!(actual >= 1.0);
            prop_assert!((actual - exact).abs() <= 0.5 || shrunk.height() == 1);
        }
    }
}
