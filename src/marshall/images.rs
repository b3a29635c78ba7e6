//! Image list marshalling.

use std::path::PathBuf;

use image::DynamicImage;

use crate::error::{Error, Result};
use crate::image::{
    decode_base64, encode_base64, from_dynamic, load_bytes, load_image, normalize_array,
    shrink_to_width, ChannelOrder, OutputFormat, PixelArray,
};
use crate::proto::{ImageList, WireImage};

/// Display width requested for an image list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageWidth {
    /// Natural image width.
    #[default]
    Auto,
    /// Stretch to the width of the enclosing column.
    Column,
    /// Fixed width in pixels; wider images are shrunk to it.
    Pixels(u32),
}

impl ImageWidth {
    /// Value of the `width` field on the wire.
    #[must_use]
    pub fn wire_value(self) -> i32 {
        match self {
            Self::Auto => -1,
            Self::Column => -2,
            Self::Pixels(width) => i32::try_from(width).unwrap_or(i32::MAX),
        }
    }

    /// Width images must be shrunk to, if any.
    #[must_use]
    pub const fn max_width(self) -> Option<u32> {
        match self {
            Self::Pixels(width) => Some(width),
            Self::Auto | Self::Column => None,
        }
    }
}

/// Configuration for image marshalling.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Display width, also the maximum width of encoded images.
    pub width: ImageWidth,

    /// Channel order of numeric array inputs.
    pub channels: ChannelOrder,

    /// Container format of the encoded payload.
    pub output_format: OutputFormat,

    /// Saturate out-of-range array values instead of rejecting them.
    pub clamp: bool,
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if let ImageWidth::Pixels(width) = self.width {
            if width == 0 {
                return Err(Error::InvalidParameter {
                    name: "width".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
            if i32::try_from(width).is_err() {
                return Err(Error::InvalidParameter {
                    name: "width".to_string(),
                    reason: format!("must be at most {}", i32::MAX),
                });
            }
        }

        if let OutputFormat::Jpeg { quality } = self.output_format {
            if !(1..=100).contains(&quality) {
                return Err(Error::InvalidParameter {
                    name: "output_format".to_string(),
                    reason: "JPEG quality must be between 1 and 100".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Captions for an image list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Captions {
    #[default]
    None,
    /// One caption shown under every image.
    One(String),
    /// One caption per image.
    Many(Vec<String>),
}

impl Captions {
    /// Expand to exactly one optional caption per image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptionCountMismatch`] if a caption list does not
    /// have `images` entries.
    pub fn resolve(self, images: usize) -> Result<Vec<Option<String>>> {
        match self {
            Self::None => Ok(vec![None; images]),
            Self::One(caption) => Ok(vec![Some(caption); images]),
            Self::Many(captions) if captions.len() == images => {
                Ok(captions.into_iter().map(Some).collect())
            }
            Self::Many(captions) => Err(Error::CaptionCountMismatch {
                images,
                captions: captions.len(),
            }),
        }
    }
}

impl From<&str> for Captions {
    fn from(caption: &str) -> Self {
        Self::One(caption.to_string())
    }
}

impl From<String> for Captions {
    fn from(caption: String) -> Self {
        Self::One(caption)
    }
}

impl From<Vec<String>> for Captions {
    fn from(captions: Vec<String>) -> Self {
        Self::Many(captions)
    }
}

impl From<Option<String>> for Captions {
    fn from(caption: Option<String>) -> Self {
        caption.map_or(Self::None, Self::One)
    }
}

/// Any representation an image can be handed over in.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// An already decoded bitmap.
    Dynamic(DynamicImage),
    /// A numeric pixel array.
    Array(PixelArray),
    /// An encoded image file in memory.
    Bytes(Vec<u8>),
    /// An encoded image file as base64 text, optionally a `data:` URL.
    Base64(String),
    /// An image file on disk.
    Path(PathBuf),
    /// A remote image the front end fetches itself.
    Url(String),
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        Self::Dynamic(img)
    }
}

impl From<PixelArray> for ImageSource {
    fn from(array: PixelArray) -> Self {
        Self::Array(array)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Marshal a batch of images into an [`ImageList`].
///
/// Every non-URL source is normalized, shrunk to the configured width, and
/// encoded as base64. URLs are passed through for the front end to fetch.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the captions do not
/// match the images, or any image fails to load, validate, or encode.
pub fn marshall_images<I>(
    sources: I,
    captions: impl Into<Captions>,
    config: &Config,
) -> Result<ImageList>
where
    I: IntoIterator<Item = ImageSource>,
{
    config.validate()?;

    let sources: Vec<ImageSource> = sources.into_iter().collect();
    let captions = captions.into().resolve(sources.len())?;

    tracing::info!("Marshalling {} image(s)", sources.len());

    let imgs = sources
        .into_iter()
        .zip(captions)
        .enumerate()
        .map(|(index, (source, caption))| marshall_image(index, source, caption, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(ImageList {
        imgs,
        width: config.width.wire_value(),
    })
}

fn marshall_image(
    index: usize,
    source: ImageSource,
    caption: Option<String>,
    config: &Config,
) -> Result<WireImage> {
    let image = match source {
        ImageSource::Url(url) => {
            tracing::debug!("Image {index}: passing through {url}");
            return Ok(WireImage::url(url, caption));
        }
        ImageSource::Dynamic(img) => from_dynamic(&img),
        ImageSource::Array(array) => normalize_array(&array, config.channels, config.clamp)?,
        ImageSource::Bytes(bytes) => load_bytes(&bytes)?,
        ImageSource::Base64(text) => decode_base64(&text)?,
        ImageSource::Path(path) => load_image(&path)?,
    };

    let image = match config.width.max_width() {
        Some(max_width) => shrink_to_width(image, max_width)?,
        None => image,
    };

    let base64 = encode_base64(&image, config.output_format)?;
    tracing::debug!(
        "Image {index}: {}x{} {:?}, {} base64 chars",
        image.width(),
        image.height(),
        image.format(),
        base64.len()
    );

    Ok(WireImage::encoded(
        base64,
        config.output_format.mime_type(),
        caption,
    ))
}
