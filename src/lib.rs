//! # pixmarshal
//!
//! Marshalling helpers that turn in-memory values into wire messages for a
//! browser front end.
//!
//! Images arrive as bitmaps, numeric arrays, encoded bytes, base64 text, file
//! paths or URLs. They are validated, clipped into the 8-bit display range,
//! reordered to RGB, shrunk to the requested width and encoded as base64 PNG
//! (or JPEG). Map points and Deck.GL charts are marshalled from a small
//! columnar [`DataFrame`].
//!
//! ## Example
//!
//! ```
//! use ndarray::Array3;
//! use pixmarshal::{marshall_images, Config, ImageSource, PixelArray};
//!
//! # fn main() -> pixmarshal::Result<()> {
//! let pixels = Array3::<u8>::zeros((16, 16, 3));
//! let list = marshall_images(
//!     [ImageSource::Array(PixelArray::from(pixels))],
//!     "a black square",
//!     &Config::default(),
//! )?;
//!
//! assert_eq!(list.imgs.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod frame;
pub mod image;
pub mod marshall;
pub mod proto;

pub use error::{Error, Result};
pub use frame::DataFrame;
pub use crate::image::{ChannelOrder, NormalizedImage, OutputFormat, PixelArray, PixelFormat};
pub use marshall::{
    marshall_deck_gl, marshall_images, marshall_map, Captions, Config, ImageSource, ImageWidth,
};
pub use proto::{DeckGlChart, DeckGlLayer, Element, ImageList, MapPoints, WireImage};
