//! Marshalling values into wire messages.

mod deck_gl;
mod images;
mod map;

pub use deck_gl::{marshall_deck_gl, unflatten, DEFAULT_LAYER_TYPE};
pub use images::{marshall_images, Captions, Config, ImageSource, ImageWidth};
pub use map::marshall_map;
