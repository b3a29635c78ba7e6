//! Outbound wire messages.
//!
//! These mirror the protocol messages the front end renders. They serialize
//! with serde (camelCase keys); absent optional fields are omitted.

use serde::Serialize;

use crate::frame::DataFrame;

/// One renderable element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Element {
    Imgs(ImageList),
    DeckGlChart(DeckGlChart),
    Map(MapPoints),
}

/// An ordered list of images sharing one display width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageList {
    pub imgs: Vec<WireImage>,
    /// Display width: `-1` for the natural width, `-2` for the column width,
    /// otherwise pixels.
    pub width: i32,
}

/// A single image entry: either an inline base64 payload or a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl WireImage {
    #[must_use]
    pub fn encoded(base64: String, mime_type: &str, caption: Option<String>) -> Self {
        Self {
            base64: Some(base64),
            mime_type: Some(mime_type.to_string()),
            url: None,
            caption,
        }
    }

    #[must_use]
    pub fn url(url: String, caption: Option<String>) -> Self {
        Self {
            url: Some(url),
            caption,
            ..Self::default()
        }
    }
}

/// A Deck.GL map: top-level JSON spec plus layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckGlChart {
    /// JSON-encoded top-level spec (viewport, size, ...), `layers` removed.
    pub spec: String,
    pub layers: Vec<DeckGlLayer>,
}

/// One Deck.GL layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckGlLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DataFrame>,
    /// JSON-encoded layer spec, `data` removed.
    pub spec: String,
}

/// Points for the simple map element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoints {
    pub points: DataFrame,
}
