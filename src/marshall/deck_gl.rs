//! Deck.GL chart marshalling.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::proto::{DeckGlChart, DeckGlLayer};

/// Layer type used when only data is supplied.
pub const DEFAULT_LAYER_TYPE: &str = "ScatterplotLayer";

const LATITUDE_COLUMNS: [&str; 2] = ["lat", "latitude"];
const LONGITUDE_COLUMNS: [&str; 2] = ["lon", "longitude"];

/// Marshal a Deck.GL chart.
///
/// * `data` is drawn as a single [`DEFAULT_LAYER_TYPE`] layer when the spec
///   declares no layers of its own.
/// * `spec` is the top-level Deck.GL spec. Its `layers` array, if any, is
///   split off into [`DeckGlLayer`]s; each layer's `data` (an array of row
///   objects) becomes the layer's frame.
/// * `kwargs` are underscore-flattened keys (`viewport_zoom`) merged over the
///   spec, see [`unflatten`].
///
/// # Errors
///
/// Returns an error if `layers` is not an array of objects, a layer's data is
/// not an array of row objects, or the default layer cannot find latitude and
/// longitude columns.
pub fn marshall_deck_gl(
    data: Option<&DataFrame>,
    spec: Option<Map<String, Value>>,
    kwargs: &[(String, Value)],
) -> Result<DeckGlChart> {
    let mut spec = spec.unwrap_or_default();
    merge_objects(&mut spec, unflatten(kwargs));

    let mut layers = match spec.remove("layers") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| marshall_layer(index, entry))
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(Error::InvalidParameter {
                name: "layers".to_string(),
                reason: format!("expected an array, got {other}"),
            })
        }
    };

    if layers.is_empty() {
        if let Some(frame) = data {
            layers.push(default_layer(frame)?);
        }
    }

    tracing::info!("Marshalled Deck.GL chart with {} layer(s)", layers.len());

    Ok(DeckGlChart {
        spec: serde_json::to_string(&spec)?,
        layers,
    })
}

/// Expand underscore-separated keys into nested objects.
///
/// `[("viewport_zoom", 11), ("viewport_pitch", 50)]` becomes
/// `{"viewport": {"zoom": 11, "pitch": 50}}`. Later entries win on conflict.
#[must_use]
pub fn unflatten(entries: &[(String, Value)]) -> Map<String, Value> {
    let mut out = Map::new();

    for (path, value) in entries {
        let mut keys = path.split('_').rev();
        let Some(leaf) = keys.next() else { continue };

        let mut nested = Map::new();
        nested.insert(leaf.to_string(), value.clone());
        for key in keys {
            let mut parent = Map::new();
            parent.insert(key.to_string(), Value::Object(nested));
            nested = parent;
        }

        merge_objects(&mut out, nested);
    }

    out
}

/// Deep-merge `overlay` into `base`; on conflict non-object values replace.
fn merge_objects(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, incoming) in overlay {
        match base.get_mut(&key) {
            Some(Value::Object(existing)) if incoming.is_object() => {
                if let Value::Object(incoming) = incoming {
                    merge_objects(existing, incoming);
                }
            }
            _ => {
                base.insert(key, incoming);
            }
        }
    }
}

fn marshall_layer(index: usize, entry: Value) -> Result<DeckGlLayer> {
    let mut layer = match entry {
        Value::Object(layer) => layer,
        other => {
            return Err(Error::InvalidParameter {
                name: format!("layers[{index}]"),
                reason: format!("expected an object, got {other}"),
            })
        }
    };

    let data = match layer.remove("data") {
        Some(Value::Array(records)) => Some(DataFrame::from_records(&records)?),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(Error::InvalidParameter {
                name: format!("layers[{index}].data"),
                reason: format!("expected an array of row objects, got {other}"),
            })
        }
    };

    let layer_type = layer
        .get("type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unset>");
    let rows = data.as_ref().map_or(0, DataFrame::len);
    tracing::debug!("Layer {index}: type {layer_type}, {rows} row(s)");

    Ok(DeckGlLayer {
        data,
        spec: serde_json::to_string(&layer)?,
    })
}

fn default_layer(frame: &DataFrame) -> Result<DeckGlLayer> {
    let find = |candidates: &[&'static str]| {
        candidates
            .iter()
            .copied()
            .find(|name| frame.has_column(name))
    };

    let (Some(latitude), Some(longitude)) = (find(&LATITUDE_COLUMNS), find(&LONGITUDE_COLUMNS))
    else {
        return Err(frame.missing_columns(&["lat|latitude", "lon|longitude"]));
    };

    let spec = json!({
        "type": DEFAULT_LAYER_TYPE,
        "encoding": {
            "getLatitude": latitude,
            "getLongitude": longitude,
        },
    });

    Ok(DeckGlLayer {
        data: Some(frame.clone()),
        spec: spec.to_string(),
    })
}
