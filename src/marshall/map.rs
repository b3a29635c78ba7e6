//! Point map marshalling.

use crate::error::Result;
use crate::frame::DataFrame;
use crate::proto::MapPoints;

const LAT_LON: [&str; 2] = ["lat", "lon"];

/// Marshal the `lat` and `lon` columns of `points` into a map message.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumns`] if either column is absent.
pub fn marshall_map(points: &DataFrame) -> Result<MapPoints> {
    let points = points.select(&LAT_LON)?;
    tracing::info!("Marshalled map with {} point(s)", points.len());
    Ok(MapPoints { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_selects_lat_lon() {
        let frame = DataFrame::from_columns([
            ("name", vec![json!("a"), json!("b")]),
            ("lon", vec![json!(10), json!(20)]),
            ("lat", vec![json!(1), json!(2)]),
        ])
        .unwrap();

        let map = marshall_map(&frame).unwrap();
        assert_eq!(
            map.points.column_names().collect::<Vec<_>>(),
            vec!["lat", "lon"]
        );
        assert_eq!(map.points.len(), 2);
    }

    #[test]
    fn test_missing_columns() {
        let frame = DataFrame::from_columns([("latitude", vec![json!(1)])]).unwrap();
        let err = marshall_map(&frame).unwrap_err();
        assert!(matches!(err, Error::MissingColumns { .. }));
        assert!(err.to_string().contains("\"lon\""));
    }
}
