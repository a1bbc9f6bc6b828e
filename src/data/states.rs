//! Brazilian state boundaries from a GeoJSON feature collection.
//!
//! Only what the choropleth needs is kept: the UF abbreviation (`SIGLA`
//! property) and the exterior ring of every polygon, as `(lon, lat)` pairs.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_STATES_URL: &str =
    "https://raw.githubusercontent.com/giuliano-macedo/geodata-br-states/refs/heads/main/geojson/br_states.json";

/// Feature property holding the UF abbreviation.
const UF_PROPERTY: &str = "SIGLA";

pub type Ring = Vec<(f64, f64)>;

#[derive(Debug, Clone)]
pub struct StateShape {
    pub uf: String,
    /// Exterior rings, one per polygon part.
    pub rings: Vec<Ring>,
}

#[derive(Debug, Clone)]
pub struct StateBoundaries {
    pub states: Vec<StateShape>,
}

/// Lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl StateBoundaries {
    pub fn fetch(client: &Client, url: &str) -> Result<Self, AppError> {
        let body = crate::data::fetch_text(client, url)?;
        Self::parse(&body)
    }

    pub fn parse(json: &str) -> Result<Self, AppError> {
        let collection: FeatureCollection = serde_json::from_str(json)
            .map_err(|e| AppError::runtime(format!("Invalid state boundaries GeoJSON: {e}")))?;

        let mut states = Vec::new();
        for feature in collection.features {
            let Some(uf) = feature
                .properties
                .get(UF_PROPERTY)
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_ascii_uppercase())
            else {
                continue;
            };

            let rings = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => exterior_rings(std::iter::once(coordinates)),
                Some(Geometry::MultiPolygon { coordinates }) => exterior_rings(coordinates),
                Some(Geometry::Other) | None => Vec::new(),
            };
            if rings.is_empty() {
                continue;
            }
            states.push(StateShape { uf, rings });
        }

        if states.is_empty() {
            return Err(AppError::runtime(format!(
                "State boundaries GeoJSON has no polygon features with a `{UF_PROPERTY}` property."
            )));
        }
        Ok(Self { states })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut b = Bounds {
            lon_min: f64::INFINITY,
            lon_max: f64::NEG_INFINITY,
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
        };
        for &(lon, lat) in self.states.iter().flat_map(|s| s.rings.iter().flatten()) {
            b.lon_min = b.lon_min.min(lon);
            b.lon_max = b.lon_max.max(lon);
            b.lat_min = b.lat_min.min(lat);
            b.lat_max = b.lat_max.max(lat);
        }
        let finite = [b.lon_min, b.lon_max, b.lat_min, b.lat_max].iter().all(|v| v.is_finite());
        if finite && b.lon_max > b.lon_min && b.lat_max > b.lat_min {
            Some(b)
        } else {
            None
        }
    }
}

fn exterior_rings(polygons: impl IntoIterator<Item = Vec<Vec<Vec<f64>>>>) -> Vec<Ring> {
    polygons
        .into_iter()
        .filter_map(|polygon| polygon.into_iter().next())
        .map(|ring| {
            ring.into_iter()
                .filter(|pos| pos.len() >= 2 && pos[0].is_finite() && pos[1].is_finite())
                .map(|pos| (pos[0], pos[1]))
                .collect::<Ring>()
        })
        .filter(|ring| ring.len() >= 3)
        .collect()
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: HashMap<String, serde_json::Value>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": { "SIGLA": "DF", "Estado": "Distrito Federal" },
          "geometry": { "type": "Polygon", "coordinates": [[[-48.3, -15.5], [-47.3, -15.5], [-47.3, -16.0], [-48.3, -16.0], [-48.3, -15.5]]] }
        },
        {
          "type": "Feature",
          "properties": { "SIGLA": "pe" },
          "geometry": { "type": "MultiPolygon", "coordinates": [
            [[[-41.0, -7.5], [-35.0, -7.5], [-35.0, -9.5], [-41.0, -9.5], [-41.0, -7.5]]],
            [[[-32.5, -3.8], [-32.3, -3.8], [-32.3, -3.9, 0.0], [-32.5, -3.8]]]
          ] }
        },
        {
          "type": "Feature",
          "properties": { "SIGLA": "XX" },
          "geometry": { "type": "Point", "coordinates": [-40.0, -10.0] }
        },
        {
          "type": "Feature",
          "properties": { "NOME": "sem sigla" },
          "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]] }
        }
      ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons() {
        let boundaries = StateBoundaries::parse(SAMPLE).unwrap();
        assert_eq!(boundaries.states.len(), 2);
        assert_eq!(boundaries.states[0].uf, "DF");
        assert_eq!(boundaries.states[0].rings.len(), 1);
        assert_eq!(boundaries.states[1].uf, "PE");
        assert_eq!(boundaries.states[1].rings.len(), 2);
    }

    #[test]
    fn bounds_cover_all_rings() {
        let boundaries = StateBoundaries::parse(SAMPLE).unwrap();
        let b = boundaries.bounds().unwrap();
        assert_eq!(b.lon_min, -48.3);
        assert_eq!(b.lon_max, -32.3);
        assert_eq!(b.lat_min, -16.0);
        assert_eq!(b.lat_max, -3.8);
    }

    #[test]
    fn rejects_collections_without_states() {
        let json = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(StateBoundaries::parse(json).is_err());
        assert!(StateBoundaries::parse("not json").is_err());
    }
}
