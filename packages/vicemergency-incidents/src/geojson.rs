//! Minimal GeoJSON document decoder.
//!
//! Only the parts of RFC 7946 the incidents feed uses: a `FeatureCollection`
//! of features, each with an optional geometry and a free-form property map.
//! Features that fail to decode are skipped with a warning so one bad record
//! cannot sink the whole document. A geometry that fails to decode only
//! costs its own feature the geometry.
//!
//! Decoded geometries convert into [`geo::Geometry`] for spatial work.

use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::distance::Coordinate;
use crate::error::{FeedError, Result};

/// A GeoJSON position: `[longitude, latitude]` with an optional altitude.
pub type Position = Vec<f64>;

/// Geometry of a feature, as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// A point geometry at the given coordinate.
    pub fn point(coordinate: Coordinate) -> Self {
        Geometry::Point {
            coordinates: vec![coordinate.longitude, coordinate.latitude],
        }
    }

    /// A single-ring polygon from `(lat, lon)` vertices.
    pub fn polygon(ring: impl IntoIterator<Item = Coordinate>) -> Self {
        Geometry::Polygon {
            coordinates: vec![ring
                .into_iter()
                .map(|c| vec![c.longitude, c.latitude])
                .collect()],
        }
    }

    /// Convert into a [`geo::Geometry`]. Positions with fewer than two
    /// ordinates are dropped.
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Geometry::Point { coordinates } => match position_to_coord(coordinates) {
                Some(coord) => geo::Geometry::Point(coord.into()),
                None => geo::Geometry::MultiPoint(MultiPoint(Vec::new())),
            },
            Geometry::MultiPoint { coordinates } => geo::Geometry::MultiPoint(MultiPoint(
                coordinates
                    .iter()
                    .filter_map(|p| position_to_coord(p))
                    .map(geo::Point::from)
                    .collect(),
            )),
            Geometry::LineString { coordinates } => {
                geo::Geometry::LineString(line_string(coordinates))
            }
            Geometry::MultiLineString { coordinates } => geo::Geometry::MultiLineString(
                MultiLineString(coordinates.iter().map(|l| line_string(l)).collect()),
            ),
            Geometry::Polygon { coordinates } => geo::Geometry::Polygon(polygon(coordinates)),
            Geometry::MultiPolygon { coordinates } => geo::Geometry::MultiPolygon(MultiPolygon(
                coordinates.iter().map(|p| polygon(p)).collect(),
            )),
            Geometry::GeometryCollection { geometries } => geo::Geometry::GeometryCollection(
                geo::GeometryCollection(geometries.iter().map(Geometry::to_geo).collect()),
            ),
        }
    }
}

fn position_to_coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [lon, lat, ..] => Some(Coord { x: *lon, y: *lat }),
        _ => None,
    }
}

fn line_string(positions: &[Position]) -> LineString<f64> {
    LineString(
        positions
            .iter()
            .filter_map(|p| position_to_coord(p))
            .collect(),
    )
}

fn polygon(rings: &[Vec<Position>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(|ring| line_string(ring));
    let exterior = rings.next().unwrap_or_else(|| LineString(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

/// One feature of the document: geometry plus loosely-typed properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    /// Look up a property, treating JSON `null` the same as a missing key.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(key))
            .filter(|value| !value.is_null())
    }
}

/// Decode a geometry, turning anything unsupported or malformed into `None`.
fn lenient_geometry<'de, D>(deserializer: D) -> std::result::Result<Option<Geometry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match serde_json::from_value::<Geometry>(value) {
        Ok(geometry) => Ok(Some(geometry)),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring undecodable geometry");
            Ok(None)
        }
    }
}

/// A decoded feature collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Decode a document from its JSON text.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Decode a document from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(FeedError::InvalidDocument {
                reason: "document is not a JSON object".to_string(),
            });
        };

        match object.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {}
            Some(other) => {
                return Err(FeedError::InvalidDocument {
                    reason: format!("expected FeatureCollection, found {}", other),
                })
            }
            None => {
                return Err(FeedError::InvalidDocument {
                    reason: "missing type member".to_string(),
                })
            }
        }

        let raw_features = match object.remove("features") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(FeedError::InvalidDocument {
                    reason: "features member is not an array".to_string(),
                })
            }
        };

        let mut features = Vec::with_capacity(raw_features.len());
        for (index, raw) in raw_features.into_iter().enumerate() {
            match serde_json::from_value::<Feature>(raw) {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping undecodable feature");
                }
            }
        }

        Ok(Self { features })
    }

    /// Encode back into a GeoJSON document value.
    pub fn to_value(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|feature| {
                let mut value = serde_json::to_value(feature).unwrap_or(Value::Null);
                if let Value::Object(object) = &mut value {
                    object.insert("type".to_string(), Value::from("Feature"));
                }
                value
            })
            .collect();

        serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self::new(features)
    }
}
