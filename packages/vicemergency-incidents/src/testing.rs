//! Testing utilities for building feed fixtures.
//!
//! Useful for exercising the entry model and filter pipeline without a
//! captured feed document.

use serde_json::{Map, Value};

use crate::distance::Coordinate;
use crate::geojson::{Feature, FeatureCollection, Geometry};

/// Builder for a single feature.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    id: Option<Value>,
    geometry: Option<Geometry>,
    properties: Map<String, Value>,
}

impl FeatureBuilder {
    /// Start a feature with no geometry and no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feature-level identifier.
    pub fn feature_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Place the feature at a point.
    pub fn point(mut self, coordinate: Coordinate) -> Self {
        self.geometry = Some(Geometry::point(coordinate));
        self
    }

    /// Use an arbitrary geometry.
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Add a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the properties most tests care about.
    pub fn incident(self, id: &str, category1: &str) -> Self {
        self.property("id", id).property("category1", category1)
    }

    pub fn build(self) -> Feature {
        Feature {
            id: self.id,
            geometry: self.geometry,
            properties: Some(self.properties),
        }
    }
}

/// Wrap built features into a document.
pub fn collection(features: impl IntoIterator<Item = FeatureBuilder>) -> FeatureCollection {
    FeatureCollection::new(features.into_iter().map(FeatureBuilder::build).collect())
}
