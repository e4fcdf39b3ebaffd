//! Great-circle distance between home and a feature geometry.

use geo::{Centroid, Contains, Coord, CoordsIter, Geometry, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Distance to another coordinate in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        calculate_distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Calculate distance between two coordinates in kilometers
///
/// Uses Haversine formula for accuracy on Earth's surface
pub fn calculate_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance from `home` to the geometry in kilometers.
///
/// Points and lines measure to the nearest vertex. Polygons are 0 when home
/// lies inside the outer ring. Returns `f64::INFINITY` for empty geometries.
pub fn distance_to_geometry(home: &Coordinate, geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Polygon(polygon) => distance_to_polygon(home, polygon),
        Geometry::MultiPolygon(polygons) => polygons
            .0
            .iter()
            .map(|polygon| distance_to_polygon(home, polygon))
            .fold(f64::INFINITY, f64::min),
        Geometry::GeometryCollection(collection) => collection
            .0
            .iter()
            .map(|g| distance_to_geometry(home, g))
            .fold(f64::INFINITY, f64::min),
        other => nearest_vertex(home, other.coords_iter()),
    }
}

/// A representative `(lat, lon)` for the geometry: its centroid.
pub fn representative_coordinate(geometry: &Geometry<f64>) -> Option<Coordinate> {
    geometry.centroid().map(|point| Coordinate::from(point.0))
}

fn nearest_vertex(home: &Coordinate, coords: impl Iterator<Item = Coord<f64>>) -> f64 {
    coords
        .map(|c| home.distance_km(&Coordinate::from(c)))
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_polygon(home: &Coordinate, polygon: &Polygon<f64>) -> f64 {
    // Holes do not count; only the outer ring decides containment
    let outer = Polygon::new(polygon.exterior().clone(), Vec::new());
    if outer.contains(&geo::Point::from(*home)) {
        return 0.0;
    }
    nearest_vertex(home, polygon.exterior().coords().copied())
}
