//! VicEmergency Incidents Feed
//!
//! Turns one fetched VicEmergency GeoJSON document into a filtered list of
//! typed incident entries, ready for a polling framework to diff against the
//! previous cycle.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vicemergency_incidents::{Coordinate, FeedConfig, FilterConfig, IncidentsFeed};
//!
//! let config = FeedConfig::new(Coordinate::new(-37.81, 144.96))
//!     .with_filter(FilterConfig::new().with_max_radius_km(50.0).excluding(["Advice"]));
//! let feed = IncidentsFeed::new(config);
//!
//! let update = feed.ingest_str(&body)?;
//! for entry in &update.entries {
//!     println!("{:?} {:?}", entry.id, entry.category1);
//! }
//! ```
//!
//! # Modules
//!
//! - [`consts`] - Property keys, category vocabulary and feed constants
//! - [`geojson`] - Minimal GeoJSON document decoder
//! - [`distance`] - Great-circle distance from home to a geometry
//! - [`timestamp`] - Publication date normalization
//! - [`entry`] - The incident entry model
//! - [`filter`] - The filter pipeline
//! - [`feed`] - Feed adapter gluing the pieces together
//! - [`testing`] - Fixture builders for tests

pub mod consts;
pub mod distance;
pub mod entry;
pub mod error;
pub mod feed;
pub mod filter;
pub mod geojson;
pub mod testing;
pub mod timestamp;

pub use consts::{Category, ATTRIBUTION, FEED_URL};
pub use distance::{calculate_distance_km, Coordinate};
pub use entry::{Entry, FeedEntry};
pub use error::{FeedError, Result};
pub use feed::{extract_last_timestamp, FeedConfig, FeedUpdate, IncidentsFeed};
pub use filter::{
    EntryFilter, ExcludeCategoryFilter, FilterConfig, FilterPipeline, IncludeCategoryFilter,
    RadiusFilter, StatewideFilter,
};
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use timestamp::parse_publication_date;
