//! Feed adapter.
//!
//! Glues the decoder, entry model and filter pipeline into the single call a
//! polling framework makes per cycle: document in, filtered entries and the
//! newest publication date out. No I/O happens here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::FEED_URL;
use crate::distance::Coordinate;
use crate::entry::{Entry, FeedEntry};
use crate::error::Result;
use crate::filter::{FilterConfig, FilterPipeline};
use crate::geojson::FeatureCollection;

/// Everything a consumer configures about the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Where distances are measured from.
    pub home: Coordinate,

    #[serde(default)]
    pub filter: FilterConfig,
}

impl FeedConfig {
    pub fn new(home: impl Into<Coordinate>) -> Self {
        Self {
            home: home.into(),
            filter: FilterConfig::default(),
        }
    }

    /// Replace the filter settings.
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }
}

/// Result of ingesting one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedUpdate {
    /// Newest publication date among the surviving entries.
    pub latest_timestamp: Option<DateTime<Utc>>,

    /// Features decoded before filtering.
    pub total_features: usize,

    /// Surviving entries in document order.
    pub entries: Vec<Entry>,
}

impl FeedUpdate {
    /// True when no entry survived filtering.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The VicEmergency incidents feed.
#[derive(Debug)]
pub struct IncidentsFeed {
    config: FeedConfig,
    pipeline: FilterPipeline,
}

impl IncidentsFeed {
    pub fn new(config: FeedConfig) -> Self {
        let pipeline = FilterPipeline::from_config(&config.filter);
        Self { config, pipeline }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Map and filter one decoded document.
    pub fn ingest(&self, document: &FeatureCollection) -> FeedUpdate {
        let entries: Vec<Entry> = document
            .features
            .iter()
            .map(|feature| Entry::new(&self.config.home, feature))
            .collect();

        let entries = self.pipeline.apply(entries);
        let latest_timestamp = extract_last_timestamp(&entries);

        tracing::debug!(
            total = document.len(),
            kept = entries.len(),
            latest = ?latest_timestamp,
            "Ingested feed document"
        );

        FeedUpdate {
            latest_timestamp,
            total_features: document.len(),
            entries,
        }
    }

    /// Decode a document from its JSON text, then ingest it.
    pub fn ingest_str(&self, body: &str) -> Result<FeedUpdate> {
        let document = FeatureCollection::from_json(body)?;
        Ok(self.ingest(&document))
    }
}

impl fmt::Display for IncidentsFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = &self.config.filter;
        write!(
            f,
            "<IncidentsFeed(home={}, url={}, radius={:?}, include={:?}, exclude={:?}, statewide={})>",
            self.config.home,
            FEED_URL,
            filter.max_radius_km,
            filter.include_categories,
            filter.exclude_categories,
            filter.include_statewide,
        )
    }
}

/// Newest publication date among `entries`, ignoring entries without one.
pub fn extract_last_timestamp<E: FeedEntry>(entries: &[E]) -> Option<DateTime<Utc>> {
    entries.iter().filter_map(FeedEntry::publication_date).max()
}
