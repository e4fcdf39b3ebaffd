//! The incident entry model.
//!
//! An [`Entry`] is built once per feature per poll and never changes after
//! that. Every property lookup is total: a missing key or a JSON `null`
//! becomes `None`, never an error and never an empty string.

use chrono::{DateTime, Utc};
use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::Html;
use serde::Serialize;
use serde_json::Value;

use crate::consts::{
    Category, ATTRIBUTION, ATTR_CATEGORY1, ATTR_CATEGORY2, ATTR_DESCRIPTION, ATTR_ESTA_ID, ATTR_ID,
    ATTR_LOCATION, ATTR_PUB_DATE, ATTR_RESOURCES, ATTR_SIZE, ATTR_SIZE_FMT, ATTR_SOURCE_ORG,
    ATTR_SOURCE_TITLE, ATTR_STATEWIDE, ATTR_STATUS, ATTR_TEXT, ATTR_TYPE, ATTR_WEB_BODY,
    CUSTOM_ATTRIBUTE, STATEWIDE_TOKENS,
};
use crate::distance::{distance_to_geometry, representative_coordinate, Coordinate};
use crate::geojson::Feature;
use crate::timestamp::parse_publication_date;

/// What the diffing collaborator needs from any feed entry.
pub trait FeedEntry {
    /// Identity key, stable across polls.
    fn external_id(&self) -> Option<&str>;

    /// When the source last updated this entry.
    fn publication_date(&self) -> Option<DateTime<Utc>>;

    /// Distance from the configured home in kilometers.
    fn distance_to_home(&self) -> f64;

    /// Representative location of the entry.
    fn coordinates(&self) -> Option<Coordinate>;

    /// Attribution to show alongside the entry.
    fn attribution(&self) -> Option<&str> {
        None
    }
}

/// One incident from the VicEmergency feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: Option<String>,
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub title: Option<String>,
    pub source_organisation: Option<String>,
    pub source_organisation_title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub feed_type: Option<String>,
    pub size: Option<String>,
    pub size_formatted: Option<String>,

    /// Raw flag; only `"Y"` means statewide.
    pub statewide: Option<String>,

    pub resources: Option<String>,
    pub esta_id: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,

    /// Advisory body as published.
    pub advisory_html: Option<String>,

    /// Advisory body converted to Markdown. Present exactly when
    /// `advisory_html` is.
    pub advisory_markdown: Option<String>,

    pub coordinates: Option<Coordinate>,

    /// `f64::INFINITY` when the feature has no usable geometry.
    pub distance_to_home: f64,
}

impl Entry {
    /// Build an entry from one feature, measuring distance from `home`.
    pub fn new(home: &Coordinate, feature: &Feature) -> Self {
        let props = Properties(feature);

        let id = props
            .string(ATTR_ID)
            .filter(|id| !id.is_empty())
            .or_else(|| feature.id.as_ref().and_then(value_to_string))
            .filter(|id| !id.is_empty());

        let publication_date = props.string(ATTR_PUB_DATE).and_then(|raw| {
            let parsed = parse_publication_date(&raw);
            if parsed.is_none() && !raw.is_empty() {
                tracing::warn!(id = ?id, updated = %raw, "Unparseable publication date");
            }
            parsed
        });

        let advisory_html = props.string(ATTR_WEB_BODY);
        let advisory_markdown = advisory_html.as_deref().map(html_to_markdown);

        let geometry = feature.geometry.as_ref().map(|g| g.to_geo());
        let (coordinates, distance_to_home) = match &geometry {
            Some(geometry) => (
                representative_coordinate(geometry),
                distance_to_geometry(home, geometry),
            ),
            None => (None, f64::INFINITY),
        };

        Self {
            id,
            category1: props.string(ATTR_CATEGORY1),
            category2: props.string(ATTR_CATEGORY2),
            title: props.string(ATTR_SOURCE_TITLE),
            source_organisation: props.string(ATTR_SOURCE_ORG),
            source_organisation_title: props.string(ATTR_SOURCE_TITLE),
            description: props.string(ATTR_DESCRIPTION),
            text: props.string(ATTR_TEXT),
            location: props.string(ATTR_LOCATION),
            status: props.string(ATTR_STATUS),
            feed_type: props.string(ATTR_TYPE),
            size: props.string(ATTR_SIZE),
            size_formatted: props.string(ATTR_SIZE_FMT),
            statewide: props.string(ATTR_STATEWIDE),
            resources: props.string(ATTR_RESOURCES),
            esta_id: props.string(ATTR_ESTA_ID),
            publication_date,
            advisory_html,
            advisory_markdown,
            coordinates,
            distance_to_home,
        }
    }

    /// Whether the incident is flagged as applying to the whole state.
    pub fn is_statewide(&self) -> bool {
        self.statewide
            .as_deref()
            .is_some_and(|flag| STATEWIDE_TOKENS.contains(&flag))
    }

    /// `category1` parsed into the known vocabulary, if it is part of it.
    pub fn known_category1(&self) -> Option<Category> {
        self.category1.as_deref().and_then(|c| c.parse().ok())
    }

    /// `category2` parsed into the known vocabulary, if it is part of it.
    pub fn known_category2(&self) -> Option<Category> {
        self.category2.as_deref().and_then(|c| c.parse().ok())
    }

    /// Find the `custom_attribute` capture group of `pattern` in the
    /// description.
    pub fn search_in_description(&self, pattern: &Regex) -> Option<String> {
        let description = self.description.as_deref()?;
        pattern
            .captures(description)?
            .name(CUSTOM_ATTRIBUTE)
            .map(|m| m.as_str().to_string())
    }
}

impl FeedEntry for Entry {
    fn external_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn publication_date(&self) -> Option<DateTime<Utc>> {
        self.publication_date
    }

    fn distance_to_home(&self) -> f64 {
        self.distance_to_home
    }

    fn coordinates(&self) -> Option<Coordinate> {
        self.coordinates
    }

    fn attribution(&self) -> Option<&str> {
        Some(ATTRIBUTION)
    }
}

/// Typed view over a feature's property map.
struct Properties<'a>(&'a Feature);

impl Properties<'_> {
    fn string(&self, key: &str) -> Option<String> {
        self.0.property(key).and_then(value_to_string)
    }
}

/// Render a loosely-typed property value as text.
///
/// Strings come back verbatim, scalars as their JSON text, arrays and
/// objects as compact JSON.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Convert advisory HTML to Markdown, dropping scripts and styles.
fn html_to_markdown(html: &str) -> String {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style"])
        .build();

    converter.convert(html).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Advisory conversion failed, falling back to plain text");
        plain_text(html)
    })
}

/// Text content of an HTML fragment with every tag removed.
fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
