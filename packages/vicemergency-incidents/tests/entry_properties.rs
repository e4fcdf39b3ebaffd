//! Property-based tests for the entry model.
//!
//! - Every property accessor is total: a missing key or a `null` value is
//!   absent, never an error and never an empty string
//! - Present values come back verbatim (strings) or as JSON text (scalars)

use proptest::prelude::*;
use serde_json::Value;
use vicemergency_incidents::testing::FeatureBuilder;
use vicemergency_incidents::{Coordinate, Entry};

const HOME: Coordinate = Coordinate::new(-37.81, 144.96);

const KEYS: [&str; 16] = [
    "id",
    "category1",
    "category2",
    "sourceTitle",
    "sourceOrg",
    "description",
    "text",
    "location",
    "status",
    "feedtype",
    "size",
    "sizefmt",
    "statewide",
    "resources",
    "estaid",
    "webBody",
];

/// Every entry field read from `key`.
fn fields(entry: &Entry, key: &str) -> Vec<Option<String>> {
    match key {
        "id" => vec![entry.id.clone()],
        "category1" => vec![entry.category1.clone()],
        "category2" => vec![entry.category2.clone()],
        "sourceTitle" => vec![entry.title.clone(), entry.source_organisation_title.clone()],
        "sourceOrg" => vec![entry.source_organisation.clone()],
        "description" => vec![entry.description.clone()],
        "text" => vec![entry.text.clone()],
        "location" => vec![entry.location.clone()],
        "status" => vec![entry.status.clone()],
        "feedtype" => vec![entry.feed_type.clone()],
        "size" => vec![entry.size.clone()],
        "sizefmt" => vec![entry.size_formatted.clone()],
        "statewide" => vec![entry.statewide.clone()],
        "resources" => vec![entry.resources.clone()],
        "estaid" => vec![entry.esta_id.clone()],
        "webBody" => vec![entry.advisory_html.clone()],
        other => panic!("no field reads {}", other),
    }
}

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

/// `None` leaves the key out of the feature entirely.
fn property_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        "[a-zA-Z0-9][a-zA-Z0-9 ]{0,11}".prop_map(|s| Some(Value::String(s))),
        any::<i32>().prop_map(|n| Some(Value::from(n))),
        any::<bool>().prop_map(|b| Some(Value::from(b))),
    ]
}

fn properties_strategy() -> impl Strategy<Value = Vec<Option<Value>>> {
    prop::collection::vec(property_strategy(), KEYS.len())
}

fn expected(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

// =============================================================================
// ACCESSOR PROPERTIES
// =============================================================================

proptest! {
    /// Missing and null keys are absent; present keys are rendered as text
    #[test]
    fn accessors_are_total(values in properties_strategy()) {
        let feature = KEYS
            .iter()
            .zip(&values)
            .fold(FeatureBuilder::new(), |builder, (key, value)| match value {
                Some(value) => builder.property(*key, value.clone()),
                None => builder,
            })
            .build();
        let entry = Entry::new(&HOME, &feature);

        for (key, value) in KEYS.iter().zip(&values) {
            for field in fields(&entry, key) {
                prop_assert_ne!(field.as_deref(), Some(""));
                prop_assert_eq!(field, expected(value), "key {}", key);
            }
        }

        prop_assert_eq!(entry.advisory_markdown.is_some(), entry.advisory_html.is_some());
    }
}
