//! The filter pipeline.
//!
//! Each stage is an independent keep/drop predicate built from
//! [`FilterConfig`]. Stages whose setting is unset are not built at all, so
//! an empty config passes every entry through. Active stages always run in
//! the order radius, include-category, exclude-category, statewide.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::entry::Entry;

/// Consumer-side filter settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Drop entries further than this from home (km).
    #[serde(default)]
    pub max_radius_km: Option<f64>,

    /// Only keep entries whose `category1` is listed (unset or empty = all).
    #[serde(default)]
    pub include_categories: Option<BTreeSet<String>>,

    /// Drop entries whose `category1` is listed.
    #[serde(default)]
    pub exclude_categories: Option<BTreeSet<String>>,

    /// Keep statewide entries. Default: false.
    #[serde(default)]
    pub include_statewide: bool,
}

impl FilterConfig {
    /// Create a config that passes everything except statewide entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum radius from home.
    pub fn with_max_radius_km(mut self, km: f64) -> Self {
        self.max_radius_km = Some(km);
        self
    }

    /// Only keep these categories.
    pub fn including(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include_categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Drop these categories.
    pub fn excluding(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude_categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Set whether statewide entries are kept.
    pub fn with_statewide(mut self, include: bool) -> Self {
        self.include_statewide = include;
        self
    }
}

/// A single keep/drop predicate over entries.
pub trait EntryFilter: fmt::Debug + Send + Sync {
    /// Stage name for logging.
    fn name(&self) -> &'static str;

    /// Whether the entry survives this stage.
    fn keep(&self, entry: &Entry) -> bool;
}

/// Drops entries further from home than the configured radius.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusFilter {
    max_km: f64,
}

impl RadiusFilter {
    pub fn new(max_km: f64) -> Self {
        Self { max_km }
    }

    pub fn from_config(config: &FilterConfig) -> Option<Self> {
        config.max_radius_km.map(Self::new)
    }
}

impl EntryFilter for RadiusFilter {
    fn name(&self) -> &'static str {
        "radius"
    }

    fn keep(&self, entry: &Entry) -> bool {
        entry.distance_to_home <= self.max_km
    }
}

/// Keeps only entries whose `category1` is in the allow-list.
///
/// An entry without `category1` never matches.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeCategoryFilter {
    categories: BTreeSet<String>,
}

impl IncludeCategoryFilter {
    pub fn new(categories: BTreeSet<String>) -> Self {
        Self { categories }
    }

    pub fn from_config(config: &FilterConfig) -> Option<Self> {
        non_empty(&config.include_categories).map(Self::new)
    }
}

impl EntryFilter for IncludeCategoryFilter {
    fn name(&self) -> &'static str {
        "include_category"
    }

    fn keep(&self, entry: &Entry) -> bool {
        entry
            .category1
            .as_ref()
            .is_some_and(|c| self.categories.contains(c))
    }
}

/// Drops entries whose `category1` is in the deny-list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludeCategoryFilter {
    categories: BTreeSet<String>,
}

impl ExcludeCategoryFilter {
    pub fn new(categories: BTreeSet<String>) -> Self {
        Self { categories }
    }

    pub fn from_config(config: &FilterConfig) -> Option<Self> {
        non_empty(&config.exclude_categories).map(Self::new)
    }
}

impl EntryFilter for ExcludeCategoryFilter {
    fn name(&self) -> &'static str {
        "exclude_category"
    }

    fn keep(&self, entry: &Entry) -> bool {
        entry
            .category1
            .as_ref()
            .map_or(true, |c| !self.categories.contains(c))
    }
}

/// Drops statewide entries. Only built when statewide entries are excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatewideFilter;

impl StatewideFilter {
    pub fn from_config(config: &FilterConfig) -> Option<Self> {
        (!config.include_statewide).then_some(Self)
    }
}

impl EntryFilter for StatewideFilter {
    fn name(&self) -> &'static str {
        "statewide"
    }

    fn keep(&self, entry: &Entry) -> bool {
        !entry.is_statewide()
    }
}

fn non_empty(set: &Option<BTreeSet<String>>) -> Option<BTreeSet<String>> {
    set.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Ordered chain of active filter stages.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    stages: Vec<Box<dyn EntryFilter>>,
}

impl FilterPipeline {
    /// Build the active stages for a config, in their fixed order.
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut stages: Vec<Box<dyn EntryFilter>> = Vec::with_capacity(4);

        if let Some(stage) = RadiusFilter::from_config(config) {
            stages.push(Box::new(stage));
        }
        if let Some(stage) = IncludeCategoryFilter::from_config(config) {
            stages.push(Box::new(stage));
        }
        if let Some(stage) = ExcludeCategoryFilter::from_config(config) {
            stages.push(Box::new(stage));
        }
        if let Some(stage) = StatewideFilter::from_config(config) {
            stages.push(Box::new(stage));
        }

        Self { stages }
    }

    /// A pipeline with explicit stages, run in the given order.
    pub fn with_stages(stages: Vec<Box<dyn EntryFilter>>) -> Self {
        Self { stages }
    }

    /// Names of the active stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Whether a single entry survives every stage.
    pub fn keeps(&self, entry: &Entry) -> bool {
        self.stages.iter().all(|stage| stage.keep(entry))
    }

    /// Reduce entries to the survivors, preserving relative order.
    pub fn apply(&self, mut entries: Vec<Entry>) -> Vec<Entry> {
        for stage in &self.stages {
            let before = entries.len();
            entries.retain(|entry| stage.keep(entry));
            tracing::debug!(
                stage = stage.name(),
                before,
                kept = entries.len(),
                "Applied filter stage"
            );
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Coordinate;
    use crate::testing::FeatureBuilder;

    const HOME: Coordinate = Coordinate::new(-37.81, 144.96);

    fn entry(builder: FeatureBuilder) -> Entry {
        Entry::new(&HOME, &builder.build())
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().filter_map(|e| e.id.as_deref()).collect()
    }

    #[test]
    fn test_default_config_only_builds_statewide_stage() {
        let pipeline = FilterPipeline::from_config(&FilterConfig::new());
        assert_eq!(pipeline.stage_names(), vec!["statewide"]);

        let pipeline = FilterPipeline::from_config(&FilterConfig::new().with_statewide(true));
        assert!(pipeline.stage_names().is_empty());
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let config = FilterConfig::new()
            .with_statewide(false)
            .excluding(["Advice"])
            .including(["Watch and Act"])
            .with_max_radius_km(10.0);

        assert_eq!(
            FilterPipeline::from_config(&config).stage_names(),
            vec!["radius", "include_category", "exclude_category", "statewide"]
        );
    }

    #[test]
    fn test_empty_category_sets_are_inactive() {
        let config = FilterConfig::new()
            .including(Vec::<String>::new())
            .excluding(Vec::<String>::new())
            .with_statewide(true);
        assert!(FilterPipeline::from_config(&config).stage_names().is_empty());
    }

    #[test]
    fn test_radius_filter() {
        let filter = RadiusFilter::new(50.0);
        let near = entry(FeatureBuilder::new().point(Coordinate::new(-37.9, 145.0)));
        let far = entry(FeatureBuilder::new().point(Coordinate::new(-36.0, 146.0)));
        let nowhere = entry(FeatureBuilder::new());

        assert!(filter.keep(&near));
        assert!(!filter.keep(&far));
        assert!(!filter.keep(&nowhere));
    }

    #[test]
    fn test_include_category_filter() {
        let filter = IncludeCategoryFilter::new(["Advice".to_string()].into());

        assert!(filter.keep(&entry(FeatureBuilder::new().incident("a", "Advice"))));
        assert!(!filter.keep(&entry(FeatureBuilder::new().incident("b", "Watch and Act"))));
        assert!(!filter.keep(&entry(FeatureBuilder::new().property("id", "c"))));
    }

    #[test]
    fn test_exclude_category_filter() {
        let filter = ExcludeCategoryFilter::new(["Advice".to_string()].into());

        assert!(!filter.keep(&entry(FeatureBuilder::new().incident("a", "Advice"))));
        assert!(filter.keep(&entry(FeatureBuilder::new().incident("b", "Watch and Act"))));
        assert!(filter.keep(&entry(FeatureBuilder::new().property("id", "c"))));
    }

    #[test]
    fn test_statewide_default_drops_flagged_entries() {
        let flagged = entry(FeatureBuilder::new().property("statewide", "Y"));
        let unflagged = entry(FeatureBuilder::new().property("statewide", "N"));

        let excluding = FilterPipeline::from_config(&FilterConfig::new());
        assert!(!excluding.keeps(&flagged));
        assert!(excluding.keeps(&unflagged));

        let including = FilterPipeline::from_config(&FilterConfig::new().with_statewide(true));
        assert!(including.keeps(&flagged));
    }

    #[test]
    fn test_apply_preserves_order() {
        let entries = vec![
            entry(FeatureBuilder::new().incident("1", "Advice")),
            entry(FeatureBuilder::new().incident("2", "Emergency Warning")),
            entry(FeatureBuilder::new().incident("3", "Advice")),
            entry(FeatureBuilder::new().incident("4", "Not Applicable")),
            entry(FeatureBuilder::new().incident("5", "Watch and Act")),
        ];

        let config = FilterConfig::new().excluding(["Not Applicable", "Emergency Warning"]);
        let kept = FilterPipeline::from_config(&config).apply(entries);
        assert_eq!(ids(&kept), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_custom_stage_order() {
        let pipeline = FilterPipeline::with_stages(vec![
            Box::new(StatewideFilter),
            Box::new(ExcludeCategoryFilter::new(["Advice".to_string()].into())),
        ]);
        assert_eq!(pipeline.stage_names(), vec!["statewide", "exclude_category"]);

        let entries = vec![
            entry(FeatureBuilder::new().incident("1", "Advice")),
            entry(
                FeatureBuilder::new()
                    .incident("2", "Watch and Act")
                    .property("statewide", "Y"),
            ),
            entry(FeatureBuilder::new().incident("3", "Watch and Act")),
        ];
        assert_eq!(ids(&pipeline.apply(entries)), vec!["3"]);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: FilterConfig =
            serde_json::from_str(r#"{"exclude_categories": ["Advice"]}"#).unwrap();

        assert_eq!(config.max_radius_km, None);
        assert_eq!(config.include_categories, None);
        assert_eq!(
            config.exclude_categories,
            Some(BTreeSet::from(["Advice".to_string()]))
        );
        assert!(!config.include_statewide);
    }
}
