use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use vicemergency_incidents::{Coordinate, FeedConfig, FilterConfig};

/// Feed configuration loaded from environment variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub home_latitude: Option<f64>,
    pub home_longitude: Option<f64>,
    pub filter: FilterConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let include = lookup("FILTER_INCLUDE_CATEGORIES").map(|v| parse_list(&v));
        let exclude = lookup("FILTER_EXCLUDE_CATEGORIES").map(|v| parse_list(&v));

        Ok(Self {
            home_latitude: parse_opt(&lookup, "HOME_LATITUDE")?,
            home_longitude: parse_opt(&lookup, "HOME_LONGITUDE")?,
            filter: FilterConfig {
                max_radius_km: parse_opt(&lookup, "FILTER_RADIUS_KM")?,
                include_categories: include.filter(|set| !set.is_empty()),
                exclude_categories: exclude.filter(|set| !set.is_empty()),
                include_statewide: lookup("FILTER_INCLUDE_STATEWIDE")
                    .map(|v| parse_bool(&v))
                    .transpose()
                    .context("FILTER_INCLUDE_STATEWIDE must be true or false")?
                    .unwrap_or(false),
            },
        })
    }

    /// Resolve into a feed config; the home coordinate is required
    pub fn into_feed_config(self) -> Result<FeedConfig> {
        let latitude = self
            .home_latitude
            .context("home latitude must be set (HOME_LATITUDE or --lat)")?;
        let longitude = self
            .home_longitude
            .context("home longitude must be set (HOME_LONGITUDE or --lon)")?;

        Ok(FeedConfig::new(Coordinate::new(latitude, longitude)).with_filter(self.filter))
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{} must be a valid number", key))
}

fn parse_list(value: &str) -> std::collections::BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" | "" => Ok(false),
        other => Err(anyhow!("invalid boolean: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_environment() {
        let config = Config::from_lookup(lookup(&[
            ("HOME_LATITUDE", "-37.81"),
            ("HOME_LONGITUDE", "144.96"),
            ("FILTER_RADIUS_KM", "50"),
            ("FILTER_EXCLUDE_CATEGORIES", "Advice, Not Applicable"),
            ("FILTER_INCLUDE_STATEWIDE", "yes"),
        ]))
        .unwrap();

        let feed = config.into_feed_config().unwrap();
        assert_eq!(feed.home, Coordinate::new(-37.81, 144.96));
        assert_eq!(feed.filter.max_radius_km, Some(50.0));
        assert_eq!(feed.filter.include_categories, None);
        assert_eq!(
            feed.filter.exclude_categories,
            Some(["Advice".to_string(), "Not Applicable".to_string()].into())
        );
        assert!(feed.filter.include_statewide);
    }

    #[test]
    fn test_empty_environment_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.into_feed_config().is_err());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("FILTER_RADIUS_KM", "far")])).is_err());
        assert!(Config::from_lookup(lookup(&[("FILTER_INCLUDE_STATEWIDE", "maybe")])).is_err());
    }

    #[test]
    fn test_blank_category_list_is_unset() {
        let config = Config::from_lookup(lookup(&[("FILTER_INCLUDE_CATEGORIES", " , ")])).unwrap();
        assert_eq!(config.filter.include_categories, None);
    }
}
