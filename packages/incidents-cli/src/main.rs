//! `incidents` - run a saved VicEmergency feed document through the filter
//! pipeline and print the surviving entries as JSON.
//!
//! Settings come from the environment (see [`config::Config`]) and can be
//! overridden per flag. Logs go to stderr so stdout stays parseable.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vicemergency_incidents::IncidentsFeed;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "incidents")]
#[command(about = "Filter a VicEmergency incidents GeoJSON document")]
struct Cli {
    /// Saved feed document (reads stdin when omitted)
    path: Option<PathBuf>,

    /// Home latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Home longitude
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Drop incidents further than this from home (km)
    #[arg(long)]
    radius_km: Option<f64>,

    /// Only keep these categories (repeat or comma separate)
    #[arg(long = "include", value_delimiter = ',')]
    include: Vec<String>,

    /// Drop these categories (repeat or comma separate)
    #[arg(long = "exclude", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Keep statewide incidents
    #[arg(long, overrides_with = "no_include_statewide")]
    include_statewide: bool,

    /// Drop statewide incidents, even when the environment keeps them
    #[arg(long, overrides_with = "include_statewide")]
    no_include_statewide: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    /// Layer flag values over the environment config
    fn apply(&self, mut config: Config) -> Config {
        if self.lat.is_some() {
            config.home_latitude = self.lat;
        }
        if self.lon.is_some() {
            config.home_longitude = self.lon;
        }
        if self.radius_km.is_some() {
            config.filter.max_radius_km = self.radius_km;
        }
        if !self.include.is_empty() {
            config.filter = config.filter.including(self.include.iter().cloned());
        }
        if !self.exclude.is_empty() {
            config.filter = config.filter.excluding(self.exclude.iter().cloned());
        }
        if self.include_statewide {
            config.filter.include_statewide = true;
        } else if self.no_include_statewide {
            config.filter.include_statewide = false;
        }
        config
    }
}

fn read_document(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read stdin")?;
            Ok(body)
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vicemergency_incidents=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = cli.apply(Config::from_env().context("Failed to load configuration")?);
    let feed = IncidentsFeed::new(config.into_feed_config()?);
    tracing::info!(feed = %feed, "Configuration loaded");

    let body = read_document(cli.path.as_ref())?;
    let update = feed
        .ingest_str(&body)
        .context("Failed to ingest feed document")?;

    tracing::info!(
        total = update.total_features,
        kept = update.entries.len(),
        latest = ?update.latest_timestamp,
        "Feed document processed"
    );

    let output = if cli.pretty {
        serde_json::to_string_pretty(&update)?
    } else {
        serde_json::to_string(&update)?
    };
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vicemergency_incidents::FilterConfig;

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "incidents",
            "--lat",
            "-37.81",
            "--lon",
            "144.96",
            "--exclude",
            "Advice,Not Applicable",
            "--include-statewide",
        ]);

        let env = Config {
            home_latitude: Some(-36.0),
            home_longitude: None,
            filter: Default::default(),
        };
        let feed = cli.apply(env).into_feed_config().unwrap();

        assert_eq!(feed.home.latitude, -37.81);
        assert_eq!(feed.home.longitude, 144.96);
        assert_eq!(
            feed.filter.exclude_categories,
            Some(["Advice".to_string(), "Not Applicable".to_string()].into())
        );
        assert!(feed.filter.include_statewide);
        assert!(cli.path.is_none());
    }

    #[test]
    fn test_statewide_flag_overrides_environment_both_ways() {
        let env = Config {
            filter: FilterConfig::new().with_statewide(true),
            ..Default::default()
        };

        let cli = Cli::parse_from(["incidents", "--no-include-statewide"]);
        assert!(!cli.apply(env.clone()).filter.include_statewide);

        let cli = Cli::parse_from(["incidents"]);
        assert!(cli.apply(env.clone()).filter.include_statewide);

        // Last flag wins
        let cli = Cli::parse_from(["incidents", "--no-include-statewide", "--include-statewide"]);
        assert!(cli.apply(env).filter.include_statewide);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
