//! Property keys, category vocabulary and feed-level constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ATTR_CATEGORY1: &str = "category1";
pub const ATTR_CATEGORY2: &str = "category2";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_ID: &str = "id";
pub const ATTR_PUB_DATE: &str = "updated";
pub const ATTR_SOURCE_TITLE: &str = "sourceTitle";
pub const ATTR_SOURCE_ORG: &str = "sourceOrg";
pub const ATTR_ESTA_ID: &str = "estaid";
pub const ATTR_RESOURCES: &str = "resources";
pub const ATTR_SIZE: &str = "size";
pub const ATTR_SIZE_FMT: &str = "sizefmt";
pub const ATTR_LOCATION: &str = "location";
pub const ATTR_TEXT: &str = "text";
pub const ATTR_STATUS: &str = "status";
pub const ATTR_TYPE: &str = "feedtype";
pub const ATTR_STATEWIDE: &str = "statewide";
pub const ATTR_WEB_BODY: &str = "webBody";

/// Name of the capture group used by [`crate::Entry::search_in_description`].
pub const CUSTOM_ATTRIBUTE: &str = "custom_attribute";

/// Attribution reported for every entry.
pub const ATTRIBUTION: &str = "VICEmergency";

/// Public endpoint of the incidents feed. Fetching it is the caller's job.
pub const FEED_URL: &str = "http://emergency.vic.gov.au/public/osom-geojson.json";

/// Values of the `statewide` property that flag an incident as statewide.
pub const STATEWIDE_TOKENS: &[&str] = &["Y"];

/// The known warning categories.
///
/// The feed may emit values outside this list; entries keep those as raw
/// strings and this enum is only a convenience for matching known ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Emergency Warning")]
    EmergencyWarning,
    #[serde(rename = "Watch and Act")]
    WatchAndAct,
    #[serde(rename = "Advice")]
    Advice,
    #[serde(rename = "Not Applicable")]
    NotApplicable,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::EmergencyWarning,
        Category::WatchAndAct,
        Category::Advice,
        Category::NotApplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EmergencyWarning => "Emergency Warning",
            Category::WatchAndAct => "Watch and Act",
            Category::Advice => "Advice",
            Category::NotApplicable => "Not Applicable",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A category string outside the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);
