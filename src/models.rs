//! Data models for the Araimo TV playlist browser

use serde::{Deserialize, Serialize};

/// Category assigned to channels whose metadata line has no `group-title`
pub const DEFAULT_GROUP: &str = "General";

/// Pseudo category that matches every channel
pub const ALL_CATEGORY: &str = "All";

/// One playable playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Display name; empty when the metadata line had no comma
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub group: String,
    pub url: String,
    // Request headers for the player
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub cookie: Option<String>,
}
