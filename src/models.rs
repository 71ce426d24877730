// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound body of a clan summary request
#[derive(Debug)]
pub struct ClanRequest {
    pub clan_tag: Option<String>,
}

impl ClanRequest {
    /// Any well-formed JSON is accepted; only a non-empty string `clanTag` counts as a tag.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        let clan_tag = value
            .get("clanTag")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(Self { clan_tag })
    }
}

/// Clan metadata as returned by `GET /v1/clans/{tag}`
#[derive(Debug, Clone, Deserialize)]
pub struct ClanDetails {
    pub name: Option<String>,
    pub tag: Option<String>,

    #[serde(rename = "clanLevel")]
    pub clan_level: Option<u32>,

    pub members: Option<u32>, // member count, not the roster
}

/// One roster entry from `GET /v1/clans/{tag}/members`
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub donations: u64,

    #[serde(default, rename = "donationsReceived")]
    pub donations_received: u64,
}

#[derive(Debug, Deserialize)]
pub struct MemberList {
    pub items: Vec<MemberRecord>,
}

/// Condensed clan view returned to the caller
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClanSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub leader: String,
    pub donations: u64,
    pub received: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}
