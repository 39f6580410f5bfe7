// Wire types for the snip server API.
// Field names match the server's JSON exactly.

use serde::{Deserialize, Serialize};

/// One short link. `expiry_time` is epoch seconds; zero means never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub shortlink: String,
    pub longlink: String,
    pub hits: i64,
    pub expiry_time: i64,
    #[serde(default)]
    pub ad_id: Option<i64>,
}

/// One interstitial ad, shown before a link resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub ad_link: String,
    pub expiry_time: i64,
    pub countdown_seconds: i64,
}

/// Lighter projection of the ad collection used to label link associations
/// and fill the ad picker. Refetched in full on demand, never paginated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSummary {
    pub id: i64,
    pub name: String,
}

/// Payload for `POST /api/new`. An empty shortlink asks the server to
/// generate one.
#[derive(Debug, Clone, Serialize)]
pub struct NewLinkRequest {
    pub shortlink: String,
    pub longlink: String,
    pub expiry_delay: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<i64>,
}

/// Payload for `PUT /api/edit`. `ad_id: None` clears the association, so it
/// is always serialized.
#[derive(Debug, Clone, Serialize)]
pub struct EditLinkRequest {
    pub shortlink: String,
    pub longlink: String,
    pub reset_hits: bool,
    pub ad_id: Option<i64>,
}

/// Payload for creating or editing an ad.
#[derive(Debug, Clone, Serialize)]
pub struct AdRequest {
    pub name: String,
    pub image_url: String,
    pub ad_link: String,
    pub expiry_delay: i64,
    pub countdown_seconds: i64,
}

/// Server-side settings the console needs, from `GET /api/getconfig`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub version: String,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub allow_capital_letters: bool,
}
