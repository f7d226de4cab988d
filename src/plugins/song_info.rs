//! Song details lookup against an external API
//!
//! A failed lookup falls back to placeholder details instead of failing the
//! caller, but the fallback is always reported through [`Enrichment`] so it
//! can be logged and asserted on.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::models::SongDetail;

const USER_AGENT: &str = concat!("musiclib/", env!("CARGO_PKG_VERSION"));

/// Why placeholder details were used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// No API URL configured
    NotConfigured,
    /// The request could not be completed
    Unreachable(String),
    /// The API answered 200 with a body that held no usable details
    Undecodable(String),
}

/// Outcome of a details lookup that did not hard-fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Enriched(SongDetail),
    Placeholder {
        detail: SongDetail,
        reason: PlaceholderReason,
    },
}

impl Enrichment {
    fn placeholder(reason: PlaceholderReason) -> Self {
        Enrichment::Placeholder {
            detail: SongDetail::placeholder(),
            reason,
        }
    }

    pub fn into_detail(self) -> SongDetail {
        match self {
            Enrichment::Enriched(detail) => detail,
            Enrichment::Placeholder { detail, .. } => detail,
        }
    }

    /// Short label for API responses
    pub fn source(&self) -> &'static str {
        match self {
            Enrichment::Enriched(_) => "external",
            Enrichment::Placeholder { .. } => "placeholder",
        }
    }
}

/// The API answered, but with a status that rules out adding the song
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    #[error("Song details not found")]
    NotFound,
    #[error("Failed to fetch song details")]
    Status(u16),
}

/// Details API response; any field may be missing
#[derive(Debug, Default, Deserialize)]
struct DetailResponse {
    #[serde(default, alias = "releaseDate")]
    release_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Client for the song details API
#[derive(Debug, Clone)]
pub struct SongInfoProvider {
    client: Client,
    base_url: String,
}

impl SongInfoProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.external_api_url.clone(),
            config.external_api_timeout(),
        )
    }

    /// Look up details for a song.
    ///
    /// Transport and decoding failures produce placeholders; a 404 or other
    /// non-success status from the API is an error.
    pub async fn fetch(&self, artist: &str, title: &str) -> Result<Enrichment, EnrichmentError> {
        if self.base_url.is_empty() {
            warn!("Song details API URL not configured, using placeholders");
            return Ok(Enrichment::placeholder(PlaceholderReason::NotConfigured));
        }

        debug!(url = %self.base_url, artist, title, "Fetching song details");

        let resp = match self
            .client
            .get(&self.base_url)
            .query(&[("group", artist), ("song", title)])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Failed to call song details API, using placeholders: {}", e);
                return Ok(Enrichment::placeholder(PlaceholderReason::Unreachable(
                    e.to_string(),
                )));
            }
        };

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            warn!(artist, title, "Song details API has no such song");
            return Err(EnrichmentError::NotFound);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Song details API returned an error status");
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        match resp.bytes().await {
            Ok(body) => Ok(decode_detail(&body)),
            Err(e) => {
                warn!("Failed to read song details response, using placeholders: {}", e);
                Ok(Enrichment::placeholder(PlaceholderReason::Unreachable(
                    e.to_string(),
                )))
            }
        }
    }
}

/// Merge a details response over the placeholders. Fields the response
/// lacks keep their placeholder value.
fn decode_detail(body: &[u8]) -> Enrichment {
    let response: DetailResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to decode song details, using placeholders: {}", e);
            return Enrichment::placeholder(PlaceholderReason::Undecodable(e.to_string()));
        }
    };

    if response.release_date.is_none() && response.text.is_none() && response.link.is_none() {
        warn!("Song details response was empty, using placeholders");
        return Enrichment::placeholder(PlaceholderReason::Undecodable(
            "response had no song details".to_string(),
        ));
    }

    let mut detail = SongDetail::placeholder();
    if let Some(release_date) = response.release_date {
        detail.release_date = release_date;
    }
    if let Some(text) = response.text {
        detail.lyrics = text;
    }
    if let Some(link) = response.link {
        detail.link = link;
    }

    Enrichment::Enriched(detail)
}
