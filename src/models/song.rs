//! Song model

use serde::{Deserialize, Serialize};

/// A song in the catalog, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    /// Database ID
    pub id_song: i64,
    /// Owning artist ID
    pub id_group: i64,
    /// Artist (group) name
    #[serde(rename = "group")]
    pub artist: String,
    /// Song title
    #[serde(rename = "song")]
    pub title: String,
    /// Release date, kept as opaque text
    pub release_date: String,
    /// Lyrics, verses separated by a blank line
    #[serde(rename = "text")]
    pub lyrics: String,
    /// Link to the song
    pub link: String,
}

/// Artist and title of a song to add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongShort {
    #[serde(rename = "group", default)]
    pub artist: String,
    #[serde(rename = "song", default)]
    pub title: String,
}

/// Details of a song beyond its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SongDetail {
    #[serde(alias = "releaseDate")]
    pub release_date: String,
    #[serde(rename = "text")]
    pub lyrics: String,
    pub link: String,
}

impl SongDetail {
    /// Stand-in details used when the external lookup gives nothing usable
    pub fn placeholder() -> Self {
        Self {
            release_date: "2024-11-25".to_string(),
            lyrics: "Text Placeholder Verse1\n\nText Placeholder Verse2\n\nText Placeholder Verse3"
                .to_string(),
            link: "Link Placeholder".to_string(),
        }
    }
}

/// How a request addresses a single song
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongKey {
    Id(i64),
    Pair { artist: String, title: String },
}

/// Field-level update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongUpdate {
    #[serde(rename = "group", default)]
    pub artist: Option<String>,
    #[serde(rename = "song", default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(rename = "text", default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SongUpdate {
    pub fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.title.is_none()
            && self.release_date.is_none()
            && self.lyrics.is_none()
            && self.link.is_none()
    }
}
