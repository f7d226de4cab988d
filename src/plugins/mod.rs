//! External providers used by the music library

pub mod song_info;

pub use song_info::{Enrichment, EnrichmentError, SongInfoProvider};
