//! Data models for the music library

mod song;

pub use song::{Song, SongDetail, SongKey, SongShort, SongUpdate};
