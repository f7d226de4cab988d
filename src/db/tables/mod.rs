//! Database table operations

mod artist_table;
mod song_table;

pub use artist_table::ArtistTable;
pub use song_table::SongTable;
