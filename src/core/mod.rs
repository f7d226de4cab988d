//! Core query and pagination logic
//!
//! Everything here is pure: no I/O, no shared state.

pub mod filter_query;
pub mod lyrics;
pub mod pagination;

pub use filter_query::{MatchPolicy, QueryBuilder, SongFilter, SqlQuery, SqlValue};
pub use lyrics::{LyricsLib, VerseError, VersePage};
pub use pagination::{PageWindow, ValidationError};
