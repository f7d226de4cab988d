//! Database module for the music library
//!
//! This module handles all database operations using SQLx with SQLite.

mod engine;
mod executor;
pub mod tables;

pub use engine::DbEngine;
pub use executor::{is_unique_violation, QueryExecutor};
pub use tables::*;
