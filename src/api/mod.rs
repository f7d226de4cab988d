//! REST API routes for the music library

pub mod error;
pub mod info;
pub mod songs;

use actix_web::web;

use crate::config::ServiceConfig;
use crate::db::DbEngine;
use crate::plugins::SongInfoProvider;

pub use error::ApiError;

/// Shared state handed to every handler
pub struct AppState {
    pub db: DbEngine,
    pub details: SongInfoProvider,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(db: DbEngine, config: ServiceConfig) -> Self {
        let details = SongInfoProvider::from_config(&config);
        Self {
            db,
            details,
            config,
        }
    }
}

/// JSON extractor config that reports body errors in the API error shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::validation(format!("Invalid request body: {}", err)).into()
    })
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Song catalog routes
        .service(web::scope("/songs").configure(songs::configure))
        // Song details lookup
        .service(web::scope("/info").configure(info::configure));
}
