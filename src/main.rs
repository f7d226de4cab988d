//! musiclib - an online song catalog grouped by artist
//!
//! Songs are added by artist and title, enriched from an external details API,
//! listed with filters and pagination, and their lyrics served verse by verse.

mod api;
mod config;
mod core;
mod db;
mod models;
mod plugins;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::api::AppState;
use crate::config::{Paths, ServiceConfig};
use crate::db::{ArtistTable, DbEngine, SongTable};

/// musiclib - song catalog service
#[derive(Parser, Debug)]
#[command(name = "musiclib")]
#[command(version)]
#[command(about = "An online song catalog grouped by artist")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug; sqlx query logs are too noisy below warn
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("musiclib v{} starting...", env!("CARGO_PKG_VERSION"));

    let paths = Paths::new(args.config, args.database)?;
    info!("Config directory: {:?}", paths.config_dir());

    let mut config = ServiceConfig::load(&paths.settings_path())?;
    config.apply_env();
    if !config.has_external_api() {
        warn!("No song details API configured; new songs get placeholder details");
    }

    let db = DbEngine::connect(paths.db_path(), config.max_connections).await?;
    info!(
        "Catalog holds {} artists and {} songs",
        ArtistTable::count(&db).await?,
        SongTable::count(&db).await?
    );

    serve(args.host, args.port, AppState::new(db, config)).await
}

async fn serve(host: String, port: u16, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    info!("Server listening on http://{}", addr);

    let state = web::Data::new(state);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(state.clone())
            .app_data(api::json_config())
            .configure(api::configure)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await?;

    Ok(())
}
