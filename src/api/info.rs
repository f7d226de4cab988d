//! Song details lookup by exact artist and title

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::db::SongTable;

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub group: Option<String>,
    pub song: Option<String>,
}

/// Release date, lyrics and link of one song
#[get("")]
pub async fn song_info(
    state: web::Data<AppState>,
    query: web::Query<InfoQuery>,
) -> Result<HttpResponse, ApiError> {
    let artist = query.group.as_deref().map(str::trim).unwrap_or_default();
    let title = query.song.as_deref().map(str::trim).unwrap_or_default();
    if artist.is_empty() || title.is_empty() {
        return Err(ApiError::validation("group and song are required"));
    }

    let detail = SongTable::detail(&state.db, artist, title)
        .await?
        .ok_or_else(|| ApiError::not_found("Song not found"))?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Configure info routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(song_info);
}
