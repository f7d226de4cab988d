//! Song catalog routes: add, list, update, delete and lyrics paging

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{ApiError, AppState};
use crate::core::{LyricsLib, PageWindow, SongFilter, VersePage};
use crate::db::{is_unique_violation, ArtistTable, SongTable};
use crate::models::{Song, SongKey, SongShort, SongUpdate};
use crate::plugins::Enrichment;

const NO_TEXT: &str = "No text available for this song";

/// Query for the list endpoint; every value is taken raw and validated here
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub group: Option<String>,
    pub song: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Query addressing a single song
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub id_song: Option<String>,
    pub group: Option<String>,
    pub song: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextQuery {
    pub id_song: Option<String>,
    pub group: Option<String>,
    pub song: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the song key; `id_song` wins over the (group, song) pair
fn parse_key(
    id_song: Option<&str>,
    group: Option<&str>,
    song: Option<&str>,
) -> Result<SongKey, ApiError> {
    if let Some(raw) = non_empty(id_song) {
        return match raw.parse::<i64>() {
            Ok(id) if id >= 1 => Ok(SongKey::Id(id)),
            _ => Err(ApiError::validation("Invalid id_song parameter")),
        };
    }

    match (non_empty(group), non_empty(song)) {
        (Some(artist), Some(title)) => Ok(SongKey::Pair {
            artist: artist.to_string(),
            title: title.to_string(),
        }),
        _ => Err(ApiError::validation(
            "Either id_song or both group and song are required",
        )),
    }
}

impl KeyQuery {
    fn key(&self) -> Result<SongKey, ApiError> {
        parse_key(
            self.id_song.as_deref(),
            self.group.as_deref(),
            self.song.as_deref(),
        )
    }
}

impl ListQuery {
    fn filter(&self) -> SongFilter {
        SongFilter {
            artist: self.group.clone(),
            title: self.song.clone(),
            release_date: self.release_date.clone(),
            link: self.link.clone(),
            text: self.text.clone(),
        }
    }
}

async fn find_song(state: &AppState, key: &SongKey) -> Result<Song, ApiError> {
    SongTable::get(&state.db, key)
        .await?
        .ok_or_else(|| ApiError::not_found("Song not found"))
}

fn duplicate(artist: &str, title: &str) -> ApiError {
    ApiError::conflict(format!("Song '{}' by '{}' already exists", title, artist))
}

/// Add a song, pulling its details from the song details API
#[post("")]
pub async fn add_song(
    state: web::Data<AppState>,
    body: web::Json<SongShort>,
) -> Result<HttpResponse, ApiError> {
    let artist = body.artist.trim();
    let title = body.title.trim();
    if artist.is_empty() || title.is_empty() {
        return Err(ApiError::validation("group and song are required"));
    }

    let key = SongKey::Pair {
        artist: artist.to_string(),
        title: title.to_string(),
    };
    if SongTable::get(&state.db, &key).await?.is_some() {
        return Err(duplicate(artist, title));
    }

    let enrichment = state.details.fetch(artist, title).await?;
    if let Enrichment::Placeholder { reason, .. } = &enrichment {
        warn!(artist, title, ?reason, "Adding song with placeholder details");
    }
    let source = enrichment.source();
    let detail = enrichment.into_detail();

    let id_group = ArtistTable::get_or_insert(&state.db, artist).await?;
    let id_song = match SongTable::insert(&state.db, id_group, title, &detail).await {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => return Err(duplicate(artist, title)),
        Err(e) => return Err(e.into()),
    };

    let song = find_song(&state, &SongKey::Id(id_song)).await?;
    info!(song_id = id_song, artist, title, source, "Added song");

    Ok(HttpResponse::Created().json(json!({ "song": song, "details": source })))
}

/// List songs matching the filters, one page at a time
#[get("")]
pub async fn list_songs(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let window = PageWindow::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.config.list_default_limit,
    )?;

    let songs = SongTable::filtered(&state.db, &query.filter(), window).await?;
    if songs.is_empty() {
        return Err(ApiError::not_found("No songs found"));
    }

    Ok(HttpResponse::Ok().json(songs))
}

/// Update the fields present in the body
#[put("")]
pub async fn update_song(
    state: web::Data<AppState>,
    query: web::Query<KeyQuery>,
    body: web::Json<SongUpdate>,
) -> Result<HttpResponse, ApiError> {
    let key = query.key()?;
    let mut update = body.into_inner();
    if update.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    // artist and title may change but never to empty values
    for (name, value) in [("group", &mut update.artist), ("song", &mut update.title)] {
        if let Some(v) = value {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Err(ApiError::validation(format!("{} must not be empty", name)));
            }
            *v = trimmed.to_string();
        }
    }

    let song = find_song(&state, &key).await?;
    let artist = update.artist.as_deref().unwrap_or(&song.artist);
    let title = update.title.as_deref().unwrap_or(&song.title);

    if artist != song.artist || title != song.title {
        let target = SongKey::Pair {
            artist: artist.to_string(),
            title: title.to_string(),
        };
        if let Some(other) = SongTable::get(&state.db, &target).await? {
            if other.id_song != song.id_song {
                return Err(duplicate(artist, title));
            }
        }
    }

    let id_group = if artist != song.artist {
        Some(ArtistTable::get_or_insert(&state.db, artist).await?)
    } else {
        None
    };

    match SongTable::update(&state.db, song.id_song, id_group, &update).await {
        Ok(0) => return Err(ApiError::not_found("Song not found")),
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(duplicate(artist, title)),
        Err(e) => return Err(e.into()),
    }

    if id_group.is_some() {
        ArtistTable::delete_if_orphaned(&state.db, song.id_group).await?;
    }

    let updated = find_song(&state, &SongKey::Id(song.id_song)).await?;
    info!(song_id = song.id_song, "Updated song");

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("")]
pub async fn delete_song(
    state: web::Data<AppState>,
    query: web::Query<KeyQuery>,
) -> Result<HttpResponse, ApiError> {
    let key = query.key()?;
    let song = find_song(&state, &key).await?;

    if SongTable::delete(&state.db, song.id_song).await? == 0 {
        return Err(ApiError::not_found("Song not found"));
    }
    ArtistTable::delete_if_orphaned(&state.db, song.id_group).await?;
    info!(song_id = song.id_song, "Deleted song");

    Ok(HttpResponse::NoContent().finish())
}

/// One page of a song's verses as plain text
#[get("/text")]
pub async fn song_text(
    state: web::Data<AppState>,
    query: web::Query<TextQuery>,
) -> Result<HttpResponse, ApiError> {
    let key = parse_key(
        query.id_song.as_deref(),
        query.group.as_deref(),
        query.song.as_deref(),
    )?;
    let window = PageWindow::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.config.verse_default_limit,
    )?;

    let song = find_song(&state, &key).await?;
    debug!(
        song_id = song.id_song,
        verses = LyricsLib::verse_count(&song.lyrics),
        page = window.page(),
        "Serving lyrics page"
    );
    let body = match LyricsLib::paginate(&song.lyrics, window)? {
        VersePage::NoText => NO_TEXT.to_string(),
        VersePage::Verses(text) => text,
    };

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(body))
}

/// Configure song routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(song_text)
        .service(add_song)
        .service(list_songs)
        .service(update_song)
        .service(delete_song);
}
