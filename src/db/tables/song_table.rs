//! Song table operations

use anyhow::Result;
use tracing::debug;

use crate::core::{MatchPolicy, PageWindow, QueryBuilder, SongFilter, SqlQuery, SqlValue};
use crate::db::QueryExecutor;
use crate::models::{Song, SongDetail, SongKey, SongUpdate};

const SELECT_SONG: &str = "SELECT s.id_song, s.id_group, g.name AS artist, s.title, \
     s.release_date, s.lyrics, s.link \
     FROM song s JOIN artist g ON g.id_group = s.id_group";

const SELECT_DETAIL: &str = "SELECT s.release_date, s.lyrics, s.link \
     FROM song s JOIN artist g ON g.id_group = s.id_group";

/// Song table operations
pub struct SongTable;

impl SongTable {
    fn filtered_builder(filter: &SongFilter, window: PageWindow) -> QueryBuilder {
        filter
            .apply(QueryBuilder::new(SELECT_SONG), MatchPolicy::DISCOVERY)
            .order_by("s.id_song")
            .paginate(window)
    }

    /// Get one page of songs matching `filter`, in ID order
    pub async fn filtered(
        db: &impl QueryExecutor,
        filter: &SongFilter,
        window: PageWindow,
    ) -> Result<Vec<Song>> {
        let builder = Self::filtered_builder(filter, window);
        debug!(
            filters = builder.predicate_count(),
            unfiltered = filter.is_empty(),
            page = window.page(),
            limit = window.limit(),
            "Listing songs"
        );
        db.fetch_all(&builder.build()).await
    }

    /// Get a song by ID or by exact (artist, title)
    pub async fn get(db: &impl QueryExecutor, key: &SongKey) -> Result<Option<Song>> {
        let query = match key {
            SongKey::Id(id) => SqlQuery::new(
                format!("{} WHERE s.id_song = ?1", SELECT_SONG),
                vec![SqlValue::Integer(*id)],
            ),
            SongKey::Pair { artist, title } => SongFilter::by_pair(artist, title)
                .apply(QueryBuilder::new(SELECT_SONG), MatchPolicy::EXACT)
                .build(),
        };
        db.fetch_optional(&query).await
    }

    /// Get release date, lyrics and link by exact (artist, title)
    pub async fn detail(
        db: &impl QueryExecutor,
        artist: &str,
        title: &str,
    ) -> Result<Option<SongDetail>> {
        let query = SongFilter::by_pair(artist, title)
            .apply(QueryBuilder::new(SELECT_DETAIL), MatchPolicy::EXACT)
            .build();
        db.fetch_optional(&query).await
    }

    /// Insert a song for an existing artist
    pub async fn insert(
        db: &impl QueryExecutor,
        id_group: i64,
        title: &str,
        detail: &SongDetail,
    ) -> Result<i64> {
        let query = SqlQuery::new(
            "INSERT INTO song (id_group, title, release_date, lyrics, link) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            vec![
                id_group.into(),
                title.into(),
                detail.release_date.as_str().into(),
                detail.lyrics.as_str().into(),
                detail.link.as_str().into(),
            ],
        );
        let result = db.execute(&query).await?;
        Ok(result.last_insert_rowid())
    }

    /// Replace the fields present in `update`; returns rows affected
    pub async fn update(
        db: &impl QueryExecutor,
        id_song: i64,
        id_group: Option<i64>,
        update: &SongUpdate,
    ) -> Result<u64> {
        let query = SqlQuery::new(
            "UPDATE song SET \
             id_group = COALESCE(?1, id_group), \
             title = COALESCE(?2, title), \
             release_date = COALESCE(?3, release_date), \
             lyrics = COALESCE(?4, lyrics), \
             link = COALESCE(?5, link) \
             WHERE id_song = ?6",
            vec![
                id_group.into(),
                update.title.clone().into(),
                update.release_date.clone().into(),
                update.lyrics.clone().into(),
                update.link.clone().into(),
                id_song.into(),
            ],
        );
        let result = db.execute(&query).await?;
        Ok(result.rows_affected())
    }

    /// Delete a song by ID; returns rows affected
    pub async fn delete(db: &impl QueryExecutor, id_song: i64) -> Result<u64> {
        let query = SqlQuery::new("DELETE FROM song WHERE id_song = ?1", vec![id_song.into()]);
        let result = db.execute(&query).await?;
        Ok(result.rows_affected())
    }

    /// Get song count
    pub async fn count(db: &impl QueryExecutor) -> Result<i64> {
        let query = SqlQuery::new("SELECT COUNT(*) FROM song", Vec::new());
        let row: Option<(i64,)> = db.fetch_optional(&query).await?;
        Ok(row.map_or(0, |(count,)| count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::ArtistTable;
    use crate::db::{is_unique_violation, DbEngine};

    fn detail(release_date: &str) -> SongDetail {
        SongDetail {
            release_date: release_date.to_string(),
            lyrics: "verse one\n\nverse two".to_string(),
            link: format!("https://example.com/{}", release_date),
        }
    }

    async fn add(db: &DbEngine, artist: &str, title: &str, release_date: &str) -> i64 {
        let id_group = ArtistTable::get_or_insert(db, artist).await.unwrap();
        SongTable::insert(db, id_group, title, &detail(release_date))
            .await
            .unwrap()
    }

    fn window(page: u32, limit: u32) -> PageWindow {
        PageWindow::new(page, limit).unwrap()
    }

    #[tokio::test]
    async fn test_filtered_pages_in_id_order() {
        let db = DbEngine::in_memory().await.unwrap();

        // interleave non-matching rows so the filter actually matters
        let mut queen_ids = Vec::new();
        for i in 1..=7 {
            queen_ids.push(add(&db, "Queen", &format!("Song {}", i), "1975-10-31").await);
            add(&db, "Muse", &format!("Track {}", i), "2006-06-19").await;
        }

        let filter = SongFilter {
            artist: Some("Queen".to_string()),
            ..SongFilter::default()
        };
        let page = SongTable::filtered(&db, &filter, window(2, 3)).await.unwrap();

        let ids: Vec<i64> = page.iter().map(|s| s.id_song).collect();
        assert_eq!(ids, queen_ids[3..6].to_vec());
        assert_eq!(page[0].title, "Song 4");
        assert!(page.iter().all(|s| s.artist == "Queen"));

        let last = SongTable::filtered(&db, &filter, window(3, 3)).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].title, "Song 7");
    }

    #[tokio::test]
    async fn test_filtered_substring_is_case_insensitive() {
        let db = DbEngine::in_memory().await.unwrap();
        add(&db, "Queen", "Bohemian Rhapsody", "1975-10-31").await;
        add(&db, "Queen", "Under Pressure", "1981-10-26").await;
        add(&db, "Muse", "Uprising", "2009-09-07").await;

        let filter = SongFilter {
            title: Some("RHAPS".to_string()),
            ..SongFilter::default()
        };
        let songs = SongTable::filtered(&db, &filter, window(1, 10)).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Bohemian Rhapsody");

        let filter = SongFilter {
            text: Some("VERSE TWO".to_string()),
            ..SongFilter::default()
        };
        let songs = SongTable::filtered(&db, &filter, window(1, 10)).await.unwrap();
        assert_eq!(songs.len(), 3);
    }

    #[tokio::test]
    async fn test_filtered_release_date_is_exact() {
        let db = DbEngine::in_memory().await.unwrap();
        add(&db, "Queen", "Bohemian Rhapsody", "1975-10-31").await;
        add(&db, "Queen", "Under Pressure", "1981-10-26").await;

        let partial = SongFilter {
            release_date: Some("1975".to_string()),
            ..SongFilter::default()
        };
        assert!(SongTable::filtered(&db, &partial, window(1, 10))
            .await
            .unwrap()
            .is_empty());

        let exact = SongFilter {
            release_date: Some("1981-10-26".to_string()),
            ..SongFilter::default()
        };
        let songs = SongTable::filtered(&db, &exact, window(1, 10)).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Under Pressure");
    }

    #[tokio::test]
    async fn test_wildcards_match_literally() {
        let db = DbEngine::in_memory().await.unwrap();
        add(&db, "Band", "100% Pure", "2000-01-01").await;
        add(&db, "Band", "1000 Pure", "2000-01-01").await;

        let filter = SongFilter {
            title: Some("0%".to_string()),
            ..SongFilter::default()
        };
        let songs = SongTable::filtered(&db, &filter, window(1, 10)).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "100% Pure");
    }

    #[tokio::test]
    async fn test_filtered_empty_catalog() {
        let db = DbEngine::in_memory().await.unwrap();
        let songs = SongTable::filtered(&db, &SongFilter::default(), window(1, 3))
            .await
            .unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let db = DbEngine::in_memory().await.unwrap();
        for n in 1..=3 {
            add(&db, "Queen", &format!("Song {}", n), "1975-10-31").await;
        }

        let far = window(u32::MAX, 3_000_000_000);
        let songs = SongTable::filtered(&db, &SongFilter::default(), far)
            .await
            .unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_and_pair() {
        let db = DbEngine::in_memory().await.unwrap();
        let id = add(&db, "Queen", "Bohemian Rhapsody", "1975-10-31").await;

        let by_id = SongTable::get(&db, &SongKey::Id(id)).await.unwrap().unwrap();
        let by_pair = SongTable::get(
            &db,
            &SongKey::Pair {
                artist: "Queen".to_string(),
                title: "Bohemian Rhapsody".to_string(),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(by_id, by_pair);
        assert_eq!(by_id.release_date, "1975-10-31");

        // lookups by pair are exact, not substring
        let partial = SongKey::Pair {
            artist: "Queen".to_string(),
            title: "Bohemian".to_string(),
        };
        assert!(SongTable::get(&db, &partial).await.unwrap().is_none());
        assert!(SongTable::get(&db, &SongKey::Id(id + 100))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_detail() {
        let db = DbEngine::in_memory().await.unwrap();
        add(&db, "Queen", "Bohemian Rhapsody", "1975-10-31").await;

        let found = SongTable::detail(&db, "Queen", "Bohemian Rhapsody")
            .await
            .unwrap();
        assert_eq!(found, Some(detail("1975-10-31")));
        assert!(SongTable::detail(&db, "queen", "Bohemian Rhapsody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let db = DbEngine::in_memory().await.unwrap();
        let id_group = ArtistTable::get_or_insert(&db, "Queen").await.unwrap();
        SongTable::insert(&db, id_group, "Innuendo", &detail("1991-01-14"))
            .await
            .unwrap();

        let err = SongTable::insert(&db, id_group, "Innuendo", &detail("1991-01-14"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_update_only_present_fields() {
        let db = DbEngine::in_memory().await.unwrap();
        let id = add(&db, "Queen", "Bohemian Rhapsody", "1975-10-31").await;

        let update = SongUpdate {
            link: Some("https://new.example.com".to_string()),
            ..SongUpdate::default()
        };
        assert_eq!(SongTable::update(&db, id, None, &update).await.unwrap(), 1);

        let song = SongTable::get(&db, &SongKey::Id(id)).await.unwrap().unwrap();
        assert_eq!(song.link, "https://new.example.com");
        assert_eq!(song.title, "Bohemian Rhapsody");
        assert_eq!(song.release_date, "1975-10-31");

        let muse = ArtistTable::get_or_insert(&db, "Muse").await.unwrap();
        SongTable::update(&db, id, Some(muse), &SongUpdate::default())
            .await
            .unwrap();
        let song = SongTable::get(&db, &SongKey::Id(id)).await.unwrap().unwrap();
        assert_eq!(song.artist, "Muse");

        assert_eq!(
            SongTable::update(&db, id + 1, None, &update).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let db = DbEngine::in_memory().await.unwrap();
        let id = add(&db, "Queen", "Bohemian Rhapsody", "1975-10-31").await;
        assert_eq!(SongTable::count(&db).await.unwrap(), 1);

        assert_eq!(SongTable::delete(&db, id).await.unwrap(), 1);
        assert_eq!(SongTable::delete(&db, id).await.unwrap(), 0);
        assert_eq!(SongTable::count(&db).await.unwrap(), 0);
    }
}
