use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Transaction};
use std::time::Duration;
use tracing::{debug, error, info};

use super::{EntityFilter, ListingStore, ShowFilter};
use crate::config::DatabaseConfig;
use crate::error::{EntityKind, ListingError, Result};
use crate::models::{
    Area, Artist, ArtistPatch, NewArtist, NewShow, NewVenue, Show, ShowListing, ShowPatch, Venue,
    VenuePatch,
};

const VENUE_COLUMNS: &str = "id, name, genres, address, city, state, phone, image_link, \
     facebook_link, website, seeking_talent, seeking_description";

const ARTIST_COLUMNS: &str = "id, name, city, state, phone, genres, image_link, \
     facebook_link, website, seeking_venue, seeking_description";

const SHOW_LISTING_SELECT: &str = r#"
    SELECT s.id, s.start_time,
           v.id AS venue_id, v.name AS venue_name, v.image_link AS venue_image_link,
           a.id AS artist_id, a.name AS artist_name, a.image_link AS artist_image_link
    FROM shows s
    JOIN venues v ON v.id = s.venue_id
    JOIN artists a ON a.id = s.artist_id
    WHERE TRUE"#;

// Логируем ошибку БД и превращаем её в StoreUnavailable
fn store_error(op: &'static str) -> impl Fn(sqlx::Error) -> ListingError {
    move |e| {
        error!("{} sql error: {:?}", op, e);
        ListingError::StoreUnavailable(e)
    }
}

/// ILIKE-шаблон для подстроки: экранируем спецсимволы LIKE
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_entity_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &EntityFilter) {
    if let Some(term) = &filter.name_contains {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(term));
    }
    if let Some(city) = &filter.city {
        qb.push(" AND city = ").push_bind(city.clone());
    }
    if let Some(state) = &filter.state {
        qb.push(" AND state = ").push_bind(state.clone());
    }
    qb.push(" ORDER BY id");
}

/// Хранилище на PostgreSQL. Каждая запись выполняется в своей транзакции.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(
        url: &str,
        config: &DatabaseConfig,
    ) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url)
            .await?;
        info!(
            "Connected to PostgreSQL (pool size {}, acquire timeout {}s)",
            config.pool_size, config.acquire_timeout_secs
        );
        Ok(Self::new(pool))
    }

    /// Схема встроена в бинарник из src/migrations
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        info!("Running listing migrations");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    async fn begin(&self, op: &'static str) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(store_error(op))
    }

    /// Блокирует artist и venue до конца транзакции, чтобы параллельное
    /// удаление не оставило show без родителя
    async fn lock_parents(
        tx: &mut Transaction<'static, Postgres>,
        artist_id: i64,
        venue_id: i64,
    ) -> Result<()> {
        let artist: Option<i64> =
            sqlx::query_scalar("SELECT id FROM artists WHERE id = $1 FOR KEY SHARE")
                .bind(artist_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(store_error("lock_parents"))?;
        if artist.is_none() {
            return Err(ListingError::ForeignKey {
                entity: EntityKind::Artist,
                id: artist_id,
            });
        }

        let venue: Option<i64> =
            sqlx::query_scalar("SELECT id FROM venues WHERE id = $1 FOR KEY SHARE")
                .bind(venue_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(store_error("lock_parents"))?;
        if venue.is_none() {
            return Err(ListingError::ForeignKey {
                entity: EntityKind::Venue,
                id: venue_id,
            });
        }
        Ok(())
    }

    async fn commit(tx: Transaction<'static, Postgres>, op: &'static str) -> Result<()> {
        tx.commit().await.map_err(store_error(op))
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn insert_venue(&self, venue: NewVenue) -> Result<Venue> {
        let mut tx = self.begin("insert_venue").await?;
        let sql = format!(
            "INSERT INTO venues (name, genres, address, city, state, phone, image_link, \
             facebook_link, website, seeking_talent, seeking_description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            VENUE_COLUMNS
        );
        let created = sqlx::query_as::<_, Venue>(&sql)
            .bind(&venue.name)
            .bind(&venue.genres)
            .bind(&venue.address)
            .bind(&venue.city)
            .bind(&venue.state)
            .bind(&venue.phone)
            .bind(&venue.image_link)
            .bind(&venue.facebook_link)
            .bind(&venue.website)
            .bind(venue.seeking_talent)
            .bind(&venue.seeking_description)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error("insert_venue"))?;
        Self::commit(tx, "insert_venue").await?;

        info!("Venue {} '{}' listed", created.id, created.name);
        Ok(created)
    }

    async fn get_venue(&self, id: i64) -> Result<Venue> {
        let sql = format!("SELECT {} FROM venues WHERE id = $1", VENUE_COLUMNS);
        sqlx::query_as::<_, Venue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("get_venue"))?
            .ok_or_else(|| {
                debug!("venue {} not found", id);
                ListingError::not_found(EntityKind::Venue, id)
            })
    }

    async fn update_venue(&self, id: i64, patch: VenuePatch) -> Result<Venue> {
        let mut tx = self.begin("update_venue").await?;
        let sql = format!("SELECT {} FROM venues WHERE id = $1 FOR UPDATE", VENUE_COLUMNS);
        let current = sqlx::query_as::<_, Venue>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error("update_venue"))?
            .ok_or_else(|| ListingError::not_found(EntityKind::Venue, id))?;

        // Невалидный результат - транзакция откатится при drop
        let updated = patch.apply(&current)?;

        sqlx::query(
            r#"
            UPDATE venues
            SET name = $2, genres = $3, address = $4, city = $5, state = $6, phone = $7,
                image_link = $8, facebook_link = $9, website = $10,
                seeking_talent = $11, seeking_description = $12
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&updated.name)
        .bind(&updated.genres)
        .bind(&updated.address)
        .bind(&updated.city)
        .bind(&updated.state)
        .bind(&updated.phone)
        .bind(&updated.image_link)
        .bind(&updated.facebook_link)
        .bind(&updated.website)
        .bind(updated.seeking_talent)
        .bind(&updated.seeking_description)
        .execute(&mut *tx)
        .await
        .map_err(store_error("update_venue"))?;
        Self::commit(tx, "update_venue").await?;

        info!("Venue {} updated", id);
        Ok(updated)
    }

    async fn delete_venue(&self, id: i64) -> Result<u64> {
        let mut tx = self.begin("delete_venue").await?;

        // FOR UPDATE ждёт конкурентные insert_show с FOR KEY SHARE на этой строке
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM venues WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_error("delete_venue"))?;
        if locked.is_none() {
            tx.rollback().await.map_err(store_error("delete_venue"))?;
            return Err(ListingError::not_found(EntityKind::Venue, id));
        }

        let shows = sqlx::query("DELETE FROM shows WHERE venue_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("delete_venue"))?
            .rows_affected();

        sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("delete_venue"))?;
        Self::commit(tx, "delete_venue").await?;

        info!("Venue {} deleted together with {} shows", id, shows);
        Ok(shows)
    }

    async fn list_venues(&self) -> Result<Vec<Venue>> {
        self.filter_venues(&EntityFilter::default()).await
    }

    async fn filter_venues(&self, filter: &EntityFilter) -> Result<Vec<Venue>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM venues WHERE TRUE",
            VENUE_COLUMNS
        ));
        push_entity_filter(&mut qb, filter);
        qb.build_query_as::<Venue>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("filter_venues"))
    }

    async fn venue_areas(&self) -> Result<Vec<Area>> {
        sqlx::query_as::<_, Area>("SELECT DISTINCT city, state FROM venues ORDER BY state, city")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("venue_areas"))
    }

    async fn insert_artist(&self, artist: NewArtist) -> Result<Artist> {
        let mut tx = self.begin("insert_artist").await?;
        let sql = format!(
            "INSERT INTO artists (name, city, state, phone, genres, image_link, \
             facebook_link, website, seeking_venue, seeking_description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            ARTIST_COLUMNS
        );
        let created = sqlx::query_as::<_, Artist>(&sql)
            .bind(&artist.name)
            .bind(&artist.city)
            .bind(&artist.state)
            .bind(&artist.phone)
            .bind(&artist.genres)
            .bind(&artist.image_link)
            .bind(&artist.facebook_link)
            .bind(&artist.website)
            .bind(artist.seeking_venue)
            .bind(&artist.seeking_description)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error("insert_artist"))?;
        Self::commit(tx, "insert_artist").await?;

        info!("Artist {} '{}' listed", created.id, created.name);
        Ok(created)
    }

    async fn get_artist(&self, id: i64) -> Result<Artist> {
        let sql = format!("SELECT {} FROM artists WHERE id = $1", ARTIST_COLUMNS);
        sqlx::query_as::<_, Artist>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("get_artist"))?
            .ok_or_else(|| {
                debug!("artist {} not found", id);
                ListingError::not_found(EntityKind::Artist, id)
            })
    }

    async fn update_artist(&self, id: i64, patch: ArtistPatch) -> Result<Artist> {
        let mut tx = self.begin("update_artist").await?;
        let sql = format!("SELECT {} FROM artists WHERE id = $1 FOR UPDATE", ARTIST_COLUMNS);
        let current = sqlx::query_as::<_, Artist>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error("update_artist"))?
            .ok_or_else(|| ListingError::not_found(EntityKind::Artist, id))?;

        let updated = patch.apply(&current)?;

        sqlx::query(
            r#"
            UPDATE artists
            SET name = $2, city = $3, state = $4, phone = $5, genres = $6,
                image_link = $7, facebook_link = $8, website = $9,
                seeking_venue = $10, seeking_description = $11
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&updated.name)
        .bind(&updated.city)
        .bind(&updated.state)
        .bind(&updated.phone)
        .bind(&updated.genres)
        .bind(&updated.image_link)
        .bind(&updated.facebook_link)
        .bind(&updated.website)
        .bind(updated.seeking_venue)
        .bind(&updated.seeking_description)
        .execute(&mut *tx)
        .await
        .map_err(store_error("update_artist"))?;
        Self::commit(tx, "update_artist").await?;

        info!("Artist {} updated", id);
        Ok(updated)
    }

    async fn delete_artist(&self, id: i64) -> Result<u64> {
        let mut tx = self.begin("delete_artist").await?;

        // FOR UPDATE ждёт конкурентные insert_show с FOR KEY SHARE на этой строке
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM artists WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_error("delete_artist"))?;
        if locked.is_none() {
            tx.rollback().await.map_err(store_error("delete_artist"))?;
            return Err(ListingError::not_found(EntityKind::Artist, id));
        }

        let shows = sqlx::query("DELETE FROM shows WHERE artist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("delete_artist"))?
            .rows_affected();

        sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("delete_artist"))?;
        Self::commit(tx, "delete_artist").await?;

        info!("Artist {} deleted together with {} shows", id, shows);
        Ok(shows)
    }

    async fn list_artists(&self) -> Result<Vec<Artist>> {
        self.filter_artists(&EntityFilter::default()).await
    }

    async fn filter_artists(&self, filter: &EntityFilter) -> Result<Vec<Artist>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM artists WHERE TRUE",
            ARTIST_COLUMNS
        ));
        push_entity_filter(&mut qb, filter);
        qb.build_query_as::<Artist>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("filter_artists"))
    }

    async fn artist_areas(&self) -> Result<Vec<Area>> {
        sqlx::query_as::<_, Area>("SELECT DISTINCT city, state FROM artists ORDER BY state, city")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("artist_areas"))
    }

    async fn insert_show(&self, show: NewShow) -> Result<Show> {
        let mut tx = self.begin("insert_show").await?;
        Self::lock_parents(&mut tx, show.artist_id, show.venue_id).await?;

        let created = sqlx::query_as::<_, Show>(
            "INSERT INTO shows (start_time, artist_id, venue_id) VALUES ($1, $2, $3) \
             RETURNING id, start_time, artist_id, venue_id",
        )
        .bind(show.start_time)
        .bind(show.artist_id)
        .bind(show.venue_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error("insert_show"))?;
        Self::commit(tx, "insert_show").await?;

        info!(
            "Show {} listed: artist {} at venue {} on {}",
            created.id, created.artist_id, created.venue_id, created.start_time
        );
        Ok(created)
    }

    async fn get_show(&self, id: i64) -> Result<Show> {
        sqlx::query_as::<_, Show>(
            "SELECT id, start_time, artist_id, venue_id FROM shows WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("get_show"))?
        .ok_or_else(|| ListingError::not_found(EntityKind::Show, id))
    }

    async fn update_show(&self, id: i64, patch: ShowPatch) -> Result<Show> {
        let mut tx = self.begin("update_show").await?;
        let current = sqlx::query_as::<_, Show>(
            "SELECT id, start_time, artist_id, venue_id FROM shows WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error("update_show"))?
        .ok_or_else(|| ListingError::not_found(EntityKind::Show, id))?;

        let updated = patch.apply(&current)?;
        Self::lock_parents(&mut tx, updated.artist_id, updated.venue_id).await?;

        sqlx::query("UPDATE shows SET start_time = $2, artist_id = $3, venue_id = $4 WHERE id = $1")
            .bind(id)
            .bind(updated.start_time)
            .bind(updated.artist_id)
            .bind(updated.venue_id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("update_show"))?;
        Self::commit(tx, "update_show").await?;

        info!("Show {} updated", id);
        Ok(updated)
    }

    async fn delete_show(&self, id: i64) -> Result<()> {
        let mut tx = self.begin("delete_show").await?;
        let deleted = sqlx::query("DELETE FROM shows WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_error("delete_show"))?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await.map_err(store_error("delete_show"))?;
            return Err(ListingError::not_found(EntityKind::Show, id));
        }
        Self::commit(tx, "delete_show").await?;

        info!("Show {} deleted", id);
        Ok(())
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>> {
        self.filter_shows(&ShowFilter::default()).await
    }

    async fn filter_shows(&self, filter: &ShowFilter) -> Result<Vec<ShowListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(SHOW_LISTING_SELECT);
        if let Some(venue_id) = filter.venue_id {
            qb.push(" AND s.venue_id = ").push_bind(venue_id);
        }
        if let Some(artist_id) = filter.artist_id {
            qb.push(" AND s.artist_id = ").push_bind(artist_id);
        }
        if let Some(from) = filter.starting_from {
            qb.push(" AND s.start_time >= ").push_bind(from);
        }
        qb.push(" ORDER BY s.start_time, s.id");

        qb.build_query_as::<ShowListing>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("filter_shows"))
    }
}
