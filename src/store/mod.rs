//! Слой хранения: CRUD и запросы над Venue, Artist и Show.
//!
//! Каждая операция записи атомарна: либо применяется целиком, либо
//! не применяется вовсе. Удаление Venue или Artist каскадно удаляет их Show.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{
    Area, Artist, ArtistPatch, NewArtist, NewShow, NewVenue, Show, ShowListing, ShowPatch, Venue,
    VenuePatch,
};

/// Фильтр для Venue и Artist; пустые поля не ограничивают выборку
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFilter {
    /// Подстрока имени без учёта регистра
    pub name_contains: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl EntityFilter {
    pub fn name_contains(term: impl Into<String>) -> Self {
        EntityFilter {
            name_contains: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn area(city: impl Into<String>, state: impl Into<String>) -> Self {
        EntityFilter {
            name_contains: None,
            city: Some(city.into()),
            state: Some(state.into()),
        }
    }

    pub fn matches(&self, name: &str, city: &str, state: &str) -> bool {
        let name_ok = self
            .name_contains
            .as_deref()
            .map_or(true, |term| name.to_lowercase().contains(&term.to_lowercase()));
        let city_ok = self.city.as_deref().map_or(true, |c| c == city);
        let state_ok = self.state.as_deref().map_or(true, |s| s == state);
        name_ok && city_ok && state_ok
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowFilter {
    pub venue_id: Option<i64>,
    pub artist_id: Option<i64>,
    pub starting_from: Option<NaiveDateTime>,
}

impl ShowFilter {
    pub fn venue(venue_id: i64) -> Self {
        ShowFilter {
            venue_id: Some(venue_id),
            ..Default::default()
        }
    }

    pub fn artist(artist_id: i64) -> Self {
        ShowFilter {
            artist_id: Some(artist_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, show: &Show) -> bool {
        self.venue_id.map_or(true, |id| id == show.venue_id)
            && self.artist_id.map_or(true, |id| id == show.artist_id)
            && self.starting_from.map_or(true, |t| show.start_time >= t)
    }
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    // --- venues ---

    /// Проверяет форму и сохраняет новую площадку
    async fn create_venue(&self, venue: NewVenue) -> Result<Venue> {
        let venue = venue.normalized()?;
        self.insert_venue(venue).await
    }

    /// Вставка уже проверенной записи; id назначает хранилище
    async fn insert_venue(&self, venue: NewVenue) -> Result<Venue>;
    async fn get_venue(&self, id: i64) -> Result<Venue>;
    async fn update_venue(&self, id: i64, patch: VenuePatch) -> Result<Venue>;
    /// Возвращает число каскадно удалённых show
    async fn delete_venue(&self, id: i64) -> Result<u64>;
    async fn list_venues(&self) -> Result<Vec<Venue>>;
    async fn filter_venues(&self, filter: &EntityFilter) -> Result<Vec<Venue>>;
    /// Уникальные пары (город, штат) площадок
    async fn venue_areas(&self) -> Result<Vec<Area>>;

    // --- artists ---

    async fn create_artist(&self, artist: NewArtist) -> Result<Artist> {
        let artist = artist.normalized()?;
        self.insert_artist(artist).await
    }

    async fn insert_artist(&self, artist: NewArtist) -> Result<Artist>;
    async fn get_artist(&self, id: i64) -> Result<Artist>;
    async fn update_artist(&self, id: i64, patch: ArtistPatch) -> Result<Artist>;
    async fn delete_artist(&self, id: i64) -> Result<u64>;
    async fn list_artists(&self) -> Result<Vec<Artist>>;
    async fn filter_artists(&self, filter: &EntityFilter) -> Result<Vec<Artist>>;
    async fn artist_areas(&self) -> Result<Vec<Area>>;

    // --- shows ---

    /// Проверяет поля и ссылки на artist/venue, затем сохраняет show
    async fn create_show(&self, show: NewShow) -> Result<Show> {
        validator::Validate::validate(&show)?;
        self.insert_show(show).await
    }

    async fn insert_show(&self, show: NewShow) -> Result<Show>;
    async fn get_show(&self, id: i64) -> Result<Show>;
    async fn update_show(&self, id: i64, patch: ShowPatch) -> Result<Show>;
    async fn delete_show(&self, id: i64) -> Result<()>;
    /// Все show с данными обеих сторон, по start_time, затем по id
    async fn list_shows(&self) -> Result<Vec<ShowListing>>;
    async fn filter_shows(&self, filter: &ShowFilter) -> Result<Vec<ShowListing>>;
}
