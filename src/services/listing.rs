use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::debug;

use super::aggregation::{
    self, ArtistDetail, EntitySummary, SearchResults, VenueDetail, VenueGroup,
};
use crate::error::Result;
use crate::models::{Listed, ShowListing};
use crate::store::{EntityFilter, ListingStore, ShowFilter};

/// Собирает данные из хранилища и строит из них представления.
/// Хранилище передаётся снаружи; сам сервис ничего не меняет.
#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ListingStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    /// Площадки, сгруппированные по городу и штату
    pub async fn venue_groups(&self, now: NaiveDateTime) -> Result<Vec<VenueGroup>> {
        let venues = self.store.list_venues().await?;
        let upcoming = self.upcoming_shows(now).await?;
        Ok(aggregation::venue_groups(&venues, &upcoming, now))
    }

    pub async fn search_venues(&self, term: &str, now: NaiveDateTime) -> Result<SearchResults> {
        let venues = self
            .store
            .filter_venues(&EntityFilter::name_contains(term.trim()))
            .await?;
        let upcoming = self.upcoming_shows(now).await?;
        debug!("venue search '{}' matched {}", term, venues.len());
        Ok(aggregation::search(&venues, &upcoming, term, now))
    }

    pub async fn venue_detail(&self, id: i64, now: NaiveDateTime) -> Result<VenueDetail> {
        let venue = self.store.get_venue(id).await?;
        let shows = self.store.filter_shows(&ShowFilter::venue(id)).await?;
        Ok(aggregation::detail_view(venue, &shows, now))
    }

    /// Все артисты по id: только id, имя и число предстоящих show
    pub async fn artists(&self, now: NaiveDateTime) -> Result<Vec<EntitySummary>> {
        let artists = self.store.list_artists().await?;
        let upcoming = self.upcoming_shows(now).await?;
        Ok(artists
            .iter()
            .map(|artist| EntitySummary {
                id: artist.id(),
                name: artist.name().to_string(),
                num_upcoming_shows: aggregation::upcoming_count(artist, &upcoming, now),
            })
            .collect())
    }

    pub async fn search_artists(&self, term: &str, now: NaiveDateTime) -> Result<SearchResults> {
        let artists = self
            .store
            .filter_artists(&EntityFilter::name_contains(term.trim()))
            .await?;
        let upcoming = self.upcoming_shows(now).await?;
        debug!("artist search '{}' matched {}", term, artists.len());
        Ok(aggregation::search(&artists, &upcoming, term, now))
    }

    pub async fn artist_detail(&self, id: i64, now: NaiveDateTime) -> Result<ArtistDetail> {
        let artist = self.store.get_artist(id).await?;
        let shows = self.store.filter_shows(&ShowFilter::artist(id)).await?;
        Ok(aggregation::detail_view(artist, &shows, now))
    }

    // Для счётчиков достаточно только предстоящих show
    async fn upcoming_shows(&self, now: NaiveDateTime) -> Result<Vec<ShowListing>> {
        self.store
            .filter_shows(&ShowFilter {
                starting_from: Some(now),
                ..Default::default()
            })
            .await
    }
}
