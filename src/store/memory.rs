use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{EntityFilter, ListingStore, ShowFilter};
use crate::error::{EntityKind, ListingError, Result};
use crate::models::{
    Area, Artist, ArtistPatch, NewArtist, NewShow, NewVenue, Show, ShowListing, ShowPatch, Venue,
    VenuePatch,
};

#[derive(Default)]
struct Tables {
    venues: BTreeMap<i64, Venue>,
    artists: BTreeMap<i64, Artist>,
    shows: BTreeMap<i64, Show>,
    next_venue_id: i64,
    next_artist_id: i64,
    next_show_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn check_refs(&self, artist_id: i64, venue_id: i64) -> Result<()> {
        if !self.artists.contains_key(&artist_id) {
            return Err(ListingError::ForeignKey {
                entity: EntityKind::Artist,
                id: artist_id,
            });
        }
        if !self.venues.contains_key(&venue_id) {
            return Err(ListingError::ForeignKey {
                entity: EntityKind::Venue,
                id: venue_id,
            });
        }
        Ok(())
    }

    fn listing(&self, show: &Show) -> Option<ShowListing> {
        let venue = self.venues.get(&show.venue_id)?;
        let artist = self.artists.get(&show.artist_id)?;
        Some(ShowListing {
            id: show.id,
            start_time: show.start_time,
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            venue_image_link: venue.image_link.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
        })
    }

    fn remove_shows_where(&mut self, owned: impl Fn(&Show) -> bool) -> u64 {
        let before = self.shows.len();
        self.shows.retain(|_, show| !owned(show));
        (before - self.shows.len()) as u64
    }
}

fn distinct_areas<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<Area> {
    let mut areas: Vec<Area> = pairs
        .map(|(city, state)| Area {
            city: city.to_string(),
            state: state.to_string(),
        })
        .collect();
    areas.sort_by(|a, b| (&a.state, &a.city).cmp(&(&b.state, &b.city)));
    areas.dedup();
    areas
}

/// Хранилище в памяти процесса. Вся операция выполняется под одной
/// блокировкой записи, поэтому частичных изменений никто не увидит.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_venue(&self, venue: NewVenue) -> Result<Venue> {
        let mut tables = self.tables.write().await;
        let id = Tables::next_id(&mut tables.next_venue_id);
        let venue = venue.into_venue(id);
        tables.venues.insert(id, venue.clone());
        info!("Venue {} '{}' listed", id, venue.name);
        Ok(venue)
    }

    async fn get_venue(&self, id: i64) -> Result<Venue> {
        let tables = self.tables.read().await;
        tables.venues.get(&id).cloned().ok_or_else(|| {
            debug!("venue {} not found", id);
            ListingError::not_found(EntityKind::Venue, id)
        })
    }

    async fn update_venue(&self, id: i64, patch: VenuePatch) -> Result<Venue> {
        let mut tables = self.tables.write().await;
        let current = tables
            .venues
            .get(&id)
            .ok_or_else(|| ListingError::not_found(EntityKind::Venue, id))?;
        let updated = patch.apply(current)?;
        tables.venues.insert(id, updated.clone());
        info!("Venue {} updated", id);
        Ok(updated)
    }

    async fn delete_venue(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if tables.venues.remove(&id).is_none() {
            return Err(ListingError::not_found(EntityKind::Venue, id));
        }
        let removed = tables.remove_shows_where(|show| show.venue_id == id);
        info!("Venue {} deleted together with {} shows", id, removed);
        Ok(removed)
    }

    async fn list_venues(&self) -> Result<Vec<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables.venues.values().cloned().collect())
    }

    async fn filter_venues(&self, filter: &EntityFilter) -> Result<Vec<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables
            .venues
            .values()
            .filter(|v| filter.matches(&v.name, &v.city, &v.state))
            .cloned()
            .collect())
    }

    async fn venue_areas(&self) -> Result<Vec<Area>> {
        let tables = self.tables.read().await;
        Ok(distinct_areas(
            tables.venues.values().map(|v| (v.city.as_str(), v.state.as_str())),
        ))
    }

    async fn insert_artist(&self, artist: NewArtist) -> Result<Artist> {
        let mut tables = self.tables.write().await;
        let id = Tables::next_id(&mut tables.next_artist_id);
        let artist = artist.into_artist(id);
        tables.artists.insert(id, artist.clone());
        info!("Artist {} '{}' listed", id, artist.name);
        Ok(artist)
    }

    async fn get_artist(&self, id: i64) -> Result<Artist> {
        let tables = self.tables.read().await;
        tables.artists.get(&id).cloned().ok_or_else(|| {
            debug!("artist {} not found", id);
            ListingError::not_found(EntityKind::Artist, id)
        })
    }

    async fn update_artist(&self, id: i64, patch: ArtistPatch) -> Result<Artist> {
        let mut tables = self.tables.write().await;
        let current = tables
            .artists
            .get(&id)
            .ok_or_else(|| ListingError::not_found(EntityKind::Artist, id))?;
        let updated = patch.apply(current)?;
        tables.artists.insert(id, updated.clone());
        info!("Artist {} updated", id);
        Ok(updated)
    }

    async fn delete_artist(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if tables.artists.remove(&id).is_none() {
            return Err(ListingError::not_found(EntityKind::Artist, id));
        }
        let removed = tables.remove_shows_where(|show| show.artist_id == id);
        info!("Artist {} deleted together with {} shows", id, removed);
        Ok(removed)
    }

    async fn list_artists(&self) -> Result<Vec<Artist>> {
        let tables = self.tables.read().await;
        Ok(tables.artists.values().cloned().collect())
    }

    async fn filter_artists(&self, filter: &EntityFilter) -> Result<Vec<Artist>> {
        let tables = self.tables.read().await;
        Ok(tables
            .artists
            .values()
            .filter(|a| filter.matches(&a.name, &a.city, &a.state))
            .cloned()
            .collect())
    }

    async fn artist_areas(&self) -> Result<Vec<Area>> {
        let tables = self.tables.read().await;
        Ok(distinct_areas(
            tables.artists.values().map(|a| (a.city.as_str(), a.state.as_str())),
        ))
    }

    async fn insert_show(&self, show: NewShow) -> Result<Show> {
        let mut tables = self.tables.write().await;
        tables.check_refs(show.artist_id, show.venue_id)?;
        let id = Tables::next_id(&mut tables.next_show_id);
        let show = show.into_show(id);
        tables.shows.insert(id, show.clone());
        info!(
            "Show {} listed: artist {} at venue {} on {}",
            id, show.artist_id, show.venue_id, show.start_time
        );
        Ok(show)
    }

    async fn get_show(&self, id: i64) -> Result<Show> {
        let tables = self.tables.read().await;
        tables
            .shows
            .get(&id)
            .cloned()
            .ok_or_else(|| ListingError::not_found(EntityKind::Show, id))
    }

    async fn update_show(&self, id: i64, patch: ShowPatch) -> Result<Show> {
        let mut tables = self.tables.write().await;
        let current = tables
            .shows
            .get(&id)
            .ok_or_else(|| ListingError::not_found(EntityKind::Show, id))?;
        let updated = patch.apply(current)?;
        tables.check_refs(updated.artist_id, updated.venue_id)?;
        tables.shows.insert(id, updated.clone());
        info!("Show {} updated", id);
        Ok(updated)
    }

    async fn delete_show(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .shows
            .remove(&id)
            .map(|_| info!("Show {} deleted", id))
            .ok_or_else(|| ListingError::not_found(EntityKind::Show, id))
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>> {
        self.filter_shows(&ShowFilter::default()).await
    }

    async fn filter_shows(&self, filter: &ShowFilter) -> Result<Vec<ShowListing>> {
        let tables = self.tables.read().await;
        let mut shows: Vec<ShowListing> = tables
            .shows
            .values()
            .filter(|show| filter.matches(show))
            .filter_map(|show| tables.listing(show))
            .collect();
        shows.sort_by(|a, b| (a.start_time, a.id).cmp(&(b.start_time, b.id)));
        Ok(shows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use fake::faker::address::en::{CityName, StateAbbr};
    use fake::faker::company::en::CompanyName;
    use fake::Fake;

    fn when() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 6, 15)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn new_venue() -> NewVenue {
        NewVenue {
            name: CompanyName().fake(),
            city: CityName().fake(),
            state: StateAbbr().fake(),
            phone: "415-555-0100".into(),
            facebook_link: "https://www.facebook.com/venue".into(),
            ..Default::default()
        }
    }

    fn new_artist() -> NewArtist {
        NewArtist {
            name: CompanyName().fake(),
            city: CityName().fake(),
            state: StateAbbr().fake(),
            phone: "415-555-0101".into(),
            facebook_link: "https://www.facebook.com/artist".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let store = MemoryStore::new();
        let a = store.create_venue(new_venue()).await.unwrap();
        let b = store.create_venue(new_venue()).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn update_show_checks_new_references() {
        let store = MemoryStore::new();
        let venue = store.create_venue(new_venue()).await.unwrap();
        let artist = store.create_artist(new_artist()).await.unwrap();
        let show = store
            .create_show(NewShow {
                artist_id: artist.id,
                venue_id: venue.id,
                start_time: when(),
            })
            .await
            .unwrap();

        let patch = ShowPatch {
            venue_id: Some(venue.id + 100),
            ..Default::default()
        };
        let err = store.update_show(show.id, patch).await.unwrap_err();
        assert!(matches!(err, ListingError::ForeignKey { entity: EntityKind::Venue, .. }));
        assert_eq!(store.get_show(show.id).await.unwrap(), show);
    }

    #[tokio::test]
    async fn shows_are_listed_by_start_time() {
        let store = MemoryStore::new();
        let venue = store.create_venue(new_venue()).await.unwrap();
        let artist = store.create_artist(new_artist()).await.unwrap();
        for offset in [3, 1, 2] {
            store
                .create_show(NewShow {
                    artist_id: artist.id,
                    venue_id: venue.id,
                    start_time: when() + Duration::days(offset),
                })
                .await
                .unwrap();
        }

        let shows = store.list_shows().await.unwrap();
        let times: Vec<_> = shows.iter().map(|s| s.start_time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
        assert_eq!(shows[0].venue_name, venue.name);
        assert_eq!(shows[0].artist_name, artist.name);
    }

    #[tokio::test]
    async fn areas_are_distinct() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            let mut venue = new_venue();
            venue.city = "Austin".into();
            venue.state = "TX".into();
            store.create_venue(venue).await.unwrap();
        }
        let areas = store.venue_areas().await.unwrap();
        assert_eq!(
            areas,
            vec![Area {
                city: "Austin".into(),
                state: "TX".into()
            }]
        );
    }
}
