//! Производные представления для страниц списков, деталей и поиска.
//!
//! Здесь только чистые функции: они получают уже загруженные записи и
//! момент "сейчас", ничего не читают и не пишут в хранилище.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{Artist, Listed, Scheduled, ShowListing, Venue};

/// Делит show на (предстоящие, прошедшие). Show ровно в `now` - предстоящий.
/// Порядок внутри каждой корзины совпадает с порядком на входе.
pub fn classify_shows<S: Scheduled + Clone>(shows: &[S], now: NaiveDateTime) -> (Vec<S>, Vec<S>) {
    shows.iter().cloned().partition(|show| show.start_time() >= now)
}

/// Число предстоящих show, принадлежащих именно этой сущности
pub fn upcoming_count<E: Listed, S: Scheduled>(entity: &E, shows: &[S], now: NaiveDateTime) -> usize {
    shows
        .iter()
        .filter(|show| entity.owns(show.venue_id(), show.artist_id()) && show.start_time() >= now)
        .count()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

impl EntitySummary {
    fn of<E: Listed, S: Scheduled>(entity: &E, shows: &[S], now: NaiveDateTime) -> Self {
        EntitySummary {
            id: entity.id(),
            name: entity.name().to_string(),
            num_upcoming_shows: upcoming_count(entity, shows, now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

/// Группирует площадки по (город, штат). Группы идут в порядке первого
/// появления пары во входном списке, площадки в группе - в порядке входа.
pub fn venue_groups<S: Scheduled>(venues: &[Venue], shows: &[S], now: NaiveDateTime) -> Vec<VenueGroup> {
    let mut groups: Vec<VenueGroup> = Vec::new();
    for venue in venues {
        let summary = EntitySummary::of(venue, shows, now);
        match groups
            .iter_mut()
            .find(|g| g.city == venue.city && g.state == venue.state)
        {
            Some(group) => group.venues.push(summary),
            None => groups.push(VenueGroup {
                city: venue.city.clone(),
                state: venue.state.clone(),
                venues: vec![summary],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

/// Поиск подстроки в имени без учёта регистра
pub fn search<E: Listed, S: Scheduled>(
    entities: &[E],
    shows: &[S],
    term: &str,
    now: NaiveDateTime,
) -> SearchResults {
    let needle = term.trim().to_lowercase();
    let data: Vec<EntitySummary> = entities
        .iter()
        .filter(|e| e.name().to_lowercase().contains(&needle))
        .map(|e| EntitySummary::of(e, shows, now))
        .collect();
    SearchResults {
        count: data.len(),
        data,
    }
}

/// Show на странице площадки: кто выступает
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistShow {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<ShowListing> for ArtistShow {
    fn from(show: ShowListing) -> Self {
        ArtistShow {
            artist_id: show.artist_id,
            artist_name: show.artist_name,
            artist_image_link: show.artist_image_link,
            start_time: show.start_time,
        }
    }
}

/// Show на странице артиста: где выступает
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueShow {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<ShowListing> for VenueShow {
    fn from(show: ShowListing) -> Self {
        VenueShow {
            venue_id: show.venue_id,
            venue_name: show.venue_name,
            venue_image_link: show.venue_image_link,
            start_time: show.start_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView<E, S> {
    #[serde(flatten)]
    pub entity: E,
    pub upcoming_shows_count: usize,
    pub past_shows_count: usize,
    pub upcoming_shows: Vec<S>,
    pub past_shows: Vec<S>,
}

pub type VenueDetail = DetailView<Venue, ArtistShow>;
pub type ArtistDetail = DetailView<Artist, VenueShow>;

/// Полная карточка сущности. Show чужих сущностей отбрасываются,
/// дополнительная сортировка не применяется.
pub fn detail_view<E, S>(entity: E, shows: &[ShowListing], now: NaiveDateTime) -> DetailView<E, S>
where
    E: Listed,
    S: From<ShowListing>,
{
    let own: Vec<ShowListing> = shows
        .iter()
        .filter(|show| entity.owns(show.venue_id, show.artist_id))
        .cloned()
        .collect();
    let (upcoming, past) = classify_shows(&own, now);

    DetailView {
        entity,
        upcoming_shows_count: upcoming.len(),
        past_shows_count: past.len(),
        upcoming_shows: upcoming.into_iter().map(S::from).collect(),
        past_shows: past.into_iter().map(S::from).collect(),
    }
}
