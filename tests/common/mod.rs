//! Общие проверки контракта хранилища; запускаются для каждого бэкенда.
#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime, Utc};
use venue_booking::error::{EntityKind, ListingError};
use venue_booking::models::{ArtistPatch, NewArtist, NewShow, NewVenue};
use venue_booking::store::{EntityFilter, ListingStore, ShowFilter};

pub fn new_venue(name: &str) -> NewVenue {
    NewVenue {
        name: name.into(),
        genres: vec!["Jazz".into(), "Swing".into()],
        address: "1015 Folsom Street".into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: "123-123-1234".into(),
        facebook_link: "https://www.facebook.com/TheMusicalHop".into(),
        seeking_talent: true,
        seeking_description: Some("We are on the lookout for a local artist".into()),
        ..Default::default()
    }
}

pub fn new_artist(name: &str) -> NewArtist {
    NewArtist {
        name: name.into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: "326-123-5000".into(),
        genres: vec!["Rock n Roll".into()],
        image_link: Some("https://images.example.com/artist.png".into()),
        facebook_link: "https://www.facebook.com/GunsNPetals".into(),
        website: Some("https://www.gunsnpetalsband.com".into()),
        ..Default::default()
    }
}

fn in_days(days: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::days(days)
}

pub async fn delete_venue_cascades_to_shows(store: &dyn ListingStore) {
    let venue = store.create_venue(new_venue("Cascade Hall")).await.unwrap();
    let artist = store.create_artist(new_artist("Cascade Band")).await.unwrap();

    let mut show_ids = Vec::new();
    for days in [-10, 5, 20] {
        let show = store
            .create_show(NewShow {
                artist_id: artist.id,
                venue_id: venue.id,
                start_time: in_days(days),
            })
            .await
            .unwrap();
        show_ids.push(show.id);
    }

    assert_eq!(store.delete_venue(venue.id).await.unwrap(), 3);
    assert!(matches!(
        store.get_venue(venue.id).await,
        Err(ListingError::NotFound { entity: EntityKind::Venue, .. })
    ));
    for id in show_ids {
        assert!(matches!(
            store.get_show(id).await,
            Err(ListingError::NotFound { entity: EntityKind::Show, .. })
        ));
    }
    // Артист остаётся
    assert!(store.get_artist(artist.id).await.is_ok());
}

pub async fn show_with_missing_artist_is_rejected(store: &dyn ListingStore) {
    let venue = store.create_venue(new_venue("Lonely Venue")).await.unwrap();
    let missing_artist = 9_999_999;

    let err = store
        .create_show(NewShow {
            artist_id: missing_artist,
            venue_id: venue.id,
            start_time: in_days(1),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ListingError::ForeignKey { entity: EntityKind::Artist, id } if id == missing_artist
    ));
    let shows = store.filter_shows(&ShowFilter::venue(venue.id)).await.unwrap();
    assert!(shows.is_empty());
}

pub async fn update_changes_only_given_field(store: &dyn ListingStore) {
    let before = store.create_artist(new_artist("Old Name")).await.unwrap();
    let after = store
        .update_artist(before.id, ArtistPatch::name("New Name"))
        .await
        .unwrap();

    assert_eq!(after.name, "New Name");
    let mut expected = before.clone();
    expected.name = "New Name".into();
    assert_eq!(after, expected);
    assert_eq!(store.get_artist(before.id).await.unwrap(), expected);
}

pub async fn invalid_update_leaves_record_untouched(store: &dyn ListingStore) {
    let before = store.create_artist(new_artist("Steady")).await.unwrap();
    let patch = ArtistPatch {
        name: Some("Renamed".into()),
        phone: Some("not a phone".into()),
        ..Default::default()
    };

    let err = store.update_artist(before.id, patch).await.unwrap_err();
    assert!(matches!(err, ListingError::Validation(_)));
    assert_eq!(store.get_artist(before.id).await.unwrap(), before);
}

pub async fn missing_records_are_not_found(store: &dyn ListingStore) {
    let id = 8_888_888;
    assert!(matches!(
        store.update_artist(id, ArtistPatch::name("x")).await,
        Err(ListingError::NotFound { entity: EntityKind::Artist, .. })
    ));
    assert!(matches!(
        store.delete_venue(id).await,
        Err(ListingError::NotFound { entity: EntityKind::Venue, .. })
    ));
    assert!(matches!(
        store.delete_show(id).await,
        Err(ListingError::NotFound { entity: EntityKind::Show, .. })
    ));
}

pub async fn create_rejects_missing_required_fields(store: &dyn ListingStore) {
    let mut venue = new_venue("");
    venue.phone = String::new();
    let err = store.create_venue(venue).await.unwrap_err();
    match err {
        ListingError::Validation(message) => {
            assert!(message.contains("name"), "{message}");
            assert!(message.contains("phone"), "{message}");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

pub async fn filter_by_name_is_case_insensitive(store: &dyn ListingStore) {
    store.create_venue(new_venue("Ventura Lounge")).await.unwrap();
    store.create_venue(new_venue("Maple Club")).await.unwrap();

    let found = store
        .filter_venues(&EntityFilter::name_contains("vEnTuRa"))
        .await
        .unwrap();
    assert!(found.iter().any(|v| v.name == "Ventura Lounge"));
    assert!(found.iter().all(|v| v.name != "Maple Club"));
}

pub async fn delete_artist_counts_only_its_shows(store: &dyn ListingStore) {
    let venue = store.create_venue(new_venue("Shared Stage")).await.unwrap();
    let leaving = store.create_artist(new_artist("Leaving Band")).await.unwrap();
    let staying = store.create_artist(new_artist("Staying Band")).await.unwrap();

    for (artist_id, days) in [(leaving.id, 1), (leaving.id, -1), (staying.id, 2)] {
        store
            .create_show(NewShow {
                artist_id,
                venue_id: venue.id,
                start_time: in_days(days),
            })
            .await
            .unwrap();
    }

    assert_eq!(store.delete_artist(leaving.id).await.unwrap(), 2);
    let remaining = store.list_shows().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].artist_id, staying.id);

    assert!(matches!(
        store.delete_artist(leaving.id).await,
        Err(ListingError::NotFound { entity: EntityKind::Artist, .. })
    ));
}
