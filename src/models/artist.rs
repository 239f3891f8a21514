use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{
    checkbox, non_empty, normalize_genres, optional_checkbox, present_string, validate_phone,
    Listed,
};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, Validate)]
pub struct Artist {
    pub id: i64,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 1, max = 120))]
    pub state: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    pub genres: Vec<String>,
    #[validate(url, length(max = 500))]
    pub image_link: Option<String>,
    #[validate(url, length(max = 120))]
    pub facebook_link: String,
    #[validate(url, length(max = 120))]
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl Listed for Artist {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn owns(&self, _venue_id: i64, artist_id: i64) -> bool {
        self.id == artist_id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewArtist {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 1, max = 120))]
    pub state: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    pub genres: Vec<String>,
    #[validate(url, length(max = 500))]
    pub image_link: Option<String>,
    #[validate(url, length(max = 120))]
    pub facebook_link: String,
    #[validate(url, length(max = 120))]
    pub website: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl NewArtist {
    pub fn normalized(self) -> Result<Self> {
        let artist = NewArtist {
            name: self.name.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: self.phone.trim().to_string(),
            genres: normalize_genres(self.genres),
            image_link: non_empty(self.image_link),
            facebook_link: self.facebook_link.trim().to_string(),
            website: non_empty(self.website),
            seeking_venue: self.seeking_venue,
            seeking_description: non_empty(self.seeking_description),
        };
        artist.validate()?;
        Ok(artist)
    }

    pub fn into_artist(self, id: i64) -> Artist {
        Artist {
            id,
            name: self.name,
            city: self.city,
            state: self.state,
            phone: self.phone,
            genres: self.genres,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            website: self.website,
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistPatch {
    #[serde(deserialize_with = "present_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub phone: Option<String>,
    pub genres: Option<Vec<String>>,
    #[serde(deserialize_with = "present_string")]
    pub image_link: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub facebook_link: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub website: Option<String>,
    #[serde(deserialize_with = "optional_checkbox")]
    pub seeking_venue: Option<bool>,
    #[serde(deserialize_with = "present_string")]
    pub seeking_description: Option<String>,
}

impl ArtistPatch {
    pub fn name(name: impl Into<String>) -> Self {
        ArtistPatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, artist: &Artist) -> Result<Artist> {
        let mut updated = artist.clone();
        if let Some(name) = self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(city) = self.city {
            updated.city = city.trim().to_string();
        }
        if let Some(state) = self.state {
            updated.state = state.trim().to_string();
        }
        if let Some(phone) = self.phone {
            updated.phone = phone.trim().to_string();
        }
        if let Some(genres) = self.genres {
            updated.genres = normalize_genres(genres);
        }
        if let Some(image_link) = self.image_link {
            updated.image_link = non_empty(Some(image_link));
        }
        if let Some(facebook_link) = self.facebook_link {
            updated.facebook_link = facebook_link.trim().to_string();
        }
        if let Some(website) = self.website {
            updated.website = non_empty(Some(website));
        }
        if let Some(seeking_venue) = self.seeking_venue {
            updated.seeking_venue = seeking_venue;
        }
        if let Some(description) = self.seeking_description {
            updated.seeking_description = non_empty(Some(description));
        }
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_rejects_blank_name() {
        let artist = NewArtist {
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: "326-123-5000".into(),
            genres: vec!["Rock n Roll".into()],
            facebook_link: "https://www.facebook.com/GunsNPetals".into(),
            ..Default::default()
        }
        .normalized()
        .unwrap()
        .into_artist(4);

        assert!(ArtistPatch::name("   ").apply(&artist).is_err());
        assert_eq!(ArtistPatch::name("Petals").apply(&artist).unwrap().name, "Petals");
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let err = NewArtist::default().normalized().unwrap_err().to_string();
        for field in ["name", "city", "state", "phone", "facebook_link"] {
            assert!(err.contains(field), "{field} missing from {err}");
        }
    }
}
