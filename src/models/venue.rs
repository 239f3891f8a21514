use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{
    checkbox, non_empty, normalize_genres, optional_checkbox, present_string, validate_phone,
    Listed,
};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, Validate)]
pub struct Venue {
    pub id: i64,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub genres: Vec<String>,
    #[validate(length(max = 120))]
    pub address: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 1, max = 120))]
    pub state: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(url, length(max = 500))]
    pub image_link: Option<String>,
    #[validate(url, length(max = 120))]
    pub facebook_link: String,
    #[validate(url, length(max = 120))]
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl Listed for Venue {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn owns(&self, venue_id: i64, _artist_id: i64) -> bool {
        self.id == venue_id
    }
}

/// Данные формы создания площадки
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewVenue {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub genres: Vec<String>,
    #[validate(length(max = 120))]
    pub address: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 1, max = 120))]
    pub state: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(url, length(max = 500))]
    pub image_link: Option<String>,
    #[validate(url, length(max = 120))]
    pub facebook_link: String,
    #[validate(url, length(max = 120))]
    pub website: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl NewVenue {
    /// Приводит поля формы к каноничному виду и проверяет их
    pub fn normalized(self) -> Result<Self> {
        let venue = NewVenue {
            name: self.name.trim().to_string(),
            genres: normalize_genres(self.genres),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: self.phone.trim().to_string(),
            image_link: non_empty(self.image_link),
            facebook_link: self.facebook_link.trim().to_string(),
            website: non_empty(self.website),
            seeking_talent: self.seeking_talent,
            seeking_description: non_empty(self.seeking_description),
        };
        venue.validate()?;
        Ok(venue)
    }

    pub fn into_venue(self, id: i64) -> Venue {
        Venue {
            id,
            name: self.name,
            genres: self.genres,
            address: self.address,
            city: self.city,
            state: self.state,
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            website: self.website,
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description,
        }
    }
}

/// Частичное обновление: отсутствующее поле не меняется,
/// пустая строка очищает необязательное поле
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VenuePatch {
    #[serde(deserialize_with = "present_string")]
    pub name: Option<String>,
    pub genres: Option<Vec<String>>,
    #[serde(deserialize_with = "present_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub image_link: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub facebook_link: Option<String>,
    #[serde(deserialize_with = "present_string")]
    pub website: Option<String>,
    #[serde(deserialize_with = "optional_checkbox")]
    pub seeking_talent: Option<bool>,
    #[serde(deserialize_with = "present_string")]
    pub seeking_description: Option<String>,
}

impl VenuePatch {
    pub fn name(name: impl Into<String>) -> Self {
        VenuePatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Применяет изменения к копии записи и валидирует результат
    pub fn apply(self, venue: &Venue) -> Result<Venue> {
        let mut updated = venue.clone();
        if let Some(name) = self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(genres) = self.genres {
            updated.genres = normalize_genres(genres);
        }
        if let Some(address) = self.address {
            updated.address = address.trim().to_string();
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
        if let Some(image_link) = self.image_link {
            updated.image_link = non_empty(Some(image_link));
        }
        if let Some(facebook_link) = self.facebook_link {
            updated.facebook_link = facebook_link.trim().to_string();
        }
        if let Some(website) = self.website {
            updated.website = non_empty(Some(website));
        }
        if let Some(seeking_talent) = self.seeking_talent {
            updated.seeking_talent = seeking_talent;
        }
        if let Some(description) = self.seeking_description {
            updated.seeking_description = non_empty(Some(description));
        }
        updated.validate()?;
        Ok(updated)
    }
}
