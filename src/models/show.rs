use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{ListingError, Result};

/// Форматы start_time, которые принимает форма
const START_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Всё, что можно разложить на прошедшие и предстоящие
pub trait Scheduled {
    fn start_time(&self) -> NaiveDateTime;
    fn venue_id(&self) -> i64;
    fn artist_id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub artist_id: i64,
    pub venue_id: i64,
}

impl Scheduled for Show {
    fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    fn venue_id(&self) -> i64 {
        self.venue_id
    }

    fn artist_id(&self) -> i64 {
        self.artist_id
    }
}

/// Show вместе с именами и картинками обеих сторон
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ShowListing {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
}

impl Scheduled for ShowListing {
    fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    fn venue_id(&self) -> i64 {
        self.venue_id
    }

    fn artist_id(&self) -> i64 {
        self.artist_id
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewShow {
    #[validate(range(min = 1))]
    pub artist_id: i64,
    #[validate(range(min = 1))]
    pub venue_id: i64,
    pub start_time: NaiveDateTime,
}

impl NewShow {
    pub fn into_show(self, id: i64) -> Show {
        Show {
            id,
            start_time: self.start_time,
            artist_id: self.artist_id,
            venue_id: self.venue_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowPatch {
    pub artist_id: Option<i64>,
    pub venue_id: Option<i64>,
    pub start_time: Option<NaiveDateTime>,
}

impl ShowPatch {
    pub fn apply(self, show: &Show) -> Result<Show> {
        let updated = Show {
            id: show.id,
            start_time: self.start_time.unwrap_or(show.start_time),
            artist_id: self.artist_id.unwrap_or(show.artist_id),
            venue_id: self.venue_id.unwrap_or(show.venue_id),
        };
        if updated.artist_id < 1 {
            return Err(ListingError::invalid("artist_id", "range"));
        }
        if updated.venue_id < 1 {
            return Err(ListingError::invalid("venue_id", "range"));
        }
        Ok(updated)
    }
}

/// Сырые поля формы show; все строки, пустая строка = поле не задано
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: Option<String>,
    pub venue_id: Option<String>,
    pub start_time: Option<String>,
}

impl ShowForm {
    pub fn into_new_show(self) -> Result<NewShow> {
        let artist_id = parse_id("artist_id", self.artist_id)?
            .ok_or_else(|| ListingError::invalid("artist_id", "required"))?;
        let venue_id = parse_id("venue_id", self.venue_id)?
            .ok_or_else(|| ListingError::invalid("venue_id", "required"))?;
        let start_time = parse_start_time(self.start_time)?
            .ok_or_else(|| ListingError::invalid("start_time", "required"))?;

        let show = NewShow {
            artist_id,
            venue_id,
            start_time,
        };
        show.validate()?;
        Ok(show)
    }

    pub fn into_patch(self) -> Result<ShowPatch> {
        Ok(ShowPatch {
            artist_id: parse_id("artist_id", self.artist_id)?,
            venue_id: parse_id("venue_id", self.venue_id)?,
            start_time: parse_start_time(self.start_time)?,
        })
    }
}

fn present(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_id(field: &str, raw: Option<String>) -> Result<Option<i64>> {
    match present(raw) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ListingError::invalid(field, "not an integer")),
    }
}

pub fn parse_start_time(raw: Option<String>) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| ListingError::invalid("start_time", "malformed datetime"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2035, 4, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn start_time_formats() {
        for raw in ["2035-04-01 20:00:00", "2035-04-01 20:00", "2035-04-01T20:00"] {
            assert_eq!(parse_start_time(Some(raw.into())).unwrap(), Some(at(20, 0)));
        }
        assert!(parse_start_time(Some("next friday".into())).is_err());
        assert_eq!(parse_start_time(Some("  ".into())).unwrap(), None);
    }

    #[test]
    fn form_requires_every_field() {
        let form = ShowForm {
            artist_id: Some("1".into()),
            venue_id: None,
            start_time: Some("2035-04-01 20:00:00".into()),
        };
        let err = form.into_new_show().unwrap_err();
        assert!(matches!(err, ListingError::Validation(ref m) if m.contains("venue_id")));
    }

    #[test]
    fn form_rejects_non_positive_ids() {
        let form = ShowForm {
            artist_id: Some("0".into()),
            venue_id: Some("3".into()),
            start_time: Some("2035-04-01 20:00".into()),
        };
        assert!(matches!(form.into_new_show(), Err(ListingError::Validation(_))));
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let show = Show {
            id: 9,
            start_time: at(20, 0),
            artist_id: 1,
            venue_id: 2,
        };
        let patch = ShowForm {
            start_time: Some("2035-04-01 21:30".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();

        let updated = patch.apply(&show).unwrap();
        assert_eq!(updated.start_time, at(21, 30));
        assert_eq!((updated.artist_id, updated.venue_id), (1, 2));
    }
}
