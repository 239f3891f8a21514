pub mod artist;
pub mod show;
pub mod venue;

pub use artist::{Artist, ArtistPatch, NewArtist};
pub use show::{NewShow, Scheduled, Show, ShowForm, ShowListing, ShowPatch};
pub use venue::{NewVenue, Venue, VenuePatch};

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::ValidationError;

/// Пара (город, штат), по которой группируются площадки
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize)]
pub struct Area {
    pub city: String,
    pub state: String,
}

/// Общие поля Venue и Artist, нужные поиску и группировке
pub trait Listed {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    /// Принадлежит ли show этой сущности
    fn owns(&self, venue_id: i64, artist_id: i64) -> bool;
}

// Телефон: цифры, пробелы, '-', '.', скобки, '+' в начале; минимум 7 цифр
pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let allowed = trimmed.char_indices().all(|(i, c)| {
        c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')') || (c == '+' && i == 0)
    });
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();

    if allowed && digits >= 7 {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

/// Жанры - открытое множество: обрезаем пробелы и выкидываем пустые
pub(crate) fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim();
        if !genre.is_empty() && !out.iter().any(|g| g == genre) {
            out.push(genre.to_string());
        }
    }
    out
}

/// Пустая строка из формы означает "нет значения"
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim();
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    })
}

fn parse_checkbox(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "on" | "true" | "1"
    )
}

/// HTML checkbox: "y", "on", "true", "1" - включен, остальное - выключен
pub(crate) fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_checkbox(&raw))
}

pub(crate) fn optional_checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|r| parse_checkbox(&r)))
}

/// Поле патча, присланное формой: пустое значение остаётся `Some("")`,
/// отсутствующее поле даёт `None` через `#[serde(default)]`
pub(crate) fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}
