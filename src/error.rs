use std::fmt;
use thiserror::Error;

/// Тип сущности, к которой относится ошибка
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Venue,
    Artist,
    Show,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Venue => "venue",
            EntityKind::Artist => "artist",
            EntityKind::Show => "show",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("validation failed: {0}")]
    Validation(String),

    /// Show ссылается на несуществующего артиста или площадку
    #[error("show references missing {entity} {id}")]
    ForeignKey { entity: EntityKind, id: i64 },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl ListingError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        ListingError::NotFound { entity, id }
    }

    pub fn invalid(field: &str, problem: &str) -> Self {
        ListingError::Validation(format!("{}: {}", field, problem))
    }
}

impl From<validator::ValidationErrors> for ListingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Сортируем поля, чтобы сообщение было детерминированным
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let problems: Vec<String> = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                format!("{}: {}", field, problems.join(", "))
            })
            .collect();
        fields.sort();
        ListingError::Validation(fields.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;
