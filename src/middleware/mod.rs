use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::ListingError;

/// Извлекатель HTML-формы (application/x-www-form-urlencoded).
/// В отличие от axum::Form понимает повторяющиеся ключи: genres=a&genres=b
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlForm<T>(pub T);

impl<T, S> FromRequest<S> for HtmlForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        serde_html_form::from_bytes(&body)
            .map(HtmlForm)
            .map_err(|e| {
                tracing::debug!("form decode error: {}", e);
                ListingError::Validation(format!("form: {}", e)).into_response()
            })
    }
}
