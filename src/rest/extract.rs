use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use tracing::debug;

use crate::error::TaskError;

/// `axum::Json` with rejections mapped to the shared error envelope.
///
/// The stock extractor answers missing or unparseable bodies with plain-text
/// 415/422 responses; every error this API returns must be
/// `{"error": {"message": ...}}` JSON with status 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = TaskError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(err = %rejection.body_text(), "request body rejected");
                Err(TaskError::Malformed("Invalid request format".to_string()))
            }
        }
    }
}
