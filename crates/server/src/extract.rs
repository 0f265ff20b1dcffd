//! JSON extractor whose rejection matches the API error contract.
//!
//! axum's stock `Json` rejects malformed bodies with a 422; the API returns
//! 400 for anything the client sent wrong, so handlers use this wrapper.

use axum::extract::{FromRequest, Request, rejection::JsonRejection};

use crate::error::ApiError;

pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
