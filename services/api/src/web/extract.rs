//! services/api/src/web/extract.rs
//!
//! Request extractors shared by the handlers.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// A JSON body whose rejections (bad syntax, missing fields, values outside an
/// enum, wrong content type) all become `ApiError::InvalidPayload`.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Rejected payload: {}", rejection.body_text());
                Err(ApiError::InvalidPayload(rejection.body_text()))
            }
        }
    }
}

/// The verified session id carried by the request's cookie, if any.
///
/// Never rejects: a missing or forged cookie is simply `None`.
pub struct SessionToken(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.cookie.session_id(&parts.headers)))
    }
}
