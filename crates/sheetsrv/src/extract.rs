//! Extractors whose rejections are [`ServerError`]s, so a malformed request
//! is reported like any other failure.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::ServerError;

/// Query string parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// A json or url encoded form body, picked by content type.
///
/// A request without a content type and without a body decodes as an empty
/// object, so bodies made only of optional fields may be left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiBody<T>(pub T);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))?;
            return Ok(ApiBody(value));
        }

        if !req.headers().contains_key(CONTENT_TYPE) {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))?;
            if bytes.is_empty() {
                let value = serde_json::from_value(Value::Object(Map::new()))
                    .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
                return Ok(ApiBody(value));
            }
            let Json(value) = Json::<T>::from_bytes(&bytes)
                .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))?;
            return Ok(ApiBody(value));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))?;
        Ok(ApiBody(value))
    }
}
