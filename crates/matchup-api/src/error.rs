//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use matchup_core::group::InvalidGroupKey;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// "No match yet" is never an error — handlers encode it as a 200 with an
/// empty/hidden payload, so clients can render "still waiting".
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Transient storage failure; surfaced as 503 so clients know a retry is
  /// reasonable.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map an engine error onto the HTTP taxonomy.
  pub fn from_engine<E>(err: matchup_core::Error<E>) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match err {
      matchup_core::Error::ParticipantNotFound(id) => {
        ApiError::NotFound(format!("participant {id} not found"))
      }
      matchup_core::Error::Store(e) => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<InvalidGroupKey> for ApiError {
  fn from(err: InvalidGroupKey) -> Self {
    ApiError::BadRequest(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
