//! JSON REST API for the matchup pairing service.
//!
//! Exposes an axum [`Router`] backed by a
//! [`MatchEngine`](matchup_core::MatchEngine) over any
//! [`ParticipantStore`](matchup_core::store::ParticipantStore). Auth, TLS,
//! and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", matchup_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod groups;
pub mod participants;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use matchup_core::{MatchEngine, store::ParticipantStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<MatchEngine<S>>) -> Router<()>
where
  S: ParticipantStore + 'static,
{
  Router::new()
    // Participants
    .route("/participants", post(participants::register::<S>))
    .route("/participants/{id}", get(participants::get_one::<S>))
    .route(
      "/participants/{id}/match",
      get(participants::match_details::<S>),
    )
    .route(
      "/participants/{id}/instant-match",
      post(participants::instant_match::<S>),
    )
    // Groups (admin trigger surface)
    .route("/groups", get(groups::list::<S>))
    .route("/groups/{key}/match", post(groups::run_matching::<S>))
    .route("/groups/{key}/shuffle", post(groups::shuffle::<S>))
    .with_state(engine)
}

// ─── Integration tests ────────────────────────────────────────────────────────
