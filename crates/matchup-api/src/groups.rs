//! Handlers for `/groups` endpoints — the admin trigger surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups` | Derived per-group stats |
//! | `POST` | `/groups/:key/match` | Run matching for the group |
//! | `POST` | `/groups/:key/shuffle` | Re-randomize unviewed assignments |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use matchup_core::{
  MatchEngine,
  group::{GroupKey, GroupStats},
  store::ParticipantStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /groups`
pub async fn list<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
) -> Result<Json<Vec<GroupStats>>, ApiError>
where
  S: ParticipantStore,
{
  let stats = engine
    .store()
    .group_stats()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(stats))
}

// ─── Run matching ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchRunBody {
  /// Participants newly assigned by this invocation; 0 when nothing was
  /// eligible (including unknown groups).
  pub assigned: usize,
}

/// `POST /groups/:key/match` — admin "Match" action; also invoked after
/// registration and countdown completion.
pub async fn run_matching<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
  Path(key): Path<String>,
) -> Result<Json<MatchRunBody>, ApiError>
where
  S: ParticipantStore,
{
  let group = GroupKey::new(&key)?;
  let assigned = engine
    .run_matching(&group)
    .await
    .map_err(ApiError::from_engine)?;
  Ok(Json(MatchRunBody { assigned }))
}

// ─── Shuffle ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ShuffleBody {
  pub reassigned: usize,
}

/// `POST /groups/:key/shuffle` — administrator-triggered only.
pub async fn shuffle<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
  Path(key): Path<String>,
) -> Result<Json<ShuffleBody>, ApiError>
where
  S: ParticipantStore,
{
  let group = GroupKey::new(&key)?;
  let reassigned = engine
    .shuffle(&group)
    .await
    .map_err(ApiError::from_engine)?;
  Ok(Json(ShuffleBody { reassigned }))
}
