//! Handlers for `/participants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/participants` | Body: [`RegisterBody`]; 201 + profile |
//! | `GET`  | `/participants/:id` | Profile projection, 404 if unknown |
//! | `GET`  | `/participants/:id/match` | Reveal-gated; may flip `match_viewed` |
//! | `POST` | `/participants/:id/instant-match` | Assignment now, reveal gate intact |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use matchup_core::{
  MatchEngine,
  group::GroupKey,
  participant::{Gender, NewParticipant, Participant},
  reveal::RevealState,
  store::ParticipantStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Projections ──────────────────────────────────────────────────────────────

/// The public view of a participant. Match pointers are deliberately absent —
/// they are only ever disclosed through the reveal-gated match endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileBody {
  pub participant_id: Uuid,
  pub name:           String,
  pub contact_handle: String,
  pub gender:         Gender,
  pub group:          GroupKey,
  pub signup_at:      DateTime<Utc>,
  pub reveal_at:      DateTime<Utc>,
  pub match_viewed:   bool,
}

impl From<Participant> for ProfileBody {
  fn from(p: Participant) -> Self {
    ProfileBody {
      participant_id: p.participant_id,
      name:           p.name,
      contact_handle: p.contact_handle,
      gender:         p.gender,
      group:          p.group,
      signup_at:      p.signup_at,
      reveal_at:      p.reveal_at,
      match_viewed:   p.match_viewed,
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchDetailsBody {
  pub state:      RevealState,
  pub matched_to: Option<ProfileBody>,
  pub matched_by: Option<ProfileBody>,
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /participants`. The group name is normalized
/// server-side; a name without letters is a 400.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:           String,
  pub contact_handle: String,
  pub gender:         Gender,
  pub group:          String,
}

/// `POST /participants` — returns 201 + the stored profile.
pub async fn register<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParticipantStore,
{
  let group = GroupKey::new(&body.group)?;
  let participant = engine
    .register(NewParticipant {
      name:           body.name,
      contact_handle: body.contact_handle,
      gender:         body.gender,
      group,
    })
    .await
    .map_err(ApiError::from_engine)?;
  Ok((StatusCode::CREATED, Json(ProfileBody::from(participant))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /participants/:id`
pub async fn get_one<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProfileBody>, ApiError>
where
  S: ParticipantStore,
{
  let participant = engine
    .store()
    .get_participant(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("participant {id} not found")))?;
  Ok(Json(ProfileBody::from(participant)))
}

// ─── Match details ────────────────────────────────────────────────────────────

/// `GET /participants/:id/match` — reveal-gated projection. The first call
/// after `reveal_at` with a non-empty match flips `match_viewed`.
pub async fn match_details<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MatchDetailsBody>, ApiError>
where
  S: ParticipantStore,
{
  let details = engine
    .get_match_details(id)
    .await
    .map_err(ApiError::from_engine)?;
  Ok(Json(MatchDetailsBody {
    state:      details.state,
    matched_to: details.matched_to.map(ProfileBody::from),
    matched_by: details.matched_by.map(ProfileBody::from),
  }))
}

// ─── Instant match ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct InstantMatchBody {
  /// The counterpart, or `null` when no candidate is available right now —
  /// a normal "try again later" result, not an error.
  pub matched_to: Option<ProfileBody>,
}

/// `POST /participants/:id/instant-match`
pub async fn instant_match<S>(
  State(engine): State<Arc<MatchEngine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<InstantMatchBody>, ApiError>
where
  S: ParticipantStore,
{
  let counterpart = engine
    .try_instant_match(id)
    .await
    .map_err(ApiError::from_engine)?;
  Ok(Json(InstantMatchBody {
    matched_to: counterpart.map(ProfileBody::from),
  }))
}
