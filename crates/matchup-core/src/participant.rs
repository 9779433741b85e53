//! Participant — the unit of matching.
//!
//! A participant's match pointers (`matched_to`, `matched_by`) are written
//! only by the engine, always as an inverse pair in one store transaction.
//! The UI never mutates them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::group::GroupKey;

/// Self-declared gender, used only for the tier-1 candidate preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Other,
}

impl Gender {
  /// The preferred counterpart gender, if one exists. `Other` has no
  /// opposite, so its tier-1 pool is always empty.
  pub fn opposite(self) -> Option<Gender> {
    match self {
      Gender::Male => Some(Gender::Female),
      Gender::Female => Some(Gender::Male),
      Gender::Other => None,
    }
  }
}

/// A registered member of one group, eligible for matching only within it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
  pub participant_id: Uuid,
  pub name:           String,
  /// Messaging handle shown to the counterpart once the match is revealed.
  pub contact_handle: String,
  pub gender:         Gender,
  pub group:          GroupKey,
  pub signup_at:      DateTime<Utc>,
  /// `signup_at` plus the configured delay; immutable after registration.
  pub reveal_at:      DateTime<Utc>,
  /// Who this participant is matched to (out-edge). Stable once set, until
  /// a shuffle clears it.
  pub matched_to:     Option<Uuid>,
  /// Who matched to this participant (in-edge). Kept as the inverse of the
  /// claimant's `matched_to`.
  pub matched_by:     Option<Uuid>,
  /// Flipped `false → true` on the first revealed read; locks the
  /// assignment against shuffling.
  pub match_viewed:   bool,
}

impl Participant {
  /// Whether this participant is currently the target of someone's
  /// `matched_to` edge.
  pub fn is_claimed(&self) -> bool { self.matched_by.is_some() }
}

/// Registration input; ids and timestamps are assigned by the engine.
#[derive(Debug, Clone)]
pub struct NewParticipant {
  pub name:           String,
  pub contact_handle: String,
  pub gender:         Gender,
  pub group:          GroupKey,
}
