//! Reveal gate — the per-participant visibility state machine.
//!
//! The `AssignedHidden → AssignedRevealed` transition is computed lazily on
//! read by comparing the stored `reveal_at` to the wall clock; there is no
//! timer or background scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::Participant;

/// Visibility of a participant's assignment, computed at query time.
///
/// `Viewed` is terminal for an assignment; only a shuffle (which skips
/// viewed participants) can start the machine over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
  /// No assignment yet.
  Pending,
  /// An assignment exists but `reveal_at` has not passed.
  AssignedHidden,
  /// An assignment exists and is visible, but has not been read yet.
  AssignedRevealed,
  /// The owner has seen the assignment (`match_viewed` is set).
  Viewed,
}

impl RevealState {
  pub fn of(participant: &Participant, now: DateTime<Utc>) -> Self {
    match (participant.matched_to, participant.match_viewed) {
      (None, _) => RevealState::Pending,
      (Some(_), true) => RevealState::Viewed,
      (Some(_), false) if now < participant.reveal_at => {
        RevealState::AssignedHidden
      }
      (Some(_), false) => RevealState::AssignedRevealed,
    }
  }

  pub fn is_viewed(self) -> bool { matches!(self, RevealState::Viewed) }
}

/// The read-only projection returned by
/// [`MatchEngine::get_match_details`](crate::engine::MatchEngine::get_match_details).
///
/// Both counterparts are withheld until `reveal_at` has passed, so the UI
/// can always distinguish "still waiting" from an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetails {
  pub state:      RevealState,
  pub matched_to: Option<Participant>,
  pub matched_by: Option<Participant>,
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use uuid::Uuid;

  use super::*;
  use crate::{group::GroupKey, participant::Gender};

  fn member(reveal_offset: Duration) -> Participant {
    let now = Utc::now();
    Participant {
      participant_id: Uuid::new_v4(),
      name:           "p".to_owned(),
      contact_handle: "+15550000".to_owned(),
      gender:         Gender::Other,
      group:          GroupKey::new("acme").unwrap(),
      signup_at:      now - Duration::hours(1),
      reveal_at:      now + reveal_offset,
      matched_to:     None,
      matched_by:     None,
      match_viewed:   false,
    }
  }

  #[test]
  fn unassigned_is_pending_regardless_of_clock() {
    let now = Utc::now();
    assert_eq!(RevealState::of(&member(Duration::hours(2)), now), RevealState::Pending);
    assert_eq!(RevealState::of(&member(-Duration::hours(2)), now), RevealState::Pending);
  }

  #[test]
  fn assigned_before_reveal_is_hidden() {
    let mut p = member(Duration::hours(2));
    p.matched_to = Some(Uuid::new_v4());
    assert_eq!(RevealState::of(&p, Utc::now()), RevealState::AssignedHidden);
  }

  #[test]
  fn assigned_after_reveal_is_revealed() {
    let mut p = member(-Duration::hours(2));
    p.matched_to = Some(Uuid::new_v4());
    assert_eq!(RevealState::of(&p, Utc::now()), RevealState::AssignedRevealed);
  }

  #[test]
  fn viewed_flag_wins_over_clock() {
    let mut p = member(Duration::hours(2));
    p.matched_to = Some(Uuid::new_v4());
    p.match_viewed = true;
    assert!(RevealState::of(&p, Utc::now()).is_viewed());
  }
}
