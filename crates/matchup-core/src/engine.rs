//! The matching engine — orchestrates assignment, reveal, and shuffle over
//! any [`ParticipantStore`].
//!
//! Concurrency control is optimistic throughout: every assignment is a
//! snapshot → choose → compare-and-set claim, retried from a fresh snapshot
//! on conflict. Both `run_matching` and `shuffle` use the same loop, so the
//! ordering guarantees are uniform: per participant at most one claim ever
//! wins, and a shuffle's generation bump invalidates claims made from a
//! pre-shuffle snapshot.

use std::{
  collections::HashSet,
  sync::{Mutex, PoisonError},
};

use chrono::{Duration, Utc};
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

use crate::{
  error::Error,
  group::GroupKey,
  participant::{NewParticipant, Participant},
  policy,
  reveal::{MatchDetails, RevealState},
  store::{ClaimOutcome, ParticipantStore},
};

/// Engine over a store backend.
///
/// Holds its own seedable RNG so tests can pin selection outcomes; the
/// engine never touches an ambient global generator.
pub struct MatchEngine<S> {
  store:        S,
  reveal_delay: Duration,
  rng:          Mutex<StdRng>,
}

impl<S: ParticipantStore> MatchEngine<S> {
  /// Engine with an entropy-seeded RNG. `reveal_delay` is the fixed
  /// signup-to-reveal interval applied at registration.
  pub fn new(store: S, reveal_delay: Duration) -> Self {
    Self {
      store,
      reveal_delay,
      rng: Mutex::new(StdRng::from_entropy()),
    }
  }

  /// Engine with a deterministic RNG — selection within a policy tier is
  /// reproducible for a fixed seed and call sequence.
  pub fn with_seed(store: S, reveal_delay: Duration, seed: u64) -> Self {
    Self {
      store,
      reveal_delay,
      rng: Mutex::new(StdRng::seed_from_u64(seed)),
    }
  }

  /// The underlying store, for read-only collaborators (profile lookups,
  /// admin listings). All match-edge mutation stays inside the engine.
  pub fn store(&self) -> &S { &self.store }

  // ── Registration ──────────────────────────────────────────────────────

  /// Create and persist a participant. Timestamps are assigned here:
  /// `reveal_at = now + reveal_delay`, immutable thereafter.
  pub async fn register(
    &self,
    input: NewParticipant,
  ) -> Result<Participant, Error<S::Error>> {
    let now = Utc::now();
    let participant = Participant {
      participant_id: Uuid::new_v4(),
      name:           input.name,
      contact_handle: input.contact_handle,
      gender:         input.gender,
      group:          input.group,
      signup_at:      now,
      reveal_at:      now + self.reveal_delay,
      matched_to:     None,
      matched_by:     None,
      match_viewed:   false,
    };
    self.store.add_participant(participant.clone()).await?;
    tracing::info!(
      id = %participant.participant_id,
      group = %participant.group,
      "registered participant"
    );
    Ok(participant)
  }

  // ── Matching ──────────────────────────────────────────────────────────

  /// Assign every unassigned member of `group` whose reveal time has
  /// passed. Returns the number newly assigned in this invocation.
  ///
  /// Idempotent: already-assigned members are no-ops, so re-invoking with
  /// no new eligible members returns 0 and mutates nothing. An empty or
  /// unknown group also returns 0.
  pub async fn run_matching(
    &self,
    group: &GroupKey,
  ) -> Result<usize, Error<S::Error>> {
    let now = Utc::now();
    let assigned = self.assign_where(group, |p| now >= p.reveal_at).await?;
    if assigned > 0 {
      tracing::info!(%group, assigned, "matching pass complete");
    }
    Ok(assigned)
  }

  /// Immediate single-participant assignment, bypassing the reveal-time
  /// gate for the assignment step only. Returns the counterpart — the
  /// existing one if the participant is already assigned — or `None` when
  /// the group holds no candidate (the participant stays `Pending` and may
  /// retry).
  ///
  /// The stored record is not marked viewed; the normal reveal path still
  /// applies at `reveal_at`.
  pub async fn try_instant_match(
    &self,
    id: Uuid,
  ) -> Result<Option<Participant>, Error<S::Error>> {
    let participant = self
      .store
      .get_participant(id)
      .await?
      .ok_or(Error::ParticipantNotFound(id))?;
    if let Some(to) = participant.matched_to {
      return Ok(self.store.get_participant(to).await?);
    }

    let group = participant.group.clone();
    loop {
      let snapshot = self.store.group_snapshot(&group).await?;
      let me = snapshot
        .member(id)
        .ok_or(Error::ParticipantNotFound(id))?;
      if let Some(to) = me.matched_to {
        // A concurrent invocation won the race; same outcome.
        return Ok(self.store.get_participant(to).await?);
      }

      let Some(to) = self.choose(me, &snapshot.members) else {
        return Ok(None);
      };
      match self
        .store
        .claim_match(&group, snapshot.generation, id, to)
        .await?
      {
        ClaimOutcome::Claimed => {
          tracing::info!(%id, %to, %group, "instant match assigned");
          return Ok(self.store.get_participant(to).await?);
        }
        ClaimOutcome::AlreadyAssigned | ClaimOutcome::StaleGroup => continue,
      }
    }
  }

  // ── Shuffle ───────────────────────────────────────────────────────────

  /// Re-randomize assignments for every member of `group` who has not
  /// viewed theirs; viewed members keep their exact pre-shuffle
  /// `matched_to`. Returns the count actually reassigned.
  ///
  /// Members who held an assignment before the shuffle are reassigned
  /// immediately (their eligibility was already established, possibly via
  /// instant match); never-assigned members still wait for `reveal_at`.
  pub async fn shuffle(
    &self,
    group: &GroupKey,
  ) -> Result<usize, Error<S::Error>> {
    let cleared = self.store.clear_unviewed_edges(group).await?;
    if cleared.is_empty() {
      return Ok(0);
    }

    let previously_matched: HashSet<Uuid> = cleared
      .iter()
      .filter(|c| c.had_match)
      .map(|c| c.participant_id)
      .collect();
    let now = Utc::now();

    let reassigned = self
      .assign_where(group, |p| {
        previously_matched.contains(&p.participant_id) || now >= p.reveal_at
      })
      .await?;
    tracing::info!(%group, cleared = cleared.len(), reassigned, "shuffled group");
    Ok(reassigned)
  }

  // ── Reveal ────────────────────────────────────────────────────────────

  /// Read-only projection of a participant's match, gated by the reveal
  /// state machine. The first call after `reveal_at` with a non-empty
  /// `matched_to` flips `match_viewed` as a side effect, locking the
  /// assignment against shuffles.
  pub async fn get_match_details(
    &self,
    id: Uuid,
  ) -> Result<MatchDetails, Error<S::Error>> {
    let participant = self
      .store
      .get_participant(id)
      .await?
      .ok_or(Error::ParticipantNotFound(id))?;
    let now = Utc::now();
    let state = RevealState::of(&participant, now);

    if now < participant.reveal_at {
      // Pending or AssignedHidden: nothing is disclosed, no side effect.
      return Ok(MatchDetails { state, matched_to: None, matched_by: None });
    }

    let matched_to = match participant.matched_to {
      Some(to) => self.store.get_participant(to).await?,
      None => None,
    };
    let matched_by = match participant.matched_by {
      Some(by) => self.store.get_participant(by).await?,
      None => None,
    };

    // The flip is compare-and-set on the edge we just disclosed: if a
    // shuffle re-dealt this participant between the read above and here,
    // the flip loses and the read stays AssignedRevealed.
    let state = if let Some(to) = participant.matched_to
      && state == RevealState::AssignedRevealed
      && matched_to.is_some()
      && self.store.mark_viewed(id, to).await?
    {
      RevealState::Viewed
    } else {
      state
    };

    Ok(MatchDetails { state, matched_to, matched_by })
  }

  // ── Internals ─────────────────────────────────────────────────────────

  fn choose(
    &self,
    participant: &Participant,
    pool: &[Participant],
  ) -> Option<Uuid> {
    // The lock is never held across an await point.
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    policy::choose_candidate(participant, pool, &mut *rng)
  }

  /// One optimistic assignment pass: claim a candidate for every unassigned
  /// member satisfying `eligible`. On any claim conflict the whole pass
  /// restarts from a fresh snapshot; conflicts shrink the pending set, so
  /// the pass terminates.
  async fn assign_where(
    &self,
    group: &GroupKey,
    eligible: impl Fn(&Participant) -> bool,
  ) -> Result<usize, Error<S::Error>> {
    let mut assigned = 0usize;
    let mut snapshot = self.store.group_snapshot(group).await?;

    'pass: loop {
      let pending: Vec<Uuid> = snapshot
        .members
        .iter()
        .filter(|p| p.matched_to.is_none() && eligible(p))
        .map(|p| p.participant_id)
        .collect();

      for id in pending {
        let Some(from) = snapshot.member(id) else { continue };
        if from.matched_to.is_some() {
          continue;
        }
        let Some(to) = self.choose(from, &snapshot.members) else {
          continue;
        };

        match self
          .store
          .claim_match(group, snapshot.generation, id, to)
          .await?
        {
          ClaimOutcome::Claimed => {
            // Keep the local view coherent so later picks in this pass see
            // the claim.
            for p in &mut snapshot.members {
              if p.participant_id == id {
                p.matched_to = Some(to);
              }
              if p.participant_id == to {
                p.matched_by = Some(id);
              }
            }
            assigned += 1;
            tracing::debug!(from = %id, %to, "match edge committed");
          }
          ClaimOutcome::AlreadyAssigned | ClaimOutcome::StaleGroup => {
            tracing::debug!(from = %id, "claim conflict, refreshing snapshot");
            snapshot = self.store.group_snapshot(group).await?;
            continue 'pass;
          }
        }
      }
      break;
    }

    Ok(assigned)
  }
}
