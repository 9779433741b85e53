//! The `ParticipantStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `matchup-store-sqlite`). The engine and the HTTP layer depend on this
//! abstraction, not on any concrete backend.
//!
//! All mutation of match edges goes through [`claim_match`] and
//! [`clear_unviewed_edges`], each of which must execute as a single storage
//! transaction — this is what lets concurrent engine invocations race safely
//! (see [`ClaimOutcome`]).
//!
//! [`claim_match`]: ParticipantStore::claim_match
//! [`clear_unviewed_edges`]: ParticipantStore::clear_unviewed_edges

use std::future::Future;

use uuid::Uuid;

use crate::{
  group::{GroupKey, GroupStats},
  participant::Participant,
};

// ─── Snapshot & outcome types ────────────────────────────────────────────────

/// A group's membership together with the generation counter under which it
/// was read. Claims carry the generation back so the store can reject writes
/// based on a stale view of the group.
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
  pub generation: i64,
  pub members:    Vec<Participant>,
}

impl GroupSnapshot {
  pub fn member(&self, id: Uuid) -> Option<&Participant> {
    self.members.iter().find(|p| p.participant_id == id)
  }
}

/// Result of a compare-and-set match claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
  /// Both edge halves were written and committed.
  Claimed,
  /// A concurrent writer assigned `from` first. A no-op for the caller,
  /// never a failure.
  AlreadyAssigned,
  /// The group generation advanced since the snapshot was taken (a shuffle
  /// ran). The caller must re-read before claiming again.
  StaleGroup,
}

/// One unviewed participant processed by
/// [`ParticipantStore::clear_unviewed_edges`].
#[derive(Debug, Clone)]
pub struct ClearedAssignment {
  pub participant_id: Uuid,
  /// Whether the participant held a `matched_to` edge before the clear.
  pub had_match:      bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a participant/group store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ParticipantStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Records ───────────────────────────────────────────────────────────

  /// Persist a fully-built participant. Creates the group row (generation
  /// zero) if this is the group's first member.
  fn add_participant(
    &self,
    participant: Participant,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a participant by id. Returns `None` if not found.
  fn get_participant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  /// All participants referencing `group`, in signup order. An unknown
  /// group is simply empty.
  fn list_group<'a>(
    &'a self,
    group: &'a GroupKey,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + 'a;

  // ── Concurrency-aware reads & writes ──────────────────────────────────

  /// Read the group's generation and membership in one transactional scope.
  fn group_snapshot<'a>(
    &'a self,
    group: &'a GroupKey,
  ) -> impl Future<Output = Result<GroupSnapshot, Self::Error>> + Send + 'a;

  /// Atomically write the directed edge `from → to`:
  ///
  /// - verify the group generation still equals `expected_generation`,
  /// - set `from.matched_to = to` only if it is currently unset,
  /// - set `to.matched_by = from` (overwriting — tier-3 collisions keep the
  ///   most recent claimant),
  ///
  /// committing all of it as one unit. No reader may ever observe the edge
  /// half-written.
  fn claim_match<'a>(
    &'a self,
    group: &'a GroupKey,
    expected_generation: i64,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<ClaimOutcome, Self::Error>> + Send + 'a;

  /// In one transaction: null out `matched_to` for every unviewed member of
  /// `group`, null out the counterpart `matched_by` pointers those edges
  /// created (even on viewed counterparts — pointer only, their
  /// `match_viewed` flag and own `matched_to` are untouched), and bump the
  /// group generation so stale in-flight claims fail.
  ///
  /// Returns every unviewed member, flagging which ones actually lost an
  /// edge.
  fn clear_unviewed_edges<'a>(
    &'a self,
    group: &'a GroupKey,
  ) -> impl Future<Output = Result<Vec<ClearedAssignment>, Self::Error>> + Send + 'a;

  /// Conditional `match_viewed` flip, `false → true` only, and only while
  /// `matched_to` still equals `expected_to` — the edge the reader actually
  /// disclosed. A flip racing a shuffle-and-reassign loses and returns
  /// `false`; it must never lock an assignment the owner did not see.
  fn mark_viewed(
    &self,
    id: Uuid,
    expected_to: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Admin reads ───────────────────────────────────────────────────────

  /// Derived per-group counts, ordered by key.
  fn group_stats(
    &self,
  ) -> impl Future<Output = Result<Vec<GroupStats>, Self::Error>> + Send + '_;
}
