//! Assignment policy — pure candidate selection for one participant.
//!
//! Three-tier fallback, availability over optimality: every participant in a
//! non-empty pool eventually gets *some* assignment, at the cost of relaxing
//! gender preference and injectivity under scarcity.

use rand::{Rng, seq::SliceRandom};
use uuid::Uuid;

use crate::participant::Participant;

/// Pick a match target for `participant` from `pool`.
///
/// The pool may include `participant` itself; self is always excluded.
/// Ordered preference, first non-empty tier wins:
///
/// 1. unclaimed candidates of the opposite gender,
/// 2. unclaimed candidates of any gender,
/// 3. the full pool, collisions permitted.
///
/// Selection within the winning tier is uniform-random over `rng`. Returns
/// `None` only when no other participant exists — a normal result, not an
/// error.
pub fn choose_candidate<R: Rng + ?Sized>(
  participant: &Participant,
  pool: &[Participant],
  rng: &mut R,
) -> Option<Uuid> {
  let others: Vec<&Participant> = pool
    .iter()
    .filter(|c| c.participant_id != participant.participant_id)
    .collect();
  if others.is_empty() {
    return None;
  }

  let tier1: Vec<&Participant> = match participant.gender.opposite() {
    Some(wanted) => others
      .iter()
      .copied()
      .filter(|c| c.gender == wanted && !c.is_claimed())
      .collect(),
    None => Vec::new(),
  };

  let winning = if !tier1.is_empty() {
    tier1
  } else {
    let tier2: Vec<&Participant> =
      others.iter().copied().filter(|c| !c.is_claimed()).collect();
    if !tier2.is_empty() { tier2 } else { others }
  };

  winning.choose(rng).map(|c| c.participant_id)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use rand::{SeedableRng, rngs::StdRng};
  use uuid::Uuid;

  use super::*;
  use crate::{group::GroupKey, participant::Gender};

  fn member(name: &str, gender: Gender) -> Participant {
    let now = Utc::now();
    Participant {
      participant_id: Uuid::new_v4(),
      name:           name.to_owned(),
      contact_handle: format!("+1555{name}"),
      gender,
      group:          GroupKey::new("acme").unwrap(),
      signup_at:      now,
      reveal_at:      now,
      matched_to:     None,
      matched_by:     None,
      match_viewed:   false,
    }
  }

  fn rng() -> StdRng { StdRng::seed_from_u64(7) }

  #[test]
  fn prefers_unclaimed_opposite_gender() {
    let me = member("me", Gender::Male);
    let claimed = {
      let mut f = member("claimed", Gender::Female);
      f.matched_by = Some(Uuid::new_v4());
      f
    };
    let free = member("free", Gender::Female);
    let same = member("same", Gender::Male);

    let pool = vec![claimed, free.clone(), same];
    for _ in 0..20 {
      let pick = choose_candidate(&me, &pool, &mut rng()).unwrap();
      assert_eq!(pick, free.participant_id);
    }
  }

  #[test]
  fn falls_back_to_any_unclaimed() {
    let me = member("me", Gender::Male);
    let claimed = {
      let mut f = member("claimed", Gender::Female);
      f.matched_by = Some(Uuid::new_v4());
      f
    };
    let same = member("same", Gender::Male);

    let pick =
      choose_candidate(&me, &[claimed, same.clone()], &mut rng()).unwrap();
    assert_eq!(pick, same.participant_id);
  }

  #[test]
  fn falls_back_to_claimed_pool_under_scarcity() {
    let me = member("me", Gender::Other);
    let claimed = {
      let mut c = member("claimed", Gender::Other);
      c.matched_by = Some(Uuid::new_v4());
      c
    };

    let pick = choose_candidate(&me, &[claimed.clone()], &mut rng()).unwrap();
    assert_eq!(pick, claimed.participant_id);
  }

  #[test]
  fn other_gender_has_no_opposite_tier() {
    // An "other" participant should pick any unclaimed candidate, never
    // privileging a gender.
    let me = member("me", Gender::Other);
    let m = member("m", Gender::Male);
    let f = member("f", Gender::Female);

    let pool = vec![m.clone(), f.clone()];
    let mut seen = std::collections::HashSet::new();
    for seed in 0..64u64 {
      let mut rng = StdRng::seed_from_u64(seed);
      seen.insert(choose_candidate(&me, &pool, &mut rng).unwrap());
    }
    assert!(seen.contains(&m.participant_id));
    assert!(seen.contains(&f.participant_id));
  }

  #[test]
  fn never_picks_self() {
    let me = member("me", Gender::Female);
    let other = member("other", Gender::Male);

    let pool = vec![me.clone(), other.clone()];
    for seed in 0..32u64 {
      let mut rng = StdRng::seed_from_u64(seed);
      let pick = choose_candidate(&me, &pool, &mut rng).unwrap();
      assert_eq!(pick, other.participant_id);
    }
  }

  #[test]
  fn empty_pool_yields_none() {
    let me = member("me", Gender::Male);
    assert!(choose_candidate(&me, &[], &mut rng()).is_none());
    assert!(choose_candidate(&me, &[me.clone()], &mut rng()).is_none());
  }

  #[test]
  fn seeded_rng_is_deterministic() {
    let me = member("me", Gender::Male);
    let pool: Vec<Participant> =
      (0..8).map(|i| member(&format!("f{i}"), Gender::Female)).collect();

    let a = choose_candidate(&me, &pool, &mut StdRng::seed_from_u64(42));
    let b = choose_candidate(&me, &pool, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
  }
}
