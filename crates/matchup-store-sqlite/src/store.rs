//! [`SqliteStore`] — the SQLite implementation of [`ParticipantStore`].

use std::path::Path;

use matchup_core::{
  group::{GroupKey, GroupStats},
  participant::Participant,
  store::{ClaimOutcome, ClearedAssignment, GroupSnapshot, ParticipantStore},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawParticipant, decode_uuid, encode_dt, encode_gender, encode_uuid},
  schema::SCHEMA,
};

/// Column order shared by every `participants` SELECT; must stay in sync
/// with [`RawParticipant::from_row`].
const PARTICIPANT_COLUMNS: &str = "participant_id, name, contact_handle, \
   gender, group_key, signup_at, reveal_at, matched_to, matched_by, \
   match_viewed";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A matchup participant store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ParticipantStore impl ───────────────────────────────────────────────────

impl ParticipantStore for SqliteStore {
  type Error = Error;

  // ── Records ───────────────────────────────────────────────────────────────

  async fn add_participant(&self, participant: Participant) -> Result<()> {
    let id_str        = encode_uuid(participant.participant_id);
    let name          = participant.name;
    let handle        = participant.contact_handle;
    let gender_str    = encode_gender(participant.gender).to_owned();
    let group_str     = participant.group.as_str().to_owned();
    let signup_str    = encode_dt(participant.signup_at);
    let reveal_str    = encode_dt(participant.reveal_at);
    let matched_to    = participant.matched_to.map(encode_uuid);
    let matched_by    = participant.matched_by.map(encode_uuid);
    let match_viewed  = participant.match_viewed;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO groups (group_key, generation) VALUES (?1, 0)",
          rusqlite::params![group_str],
        )?;
        tx.execute(
          "INSERT INTO participants (
             participant_id, name, contact_handle, gender, group_key,
             signup_at, reveal_at, matched_to, matched_by, match_viewed
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            name,
            handle,
            gender_str,
            group_str,
            signup_str,
            reveal_str,
            matched_to,
            matched_by,
            match_viewed,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_participant(&self, id: Uuid) -> Result<Option<Participant>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PARTICIPANT_COLUMNS} FROM participants \
                 WHERE participant_id = ?1"
              ),
              rusqlite::params![id_str],
              RawParticipant::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn list_group(&self, group: &GroupKey) -> Result<Vec<Participant>> {
    let group_str = group.as_str().to_owned();

    let raws: Vec<RawParticipant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARTICIPANT_COLUMNS} FROM participants \
           WHERE group_key = ?1 ORDER BY signup_at, participant_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![group_str], RawParticipant::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParticipant::into_participant).collect()
  }

  // ── Concurrency-aware reads & writes ──────────────────────────────────────

  async fn group_snapshot(&self, group: &GroupKey) -> Result<GroupSnapshot> {
    let group_str = group.as_str().to_owned();

    let (generation, raws): (i64, Vec<RawParticipant>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let generation: i64 = tx
          .query_row(
            "SELECT generation FROM groups WHERE group_key = ?1",
            rusqlite::params![group_str],
            |r| r.get(0),
          )
          .optional()?
          .unwrap_or(0);

        let rows = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE group_key = ?1 ORDER BY signup_at, participant_id"
          ))?;
          stmt
            .query_map(rusqlite::params![group_str], RawParticipant::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok((generation, rows))
      })
      .await?;

    let members = raws
      .into_iter()
      .map(RawParticipant::into_participant)
      .collect::<Result<Vec<_>>>()?;

    Ok(GroupSnapshot { generation, members })
  }

  async fn claim_match(
    &self,
    group: &GroupKey,
    expected_generation: i64,
    from: Uuid,
    to: Uuid,
  ) -> Result<ClaimOutcome> {
    let group_str = group.as_str().to_owned();
    let from_str  = encode_uuid(from);
    let to_str    = encode_uuid(to);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let generation: Option<i64> = tx
          .query_row(
            "SELECT generation FROM groups WHERE group_key = ?1",
            rusqlite::params![group_str],
            |r| r.get(0),
          )
          .optional()?;
        if generation != Some(expected_generation) {
          // Dropping the transaction rolls it back.
          return Ok(ClaimOutcome::StaleGroup);
        }

        // Compare-and-set on "not yet assigned".
        let claimed = tx.execute(
          "UPDATE participants SET matched_to = ?1 \
           WHERE participant_id = ?2 AND matched_to IS NULL",
          rusqlite::params![to_str, from_str],
        )?;
        if claimed == 0 {
          return Ok(ClaimOutcome::AlreadyAssigned);
        }

        // Inverse half of the edge, committed in the same transaction.
        tx.execute(
          "UPDATE participants SET matched_by = ?1 WHERE participant_id = ?2",
          rusqlite::params![from_str, to_str],
        )?;

        tx.commit()?;
        Ok(ClaimOutcome::Claimed)
      })
      .await?;

    Ok(outcome)
  }

  async fn clear_unviewed_edges(
    &self,
    group: &GroupKey,
  ) -> Result<Vec<ClearedAssignment>> {
    let group_str = group.as_str().to_owned();

    let rows: Vec<(String, Option<String>)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let unviewed: Vec<(String, Option<String>)> = {
          let mut stmt = tx.prepare(
            "SELECT participant_id, matched_to FROM participants \
             WHERE group_key = ?1 AND match_viewed = 0",
          )?;
          stmt
            .query_map(rusqlite::params![group_str], |r| {
              Ok((r.get(0)?, r.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        // Drop the inverse pointer on each counterpart first. A viewed
        // counterpart only loses its matched_by pointer; its own edge and
        // match_viewed flag are untouched.
        for (id, matched_to) in &unviewed {
          if let Some(to) = matched_to {
            tx.execute(
              "UPDATE participants SET matched_by = NULL \
               WHERE participant_id = ?1 AND matched_by = ?2",
              rusqlite::params![to, id],
            )?;
          }
        }

        tx.execute(
          "UPDATE participants SET matched_to = NULL \
           WHERE group_key = ?1 AND match_viewed = 0",
          rusqlite::params![group_str],
        )?;

        // Invalidate any claim still in flight against the old membership.
        tx.execute(
          "UPDATE groups SET generation = generation + 1 WHERE group_key = ?1",
          rusqlite::params![group_str],
        )?;

        tx.commit()?;
        Ok(unviewed)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, matched_to)| {
        Ok(ClearedAssignment {
          participant_id: decode_uuid(&id)?,
          had_match:      matched_to.is_some(),
        })
      })
      .collect()
  }

  async fn mark_viewed(&self, id: Uuid, expected_to: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let to_str = encode_uuid(expected_to);

    let flipped = self
      .conn
      .call(move |conn| {
        // Compare-and-set on the disclosed edge; a reassigned row no longer
        // matches and the flip is refused.
        let n = conn.execute(
          "UPDATE participants SET match_viewed = 1 \
           WHERE participant_id = ?1 AND match_viewed = 0 \
             AND matched_to = ?2",
          rusqlite::params![id_str, to_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(flipped)
  }

  // ── Admin reads ───────────────────────────────────────────────────────────

  async fn group_stats(&self) -> Result<Vec<GroupStats>> {
    let rows: Vec<(String, i64, i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT group_key, COUNT(*), COUNT(matched_to), \
                  COALESCE(SUM(match_viewed), 0) \
           FROM participants GROUP BY group_key ORDER BY group_key",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(key, members, matched, viewed)| {
        Ok(GroupStats {
          group:         GroupKey::new(&key)?,
          member_count:  members as u32,
          matched_count: matched as u32,
          viewed_count:  viewed as u32,
        })
      })
      .collect()
  }
}
