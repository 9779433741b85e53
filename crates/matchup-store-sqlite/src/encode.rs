//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Gender and group keys are plain text.

use chrono::{DateTime, Utc};
use matchup_core::{
  group::GroupKey,
  participant::{Gender, Participant},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::Male => "male",
    Gender::Female => "female",
    Gender::Other => "other",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    "other" => Ok(Gender::Other),
    other => Err(Error::Decode(format!("unknown gender: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `participants` row.
pub struct RawParticipant {
  pub participant_id: String,
  pub name:           String,
  pub contact_handle: String,
  pub gender:         String,
  pub group_key:      String,
  pub signup_at:      String,
  pub reveal_at:      String,
  pub matched_to:     Option<String>,
  pub matched_by:     Option<String>,
  pub match_viewed:   bool,
}

impl RawParticipant {
  /// Build from a row selected with [`PARTICIPANT_COLUMNS`](crate::store)
  /// column order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawParticipant {
      participant_id: row.get(0)?,
      name:           row.get(1)?,
      contact_handle: row.get(2)?,
      gender:         row.get(3)?,
      group_key:      row.get(4)?,
      signup_at:      row.get(5)?,
      reveal_at:      row.get(6)?,
      matched_to:     row.get(7)?,
      matched_by:     row.get(8)?,
      match_viewed:   row.get(9)?,
    })
  }

  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      participant_id: decode_uuid(&self.participant_id)?,
      name:           self.name,
      contact_handle: self.contact_handle,
      gender:         decode_gender(&self.gender)?,
      group:          GroupKey::new(&self.group_key)?,
      signup_at:      decode_dt(&self.signup_at)?,
      reveal_at:      decode_dt(&self.reveal_at)?,
      matched_to:     self.matched_to.as_deref().map(decode_uuid).transpose()?,
      matched_by:     self.matched_by.as_deref().map(decode_uuid).transpose()?,
      match_viewed:   self.match_viewed,
    })
  }
}
