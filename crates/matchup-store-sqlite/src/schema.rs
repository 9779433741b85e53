//! SQL schema for the matchup SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Groups exist implicitly through their participants; the row only carries
-- the generation counter used for optimistic concurrency. A shuffle bumps
-- the generation, which invalidates claims made from an older snapshot.
CREATE TABLE IF NOT EXISTS groups (
    group_key  TEXT PRIMARY KEY,    -- normalized: lowercase letters only
    generation INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS participants (
    participant_id TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    contact_handle TEXT NOT NULL,
    gender         TEXT NOT NULL,   -- 'male' | 'female' | 'other'
    group_key      TEXT NOT NULL REFERENCES groups(group_key),
    signup_at      TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    reveal_at      TEXT NOT NULL,   -- signup_at + configured delay
    matched_to     TEXT REFERENCES participants(participant_id),
    matched_by     TEXT REFERENCES participants(participant_id),
    match_viewed   INTEGER NOT NULL DEFAULT 0,
    CHECK (matched_to IS NULL OR matched_to != participant_id)
);

CREATE INDEX IF NOT EXISTS participants_group_idx   ON participants(group_key);
CREATE INDEX IF NOT EXISTS participants_matched_idx ON participants(matched_to);

PRAGMA user_version = 1;
";
