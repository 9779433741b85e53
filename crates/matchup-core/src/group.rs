//! Group keys and derived group statistics.
//!
//! A group has no lifecycle of its own — it exists implicitly while at least
//! one participant references its key. Keys are normalized so that
//! "Acme Corp." and "acmecorp" name the same pool.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw group name contained no letters after normalization.
#[derive(Debug, Clone, Error)]
#[error("invalid group key {0:?}: must contain at least one letter")]
pub struct InvalidGroupKey(pub String);

/// A normalized group identifier: lowercase ASCII letters only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupKey(String);

impl GroupKey {
  /// Normalize `raw` by lowercasing and stripping everything that is not an
  /// ASCII letter.
  pub fn new(raw: &str) -> Result<Self, InvalidGroupKey> {
    let key: String = raw
      .chars()
      .filter(char::is_ascii_alphabetic)
      .map(|c| c.to_ascii_lowercase())
      .collect();
    if key.is_empty() {
      return Err(InvalidGroupKey(raw.to_owned()));
    }
    Ok(GroupKey(key))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for GroupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for GroupKey {
  type Err = InvalidGroupKey;

  fn from_str(s: &str) -> Result<Self, Self::Err> { GroupKey::new(s) }
}

impl TryFrom<String> for GroupKey {
  type Error = InvalidGroupKey;

  fn try_from(s: String) -> Result<Self, Self::Error> { GroupKey::new(&s) }
}

impl From<GroupKey> for String {
  fn from(key: GroupKey) -> String { key.0 }
}

/// Per-group counts for the admin surface — always derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
  pub group:         GroupKey,
  pub member_count:  u32,
  pub matched_count: u32,
  pub viewed_count:  u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_case_and_strips_non_letters() {
    let key = GroupKey::new("Acme Corp. 2024!").unwrap();
    assert_eq!(key.as_str(), "acmecorp");
  }

  #[test]
  fn already_normalized_key_is_unchanged() {
    let key = GroupKey::new("acme").unwrap();
    assert_eq!(key.as_str(), "acme");
  }

  #[test]
  fn rejects_keys_without_letters() {
    assert!(GroupKey::new("12345").is_err());
    assert!(GroupKey::new("").is_err());
    assert!(GroupKey::new("  --  ").is_err());
  }

  #[test]
  fn equal_after_normalization() {
    assert_eq!(
      GroupKey::new("ACME").unwrap(),
      GroupKey::new("a-c-m-e").unwrap()
    );
  }
}
