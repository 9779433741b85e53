//! Error types for `matchup-core`.

use thiserror::Error;
use uuid::Uuid;

/// An error returned by [`MatchEngine`](crate::engine::MatchEngine)
/// operations, generic over the backing store's error type.
///
/// "No candidate available" is deliberately *not* a variant — an empty pool
/// is a normal result (`None`), never a failure.
#[derive(Debug, Error)]
pub enum Error<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  #[error("participant not found: {0}")]
  ParticipantNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[from] E),
}
