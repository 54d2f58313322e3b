//! Rejection reasons.
//!
//! Futures are generic over their rejection type `E`. The only requirement the
//! core places on `E` is that it can represent a chaining cycle, which is what
//! [`CyclicResolution`] is for. [`Reason`] is a ready-made `E` for callers that
//! don't bring their own error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FutureId;

/// A continuation tried to settle a future with that same future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("chaining cycle detected for future {future}")]
pub struct CyclicResolution {
    pub future: FutureId,
}

impl CyclicResolution {
    #[must_use]
    pub fn new(future: FutureId) -> Self {
        Self { future }
    }
}

/// General-purpose rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Reason {
    /// An executor, handler or thenable failed with a message.
    #[error("{0}")]
    Thrown(String),
    #[error(transparent)]
    Cyclic(#[from] CyclicResolution),
}

impl Reason {
    #[must_use]
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::Thrown(message.into())
    }

    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::Cyclic(_))
    }
}

impl From<&str> for Reason {
    fn from(message: &str) -> Self {
        Self::Thrown(message.to_string())
    }
}

impl From<String> for Reason {
    fn from(message: String) -> Self {
        Self::Thrown(message)
    }
}
