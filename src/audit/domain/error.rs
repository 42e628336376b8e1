//! Error types for audit domain parsing.

use thiserror::Error;

/// Error returned while parsing a stored system event kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown system event kind: {0}")]
pub struct ParseSystemEventKindError(pub String);
