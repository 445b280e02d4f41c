//! Error types shared by the repositories, the aggregation queries and the
//! ledger service. Caller surfaces wrap these in `anyhow` with context.

use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    /// Malformed entity passed to `add`/`update`.
    #[error("invalid {kind}: {reason}")]
    InvalidEntity { kind: &'static str, reason: String },

    /// `update` addressed a transient entity or a pk that is not stored.
    #[error("no stored {kind} with pk {pk}")]
    InvalidKey { kind: &'static str, pk: i64 },

    #[error("{kind} has no field named '{field}'")]
    UnknownField { kind: &'static str, field: String },

    #[error("category '{0}' not found")]
    UnknownCategory(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Category outline whose unindent matches no outer level.
    #[error("unindent does not match any outer indentation level in line {line}")]
    Indentation { line: usize },

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            kind,
            reason: reason.into(),
        }
    }
}
