//! Typed errors for the library side of showreel.
//!
//! Application code (`main`, the server bootstrap, the terminal loop) wraps
//! these in `anyhow::Error` with context.

use thiserror::Error;

/// Failures building a [`crate::catalog::Catalog`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must contain at least one item")]
    Empty,

    #[error("duplicate portfolio item id {0}")]
    DuplicateId(u32),
}

/// Failures talking to the hosted completion API.
///
/// These never reach a visitor: the assistant logs them and answers with a
/// fixed apology instead.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("failed to reach completion API at {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("completion API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode completion response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("completion response contained no text")]
    EmptyResponse,
}

/// Rejected session events. Navigation itself cannot fail; these are caller
/// input problems caught before reaching the carousel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("item index {index} is out of range for a catalog of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("a reply is still pending")]
    ReplyPending,
}
