//! Workspace error type.
//!
//! Sub-crates define their own error enums and either convert them into
//! `DtaError` via `From` impls or keep them separate.  Both patterns are
//! acceptable; prefer whichever keeps error sites clean.

use thiserror::Error;

/// The top-level error type for `dta-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DtaError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `dta-core`.
pub type DtaResult<T> = Result<T, DtaError>;
