//! Flow-model error type.
//!
//! Every variant is a *configuration* error: detected while assembling links
//! and nodes, fatal, never retried at runtime.

use thiserror::Error;

use dta_core::{LinkId, NodeId};

/// Errors produced by `dta-flow` construction.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("link {link}: {what} must be positive (got {value})")]
    NonPositiveParameter {
        link:  LinkId,
        what:  &'static str,
        value: f64,
    },

    #[error("node {node}: {kind} node requires {expected}, got {in_count} in / {out_count} out")]
    DegreeMismatch {
        node:      NodeId,
        kind:      &'static str,
        expected:  &'static str,
        in_count:  usize,
        out_count: usize,
    },

    #[error("node {node}: merge priorities must be strictly positive (link {link} has {value})")]
    NonPositivePriority {
        node:  NodeId,
        link:  LinkId,
        value: f64,
    },

    #[error("node {node}: general intersections ({in_count} in, {out_count} out) are not supported")]
    GeneralIntersection {
        node:      NodeId,
        in_count:  usize,
        out_count: usize,
    },
}

/// Alias for `Result<T, FlowError>`.
pub type FlowResult<T> = Result<T, FlowError>;
