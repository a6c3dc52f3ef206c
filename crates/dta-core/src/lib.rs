//! `dta-core` — foundational types for the `rust_dta` assignment workspace.
//!
//! This crate is a dependency of every other `dta-*` crate.  It intentionally
//! has no `dta-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                      |
//! |-----------|-----------------------------------------------|
//! | [`ids`]   | `NodeId`, `LinkId`                            |
//! | [`time`]  | `TimeGrid` (timestep length + horizon)        |
//! | [`path`]  | `Path` — hashable ordered link-sequence key   |
//! | [`error`] | `DtaError`, `DtaResult`                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to IDs and `TimeGrid`.   |

pub mod error;
pub mod ids;
pub mod path;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DtaError, DtaResult};
pub use ids::{LinkId, NodeId};
pub use path::Path;
pub use time::TimeGrid;
