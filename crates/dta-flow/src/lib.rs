//! `dta-flow` — macroscopic link and node flow models.
//!
//! This crate implements the two leaf layers of the network loading engine:
//! per-link sending/receiving flow under four interchangeable kinematic-wave
//! discretizations, and per-node transition flows for the five supported
//! intersection archetypes.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`counts`] | `CumulativeCounts` — per-path cumulative count series     |
//! | [`link`]   | `Link`, `LinkParams`, `ModelKind` (4 flow models)         |
//! | [`node`]   | `Node`, `NodeKind` (5 archetypes), transition flows       |
//! | [`error`]  | `FlowError`, `FlowResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on parameters and tags.   |

pub mod counts;
pub mod error;
pub mod link;
pub mod node;


pub use counts::CumulativeCounts;
pub use error::{FlowError, FlowResult};
pub use link::{Link, LinkParams, ModelKind};
pub use node::{Node, NodeKind};
