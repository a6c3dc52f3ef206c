//! `dta-assign` — time-dependent shortest paths and the equilibration loop.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`tdsp`]     | One-to-all label-setting search, label reconstruction  |
//! | [`msa`]      | `MsaAssignment`, all-or-nothing targets, flow blending |
//! | [`observer`] | `AssignObserver` callbacks, `NoopObserver`             |
//! | [`error`]    | `AssignError`, `AssignResult<T>`                       |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `serde`    | Derives on [`IterationStats`] and [`AssignSummary`].     |
//! | `parallel` | Shortest-path queries fan out across a Rayon pool.       |

pub mod error;
pub mod msa;
pub mod observer;
pub mod tdsp;

#[cfg(test)]
mod tests;

pub use error::{AssignError, AssignResult};
pub use msa::{all_or_nothing, update_path_flows, AssignSummary, IterationStats, MsaAssignment};
pub use observer::{AssignObserver, NoopObserver};
pub use tdsp::{tdsp, SpLabels};
