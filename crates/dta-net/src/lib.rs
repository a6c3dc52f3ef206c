//! `dta-net` — network assembly, loading engine, and travel-time
//! derivation.
//!
//! This crate owns the [`Network`]: static topology plus the path-keyed
//! flow and travel-time tables the equilibration loop iterates on.  The
//! loading engine and the travel-time derivation are implemented as
//! `impl Network` blocks in their own modules.
//!
//! # Crate layout
//!
//! | Module          | Contents                                            |
//! |-----------------|-----------------------------------------------------|
//! | [`network`]     | `Network`, `NetworkBuilder`, `OdPair`               |
//! | [`loading`]     | `Network::load` — one pass over the horizon         |
//! | [`travel_time`] | FIFO count matching, path chaining, TSTT            |
//! | [`error`]       | `NetError`, `NetResult<T>`                          |

pub mod error;
pub mod loading;
pub mod network;
pub mod travel_time;


pub use error::{NetError, NetResult};
pub use network::{Network, NetworkBuilder, OdPair};
pub use travel_time::COUNT_TOLERANCE;
