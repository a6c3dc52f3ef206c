//! Equilibration observer trait for progress reporting and data collection.

use dta_net::Network;

use crate::msa::{AssignSummary, IterationStats};

/// Callbacks invoked by [`MsaAssignment::run`][crate::MsaAssignment::run]
/// at iteration boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — gap printer
///
/// ```rust,ignore
/// struct GapPrinter;
///
/// impl AssignObserver for GapPrinter {
///     fn on_iteration(&mut self, stats: &IterationStats, _network: &Network) {
///         println!("iteration {}: AEC {:.4}", stats.iteration + 1, stats.aec);
///     }
/// }
/// ```
pub trait AssignObserver {
    /// Called after each iteration's loading, travel-time derivation, and
    /// gap measurement, before the flow blend.  The network's counts and
    /// travel times reflect this iteration's loading pass.
    fn on_iteration(&mut self, _stats: &IterationStats, _network: &Network) {}

    /// Called once when the run ends, converged or not.
    fn on_run_end(&mut self, _summary: &AssignSummary, _network: &Network) {}
}

/// An [`AssignObserver`] that does nothing.  Use when you need to call
/// `run` but don't want progress callbacks.
pub struct NoopObserver;

impl AssignObserver for NoopObserver {}
