//! Discrete simulation time grid.
//!
//! # Design
//!
//! The whole workspace measures time in **whole timesteps**: network loading
//! advances one step at a time, link travel times are whole numbers of steps,
//! and shortest-path labels are absolute arrival steps.  The mapping to real
//! seconds is held once, here:
//!
//!   wall_seconds = step * timestep_secs
//!
//! Using an integer step as the canonical unit keeps the FIFO count matching
//! and all label arithmetic exact; only flow quantities are floating-point.

use crate::{DtaError, DtaResult};

/// The discretization shared by every link, node, and demand series:
/// a timestep length in seconds and a finite horizon in steps.
///
/// A `TimeGrid` is immutable after construction; every per-step quantity in
/// the flow models (capacity per step, free-flow time in steps) derives from
/// it once at network build.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeGrid {
    /// How many real seconds one step represents.  Must be positive.
    pub timestep_secs: f64,
    /// Number of discrete steps simulated, `0..horizon`.  Must be positive.
    pub horizon: usize,
}

impl TimeGrid {
    /// Create a grid, rejecting nonpositive timestep or empty horizon.
    pub fn new(timestep_secs: f64, horizon: usize) -> DtaResult<Self> {
        if !(timestep_secs > 0.0) {
            return Err(DtaError::Config(format!(
                "timestep must be positive, got {timestep_secs}"
            )));
        }
        if horizon == 0 {
            return Err(DtaError::Config("time horizon must be positive".into()));
        }
        Ok(Self { timestep_secs, horizon })
    }

    /// Iterator over all steps `0..horizon`.
    #[inline]
    pub fn steps(&self) -> std::ops::Range<usize> {
        0..self.horizon
    }

    /// Convert a duration in seconds to whole steps, rounding to nearest.
    ///
    /// Used for free-flow and backward-wave travel times: a link whose
    /// traversal takes 2.4 steps is discretized as 2 steps.
    #[inline]
    pub fn steps_for_secs(&self, secs: f64) -> usize {
        (secs / self.timestep_secs).round() as usize
    }

    /// Clamp a step index into the valid range `0..horizon`.
    ///
    /// Travel-time series are defined per entry step; arrivals past the end
    /// of the horizon read the final entry.
    #[inline]
    pub fn clamp_step(&self, step: usize) -> usize {
        step.min(self.horizon - 1)
    }
}
