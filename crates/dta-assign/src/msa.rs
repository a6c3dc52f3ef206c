//! The equilibration loop: method of successive averages.
//!
//! Each iteration loads the network with the current path flows, rederives
//! travel times, finds an all-or-nothing target assignment via per-departure
//! shortest paths, measures the equilibrium gap, and blends the current
//! flows toward the target with step size `1/(iteration + 2)`.
//!
//! The gap measure is **average excess cost**:
//!
//! ```text
//! AEC = (TSTT − SPTT) / total demand
//! ```
//!
//! where TSTT is total system travel time under the current flows and SPTT
//! is the travel time everyone would experience on their current shortest
//! path.  AEC is zero at a true dynamic user equilibrium.  SPTT is taken
//! from the same shortest-path pass that produced the target, so the two
//! sides of the gap always see identical travel times — recomputing either
//! against stale times is what produces negative or nonsensical AEC values.

use rustc_hash::FxHashMap;

use dta_core::Path;
use dta_net::Network;

use crate::error::{AssignError, AssignResult};
use crate::observer::AssignObserver;
use crate::tdsp::{tdsp, SpLabels};

// ── Per-iteration and end-of-run reports ──────────────────────────────────────

/// Snapshot of one equilibration iteration, handed to observers.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationStats {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Total system travel time, vehicle-steps.
    pub tstt: f64,
    /// Shortest-path total travel time, vehicle-steps.
    pub sptt: f64,
    /// Average excess cost, steps per vehicle.
    pub aec: f64,
    /// Step size the blend *would* use this iteration.
    pub step_size: f64,
}

/// Result of a whole equilibration run.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignSummary {
    /// Iterations actually executed.
    pub iterations: usize,
    /// AEC at the last iteration.
    pub aec: f64,
    /// TSTT at the last iteration.
    pub tstt: f64,
    /// Did AEC fall below the threshold before the iteration cap?
    pub converged: bool,
}

// ── MsaAssignment ─────────────────────────────────────────────────────────────

/// The equilibration driver.
#[derive(Clone, Copy, Debug)]
pub struct MsaAssignment {
    /// Iteration cap; the run reports `converged: false` when it is hit.
    pub max_iterations: usize,
    /// Stop as soon as AEC drops below this, in steps per vehicle.
    pub aec_threshold: f64,
}

impl Default for MsaAssignment {
    fn default() -> Self {
        Self { max_iterations: 100, aec_threshold: 0.1 }
    }
}

impl MsaAssignment {
    /// Run the equilibration to convergence or the iteration cap.
    ///
    /// Starts from an all-or-nothing assignment against the network's
    /// initial (free-flow) travel times, then iterates.  The convergence
    /// check runs *before* the blend, so a converged network keeps the
    /// exact flows that were measured.
    pub fn run<O: AssignObserver>(
        &self,
        network: &mut Network,
        observer: &mut O,
    ) -> AssignResult<AssignSummary> {
        let (initial_target, _) = all_or_nothing(network)?;
        update_path_flows(network, &initial_target, 1.0);

        let mut summary = AssignSummary {
            iterations: 0,
            aec: f64::INFINITY,
            tstt: 0.0,
            converged: false,
        };

        for iteration in 0..self.max_iterations {
            network.load();
            network.calculate_travel_times();

            let (target, sptt) = all_or_nothing(network)?;
            let tstt = network.total_system_travel_time();
            let aec = if network.total_demand > 0.0 {
                (tstt - sptt) / network.total_demand
            } else {
                0.0
            };
            let step_size = 1.0 / (iteration as f64 + 2.0);

            summary.iterations = iteration + 1;
            summary.aec = aec;
            summary.tstt = tstt;
            observer.on_iteration(
                &IterationStats { iteration, tstt, sptt, aec, step_size },
                network,
            );

            if aec < self.aec_threshold {
                summary.converged = true;
                break;
            }
            update_path_flows(network, &target, step_size);
        }

        observer.on_run_end(&summary, network);
        Ok(summary)
    }
}

// ── All-or-nothing assignment ─────────────────────────────────────────────────

/// Shortest path for every O-D pair and departure step with positive
/// demand: the full demand goes on that path (the target `H*`), and SPTT
/// accumulates `demand × (arrival − departure)` along the way.
///
/// Errors with [`AssignError::Unreachable`] if any such departure has no
/// route to its destination.
pub fn all_or_nothing(network: &Network) -> AssignResult<(FxHashMap<Path, Vec<f64>>, f64)> {
    let horizon = network.grid.horizon;

    let queries: Vec<(usize, usize)> = network
        .od_pairs
        .iter()
        .enumerate()
        .flat_map(|(k, od)| {
            od.demand
                .iter()
                .enumerate()
                .filter(|&(_, &d)| d > 0.0)
                .map(move |(t, _)| (k, t))
        })
        .collect();

    let labels = solve_queries(network, &queries);

    let mut target: FxHashMap<Path, Vec<f64>> = FxHashMap::default();
    let mut sptt = 0.0;
    for (&(k, t), labels) in queries.iter().zip(&labels) {
        let od = &network.od_pairs[k];
        let Some(path) = labels.reconstruct(network, od.origin, od.destination) else {
            return Err(AssignError::Unreachable {
                origin: od.origin,
                destination: od.destination,
                departure: t,
            });
        };
        let arrival = labels.cost[od.destination.index()];
        sptt += od.demand[t] * (arrival as f64 - t as f64);
        target
            .entry(path)
            .or_insert_with(|| vec![0.0; horizon])[t] = od.demand[t];
    }
    Ok((target, sptt))
}

/// Solve the shortest-path queries; the network is read-only here, so with
/// the `parallel` feature the queries fan out across a Rayon pool.
fn solve_queries(network: &Network, queries: &[(usize, usize)]) -> Vec<SpLabels> {
    #[cfg(not(feature = "parallel"))]
    {
        queries
            .iter()
            .map(|&(k, t)| tdsp(network, network.od_pairs[k].origin, t))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map(|&(k, t)| tdsp(network, network.od_pairs[k].origin, t))
            .collect()
    }
}

// ── Convex-combination update ─────────────────────────────────────────────────

/// Blend the network's path flows toward `target`:
///
/// ```text
/// h ← step_size · h* + (1 − step_size) · h
/// ```
///
/// Paths absent from the target decay by `1 − step_size`; paths present in
/// the target but carrying no current flow start from zero.  `step_size`
/// of 1 replaces the flows outright, 0 leaves them untouched.
pub fn update_path_flows(
    network: &mut Network,
    target: &FxHashMap<Path, Vec<f64>>,
    step_size: f64,
) {
    for (path, flows) in network.path_flows.iter_mut() {
        let target_series = target.get(path);
        for (t, flow) in flows.iter_mut().enumerate() {
            let wanted = target_series.map_or(0.0, |s| s[t]);
            *flow = step_size * wanted + (1.0 - step_size) * *flow;
        }
    }
    for (path, series) in target {
        if !network.path_flows.contains_key(path) {
            network
                .path_flows
                .insert(path.clone(), series.iter().map(|&v| step_size * v).collect());
        }
    }
}
