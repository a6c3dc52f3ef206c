//! Directed links and the four macroscopic flow models.
//!
//! # Shared contract
//!
//! All four models present the same surface to the loading engine:
//!
//! - [`Link::link_update`] — once per timestep: open the next cumulative
//!   count entry, report `(sending, receiving)` flow for this step, then
//!   advance model-internal state;
//! - [`Link::flow_in`] / [`Link::flow_out`] — commit flow crossing the
//!   upstream/downstream boundary, tagged by path;
//! - [`Link::travel_time_at`] — the whole-timestep travel time for a given
//!   entry step, rewritten after every loading pass.
//!
//! They differ only in how they discretize the kinematic-wave conservation
//! law; see the [`ModelKind`] variants.
//!
//! # Units
//!
//! Speeds are length units per second, capacity is vehicles per second, jam
//! density is vehicles per length unit.  Everything is converted to per-step
//! quantities once at construction against the shared [`TimeGrid`].

use dta_core::{LinkId, NodeId, Path, TimeGrid};

use crate::counts::CumulativeCounts;
use crate::error::{FlowError, FlowResult};

// ── Model selection ───────────────────────────────────────────────────────────

/// The closed set of link flow model variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelKind {
    /// Free-flow delay plus a point queue at the exit; unbounded storage.
    PointQueue,
    /// Point queue plus a finite storage constraint (jam density × length),
    /// so spillback can physically fill the link.
    SpatialQueue,
    /// Cell transmission: the link is subdivided into cells of length
    /// ≈ free-flow-speed × timestep and the conservation law is applied
    /// cell by cell, with distinct forward and backward wave speeds.
    CellTransmission,
    /// Link transmission: the same conservation law expressed directly on
    /// the boundary cumulative counts — equivalent to cell transmission in
    /// the continuum limit, without interior state.
    LinkTransmission,
}

/// Model-internal state.  Only cell transmission carries any.
#[derive(Clone, Debug)]
enum ModelState {
    Boundary,
    Cells(Vec<f64>),
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Static physical parameters of one link.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkParams {
    /// Free-flow speed, length units per second.  Must be positive.
    pub free_flow_speed: f64,
    /// Backward (congestion) wave speed, length units per second.  Must be
    /// positive.
    pub backward_wave_speed: f64,
    /// Jam density, vehicles per length unit.
    pub jam_density: f64,
    /// Physical length.  Must be positive.
    pub length: f64,
    /// Flow capacity, vehicles per second.
    pub capacity: f64,
}

impl LinkParams {
    fn validate(&self, link: LinkId) -> FlowResult<()> {
        let checks = [
            ("free-flow speed", self.free_flow_speed),
            ("backward-wave speed", self.backward_wave_speed),
            ("length", self.length),
        ];
        for (what, value) in checks {
            if !(value > 0.0) {
                return Err(FlowError::NonPositiveParameter { link, what, value });
            }
        }
        Ok(())
    }
}

// ── Link ──────────────────────────────────────────────────────────────────────

/// A directed link with one of the four flow models and its per-loading
/// mutable state (cumulative counts and travel times).
#[derive(Clone, Debug)]
pub struct Link {
    pub id: LinkId,
    pub tail: NodeId,
    pub head: NodeId,
    pub params: LinkParams,
    pub kind: ModelKind,

    // ── Derived per-step quantities (fixed at construction) ───────────────
    free_flow_steps: usize,
    backward_wave_steps: usize,
    cap_per_step: f64,
    jam_storage: f64,
    /// Backward over forward wave speed (w/v), the cell receiving factor.
    wave_ratio: f64,
    /// Jam storage of a single cell (cell transmission only).
    cell_storage: f64,

    /// Per-step capacity of the upstream boundary.  Defaults to the link
    /// capacity; drivers may relax it (e.g. an unconstrained bottleneck
    /// inflow) via [`set_upstream_capacity`](Self::set_upstream_capacity).
    upstream_cap_per_step: f64,
    /// Per-step capacity of the downstream boundary.
    downstream_cap_per_step: f64,

    state: ModelState,

    // ── Per-loading mutable state ─────────────────────────────────────────
    /// Cumulative count of vehicles that have entered, by path.
    pub upstream: CumulativeCounts,
    /// Cumulative count of vehicles that have exited, by path.
    pub downstream: CumulativeCounts,
    /// Travel time in whole steps, indexed by entry step.  Initialized to
    /// free flow; rewritten by the travel-time derivation after loading.
    travel_time: Vec<u32>,
}

impl Link {
    /// Construct a link, validating parameters and deriving all per-step
    /// quantities against `grid`.
    pub fn new(
        id: LinkId,
        tail: NodeId,
        head: NodeId,
        params: LinkParams,
        kind: ModelKind,
        grid: &TimeGrid,
    ) -> FlowResult<Self> {
        params.validate(id)?;

        let free_flow_steps = grid.steps_for_secs(params.length / params.free_flow_speed);
        let backward_wave_steps = grid.steps_for_secs(params.length / params.backward_wave_speed);
        let cap_per_step = params.capacity * grid.timestep_secs;
        let jam_storage = params.jam_density * params.length;
        let wave_ratio = params.backward_wave_speed / params.free_flow_speed;

        let cell_count = free_flow_steps.max(1);
        let cell_storage = jam_storage / cell_count as f64;
        let state = match kind {
            ModelKind::CellTransmission => ModelState::Cells(vec![0.0; cell_count]),
            _ => ModelState::Boundary,
        };

        Ok(Self {
            id,
            tail,
            head,
            params,
            kind,
            free_flow_steps,
            backward_wave_steps,
            cap_per_step,
            jam_storage,
            wave_ratio,
            cell_storage,
            upstream_cap_per_step: cap_per_step,
            downstream_cap_per_step: cap_per_step,
            state,
            upstream: CumulativeCounts::new(),
            downstream: CumulativeCounts::new(),
            travel_time: vec![free_flow_steps as u32; grid.horizon],
        })
    }

    // ── Static queries ────────────────────────────────────────────────────

    /// Free-flow travel time in whole steps.
    #[inline]
    pub fn free_flow_steps(&self) -> usize {
        self.free_flow_steps
    }

    /// Travel time in steps for a vehicle entering at `entry`, reading the
    /// final entry for steps past the horizon.
    #[inline]
    pub fn travel_time_at(&self, entry: usize) -> u32 {
        self.travel_time[entry.min(self.travel_time.len() - 1)]
    }

    /// The full travel-time series, one entry per departure step.
    pub fn travel_times(&self) -> &[u32] {
        &self.travel_time
    }

    /// Replace the travel-time series.  The series length must stay the
    /// horizon.
    pub fn set_travel_times(&mut self, series: Vec<u32>) {
        debug_assert_eq!(series.len(), self.travel_time.len());
        self.travel_time = series;
    }

    /// Overwrite the travel time for one entry step.
    pub fn set_travel_time(&mut self, entry: usize, steps: u32) {
        self.travel_time[entry] = steps;
    }

    /// Relax or tighten the upstream boundary capacity (vehicles per
    /// second).  Origin centroid connectors typically get `f64::INFINITY`.
    pub fn set_upstream_capacity(&mut self, per_sec: f64, grid: &TimeGrid) {
        self.upstream_cap_per_step = per_sec * grid.timestep_secs;
    }

    /// Relax or tighten the downstream boundary capacity.
    pub fn set_downstream_capacity(&mut self, per_sec: f64, grid: &TimeGrid) {
        self.downstream_cap_per_step = per_sec * grid.timestep_secs;
    }

    // ── Per-loading lifecycle ─────────────────────────────────────────────

    /// Discard all counts and interior state ahead of a fresh loading pass.
    pub fn reset_counts(&mut self) {
        self.upstream.reset();
        self.downstream.reset();
        if let ModelState::Cells(cells) = &mut self.state {
            cells.fill(0.0);
        }
    }

    /// One timestep of the link: open the next count entries, compute this
    /// step's `(sending, receiving)` flow from the step-start state, then
    /// advance interior state.
    ///
    /// Must run for every link before any node consumes the returned flows
    /// (the link/node barrier).
    pub fn link_update(&mut self, t: usize) -> (f64, f64) {
        self.upstream.advance();
        self.downstream.advance();
        let sending = self.sending_flow(t);
        let receiving = self.receiving_flow(t);
        self.advance_cells();
        (sending, receiving)
    }

    /// Commit `amount` vehicles of `path` entering at the upstream end
    /// during the current step.
    pub fn flow_in(&mut self, path: &Path, amount: f64) {
        self.upstream.add(path, amount);
        if let ModelState::Cells(cells) = &mut self.state {
            cells[0] += amount;
        }
    }

    /// Commit `amount` vehicles of `path` exiting at the downstream end
    /// during the current step.  Callers never move more than the sending
    /// flow reported by [`link_update`](Self::link_update).
    pub fn flow_out(&mut self, path: &Path, amount: f64) {
        self.downstream.add(path, amount);
        if let ModelState::Cells(cells) = &mut self.state {
            let last = cells.len() - 1;
            cells[last] -= amount;
        }
    }

    // ── Sending / receiving flow per model ────────────────────────────────

    /// Flow the downstream boundary could release this step.
    fn sending_flow(&self, t: usize) -> f64 {
        let t = t as i64;
        match (&self.kind, &self.state) {
            (ModelKind::CellTransmission, ModelState::Cells(cells)) => {
                cells[cells.len() - 1].min(self.downstream_cap_per_step)
            }
            // Point queue, spatial queue, and link transmission share the
            // cumulative-count form: vehicles that have had time to reach
            // the exit but have not yet left, up to exit capacity.
            _ => {
                let arrived = self.upstream.total_at(t + 1 - self.free_flow_steps as i64);
                let exited = self.downstream.total_at(t);
                (arrived - exited).min(self.downstream_cap_per_step).max(0.0)
            }
        }
    }

    /// Flow the upstream boundary could absorb this step.
    fn receiving_flow(&self, t: usize) -> f64 {
        let t = t as i64;
        match (&self.kind, &self.state) {
            (ModelKind::PointQueue, _) => self.upstream_cap_per_step,
            (ModelKind::SpatialQueue, _) => {
                let occupied = self.upstream.total_at(t) - self.downstream.total_at(t);
                self.upstream_cap_per_step
                    .min(self.jam_storage - occupied)
                    .max(0.0)
            }
            (ModelKind::CellTransmission, ModelState::Cells(cells)) => self
                .upstream_cap_per_step
                .min(self.wave_ratio * (self.cell_storage - cells[0]))
                .max(0.0),
            (ModelKind::LinkTransmission, _) => {
                let freed = self
                    .downstream
                    .total_at(t + 1 - self.backward_wave_steps as i64);
                self.upstream_cap_per_step
                    .min(freed + self.jam_storage - self.upstream.total_at(t))
                    .max(0.0)
            }
            // Unreachable: state is Cells iff kind is CellTransmission.
            _ => self.upstream_cap_per_step,
        }
    }

    /// Move flow one cell forward, all transfers computed from step-start
    /// occupancies.  No-op for boundary models.
    fn advance_cells(&mut self) {
        let cap = self.cap_per_step;
        let ratio = self.wave_ratio;
        let cell_storage = self.cell_storage;
        if let ModelState::Cells(cells) = &mut self.state {
            if cells.len() < 2 {
                return;
            }
            let transfers: Vec<f64> = cells
                .windows(2)
                .map(|w| w[0].min(cap).min(ratio * (cell_storage - w[1])).max(0.0))
                .collect();
            for (c, y) in transfers.into_iter().enumerate() {
                cells[c] -= y;
                cells[c + 1] += y;
            }
        }
    }
}
