//! Cumulative vehicle counts, disaggregated by path.
//!
//! # Design
//!
//! A link keeps one of these at each end.  `total[k]` is the cumulative
//! number of vehicles that have crossed the reference point by *time point*
//! `k` (the boundary between step `k-1` and step `k`), so the series is
//! non-decreasing by construction: each step appends a copy of the last
//! value and flow committed during the step is added to that new entry.
//!
//! The per-path breakdown mirrors the totals exactly — it is what lets the
//! loading engine disaggregate sending flows and terminate trips path by
//! path while travel-time matching only ever reads the totals.

use rustc_hash::FxHashMap;

use dta_core::Path;

/// A non-decreasing cumulative count series with a per-path breakdown.
#[derive(Clone, Debug, Default)]
pub struct CumulativeCounts {
    /// `total[k]` = vehicles that have crossed by time point `k`.
    total: Vec<f64>,
    /// Per-path series, same indexing and length as `total`.
    by_path: FxHashMap<Path, Vec<f64>>,
}

impl CumulativeCounts {
    /// A fresh series holding only the time-zero entry.
    pub fn new() -> Self {
        Self {
            total: vec![0.0],
            by_path: FxHashMap::default(),
        }
    }

    /// Discard all recorded flow and return to the time-zero state.
    pub fn reset(&mut self) {
        self.total.clear();
        self.total.push(0.0);
        self.by_path.clear();
    }

    /// Open the next time point by carrying the last value forward.
    ///
    /// Called once per link per timestep, before any flow is committed.
    pub fn advance(&mut self) {
        let last = self.total[self.total.len() - 1];
        self.total.push(last);
        for series in self.by_path.values_mut() {
            let last = series[series.len() - 1];
            series.push(last);
        }
    }

    /// Add `amount` vehicles of `path` at the current (latest) time point.
    pub fn add(&mut self, path: &Path, amount: f64) {
        let len = self.total.len();
        self.total[len - 1] += amount;
        let series = self
            .by_path
            .entry(path.clone())
            .or_insert_with(|| vec![0.0; len]);
        series[len - 1] += amount;
    }

    /// Total count at time point `t`.
    ///
    /// `t < 0` reads as zero (nothing has crossed before the simulation
    /// starts); `t` past the latest recorded point reads the latest value.
    pub fn total_at(&self, t: i64) -> f64 {
        if t < 0 {
            return 0.0;
        }
        let idx = (t as usize).min(self.total.len() - 1);
        self.total[idx]
    }

    /// Count of vehicles on `path` at time point `t`, with the same
    /// clamping rules as [`total_at`](Self::total_at).
    pub fn path_at(&self, path: &Path, t: i64) -> f64 {
        let Some(series) = self.by_path.get(path) else {
            return 0.0;
        };
        if t < 0 {
            return 0.0;
        }
        let idx = (t as usize).min(series.len() - 1);
        series[idx]
    }

    /// Paths that have crossed this reference point so far.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.by_path.keys()
    }

    /// Number of recorded time points (1 + steps advanced since reset).
    pub fn recorded_points(&self) -> usize {
        self.total.len()
    }

    /// The latest total.
    pub fn latest(&self) -> f64 {
        self.total[self.total.len() - 1]
    }
}
