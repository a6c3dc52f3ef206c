//! Travel-time derivation from cumulative counts.
//!
//! After a loading pass, the nth vehicle to enter a link is the nth to
//! leave it (FIFO), so the travel time for an entry step is found by
//! scanning the downstream count forward until it catches up with the
//! upstream count at entry.  A small tolerance absorbs floating-point
//! drift accumulated by the flow models; counts within it are treated as
//! equal.

use crate::network::Network;

/// Cumulative counts within this of each other compare equal in the FIFO
/// matching scan.
pub const COUNT_TOLERANCE: f64 = 1e-5;

impl Network {
    /// Rewrite all link and path travel times from the counts produced by
    /// the last [`load`](Network::load) pass.
    pub fn calculate_travel_times(&mut self) {
        self.calculate_link_travel_times();
        self.calculate_path_travel_times();
    }

    /// FIFO count matching per link and entry step.
    ///
    /// The scan starts at `entry + free_flow_steps` (nothing exits faster
    /// than free flow) and stops at the horizon: vehicles still on the link
    /// when the simulation ends get the horizon as their exit step, which
    /// overstates nothing the assignment can observe.
    fn calculate_link_travel_times(&mut self) {
        let horizon = self.grid.horizon;
        for link in &mut self.links {
            for entry in 0..horizon {
                let n = link.upstream.total_at(entry as i64);
                let mut exit = entry + link.free_flow_steps();
                while exit < horizon && link.downstream.total_at(exit as i64) < n - COUNT_TOLERANCE
                {
                    exit += 1;
                }
                link.set_travel_time(entry, (exit - entry) as u32);
            }
        }
    }

    /// Chain link travel times along each path: depart at `t`, arrive at
    /// each subsequent link at the running arrival step (clamped into the
    /// horizon), and sum the per-link times.
    pub(crate) fn calculate_path_travel_times(&mut self) {
        let Self { grid, links, od_pairs, path_travel_times, .. } = self;
        for od in od_pairs.iter() {
            for path in &od.paths {
                let series = path_travel_times
                    .entry(path.clone())
                    .or_insert_with(|| vec![0; grid.horizon]);
                series.fill(0);
                let mut arrival: Vec<usize> = (0..grid.horizon).collect();
                for &ij in path.links() {
                    let link = &links[ij.index()];
                    for t in grid.steps() {
                        let steps = link.travel_time_at(arrival[t]);
                        series[t] += steps;
                        arrival[t] = grid.clamp_step(arrival[t] + steps as usize);
                    }
                }
            }
        }
    }

    /// Total system travel time: current path flows × current path travel
    /// times, in vehicle-steps.
    pub fn total_system_travel_time(&self) -> f64 {
        let mut tstt = 0.0;
        for (path, flows) in &self.path_flows {
            let Some(times) = self.path_travel_times.get(path) else { continue };
            for (flow, &steps) in flows.iter().zip(times) {
                tstt += flow * steps as f64;
            }
        }
        tstt
    }
}
