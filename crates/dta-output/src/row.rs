//! Plain data row types written by output backends.

/// One equilibration iteration's gap measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRow {
    pub iteration: u64,
    /// Total system travel time, vehicle-steps.
    pub tstt: f64,
    /// Shortest-path total travel time, vehicle-steps.
    pub sptt: f64,
    /// Average excess cost, steps per vehicle.
    pub aec: f64,
    pub step_size: f64,
}

/// One link's loading state at one time point of the final iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkProfileRow {
    pub link_id: u32,
    /// Time point (boundary between steps); `0..=horizon`.
    pub step: u64,
    pub upstream_count: f64,
    pub downstream_count: f64,
    /// Travel time for vehicles entering at this step, in whole steps.
    /// The final entry repeats for the point at the horizon.
    pub travel_time_steps: u32,
}
