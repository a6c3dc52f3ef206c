//! Assignment error types.

use dta_core::NodeId;

/// Fatal conditions during an equilibration run.
#[derive(thiserror::Error, Debug)]
pub enum AssignError {
    /// Positive demand departs at a step from which the destination cannot
    /// be reached within the horizon.  Equilibrium is undefined when any
    /// demand has no path, so the whole run aborts.
    #[error(
        "no route from {origin} to {destination} within the horizon when departing at step {departure}"
    )]
    Unreachable {
        origin: NodeId,
        destination: NodeId,
        departure: usize,
    },
}

pub type AssignResult<T> = Result<T, AssignError>;
