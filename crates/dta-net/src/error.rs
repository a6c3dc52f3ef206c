//! Network assembly error types.

use dta_core::{LinkId, NodeId};
use dta_flow::FlowError;

/// Everything that can go wrong while assembling or validating a network.
///
/// All variants are configuration errors: they are raised at build time and
/// are fatal — the loading engine never sees a half-built network.
#[derive(thiserror::Error, Debug)]
pub enum NetError {
    /// A link or node model rejected its parameters.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// A link endpoint references a node index past the node count.
    #[error("link {link} references {node}, but the network has {count} nodes")]
    NodeOutOfRange {
        link: LinkId,
        node: NodeId,
        count: usize,
    },

    /// A demand series does not span the time horizon.
    #[error(
        "demand series for {origin}→{destination} has {got} entries, expected {expected} (one per step)"
    )]
    DemandLength {
        origin: NodeId,
        destination: NodeId,
        got: usize,
        expected: usize,
    },

    /// A demand rate is negative.
    #[error("negative demand {value} for {origin}→{destination} at step {step}")]
    NegativeDemand {
        origin: NodeId,
        destination: NodeId,
        step: usize,
        value: f64,
    },

    /// The origin of an O-D pair is not an origin centroid.
    #[error("{0} has incoming links and cannot be the origin of an O-D pair")]
    NotAnOrigin(NodeId),

    /// The destination of an O-D pair is not a destination centroid.
    #[error("{0} has outgoing links and cannot be the destination of an O-D pair")]
    NotADestination(NodeId),

    /// An O-D pair with no connecting path at all.
    #[error("no path connects {origin} to {destination}")]
    Disconnected { origin: NodeId, destination: NodeId },
}

pub type NetResult<T> = Result<T, NetError>;
