//! Time-dependent shortest path search.
//!
//! One-to-all label setting from an origin and departure step.  Labels are
//! **absolute arrival steps**, not elapsed times: the origin's label is the
//! departure step itself, and relaxing link `u→v` reads the link's travel
//! time *at the arrival step of `u`*.  Label setting is only correct here
//! because the travel-time series is FIFO (departing earlier never means
//! arriving later), which the count-matching derivation guarantees.
//!
//! Ties between equal-cost frontier nodes are broken toward the lowest node
//! index, so the chosen path is deterministic across runs.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use dta_core::{LinkId, NodeId, Path};
use dta_net::Network;

/// Cost and backlink labels for every node, from one origin and departure.
#[derive(Clone, Debug)]
pub struct SpLabels {
    /// Absolute arrival step per node; `u32::MAX` means unreached.
    pub cost: Vec<u32>,
    /// Link the best route arrives on; `LinkId::INVALID` at the origin and
    /// at unreached nodes.
    pub backlink: Vec<LinkId>,
}

impl SpLabels {
    /// Was `node` reached within the search?
    #[inline]
    pub fn reached(&self, node: NodeId) -> bool {
        self.cost[node.index()] != u32::MAX
    }

    /// Walk backlinks from `destination` to `origin` and return the path,
    /// or `None` if the destination was never reached.
    pub fn reconstruct(
        &self,
        network: &Network,
        origin: NodeId,
        destination: NodeId,
    ) -> Option<Path> {
        if self.backlink[destination.index()] == LinkId::INVALID {
            return None;
        }
        let mut links = Vec::new();
        let mut at = destination;
        while at != origin {
            let link = self.backlink[at.index()];
            if link == LinkId::INVALID {
                return None;
            }
            links.push(link);
            at = network.link(link).tail;
        }
        links.reverse();
        Some(Path::new(links))
    }
}

/// One-to-all time-dependent shortest path from `origin`, departing at step
/// `departure`.
///
/// Arrival labels past the horizon read each link's final travel-time entry
/// and saturate rather than overflow; such labels are still compared and
/// finalized normally.
pub fn tdsp(network: &Network, origin: NodeId, departure: usize) -> SpLabels {
    let n = network.node_count();
    let mut cost = vec![u32::MAX; n];
    let mut backlink = vec![LinkId::INVALID; n];
    let mut finalized = vec![false; n];

    // Min-heap on (arrival step, node index): deterministic tie-break.
    let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
    cost[origin.index()] = departure as u32;
    heap.push(Reverse((departure as u32, origin)));

    while let Some(Reverse((label, node))) = heap.pop() {
        if finalized[node.index()] {
            continue; // stale heap entry
        }
        finalized[node.index()] = true;

        for &out in network.out_links(node) {
            let link = network.link(out);
            let arrival = label.saturating_add(link.travel_time_at(label as usize));
            if arrival < cost[link.head.index()] {
                cost[link.head.index()] = arrival;
                backlink[link.head.index()] = out;
                heap.push(Reverse((arrival, link.head)));
            }
        }
    }

    SpLabels { cost, backlink }
}
