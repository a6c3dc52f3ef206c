//! Nodes and the five transition-flow archetypes.
//!
//! # Contract
//!
//! [`Node::transition_flows`] takes this step's sending flows (one per
//! in-link, node-local order), receiving flows (one per out-link), and the
//! split proportion matrix, and returns the in×out matrix of flows that
//! actually cross the node this step.  The loading engine then commits the
//! matrix, disaggregated by path, via the links' `flow_out`/`flow_in`.
//!
//! Origin and destination nodes are virtual centroids: they never compute
//! transition flows — demand is injected and terminated for them directly
//! by the loading engine.

use rustc_hash::FxHashMap;

use dta_core::{LinkId, NodeId};

use crate::error::{FlowError, FlowResult};

/// Residual receiving capacity below this is treated as exhausted in the
/// merge allocation loop.
const MERGE_EPS: f64 = 1e-12;

// ── NodeKind ──────────────────────────────────────────────────────────────────

/// The closed set of node archetypes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Virtual origin centroid: no in-links, trips are loaded here.
    Origin,
    /// Virtual destination centroid: no out-links, trips terminate here.
    Destination,
    /// One in, one out: flow passes straight through.
    Series,
    /// One in, many out: flow fans out per fixed split proportions.
    Diverge,
    /// Many in, one out: priority-weighted competition for the single
    /// downstream link.  One strictly positive priority per in-link, in
    /// node-local in-link order.
    Merge { priorities: Vec<f64> },
}

impl NodeKind {
    fn name(&self) -> &'static str {
        match self {
            NodeKind::Origin => "origin",
            NodeKind::Destination => "destination",
            NodeKind::Series => "series",
            NodeKind::Diverge => "diverge",
            NodeKind::Merge { .. } => "merge",
        }
    }
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// A node with its ordered adjacent links and archetype.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    /// Links entering this node.  Node-local index order is the order used
    /// by `transition_flows` rows and merge priorities.
    pub in_links: Vec<LinkId>,
    /// Links leaving this node; column order of `transition_flows`.
    pub out_links: Vec<LinkId>,
    pub kind: NodeKind,
}

impl Node {
    /// Construct a node with an explicit archetype, checking the archetype's
    /// structural precondition on link counts.
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        in_links: Vec<LinkId>,
        out_links: Vec<LinkId>,
    ) -> FlowResult<Self> {
        let (n_in, n_out) = (in_links.len(), out_links.len());
        let expected = match &kind {
            NodeKind::Origin if n_in != 0 => Some("no in-links"),
            NodeKind::Destination if n_out != 0 => Some("no out-links"),
            NodeKind::Series if n_in != 1 || n_out != 1 => Some("exactly 1 in and 1 out"),
            NodeKind::Diverge if n_in != 1 || n_out < 1 => Some("exactly 1 in and ≥1 out"),
            NodeKind::Merge { .. } if n_in < 1 || n_out != 1 => Some("≥1 in and exactly 1 out"),
            _ => None,
        };
        if let Some(expected) = expected {
            return Err(FlowError::DegreeMismatch {
                node: id,
                kind: kind.name(),
                expected,
                in_count: n_in,
                out_count: n_out,
            });
        }

        if let NodeKind::Merge { priorities } = &kind {
            if priorities.len() != n_in {
                return Err(FlowError::DegreeMismatch {
                    node: id,
                    kind: "merge",
                    expected: "one priority per in-link",
                    in_count: n_in,
                    out_count: priorities.len(),
                });
            }
            for (i, &p) in priorities.iter().enumerate() {
                if !(p > 0.0) {
                    return Err(FlowError::NonPositivePriority {
                        node: id,
                        link: in_links[i],
                        value: p,
                    });
                }
            }
        }

        Ok(Self { id, kind, in_links, out_links })
    }

    /// Infer the archetype from the link counts, the way validated network
    /// files encode it: no in-links ⇒ origin, no out-links ⇒ destination,
    /// 1/1 ⇒ series, 1/N ⇒ diverge, N/1 ⇒ merge (with `priorities` looked
    /// up per in-link, defaulting to 1).  Anything else is an unsupported
    /// general intersection.
    pub fn from_degrees(
        id: NodeId,
        in_links: Vec<LinkId>,
        out_links: Vec<LinkId>,
        priorities: &FxHashMap<LinkId, f64>,
    ) -> FlowResult<Self> {
        let (n_in, n_out) = (in_links.len(), out_links.len());
        let kind = if n_in == 0 {
            NodeKind::Origin
        } else if n_out == 0 {
            NodeKind::Destination
        } else if n_in == 1 && n_out == 1 {
            NodeKind::Series
        } else if n_in == 1 {
            NodeKind::Diverge
        } else if n_out == 1 {
            NodeKind::Merge {
                priorities: in_links
                    .iter()
                    .map(|l| priorities.get(l).copied().unwrap_or(1.0))
                    .collect(),
            }
        } else {
            return Err(FlowError::GeneralIntersection {
                node: id,
                in_count: n_in,
                out_count: n_out,
            });
        };
        Self::new(id, kind, in_links, out_links)
    }

    /// `true` for the virtual origin/destination archetypes, which take no
    /// part in transition-flow computation.
    #[inline]
    pub fn is_centroid(&self) -> bool {
        matches!(self.kind, NodeKind::Origin | NodeKind::Destination)
    }

    // ── Transition flows ──────────────────────────────────────────────────

    /// Flow crossing each (in-link, out-link) movement this step.
    ///
    /// `sending[i]` / `receiving[j]` / `proportion[i][j]` are in node-local
    /// link order.  Returns a matrix in the same order.  Centroids return
    /// an empty matrix.
    pub fn transition_flows(
        &self,
        sending: &[f64],
        receiving: &[f64],
        proportion: &[Vec<f64>],
    ) -> Vec<Vec<f64>> {
        match &self.kind {
            NodeKind::Origin | NodeKind::Destination => Vec::new(),
            NodeKind::Series => vec![vec![sending[0].min(receiving[0])]],
            NodeKind::Diverge => self.diverge_flows(sending[0], receiving, &proportion[0]),
            NodeKind::Merge { priorities } => {
                self.merge_flows(sending, receiving[0], priorities)
            }
        }
    }

    /// Diverge: the moving fraction is the tightest downstream constraint
    /// over all out-links, so no out-link receives more than it can absorb
    /// while the fixed split ratios are preserved exactly.
    ///
    /// A movement no flow wants to make (`sending × proportion == 0`)
    /// cannot constrain the others and is skipped.
    fn diverge_flows(&self, sending: f64, receiving: &[f64], proportion: &[f64]) -> Vec<Vec<f64>> {
        let mut fraction: f64 = 1.0;
        for (j, &r) in receiving.iter().enumerate() {
            let wants = sending * proportion[j];
            if wants > 0.0 {
                fraction = fraction.min(r / wants);
            }
        }
        vec![
            proportion
                .iter()
                .map(|&p| fraction * p * sending)
                .collect(),
        ]
    }

    /// Merge: allocate the shared receiving capacity in rounds.  Each active
    /// in-link is offered its priority share of the remaining capacity;
    /// links that exhaust their sending flow drop out and their share is
    /// re-offered.  Terminates because remaining capacity and the active
    /// set both only shrink.
    fn merge_flows(&self, sending: &[f64], receiving: f64, priorities: &[f64]) -> Vec<Vec<f64>> {
        let n_in = self.in_links.len();
        let mut flows = vec![vec![0.0]; n_in];
        let mut remaining_sending = sending.to_vec();
        let mut remaining_receiving = receiving;
        let mut active: Vec<usize> = (0..n_in).collect();

        while !active.is_empty() && remaining_receiving > MERGE_EPS {
            let total_priority: f64 = active.iter().map(|&i| priorities[i]).sum();
            let mut moved_this_round = 0.0;
            let mut exhausted: Vec<usize> = Vec::new();

            for &i in &active {
                let share = priorities[i] / total_priority * remaining_receiving;
                let moved = remaining_sending[i].min(share);
                flows[i][0] += moved;
                moved_this_round += moved;
                remaining_sending[i] -= moved;
                if remaining_sending[i] <= 0.0 {
                    exhausted.push(i);
                }
            }

            remaining_receiving -= moved_this_round;
            active.retain(|i| !exhausted.contains(i));
            if moved_this_round <= MERGE_EPS {
                break;
            }
        }

        flows
    }
}
