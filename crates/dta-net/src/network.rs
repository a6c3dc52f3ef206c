//! Network assembly and the path-keyed assignment tables.
//!
//! # Data layout
//!
//! A [`Network`] owns dense `Vec`s of links and nodes indexed directly by
//! `LinkId`/`NodeId`, plus the two path-keyed tables the equilibration loop
//! revolves around: flow by departure step and travel time by departure
//! step.  Node adjacency (the in/out link lists) doubles as the
//! forward/reverse star — it is fixed at build and immutable thereafter.
//!
//! # Building
//!
//! Use [`NetworkBuilder`]: add nodes, links, and O-D pairs, then `build()`.
//! The builder infers each node's archetype from its link degrees, checks
//! every structural precondition, and enumerates all simple paths for every
//! O-D pair up front.  Enumeration is deliberately exhaustive; it is meant
//! for the small test networks this workspace targets, not for city-scale
//! graphs.

use rustc_hash::FxHashMap;

use dta_core::{LinkId, NodeId, Path, TimeGrid};
use dta_flow::{Link, LinkParams, ModelKind, Node, NodeKind};

use crate::error::{NetError, NetResult};

// ── OdPair ────────────────────────────────────────────────────────────────────

/// One origin-destination pair: a demand rate per departure step and the
/// set of candidate paths connecting the pair.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OdPair {
    pub origin: NodeId,
    pub destination: NodeId,
    /// Vehicles departing per step, one entry per step of the horizon.
    pub demand: Vec<f64>,
    /// All simple paths from `origin` to `destination`.  Enumerated at
    /// build, never parsed, so serde skips it.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub paths: Vec<Path>,
}

// ── Network ───────────────────────────────────────────────────────────────────

/// The assembled network: static topology plus the per-iteration assignment
/// state (cumulative counts live inside each [`Link`]; path flows and path
/// travel times live here).
///
/// Construct via [`NetworkBuilder`].
#[derive(Clone, Debug)]
pub struct Network {
    pub grid: TimeGrid,
    /// All links, indexed by `LinkId`.
    pub links: Vec<Link>,
    /// All nodes, indexed by `NodeId`.  Each node's ordered in/out link
    /// lists are the reverse/forward star.
    pub nodes: Vec<Node>,
    pub od_pairs: Vec<OdPair>,

    /// Vehicles departing on each path at each step (the `H` matrix).
    /// Persists across iterations; blended, never discarded.
    pub path_flows: FxHashMap<Path, Vec<f64>>,
    /// Travel time in steps for each path and departure step.  Rewritten
    /// from link travel times after every loading pass.
    pub path_travel_times: FxHashMap<Path, Vec<u32>>,

    /// Sum of all demand over all O-D pairs and steps; the AEC denominator.
    pub total_demand: f64,
}

impl Network {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Outgoing links of `node` (the forward star), in insertion order.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        &self.nodes[node.index()].out_links
    }

    /// Incoming links of `node` (the reverse star), in insertion order.
    #[inline]
    pub fn in_links(&self, node: NodeId) -> &[LinkId] {
        &self.nodes[node.index()].in_links
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Incrementally assembles a [`Network`], deferring all validation to
/// [`build`](Self::build).
pub struct NetworkBuilder {
    grid: TimeGrid,
    node_count: usize,
    links: Vec<(NodeId, NodeId, LinkParams, ModelKind)>,
    /// Merge priority per link, for links entering a merge node.  Links
    /// without an entry default to priority 1.
    merge_priorities: FxHashMap<LinkId, f64>,
    od: Vec<(NodeId, NodeId, Vec<f64>)>,
}

impl NetworkBuilder {
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            node_count: 0,
            links: Vec::new(),
            merge_priorities: FxHashMap::default(),
            od: Vec::new(),
        }
    }

    /// Add a node and return its ID.  Archetypes are inferred from link
    /// degrees at build time, so nothing else is specified here.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.node_count as u32);
        self.node_count += 1;
        id
    }

    /// Add a directed link and return its ID.
    pub fn add_link(
        &mut self,
        tail: NodeId,
        head: NodeId,
        params: LinkParams,
        kind: ModelKind,
    ) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        self.links.push((tail, head, params, kind));
        id
    }

    /// Set the merge priority of `link` (used only if its head turns out to
    /// be a merge node).  Must be positive; checked at build.
    pub fn merge_priority(&mut self, link: LinkId, priority: f64) {
        self.merge_priorities.insert(link, priority);
    }

    /// Add an O-D pair with a per-step demand series.
    pub fn add_od_pair(&mut self, origin: NodeId, destination: NodeId, demand: Vec<f64>) {
        self.od.push((origin, destination, demand));
    }

    /// Validate everything and assemble the network.
    ///
    /// Checks link endpoints, node archetype preconditions, merge
    /// priorities, demand series shape and sign, and that every O-D pair
    /// has at least one connecting path.
    pub fn build(self) -> NetResult<Network> {
        let Self { grid, node_count, links: link_specs, merge_priorities, od } = self;

        // Endpoint range check, then per-node in/out lists in link order.
        let mut in_links: Vec<Vec<LinkId>> = vec![Vec::new(); node_count];
        let mut out_links: Vec<Vec<LinkId>> = vec![Vec::new(); node_count];
        for (k, &(tail, head, _, _)) in link_specs.iter().enumerate() {
            let id = LinkId(k as u32);
            for node in [tail, head] {
                if node.index() >= node_count {
                    return Err(NetError::NodeOutOfRange { link: id, node, count: node_count });
                }
            }
            out_links[tail.index()].push(id);
            in_links[head.index()].push(id);
        }

        let links: Vec<Link> = link_specs
            .into_iter()
            .enumerate()
            .map(|(k, (tail, head, params, kind))| {
                Link::new(LinkId(k as u32), tail, head, params, kind, &grid)
            })
            .collect::<Result<_, _>>()?;

        let nodes: Vec<Node> = in_links
            .into_iter()
            .zip(out_links)
            .enumerate()
            .map(|(n, (ins, outs))| {
                Node::from_degrees(NodeId(n as u32), ins, outs, &merge_priorities)
            })
            .collect::<Result<_, _>>()?;

        // O-D pairs: shape checks, then exhaustive path enumeration.
        let mut od_pairs = Vec::with_capacity(od.len());
        let mut total_demand = 0.0;
        for (origin, destination, demand) in od {
            if !matches!(nodes[origin.index()].kind, NodeKind::Origin) {
                return Err(NetError::NotAnOrigin(origin));
            }
            if !matches!(nodes[destination.index()].kind, NodeKind::Destination) {
                return Err(NetError::NotADestination(destination));
            }
            if demand.len() != grid.horizon {
                return Err(NetError::DemandLength {
                    origin,
                    destination,
                    got: demand.len(),
                    expected: grid.horizon,
                });
            }
            for (step, &value) in demand.iter().enumerate() {
                if value < 0.0 {
                    return Err(NetError::NegativeDemand { origin, destination, step, value });
                }
            }

            let paths = enumerate_paths(&links, &nodes, origin, destination);
            if paths.is_empty() {
                return Err(NetError::Disconnected { origin, destination });
            }
            total_demand += demand.iter().sum::<f64>();
            od_pairs.push(OdPair { origin, destination, demand, paths });
        }

        // Zero-filled flow series for every enumerated path; travel times
        // start at the free-flow chain.
        let mut path_flows = FxHashMap::default();
        for od in &od_pairs {
            for path in &od.paths {
                path_flows.insert(path.clone(), vec![0.0; grid.horizon]);
            }
        }

        let mut network = Network {
            grid,
            links,
            nodes,
            od_pairs,
            path_flows,
            path_travel_times: FxHashMap::default(),
            total_demand,
        };
        network.calculate_path_travel_times();
        Ok(network)
    }
}

/// All simple paths (no repeated links) from `origin` to `destination`,
/// found by depth-first augmentation.  Exhaustive by design.
fn enumerate_paths(
    links: &[Link],
    nodes: &[Node],
    origin: NodeId,
    destination: NodeId,
) -> Vec<Path> {
    let mut found = Vec::new();
    let mut stack: Vec<LinkId> = Vec::new();
    extend_paths(links, nodes, origin, destination, &mut stack, &mut found);
    found
}

fn extend_paths(
    links: &[Link],
    nodes: &[Node],
    at: NodeId,
    destination: NodeId,
    stack: &mut Vec<LinkId>,
    found: &mut Vec<Path>,
) {
    if at == destination && !stack.is_empty() {
        found.push(Path::new(stack.clone()));
        return;
    }
    for &next in &nodes[at.index()].out_links {
        if stack.contains(&next) {
            continue;
        }
        stack.push(next);
        extend_paths(links, nodes, links[next.index()].head, destination, stack, found);
        stack.pop();
    }
}
