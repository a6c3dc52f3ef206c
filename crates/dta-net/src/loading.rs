//! The network loading engine.
//!
//! One loading pass simulates the whole horizon with the current path
//! flows, producing per-link cumulative counts that the travel-time
//! derivation then reads back.  Each step runs four phases in order:
//!
//! 1. **Link pass** — every link opens its next count entries and reports
//!    `(sending, receiving)` flow.  This completes for all links before any
//!    node runs (the link/node barrier).
//! 2. **Node pass** — every non-centroid node disaggregates its in-links'
//!    sending flows by path, derives split proportions from the paths'
//!    next links, computes transition flows, and commits them.
//! 3. **Injection** — demand departs: each path's flow at this step is
//!    added to the upstream end of its first link.  No admission control:
//!    origin connectors are expected to carry unbounded inflow capacity.
//! 4. **Termination** — destination nodes drain their in-links' sending
//!    flows, path by path.

use dta_core::Path;
use dta_flow::{Link, NodeKind};

use crate::network::Network;

impl Network {
    /// Run one full loading pass over the horizon with the current
    /// `path_flows`, resetting all cumulative counts first.
    pub fn load(&mut self) {
        let n_links = self.link_count();
        for link in &mut self.links {
            link.reset_counts();
        }

        let mut sending = vec![0.0; n_links];
        let mut receiving = vec![0.0; n_links];
        for t in self.grid.steps() {
            for (k, link) in self.links.iter_mut().enumerate() {
                (sending[k], receiving[k]) = link.link_update(t);
            }
            self.process_nodes(t, &sending, &receiving);
            self.inject_trips(t);
            self.terminate_trips(t, &sending);
        }
    }

    /// Phase 2: transition flows at every series/diverge/merge node.
    fn process_nodes(&mut self, t: usize, sending: &[f64], receiving: &[f64]) {
        let Self { links, nodes, .. } = self;
        for node in nodes.iter() {
            if node.is_centroid() {
                continue;
            }

            // Disaggregate each in-link's sending flow by path, and project
            // the node-local sending/receiving vectors.
            let mut s_local = Vec::with_capacity(node.in_links.len());
            let mut disagg = Vec::with_capacity(node.in_links.len());
            for &ij in &node.in_links {
                s_local.push(sending[ij.index()]);
                disagg.push(disaggregate_sending(&links[ij.index()], sending[ij.index()], t));
            }
            let r_local: Vec<f64> = node
                .out_links
                .iter()
                .map(|&jk| receiving[jk.index()])
                .collect();

            // Split proportions: the path-flow-weighted share of each
            // in-link's flow continuing to each out-link.
            let proportion: Vec<Vec<f64>> = node
                .in_links
                .iter()
                .zip(&disagg)
                .map(|(&ij, wants)| {
                    let total: f64 = wants.iter().map(|(_, w)| w).sum();
                    let mut row = vec![0.0; node.out_links.len()];
                    if total > 0.0 {
                        for (path, w) in wants {
                            let Some(jk) = path.next_after(ij) else { continue };
                            if let Some(j) = node.out_links.iter().position(|&l| l == jk) {
                                row[j] += w / total;
                            }
                        }
                    }
                    row
                })
                .collect();

            let flows = node.transition_flows(&s_local, &r_local, &proportion);

            // Commit: every path on in-link `ij` moves the same fraction of
            // its waiting flow, onto its own next link.
            for (i, &ij) in node.in_links.iter().enumerate() {
                let moved: f64 = flows[i].iter().sum();
                if moved <= 0.0 || s_local[i] <= 0.0 {
                    continue;
                }
                let fraction = (moved / s_local[i]).min(1.0);
                for (path, want) in &disagg[i] {
                    let amount = want * fraction;
                    if amount <= 0.0 {
                        continue;
                    }
                    let Some(jk) = path.next_after(ij) else { continue };
                    links[ij.index()].flow_out(path, amount);
                    links[jk.index()].flow_in(path, amount);
                }
            }
        }
    }

    /// Phase 3: place departing flow at the upstream end of each path's
    /// first link.
    fn inject_trips(&mut self, t: usize) {
        let Self { links, od_pairs, path_flows, .. } = self;
        for od in od_pairs.iter() {
            for path in &od.paths {
                let Some(series) = path_flows.get(path) else { continue };
                let flow = series[t];
                if flow > 0.0 {
                    links[path.first().index()].flow_in(path, flow);
                }
            }
        }
    }

    /// Phase 4: drain sending flow at destination in-links, path by path.
    fn terminate_trips(&mut self, t: usize, sending: &[f64]) {
        let Self { links, nodes, .. } = self;
        for node in nodes.iter() {
            if !matches!(node.kind, NodeKind::Destination) {
                continue;
            }
            for &ij in &node.in_links {
                let exiting = disaggregate_sending(&links[ij.index()], sending[ij.index()], t);
                let link = &mut links[ij.index()];
                for (path, amount) in exiting {
                    if amount > 0.0 {
                        link.flow_out(&path, amount);
                    }
                }
            }
        }
    }
}

/// Split `aggregate` sending flow across the paths waiting at the link's
/// downstream end, in proportion to each path's share of the vehicles that
/// have had time to arrive but have not yet exited (the cumulative-count
/// FIFO approximation).  The shares are rescaled so they sum exactly to the
/// aggregate.
fn disaggregate_sending(link: &Link, aggregate: f64, t: usize) -> Vec<(Path, f64)> {
    if aggregate <= 0.0 {
        return Vec::new();
    }
    let t = t as i64;
    let fft = link.free_flow_steps() as i64;
    let mut wants: Vec<(Path, f64)> = link
        .upstream
        .paths()
        .filter_map(|path| {
            let arrived = link.upstream.path_at(path, t + 1 - fft);
            let exited = link.downstream.path_at(path, t);
            let want = arrived - exited;
            (want > 0.0).then(|| (path.clone(), want))
        })
        .collect();
    let total: f64 = wants.iter().map(|(_, w)| w).sum();
    if total > 0.0 {
        let scale = aggregate / total;
        for (_, w) in &mut wants {
            *w *= scale;
        }
    }
    wants
}
