//! Unit tests for shortest paths and the equilibration loop.

#[cfg(test)]
mod helpers {
    use dta_core::TimeGrid;
    use dta_flow::{LinkParams, ModelKind};
    use dta_net::{Network, NetworkBuilder};

    pub fn grid() -> TimeGrid {
        TimeGrid::new(1.0, 30).unwrap()
    }

    pub fn params(length: f64, capacity: f64) -> LinkParams {
        LinkParams {
            free_flow_speed: 1.0,
            backward_wave_speed: 1.0,
            jam_density: 4.0,
            length,
            capacity,
        }
    }

    /// O → D over one point-queue link with free-flow time 5.
    pub fn single_link(demand: Vec<f64>) -> Network {
        let mut b = NetworkBuilder::new(grid());
        let o = b.add_node();
        let d = b.add_node();
        b.add_link(o, d, params(5.0, 10.0), ModelKind::PointQueue);
        b.add_od_pair(o, d, demand);
        b.build().unwrap()
    }

    /// Two parallel point-queue links from O to D: link 0 has free-flow
    /// time 2, link 1 free-flow time 4.
    pub fn parallel_links() -> Network {
        let mut b = NetworkBuilder::new(grid());
        let o = b.add_node();
        let d = b.add_node();
        b.add_link(o, d, params(2.0, 10.0), ModelKind::PointQueue);
        b.add_link(o, d, params(4.0, 10.0), ModelKind::PointQueue);
        b.add_od_pair(o, d, vec![0.0; 30]);
        b.build().unwrap()
    }
}

// ── TDSP ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tdsp {
    use dta_core::{LinkId, NodeId};
    use dta_flow::ModelKind;
    use dta_net::NetworkBuilder;

    use super::helpers::{grid, params, parallel_links, single_link};
    use crate::tdsp::tdsp;

    #[test]
    fn trivial_network_labels() {
        let net = single_link(vec![0.0; 30]);
        let labels = tdsp(&net, NodeId(0), 3);
        assert_eq!(labels.cost[0], 3);
        assert_eq!(labels.cost[1], 8); // departure 3 + free-flow time 5
        assert_eq!(labels.backlink[1], LinkId(0));
        assert_eq!(labels.backlink[0], LinkId::INVALID);
        let path = labels.reconstruct(&net, NodeId(0), NodeId(1)).unwrap();
        assert_eq!(path.links(), &[LinkId(0)]);
    }

    #[test]
    fn route_choice_follows_time_varying_costs() {
        let mut net = parallel_links();
        // Congest the fast link for early departures only.
        for entry in 0..6 {
            net.links[0].set_travel_time(entry, 10);
        }

        let early = tdsp(&net, NodeId(0), 0);
        assert_eq!(early.backlink[1], LinkId(1)); // 4 beats 10
        assert_eq!(early.cost[1], 4);

        let late = tdsp(&net, NodeId(0), 10);
        assert_eq!(late.backlink[1], LinkId(0)); // congestion cleared
        assert_eq!(late.cost[1], 12);
    }

    #[test]
    fn equal_cost_ties_break_toward_lowest_node_index() {
        // O → {A, B} → M → D with identical costs through A and B.  A has
        // the lower index, so the search must settle on the route via A.
        let mut b = NetworkBuilder::new(grid());
        let o = b.add_node();
        let a = b.add_node();
        let bb = b.add_node();
        let m = b.add_node();
        let d = b.add_node();
        b.add_link(o, a, params(2.0, 10.0), ModelKind::PointQueue); // 0
        b.add_link(o, bb, params(2.0, 10.0), ModelKind::PointQueue); // 1
        b.add_link(a, m, params(2.0, 10.0), ModelKind::PointQueue); // 2
        b.add_link(bb, m, params(2.0, 10.0), ModelKind::PointQueue); // 3
        b.add_link(m, d, params(2.0, 10.0), ModelKind::PointQueue); // 4
        b.add_od_pair(o, d, vec![0.0; 30]);
        let net = b.build().unwrap();

        let labels = tdsp(&net, o, 0);
        let path = labels.reconstruct(&net, o, d).unwrap();
        assert_eq!(path.links(), &[LinkId(0), LinkId(2), LinkId(4)]);
    }

    #[test]
    fn unreached_nodes_keep_infinite_labels() {
        // O2's component does not reach D2.
        let mut b = NetworkBuilder::new(grid());
        let o1 = b.add_node();
        let d1 = b.add_node();
        let o2 = b.add_node();
        let d2 = b.add_node();
        b.add_link(o1, d1, params(2.0, 10.0), ModelKind::PointQueue);
        b.add_link(o1, d2, params(2.0, 10.0), ModelKind::PointQueue);
        b.add_link(o2, d1, params(2.0, 10.0), ModelKind::PointQueue);
        b.add_od_pair(o1, d2, vec![0.0; 30]);
        let net = b.build().unwrap();

        let labels = tdsp(&net, o2, 0);
        assert!(labels.reached(d1));
        assert!(!labels.reached(d2));
        assert!(labels.reconstruct(&net, o2, d2).is_none());
    }
}

// ── All-or-nothing and the flow blend ─────────────────────────────────────────

#[cfg(test)]
mod msa {
    use rustc_hash::FxHashMap;

    use dta_core::{LinkId, NodeId, Path};
    use dta_net::OdPair;

    use super::helpers::single_link;
    use crate::error::AssignError;
    use crate::msa::{all_or_nothing, update_path_flows};

    #[test]
    fn all_or_nothing_places_full_demand_on_shortest_paths() {
        let mut demand = vec![0.0; 30];
        demand[0] = 3.0;
        demand[4] = 1.5;
        let net = single_link(demand);

        let (target, sptt) = all_or_nothing(&net).unwrap();
        assert_eq!(target.len(), 1);
        let series = &target[&Path::new(vec![LinkId(0)])];
        assert_eq!(series[0], 3.0);
        assert_eq!(series[4], 1.5);
        assert_eq!(series[1], 0.0);
        // Free-flow time 5 on every departure.
        assert_eq!(sptt, 3.0 * 5.0 + 1.5 * 5.0);
    }

    #[test]
    fn unreachable_demand_aborts_the_run() {
        let mut net = single_link(vec![0.0; 30]);
        // Splice in a demand stream whose destination has no route.  The
        // builder would reject this, which is exactly why the assignment
        // still has to defend against it.
        let mut demand = vec![0.0; 30];
        demand[2] = 1.0;
        net.od_pairs.push(OdPair {
            origin: NodeId(1),
            destination: NodeId(0),
            demand,
            paths: Vec::new(),
        });

        let err = all_or_nothing(&net).unwrap_err();
        assert!(matches!(
            err,
            AssignError::Unreachable { origin: NodeId(1), destination: NodeId(0), departure: 2 }
        ));
    }

    #[test]
    fn blend_is_a_convex_combination() {
        let mut net = single_link(vec![0.0; 30]);
        let path = net.od_pairs[0].paths[0].clone();
        net.path_flows.get_mut(&path).unwrap()[0] = 4.0;

        let mut target = FxHashMap::default();
        let mut series = vec![0.0; 30];
        series[0] = 8.0;
        target.insert(path.clone(), series);

        update_path_flows(&mut net, &target, 0.25);
        assert_eq!(net.path_flows[&path][0], 0.25 * 8.0 + 0.75 * 4.0);
    }

    #[test]
    fn step_size_zero_and_one_are_identity_and_replacement() {
        let mut net = single_link(vec![0.0; 30]);
        let path = net.od_pairs[0].paths[0].clone();
        net.path_flows.get_mut(&path).unwrap()[0] = 4.0;

        let mut target = FxHashMap::default();
        let mut series = vec![0.0; 30];
        series[0] = 8.0;
        target.insert(path.clone(), series);

        update_path_flows(&mut net, &target, 0.0);
        assert_eq!(net.path_flows[&path][0], 4.0);

        update_path_flows(&mut net, &target, 1.0);
        assert_eq!(net.path_flows[&path][0], 8.0);
    }

    #[test]
    fn paths_missing_from_target_decay() {
        let mut net = single_link(vec![0.0; 30]);
        let path = net.od_pairs[0].paths[0].clone();
        net.path_flows.get_mut(&path).unwrap()[0] = 4.0;

        update_path_flows(&mut net, &FxHashMap::default(), 0.5);
        assert_eq!(net.path_flows[&path][0], 2.0);
    }

    #[test]
    fn paths_new_to_target_start_from_zero() {
        let mut net = single_link(vec![0.0; 30]);
        let novel = Path::new(vec![LinkId(7)]);
        let mut target = FxHashMap::default();
        let mut series = vec![0.0; 30];
        series[3] = 6.0;
        target.insert(novel.clone(), series);

        update_path_flows(&mut net, &target, 0.5);
        assert_eq!(net.path_flows[&novel][3], 3.0);
    }
}

// ── Parallel query fan-out ────────────────────────────────────────────────────

#[cfg(all(test, feature = "parallel"))]
mod parallel {
    use rustc_hash::FxHashMap;

    use dta_core::Path;
    use dta_flow::ModelKind;
    use dta_net::NetworkBuilder;

    use super::helpers::{grid, params};
    use crate::msa::all_or_nothing;
    use crate::tdsp::tdsp;

    /// The Rayon fan-out must produce exactly what a plain sequential
    /// sweep over the same queries would: identical target flows and an
    /// SPTT summed in the same query order.
    #[test]
    fn fanned_out_queries_match_a_sequential_sweep() {
        let mut b = NetworkBuilder::new(grid());
        let o1 = b.add_node();
        let o2 = b.add_node();
        let d = b.add_node();
        b.add_link(o1, d, params(2.0, 10.0), ModelKind::PointQueue); // 0
        b.add_link(o1, d, params(4.0, 10.0), ModelKind::PointQueue); // 1
        b.add_link(o2, d, params(3.0, 10.0), ModelKind::PointQueue); // 2
        let mut d1 = vec![0.0; 30];
        d1[0] = 2.0;
        d1[5] = 1.0;
        d1[9] = 0.5;
        let mut d2 = vec![0.0; 30];
        d2[1] = 4.0;
        d2[7] = 2.5;
        b.add_od_pair(o1, d, d1);
        b.add_od_pair(o2, d, d2);
        let mut net = b.build().unwrap();
        // Congest the fast link early so route choice varies by departure.
        for entry in 0..4 {
            net.links[0].set_travel_time(entry, 9);
        }

        let (target, sptt) = all_or_nothing(&net).unwrap();

        let mut expect: FxHashMap<Path, Vec<f64>> = FxHashMap::default();
        let mut expect_sptt = 0.0;
        for od in &net.od_pairs {
            for (t, &demand) in od.demand.iter().enumerate() {
                if demand <= 0.0 {
                    continue;
                }
                let labels = tdsp(&net, od.origin, t);
                let path = labels.reconstruct(&net, od.origin, od.destination).unwrap();
                expect_sptt += demand * (labels.cost[od.destination.index()] as f64 - t as f64);
                expect.entry(path).or_insert_with(|| vec![0.0; 30])[t] = demand;
            }
        }

        assert_eq!(target, expect);
        assert_eq!(sptt, expect_sptt);
    }
}

// ── End-to-end equilibration ──────────────────────────────────────────────────

#[cfg(test)]
mod equilibration {
    use dta_core::TimeGrid;
    use dta_flow::{LinkParams, ModelKind};
    use dta_net::{Network, NetworkBuilder};

    use crate::msa::{IterationStats, MsaAssignment};
    use crate::observer::AssignObserver;

    struct Recorder {
        stats: Vec<IterationStats>,
    }

    impl AssignObserver for Recorder {
        fn on_iteration(&mut self, stats: &IterationStats, _network: &Network) {
            self.stats.push(*stats);
        }
    }

    #[test]
    fn uncongested_single_path_converges_immediately() {
        let grid = TimeGrid::new(1.0, 30).unwrap();
        let mut b = NetworkBuilder::new(grid);
        let o = b.add_node();
        let d = b.add_node();
        b.add_link(
            o,
            d,
            LinkParams {
                free_flow_speed: 1.0,
                backward_wave_speed: 1.0,
                jam_density: 4.0,
                length: 5.0,
                capacity: 10.0,
            },
            ModelKind::PointQueue,
        );
        let mut demand = vec![0.0; 30];
        demand[0] = 1.0;
        b.add_od_pair(o, d, demand);
        let mut net = b.build().unwrap();

        // One path and no congestion: TSTT equals SPTT on the very first
        // measurement.
        let msa = MsaAssignment { max_iterations: 10, aec_threshold: 1e-6 };
        let mut rec = Recorder { stats: Vec::new() };
        let summary = msa.run(&mut net, &mut rec).unwrap();

        assert!(summary.converged);
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.aec, 0.0);
        assert_eq!(rec.stats.len(), 1);
    }

    #[test]
    fn bottleneck_diamond_equilibrates() {
        // Two routes: a short one through a 1 veh/step bottleneck and a
        // longer uncongested one.  Demand of 2 veh/step forces a split.
        let grid = TimeGrid::new(1.0, 60).unwrap();
        let mut b = NetworkBuilder::new(grid);
        let o = b.add_node();
        let a = b.add_node();
        let m = b.add_node();
        let d = b.add_node();
        let fat = |length: f64| LinkParams {
            free_flow_speed: 1.0,
            backward_wave_speed: 1.0,
            jam_density: 100.0,
            length,
            capacity: 50.0,
        };
        b.add_link(o, a, fat(1.0), ModelKind::PointQueue); // 0
        let short = b.add_link(
            a,
            m,
            LinkParams {
                free_flow_speed: 1.0,
                backward_wave_speed: 1.0,
                jam_density: 100.0,
                length: 2.0,
                capacity: 1.0, // the bottleneck
            },
            ModelKind::PointQueue,
        ); // 1
        b.add_link(a, m, fat(8.0), ModelKind::PointQueue); // 2: the detour
        b.add_link(m, d, fat(1.0), ModelKind::PointQueue); // 3
        let mut demand = vec![0.0; 60];
        for t in 0..10 {
            demand[t] = 2.0;
        }
        b.add_od_pair(o, d, demand.clone());
        let mut net = b.build().unwrap();
        let _ = short;

        let msa = MsaAssignment { max_iterations: 40, aec_threshold: 0.05 };
        let mut rec = Recorder { stats: Vec::new() };
        let summary = msa.run(&mut net, &mut rec).unwrap();

        assert!(!rec.stats.is_empty());
        // Consistent SPTT/TSTT measurement keeps the gap non-negative.
        for stats in &rec.stats {
            assert!(stats.aec >= -1e-9, "negative AEC: {}", stats.aec);
            assert!(stats.tstt + 1e-9 >= stats.sptt);
        }
        // The gap shrinks as the averages settle.
        let first = rec.stats.first().unwrap().aec;
        let last = rec.stats.last().unwrap().aec;
        assert!(last <= first + 1e-9, "AEC grew: {first} → {last}");

        // The blend conserves demand at every departure step.
        for t in 0..60 {
            let assigned: f64 = net.path_flows.values().map(|f| f[t]).sum();
            assert!(
                (assigned - demand[t]).abs() < 1e-9,
                "step {t}: assigned {assigned}, demand {}",
                demand[t]
            );
        }
        assert!(summary.iterations >= 1);
    }
}
