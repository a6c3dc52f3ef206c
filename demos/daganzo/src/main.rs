//! daganzo — a two-route bottleneck equilibration demo.
//!
//! A single O-D pair with two parallel routes between a diverge and a
//! merge: a long free-flowing detour on top, and a short link through a
//! 1 veh/step bottleneck on the bottom.  Peak demand exceeds the
//! bottleneck's capacity, so at equilibrium the queue on the bottom route
//! grows until both routes cost the same and later departures spill onto
//! the detour.
//!
//! Writes `iteration_summaries.csv` and `link_profiles.csv` to `./output`
//! and prints the first 20 steps of every link's loading profile.

use std::fs;
use std::path::Path;

use anyhow::Result;

use dta_assign::MsaAssignment;
use dta_core::TimeGrid;
use dta_flow::{LinkParams, ModelKind};
use dta_net::{Network, NetworkBuilder};
use dta_output::{AssignOutputObserver, CsvWriter};

// ── Constants ─────────────────────────────────────────────────────────────────

const TIMESTEP_SECS: f64 = 1.0;
const HORIZON_STEPS: usize = 50;
const PEAK_STEPS: usize = 10;
const PEAK_DEMAND: f64 = 2.0; // veh/step, double the bottleneck capacity
const PRINT_STEPS: usize = 20;

fn params(length: f64, capacity: f64) -> LinkParams {
    LinkParams {
        free_flow_speed: 1.0,
        backward_wave_speed: 1.0,
        jam_density: 100.0,
        length,
        capacity,
    }
}

fn build_network() -> Result<Network> {
    let grid = TimeGrid::new(TIMESTEP_SECS, HORIZON_STEPS)?;
    let mut b = NetworkBuilder::new(grid);

    let origin = b.add_node();
    let diverge = b.add_node();
    let merge = b.add_node();
    let destination = b.add_node();

    b.add_link(origin, diverge, params(1.0, 50.0), ModelKind::SpatialQueue);
    let _top = b.add_link(diverge, merge, params(10.0, 50.0), ModelKind::SpatialQueue);
    let bottom = b.add_link(diverge, merge, params(4.0, 1.0), ModelKind::SpatialQueue);
    b.add_link(merge, destination, params(1.0, 50.0), ModelKind::SpatialQueue);

    let mut demand = vec![0.0; HORIZON_STEPS];
    for step in demand.iter_mut().take(PEAK_STEPS) {
        *step = PEAK_DEMAND;
    }
    b.add_od_pair(origin, destination, demand);

    let mut network = b.build()?;
    // Link capacities apply at both ends by default; the bottleneck should
    // only constrain outflow, so open up its entrance.
    network.links[bottom.index()].set_upstream_capacity(f64::INFINITY, &grid);
    Ok(network)
}

fn main() -> Result<()> {
    let mut network = build_network()?;

    let out_dir = Path::new("output");
    fs::create_dir_all(out_dir)?;
    let writer = CsvWriter::new(out_dir)?;
    let mut observer = AssignOutputObserver::new(writer);

    let msa = MsaAssignment::default();
    let summary = msa.run(&mut network, &mut observer)?;
    if let Some(err) = observer.take_error() {
        eprintln!("output error: {err}");
    }

    println!(
        "{} after {} iterations (AEC {:.4})",
        if summary.converged { "Converged" } else { "Hit the iteration cap" },
        summary.iterations,
        summary.aec,
    );

    println!("Link data for first {PRINT_STEPS} time steps:");
    for link in &network.links {
        let steps = PRINT_STEPS.min(network.grid.horizon);
        println!("LINK {}", link.id);
        println!("-----------");
        let tt: Vec<u32> = (1..steps).map(|t| link.travel_time_at(t)).collect();
        println!("Travel time: {tt:?}");
        let up: Vec<String> = (0..steps)
            .map(|t| format!("{:.2}", link.upstream.total_at(t as i64)))
            .collect();
        println!("Upstream count: {up:?}");
        let down: Vec<String> = (0..steps)
            .map(|t| format!("{:.2}", link.downstream.total_at(t as i64)))
            .collect();
        println!("Downstream count: {down:?}");
    }
    println!("TSTT is {}", network.total_system_travel_time());

    Ok(())
}
