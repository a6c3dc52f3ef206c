//! `AssignOutputObserver<W>` — bridges `AssignObserver` to an `OutputWriter`.

use dta_assign::{AssignObserver, AssignSummary, IterationStats};
use dta_net::Network;

use crate::row::{IterationRow, LinkProfileRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// An [`AssignObserver`] that writes iteration summaries and, at the end of
/// the run, per-link loading profiles to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `AssignObserver`
/// methods have no return value.  After the run returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct AssignOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> AssignOutputObserver<W> {
    /// Create an observer backed by `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> AssignObserver for AssignOutputObserver<W> {
    fn on_iteration(&mut self, stats: &IterationStats, _network: &Network) {
        let row = IterationRow {
            iteration: stats.iteration as u64,
            tstt: stats.tstt,
            sptt: stats.sptt,
            aec: stats.aec,
            step_size: stats.step_size,
        };
        let result = self.writer.write_iteration(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _summary: &AssignSummary, network: &Network) {
        // Counts from the final loading pass, one row per link per time
        // point (horizon + 1 points, fenceposts included).
        let rows: Vec<LinkProfileRow> = network
            .links
            .iter()
            .flat_map(|link| {
                (0..=network.grid.horizon).map(|step| LinkProfileRow {
                    link_id: link.id.0,
                    step: step as u64,
                    upstream_count: link.upstream.total_at(step as i64),
                    downstream_count: link.downstream.total_at(step as i64),
                    travel_time_steps: link.travel_time_at(step),
                })
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_link_profiles(&rows);
            self.store_err(result);
        }
        let result = self.writer.finish();
        self.store_err(result);
    }
}
