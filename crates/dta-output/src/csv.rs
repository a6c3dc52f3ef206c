//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `iteration_summaries.csv`
//! - `link_profiles.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{IterationRow, LinkProfileRow, OutputResult};

/// Writes assignment output to two CSV files.
pub struct CsvWriter {
    iterations: Writer<File>,
    profiles: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut iterations = Writer::from_path(dir.join("iteration_summaries.csv"))?;
        iterations.write_record(["iteration", "tstt", "sptt", "aec", "step_size"])?;

        let mut profiles = Writer::from_path(dir.join("link_profiles.csv"))?;
        profiles.write_record([
            "link_id",
            "step",
            "upstream_count",
            "downstream_count",
            "travel_time_steps",
        ])?;

        Ok(Self { iterations, profiles, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_iteration(&mut self, row: &IterationRow) -> OutputResult<()> {
        self.iterations.write_record(&[
            row.iteration.to_string(),
            row.tstt.to_string(),
            row.sptt.to_string(),
            row.aec.to_string(),
            row.step_size.to_string(),
        ])?;
        Ok(())
    }

    fn write_link_profiles(&mut self, rows: &[LinkProfileRow]) -> OutputResult<()> {
        for row in rows {
            self.profiles.write_record(&[
                row.link_id.to_string(),
                row.step.to_string(),
                row.upstream_count.to_string(),
                row.downstream_count.to_string(),
                row.travel_time_steps.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.iterations.flush()?;
        self.profiles.flush()?;
        Ok(())
    }
}
