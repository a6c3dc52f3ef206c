//! `dta-output` — assignment output writers for the rust_dta workspace.
//!
//! The CSV backend creates two files:
//!
//! | File                      | Contents                                    |
//! |---------------------------|---------------------------------------------|
//! | `iteration_summaries.csv` | TSTT/SPTT/AEC/step size per iteration       |
//! | `link_profiles.csv`       | Cumulative counts and travel times per link |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`AssignOutputObserver`], which implements `dta_assign::AssignObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dta_output::{AssignOutputObserver, CsvWriter};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = AssignOutputObserver::new(writer);
//! msa.run(&mut network, &mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::AssignOutputObserver;
pub use row::{IterationRow, LinkProfileRow};
pub use writer::OutputWriter;
