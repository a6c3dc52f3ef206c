//! The `OutputWriter` trait implemented by all backend writers.

use crate::{IterationRow, LinkProfileRow, OutputResult};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with
/// [`AssignOutputObserver::take_error`][crate::AssignOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one iteration summary row.
    fn write_iteration(&mut self, row: &IterationRow) -> OutputResult<()>;

    /// Write a batch of link loading profiles.
    fn write_link_profiles(&mut self, rows: &[LinkProfileRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
