//! Progress notifications from a test run
//!
//! The runner never prints. Presentation layers implement [`RunObserver`]
//! and render whatever they like.

use std::path::Path;

use crate::step::StepFailure;

/// Receives run progress. Every method defaults to doing nothing.
pub trait RunObserver {
    /// A suite file was parsed and is about to run.
    fn suite_started(&mut self, _name: &str, _path: &Path) {}

    /// Step `index` (zero-based) is about to be sent.
    fn step_started(&mut self, _index: usize, _name: &str) {}

    fn step_passed(&mut self, _index: usize, _name: &str) {}

    /// Step `index` failed; no further steps of this suite will run.
    fn step_failed(&mut self, _index: usize, _name: &str, _failure: &StepFailure) {}

    /// Every step of the suite passed.
    fn suite_passed(&mut self, _name: &str) {}
}

/// Observer that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
