//! Step observers
//!
//! A [`ProgressReporter`] is handed to `advance` and told about every
//! completed step. It never sees the state, so it cannot change the result.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;

/// Observer called once per completed step
pub trait ProgressReporter {
    /// `step` runs from 1 to `total` inclusive
    fn report(&self, step: usize, total: usize);
}

/// Reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn report(&self, _step: usize, _total: usize) {}
}

/// Logs every whole percentage once through `log::info!`
#[derive(Debug, Default)]
pub struct LogProgress {
    last_percent: AtomicUsize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for LogProgress {
    fn report(&self, step: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = step * 100 / total;
        let previous = self.last_percent.swap(percent, Ordering::Relaxed);
        if percent != previous || step == 1 {
            info!("progress: {percent}% ({step}/{total})");
        }
    }
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, usize),
{
    fn report(&self, step: usize, total: usize) {
        self(step, total)
    }
}
