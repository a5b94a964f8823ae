//! Host that records every signal a module sends.

use blackhole_env::ModuleHost;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Records strikes, passes and progress reports for assertions.
#[derive(Debug, Default)]
pub struct RecordingHost {
    strikes: Mutex<Vec<String>>,
    passes: AtomicUsize,
    progress_reports: Mutex<Vec<usize>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strike_count(&self) -> usize {
        lock(&self.strikes).len()
    }

    /// Diagnostics of every strike, oldest first.
    pub fn strikes(&self) -> Vec<String> {
        lock(&self.strikes).clone()
    }

    pub fn pass_count(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    /// Every progress count shown, oldest first.
    pub fn progress_reports(&self) -> Vec<usize> {
        lock(&self.progress_reports).clone()
    }
}

impl ModuleHost for RecordingHost {
    fn report_strike(&self, diagnostic: &str) {
        lock(&self.strikes).push(diagnostic.to_string());
    }

    fn report_pass(&self) {
        self.passes.fetch_add(1, Ordering::SeqCst);
    }

    fn show_progress(&self, entered: usize) {
        lock(&self.progress_reports).push(entered);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
