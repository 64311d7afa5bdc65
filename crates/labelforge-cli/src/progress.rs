// this_file: crates/labelforge-cli/src/progress.rs

//! Single-line progress on stderr.

use labelforge_render::{ProgressEvent, ProgressSink};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct StderrProgress {
    total: AtomicUsize,
    settled: AtomicUsize,
}

impl StderrProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) {
        let settled = self.settled.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r[{settled}/{total}] records");
        let _ = stderr.flush();
    }
}

impl ProgressSink for StderrProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { records } => self.total.store(*records, Ordering::Relaxed),
            ProgressEvent::RecordDone { .. } | ProgressEvent::RecordFailed { .. } => self.tick(),
            ProgressEvent::Finished { .. } => {
                let _ = writeln!(io::stderr());
            }
        }
    }
}
