// this_file: crates/labelforge-render/src/batch.rs

//! Parallel batch composition with ordered, single-writer output.
//!
//! Workers compose, render and encode one record each, then hand the result
//! to a writer thread over a channel. The writer holds a reorder buffer, so
//! output order is input order no matter which worker finishes first, and it
//! alone assigns label numbers and touches the output.

use crate::renderer::Renderer;
use crate::resources::Resources;
use crate::sink::{EncodedLabel, LabelSink, OutputMode};
use labelforge_core::{Error, LabelRecord, Result};
use log::{info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// How to run a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: OutputMode,
    /// Worker threads (0 = one per core)
    pub jobs: usize,
}

/// Stops new records from being started; in-flight records still finish
/// and are written.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress notifications, emitted from the writer thread in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { records: usize },
    RecordDone { index: usize, row: usize, copies: u32 },
    RecordFailed { index: usize, row: usize, reason: String },
    Finished { labels: u64, failed: usize },
}

/// Consumer of [`ProgressEvent`]s, such as a CLI progress line.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// A record-scoped problem listed in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub index: usize,
    pub row: usize,
    pub record: String,
    pub reason: String,
}

impl RecordIssue {
    fn new(index: usize, record: &LabelRecord, error: &Error) -> Self {
        Self {
            index,
            row: record.source_row,
            record: record.describe(),
            reason: error.to_string(),
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total_records: usize,
    pub succeeded: usize,
    /// Records skipped because of a record-level error
    pub failures: Vec<RecordIssue>,
    /// Records rendered once because their quantity was unusable
    pub coercions: Vec<RecordIssue>,
    pub labels_written: u64,
    pub degraded_lines: usize,
    /// Records never started because the batch was cancelled
    pub not_started: usize,
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    pub fn cancelled(&self) -> bool {
        self.not_started > 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Records: {} total, {} succeeded, {} failed",
            self.total_records,
            self.succeeded,
            self.failures.len()
        )?;
        writeln!(f, "Labels written: {}", self.labels_written)?;
        if !self.failures.is_empty() {
            writeln!(f, "Skipped records:")?;
            for issue in &self.failures {
                writeln!(f, "  {}: {}", issue.record, issue.reason)?;
            }
        }
        if !self.coercions.is_empty() {
            writeln!(f, "Quantity coercions:")?;
            for issue in &self.coercions {
                writeln!(f, "  {}: {}", issue.record, issue.reason)?;
            }
        }
        if self.degraded_lines > 0 {
            writeln!(
                f,
                "Degraded lines: {} (Arabic reshaping unavailable)",
                self.degraded_lines
            )?;
        }
        if self.cancelled() {
            writeln!(f, "Cancelled: {} records not started", self.not_started)?;
        }
        for output in &self.outputs {
            writeln!(f, "Output: {}", output.display())?;
        }
        Ok(())
    }
}

enum Outcome {
    Rendered {
        label: EncodedLabel,
        degraded_lines: usize,
    },
    Failed(Error),
    NotStarted,
}

/// Runs records through a worker pool into one deliverable.
pub struct BatchComposer {
    renderer: Arc<Renderer>,
    progress: Option<Arc<dyn ProgressSink>>,
    cancel: CancelToken,
}

impl BatchComposer {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self {
            renderer: Arc::new(Renderer::new(resources)),
            progress: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = &self.progress {
            progress.on_event(&event);
        }
    }

    /// Render every record `quantity` times into the configured output.
    ///
    /// Record-level failures are collected in the report; resource failures
    /// (output I/O, encoding) stop the batch and are returned as errors.
    pub fn run(&self, records: &[LabelRecord], options: &BatchOptions) -> Result<BatchReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .thread_name(|index| format!("labelforge-worker-{index}"))
            .build()
            .map_err(|err| Error::Internal(format!("cannot build worker pool: {err}")))?;

        let canvas = &self.renderer.resources().template().canvas;
        let sink = options.mode.open(canvas)?;

        info!(
            target: "labelforge::batch",
            "rendering {} records on {} threads",
            records.len(),
            pool.current_num_threads()
        );
        self.emit(ProgressEvent::Started {
            records: records.len(),
        });

        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<(usize, Outcome)>();

        std::thread::scope(|scope| {
            let abort = &abort;
            let writer = scope.spawn(move || self.write_in_order(rx, records, sink, abort));

            pool.install(|| {
                records
                    .par_iter()
                    .enumerate()
                    .for_each_with(tx, |tx, (index, record)| {
                        let outcome = if self.cancel.is_cancelled() || abort.load(Ordering::SeqCst)
                        {
                            Outcome::NotStarted
                        } else {
                            self.process(record, index, &options.mode)
                        };
                        // the writer is gone only after an abort
                        let _ = tx.send((index, outcome));
                    });
            });

            writer
                .join()
                .unwrap_or_else(|_| Err(Error::Internal("batch writer panicked".to_string())))
        })
    }

    fn process(&self, record: &LabelRecord, index: usize, mode: &OutputMode) -> Outcome {
        let rendered = self
            .renderer
            .render_record(record, index)
            .and_then(|(label, composition)| Ok((mode.encode(label)?, composition.degraded_lines)));
        match rendered {
            Ok((label, degraded_lines)) => Outcome::Rendered {
                label,
                degraded_lines,
            },
            Err(err) => Outcome::Failed(err),
        }
    }

    fn write_in_order(
        &self,
        rx: mpsc::Receiver<(usize, Outcome)>,
        records: &[LabelRecord],
        mut sink: Box<dyn LabelSink>,
        abort: &AtomicBool,
    ) -> Result<BatchReport> {
        let mut report = BatchReport {
            total_records: records.len(),
            ..BatchReport::default()
        };
        let mut pending = BTreeMap::new();
        let mut next = 0;
        let mut label_number = 0u64;

        for (index, outcome) in rx {
            pending.insert(index, outcome);
            while let Some(outcome) = pending.remove(&next) {
                let settled = self.settle(
                    next,
                    &records[next],
                    outcome,
                    sink.as_mut(),
                    &mut report,
                    &mut label_number,
                );
                if let Err(err) = settled {
                    abort.store(true, Ordering::SeqCst);
                    warn!(target: "labelforge::batch", "aborting batch: {err}");
                    return Err(err);
                }
                next += 1;
            }
        }

        if next != records.len() {
            return Err(Error::Internal(format!(
                "writer settled {next} of {} records",
                records.len()
            )));
        }

        report.outputs = sink.finish()?;
        info!(
            target: "labelforge::batch",
            "batch finished: {} labels, {} failed records",
            report.labels_written,
            report.failures.len()
        );
        self.emit(ProgressEvent::Finished {
            labels: report.labels_written,
            failed: report.failures.len(),
        });
        Ok(report)
    }

    fn settle(
        &self,
        index: usize,
        record: &LabelRecord,
        outcome: Outcome,
        sink: &mut dyn LabelSink,
        report: &mut BatchReport,
        label_number: &mut u64,
    ) -> Result<()> {
        if !matches!(outcome, Outcome::NotStarted) {
            if let Some(coercion) = record.quantity.coercion() {
                warn!(target: "labelforge::batch", "{}: {coercion}", record.describe());
                report.coercions.push(RecordIssue::new(index, record, &coercion));
            }
        }

        match outcome {
            Outcome::Rendered {
                label,
                degraded_lines,
            } => {
                let copies = record.quantity.get();
                sink.write_copies(*label_number + 1, copies, &label)?;
                *label_number += u64::from(copies);
                report.labels_written += u64::from(copies);
                report.succeeded += 1;
                report.degraded_lines += degraded_lines;
                self.emit(ProgressEvent::RecordDone {
                    index,
                    row: record.source_row,
                    copies,
                });
            }
            Outcome::Failed(err) if err.is_record_scoped() => {
                warn!(
                    target: "labelforge::batch",
                    "skipping {}: {err}",
                    record.describe()
                );
                let issue = RecordIssue::new(index, record, &err);
                self.emit(ProgressEvent::RecordFailed {
                    index,
                    row: record.source_row,
                    reason: issue.reason.clone(),
                });
                report.failures.push(issue);
            }
            Outcome::Failed(err) => return Err(err),
            Outcome::NotStarted => report.not_started += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_core::{LabelTemplate, Quantity};
    use labelforge_fontdb::FontSet;
    use labelforge_unicode::TextShaper;
    use parking_lot::Mutex;

    fn resources() -> Arc<Resources> {
        let template = LabelTemplate::default();
        let fonts = FontSet::builtin(&template.fonts);
        Arc::new(Resources::from_parts(template, fonts, None, TextShaper::default()).unwrap())
    }

    fn record(row: usize, barcode: &str, total: &str) -> LabelRecord {
        LabelRecord {
            po_no: "70056".to_string(),
            model: format!("M{row}"),
            r#ref: "R9".to_string(),
            size: "M".to_string(),
            style_code: "SC1".to_string(),
            barcode_value: barcode.to_string(),
            quantity: Quantity::parse(total),
            source_row: row,
        }
    }

    #[test]
    fn test_numbering_skips_failed_records() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record(2, "111111", "2"),
            record(3, "12é4", "5"),
            record(4, "222222", "abc"),
        ];
        let options = BatchOptions {
            mode: OutputMode::Files {
                dir: dir.path().to_path_buf(),
            },
            jobs: 2,
        };
        let report = BatchComposer::new(resources()).run(&records, &options).unwrap();

        assert_eq!(report.total_records, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.labels_written, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 3);
        assert_eq!(report.coercions.len(), 1);
        assert_eq!(report.coercions[0].row, 4);
        for number in 1..=3 {
            assert!(dir.path().join(format!("label_{number}.png")).is_file());
        }
        assert!(!dir.path().join("label_4.png").exists());

        let summary = report.to_string();
        assert!(summary.contains("3 total, 2 succeeded, 1 failed"));
        assert!(summary.contains("position 2"));
    }

    #[test]
    fn test_progress_events_arrive_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<_> = (0..12)
            .map(|i| record(i + 2, &format!("{:08}", i * 7919), "1"))
            .collect();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = events.clone();
        let progress: Arc<dyn ProgressSink> = Arc::new(move |event: &ProgressEvent| {
            sink_events.lock().push(event.clone());
        });

        let options = BatchOptions {
            mode: OutputMode::Files {
                dir: dir.path().to_path_buf(),
            },
            jobs: 4,
        };
        BatchComposer::new(resources())
            .with_progress(progress)
            .run(&records, &options)
            .unwrap();

        let events = events.lock();
        assert_eq!(events.first(), Some(&ProgressEvent::Started { records: 12 }));
        let done: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::RecordDone { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(done, (0..12).collect::<Vec<_>>());
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Finished {
                labels: 12,
                failed: 0
            })
        );
    }

    struct RecordingSink(Arc<Mutex<Vec<(u64, u32, EncodedLabel)>>>);

    impl LabelSink for RecordingSink {
        fn write_copies(
            &mut self,
            first_number: u64,
            copies: u32,
            label: &EncodedLabel,
        ) -> Result<()> {
            self.0.lock().push((first_number, copies, label.clone()));
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_writer_reorders_results_that_arrive_backwards() {
        let records = vec![
            record(2, "1111", "2"),
            record(3, "2222", "1"),
            record(4, "3333", "1"),
        ];
        let (tx, rx) = mpsc::channel();
        for index in (0..records.len()).rev() {
            let outcome = Outcome::Rendered {
                label: EncodedLabel::Png(vec![index as u8]),
                degraded_lines: 0,
            };
            tx.send((index, outcome)).unwrap();
        }
        drop(tx);

        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = Box::new(RecordingSink(Arc::clone(&written)));
        let report = BatchComposer::new(resources())
            .write_in_order(rx, &records, sink, &AtomicBool::new(false))
            .unwrap();

        assert_eq!(report.labels_written, 4);
        assert_eq!(
            *written.lock(),
            vec![
                (1, 2, EncodedLabel::Png(vec![0])),
                (3, 1, EncodedLabel::Png(vec![1])),
                (4, 1, EncodedLabel::Png(vec![2])),
            ]
        );
    }

    #[test]
    fn test_cancelled_batch_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record(2, "111111", "1"), record(3, "222222", "1")];
        let cancel = CancelToken::new();
        cancel.cancel();
        let options = BatchOptions {
            mode: OutputMode::Files {
                dir: dir.path().to_path_buf(),
            },
            jobs: 1,
        };
        let report = BatchComposer::new(resources())
            .with_cancel(cancel)
            .run(&records, &options)
            .unwrap();
        assert_eq!(report.not_started, 2);
        assert_eq!(report.labels_written, 0);
        assert!(report.cancelled());
    }

    #[test]
    fn test_pdf_mode_writes_one_page_per_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.pdf");
        let records = vec![record(2, "111111", "2"), record(3, "222222", "1")];
        let options = BatchOptions {
            mode: OutputMode::Pdf { path: path.clone() },
            jobs: 2,
        };
        let report = BatchComposer::new(resources()).run(&records, &options).unwrap();
        assert_eq!(report.labels_written, 3);
        assert_eq!(report.outputs, vec![path.clone()]);

        let bytes = std::fs::read(&path).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/MediaBox").count(), 3);
        assert_eq!(text.matches("/Subtype /Image").count(), 2);
    }
}
