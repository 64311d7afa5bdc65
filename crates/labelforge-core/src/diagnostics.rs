// this_file: crates/labelforge-core/src/diagnostics.rs

//! Composition diagnostics used by the layout engine for structured debug logging.

use log::{debug, log_enabled, Level};

/// Lightweight snapshot of one composed label.
#[derive(Debug)]
pub struct LayoutDiagnostics<'a> {
    record: &'a str,
    text_ops: usize,
    image_ops: usize,
    cursor_end: u32,
    canvas_height: u32,
    degraded_lines: usize,
}

impl<'a> LayoutDiagnostics<'a> {
    /// Capture the diagnostic snapshot for a finished composition.
    pub fn new(
        record: &'a str,
        text_ops: usize,
        image_ops: usize,
        cursor_end: u32,
        canvas_height: u32,
        degraded_lines: usize,
    ) -> Self {
        Self {
            record,
            text_ops,
            image_ops,
            cursor_end,
            canvas_height,
            degraded_lines,
        }
    }

    /// Vertical space left below the last section.
    pub fn headroom(&self) -> i64 {
        i64::from(self.canvas_height) - i64::from(self.cursor_end)
    }

    /// Emit the diagnostic snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(Level::Debug) {
            debug!(
                target: "labelforge::layout",
                "record={record} text_ops={text} image_ops={image} cursor_end={cursor} headroom={headroom} degraded_lines={degraded}",
                record = self.record,
                text = self.text_ops,
                image = self.image_ops,
                cursor = self.cursor_end,
                headroom = self.headroom(),
                degraded = self.degraded_lines,
            );
        }
    }
}
