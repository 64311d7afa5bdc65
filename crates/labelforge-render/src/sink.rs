// this_file: crates/labelforge-render/src/sink.rs

//! Output destinations driven by the single batch writer.

use crate::pdf::{deflate, PdfDocument};
use crate::renderer::RenderedLabel;
use labelforge_core::{CanvasSpec, Error, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Where the batch goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// `label_<n>.png` files in a directory
    Files { dir: PathBuf },
    /// One PDF with a page per physical label
    Pdf { path: PathBuf },
}

/// A label encoded by a worker for its output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedLabel {
    Png(Vec<u8>),
    DeflatedRgb {
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
}

impl OutputMode {
    /// Encode on the worker so the writer only does I/O.
    pub fn encode(&self, label: RenderedLabel) -> Result<EncodedLabel> {
        match self {
            OutputMode::Files { .. } => Ok(EncodedLabel::Png(label.into_surface().into_png()?)),
            OutputMode::Pdf { .. } => {
                let (width, height) = (label.width, label.height);
                let rgb = label.into_surface().into_rgb_data()?;
                Ok(EncodedLabel::DeflatedRgb {
                    width,
                    height,
                    data: deflate(&rgb)?,
                })
            }
        }
    }

    pub fn open(&self, canvas: &CanvasSpec) -> Result<Box<dyn LabelSink>> {
        match self {
            OutputMode::Files { dir } => Ok(Box::new(FileSink::create(dir)?)),
            OutputMode::Pdf { path } => Ok(Box::new(PdfSink::new(path, canvas))),
        }
    }
}

/// Receives encoded labels strictly in print order.
pub trait LabelSink: Send {
    /// Write `copies` identical labels numbered from `first_number`.
    fn write_copies(&mut self, first_number: u64, copies: u32, label: &EncodedLabel) -> Result<()>;

    /// Flush everything; returns the produced outputs.
    fn finish(self: Box<Self>) -> Result<Vec<PathBuf>>;
}

/// One PNG file per physical label.
pub struct FileSink {
    dir: PathBuf,
    written: u64,
}

impl FileSink {
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn file_name(number: u64) -> String {
        format!("label_{number}.png")
    }
}

impl LabelSink for FileSink {
    fn write_copies(&mut self, first_number: u64, copies: u32, label: &EncodedLabel) -> Result<()> {
        let EncodedLabel::Png(bytes) = label else {
            return Err(Error::Internal("file output expects PNG data".to_string()));
        };
        for number in first_number..first_number + copies as u64 {
            std::fs::write(self.dir.join(Self::file_name(number)), bytes)?;
            self.written += 1;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<PathBuf>> {
        info!(
            target: "labelforge::batch",
            "wrote {} label files to {}",
            self.written,
            self.dir.display()
        );
        Ok(vec![self.dir])
    }
}

/// All labels as pages of a single PDF, copies sharing one image.
pub struct PdfSink {
    path: PathBuf,
    document: PdfDocument,
}

impl PdfSink {
    pub fn new(path: &Path, canvas: &CanvasSpec) -> Self {
        Self {
            path: path.to_path_buf(),
            document: PdfDocument::new(canvas.width, canvas.height, canvas.dpi),
        }
    }
}

impl LabelSink for PdfSink {
    fn write_copies(&mut self, _first_number: u64, copies: u32, label: &EncodedLabel) -> Result<()> {
        let EncodedLabel::DeflatedRgb {
            width,
            height,
            data,
        } = label
        else {
            return Err(Error::Internal("PDF output expects deflated RGB data".to_string()));
        };
        let image = self.document.add_image(*width, *height, data);
        for _ in 0..copies {
            self.document.add_page(image);
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<PathBuf>> {
        let PdfSink { path, document } = *self;
        let pages = document.page_count();
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, document.finish())?;
        info!(
            target: "labelforge::batch",
            "wrote {pages} pages to {}",
            path.display()
        );
        Ok(vec![path])
    }
}
