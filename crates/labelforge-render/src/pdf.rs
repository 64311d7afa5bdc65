// this_file: crates/labelforge-render/src/pdf.rs

//! Paginated output: one page per physical label, page size equal to the canvas.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use labelforge_core::{Error, Result};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Zlib-compress raw RGB pixels for a FlateDecode image stream.
pub fn deflate(rgb: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(rgb.len() / 8), Compression::default());
    encoder
        .write_all(rgb)
        .map_err(|err| Error::encode(format!("deflate failed: {err}")))?;
    encoder
        .finish()
        .map_err(|err| Error::encode(format!("deflate failed: {err}")))
}

/// In-memory PDF built page by page in print order.
pub struct PdfDocument {
    pdf: Pdf,
    next_id: i32,
    page_tree: Ref,
    pages: Vec<Ref>,
    page_width: f32,
    page_height: f32,
}

impl PdfDocument {
    /// Pages of `width` x `height` pixels printed at `dpi`.
    pub fn new(width: u32, height: u32, dpi: f32) -> Self {
        let mut pdf = Pdf::new();
        let catalog = Ref::new(1);
        let page_tree = Ref::new(2);
        pdf.catalog(catalog).pages(page_tree);
        Self {
            pdf,
            next_id: 3,
            page_tree,
            pages: Vec::new(),
            page_width: width as f32 * 72.0 / dpi,
            page_height: height as f32 * 72.0 / dpi,
        }
    }

    fn next_ref(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Embed an RGB image once; pages reference it by the returned id.
    pub fn add_image(&mut self, width: u32, height: u32, deflated_rgb: &[u8]) -> Ref {
        let id = self.next_ref();
        let mut image = self.pdf.image_xobject(id, deflated_rgb);
        image.filter(Filter::FlateDecode);
        image.width(width as i32);
        image.height(height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();
        id
    }

    /// Append a page showing `image` across the whole page.
    pub fn add_page(&mut self, image: Ref) {
        let page_id = self.next_ref();
        let content_id = self.next_ref();

        let mut content = Content::new();
        content.save_state();
        content.transform([self.page_width, 0.0, 0.0, self.page_height, 0.0, 0.0]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        self.pdf.stream(content_id, &content.finish());

        let mut page = self.pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height));
        page.parent(self.page_tree);
        page.contents(content_id);
        page.resources().x_objects().pair(IMAGE_NAME, image);
        page.finish();

        self.pages.push(page_id);
    }

    /// Write the page tree and serialise the document.
    pub fn finish(mut self) -> Vec<u8> {
        let count = self.pages.len() as i32;
        self.pdf
            .pages(self.page_tree)
            .kids(self.pages.iter().copied())
            .count(count);
        self.pdf.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_share_one_image() {
        let mut doc = PdfDocument::new(600, 960, 300.0);
        let rgb = deflate(&vec![255u8; 600 * 960 * 3]).unwrap();
        let image = doc.add_image(600, 960, &rgb);
        for _ in 0..3 {
            doc.add_page(image);
        }
        assert_eq!(doc.page_count(), 3);

        let bytes = doc.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-"));
        assert_eq!(text.matches("/Subtype /Image").count(), 1);
        assert_eq!(text.matches("/MediaBox").count(), 3);
        assert!(text.contains("/Count 3"));
        // 600 px at 300 dpi
        assert!(text.contains("144"));
    }
}
