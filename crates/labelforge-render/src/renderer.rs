// this_file: crates/labelforge-render/src/renderer.rs

//! Executes positioned ops against a fixed-size raster.

use crate::glyphs::draw_text;
use crate::resources::Resources;
use labelforge_core::{Align, CanvasSpec, Error, LabelRecord, RenderSurface, Result};
use labelforge_fontdb::FontSet;
use labelforge_layout::{Composition, ImageContent, LayoutEngine, OpKind, PositionedOp};
use log::{debug, log_enabled, Level};
use std::sync::Arc;
use tiny_skia::{Paint, Pixmap, PixmapPaint, Rect, Transform};

/// One finished label. Pixels are premultiplied RGBA, row-major.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub record_index: usize,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RenderedLabel {
    pub fn surface(&self) -> RenderSurface {
        RenderSurface::from_rgba(self.width, self.height, self.pixels.clone(), true)
    }

    pub fn into_surface(self) -> RenderSurface {
        RenderSurface::from_rgba(self.width, self.height, self.pixels, true)
    }

    /// Dark pixels of row `y`, for scanning the barcode back.
    pub fn dark_row(&self, y: u32) -> Vec<bool> {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        self.pixels
            .get(start..start + stride)
            .map(|row| {
                row.chunks_exact(4)
                    .map(|pixel| {
                        let luma = (pixel[0] as u32 * 299 + pixel[1] as u32 * 587
                            + pixel[2] as u32 * 114)
                            / 1000;
                        luma < 128
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Lays out and rasterises records against shared resources.
pub struct Renderer {
    resources: Arc<Resources>,
    engine: LayoutEngine<Arc<FontSet>>,
}

impl Renderer {
    pub fn new(resources: Arc<Resources>) -> Self {
        let engine = LayoutEngine::new(
            resources.template().clone(),
            resources.shaper(),
            resources.fonts().clone(),
        )
        .with_logo(resources.logo().is_some());
        Self { resources, engine }
    }

    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    pub fn compose(&self, record: &LabelRecord) -> Result<Composition> {
        self.engine.compose(record)
    }

    /// Compose and rasterise one record.
    pub fn render_record(
        &self,
        record: &LabelRecord,
        record_index: usize,
    ) -> Result<(RenderedLabel, Composition)> {
        let composition = self.compose(record)?;
        let label = self.render(
            &composition.ops,
            &self.resources.template().canvas,
            record_index,
        )?;
        Ok((label, composition))
    }

    /// Paint `ops` in order; later ops cover earlier ones.
    pub fn render(
        &self,
        ops: &[PositionedOp],
        canvas: &CanvasSpec,
        record_index: usize,
    ) -> Result<RenderedLabel> {
        let mut pixmap = Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
            Error::Internal(format!(
                "cannot allocate {}x{} canvas",
                canvas.width, canvas.height
            ))
        })?;
        pixmap.fill(self.resources.paper());

        let mut text_paint = Paint::default();
        text_paint.set_color(self.resources.ink());
        text_paint.anti_alias = true;

        let mut bar_paint = text_paint.clone();
        bar_paint.anti_alias = false;

        for op in ops {
            self.paint_op(&mut pixmap, op, &text_paint, &bar_paint);
        }

        if log_enabled!(Level::Debug) {
            debug!(
                target: "labelforge::render",
                "record {record_index}: painted {} ops on {}x{}",
                ops.len(),
                canvas.width,
                canvas.height
            );
        }

        Ok(RenderedLabel {
            record_index,
            width: canvas.width,
            height: canvas.height,
            pixels: pixmap.take(),
        })
    }

    fn paint_op(
        &self,
        pixmap: &mut Pixmap,
        op: &PositionedOp,
        text_paint: &Paint<'_>,
        bar_paint: &Paint<'_>,
    ) {
        match &op.kind {
            OpKind::Text {
                content,
                role,
                align,
                ..
            } => {
                let fonts = self.resources.fonts();
                let face = fonts.face(*role);
                let size = fonts.size(*role);
                let width = face.advance_width(content, size);
                let anchor = op.x as f32;
                let left = match align {
                    Align::Left => anchor,
                    Align::Center => anchor - width / 2.0,
                    Align::Right => anchor - width,
                };
                draw_text(pixmap, face, size, content, left, op.y as f32, text_paint);
            }
            OpKind::Image {
                content: ImageContent::Symbol { symbol, scaled },
                ..
            } => {
                let origin = (op.x + scaled.offset_x) as f32;
                let module = scaled.module_width as f32;
                for (first, count) in symbol.bars() {
                    let bar = Rect::from_xywh(
                        origin + first as f32 * module,
                        op.y as f32,
                        count as f32 * module,
                        scaled.height as f32,
                    );
                    if let Some(bar) = bar {
                        pixmap.fill_rect(bar, bar_paint, Transform::identity(), None);
                    }
                }
            }
            OpKind::Image {
                content: ImageContent::Logo,
                ..
            } => match self.resources.logo() {
                Some(logo) => pixmap.draw_pixmap(
                    op.x as i32,
                    op.y as i32,
                    logo.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                ),
                None => debug!(target: "labelforge::render", "logo op without a loaded logo"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_barcode::scan_row;
    use labelforge_core::{LabelTemplate, Quantity};
    use labelforge_unicode::TextShaper;
    use tiny_skia::Color;

    fn resources(logo: Option<Pixmap>) -> Arc<Resources> {
        let template = LabelTemplate::default();
        let fonts = FontSet::builtin(&template.fonts);
        Arc::new(Resources::from_parts(template, fonts, logo, TextShaper::default()).unwrap())
    }

    fn record() -> LabelRecord {
        LabelRecord {
            po_no: "70056".to_string(),
            model: "A1".to_string(),
            r#ref: "R9".to_string(),
            size: "M".to_string(),
            style_code: "SC1".to_string(),
            barcode_value: "1234567890".to_string(),
            quantity: Quantity::parse("3"),
            source_row: 2,
        }
    }

    #[test]
    fn test_label_has_canvas_size() {
        let renderer = Renderer::new(resources(None));
        let (label, _) = renderer.render_record(&record(), 0).unwrap();
        assert_eq!((label.width, label.height), (600, 960));
        assert_eq!(label.pixels.len(), 600 * 960 * 4);
    }

    #[test]
    fn test_rendered_symbol_scans_back() {
        let renderer = Renderer::new(resources(None));
        let (label, _) = renderer.render_record(&record(), 0).unwrap();
        // middle of the barcode region (y = 345..485)
        let row = label.dark_row(415);
        assert_eq!(scan_row(&row).unwrap(), "1234567890");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = Renderer::new(resources(None));
        let (first, _) = renderer.render_record(&record(), 0).unwrap();
        let (second, _) = renderer.render_record(&record(), 0).unwrap();
        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn test_logo_is_painted() {
        let mut logo = Pixmap::new(250, 75).unwrap();
        logo.fill(Color::from_rgba8(255, 0, 0, 255));
        let renderer = Renderer::new(resources(Some(logo)));
        let (label, _) = renderer.render_record(&record(), 0).unwrap();
        let offset = (50 * 600 + 300) * 4;
        assert_eq!(&label.pixels[offset..offset + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_label_encodes_to_png() {
        let renderer = Renderer::new(resources(None));
        let (label, _) = renderer.render_record(&record(), 0).unwrap();
        let png = label.into_surface().into_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
