// this_file: crates/labelforge-render/src/glyphs.rs

//! Drawing visual-order text runs onto a pixmap.

use labelforge_fontdb::{builtin, FontFace};
use owned_ttf_parser::OutlineBuilder;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

/// Outline builder for converting TrueType outlines to tiny-skia paths
struct SkiaOutlineBuilder {
    builder: PathBuilder,
    scale: f32,
}

impl OutlineBuilder for SkiaOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x * self.scale, -y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x * self.scale, -y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            x1 * self.scale,
            -y1 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 * self.scale,
            -y1 * self.scale,
            x2 * self.scale,
            -y2 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Paint `text` left to right with its line box top-left at `(x, top)`.
pub fn draw_text(
    pixmap: &mut Pixmap,
    face: &FontFace,
    size_px: f32,
    text: &str,
    x: f32,
    top: f32,
    paint: &Paint<'_>,
) {
    let baseline = top + face.ascent(size_px);
    let mut pen_x = x;

    match face.outline() {
        Some(outline) => {
            let scale = face.scale(size_px);
            for ch in text.chars() {
                let glyph_id = face.glyph_id(ch);
                let mut builder = SkiaOutlineBuilder {
                    builder: PathBuilder::new(),
                    scale,
                };
                if outline.outline_glyph(glyph_id, &mut builder).is_some() {
                    if let Some(path) = builder.builder.finish() {
                        let transform = Transform::from_translate(pen_x, baseline);
                        pixmap.fill_path(&path, paint, FillRule::Winding, transform, None);
                    }
                }
                pen_x += face.char_advance(ch, size_px);
            }
        }
        None => {
            let unit = builtin::unit(size_px);
            let glyph_top = baseline - builtin::ascent(size_px);
            for ch in text.chars() {
                for (column, row) in builtin::lit_cells(ch) {
                    let cell = Rect::from_xywh(
                        pen_x + column as f32 * unit,
                        glyph_top + row as f32 * unit,
                        unit,
                        unit,
                    );
                    if let Some(cell) = cell {
                        pixmap.fill_rect(cell, paint, Transform::identity(), None);
                    }
                }
                pen_x += face.char_advance(ch, size_px);
            }
        }
    }
}
