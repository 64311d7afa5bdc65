// this_file: crates/labelforge-layout/src/engine.rs

//! Deterministic top-down composition of one label.

use crate::fit::fit_line;
use crate::ops::{ImageContent, OpKind, PositionedOp, Section};
use labelforge_barcode::BarcodeEncoder;
use labelforge_core::{
    template::fill_field_template, Align, Direction, Error, FontRole, LabelRecord, LabelTemplate,
    LayoutDiagnostics, OverflowPolicy, Result, TextMeasure,
};
use labelforge_unicode::{ShapeOutcome, StaticTextBlock, TextShaper};
use log::trace;
use std::sync::Arc;

/// Ops for one label plus what the composition noticed on the way.
#[derive(Debug, Clone)]
pub struct Composition {
    pub ops: Vec<PositionedOp>,
    /// Cursor after the last section
    pub cursor_end: u32,
    /// Right-to-left lines that were reordered without reshaping
    pub degraded_lines: usize,
}

/// Turns records into positioned ops against a fixed template.
///
/// The engine is immutable after construction and can be shared by any
/// number of worker threads.
pub struct LayoutEngine<M> {
    template: Arc<LabelTemplate>,
    static_block: StaticTextBlock,
    shaper: TextShaper,
    encoder: BarcodeEncoder,
    measure: M,
    has_logo: bool,
}

/// Running state of one composition.
struct Flow<'t> {
    template: &'t LabelTemplate,
    cursor: u32,
    ops: Vec<PositionedOp>,
    degraded_lines: usize,
}

impl<'t> Flow<'t> {
    fn push(&mut self, kind: OpKind, x: u32, y: u32, section: Section) -> Result<()> {
        let extent = match &kind {
            OpKind::Text { role, .. } => self.template.fonts.line_height(*role),
            OpKind::Image { height, .. } => *height,
        };
        let bottom = y.saturating_add(extent);
        self.check(bottom, section)?;
        self.ops.push(PositionedOp {
            kind,
            x,
            y,
            bottom,
            section,
        });
        Ok(())
    }

    fn advance(&mut self, by: u32, section: Section) -> Result<()> {
        self.cursor = self.cursor.saturating_add(by);
        self.check(self.cursor, section)
    }

    fn check(&self, needed: u32, section: Section) -> Result<()> {
        let available = self.template.canvas.height;
        if needed > available {
            return Err(Error::LayoutOverflow {
                section: section.to_string(),
                needed,
                available,
            });
        }
        Ok(())
    }
}

/// Horizontal room for a line anchored at `x`, up to the canvas edges.
fn budget(align: Align, x: u32, canvas_width: u32) -> f32 {
    let room = match align {
        Align::Left => canvas_width.saturating_sub(x),
        Align::Right => x.min(canvas_width),
        Align::Center => 2 * x.min(canvas_width.saturating_sub(x)),
    };
    room as f32
}

impl<M: TextMeasure> LayoutEngine<M> {
    pub fn new(template: Arc<LabelTemplate>, shaper: TextShaper, measure: M) -> Self {
        let static_block = StaticTextBlock::from_lines(template.static_block.lines.iter().cloned());
        let encoder = BarcodeEncoder::new(template.barcode.quiet_zone_modules);
        Self {
            template,
            static_block,
            shaper,
            encoder,
            measure,
            has_logo: false,
        }
    }

    /// Place the shared logo instead of the brand text.
    pub fn with_logo(mut self, has_logo: bool) -> Self {
        self.has_logo = has_logo;
        self
    }

    pub fn template(&self) -> &LabelTemplate {
        &self.template
    }

    pub fn static_block(&self) -> &StaticTextBlock {
        &self.static_block
    }

    /// Compose one record into paint-ordered ops.
    pub fn compose(&self, record: &LabelRecord) -> Result<Composition> {
        let template = self.template.as_ref();
        let mut flow = Flow {
            template,
            cursor: template.top_offset,
            ops: Vec::with_capacity(24),
            degraded_lines: 0,
        };

        self.brand(&mut flow)?;
        self.fields(&mut flow, record)?;
        self.barcode(&mut flow, record)?;
        self.static_lines(&mut flow)?;
        self.footer(&mut flow)?;

        let label = record.describe();
        let text_ops = flow.ops.iter().filter(|op| !op.is_image()).count();
        LayoutDiagnostics::new(
            &label,
            text_ops,
            flow.ops.len() - text_ops,
            flow.cursor,
            template.canvas.height,
            flow.degraded_lines,
        )
        .log();

        Ok(Composition {
            ops: flow.ops,
            cursor_end: flow.cursor,
            degraded_lines: flow.degraded_lines,
        })
    }

    fn brand(&self, flow: &mut Flow<'_>) -> Result<()> {
        let canvas = &self.template.canvas;
        let brand = &self.template.brand;
        if self.has_logo {
            let x = canvas.width.saturating_sub(brand.logo_width) / 2;
            flow.push(
                OpKind::Image {
                    content: ImageContent::Logo,
                    width: brand.logo_width,
                    height: brand.logo_height,
                },
                x,
                flow.cursor,
                Section::Brand,
            )?;
        } else if !brand.text.is_empty() {
            let text = self.ltr_text(&brand.text, FontRole::Brand, Align::Center);
            flow.push(text, canvas.width / 2, flow.cursor, Section::Brand)?;
        }
        flow.advance(brand.advance, Section::Brand)
    }

    fn fields(&self, flow: &mut Flow<'_>, record: &LabelRecord) -> Result<()> {
        let fields = &self.template.fields;
        let room = budget(fields.align, fields.anchor_x, self.template.canvas.width)
            - 2.0 * fields.margin as f32;

        for line_template in &fields.templates {
            let line = fill_field_template(line_template, |field| record.field(field))?;
            for piece in self.fit(&line, FontRole::Field, room, fields.overflow) {
                let text = self.shaped_text(&piece, FontRole::Field, fields.align, flow);
                flow.push(text, fields.anchor_x, flow.cursor, Section::Fields)?;
                flow.advance(fields.advance, Section::Fields)?;
            }
        }
        Ok(())
    }

    fn barcode(&self, flow: &mut Flow<'_>, record: &LabelRecord) -> Result<()> {
        let region = &self.template.barcode;
        let symbol = self.encoder.encode(&record.barcode_value)?;
        let scaled = symbol.fit(region.width, region.height, region.min_module_width)?;
        flow.push(
            OpKind::Image {
                content: ImageContent::Symbol { symbol, scaled },
                width: region.width,
                height: region.height,
            },
            region.x,
            flow.cursor.saturating_add(region.top_padding),
            Section::Barcode,
        )?;
        flow.advance(region.advance, Section::Barcode)?;

        // never cut: the echo must match the symbol
        let centre = self.template.canvas.width / 2;
        let room = budget(Align::Center, centre, self.template.canvas.width);
        let needed = self
            .measure
            .advance_width(FontRole::Field, &record.barcode_value);
        if needed > room {
            return Err(Error::LayoutOverflow {
                section: Section::BarcodeEcho.to_string(),
                needed: needed.ceil() as u32,
                available: room as u32,
            });
        }
        let echo = self.ltr_text(&record.barcode_value, FontRole::Field, Align::Center);
        flow.push(
            echo,
            centre,
            flow.cursor,
            Section::BarcodeEcho,
        )?;
        flow.advance(region.echo_advance, Section::BarcodeEcho)
    }

    fn static_lines(&self, flow: &mut Flow<'_>) -> Result<()> {
        let section = &self.template.static_block;
        let width = self.template.canvas.width;

        for line in self.static_block.lines() {
            if line.is_blank() {
                flow.advance(section.advance, Section::Static)?;
                continue;
            }
            let (role, align, x) = match line.direction {
                Direction::RightToLeft => (FontRole::Static, Align::Right, section.rtl_anchor_x),
                Direction::LeftToRight => (FontRole::StaticSmall, Align::Left, section.ltr_anchor_x),
            };
            let room = budget(align, x, width);
            for piece in self.fit(&line.text, role, room, section.overflow) {
                let text = self.shaped_text(&piece, role, align, flow);
                flow.push(text, x, flow.cursor, Section::Static)?;
                flow.advance(section.advance, Section::Static)?;
            }
        }
        Ok(())
    }

    fn footer(&self, flow: &mut Flow<'_>) -> Result<()> {
        let footer = &self.template.footer;
        flow.advance(footer.gap, Section::Footer)?;
        for line in &footer.lines {
            let room = budget(line.align, line.x, self.template.canvas.width);
            for piece in self.fit(&line.text, FontRole::Footer, room, OverflowPolicy::Truncate) {
                let text = self.shaped_text(&piece, FontRole::Footer, line.align, flow);
                flow.push(text, line.x, flow.cursor, Section::Footer)?;
                flow.advance(footer.advance, Section::Footer)?;
            }
        }
        Ok(())
    }

    /// Fit logical text, measuring each candidate in its shaped form.
    fn fit(&self, text: &str, role: FontRole, room: f32, policy: OverflowPolicy) -> Vec<String> {
        let lines = fit_line(text, room.max(0.0), policy, |candidate| {
            let shaped = self.shaper.shape(candidate);
            self.measure.advance_width(role, &shaped.text)
        });
        if lines.len() != 1 || lines[0] != text {
            trace!(
                target: "labelforge::layout",
                "{policy:?} fitted {text:?} into {} line(s) within {room:.0}px",
                lines.len()
            );
        }
        lines
    }

    fn shaped_text(
        &self,
        logical: &str,
        role: FontRole,
        align: Align,
        flow: &mut Flow<'_>,
    ) -> OpKind {
        let shaped = self.shaper.shape(logical);
        if shaped.outcome == ShapeOutcome::Degraded {
            flow.degraded_lines += 1;
        }
        OpKind::Text {
            content: shaped.text,
            role,
            align,
            direction: shaped.direction,
            outcome: shaped.outcome,
        }
    }

    fn ltr_text(&self, text: &str, role: FontRole, align: Align) -> OpKind {
        OpKind::Text {
            content: text.to_string(),
            role,
            align,
            direction: Direction::LeftToRight,
            outcome: ShapeOutcome::Identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_core::Quantity;
    use labelforge_unicode::ShapingCapability;

    struct FixedAdvance(f32);

    impl TextMeasure for FixedAdvance {
        fn advance_width(&self, _role: FontRole, text: &str) -> f32 {
            text.chars().count() as f32 * self.0
        }
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

    fn engine(template: LabelTemplate) -> LayoutEngine<FixedAdvance> {
        LayoutEngine::new(
            Arc::new(template),
            TextShaper::new(ShapingCapability::Full),
            FixedAdvance(10.0),
        )
    }

    fn texts(composition: &Composition) -> Vec<&str> {
        composition.ops.iter().filter_map(|op| op.text()).collect()
    }

    #[test]
    fn test_default_flow_positions() {
        let composition = engine(LabelTemplate::default()).compose(&record()).unwrap();
        assert_eq!(composition.cursor_end, 938);
        // brand + 5 fields + symbol + echo + 10 static + 2 footer
        assert_eq!(composition.ops.len(), 20);

        let brand = &composition.ops[0];
        assert_eq!((brand.x, brand.y), (300, 15));
        assert_eq!(brand.text(), Some("styli"));

        let model = &composition.ops[2];
        assert_eq!(model.text(), Some("Model : A1"));
        assert_eq!(model.y, 163);

        let symbol = composition.ops.iter().find(|op| op.is_image()).unwrap();
        assert_eq!((symbol.x, symbol.y, symbol.bottom), (55, 345, 485));
        match &symbol.kind {
            OpKind::Image {
                content: ImageContent::Symbol { symbol, scaled },
                ..
            } => {
                assert_eq!(symbol.value(), "1234567890");
                assert_eq!(scaled.module_width, 4);
            }
            other => panic!("unexpected op {other:?}"),
        }

        let echo = &composition.ops[7];
        assert_eq!(echo.text(), Some("1234567890"));
        assert_eq!(echo.y, 485);
    }

    #[test]
    fn test_every_op_stays_on_canvas() {
        let composition = engine(LabelTemplate::default()).compose(&record()).unwrap();
        assert!(composition.ops.iter().all(|op| op.bottom <= 960));
    }

    #[test]
    fn test_static_lines_anchor_by_direction() {
        let composition = engine(LabelTemplate::default()).compose(&record()).unwrap();
        let statics: Vec<_> = composition
            .ops
            .iter()
            .filter(|op| op.section == Section::Static)
            .collect();
        assert_eq!(statics.len(), 10);
        for op in statics {
            match &op.kind {
                OpKind::Text {
                    role,
                    align,
                    direction,
                    ..
                } => match direction {
                    Direction::RightToLeft => {
                        assert_eq!((*role, *align, op.x), (FontRole::Static, Align::Right, 550));
                    }
                    Direction::LeftToRight => {
                        assert_eq!(
                            (*role, *align, op.x),
                            (FontRole::StaticSmall, Align::Left, 50)
                        );
                    }
                },
                other => panic!("unexpected op {other:?}"),
            }
        }
        // the blank line keeps its slot: first RTL line sits two advances below the last LTR one
        let ys: Vec<u32> = composition
            .ops
            .iter()
            .filter(|op| op.section == Section::Static)
            .map(|op| op.y)
            .collect();
        assert_eq!(ys[5] - ys[4], 64);
    }

    #[test]
    fn test_logo_replaces_brand_text() {
        let composition = engine(LabelTemplate::default())
            .with_logo(true)
            .compose(&record())
            .unwrap();
        let first = &composition.ops[0];
        assert!(matches!(
            first.kind,
            OpKind::Image {
                content: ImageContent::Logo,
                width: 250,
                height: 75
            }
        ));
        assert_eq!((first.x, first.y), (175, 15));
        assert!(!texts(&composition).contains(&"styli"));
    }

    #[test]
    fn test_empty_attribute_keeps_the_line() {
        let mut record = record();
        record.model.clear();
        let composition = engine(LabelTemplate::default()).compose(&record).unwrap();
        assert!(texts(&composition).contains(&"Model : "));
        assert_eq!(composition.cursor_end, 938);
    }

    #[test]
    fn test_short_canvas_overflows() {
        let mut template = LabelTemplate::default();
        template.canvas.height = 700;
        let err = engine(template).compose(&record()).unwrap_err();
        match err {
            Error::LayoutOverflow {
                section, available, ..
            } => {
                assert_eq!(section, "static block");
                assert_eq!(available, 700);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_wrapped_fields_push_content_down() {
        let mut template = LabelTemplate::default();
        template.fields.overflow = OverflowPolicy::Wrap;
        let mut long = record();
        long.model = "VERY LONG MODEL NAME THAT WILL NOT FIT ON ONE LINE AT ALL".to_string();
        let err = engine(template).compose(&long).unwrap_err();
        assert!(matches!(err, Error::LayoutOverflow { .. }));
    }

    #[test]
    fn test_truncated_fields_keep_rhythm() {
        let mut long = record();
        long.model = "X".repeat(80);
        let composition = engine(LabelTemplate::default()).compose(&long).unwrap();
        let model = composition.ops[2].text().unwrap();
        assert_eq!(model.chars().count(), 56);
        assert_eq!(composition.cursor_end, 938);
    }

    #[test]
    fn test_barcode_errors_surface() {
        let mut bad = record();
        bad.barcode_value = "12é4".to_string();
        let err = engine(LabelTemplate::default()).compose(&bad).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBarcodeChar { position: 2, .. }));

        let mut template = LabelTemplate::default();
        template.barcode.width = 150;
        let err = engine(template).compose(&record()).unwrap_err();
        assert!(matches!(err, Error::SymbolTooSmall { .. }));
    }

    #[test]
    fn test_echo_wider_than_canvas_is_rejected() {
        let mut long = record();
        long.barcode_value = "12345678901234567890123456789012".to_string();

        // the symbol itself fits at two pixels per module
        let composition = engine(LabelTemplate::default()).compose(&long).unwrap();
        assert!(texts(&composition).contains(&"12345678901234567890123456789012"));

        let wide = LayoutEngine::new(
            Arc::new(LabelTemplate::default()),
            TextShaper::new(ShapingCapability::Full),
            FixedAdvance(25.5),
        );
        match wide.compose(&long).unwrap_err() {
            Error::LayoutOverflow {
                section,
                needed,
                available,
            } => {
                assert_eq!(section, "barcode echo");
                assert_eq!(needed, 816);
                assert_eq!(available, 600);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_degraded_shaping_is_counted() {
        let engine = LayoutEngine::new(
            Arc::new(LabelTemplate::default()),
            TextShaper::new(ShapingCapability::BidiOnly),
            FixedAdvance(10.0),
        );
        let composition = engine.compose(&record()).unwrap();
        assert_eq!(composition.degraded_lines, 5);
    }
}
