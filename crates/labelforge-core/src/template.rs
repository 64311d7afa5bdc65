// this_file: crates/labelforge-core/src/template.rs

//! The fixed label template.
//!
//! A template is loaded once at startup, validated, and then shared read-only
//! by every worker. The default reproduces the production 600x960 label.

use crate::error::Error;
use crate::types::{Align, FontRole, RecordField};
use crate::utils::parse_color;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a line wider than its horizontal budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop trailing code points until the line fits
    Truncate,
    /// Break into several lines, each advancing the cursor
    Wrap,
}

/// Canvas dimensions and output resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    /// Print resolution used for paginated output
    pub dpi: f32,
    /// Text and bar colour
    pub ink: String,
    /// Background colour
    pub paper: String,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 600,
            height: 960,
            dpi: 300.0,
            ink: "#000000".to_string(),
            paper: "#FFFFFF".to_string(),
        }
    }
}

/// Brand mark at the top of the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandSection {
    /// Drawn in the brand font when no logo image is available
    pub text: String,
    pub logo_width: u32,
    pub logo_height: u32,
    pub advance: u32,
}

impl Default for BrandSection {
    fn default() -> Self {
        Self {
            text: "styli".to_string(),
            logo_width: 250,
            logo_height: 75,
            advance: 105,
        }
    }
}

/// The dynamic per-record lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSection {
    /// Line templates with `{placeholder}` substitutions
    pub templates: Vec<String>,
    pub anchor_x: u32,
    pub align: Align,
    pub advance: u32,
    /// Horizontal margin on both sides of the canvas
    pub margin: u32,
    pub overflow: OverflowPolicy,
}

impl Default for FieldSection {
    fn default() -> Self {
        Self {
            templates: vec![
                "Po No. : {po_no}".to_string(),
                "Model : {model}".to_string(),
                "Ref. : {ref}".to_string(),
                "Size. : {size}".to_string(),
                "Style code. : {style_code}".to_string(),
            ],
            anchor_x: 300,
            align: Align::Center,
            advance: 43,
            margin: 20,
            overflow: OverflowPolicy::Truncate,
        }
    }
}

/// Region reserved for the barcode symbol, plus its human-readable echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeSection {
    pub x: u32,
    /// Gap between the cursor and the top of the symbol
    pub top_padding: u32,
    pub width: u32,
    pub height: u32,
    /// Cursor advance for the symbol block (padding included)
    pub advance: u32,
    /// Narrowest acceptable bar in pixels
    pub min_module_width: u32,
    /// Light modules kept clear on each side of the symbol
    pub quiet_zone_modules: u32,
    /// Cursor advance for the human-readable value line
    pub echo_advance: u32,
}

impl Default for BarcodeSection {
    fn default() -> Self {
        Self {
            x: 55,
            top_padding: 10,
            width: 490,
            height: 140,
            advance: 150,
            min_module_width: 2,
            quiet_zone_modules: 10,
            echo_advance: 40,
        }
    }
}

/// The bilingual legal/contact block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSection {
    pub lines: Vec<String>,
    /// Right edge for right-to-left lines
    pub rtl_anchor_x: u32,
    /// Left edge for left-to-right lines
    pub ltr_anchor_x: u32,
    pub advance: u32,
    pub overflow: OverflowPolicy,
}

impl Default for StaticSection {
    fn default() -> Self {
        Self {
            lines: [
                "Distributor: Styli fze",
                "Importer: Retail Cart Trading Co.",
                "PO Box 86003 Riyadh, Kingdom of Saudi Arabia",
                "Importer: Landmark Online Retail LLC",
                "PO Box No. 25030 Dubai, UAE",
                "",
                "الموزع: ستايلي للتجارة ذ.م.م",
                "المستورد: شركة ريتيل كارت للتجارة",
                "ص.ب 86003 الرياض، المملكة العربية السعودية",
                "المستورد: لاندمارك أونلاين للتجزئة ذ.م.م",
                "ص.ب رقم 25030 دبي، الإمارات العربية المتحدة",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            rtl_anchor_x: 550,
            ltr_anchor_x: 50,
            advance: 32,
            overflow: OverflowPolicy::Truncate,
        }
    }
}

/// One footer line at a fixed anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FooterLine {
    pub text: String,
    pub x: u32,
    pub align: Align,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSection {
    /// Extra space between the static block and the footer
    pub gap: u32,
    pub lines: Vec<FooterLine>,
    pub advance: u32,
}

impl Default for FooterSection {
    fn default() -> Self {
        Self {
            gap: 13,
            lines: vec![
                FooterLine {
                    text: "Follow us".to_string(),
                    x: 230,
                    align: Align::Left,
                },
                FooterLine {
                    text: "@styliofficial      @styli_official".to_string(),
                    x: 150,
                    align: Align::Left,
                },
            ],
            advance: 24,
        }
    }
}

/// Pixel size per font role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub brand: f32,
    pub field: f32,
    pub static_rtl: f32,
    pub static_small: f32,
    pub footer: f32,
    /// Line box height as a multiple of the font size
    pub line_height_factor: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            brand: 56.0,
            field: 34.0,
            static_rtl: 30.0,
            static_small: 22.0,
            footer: 20.0,
            line_height_factor: 1.2,
        }
    }
}

impl FontSizes {
    pub fn size(&self, role: FontRole) -> f32 {
        match role {
            FontRole::Brand => self.brand,
            FontRole::Field => self.field,
            FontRole::Static => self.static_rtl,
            FontRole::StaticSmall => self.static_small,
            FontRole::Footer => self.footer,
        }
    }

    /// Vertical extent of one line set in `role`.
    pub fn line_height(&self, role: FontRole) -> u32 {
        // f32 products like 20.0 * 1.2 land a hair above the integer
        ((self.size(role) * self.line_height_factor) - 0.01).ceil().max(1.0) as u32
    }
}

/// Complete, immutable label layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTemplate {
    pub canvas: CanvasSpec,
    /// Initial cursor position
    pub top_offset: u32,
    pub brand: BrandSection,
    pub fields: FieldSection,
    pub barcode: BarcodeSection,
    pub static_block: StaticSection,
    pub footer: FooterSection,
    pub fonts: FontSizes,
}

impl Default for LabelTemplate {
    fn default() -> Self {
        Self {
            canvas: CanvasSpec::default(),
            top_offset: 15,
            brand: BrandSection::default(),
            fields: FieldSection::default(),
            barcode: BarcodeSection::default(),
            static_block: StaticSection::default(),
            footer: FooterSection::default(),
            fonts: FontSizes::default(),
        }
    }
}

impl LabelTemplate {
    /// Load a template from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let template: LabelTemplate = serde_json::from_str(json)?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check internal consistency before any rendering begins.
    pub fn validate(&self) -> Result<()> {
        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 || canvas.width > 10_000 || canvas.height > 10_000
        {
            return Err(Error::template(format!(
                "canvas {}x{} out of bounds (1-10000)",
                canvas.width, canvas.height
            )));
        }
        if !(canvas.dpi.is_finite() && canvas.dpi > 0.0) {
            return Err(Error::template(format!("invalid dpi {}", canvas.dpi)));
        }
        parse_color(&canvas.ink).map_err(|e| Error::template(format!("ink colour: {e}")))?;
        parse_color(&canvas.paper).map_err(|e| Error::template(format!("paper colour: {e}")))?;

        for template in &self.fields.templates {
            field_placeholders(template)?;
        }

        let barcode = &self.barcode;
        if barcode.width == 0 || barcode.height == 0 {
            return Err(Error::template("barcode region has zero size"));
        }
        let barcode_right = barcode.x.checked_add(barcode.width).ok_or_else(|| {
            Error::template(format!(
                "barcode region at x={} with width {} is out of range",
                barcode.x, barcode.width
            ))
        })?;
        if barcode_right > canvas.width {
            return Err(Error::template(format!(
                "barcode region [{}, {}) exceeds canvas width {}",
                barcode.x, barcode_right, canvas.width
            )));
        }
        if barcode.min_module_width == 0 {
            return Err(Error::template("minimum module width must be at least 1px"));
        }

        let advances = [
            ("fields", self.fields.advance),
            ("barcode", barcode.advance),
            ("barcode echo", barcode.echo_advance),
            ("static block", self.static_block.advance),
            ("footer", self.footer.advance),
        ];
        if let Some((section, _)) = advances.iter().find(|(_, advance)| *advance == 0) {
            return Err(Error::template(format!("{section} advance must be positive")));
        }

        for role in FontRole::ALL {
            let size = self.fonts.size(role);
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::template(format!("font size for {role} must be positive")));
            }
        }
        if !(self.fonts.line_height_factor.is_finite() && self.fonts.line_height_factor >= 1.0) {
            return Err(Error::template("line height factor must be at least 1.0"));
        }

        Ok(())
    }
}

/// Parse the `{placeholder}` references of a field template.
pub fn field_placeholders(template: &str) -> Result<Vec<RecordField>> {
    let mut fields = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            Error::template(format!("unclosed placeholder in field template '{template}'"))
        })?;
        let name = after[..close].trim();
        let field = RecordField::from_placeholder(name).ok_or_else(|| {
            Error::template(format!(
                "unknown placeholder '{{{name}}}' in field template '{template}'"
            ))
        })?;
        fields.push(field);
        rest = &after[close + 1..];
    }
    Ok(fields)
}

/// Substitute record values into a field template.
///
/// Empty values still produce the label text so the line is never dropped.
pub fn fill_field_template<'a>(
    template: &str,
    lookup: impl Fn(RecordField) -> &'a str,
) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            Error::template(format!("unclosed placeholder in field template '{template}'"))
        })?;
        let name = after[..close].trim();
        let field = RecordField::from_placeholder(name).ok_or_else(|| {
            Error::template(format!("unknown placeholder '{{{name}}}'"))
        })?;
        out.push_str(lookup(field));
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
