// this_file: crates/labelforge-render/src/resources.rs

//! Immutable resources loaded once per run and shared by all workers.

use image::imageops::FilterType;
use labelforge_core::{utils::parse_color, Error, LabelTemplate, Result};
use labelforge_fontdb::{FontConfig, FontSet};
use labelforge_unicode::{ShapingCapability, TextShaper};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{Color, ColorU8, IntSize, Pixmap};

/// Everything needed to build [`Resources`].
#[derive(Debug, Clone, Default)]
pub struct ResourceConfig {
    pub template: LabelTemplate,
    pub fonts: FontConfig,
    /// Brand logo; the brand text is drawn when absent or unreadable
    pub logo: Option<PathBuf>,
    /// Disable Arabic reshaping even when compiled in
    pub no_reshape: bool,
}

/// Template, fonts, logo and shaper for a whole batch.
#[derive(Debug)]
pub struct Resources {
    template: Arc<LabelTemplate>,
    fonts: Arc<FontSet>,
    logo: Option<Pixmap>,
    shaper: TextShaper,
    ink: Color,
    paper: Color,
}

impl Resources {
    /// Validate the template, resolve every font chain and decode the logo.
    ///
    /// Fails before any rendering when the template is inconsistent or a
    /// font role has no usable source.
    pub fn load(config: ResourceConfig) -> Result<Self> {
        config.template.validate()?;
        let fonts = FontSet::resolve(&config.fonts, &config.template.fonts)?;
        if fonts.uses_builtin() {
            warn!(
                target: "labelforge::render",
                "falling back to the built-in bitmap font; Arabic text will not be legible"
            );
        }

        let capability = ShapingCapability::resolve(!config.no_reshape);
        if capability.is_degraded() {
            warn!(
                target: "labelforge::render",
                "Arabic reshaping unavailable; right-to-left lines are reordered but not joined"
            );
        }

        let logo = config.logo.as_deref().and_then(|path| {
            let brand = &config.template.brand;
            match load_logo(path, brand.logo_width, brand.logo_height) {
                Ok(pixmap) => {
                    info!(target: "labelforge::render", "loaded logo {}", path.display());
                    Some(pixmap)
                }
                Err(err) => {
                    warn!(target: "labelforge::render", "{err}; drawing brand text instead");
                    None
                }
            }
        });

        Self::from_parts(config.template, fonts, logo, TextShaper::new(capability))
    }

    /// Assemble from already-resolved parts.
    pub fn from_parts(
        template: LabelTemplate,
        fonts: FontSet,
        logo: Option<Pixmap>,
        shaper: TextShaper,
    ) -> Result<Self> {
        let ink = color(&template.canvas.ink)?;
        let paper = color(&template.canvas.paper)?;
        Ok(Self {
            template: Arc::new(template),
            fonts: Arc::new(fonts),
            logo,
            shaper,
            ink,
            paper,
        })
    }

    pub fn template(&self) -> &Arc<LabelTemplate> {
        &self.template
    }

    pub fn fonts(&self) -> &Arc<FontSet> {
        &self.fonts
    }

    pub fn logo(&self) -> Option<&Pixmap> {
        self.logo.as_ref()
    }

    pub fn shaper(&self) -> TextShaper {
        self.shaper
    }

    pub fn ink(&self) -> Color {
        self.ink
    }

    pub fn paper(&self) -> Color {
        self.paper
    }
}

fn color(value: &str) -> Result<Color> {
    let (r, g, b, a) = parse_color(value).map_err(Error::template)?;
    Ok(Color::from_rgba8(r, g, b, a))
}

/// Decode and resize a logo to the brand box.
pub fn load_logo(path: &Path, width: u32, height: u32) -> Result<Pixmap> {
    let decode_error = |reason: String| Error::ImageDecode {
        path: path.to_path_buf(),
        reason,
    };

    let image = image::open(path).map_err(|err| decode_error(err.to_string()))?;
    let rgba = image
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();

    let mut data = Vec::with_capacity(rgba.as_raw().len());
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let premultiplied = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[
            premultiplied.red(),
            premultiplied.green(),
            premultiplied.blue(),
            premultiplied.alpha(),
        ]);
    }

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| decode_error(format!("invalid logo box {width}x{height}")))?;
    Pixmap::from_vec(data, size).ok_or_else(|| decode_error("pixel buffer size mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_logo_is_resized_to_brand_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(40, 10, Rgba([200, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let logo = load_logo(&path, 250, 75).unwrap();
        assert_eq!((logo.width(), logo.height()), (250, 75));
    }

    #[test]
    fn test_unreadable_logo_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not an image").unwrap();

        let config = ResourceConfig {
            fonts: FontConfig::builtin_only(),
            logo: Some(path),
            ..ResourceConfig::default()
        };
        let resources = Resources::load(config).unwrap();
        assert!(resources.logo().is_none());
    }

    #[test]
    fn test_invalid_template_is_rejected_before_fonts() {
        let mut template = LabelTemplate::default();
        template.canvas.width = 0;
        let config = ResourceConfig {
            template,
            fonts: FontConfig::builtin_only(),
            ..ResourceConfig::default()
        };
        let err = Resources::load(config).unwrap_err();
        assert_eq!(err.class(), labelforge_core::ErrorClass::Configuration);
    }
}
