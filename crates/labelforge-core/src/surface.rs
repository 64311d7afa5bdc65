// this_file: crates/labelforge-core/src/surface.rs

//! Conversion of raw rendered pixels into output encodings.

use crate::{Error, Result};

/// Raw pixel format for a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// RGBA ordering.
    Rgba,
    /// Grayscale alpha-less raster, used for standalone barcode symbols.
    Gray,
}

/// Pixel buffer produced by the renderer prior to encoding.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    width: u32,
    height: u32,
    format: SurfaceFormat,
    premultiplied: bool,
    data: Vec<u8>,
}

impl RenderSurface {
    /// Create a new RGBA surface.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, premultiplied: bool) -> Self {
        Self {
            width,
            height,
            format: SurfaceFormat::Rgba,
            premultiplied,
            data,
        }
    }

    /// Create a grayscale surface.
    pub fn from_gray(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: SurfaceFormat::Gray,
            premultiplied: false,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> SurfaceFormat {
        self.format
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn into_png(self) -> Result<Vec<u8>> {
        let (width, height) = (self.width, self.height);
        let rgba = self.into_rgba_data()?;
        encode_png(width, height, &rgba)
    }

    /// Straight (non-premultiplied) RGBA pixels.
    pub fn into_rgba_data(mut self) -> Result<Vec<u8>> {
        let channels = match self.format {
            SurfaceFormat::Rgba => 4,
            SurfaceFormat::Gray => 1,
        };
        let expected = self.width as usize * self.height as usize * channels;
        if self.data.len() != expected {
            return Err(Error::Internal(format!(
                "surface {}x{} holds {} bytes, expected {expected}",
                self.width,
                self.height,
                self.data.len()
            )));
        }

        match self.format {
            SurfaceFormat::Gray => Ok(expand_gray(&self.data)),
            SurfaceFormat::Rgba => {
                if self.premultiplied {
                    unpremultiply(&mut self.data);
                }
                Ok(std::mem::take(&mut self.data))
            }
        }
    }

    /// Opaque RGB pixels, with any transparency flattened onto white.
    ///
    /// PDF image XObjects carry no alpha channel.
    pub fn into_rgb_data(self) -> Result<Vec<u8>> {
        let rgba = self.into_rgba_data()?;
        let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
        for chunk in rgba.chunks_exact(4) {
            let alpha = chunk[3] as u32;
            for &channel in &chunk[..3] {
                let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                rgb.push(blended as u8);
            }
        }
        Ok(rgb)
    }
}

fn expand_gray(data: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len() * 4);
    for &value in data {
        rgba.extend_from_slice(&[value, value, value, 255]);
    }
    rgba
}

fn unpremultiply(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        let alpha = chunk[3];
        if alpha == 0 || alpha == 255 {
            continue;
        }
        let alpha_f = alpha as f32 / 255.0;
        for channel in &mut chunk[..3] {
            let unpremultiplied = ((*channel as f32) / alpha_f).clamp(0.0, 255.0);
            *channel = unpremultiplied as u8;
        }
    }
}

fn encode_png(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| Error::encode(format!("PNG encoder error: {err}")))?;
        writer
            .write_image_data(data)
            .map_err(|err| Error::encode(format!("PNG write error: {err}")))?;
    }
    Ok(png_data)
}
