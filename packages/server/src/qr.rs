use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::types::Color;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::config::QrConfig;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Renders short strings (the share URL) as black-on-white PNG QR codes.
///
/// Output is deterministic for a given text, module size and border.
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    module_size: u32,
    border: u32,
}

impl QrEncoder {
    pub fn new(module_size: u32, border: u32) -> Self {
        Self {
            module_size: module_size.max(1),
            border,
        }
    }

    pub fn from_config(config: &QrConfig) -> Self {
        Self::new(config.module_size, config.border)
    }

    /// Rasterize `text` at error-correction level L.
    pub fn render(&self, text: &str) -> Result<GrayImage, QrError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)?;
        let width = code.width() as u32;
        let colors = code.to_colors();

        let border = self.border;
        let module = self.module_size;
        let side = (width + 2 * border) * module;

        Ok(GrayImage::from_fn(side, side, |x, y| {
            let (mx, my) = (x / module, y / module);
            let inside = (border..border + width).contains(&mx)
                && (border..border + width).contains(&my);
            let dark = inside
                && colors[((my - border) * width + (mx - border)) as usize] == Color::Dark;
            Luma([if dark { 0 } else { 255 }])
        }))
    }

    /// PNG bytes for `text`.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, QrError> {
        let image = self.render(text)?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Encode `text` and write it to `path`, replacing any previous image.
    pub fn write_png(&self, text: &str, path: &Path) -> Result<(), QrError> {
        let bytes = self.encode(text)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("png.tmp");
        fs::write(&temp_path, &bytes)?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::from_config(&QrConfig::default())
    }
}
