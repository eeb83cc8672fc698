//! QR adapter.
//!
//! Rendering goes through `qrcode`; scanning is delegated to a
//! [`QrImageDecoder`], with [`RqrrDecoder`] as the bundled implementation.
//! Error correction and symbol recognition are entirely the libraries' concern.

use qrcode::render::unicode::Dense1x2;
use qrcode::{Color, EcLevel, QrCode};

use crate::error::{PaperCryptError, Result};

/// Error correction level for embedded payloads.
const EC_LEVEL: EcLevel = EcLevel::M;

fn build(payload: &[u8]) -> Result<QrCode> {
    QrCode::with_error_correction_level(payload, EC_LEVEL)
        .map_err(|e| PaperCryptError::upstream("QR encoding failed", e))
}

/// Render `payload` as a block of half-height unicode modules, dark on light,
/// with the standard quiet zone.
pub fn render_unicode(payload: &[u8]) -> Result<String> {
    let code = build(payload)?;
    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Dark)
        .light_color(Dense1x2::Light)
        .quiet_zone(true)
        .build())
}

/// Module matrix for raster renderers: `(width, modules)` in row-major order,
/// `true` meaning dark. No quiet zone is included.
pub fn module_grid(payload: &[u8]) -> Result<(usize, Vec<bool>)> {
    let code = build(payload)?;
    let modules = code
        .to_colors()
        .into_iter()
        .map(|color| color == Color::Dark)
        .collect();
    Ok((code.width(), modules))
}

/// Recognizes a QR symbol in an image and returns its text.
pub trait QrImageDecoder {
    /// # Errors
    ///
    /// `Upstream` if the image cannot be read or holds no decodable symbol.
    fn decode_image(&self, image: &[u8]) -> Result<String>;
}

/// [`QrImageDecoder`] backed by `image` for loading and `rqrr` for recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl QrImageDecoder for RqrrDecoder {
    fn decode_image(&self, image: &[u8]) -> Result<String> {
        let luma = image::load_from_memory(image)
            .map_err(|e| PaperCryptError::upstream("Failed to read image", e))?
            .to_luma8();
        let (width, height) = (luma.width() as usize, luma.height() as usize);

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
            luma.get_pixel(x as u32, y as u32).0[0]
        });
        let grids = prepared.detect_grids();
        tracing::debug!(width, height, symbols = grids.len(), "scanned image");

        let grid = grids.first().ok_or_else(|| PaperCryptError::Upstream {
            context: "QR decoding failed".to_string(),
            message: "no QR code found in image".to_string(),
        })?;
        let (_, content) = grid
            .decode()
            .map_err(|e| PaperCryptError::upstream("QR decoding failed", e))?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SCALE: usize = 6;
    const QUIET: usize = 4;

    fn png_of(payload: &[u8]) -> Vec<u8> {
        let (width, modules) = module_grid(payload).unwrap();
        let side = (width + 2 * QUIET) * SCALE;
        let mut pixels = vec![255u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let (mx, my) = (x / SCALE, y / SCALE);
                if mx >= QUIET && my >= QUIET && mx < width + QUIET && my < width + QUIET {
                    if modules[(my - QUIET) * width + (mx - QUIET)] {
                        pixels[y * side + x] = 0;
                    }
                }
            }
        }
        let image = image::GrayImage::from_raw(side as u32, side as u32, pixels).unwrap();
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    #[test]
    fn test_module_grid_is_square() {
        let (width, modules) = module_grid(b"{\"Data\":\"AQID\"}").unwrap();
        assert!(width >= 21);
        assert_eq!(modules.len(), width * width);
    }

    #[test]
    fn test_render_unicode_uses_half_blocks() {
        let rendered = render_unicode(b"hello").unwrap();
        assert!(rendered.lines().count() > 10);
        assert!(rendered.contains('\u{2580}') || rendered.contains('\u{2584}'));
    }

    #[test]
    fn test_oversized_payload_is_upstream_error() {
        let payload = vec![b'A'; 8000];
        assert!(matches!(
            render_unicode(&payload),
            Err(PaperCryptError::Upstream { .. })
        ));
    }

    #[test]
    fn test_rqrr_reads_rendered_grid() {
        let payload = br#"{"Version":"2.0.0","Data":"AQID"}"#;
        let text = RqrrDecoder.decode_image(&png_of(payload)).unwrap();
        assert_eq!(text.as_bytes(), payload);
    }

    #[test]
    fn test_non_image_is_upstream_error() {
        assert!(matches!(
            RqrrDecoder.decode_image(b"plain text"),
            Err(PaperCryptError::Upstream { .. })
        ));
    }
}
