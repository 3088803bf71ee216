use crate::encode::png::{encode_png_rgba8, png_data_url};
use crate::foundation::error::{VizageError, VizageResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// A rendered portrait as RGBA8 pixels.
///
/// Renderers produce **premultiplied** alpha; the flag keeps this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortraitImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl PortraitImage {
    /// Fully transparent premultiplied image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            premultiplied: true,
        }
    }

    /// RGBA of the pixel at `(x, y)` in this image's alpha mode.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Whether any pixel has non-zero alpha.
    pub fn has_visible_pixels(&self) -> bool {
        self.data.chunks_exact(4).any(|px| px[3] != 0)
    }

    pub(crate) fn check_len(&self) -> VizageResult<()> {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| VizageError::render("image buffer size overflow"))?;
        if self.data.len() != expected {
            return Err(VizageError::render(format!(
                "image buffer has {} bytes, expected {expected} for {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Copy of the pixels with straight (non-premultiplied) alpha.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        data
    }

    /// Premultiplied copy of this image (no-op clone when already premultiplied).
    pub fn to_premultiplied(&self) -> Self {
        let mut out = self.clone();
        if !out.premultiplied {
            premultiply_rgba8_in_place(&mut out.data);
            out.premultiplied = true;
        }
        out
    }

    /// Encode as a straight-alpha PNG.
    pub fn encode_png(&self) -> VizageResult<Vec<u8>> {
        self.check_len()
            .map_err(|e| VizageError::encoding(e.to_string()))?;
        encode_png_rgba8(self.width, self.height, self.to_straight_rgba8())
    }

    /// Encode as a `data:image/png;base64,` URL.
    pub fn to_data_url(&self) -> VizageResult<String> {
        Ok(png_data_url(&self.encode_png()?))
    }
}
