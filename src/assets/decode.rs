use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{VizageError, VizageResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::image::PortraitImage;

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_rgba8(bytes: &[u8]) -> VizageResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Decode encoded image bytes into a premultiplied [`PortraitImage`].
///
/// Used for uploaded portraits, which bypass the compositor.
pub fn decode_portrait(bytes: &[u8]) -> VizageResult<PortraitImage> {
    let rgba = decode_rgba8(bytes)
        .map_err(|e| VizageError::encoding(format!("decode uploaded image: {e}")))?;
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);
    Ok(PortraitImage {
        width,
        height,
        data,
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
