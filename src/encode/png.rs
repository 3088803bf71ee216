use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbaImage;

use crate::foundation::error::{VizageError, VizageResult};

/// First eight bytes of every PNG stream.
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode straight-alpha RGBA8 pixels as PNG.
pub fn encode_png_rgba8(width: u32, height: u32, straight_rgba: Vec<u8>) -> VizageResult<Vec<u8>> {
    let img = RgbaImage::from_raw(width, height, straight_rgba).ok_or_else(|| {
        VizageError::encoding(format!("pixel buffer does not match {width}x{height} rgba8"))
    })?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| VizageError::encoding(format!("png encode: {e}")))?;
    Ok(out.into_inner())
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len().div_ceil(3) * 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    BASE64.encode_string(png, &mut url);
    url
}

/// Extract the PNG bytes of a `data:image/png;base64,` URL.
pub fn decode_png_data_url(url: &str) -> VizageResult<Vec<u8>> {
    let payload = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| VizageError::encoding("expected a data:image/png;base64 URL"))?;
    BASE64
        .decode(payload)
        .map_err(|e| VizageError::encoding(format!("invalid base64 payload: {e}")))
}
