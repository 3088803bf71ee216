use crate::foundation::core::Rgb8;
use crate::foundation::error::{VizageError, VizageResult};

/// Parse a `#RRGGBB` tint color.
///
/// The leading `#` is optional and hex digits are case-insensitive. Alpha forms (`#RRGGBBAA`) and
/// shorthand (`#RGB`) are rejected: tints are always opaque.
pub fn parse_hex_color(s: &str) -> VizageResult<Rgb8> {
    let raw = s.trim();
    let digits = raw.strip_prefix('#').unwrap_or(raw);

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(VizageError::validation(format!(
            "color \"{s}\" must be #RRGGBB"
        )));
    }

    let hex_byte = |pair: &str| {
        u8::from_str_radix(pair, 16)
            .map_err(|_| VizageError::validation(format!("color \"{s}\" has invalid hex \"{pair}\"")))
    };

    Ok(Rgb8::new(
        hex_byte(&digits[0..2])?,
        hex_byte(&digits[2..4])?,
        hex_byte(&digits[4..6])?,
    ))
}
