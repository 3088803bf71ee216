use crate::foundation::core::Rgb8;
use crate::foundation::error::{VizageError, VizageResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};

pub type PremulRgba8 = [u8; 4];

/// Source-over: `src + dst * (1 - src.a)`.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(src[3]);

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> VizageResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(VizageError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Separable hard-light on normalized channels.
///
/// `source` is the top layer (the tint) and selects the branch: multiply below one half, screen
/// above.
pub fn hard_light(backdrop: f32, source: f32) -> f32 {
    if source <= 0.5 {
        2.0 * source * backdrop
    } else {
        1.0 - 2.0 * (1.0 - source) * (1.0 - backdrop)
    }
}

/// Fill an opaque `tint` over `backdrop` using hard-light.
///
/// Where the backdrop is transparent the tint shows through unchanged, so the result is always
/// fully opaque: `C = (1 - ab) * Cs + ab * B(Cb, Cs)`.
pub fn hard_light_fill(backdrop: PremulRgba8, tint: [f32; 3]) -> PremulRgba8 {
    let a = backdrop[3];
    let ab = f32::from(a) / 255.0;
    let mut out = [0, 0, 0, 255];
    for i in 0..3 {
        let cb = if a == 0 {
            0.0
        } else {
            (f32::from(backdrop[i]) / f32::from(a)).min(1.0)
        };
        let cs = tint[i];
        out[i] = unit_to_u8((1.0 - ab) * cs + ab * hard_light(cb, cs));
    }
    out
}

/// Destination-in: keep `src` only where the mask is opaque.
pub fn destination_in(src: PremulRgba8, mask_alpha: u8) -> PremulRgba8 {
    let m = u16::from(mask_alpha);
    [
        mul_div255(u16::from(src[0]), m),
        mul_div255(u16::from(src[1]), m),
        mul_div255(u16::from(src[2]), m),
        mul_div255(u16::from(src[3]), m),
    ]
}

/// Tint a premultiplied sprite layer in place: hard-light fill, then destination-in against the
/// sprite's own alpha.
pub fn tint_layer_in_place(layer: &mut [u8], tint: Rgb8) {
    let tint = tint.to_unit();
    for px in layer.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px.fill(0);
            continue;
        }
        let filled = hard_light_fill([px[0], px[1], px[2], a], tint);
        px.copy_from_slice(&destination_in(filled, a));
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
