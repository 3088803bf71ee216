use crate::foundation::error::{VizageError, VizageResult};
use crate::render::image::PortraitImage;

/// Reduce `image` to a `size x size` thumbnail by area averaging.
///
/// Works on premultiplied pixels (straight inputs are converted first) with a horizontal pass
/// followed by a vertical pass. Every destination pixel is the coverage-weighted mean of the
/// source pixels under it.
pub fn reduce(image: &PortraitImage, size: u32) -> VizageResult<PortraitImage> {
    if size == 0 {
        return Err(VizageError::validation("thumbnail size must be > 0"));
    }
    image.check_len()?;
    if image.width == 0 || image.height == 0 {
        return Err(VizageError::validation("cannot reduce an empty image"));
    }

    let src = image.to_premultiplied();
    let (w, h) = (src.width as usize, src.height as usize);
    let n = size as usize;

    let xs = spans(w, n);
    let ys = spans(h, n);

    // Horizontal: w x h -> n x h.
    let mut tmp = vec![0.0f32; n * h * 4];
    for y in 0..h {
        let row = &src.data[y * w * 4..(y + 1) * w * 4];
        for (ox, span) in xs.iter().enumerate() {
            let out = &mut tmp[(y * n + ox) * 4..(y * n + ox + 1) * 4];
            for &(sx, weight) in span {
                for c in 0..4 {
                    out[c] += f32::from(row[sx * 4 + c]) * weight;
                }
            }
        }
    }

    // Vertical: n x h -> n x n.
    let mut data = vec![0u8; n * n * 4];
    for (oy, span) in ys.iter().enumerate() {
        for ox in 0..n {
            let mut acc = [0.0f32; 4];
            for &(sy, weight) in span {
                let px = &tmp[(sy * n + ox) * 4..(sy * n + ox + 1) * 4];
                for c in 0..4 {
                    acc[c] += px[c] * weight;
                }
            }
            let out = &mut data[(oy * n + ox) * 4..(oy * n + ox + 1) * 4];
            let a = acc[3].round().clamp(0.0, 255.0) as u8;
            for c in 0..3 {
                out[c] = (acc[c].round().clamp(0.0, 255.0) as u8).min(a);
            }
            out[3] = a;
        }
    }

    Ok(PortraitImage {
        width: size,
        height: size,
        data,
        premultiplied: true,
    })
}

/// For each of `dst` cells, the source indices it covers and their normalized weights.
fn spans(src: usize, dst: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|i| {
            let start = i as f64 * scale;
            let end = (i + 1) as f64 * scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src);
            (first..last)
                .filter_map(|s| {
                    let cover = end.min((s + 1) as f64) - start.max(s as f64);
                    (cover > 0.0).then(|| (s, (cover / scale) as f32))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnail.rs"]
mod tests;
