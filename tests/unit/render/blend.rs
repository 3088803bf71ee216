use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_keeps_half_of_dst() {
    let dst = [0, 0, 200, 255];
    let src = [128, 0, 0, 128];
    assert_eq!(over(dst, src), [128, 0, 100, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn hard_light_matches_both_branches() {
    assert!((hard_light(0.5, 0.25) - 0.25).abs() < 1e-6);
    assert!((hard_light(0.5, 0.75) - 0.75).abs() < 1e-6);
    assert!((hard_light(0.2, 1.0) - 1.0).abs() < 1e-6);
    assert!((hard_light(0.8, 0.0) - 0.0).abs() < 1e-6);
    // Continuous at the branch point.
    assert!((hard_light(0.3, 0.5) - 0.3).abs() < 1e-6);
}

#[test]
fn hard_light_fill_on_opaque_mid_gray_yields_tint() {
    let tint = [0.25, 0.5, 0.75];
    let out = hard_light_fill([128, 128, 128, 255], tint);
    assert_eq!(out[3], 255);
    for (c, t) in out[..3].iter().zip(tint) {
        assert!((f32::from(*c) / 255.0 - t).abs() <= 2.0 / 255.0);
    }
}

#[test]
fn hard_light_fill_on_transparent_backdrop_is_plain_tint() {
    assert_eq!(hard_light_fill([0, 0, 0, 0], [1.0, 0.0, 0.0]), [255, 0, 0, 255]);
}

#[test]
fn destination_in_scales_every_channel_by_mask() {
    assert_eq!(destination_in([200, 100, 50, 255], 0), [0, 0, 0, 0]);
    assert_eq!(destination_in([200, 100, 50, 255], 255), [200, 100, 50, 255]);
    assert_eq!(destination_in([200, 100, 50, 255], 128), [100, 50, 25, 128]);
}

#[test]
fn tint_layer_keeps_sprite_alpha_shape() {
    let mut layer = vec![
        0, 0, 0, 0, // transparent
        128, 128, 128, 255, // opaque mid gray
        64, 64, 64, 128, // half-covered mid gray
    ];
    tint_layer_in_place(&mut layer, Rgb8::new(255, 0, 0));

    assert_eq!(&layer[0..4], &[0, 0, 0, 0]);
    assert_eq!(layer[7], 255);
    assert_eq!(layer[11], 128);
    // Red tint over gray: red channel brightened, others darkened to black.
    assert!(layer[4] > 200);
    assert_eq!(layer[5], 0);
    assert!(layer[8] > layer[9]);
    // Premultiplied invariant.
    for px in layer.chunks_exact(4) {
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    }
}
