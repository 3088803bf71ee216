use image::{Rgba, RgbaImage};

use super::*;
use crate::render::blend::hard_light_fill;
use crate::test_fixture::{fixture_atlas, full_face};

fn nearest(opts: CompositorOpts) -> Compositor {
    Compositor::new(Arc::new(fixture_atlas()), opts, SampleFilter::Nearest)
}

fn neck_only_opts() -> CompositorOpts {
    CompositorOpts {
        default_head_and_ears: false,
        ..CompositorOpts::default()
    }
}

fn blank() -> PortraitSelection {
    PortraitSelection {
        hair_color: "#8e7355".to_owned(),
        skin_color: "#bc8277".to_owned(),
        ..PortraitSelection::default()
    }
}

#[test]
fn rendering_is_deterministic() {
    let c = nearest(CompositorOpts::default());
    let a = c.render(&full_face(), 32).unwrap();
    let b = c.render(&full_face(), 32).unwrap();
    assert_eq!(a, b);
    assert!(a.premultiplied);
    assert_eq!((a.width, a.height), (32, 32));
}

#[test]
fn empty_and_unknown_keys_render_identically() {
    let c = nearest(CompositorOpts::default());
    let mut empty = full_face();
    empty.hair = String::new();
    let mut unknown = full_face();
    unknown.hair = "hair99".to_owned();
    assert_eq!(c.render(&empty, 16).unwrap(), c.render(&unknown, 16).unwrap());
}

#[test]
fn alpha_is_the_union_of_drawn_sprites() {
    let img = nearest(CompositorOpts::default())
        .render(&full_face(), 16)
        .unwrap();
    // Outside every sprite.
    assert_eq!(img.pixel(0, 15), [0, 0, 0, 0]);
    assert_eq!(img.pixel(15, 15), [0, 0, 0, 0]);
    // Half-covered bottom row of head01, no other sprite below it.
    assert_eq!(img.pixel(4, 14)[3], 128);
    // Fully covered.
    assert_eq!(img.pixel(7, 8)[3], 255);
    for px in img.data.chunks_exact(4) {
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    }
}

#[test]
fn uncovered_hair_pixel_is_the_hard_light_tint_of_the_sprite() {
    let img = nearest(CompositorOpts::default())
        .render(&full_face(), 16)
        .unwrap();
    let tint = full_face().tints().unwrap().hair.to_unit();
    assert_eq!(img.pixel(2, 0), hard_light_fill([120, 120, 120, 255], tint));
}

#[test]
fn swapping_head_and_hair_changes_the_overlap() {
    let c = nearest(CompositorOpts::default());
    let sel = full_face();
    let normal = c.render_layers(&sel, 16, &DRAW_ORDER).unwrap();

    let mut swapped_order = DRAW_ORDER;
    swapped_order.swap(3, 6);
    assert_eq!(swapped_order[3], LayerKind::Hair);
    let swapped = c.render_layers(&sel, 16, &swapped_order).unwrap();

    // hair01 and head01 overlap at (5, 3).
    assert_ne!(normal.pixel(5, 3), swapped.pixel(5, 3));
    // Pixels covered by only one of them are unaffected.
    assert_eq!(normal.pixel(2, 0), swapped.pixel(2, 0));
}

#[test]
fn skin_layers_take_the_hard_light_of_the_skin_color() {
    let img = nearest(CompositorOpts::default())
        .render(&full_face(), 16)
        .unwrap();
    let skin = full_face().tints().unwrap().skin.to_unit();
    // Head only, ear only, neck only.
    assert_eq!(img.pixel(7, 8), hard_light_fill([160, 160, 160, 255], skin));
    assert_eq!(img.pixel(1, 7), hard_light_fill([150, 150, 150, 255], skin));
    assert_eq!(img.pixel(7, 15), hard_light_fill([140, 140, 140, 255], skin));
}

#[test]
fn neck_depends_only_on_the_skin_color() {
    let c = nearest(CompositorOpts::default());
    let neck = |sel: &PortraitSelection| {
        let img = c.render(sel, 16).unwrap();
        (6..10).map(|x| img.pixel(x, 15)).collect::<Vec<_>>()
    };
    let base = neck(&full_face());
    assert!(base.iter().all(|px| px[3] == 255));

    let mut other = full_face();
    other.head = "head02".to_owned();
    other.hair = "hair02".to_owned();
    other.brow = String::new();
    other.facial = "beard01".to_owned();
    other.hair_back = "hairback01".to_owned();
    other.hair_color = "#102030".to_owned();
    assert_eq!(neck(&other), base);

    let mut reskinned = full_face();
    reskinned.skin_color = "#3a2418".to_owned();
    let changed = neck(&reskinned);
    for (a, b) in base.iter().zip(&changed) {
        assert_ne!(a, b);
    }
}

#[test]
fn empty_head_and_ears_use_atlas_defaults() {
    let c = nearest(CompositorOpts::default());
    let mut implicit = full_face();
    implicit.head = String::new();
    implicit.ears = String::new();
    assert_eq!(
        c.render(&implicit, 16).unwrap(),
        c.render(&full_face(), 16).unwrap()
    );
}

#[test]
fn all_empty_without_defaults_renders_only_the_neck() {
    let img = nearest(neck_only_opts()).render(&blank(), 16).unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let inside_neck = (6..10).contains(&x) && (12..16).contains(&y);
            assert_eq!(img.pixel(x, y)[3] != 0, inside_neck, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn omitting_the_brow_only_changes_the_brow_footprint() {
    let c = nearest(CompositorOpts::default());
    let with = c.render(&full_face(), 16).unwrap();
    let mut sel = full_face();
    sel.brow = String::new();
    let without = c.render(&sel, 16).unwrap();

    let mut changed = 0;
    for y in 0..16 {
        for x in 0..16 {
            if with.pixel(x, y) != without.pixel(x, y) {
                assert!((4..12).contains(&x) && y == 6, "pixel ({x}, {y}) changed");
                changed += 1;
            }
        }
    }
    assert!(changed > 0);
}

#[test]
fn strict_policy_fails_on_unknown_parts() {
    let c = nearest(CompositorOpts {
        part_policy: PartPolicy::Strict,
        ..CompositorOpts::default()
    });
    let mut sel = full_face();
    sel.hair = "hair99".to_owned();
    let err = c.render(&sel, 16).unwrap_err();
    assert!(matches!(err, VizageError::UnresolvedPart(_)));
    assert!(c.render(&full_face(), 16).is_ok());
}

#[test]
fn invalid_sizes_and_colors_are_rejected_up_front() {
    let c = nearest(CompositorOpts::default());
    for size in [0, MAX_OUTPUT_SIZE + 1] {
        assert!(matches!(
            c.render(&full_face(), size).unwrap_err(),
            VizageError::Validation(_)
        ));
    }
    let mut sel = full_face();
    sel.skin_color = "#zzzzzz".to_owned();
    assert!(matches!(
        c.render(&sel, 16).unwrap_err(),
        VizageError::Validation(_)
    ));
}

#[test]
fn nearest_upscale_keeps_the_sprite_footprint() {
    let img = nearest(CompositorOpts::default())
        .render(&full_face(), 64)
        .unwrap();
    assert_eq!(img.pixel(2, 62)[3], 0);
    assert_eq!(img.pixel(18, 58)[3], 128);
    assert_eq!(img.pixel(30, 34)[3], 255);
}

#[test]
fn smooth_filter_keeps_premultiplied_invariant() {
    let c = Compositor::new(
        Arc::new(fixture_atlas()),
        CompositorOpts::default(),
        SampleFilter::Lanczos3,
    );
    let img = c.render(&full_face(), 50).unwrap();
    assert!(img.has_visible_pixels());
    for px in img.data.chunks_exact(4) {
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    }
}

#[test]
fn backdrop_is_drawn_only_when_enabled() {
    let atlas = fixture_atlas().with_backdrop(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])));
    let atlas = Arc::new(atlas);

    let off = Compositor::new(atlas.clone(), CompositorOpts::default(), SampleFilter::Nearest);
    assert_eq!(off.render(&full_face(), 16).unwrap().pixel(0, 15), [0, 0, 0, 0]);

    let on = Compositor::new(
        atlas,
        CompositorOpts {
            backdrop: true,
            ..CompositorOpts::default()
        },
        SampleFilter::Nearest,
    );
    let img = on.render(&full_face(), 16).unwrap();
    assert_eq!(img.pixel(0, 15), [10, 20, 30, 255]);
    // Opaque layers still cover the backdrop.
    assert_ne!(img.pixel(7, 8), [10, 20, 30, 255]);
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: CompositorOpts = serde_json::from_str(r#"{"partPolicy":"strict"}"#).unwrap();
    assert_eq!(opts.part_policy, PartPolicy::Strict);
    assert!(opts.default_head_and_ears);
    assert!(!opts.backdrop);
}
