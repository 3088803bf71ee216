use image::{Rgba, RgbaImage};

use super::*;
use crate::test_fixture::{fixture_atlas, fixture_sheets, scratch_dir, write_fixture_dir};

#[test]
fn category_names_round_trip_through_from_str() {
    for c in PartCategory::ALL {
        assert_eq!(c.as_str().parse::<PartCategory>().unwrap(), c);
    }
    assert_eq!("HAIRBACK".parse::<PartCategory>().unwrap(), PartCategory::HairBack);
    assert!("neck".parse::<PartCategory>().is_err());
}

#[test]
fn new_requires_every_category() {
    let mut sheets = fixture_sheets();
    sheets.retain(|s| s.category() != PartCategory::Facial);
    let err = SpriteAtlas::new(sheets).unwrap_err();
    assert!(matches!(err, VizageError::MissingAsset(_)));
    assert!(err.to_string().contains("facial"));
}

#[test]
fn new_rejects_duplicate_categories() {
    let mut sheets = fixture_sheets();
    sheets.push(sheets[0].clone());
    assert!(matches!(
        SpriteAtlas::new(sheets).unwrap_err(),
        VizageError::Validation(_)
    ));
}

#[test]
fn sheet_rejects_regions_outside_image() {
    let manifest = SpriteManifest::new(vec![SpriteEntry {
        file_name: "hair01.png".to_owned(),
        x: 10,
        y: 0,
        width: 8,
        height: 8,
    }])
    .unwrap();
    let err = SpriteSheet::new(PartCategory::Hair, manifest, RgbaImage::new(16, 8)).unwrap_err();
    assert!(matches!(err, VizageError::MissingAsset(_)));
}

#[test]
fn part_keys_follow_manifest_order() {
    let atlas = fixture_atlas();
    assert_eq!(
        atlas.part_keys(PartCategory::Head),
        vec!["head01", "head02", "ear01", "neck01"]
    );
}

#[test]
fn load_reads_every_category_from_disk() {
    let dir = scratch_dir("atlas_load");
    write_fixture_dir(&dir);

    let atlas = SpriteAtlas::load(&dir).unwrap();
    assert!(atlas.backdrop().is_none());
    let mem = fixture_atlas();
    for c in PartCategory::ALL {
        assert_eq!(atlas.sheet(c).manifest(), mem.sheet(c).manifest());
        assert_eq!(atlas.sheet(c).image(), mem.sheet(c).image());
    }
}

#[test]
fn load_picks_up_optional_backdrop() {
    let dir = scratch_dir("atlas_backdrop");
    write_fixture_dir(&dir);
    RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]))
        .save_with_format(dir.join("suit.png"), image::ImageFormat::Png)
        .unwrap();

    let atlas = SpriteAtlas::load(&dir).unwrap();
    assert_eq!(atlas.backdrop().map(|b| b.dimensions()), Some((4, 4)));
}

#[test]
fn load_fails_on_missing_sheet() {
    let dir = scratch_dir("atlas_missing");
    write_fixture_dir(&dir);
    std::fs::remove_file(dir.join("brow.png")).unwrap();

    let err = SpriteAtlas::load(&dir).unwrap_err();
    assert!(matches!(err, VizageError::MissingAsset(_)));
    assert!(err.to_string().contains("brow.png"));
}

#[test]
fn load_fails_on_corrupt_manifest() {
    let dir = scratch_dir("atlas_corrupt");
    write_fixture_dir(&dir);
    std::fs::write(dir.join("hair.json"), b"[{\"fileName\": 3}]").unwrap();

    let err = SpriteAtlas::load(&dir).unwrap_err();
    assert!(matches!(err, VizageError::MissingAsset(_)));
    assert!(err.to_string().contains("hair.json"));
}

#[test]
fn load_fails_on_undecodable_sheet() {
    let dir = scratch_dir("atlas_garbage");
    write_fixture_dir(&dir);
    std::fs::write(dir.join("head.png"), b"not a png").unwrap();

    assert!(matches!(
        load_category(&dir, PartCategory::Head).unwrap_err(),
        VizageError::MissingAsset(_)
    ));
}
