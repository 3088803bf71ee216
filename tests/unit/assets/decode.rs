use std::io::Cursor;

use super::*;

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decode_rgba8_keeps_straight_alpha() {
    let img = RgbaImage::from_raw(1, 1, vec![200, 100, 50, 128]).unwrap();
    let decoded = decode_rgba8(&png_bytes(&img)).unwrap();
    assert_eq!(decoded.into_raw(), vec![200, 100, 50, 128]);
}

#[test]
fn decode_portrait_premultiplies() {
    let img = RgbaImage::from_raw(2, 1, vec![255, 0, 0, 0, 200, 100, 50, 128]).unwrap();
    let p = decode_portrait(&png_bytes(&img)).unwrap();
    assert!(p.premultiplied);
    assert_eq!((p.width, p.height), (2, 1));
    assert_eq!(&p.data[0..4], &[0, 0, 0, 0]);
    assert_eq!(&p.data[4..8], &[100, 50, 25, 128]);
}

#[test]
fn decode_portrait_rejects_garbage_as_encoding_error() {
    let err = decode_portrait(b"definitely not an image").unwrap_err();
    assert!(matches!(err, VizageError::Encoding(_)));
}
