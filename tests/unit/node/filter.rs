use super::*;

#[test]
fn tint_keeps_coverage_and_replaces_color() {
    let f = ColorFilter::Tint {
        color: Rgba8Premul::from_straight_rgba(0, 255, 0, 255),
    };
    let src = [200u8, 10, 10, 255, 100, 5, 5, 128, 0, 0, 0, 0];
    let mut dst = [0u8; 12];
    f.apply_premul_rgba8(&src, &mut dst).unwrap();
    assert_eq!(&dst[0..4], &[0, 255, 0, 255]);
    assert_eq!(&dst[4..8], &[0, 128, 0, 128]);
    assert_eq!(&dst[8..12], &[0, 0, 0, 0]);
}

#[test]
fn grayscale_equalizes_channels() {
    let src = [255u8, 0, 0, 255];
    let mut dst = [0u8; 4];
    ColorFilter::grayscale()
        .apply_premul_rgba8(&src, &mut dst)
        .unwrap();
    assert_eq!(dst[0], dst[1]);
    assert_eq!(dst[1], dst[2]);
    assert_eq!(dst[0], 54);
    assert_eq!(dst[3], 255);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut dst = [0u8; 8];
    assert!(
        ColorFilter::grayscale()
            .apply_premul_rgba8(&[0u8; 4], &mut dst)
            .is_err()
    );
}

#[test]
fn serde_uses_tagged_kinds() {
    let f: ColorFilter =
        serde_json::from_str(r#"{"kind":"tint","color":{"r":0,"g":0,"b":255,"a":255}}"#).unwrap();
    assert_eq!(
        f,
        ColorFilter::Tint {
            color: Rgba8Premul::from_straight_rgba(0, 0, 255, 255)
        }
    );
    let json = serde_json::to_string(&ColorFilter::grayscale()).unwrap();
    assert!(json.contains(r#""kind":"matrix""#));
}
