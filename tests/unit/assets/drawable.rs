use super::*;

const SQUARE: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
<rect width="20" height="10" fill="red"/>
</svg>"#;

#[test]
fn parse_reports_intrinsic_size() {
    let d = VectorDrawable::from_svg_data(SQUARE).unwrap();
    assert_eq!(d.intrinsic_size(), Size::new(20.0, 10.0));
}

#[test]
fn identical_bytes_get_distinct_ids() {
    let a = VectorDrawable::from_svg_data(SQUARE).unwrap();
    let b = VectorDrawable::from_svg_data(SQUARE).unwrap();
    assert_ne!(a.id(), b.id());
    assert!(b.id().get() > a.id().get());
}

#[test]
fn malformed_svg_is_an_error() {
    assert!(VectorDrawable::from_svg_data(br#"<svg"#).is_err());
}
