use super::*;
use crate::assets::drawable::VectorDrawable;

fn drawable() -> VectorDrawable {
    VectorDrawable::from_svg_data(
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"></svg>"#,
    )
    .unwrap()
}

#[test]
fn equality_requires_all_fields() {
    let a = drawable();
    let b = drawable();
    let base = RasterKey::new(Size::new(10.0, 20.0), 2.0, a.id());

    assert_eq!(base, RasterKey::new(Size::new(10.0, 20.0), 2.0, a.id()));
    assert_ne!(base, RasterKey::new(Size::new(10.0, 21.0), 2.0, a.id()));
    assert_ne!(base, RasterKey::new(Size::new(10.0, 20.0), 3.0, a.id()));
    assert_ne!(base, RasterKey::new(Size::new(10.0, 20.0), 2.0, b.id()));
}

#[test]
fn pixel_size_rounds_up() {
    let d = drawable();
    let key = RasterKey::new(Size::new(10.2, 3.0), 1.5, d.id());
    assert_eq!(key.pixel_size(), (16, 5));
    assert!(!key.is_degenerate());
}

#[test]
fn degenerate_extents_map_to_zero() {
    let d = drawable();
    assert_eq!(
        RasterKey::new(Size::new(0.0, 5.0), 2.0, d.id()).pixel_size(),
        (0, 10)
    );
    assert_eq!(
        RasterKey::new(Size::new(-3.0, f64::NAN), 2.0, d.id()).pixel_size(),
        (0, 0)
    );
    assert!(RasterKey::new(Size::ZERO, 1.0, d.id()).is_degenerate());
}
