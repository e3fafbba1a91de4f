use super::*;
use crate::foundation::core::Rgba8Premul;

fn red(w: u32, h: u32) -> RasterImage {
    RasterImage::from_premul_rgba8(&[255u8, 0, 0, 255].repeat((w * h) as usize), w, h).unwrap()
}

fn px(frame: &CanvasFrame, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn opaque() -> ImagePaint<'static> {
    ImagePaint {
        color_filter: None,
        opacity: 1.0,
    }
}

#[test]
fn cpu_canvas_scales_image_into_destination() {
    let mut canvas = CpuCanvas::new(8, 8).unwrap();
    canvas
        .draw_image(&red(2, 2), Rect::new(2.0, 2.0, 6.0, 6.0), &opaque())
        .unwrap();
    let frame = canvas.finish();

    let [r, g, b, a] = px(&frame, 4, 4);
    assert!(r >= 250 && a >= 250, "center={:?}", [r, g, b, a]);
    assert_eq!((g, b), (0, 0));
    assert_eq!(px(&frame, 0, 0), [0, 0, 0, 0]);
    assert_eq!(px(&frame, 7, 7), [0, 0, 0, 0]);
}

#[test]
fn cpu_canvas_applies_filter_and_opacity() {
    let tint = ColorFilter::Tint {
        color: Rgba8Premul::from_straight_rgba(0, 255, 0, 255),
    };
    let mut canvas = CpuCanvas::new(4, 4).unwrap();
    canvas
        .draw_image(
            &red(4, 4),
            Rect::new(0.0, 0.0, 4.0, 4.0),
            &ImagePaint {
                color_filter: Some(&tint),
                opacity: 0.5,
            },
        )
        .unwrap();
    let [r, g, b, a] = px(&canvas.finish(), 1, 1);
    assert_eq!((r, b), (0, 0));
    assert!(g.abs_diff(128) <= 2, "g={g}");
    assert!(a.abs_diff(128) <= 2, "a={a}");
}

#[test]
fn disposed_images_cannot_be_drawn() {
    let img = red(1, 1);
    img.dispose();
    let dst = Rect::new(0.0, 0.0, 1.0, 1.0);
    assert!(
        CpuCanvas::new(1, 1)
            .unwrap()
            .draw_image(&img, dst, &opaque())
            .is_err()
    );
    assert!(
        RecordingCanvas::new()
            .draw_image(&img, dst, &opaque())
            .is_err()
    );
}

#[test]
fn recording_canvas_keeps_handles_and_effects() {
    let img = red(1, 1);
    let filter = ColorFilter::grayscale();
    let mut rec = RecordingCanvas::new();
    rec.draw_image(
        &img,
        Rect::new(1.0, 2.0, 3.0, 4.0),
        &ImagePaint {
            color_filter: Some(&filter),
            opacity: 0.75,
        },
    )
    .unwrap();

    let records = rec.take();
    assert_eq!(records.len(), 1);
    assert!(records[0].image.ptr_eq(&img));
    assert_eq!(records[0].dst, Rect::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(records[0].color_filter, Some(filter));
    assert_eq!(records[0].opacity, 0.75);
    assert!(rec.records().is_empty());
}

#[test]
fn empty_images_draw_nothing() {
    let mut canvas = CpuCanvas::new(2, 2).unwrap();
    canvas
        .draw_image(
            &RasterImage::empty(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            &opaque(),
        )
        .unwrap();
    assert!(canvas.finish().data.iter().all(|&b| b == 0));
}

#[test]
fn zero_sized_canvas_is_rejected() {
    assert!(CpuCanvas::new(0, 4).is_err());
    assert!(CpuCanvas::new(70_000, 4).is_err());
}
