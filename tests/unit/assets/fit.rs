use super::*;

fn target(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

#[test]
fn fill_crop_plan_for_square_on_wide_canvas() {
    // 1000x1000 onto 1920x1080: scale = 1.92, 1920x1920, crop 420 rows off the top.
    let p = FitPlan::compute(FitMode::FillCrop, 1000, 1000, target(1920, 1080)).unwrap();
    assert_eq!((p.scaled_width, p.scaled_height), (1920, 1920));
    assert_eq!((p.crop_x, p.crop_y), (0, 420));
    assert_eq!((p.pad_x, p.pad_y), (0, 0));
}

#[test]
fn fill_crop_plan_for_landscape_on_vertical_canvas() {
    // 1920x1080 onto 720x1280: height drives the scale, sides are cropped.
    let p = FitPlan::compute(FitMode::FillCrop, 1920, 1080, target(720, 1280)).unwrap();
    assert_eq!(p.scaled_height, 1280);
    assert_eq!(p.scaled_width, 2275);
    assert_eq!(p.crop_x, (2275 - 720) / 2);
    assert_eq!(p.crop_y, 0);
}

#[test]
fn fill_crop_never_undershoots_target() {
    for (sw, sh) in [(3, 7), (1919, 1079), (4000, 3), (1, 1)] {
        let p = FitPlan::compute(FitMode::FillCrop, sw, sh, target(786, 480)).unwrap();
        assert!(p.scaled_width >= 786 && p.scaled_height >= 480, "{sw}x{sh}: {p:?}");
    }
}

#[test]
fn letterbox_plan_centers_without_cropping() {
    // 1000x1000 onto 1920x1080: fit height, pillarbox the sides.
    let p = FitPlan::compute(FitMode::Letterbox, 1000, 1000, target(1920, 1080)).unwrap();
    assert_eq!((p.scaled_width, p.scaled_height), (1080, 1080));
    assert_eq!((p.pad_x, p.pad_y), (420, 0));
    assert_eq!((p.crop_x, p.crop_y), (0, 0));
}

#[test]
fn zero_sized_source_is_a_decode_error() {
    let err = FitPlan::compute(FitMode::FillCrop, 0, 10, target(10, 10)).unwrap_err();
    assert!(matches!(err, SlidecastError::Decode(_)));
}

#[test]
fn fit_image_outputs_exact_target_size() {
    let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 10, image::Rgb([200, 10, 10])));
    for mode in [FitMode::FillCrop, FitMode::Letterbox] {
        let out = ImageFit::new(mode).fit_image(&src, target(16, 16)).unwrap();
        assert_eq!(out.dimensions(), (16, 16), "{mode:?}");
    }
}

#[test]
fn letterbox_leaves_black_bars() {
    let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 10, image::Rgb([255, 255, 255])));
    let out = ImageFit::new(FitMode::Letterbox)
        .with_filter(imageops::FilterType::Nearest)
        .fit_image(&src, target(16, 16))
        .unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(out.get_pixel(8, 8).0, [255, 255, 255]);
}

#[test]
fn fill_crop_keeps_center_content() {
    // Left half red, right half blue; a square crop from the middle holds both colors.
    let mut src = RgbImage::new(40, 10);
    for (x, _, px) in src.enumerate_pixels_mut() {
        *px = if x < 20 {
            image::Rgb([255, 0, 0])
        } else {
            image::Rgb([0, 0, 255])
        };
    }
    let out = ImageFit::new(FitMode::FillCrop)
        .with_filter(imageops::FilterType::Nearest)
        .fit_image(&DynamicImage::ImageRgb8(src), target(10, 10))
        .unwrap();
    assert_eq!(out.get_pixel(0, 5).0, [255, 0, 0]);
    assert_eq!(out.get_pixel(9, 5).0, [0, 0, 255]);
}

#[test]
fn fit_from_disk_and_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("ok.png");
    RgbImage::from_pixel(8, 6, image::Rgb([1, 2, 3]))
        .save(&good)
        .unwrap();
    let out = ImageFit::default().fit(&good, target(4, 4)).unwrap();
    assert_eq!(out.dimensions(), (4, 4));

    let bad = dir.path().join("broken.jpg");
    std::fs::write(&bad, b"definitely not a jpeg").unwrap();
    let err = ImageFit::default().fit(&bad, target(4, 4)).unwrap_err();
    assert!(matches!(err, SlidecastError::Decode(_)), "{err}");

    let missing = dir.path().join("nope.png");
    assert!(ImageFit::default().fit(&missing, target(4, 4)).is_err());
}

#[test]
fn fit_mode_parses_kebab_names() {
    assert_eq!("fill-crop".parse::<FitMode>().unwrap(), FitMode::FillCrop);
    assert_eq!("letterbox".parse::<FitMode>().unwrap(), FitMode::Letterbox);
    assert!("stretch".parse::<FitMode>().is_err());
    assert_eq!(FitMode::default(), FitMode::FillCrop);
}
