use super::*;

fn clip(name: &str, w: u32, h: u32, secs: f64) -> Clip {
    Clip {
        source: PathBuf::from(name),
        frame: Arc::new(RgbImage::new(w, h)),
        duration_secs: secs,
    }
}

#[test]
fn duration_is_total_over_count() {
    assert!((per_image_duration(30.0, 3).unwrap() - 10.0).abs() < 1e-12);
    for (d, n) in [(7.3, 3), (1.0, 7), (3600.0, 11)] {
        let each = per_image_duration(d, n).unwrap();
        let sum: f64 = (0..n).map(|_| each).sum();
        assert!((sum - d).abs() < 1e-9, "{d}/{n}");
    }
}

#[test]
fn zero_images_is_missing_input() {
    let err = per_image_duration(30.0, 0).unwrap_err();
    assert!(matches!(err, SlidecastError::MissingInput(_)));
    assert!(per_image_duration(0.0, 3).is_err());
    assert!(per_image_duration(f64::INFINITY, 3).is_err());
}

#[test]
fn concat_rejects_empty_and_mismatched() {
    assert!(matches!(
        VisualSequence::concat(vec![]).unwrap_err(),
        SlidecastError::Composition(_)
    ));
    let err =
        VisualSequence::concat(vec![clip("a", 4, 4, 1.0), clip("b", 4, 2, 1.0)]).unwrap_err();
    assert!(matches!(err, SlidecastError::Composition(_)));
    assert!(VisualSequence::concat(vec![clip("a", 4, 4, 0.0)]).is_err());
}

#[test]
fn three_ten_second_clips_at_24_fps() {
    let seq = VisualSequence::concat(vec![
        clip("1", 4, 4, 10.0),
        clip("2", 4, 4, 10.0),
        clip("3", 4, 4, 10.0),
    ])
    .unwrap();
    let fps = Fps::default();
    assert_eq!(seq.len(), 3);
    assert!((seq.total_secs() - 30.0).abs() < 1e-12);
    assert_eq!(seq.frame_counts(fps), vec![240, 240, 240]);
    assert_eq!(seq.total_frames(fps), 720);
    assert_eq!(seq.resolution(), Resolution::new(4, 4).unwrap());
}

#[test]
fn frame_counts_do_not_drift() {
    let each = per_image_duration(10.0, 7).unwrap();
    let seq = VisualSequence::concat((0..7).map(|i| clip(&i.to_string(), 2, 2, each)).collect())
        .unwrap();
    let fps = Fps::default();
    let counts = seq.frame_counts(fps);
    assert_eq!(counts.iter().sum::<u64>(), 240);
    assert!(counts.iter().all(|c| *c == 34 || *c == 35), "{counts:?}");
}
