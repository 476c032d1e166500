use super::*;
use crate::audio::decode::AudioTrack;
use crate::encode::sink::RecordingEncoder;
use crate::relay::{LogLevel, MemorySink};
use image::RgbImage;

/// Decodes any existing file to a constant mono track of `secs` seconds.
struct ConstDecoder {
    secs: f64,
}

impl AudioDecoder for ConstDecoder {
    fn decode(&self, path: &Path) -> SlidecastResult<AudioTrack> {
        if !path.is_file() {
            return Err(SlidecastError::audio(format!("{} missing", path.display())));
        }
        let frames = (self.secs * 1_000.0).round() as usize;
        AudioTrack::new(1_000, 1, vec![0.1; frames])
    }
}

/// Produces a blank frame unless the file name contains "bad".
struct BlankFitter;

impl ImageFitter for BlankFitter {
    fn fit(&self, path: &Path, target: Resolution) -> SlidecastResult<RgbImage> {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if name.contains("bad") {
            return Err(SlidecastError::decode(format!("cannot decode {}", path.display())));
        }
        Ok(RgbImage::new(target.width, target.height))
    }
}

fn small_opts() -> PipelineOpts {
    PipelineOpts {
        resolution: Resolution::new(16, 8).unwrap(),
        ..PipelineOpts::default()
    }
}

fn make_folder(parent: &Path, name: &str, images: &[&str]) -> PathBuf {
    let root = parent.join(name);
    std::fs::create_dir_all(root.join("imagenes")).unwrap();
    for img in images {
        std::fs::write(root.join("imagenes").join(img), b"").unwrap();
    }
    std::fs::write(root.join(format!("{name}.wav")), b"").unwrap();
    std::fs::write(root.join(format!("music_{name}.mp3")), b"").unwrap();
    root
}

fn pipeline(secs: f64, encoder: RecordingEncoder, sink: MemorySink) -> Pipeline {
    Pipeline::new(small_opts())
        .with_fitter(BlankFitter)
        .with_decoder(ConstDecoder { secs })
        .with_encoder(encoder)
        .with_relay(Relay::new(sink))
}

#[test]
fn opts_from_config_uses_resolved_values() {
    let cfg = SlideshowConfig {
        resolution: "Vertical".to_owned(),
        fps: 30,
        format: OutputFormat::Mov,
        ..SlideshowConfig::default()
    };
    let opts = PipelineOpts::from_config(&cfg).unwrap();
    assert_eq!(opts.resolution, Resolution::new(720, 1280).unwrap());
    assert_eq!(opts.fps, Fps::new(30, 1).unwrap());
    assert_eq!(opts.format, OutputFormat::Mov);

    let bad = SlideshowConfig {
        resolution: "Personalizado".to_owned(),
        ..SlideshowConfig::default()
    };
    assert!(PipelineOpts::from_config(&bad).unwrap_err().is_configuration());
}

#[test]
fn default_opts_are_full_hd_24_fps_mp4() {
    let opts = PipelineOpts::default();
    assert_eq!(opts.resolution.to_string(), "1920x1080");
    assert_eq!(opts.fps, Fps::default());
    assert_eq!(opts.format, OutputFormat::Mp4);
    assert_eq!(opts.fit, FitMode::FillCrop);
}

#[test]
fn skipped_images_keep_the_original_share() {
    let dir = tempfile::tempdir().unwrap();
    let root = make_folder(dir.path(), "demo", &["1.png", "2_bad.jpg", "3.JPEG", "notes.txt"]);
    let encoder = RecordingEncoder::new();
    let sink = MemorySink::new();
    let p = pipeline(30.0, encoder.clone(), sink.clone());

    let out = p.assemble(&root).unwrap();
    assert_eq!(out, root.join("video_demo.mp4"));

    let records = encoder.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].clip_secs, vec![10.0, 10.0]);
    assert_eq!(records[0].sources.len(), 2);
    assert!(records[0].sources[1].ends_with("3.JPEG"));
    assert_eq!(records[0].resolution, Resolution::new(16, 8).unwrap());
    assert!((records[0].audio_secs - 30.0).abs() < 1e-9);

    let events = sink.events();
    assert!(
        events
            .iter()
            .any(|e| e.level == LogLevel::Warn && e.message.contains("2_bad.jpg"))
    );
    assert!(events.iter().all(|e| e.level != LogLevel::Error));
}

#[test]
fn all_images_bad_is_a_composition_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = make_folder(dir.path(), "demo", &["bad1.png", "bad2.png"]);
    let encoder = RecordingEncoder::new();
    let p = pipeline(4.0, encoder.clone(), MemorySink::new());
    let err = p.assemble(&root).unwrap_err();
    assert!(matches!(err, SlidecastError::Composition(_)));
    assert!(encoder.records().is_empty());
}

#[test]
fn empty_images_dir_is_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let root = make_folder(dir.path(), "demo", &[]);
    let p = pipeline(4.0, RecordingEncoder::new(), MemorySink::new());
    assert!(matches!(
        p.assemble(&root).unwrap_err(),
        SlidecastError::MissingInput(_)
    ));
}

#[test]
fn missing_background_fails_before_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let root = make_folder(dir.path(), "demo", &["1.png"]);
    std::fs::remove_file(root.join("music_demo.mp3")).unwrap();
    let sink = MemorySink::new();
    let p = pipeline(4.0, RecordingEncoder::new(), sink.clone());

    let err = p.assemble(&root).unwrap_err();
    assert!(matches!(err, SlidecastError::MissingInput(ref m) if m.contains("music_demo.mp3")));
    assert!(
        sink.events()
            .iter()
            .any(|e| e.level == LogLevel::Error && e.message.contains("music_demo.mp3"))
    );
}

#[test]
fn generate_returns_explanatory_string() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("ghost");
    std::fs::create_dir_all(&root).unwrap();
    let p = pipeline(4.0, RecordingEncoder::new(), MemorySink::new());
    let msg = p.generate(&root).unwrap_err();
    assert!(msg.starts_with("video generation failed: missing input:"), "{msg}");
    assert_eq!(msg, failure_message(&p.assemble(&root).unwrap_err()));
}

#[test]
fn encoder_failure_is_an_encode_error() {
    struct Broken;
    impl VideoEncoder for Broken {
        fn encode(&self, _job: &EncodeJob<'_>) -> SlidecastResult<()> {
            Err(SlidecastError::Other(anyhow::anyhow!("disk full")))
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let root = make_folder(dir.path(), "demo", &["1.png"]);
    let p = pipeline(2.0, RecordingEncoder::new(), MemorySink::new()).with_encoder(Broken);
    let err = p.assemble(&root).unwrap_err();
    assert!(matches!(err, SlidecastError::Encode(ref m) if m.contains("disk full")));
}

#[test]
fn format_picks_output_extension() {
    let dir = tempfile::tempdir().unwrap();
    let root = make_folder(dir.path(), "demo", &["1.png"]);
    let opts = PipelineOpts {
        format: OutputFormat::Mkv,
        ..small_opts()
    };
    let p = Pipeline::new(opts)
        .with_fitter(BlankFitter)
        .with_decoder(ConstDecoder { secs: 1.0 })
        .with_encoder(RecordingEncoder::new());
    assert_eq!(p.assemble(&root).unwrap(), root.join("video_demo.mkv"));
}
