use super::*;
use crate::assemble::timeline::{Clip, VisualSequence};
use crate::audio::decode::AudioTrack;
use crate::audio::mix::MixedAudio;
use crate::foundation::core::Fps;
use image::{Rgb, RgbImage};
use std::sync::Arc;

fn parts(w: u32, h: u32, secs: f64) -> (VisualSequence, MixedAudio) {
    let visuals = VisualSequence::concat(vec![
        Clip {
            source: PathBuf::from("a.png"),
            frame: Arc::new(RgbImage::from_pixel(w, h, Rgb([200, 0, 0]))),
            duration_secs: secs / 2.0,
        },
        Clip {
            source: PathBuf::from("b.png"),
            frame: Arc::new(RgbImage::from_pixel(w, h, Rgb([0, 0, 200]))),
            duration_secs: secs / 2.0,
        },
    ])
    .unwrap();
    let frames = (secs * 48_000.0).round() as usize;
    let audio = MixedAudio {
        track: AudioTrack::new(48_000, 2, vec![0.0; frames * 2]).unwrap(),
        narration_secs: secs,
        background_secs: secs,
    };
    (visuals, audio)
}

#[test]
fn scratch_audio_sits_next_to_output() {
    let p = scratch_audio_path(Path::new("/tmp/a/video_a.mp4"));
    assert_eq!(p, PathBuf::from("/tmp/a/.video_a.mix.f32le"));
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("video_odd.mp4");
    let (visuals, audio) = parts(5, 4, 1.0);
    let err = FfmpegEncoder::new()
        .encode(&EncodeJob {
            visuals: &visuals,
            audio: &audio,
            fps: Fps::default(),
            out_path: &out,
            overwrite: true,
        })
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Encode(ref m) if m.contains("even")));
    assert!(!out.exists());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x").join("y").join("video.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(out.parent().unwrap().is_dir());
    ensure_parent_dir(Path::new("video.mp4")).unwrap();
}

#[test]
fn encodes_small_video_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    for format in OutputFormat::ALL {
        let out = dir.path().join(format!("video_t.{}", format.extension()));
        let (visuals, audio) = parts(32, 18, 1.0);
        FfmpegEncoder::new()
            .encode(&EncodeJob {
                visuals: &visuals,
                audio: &audio,
                fps: Fps::default(),
                out_path: &out,
                overwrite: true,
            })
            .unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0, "{format}");
        assert!(!scratch_audio_path(&out).exists());
    }
}

fn argv(out: &Path, overwrite: bool) -> Vec<String> {
    let (visuals, audio) = parts(32, 18, 30.0);
    let job = EncodeJob {
        visuals: &visuals,
        audio: &audio,
        fps: Fps::default(),
        out_path: out,
        overwrite,
    };
    let cmd = FfmpegEncoder::new().command(&job, Path::new("/tmp/demo/.video_demo.mix.f32le"));
    assert_eq!(cmd.get_program(), "ffmpeg");
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}

#[test]
fn command_feeds_raw_frames_at_the_job_rate() {
    let args = argv(Path::new("/tmp/demo/video_demo.mp4"), true);

    assert_eq!(args[0], "-y");
    assert_eq!(value_after(&args, "-s"), ["32x18"]);
    assert_eq!(value_after(&args, "-pix_fmt"), ["rgb24", "yuv420p"]);
    assert_eq!(value_after(&args, "-i"), ["pipe:0", "/tmp/demo/.video_demo.mix.f32le"]);
    assert_eq!(value_after(&args, "-ar"), ["48000"]);
    assert_eq!(value_after(&args, "-ac"), ["2"]);
    assert_eq!(value_after(&args, "-c:v"), ["libx264"]);
    assert_eq!(value_after(&args, "-c:a"), ["aac"]);

    let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
    assert_eq!(value_after(&args, "-r"), ["24/1"]);
    assert!(pos("-r") < pos("-i"), "rate must precede the raw input: {args:?}");
    assert!(args.iter().any(|a| a == "-shortest"));
    assert_eq!(value_after(&args, "-movflags"), ["+faststart"]);
    assert_eq!(args.last().map(String::as_str), Some("/tmp/demo/video_demo.mp4"));
}

#[test]
fn command_skips_faststart_for_mkv_and_respects_overwrite() {
    let args = argv(Path::new("/tmp/demo/video_demo.mkv"), false);
    assert_eq!(args[0], "-n");
    assert!(value_after(&args, "-movflags").is_empty());
    assert!(args.iter().any(|a| a == "-shortest"));

    let mov = argv(Path::new("/tmp/demo/video_demo.mov"), true);
    assert_eq!(value_after(&mov, "-movflags"), ["+faststart"]);
}
