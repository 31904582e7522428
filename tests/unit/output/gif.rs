use std::{
    io::{self, Write},
    path::Path,
};

use image::AnimationDecoder as _;

use super::{
    gif::{GifSink, output_path_for_mode, validate_output_path},
    sink::{FrameSink, InMemorySink, SinkConfig},
};
use crate::{activity::mode::EncodingMode, foundation::core::Rgb8, render::frame::FrameRGBA};

#[test]
fn output_must_be_a_gif() {
    assert!(validate_output_path(Path::new("out/vis.gif")).is_ok());
    assert!(validate_output_path(Path::new("VIS.GIF")).is_ok());
    assert!(validate_output_path(Path::new("vis.png")).is_err());
    assert!(validate_output_path(Path::new("vis")).is_err());
    assert!(GifSink::new("vis.mp4").is_err());
}

#[test]
fn multi_mode_outputs_are_suffixed() {
    let out = Path::new("runs/vis.gif");
    assert_eq!(
        output_path_for_mode(out, EncodingMode::ExpHeatmap, false),
        Path::new("runs/vis.gif")
    );
    assert_eq!(
        output_path_for_mode(out, EncodingMode::ExpHeatmap, true),
        Path::new("runs/vis_4.gif")
    );
    assert_eq!(
        output_path_for_mode(Path::new("Vis.GIF"), EncodingMode::Direct, true),
        Path::new("Vis_0.gif")
    );
}

#[test]
fn in_memory_sink_keeps_order() {
    let mut sink = InMemorySink::new();
    let cfg = SinkConfig {
        width: 2,
        height: 2,
        fps: 8,
    };
    sink.begin(cfg).unwrap();
    for i in 0..3 {
        let f = FrameRGBA::filled(2, 2, Rgb8::new(i as u8, 0, 0)).unwrap();
        sink.push_frame(i, &f).unwrap();
    }
    sink.end().unwrap();
    assert_eq!(sink.config(), Some(cfg));
    assert!(sink.is_finished());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn gif_sink_writes_every_frame() {
    let path = std::env::temp_dir().join(format!("chipvis_sink_{}.gif", std::process::id()));
    let mut sink = GifSink::new(&path).unwrap();
    sink.begin(SinkConfig {
        width: 4,
        height: 3,
        fps: 10,
    })
    .unwrap();
    for (i, c) in [Rgb8::new(0xed, 0x55, 0x3b), Rgb8::new(0x40, 0x40, 0x40)]
        .into_iter()
        .enumerate()
    {
        let f = FrameRGBA::filled(4, 3, c).unwrap();
        sink.push_frame(i as u64, &f).unwrap();
    }
    sink.end().unwrap();

    let file = std::io::BufReader::new(std::fs::File::open(&path).unwrap());
    let frames = image::codecs::gif::GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].buffer().dimensions(), (4, 3));
    let (num, den) = frames[0].delay().numer_denom_ms();
    assert_eq!(num / den, 100);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn gif_sink_rejects_frames_before_begin() {
    let mut sink = GifSink::new("never_written.gif").unwrap();
    let f = FrameRGBA::filled(1, 1, Rgb8::BLACK).unwrap();
    assert!(sink.push_frame(0, &f).is_err());
}

/// Accepts writes, then fails to flush like a full disk behind a buffered writer.
struct FullOnFlush(Vec<u8>);

impl Write for FullOnFlush {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::StorageFull))
    }
}

/// Rejects every write.
struct RejectAll;

impl Write for RejectAll {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("device unavailable"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write_one_frame(sink: &mut GifSink) {
    let cfg = SinkConfig {
        width: 4,
        height: 4,
        fps: 8,
    };
    let f = FrameRGBA::filled(4, 4, Rgb8::new(0xed, 0x55, 0x3b)).unwrap();
    // The failure may already surface here; `end` must report it either way.
    let _ = sink.begin(cfg).and_then(|()| sink.push_frame(0, &f));
}

#[test]
fn gif_sink_reports_failed_flush() {
    let mut sink = GifSink::from_writer(FullOnFlush(Vec::new()));
    write_one_frame(&mut sink);
    let err = sink.end().unwrap_err();
    assert!(err.to_string().contains("gif"), "{err}");
}

#[test]
fn gif_sink_reports_failed_writes() {
    let mut sink = GifSink::from_writer(RejectAll);
    write_one_frame(&mut sink);
    assert!(sink.end().is_err());
}

#[test]
fn gif_sink_into_writer_succeeds() {
    let mut sink = GifSink::from_writer(Vec::<u8>::new());
    write_one_frame(&mut sink);
    sink.end().unwrap();
    assert_eq!(sink.path(), Path::new(""));
}
