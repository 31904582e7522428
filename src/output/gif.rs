use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};

use crate::{
    activity::mode::EncodingMode,
    foundation::error::{ChipVisError, ChipVisResult},
    output::sink::{FrameSink, SinkConfig},
    render::frame::FrameRGBA,
};

/// NeuQuant sampling speed (1 = best quality, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Check that `out` names a `.gif` file (extension compared case-insensitively).
pub fn validate_output_path(out: &Path) -> ChipVisResult<()> {
    let is_gif = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if !is_gif {
        return Err(ChipVisError::validation(format!(
            "output filename must end with .gif, got '{}'",
            out.display()
        )));
    }
    Ok(())
}

/// Output file of `mode`: `out` itself for single-mode runs, `<stem>_<mode>.gif` otherwise.
pub fn output_path_for_mode(out: &Path, mode: EncodingMode, multi: bool) -> PathBuf {
    if !multi {
        return out.to_path_buf();
    }
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out.with_file_name(format!("{stem}_{}.gif", mode.index()))
}

type BoxedWriter = Box<dyn Write + Send>;
type OpenWriter = Box<dyn FnOnce() -> ChipVisResult<BoxedWriter> + Send>;

struct WriterState {
    inner: BoxedWriter,
    error: Option<io::Error>,
}

/// Writer shared between the encoder and the sink.
///
/// The encoder writes its trailer while being dropped and discards any error; the first error
/// seen here is kept so `end` can still report it.
#[derive(Clone)]
struct SharedWriter(Arc<Mutex<WriterState>>);

impl SharedWriter {
    fn new(inner: BoxedWriter) -> Self {
        Self(Arc::new(Mutex::new(WriterState { inner, error: None })))
    }

    fn record<T>(&self, op: impl FnOnce(&mut BoxedWriter) -> io::Result<T>) -> io::Result<T> {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let res = op(&mut state.inner);
        if let Err(e) = &res
            && e.kind() != io::ErrorKind::Interrupted
            && state.error.is_none()
        {
            state.error = Some(io::Error::new(e.kind(), e.to_string()));
        }
        res
    }

    /// Flush the underlying writer and return the first error seen by any write.
    fn finish(&self) -> io::Result<()> {
        let flushed = self.record(|w| w.flush());
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match state.error.take() {
            Some(e) => Err(e),
            None => flushed,
        }
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.record(|w| w.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.record(|w| w.flush())
    }
}

/// Animated GIF writer: infinite loop, one frame per cycle at the configured rate.
pub struct GifSink {
    path: PathBuf,
    open: Option<OpenWriter>,
    writer: Option<SharedWriter>,
    encoder: Option<GifEncoder<SharedWriter>>,
    delay: image::Delay,
}

impl GifSink {
    /// Sink writing to `path`. The file is created in `begin`.
    pub fn new(path: impl Into<PathBuf>) -> ChipVisResult<Self> {
        let path = path.into();
        validate_output_path(&path)?;
        let target = path.clone();
        let open: OpenWriter = Box::new(move || {
            let file =
                File::create(&target).with_context(|| format!("create '{}'", target.display()))?;
            Ok(Box::new(BufWriter::new(file)) as BoxedWriter)
        });
        Ok(Self::with_opener(path, open))
    }

    /// Sink encoding into an arbitrary writer; `path()` is empty.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self::with_opener(
            PathBuf::new(),
            Box::new(move || Ok(Box::new(writer) as BoxedWriter)),
        )
    }

    fn with_opener(path: PathBuf, open: OpenWriter) -> Self {
        Self {
            path,
            open: Some(open),
            writer: None,
            encoder: None,
            delay: image::Delay::from_numer_denom_ms(1000, 8),
        }
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: io::Error) -> ChipVisError {
        ChipVisError::encode(format!("gif '{}': {e}", self.path.display()))
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> ChipVisResult<()> {
        if cfg.fps == 0 {
            return Err(ChipVisError::encode("gif fps must be > 0"));
        }
        let open = self
            .open
            .take()
            .ok_or_else(|| ChipVisError::encode("gif sink already started"))?;
        let writer = SharedWriter::new(open()?);
        let mut encoder = GifEncoder::new_with_speed(writer.clone(), QUANTIZER_SPEED);
        self.writer = Some(writer);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ChipVisError::encode(format!("gif repeat: {e}")))?;
        self.delay = image::Delay::from_numer_denom_ms(1000, cfg.fps);
        self.encoder = Some(encoder);
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> ChipVisResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ChipVisError::encode("gif sink used before begin"))?;
        let img = frame.clone().into_image()?;
        encoder
            .encode_frame(image::Frame::from_parts(img, 0, 0, self.delay))
            .map_err(|e| ChipVisError::encode(format!("gif frame {idx}: {e}")))
    }

    fn end(&mut self) -> ChipVisResult<()> {
        // The trailer is written when the encoder drops.
        drop(self.encoder.take());
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        writer.finish().map_err(|e| self.io_error(e))?;
        tracing::info!(path = %self.path.display(), "gif written");
        Ok(())
    }
}
