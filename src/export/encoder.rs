//! GIF encoding behind a small port so exporters can be tested without
//! producing real GIF bytes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Result, WidgetError};
use crate::progress::ProgressCallback;
use crate::types::CanvasSize;

/// Frames queued ahead of the encoder worker before `add_frame` waits.
const FRAME_QUEUE: usize = 4;

/// Accepts RGBA frames with per-frame delays and produces an encoded animation.
#[async_trait]
pub trait FrameEncoder: Send {
    /// Hands a frame to the encoder. May wait while earlier frames are encoded.
    async fn add_frame(&mut self, frame: RgbaImage, delay: Duration) -> Result<()>;

    fn frame_count(&self) -> usize;

    /// Completes the animation. Progress is reported in [0, 1].
    async fn finish(self: Box<Self>, progress: Option<ProgressCallback>) -> Result<Vec<u8>>;
}

/// Creates encoders; failure to create one is terminal for an export.
pub trait EncoderFactory: Send + Sync {
    fn create(&self, size: CanvasSize, quality: u8) -> Result<Box<dyn FrameEncoder>>;
}

/// Stops a running [`GifFrameEncoder`] before its next frame.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Streams frames to a GIF encoder running on the blocking pool.
///
/// Each frame is quantized and written as soon as the worker receives it,
/// so at most [`FRAME_QUEUE`] frames are held in memory at once.
pub struct GifFrameEncoder {
    size: CanvasSize,
    frames: Option<mpsc::Sender<(RgbaImage, Duration)>>,
    encoded: mpsc::UnboundedReceiver<usize>,
    worker: Option<JoinHandle<Result<Vec<u8>>>>,
    sent: usize,
    abort: AbortHandle,
}

impl GifFrameEncoder {
    /// Starts the encoder worker. `quality` is the palette sampling speed,
    /// 1 (best) to 30 (fastest). Needs a running tokio runtime.
    pub fn new(size: CanvasSize, quality: u8) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WidgetError::EncoderUnavailable(e.to_string()))?;
        let quality = quality.clamp(1, 30);
        let abort = AbortHandle::default();
        let (frames_tx, frames_rx) = mpsc::channel(FRAME_QUEUE);
        let (encoded_tx, encoded_rx) = mpsc::unbounded_channel();
        let worker = runtime.spawn_blocking({
            let abort = abort.clone();
            move || encode_gif(frames_rx, quality, &abort, encoded_tx)
        });
        Ok(Self {
            size,
            frames: Some(frames_tx),
            encoded: encoded_rx,
            worker: Some(worker),
            sent: 0,
            abort,
        })
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    async fn join(&mut self) -> Result<Vec<u8>> {
        match self.worker.take() {
            Some(worker) => worker
                .await
                .map_err(|e| WidgetError::encoder(format!("encoder worker failed: {e}")))?,
            None => Err(WidgetError::encoder("encoder worker already stopped")),
        }
    }
}

#[async_trait]
impl FrameEncoder for GifFrameEncoder {
    async fn add_frame(&mut self, frame: RgbaImage, delay: Duration) -> Result<()> {
        if frame.dimensions() != (self.size.width, self.size.height) {
            return Err(WidgetError::encoder(format!(
                "frame is {}x{} but the animation is {}",
                frame.width(),
                frame.height(),
                self.size
            )));
        }
        let Some(frames) = &self.frames else {
            return Err(WidgetError::encoder("encoder worker already stopped"));
        };
        if frames.send((frame, delay)).await.is_err() {
            // The worker hung up early; its own result carries the reason.
            self.frames = None;
            return Err(match self.join().await {
                Err(e) => e,
                Ok(_) => WidgetError::encoder("encoder worker stopped before the last frame"),
            });
        }
        self.sent += 1;
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.sent
    }

    async fn finish(self: Box<Self>, progress: Option<ProgressCallback>) -> Result<Vec<u8>> {
        let mut encoder = *self;
        encoder.frames = None;
        let total = encoder.sent;
        if total == 0 {
            return Err(WidgetError::encoder("no frames to encode"));
        }
        while let Some(done) = encoder.encoded.recv().await {
            if let Some(progress) = &progress {
                progress(done as f32 / total as f32);
            }
        }
        encoder.join().await
    }
}

fn encode_gif(
    mut frames: mpsc::Receiver<(RgbaImage, Duration)>,
    quality: u8,
    abort: &AbortHandle,
    encoded: mpsc::UnboundedSender<usize>,
) -> Result<Vec<u8>> {
    let mut count = 0;
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, quality as i32);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| WidgetError::encoder(e.to_string()))?;
        while let Some((image, delay)) = frames.blocking_recv() {
            if abort.is_aborted() {
                debug!(encoded = count, "gif encoding aborted");
                return Err(WidgetError::EncoderAborted);
            }
            let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
            let frame = Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(millis, 1));
            encoder
                .encode_frame(frame)
                .map_err(|e| WidgetError::encoder(e.to_string()))?;
            count += 1;
            let _ = encoded.send(count);
        }
    }
    if abort.is_aborted() {
        debug!(encoded = count, "gif encoding aborted");
        return Err(WidgetError::EncoderAborted);
    }
    debug!(frames = count, bytes = bytes.len(), "gif encoded");
    Ok(bytes)
}

/// Produces [`GifFrameEncoder`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifEncoderFactory;

impl EncoderFactory for GifEncoderFactory {
    fn create(&self, size: CanvasSize, quality: u8) -> Result<Box<dyn FrameEncoder>> {
        if size.is_empty() {
            return Err(WidgetError::EncoderUnavailable(format!(
                "cannot encode a {size} animation"
            )));
        }
        Ok(Box::new(GifFrameEncoder::new(size, quality)?))
    }
}
