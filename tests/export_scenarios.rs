use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wixo_lib::{
    export_avatar, export_banner, load_character_clip, ArtifactKind, AvatarExportConfig,
    BackgroundPreset, BannerExportConfig, CanvasSize, ColorSpec, ComposerConfig, EncoderFactory,
    ExportContext, FontBook, FrameEncoder, LayerId, ProgressCallback, Rgba8, SceneComposer,
    StatusCallback, Variant, VideoClip, WidgetError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Finish {
    Ok,
    Fail,
    Abort,
}

/// Records every frame it is handed instead of encoding.
#[derive(Clone)]
struct RecordingFactory {
    frames: Arc<Mutex<Vec<(u32, u32, Duration)>>>,
    finish: Finish,
}

impl RecordingFactory {
    fn new(finish: Finish) -> Self {
        Self {
            frames: Arc::default(),
            finish,
        }
    }

    fn delays(&self) -> Vec<Duration> {
        self.frames.lock().unwrap().iter().map(|f| f.2).collect()
    }
}

struct RecordingEncoder {
    frames: Arc<Mutex<Vec<(u32, u32, Duration)>>>,
    finish: Finish,
}

#[async_trait]
impl FrameEncoder for RecordingEncoder {
    async fn add_frame(&mut self, frame: RgbaImage, delay: Duration) -> wixo_lib::Result<()> {
        self.frames
            .lock()
            .unwrap()
            .push((frame.width(), frame.height(), delay));
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    async fn finish(
        self: Box<Self>,
        progress: Option<ProgressCallback>,
    ) -> wixo_lib::Result<Vec<u8>> {
        match self.finish {
            Finish::Ok => {
                if let Some(progress) = progress {
                    progress(1.0);
                }
                Ok(b"GIF89a-recorded".to_vec())
            }
            Finish::Fail => Err(WidgetError::encoder("palette overflow")),
            Finish::Abort => Err(WidgetError::EncoderAborted),
        }
    }
}

impl EncoderFactory for RecordingFactory {
    fn create(&self, _size: CanvasSize, _quality: u8) -> wixo_lib::Result<Box<dyn FrameEncoder>> {
        Ok(Box::new(RecordingEncoder {
            frames: self.frames.clone(),
            finish: self.finish,
        }))
    }
}

/// Keeps the pixels of every frame it is handed.
#[derive(Clone, Default)]
struct PixelFactory {
    frames: Arc<Mutex<Vec<RgbaImage>>>,
}

struct PixelEncoder {
    frames: Arc<Mutex<Vec<RgbaImage>>>,
}

#[async_trait]
impl FrameEncoder for PixelEncoder {
    async fn add_frame(&mut self, frame: RgbaImage, _delay: Duration) -> wixo_lib::Result<()> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }

    fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    async fn finish(
        self: Box<Self>,
        _progress: Option<ProgressCallback>,
    ) -> wixo_lib::Result<Vec<u8>> {
        Ok(b"GIF89a-pixels".to_vec())
    }
}

impl EncoderFactory for PixelFactory {
    fn create(&self, _size: CanvasSize, _quality: u8) -> wixo_lib::Result<Box<dyn FrameEncoder>> {
        Ok(Box::new(PixelEncoder {
            frames: self.frames.clone(),
        }))
    }
}

/// A clip of solid frames; `broken` seek positions fail.
struct FakeClip {
    duration: Duration,
    broken: Vec<Duration>,
}

#[async_trait]
impl VideoClip for FakeClip {
    fn duration(&self) -> Duration {
        self.duration
    }

    async fn frame_at(&mut self, at: Duration) -> wixo_lib::Result<RgbaImage> {
        if self.broken.contains(&at) {
            return Err(WidgetError::Unknown("corrupt frame".into()));
        }
        Ok(RgbaImage::from_pixel(16, 9, image::Rgba([0, 0, 0, 255])))
    }
}

fn avatar() -> SceneComposer {
    let mut composer =
        SceneComposer::for_variant(Variant::Avatar, &ComposerConfig::default()).unwrap();
    composer.set_nickname("Neo");
    composer
}

fn short_avatar_config() -> AvatarExportConfig {
    AvatarExportConfig {
        fade_frames: 4,
        fade_in_frames: 2,
        clip_fps: 10,
        ..AvatarExportConfig::default()
    }
}

#[tokio::test]
async fn banner_export_renders_configured_frames() {
    let fonts = FontBook::empty();
    let factory = RecordingFactory::new(Finish::Ok);
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: None,
    };
    let composer = SceneComposer::new(
        Variant::Banner,
        CanvasSize::new(60, 40),
        &ComposerConfig::default(),
    )
    .unwrap();
    let config = BannerExportConfig {
        frame_count: 3,
        frame_delay: Duration::from_millis(70),
        ..BannerExportConfig::default()
    };

    let artifact = export_banner(&composer, &config, &ctx).await.unwrap();
    assert_eq!(artifact.kind, ArtifactKind::Gif);
    assert_eq!(artifact.frame_count, 3);
    assert!(artifact.filename.starts_with("banner_60x40_"));
    assert_eq!(factory.delays(), vec![Duration::from_millis(70); 3]);
    assert!(factory
        .frames
        .lock()
        .unwrap()
        .iter()
        .all(|(w, h, _)| (*w, *h) == (60, 40)));
}

#[tokio::test]
async fn default_banner_export_has_thirty_full_size_frames() {
    let fonts = FontBook::empty();
    let factory = RecordingFactory::new(Finish::Ok);
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: None,
    };
    let mut composer =
        SceneComposer::for_variant(Variant::Banner, &ComposerConfig::default()).unwrap();
    composer.set_background_preset(BackgroundPreset::Gradient);
    composer.set_nickname("Alice");

    let artifact = export_banner(&composer, &BannerExportConfig::default(), &ctx)
        .await
        .unwrap();
    assert_eq!(artifact.frame_count, 30);
    assert!(artifact.filename.starts_with("banner_banner_"));
    let frames = factory.frames.lock().unwrap();
    assert!(frames
        .iter()
        .all(|f| *f == (1067, 300, Duration::from_millis(100))));
}

#[tokio::test]
async fn banner_gradient_rotates_under_a_still_nickname() {
    let fonts = FontBook::empty();
    let factory = PixelFactory::default();
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: None,
    };
    // No rainbow stop mix yields this color, so it only comes from the text fill.
    let ink = image::Rgba([1, 2, 3, 255]);
    let mut composer =
        SceneComposer::for_variant(Variant::Banner, &ComposerConfig::default()).unwrap();
    composer.set_background_preset(BackgroundPreset::Gradient);
    composer.set_nickname("Alice");
    composer.set_nickname_color(ColorSpec::solid(Rgba8::rgb(1, 2, 3)));

    export_banner(&composer, &BannerExportConfig::default(), &ctx)
        .await
        .unwrap();
    let frames = factory.frames.lock().unwrap();
    assert_eq!(frames.len(), 30);

    let nickname = composer.layer(LayerId::Nickname).unwrap().hit_box();
    let in_nickname = |x: u32, y: u32| {
        let (x, y) = (x as f32, y as f32);
        x >= nickname.x
            && x < nickname.x + nickname.width
            && y >= nickname.y
            && y < nickname.y + nickname.height
    };
    let ink_pixels = |frame: &RgbaImage| -> Vec<(u32, u32)> {
        frame
            .enumerate_pixels()
            .filter(|(x, y, pixel)| in_nickname(*x, *y) && **pixel == ink)
            .map(|(x, y, _)| (x, y))
            .collect()
    };

    let first_ink = ink_pixels(&frames[0]);
    assert!(!first_ink.is_empty(), "nickname left no solid pixels");
    for frame in frames.iter().skip(1) {
        assert_eq!(ink_pixels(frame), first_ink);
    }

    let (first, later) = (&frames[0], &frames[7]);
    let mut outside = 0usize;
    let mut changed = 0usize;
    for (x, y, pixel) in first.enumerate_pixels() {
        if in_nickname(x, y) {
            continue;
        }
        outside += 1;
        if later.get_pixel(x, y) != pixel {
            changed += 1;
        }
    }
    assert!(
        changed * 4 > outside,
        "gradient barely moved: {changed} of {outside} background pixels changed"
    );
}

#[tokio::test]
async fn avatar_export_prepends_clip_frames() {
    let fonts = FontBook::empty();
    let factory = RecordingFactory::new(Finish::Ok);
    let statuses = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = statuses.clone();
    let status: StatusCallback = Arc::new(move |message: &str| {
        sink.lock().unwrap().push(message.to_string());
    });
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: Some(status),
    };
    let mut clip = FakeClip {
        duration: Duration::from_millis(300),
        broken: vec![Duration::from_millis(100)],
    };

    let artifact = export_avatar(
        &avatar(),
        "mita",
        Some(&mut clip),
        &short_avatar_config(),
        &ctx,
    )
    .await
    .unwrap();

    // 3 clip samples, one corrupt, then the fade.
    assert_eq!(artifact.frame_count, 6);
    let delays = factory.delays();
    assert_eq!(&delays[..2], &[Duration::from_millis(100); 2]);
    assert_eq!(&delays[2..], &[Duration::from_millis(50); 4]);
    assert!(artifact.filename.starts_with("lstation_Neo_mita_"));
    assert!(artifact.filename.ends_with(".gif"));
    assert!(statuses
        .lock()
        .unwrap()
        .iter()
        .any(|s| s == "rendering character clip"));
}

#[tokio::test]
async fn avatar_encoder_failure_falls_back_to_png() {
    let fonts = FontBook::empty();
    let factory = RecordingFactory::new(Finish::Fail);
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: None,
    };

    let artifact = export_avatar(&avatar(), "mita", None, &short_avatar_config(), &ctx)
        .await
        .unwrap();
    assert_eq!(artifact.kind, ArtifactKind::Png);
    assert_eq!(artifact.frame_count, 1);
    assert!(artifact.filename.ends_with(".png"));
    assert!(artifact.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn aborted_avatar_export_is_an_error() {
    let fonts = FontBook::empty();
    let factory = RecordingFactory::new(Finish::Abort);
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: None,
    };

    let err = export_avatar(&avatar(), "mita", None, &short_avatar_config(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WidgetError::EncoderAborted));
}

#[tokio::test]
async fn avatar_export_requires_nickname_and_character() {
    let fonts = FontBook::empty();
    let factory = RecordingFactory::new(Finish::Ok);
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &factory,
        progress: None,
        status: None,
    };
    let unnamed = SceneComposer::for_variant(Variant::Avatar, &ComposerConfig::default()).unwrap();

    let err = export_avatar(&unnamed, "mita", None, &short_avatar_config(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WidgetError::Config(_)));
    let err = export_avatar(&avatar(), "  ", None, &short_avatar_config(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WidgetError::Config(_)));
    assert!(factory.delays().is_empty());
}

/// Serves one canned HTTP response per connection.
async fn serve(status: &'static str, content_type: &'static str, body: &'static [u8]) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body).await;
            let _ = socket.shutdown().await;
        }
    });
    Url::parse(&format!("http://{addr}/assets/")).unwrap()
}

#[tokio::test]
async fn missing_character_clip_means_no_clip() {
    let base = serve("404 Not Found", "text/html", b"nope").await;
    let client = reqwest::Client::new();
    assert!(load_character_clip(&client, &base, "mita").await.is_none());
}

#[tokio::test]
async fn non_video_response_is_not_a_clip() {
    let base = serve("200 OK", "text/html", b"<html></html>").await;
    let client = reqwest::Client::new();
    assert!(load_character_clip(&client, &base, "mita").await.is_none());
}

#[tokio::test]
async fn video_response_is_downloaded() {
    let base = serve("200 OK", "video/mp4", b"\x00\x00\x00\x18ftypmp42").await;
    let client = reqwest::Client::new();
    let clip = load_character_clip(&client, &base, "mita")
        .await
        .expect("clip");
    assert_eq!(clip.content_type, "video/mp4");
    assert_eq!(clip.bytes, b"\x00\x00\x00\x18ftypmp42");
}
