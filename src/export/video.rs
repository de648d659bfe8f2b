//! Character clips: fetching `/mp4/<character>.mp4` and decoding frames.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;
use reqwest::header::CONTENT_TYPE;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, WidgetError};
use crate::image_loader::decode_image_bytes;

/// A seekable source of video frames.
#[async_trait]
pub trait VideoClip: Send {
    fn duration(&self) -> Duration;

    /// Decodes the frame shown at `at`.
    async fn frame_at(&mut self, at: Duration) -> Result<RgbaImage>;
}

/// A downloaded clip, not yet decoded.
#[derive(Debug, Clone)]
pub struct CharacterClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Builds `{base}/mp4/{character}.mp4`, percent-encoding the character name.
pub fn character_clip_url(base: &Url, character: &str) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push("mp4")
        .push(&format!("{character}.mp4"));
    Some(url)
}

/// Fetches the clip for `character`. Any failure means "no clip".
pub async fn load_character_clip(
    client: &reqwest::Client,
    base: &Url,
    character: &str,
) -> Option<CharacterClip> {
    let url = character_clip_url(base, character)?;
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "character clip request failed");
            return None;
        }
    };
    if !response.status().is_success() {
        debug!(%url, status = %response.status(), "no character clip");
        return None;
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.starts_with("video/") {
        debug!(%url, %content_type, "character clip is not a video");
        return None;
    }
    match response.bytes().await {
        Ok(bytes) => Some(CharacterClip {
            bytes: bytes.to_vec(),
            content_type,
        }),
        Err(e) => {
            warn!(%url, error = %e, "character clip download failed");
            None
        }
    }
}

/// Decodes frames by shelling out to `ffprobe` and `ffmpeg`.
///
/// The clip is written to a temporary file that is removed on drop.
pub struct FfmpegClip {
    file: NamedTempFile,
    duration: Duration,
    ffmpeg: PathBuf,
}

impl FfmpegClip {
    pub async fn open(clip: &CharacterClip) -> Result<Self> {
        let file = tempfile::Builder::new().suffix(".mp4").tempfile()?;
        tokio::fs::write(file.path(), &clip.bytes).await?;

        let output = Command::new("ffprobe")
            .args(["-v", "error", "-show_entries", "format=duration", "-of"])
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(file.path())
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(WidgetError::Unknown(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let duration = parse_clip_duration(&String::from_utf8_lossy(&output.stdout))?;
        debug!(seconds = duration.as_secs_f64(), "character clip opened");

        Ok(Self {
            file,
            duration,
            ffmpeg: PathBuf::from("ffmpeg"),
        })
    }
}

/// Parses the `format=duration` line printed by `ffprobe`. Negative values clamp to zero.
fn parse_clip_duration(stdout: &str) -> Result<Duration> {
    let seconds: f64 = stdout
        .trim()
        .parse()
        .map_err(|_| WidgetError::Unknown("ffprobe reported no duration".into()))?;
    if !seconds.is_finite() {
        return Err(WidgetError::Unknown(format!(
            "ffprobe reported an unusable duration: {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds.max(0.0))
        .map_err(|e| WidgetError::Unknown(format!("ffprobe reported an unusable duration: {e}")))
}

#[async_trait]
impl VideoClip for FfmpegClip {
    fn duration(&self) -> Duration {
        self.duration
    }

    async fn frame_at(&mut self, at: Duration) -> Result<RgbaImage> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss"])
            .arg(format!("{:.3}", at.as_secs_f64()))
            .arg("-i")
            .arg(self.file.path())
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() || output.stdout.is_empty() {
            return Err(WidgetError::Unknown(format!(
                "ffmpeg could not decode the frame at {:.3}s",
                at.as_secs_f64()
            )));
        }
        Ok(decode_image_bytes(&output.stdout)?.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_url_is_built_under_mp4() {
        let base = Url::parse("https://example.com/").unwrap();
        let url = character_clip_url(&base, "mita").unwrap();
        assert_eq!(url.as_str(), "https://example.com/mp4/mita.mp4");

        let nested = Url::parse("https://cdn.example.com/assets/").unwrap();
        let url = character_clip_url(&nested, "米塔 #1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://cdn.example.com/assets/mp4/%E7%B1%B3%E5%A1%94%20%231.mp4"
        );
    }

    #[test]
    fn clip_duration_rejects_non_finite_values() {
        assert_eq!(
            parse_clip_duration("2.500000\n").unwrap(),
            Duration::from_millis(2500)
        );
        assert_eq!(parse_clip_duration("-0.1").unwrap(), Duration::ZERO);
        for output in ["inf", "-inf", "NaN", "1e400", "N/A", ""] {
            assert!(
                parse_clip_duration(output).is_err(),
                "expected {output:?} to be rejected"
            );
        }
    }

    #[test]
    fn cannot_be_a_base_urls_are_rejected() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(character_clip_url(&base, "mita").is_none());
    }
}
