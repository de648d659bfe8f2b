use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for every widget, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub banner: BannerExportConfig,
    pub avatar: AvatarExportConfig,
    pub composer: ComposerConfig,
    pub fonts: FontConfig,
    pub logo: LogoConfig,
    pub viewer: ViewerTimeouts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerExportConfig {
    pub frame_count: u32,
    #[serde(with = "humantime_serde")]
    pub frame_delay: Duration,
    /// Encoder sampling factor, 1 (best) to 30 (fastest).
    pub quality: u8,
}

impl Default for BannerExportConfig {
    fn default() -> Self {
        Self {
            frame_count: 30,
            frame_delay: Duration::from_millis(100),
            quality: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarExportConfig {
    pub fade_frames: u32,
    pub fade_in_frames: u32,
    #[serde(with = "humantime_serde")]
    pub fade_delay: Duration,
    pub clip_fps: u32,
    #[serde(with = "humantime_serde")]
    pub clip_seek_timeout: Duration,
    pub quality: u8,
    /// Base URL the `/mp4/<character>.mp4` clips are fetched from.
    pub video_base_url: Option<String>,
}

impl Default for AvatarExportConfig {
    fn default() -> Self {
        Self {
            fade_frames: 40,
            fade_in_frames: 20,
            fade_delay: Duration::from_millis(50),
            clip_fps: 30,
            clip_seek_timeout: Duration::from_secs(1),
            quality: 15,
            video_base_url: None,
        }
    }
}

/// Whether dragged layers are kept inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragBounds {
    Unbounded,
    Canvas,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Degrees applied per rotate keystroke.
    pub rotation_step: f32,
    /// Pointer travel (px) below which a gesture counts as a click.
    pub click_threshold: f32,
    /// Unset means the generator's own policy: banner unbounded, avatar clamped.
    pub drag_bounds: Option<DragBounds>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            rotation_step: 15.0,
            click_threshold: 5.0,
            drag_bounds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Scan the platform font directories.
    pub system_fonts: bool,
    /// Extra directories scanned recursively for font files.
    pub dirs: Vec<PathBuf>,
    /// Font file used when a family cannot be found.
    pub default: Option<PathBuf>,
    /// Family name (as offered in the font picker) to font file.
    pub families: BTreeMap<String, PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            system_fonts: true,
            dirs: Vec::new(),
            default: None,
            families: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    /// Local path or http(s) URL of the logo image.
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerTimeouts {
    #[serde(with = "humantime_serde")]
    pub load_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub wps_load_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub post_message_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub sweep_duration: Duration,
}

impl Default for ViewerTimeouts {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(15),
            wps_load_timeout: Duration::from_secs(8),
            post_message_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(1),
            poll_attempts: 60,
            sweep_interval: Duration::from_secs(10),
            sweep_duration: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// `~/.config/wixo/config.toml`, honoring `XDG_CONFIG_HOME`.
    pub fn central_config_path() -> Option<PathBuf> {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(xdg).join("wixo").join("config.toml"));
        }
        std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(|home| PathBuf::from(home).join(".config").join("wixo").join("config.toml"))
    }

    /// Load from an explicit path, else the central config if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigLoadError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::central_config_path() {
            Some(central) if central.is_file() => Self::from_file(&central),
            _ => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.banner.frame_count == 0 {
            return Err("banner.frame_count must be at least 1".into());
        }
        if !(1..=30).contains(&self.banner.quality) || !(1..=30).contains(&self.avatar.quality) {
            return Err("encoder quality must be between 1 and 30".into());
        }
        if self.avatar.fade_frames == 0 {
            return Err("avatar.fade_frames must be at least 1".into());
        }
        if self.avatar.fade_in_frames > self.avatar.fade_frames {
            return Err(format!(
                "avatar.fade_in_frames ({}) cannot exceed avatar.fade_frames ({})",
                self.avatar.fade_in_frames, self.avatar.fade_frames
            ));
        }
        if self.avatar.clip_fps == 0 {
            return Err("avatar.clip_fps must be at least 1".into());
        }
        if !(self.composer.rotation_step.is_finite() && self.composer.rotation_step > 0.0) {
            return Err("composer.rotation_step must be a positive number of degrees".into());
        }
        if !(self.composer.click_threshold.is_finite() && self.composer.click_threshold >= 0.0) {
            return Err("composer.click_threshold must be non-negative".into());
        }
        if self.viewer.poll_interval.is_zero() || self.viewer.sweep_interval.is_zero() {
            return Err("viewer poll/sweep intervals must be non-zero".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.banner.frame_count, 30);
        assert_eq!(cfg.banner.frame_delay, Duration::from_millis(100));
        assert_eq!(cfg.avatar.fade_frames, 40);
        assert_eq!(cfg.avatar.fade_in_frames, 20);
        assert_eq!(cfg.avatar.fade_delay, Duration::from_millis(50));
        assert_eq!(cfg.avatar.clip_seek_timeout, Duration::from_secs(1));
        assert!((cfg.composer.rotation_step - 15.0).abs() < f32::EPSILON);
        assert!((cfg.composer.click_threshold - 5.0).abs() < f32::EPSILON);
        assert_eq!(cfg.composer.drag_bounds, None);
        assert_eq!(cfg.viewer.wps_load_timeout, Duration::from_secs(8));
        assert_eq!(cfg.viewer.sweep_duration, Duration::from_secs(1800));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn toml_overrides_are_partial() {
        let cfg: Config = toml::from_str(
            r#"
            [banner]
            frame_count = 12
            frame_delay = "80ms"

            [composer]
            rotation_step = 1.5
            drag_bounds = "canvas"

            [viewer]
            sweep_duration = "5m"
            "#,
        )
        .expect("parse config");

        assert_eq!(cfg.banner.frame_count, 12);
        assert_eq!(cfg.banner.frame_delay, Duration::from_millis(80));
        assert_eq!(cfg.banner.quality, 10);
        assert!((cfg.composer.rotation_step - 1.5).abs() < f32::EPSILON);
        assert_eq!(cfg.composer.drag_bounds, Some(DragBounds::Canvas));
        assert_eq!(cfg.viewer.sweep_duration, Duration::from_secs(300));
        assert_eq!(cfg.viewer.load_timeout, Duration::from_secs(15));
    }

    #[test]
    fn validate_rejects_long_fade_in() {
        let mut cfg = Config::default();
        cfg.avatar.fade_in_frames = 41;
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("fade_in_frames"), "got: {err}");
    }

    #[test]
    fn validate_rejects_non_positive_rotation_step() {
        let mut cfg = Config::default();
        cfg.composer.rotation_step = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("wixo.toml");
        std::fs::write(&path, "[avatar]\nvideo_base_url = \"https://cdn.example.com\"\n")
            .expect("write config");

        let cfg = Config::load(Some(&path)).expect("load config");
        assert_eq!(
            cfg.avatar.video_base_url.as_deref(),
            Some("https://cdn.example.com")
        );
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[banner\nframe_count = ").expect("write config");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigLoadError::Parse(_))
        ));
    }
}
