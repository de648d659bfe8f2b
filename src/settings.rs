use std::path::Path;
use std::time::Duration;

use tracing::debug;
use wixo_lib::{AvatarExportConfig, BannerExportConfig, Config, WidgetError};

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/wixo/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, WidgetError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        WidgetError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        WidgetError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Banner export settings with CLI overrides applied.
pub fn resolve_banner_settings(
    config: &BannerExportConfig,
    cli_frames: Option<u32>,
    cli_delay_ms: Option<u64>,
) -> Result<BannerExportConfig, WidgetError> {
    let resolved = BannerExportConfig {
        frame_count: cli_frames.unwrap_or(config.frame_count),
        frame_delay: cli_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(config.frame_delay),
        quality: config.quality,
    };
    if resolved.frame_count == 0 {
        return Err(WidgetError::config("--frames must be at least 1"));
    }
    Ok(resolved)
}

/// Avatar export settings with CLI overrides applied.
pub fn resolve_avatar_settings(
    config: &AvatarExportConfig,
    cli_video_base_url: Option<String>,
) -> AvatarExportConfig {
    AvatarExportConfig {
        video_base_url: cli_video_base_url.or_else(|| config.video_base_url.clone()),
        ..config.clone()
    }
}

/// Format effective config as a single-line string.
pub fn format_effective_config(config: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: banner={} frames x {}ms (quality {}), avatar fade={}/{} x {}ms, clip={}fps, composer: rotation_step={}, click_threshold={}px, drag_bounds={}, viewer timeouts: load={}s, wps={}s",
        config.banner.frame_count,
        config.banner.frame_delay.as_millis(),
        config.banner.quality,
        config.avatar.fade_in_frames,
        config.avatar.fade_frames,
        config.avatar.fade_delay.as_millis(),
        config.avatar.clip_fps,
        config.composer.rotation_step,
        config.composer.click_threshold,
        config
            .composer
            .drag_bounds
            .map(|b| format!("{b:?}").to_lowercase())
            .unwrap_or_else(|| "per-variant".to_string()),
        config.viewer.load_timeout.as_secs(),
        config.viewer.wps_load_timeout.as_secs(),
    )
}

/// Log effective config (verbose mode).
pub fn log_effective_config(config: &Config, config_source: Option<&Path>) {
    debug!("{}", format_effective_config(config, config_source));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn banner_settings_prefer_cli_when_present() {
        let cfg = BannerExportConfig::default();
        let resolved = resolve_banner_settings(&cfg, Some(12), Some(40)).unwrap();
        assert_eq!(resolved.frame_count, 12);
        assert_eq!(resolved.frame_delay, Duration::from_millis(40));
        assert_eq!(resolved.quality, cfg.quality);

        let resolved = resolve_banner_settings(&cfg, None, None).unwrap();
        assert_eq!(resolved.frame_count, 30);
        assert_eq!(resolved.frame_delay, Duration::from_millis(100));

        assert!(resolve_banner_settings(&cfg, Some(0), None).is_err());
    }

    #[test]
    fn avatar_video_base_falls_back_to_config() {
        let cfg = AvatarExportConfig {
            video_base_url: Some("https://cdn.example.com/".into()),
            ..AvatarExportConfig::default()
        };
        let resolved = resolve_avatar_settings(&cfg, None);
        assert_eq!(resolved.video_base_url.as_deref(), Some("https://cdn.example.com/"));

        let resolved = resolve_avatar_settings(&cfg, Some("https://other.example.com/".into()));
        assert_eq!(resolved.video_base_url.as_deref(), Some("https://other.example.com/"));
        assert_eq!(resolved.fade_frames, 40);
    }

    #[test]
    fn load_config_reports_invalid_files() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("wixo.toml");
        std::fs::write(&path, "[banner]\nframe_count = 0\n").expect("write config");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, WidgetError::Config(ref msg) if msg.starts_with("Invalid config (")));

        std::fs::write(&path, "[banner\n").expect("write config");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, WidgetError::Config(ref msg) if msg.starts_with("Failed to read config")));
    }

    #[test]
    fn format_effective_config_includes_key_fields() {
        let summary = format_effective_config(&Config::default(), Some(Path::new("wixo.toml")));
        assert!(summary.contains("banner=30 frames x 100ms"));
        assert!(summary.contains("avatar fade=20/40 x 50ms"));
        assert!(summary.contains("rotation_step=15"));
        assert!(summary.contains("drag_bounds=per-variant"));
        assert!(summary.contains("load=15s, wps=8s"));
        assert!(summary.contains("wixo.toml"));
    }
}
