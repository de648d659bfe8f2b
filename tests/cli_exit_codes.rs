use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn wixo(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wixo"))
        .args(args)
        .env("XDG_CONFIG_HOME", home)
        .env("RUST_LOG", "off")
        .output()
        .expect("run wixo")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

#[test]
fn viewer_plans_office_document() {
    let dir = TempDir::new().expect("tempdir");
    let output = wixo(
        dir.path(),
        &["viewer", "--file-url", "https://example.com/files/plan.docx"],
    );
    assert_eq!(output.status.code(), Some(0));

    let body = stdout_json(&output);
    assert_eq!(body["mode"], "viewer");
    let embed = &body["embeds"][0];
    assert_eq!(embed["content"]["kind"], "chain");
    assert_eq!(embed["content"]["candidates"][0]["kind"], "google-docs");
}

#[test]
fn viewer_without_file_url_exits_with_error_payload() {
    let dir = TempDir::new().expect("tempdir");
    let output = wixo(dir.path(), &["viewer"]);
    assert_eq!(output.status.code(), Some(2));

    let body = stdout_json(&output);
    assert_eq!(body["mode"], "error");
    assert_eq!(body["error"]["category"], "config");
}

#[test]
fn invalid_config_file_exits_with_error() {
    let dir = TempDir::new().expect("tempdir");
    let cfg_path = dir.path().join("wixo.toml");
    std::fs::write(&cfg_path, "[banner]\nframe_count = 0\n").expect("write config");

    let output = wixo(
        dir.path(),
        &["banner", "--config", cfg_path.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(2));
    let body = stdout_json(&output);
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Invalid config"));
}

#[test]
fn banner_export_writes_gif() {
    let dir = TempDir::new().expect("tempdir");
    let save_dir = dir.path().join("out");

    let output = wixo(
        dir.path(),
        &[
            "banner",
            "--size",
            "48x32",
            "--background",
            "gradient",
            "--frames",
            "3",
            "--nickname",
            "stone",
            "--save-dir",
            save_dir.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(0));

    let body = stdout_json(&output);
    assert_eq!(body["mode"], "banner");
    assert_eq!(body["artifact"]["kind"], "gif");
    assert_eq!(body["artifact"]["frameCount"], 3);
    let saved = body["savedTo"].as_str().expect("saved path");
    let bytes = std::fs::read(saved).expect("read gif");
    assert!(bytes.starts_with(b"GIF89a"));
}

#[test]
fn avatar_without_nickname_fails() {
    let dir = TempDir::new().expect("tempdir");
    let output = wixo(dir.path(), &["avatar", "--character", "mita", "--no-clip"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)["mode"], "error");
}

#[test]
fn avatar_export_without_clip_uses_fade_frames() {
    let dir = TempDir::new().expect("tempdir");
    let cfg_path = dir.path().join("wixo.toml");
    std::fs::write(&cfg_path, "[avatar]\nfade_frames = 4\nfade_in_frames = 2\n")
        .expect("write config");

    let output = wixo(
        dir.path(),
        &[
            "avatar",
            "--config",
            cfg_path.to_str().unwrap(),
            "--character",
            "mita",
            "--nickname",
            "小明",
            "--no-clip",
        ],
    );
    assert_eq!(output.status.code(), Some(0));

    let body = stdout_json(&output);
    assert_eq!(body["mode"], "avatar");
    assert_eq!(body["character"], "mita");
    assert_eq!(body["artifact"]["frameCount"], 4);
    assert!(body["artifact"]["filename"]
        .as_str()
        .unwrap_or_default()
        .contains("mita"));
}

#[test]
fn banner_export_survives_unloadable_uploads() {
    let dir = TempDir::new().expect("tempdir");
    let bad_sticker = dir.path().join("bad.png");
    std::fs::write(&bad_sticker, b"not an image").expect("write sticker");

    let output = wixo(
        dir.path(),
        &[
            "banner",
            "--size",
            "48x32",
            "--frames",
            "1",
            "--nickname",
            "Alice",
            "--logo",
            "http://127.0.0.1:9/logo.png",
            "--background-image",
            "/nonexistent/background.png",
            "--sticker",
            bad_sticker.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(0));

    let body = stdout_json(&output);
    assert_eq!(body["mode"], "banner");
    assert_eq!(body["artifact"]["frameCount"], 1);
}
