use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wixo_lib::output::{ExportOutput, WIXO_OUTPUT_VERSION};
use wixo_lib::viewer::TextPanel;
use wixo_lib::{EmbedContent, ErrorOutput, WidgetError, WixoOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &WixoOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: WidgetError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = WixoOutput::Error(ErrorOutput {
        version: WIXO_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(body: &WixoOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &WixoOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &WixoOutput, colorize: bool) -> String {
    match body {
        WixoOutput::Banner(out) => format_export("[BANNER]", "36", out, colorize),
        WixoOutput::Avatar(out) => format_export("[AVATAR]", "35", out, colorize),
        WixoOutput::Viewer(out) => {
            let mut buf = String::new();
            let header = color("[VIEWER]", "34", colorize);
            writeln!(buf, "{} {} embed(s)", header, out.embeds.len()).ok();
            for embed in &out.embeds {
                let request = &embed.plan.request;
                writeln!(
                    buf,
                    "- {} ({}, {}x{}): {}",
                    request.title, request.file_type, request.width, request.height, request.file_url
                )
                .ok();
                match &embed.plan.content {
                    EmbedContent::Frame { url } => {
                        writeln!(buf, "    frame {url}").ok();
                    }
                    EmbedContent::Chain { candidates } => {
                        for (index, candidate) in candidates.iter().enumerate() {
                            writeln!(buf, "    {}. {:18} {}", index + 1, candidate.name, candidate.url).ok();
                        }
                    }
                    EmbedContent::Text { url } => {
                        writeln!(buf, "    text {url}").ok();
                    }
                    EmbedContent::TitleOnly => {
                        writeln!(buf, "    title bar only").ok();
                    }
                    EmbedContent::Download { label, .. } => {
                        writeln!(buf, "    {}", color(label, "33", colorize)).ok();
                    }
                }
                if let Some(TextPanel::Failed(message)) = &embed.text {
                    writeln!(buf, "    {}", color(message, "31", colorize)).ok();
                }
            }
            buf
        }
        WixoOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn format_export(tag: &str, code: &str, out: &ExportOutput, colorize: bool) -> String {
    let mut buf = String::new();
    let header = color(tag, code, colorize);
    writeln!(
        buf,
        "{} {} ({} frames, {} bytes)",
        header, out.artifact.filename, out.artifact.frame_count, out.artifact.bytes
    )
    .ok();
    writeln!(buf, "Canvas: {} / background {}", out.size, out.background.name()).ok();
    if let Some(character) = &out.character {
        writeln!(buf, "Character: {character}").ok();
    }
    if !out.layers.is_empty() {
        writeln!(buf, "Layers:").ok();
        for layer in &out.layers {
            let marker = if out.selected == Some(layer.id) { "*" } else { "-" };
            writeln!(
                buf,
                "{} {:12} at ({:.1}, {:.1}) scale {:.2} rotation {:.0}",
                marker,
                layer.id.to_string(),
                layer.x,
                layer.y,
                layer.scale,
                layer.rotation
            )
            .ok();
        }
    }
    if let Some(path) = &out.saved_to {
        writeln!(buf, "Saved: {}", color(&path.display().to_string(), "32", colorize)).ok();
    }
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wixo_lib::output::{ArtifactSummary, EmbedOutput, LayerSummary, ViewerOutput};
    use wixo_lib::{
        plan_embed, ArtifactKind, BackgroundPreset, CanvasSize, EmbedRequest, LayerId, Variant,
    };

    #[test]
    fn render_error_always_returns_fatal_exit_code() {
        let code = render_error(
            WidgetError::Config("boom".to_string()),
            OutputFormat::Json,
            None,
        );
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn format_pretty_includes_artifact_and_layers() {
        let output = WixoOutput::Banner(ExportOutput {
            version: WIXO_OUTPUT_VERSION.to_string(),
            variant: Variant::Banner,
            size: CanvasSize::new(600, 400),
            background: BackgroundPreset::Matrix,
            character: None,
            artifact: ArtifactSummary {
                kind: ArtifactKind::Gif,
                filename: "banner_card_1.gif".into(),
                frame_count: 30,
                bytes: 2048,
            },
            saved_to: Some(PathBuf::from("/tmp/out/banner_card_1.gif")),
            layers: vec![
                LayerSummary {
                    id: LayerId::Logo,
                    x: 10.0,
                    y: 20.0,
                    scale: 0.8,
                    rotation: 0.0,
                },
                LayerSummary {
                    id: LayerId::Nickname,
                    x: 300.0,
                    y: 200.0,
                    scale: 1.0,
                    rotation: 15.0,
                },
            ],
            selected: Some(LayerId::Nickname),
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[BANNER] banner_card_1.gif (30 frames, 2048 bytes)"));
        assert!(pretty.contains("Canvas: 600x400 / background matrix"));
        assert!(pretty.contains("- logo"));
        assert!(pretty.contains("* nickname"));
        assert!(pretty.contains("Saved: /tmp/out/banner_card_1.gif"));
    }

    #[test]
    fn format_pretty_lists_viewer_candidates() {
        let output = WixoOutput::Viewer(ViewerOutput {
            version: WIXO_OUTPUT_VERSION.to_string(),
            embeds: vec![EmbedOutput {
                plan: plan_embed(EmbedRequest::new("https://docs.qq.com/doc/a.docx")).unwrap(),
                text: None,
            }],
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[VIEWER] 1 embed(s)"));
        assert!(pretty.contains("1. 腾讯文档"));
        assert!(pretty.contains("2. Google Docs"));
    }

    #[test]
    fn format_pretty_handles_errors() {
        let output = WixoOutput::Error(ErrorOutput {
            version: WIXO_OUTPUT_VERSION.to_string(),
            message: Some("bad input".to_string()),
            error: wixo_lib::error::ErrorPayload {
                category: wixo_lib::error::ErrorCategory::Config,
                message: "bad input".to_string(),
                remediation: Some("check flags".to_string()),
            },
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[ERROR] bad input"));
        assert!(pretty.contains("Hint: check flags"));
    }
}
