use std::path::{Path, PathBuf};
use std::process::ExitCode;

use futures::future::join_all;
use tracing::{debug, info};
use wixo_lib::output::{EmbedOutput, ViewerOutput, WIXO_OUTPUT_VERSION};
use wixo_lib::viewer::{
    create_viewer, fetch_text_panel, FILE_TYPE_ATTR, FILE_URL_ATTR, HEIGHT_ATTR, MARKER_ATTR,
    TITLE_ATTR, WIDTH_ATTR,
};
use wixo_lib::{initialize_viewers, EmbedContent, EmbedPlan, Placeholder, WidgetError, WixoOutput};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, log_effective_config};

/// Placeholder attributes supplied as flags.
#[derive(Debug, Clone, Default)]
pub struct ViewerArgs {
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub title: Option<String>,
    pub placeholders: Option<PathBuf>,
    pub fetch_text: bool,
}

/// Run the viewer command.
pub async fn run_viewer(
    config_path: Option<PathBuf>,
    verbose: bool,
    args: ViewerArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let body = match build_viewer(config_path, verbose, args).await {
        Ok(body) => body,
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(WidgetError::Config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}

async fn build_viewer(
    config_path: Option<PathBuf>,
    verbose: bool,
    args: ViewerArgs,
) -> Result<WixoOutput, WidgetError> {
    let config = load_config(config_path.as_deref())?;
    if verbose {
        log_effective_config(&config, config_path.as_deref());
    }

    let plans = match (&args.placeholders, placeholder_from_flags(&args)) {
        (Some(path), _) => plans_from_file(path)?,
        (None, Some(mut placeholder)) => create_viewer(&mut placeholder)?.into_iter().collect(),
        (None, None) => {
            return Err(WidgetError::config(
                "Provide --file-url (data-file-url) or --placeholders",
            ))
        }
    };
    info!(embeds = plans.len(), "document embeds planned");

    let embeds = if args.fetch_text {
        let client = reqwest::Client::builder()
            .timeout(config.viewer.load_timeout)
            .build()?;
        join_all(plans.into_iter().map(|plan| with_text(&client, plan))).await
    } else {
        plans
            .into_iter()
            .map(|plan| EmbedOutput { plan, text: None })
            .collect()
    };

    Ok(WixoOutput::Viewer(ViewerOutput {
        version: WIXO_OUTPUT_VERSION.to_string(),
        embeds,
    }))
}

fn placeholder_from_flags(args: &ViewerArgs) -> Option<Placeholder> {
    let file_url = args.file_url.as_ref()?;
    let mut placeholder = Placeholder::new()
        .with_attr(MARKER_ATTR, "true")
        .with_attr(FILE_URL_ATTR, file_url);
    let optional = [
        (FILE_TYPE_ATTR, &args.file_type),
        (WIDTH_ATTR, &args.width),
        (HEIGHT_ATTR, &args.height),
        (TITLE_ATTR, &args.title),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            placeholder.set_attr(name, value);
        }
    }
    Some(placeholder)
}

fn plans_from_file(path: &Path) -> Result<Vec<EmbedPlan>, WidgetError> {
    let raw = std::fs::read_to_string(path)?;
    let mut placeholders: Vec<Placeholder> = serde_json::from_str(&raw).map_err(|e| {
        WidgetError::Config(format!("Invalid placeholders file {}: {}", path.display(), e))
    })?;
    debug!(count = placeholders.len(), "placeholders loaded");
    Ok(initialize_viewers(&mut placeholders))
}

async fn with_text(client: &reqwest::Client, plan: EmbedPlan) -> EmbedOutput {
    let text = match &plan.content {
        EmbedContent::Text { url } => Some(fetch_text_panel(client, url).await),
        _ => None,
    };
    EmbedOutput { plan, text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wixo_lib::FileType;

    #[test]
    fn flags_become_a_marked_placeholder() {
        let args = ViewerArgs {
            file_url: Some("https://example.com/report.pdf".into()),
            title: Some("Report".into()),
            ..ViewerArgs::default()
        };
        let placeholder = placeholder_from_flags(&args).expect("placeholder");
        assert!(placeholder.is_viewer());
        assert_eq!(placeholder.attr(TITLE_ATTR), Some("Report"));
        assert!(!placeholder.has_attr(WIDTH_ATTR));

        assert!(placeholder_from_flags(&ViewerArgs::default()).is_none());
    }

    #[tokio::test]
    async fn missing_file_url_is_a_config_error() {
        let err = build_viewer(None, false, ViewerArgs::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("data-file-url"));
    }

    #[test]
    fn placeholders_file_skips_broken_entries() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("placeholders.json");
        std::fs::write(
            &path,
            r#"[
                {"data-doc-viewer": "", "data-file-url": "/files/a.pdf"},
                {"data-doc-viewer": ""},
                {"class": "not-a-viewer", "data-file-url": "/files/b.docx"},
                {"data-doc-viewer": "", "data-file-url": "/files/c.md", "data-title": "Notes"}
            ]"#,
        )
        .expect("write placeholders");

        let plans = plans_from_file(&path).expect("plans");
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].request.file_type, FileType::Pdf);
        assert_eq!(plans[1].request.title, "Notes");
    }
}
