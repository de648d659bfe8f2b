use serde::{Deserialize, Serialize};
use tracing::warn;

/// Contents of a plain-text panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "lowercase")]
pub enum TextPanel {
    Loaded(String),
    /// The message shown in place of the text.
    Failed(String),
}

impl TextPanel {
    pub fn body(&self) -> &str {
        match self {
            TextPanel::Loaded(text) | TextPanel::Failed(text) => text,
        }
    }
}

/// Fetches `url` for display. Failures become a message in the panel.
pub async fn fetch_text_panel(client: &reqwest::Client, url: &str) -> TextPanel {
    let result = async { client.get(url).send().await?.text().await }.await;
    match result {
        Ok(text) => TextPanel::Loaded(text),
        Err(e) => {
            warn!(%url, error = %e, "text file could not be loaded");
            TextPanel::Failed(format!("无法加载文本文件: {e}"))
        }
    }
}
