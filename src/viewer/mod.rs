//! Document embed viewer.
//!
//! Placeholders carrying `data-doc-viewer` are turned into an [`EmbedPlan`]:
//! a collapsible titled container plus the content that fills it.
//!
//! # Module Structure
//!
//! - [`candidates`] - Ranked third-party preview services per file
//! - [`machine`] - Fallback state machine over the candidate chain
//! - [`extract`] - Best-effort chrome stripping for WPS-hosted frames
//! - [`text`] - Plain-text panel fetch

pub mod candidates;
pub mod extract;
pub mod machine;
pub mod text;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Result, WidgetError};

pub use candidates::{rank_viewers, wps_viewer_url, OfficeKind, ViewerCandidate, ViewerKind};
pub use extract::{
    strip_chrome, ChromeStripper, ContentExtractor, CrossOrigin, ExtractionOutcome, FrameDocument,
    FrameMessage, StripReport,
};
pub use machine::{FrameEvent, FrameLoader, ViewerMachine, ViewerState};
pub use text::{fetch_text_panel, TextPanel};

pub const MARKER_ATTR: &str = "data-doc-viewer";
pub const INITIALIZED_ATTR: &str = "data-doc-viewer-initialized";
pub const FILE_URL_ATTR: &str = "data-file-url";
pub const FILE_TYPE_ATTR: &str = "data-file-type";
pub const WIDTH_ATTR: &str = "data-width";
pub const HEIGHT_ATTR: &str = "data-height";
pub const TITLE_ATTR: &str = "data-title";

pub const DEFAULT_WIDTH: &str = "100%";
pub const DEFAULT_HEIGHT: &str = "600px";
pub const DEFAULT_TITLE: &str = "文档预览";

/// Height of the container's title bar in CSS pixels.
pub const TITLE_BAR_HEIGHT: u32 = 45;

/// An element in the host page, reduced to its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placeholder {
    attributes: BTreeMap<String, String>,
}

impl Placeholder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Attribute value, treating an empty string as absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn is_viewer(&self) -> bool {
        self.has_attr(MARKER_ATTR)
    }

    pub fn is_initialized(&self) -> bool {
        self.has_attr(INITIALIZED_ATTR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Xls,
    Xlsx,
    Ppt,
    Pptx,
    Txt,
    Other,
    Unknown,
}

impl FileType {
    /// Maps a declared type or extension, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "doc" => FileType::Doc,
            "docx" => FileType::Docx,
            "xls" => FileType::Xls,
            "xlsx" => FileType::Xlsx,
            "ppt" => FileType::Ppt,
            "pptx" => FileType::Pptx,
            "txt" => FileType::Txt,
            "other" => FileType::Other,
            _ => FileType::Unknown,
        }
    }

    /// Derives the type from the extension of the URL's path. Query string and
    /// fragment are ignored.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let last_segment = path.rsplit('/').next().unwrap_or_default();
        match last_segment.rsplit_once('.') {
            Some((_, extension)) => Self::from_name(extension),
            None => FileType::Unknown,
        }
    }

    pub fn office_kind(self) -> Option<OfficeKind> {
        match self {
            FileType::Doc | FileType::Docx => Some(OfficeKind::Word),
            FileType::Xls | FileType::Xlsx => Some(OfficeKind::Excel),
            FileType::Ppt | FileType::Pptx => Some(OfficeKind::PowerPoint),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Doc => "doc",
            FileType::Docx => "docx",
            FileType::Xls => "xls",
            FileType::Xlsx => "xlsx",
            FileType::Ppt => "ppt",
            FileType::Pptx => "pptx",
            FileType::Txt => "txt",
            FileType::Other => "other",
            FileType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated placeholder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub file_url: String,
    pub file_type: FileType,
    pub width: String,
    pub height: String,
    pub title: String,
}

impl EmbedRequest {
    pub fn new(file_url: impl Into<String>) -> Self {
        let file_url = file_url.into();
        Self {
            file_type: FileType::from_url(&file_url),
            file_url,
            width: DEFAULT_WIDTH.to_string(),
            height: DEFAULT_HEIGHT.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Reads the attribute contract off `placeholder`.
    pub fn from_placeholder(placeholder: &Placeholder) -> Result<Self> {
        let file_url = placeholder
            .attr(FILE_URL_ATTR)
            .ok_or_else(|| WidgetError::config("Document viewer placeholder has no data-file-url"))?;
        let file_type = placeholder
            .attr(FILE_TYPE_ATTR)
            .map(FileType::from_name)
            .unwrap_or_else(|| FileType::from_url(file_url));
        Ok(Self {
            file_url: file_url.to_string(),
            file_type,
            width: placeholder.attr(WIDTH_ATTR).unwrap_or(DEFAULT_WIDTH).to_string(),
            height: placeholder.attr(HEIGHT_ATTR).unwrap_or(DEFAULT_HEIGHT).to_string(),
            title: placeholder.attr(TITLE_ATTR).unwrap_or(DEFAULT_TITLE).to_string(),
        })
    }

    /// Writes the request back as placeholder attributes.
    pub fn to_placeholder(&self) -> Placeholder {
        Placeholder::new()
            .with_attr(MARKER_ATTR, "true")
            .with_attr(FILE_URL_ATTR, &self.file_url)
            .with_attr(FILE_TYPE_ATTR, self.file_type.name())
            .with_attr(WIDTH_ATTR, &self.width)
            .with_attr(HEIGHT_ATTR, &self.height)
            .with_attr(TITLE_ATTR, &self.title)
    }
}

/// The titled, collapsible box around an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerContainer {
    pub width: String,
    pub height: String,
    pub title: String,
    pub download_url: String,
    /// `false` for title-only containers, which never expand.
    pub toggleable: bool,
    pub collapsed: bool,
}

impl ViewerContainer {
    pub fn new(request: &EmbedRequest) -> Self {
        Self {
            width: request.width.clone(),
            height: request.height.clone(),
            title: request.title.clone(),
            download_url: request.file_url.clone(),
            toggleable: request.file_type != FileType::Other,
            collapsed: true,
        }
    }

    /// Flips collapsed state; returns whether the container is now collapsed.
    pub fn toggle(&mut self) -> bool {
        if self.toggleable {
            self.collapsed = !self.collapsed;
        }
        self.collapsed
    }

    /// CSS height of the whole container.
    pub fn container_height(&self) -> String {
        if self.collapsed {
            format!("{TITLE_BAR_HEIGHT}px")
        } else {
            self.height.clone()
        }
    }

    /// CSS height of the content area below the title bar.
    pub fn content_height(&self) -> String {
        if self.collapsed {
            "0".to_string()
        } else {
            content_area_height(&self.height)
        }
    }

    /// `▶` when collapsed, `▼` when expanded, nothing for title-only containers.
    pub fn toggle_glyph(&self) -> Option<&'static str> {
        match (self.toggleable, self.collapsed) {
            (false, _) => None,
            (true, true) => Some("▶"),
            (true, false) => Some("▼"),
        }
    }
}

pub fn content_area_height(height: &str) -> String {
    format!("calc({height} - {TITLE_BAR_HEIGHT}px)")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EmbedContent {
    /// The file itself in a frame.
    Frame { url: String },
    /// Preview services, tried in order.
    Chain { candidates: Vec<ViewerCandidate> },
    /// Text fetched and shown verbatim.
    Text { url: String },
    /// Title bar and download button only.
    TitleOnly,
    /// No preview: a download link replaces the container.
    Download { url: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedPlan {
    pub request: EmbedRequest,
    /// Absent when the content is a bare download link.
    pub container: Option<ViewerContainer>,
    pub content: EmbedContent,
}

/// Chooses how `request` is displayed.
pub fn plan_embed(request: EmbedRequest) -> Result<EmbedPlan> {
    let content = match request.file_type {
        FileType::Pdf => EmbedContent::Frame {
            url: request.file_url.clone(),
        },
        FileType::Txt => EmbedContent::Text {
            url: request.file_url.clone(),
        },
        FileType::Other => EmbedContent::TitleOnly,
        FileType::Unknown => EmbedContent::Download {
            url: request.file_url.clone(),
            label: format!("下载 {}", request.title),
        },
        office => EmbedContent::Chain {
            candidates: rank_viewers(&request.file_url, office)?,
        },
    };
    let container = match content {
        EmbedContent::Download { .. } => None,
        _ => Some(ViewerContainer::new(&request)),
    };
    Ok(EmbedPlan {
        request,
        container,
        content,
    })
}

/// Initializes one placeholder. Returns `Ok(None)` when it was already
/// initialized; the placeholder is marked before validation, so a bad one is
/// not retried either.
pub fn create_viewer(placeholder: &mut Placeholder) -> Result<Option<EmbedPlan>> {
    if placeholder.is_initialized() {
        return Ok(None);
    }
    placeholder.set_attr(INITIALIZED_ATTR, "true");
    let request = EmbedRequest::from_placeholder(placeholder)?;
    debug!(url = %request.file_url, file_type = %request.file_type, "planning document embed");
    plan_embed(request).map(Some)
}

/// Scans `placeholders` for viewer markers. Each one fails independently:
/// errors are logged and the placeholder is skipped.
pub fn initialize_viewers(placeholders: &mut [Placeholder]) -> Vec<EmbedPlan> {
    placeholders
        .iter_mut()
        .filter(|p| p.is_viewer())
        .filter_map(|p| match create_viewer(p) {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "document viewer not created");
                None
            }
        })
        .collect()
}
