use crate::image_loader::ImageLoadError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GIF encoder error: {0}")]
    Encoder(String),

    #[error("GIF encoding was aborted")]
    EncoderAborted,

    #[error("GIF encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl WidgetError {
    pub fn config(message: impl Into<String>) -> Self {
        WidgetError::Config(message.into())
    }

    pub fn encoder(message: impl Into<String>) -> Self {
        WidgetError::Encoder(message.into())
    }

    /// True for resource failures a caller can degrade around, such as an
    /// upload that is missing, unreachable or undecodable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WidgetError::Network(_) | WidgetError::Image(_) | WidgetError::Io(_)
        )
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            WidgetError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the file exists; use an absolute path or run from the working directory.",
            ),
            WidgetError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            WidgetError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            WidgetError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify URL/format (e.g., https://example.com/files/report.docx).",
            ),
            WidgetError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify the uploaded image is readable (png, jpg, jpeg, webp, gif, bmp).",
            ),
            WidgetError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON/serialization inputs; run with --verbose for details.",
            ),
            WidgetError::Encoder(msg) => ErrorPayload::new(
                ErrorCategory::Encoder,
                msg.to_string(),
                "Generation failed; check the inputs and retry.",
            ),
            WidgetError::EncoderAborted => ErrorPayload::new(
                ErrorCategory::Encoder,
                self.to_string(),
                "Generation was interrupted; retry.",
            ),
            WidgetError::EncoderUnavailable(msg) => ErrorPayload::new(
                ErrorCategory::Encoder,
                msg.to_string(),
                "The GIF encoder could not be started; reload and retry.",
            ),
            WidgetError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("file url") || lower.contains("data-file-url") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set data-file-url on the placeholder (or pass --file-url).",
                    )
                } else if lower.contains("font") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Point [fonts] in the config at a readable .ttf/.otf file, or omit the entry to use installed fonts.",
                    )
                } else if lower.contains("canvas") || lower.contains("size") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a size preset (banner, card, avatar) or WIDTHxHEIGHT with non-zero dimensions.",
                    )
                } else if lower.contains("unsupported file extension") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a supported image type (png, jpg, jpeg, webp, gif, bmp).",
                    )
                } else if lower.contains("script") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Script lines are `down x,y`, `move x,y`, `up x,y`, `click x,y` or `key K`.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file (--config).",
                    )
                }
            }
            WidgetError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

impl From<ImageLoadError> for WidgetError {
    fn from(err: ImageLoadError) -> Self {
        match err {
            ImageLoadError::Load(e) => WidgetError::Image(e),
            ImageLoadError::NotFound(path) => WidgetError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )),
            ImageLoadError::DataUrl(msg) => WidgetError::Image(image::ImageError::Decoding(
                image::error::DecodingError::new(
                    image::error::ImageFormatHint::Unknown,
                    format!("Invalid data URL: {}", msg),
                ),
            )),
            ImageLoadError::Save(msg) => WidgetError::Io(std::io::Error::other(format!(
                "Failed to save image: {}",
                msg
            ))),
        }
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Image,
    Encoder,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_payload_includes_file_url_remediation() {
        let err = WidgetError::config("DocumentViewer: missing file URL");
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Config);
        let remediation = payload.remediation.unwrap_or_default();
        assert!(
            remediation.contains("data-file-url"),
            "expected remediation to mention data-file-url, got: {remediation}"
        );
    }

    #[test]
    fn config_payload_uses_default_remediation_for_other_messages() {
        let err = WidgetError::config("Some other config issue");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("Check flags/paths"),
            "expected default remediation for generic config errors"
        );
    }

    #[test]
    fn config_payload_includes_font_hint() {
        let err = WidgetError::config("font file /nope.ttf could not be parsed");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("[fonts]"),
            "expected font remediation, got: {remediation}"
        );
    }

    #[test]
    fn config_payload_includes_canvas_size_hint() {
        let err = WidgetError::config("canvas size must be non-zero");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("banner") && remediation.contains("WIDTHxHEIGHT"),
            "expected size remediation, got: {remediation}"
        );
    }

    #[test]
    fn encoder_errors_ask_for_retry() {
        for err in [
            WidgetError::encoder("palette overflow"),
            WidgetError::EncoderAborted,
            WidgetError::EncoderUnavailable("worker failed to start".into()),
        ] {
            let payload = err.to_payload();
            assert_eq!(payload.category, ErrorCategory::Encoder);
            let remediation = payload.remediation.unwrap_or_default();
            assert!(
                remediation.to_ascii_lowercase().contains("retry"),
                "expected retry remediation, got: {remediation}"
            );
        }
    }

    #[test]
    fn image_load_not_found_keeps_path_hint() {
        let err: WidgetError = ImageLoadError::NotFound("missing.png".into()).into();
        assert!(matches!(err, WidgetError::Io(ref e) if e.to_string().contains("missing.png")));
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Config);
        assert!(payload.remediation.unwrap_or_default().contains("absolute path"));
    }

    #[test]
    fn recoverable_errors_are_resource_failures() {
        assert!(WidgetError::Io(std::io::Error::other("x")).is_recoverable());
        assert!(!WidgetError::EncoderAborted.is_recoverable());
        assert!(!WidgetError::config("x").is_recoverable());
    }

    #[test]
    fn every_upload_failure_is_recoverable() {
        for err in [
            ImageLoadError::NotFound("missing.png".into()),
            ImageLoadError::DataUrl("missing ',' separator".into()),
            ImageLoadError::Load(image::ImageError::Decoding(image::error::DecodingError::new(
                image::error::ImageFormatHint::Unknown,
                "Invalid PNG signature",
            ))),
        ] {
            let err = WidgetError::from(err);
            assert!(err.is_recoverable(), "expected {err} to be recoverable");
        }
    }
}
