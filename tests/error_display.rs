use wixo_lib::{ErrorCategory, WidgetError};

#[test]
fn config_error_display_includes_message() {
    let err = WidgetError::Config("missing data-file-url".to_string());

    assert_eq!(format!("{}", err), "Configuration error: missing data-file-url");
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: WidgetError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn encoder_helper_uses_message() {
    let err = WidgetError::encoder("palette overflow");

    assert_eq!(format!("{}", err), "GIF encoder error: palette overflow");
}

#[test]
fn aborted_encoding_has_fixed_message() {
    assert_eq!(
        format!("{}", WidgetError::EncoderAborted),
        "GIF encoding was aborted"
    );
}

#[test]
fn payload_carries_category_and_message() {
    let payload = WidgetError::config("canvas size must be non-zero").to_payload();

    assert_eq!(payload.category, ErrorCategory::Config);
    assert!(payload.message.contains("canvas size"));
    assert!(payload.remediation.is_some());
}
