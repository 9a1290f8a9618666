use super::*;

#[test]
fn download_error_codes() {
    assert_eq!(DownloadError::Request("x".into()).error_code(), "E_DOWNLOAD_REQUEST");
    assert_eq!(DownloadError::InvalidUrl("x".into()).error_code(), "E_INVALID_URL");
    assert_eq!(DownloadError::Status { url: "u".into(), status: 404 }.error_code(), "E_DOWNLOAD_STATUS");
}

#[test]
fn download_retryable_statuses() {
    assert!(DownloadError::Request("timeout".into()).retryable());
    assert!(DownloadError::Status { url: "u".into(), status: 503 }.retryable());
    assert!(DownloadError::Status { url: "u".into(), status: 429 }.retryable());
    assert!(!DownloadError::Status { url: "u".into(), status: 404 }.retryable());
    assert!(!DownloadError::DataUrl("bad".into()).retryable());
}

#[test]
fn capture_error_delegates() {
    let err: CaptureError = StorageError::Write("disk full".into()).into();
    assert_eq!(err.error_code(), "E_STORAGE_WRITE");
    assert_eq!(err.to_string(), "file storage write failed: disk full");
    let err: CaptureError = DownloadError::Status { url: "u".into(), status: 500 }.into();
    assert!(err.retryable());
}

#[test]
fn messages_name_the_subject() {
    let err = NoteError::NotFound { title: "Journal".into() };
    assert_eq!(err.to_string(), "note not found: Journal");
    let err = ConfigError::Parse { var: "POINTSHOOT_MODIFIER".into(), message: "bad".into() };
    assert!(err.to_string().contains("POINTSHOOT_MODIFIER"));
    assert_eq!(err.error_code(), "E_CONFIG_PARSE");
}
