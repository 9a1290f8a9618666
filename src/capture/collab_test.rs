use super::*;
use crate::config::EngineConfig;

#[test]
fn content_type_essence_strips_parameters() {
    assert_eq!(content_type_essence("Image/PNG; charset=binary"), "image/png");
    assert_eq!(content_type_essence("image/jpeg"), "image/jpeg");
}

#[tokio::test]
async fn memory_storage_is_keyed_by_name() {
    let storage = MemoryFileStorage::new();
    assert!(storage.is_empty().await);
    let id = storage.insert_file("abc", b"one".to_vec(), "image/png").await.unwrap();
    assert_eq!(id, "abc");
    let again = storage.insert_file("abc", b"two".to_vec(), "image/png").await.unwrap();
    assert_eq!(again, id);
    assert_eq!(storage.len().await, 1);
    let stored = storage.get("abc").await.unwrap();
    assert_eq!(stored.bytes, b"one");
    assert_eq!(stored.mime, "image/png");
}

#[tokio::test]
async fn memory_storage_rejects_empty_name() {
    let storage = MemoryFileStorage::new();
    let err = storage.insert_file("", vec![1], "image/png").await.unwrap_err();
    assert!(matches!(err, StorageError::Write(_)));
}

#[tokio::test]
async fn http_downloader_reports_unusable_urls_as_request_errors() {
    let downloader = HttpDownloader::new(EngineConfig::default().timeouts).unwrap();
    let err = downloader.download("not a url", &[]).await.unwrap_err();
    assert!(matches!(err, DownloadError::Request(_)));
}
