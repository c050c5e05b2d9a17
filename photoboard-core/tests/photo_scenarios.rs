use std::sync::Arc;

use photoboard_core::{BlobStore, MetadataStore, PhotoError, PhotoService};
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    service: PhotoService,
}

impl Harness {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = open_service(&dir).await;
        Self { dir, service }
    }

    async fn reopen(&self) -> PhotoService {
        open_service(&self.dir).await
    }

    fn blob_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path().join("uploads"))
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

async fn open_service(dir: &TempDir) -> PhotoService {
    let metadata = MetadataStore::open(dir.path().join("data.json"))
        .await
        .expect("open metadata store");
    PhotoService::new(BlobStore::new(dir.path().join("uploads")), Arc::new(metadata))
}

#[tokio::test]
async fn upload_list_delete_cat_photo() {
    let h = Harness::new().await;

    let record = h
        .service
        .upload(b"\x89PNG fake", Some("cat.png"), "cute")
        .await
        .unwrap();

    let listed = h.service.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].comment, "cute");
    assert_eq!(listed[0].filename, record.filename);
    assert_eq!(h.blob_files(), vec![record.filename.clone()]);

    h.service.delete(&record.filename).await.unwrap();

    assert!(h.service.list().await.is_empty());
    assert!(h.blob_files().is_empty());
}

#[tokio::test]
async fn sequential_uploads_keep_submission_order() {
    let h = Harness::new().await;

    let first = h.service.upload(b"one", Some("a.jpg"), "first").await.unwrap();
    let second = h.service.upload(b"two", Some("b.jpg"), "second").await.unwrap();

    assert_ne!(first.filename, second.filename);
    let comments: Vec<_> = h.service.list().await.into_iter().map(|r| r.comment).collect();
    assert_eq!(comments, vec!["first", "second"]);
    assert_eq!(h.blob_files().len(), 2);
}

#[tokio::test]
async fn each_upload_adds_exactly_one_blob_and_record() {
    let h = Harness::new().await;

    for i in 0..5 {
        let before_blobs = h.blob_files();
        let before_records = h.service.list().await;

        let record = h
            .service
            .upload(format!("bytes {i}").as_bytes(), Some("p.webp"), &format!("photo {i}"))
            .await
            .unwrap();

        let after_blobs = h.blob_files();
        let after_records = h.service.list().await;
        assert_eq!(after_blobs.len(), before_blobs.len() + 1);
        assert_eq!(after_records.len(), before_records.len() + 1);
        assert_eq!(after_records.last(), Some(&record));
        assert!(after_blobs.contains(&record.filename));
    }
}

#[tokio::test]
async fn deleting_twice_reports_not_found_consistently() {
    let h = Harness::new().await;
    let keep = h.service.upload(b"keep", Some("k.png"), "keep").await.unwrap();
    let gone = h.service.upload(b"gone", Some("g.png"), "gone").await.unwrap();

    h.service.delete(&gone.filename).await.unwrap();
    let second = h.service.delete(&gone.filename).await;

    assert!(matches!(second, Err(PhotoError::NotFound(name)) if name == gone.filename));
    assert_eq!(h.service.list().await, vec![keep.clone()]);
    assert_eq!(h.blob_files(), vec![keep.filename]);
}

#[tokio::test]
async fn state_survives_restart() {
    let h = Harness::new().await;
    for comment in ["morning", "noon", "night"] {
        h.service.upload(b"bytes", Some("x.png"), comment).await.unwrap();
    }
    let before = h.service.list().await;

    let restarted = h.reopen().await;

    assert_eq!(restarted.list().await, before);
}
