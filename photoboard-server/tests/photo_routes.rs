use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};

mod support;
use support::{STYLESHEET, build_test_app, build_test_app_with};

use photoboard_server::{
    AppState,
    infra::{config::Config, startup::NoopStartupHooks},
};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

fn upload_form(bytes: &[u8], file_name: &str, comment: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part(
            "photo",
            Part::bytes(bytes.to_vec())
                .file_name(file_name)
                .mime_type("image/png"),
        )
        .add_text("comment", comment)
}

async fn upload(server: &TestServer, file_name: &str, comment: &str) {
    let response = server
        .post("/upload")
        .multipart(upload_form(PNG_BYTES, file_name, comment))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
}

#[tokio::test]
async fn upload_then_list_shows_photo() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    upload(&server, "cat.png", "cute").await;

    let records = app.state.photos().list().await;
    assert_eq!(records.len(), 1);
    let filename = records[0].filename.clone();
    assert!(filename.ends_with(".png"));

    let page = server.get("/").await;
    page.assert_status_ok();
    let html = page.text();
    assert!(html.contains("Comment: cute"));
    assert!(html.contains(&format!("src=\"/uploads/{filename}\"")));
    assert!(html.contains(&format!("action=\"/delete/{filename}\"")));
    Ok(())
}

#[tokio::test]
async fn uploaded_file_is_served_back() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    upload(&server, "cat.png", "cute").await;
    let filename = app.state.photos().list().await[0].filename.clone();

    let response = server.get(&format!("/uploads/{filename}")).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), PNG_BYTES);
    assert!(app.upload_dir().join(&filename).is_file());
    Ok(())
}

#[tokio::test]
async fn delete_removes_photo_and_file() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    upload(&server, "cat.png", "cute").await;
    let filename = app.state.photos().list().await[0].filename.clone();

    let response = server.post(&format!("/delete/{filename}")).await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");

    assert!(app.state.photos().list().await.is_empty());
    assert!(!app.upload_dir().join(&filename).exists());

    let html = server.get("/").await.text();
    assert!(html.contains("No photos yet."));

    server
        .get(&format!("/uploads/{filename}"))
        .await
        .assert_status_not_found();
    Ok(())
}

#[tokio::test]
async fn deleting_unknown_photo_is_not_found() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    upload(&server, "cat.png", "cute").await;
    let filename = app.state.photos().list().await[0].filename.clone();

    server
        .post(&format!("/delete/{filename}"))
        .await
        .assert_status(StatusCode::SEE_OTHER);
    server
        .post(&format!("/delete/{filename}"))
        .await
        .assert_status_not_found();
    server
        .post("/delete/never-uploaded.png")
        .await
        .assert_status_not_found();
    Ok(())
}

#[tokio::test]
async fn upload_without_comment_is_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    let form = MultipartForm::new().add_part(
        "photo",
        Part::bytes(PNG_BYTES.to_vec())
            .file_name("cat.png")
            .mime_type("image/png"),
    );
    server
        .post("/upload")
        .multipart(form)
        .await
        .assert_status_bad_request();

    assert!(app.state.photos().list().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn upload_with_blank_comment_is_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    let response = server
        .post("/upload")
        .multipart(upload_form(PNG_BYTES, "cat.png", "   "))
        .await;
    response.assert_status_bad_request();
    assert!(response.text().contains("comment is required"));

    assert!(app.state.photos().list().await.is_empty());
    assert_eq!(std::fs::read_dir(app.upload_dir())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn upload_without_photo_is_rejected() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    let form = MultipartForm::new().add_text("comment", "no file");
    let response = server.post("/upload").multipart(form).await;
    response.assert_status_bad_request();
    assert!(response.text().contains("photo is required"));

    assert!(app.state.photos().list().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn comment_markup_is_escaped_on_list_page() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    upload(&server, "x.png", "<script>alert(1)</script>").await;

    let html = server.get("/").await.text();
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
    Ok(())
}

#[tokio::test]
async fn photos_are_listed_in_upload_order() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    upload(&server, "first.png", "first comment").await;
    upload(&server, "second.png", "second comment").await;
    upload(&server, "third.png", "third comment").await;

    let html = server.get("/").await.text();
    let first = html.find("first comment");
    let second = html.find("second comment");
    let third = html.find("third comment");
    assert!(first.is_some() && second.is_some() && third.is_some());
    assert!(first < second && second < third);

    let records = app.state.photos().list().await;
    let comments: Vec<&str> = records.iter().map(|r| r.comment.as_str()).collect();
    assert_eq!(comments, ["first comment", "second comment", "third comment"]);
    Ok(())
}

#[tokio::test]
async fn upload_form_is_served() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    let response = server.get("/upload").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("enctype=\"multipart/form-data\""));
    assert!(html.contains("name=\"photo\""));
    assert!(html.contains("name=\"comment\""));
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_rejected() -> Result<()> {
    let app = build_test_app_with(|config| config.upload.max_bytes = 1024, &NoopStartupHooks)
        .await?;
    let server = app.server()?;

    let big = vec![0u8; 8 * 1024];
    server
        .post("/upload")
        .multipart(upload_form(&big, "big.png", "too big"))
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    assert!(app.state.photos().list().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn static_stylesheet_is_served_from_public_dir() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    let response = server.get("/styles/styles.css").await;
    response.assert_status_ok();
    assert_eq!(response.text(), STYLESHEET);
    Ok(())
}

#[tokio::test]
async fn photos_survive_a_restart() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;
    upload(&server, "cat.png", "still here").await;

    let (_router, state, tempdir) = app.into_parts();
    drop(state);

    let reopened = AppState::bootstrap(Arc::new(Config::rooted_at(tempdir.path()))).await?;
    let records = reopened.photos().list().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].comment, "still here");
    Ok(())
}

#[tokio::test]
async fn health_reports_storage_state() -> Result<()> {
    let app = build_test_app().await?;
    let server = app.server()?;

    server.get("/ping").await.assert_status_ok();

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["photos"], 0);

    std::fs::remove_file(app.data_file())?;
    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["checks"]["data_file"], false);
    Ok(())
}
