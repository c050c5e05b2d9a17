//! HTML pages. Pure functions of their input; every interpolated value is
//! escaped by the templates.

use askama::Template;
use chrono::FixedOffset;
use photoboard_core::PhotoRecord;

pub const SITE_NAME: &str = "Photoboard";
const DISPLAY_DATE_FORMAT: &str = "%Y/%-m/%-d %-H:%M:%S";

/// One list entry, with the timestamp already converted for display.
#[derive(Debug, Clone)]
pub struct PhotoView {
    pub filename: String,
    pub comment: String,
    pub display_date: String,
}

impl PhotoView {
    pub fn new(record: &PhotoRecord, offset: FixedOffset) -> Self {
        Self {
            filename: record.filename.clone(),
            comment: record.comment.clone(),
            display_date: record
                .uploaded_at
                .with_timezone(&offset)
                .format(DISPLAY_DATE_FORMAT)
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "photos.html")]
struct PhotoListPage<'a> {
    site_name: &'a str,
    title: &'a str,
    photos: Vec<PhotoView>,
}

#[derive(Template)]
#[template(path = "upload.html")]
struct UploadPage<'a> {
    site_name: &'a str,
    title: &'a str,
}

pub fn render_list(records: &[PhotoRecord], offset: FixedOffset) -> askama::Result<String> {
    PhotoListPage {
        site_name: SITE_NAME,
        title: "Uploaded Photos",
        photos: records.iter().map(|r| PhotoView::new(r, offset)).collect(),
    }
    .render()
}

pub fn render_upload_form() -> askama::Result<String> {
    UploadPage {
        site_name: SITE_NAME,
        title: "Upload Photo",
    }
    .render()
}
