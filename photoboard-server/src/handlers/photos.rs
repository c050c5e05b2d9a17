use axum::{
    extract::{Multipart, Path, State},
    response::{Html, Redirect},
};
use tracing::debug;

use crate::{
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
    render,
};

const PHOTO_FIELD: &str = "photo";
const COMMENT_FIELD: &str = "comment";

/// GET / - list every photo, oldest first.
pub async fn list_photos(State(state): State<AppState>) -> AppResult<Html<String>> {
    let records = state.photos().list().await;
    let page = render::render_list(&records, state.config().display.utc_offset)?;
    Ok(Html(page))
}

/// GET /upload - the upload form.
pub async fn upload_form() -> AppResult<Html<String>> {
    Ok(Html(render::render_upload_form()?))
}

#[derive(Debug, Default)]
struct UploadForm {
    photo: Option<UploadedFile>,
    comment: Option<String>,
}

#[derive(Debug)]
struct UploadedFile {
    original_name: Option<String>,
    bytes: axum::body::Bytes,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(PHOTO_FIELD) => {
                    let original_name = field.file_name().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    form.photo = Some(UploadedFile {
                        original_name,
                        bytes,
                    });
                }
                Some(COMMENT_FIELD) => {
                    form.comment = Some(field.text().await?);
                }
                other => {
                    debug!(field = ?other, "ignoring unexpected upload field");
                }
            }
        }

        Ok(form)
    }
}

/// POST /upload - multipart `photo` + `comment`; redirects to the list.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let form = UploadForm::read(multipart).await?;

    let photo = form
        .photo
        .filter(|photo| !photo.bytes.is_empty())
        .ok_or_else(|| AppError::bad_request("photo is required"))?;
    let comment = form
        .comment
        .ok_or_else(|| AppError::bad_request("comment is required"))?;

    state
        .photos()
        .upload(&photo.bytes, photo.original_name.as_deref(), &comment)
        .await?;

    Ok(Redirect::to("/"))
}

/// POST /delete/{filename} - remove the record and its file.
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Redirect> {
    state.photos().delete(&filename).await?;
    Ok(Redirect::to("/"))
}
