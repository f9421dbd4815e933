//! Handlers for event photos: batch upload, deletion and downloads.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use eventplan_core::error::CoreError;
use eventplan_core::photo::validate_upload;
use eventplan_core::types::DbId;
use eventplan_db::models::photo::{fit_filename, CreatePhoto, PhotoUploadResponse};
use eventplan_db::repositories::photo_repo::PhotoFiles;
use eventplan_db::repositories::{CategoryRepo, PhotoRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::events::find_event;
use crate::middleware::rbac::RequireEditor;
use crate::photo_store;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field names that carry files.
const FILE_FIELDS: &[&str] = &["files", "file"];

/// Outcome of reading one multipart file field.
enum FileRead {
    Complete(Vec<u8>),
    TooLarge,
}

/// POST /api/v1/events/{id}/photos
///
/// Accepts any number of `files` fields. Each file is validated and
/// processed on its own: rejected files are reported in `errors` and do not
/// prevent the others from being stored.
pub async fn upload_photos(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<PhotoUploadResponse>>)> {
    let event = find_event(&state.pool, event_id).await?;
    let category = CategoryRepo::find_by_id(&state.pool, event.category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: event.category_id,
        }))?;

    let upload = &state.config.upload;
    let max_bytes = upload.max_upload_bytes();
    let mut response = PhotoUploadResponse::default();
    let mut seen_files = 0usize;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            continue; // ignore unknown fields
        }
        seen_files += 1;

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let display_name = filename.clone().unwrap_or_else(|| "unnamed".to_string());

        if let Err(e) = validate_upload(filename.as_deref(), content_type.as_deref()) {
            response.errors.push(file_error(&display_name, &e));
            continue;
        }

        let mut content = Vec::new();
        let read = loop {
            match field
                .chunk()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
            {
                Some(chunk) if content.len() + chunk.len() > max_bytes => break FileRead::TooLarge,
                Some(chunk) => content.extend_from_slice(&chunk),
                None => break FileRead::Complete(content),
            }
        };
        let content = match read {
            FileRead::Complete(content) => content,
            FileRead::TooLarge => {
                response.errors.push(format!(
                    "File '{display_name}': File too large. Maximum size: {}MB",
                    upload.max_upload_size_mb
                ));
                continue;
            }
        };

        let file_size = content.len() as i64;
        let paths = match photo_store::save(upload, event_id, category.month, content).await {
            Ok(paths) => paths,
            Err(e) => {
                response.errors.push(file_error(&display_name, &e));
                continue;
            }
        };

        let input = CreatePhoto {
            event_id,
            filename: fit_filename(&display_name),
            original_path: paths.original.clone(),
            thumbnail_path: paths.thumbnail.clone(),
            file_size,
        };
        match PhotoRepo::create(&state.pool, &input).await {
            Ok(photo) => response.photos.push(photo),
            Err(e) => {
                tracing::error!(event_id, error = %e, "Failed to record photo");
                photo_store::delete_files(
                    upload,
                    &PhotoFiles {
                        original_path: paths.original,
                        thumbnail_path: paths.thumbnail,
                    },
                )
                .await;
                response
                    .errors
                    .push(format!("File '{display_name}': Failed to save photo"));
            }
        }
    }

    if seen_files == 0 {
        return Err(AppError::BadRequest("No files provided".into()));
    }

    tracing::info!(
        event_id,
        role = %user.role,
        uploaded = response.photos.len(),
        rejected = response.errors.len(),
        "Photos uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// DELETE /api/v1/photos/{id}
///
/// Removes the row, then the files. File removal is best-effort.
pub async fn delete_photo(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let photo = PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))?;

    if !PhotoRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Photo", id }));
    }

    photo_store::delete_files(
        &state.config.upload,
        &PhotoFiles {
            original_path: photo.original_path,
            thumbnail_path: photo.thumbnail_path,
        },
    )
    .await;

    tracing::info!(photo_id = id, event_id = photo.event_id, "Photo deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/photos/{id}/original
///
/// The processed full-size JPEG as an attachment named after the client's
/// original file.
pub async fn download_original(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let photo = PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))?;

    let bytes = photo_store::read(&state.config.upload, &photo.original_path)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Photo file",
            id,
        }))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&photo.filename)),
        ],
        bytes,
    ))
}

/// GET /api/v1/events/{id}/photos/zip
///
/// Every original of the event in one deflated archive. Files missing from
/// disk are skipped.
pub async fn download_zip(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = find_event(&state.pool, event_id).await?;
    let photos = PhotoRepo::list_by_event(&state.pool, event_id).await?;
    if photos.is_empty() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Photos for event",
            id: event_id,
        }));
    }

    let mut entries = Vec::with_capacity(photos.len());
    for photo in photos {
        match photo_store::read(&state.config.upload, &photo.original_path).await? {
            Some(bytes) => entries.push((photo.id, photo.filename, bytes)),
            None => tracing::warn!(photo_id = photo.id, "Photo file missing from disk"),
        }
    }

    let archive = tokio::task::spawn_blocking(move || photo_store::build_zip(entries))
        .await
        .map_err(|e| AppError::InternalError(format!("ZIP task failed: {e}")))??;

    let safe_name: String = event
        .name
        .chars()
        .take(50)
        .map(|c| if c.is_alphanumeric() || " -_".contains(c) { c } else { '_' })
        .collect();
    let filename = format!("photos_{safe_name}_{event_id}.zip");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&filename)),
        ],
        archive,
    ))
}

/// Per-file error entry: `File '<name>': <detail>`.
fn file_error(name: &str, err: &CoreError) -> String {
    let detail = match err {
        CoreError::Validation(msg) => msg.clone(),
        CoreError::Internal(msg) => {
            tracing::error!(file = name, error = %msg, "Photo processing failed");
            "Failed to process image".to_string()
        }
        other => other.to_string(),
    };
    format!("File '{name}': {detail}")
}

/// `Content-Disposition: attachment` with an ASCII fallback name and the
/// RFC 5987 UTF-8 name.
fn attachment(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len() * 3);
    for b in filename.bytes() {
        if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
            encoded.push(char::from(b));
        } else {
            encoded.push_str(&format!("%{b:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
