//! Photo files on disk: processing uploads into originals and thumbnails,
//! best-effort removal, and ZIP archives of originals.
//!
//! Paths stored in the database are relative to [`UploadConfig::upload_dir`]
//! and always use forward slashes.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use eventplan_core::error::CoreError;
use eventplan_core::photo::{self, PhotoPaths};
use eventplan_core::types::DbId;
use eventplan_db::repositories::photo_repo::PhotoFiles;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::UploadConfig;

/// Process an uploaded image and write the original and thumbnail to disk.
///
/// Files land under `{year}/{month:02}/{event_id}/` where `year` is the
/// current year and `month` the month of the event's category.
pub async fn save(
    config: &UploadConfig,
    event_id: DbId,
    month: i32,
    content: Vec<u8>,
) -> Result<PhotoPaths, CoreError> {
    let size = config.thumbnail_size;
    let quality = config.thumbnail_quality;
    let processed = tokio::task::spawn_blocking(move || photo::process_image(&content, size, quality))
        .await
        .map_err(|e| CoreError::Internal(format!("Image processing task failed: {e}")))??;

    let year = chrono::Utc::now().year();
    let paths = photo::photo_paths(year, month, event_id, &photo::generate_file_name());

    let original = resolve(&config.upload_dir, &paths.original)?;
    let thumbnail = resolve(&config.upload_dir, &paths.thumbnail)?;

    write_file(&original, &processed.original).await?;
    if let Err(e) = write_file(&thumbnail, &processed.thumbnail).await {
        remove_quietly(&original).await;
        return Err(e);
    }

    tracing::debug!(
        event_id,
        width = processed.width,
        height = processed.height,
        path = %paths.original,
        "Photo stored"
    );
    Ok(paths)
}

/// Remove a photo's files. Missing files and I/O errors are logged, never
/// returned.
pub async fn delete_files(config: &UploadConfig, files: &PhotoFiles) {
    for relative in [&files.original_path, &files.thumbnail_path] {
        match resolve(&config.upload_dir, relative) {
            Ok(path) => remove_quietly(&path).await,
            Err(_) => tracing::warn!(path = %relative, "Refusing to delete unsafe photo path"),
        }
    }
}

/// Remove the files of many photos.
pub async fn delete_all(config: &UploadConfig, files: &[PhotoFiles]) {
    for f in files {
        delete_files(config, f).await;
    }
}

/// Read a stored file. `None` when it is missing from disk.
pub async fn read(config: &UploadConfig, relative: &str) -> Result<Option<Vec<u8>>, CoreError> {
    let path = resolve(&config.upload_dir, relative)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::Internal(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}

/// Build a deflated ZIP archive from `(name, content)` entries.
///
/// Entry names are made unique: a repeated name gets the photo id appended
/// to its stem (`IMG_1.jpg` then `IMG_1_42.jpg`).
pub fn build_zip(entries: Vec<(DbId, String, Vec<u8>)>) -> Result<Vec<u8>, CoreError> {
    let zip_err = |e: zip::result::ZipError| CoreError::Internal(format!("ZIP error: {e}"));
    let io_err = |e: std::io::Error| CoreError::Internal(format!("ZIP write error: {e}"));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for (id, name, content) in entries {
        let name = unique_entry_name(&mut used, id, &name);
        writer.start_file(name, options).map_err(zip_err)?;
        writer.write_all(&content).map_err(io_err)?;
    }

    Ok(writer.finish().map_err(zip_err)?.into_inner())
}

fn unique_entry_name(used: &mut HashSet<String>, id: DbId, name: &str) -> String {
    let name = sanitize_entry_name(name);
    if used.insert(name.clone()) {
        return name;
    }
    let path = Path::new(&name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("photo");
    let renamed = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{id}.{ext}"),
        None => format!("{stem}_{id}"),
    };
    used.insert(renamed.clone());
    renamed
}

/// Client file names become archive entry names; keep only the last path
/// component.
fn sanitize_entry_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        "photo.jpg".to_string()
    } else {
        base.to_string()
    }
}

fn resolve(root: &Path, relative: &str) -> Result<PathBuf, CoreError> {
    if !photo::is_safe_relative_path(relative) {
        return Err(CoreError::Internal(format!("Unsafe storage path: {relative}")));
    }
    Ok(relative.split('/').fold(root.to_path_buf(), |p, seg| p.join(seg)))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to create {}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to write {}: {e}", path.display())))
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to delete photo file"),
    }
}
