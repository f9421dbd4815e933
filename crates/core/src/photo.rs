//! Photo upload validation, storage layout and image processing.
//!
//! Uploaded images are decoded, rotated according to their EXIF orientation,
//! flattened onto a white background and re-encoded as JPEG. Re-encoding
//! drops all metadata. A second, smaller JPEG is produced as the thumbnail.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// MIME types accepted for photo uploads, on both client and server.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// File extensions accepted by the server (lowercase, with dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Longest edge of a generated thumbnail, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 400;

/// JPEG quality used for thumbnails.
pub const DEFAULT_THUMBNAIL_QUALITY: u8 = 85;

/// JPEG quality used for the stored original.
pub const ORIGINAL_JPEG_QUALITY: u8 = 95;

/// Subdirectory names under `{year}/{month}/{event_id}/`.
const ORIGINAL_DIR: &str = "original";
const THUMBNAIL_DIR: &str = "thumbnails";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Whether a declared content type is an accepted image type.
///
/// Parameters such as `; charset=...` are ignored, comparison is
/// case-insensitive.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES.contains(&essence.as_str())
}

/// Validate an uploaded file's name and declared MIME type.
///
/// Returns the lowercase extension (with dot) on success.
pub fn validate_upload(
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, CoreError> {
    let filename = filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| CoreError::validation("Filename is required"))?;

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CoreError::validation(format!(
            "Invalid file format '{extension}'. Allowed formats: JPEG, PNG"
        )));
    }

    if let Some(ct) = content_type.filter(|ct| !ct.is_empty()) {
        if !is_allowed_content_type(ct) {
            return Err(CoreError::validation(format!(
                "Invalid MIME type '{ct}'. Allowed types: image/jpeg, image/png"
            )));
        }
    }

    Ok(extension)
}

// ---------------------------------------------------------------------------
// Storage layout
// ---------------------------------------------------------------------------

/// Relative storage paths of one photo (forward slashes, relative to the
/// upload root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPaths {
    pub original: String,
    pub thumbnail: String,
}

/// Build `{year}/{month:02}/{event_id}/{original|thumbnails}/{file_name}`.
pub fn photo_paths(year: i32, month: i32, event_id: DbId, file_name: &str) -> PhotoPaths {
    let base = format!("{year}/{month:02}/{event_id}");
    PhotoPaths {
        original: format!("{base}/{ORIGINAL_DIR}/{file_name}"),
        thumbnail: format!("{base}/{THUMBNAIL_DIR}/{file_name}"),
    }
}

/// A fresh, collision-free file name for a processed photo.
///
/// The client's file name is kept only in the database row; it never reaches
/// the file system.
pub fn generate_file_name() -> String {
    format!("{}.jpg", Uuid::new_v4())
}

/// Reject stored paths that could escape the upload root.
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path.split('/').all(|seg| !seg.is_empty() && seg != "..")
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Encoded output of [`process_image`].
#[derive(Debug, Clone)]
pub struct ProcessedPhoto {
    pub original: Vec<u8>,
    pub thumbnail: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode, orient, flatten and re-encode an uploaded image.
///
/// CPU-bound; callers on an async runtime should run it on a blocking
/// thread.
pub fn process_image(
    content: &[u8],
    thumbnail_size: u32,
    thumbnail_quality: u8,
) -> Result<ProcessedPhoto, CoreError> {
    let image = decode_oriented(content)?;
    let rgb = flatten_to_rgb(image);
    let (width, height) = rgb.dimensions();

    let original = encode_jpeg(&rgb, ORIGINAL_JPEG_QUALITY)?;

    let thumb = if width <= thumbnail_size && height <= thumbnail_size {
        rgb
    } else {
        DynamicImage::ImageRgb8(rgb)
            .thumbnail(thumbnail_size, thumbnail_size)
            .to_rgb8()
    };
    let thumbnail = encode_jpeg(&thumb, thumbnail_quality)?;

    Ok(ProcessedPhoto {
        original,
        thumbnail,
        width,
        height,
    })
}

fn decode_oriented(content: &[u8]) -> Result<DynamicImage, CoreError> {
    let invalid = |e: image::ImageError| CoreError::validation(format!("Invalid image: {e}"));

    let mut decoder = ImageReader::new(Cursor::new(content))
        .with_guessed_format()
        .map_err(|e| CoreError::validation(format!("Invalid image: {e}")))?
        .into_decoder()
        .map_err(invalid)?;
    let orientation = decoder.orientation().map_err(invalid)?;

    let mut image = DynamicImage::from_decoder(decoder).map_err(invalid)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Composite transparent pixels onto white.
fn flatten_to_rgb(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = u32::from(a);
            ((u32::from(c) * a + 255 * (255 - a)) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(image)
        .map_err(|e| CoreError::Internal(format!("JPEG encoding failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, pixel);
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn content_types() {
        assert!(is_allowed_content_type("image/jpeg"));
        assert!(is_allowed_content_type("IMAGE/PNG"));
        assert!(is_allowed_content_type("image/png; charset=binary"));
        assert!(!is_allowed_content_type("image/gif"));
        assert!(!is_allowed_content_type("application/pdf"));
        assert!(!is_allowed_content_type(""));
    }

    #[test]
    fn validate_upload_accepts_jpeg_and_png() {
        assert_eq!(validate_upload(Some("a.JPG"), Some("image/jpeg")).unwrap(), ".jpg");
        assert_eq!(validate_upload(Some("b.jpeg"), None).unwrap(), ".jpeg");
        assert_eq!(validate_upload(Some("c.png"), Some("")).unwrap(), ".png");
    }

    #[test]
    fn validate_upload_rejects_bad_input() {
        assert_matches!(validate_upload(None, None), Err(CoreError::Validation(_)));
        assert_matches!(validate_upload(Some("  "), None), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_upload(Some("doc.pdf"), Some("application/pdf")),
            Err(CoreError::Validation(msg)) if msg.contains("'.pdf'")
        );
        assert_matches!(
            validate_upload(Some("photo.png"), Some("text/plain")),
            Err(CoreError::Validation(msg)) if msg.contains("text/plain")
        );
        assert_matches!(validate_upload(Some("noext"), None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn paths_follow_year_month_event_layout() {
        let paths = photo_paths(2025, 3, 42, "abc.jpg");
        assert_eq!(paths.original, "2025/03/42/original/abc.jpg");
        assert_eq!(paths.thumbnail, "2025/03/42/thumbnails/abc.jpg");
        assert!(is_safe_relative_path(&paths.original));
    }

    #[test]
    fn generated_names_are_unique_jpegs() {
        let a = generate_file_name();
        let b = generate_file_name();
        assert_ne!(a, b);
        assert!(a.ends_with(".jpg"));
        assert!(is_safe_relative_path(&a));
    }

    #[test]
    fn unsafe_paths_are_rejected() {
        assert!(!is_safe_relative_path("../etc/passwd"));
        assert!(!is_safe_relative_path("/abs/path.jpg"));
        assert!(!is_safe_relative_path("a//b.jpg"));
        assert!(!is_safe_relative_path("a\\b.jpg"));
        assert!(!is_safe_relative_path(""));
    }

    #[test]
    fn process_small_png_keeps_size_and_outputs_jpeg() {
        let png = png_bytes(3, 2, Rgba([10, 20, 30, 255]));
        let out = process_image(&png, 400, 85).unwrap();

        assert_eq!((out.width, out.height), (3, 2));
        assert_eq!(image::guess_format(&out.original).unwrap(), ImageFormat::Jpeg);
        let thumb = image::load_from_memory(&out.thumbnail).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (3, 2));
    }

    #[test]
    fn thumbnail_fits_bounding_box() {
        let png = png_bytes(800, 400, Rgba([0, 0, 0, 255]));
        let out = process_image(&png, 400, 85).unwrap();

        let thumb = image::load_from_memory(&out.thumbnail).unwrap();
        assert_eq!(thumb.width(), 400);
        assert_eq!(thumb.height(), 200);
        let original = image::load_from_memory(&out.original).unwrap();
        assert_eq!((original.width(), original.height()), (800, 400));
    }

    #[test]
    fn transparent_pixels_become_white() {
        let png = png_bytes(1, 1, Rgba([0, 0, 0, 0]));
        let rgb = flatten_to_rgb(image::load_from_memory(&png).unwrap());
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn garbage_is_a_validation_error() {
        assert_matches!(
            process_image(b"definitely not an image", 400, 85),
            Err(CoreError::Validation(_))
        );
    }
}
