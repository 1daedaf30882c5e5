//! Filename Resolver
//!
//! Maps remote object metadata to a path below the mirror root. The mapping
//! is a pure function of the metadata, so the same object always lands on
//! the same path.

use bridge_traits::catalog::RemoteObjectMetadata;
use bridge_traits::storage::is_partial_file;
use std::path::{Component, Path, PathBuf};

use crate::error::{MirrorError, Result};

const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("application/gzip", ".gz"),
    ("application/json", ".json"),
    ("application/octet-stream", ".bin"),
    ("application/pdf", ".pdf"),
    ("application/x-tar", ".tar"),
    ("application/xml", ".xml"),
    ("application/zip", ".zip"),
    ("audio/mpeg", ".mp3"),
    ("audio/ogg", ".ogg"),
    ("audio/wav", ".wav"),
    ("audio/x-wav", ".wav"),
    ("image/bmp", ".bmp"),
    ("image/gif", ".gif"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/svg+xml", ".svg"),
    ("image/tiff", ".tiff"),
    ("image/vnd.viam.dep", ".dep"),
    ("image/webp", ".webp"),
    ("pointcloud/pcd", ".pcd"),
    ("text/csv", ".csv"),
    ("text/html", ".html"),
    ("text/plain", ".txt"),
    ("text/xml", ".xml"),
    ("video/mp4", ".mp4"),
    ("video/mpeg", ".mpeg"),
    ("video/quicktime", ".mov"),
    ("video/webm", ".webm"),
];

/// Extension (with leading dot) for a MIME type.
///
/// Parameters such as `; charset=utf-8` are ignored and matching is
/// case-insensitive.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type.split(';').next()?.trim().to_ascii_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Local path for `object` under `root`.
///
/// A non-empty `file_name` is used as given; otherwise the name is the object
/// id plus the extension for its MIME type.
pub fn resolve(root: &Path, object: &RemoteObjectMetadata) -> Result<PathBuf> {
    let relative = match object.file_name.as_deref().filter(|n| !n.is_empty()) {
        Some(file_name) => file_name.to_string(),
        None => {
            let ext = extension_for_mime(&object.mime_type).ok_or_else(|| {
                MirrorError::Resolution {
                    object_id: object.id.clone(),
                    reason: format!("unknown MIME type '{}'", object.mime_type),
                }
            })?;
            format!("{}{}", object.id, ext)
        }
    };

    let relative = Path::new(&relative);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(MirrorError::Resolution {
            object_id: object.id.clone(),
            reason: format!("name '{}' leaves the mirror root", relative.display()),
        });
    }

    if is_partial_file(relative) {
        return Err(MirrorError::Resolution {
            object_id: object.id.clone(),
            reason: format!(
                "name '{}' collides with temporary write files",
                relative.display()
            ),
        });
    }

    Ok(root.join(relative))
}
