use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Largest accepted upload payload.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
/// Largest accepted batch for [`store_batch`].
pub const MAX_BATCH_FILES: usize = 3;
/// Listing limit applied when the caller passes zero.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Hard cap on a single listing page.
pub const MAX_LIST_LIMIT: usize = 200;

/// Errors surfaced by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Rejected before any remote call (wrong content type, oversized
    /// payload, empty batch).
    #[error("validation error: {0}")]
    Validation(String),
    /// Non-2xx response from the hosted provider.
    #[error("storage request failed with status {status}: {body}")]
    Provider { status: u16, body: String },
    /// Network I/O failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The addressed object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),
}

/// Request for a client-direct upload destination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectUploadRequest {
    /// Original filename; only its extension is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Key prefix to store under; falls back to `uploads` when absent or
    /// containing characters outside `[A-Za-z0-9_/-]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Writable destination plus the public read URL it will resolve to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectUploadTicket {
    /// Object path/key the upload will land at.
    pub path: String,
    /// Provider-specific upload token when the backend requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// URL the client writes the bytes to.
    pub upload_url: String,
    /// URL the stored object will be readable at.
    pub public_url: String,
}

/// Raw bytes to store directly, for backends that accept server-side writes.
#[derive(Clone, Debug)]
pub struct StoreBytesRequest {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: Option<String>,
    pub prefix: Option<String>,
}

/// One stored object as reported by a listing or a write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object path/key, usable with [`StorageBackend::delete`].
    pub path: String,
    /// Public read URL.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// Recorded content type, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
}

/// One hosted storage provider normalized to four operations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Issues a write-capable direct-upload reference under the requested
    /// prefix.
    async fn create_direct_upload(
        &self,
        req: DirectUploadRequest,
    ) -> Result<DirectUploadTicket, StorageError>;

    /// Stores raw bytes under a generated id, recording content type and
    /// size.
    async fn store_bytes(&self, req: StoreBytesRequest) -> Result<StoredObject, StorageError>;

    /// Lists stored objects under `prefix`, newest first, capped by `limit`
    /// (clamped to `1..=MAX_LIST_LIMIT`; zero means [`DEFAULT_LIST_LIMIT`]).
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<StoredObject>, StorageError>;

    /// Deletes a stored object by its path/key.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// Stores up to [`MAX_BATCH_FILES`] payloads, failing the whole batch on the
/// first error.
pub async fn store_batch(
    backend: &dyn StorageBackend,
    files: Vec<StoreBytesRequest>,
) -> Result<Vec<StoredObject>, StorageError> {
    if files.is_empty() {
        return Err(StorageError::Validation("no files provided".into()));
    }
    if files.len() > MAX_BATCH_FILES {
        return Err(StorageError::Validation(format!(
            "too many files (max {MAX_BATCH_FILES})"
        )));
    }
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        stored.push(backend.store_bytes(file).await?);
    }
    Ok(stored)
}

pub(crate) fn validate_store_bytes(req: &StoreBytesRequest) -> Result<(), StorageError> {
    if !req.content_type.starts_with("image/") {
        return Err(StorageError::Validation(
            "only image uploads are allowed".into(),
        ));
    }
    if req.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(StorageError::Validation("file too large (max 16MB)".into()));
    }
    Ok(())
}

pub(crate) fn clamp_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_LIST_LIMIT
    } else {
        limit.min(MAX_LIST_LIMIT)
    }
}

fn sanitized_prefix(prefix: Option<&str>) -> &str {
    match prefix {
        Some(p)
            if !p.is_empty()
                && p.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '-')) =>
        {
            p.trim_end_matches('/')
        }
        _ => "uploads",
    }
}

fn extension_for(filename: Option<&str>, content_type: &str) -> String {
    if let Some(name) = filename
        && let Some((_, ext)) = name.rsplit_once('.')
        && !ext.is_empty()
    {
        return ext.to_string();
    }
    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.to_string())
        .unwrap_or_else(|| "bin".to_string())
}

/// Builds a fresh object path: `{prefix}/{uuid}.{ext}`.
pub(crate) fn object_path(
    prefix: Option<&str>,
    filename: Option<&str>,
    content_type: &str,
) -> String {
    format!(
        "{}/{}.{}",
        sanitized_prefix(prefix),
        uuid::Uuid::new_v4(),
        extension_for(filename, content_type)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_non_image_content() {
        let req = StoreBytesRequest {
            bytes: vec![1, 2, 3],
            content_type: "application/pdf".into(),
            filename: None,
            prefix: None,
        };
        assert!(matches!(
            validate_store_bytes(&req),
            Err(StorageError::Validation(message)) if message.contains("image")
        ));
    }

    #[test]
    fn validation_rejects_oversized_payloads() {
        let req = StoreBytesRequest {
            bytes: vec![0; MAX_UPLOAD_BYTES + 1],
            content_type: "image/png".into(),
            filename: None,
            prefix: None,
        };
        assert!(matches!(
            validate_store_bytes(&req),
            Err(StorageError::Validation(message)) if message.contains("too large")
        ));
    }

    #[test]
    fn limit_clamping() {
        assert_eq!(clamp_limit(0), DEFAULT_LIST_LIMIT);
        assert_eq!(clamp_limit(7), 7);
        assert_eq!(clamp_limit(10_000), MAX_LIST_LIMIT);
    }

    #[test]
    fn stored_object_serialization_omits_absent_content_type() {
        let object = StoredObject {
            path: "uploads/a.png".into(),
            url: "https://cdn.example/uploads/a.png".into(),
            size: 12,
            content_type: None,
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&object).expect("serialize");
        assert!(json.get("content_type").is_none());
        assert_eq!(json["path"], "uploads/a.png");
        let back: StoredObject = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, object);
    }

    #[test]
    fn object_paths_use_prefix_and_extension() {
        let path = object_path(Some("wardrobe/summer"), Some("dress.JPG"), "image/jpeg");
        assert!(path.starts_with("wardrobe/summer/"));
        assert!(path.ends_with(".JPG"));

        let fallback = object_path(Some("../escape"), None, "image/png");
        assert!(fallback.starts_with("uploads/"));
        assert!(fallback.ends_with(".png"));
    }
}
