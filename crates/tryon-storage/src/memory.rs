use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::backend::{
    DirectUploadRequest, DirectUploadTicket, StorageBackend, StorageError, StoreBytesRequest,
    StoredObject, clamp_limit, object_path, validate_store_bytes,
};

struct StoredEntry {
    object: StoredObject,
    bytes: Vec<u8>,
    // Insertion order tiebreak for same-millisecond writes.
    seq: u64,
}

/// Process-local [`StorageBackend`].
///
/// Keeps raw bytes keyed by generated id with content type and size recorded,
/// the way the relational-blob provider variant does. Used by tests and
/// single-process deployments; contents vanish on restart.
#[derive(Default)]
pub struct InMemoryStorageBackend {
    objects: DashMap<String, StoredEntry>,
    next_seq: AtomicU64,
}

impl InMemoryStorageBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw bytes and recorded content type for `path`.
    pub fn get_bytes(&self, path: &str) -> Option<(Vec<u8>, Option<String>)> {
        self.objects
            .get(path)
            .map(|entry| (entry.bytes.clone(), entry.object.content_type.clone()))
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorageBackend {
    async fn create_direct_upload(
        &self,
        req: DirectUploadRequest,
    ) -> Result<DirectUploadTicket, StorageError> {
        let path = object_path(
            req.prefix.as_deref(),
            req.filename.as_deref(),
            "application/octet-stream",
        );
        Ok(DirectUploadTicket {
            upload_url: format!("memory://upload/{path}"),
            public_url: format!("memory://{path}"),
            token: Some(uuid::Uuid::new_v4().to_string()),
            path,
        })
    }

    async fn store_bytes(&self, req: StoreBytesRequest) -> Result<StoredObject, StorageError> {
        validate_store_bytes(&req)?;
        let path = object_path(req.prefix.as_deref(), req.filename.as_deref(), &req.content_type);
        let object = StoredObject {
            url: format!("memory://{path}"),
            path: path.clone(),
            size: req.bytes.len() as u64,
            content_type: Some(req.content_type),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.objects.insert(
            path,
            StoredEntry {
                object: object.clone(),
                bytes: req.bytes,
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        Ok(object)
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<StoredObject>, StorageError> {
        let limit = clamp_limit(limit);
        let mut entries: Vec<(i64, u64, StoredObject)> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.object.created_at, entry.seq, entry.object.clone()))
            .collect();
        entries.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        entries.truncate(limit);
        Ok(entries.into_iter().map(|(_, _, object)| object).collect())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}
