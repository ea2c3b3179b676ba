//! Multi-backend file storage behind one interface.
//!
//! Hosted storage providers differ in mechanics (signed direct-upload URLs,
//! content-addressed blobs, relational rows of raw bytes) but normalize to
//! the same four operations: issue a write-capable direct-upload reference,
//! store raw bytes under a generated id, list stored objects newest-first,
//! and delete by path. [`StorageBackend`] is that interface;
//! [`HttpStorageBackend`] talks to a signed-upload HTTP API and
//! [`InMemoryStorageBackend`] keeps everything process-local for tests and
//! single-process deployments.

/// Backend contract, shared data types, and upload validation.
pub mod backend;
/// Data-URL encode/decode helpers.
pub mod data_url;
/// Signed-upload HTTP API backend.
pub mod http_backend;
/// Process-local backend.
pub mod memory;

pub use backend::{
    DEFAULT_LIST_LIMIT, DirectUploadRequest, DirectUploadTicket, MAX_BATCH_FILES,
    MAX_LIST_LIMIT, MAX_UPLOAD_BYTES, StorageBackend, StorageError, StoreBytesRequest,
    StoredObject, store_batch,
};
pub use data_url::{DecodedDataUrl, encode_data_url, parse_data_url};
pub use http_backend::{HttpStorageBackend, HttpStorageConfig};
pub use memory::InMemoryStorageBackend;
