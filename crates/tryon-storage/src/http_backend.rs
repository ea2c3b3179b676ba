use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::backend::{
    DirectUploadRequest, DirectUploadTicket, StorageBackend, StorageError, StoreBytesRequest,
    StoredObject, clamp_limit, validate_store_bytes,
};

/// Hard abort for upload-path remote calls. Uploads that outlive this are
/// failed rather than left hanging.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`HttpStorageBackend`].
#[derive(Clone, Debug)]
pub struct HttpStorageConfig {
    /// Base URL of the files API (the service exposing
    /// `/api/files/create-upload`, listing, and deletion).
    pub base_url: String,
    /// Optional shared administrative secret, passed through as an opaque
    /// `key` query parameter on listing/deletion calls.
    pub admin_key: Option<String>,
}

impl HttpStorageConfig {
    /// Creates a config for the given files API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            admin_key: None,
        }
    }

    /// Attaches the administrative secret.
    pub fn admin_key(mut self, key: impl Into<String>) -> Self {
        self.admin_key = Some(key.into());
        self
    }
}

/// Storage backend speaking to a signed-upload HTTP API.
///
/// The service issues a writable destination plus public read URL per object;
/// bytes go to the destination directly, so the service never proxies file
/// content.
pub struct HttpStorageBackend {
    http: reqwest::Client,
    config: HttpStorageConfig,
}

#[derive(Deserialize)]
struct CreateUploadResponse {
    path: String,
    #[serde(default)]
    token: Option<String>,
    url: String,
    #[serde(rename = "publicUrl")]
    public_url: String,
}

#[derive(Deserialize)]
struct ListedObject {
    id: String,
    url: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    mime: Option<String>,
}

impl HttpStorageBackend {
    /// Creates a backend from explicit configuration.
    pub fn new(config: HttpStorageConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| StorageError::Transport(format!("failed to build storage client: {e}")))?;
        Ok(Self { http, config })
    }

    fn files_url(&self) -> String {
        format!("{}/api/files", self.config.base_url.trim_end_matches('/'))
    }

    fn with_admin_key(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.admin_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::NotFound(body));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl StorageBackend for HttpStorageBackend {
    async fn create_direct_upload(
        &self,
        req: DirectUploadRequest,
    ) -> Result<DirectUploadTicket, StorageError> {
        let response = self
            .http
            .post(format!("{}/create-upload", self.files_url()))
            .json(&req)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("create-upload failed: {e}")))?;
        let parsed: CreateUploadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("invalid create-upload body: {e}")))?;
        debug!(
            event = "storage.upload_ticket_issued",
            domain = "storage",
            path = parsed.path.as_str()
        );
        Ok(DirectUploadTicket {
            path: parsed.path,
            token: parsed.token,
            upload_url: parsed.url,
            public_url: parsed.public_url,
        })
    }

    async fn store_bytes(&self, req: StoreBytesRequest) -> Result<StoredObject, StorageError> {
        validate_store_bytes(&req)?;
        let ticket = self
            .create_direct_upload(DirectUploadRequest {
                filename: req.filename.clone(),
                prefix: req.prefix.clone(),
            })
            .await?;

        let size = req.bytes.len() as u64;
        let response = self
            .http
            .put(&ticket.upload_url)
            .header(reqwest::header::CONTENT_TYPE, req.content_type.clone())
            .body(req.bytes)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("upload failed: {e}")))?;
        Self::check(response).await?;

        debug!(
            event = "storage.bytes_stored",
            domain = "storage",
            path = ticket.path.as_str(),
            size
        );
        Ok(StoredObject {
            path: ticket.path,
            url: ticket.public_url,
            size,
            content_type: Some(req.content_type),
            created_at: chrono::Utc::now().timestamp_millis(),
        })
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<StoredObject>, StorageError> {
        let limit = clamp_limit(limit).to_string();
        let request = self
            .http
            .get(self.files_url())
            .query(&[("prefix", prefix), ("limit", limit.as_str())]);
        let response = self
            .with_admin_key(request)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("list failed: {e}")))?;
        let rows: Vec<ListedObject> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("invalid list body: {e}")))?;
        Ok(rows
            .into_iter()
            .map(|row| StoredObject {
                path: row.id,
                url: row.url,
                size: row.size,
                content_type: row.mime,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let request = self.http.delete(self.files_url()).query(&[("id", path)]);
        let response = self
            .with_admin_key(request)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("delete failed: {e}")))?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_url_trims_trailing_slash() {
        let backend =
            HttpStorageBackend::new(HttpStorageConfig::new("https://files.example/")).expect("backend");
        assert_eq!(backend.files_url(), "https://files.example/api/files");
    }

    #[tokio::test]
    async fn store_bytes_validates_before_any_remote_call() {
        let backend = HttpStorageBackend::new(
            HttpStorageConfig::new("http://127.0.0.1:1").admin_key("secret"),
        )
        .expect("backend");
        let err = backend
            .store_bytes(StoreBytesRequest {
                bytes: vec![0; 4],
                content_type: "text/plain".into(),
                filename: None,
                prefix: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }
}
