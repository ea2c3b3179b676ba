use std::sync::Arc;

use crate::client::OpenRouterClient;
use crate::errors::GenerateError;
use crate::options::{Pose, Scene};
use crate::result::GenerationResult;

/// Callback invoked with each partial image observed in streaming mode.
pub type ImageDeltaCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Builder for a single generation request.
///
/// At least one input image is required; [`GenerateBuilder::send`] fails fast
/// with a validation error rather than issuing a malformed remote call.
pub struct GenerateBuilder<'a> {
    client: &'a OpenRouterClient,
    images: Vec<String>,
    pose: Pose,
    scene: Scene,
    streaming: bool,
    on_image_delta: Option<ImageDeltaCallback>,
    api_key_override: Option<String>,
}

impl<'a> GenerateBuilder<'a> {
    pub(crate) fn new(client: &'a OpenRouterClient) -> Self {
        Self {
            client,
            images: Vec::new(),
            pose: Pose::default(),
            scene: Scene::default(),
            streaming: false,
            on_image_delta: None,
            api_key_override: None,
        }
    }

    /// Appends one input image, as a base64 data URL or a resolvable URL.
    pub fn image_data_url(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    /// Appends several input images.
    pub fn images<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Sets the pose directive.
    pub fn pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Sets the scene directive.
    pub fn scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    /// Requests incremental event-stream delivery instead of one buffered
    /// response.
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Registers a callback invoked with each partial image as it arrives.
    /// Only meaningful together with [`GenerateBuilder::streaming`].
    pub fn on_image_delta(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_image_delta = Some(Arc::new(callback));
        self
    }

    /// Overrides the configured API key for this request only.
    pub fn api_key_override(mut self, key: impl Into<String>) -> Self {
        self.api_key_override = Some(key.into());
        self
    }

    /// Validates the builder and issues the request, returning exactly one
    /// normalized result.
    pub async fn send(self) -> Result<GenerationResult, GenerateError> {
        let client = self.client;
        let streaming = self.streaming;
        let request = self.validate()?;
        if streaming {
            client.generate_streaming(request).await
        } else {
            client.generate_buffered(request).await
        }
    }

    fn validate(self) -> Result<GenerateRequest, GenerateError> {
        let images: Vec<String> = self
            .images
            .into_iter()
            .filter(|url| !url.trim().is_empty())
            .collect();
        if images.is_empty() {
            return Err(GenerateError::Validation(
                "at least one input image is required".into(),
            ));
        }
        Ok(GenerateRequest {
            images,
            pose: self.pose,
            scene: self.scene,
            on_image_delta: self.on_image_delta,
            api_key_override: self.api_key_override,
        })
    }
}

/// Validated request handed to the client's response-mode paths.
pub(crate) struct GenerateRequest {
    pub images: Vec<String>,
    pub pose: Pose,
    pub scene: Scene,
    pub on_image_delta: Option<ImageDeltaCallback>,
    pub api_key_override: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenRouterConfig;

    fn client() -> OpenRouterClient {
        OpenRouterClient::new(OpenRouterConfig::new("sk-or-test")).expect("client")
    }

    #[tokio::test]
    async fn send_without_images_fails_fast() {
        let client = client();
        let err = client.generate().send().await.unwrap_err();
        assert!(
            matches!(err, GenerateError::Validation(message) if message.contains("input image"))
        );
    }

    #[tokio::test]
    async fn blank_images_are_filtered_before_validation() {
        let client = client();
        let err = client
            .generate()
            .image_data_url("   ")
            .image_data_url("")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Validation(_)));
    }
}
