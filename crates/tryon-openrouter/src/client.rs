use futures::StreamExt as _;
use tracing::{debug, warn};

use crate::config::OpenRouterConfig;
use crate::errors::GenerateError;
use crate::extract::{ImageSource, ResponseMode, extract_image};
use crate::options::{Pose, Scene};
use crate::request::{GenerateBuilder, GenerateRequest};
use crate::result::GenerationResult;
use crate::sse::SseDecoder;
use crate::stream::StreamFold;

/// Client for the OpenRouter chat-completions endpoint.
pub struct OpenRouterClient {
    http: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Creates a client from explicit configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self, GenerateError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerateError::Config(
                "OpenRouter api_key must not be empty".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                GenerateError::Config(format!("failed to build OpenRouter client: {e}"))
            })?;
        Ok(Self { http, config })
    }

    /// Creates a client using `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, GenerateError> {
        Self::new(OpenRouterConfig::from_env()?)
    }

    /// Starts building a generation request.
    pub fn generate(&self) -> GenerateBuilder<'_> {
        GenerateBuilder::new(self)
    }

    fn bearer_key<'r>(&'r self, request: &'r GenerateRequest) -> &'r str {
        request
            .api_key_override
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(&self.config.api_key)
    }

    async fn post_generation(
        &self,
        request: &GenerateRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GenerateError> {
        let body = build_request_body(&self.config.model, request, stream);
        debug!(
            event = "gen.request_started",
            domain = "gen",
            model = self.config.model.as_str(),
            images = request.images.len() as u64,
            stream
        );
        let response = self
            .http
            .post(self.config.chat_completions_url())
            .bearer_auth(self.bearer_key(request))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::transport(format!("generation request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerateError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    pub(crate) async fn generate_buffered(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let response = self.post_generation(&request, false).await?;
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerateError::transport(format!("invalid response body: {e}")))?;
        match extract_image(&value, ResponseMode::Buffered) {
            Some((url, source)) => {
                if source == ImageSource::TextContent {
                    warn!(
                        event = "gen.text_content_fallback",
                        domain = "gen",
                        "image taken from text content; upstream offers no contract for this shape"
                    );
                }
                debug!(
                    event = "gen.request_completed",
                    domain = "gen",
                    mode = "buffered",
                    result_len = url.len() as u64
                );
                Ok(GenerationResult {
                    image_data_url: url,
                    raw: Some(value),
                })
            }
            None => Err(GenerateError::NoImage {
                raw: value.to_string(),
            }),
        }
    }

    pub(crate) async fn generate_streaming(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let response = self.post_generation(&request, true).await?;
        let mut bytes_stream = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut fold = StreamFold::new(request.on_image_delta.clone());
        while let Some(chunk) = bytes_stream.next().await {
            let chunk =
                chunk.map_err(|e| GenerateError::transport(format!("streaming read failed: {e}")))?;
            for frame in decoder.push_chunk(&chunk) {
                fold.push_frame(&frame);
            }
        }
        let result = fold.finish()?;
        debug!(
            event = "gen.request_completed",
            domain = "gen",
            mode = "streaming",
            result_len = result.image_data_url.len() as u64
        );
        Ok(result)
    }
}

pub(crate) fn build_request_body(
    model: &str,
    request: &GenerateRequest,
    stream: bool,
) -> serde_json::Value {
    let mut content = vec![serde_json::json!({
        "type": "text",
        "text": instruction(request.pose, request.scene),
    })];
    for url in &request.images {
        content.push(serde_json::json!({
            "type": "image_url",
            "image_url": { "url": url },
        }));
    }
    let mut body = serde_json::json!({
        "model": model,
        "modalities": ["image", "text"],
        "messages": [{ "role": "user", "content": content }],
    });
    if stream {
        body["stream"] = serde_json::json!(true);
    }
    body
}

fn instruction(pose: Pose, scene: Scene) -> String {
    [
        "You are a listing assistant for a second-hand clothing marketplace.",
        "Generate an image of the garment being worn, composed from the supplied images.",
        "Constraints: reproduce colors and patterns faithfully, no fabric distortion.",
        "Composition: portrait 4:5 format, even lighting, neutral background.",
        &format!("Pose: {}.", pose.directive()),
        &format!("Setting: {}.", scene.directive()),
        "Render a single high-quality image with no text or watermark. Internal label: AI-assisted image.",
    ]
    .join(" ")
}
