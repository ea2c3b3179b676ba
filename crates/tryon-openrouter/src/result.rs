/// Normalized outcome of a generation call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationResult {
    /// Base64 data URL of the generated image. Non-empty on every success.
    pub image_data_url: String,
    /// Unprocessed upstream payload, kept for diagnostics only. Populated in
    /// buffered mode; streaming results carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl GenerationResult {
    pub(crate) fn from_stream(image_data_url: String) -> Self {
        Self {
            image_data_url,
            raw: None,
        }
    }
}
