/// Errors surfaced by the generation client.
///
/// None of these are retried automatically; retry, if desired, is a
/// user-initiated restart of the whole flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// No API key resolvable from the override or the environment, or the
    /// client could not be constructed. Detected at first use, never retried.
    #[error("config error: {0}")]
    Config(String),
    /// Caller contract violation, for example no input image.
    #[error("validation error: {0}")]
    Validation(String),
    /// Non-2xx response from the generation endpoint, with the body text for
    /// diagnosis.
    #[error("generation request failed with status {status}: {body}")]
    Provider { status: u16, body: String },
    /// Network or stream I/O failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The buffered response carried no usable image in any known shape.
    /// `raw` is the serialized response body.
    #[error("no image in response: {raw}")]
    NoImage { raw: String },
    /// The event stream closed without ever producing an image.
    #[error("stream ended without image")]
    StreamEndedWithoutImage,
}

impl GenerateError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_image_error_carries_the_serialized_body() {
        let raw = r#"{"choices":[{"message":{}}]}"#.to_string();
        let err = GenerateError::NoImage { raw: raw.clone() };
        assert!(err.to_string().contains(&raw));
    }

    #[test]
    fn provider_error_carries_status_and_body() {
        let err = GenerateError::Provider {
            status: 429,
            body: "rate limited".into(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("rate limited"));
    }
}
