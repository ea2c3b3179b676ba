use serde_json::Value;

/// Where in a payload an image reference was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImageSource {
    /// `choices[0].delta.images[0].image_url.url` (streaming increments).
    DeltaImages,
    /// `choices[0].message.images[0].image_url.url` (both modes).
    MessageImages,
    /// `data:image`-prefixed string sitting in `choices[0].message.content`.
    ///
    /// Best-effort secondary strategy with no formal upstream contract;
    /// callers log when it fires.
    TextContent,
}

/// Which response shape a payload belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResponseMode {
    /// Single buffered JSON response.
    Buffered,
    /// One decoded increment of an event stream.
    StreamIncrement,
}

/// Extracts the image reference from one payload, trying the shapes valid
/// for `mode` in priority order.
///
/// Stream increments only accept `data:image` URLs; a buffered response's
/// dedicated image field may carry any non-empty reference (some models
/// return hosted URLs there).
pub(crate) fn extract_image(value: &Value, mode: ResponseMode) -> Option<(String, ImageSource)> {
    match mode {
        ResponseMode::StreamIncrement => {
            if let Some(url) = image_url_at(value, "delta").filter(|u| is_image_data_url(u)) {
                return Some((url, ImageSource::DeltaImages));
            }
            // A full message occasionally appears mid-stream.
            image_url_at(value, "message")
                .filter(|u| is_image_data_url(u))
                .map(|url| (url, ImageSource::MessageImages))
        }
        ResponseMode::Buffered => {
            if let Some(url) = image_url_at(value, "message").filter(|u| !u.is_empty()) {
                return Some((url, ImageSource::MessageImages));
            }
            text_content_image(value).map(|url| (url, ImageSource::TextContent))
        }
    }
}

fn image_url_at(value: &Value, role: &str) -> Option<String> {
    value
        .get("choices")?
        .get(0)?
        .get(role)?
        .get("images")?
        .get(0)?
        .get("image_url")?
        .get("url")?
        .as_str()
        .map(ToOwned::to_owned)
}

fn text_content_image(value: &Value) -> Option<String> {
    let content = value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?;
    is_image_data_url(content).then(|| content.to_string())
}

pub(crate) fn is_image_data_url(value: &str) -> bool {
    value.starts_with("data:image")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_increment_reads_delta_images() {
        let value = json!({
            "choices": [{"delta": {"images": [{"image_url": {"url": "data:image/png;base64,X"}}]}}]
        });
        assert_eq!(
            extract_image(&value, ResponseMode::StreamIncrement),
            Some(("data:image/png;base64,X".into(), ImageSource::DeltaImages))
        );
    }

    #[test]
    fn stream_increment_accepts_a_full_message_mid_stream() {
        let value = json!({
            "choices": [{"message": {"images": [{"image_url": {"url": "data:image/png;base64,Y"}}]}}]
        });
        assert_eq!(
            extract_image(&value, ResponseMode::StreamIncrement),
            Some(("data:image/png;base64,Y".into(), ImageSource::MessageImages))
        );
    }

    #[test]
    fn stream_increment_rejects_non_data_urls() {
        let value = json!({
            "choices": [{"delta": {"images": [{"image_url": {"url": "https://cdn.example/img.png"}}]}}]
        });
        assert_eq!(extract_image(&value, ResponseMode::StreamIncrement), None);
    }

    #[test]
    fn buffered_reads_the_dedicated_image_field_even_for_hosted_urls() {
        let value = json!({
            "choices": [{"message": {"images": [{"image_url": {"url": "https://cdn.example/img.png"}}]}}]
        });
        assert_eq!(
            extract_image(&value, ResponseMode::Buffered),
            Some(("https://cdn.example/img.png".into(), ImageSource::MessageImages))
        );
    }

    #[test]
    fn buffered_falls_back_to_data_image_text_content() {
        let value = json!({
            "choices": [{"message": {"content": "data:image/jpeg;base64,Z"}}]
        });
        assert_eq!(
            extract_image(&value, ResponseMode::Buffered),
            Some(("data:image/jpeg;base64,Z".into(), ImageSource::TextContent))
        );
    }

    #[test]
    fn buffered_ignores_plain_text_content() {
        let value = json!({
            "choices": [{"message": {"content": "sorry, I cannot do that"}}]
        });
        assert_eq!(extract_image(&value, ResponseMode::Buffered), None);
    }

    #[test]
    fn empty_message_yields_nothing() {
        let value = json!({"choices": [{"message": {}}]});
        assert_eq!(extract_image(&value, ResponseMode::Buffered), None);
        assert_eq!(extract_image(&value, ResponseMode::StreamIncrement), None);
    }
}
