use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::backend::StorageError;

/// A data URL split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Builds a `data:<mime>;base64,<payload>` URL.
pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Splits a base64 data URL into its content type and decoded bytes.
pub fn parse_data_url(input: &str) -> Result<DecodedDataUrl, StorageError> {
    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| StorageError::Validation("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StorageError::Validation("data URL has no payload".into()))?;
    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| StorageError::Validation("only base64 data URLs are supported".into()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| StorageError::Validation(format!("invalid base64 payload: {e}")))?;
    Ok(DecodedDataUrl {
        content_type: content_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_parse_round_trips() {
        let url = encode_data_url("image/png", b"\x89PNG");
        let decoded = parse_data_url(&url).expect("decoded");
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.bytes, b"\x89PNG");
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(matches!(
            parse_data_url("https://cdn.example/img.png"),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_base64_encodings() {
        assert!(matches!(
            parse_data_url("data:text/plain,hello"),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn rejects_corrupt_payloads() {
        assert!(matches!(
            parse_data_url("data:image/png;base64,@@@"),
            Err(StorageError::Validation(_))
        ));
    }
}
