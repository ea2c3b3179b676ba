use tracing::warn;

use crate::errors::GenerateError;
use crate::extract::{ResponseMode, extract_image};
use crate::request::ImageDeltaCallback;
use crate::result::GenerationResult;
use crate::sse::{DONE_SENTINEL, SseFrame};

/// Folds decoded stream increments into the last known image.
///
/// Increments are consumed strictly in delivery order; the last known image
/// always reflects the most recently parsed one. A malformed increment is
/// skipped rather than aborting the stream — one corrupt chunk must not
/// destroy an otherwise-successful generation — but skips are counted so the
/// loss stays diagnosable.
pub(crate) struct StreamFold {
    on_image_delta: Option<ImageDeltaCallback>,
    last_image: Option<String>,
    increments_seen: u64,
    increments_skipped: u64,
}

impl StreamFold {
    pub fn new(on_image_delta: Option<ImageDeltaCallback>) -> Self {
        Self {
            on_image_delta,
            last_image: None,
            increments_seen: 0,
            increments_skipped: 0,
        }
    }

    pub fn push_frame(&mut self, frame: &SseFrame) {
        for line in &frame.data_lines {
            if line == DONE_SENTINEL {
                continue;
            }
            self.increments_seen += 1;
            let value: serde_json::Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(_) => {
                    self.increments_skipped += 1;
                    continue;
                }
            };
            if let Some((url, _source)) = extract_image(&value, ResponseMode::StreamIncrement) {
                if let Some(callback) = &self.on_image_delta {
                    callback(&url);
                }
                self.last_image = Some(url);
            }
        }
    }

    pub fn finish(self) -> Result<GenerationResult, GenerateError> {
        if self.increments_skipped > 0 {
            warn!(
                event = "gen.increments_skipped",
                domain = "gen",
                skipped = self.increments_skipped,
                seen = self.increments_seen,
                "malformed stream increments were skipped"
            );
        }
        match self.last_image {
            Some(url) => Ok(GenerationResult::from_stream(url)),
            None => Err(GenerateError::StreamEndedWithoutImage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn frame(lines: &[&str]) -> SseFrame {
        SseFrame {
            data_lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn delta_line(url: &str) -> String {
        format!(
            "{{\"choices\":[{{\"delta\":{{\"images\":[{{\"image_url\":{{\"url\":\"{url}\"}}}}]}}}}]}}"
        )
    }

    #[test]
    fn single_delta_then_done_yields_that_image() {
        let mut fold = StreamFold::new(None);
        fold.push_frame(&frame(&[&delta_line("data:image/png;base64,X")]));
        fold.push_frame(&frame(&[DONE_SENTINEL]));
        let result = fold.finish().expect("result");
        assert_eq!(result.image_data_url, "data:image/png;base64,X");
        assert_eq!(result.raw, None);
    }

    #[test]
    fn last_valid_image_wins_despite_malformed_interleave() {
        let mut fold = StreamFold::new(None);
        fold.push_frame(&frame(&[&delta_line("data:image/png;base64,FIRST")]));
        fold.push_frame(&frame(&["{not json at all"]));
        fold.push_frame(&frame(&[&delta_line("data:image/png;base64,SECOND")]));
        fold.push_frame(&frame(&["{\"choices\":[]}"]));
        fold.push_frame(&frame(&[DONE_SENTINEL]));
        let result = fold.finish().expect("result");
        assert_eq!(result.image_data_url, "data:image/png;base64,SECOND");
    }

    #[test]
    fn stream_without_any_image_is_a_hard_failure() {
        let mut fold = StreamFold::new(None);
        fold.push_frame(&frame(&["{\"choices\":[{\"delta\":{}}]}"]));
        fold.push_frame(&frame(&["garbage"]));
        fold.push_frame(&frame(&[DONE_SENTINEL]));
        assert_eq!(
            fold.finish().unwrap_err(),
            GenerateError::StreamEndedWithoutImage
        );
    }

    #[test]
    fn empty_stream_is_a_hard_failure() {
        assert_eq!(
            StreamFold::new(None).finish().unwrap_err(),
            GenerateError::StreamEndedWithoutImage
        );
    }

    #[test]
    fn callback_sees_every_partial_in_order() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ImageDeltaCallback = Arc::new(move |url: &str| {
            sink.lock().unwrap().push(url.to_string());
        });
        let mut fold = StreamFold::new(Some(callback));
        fold.push_frame(&frame(&[
            &delta_line("data:image/png;base64,A"),
            &delta_line("data:image/png;base64,B"),
        ]));
        fold.push_frame(&frame(&[&delta_line("data:image/png;base64,C")]));
        let result = fold.finish().expect("result");
        assert_eq!(result.image_data_url, "data:image/png;base64,C");
        assert_eq!(
            seen.lock().unwrap().clone(),
            vec![
                "data:image/png;base64,A".to_string(),
                "data:image/png;base64,B".to_string(),
                "data:image/png;base64,C".to_string(),
            ]
        );
    }
}
