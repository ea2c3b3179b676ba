/// Literal sentinel marking the terminal frame of a stream. Ignored for
/// parsing.
pub(crate) const DONE_SENTINEL: &str = "[DONE]";

/// One blank-line-delimited unit of a streamed response.
///
/// OpenRouter sends each `data:` line as a self-contained JSON increment, so
/// the frame keeps its lines separate instead of joining them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub data_lines: Vec<String>,
}

/// Incremental SSE frame splitter over raw response bytes.
///
/// Bytes are appended as they arrive; complete frames are drained on each
/// push, and a partial trailing frame stays buffered until its delimiter
/// shows up in a later chunk.
#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len().saturating_sub(1) {
        if buf[i] == b'\r' && buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut data_lines = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r').trim_start();
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(SseFrame { data_lines })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let part1 = b"data: {\"choices\":[{\"delta\":{\"im";
        let part2 = b"ages\":[]}}]}\n\n";
        assert!(decoder.push_chunk(part1).is_empty());
        let frames = decoder.push_chunk(part2);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data_lines.len(), 1);
        assert!(frames[0].data_lines[0].contains("choices"));
    }

    #[test]
    fn splits_on_crlf_delimiters_too() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: {\"a\":1}\r\n\r\ndata: [DONE]\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data_lines, vec!["{\"a\":1}".to_string()]);
        assert_eq!(frames[1].data_lines, vec![DONE_SENTINEL.to_string()]);
    }

    #[test]
    fn keeps_multiple_data_lines_separate() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: {\"a\":1}\ndata: {\"b\":2}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].data_lines,
            vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]
        );
    }

    #[test]
    fn skips_comments_and_frames_without_data() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b": keep-alive\n\nevent: ping\n\ndata: {\"a\":1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data_lines, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn trailing_partial_frame_stays_buffered() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b"data: {\"a\":1}\n\ndata: {\"b\":");
        assert_eq!(frames.len(), 1);
        let frames = decoder.push_chunk(b"2}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data_lines, vec!["{\"b\":2}".to_string()]);
    }
}
