//! Incremental decoder for `text/event-stream` bodies.
//!
//! Only the `data` field matters to the log stream: `event`, `id` and `retry`
//! lines are skipped, and comment lines (the server's keep-alives) are
//! dropped. Chunks may split lines, and lines may split UTF-8 sequences.

#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the body; returns the data of every event completed
    /// by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..]
            .iter()
            .position(|byte| *byte == b'\n' || *byte == b'\r')
        {
            let end = start + offset;
            let terminator_len = if self.pending[end] == b'\r' {
                match self.pending.get(end + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    // A trailing CR may be the first half of CRLF.
                    None => break,
                }
            } else {
                1
            };

            let line = String::from_utf8_lossy(&self.pending[start..end]).into_owned();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
            start = end + terminator_len;
        }
        self.pending.drain(..start);
        events
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            let data = std::mem::take(&mut self.data).join("\n");
            return (!data.is_empty()).then_some(data);
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_events_and_skips_keep_alives() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\n\ndata: {\"message\":\"a\"}\n\ndata: b\n\n");
        assert_eq!(events, vec!["{\"message\":\"a\"}".to_string(), "b".to_string()]);
    }

    #[test]
    fn joins_multi_line_data_and_ignores_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: log\nid: 7\ndata: first\ndata:second\nretry: 10\n\n");
        assert_eq!(events, vec!["first\nsecond".to_string()]);
    }

    #[test]
    fn handles_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"da").is_empty());
        assert!(decoder.push(b"ta: hel").is_empty());
        assert!(decoder.push(b"lo\r").is_empty());
        assert!(decoder.push(b"\n").is_empty());
        assert_eq!(decoder.push(b"\r\n"), vec!["hello".to_string()]);
    }

    #[test]
    fn handles_utf8_split_across_chunks() {
        let text = "data: reconnect…\n\n".as_bytes();
        let split = text.len() - 4;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&text[..split]).is_empty());
        assert_eq!(decoder.push(&text[split..]), vec!["reconnect…".to_string()]);
    }

    #[test]
    fn bare_cr_terminates_lines() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.push(b"data: x\r\rdata: y\r"), vec!["x".to_string()]);
        assert!(decoder.push(b"\r").is_empty());
        assert_eq!(decoder.push(b"\n"), vec!["y".to_string()]);
    }

    #[test]
    fn empty_data_is_not_dispatched() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data:\n\n\n").is_empty());
    }
}
