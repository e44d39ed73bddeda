//! Client-side parsing of the Server-Sent Events wire format
//!
//! The backend streams one message per recipient-state transition, plus
//! periodic `: heartbeat` comments to keep the connection alive. Parsing is
//! incremental: network chunks can split lines (and multi-byte characters)
//! anywhere, so bytes are buffered and only complete lines are interpreted.

/// One dispatched SSE message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// Value of the `event:` field, if the message was named
    pub event: Option<String>,
    /// Concatenated `data:` lines, joined with `\n`
    pub data: String,
}

/// Incremental SSE parser fed with raw network chunks.
///
/// A message is dispatched at each blank line; comment lines (leading `:`)
/// and fields this client does not use (`id:`, `retry:`) are skipped.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns every message completed by it, in
    /// stream order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.buffer.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let mut line = String::from_utf8_lossy(&raw[..raw.len() - 1]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(message) = self.handle_line(&line) {
                messages.push(message);
            }
        }
        messages
    }

    fn handle_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            // Dispatch boundary; a block holding no data (heartbeat only)
            // dispatches nothing
            let event = self.event.take();
            if self.data.is_empty() {
                return None;
            }
            let data = std::mem::take(&mut self.data).join("\n");
            return Some(SseMessage { event, data });
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_str(parser: &mut SseParser, chunk: &str) -> Vec<SseMessage> {
        parser.push(chunk.as_bytes())
    }

    #[test]
    fn test_single_data_message() {
        let mut parser = SseParser::new();
        let messages = push_str(&mut parser, "data: {\"email\":\"a@b.c\"}\n\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event, None);
        assert_eq!(messages[0].data, "{\"email\":\"a@b.c\"}");
    }

    #[test]
    fn test_named_event() {
        let mut parser = SseParser::new();
        let messages = push_str(&mut parser, "event: DeliveryUpdate\ndata: {}\n\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event.as_deref(), Some("DeliveryUpdate"));
        assert_eq!(messages[0].data, "{}");
    }

    #[test]
    fn test_heartbeat_comment_dispatches_nothing() {
        let mut parser = SseParser::new();
        assert!(push_str(&mut parser, ": heartbeat\n\n").is_empty());

        // Parser state is clean afterwards
        let messages = push_str(&mut parser, "data: x\n\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "x");
    }

    #[test]
    fn test_chunks_split_mid_line() {
        let mut parser = SseParser::new();
        assert!(push_str(&mut parser, "da").is_empty());
        assert!(push_str(&mut parser, "ta: hel").is_empty());
        assert!(push_str(&mut parser, "lo\n").is_empty());

        let messages = push_str(&mut parser, "\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "hello");
    }

    #[test]
    fn test_chunks_split_mid_multibyte_character() {
        let mut parser = SseParser::new();
        let bytes = "data: Jürgen\n\n".as_bytes();
        // Split inside the two-byte 'ü'
        let split = bytes.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(parser.push(&bytes[..split]).is_empty());

        let messages = parser.push(&bytes[split..]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "Jürgen");
    }

    #[test]
    fn test_multi_line_data_joined_with_newline() {
        let mut parser = SseParser::new();
        let messages = push_str(&mut parser, "data: first\ndata: second\n\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "first\nsecond");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = SseParser::new();
        let messages = push_str(&mut parser, "event: E\r\ndata: v\r\n\r\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event.as_deref(), Some("E"));
        assert_eq!(messages[0].data, "v");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut parser = SseParser::new();
        let messages = push_str(&mut parser, "id: 12\nretry: 5000\ndata: v\n\n");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "v");
    }

    #[test]
    fn test_no_dispatch_without_blank_line() {
        let mut parser = SseParser::new();
        assert!(push_str(&mut parser, "data: pending\n").is_empty());
    }

    #[test]
    fn test_multiple_messages_in_one_chunk_keep_order() {
        let mut parser = SseParser::new();
        let messages = push_str(&mut parser, "data: one\n\ndata: two\n\ndata: three\n\n");

        let data: Vec<_> = messages.iter().map(|m| m.data.as_str()).collect();
        assert_eq!(data, vec!["one", "two", "three"]);
    }
}
