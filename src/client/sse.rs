//! Incremental parser for `text/event-stream` bodies.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Accumulates raw chunks and yields complete frames.
///
/// Bytes are buffered until a whole line is available, so multibyte
/// characters and `\r\n` pairs split across chunks survive intact. Text is
/// decoded once per finished block. Comment lines (keep-alives) are skipped;
/// a frame without an `event:` line is a `message` event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    block: Vec<Vec<u8>>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(line) = self.next_line() {
            if !line.is_empty() {
                self.block.push(line);
                continue;
            }
            let lines = std::mem::take(&mut self.block);
            if let Some(frame) = finish_block(lines) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Takes one line off the buffer, accepting `\n`, `\r\n` or a lone `\r`.
    /// A trailing `\r` waits for the next chunk in case `\n` follows.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|b| *b == b'\n' || *b == b'\r')?;
        let terminator = match (self.pending[end], self.pending.get(end + 1)) {
            (b'\r', Some(b'\n')) => 2,
            (b'\r', None) => return None,
            _ => 1,
        };
        let line = self.pending[..end].to_vec();
        self.pending.drain(..end + terminator);
        Some(line)
    }
}

fn finish_block(lines: Vec<Vec<u8>>) -> Option<SseFrame> {
    let raw = lines.join(&b'\n');
    let text = match String::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Skipping event with invalid UTF-8: {}", e);
            return None;
        }
    };

    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }

    Some(SseFrame {
        event: event.unwrap_or_else(|| "message".to_string()),
        data: data.join("\n"),
    })
}
