//! Server-sent-events wire codec.
//!
//! The decoder is incremental: feed it bytes as they arrive and it returns
//! every event completed by those bytes. Lines may end in LF, CRLF or a lone
//! CR, and a CRLF split across two reads is still one terminator.

use std::time::Duration;

/// Event type used when a frame has no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One decoded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type (`message` unless the frame named another).
    pub event: String,
    /// Data lines joined with `\n`.
    pub data: String,
    /// Last event ID seen on the stream when this event was dispatched.
    pub id: Option<String>,
}

/// Encode `data` as an unnamed event.
#[must_use]
pub fn encode(data: &str) -> String {
    encode_event(None, data)
}

/// Encode `data` as one frame, one `data:` line per line of input.
#[must_use]
pub fn encode_event(event: Option<&str>, data: &str) -> String {
    let mut frame = String::new();
    if let Some(event) = event {
        frame.push_str("event: ");
        frame.push_str(event);
        frame.push('\n');
    }
    for line in data.split('\n') {
        frame.push_str("data: ");
        frame.push_str(line.strip_suffix('\r').unwrap_or(line));
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// Incremental SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    skip_lf: bool,
    data: String,
    event: Option<String>,
    last_event_id: Option<String>,
    retry: Option<Duration>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => self.end_line(&mut events),
                b'\r' => {
                    self.end_line(&mut events);
                    self.skip_lf = true;
                }
                _ => self.line.push(byte),
            }
        }
        events
    }

    /// Last `id:` value seen, kept across events and reconnects.
    #[must_use]
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnect delay requested by the server with `retry:`.
    #[must_use]
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Drop any partially received line or frame.
    ///
    /// Called when a connection ends; `id` and `retry` survive.
    pub fn reset_frame(&mut self) {
        self.line.clear();
        self.skip_lf = false;
        self.data.clear();
        self.event = None;
    }

    fn end_line(&mut self, events: &mut Vec<SseEvent>) {
        let raw = std::mem::take(&mut self.line);
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(event) = self.dispatch() {
                events.push(event);
            }
            return;
        }

        // Comment line
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };
        self.process_field(field, value);
    }

    fn process_field(&mut self, field: &str, value: &str) {
        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = Some(value.to_owned());
                }
            }
            "retry" => {
                if !value.is_empty()
                    && value.bytes().all(|b| b.is_ascii_digit())
                    && let Ok(ms) = value.parse::<u64>()
                {
                    self.retry = Some(Duration::from_millis(ms));
                }
            }
            _ => {}
        }
    }

    /// Complete the current frame. Frames without data are discarded.
    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        data.pop();
        Some(SseEvent {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_owned()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}
