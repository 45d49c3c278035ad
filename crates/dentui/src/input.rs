//! Raw input decoding.
//!
//! Turns the byte stream read from the terminal in raw mode into `Key`
//! tokens. Escape sequences and multi-byte UTF-8 characters may arrive
//! split across reads; incomplete tails are buffered until the next chunk
//! or until the caller flushes after an idle timeout (a lone ESC is only
//! distinguishable from the start of a sequence that way).

use std::time::Duration;

use thiserror::Error;

/// How long a partial sequence may sit in the buffer before it is flushed.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(40);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Char(char),
    /// Control chord with a lowercase ASCII letter or one of `@\]^_`.
    Ctrl(char),
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid UTF-8 lead byte 0x{0:02x}")]
    InvalidLead(u8),
    #[error("invalid continuation byte 0x{byte:02x} after lead 0x{lead:02x}")]
    InvalidContinuation { lead: u8, byte: u8 },
    #[error("invalid UTF-8 sequence {0:02x?}")]
    InvalidScalar(Vec<u8>),
    #[error("truncated UTF-8 sequence {0:02x?}")]
    Truncated(Vec<u8>),
}

pub type Decoded = Result<Key, DecodeError>;

enum Step {
    Token(Decoded, usize),
    /// Nothing emitted but bytes consumed (unrecognised escape sequence).
    Skip(usize),
    Incomplete,
}

#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Decoded> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            match step(&self.pending[pos..]) {
                Step::Token(token, used) => {
                    out.push(token);
                    pos += used;
                }
                Step::Skip(used) => pos += used,
                Step::Incomplete => break,
            }
        }
        self.pending.drain(..pos);
        out
    }

    /// Resolve whatever is buffered as if no more bytes will follow.
    pub fn flush(&mut self) -> Vec<Decoded> {
        let pending = std::mem::take(&mut self.pending);
        let mut out = Vec::new();
        let Some((&first, rest)) = pending.split_first() else {
            return out;
        };
        if first == 0x1b {
            out.push(Ok(Key::Esc));
            if !rest.is_empty() {
                out.extend(self.feed(rest));
                out.extend(self.flush());
            }
        } else {
            out.push(Err(DecodeError::Truncated(pending)));
        }
        out
    }
}

fn step(bytes: &[u8]) -> Step {
    let first = bytes[0];
    match first {
        0x1b => escape(bytes),
        b'\r' | b'\n' => Step::Token(Ok(Key::Enter), 1),
        b'\t' => Step::Token(Ok(Key::Tab), 1),
        0x08 | 0x7f => Step::Token(Ok(Key::Backspace), 1),
        0x00 => Step::Token(Ok(Key::Ctrl('@')), 1),
        0x01..=0x1a => Step::Token(Ok(Key::Ctrl((b'a' + first - 1) as char)), 1),
        0x1c..=0x1f => Step::Token(Ok(Key::Ctrl((b'\\' + first - 0x1c) as char)), 1),
        0x20..=0x7e => Step::Token(Ok(Key::Char(first as char)), 1),
        _ => utf8(bytes),
    }
}

fn escape(bytes: &[u8]) -> Step {
    let Some(&kind) = bytes.get(1) else {
        return Step::Incomplete;
    };
    match kind {
        b'[' => csi(bytes),
        b'O' => match bytes.get(2) {
            None => Step::Incomplete,
            Some(&code) => match ss3_key(code) {
                Some(key) => Step::Token(Ok(key), 3),
                None => Step::Skip(3),
            },
        },
        // ESC followed by anything else is a bare Escape; the next byte is
        // decoded on its own.
        _ => Step::Token(Ok(Key::Esc), 1),
    }
}

fn csi(bytes: &[u8]) -> Step {
    let mut end = 2;
    loop {
        let Some(&byte) = bytes.get(end) else {
            return Step::Incomplete;
        };
        match byte {
            0x20..=0x3f => end += 1,
            0x40..=0x7e => break,
            // Not a CSI body: treat the ESC as a key and resume at '['.
            _ => return Step::Token(Ok(Key::Esc), 1),
        }
    }
    let params = &bytes[2..end];
    let final_byte = bytes[end];
    let used = end + 1;
    let key = match final_byte {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        b'Z' => Some(Key::BackTab),
        b'~' => tilde_key(params),
        _ => None,
    };
    match key {
        Some(key) => Step::Token(Ok(key), used),
        None => Step::Skip(used),
    }
}

fn tilde_key(params: &[u8]) -> Option<Key> {
    let first = params.split(|&b| b == b';').next()?;
    match first {
        b"1" | b"7" => Some(Key::Home),
        b"2" => Some(Key::Insert),
        b"3" => Some(Key::Delete),
        b"4" | b"8" => Some(Key::End),
        b"5" => Some(Key::PageUp),
        b"6" => Some(Key::PageDown),
        _ => None,
    }
}

fn ss3_key(code: u8) -> Option<Key> {
    match code {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

/// Number of continuation bytes implied by a UTF-8 lead byte.
fn continuation_len(lead: u8) -> Option<usize> {
    match lead {
        0xc2..=0xdf => Some(1),
        0xe0..=0xef => Some(2),
        0xf0..=0xf4 => Some(3),
        _ => None,
    }
}

fn utf8(bytes: &[u8]) -> Step {
    let lead = bytes[0];
    let Some(needed) = continuation_len(lead) else {
        return Step::Token(Err(DecodeError::InvalidLead(lead)), 1);
    };
    for offset in 1..=needed {
        let Some(&byte) = bytes.get(offset) else {
            return Step::Incomplete;
        };
        if !(0x80..=0xbf).contains(&byte) {
            // Drop what was read so far; the offending byte starts a new key.
            return Step::Token(
                Err(DecodeError::InvalidContinuation { lead, byte }),
                offset,
            );
        }
    }
    let sequence = &bytes[..=needed];
    match std::str::from_utf8(sequence)
        .ok()
        .and_then(|text| text.chars().next())
    {
        Some(ch) => Step::Token(Ok(Key::Char(ch)), needed + 1),
        None => Step::Token(
            Err(DecodeError::InvalidScalar(sequence.to_vec())),
            needed + 1,
        ),
    }
}
